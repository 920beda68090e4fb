/// Sound engine: procedural chip-tune cues via rodio.
///
/// Every effect is synthesised into an in-memory WAV buffer once at start-up
/// and played fire-and-forget through a detached Sink.
///
/// Build without the "sound" feature to get a silent stub with the same API.

use crate::sim::event::GameEvent;
use crate::sim::session::CountdownCue;

/// Pitch of each countdown step; "START!" jumps up an octave.
fn countdown_freq(cue: CountdownCue) -> f32 {
    match cue {
        CountdownCue::Three => 440.0,
        CountdownCue::Two => 494.0,
        CountdownCue::One => 554.0,
        CountdownCue::Start => 880.0,
    }
}

#[cfg(feature = "sound")]
mod inner {
    use std::f32::consts::TAU;
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    const SAMPLE_RATE: u32 = 22050;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sfx_hit: Arc<Vec<u8>>,
        sfx_shield: Arc<Vec<u8>>,
        sfx_round: Arc<Vec<u8>>,
        sfx_level_up: Arc<Vec<u8>>,
        sfx_game_over: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    log::warn!("audio output unavailable: {e}");
                    return None;
                }
            };

            Some(SoundEngine {
                _stream: stream,
                handle,
                sfx_hit: Arc::new(make_wav(&gen_hit())),
                sfx_shield: Arc::new(make_wav(&gen_shield())),
                sfx_round: Arc::new(make_wav(&gen_round())),
                sfx_level_up: Arc::new(make_wav(&gen_level_up())),
                sfx_game_over: Arc::new(make_wav(&gen_game_over())),
            })
        }

        fn play_buf(&self, buf: Vec<u8>) {
            if let Ok(sink) = Sink::try_new(&self.handle) {
                if let Ok(src) = rodio::Decoder::new(Cursor::new(buf)) {
                    sink.append(src);
                    sink.detach();
                }
            }
        }

        fn play(&self, buf: &Arc<Vec<u8>>) {
            self.play_buf(buf.as_ref().clone());
        }

        pub fn play_blip(&self, freq: f32) {
            self.play_buf(make_wav(&gen_blip(freq, 0.08, 0.25)));
        }

        pub fn play_hit(&self) { self.play(&self.sfx_hit); }
        pub fn play_shield(&self) { self.play(&self.sfx_shield); }
        pub fn play_round(&self) { self.play(&self.sfx_round); }
        pub fn play_level_up(&self) { self.play(&self.sfx_level_up); }
        pub fn play_game_over(&self) { self.play(&self.sfx_game_over); }
    }

    fn tone(freq: f32, i: usize) -> f32 {
        (i as f32 / SAMPLE_RATE as f32 * freq * TAU).sin()
    }

    fn gen_blip(freq: f32, duration: f32, volume: f32) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        (0..n)
            .map(|i| tone(freq, i) * (1.0 - i as f32 / n as f32) * volume)
            .collect()
    }

    /// Note sequence with a little third harmonic for bite.
    fn gen_notes(notes: &[(f32, f32)], volume: f32) -> Vec<f32> {
        let mut samples = Vec::new();
        for &(freq, dur) in notes {
            let n = (SAMPLE_RATE as f32 * dur) as usize;
            for i in 0..n {
                let env = 1.0 - (i as f32 / n as f32).powf(0.5);
                let wave = tone(freq, i) * 0.75 + tone(freq * 3.0, i) * 0.25;
                samples.push(wave * env * volume);
            }
        }
        samples
    }

    /// Correct tile: single bright pluck.
    fn gen_hit() -> Vec<f32> {
        gen_notes(&[(1319.0, 0.06)], 0.25)
    }

    /// Shield absorbing a miss: short noisy thud.
    fn gen_shield() -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * 0.14) as usize;
        let mut seed: u32 = 0x2545_f491;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
                let noise = (seed as f32 / u32::MAX as f32) * 2.0 - 1.0;
                (tone(180.0, i) * 0.5 + noise * 0.5) * (1.0 - t).powf(0.8) * 0.3
            })
            .collect()
    }

    /// Round cleared: two-note chime G5, C6.
    fn gen_round() -> Vec<f32> {
        gen_notes(&[(784.0, 0.08), (1047.0, 0.15)], 0.3)
    }

    /// Grid grows: C5 E5 G5 C6 arpeggio.
    fn gen_level_up() -> Vec<f32> {
        gen_notes(&[(523.0, 0.1), (659.0, 0.1), (784.0, 0.1), (1047.0, 0.3)], 0.3)
    }

    /// Wrong tile: falling A4 F#4 Eb4 C4 with a tail fade.
    fn gen_game_over() -> Vec<f32> {
        let mut samples = gen_notes(&[(440.0, 0.12), (370.0, 0.12), (311.0, 0.12), (261.0, 0.2)], 0.3);
        let total = samples.len();
        let fade = total / 4;
        for (k, s) in samples[total - fade..].iter_mut().enumerate() {
            *s *= 1.0 - k as f32 / fade as f32;
        }
        samples
    }

    /// 16-bit mono PCM WAV wrapper.
    fn make_wav(samples: &[f32]) -> Vec<u8> {
        let data_size = samples.len() as u32 * 2;
        let mut buf = Vec::with_capacity(44 + data_size as usize);

        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&(36 + data_size).to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
        buf.extend_from_slice(&1u16.to_le_bytes()); // mono
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&(SAMPLE_RATE * 2).to_le_bytes());
        buf.extend_from_slice(&2u16.to_le_bytes());
        buf.extend_from_slice(&16u16.to_le_bytes());

        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());
        for &s in samples {
            let val = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }
        buf
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn wav_header_matches_payload() {
            let wav = make_wav(&gen_hit());
            assert_eq!(&wav[0..4], b"RIFF");
            let data_len = u32::from_le_bytes([wav[40], wav[41], wav[42], wav[43]]) as usize;
            assert_eq!(wav.len(), 44 + data_len);
        }

        #[test]
        fn game_over_ends_silent() {
            let s = gen_game_over();
            assert!(s[s.len() - 1].abs() < 0.01);
        }
    }
}

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play_blip(&self, _freq: f32) {}
    pub fn play_hit(&self) {}
    pub fn play_shield(&self) {}
    pub fn play_round(&self) {}
    pub fn play_level_up(&self) {}
    pub fn play_game_over(&self) {}
}

impl SoundEngine {
    /// Play the cue for each event that has one.
    pub fn play_events(&self, events: &[GameEvent]) {
        for event in events {
            match event {
                GameEvent::Countdown(cue) => self.play_blip(countdown_freq(*cue)),
                GameEvent::TileHit { .. } => self.play_hit(),
                GameEvent::Shielded { .. } => self.play_shield(),
                GameEvent::RoundCleared { .. } => self.play_round(),
                GameEvent::LevelUp { .. } => self.play_level_up(),
                GameEvent::GameOver { .. } => self.play_game_over(),
                _ => {}
            }
        }
    }
}
