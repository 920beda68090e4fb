/// Platform bridge: the two fire-and-forget calls the game makes to its host.
///
///   - `ready()`            - content is on screen; sent once after startup
///   - `compose(text, url)` - open a compose intent with a prepared post
///
/// The terminal build has no host to talk to, so `TerminalPlatform` logs
/// both calls and keeps the last compose link for the status line.

use crate::domain::rules::format_time;

const COMPOSE_ENDPOINT: &str = "https://warpcast.com/~/compose";

pub trait Platform {
    fn ready(&mut self);
    fn compose(&mut self, text: &str, url: &str);
}

/// A prepared share post.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShareMessage {
    pub text: String,
    pub url: String,
}

impl ShareMessage {
    pub fn new(score: u32, elapsed_secs: u64, game_url: &str) -> Self {
        ShareMessage {
            text: format!(
                "🧠 I scored {} points in {} in Farc !!! Mind! Can you do better?",
                score,
                format_time(elapsed_secs),
            ),
            url: game_url.to_string(),
        }
    }

    /// Full compose link with both fields percent-encoded.
    pub fn compose_link(&self) -> String {
        format!(
            "{}?text={}&embeds[]={}",
            COMPOSE_ENDPOINT,
            urlencoding::encode(&self.text),
            urlencoding::encode(&self.url),
        )
    }
}

pub fn share(platform: &mut dyn Platform, message: &ShareMessage) {
    platform.compose(&message.text, &message.url);
}

#[derive(Debug, Default)]
pub struct TerminalPlatform {
    ready_sent: bool,
    pub last_link: Option<String>,
}

impl TerminalPlatform {
    pub fn new() -> Self {
        TerminalPlatform::default()
    }
}

impl Platform for TerminalPlatform {
    fn ready(&mut self) {
        if self.ready_sent {
            return;
        }
        self.ready_sent = true;
        log::info!("platform ready");
    }

    fn compose(&mut self, text: &str, url: &str) {
        let link = ShareMessage { text: text.to_string(), url: url.to_string() }.compose_link();
        log::info!("compose intent: {link}");
        self.last_link = Some(link);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        ready: u32,
        composed: Vec<(String, String)>,
    }

    impl Platform for Recorder {
        fn ready(&mut self) {
            self.ready += 1;
        }
        fn compose(&mut self, text: &str, url: &str) {
            self.composed.push((text.into(), url.into()));
        }
    }

    #[test]
    fn message_text() {
        let m = ShareMessage::new(120, 65, "https://farcmind.vercel.app");
        assert_eq!(m.text, "🧠 I scored 120 points in 01:05 in Farc !!! Mind! Can you do better?");
        assert_eq!(m.url, "https://farcmind.vercel.app");
    }

    #[test]
    fn compose_link_is_encoded() {
        let m = ShareMessage::new(10, 5, "https://farcmind.vercel.app");
        let link = m.compose_link();
        assert!(link.starts_with("https://warpcast.com/~/compose?text=%F0%9F%A7%A0%20I%20scored%2010"));
        assert!(link.contains("00%3A05"));
        assert!(link.ends_with("&embeds[]=https%3A%2F%2Ffarcmind.vercel.app"));
    }

    #[test]
    fn share_hands_text_and_url_to_platform() {
        let mut rec = Recorder::default();
        let m = ShareMessage::new(0, 0, "u");
        share(&mut rec, &m);
        assert_eq!(rec.composed, vec![(m.text.clone(), "u".to_string())]);
        assert_eq!(rec.ready, 0);
    }

    #[test]
    fn terminal_platform_keeps_link_and_readies_once() {
        let mut p = TerminalPlatform::new();
        p.ready();
        p.ready();
        assert!(p.ready_sent);
        share(&mut p, &ShareMessage::new(30, 61, "https://farcmind.vercel.app"));
        assert!(p.last_link.as_deref().unwrap_or("").contains("01%3A01"));
    }
}
