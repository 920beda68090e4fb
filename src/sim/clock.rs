/// Session timer: whole elapsed seconds of play.
///
/// The counter only moves while a `Ticker` is held. `start` acquires one
/// (a second `start` is a no-op), `stop` releases it and discards the
/// partial unit, and `sync` is the single place the state machine uses to
/// reconcile the ticker with the current phase after every transition.

#[derive(Clone, Debug, PartialEq, Eq)]
struct Ticker {
    carry_ms: u64,
}

#[derive(Clone, Debug)]
pub struct SessionTimer {
    elapsed: u64,
    unit_ms: u64,
    ticker: Option<Ticker>,
}

impl SessionTimer {
    pub fn new(unit_ms: u64) -> Self {
        SessionTimer { elapsed: 0, unit_ms: unit_ms.max(1), ticker: None }
    }

    pub fn elapsed(&self) -> u64 {
        self.elapsed
    }

    pub fn is_running(&self) -> bool {
        self.ticker.is_some()
    }

    /// Acquire the ticker. Returns false if one was already running.
    pub fn start(&mut self) -> bool {
        if self.ticker.is_some() {
            return false;
        }
        self.ticker = Some(Ticker { carry_ms: 0 });
        true
    }

    pub fn stop(&mut self) {
        self.ticker = None;
    }

    /// Zero the counter. Running state is left to `sync`.
    pub fn reset(&mut self) {
        self.elapsed = 0;
        if let Some(t) = self.ticker.as_mut() {
            t.carry_ms = 0;
        }
    }

    pub fn sync(&mut self, should_run: bool) {
        match (should_run, self.is_running()) {
            (true, false) => {
                self.start();
            }
            (false, true) => self.stop(),
            _ => {}
        }
    }

    /// Feed wall time. Returns how many whole units elapsed.
    pub fn advance(&mut self, dt_ms: u64) -> u64 {
        let unit = self.unit_ms;
        let Some(t) = self.ticker.as_mut() else { return 0 };
        t.carry_ms += dt_ms;
        let ticks = t.carry_ms / unit;
        t.carry_ms %= unit;
        self.elapsed += ticks;
        ticks
    }
}
