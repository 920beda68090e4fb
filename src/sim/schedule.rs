/// Delayed transitions on a virtual millisecond clock.
///
/// Every entry carries the round epoch it was scheduled under. The clock
/// only moves when `step::advance` feeds it elapsed time, so tests drive
/// it deterministically and the game loop drives it from wall time.
///
/// Firing order: earliest due time first, ties in scheduling order.
/// A fired entry whose epoch is no longer current must be discarded by
/// the caller; `cancel_all` drops everything pending on restart / exit.

use super::session::CountdownCue;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Action {
    Countdown(CountdownCue),
    RevealPattern,
    HidePattern,
    OpenInput,
    EndPulse,
    ClearShieldFeedback,
    FeedbackDone,
    LevelUpDone,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct TimerId(u64);

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Fired {
    pub id: TimerId,
    pub due_ms: u64,
    pub epoch: u64,
    pub action: Action,
}

#[derive(Clone, Debug)]
struct Entry {
    id: TimerId,
    due_ms: u64,
    epoch: u64,
    action: Action,
}

#[derive(Clone, Debug, Default)]
pub struct Scheduler {
    now_ms: u64,
    next_id: u64,
    pending: Vec<Entry>,
}

impl Scheduler {
    pub fn new() -> Self {
        Scheduler::default()
    }

    pub fn now(&self) -> u64 {
        self.now_ms
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Schedule `action` to fire `delay_ms` from the current clock.
    pub fn schedule(&mut self, delay_ms: u64, epoch: u64, action: Action) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.push(Entry { id, due_ms: self.now_ms + delay_ms, epoch, action });
        id
    }

    /// Cancel one entry. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|e| e.id != id);
        self.pending.len() != before
    }

    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    /// Remove and return the earliest entry due at or before `until`.
    /// The clock moves to that entry's due time, so anything scheduled
    /// while handling it is timed from the moment it fired.
    pub fn pop_due(&mut self, until: u64) -> Option<Fired> {
        let idx = self.pending.iter()
            .enumerate()
            .filter(|(_, e)| e.due_ms <= until)
            .min_by_key(|(_, e)| (e.due_ms, e.id.0))
            .map(|(i, _)| i)?;
        let e = self.pending.remove(idx);
        self.now_ms = self.now_ms.max(e.due_ms);
        Some(Fired { id: e.id, due_ms: e.due_ms, epoch: e.epoch, action: e.action })
    }

    /// Move the clock forward without firing anything.
    pub fn advance_to(&mut self, until: u64) {
        self.now_ms = self.now_ms.max(until);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_in_due_order() {
        let mut s = Scheduler::new();
        s.schedule(300, 1, Action::OpenInput);
        s.schedule(100, 1, Action::HidePattern);
        s.schedule(100, 1, Action::EndPulse);

        let a = s.pop_due(1000).unwrap();
        let b = s.pop_due(1000).unwrap();
        let c = s.pop_due(1000).unwrap();
        assert_eq!((a.action, a.due_ms), (Action::HidePattern, 100));
        assert_eq!((b.action, b.due_ms), (Action::EndPulse, 100));
        assert_eq!((c.action, c.due_ms), (Action::OpenInput, 300));
        assert!(s.pop_due(1000).is_none());
    }

    #[test]
    fn nothing_fires_early() {
        let mut s = Scheduler::new();
        s.schedule(500, 0, Action::FeedbackDone);
        assert!(s.pop_due(499).is_none());
        s.advance_to(499);
        assert_eq!(s.now(), 499);
        assert_eq!(s.pop_due(500).map(|f| f.action), Some(Action::FeedbackDone));
    }

    #[test]
    fn chained_delays_are_relative_to_fire_time() {
        let mut s = Scheduler::new();
        s.schedule(1000, 0, Action::HidePattern);
        let fired = s.pop_due(5000).unwrap();
        assert_eq!(s.now(), fired.due_ms);
        s.schedule(400, 0, Action::OpenInput);
        assert_eq!(s.pop_due(5000).map(|f| f.due_ms), Some(1400));
    }

    #[test]
    fn cancellation() {
        let mut s = Scheduler::new();
        let id = s.schedule(10, 0, Action::LevelUpDone);
        s.schedule(20, 0, Action::RevealPattern);
        assert!(s.cancel(id));
        assert!(!s.cancel(id));
        assert_eq!(s.pending(), 1);
        s.cancel_all();
        assert!(s.pop_due(u64::MAX).is_none());
    }

    #[test]
    fn clock_never_moves_backwards() {
        let mut s = Scheduler::new();
        s.advance_to(1000);
        s.advance_to(10);
        assert_eq!(s.now(), 1000);
    }
}
