use crate::estimator::{self, Bookmark};
use crate::util::std_dev;
use std::time::SystemTime;

/// One wpm sample taken at tap time; feeds the results chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TapPoint {
    pub at_secs: f64,
    pub wpm: f64,
}

/// A single reading run over a fixed passage.
///
/// Two states: idle and running. `start` enters running, `reset` leaves it
/// from anywhere, and tapping the final word leaves it automatically while
/// keeping the bookmark and estimate for the results screen. The elapsed time
/// is recomputed from `started_at` on every tick rather than accumulated, so
/// its precision is bounded by the tick interval.
#[derive(Debug, Clone)]
pub struct Session {
    word_count: usize,
    running: bool,
    started_at: Option<SystemTime>,
    elapsed_ms: u64,
    bookmark: Bookmark,
    estimate_wpm: f64,
    completed: bool,
    taps: Vec<TapPoint>,
}

impl Session {
    pub fn new(word_count: usize) -> Self {
        Self {
            word_count,
            running: false,
            started_at: None,
            elapsed_ms: 0,
            bookmark: Bookmark::default(),
            estimate_wpm: 0.0,
            completed: false,
            taps: Vec::new(),
        }
    }

    /// Begin the run. No-op while already running.
    pub fn start(&mut self, now: SystemTime) {
        if self.running {
            return;
        }
        self.started_at = Some(now);
        self.running = true;
    }

    /// Recompute the elapsed time from the start instant. The clock stops the
    /// moment `running` is false, so a tick that races a reset reads current
    /// state and does nothing.
    pub fn on_tick(&mut self, now: SystemTime) {
        if !self.running {
            return;
        }
        if let Some(started_at) = self.started_at {
            self.elapsed_ms = now
                .duration_since(started_at)
                .unwrap_or_default()
                .as_millis() as u64;
        }
    }

    /// Fold a tap of `index` into the estimate and bookmark. Ignored while
    /// idle (the bookmark stays frozen) and for out-of-range indices. Tapping
    /// the final word ends the run after the update, leaving bookmark and
    /// estimate in place.
    pub fn tap(&mut self, index: usize) {
        if !self.running || index >= self.word_count {
            return;
        }

        let (wpm, bookmark) =
            estimator::advance(self.estimate_wpm, self.bookmark, self.elapsed_ms, index);
        self.estimate_wpm = wpm;
        self.bookmark = bookmark;
        self.taps.push(TapPoint {
            at_secs: self.elapsed_ms as f64 / 1000.0,
            wpm,
        });

        if index + 1 == self.word_count {
            self.running = false;
            self.completed = true;
        }
    }

    /// Restore the exact initial state, from any prior state.
    pub fn reset(&mut self) {
        *self = Self::new(self.word_count);
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn has_started(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn has_completed(&self) -> bool {
        self.completed
    }

    pub fn word_count(&self) -> usize {
        self.word_count
    }

    pub fn bookmark(&self) -> Bookmark {
        self.bookmark
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed_ms as f64 / 1000.0
    }

    pub fn wpm(&self) -> f64 {
        self.estimate_wpm
    }

    pub fn taps(&self) -> &[TapPoint] {
        &self.taps
    }

    /// Spread of the estimate across taps; 0.0 until there are samples.
    pub fn pace_std_dev(&self) -> f64 {
        let samples: Vec<f64> = self.taps.iter().map(|t| t.wpm).collect();
        std_dev(&samples).unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn at(ms: u64) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_millis(ms)
    }

    #[test]
    fn new_session_is_idle_with_zeroed_state() {
        let session = Session::new(10);
        assert!(!session.is_running());
        assert!(!session.has_started());
        assert!(!session.has_completed());
        assert_eq!(session.elapsed_ms(), 0);
        assert_eq!(session.bookmark(), Bookmark::default());
        assert_eq!(session.wpm(), 0.0);
        assert!(session.taps().is_empty());
    }

    #[test]
    fn start_records_the_instant_and_runs() {
        let mut session = Session::new(10);
        session.start(at(500));
        assert!(session.is_running());
        assert!(session.has_started());
    }

    #[test]
    fn start_is_a_noop_while_running() {
        let mut session = Session::new(10);
        session.start(at(0));
        session.on_tick(at(4000));
        session.start(at(4000));
        // the original start instant is kept
        session.on_tick(at(5000));
        assert_eq!(session.elapsed_ms(), 5000);
    }

    #[test]
    fn tick_recomputes_elapsed_rather_than_accumulating() {
        let mut session = Session::new(10);
        session.start(at(1000));
        session.on_tick(at(1100));
        session.on_tick(at(1100));
        session.on_tick(at(1200));
        assert_eq!(session.elapsed_ms(), 200);
    }

    #[test]
    fn tick_is_inert_while_idle() {
        let mut session = Session::new(10);
        session.on_tick(at(60_000));
        assert_eq!(session.elapsed_ms(), 0);
    }

    #[test]
    fn tap_while_idle_keeps_bookmark_frozen() {
        let mut session = Session::new(10);
        session.tap(3);
        assert_eq!(session.bookmark(), Bookmark::default());
        assert_eq!(session.wpm(), 0.0);
        assert!(session.taps().is_empty());
    }

    #[test]
    fn tap_updates_bookmark_and_estimate() {
        let mut session = Session::new(100);
        session.start(at(0));
        session.on_tick(at(6000));
        session.tap(0);
        assert_eq!(session.wpm(), 5.0);
        assert_eq!(
            session.bookmark(),
            Bookmark {
                word_index: 1,
                elapsed_ms: 6000
            }
        );
        assert_eq!(session.taps().len(), 1);
        assert_eq!(session.taps()[0].at_secs, 6.0);
    }

    #[test]
    fn bookmark_tracks_every_in_order_tap() {
        let mut session = Session::new(20);
        session.start(at(0));
        for index in 0..10 {
            session.on_tick(at((index as u64 + 1) * 1000));
            session.tap(index);
            assert_eq!(
                session.bookmark(),
                Bookmark {
                    word_index: index + 1,
                    elapsed_ms: (index as u64 + 1) * 1000
                }
            );
        }
        assert!(session.is_running());
    }

    #[test]
    fn elapsed_never_trails_the_bookmark_while_running() {
        let mut session = Session::new(20);
        session.start(at(0));
        for index in 0..10 {
            session.on_tick(at((index as u64 + 1) * 700));
            session.tap(index);
            assert!(session.elapsed_ms() >= session.bookmark().elapsed_ms);
        }
    }

    #[test]
    fn tapping_final_word_ends_the_run_and_keeps_results() {
        let mut session = Session::new(3);
        session.start(at(0));
        session.on_tick(at(1000));
        session.tap(0);
        session.on_tick(at(2000));
        session.tap(1);
        assert!(session.is_running());
        session.on_tick(at(3000));
        session.tap(2);
        assert!(!session.is_running());
        assert!(session.has_completed());
        assert_eq!(session.bookmark().word_index, 3);
        assert!(session.wpm() > 0.0);
    }

    #[test]
    fn final_word_tap_still_updates_the_estimate() {
        let mut session = Session::new(1);
        session.start(at(0));
        session.on_tick(at(6000));
        session.tap(0);
        assert!(session.has_completed());
        assert_eq!(session.wpm(), 5.0);
    }

    #[test]
    fn same_tick_double_tap_keeps_estimate_finite() {
        let mut session = Session::new(10);
        session.start(at(0));
        session.on_tick(at(6000));
        session.tap(0);
        let before = session.wpm();
        session.tap(1);
        assert!(session.wpm().is_finite());
        assert_eq!(session.wpm(), before);
        assert_eq!(session.bookmark().word_index, 2);
    }

    #[test]
    fn out_of_range_tap_is_ignored() {
        let mut session = Session::new(5);
        session.start(at(0));
        session.on_tick(at(1000));
        session.tap(5);
        assert_eq!(session.bookmark(), Bookmark::default());
        assert!(session.is_running());
    }

    #[test]
    fn reset_restores_the_exact_initial_state() {
        let mut session = Session::new(4);
        session.start(at(0));
        session.on_tick(at(2500));
        session.tap(0);
        session.tap(1);
        session.reset();

        assert!(!session.is_running());
        assert!(!session.has_started());
        assert!(!session.has_completed());
        assert_eq!(session.elapsed_ms(), 0);
        assert_eq!(session.bookmark(), Bookmark::default());
        assert_eq!(session.wpm(), 0.0);
        assert!(session.taps().is_empty());
        assert_eq!(session.word_count(), 4);
    }

    #[test]
    fn reset_after_completion_allows_a_fresh_run() {
        let mut session = Session::new(2);
        session.start(at(0));
        session.on_tick(at(1000));
        session.tap(0);
        session.on_tick(at(2000));
        session.tap(1);
        assert!(session.has_completed());

        session.reset();
        session.start(at(10_000));
        assert!(session.is_running());
        assert!(!session.has_completed());
        assert_eq!(session.wpm(), 0.0);
    }

    #[test]
    fn pace_std_dev_reflects_tap_spread() {
        let mut session = Session::new(100);
        session.start(at(0));
        session.on_tick(at(6000));
        session.tap(0);
        session.on_tick(at(12_000));
        session.tap(1);
        // samples are 5.0 and 7.5
        assert!((session.pace_std_dev() - 1.25).abs() < 1e-9);
    }

    #[test]
    fn pace_std_dev_defaults_to_zero() {
        let session = Session::new(5);
        assert_eq!(session.pace_std_dev(), 0.0);
    }
}
