use rand::Rng;

/// How often a new word is picked while idle.
pub const PULSE_INTERVAL_MS: u64 = 1000;
/// How long a picked word stays highlighted.
pub const PULSE_TTL_MS: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Pulse {
    word_index: usize,
    remaining_ms: u64,
}

/// Decorative idle-state highlighter: once a second a random word lights up
/// for a second. Driven by the shared tick stream and inert the moment
/// reading starts; never touches session state.
#[derive(Debug, Default)]
pub struct IdlePulse {
    pulse: Option<Pulse>,
    since_last_ms: u64,
}

impl IdlePulse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by one tick of `tick_ms` while idle. Picks a fresh in-range
    /// word every [`PULSE_INTERVAL_MS`] and expires the old one after
    /// [`PULSE_TTL_MS`].
    pub fn on_tick(&mut self, tick_ms: u64, word_count: usize, rng: &mut impl Rng) {
        if let Some(pulse) = &mut self.pulse {
            pulse.remaining_ms = pulse.remaining_ms.saturating_sub(tick_ms);
            if pulse.remaining_ms == 0 {
                self.pulse = None;
            }
        }

        self.since_last_ms += tick_ms;
        if self.since_last_ms >= PULSE_INTERVAL_MS {
            self.since_last_ms = 0;
            if word_count > 0 {
                self.pulse = Some(Pulse {
                    word_index: rng.gen_range(0..word_count),
                    remaining_ms: PULSE_TTL_MS,
                });
            }
        }
    }

    /// Drop any active highlight and restart the cadence; called on the
    /// idle-to-running transition.
    pub fn suspend(&mut self) {
        self.pulse = None;
        self.since_last_ms = 0;
    }

    /// The currently highlighted word, re-checked against `word_count` so a
    /// stale index can never reach a display handle.
    pub fn highlighted(&self, word_count: usize) -> Option<usize> {
        self.pulse
            .map(|pulse| pulse.word_index)
            .filter(|&index| index < word_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const TICK_MS: u64 = 100;

    fn ticks(pulse: &mut IdlePulse, n: usize, word_count: usize, rng: &mut StdRng) {
        for _ in 0..n {
            pulse.on_tick(TICK_MS, word_count, rng);
        }
    }

    #[test]
    fn no_highlight_before_the_first_interval() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut pulse = IdlePulse::new();
        ticks(&mut pulse, 9, 50, &mut rng);
        assert_eq!(pulse.highlighted(50), None);
    }

    #[test]
    fn highlight_appears_after_one_interval() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut pulse = IdlePulse::new();
        ticks(&mut pulse, 10, 50, &mut rng);
        assert!(pulse.highlighted(50).is_some());
    }

    #[test]
    fn highlight_is_replaced_each_interval() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut pulse = IdlePulse::new();
        ticks(&mut pulse, 10, 50, &mut rng);
        let first = pulse.highlighted(50);
        assert!(first.is_some());
        // ttl runs out on the same tick the next pick lands
        ticks(&mut pulse, 10, 50, &mut rng);
        assert!(pulse.highlighted(50).is_some());
    }

    #[test]
    fn sampled_indices_are_always_in_range() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut pulse = IdlePulse::new();
        let word_count = 7;
        for _ in 0..1000 {
            pulse.on_tick(TICK_MS, word_count, &mut rng);
            if let Some(index) = pulse.highlighted(word_count) {
                assert!(index < word_count);
            }
        }
    }

    #[test]
    fn highlighted_rechecks_bounds() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut pulse = IdlePulse::new();
        ticks(&mut pulse, 10, 50, &mut rng);
        assert!(pulse.highlighted(50).is_some());
        // a shrunken word list must not leak an out-of-range index
        assert_eq!(pulse.highlighted(0), None);
    }

    #[test]
    fn empty_passage_never_pulses() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut pulse = IdlePulse::new();
        ticks(&mut pulse, 30, 0, &mut rng);
        assert_eq!(pulse.highlighted(0), None);
    }

    #[test]
    fn suspend_clears_the_highlight_and_cadence() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut pulse = IdlePulse::new();
        ticks(&mut pulse, 10, 50, &mut rng);
        assert!(pulse.highlighted(50).is_some());

        pulse.suspend();
        assert_eq!(pulse.highlighted(50), None);

        // the cadence restarts from zero after a suspend
        ticks(&mut pulse, 9, 50, &mut rng);
        assert_eq!(pulse.highlighted(50), None);
        ticks(&mut pulse, 1, 50, &mut rng);
        assert!(pulse.highlighted(50).is_some());
    }
}
