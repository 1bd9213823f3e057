use crate::util::round_to_tenth;

/// The last word tapped and the elapsed time at that tap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Bookmark {
    pub word_index: usize,
    pub elapsed_ms: u64,
}

/// Fold one tap into the running words-per-minute estimate.
///
/// The bookmark always moves to `{tapped_index + 1, elapsed_ms}`. The estimate
/// only advances when the tap covers at least one word in forward order and a
/// nonzero slice of time; a backward, repeated or same-tick tap leaves it
/// untouched, so the returned value is always finite.
///
/// The estimate itself is a 2-point running average: the previous value and
/// the instantaneous speed of the latest interval weigh equally, which lets
/// the display drift toward the current tapping cadence rather than the
/// session-wide mean.
pub fn advance(
    prev_wpm: f64,
    bookmark: Bookmark,
    elapsed_ms: u64,
    tapped_index: usize,
) -> (f64, Bookmark) {
    let next_bookmark = Bookmark {
        word_index: tapped_index + 1,
        elapsed_ms,
    };

    let delta_words = tapped_index as i64 + 1 - bookmark.word_index as i64;
    let delta_ms = elapsed_ms.saturating_sub(bookmark.elapsed_ms);
    if delta_words <= 0 || delta_ms == 0 {
        return (prev_wpm, next_bookmark);
    }

    let delta_minutes = delta_ms as f64 / 60_000.0;
    let instantaneous = delta_words as f64 / delta_minutes;

    (round_to_tenth((prev_wpm + instantaneous) / 2.0), next_bookmark)
}
