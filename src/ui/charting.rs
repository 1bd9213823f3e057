use crate::session::TapPoint;

/// Compute X (seconds) and Y (wpm) bounds for the results chart
pub fn chart_bounds(taps: &[TapPoint]) -> (f64, f64) {
    let mut highest_wpm = 0.0;
    for point in taps {
        if point.wpm > highest_wpm {
            highest_wpm = point.wpm;
        }
    }

    let mut overall_duration = match taps.last() {
        Some(point) => point.at_secs,
        None => 1.0,
    };
    if overall_duration < 1.0 {
        overall_duration = 1.0;
    }

    (overall_duration, highest_wpm.round())
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.1}")
    }
}
