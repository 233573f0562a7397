/// Human-average clicks-per-second baseline used for comparisons.
pub const AVERAGE_CPS: f64 = 6.5;

/// How far off the baseline a rate must be before it stops being "average".
const COMPARISON_MARGIN_PCT: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Above,
    Below,
    Average,
}

/// A classified rate, ready for display.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub category: Comparison,
    pub label: String,
}

/// Compare a CPS value against the human-average baseline.
///
/// Returns None for a zero rate (no session yet). The label carries the
/// rounded percentage deviation, or the plain "Average speed" caption when
/// the rate is within the margin.
pub fn classify(cps: f64) -> Option<Classification> {
    if cps == 0.0 {
        return None;
    }

    let diff = ((cps - AVERAGE_CPS) / AVERAGE_CPS) * 100.0;

    let classification = if diff > COMPARISON_MARGIN_PCT {
        Classification {
            category: Comparison::Above,
            label: format!("{diff:.0}% above average"),
        }
    } else if diff < -COMPARISON_MARGIN_PCT {
        Classification {
            category: Comparison::Below,
            label: format!("{:.0}% below average", diff.abs()),
        }
    } else {
        Classification {
            category: Comparison::Average,
            label: "Average speed".to_string(),
        }
    };

    Some(classification)
}
