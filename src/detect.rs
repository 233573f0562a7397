use crate::util::{mean, std_dev};

/// Number of recent events examined per evaluation.
pub const MACRO_THRESHOLD: usize = 5;

const MAX_STD_DEV_MS: f64 = 5.0;
const MAX_MEAN_MS: f64 = 100.0;

/// Inspect the most recent inter-input intervals for the statistical
/// regularity of scripted input.
///
/// `intervals_ms` is the interval column of the history, most-recent-first.
/// Only the first `MACRO_THRESHOLD` entries are considered and zero intervals
/// (first event of a session or input switch) are ignored. Returns None when
/// there is not enough data for a determination; callers keep their previous
/// warning state in that case.
pub fn evaluate(intervals_ms: &[u64]) -> Option<bool> {
    let recent: Vec<f64> = intervals_ms
        .iter()
        .take(MACRO_THRESHOLD)
        .filter(|&&t| t > 0)
        .map(|&t| t as f64)
        .collect();

    if recent.len() < MACRO_THRESHOLD {
        return None;
    }

    let avg = mean(&recent)?;
    let sd = std_dev(&recent)?;

    Some(sd < MAX_STD_DEV_MS && avg < MAX_MEAN_MS)
}
