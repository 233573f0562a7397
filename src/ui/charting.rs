/// Compute X (seconds) and Y (CPS) bounds for the performance chart
pub fn compute_chart_params(points: &[(f64, f64)], duration_secs: u64) -> (f64, f64) {
    let mut highest_cps = 0.0;
    for &(_, cps) in points {
        if cps > highest_cps {
            highest_cps = cps;
        }
    }

    let mut overall_duration = match points.last() {
        Some(p) => p.0,
        None => duration_secs as f64,
    };
    if overall_duration < 1.0 {
        overall_duration = 1.0;
    }

    (overall_duration, highest_cps.max(10.0).ceil())
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.2}")
    }
}
