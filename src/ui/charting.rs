use itertools::{Itertools, MinMaxResult};
use std::cmp::Ordering;

/// One point per session, numbered from 1
pub fn session_points<I>(values: I) -> Vec<(f64, f64)>
where
    I: IntoIterator<Item = f64>,
{
    values
        .into_iter()
        .enumerate()
        .map(|(i, v)| ((i + 1) as f64, v))
        .collect()
}

/// X bounds for `sessions` points; a single session still gets a usable axis
pub fn x_bounds(sessions: usize) -> [f64; 2] {
    [1.0, (sessions as f64).max(2.0)]
}

/// Y bounds over every series with 10% headroom either side
pub fn y_bounds(series: &[&[(f64, f64)]]) -> [f64; 2] {
    let values = series.iter().flat_map(|s| s.iter().map(|&(_, y)| y));
    let (lo, hi) = match values.minmax_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal)) {
        MinMaxResult::NoElements => return [0.0, 1.0],
        MinMaxResult::OneElement(v) => (v, v),
        MinMaxResult::MinMax(lo, hi) => (lo, hi),
    };

    let pad = if hi > lo {
        (hi - lo) * 0.1
    } else {
        lo.abs().max(1.0) * 0.1
    };
    [lo - pad, hi + pad]
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.2}")
    }
}
