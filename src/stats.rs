//! Demand-series statistics.
//!
//! Pure functions over a quantity series for one (part, location) group.
//! Degenerate inputs never error; undefined statistics come back as
//! `f64::NAN` and are mapped to the Unknown pattern downstream.

/// Arithmetic mean. Empty series returns NaN.
pub fn mean(series: &[f64]) -> f64 {
    if series.is_empty() {
        return f64::NAN;
    }
    series.iter().sum::<f64>() / series.len() as f64
}

/// Population standard deviation (divide by N, not N-1).
///
/// The N divisor is the convention used everywhere in this crate; CV and
/// the per-group `std_demand` column share it.
pub fn population_std(series: &[f64]) -> f64 {
    if series.is_empty() {
        return f64::NAN;
    }
    let m = mean(series);
    let var = series.iter().map(|x| (x - m) * (x - m)).sum::<f64>() / series.len() as f64;
    var.sqrt()
}

/// Coefficient of Variation: population std / mean.
///
/// Returns NaN when the series is empty, sums to zero, or has zero mean.
pub fn coefficient_of_variation(series: &[f64]) -> f64 {
    if series.is_empty() || series.iter().sum::<f64>() == 0.0 {
        return f64::NAN;
    }
    let m = mean(series);
    if m == 0.0 {
        return f64::NAN;
    }
    population_std(series) / m
}

/// Average Demand Interval: total periods / periods with demand > 0.
///
/// Returns NaN when the series is empty or no period has positive demand.
///
/// This is the period-count formula: each entry counts as one period and
/// calendar spacing is ignored. On input with missing periods (gaps rather
/// than explicit zero rows) it diverges from the textbook calendar-gap
/// ADI; callers that need the textbook value must densify first.
pub fn average_demand_interval(series: &[f64]) -> f64 {
    if series.is_empty() {
        return f64::NAN;
    }
    let periods_with_demand = series.iter().filter(|&&q| q > 0.0).count();
    if periods_with_demand == 0 {
        return f64::NAN;
    }
    series.len() as f64 / periods_with_demand as f64
}
