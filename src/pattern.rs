//! Demand-pattern categories and the CV/ADI quadrant classifier.

use std::fmt;

use crate::config::Thresholds;

/// The four canonical spare-parts demand patterns plus Unknown for groups
/// whose statistics are undefined.
///
/// The `as_str` labels are written verbatim into output tables and the
/// report; downstream consumers match on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DemandPattern {
    Smooth,
    Erratic,
    Intermittent,
    Lumpy,
    Unknown,
}

impl DemandPattern {
    /// Fixed report ordering over all five categories.
    pub const ALL: [DemandPattern; 5] = [
        DemandPattern::Smooth,
        DemandPattern::Erratic,
        DemandPattern::Intermittent,
        DemandPattern::Lumpy,
        DemandPattern::Unknown,
    ];

    /// The four named categories (Unknown excluded).
    pub const NAMED: [DemandPattern; 4] = [
        DemandPattern::Smooth,
        DemandPattern::Erratic,
        DemandPattern::Intermittent,
        DemandPattern::Lumpy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DemandPattern::Smooth => "Smooth",
            DemandPattern::Erratic => "Erratic",
            DemandPattern::Intermittent => "Intermittent",
            DemandPattern::Lumpy => "Lumpy",
            DemandPattern::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for DemandPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a (CV, ADI) pair into a demand pattern.
///
/// Quadrants (boundary values always take the `>=` branch):
///
/// |            | ADI < t.adi | ADI >= t.adi |
/// |------------|-------------|--------------|
/// | CV < t.cv  | Smooth      | Intermittent |
/// | CV >= t.cv | Erratic     | Lumpy        |
///
/// NaN in either input yields Unknown.
pub fn classify(cv: f64, adi: f64, thresholds: &Thresholds) -> DemandPattern {
    if cv.is_nan() || adi.is_nan() {
        return DemandPattern::Unknown;
    }
    match (cv < thresholds.cv, adi < thresholds.adi) {
        (true, true) => DemandPattern::Smooth,
        (false, true) => DemandPattern::Erratic,
        (true, false) => DemandPattern::Intermittent,
        (false, false) => DemandPattern::Lumpy,
    }
}
