use crate::schema::onehot;

/// Classification thresholds for the CV/ADI quadrant scheme.
///
/// Boundary values belong to the `>=` branch (see [`crate::pattern::classify`]).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub cv: f64,
    pub adi: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self { cv: 0.5, adi: 1.32 }
    }
}

/// Engine configuration.
///
/// Everything that was a module-level constant in earlier revisions lives
/// here so the same engine can run with different thresholds, encodings or
/// file names without touching process-wide state.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    pub thresholds: Thresholds,
    /// Prefix of one-hot location indicator columns.
    pub onehot_prefix: String,
    /// Location code assigned when no indicator is set for a row.
    pub default_location: String,
    /// strptime format used to parse a string `date` column.
    pub date_format: String,
    /// Default input file name, relative to the engine base path.
    pub input_file: String,
    /// Output file names, relative to the engine base path.
    pub annotated_file: String,
    pub classification_file: String,
    pub report_file: String,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            onehot_prefix: onehot::LOCATION_PREFIX.to_string(),
            default_location: onehot::DEFAULT_LOCATION.to_string(),
            date_format: "%Y-%m-%d".to_string(),
            input_file: "encoded_dataset_model_ready.csv".to_string(),
            annotated_file: "classified_demand_dataset.csv".to_string(),
            classification_file: "demand_classification.csv".to_string(),
            report_file: "demand_classification_report.txt".to_string(),
        }
    }
}
