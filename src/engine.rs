//! The classification engine: CSV loading, per-group aggregation and the
//! full-batch runner.
//!
//! Each run is a pure transformation from an input dataset to an annotated
//! record-level table, a per-group classification table and a text report.
//! The engine holds no state between runs beyond its base path and config.

use std::path::PathBuf;

use polars::datatypes::TimeUnit;
use polars::prelude::StrptimeOptions;
use polars::prelude::*;

use tracing::info;

use crate::config::ClassifierConfig;
use crate::error::{ClassifyError, Result};
use crate::location;
use crate::pattern::{classify, DemandPattern};
use crate::report;
use crate::schema::{classification, transaction};
use crate::stats;

/// Per-(part, location) classification result. One row of the
/// classification table.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationRecord {
    pub part_sku: String,
    pub location_id: String,
    pub cv: f64,
    pub adi: f64,
    pub pattern: DemandPattern,
    pub total_demand: f64,
    pub mean_demand: f64,
    pub std_demand: f64,
    pub periods_with_demand: u32,
    pub total_periods: u32,
    pub zero_demand_ratio: f64,
}

/// Result of one classification run.
#[derive(Debug, Clone)]
pub struct ClassificationOutput {
    /// Record-level table: every input row plus pattern/cv/adi. Same row
    /// count as the input.
    pub annotated: DataFrame,
    /// Group-level table: one row per (part, location).
    pub classification: DataFrame,
    /// The classification rows as structs, in (part, location) order.
    pub records: Vec<ClassificationRecord>,
}

pub struct DemandClassifier {
    base_path: PathBuf,
    config: ClassifierConfig,
}

impl DemandClassifier {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self::with_config(base_path, ClassifierConfig::default())
    }

    pub fn with_config(base_path: impl Into<PathBuf>, config: ClassifierConfig) -> Self {
        Self {
            base_path: base_path.into(),
            config,
        }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    // ── Data loading ────────────────────────────────────────────────────────

    /// Load the transaction CSV with all columns as strings and validate
    /// its shape. `filename` defaults to the configured input file.
    ///
    /// Required columns: part_sku, quantity_sold, date, and either
    /// location_id or one-hot location indicator columns.
    pub fn load_transactions(&self, filename: Option<&str>) -> Result<DataFrame> {
        let fname = filename.unwrap_or(self.config.input_file.as_str());
        let df = self.read_csv_as_strings(fname)?;
        self.validate_shape(&df)?;
        info!(rows = df.height(), file = fname, "loaded transaction dataset");
        Ok(df)
    }

    // ── Classification pipeline ─────────────────────────────────────────────

    /// Classify demand patterns per (part, location) group.
    ///
    /// Normalizes dates, reconciles the location column if the input is
    /// one-hot encoded, sorts by (part, location, date), computes per-group
    /// statistics and broadcasts pattern/cv/adi back onto every row.
    ///
    /// Degenerate groups (all-zero or single-point series) classify as
    /// Unknown or with degenerate statistics; they are never dropped.
    pub fn classify_dataset(&self, df: &DataFrame) -> Result<ClassificationOutput> {
        self.validate_shape(df)?;

        let mut working = self.normalize_dates(df.clone())?;
        working = working
            .lazy()
            .with_columns([col(transaction::QUANTITY_SOLD).cast(DataType::Float64)])
            .collect()?;

        if location::needs_reconciliation(&working, &self.config) {
            let indicators = location::indicator_columns(&working, &self.config).len();
            info!(indicators, "reconstructing location_id from one-hot columns");
            working = location::reconcile(&working, &self.config)?;
        }

        // Row order within a group is the series order, so sort first.
        let sorted = working
            .lazy()
            .sort(
                vec![
                    transaction::PART_SKU,
                    transaction::LOCATION_ID,
                    transaction::DATE,
                ],
                SortMultipleOptions::default(),
            )
            .collect()?;

        let groups = sorted.partition_by_stable(
            vec![transaction::PART_SKU, transaction::LOCATION_ID],
            true,
        )?;

        let mut records: Vec<ClassificationRecord> = groups
            .iter()
            .map(|group| self.classify_group(group))
            .collect::<Result<_>>()?;
        records.sort_by(|a, b| {
            (a.part_sku.as_str(), a.location_id.as_str())
                .cmp(&(b.part_sku.as_str(), b.location_id.as_str()))
        });

        let classification = records_to_dataframe(&records)?;

        // Broadcast join: every input row gets its group's fields, row
        // count unchanged.
        let annotated = sorted
            .lazy()
            .join(
                classification.clone().lazy().select([
                    col(transaction::PART_SKU),
                    col(transaction::LOCATION_ID),
                    col(classification::DEMAND_PATTERN),
                    col(classification::CV),
                    col(classification::ADI),
                ]),
                [col(transaction::PART_SKU), col(transaction::LOCATION_ID)],
                [col(transaction::PART_SKU), col(transaction::LOCATION_ID)],
                JoinArgs::new(JoinType::Left),
            )
            .collect()?;

        info!(
            groups = records.len(),
            rows = annotated.height(),
            "classified demand patterns"
        );

        Ok(ClassificationOutput {
            annotated,
            classification,
            records,
        })
    }

    /// Full batch run: load the configured input, classify, and write the
    /// annotated CSV, the classification CSV and the text report to the
    /// base path. Outputs are only written once the whole dataset has been
    /// classified.
    pub fn run(&self) -> Result<ClassificationOutput> {
        let df = self.load_transactions(None)?;
        let mut output = self.classify_dataset(&df)?;
        let report = report::render_now(&output.records, &output.annotated)?;
        self.write_outputs(&mut output, &report)?;
        Ok(output)
    }

    /// Write both tables and the report to the base path.
    pub fn write_outputs(&self, output: &mut ClassificationOutput, report: &str) -> Result<()> {
        self.write_csv(&mut output.annotated, &self.config.annotated_file)?;
        self.write_csv(&mut output.classification, &self.config.classification_file)?;

        let report_path = self.base_path.join(&self.config.report_file);
        std::fs::write(&report_path, report)?;
        info!(path = %report_path.display(), "wrote classification report");
        Ok(())
    }

    // ── Private helpers ─────────────────────────────────────────────────────

    fn classify_group(&self, group: &DataFrame) -> Result<ClassificationRecord> {
        let first_str = |name: &str| -> Result<String> {
            group
                .column(name)?
                .str()?
                .get(0)
                .map(|s| s.to_string())
                .ok_or_else(|| ClassifyError::InvalidData(format!("null {name} in group")))
        };
        let part_sku = first_str(transaction::PART_SKU)?;
        let location_id = first_str(transaction::LOCATION_ID)?;

        let quantities = group.column(transaction::QUANTITY_SOLD)?.f64()?;
        let series: Vec<f64> = quantities.iter().map(|q| q.unwrap_or(0.0)).collect();

        let cv = stats::coefficient_of_variation(&series);
        let adi = stats::average_demand_interval(&series);
        let pattern = classify(cv, adi, &self.config.thresholds);

        let total_periods = series.len();
        let periods_with_demand = series.iter().filter(|&&q| q > 0.0).count();
        let zero_demand_ratio = if total_periods > 0 {
            1.0 - periods_with_demand as f64 / total_periods as f64
        } else {
            0.0
        };

        Ok(ClassificationRecord {
            part_sku,
            location_id,
            cv,
            adi,
            pattern,
            total_demand: series.iter().sum(),
            mean_demand: stats::mean(&series),
            std_demand: stats::population_std(&series),
            periods_with_demand: periods_with_demand as u32,
            total_periods: total_periods as u32,
            zero_demand_ratio,
        })
    }

    /// Read a CSV file with all columns as String dtype and trimmed
    /// column names.
    fn read_csv_as_strings(&self, filename: &str) -> Result<DataFrame> {
        let path = self.base_path.join(filename);
        let mut df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(0)) // all columns as String
            .try_into_reader_with_file_path(Some(path))?
            .finish()?;

        let trimmed: Vec<String> = df
            .get_column_names_str()
            .iter()
            .map(|c| c.trim().to_string())
            .collect();
        df.set_column_names(trimmed.as_slice())?;

        Ok(df)
    }

    /// Structural validation; any failure here aborts before group work.
    fn validate_shape(&self, df: &DataFrame) -> Result<()> {
        for &name in &[
            transaction::PART_SKU,
            transaction::QUANTITY_SOLD,
            transaction::DATE,
        ] {
            if df.column(name).is_err() {
                return Err(ClassifyError::MissingColumn(name.to_string()));
            }
        }
        if df.column(transaction::LOCATION_ID).is_err()
            && location::indicator_columns(df, &self.config).is_empty()
        {
            return Err(ClassifyError::NoLocation(
                transaction::LOCATION_ID.to_string(),
                self.config.onehot_prefix.clone(),
            ));
        }
        Ok(())
    }

    /// Parse a string `date` column to Datetime using the configured
    /// format. Columns that are already temporal pass through unchanged.
    fn normalize_dates(&self, df: DataFrame) -> Result<DataFrame> {
        let dtype = df.column(transaction::DATE)?.dtype().clone();
        if dtype != DataType::String {
            return Ok(df);
        }
        let df = df
            .lazy()
            .with_columns([col(transaction::DATE)
                .str()
                .strip_chars(lit(" \t\r\n"))
                .str()
                .to_datetime(
                    Some(TimeUnit::Microseconds),
                    None,
                    StrptimeOptions {
                        format: Some(self.config.date_format.as_str().into()),
                        strict: true,
                        ..Default::default()
                    },
                    lit("raise"),
                )])
            .collect()?;
        Ok(df)
    }

    fn write_csv(&self, df: &mut DataFrame, filename: &str) -> Result<()> {
        let path = self.base_path.join(filename);
        let mut file = std::fs::File::create(&path)?;
        CsvWriter::new(&mut file).include_header(true).finish(df)?;
        info!(path = %path.display(), rows = df.height(), "wrote CSV output");
        Ok(())
    }
}

/// Build the classification DataFrame from the record list.
fn records_to_dataframe(records: &[ClassificationRecord]) -> Result<DataFrame> {
    let part_sku: Vec<&str> = records.iter().map(|r| r.part_sku.as_str()).collect();
    let location_id: Vec<&str> = records.iter().map(|r| r.location_id.as_str()).collect();
    let cv: Vec<f64> = records.iter().map(|r| r.cv).collect();
    let adi: Vec<f64> = records.iter().map(|r| r.adi).collect();
    let pattern: Vec<&str> = records.iter().map(|r| r.pattern.as_str()).collect();
    let total: Vec<f64> = records.iter().map(|r| r.total_demand).collect();
    let mean: Vec<f64> = records.iter().map(|r| r.mean_demand).collect();
    let std: Vec<f64> = records.iter().map(|r| r.std_demand).collect();
    let with_demand: Vec<u32> = records.iter().map(|r| r.periods_with_demand).collect();
    let periods: Vec<u32> = records.iter().map(|r| r.total_periods).collect();
    let zero_ratio: Vec<f64> = records.iter().map(|r| r.zero_demand_ratio).collect();

    let df = DataFrame::new(vec![
        Series::new(transaction::PART_SKU.into(), part_sku).into(),
        Series::new(transaction::LOCATION_ID.into(), location_id).into(),
        Series::new(classification::CV.into(), cv).into(),
        Series::new(classification::ADI.into(), adi).into(),
        Series::new(classification::DEMAND_PATTERN.into(), pattern).into(),
        Series::new(classification::TOTAL_DEMAND.into(), total).into(),
        Series::new(classification::MEAN_DEMAND.into(), mean).into(),
        Series::new(classification::STD_DEMAND.into(), std).into(),
        Series::new(classification::PERIODS_WITH_DEMAND.into(), with_demand).into(),
        Series::new(classification::TOTAL_PERIODS.into(), periods).into(),
        Series::new(classification::ZERO_DEMAND_RATIO.into(), zero_ratio).into(),
    ])?;
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> DemandClassifier {
        DemandClassifier::new(".")
    }

    fn sample_frame() -> DataFrame {
        df![
            "part_sku" => ["P1", "P1", "P1", "P2", "P2", "P2"],
            "location_id" => ["L1", "L1", "L1", "L1", "L1", "L1"],
            "date" => ["2024-01-03", "2024-01-01", "2024-01-02",
                       "2024-01-01", "2024-01-02", "2024-01-03"],
            "quantity_sold" => [5i64, 5, 5, 0, 10, 0],
        ]
        .unwrap()
    }

    #[test]
    fn missing_column_is_fatal() {
        let df = df!["part_sku" => ["P1"], "date" => ["2024-01-01"]].unwrap();
        let err = engine().classify_dataset(&df).unwrap_err();
        assert!(matches!(err, ClassifyError::MissingColumn(c) if c == "quantity_sold"));
    }

    #[test]
    fn missing_location_information_is_fatal() {
        let df = df![
            "part_sku" => ["P1"],
            "date" => ["2024-01-01"],
            "quantity_sold" => [1i64],
        ]
        .unwrap();
        let err = engine().classify_dataset(&df).unwrap_err();
        assert!(matches!(err, ClassifyError::NoLocation(_, _)));
    }

    #[test]
    fn one_row_per_group_in_classification_table() {
        let out = engine().classify_dataset(&sample_frame()).unwrap();
        assert_eq!(out.classification.height(), 2);
        assert_eq!(out.records.len(), 2);
    }

    #[test]
    fn annotated_preserves_row_count() {
        let df = sample_frame();
        let out = engine().classify_dataset(&df).unwrap();
        assert_eq!(out.annotated.height(), df.height());
        for name in ["demand_pattern", "cv", "adi"] {
            assert!(out.annotated.column(name).is_ok());
        }
    }

    #[test]
    fn all_rows_of_a_group_share_classification() {
        let out = engine().classify_dataset(&sample_frame()).unwrap();
        let sku = out.annotated.column("part_sku").unwrap().str().unwrap();
        let pat = out
            .annotated
            .column("demand_pattern")
            .unwrap()
            .str()
            .unwrap();
        let p1: Vec<&str> = sku
            .iter()
            .zip(pat.iter())
            .filter(|(s, _)| *s == Some("P1"))
            .map(|(_, p)| p.unwrap())
            .collect();
        assert_eq!(p1.len(), 3);
        assert!(p1.iter().all(|&p| p == p1[0]));
    }

    #[test]
    fn all_zero_group_is_unknown_not_an_error() {
        let df = df![
            "part_sku" => ["P1", "P1", "P1"],
            "location_id" => ["L1", "L1", "L1"],
            "date" => ["2024-01-01", "2024-01-02", "2024-01-03"],
            "quantity_sold" => [0i64, 0, 0],
        ]
        .unwrap();
        let out = engine().classify_dataset(&df).unwrap();
        let rec = &out.records[0];
        assert_eq!(rec.pattern, DemandPattern::Unknown);
        assert!(rec.cv.is_nan());
        assert!(rec.adi.is_nan());
        assert_eq!(rec.zero_demand_ratio, 1.0);
    }

    #[test]
    fn single_point_group_still_classifies() {
        let df = df![
            "part_sku" => ["P1"],
            "location_id" => ["L1"],
            "date" => ["2024-01-01"],
            "quantity_sold" => [7i64],
        ]
        .unwrap();
        let out = engine().classify_dataset(&df).unwrap();
        let rec = &out.records[0];
        assert_eq!(rec.pattern, DemandPattern::Smooth);
        assert_eq!(rec.total_periods, 1);
    }

    #[test]
    fn group_statistics_match_hand_computation() {
        let out = engine().classify_dataset(&sample_frame()).unwrap();
        // Records are sorted by (part_sku, location_id): P1/L1 then P2/L1.
        let p2 = &out.records[1];
        assert_eq!(p2.total_demand, 10.0);
        assert!((p2.mean_demand - 10.0 / 3.0).abs() < 1e-12);
        assert_eq!(p2.periods_with_demand, 1);
        assert_eq!(p2.total_periods, 3);
        assert_eq!(p2.adi, 3.0);
        assert!((p2.zero_demand_ratio - 2.0 / 3.0).abs() < 1e-12);
    }
}
