//! Location reconciliation for one-hot encoded datasets.
//!
//! Model-ready exports often drop the plain `location_id` column and carry
//! one indicator column per location instead. This module rebuilds the
//! categorical column so the engine can group by (part, location).

use polars::prelude::*;
use tracing::warn;

use crate::config::ClassifierConfig;
use crate::error::{ClassifyError, Result};
use crate::schema::transaction;

/// Indicator column names matching the configured prefix, in DataFrame
/// column order. That order is the scan order, so it must be stable.
pub fn indicator_columns(df: &DataFrame, config: &ClassifierConfig) -> Vec<String> {
    df.get_column_names_str()
        .iter()
        .filter(|c| c.starts_with(config.onehot_prefix.as_str()))
        .map(|c| c.to_string())
        .collect()
}

/// True when the dataset has no plain location column but does carry
/// indicator columns to rebuild it from.
pub fn needs_reconciliation(df: &DataFrame, config: &ClassifierConfig) -> bool {
    df.column(transaction::LOCATION_ID).is_err() && !indicator_columns(df, config).is_empty()
}

/// Rebuild `location_id` from one-hot indicator columns.
///
/// Per row, one left-to-right pass over the ordered indicator list: the
/// first indicator equal to 1 wins, and its column name minus the prefix
/// is the location code. Rows with no indicator set get the configured
/// default code. Rows with several indicators set resolve to the first in
/// scan order. Both conditions are data-quality facts, logged but never
/// errors.
///
/// Returns a new DataFrame with the `location_id` column appended; the
/// indicator columns are left untouched.
pub fn reconcile(df: &DataFrame, config: &ClassifierConfig) -> Result<DataFrame> {
    let names = indicator_columns(df, config);
    if names.is_empty() {
        return Err(ClassifyError::NoLocation(
            transaction::LOCATION_ID.to_string(),
            config.onehot_prefix.clone(),
        ));
    }

    // Indicators may arrive as strings (CSV) or integers; compare as f64.
    let indicators: Vec<Float64Chunked> = names
        .iter()
        .map(|name| {
            let s = df
                .column(name)?
                .as_materialized_series()
                .cast(&DataType::Float64)?;
            Ok(s.f64()?.clone())
        })
        .collect::<Result<Vec<_>>>()?;

    let codes: Vec<&str> = names
        .iter()
        .map(|name| &name[config.onehot_prefix.len()..])
        .collect();

    let mut assigned: Vec<&str> = Vec::with_capacity(df.height());
    let mut defaulted = 0usize;
    let mut multiple = 0usize;

    for row in 0..df.height() {
        let mut set_count = 0usize;
        let mut code: Option<&str> = None;
        for (ind, c) in indicators.iter().zip(codes.iter().copied()) {
            if ind.get(row) == Some(1.0) {
                set_count += 1;
                if code.is_none() {
                    code = Some(c);
                }
            }
        }
        if set_count > 1 {
            multiple += 1;
        }
        assigned.push(code.unwrap_or_else(|| {
            defaulted += 1;
            config.default_location.as_str()
        }));
    }

    if defaulted > 0 {
        warn!(
            rows = defaulted,
            default = %config.default_location,
            "rows with no location indicator set; assigned default location"
        );
    }
    if multiple > 0 {
        warn!(
            rows = multiple,
            "rows with multiple location indicators set; first in column order wins"
        );
    }

    let mut out = df.clone();
    out.with_column(Series::new(transaction::LOCATION_ID.into(), assigned))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn onehot_frame() -> DataFrame {
        df![
            "part_sku" => ["P1", "P1", "P2", "P2"],
            "location_id_LOC_002" => [1i64, 0, 0, 1],
            "location_id_LOC_003" => [0i64, 1, 0, 1],
        ]
        .unwrap()
    }

    #[test]
    fn rebuilds_codes_from_indicators() {
        let df = onehot_frame();
        let config = ClassifierConfig::default();
        assert!(needs_reconciliation(&df, &config));

        let out = reconcile(&df, &config).unwrap();
        let loc = out.column("location_id").unwrap().str().unwrap();
        assert_eq!(loc.get(0), Some("LOC_002"));
        assert_eq!(loc.get(1), Some("LOC_003"));
    }

    #[test]
    fn no_indicator_set_falls_back_to_default() {
        let df = onehot_frame();
        let out = reconcile(&df, &ClassifierConfig::default()).unwrap();
        let loc = out.column("location_id").unwrap().str().unwrap();
        assert_eq!(loc.get(2), Some("LOC_001"));
    }

    #[test]
    fn multiple_indicators_resolve_to_first_in_order() {
        let df = onehot_frame();
        let out = reconcile(&df, &ClassifierConfig::default()).unwrap();
        let loc = out.column("location_id").unwrap().str().unwrap();
        assert_eq!(loc.get(3), Some("LOC_002"));
    }

    #[test]
    fn reconciliation_is_deterministic() {
        let df = onehot_frame();
        let config = ClassifierConfig::default();
        let a = reconcile(&df, &config).unwrap();
        let b = reconcile(&df, &config).unwrap();
        assert!(a
            .column("location_id")
            .unwrap()
            .as_materialized_series()
            .equals(b.column("location_id").unwrap().as_materialized_series()));
    }

    #[test]
    fn indicator_columns_are_not_mutated() {
        let df = onehot_frame();
        let out = reconcile(&df, &ClassifierConfig::default()).unwrap();
        assert!(out
            .column("location_id_LOC_002")
            .unwrap()
            .as_materialized_series()
            .equals(df.column("location_id_LOC_002").unwrap().as_materialized_series()));
    }

    #[test]
    fn existing_location_column_disables_reconciliation() {
        let df = df![
            "part_sku" => ["P1"],
            "location_id" => ["LOC_009"],
            "location_id_LOC_002" => [1i64],
        ]
        .unwrap();
        assert!(!needs_reconciliation(&df, &ClassifierConfig::default()));
    }
}
