//! Plain-text classification report.
//!
//! Deterministic, ordered document summarizing the classification run at
//! group level and record level. Category ordering and label strings are
//! fixed; absent categories render with zero counts rather than being
//! omitted.

use std::collections::{HashMap, HashSet};

use chrono::{Local, NaiveDateTime};
use polars::prelude::*;

use crate::engine::ClassificationRecord;
use crate::error::Result;
use crate::pattern::DemandPattern;
use crate::schema::transaction;

const RULE_HEAVY: &str =
    "================================================================================";
const RULE_LIGHT: &str =
    "--------------------------------------------------------------------------------";

/// Render the report with the current local time as generation timestamp.
pub fn render_now(records: &[ClassificationRecord], annotated: &DataFrame) -> Result<String> {
    render(records, annotated, Local::now().naive_local())
}

/// Render the classification report.
///
/// `records` drives the group-level sections; `annotated` drives the
/// dataset-level and record-level sections. The timestamp is a parameter
/// so output is reproducible under test.
pub fn render(
    records: &[ClassificationRecord],
    annotated: &DataFrame,
    generated_at: NaiveDateTime,
) -> Result<String> {
    let mut lines: Vec<String> = Vec::new();
    lines.push(RULE_HEAVY.to_string());
    lines.push("DEMAND PATTERN CLASSIFICATION REPORT".to_string());
    lines.push(RULE_HEAVY.to_string());
    lines.push(format!(
        "Generated: {}",
        generated_at.format("%Y-%m-%d %H:%M:%S")
    ));
    lines.push(String::new());

    // ── Group-level distribution ────────────────────────────────────────
    lines.push("CLASSIFICATION DISTRIBUTION".to_string());
    lines.push(RULE_LIGHT.to_string());

    let mut group_counts: HashMap<DemandPattern, usize> = HashMap::new();
    for rec in records {
        *group_counts.entry(rec.pattern).or_insert(0) += 1;
    }
    let total_groups = records.len();
    for pattern in DemandPattern::ALL {
        let count = group_counts.get(&pattern).copied().unwrap_or(0);
        lines.push(format!(
            "{:<15}: {:>5} SKU-Locations ({:>5.2}%)",
            pattern.as_str(),
            count,
            percentage(count, total_groups)
        ));
    }

    lines.push(String::new());
    lines.push(format!("Total SKU-Locations: {}", total_groups));
    lines.push(String::new());

    // ── Per-pattern statistics ──────────────────────────────────────────
    lines.push("STATISTICS BY DEMAND PATTERN".to_string());
    lines.push(RULE_LIGHT.to_string());

    for pattern in DemandPattern::NAMED {
        let members: Vec<&ClassificationRecord> =
            records.iter().filter(|r| r.pattern == pattern).collect();
        if members.is_empty() {
            continue;
        }
        lines.push(String::new());
        lines.push(format!("{} Demand:", pattern.as_str()));
        lines.push(format!("  Count: {}", members.len()));
        lines.push(format!(
            "  Mean CV: {:.4}",
            mean_of(&members, |r| r.cv)
        ));
        lines.push(format!(
            "  Mean ADI: {:.4}",
            mean_of(&members, |r| r.adi)
        ));
        lines.push(format!(
            "  Mean Total Demand: {:.2}",
            mean_of(&members, |r| r.total_demand)
        ));
        lines.push(format!(
            "  Mean Zero Demand Ratio: {:.4}",
            mean_of(&members, |r| r.zero_demand_ratio)
        ));
    }

    // ── Dataset-level counts ────────────────────────────────────────────
    lines.push(String::new());
    lines.push("DATASET-LEVEL STATISTICS".to_string());
    lines.push(RULE_LIGHT.to_string());
    lines.push(format!(
        "Total records: {}",
        with_thousands(annotated.height())
    ));
    lines.push(format!(
        "Unique SKUs: {}",
        unique_count(annotated, transaction::PART_SKU)?
    ));
    lines.push(format!(
        "Unique Locations: {}",
        unique_count(annotated, transaction::LOCATION_ID)?
    ));
    lines.push(format!(
        "Unique SKU-Location combinations: {}",
        total_groups
    ));

    // ── Record-level distribution ───────────────────────────────────────
    lines.push(String::new());
    lines.push("RECORD-LEVEL PATTERN DISTRIBUTION".to_string());
    lines.push(RULE_LIGHT.to_string());

    let pattern_col = annotated
        .column(crate::schema::classification::DEMAND_PATTERN)?
        .str()?;
    let mut record_counts: HashMap<&str, usize> = HashMap::new();
    for value in pattern_col.iter().flatten() {
        *record_counts.entry(value).or_insert(0) += 1;
    }
    let total_records = annotated.height();
    for pattern in DemandPattern::ALL {
        let count = record_counts.get(pattern.as_str()).copied().unwrap_or(0);
        lines.push(format!(
            "{:<15}: {:>8} records ({:>5.2}%)",
            pattern.as_str(),
            with_thousands(count),
            percentage(count, total_records)
        ));
    }

    lines.push(String::new());
    lines.push(RULE_HEAVY.to_string());

    Ok(lines.join("\n"))
}

fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

fn mean_of(records: &[&ClassificationRecord], field: impl Fn(&ClassificationRecord) -> f64) -> f64 {
    if records.is_empty() {
        return f64::NAN;
    }
    records.iter().map(|r| field(r)).sum::<f64>() / records.len() as f64
}

fn unique_count(df: &DataFrame, column: &str) -> Result<usize> {
    let values: HashSet<&str> = df.column(column)?.str()?.iter().flatten().collect();
    Ok(values.len())
}

/// Format an integer with thousands separators, e.g. 1234567 -> "1,234,567".
fn with_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
