//! Demand-pattern classification for spare-parts inventory data.
//!
//! Given per-period demand for each (part, location) pair, computes the
//! coefficient of variation (CV) and average demand interval (ADI) and
//! assigns one of the canonical demand patterns: Smooth, Erratic,
//! Intermittent, Lumpy, or Unknown when the statistics are undefined.
//!
//! The engine is a batch transformation over a polars DataFrame: it
//! produces a record-level annotated table, a group-level classification
//! table and a plain-text report. Downstream consumers (dashboards,
//! inventory optimizers, schedulers) read those outputs.

mod engine;
mod location;
mod report;

pub mod config;
pub mod error;
pub mod pattern;
pub mod schema;
pub mod stats;

pub use config::{ClassifierConfig, Thresholds};
pub use engine::{ClassificationOutput, ClassificationRecord, DemandClassifier};
pub use error::{ClassifyError, Result};
pub use location::reconcile as reconcile_locations;
pub use pattern::{classify, DemandPattern};
pub use report::{render as render_report, render_now as render_report_now};
