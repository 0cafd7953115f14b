/// Column-name constants for the demand-patterns schema.
/// Single source of truth for every column the engine reads or writes;
/// output column names are part of the downstream contract.

// ── Transaction columns ─────────────────────────────────────────────────────
pub mod transaction {
    pub const PART_SKU: &str = "part_sku";
    pub const LOCATION_ID: &str = "location_id";
    pub const DATE: &str = "date";
    pub const QUANTITY_SOLD: &str = "quantity_sold";
}

// ── One-hot location encoding ───────────────────────────────────────────────
pub mod onehot {
    /// Indicator columns are named `LOCATION_PREFIX` + location code,
    /// e.g. `location_id_LOC_002` for code `LOC_002`.
    pub const LOCATION_PREFIX: &str = "location_id_";
    /// Fallback code for rows with no indicator set (the baseline level
    /// dropped by the encoder).
    pub const DEFAULT_LOCATION: &str = "LOC_001";
}

// ── Classification columns ──────────────────────────────────────────────────
pub mod classification {
    pub const CV: &str = "cv";
    pub const ADI: &str = "adi";
    pub const DEMAND_PATTERN: &str = "demand_pattern";
    pub const TOTAL_DEMAND: &str = "total_demand";
    pub const MEAN_DEMAND: &str = "mean_demand";
    pub const STD_DEMAND: &str = "std_demand";
    pub const PERIODS_WITH_DEMAND: &str = "periods_with_demand";
    pub const TOTAL_PERIODS: &str = "total_periods";
    pub const ZERO_DEMAND_RATIO: &str = "zero_demand_ratio";
}
