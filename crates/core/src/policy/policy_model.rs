use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One persisted central-bank policy-rate observation.
///
/// Unique per (stat_code, time_period). The reconciler emits at most one of
/// these per invocation, so duplicate handling only matters when two
/// invocations overlap or a run is retried.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PolicyRateRecord {
    /// Statistics table code (`722Y001` for the BOK base rate).
    pub stat_code: String,
    pub stat_name: Option<String>,
    /// Publication cycle of the series; `"D"` for this one.
    pub cycle: String,
    pub unit_name: Option<String>,
    /// Upstream period label; lexicographic order equals chronological.
    pub time_period: String,
    /// Parsed value. `None` when the upstream published a blank or
    /// unparsable figure; this series is supplementary, so a missing value
    /// is tolerated rather than rejected.
    pub data_value: Option<Decimal>,
    /// The upstream row exactly as received, kept for audit.
    pub raw: serde_json::Value,
}
