use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One persisted daily exchange-rate observation.
///
/// Unique per (base_date, currency_code, provider); re-ingesting the same
/// date overwrites the stored values in place.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RateRecord {
    /// Calendar date of the observation in the KST publishing calendar.
    pub base_date: NaiveDate,
    /// Publication time of day. The AP01 data set does not expose one, so
    /// this is always `None` today; the column exists for sources that do.
    pub base_time: Option<String>,
    /// Upstream currency unit code, quantity suffix included (`"JPY(100)"`).
    pub currency_code: String,
    pub currency_name: Option<String>,
    /// Deal basis rate (매매기준율).
    pub deal_bas_r: Decimal,
    /// Telegraphic transfer buying rate.
    pub ttb: Decimal,
    /// Telegraphic transfer selling rate.
    pub tts: Decimal,
    /// Source identifier, part of the uniqueness key.
    pub provider: String,
    /// The upstream row exactly as received, kept for audit.
    pub raw: serde_json::Value,
}
