//! Filtering and coercion of raw AP01 rows into [`RateRecord`]s.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use wonfx_providers::koreaexim::{RateRow, PROVIDER_ID};

use crate::errors::{Error, Result, ValidationError};
use crate::rates::RateRecord;

/// Currencies the product tracks; everything else in the response is dropped.
const TRACKED_CURRENCY_UNITS: &[&str] = &["USD", "JPY(100)", "CNY", "CNH"];

/// The upstream's unit code for the Chinese yuan varies across response
/// variants, so the display name is checked as a fallback.
const YUAN_NAME_MARKERS: &[&str] = &["중국", "위안"];

/// Whether a row belongs to the tracked currency set.
///
/// Exact match on the unit code, or a display name marking the Chinese
/// yuan. Rows without a unit code are never tracked.
fn is_tracked_currency(row: &RateRow) -> bool {
    let Some(unit) = row.cur_unit.as_deref() else {
        return false;
    };
    if TRACKED_CURRENCY_UNITS.contains(&unit) {
        return true;
    }
    let name = row.cur_nm.as_deref().unwrap_or("");
    YUAN_NAME_MARKERS.iter().any(|marker| name.contains(marker))
}

/// Coerce one locale-formatted rate string.
///
/// The three placeholder forms the upstream uses for "not quoted" — absent,
/// empty, and `"-"` — all map to zero. Anything else must parse as a decimal
/// once thousands separators are stripped; a residue that still does not
/// parse is surfaced as a validation error rather than silently zeroed.
pub fn parse_rate_field(value: Option<&str>) -> Result<Decimal> {
    let raw = match value {
        None | Some("") | Some("-") => return Ok(Decimal::ZERO),
        Some(other) => other,
    };
    let stripped = raw.replace(',', "");
    Decimal::from_str(&stripped).map_err(|_| {
        Error::Validation(ValidationError::InvalidInput(format!(
            "unparsable rate value {:?}",
            raw
        )))
    })
}

/// Build persistence records from a validated AP01 row set.
///
/// Retains successful rows for tracked currencies, coerces every rate
/// string, and stamps each record with the calendar form of the 8-digit
/// query date. An empty retained set aborts the invocation: the upstream
/// answered, but with nothing the product stores.
pub fn normalize_daily_rates(rows: &[RateRow], search_date: &str) -> Result<Vec<RateRecord>> {
    let base_date = NaiveDate::parse_from_str(search_date, "%Y%m%d")?;

    let mut records = Vec::new();
    for row in rows {
        if !row.is_success() || !is_tracked_currency(row) {
            continue;
        }
        let currency_code = match row.cur_unit.clone() {
            Some(unit) => unit,
            None => continue,
        };

        let deal_bas_r = parse_rate_field(row.deal_bas_r.as_deref())?;
        let ttb = parse_rate_field(row.ttb.as_deref())?;
        let tts = parse_rate_field(row.tts.as_deref())?;
        // bkpr is validated like the persisted fields but only rides in `raw`.
        parse_rate_field(row.bkpr.as_deref())?;

        records.push(RateRecord {
            base_date,
            base_time: None,
            currency_code,
            currency_name: row.cur_nm.clone(),
            deal_bas_r,
            ttb,
            tts,
            provider: PROVIDER_ID.to_string(),
            raw: serde_json::to_value(row)?,
        });
    }

    if records.is_empty() {
        return Err(Error::NoTrackedCurrencyData);
    }

    Ok(records)
}
