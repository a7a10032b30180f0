//! Selection of the single most recent base-rate observation.

use std::str::FromStr;

use rust_decimal::Decimal;
use wonfx_providers::ecos::{StatRow, BASE_RATE_CYCLE};

use crate::errors::Result;
use crate::policy::PolicyRateRecord;

/// Reduce a window of observations to the one worth persisting.
///
/// An empty window produces no record, which is a normal outcome for this
/// series. Otherwise the row with the greatest period label wins; labels
/// are fixed-width and zero-padded, so a lexicographic sort is a
/// chronological sort. Ties are not expected and fall to stable-sort order.
pub fn reconcile_latest(rows: Vec<StatRow>) -> Result<Option<PolicyRateRecord>> {
    let mut rows = rows;
    rows.sort_by(|a, b| b.time.cmp(&a.time));

    let Some(latest) = rows.into_iter().next() else {
        return Ok(None);
    };

    let data_value = parse_observation_value(latest.data_value.as_deref());

    Ok(Some(PolicyRateRecord {
        stat_code: latest.stat_code.clone(),
        stat_name: latest.stat_name.clone(),
        cycle: BASE_RATE_CYCLE.to_string(),
        unit_name: latest.unit_name.clone(),
        time_period: latest.time.clone(),
        data_value,
        raw: serde_json::to_value(&latest)?,
    }))
}

/// Blank or unparsable values become `None`; unlike exchange rates this
/// series is not load-bearing, so nothing is surfaced.
fn parse_observation_value(value: Option<&str>) -> Option<Decimal> {
    let trimmed = value?.trim();
    if trimmed.is_empty() {
        return None;
    }
    Decimal::from_str(trimmed).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn row(time: &str, value: Option<&str>) -> StatRow {
        StatRow {
            stat_code: "722Y001".to_string(),
            stat_name: Some("한국은행 기준금리 및 여수신금리".to_string()),
            item_code1: Some("0101000".to_string()),
            item_name1: Some("한국은행 기준금리".to_string()),
            item_code2: None,
            item_name2: None,
            item_code3: None,
            item_name3: None,
            item_code4: None,
            item_name4: None,
            unit_name: Some("연%".to_string()),
            wgt: None,
            time: time.to_string(),
            data_value: value.map(str::to_string),
        }
    }

    #[test]
    fn test_empty_window_produces_no_record() {
        assert!(reconcile_latest(Vec::new()).unwrap().is_none());
    }

    #[test]
    fn test_latest_period_wins_regardless_of_input_order() {
        let rows = vec![
            row("20240101", Some("3.25")),
            row("20240103", Some("3.5")),
            row("20240102", Some("3.25")),
        ];
        let record = reconcile_latest(rows).unwrap().unwrap();
        assert_eq!(record.time_period, "20240103");
        assert_eq!(record.data_value, Some(dec!(3.5)));
        assert_eq!(record.cycle, "D");
        assert_eq!(record.raw["TIME"], "20240103");
    }

    #[test]
    fn test_blank_value_becomes_null() {
        let record = reconcile_latest(vec![row("20240103", Some("  "))])
            .unwrap()
            .unwrap();
        assert!(record.data_value.is_none());
    }

    #[test]
    fn test_missing_value_becomes_null() {
        let record = reconcile_latest(vec![row("20240103", None)])
            .unwrap()
            .unwrap();
        assert!(record.data_value.is_none());
    }

    #[test]
    fn test_unparsable_value_becomes_null() {
        let record = reconcile_latest(vec![row("20240103", Some("보류"))])
            .unwrap()
            .unwrap();
        assert!(record.data_value.is_none());
        // The unparsable figure is still preserved for audit.
        assert_eq!(record.raw["DATA_VALUE"], "보류");
    }
}
