//! Korea Eximbank daily exchange-rate provider (AP01).
//!
//! The AP01 endpoint returns a JSON array with one element per currency.
//! Instead of an HTTP error status, application-level failures are signalled
//! through the `result` field of the first element:
//! - `1`: success
//! - `2`: no data published for the requested date
//! - `3`: authentication or upstream server error
//!
//! Rate values arrive as strings with embedded thousands separators
//! (e.g. `"1,326.5"`); parsing them is left to the caller so that the raw
//! strings can be persisted for audit.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::errors::SourceError;

/// Provider ID constant, also used as the persistence key.
pub const PROVIDER_ID: &str = "KOREA_EXIM";

/// Production endpoint for the AP01 (current exchange rate) data set.
pub const DEFAULT_BASE_URL: &str =
    "https://oapi.koreaexim.go.kr/site/program/financial/exchangeJSON";

/// Default HTTP request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const RESULT_SUCCESS: i32 = 1;
const RESULT_NO_DATA: i32 = 2;
const RESULT_UPSTREAM_ERROR: i32 = 3;

/// One element of the AP01 response array.
///
/// Every numeric field is a nullable, locale-formatted string; `cur_unit`
/// may carry a quantity suffix such as `"JPY(100)"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateRow {
    /// Result code: 1 success, 2 no data, 3 other error
    pub result: i32,
    /// Currency unit code (e.g. `"USD"`, `"JPY(100)"`)
    pub cur_unit: Option<String>,
    /// Currency display name (e.g. `"미국 달러"`)
    pub cur_nm: Option<String>,
    /// Base (deal basis) rate
    pub deal_bas_r: Option<String>,
    /// Telegraphic transfer buying rate
    pub ttb: Option<String>,
    /// Telegraphic transfer selling rate
    pub tts: Option<String>,
    /// Book price
    #[serde(default)]
    pub bkpr: Option<String>,
    /// Yearly exchange fee rate
    #[serde(default)]
    pub yy_efee_r: Option<String>,
    /// 10-day exchange fee rate
    #[serde(default)]
    pub ten_dd_efee_r: Option<String>,
    /// KFTC book price
    #[serde(default)]
    pub kftc_bkpr: Option<String>,
    /// KFTC deal basis rate
    #[serde(default)]
    pub kftc_deal_bas_r: Option<String>,
}

impl RateRow {
    /// Whether this row carries the success result code.
    pub fn is_success(&self) -> bool {
        self.result == RESULT_SUCCESS
    }
}

/// Client for the Korea Eximbank exchange-rate API.
pub struct KoreaEximClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl KoreaEximClient {
    /// Create a new client with the given API key and endpoint.
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into(),
        }
    }

    /// Fetch the daily rate table for `search_date` (`YYYYMMDD`).
    ///
    /// Returns the full row set on success. Transport failures, non-array
    /// bodies and non-success result codes are classified into the matching
    /// [`SourceError`] variant; the caller aborts or absorbs as it sees fit.
    pub async fn fetch_daily_rates(&self, search_date: &str) -> Result<Vec<RateRow>, SourceError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("authkey", self.api_key.as_str()),
                ("data", "AP01"),
                ("searchdate", search_date),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Unavailable {
                provider: PROVIDER_ID.to_string(),
                status: status.as_u16(),
            });
        }

        let body: serde_json::Value = response.json().await?;
        let rows = classify_response(body)?;
        log::debug!("AP01 returned {} rows for {}", rows.len(), search_date);
        Ok(rows)
    }
}

/// Validate and decode an AP01 response body.
///
/// Pure so the result-code protocol is testable without HTTP.
fn classify_response(body: serde_json::Value) -> Result<Vec<RateRow>, SourceError> {
    let is_empty_array = body.as_array().is_some_and(|rows| rows.is_empty());
    if !body.is_array() || is_empty_array {
        return Err(SourceError::MalformedResponse {
            provider: PROVIDER_ID.to_string(),
            message: "expected a non-empty JSON array".to_string(),
        });
    }

    let rows: Vec<RateRow> =
        serde_json::from_value(body).map_err(|e| SourceError::MalformedResponse {
            provider: PROVIDER_ID.to_string(),
            message: e.to_string(),
        })?;

    // The result code of the first row speaks for the whole response.
    let code = rows[0].result;
    if code != RESULT_SUCCESS {
        let message = match code {
            RESULT_NO_DATA => "no exchange-rate data is published for the requested date".to_string(),
            RESULT_UPSTREAM_ERROR => "authentication failure or upstream server error".to_string(),
            other => format!("upstream result code {}", other),
        };
        return Err(SourceError::UpstreamLogical {
            provider: PROVIDER_ID.to_string(),
            message,
        });
    }

    Ok(rows)
}
