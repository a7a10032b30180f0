//! Bank of Korea ECOS statistics provider (StatisticSearch).
//!
//! Used for the base-rate series (722Y001 / 0101000, daily cycle). The API
//! is quirky in two ways this module papers over:
//! - the `row` field is a single object when exactly one observation
//!   matches and an array otherwise; it is normalized to a `Vec` here,
//! - "no data in range" is reported as result code `정보-200` inside the
//!   `StatisticSearch` container and must not be treated as an error.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::errors::SourceError;

/// Provider ID constant.
pub const PROVIDER_ID: &str = "ECOS";

/// Production endpoint root.
pub const DEFAULT_BASE_URL: &str = "https://ecos.bok.or.kr/api";

/// Statistics table code for the BOK base rate.
pub const BASE_RATE_STAT_CODE: &str = "722Y001";

/// Item code for the BOK base rate within the table.
pub const BASE_RATE_ITEM_CODE: &str = "0101000";

/// The base rate is published on the daily cycle.
pub const BASE_RATE_CYCLE: &str = "D";

/// Informational result code meaning "no data for the requested range".
const NO_DATA_RESULT: &str = "정보-200";

/// Page bounds: the 7-day window never holds more than a handful of rows.
const FIRST_RECORD: u32 = 1;
const LAST_RECORD: u32 = 10;

/// Default HTTP request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Top-level StatisticSearch response.
///
/// Error responses may omit the container and carry `RESULT`/`CODE`/
/// `MESSAGE` at the top level instead; those are kept for logging only.
#[derive(Debug, Deserialize)]
pub struct StatResponse {
    #[serde(rename = "StatisticSearch")]
    pub statistic_search: Option<StatisticSearch>,
    #[serde(rename = "RESULT")]
    pub result: Option<String>,
    #[serde(rename = "CODE")]
    pub code: Option<String>,
    #[serde(rename = "MESSAGE")]
    pub message: Option<String>,
}

/// The nested result container.
#[derive(Debug, Deserialize)]
pub struct StatisticSearch {
    pub list_total_count: Option<i64>,
    pub row: Option<OneOrMany<StatRow>>,
    #[serde(rename = "RESULT")]
    pub result: Option<String>,
    #[serde(rename = "CODE")]
    pub code: Option<String>,
    #[serde(rename = "MESSAGE")]
    pub message: Option<String>,
}

/// One observation of a statistics series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatRow {
    #[serde(rename = "STAT_CODE")]
    pub stat_code: String,
    #[serde(rename = "STAT_NAME")]
    pub stat_name: Option<String>,
    #[serde(rename = "ITEM_CODE1")]
    pub item_code1: Option<String>,
    #[serde(rename = "ITEM_NAME1")]
    pub item_name1: Option<String>,
    #[serde(rename = "ITEM_CODE2", default)]
    pub item_code2: Option<String>,
    #[serde(rename = "ITEM_NAME2", default)]
    pub item_name2: Option<String>,
    #[serde(rename = "ITEM_CODE3", default)]
    pub item_code3: Option<String>,
    #[serde(rename = "ITEM_NAME3", default)]
    pub item_name3: Option<String>,
    #[serde(rename = "ITEM_CODE4", default)]
    pub item_code4: Option<String>,
    #[serde(rename = "ITEM_NAME4", default)]
    pub item_name4: Option<String>,
    #[serde(rename = "UNIT_NAME")]
    pub unit_name: Option<String>,
    #[serde(rename = "WGT", default)]
    pub wgt: Option<String>,
    /// Period label; fixed-width and zero-padded, so lexicographic order
    /// equals chronological order.
    #[serde(rename = "TIME")]
    pub time: String,
    #[serde(rename = "DATA_VALUE")]
    pub data_value: Option<String>,
}

/// A field that is a bare object for one element and an array otherwise.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    /// Normalize to a uniform sequence.
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(item) => vec![item],
            OneOrMany::Many(items) => items,
        }
    }
}

/// Client for the ECOS statistics API.
pub struct EcosClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl EcosClient {
    /// Create a new client with the given API key and endpoint root.
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

    /// Fetch base-rate observations for the `[start, end]` window
    /// (both `YYYYMMDD`).
    ///
    /// An empty `Vec` means "no data in range", which is a normal outcome
    /// for this series: the base rate only gets a fresh observation when
    /// the Monetary Policy Board publishes one.
    pub async fn fetch_base_rate_window(
        &self,
        start_date: &str,
        end_date: &str,
    ) -> Result<Vec<StatRow>, SourceError> {
        // Path-segment API: /StatisticSearch/{key}/json/kr/{from}/{to}/
        //   {stat}/{cycle}/{start}/{end}/{item1}/?/?/?
        let url = format!(
            "{}/StatisticSearch/{}/json/kr/{}/{}/{}/{}/{}/{}/{}/?/?/?",
            self.base_url,
            self.api_key,
            FIRST_RECORD,
            LAST_RECORD,
            BASE_RATE_STAT_CODE,
            BASE_RATE_CYCLE,
            start_date,
            end_date,
            BASE_RATE_ITEM_CODE,
        );

        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Unavailable {
                provider: PROVIDER_ID.to_string(),
                status: status.as_u16(),
            });
        }

        let body: StatResponse =
            response
                .json()
                .await
                .map_err(|e| SourceError::MalformedResponse {
                    provider: PROVIDER_ID.to_string(),
                    message: e.to_string(),
                })?;

        interpret_response(body)
    }
}

/// Apply the documented interpretation order to a parsed body.
///
/// 1. no `StatisticSearch` container: no data, not an error
/// 2. container result code present and not `정보-200`: upstream error,
///    message taken from MESSAGE, then RESULT, then CODE
/// 3. `정보-200`, missing `row`, or a zero total count: no data
/// 4. otherwise the one-or-many `row` normalized to a sequence
fn interpret_response(body: StatResponse) -> Result<Vec<StatRow>, SourceError> {
    let Some(search) = body.statistic_search else {
        log::info!(
            "ECOS response has no StatisticSearch container (RESULT={:?}, MESSAGE={:?}); treating as no data",
            body.result,
            body.message
        );
        return Ok(Vec::new());
    };

    if let Some(result) = search.result.as_deref() {
        if result != NO_DATA_RESULT {
            let message = search
                .message
                .clone()
                .or_else(|| search.result.clone())
                .or_else(|| search.code.clone())
                .unwrap_or_default();
            return Err(SourceError::UpstreamLogical {
                provider: PROVIDER_ID.to_string(),
                message,
            });
        }
    }

    if search.result.as_deref() == Some(NO_DATA_RESULT)
        || search.list_total_count == Some(0)
    {
        log::info!(
            "ECOS: no observations in range (list_total_count={:?})",
            search.list_total_count
        );
        return Ok(Vec::new());
    }

    match search.row {
        Some(rows) => Ok(rows.into_vec()),
        None => Ok(Vec::new()),
    }
}
