use async_trait::async_trait;
use wonfx_providers::ecos::{EcosClient, StatRow};
use wonfx_providers::koreaexim::{KoreaEximClient, RateRow};

use crate::errors::Result;
use crate::policy::PolicyRateRecord;
use crate::rates::RateRecord;

/// Trait defining the contract for the daily exchange-rate source.
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Fetch the full AP01 row set for `search_date` (`YYYYMMDD`).
    async fn fetch_daily_rates(&self, search_date: &str) -> Result<Vec<RateRow>>;
}

/// Trait defining the contract for the base-rate statistics source.
#[async_trait]
pub trait PolicyRateSource: Send + Sync {
    /// Fetch base-rate observations for the `[start, end]` window.
    async fn fetch_base_rate_window(
        &self,
        start_date: &str,
        end_date: &str,
    ) -> Result<Vec<StatRow>>;
}

/// Trait defining the contract for exchange-rate persistence.
#[async_trait]
pub trait RateRepositoryTrait: Send + Sync {
    /// Idempotently write a batch keyed by (base_date, currency_code,
    /// provider), returning the number of rows written.
    async fn upsert_daily_rates(&self, records: Vec<RateRecord>) -> Result<usize>;
}

/// Trait defining the contract for base-rate persistence.
///
/// Insert and upsert stay separate operations: the service tries the plain
/// insert first and only falls back to the upsert on a uniqueness conflict,
/// because the two differ in how they report a fresh row.
#[async_trait]
pub trait PolicyRateRepositoryTrait: Send + Sync {
    async fn insert_base_rate(&self, record: PolicyRateRecord) -> Result<usize>;
    async fn upsert_base_rate(&self, record: PolicyRateRecord) -> Result<usize>;
}

// The provider clients satisfy the source traits directly; errors cross
// into the core taxonomy through `Error::Source`.

#[async_trait]
impl RateSource for KoreaEximClient {
    async fn fetch_daily_rates(&self, search_date: &str) -> Result<Vec<RateRow>> {
        Ok(KoreaEximClient::fetch_daily_rates(self, search_date).await?)
    }
}

#[async_trait]
impl PolicyRateSource for EcosClient {
    async fn fetch_base_rate_window(
        &self,
        start_date: &str,
        end_date: &str,
    ) -> Result<Vec<StatRow>> {
        Ok(EcosClient::fetch_base_rate_window(self, start_date, end_date).await?)
    }
}
