use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::errors::Result;
use crate::ingest::ingest_model::{IngestReport, PolicyOutcome};
use crate::ingest::ingest_traits::{
    PolicyRateRepositoryTrait, PolicyRateSource, RateRepositoryTrait, RateSource,
};
use crate::policy::{reconcile_latest, PolicyRateRecord};
use crate::rates::normalize_daily_rates;

/// Upstream dates are exchanged in this 8-digit form.
const COMPACT_DATE_FORMAT: &str = "%Y%m%d";

/// Both upstreams publish on the KST calendar.
const KST_OFFSET_HOURS: i64 = 9;

/// The base-rate query looks back this many days for the newest observation.
const POLICY_WINDOW_DAYS: i64 = 7;

/// "Today" in the publishing calendar: UTC shifted by the fixed KST offset,
/// truncated to the day.
pub fn kst_today(now: DateTime<Utc>) -> NaiveDate {
    (now + Duration::hours(KST_OFFSET_HOURS)).date_naive()
}

/// Orchestrates one ingestion run.
///
/// Two pipelines run strictly in sequence. The exchange-rate pipeline is
/// the deliverable: any failure in it aborts the invocation. The base-rate
/// pipeline is supplementary: every failure is caught at its boundary and
/// reported, never propagated.
pub struct IngestService {
    rate_source: Arc<dyn RateSource>,
    policy_source: Option<Arc<dyn PolicyRateSource>>,
    rate_repository: Arc<dyn RateRepositoryTrait>,
    policy_repository: Arc<dyn PolicyRateRepositoryTrait>,
}

impl IngestService {
    pub fn new(
        rate_source: Arc<dyn RateSource>,
        policy_source: Option<Arc<dyn PolicyRateSource>>,
        rate_repository: Arc<dyn RateRepositoryTrait>,
        policy_repository: Arc<dyn PolicyRateRepositoryTrait>,
    ) -> Self {
        Self {
            rate_source,
            policy_source,
            rate_repository,
            policy_repository,
        }
    }

    /// Run a full ingestion for the current KST date.
    pub async fn run(&self) -> Result<IngestReport> {
        self.run_at(Utc::now()).await
    }

    /// Run a full ingestion resolving dates from `now`.
    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<IngestReport> {
        let today = kst_today(now);
        let search_date = today.format(COMPACT_DATE_FORMAT).to_string();
        log::info!("Starting ingestion for {}", search_date);

        let rows = self.rate_source.fetch_daily_rates(&search_date).await?;
        let records = normalize_daily_rates(&rows, &search_date)?;
        log::info!(
            "Normalized {} of {} exchange-rate rows",
            records.len(),
            rows.len()
        );
        let rates_written = self.rate_repository.upsert_daily_rates(records).await?;
        log::info!("Stored {} exchange-rate records", rates_written);

        let policy = match &self.policy_source {
            Some(source) => self.run_policy_pipeline(source.as_ref(), today).await,
            None => {
                log::warn!("No ECOS credential configured; skipping base-rate pipeline");
                PolicyOutcome::skipped()
            }
        };

        Ok(IngestReport::compose(rates_written, search_date, policy))
    }

    /// The absorb-all boundary around the base-rate pipeline.
    async fn run_policy_pipeline(
        &self,
        source: &dyn PolicyRateSource,
        today: NaiveDate,
    ) -> PolicyOutcome {
        match self.fetch_and_store_base_rate(source, today).await {
            Ok(written) => PolicyOutcome {
                attempted: true,
                written,
                error: None,
            },
            Err(e) => {
                log::error!("Base-rate pipeline failed: {}", e);
                PolicyOutcome {
                    attempted: true,
                    written: 0,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    async fn fetch_and_store_base_rate(
        &self,
        source: &dyn PolicyRateSource,
        today: NaiveDate,
    ) -> Result<usize> {
        let start_date = (today - Duration::days(POLICY_WINDOW_DAYS))
            .format(COMPACT_DATE_FORMAT)
            .to_string();
        let end_date = today.format(COMPACT_DATE_FORMAT).to_string();

        let rows = source.fetch_base_rate_window(&start_date, &end_date).await?;
        let Some(record) = reconcile_latest(rows)? else {
            log::info!("No base-rate observation in the trailing window");
            return Ok(0);
        };
        log::info!(
            "Selected base-rate observation {} = {:?}",
            record.time_period,
            record.data_value
        );

        self.store_base_rate(record).await
    }

    /// Optimistic insert, pessimistic fallback: a conflict on the
    /// (stat_code, time_period) key means another invocation got there
    /// first, so retry exactly once as an upsert.
    async fn store_base_rate(&self, record: PolicyRateRecord) -> Result<usize> {
        match self.policy_repository.insert_base_rate(record.clone()).await {
            Ok(written) => Ok(written),
            Err(e) if e.is_unique_violation() => {
                log::info!("Base-rate row already present; retrying as upsert");
                self.policy_repository.upsert_base_rate(record).await
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_kst_today_matches_utc_before_offset_boundary() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 14, 59, 59).unwrap();
        assert_eq!(kst_today(now).to_string(), "2024-01-01");
    }

    #[test]
    fn test_kst_today_rolls_over_at_15_utc() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 15, 0, 0).unwrap();
        assert_eq!(kst_today(now).to_string(), "2024-01-02");
    }
}
