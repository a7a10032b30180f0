//! Tests for the ingestion orchestration.
//!
//! These exercise the service's control flow through mock sources and
//! repositories: the abort-on-error primary pipeline, the absorb-on-error
//! base-rate pipeline, and the insert-then-upsert conflict retry.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use rust_decimal_macros::dec;
use wonfx_providers::ecos::StatRow;
use wonfx_providers::koreaexim::RateRow;
use wonfx_providers::SourceError;

use crate::errors::{DatabaseError, Error, Result};
use crate::ingest::{
    IngestService, PolicyRateRepositoryTrait, PolicyRateSource, RateRepositoryTrait, RateSource,
};
use crate::policy::PolicyRateRecord;
use crate::rates::RateRecord;

// =========================================================================
// Fixtures
// =========================================================================

fn usd_row() -> RateRow {
    RateRow {
        result: 1,
        cur_unit: Some("USD".to_string()),
        cur_nm: Some("미국 달러".to_string()),
        deal_bas_r: Some("1,326.5".to_string()),
        ttb: Some("1,313.23".to_string()),
        tts: Some("1,339.76".to_string()),
        bkpr: Some("1,326".to_string()),
        yy_efee_r: None,
        ten_dd_efee_r: None,
        kftc_bkpr: None,
        kftc_deal_bas_r: None,
    }
}

fn stat_row(time: &str, value: &str) -> StatRow {
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
        data_value: Some(value.to_string()),
    }
}

fn run_instant() -> chrono::DateTime<Utc> {
    // 01:00 UTC = 10:00 KST, so the query date is 2024-01-03.
    Utc.with_ymd_and_hms(2024, 1, 3, 1, 0, 0).unwrap()
}

// =========================================================================
// Mock sources
// =========================================================================

struct MockRateSource {
    rows: Vec<RateRow>,
    fail_logical: bool,
}

#[async_trait]
impl RateSource for MockRateSource {
    async fn fetch_daily_rates(&self, _search_date: &str) -> Result<Vec<RateRow>> {
        if self.fail_logical {
            return Err(SourceError::UpstreamLogical {
                provider: "KOREA_EXIM".to_string(),
                message: "no exchange-rate data is published for the requested date".to_string(),
            }
            .into());
        }
        Ok(self.rows.clone())
    }
}

struct MockPolicySource {
    rows: Vec<StatRow>,
    fail_transport: bool,
}

#[async_trait]
impl PolicyRateSource for MockPolicySource {
    async fn fetch_base_rate_window(
        &self,
        start_date: &str,
        end_date: &str,
    ) -> Result<Vec<StatRow>> {
        assert!(start_date < end_date, "window must trail the query date");
        if self.fail_transport {
            return Err(SourceError::Unavailable {
                provider: "ECOS".to_string(),
                status: 503,
            }
            .into());
        }
        Ok(self.rows.clone())
    }
}

// =========================================================================
// Mock repositories
// =========================================================================

#[derive(Clone, Default)]
struct MockRateRepository {
    saved: Arc<Mutex<Vec<RateRecord>>>,
}

#[async_trait]
impl RateRepositoryTrait for MockRateRepository {
    async fn upsert_daily_rates(&self, records: Vec<RateRecord>) -> Result<usize> {
        let written = records.len();
        self.saved.lock().unwrap().extend(records);
        Ok(written)
    }
}

#[derive(Clone, Copy)]
enum InsertBehavior {
    Succeed,
    Conflict,
    Fail,
}

#[derive(Clone)]
struct MockPolicyRepository {
    insert_behavior: InsertBehavior,
    upsert_fails: bool,
    insert_calls: Arc<Mutex<usize>>,
    upsert_calls: Arc<Mutex<usize>>,
    saved: Arc<Mutex<Vec<PolicyRateRecord>>>,
}

impl MockPolicyRepository {
    fn new(insert_behavior: InsertBehavior, upsert_fails: bool) -> Self {
        Self {
            insert_behavior,
            upsert_fails,
            insert_calls: Arc::new(Mutex::new(0)),
            upsert_calls: Arc::new(Mutex::new(0)),
            saved: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl PolicyRateRepositoryTrait for MockPolicyRepository {
    async fn insert_base_rate(&self, record: PolicyRateRecord) -> Result<usize> {
        *self.insert_calls.lock().unwrap() += 1;
        match self.insert_behavior {
            InsertBehavior::Succeed => {
                self.saved.lock().unwrap().push(record);
                Ok(1)
            }
            InsertBehavior::Conflict => Err(Error::Database(DatabaseError::UniqueViolation(
                "UNIQUE constraint failed: ecos_base_rate.stat_code, ecos_base_rate.time_period"
                    .to_string(),
            ))),
            InsertBehavior::Fail => Err(Error::Database(DatabaseError::QueryFailed(
                "disk I/O error".to_string(),
            ))),
        }
    }

    async fn upsert_base_rate(&self, record: PolicyRateRecord) -> Result<usize> {
        *self.upsert_calls.lock().unwrap() += 1;
        if self.upsert_fails {
            return Err(Error::Database(DatabaseError::QueryFailed(
                "database is locked".to_string(),
            )));
        }
        self.saved.lock().unwrap().push(record);
        Ok(1)
    }
}

fn service(
    rate_source: MockRateSource,
    policy_source: Option<MockPolicySource>,
    rate_repo: MockRateRepository,
    policy_repo: MockPolicyRepository,
) -> IngestService {
    IngestService::new(
        Arc::new(rate_source),
        policy_source.map(|s| Arc::new(s) as Arc<dyn PolicyRateSource>),
        Arc::new(rate_repo),
        Arc::new(policy_repo),
    )
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_full_run_writes_both_pipelines() {
    let rate_repo = MockRateRepository::default();
    let policy_repo = MockPolicyRepository::new(InsertBehavior::Succeed, false);
    let svc = service(
        MockRateSource {
            rows: vec![usd_row()],
            fail_logical: false,
        },
        Some(MockPolicySource {
            rows: vec![stat_row("20240102", "3.5")],
            fail_transport: false,
        }),
        rate_repo.clone(),
        policy_repo.clone(),
    );

    let report = svc.run_at(run_instant()).await.unwrap();

    assert!(report.success);
    assert_eq!(report.search_date, "20240103");
    assert_eq!(report.rates_written, 1);
    assert!(report.policy_rate_attempted);
    assert_eq!(report.policy_rates_written, 1);
    assert!(report.policy_rate_error.is_none());

    let saved_rates = rate_repo.saved.lock().unwrap();
    assert_eq!(saved_rates[0].currency_code, "USD");
    assert_eq!(saved_rates[0].deal_bas_r, dec!(1326.5));

    let saved_policy = policy_repo.saved.lock().unwrap();
    assert_eq!(saved_policy[0].time_period, "20240102");
    assert_eq!(saved_policy[0].data_value, Some(dec!(3.5)));
}

#[tokio::test]
async fn test_policy_pipeline_skipped_without_credential() {
    let policy_repo = MockPolicyRepository::new(InsertBehavior::Succeed, false);
    let svc = service(
        MockRateSource {
            rows: vec![usd_row()],
            fail_logical: false,
        },
        None,
        MockRateRepository::default(),
        policy_repo.clone(),
    );

    let report = svc.run_at(run_instant()).await.unwrap();

    assert!(report.success);
    assert!(!report.policy_rate_attempted);
    assert_eq!(report.policy_rates_written, 0);
    assert!(report.policy_rate_error.is_none());
    assert_eq!(*policy_repo.insert_calls.lock().unwrap(), 0);
}

#[tokio::test]
async fn test_conflict_triggers_exactly_one_upsert_retry() {
    let policy_repo = MockPolicyRepository::new(InsertBehavior::Conflict, false);
    let svc = service(
        MockRateSource {
            rows: vec![usd_row()],
            fail_logical: false,
        },
        Some(MockPolicySource {
            rows: vec![stat_row("20240102", "3.5")],
            fail_transport: false,
        }),
        MockRateRepository::default(),
        policy_repo.clone(),
    );

    let report = svc.run_at(run_instant()).await.unwrap();

    assert!(report.success);
    assert_eq!(*policy_repo.insert_calls.lock().unwrap(), 1);
    assert_eq!(*policy_repo.upsert_calls.lock().unwrap(), 1);
    assert_eq!(report.policy_rates_written, 1);
    assert!(report.policy_rate_error.is_none());
}

#[tokio::test]
async fn test_failed_upsert_retry_still_reports_overall_success() {
    let policy_repo = MockPolicyRepository::new(InsertBehavior::Conflict, true);
    let svc = service(
        MockRateSource {
            rows: vec![usd_row()],
            fail_logical: false,
        },
        Some(MockPolicySource {
            rows: vec![stat_row("20240102", "3.5")],
            fail_transport: false,
        }),
        MockRateRepository::default(),
        policy_repo.clone(),
    );

    let report = svc.run_at(run_instant()).await.unwrap();

    assert!(report.success);
    assert_eq!(report.rates_written, 1);
    assert_eq!(*policy_repo.upsert_calls.lock().unwrap(), 1);
    assert_eq!(report.policy_rates_written, 0);
    assert!(report
        .policy_rate_error
        .as_deref()
        .unwrap()
        .contains("database is locked"));
}

#[tokio::test]
async fn test_non_conflict_insert_failure_is_absorbed_without_retry() {
    let policy_repo = MockPolicyRepository::new(InsertBehavior::Fail, false);
    let svc = service(
        MockRateSource {
            rows: vec![usd_row()],
            fail_logical: false,
        },
        Some(MockPolicySource {
            rows: vec![stat_row("20240102", "3.5")],
            fail_transport: false,
        }),
        MockRateRepository::default(),
        policy_repo.clone(),
    );

    let report = svc.run_at(run_instant()).await.unwrap();

    assert!(report.success);
    assert_eq!(*policy_repo.upsert_calls.lock().unwrap(), 0);
    assert!(report.policy_rate_error.is_some());
}

#[tokio::test]
async fn test_policy_source_failure_is_absorbed() {
    let svc = service(
        MockRateSource {
            rows: vec![usd_row()],
            fail_logical: false,
        },
        Some(MockPolicySource {
            rows: Vec::new(),
            fail_transport: true,
        }),
        MockRateRepository::default(),
        MockPolicyRepository::new(InsertBehavior::Succeed, false),
    );

    let report = svc.run_at(run_instant()).await.unwrap();

    assert!(report.success);
    assert!(report.policy_rate_attempted);
    assert_eq!(report.policy_rates_written, 0);
    assert!(report
        .policy_rate_error
        .as_deref()
        .unwrap()
        .contains("HTTP 503"));
}

#[tokio::test]
async fn test_empty_policy_window_writes_nothing() {
    let policy_repo = MockPolicyRepository::new(InsertBehavior::Succeed, false);
    let svc = service(
        MockRateSource {
            rows: vec![usd_row()],
            fail_logical: false,
        },
        Some(MockPolicySource {
            rows: Vec::new(),
            fail_transport: false,
        }),
        MockRateRepository::default(),
        policy_repo.clone(),
    );

    let report = svc.run_at(run_instant()).await.unwrap();

    assert!(report.success);
    assert!(report.policy_rate_attempted);
    assert_eq!(report.policy_rates_written, 0);
    assert!(report.policy_rate_error.is_none());
    assert_eq!(*policy_repo.insert_calls.lock().unwrap(), 0);
}

#[tokio::test]
async fn test_primary_failure_aborts_before_base_rate_pipeline() {
    let policy_repo = MockPolicyRepository::new(InsertBehavior::Succeed, false);
    let svc = service(
        MockRateSource {
            rows: Vec::new(),
            fail_logical: true,
        },
        Some(MockPolicySource {
            rows: vec![stat_row("20240102", "3.5")],
            fail_transport: false,
        }),
        MockRateRepository::default(),
        policy_repo.clone(),
    );

    let err = svc.run_at(run_instant()).await.unwrap_err();

    assert!(matches!(err, Error::Source(_)));
    assert_eq!(*policy_repo.insert_calls.lock().unwrap(), 0);
}
