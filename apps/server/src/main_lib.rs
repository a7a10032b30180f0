use std::sync::Arc;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};
use wonfx_core::ingest::{IngestService, PolicyRateSource, RateSource};
use wonfx_providers::ecos::EcosClient;
use wonfx_providers::koreaexim::KoreaEximClient;
use wonfx_storage_sqlite::db;
use wonfx_storage_sqlite::policy::PolicyRateRepository;
use wonfx_storage_sqlite::rates::RateRepository;

use crate::config::{Config, KOREA_EXIM_API_KEY};

pub struct AppState {
    /// None when the required exchange-rate credential is not configured;
    /// the handler reports that as a configuration error per request.
    pub ingest_service: Option<IngestService>,
}

pub fn init_tracing() {
    let log_format = std::env::var("WONFX_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = db::spawn_writer((*pool).clone());

    let rate_repository = Arc::new(RateRepository::new(pool.clone(), writer.clone()));
    let policy_repository = Arc::new(PolicyRateRepository::new(pool.clone(), writer.clone()));

    let ingest_service = config.korea_exim_api_key.as_ref().map(|key| {
        let rate_source: Arc<dyn RateSource> = Arc::new(KoreaEximClient::new(
            key.clone(),
            config.korea_exim_base_url.clone(),
        ));
        let policy_source = config.ecos_api_key.as_ref().map(|ecos_key| {
            Arc::new(EcosClient::new(
                ecos_key.clone(),
                config.ecos_base_url.clone(),
            )) as Arc<dyn PolicyRateSource>
        });
        if policy_source.is_none() {
            tracing::info!("ECOS_API_KEY not set; base-rate pipeline will be skipped");
        }
        IngestService::new(
            rate_source,
            policy_source,
            rate_repository.clone(),
            policy_repository.clone(),
        )
    });

    if ingest_service.is_none() {
        tracing::warn!(
            "{} is not set; ingestion requests will fail until it is configured",
            KOREA_EXIM_API_KEY
        );
    }

    Ok(Arc::new(AppState { ingest_service }))
}
