//! Ingestion orchestration - the one external-facing operation.

mod ingest_model;
mod ingest_service;
mod ingest_traits;

#[cfg(test)]
mod ingest_service_tests;

pub use ingest_model::{IngestReport, PolicyOutcome};
pub use ingest_service::{kst_today, IngestService};
pub use ingest_traits::{
    PolicyRateRepositoryTrait, PolicyRateSource, RateRepositoryTrait, RateSource,
};
