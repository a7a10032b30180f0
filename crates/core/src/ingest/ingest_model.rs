use serde::{Deserialize, Serialize};

/// Outcome of the absorb-on-error base-rate pipeline.
///
/// Kept as its own type so the two pipelines' results only meet in the
/// final report; there is no shared error accumulator.
#[derive(Debug, Clone, Default)]
pub struct PolicyOutcome {
    /// False only when no ECOS credential is configured.
    pub attempted: bool,
    pub written: usize,
    /// Whatever stopped the pipeline, stringified at its boundary.
    pub error: Option<String>,
}

impl PolicyOutcome {
    /// The pipeline was skipped because no credential is configured.
    pub fn skipped() -> Self {
        Self::default()
    }
}

/// The JSON body every successful invocation returns.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct IngestReport {
    pub success: bool,
    pub message: String,
    /// Exchange-rate rows written by this run.
    pub rates_written: usize,
    /// The resolved KST query date, 8-digit form.
    pub search_date: String,
    pub policy_rate_attempted: bool,
    pub policy_rates_written: usize,
    /// Informational only; a non-null value with `success: true` means the
    /// base-rate pipeline degraded while exchange rates were stored.
    pub policy_rate_error: Option<String>,
}

impl IngestReport {
    /// Merge the two pipeline outcomes into the final report.
    ///
    /// Reaching this point means the exchange-rate pipeline completed, so
    /// `success` is unconditionally true; the base-rate outcome is carried
    /// verbatim.
    pub fn compose(rates_written: usize, search_date: String, policy: PolicyOutcome) -> Self {
        Self {
            success: true,
            message: "Exchange rates stored successfully.".to_string(),
            rates_written,
            search_date,
            policy_rate_attempted: policy.attempted,
            policy_rates_written: policy.written,
            policy_rate_error: policy.error,
        }
    }
}
