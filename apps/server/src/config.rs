//! Environment-based configuration.
//!
//! Everything is read once at startup. The Korea Eximbank key is required
//! for ingestion to run but its absence is only reported when an ingestion
//! is actually requested, so the server still boots into a diagnosable
//! state; the ECOS key is optional by design.

/// Env var holding the required exchange-rate credential.
pub const KOREA_EXIM_API_KEY: &str = "KOREA_EXIM_API_KEY";

/// Env var holding the optional base-rate credential.
pub const ECOS_API_KEY: &str = "ECOS_API_KEY";

pub struct Config {
    pub listen_addr: String,
    pub db_path: String,
    pub korea_exim_api_key: Option<String>,
    pub korea_exim_base_url: String,
    pub ecos_api_key: Option<String>,
    pub ecos_base_url: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            listen_addr: env_or("WONFX_LISTEN_ADDR", "0.0.0.0:8710"),
            db_path: env_or("WONFX_DB_PATH", "data/wonfx.db"),
            korea_exim_api_key: env_non_empty(KOREA_EXIM_API_KEY),
            korea_exim_base_url: env_or(
                "KOREA_EXIM_BASE_URL",
                wonfx_providers::koreaexim::DEFAULT_BASE_URL,
            ),
            ecos_api_key: env_non_empty(ECOS_API_KEY),
            ecos_base_url: env_or("ECOS_BASE_URL", wonfx_providers::ecos::DEFAULT_BASE_URL),
        }
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    env_non_empty(key).unwrap_or_else(|| default.to_string())
}
