//! Exchange-rate module - domain model and normalization.

mod normalizer;
mod rate_model;

pub use normalizer::{normalize_daily_rates, parse_rate_field};
pub use rate_model::RateRecord;
