//! Upstream API clients for wonfx.
//!
//! Two government data sources are wrapped here:
//! - [`koreaexim`]: Korea Eximbank AP01 daily exchange rates
//! - [`ecos`]: Bank of Korea ECOS statistics (base rate series)
//!
//! Each client owns a `reqwest::Client`, performs exactly one GET per call
//! and classifies the response into [`SourceError`] variants. Retry policy
//! is the caller's concern; nothing here retries.

pub mod ecos;
pub mod errors;
pub mod koreaexim;

pub use errors::SourceError;
