//! Rate Limiting Middleware using GCRA Algorithm
//!
//! Per peer IP limiting via tower_governor. Requires the service to be
//! served with `into_make_service_with_connect_info::<SocketAddr>()`.

use governor::middleware::StateInformationMiddleware;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::key_extractor::PeerIpKeyExtractor;

use crate::ConfigError;

/// Governor config with X-RateLimit-* headers enabled
pub type DefaultGovernorConfig =
    tower_governor::governor::GovernorConfig<PeerIpKeyExtractor, StateInformationMiddleware>;

/// Rate limiting configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Seconds to replenish one request
    pub per_second: u64,
    /// Max requests that can be made immediately
    pub burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        // A dashboard refresh issues several requests at once
        Self {
            per_second: 1,
            burst_size: 30,
        }
    }
}

impl RateLimitConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.per_second == 0 || self.burst_size == 0 {
            return Err(ConfigError::Invalid(format!(
                "rate_limit needs positive per_second and burst_size, got {} / {}",
                self.per_second, self.burst_size
            )));
        }
        Ok(())
    }
}

/// Build the governor config used by `GovernorLayer`
pub fn create_governor_config(config: &RateLimitConfig) -> Result<Arc<DefaultGovernorConfig>, ConfigError> {
    config.validate()?;
    GovernorConfigBuilder::default()
        .per_second(config.per_second)
        .burst_size(config.burst_size)
        .use_headers()
        .finish()
        .map(Arc::new)
        .ok_or_else(|| ConfigError::Invalid("rate limiter rejected its settings".into()))
}
