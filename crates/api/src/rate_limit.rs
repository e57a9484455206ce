//! Rate Limiting Middleware using GCRA Algorithm
//!
//! Per-client-IP limits on the prediction endpoints using tower_governor.

use anyhow::{anyhow, Result};
use governor::middleware::StateInformationMiddleware;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::key_extractor::PeerIpKeyExtractor;
use tower_governor::GovernorLayer;

/// Governor config with X-RateLimit-* headers enabled
pub type GatewayGovernorConfig =
    tower_governor::governor::GovernorConfig<PeerIpKeyExtractor, StateInformationMiddleware>;

/// Rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Apply the limiter at all
    pub enabled: bool,
    /// Seconds between quota replenishments
    pub per_second: u64,
    /// Burst size (max requests that can be made immediately)
    pub burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            per_second: 1,
            burst_size: 20,
        }
    }
}

/// Build the governor config.
///
/// Requires the server to run with
/// `into_make_service_with_connect_info::<SocketAddr>()` so the peer IP is available.
pub fn create_governor_config(config: &RateLimitConfig) -> Result<Arc<GatewayGovernorConfig>> {
    GovernorConfigBuilder::default()
        .per_second(config.per_second)
        .burst_size(config.burst_size)
        .use_headers()
        .finish()
        .map(Arc::new)
        .ok_or_else(|| {
            anyhow!(
                "invalid rate limit: per_second={}, burst_size={}",
                config.per_second,
                config.burst_size
            )
        })
}

/// Layer enforcing the configured limit
pub fn governor_layer(
    config: &RateLimitConfig,
) -> Result<GovernorLayer<PeerIpKeyExtractor, StateInformationMiddleware>> {
    Ok(GovernorLayer {
        config: create_governor_config(config)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RateLimitConfig::default();
        assert!(config.enabled);
        assert_eq!(config.per_second, 1);
        assert_eq!(config.burst_size, 20);
    }

    #[test]
    fn test_create_governor_config() {
        let governor = create_governor_config(&RateLimitConfig::default()).unwrap();
        assert!(Arc::strong_count(&governor) > 0);
    }

    #[test]
    fn test_zero_burst_rejected() {
        let config = RateLimitConfig {
            burst_size: 0,
            ..Default::default()
        };
        assert!(create_governor_config(&config).is_err());
    }
}
