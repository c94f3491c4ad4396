//! Tunable configuration for the monitor, calculator and panel client.

use std::time::Duration;

/// Client-side rate limiting of outbound panel API calls.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    pub requests_per_second: u32,
    pub burst_size: u32,
}

/// Utilization thresholds driving status derivation and warnings.
///
/// All percentages compare against effective limits. `min_viable_*` is the
/// smallest server the product allows; a location where no node can fit it
/// is considered full even if percentages look moderate.
#[derive(Debug, Clone, Copy)]
pub struct CapacityThresholds {
    /// At or above this on either dimension, a location is `Limited`.
    pub limited_percent: f64,
    /// At or above this on both dimensions, a location is `Full`.
    pub full_percent: f64,
    /// Projected utilization at or above this triggers a warning.
    pub warning_percent: f64,
    /// Memory of the smallest meaningful placement, in MB.
    pub min_viable_memory: u64,
    /// Disk of the smallest meaningful placement, in MB.
    pub min_viable_disk: u64,
}

impl Default for CapacityThresholds {
    fn default() -> Self {
        Self {
            limited_percent: 80.0,
            full_percent: 95.0,
            warning_percent: 90.0,
            min_viable_memory: 128,
            min_viable_disk: 512,
        }
    }
}

/// Top-level configuration for a capacity client.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// How long a cached inventory snapshot stays fresh.
    pub cache_ttl: Duration,
    /// Bounded timeout for each panel API request.
    pub request_timeout: Duration,
    /// Percentage subtracted from effective limits as a safety margin.
    pub safety_margin_percent: u8,
    /// Optional client-side rate limiting of panel calls.
    pub rate_limit: Option<RateLimitConfig>,
    /// Status and warning thresholds.
    pub thresholds: CapacityThresholds,
    /// Page size used when walking the panel node listing.
    pub page_size: u32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(20),
            request_timeout: Duration::from_secs(10),
            safety_margin_percent: 0,
            rate_limit: None,
            thresholds: CapacityThresholds::default(),
            page_size: 100,
        }
    }
}
