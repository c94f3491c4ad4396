mod capacity;
mod core;

pub use crate::capacity::application::response::capacity_overview::{
    CapacityOverview, LocationCreationEntry, LocationRecommendation, ServerCreationCapacity,
};
pub use crate::capacity::application::service::capacity_calculator::{
    CapacityCalculator, NodeRankingStrategy,
};
pub use crate::capacity::application::service::node_monitor_service::NodeMonitorService;
pub use crate::core::domain::error::{CapacityError, CapacityResult, ValidationError};
pub use crate::core::domain::model::capacity_check::{
    CapacityCheckResult, CapacityRequirement, NodeSelectionResult, ProjectedUtilization,
    SelectedNode,
};
pub use crate::core::domain::model::location_capacity::{
    LocationCapacity, LocationStatus, MonitoringStats,
};
pub use crate::core::domain::model::monitor_config::{
    CapacityThresholds, MonitorConfig, RateLimitConfig,
};
pub use crate::core::domain::model::node_usage::NodeUsage;
pub use crate::core::domain::model::panel_connection::PanelConnection;
pub use crate::core::domain::value_object::{ApplicationApiKey, PanelHost, PanelPort, PanelUrl};
pub use crate::core::infrastructure::panel_client::PanelClient;
pub use crate::core::infrastructure::usage_source::UsageSource;

use std::sync::Arc;

/// A client for node capacity monitoring and server placement against a
/// Pterodactyl panel.
///
/// This client provides a safe, ergonomic interface for:
/// - Per-node and per-location usage snapshots with short-TTL caching
/// - Placement checks ("can this location take this server right now?")
/// - Optimal node selection within a location
/// - Admin monitoring summaries and route-facing capacity overviews
///
/// # Examples
///
/// ```no_run
/// use cythro_capacity::{CapacityClient, CapacityRequirement, CapacityResult};
///
/// #[tokio::main]
/// async fn main() -> CapacityResult<()> {
///     let client = CapacityClient::builder()
///         .host("panel.example.com")
///         .api_key("ptla_0123456789abcdef0123456789abcdef")
///         .build()?;
///
///     let requirement = CapacityRequirement {
///         memory: 2048,
///         disk: 10240,
///         cpu: None,
///     };
///     let check = client.check_location_capacity(1, &requirement, false).await;
///     println!("location 1 can accommodate: {}", check.can_accommodate);
///     Ok(())
/// }
/// ```
pub struct CapacityClient {
    monitor: Arc<NodeMonitorService>,
    calculator: CapacityCalculator,
}

/// Builder for CapacityClient configuration
#[derive(Debug, Default)]
pub struct CapacityClientBuilder {
    host: Option<String>,
    port: Option<u16>,
    api_key: Option<String>,
    secure: Option<bool>,
    accept_invalid_certs: bool,
    config: MonitorConfig,
    ranking: Option<NodeRankingStrategy>,
}

impl CapacityClientBuilder {
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Use HTTPS when talking to the panel (the default).
    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = Some(secure);
        self
    }

    /// Accept self-signed certificates (testing and lab panels).
    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// Replaces the whole monitor configuration.
    pub fn config(mut self, config: MonitorConfig) -> Self {
        self.config = config;
        self
    }

    /// Overrides how candidate nodes are ranked.
    pub fn ranking(mut self, ranking: NodeRankingStrategy) -> Self {
        self.ranking = Some(ranking);
        self
    }

    /// Validates the configuration and builds the client.
    ///
    /// # Errors
    ///
    /// Returns `CapacityError::Validation` when the host, port or API key
    /// fail validation, and `CapacityError::Connection` when the underlying
    /// HTTP client cannot be constructed.
    pub fn build(self) -> CapacityResult<CapacityClient> {
        let host = PanelHost::new(self.host.ok_or_else(|| ValidationError::Field {
            field: "host".to_string(),
            message: "Host is required".to_string(),
        })?)?;

        let secure = self.secure.unwrap_or(true);
        let port = PanelPort::new(self.port.unwrap_or(if secure { 443 } else { 80 }))?;

        let api_key = ApplicationApiKey::new(self.api_key.ok_or_else(|| {
            ValidationError::Field {
                field: "api_key".to_string(),
                message: "Application API key is required".to_string(),
            }
        })?)?;

        let connection =
            PanelConnection::new(host, port, api_key, secure, self.accept_invalid_certs)?;
        let panel_client = PanelClient::new(connection, self.config.clone())?;

        Ok(CapacityClient::from_source(
            Arc::new(panel_client),
            self.config,
            self.ranking,
        ))
    }
}

impl CapacityClient {
    /// Creates a new builder for CapacityClient configuration
    pub fn builder() -> CapacityClientBuilder {
        CapacityClientBuilder::default()
    }

    /// Builds a client on top of a custom usage source.
    ///
    /// Useful for tests and for panels reachable only through bespoke
    /// transports; production callers normally go through the builder.
    pub fn with_source(source: Arc<dyn UsageSource>, config: MonitorConfig) -> Self {
        Self::from_source(source, config, None)
    }

    fn from_source(
        source: Arc<dyn UsageSource>,
        config: MonitorConfig,
        ranking: Option<NodeRankingStrategy>,
    ) -> Self {
        let config = Arc::new(config);
        let monitor = Arc::new(NodeMonitorService::new(source, Arc::clone(&config)));
        let mut calculator = CapacityCalculator::new(Arc::clone(&monitor), config);
        if let Some(ranking) = ranking {
            calculator = calculator.with_ranking(ranking);
        }
        Self {
            monitor,
            calculator,
        }
    }

    /// Usage snapshot for one node; `None` when unknown or without data.
    pub async fn node_usage(&self, node_id: u32, force_refresh: bool) -> Option<NodeUsage> {
        self.monitor.node_usage(node_id, force_refresh).await
    }

    /// Usage snapshots for every known node.
    pub async fn all_nodes_usage(&self, force_refresh: bool) -> Vec<NodeUsage> {
        self.monitor.all_nodes_usage(force_refresh).await
    }

    /// Aggregate capacity of one location; `None` when the location has no
    /// nodes at all.
    pub async fn location_capacity(
        &self,
        location_id: u32,
        force_refresh: bool,
    ) -> Option<LocationCapacity> {
        self.monitor.location_capacity(location_id, force_refresh).await
    }

    /// Aggregate capacity of every known location.
    pub async fn all_locations_capacity(&self, force_refresh: bool) -> Vec<LocationCapacity> {
        self.monitor.all_locations_capacity(force_refresh).await
    }

    /// Global health summary for admin dashboards.
    pub async fn monitoring_stats(&self, force_refresh: bool) -> Option<MonitoringStats> {
        self.monitor.monitoring_stats(force_refresh).await
    }

    /// Checks whether a location can satisfy a requirement right now.
    pub async fn check_location_capacity(
        &self,
        location_id: u32,
        requirement: &CapacityRequirement,
        force_refresh: bool,
    ) -> CapacityCheckResult {
        self.calculator
            .check_location_capacity(location_id, requirement, force_refresh)
            .await
    }

    /// Picks the best node in a location for a requirement.
    pub async fn select_optimal_node(
        &self,
        location_id: u32,
        requirement: &CapacityRequirement,
        force_refresh: bool,
    ) -> NodeSelectionResult {
        self.calculator
            .select_optimal_node(location_id, requirement, force_refresh)
            .await
    }

    /// Checks several locations in one pass, preserving input order.
    pub async fn multi_location_capacity(
        &self,
        location_ids: &[u32],
        requirement: &CapacityRequirement,
        force_refresh: bool,
    ) -> Vec<CapacityCheckResult> {
        self.calculator
            .multi_location_capacity(location_ids, requirement, force_refresh)
            .await
    }

    /// All-locations overview for the admin capacity endpoint.
    pub async fn capacity_overview(
        &self,
        include_nodes: bool,
        include_stats: bool,
        force_refresh: bool,
    ) -> CapacityOverview {
        self.calculator
            .capacity_overview(include_nodes, include_stats, force_refresh)
            .await
    }

    /// Per-location creation eligibility for the user-facing endpoint.
    pub async fn server_creation_capacity(
        &self,
        requirement: &CapacityRequirement,
        force_refresh: bool,
    ) -> ServerCreationCapacity {
        self.calculator
            .server_creation_capacity(requirement, force_refresh)
            .await
    }
}

#[cfg(test)]
mod tests;
