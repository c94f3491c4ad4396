//! Placement decisions over usage snapshots.
//!
//! Every operation is a pure function of the current (possibly cached)
//! snapshot plus the caller's requirement. "Cannot accommodate" is a normal
//! answer, never an error, so the route layer stays resilient when the
//! panel has no data.

use crate::capacity::application::response::capacity_overview::{
    CapacityOverview, LocationCreationEntry, LocationRecommendation, ServerCreationCapacity,
};
use crate::capacity::application::service::node_monitor_service::{
    NodeMonitorService, group_locations,
};
use crate::core::domain::model::{
    capacity_check::{CapacityCheckResult, CapacityRequirement, NodeSelectionResult, ProjectedUtilization},
    location_capacity::{LocationCapacity, LocationStatus, MonitoringStats},
    monitor_config::MonitorConfig,
    node_usage::NodeUsage,
};
use std::cmp::Ordering;
use std::sync::Arc;

/// How candidate nodes are ranked once filtered.
///
/// Kept as a strategy so the heuristic can be swapped without touching the
/// filtering and traversal around it. Ties always break by ascending node
/// id for determinism.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRankingStrategy {
    /// Prefer the node with the lowest utilization percentage after the
    /// placement. Spreads load instead of piling onto the biggest node.
    LowestProjectedUtilization,
    /// Prefer the node with the most absolute MB of headroom left after
    /// the placement.
    MostAbsoluteHeadroom,
}

impl NodeRankingStrategy {
    /// Sort key: lower is better.
    fn key(&self, node: &NodeUsage, requirement: &CapacityRequirement) -> f64 {
        match self {
            Self::LowestProjectedUtilization => node.projected_utilization(requirement),
            Self::MostAbsoluteHeadroom => {
                let memory_left = node.available_memory.saturating_sub(requirement.memory);
                let disk_left = node.available_disk.saturating_sub(requirement.disk);
                -((memory_left + disk_left) as f64)
            }
        }
    }

    fn reason(&self) -> &'static str {
        match self {
            Self::LowestProjectedUtilization => "lowest utilization after allocation",
            Self::MostAbsoluteHeadroom => "most remaining headroom after allocation",
        }
    }
}

/// Turns usage snapshots into placement decisions.
pub struct CapacityCalculator {
    monitor: Arc<NodeMonitorService>,
    config: Arc<MonitorConfig>,
    ranking: NodeRankingStrategy,
}

impl CapacityCalculator {
    pub fn new(monitor: Arc<NodeMonitorService>, config: Arc<MonitorConfig>) -> Self {
        Self {
            monitor,
            config,
            ranking: NodeRankingStrategy::LowestProjectedUtilization,
        }
    }

    /// Replaces the node ranking strategy.
    pub fn with_ranking(mut self, ranking: NodeRankingStrategy) -> Self {
        self.ranking = ranking;
        self
    }

    /// Checks whether one location can satisfy a requirement right now.
    pub async fn check_location_capacity(
        &self,
        location_id: u32,
        requirement: &CapacityRequirement,
        force_refresh: bool,
    ) -> CapacityCheckResult {
        let snapshot = self.monitor.all_nodes_usage(force_refresh).await;
        self.check_from_snapshot(&snapshot, location_id, requirement)
    }

    /// Picks the best node in a location for a requirement.
    pub async fn select_optimal_node(
        &self,
        location_id: u32,
        requirement: &CapacityRequirement,
        force_refresh: bool,
    ) -> NodeSelectionResult {
        let snapshot = self.monitor.all_nodes_usage(force_refresh).await;
        let nodes: Vec<NodeUsage> = snapshot
            .into_iter()
            .filter(|n| n.location_id == location_id)
            .collect();
        match self.select_from(&nodes, requirement) {
            Some(node) => NodeSelectionResult::selected(node, self.ranking.reason()),
            None => NodeSelectionResult::none(),
        }
    }

    /// Checks several locations against one requirement, preserving input
    /// order. Ranking is left to the caller.
    pub async fn multi_location_capacity(
        &self,
        location_ids: &[u32],
        requirement: &CapacityRequirement,
        force_refresh: bool,
    ) -> Vec<CapacityCheckResult> {
        let snapshot = self.monitor.all_nodes_usage(force_refresh).await;
        location_ids
            .iter()
            .map(|&id| self.check_from_snapshot(&snapshot, id, requirement))
            .collect()
    }

    /// Top locations by remaining capacity, for the admin overview.
    pub async fn recommend_by_available_capacity(
        &self,
        force_refresh: bool,
    ) -> Vec<LocationCapacity> {
        let locations = self.monitor.all_locations_capacity(force_refresh).await;
        top_by_available(locations)
    }

    /// Top locations for a specific placement, lowest projected utilization
    /// first, for the user-facing server-creation flow.
    pub async fn recommend_for_creation(
        &self,
        requirement: &CapacityRequirement,
        force_refresh: bool,
    ) -> Vec<LocationRecommendation> {
        let snapshot = self.monitor.all_nodes_usage(force_refresh).await;
        self.recommend_from_snapshot(&snapshot, requirement)
    }

    /// All-locations overview for the admin capacity endpoint.
    pub async fn capacity_overview(
        &self,
        include_nodes: bool,
        include_stats: bool,
        force_refresh: bool,
    ) -> CapacityOverview {
        let snapshot = self.monitor.all_nodes_usage(force_refresh).await;
        let locations = group_locations(&snapshot, &self.config);
        let recommended = top_by_available(locations.clone());
        let stats = if include_stats {
            MonitoringStats::from_nodes(&snapshot)
        } else {
            None
        };

        CapacityOverview {
            locations,
            nodes: include_nodes.then_some(snapshot),
            stats,
            recommended_locations: recommended,
        }
    }

    /// Per-location creation eligibility for the user-facing endpoint.
    pub async fn server_creation_capacity(
        &self,
        requirement: &CapacityRequirement,
        force_refresh: bool,
    ) -> ServerCreationCapacity {
        let snapshot = self.monitor.all_nodes_usage(force_refresh).await;
        let locations = group_locations(&snapshot, &self.config)
            .into_iter()
            .map(|capacity| {
                let check =
                    self.check_from_snapshot(&snapshot, capacity.location_id, requirement);
                LocationCreationEntry {
                    can_create_servers: check.can_accommodate,
                    capacity,
                }
            })
            .collect();

        ServerCreationCapacity {
            locations,
            recommended_locations: self.recommend_from_snapshot(&snapshot, requirement),
        }
    }

    /// Candidate filter plus ranked pick over one location's nodes.
    pub(crate) fn select_from<'a>(
        &self,
        nodes: &'a [NodeUsage],
        requirement: &CapacityRequirement,
    ) -> Option<&'a NodeUsage> {
        let mut candidates: Vec<&NodeUsage> = nodes
            .iter()
            .filter(|n| n.is_active() && n.fits(requirement))
            .collect();
        candidates.sort_by(|a, b| {
            self.ranking
                .key(a, requirement)
                .partial_cmp(&self.ranking.key(b, requirement))
                .unwrap_or(Ordering::Equal)
                .then(a.node_id.cmp(&b.node_id))
        });
        candidates.first().copied()
    }

    pub(crate) fn check_from_snapshot(
        &self,
        snapshot: &[NodeUsage],
        location_id: u32,
        requirement: &CapacityRequirement,
    ) -> CapacityCheckResult {
        let nodes: Vec<NodeUsage> = snapshot
            .iter()
            .filter(|n| n.location_id == location_id)
            .cloned()
            .collect();

        let capacity =
            match LocationCapacity::from_nodes(location_id, &nodes, &self.config.thresholds) {
                Some(capacity) => capacity,
                None => {
                    return CapacityCheckResult {
                        location_id,
                        can_accommodate: false,
                        location_status: LocationStatus::Unavailable,
                        available_nodes: 0,
                        utilization_after_creation: None,
                        warnings: vec![
                            "No capacity data is available for this location".to_string(),
                        ],
                    };
                }
            };

        let fitting = nodes
            .iter()
            .filter(|n| n.is_active() && n.fits(requirement))
            .count();
        let best = self.select_from(&nodes, requirement);

        let mut warnings = Vec::new();
        if fitting == 0 && capacity.active_nodes > 0 {
            warnings.push("No node in this location can fit the requested resources".to_string());
        }
        if let Some(node) = best {
            let projected = node.projected_utilization(requirement);
            if projected >= self.config.thresholds.warning_percent {
                warnings.push(format!(
                    "Selected node would run at {:.0}% utilization after placement",
                    projected
                ));
            }
        }
        if capacity.active_nodes == 1 {
            warnings.push("Location has a single active node and no failover headroom".to_string());
        }
        if capacity.status == LocationStatus::Limited {
            warnings.push("Location utilization is above the moderate threshold".to_string());
        }

        CapacityCheckResult {
            location_id,
            can_accommodate: fitting > 0,
            location_status: capacity.status,
            available_nodes: fitting,
            utilization_after_creation: best.map(|node| ProjectedUtilization {
                memory_percentage: node.projected_memory_percentage(requirement.memory),
                disk_percentage: node.projected_disk_percentage(requirement.disk),
            }),
            warnings,
        }
    }

    fn recommend_from_snapshot(
        &self,
        snapshot: &[NodeUsage],
        requirement: &CapacityRequirement,
    ) -> Vec<LocationRecommendation> {
        let mut recommendations: Vec<LocationRecommendation> =
            group_locations(snapshot, &self.config)
                .into_iter()
                .filter_map(|capacity| {
                    let nodes: Vec<NodeUsage> = snapshot
                        .iter()
                        .filter(|n| n.location_id == capacity.location_id)
                        .cloned()
                        .collect();
                    let best = self.select_from(&nodes, requirement)?;
                    Some(LocationRecommendation {
                        location_id: capacity.location_id,
                        status: capacity.status,
                        projected_utilization: best.projected_utilization(requirement),
                    })
                })
                .collect();
        recommendations.sort_by(|a, b| {
            a.projected_utilization
                .partial_cmp(&b.projected_utilization)
                .unwrap_or(Ordering::Equal)
                .then(a.location_id.cmp(&b.location_id))
        });
        recommendations.truncate(3);
        recommendations
    }
}

/// Up to three usable locations with the most remaining capacity first.
fn top_by_available(mut locations: Vec<LocationCapacity>) -> Vec<LocationCapacity> {
    locations.retain(|l| l.status != LocationStatus::Unavailable);
    locations.sort_by(|a, b| {
        (b.available_memory, b.available_disk).cmp(&(a.available_memory, a.available_disk))
    });
    locations.truncate(3);
    locations
}
