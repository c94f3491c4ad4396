//! Aggregated capacity views: per-location rollups and the global summary.

use crate::core::domain::model::monitor_config::CapacityThresholds;
use crate::core::domain::model::node_usage::NodeUsage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Placement status of a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationStatus {
    /// Comfortable headroom on at least one dimension.
    Available,
    /// Utilization crossed the moderate threshold on memory or disk.
    Limited,
    /// Both dimensions exhausted, or no node can fit even a minimal server.
    Full,
    /// No node in the location is online and out of maintenance.
    Unavailable,
}

/// Aggregate capacity of one location.
///
/// Capacity sums cover active nodes only (online, not in maintenance) and
/// are expressed against effective limits, so overallocation and safety
/// margins are already applied.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LocationCapacity {
    /// The location identifier.
    pub location_id: u32,
    /// Derived placement status.
    pub status: LocationStatus,
    /// All nodes known in this location, whatever their state.
    pub total_nodes: usize,
    /// Nodes that are online and not in maintenance.
    pub active_nodes: usize,
    /// Summed effective memory capacity of active nodes.
    pub total_memory: u64,
    /// Summed effective disk capacity of active nodes.
    pub total_disk: u64,
    /// Memory still placeable across active nodes.
    pub available_memory: u64,
    /// Disk still placeable across active nodes.
    pub available_disk: u64,
    /// Allocated / effective memory across active nodes, clamped 0-100.
    pub memory_usage_percentage: f64,
    /// Allocated / effective disk across active nodes, clamped 0-100.
    pub disk_usage_percentage: f64,
    /// Most recent snapshot time among the location's nodes.
    pub fetched_at: DateTime<Utc>,
}

impl LocationCapacity {
    /// Rolls a location's node snapshots up into an aggregate.
    ///
    /// Returns `None` when the slice is empty: a location with no nodes at
    /// all is unknown, which callers must distinguish from a location whose
    /// nodes are merely inactive (`status == Unavailable`).
    pub(crate) fn from_nodes(
        location_id: u32,
        nodes: &[NodeUsage],
        thresholds: &CapacityThresholds,
    ) -> Option<Self> {
        if nodes.is_empty() {
            return None;
        }

        let active: Vec<&NodeUsage> = nodes.iter().filter(|n| n.is_active()).collect();
        let total_memory: u64 = active.iter().map(|n| n.effective_memory_limit).sum();
        let total_disk: u64 = active.iter().map(|n| n.effective_disk_limit).sum();
        let allocated_memory: u64 = active.iter().map(|n| n.allocated_memory).sum();
        let allocated_disk: u64 = active.iter().map(|n| n.allocated_disk).sum();
        let available_memory: u64 = active.iter().map(|n| n.available_memory).sum();
        let available_disk: u64 = active.iter().map(|n| n.available_disk).sum();

        let memory_usage_percentage = aggregate_percentage(allocated_memory, total_memory);
        let disk_usage_percentage = aggregate_percentage(allocated_disk, total_disk);

        let status = derive_status(
            &active,
            memory_usage_percentage,
            disk_usage_percentage,
            thresholds,
        );

        let fetched_at = nodes
            .iter()
            .map(|n| n.fetched_at)
            .max()
            .unwrap_or_else(Utc::now);

        Some(Self {
            location_id,
            status,
            total_nodes: nodes.len(),
            active_nodes: active.len(),
            total_memory,
            total_disk,
            available_memory,
            available_disk,
            memory_usage_percentage,
            disk_usage_percentage,
            fetched_at,
        })
    }
}

fn derive_status(
    active: &[&NodeUsage],
    memory_percentage: f64,
    disk_percentage: f64,
    thresholds: &CapacityThresholds,
) -> LocationStatus {
    if active.is_empty() {
        return LocationStatus::Unavailable;
    }

    let saturated =
        memory_percentage >= thresholds.full_percent && disk_percentage >= thresholds.full_percent;
    let fits_minimum = active.iter().any(|n| {
        n.available_memory >= thresholds.min_viable_memory
            && n.available_disk >= thresholds.min_viable_disk
    });
    if saturated || !fits_minimum {
        return LocationStatus::Full;
    }

    if memory_percentage >= thresholds.limited_percent
        || disk_percentage >= thresholds.limited_percent
    {
        return LocationStatus::Limited;
    }

    LocationStatus::Available
}

fn aggregate_percentage(allocated: u64, limit: u64) -> f64 {
    if limit == 0 {
        return if allocated == 0 { 0.0 } else { 100.0 };
    }
    (allocated as f64 / limit as f64 * 100.0).clamp(0.0, 100.0)
}

/// Global health summary across the whole inventory, for admin dashboards.
///
/// Node counts cover every known node; capacity sums cover active nodes,
/// mirroring the per-location aggregates.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MonitoringStats {
    pub total_nodes: usize,
    pub online_nodes: usize,
    pub nodes_in_maintenance: usize,
    pub total_locations: usize,
    pub total_memory: u64,
    pub allocated_memory: u64,
    pub total_available_memory: u64,
    pub total_disk: u64,
    pub allocated_disk: u64,
    pub total_available_disk: u64,
    pub memory_usage_percentage: f64,
    pub disk_usage_percentage: f64,
    pub fetched_at: DateTime<Utc>,
}

impl MonitoringStats {
    /// Summarizes the full inventory; `None` when no snapshot exists.
    pub(crate) fn from_nodes(nodes: &[NodeUsage]) -> Option<Self> {
        if nodes.is_empty() {
            return None;
        }

        let active: Vec<&NodeUsage> = nodes.iter().filter(|n| n.is_active()).collect();
        let total_memory: u64 = active.iter().map(|n| n.effective_memory_limit).sum();
        let total_disk: u64 = active.iter().map(|n| n.effective_disk_limit).sum();
        let allocated_memory: u64 = active.iter().map(|n| n.allocated_memory).sum();
        let allocated_disk: u64 = active.iter().map(|n| n.allocated_disk).sum();

        let mut locations: Vec<u32> = nodes.iter().map(|n| n.location_id).collect();
        locations.sort_unstable();
        locations.dedup();

        Some(Self {
            total_nodes: nodes.len(),
            online_nodes: nodes.iter().filter(|n| n.online).count(),
            nodes_in_maintenance: nodes.iter().filter(|n| n.maintenance_mode).count(),
            total_locations: locations.len(),
            total_memory,
            allocated_memory,
            total_available_memory: active.iter().map(|n| n.available_memory).sum(),
            total_disk,
            allocated_disk,
            total_available_disk: active.iter().map(|n| n.available_disk).sum(),
            memory_usage_percentage: aggregate_percentage(allocated_memory, total_memory),
            disk_usage_percentage: aggregate_percentage(allocated_disk, total_disk),
            fetched_at: nodes
                .iter()
                .map(|n| n.fetched_at)
                .max()
                .unwrap_or_else(Utc::now),
        })
    }
}
