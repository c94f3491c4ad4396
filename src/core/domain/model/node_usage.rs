//! Normalized per-node usage snapshots.
//!
//! `NodeUsage` is the strongly-typed view the rest of the crate works with.
//! `from_panel` is the single adapter boundary that turns the loosely-typed
//! panel payload into it, treating absent or unusable fields as zero rather
//! than failing the whole inventory.

use crate::core::domain::model::application_node::NodeAttributes;
use crate::core::domain::model::capacity_check::CapacityRequirement;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A point-in-time capacity snapshot of one node.
///
/// All memory and disk figures are in MB. `effective_*_limit` is the
/// configured capacity adjusted for the panel's overallocation percentage
/// and the client's safety margin; `available_*` is floored at zero.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct NodeUsage {
    /// The node identifier.
    pub node_id: u32,
    /// The location this node belongs to.
    pub location_id: u32,
    /// Human-readable name.
    pub node_name: String,
    /// Fully qualified domain name of the node daemon.
    pub fqdn: String,
    /// Configured memory capacity.
    pub total_memory: u64,
    /// Configured disk capacity.
    pub total_disk: u64,
    /// Sum of memory limits of servers placed on the node.
    pub allocated_memory: u64,
    /// Sum of disk limits of servers placed on the node.
    pub allocated_disk: u64,
    /// Memory capacity after overallocation and safety-margin adjustment.
    pub effective_memory_limit: u64,
    /// Disk capacity after overallocation and safety-margin adjustment.
    pub effective_disk_limit: u64,
    /// Memory still placeable on this node.
    pub available_memory: u64,
    /// Disk still placeable on this node.
    pub available_disk: u64,
    /// Node is excluded from placements while in maintenance.
    pub maintenance_mode: bool,
    /// Node was present in the latest successful inventory fetch.
    pub online: bool,
    /// When this snapshot was taken.
    pub fetched_at: DateTime<Utc>,
}

impl NodeUsage {
    /// Normalizes a panel node payload into a usage snapshot.
    ///
    /// Returns `None` for nodes without a location, which cannot take part
    /// in placement. Allocation totals prefer the panel's pre-aggregated
    /// `allocated_resources`; when absent they are derived from the embedded
    /// server limits, and default to zero if neither is present.
    pub(crate) fn from_panel(
        attributes: &NodeAttributes,
        safety_margin_percent: u8,
        fetched_at: DateTime<Utc>,
    ) -> Option<Self> {
        let location_id = attributes.location_id?;

        let (allocated_memory, allocated_disk) = match &attributes.allocated_resources {
            Some(totals) => (totals.memory, totals.disk),
            None => attributes
                .relationships
                .as_ref()
                .and_then(|rel| rel.servers.as_ref())
                .map(|servers| {
                    servers.data.iter().fold((0u64, 0u64), |(mem, disk), s| {
                        (mem + s.attributes.limits.memory, disk + s.attributes.limits.disk)
                    })
                })
                .unwrap_or((0, 0)),
        };

        let effective_memory_limit = effective_limit(
            attributes.memory,
            attributes.memory_overallocate,
            safety_margin_percent,
        );
        let effective_disk_limit = effective_limit(
            attributes.disk,
            attributes.disk_overallocate,
            safety_margin_percent,
        );

        Some(Self {
            node_id: attributes.id,
            location_id,
            node_name: attributes
                .name
                .clone()
                .unwrap_or_else(|| format!("node-{}", attributes.id)),
            fqdn: attributes.fqdn.clone().unwrap_or_default(),
            total_memory: attributes.memory,
            total_disk: attributes.disk,
            allocated_memory,
            allocated_disk,
            effective_memory_limit,
            effective_disk_limit,
            available_memory: effective_memory_limit.saturating_sub(allocated_memory),
            available_disk: effective_disk_limit.saturating_sub(allocated_disk),
            maintenance_mode: attributes.maintenance_mode,
            online: true,
            fetched_at,
        })
    }

    /// A node can host new servers only when online and not in maintenance.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.online && !self.maintenance_mode
    }

    /// Whether this node individually satisfies a resource requirement.
    ///
    /// CPU is informational in the requirement and never gates here.
    #[must_use]
    pub fn fits(&self, requirement: &CapacityRequirement) -> bool {
        self.available_memory >= requirement.memory && self.available_disk >= requirement.disk
    }

    /// Current memory utilization percentage, clamped to 0-100.
    #[must_use]
    pub fn memory_usage_percentage(&self) -> f64 {
        usage_percentage(self.allocated_memory, self.effective_memory_limit)
    }

    /// Current disk utilization percentage, clamped to 0-100.
    #[must_use]
    pub fn disk_usage_percentage(&self) -> f64 {
        usage_percentage(self.allocated_disk, self.effective_disk_limit)
    }

    /// Memory utilization percentage if `extra` MB were placed on the node.
    #[must_use]
    pub fn projected_memory_percentage(&self, extra: u64) -> f64 {
        usage_percentage(self.allocated_memory + extra, self.effective_memory_limit)
    }

    /// Disk utilization percentage if `extra` MB were placed on the node.
    #[must_use]
    pub fn projected_disk_percentage(&self, extra: u64) -> f64 {
        usage_percentage(self.allocated_disk + extra, self.effective_disk_limit)
    }

    /// Worst-dimension utilization percentage after hypothetically placing
    /// the requirement on this node.
    #[must_use]
    pub fn projected_utilization(&self, requirement: &CapacityRequirement) -> f64 {
        self.projected_memory_percentage(requirement.memory)
            .max(self.projected_disk_percentage(requirement.disk))
    }

    /// Snapshot of a node that dropped out of the inventory: flagged offline
    /// with no placeable capacity, original `fetched_at` preserved.
    pub(crate) fn offline_copy(&self) -> Self {
        Self {
            online: false,
            available_memory: 0,
            available_disk: 0,
            ..self.clone()
        }
    }
}

/// Capacity after applying the panel overallocation percentage and the
/// client safety margin. Negative overallocation percentages are treated
/// as zero; the margin is capped at 100.
fn effective_limit(total: u64, overallocate: Option<i64>, safety_margin_percent: u8) -> u64 {
    let overallocate = overallocate.unwrap_or(0).max(0) as u64;
    let margin = u64::from(safety_margin_percent.min(100));
    let overallocated = total.saturating_mul(100 + overallocate) / 100;
    overallocated.saturating_mul(100 - margin) / 100
}

fn usage_percentage(allocated: u64, limit: u64) -> f64 {
    if limit == 0 {
        return if allocated == 0 { 0.0 } else { 100.0 };
    }
    (allocated as f64 / limit as f64 * 100.0).clamp(0.0, 100.0)
}
