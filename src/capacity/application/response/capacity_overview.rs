//! Response shapes consumed by the dashboard route layer.
//!
//! These are plain serde structs; transport, status codes and route-level
//! caching stay with the consumer.

use crate::core::domain::model::{
    location_capacity::{LocationCapacity, LocationStatus, MonitoringStats},
    node_usage::NodeUsage,
};
use serde::{Deserialize, Serialize};

/// One location recommended for a specific placement.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LocationRecommendation {
    pub location_id: u32,
    pub status: LocationStatus,
    /// Utilization of the node that would host the server, after placement.
    pub projected_utilization: f64,
}

/// All-locations overview for the admin capacity endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CapacityOverview {
    pub locations: Vec<LocationCapacity>,
    /// Per-node detail, present when the caller asked for it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodes: Option<Vec<NodeUsage>>,
    /// Global summary, present when the caller asked for it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<MonitoringStats>,
    /// Up to three locations with the most remaining capacity.
    pub recommended_locations: Vec<LocationCapacity>,
}

/// A location's eligibility for new server creation.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LocationCreationEntry {
    #[serde(flatten)]
    pub capacity: LocationCapacity,
    pub can_create_servers: bool,
}

/// User-facing overview for the server-creation flow.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ServerCreationCapacity {
    pub locations: Vec<LocationCreationEntry>,
    /// Up to three accommodating locations, lowest projected utilization first.
    pub recommended_locations: Vec<LocationRecommendation>,
}
