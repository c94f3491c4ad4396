//! Wire models for the panel application API node listing.
//!
//! The `/api/application/nodes` endpoint returns a paginated envelope of
//! node objects; with `?include=servers` each node also embeds the servers
//! currently placed on it. Everything the panel may omit is optional or
//! defaulted so a sparse response still deserializes.

use serde::{Deserialize, Serialize};

/// A single node object from the application API.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct NodeObject {
    /// Object discriminator (always `"node"`).
    #[serde(default)]
    pub object: String,
    /// The node's attribute payload.
    pub attributes: NodeAttributes,
}

/// Attributes of a panel node.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct NodeAttributes {
    /// The node identifier (unique per panel).
    pub id: u32,
    /// Panel-assigned UUID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    /// Whether the node accepts automatic deployments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public: Option<bool>,
    /// Human-readable name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// The location this node belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_id: Option<u32>,
    /// Fully qualified domain name of the node daemon.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fqdn: Option<String>,
    /// Scheme the daemon is reachable over (e.g., "https").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
    /// Whether the node is currently in maintenance mode.
    #[serde(default)]
    pub maintenance_mode: bool,
    /// Configured memory capacity in MB.
    #[serde(default)]
    pub memory: u64,
    /// Memory overallocation percentage (negative disables overallocation).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_overallocate: Option<i64>,
    /// Configured disk capacity in MB.
    #[serde(default)]
    pub disk: u64,
    /// Disk overallocation percentage (negative disables overallocation).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk_overallocate: Option<i64>,
    /// Pre-aggregated allocation totals (newer panel versions).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allocated_resources: Option<AllocatedResources>,
    /// Included relationships, present with `?include=servers`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationships: Option<NodeRelationships>,
}

/// Allocation totals the panel computes across a node's servers.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AllocatedResources {
    /// Sum of server memory limits in MB.
    #[serde(default)]
    pub memory: u64,
    /// Sum of server disk limits in MB.
    #[serde(default)]
    pub disk: u64,
}

/// Relationships included alongside node attributes.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct NodeRelationships {
    /// Servers placed on this node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servers: Option<ServerList>,
}

/// An embedded list of server objects.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ServerList {
    #[serde(default)]
    pub data: Vec<ServerObject>,
}

/// A server object embedded in a node relationship.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ServerObject {
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub attributes: ServerAttributes,
}

/// Attributes of an embedded server; only its resource limits matter here.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ServerAttributes {
    /// Server identifier.
    #[serde(default)]
    pub id: u32,
    /// Server name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Per-server resource limits.
    #[serde(default)]
    pub limits: ServerLimits,
}

/// Resource limits assigned to one server.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ServerLimits {
    /// Memory limit in MB.
    #[serde(default)]
    pub memory: u64,
    /// Swap limit in MB (may be negative for unlimited).
    #[serde(default)]
    pub swap: i64,
    /// Disk limit in MB.
    #[serde(default)]
    pub disk: u64,
    /// Block IO weight.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub io: Option<u64>,
    /// CPU limit percentage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<u64>,
}

/// Pagination metadata from a list envelope.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Pagination {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub per_page: u64,
    #[serde(default)]
    pub current_page: u32,
    #[serde(default)]
    pub total_pages: u32,
}
