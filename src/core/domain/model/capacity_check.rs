//! Request and result shapes for capacity checks and node selection.

use crate::core::domain::model::location_capacity::LocationStatus;
use crate::core::domain::model::node_usage::NodeUsage;
use serde::{Deserialize, Serialize};

/// A caller-supplied resource ask, in MB.
///
/// `cpu` is accepted for forward compatibility but is informational only;
/// no capacity check gates on it.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CapacityRequirement {
    /// Required memory in MB.
    pub memory: u64,
    /// Required disk in MB.
    pub disk: u64,
    /// Requested CPU percentage, not enforced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<u64>,
}

/// Projected node utilization if the requirement were placed.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ProjectedUtilization {
    pub memory_percentage: f64,
    pub disk_percentage: f64,
}

/// Outcome of checking one location against one requirement.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CapacityCheckResult {
    /// The location that was checked.
    pub location_id: u32,
    /// At least one active node can individually satisfy the requirement.
    pub can_accommodate: bool,
    /// Aggregate status of the location at check time.
    pub location_status: LocationStatus,
    /// Count of active nodes that individually fit the requirement.
    pub available_nodes: usize,
    /// Utilization of the node that would be selected, after placement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utilization_after_creation: Option<ProjectedUtilization>,
    /// Ordered human-readable caveats.
    pub warnings: Vec<String>,
}

/// The node picked for a placement, with the state that justified the pick.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SelectedNode {
    pub node_id: u32,
    pub node_name: String,
    pub fqdn: String,
    pub available_memory: u64,
    pub available_disk: u64,
    /// Short human explanation of why this node won.
    pub selection_reason: String,
}

/// Outcome of picking a node within a location.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct NodeSelectionResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_node: Option<SelectedNode>,
}

impl NodeSelectionResult {
    /// A successful selection of the given node.
    pub(crate) fn selected(node: &NodeUsage, reason: impl Into<String>) -> Self {
        Self {
            success: true,
            selected_node: Some(SelectedNode {
                node_id: node.node_id,
                node_name: node.node_name.clone(),
                fqdn: node.fqdn.clone(),
                available_memory: node.available_memory,
                available_disk: node.available_disk,
                selection_reason: reason.into(),
            }),
        }
    }

    /// No node in the location qualified.
    pub(crate) fn none() -> Self {
        Self {
            success: false,
            selected_node: None,
        }
    }
}
