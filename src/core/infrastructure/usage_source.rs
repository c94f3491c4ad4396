use crate::core::domain::{error::CapacityResult, model::application_node::NodeObject};
use async_trait::async_trait;

/// The Panel Usage Source boundary.
///
/// Anything that can produce the panel's current node inventory (with
/// embedded server allocations) can back the monitor. The production
/// implementation is [`PanelClient`](crate::core::infrastructure::panel_client::PanelClient);
/// tests substitute mocks.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsageSource: Send + Sync {
    /// Fetches the complete node inventory from the panel.
    ///
    /// # Errors
    /// Returns `CapacityError` when the panel is unreachable, rejects the
    /// credentials, or answers with an unusable payload.
    async fn fetch_nodes(&self) -> CapacityResult<Vec<NodeObject>>;
}
