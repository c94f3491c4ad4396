//! Inventory polling, normalization and caching.
//!
//! The monitor shields callers from the panel API's latency and shape. All
//! reads go through one cached inventory snapshot with a short TTL; misses
//! coalesce onto a single upstream fetch, and upstream failures degrade to
//! the last known snapshot instead of erroring.

use crate::core::domain::model::{
    application_node::NodeObject,
    location_capacity::{LocationCapacity, MonitoringStats},
    monitor_config::MonitorConfig,
    node_usage::NodeUsage,
};
use crate::core::infrastructure::{snapshot_cache::SnapshotCache, usage_source::UsageSource};
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

const INVENTORY_KEY: &str = "inventory";

/// Produces fresh-enough, normalized node and location capacity views.
pub struct NodeMonitorService {
    source: Arc<dyn UsageSource>,
    cache: SnapshotCache<&'static str, Vec<NodeUsage>>,
    config: Arc<MonitorConfig>,
}

impl NodeMonitorService {
    pub fn new(source: Arc<dyn UsageSource>, config: Arc<MonitorConfig>) -> Self {
        Self {
            source,
            cache: SnapshotCache::new(),
            config,
        }
    }

    /// Current usage snapshots for every known node, sorted by node id.
    ///
    /// Serves the cached inventory while it is younger than the TTL unless
    /// `force_refresh` is set. On upstream failure the last known snapshot
    /// is served with its original `fetched_at`; with no snapshot at all the
    /// result is empty and callers surface "capacity data unavailable".
    pub async fn all_nodes_usage(&self, force_refresh: bool) -> Vec<NodeUsage> {
        if !force_refresh {
            if let Some(cached) = self
                .cache
                .get_fresh(&INVENTORY_KEY, self.config.cache_ttl)
                .await
            {
                return cached;
            }
        }

        let guard = self.cache.refresh_guard(&INVENTORY_KEY).await;
        let _refresh = guard.lock().await;

        // Another caller may have repopulated the entry while we waited.
        if !force_refresh {
            if let Some(cached) = self
                .cache
                .get_fresh(&INVENTORY_KEY, self.config.cache_ttl)
                .await
            {
                return cached;
            }
        }

        match self.source.fetch_nodes().await {
            Ok(raw) => {
                let snapshot = self.normalize(raw).await;
                self.cache.insert(INVENTORY_KEY, snapshot.clone()).await;
                snapshot
            }
            Err(e) => {
                warn!(error = %e, "inventory fetch failed, serving last known snapshot");
                self.cache.get_any(&INVENTORY_KEY).await.unwrap_or_default()
            }
        }
    }

    /// Usage snapshot for one node; `None` when the node is unknown or no
    /// capacity data exists.
    pub async fn node_usage(&self, node_id: u32, force_refresh: bool) -> Option<NodeUsage> {
        self.all_nodes_usage(force_refresh)
            .await
            .into_iter()
            .find(|n| n.node_id == node_id)
    }

    /// Aggregate capacity for one location.
    ///
    /// `None` only when the location has no nodes at all; a location whose
    /// nodes are all offline or in maintenance reports
    /// `LocationStatus::Unavailable` instead.
    pub async fn location_capacity(
        &self,
        location_id: u32,
        force_refresh: bool,
    ) -> Option<LocationCapacity> {
        let nodes: Vec<NodeUsage> = self
            .all_nodes_usage(force_refresh)
            .await
            .into_iter()
            .filter(|n| n.location_id == location_id)
            .collect();
        LocationCapacity::from_nodes(location_id, &nodes, &self.config.thresholds)
    }

    /// Aggregate capacity for every known location, ordered by location id.
    pub async fn all_locations_capacity(&self, force_refresh: bool) -> Vec<LocationCapacity> {
        let nodes = self.all_nodes_usage(force_refresh).await;
        group_locations(&nodes, &self.config)
    }

    /// Global health summary for admin dashboards; `None` without data.
    pub async fn monitoring_stats(&self, force_refresh: bool) -> Option<MonitoringStats> {
        let nodes = self.all_nodes_usage(force_refresh).await;
        MonitoringStats::from_nodes(&nodes)
    }

    /// Turns the raw panel payload into domain snapshots.
    ///
    /// Nodes that were in the previous snapshot but are missing from this
    /// fetch are carried forward flagged offline with zeroed availability,
    /// so aggregates keep counting them without offering their capacity.
    async fn normalize(&self, raw: Vec<NodeObject>) -> Vec<NodeUsage> {
        let fetched_at = Utc::now();
        let total = raw.len();
        let mut nodes: Vec<NodeUsage> = raw
            .iter()
            .filter_map(|n| {
                NodeUsage::from_panel(&n.attributes, self.config.safety_margin_percent, fetched_at)
            })
            .collect();
        if nodes.len() < total {
            debug!(
                skipped = total - nodes.len(),
                "dropped nodes without a location from the snapshot"
            );
        }

        if let Some(previous) = self.cache.get_any(&INVENTORY_KEY).await {
            for old in previous {
                if !nodes.iter().any(|n| n.node_id == old.node_id) {
                    debug!(
                        node_id = old.node_id,
                        "node missing from inventory, carrying forward as offline"
                    );
                    nodes.push(old.offline_copy());
                }
            }
        }

        nodes.sort_by_key(|n| n.node_id);
        nodes
    }
}

/// Rolls node snapshots up into per-location aggregates, ordered by id.
pub(crate) fn group_locations(nodes: &[NodeUsage], config: &MonitorConfig) -> Vec<LocationCapacity> {
    let mut by_location: BTreeMap<u32, Vec<NodeUsage>> = BTreeMap::new();
    for node in nodes {
        by_location
            .entry(node.location_id)
            .or_default()
            .push(node.clone());
    }
    by_location
        .into_iter()
        .filter_map(|(location_id, nodes)| {
            LocationCapacity::from_nodes(location_id, &nodes, &config.thresholds)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::domain::error::{CapacityError, CapacityResult};
    use crate::core::domain::model::application_node::{
        AllocatedResources, NodeAttributes, NodeObject,
    };
    use crate::core::domain::model::location_capacity::LocationStatus;
    use crate::core::infrastructure::usage_source::MockUsageSource;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn panel_node(id: u32, location_id: u32, memory: u64, allocated: u64) -> NodeObject {
        NodeObject {
            object: "node".to_string(),
            attributes: NodeAttributes {
                id,
                uuid: None,
                public: Some(true),
                name: Some(format!("node-{}", id)),
                location_id: Some(location_id),
                fqdn: Some(format!("n{}.example.com", id)),
                scheme: Some("https".to_string()),
                maintenance_mode: false,
                memory,
                memory_overallocate: Some(0),
                disk: 102400,
                disk_overallocate: Some(0),
                allocated_resources: Some(AllocatedResources {
                    memory: allocated,
                    disk: 10240,
                }),
                relationships: None,
            },
        }
    }

    fn service_with(
        source: impl UsageSource + 'static,
        config: MonitorConfig,
    ) -> NodeMonitorService {
        NodeMonitorService::new(Arc::new(source), Arc::new(config))
    }

    #[tokio::test]
    async fn test_snapshot_cached_within_ttl() {
        let mut source = MockUsageSource::new();
        source
            .expect_fetch_nodes()
            .times(1)
            .returning(|| Ok(vec![panel_node(1, 10, 8192, 2048)]));

        let monitor = service_with(source, MonitorConfig::default());
        let first = monitor.all_nodes_usage(false).await;
        let second = monitor.all_nodes_usage(false).await;

        assert_eq!(first.len(), 1);
        // Identical snapshot, including the timestamp; no second fetch.
        assert_eq!(first[0].fetched_at, second[0].fetched_at);
    }

    #[tokio::test]
    async fn test_force_refresh_always_refetches() {
        let mut source = MockUsageSource::new();
        source
            .expect_fetch_nodes()
            .times(2)
            .returning(|| Ok(vec![panel_node(1, 10, 8192, 2048)]));

        let monitor = service_with(source, MonitorConfig::default());
        monitor.all_nodes_usage(false).await;
        let refreshed = monitor.all_nodes_usage(true).await;
        assert_eq!(refreshed.len(), 1);
    }

    #[tokio::test]
    async fn test_failure_serves_last_known_snapshot() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_in_mock = Arc::clone(&calls);
        let mut source = MockUsageSource::new();
        source.expect_fetch_nodes().returning(move || {
            if calls_in_mock.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok(vec![panel_node(1, 10, 8192, 2048)])
            } else {
                Err(CapacityError::Connection("panel unreachable".to_string()))
            }
        });

        let monitor = service_with(source, MonitorConfig::default());
        let first = monitor.all_nodes_usage(false).await;
        let degraded = monitor.all_nodes_usage(true).await;

        assert_eq!(degraded, first);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failure_without_history_is_empty() {
        let mut source = MockUsageSource::new();
        source
            .expect_fetch_nodes()
            .returning(|| Err(CapacityError::Connection("panel unreachable".to_string())));

        let monitor = service_with(source, MonitorConfig::default());
        assert!(monitor.all_nodes_usage(false).await.is_empty());
        assert!(monitor.monitoring_stats(false).await.is_none());
    }

    #[tokio::test]
    async fn test_missing_node_carried_forward_offline() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_in_mock = Arc::clone(&calls);
        let mut source = MockUsageSource::new();
        source.expect_fetch_nodes().returning(move || {
            if calls_in_mock.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok(vec![
                    panel_node(1, 10, 8192, 2048),
                    panel_node(2, 10, 4096, 1024),
                ])
            } else {
                Ok(vec![panel_node(1, 10, 8192, 2048)])
            }
        });

        let monitor = service_with(source, MonitorConfig::default());
        monitor.all_nodes_usage(false).await;
        let snapshot = monitor.all_nodes_usage(true).await;

        assert_eq!(snapshot.len(), 2);
        let dropped = snapshot.iter().find(|n| n.node_id == 2).unwrap();
        assert!(!dropped.online);
        assert_eq!(dropped.available_memory, 0);

        // The offline node no longer contributes to location capacity.
        let capacity = monitor.location_capacity(10, false).await.unwrap();
        assert_eq!(capacity.total_nodes, 2);
        assert_eq!(capacity.active_nodes, 1);
    }

    #[tokio::test]
    async fn test_node_usage_unknown_id_is_none() {
        let mut source = MockUsageSource::new();
        source
            .expect_fetch_nodes()
            .returning(|| Ok(vec![panel_node(1, 10, 8192, 2048)]));

        let monitor = service_with(source, MonitorConfig::default());
        assert!(monitor.node_usage(99, false).await.is_none());
        assert!(monitor.node_usage(1, false).await.is_some());
    }

    #[tokio::test]
    async fn test_location_capacity_none_for_unknown_location() {
        let mut source = MockUsageSource::new();
        source
            .expect_fetch_nodes()
            .returning(|| Ok(vec![panel_node(1, 10, 8192, 2048)]));

        let monitor = service_with(source, MonitorConfig::default());
        assert!(monitor.location_capacity(99, false).await.is_none());
    }

    #[tokio::test]
    async fn test_all_locations_capacity_ordered_by_id() {
        let mut source = MockUsageSource::new();
        source.expect_fetch_nodes().returning(|| {
            Ok(vec![
                panel_node(3, 20, 8192, 0),
                panel_node(1, 10, 8192, 0),
                panel_node(2, 10, 4096, 0),
            ])
        });

        let monitor = service_with(source, MonitorConfig::default());
        let locations = monitor.all_locations_capacity(false).await;
        assert_eq!(locations.len(), 2);
        assert_eq!(locations[0].location_id, 10);
        assert_eq!(locations[0].total_nodes, 2);
        assert_eq!(locations[1].location_id, 20);
        assert_eq!(locations[1].status, LocationStatus::Available);
    }

    // Hand-rolled source for the concurrency test: a slow fetch with a call
    // counter, so coalescing is observable.
    struct SlowSource {
        calls: Arc<AtomicU32>,
    }

    #[async_trait]
    impl UsageSource for SlowSource {
        async fn fetch_nodes(&self) -> CapacityResult<Vec<NodeObject>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(vec![panel_node(1, 10, 8192, 2048)])
        }
    }

    #[tokio::test]
    async fn test_concurrent_misses_coalesce_into_one_fetch() {
        let calls = Arc::new(AtomicU32::new(0));
        let monitor = Arc::new(service_with(
            SlowSource {
                calls: Arc::clone(&calls),
            },
            MonitorConfig::default(),
        ));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let monitor = Arc::clone(&monitor);
                tokio::spawn(async move { monitor.all_nodes_usage(false).await })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.await.unwrap().len(), 1);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
