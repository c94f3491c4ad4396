//! End-to-end monitoring tests against a mock panel.

use crate::{CapacityClient, LocationStatus, MonitorConfig};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TEST_KEY: &str = "ptla_0123456789abcdef0123456789abcdef0123456789ab";

fn client_for(mock_server: &MockServer, config: MonitorConfig) -> CapacityClient {
    let parsed = url::Url::parse(&mock_server.uri()).unwrap();
    CapacityClient::builder()
        .host(parsed.host_str().unwrap())
        .port(parsed.port().unwrap())
        .secure(false)
        .api_key(TEST_KEY)
        .config(config)
        .build()
        .unwrap()
}

fn node_json(
    id: u32,
    location_id: u32,
    memory: u64,
    allocated_memory: u64,
    maintenance: bool,
) -> serde_json::Value {
    serde_json::json!({
        "object": "node",
        "attributes": {
            "id": id,
            "name": format!("node-{}", id),
            "location_id": location_id,
            "fqdn": format!("n{}.example.com", id),
            "maintenance_mode": maintenance,
            "memory": memory,
            "memory_overallocate": 0,
            "disk": 102400,
            "disk_overallocate": 0,
            "allocated_resources": { "memory": allocated_memory, "disk": 10240 }
        }
    })
}

fn inventory_response(nodes: Vec<serde_json::Value>) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "object": "list",
        "data": nodes,
        "meta": { "pagination": { "total_pages": 1 } }
    }))
}

#[tokio::test]
async fn test_inventory_is_normalized_and_aggregated() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/application/nodes"))
        .respond_with(inventory_response(vec![
            node_json(1, 1, 8192, 4096, false),
            node_json(2, 1, 4096, 3900, false),
            node_json(3, 2, 16384, 0, true),
        ]))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, MonitorConfig::default());

    let nodes = client.all_nodes_usage(false).await;
    assert_eq!(nodes.len(), 3);
    assert_eq!(nodes[0].node_id, 1);
    assert_eq!(nodes[0].available_memory, 4096);
    assert_eq!(nodes[1].available_memory, 196);
    assert!(nodes[2].maintenance_mode);

    let location = client.location_capacity(1, false).await.unwrap();
    assert_eq!(location.active_nodes, 2);
    assert_eq!(location.available_memory, 4096 + 196);

    // Location 2 only has a maintenance node: unavailable, never None.
    let parked = client.location_capacity(2, false).await.unwrap();
    assert_eq!(parked.status, LocationStatus::Unavailable);
    assert_eq!(parked.active_nodes, 0);

    assert!(client.location_capacity(99, false).await.is_none());

    let stats = client.monitoring_stats(false).await.unwrap();
    assert_eq!(stats.total_nodes, 3);
    assert_eq!(stats.online_nodes, 3);
    assert_eq!(stats.nodes_in_maintenance, 1);
    assert_eq!(stats.total_locations, 2);
}

#[tokio::test]
async fn test_overallocation_raises_effective_limits() {
    let mock_server = MockServer::start().await;
    let mut node = node_json(1, 1, 8192, 4096, false);
    node["attributes"]["memory_overallocate"] = serde_json::json!(50);
    Mock::given(method("GET"))
        .and(path("/api/application/nodes"))
        .respond_with(inventory_response(vec![node]))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, MonitorConfig::default());
    let usage = client.node_usage(1, false).await.unwrap();
    assert_eq!(usage.total_memory, 8192);
    assert_eq!(usage.effective_memory_limit, 12288);
    assert_eq!(usage.available_memory, 8192);
}

#[tokio::test]
async fn test_snapshot_served_from_cache_within_ttl() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/application/nodes"))
        .respond_with(inventory_response(vec![node_json(1, 1, 8192, 0, false)]))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, MonitorConfig::default());
    let first = client.all_nodes_usage(false).await;
    let second = client.all_nodes_usage(false).await;
    assert_eq!(first[0].fetched_at, second[0].fetched_at);
}

#[tokio::test]
async fn test_force_refresh_bypasses_cache() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/application/nodes"))
        .respond_with(inventory_response(vec![node_json(1, 1, 8192, 0, false)]))
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, MonitorConfig::default());
    client.all_nodes_usage(false).await;
    let refreshed = client.all_nodes_usage(true).await;
    assert_eq!(refreshed.len(), 1);
}

#[tokio::test]
async fn test_panel_outage_degrades_to_last_snapshot() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/application/nodes"))
        .respond_with(inventory_response(vec![node_json(1, 1, 8192, 2048, false)]))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/application/nodes"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    // Zero TTL so the second read misses the cache and hits the outage.
    let config = MonitorConfig {
        cache_ttl: Duration::ZERO,
        ..Default::default()
    };
    let client = client_for(&mock_server, config);

    let first = client.all_nodes_usage(false).await;
    assert_eq!(first.len(), 1);

    let degraded = client.all_nodes_usage(false).await;
    assert_eq!(degraded, first);
    assert_eq!(degraded[0].fetched_at, first[0].fetched_at);
}

#[tokio::test]
async fn test_panel_outage_without_history_is_empty() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/application/nodes"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, MonitorConfig::default());
    assert!(client.all_nodes_usage(false).await.is_empty());
    assert!(client.node_usage(1, false).await.is_none());
    assert!(client.monitoring_stats(false).await.is_none());
}

#[tokio::test]
async fn test_builder_rejects_missing_or_invalid_input() {
    assert!(CapacityClient::builder().api_key(TEST_KEY).build().is_err());
    assert!(
        CapacityClient::builder()
            .host("panel.example.com")
            .build()
            .is_err()
    );
    assert!(
        CapacityClient::builder()
            .host("panel.example.com")
            .api_key("too-short")
            .build()
            .is_err()
    );
    assert!(
        CapacityClient::builder()
            .host("panel..example.com")
            .api_key(TEST_KEY)
            .build()
            .is_err()
    );
}
