use crate::{CapacityClient, CapacityRequirement, CapacityResult};
use dotenvy::dotenv;
use std::env;

fn setup() {
    dotenv().ok();
}

fn build_client() -> CapacityResult<CapacityClient> {
    let host = env::var("PANEL_HOST").expect("PANEL_HOST not set");
    let port: u16 = env::var("PANEL_PORT")
        .expect("PANEL_PORT not set")
        .parse()
        .expect("invalid port");
    let api_key = env::var("PANEL_API_KEY").expect("PANEL_API_KEY not set");

    CapacityClient::builder()
        .host(host)
        .port(port)
        .api_key(api_key)
        .secure(true)
        .accept_invalid_certs(true) // allow self-signed certs for testing
        .build()
}

#[tokio::test]
#[ignore = "requires a running panel and environment variables"]
async fn test_integration_inventory_fetch() -> CapacityResult<()> {
    setup();
    let client = build_client()?;

    let nodes = client.all_nodes_usage(true).await;
    assert!(!nodes.is_empty(), "panel reported no nodes");
    for node in &nodes {
        assert_eq!(
            node.available_memory,
            node.effective_memory_limit.saturating_sub(node.allocated_memory)
        );
    }

    let stats = client.monitoring_stats(false).await.expect("no stats");
    assert_eq!(stats.total_nodes, nodes.len());

    Ok(())
}

#[tokio::test]
#[ignore = "requires a running panel and environment variables"]
async fn test_integration_capacity_check() -> CapacityResult<()> {
    setup();
    let client = build_client()?;

    let locations = client.all_locations_capacity(true).await;
    assert!(!locations.is_empty(), "panel reported no locations");

    let requirement = CapacityRequirement {
        memory: 1024,
        disk: 2048,
        cpu: None,
    };
    let check = client
        .check_location_capacity(locations[0].location_id, &requirement, false)
        .await;
    if check.can_accommodate {
        let selection = client
            .select_optimal_node(locations[0].location_id, &requirement, false)
            .await;
        assert!(selection.success);
    }

    Ok(())
}
