pub mod application_node;
pub mod capacity_check;
pub mod location_capacity;
pub mod monitor_config;
pub mod node_usage;
pub mod panel_connection;
