pub mod panel_client;
pub mod snapshot_cache;
pub mod usage_source;
