pub mod capacity_calculator;
pub mod node_monitor_service;
