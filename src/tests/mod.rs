mod integration;
mod monitor_tests;
