#[path = "mod_collector.rs"]
mod collector_tests;
#[path = "mod_capabilities.rs"]
mod capability_tests;
