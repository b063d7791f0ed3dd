#[path = "mod_wire.rs"]
mod wire_tests;
