// LogDigest - platform/mod.rs
//
// Platform abstraction layer: filesystem access and configuration.
// Dependencies: core model types, util, directories crate.
// Must NOT depend on: app.

pub mod config;
pub mod fs;
