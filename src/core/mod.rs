// LogDigest - core/mod.rs
//
// Core business logic layer.
// Must NOT depend on: platform or app, and never opens files itself.

pub mod export;
pub mod filter;
pub mod model;
pub mod registry;
pub mod report;
pub mod timestamp;
pub mod window;
