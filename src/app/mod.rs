// LogDigest - app/mod.rs
//
// Application layer: run orchestration, report delivery, first-run setup.
// Dependencies: core and platform layers.

pub mod digest;
pub mod init;
pub mod output;
