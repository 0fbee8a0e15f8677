//! Configuration module for ezbackup
//!
//! CLI arguments, the persisted settings document, and the resolved run
//! configuration.

mod settings;

pub use settings::*;
