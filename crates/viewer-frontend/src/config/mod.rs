//! Application configuration
//!
//! The viewer's tunables are defined by [`viewer_core::ViewerConfig`]; this
//! module finds, loads and validates the on-disk copy.

mod manager;

pub use manager::{ConfigError, ConfigManager};
