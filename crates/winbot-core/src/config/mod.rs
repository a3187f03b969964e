//! Window catalog configuration — schema, loading, and env var overrides.
//!
//! # Usage
//! ```no_run
//! use winbot_core::config;
//!
//! let cfg = config::load_config(None).unwrap();
//! let catalog = cfg.catalog().unwrap();
//! println!("{} windows", catalog.len());
//! ```

pub mod loader;
pub mod schema;

// Re-export key types
pub use loader::{get_config_path, load_config, save_config};
pub use schema::Config;
