//! Configuration module for Tumblr-Harvest
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file, and reading credentials and the output root from
//! the environment.
//!
//! # Example
//!
//! ```no_run
//! use tumblr_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Harvester will request {} posts per page", config.harvest.page_size);
//! ```

mod env;
mod parser;
mod types;
mod validation;

// Re-export types
pub use env::{resolve_output_root, resolve_output_root_with, Credentials};
pub use types::{ApiConfig, Config, HarvestConfig, OutputConfig};

// Re-export parser functions
pub use parser::{load_config, load_config_or_default, parse_config};
pub use validation::{validate_page_size, MAX_PAGE_SIZE};
