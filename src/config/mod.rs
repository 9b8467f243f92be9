//! Configuration loading and types for navcase.
//!
//! This module handles all aspects of configuration:
//! - Type definitions for config structures (`types`)
//! - Loading configs from files and the environment (`load`)
//! - Resolving a config into the runtime normalizer and fixer (`resolve`)

mod load;
mod resolve;
mod types;

pub use resolve::base_path_from_config;
pub use types::{Config, SiteConfig, TriggerConfig, WatchConfig};

use crate::dictionary::DictionaryError;
use crate::dom::DomError;
use crate::normalize::NormalizeError;

// =============================================================================
// Errors
// =============================================================================

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("failed to get current working directory: {0}")]
    CwdFailure(std::io::Error),

    #[error("{0}")]
    Validation(String),

    #[error("invalid terms: {0}")]
    Dictionary(#[from] DictionaryError),

    #[error("{0}")]
    Normalize(#[from] NormalizeError),

    #[error("invalid selectors: {0}")]
    Selectors(#[from] DomError),
}
