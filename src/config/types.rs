//! Configuration type definitions.
//!
//! This module contains the data structures of `navcase.yaml`.
//! These types are pure data - no I/O or complex logic.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::dictionary::Term;
use crate::dom::DEFAULT_SELECTORS;
use crate::normalize::Precedence;

/// The full navcase configuration. Every field is optional in the file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,
    /// Start from the built-in term table (default: true)
    #[serde(default = "default_builtin_terms")]
    pub builtin_terms: bool,
    /// Additional terms, or replacement values for built-in keys
    #[serde(default)]
    pub terms: Vec<Term>,
    /// Which pattern claims a span when several could
    #[serde(default)]
    pub precedence: Precedence,
    /// CSS selectors for navigation elements
    #[serde(default = "default_selectors")]
    pub selectors: Vec<String>,
    /// Timing of the re-apply triggers
    #[serde(default)]
    pub triggers: TriggerConfig,
    /// File watching settings
    #[serde(default)]
    pub watch: WatchConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site: SiteConfig::default(),
            builtin_terms: default_builtin_terms(),
            terms: Vec::new(),
            precedence: Precedence::default(),
            selectors: default_selectors(),
            triggers: TriggerConfig::default(),
            watch: WatchConfig::default(),
        }
    }
}

fn default_builtin_terms() -> bool {
    true
}

fn default_selectors() -> Vec<String> {
    DEFAULT_SELECTORS.iter().map(|s| s.to_string()).collect()
}

/// The built site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Output directory of the site generator, relative to the config file
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

fn default_output() -> PathBuf {
    PathBuf::from("site")
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
        }
    }
}

/// Timing of the redundant re-apply triggers.
///
/// All values are in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerConfig {
    /// One-shot runs after startup, to catch late writes of the first build
    #[serde(default = "default_initial_delays_ms")]
    pub initial_delays_ms: Vec<u64>,
    /// Deferral between a mutation batch and the run it causes
    #[serde(default = "default_frame_ms")]
    pub frame_ms: u64,
    /// Runs scheduled after each location change
    #[serde(default = "default_location_delays_ms")]
    pub location_delays_ms: Vec<u64>,
    /// Period of the fallback timer
    #[serde(default = "default_fallback_interval_ms")]
    pub fallback_interval_ms: u64,
    /// Number of fallback runs before the timer stops
    #[serde(default = "default_fallback_ticks")]
    pub fallback_ticks: u32,
}

fn default_initial_delays_ms() -> Vec<u64> {
    vec![100, 250, 500]
}

fn default_frame_ms() -> u64 {
    16
}

fn default_location_delays_ms() -> Vec<u64> {
    vec![0, 100]
}

fn default_fallback_interval_ms() -> u64 {
    500
}

fn default_fallback_ticks() -> u32 {
    20
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            initial_delays_ms: default_initial_delays_ms(),
            frame_ms: default_frame_ms(),
            location_delays_ms: default_location_delays_ms(),
            fallback_interval_ms: default_fallback_interval_ms(),
            fallback_ticks: default_fallback_ticks(),
        }
    }
}

/// Configuration for file watching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Use polling-based watcher instead of native file system events.
    /// Useful for network filesystems, Docker volumes, or other situations
    /// where native events are unreliable.
    #[serde(default)]
    pub poll: bool,
    /// Poll interval in milliseconds (only used if poll=true).
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Debounce timeout in milliseconds.
    /// Changes within this window are batched together.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_debounce_ms() -> u64 {
    100
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            poll: false,
            poll_interval_ms: default_poll_interval_ms(),
            debounce_ms: default_debounce_ms(),
        }
    }
}
