//! Configuration schema types.
//!
//! These types are deserialized from YAML configuration files. Every
//! field has a default, so an empty file (or no file at all) yields a
//! usable configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ============================================================================
// Top-Level Configuration
// ============================================================================

/// Root configuration for `breathbox`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Session timer settings.
    #[serde(default)]
    pub timer: TimerConfig,

    /// Durable settings storage.
    #[serde(default)]
    pub store: StoreConfig,

    /// Offline asset gateway.
    #[serde(default)]
    pub gateway: GatewayConfig,
}

// ============================================================================
// Timer
// ============================================================================

/// Session timer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimerConfig {
    /// Phase length in seconds when nothing is persisted yet.
    /// Clamped to \[1.0, 10.0\] at 0.1 granularity.
    #[serde(default = "default_phase_seconds")]
    pub default_phase_seconds: f64,

    /// Period of the sampling task in milliseconds.
    #[serde(default = "default_sample_interval_ms")]
    pub sample_interval_ms: u64,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            default_phase_seconds: default_phase_seconds(),
            sample_interval_ms: default_sample_interval_ms(),
        }
    }
}

const fn default_phase_seconds() -> f64 {
    4.0
}

const fn default_sample_interval_ms() -> u64 {
    100
}

// ============================================================================
// Store
// ============================================================================

/// Durable settings storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Directory holding one file per setting.
    #[serde(default = "default_store_dir")]
    pub dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            dir: default_store_dir(),
        }
    }
}

fn default_store_dir() -> PathBuf {
    PathBuf::from(".breathbox")
}

// ============================================================================
// Gateway
// ============================================================================

/// Offline asset gateway settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Address the gateway binds, e.g. `"127.0.0.1:8910"`.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Upstream origin the gateway fetches from on cache miss.
    #[serde(default = "default_origin_url")]
    pub origin_url: String,

    /// Cache store identifier. Changing it on deploy is the sole
    /// invalidation mechanism for stale stores.
    #[serde(default = "default_cache_version")]
    pub cache_version: String,

    /// App-shell paths fetched and stored at install time.
    #[serde(default = "default_precache")]
    pub precache: Vec<String>,

    /// Path served as the offline fallback document.
    #[serde(default = "default_root_path")]
    pub root_path: String,

    /// Per-request network timeout in milliseconds.
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            origin_url: default_origin_url(),
            cache_version: default_cache_version(),
            precache: default_precache(),
            root_path: default_root_path(),
            fetch_timeout_ms: default_fetch_timeout_ms(),
        }
    }
}

fn default_bind_addr() -> String {
    "127.0.0.1:8910".to_string()
}

fn default_origin_url() -> String {
    "http://127.0.0.1:3000".to_string()
}

fn default_cache_version() -> String {
    "breathbox-cache-v1".to_string()
}

fn default_precache() -> Vec<String> {
    vec![
        "/".to_string(),
        "/manifest.json".to_string(),
        "/icon-192x192.svg".to_string(),
        "/icon-512x512.svg".to_string(),
    ]
}

fn default_root_path() -> String {
    "/".to_string()
}

const fn default_fetch_timeout_ms() -> u64 {
    10_000
}

// ============================================================================
// Tests
// ============================================================================
