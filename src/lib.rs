//! `breathbox` — guided box-breathing engine with an offline-first asset gateway
//!
//! This library provides the session timer engine, the versioned asset
//! cache with its install/activate/fetch lifecycle, and the supporting
//! configuration, storage, and CLI plumbing.

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod gateway;
pub mod observability;
pub mod store;
pub mod timer;
