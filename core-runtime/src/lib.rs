//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the ticktack workspace:
//! - Logging and tracing infrastructure
//! - Configuration management (JSON file, builder, environment credentials)
//!
//! ## Overview
//!
//! Core crates never read configuration files themselves; they receive the
//! resolved values from [`config::TickerConfig`].

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
