//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the playback core:
//! - Logging and tracing infrastructure
//! - Player configuration with defaults and shallow overrides
//! - Listener registry for player events
//!
//! ## Overview
//!
//! This crate contains the runtime utilities that the playback adapter
//! depends on. It establishes the logging conventions and the event
//! subscription mechanism used throughout the workspace.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
