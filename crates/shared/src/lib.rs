//! Shared types and configuration for Gearbox.
//!
//! This crate provides common types used across all other crates:
//! - Money arithmetic helpers with decimal precision
//! - Typed IDs for type-safe entity references
//! - Configuration management

pub mod config;
pub mod types;

pub use config::{AppConfig, GatewayConfig};
