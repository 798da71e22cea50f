//! droidlocate command-line driver
//!
//! Exposes the CLI and configuration modules for integration testing

pub mod cli;
pub mod config;

pub use config::{Config, ScrollSettings};
