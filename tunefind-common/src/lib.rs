//! # Tunefind Common Library
//!
//! Shared code for the Tunefind services:
//! - Error type for configuration and I/O failures
//! - Layered configuration loading (CLI → ENV → TOML → compiled defaults)
//! - Logging initialization

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
