//! # Aurora Common Library
//!
//! Shared code for the Aurora services:
//! - Error types
//! - Configuration loading and root folder resolution
//! - Timestamp utilities

pub mod config;
pub mod error;
pub mod time;

pub use error::{Error, Result};
