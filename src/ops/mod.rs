//! High-level operations.
//!
//! This module contains the implementation of rocm-configure commands.

pub mod configure;

pub use configure::{configure, ConfigureOptions, ConfigureOutcome};
