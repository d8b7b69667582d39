//! Shared infrastructure for coinforge
//!
//! This crate holds the pieces every other coinforge crate leans on:
//! the error taxonomy, CLI exit codes, tracing initialization, home
//! directory resolution, and atomic file writes.

pub mod atomic_write;
pub mod error;
pub mod exit_codes;
pub mod logging;
pub mod paths;

pub use error::{CoinforgeError, ConfigError, LlmError, StoreError, TaskError, ValidationError};
pub use exit_codes::ExitCode;
