//! Shared utilities for TokenFarm.

pub mod logging;

pub use logging::{init_logging, LogFormat, LoggingError};
