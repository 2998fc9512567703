//! Infrastructure layer
//!
//! This module contains cross-cutting concerns: configuration, logging
//! and secret generation.

mod config;
mod logging;
mod secrets;

pub use config::Config;
pub use logging::init_logging;
pub use secrets::generate_secret;
