// src/logging.rs
use std::path::Path;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

pub const DEFAULT_FILTER: &str = "info";

/// Loads `.env` (or `dotenv_path`) before reading `RUST_LOG`, so a filter set there applies.
pub fn env_filter(dotenv_path: Option<&Path>) -> EnvFilter {
    match dotenv_path {
        Some(path) => {
            dotenv::from_path(path).ok();
        }
        None => {
            dotenv::dotenv().ok();
        }
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

pub fn init() {
    // init() also bridges the `log` records emitted by actix's Logger
    FmtSubscriber::builder()
        .with_env_filter(env_filter(None))
        .init();
}
