//! # Stockroom CLI
//!
//! Command line driver over [`stockroom_inventory::InventoryService`].
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Parse arguments (clap)                                              │
//! │  2. Load AppConfig (defaults → TOML file → STOCKROOM__* env)            │
//! │  3. Initialize logging (RUST_LOG, else config log.level) on stderr      │
//! │  4. Open the database, run migrations                                   │
//! │  5. Run one subcommand, print its JSON envelope on stdout               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod commands;
pub mod config;
pub mod error;

use tracing_subscriber::EnvFilter;

pub use commands::{run, Command, Response};
pub use config::AppConfig;
pub use error::{ApiError, ErrorCode};

/// Initializes the tracing subscriber.
///
/// `RUST_LOG` wins over `default_directive`. Output goes to stderr so
/// stdout carries only the response envelope.
pub fn init_logging(default_directive: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}
