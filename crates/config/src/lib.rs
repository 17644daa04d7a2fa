//! Configuration management for the tack application.
//!
//! This crate handles loading, validating, and persisting configuration,
//! and defines the identity/session contract consumed by the store.
//!
//! # Overview
//!
//! The crate is organized into the following modules:
//!
//! - [`config`]: Core configuration struct and loading logic
//! - [`session`]: The identity/session contract and role gating
//! - [`persistence`]: Config file reading and writing
//! - [`error`]: Error types for configuration operations
//!
//! # Configuration Sources (Priority)
//!
//! Configuration is loaded from files with the following priority
//! (highest to lowest):
//!
//! 1. Local config (`./tack.json5` or `./tack.json`)
//! 2. User config (`~/.config/tack/config.json5` or `~/.config/tack/config.json`)
//! 3. Built-in defaults
//!
//! # Examples
//!
//! Loading configuration:
//!
//! ```no_run
//! use tack_config::Config;
//!
//! # fn example() -> tack_config::Result<()> {
//! let config = Config::load()?;
//! println!("task collection: {}", config.collections.tasks);
//! println!("cleanup after {} days", config.cleanup.retention_days);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod persistence;
pub mod session;

// Re-export primary types at crate root for convenience
pub use config::{CleanupConfig, CollectionsConfig, Config};
pub use error::{ConfigError, Result};
pub use session::{Role, Session};
