#![warn(clippy::all, missing_docs)]

//! Core domain logic for the lvl game launcher.
//!
//! This crate hosts the catalog models, configuration handling,
//! the SQLite-backed catalog store, and the Steam library
//! synchronisation used by the command-line front end and any
//! future graphical frontends.

pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod steam;

pub use catalog::{CatalogCounts, CatalogSink, CatalogStore, UpsertOutcome};
pub use config::{AppConfig, PlaytimePolicy};
pub use error::{Error, Result};
pub use models::{GameRecord, GameSource};
pub use steam::{
    synchronize, validate_credentials, PlayerSummary, SteamClient, SteamCredentials, SyncReport,
};
