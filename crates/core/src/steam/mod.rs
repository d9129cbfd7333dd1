//! Steam Web API access and library synchronisation.

/// Blocking Steam Web API client.
pub mod client;
/// Structural credential checks.
pub mod credentials;
/// Owned-games parsing and catalog ingestion.
pub mod sync;

pub use client::{PlayerSummary, SteamClient};
pub use credentials::{validate_credentials, SteamCredentials};
pub use sync::{ingest, parse_owned_games, synchronize, OwnedGame, SyncReport};
