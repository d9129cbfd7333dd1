//! Local catalog persistence.

/// SQL statements for the two catalog tables.
mod schema;
/// SQLite-backed catalog store.
pub mod store;

pub use store::{CatalogCounts, CatalogStore};

use crate::error::Result;

/// Result of writing a Steam game into the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// A new row was created.
    Inserted,
    /// A row with the same app id already existed and was left alone.
    Unchanged,
    /// An existing row was overwritten with the reported values.
    Refreshed,
}

/// Write interface the Steam sync drives.
///
/// [`CatalogStore`] is the production implementation; anything else is a
/// test double.
pub trait CatalogSink {
    /// Insert a Steam game unless its app id is already present.
    fn upsert_steam_game(&mut self, id: i64, name: &str, playtime: u32) -> Result<bool>;

    /// Insert a Steam game, overwriting name and playtime of an existing row.
    fn refresh_steam_game(&mut self, id: i64, name: &str, playtime: u32)
        -> Result<UpsertOutcome>;
}
