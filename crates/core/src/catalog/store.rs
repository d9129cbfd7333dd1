use std::{fs, path::Path};

use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use tracing::{debug, info};

use super::{schema, CatalogSink, UpsertOutcome};
use crate::{
    error::{Error, Result},
    models::GameRecord,
};

/// Number of rows held by each catalog table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CatalogCounts {
    /// Steam-sourced games.
    pub steam: usize,
    /// Manually added games.
    pub manual: usize,
}

impl CatalogCounts {
    /// Rows across both tables.
    pub fn total(&self) -> usize {
        self.steam + self.manual
    }
}

/// SQLite catalog holding Steam-sourced and manually added games.
///
/// The store owns a single connection and is meant to have one owner at a
/// time; it does no locking of its own.
pub struct CatalogStore {
    conn: Connection,
}

impl CatalogStore {
    /// Open (or create) the catalog database at `path`.
    ///
    /// Parent directories are created as needed. The schema is not touched;
    /// call [`CatalogStore::ensure_schema`] afterwards.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| {
                Error::Storage(format!(
                    "failed to create database directory {}: {err}",
                    parent.display()
                ))
            })?;
        }

        let conn = Connection::open(path).map_err(|err| {
            Error::Storage(format!("cannot open database {}: {err}", path.display()))
        })?;
        info!("opened catalog database {}", path.display());
        Ok(Self { conn })
    }

    /// Open a throwaway in-memory catalog.
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
        })
    }

    /// Create both catalog tables if they are missing. Safe to call on every start.
    pub fn ensure_schema(&self) -> Result<()> {
        self.conn.execute_batch(schema::CREATE_STEAM_TABLE)?;
        self.conn.execute_batch(schema::CREATE_MANUAL_TABLE)?;
        debug!("catalog schema ready");
        Ok(())
    }

    /// Insert a Steam game keyed by its app id.
    ///
    /// Returns `false` and leaves the stored row untouched when the id is
    /// already present.
    pub fn upsert_steam_game(&self, id: i64, name: &str, playtime: u32) -> Result<bool> {
        let changed = self
            .conn
            .execute(schema::INSERT_OR_IGNORE_STEAM, params![id, name, playtime])?;
        if changed > 0 {
            debug!(id, name, "inserted steam game");
        } else {
            debug!(id, name, "steam game already catalogued");
        }
        Ok(changed > 0)
    }

    /// Insert a Steam game, overwriting name and playtime when the id exists.
    pub fn refresh_steam_game(&self, id: i64, name: &str, playtime: u32) -> Result<UpsertOutcome> {
        let existing: Option<(String, u32)> = self
            .conn
            .query_row(schema::SELECT_STEAM_ROW, params![id], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .optional()?;

        let outcome = match existing {
            Some((stored_name, stored_playtime))
                if stored_name == name && stored_playtime == playtime =>
            {
                return Ok(UpsertOutcome::Unchanged);
            }
            Some(_) => UpsertOutcome::Refreshed,
            None => UpsertOutcome::Inserted,
        };

        self.conn
            .execute(schema::INSERT_OR_REPLACE_STEAM, params![id, name, playtime])?;
        debug!(id, name, ?outcome, "wrote steam game");
        Ok(outcome)
    }

    #[cfg(test)]
    fn contains_steam_game(&self, id: i64) -> Result<bool> {
        let exists: bool = self
            .conn
            .query_row(schema::STEAM_ROW_EXISTS, params![id], |row| row.get(0))?;
        Ok(exists)
    }

    /// Add a manually installed game and return its newly assigned id.
    pub fn insert_manual_game(&self, name: &str, install_path: &str, playtime: u32) -> Result<i64> {
        let name = name.trim();
        let install_path = install_path.trim();
        if name.is_empty() {
            return Err(Error::Storage("game name must not be empty".to_string()));
        }
        if install_path.is_empty() {
            return Err(Error::Storage("install path must not be empty".to_string()));
        }

        self.conn
            .execute(schema::INSERT_MANUAL, params![name, install_path, playtime])?;
        let id = self.conn.last_insert_rowid();
        info!(id, name, install_path, "added manual game");
        Ok(id)
    }

    /// Stream every catalogued game, Steam and manual, ordered by name.
    ///
    /// Rows are decoded one at a time as the query steps; an error from `f`
    /// stops the scan. Each call re-queries the database.
    pub fn for_each_game<F>(&self, mut f: F) -> Result<()>
    where
        F: FnMut(GameRecord) -> Result<()>,
    {
        let mut stmt = self.conn.prepare(schema::SELECT_ALL)?;
        let rows = stmt.query_map([], |row| {
            Ok(GameRecord {
                id: row.get(0)?,
                name: row.get(1)?,
                install_path: row.get(2)?,
                playtime_minutes: row.get(3)?,
            })
        })?;
        for game in rows {
            f(game?)?;
        }
        Ok(())
    }

    /// Every catalogued game, Steam and manual, ordered by name.
    pub fn fetch_all(&self) -> Result<Vec<GameRecord>> {
        let mut games = Vec::new();
        self.for_each_game(|game| {
            games.push(game);
            Ok(())
        })?;
        Ok(games)
    }

    /// Row counts for both tables.
    pub fn count(&self) -> Result<CatalogCounts> {
        let steam: i64 = self
            .conn
            .query_row(schema::COUNT_STEAM, [], |row| row.get(0))?;
        let manual: i64 = self
            .conn
            .query_row(schema::COUNT_MANUAL, [], |row| row.get(0))?;
        Ok(CatalogCounts {
            steam: steam as usize,
            manual: manual as usize,
        })
    }
}

impl CatalogSink for CatalogStore {
    fn upsert_steam_game(&mut self, id: i64, name: &str, playtime: u32) -> Result<bool> {
        CatalogStore::upsert_steam_game(self, id, name, playtime)
    }

    fn refresh_steam_game(
        &mut self,
        id: i64,
        name: &str,
        playtime: u32,
    ) -> Result<UpsertOutcome> {
        CatalogStore::refresh_steam_game(self, id, name, playtime)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GameSource;
    use anyhow::Result;
    use tempfile::tempdir;

    fn store() -> Result<CatalogStore> {
        let store = CatalogStore::open_in_memory()?;
        store.ensure_schema()?;
        Ok(store)
    }

    #[test]
    fn ensure_schema_is_idempotent() -> Result<()> {
        let store = store()?;
        store.ensure_schema()?;
        store.ensure_schema()?;
        assert_eq!(store.count()?, CatalogCounts::default());
        Ok(())
    }

    #[test]
    fn first_steam_write_wins() -> Result<()> {
        let store = store()?;
        assert!(store.upsert_steam_game(730, "Counter-Strike 2", 120)?);
        assert!(!store.upsert_steam_game(730, "Renamed", 9000)?);

        let games = store.fetch_all()?;
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].name, "Counter-Strike 2");
        assert_eq!(games[0].playtime_minutes, 120);
        assert_eq!(games[0].source(), GameSource::Steam);
        Ok(())
    }

    #[test]
    fn refresh_overwrites_existing_rows() -> Result<()> {
        let store = store()?;
        assert_eq!(
            store.refresh_steam_game(440, "Team Fortress 2", 10)?,
            UpsertOutcome::Inserted
        );
        assert_eq!(
            store.refresh_steam_game(440, "Team Fortress 2", 10)?,
            UpsertOutcome::Unchanged
        );
        assert_eq!(
            store.refresh_steam_game(440, "Team Fortress 2", 95)?,
            UpsertOutcome::Refreshed
        );

        let games = store.fetch_all()?;
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].playtime_minutes, 95);
        Ok(())
    }

    #[test]
    fn manual_ids_are_fresh_and_clear_steam_ids() -> Result<()> {
        let store = store()?;
        store.upsert_steam_game(10, "Counter-Strike", 0)?;
        store.upsert_steam_game(3, "Half-Life", 0)?;

        let first = store.insert_manual_game("Doom", "/opt/doom/doom", 0)?;
        let second = store.insert_manual_game("Quake", "/opt/quake/quake", 30)?;

        assert_ne!(first, second);
        assert!(!store.contains_steam_game(first)?);
        assert!(!store.contains_steam_game(second)?);
        assert!(first > 10 && second > 10);
        Ok(())
    }

    #[test]
    fn manual_game_requires_name_and_path() -> Result<()> {
        let store = store()?;
        let err = store
            .insert_manual_game("  ", "/opt/game", 0)
            .expect_err("blank name must fail");
        assert!(matches!(err, Error::Storage(_)));

        let err = store
            .insert_manual_game("Game", "", 0)
            .expect_err("blank path must fail");
        assert!(matches!(err, Error::Storage(_)));
        assert_eq!(store.count()?.manual, 0);
        Ok(())
    }

    #[test]
    fn fetch_all_merges_and_sorts_by_name() -> Result<()> {
        let store = store()?;
        store.upsert_steam_game(570, "Dota 2", 300)?;
        store.upsert_steam_game(220, "Half-Life 2", 0)?;
        store.insert_manual_game("Amnesia", "/games/amnesia/run", 12)?;
        store.insert_manual_game("Zork", "/games/zork/zork", 0)?;

        let games = store.fetch_all()?;
        let names: Vec<_> = games.iter().map(|game| game.name.as_str()).collect();
        assert_eq!(names, vec!["Amnesia", "Dota 2", "Half-Life 2", "Zork"]);
        assert_eq!(games.len(), store.count()?.total());

        let amnesia = &games[0];
        assert_eq!(amnesia.source(), GameSource::Manual);
        assert_eq!(amnesia.install_path.as_deref(), Some("/games/amnesia/run"));
        assert_eq!(amnesia.playtime_minutes, 12);
        assert_eq!(games[1].install_path, None);

        // Restartable: a second listing sees the same rows.
        assert_eq!(store.fetch_all()?, games);
        Ok(())
    }

    #[test]
    fn for_each_game_streams_rows_in_name_order() -> Result<()> {
        let store = store()?;
        store.upsert_steam_game(570, "Dota 2", 300)?;
        store.insert_manual_game("Amnesia", "/games/amnesia/run", 0)?;
        store.upsert_steam_game(220, "Half-Life 2", 0)?;

        let mut seen = Vec::new();
        store.for_each_game(|game| {
            seen.push(game.name);
            Ok(())
        })?;
        assert_eq!(seen, vec!["Amnesia", "Dota 2", "Half-Life 2"]);
        assert_eq!(seen.len(), store.count()?.total());
        Ok(())
    }

    #[test]
    fn for_each_game_stops_on_callback_error() -> Result<()> {
        let store = store()?;
        store.upsert_steam_game(1, "A", 0)?;
        store.upsert_steam_game(2, "B", 0)?;

        let mut calls = 0;
        let err = store
            .for_each_game(|_| {
                calls += 1;
                Err(Error::Storage("stop".to_string()))
            })
            .expect_err("callback error must propagate");
        assert!(matches!(err, Error::Storage(_)));
        assert_eq!(calls, 1);
        Ok(())
    }

    #[test]
    fn queries_without_schema_fail_with_storage_error() -> Result<()> {
        let store = CatalogStore::open_in_memory()?;
        let err = store.fetch_all().expect_err("missing tables must fail");
        assert!(matches!(err, Error::Storage(_)));
        Ok(())
    }

    #[test]
    fn catalog_persists_across_reopen() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("lvl").join("steam_games.db");

        {
            let store = CatalogStore::open(&path)?;
            store.ensure_schema()?;
            store.upsert_steam_game(620, "Portal 2", 42)?;
        }

        let store = CatalogStore::open(&path)?;
        store.ensure_schema()?;
        let games = store.fetch_all()?;
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].id, 620);
        assert_eq!(games[0].playtime_minutes, 42);
        Ok(())
    }
}
