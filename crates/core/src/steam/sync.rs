use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use super::{client::SteamClient, credentials::SteamCredentials};
use crate::{
    catalog::{CatalogSink, UpsertOutcome},
    config::PlaytimePolicy,
    error::{Error, Result},
};

/// App id recorded when Steam omits one.
pub const MISSING_APP_ID: i64 = -1;
/// Name recorded when Steam omits one.
pub const MISSING_NAME: &str = "Unknown";

/// One entry of the `GetOwnedGames` payload, with defaults applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwnedGame {
    /// Steam app id, or [`MISSING_APP_ID`].
    pub appid: i64,
    /// Display name, or [`MISSING_NAME`].
    pub name: String,
    /// Lifetime playtime in minutes.
    pub playtime_forever: u32,
    /// Whether the app id or name had to be substituted.
    pub placeholder: bool,
}

impl OwnedGame {
    fn from_entry(entry: &Value) -> Self {
        let appid = entry.get("appid").and_then(Value::as_i64);
        let name = entry.get("name").and_then(Value::as_str);
        let playtime = entry
            .get("playtime_forever")
            .and_then(Value::as_i64)
            .unwrap_or(0)
            .clamp(0, i64::from(u32::MAX));

        Self {
            appid: appid.unwrap_or(MISSING_APP_ID),
            name: name.unwrap_or(MISSING_NAME).to_string(),
            playtime_forever: playtime as u32,
            placeholder: appid.is_none() || name.is_none(),
        }
    }
}

/// Outcome of one synchronisation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Entries read from the payload, placeholders included.
    pub processed: usize,
    /// New catalog rows.
    pub inserted: usize,
    /// Entries whose app id was already catalogued.
    pub unchanged: usize,
    /// Existing rows overwritten under [`PlaytimePolicy::Refresh`].
    pub refreshed: usize,
    /// Entries the catalog refused to store.
    pub failed: usize,
    /// Entries stored with a substituted app id or name.
    pub placeholders: usize,
    /// When the run completed.
    pub finished_at: DateTime<Utc>,
}

/// Decode a `GetOwnedGames` body.
///
/// Fails as a whole when the body is not JSON or lacks a `response.games`
/// array; individual entries never fail and fall back to placeholders.
pub fn parse_owned_games(body: &[u8]) -> Result<Vec<OwnedGame>> {
    let payload: Value = serde_json::from_slice(body)?;
    let games = payload
        .get("response")
        .and_then(|response| response.get("games"))
        .and_then(Value::as_array)
        .ok_or_else(|| {
            Error::MalformedResponse(
                "response.games is missing (is the profile's game list private?)".to_string(),
            )
        })?;

    Ok(games.iter().map(OwnedGame::from_entry).collect())
}

/// Write parsed games into the catalog in payload order.
///
/// A store failure for one entry is logged and counted; the rest of the
/// batch still goes through.
pub fn ingest<S: CatalogSink + ?Sized>(
    games: &[OwnedGame],
    store: &mut S,
    policy: PlaytimePolicy,
) -> SyncReport {
    let mut report = SyncReport {
        processed: 0,
        inserted: 0,
        unchanged: 0,
        refreshed: 0,
        failed: 0,
        placeholders: 0,
        finished_at: Utc::now(),
    };

    for game in games {
        report.processed += 1;
        if game.placeholder {
            warn!(
                appid = game.appid,
                name = %game.name,
                "owned game entry is missing fields"
            );
            report.placeholders += 1;
        }

        let outcome = match policy {
            PlaytimePolicy::KeepFirst => store
                .upsert_steam_game(game.appid, &game.name, game.playtime_forever)
                .map(|created| {
                    if created {
                        UpsertOutcome::Inserted
                    } else {
                        UpsertOutcome::Unchanged
                    }
                }),
            PlaytimePolicy::Refresh => {
                store.refresh_steam_game(game.appid, &game.name, game.playtime_forever)
            }
        };

        match outcome {
            Ok(UpsertOutcome::Inserted) => report.inserted += 1,
            Ok(UpsertOutcome::Unchanged) => report.unchanged += 1,
            Ok(UpsertOutcome::Refreshed) => report.refreshed += 1,
            Err(err) => {
                warn!(appid = game.appid, "failed to store owned game: {err}");
                report.failed += 1;
            }
        }
    }

    report.finished_at = Utc::now();
    report
}

/// Fetch the account's owned games and drive them into `store`.
///
/// Transport and payload errors abort before the store is touched.
pub fn synchronize<S: CatalogSink + ?Sized>(
    client: &SteamClient,
    credentials: &SteamCredentials,
    store: &mut S,
    policy: PlaytimePolicy,
) -> Result<SyncReport> {
    info!(
        "fetching owned games for {} from {}",
        credentials.account_id(),
        client.base_url()
    );
    let body = client.fetch_owned_games(credentials)?;
    let games = parse_owned_games(&body)?;
    let report = ingest(&games, store, policy);
    info!(
        processed = report.processed,
        inserted = report.inserted,
        unchanged = report.unchanged,
        refreshed = report.refreshed,
        failed = report.failed,
        "steam sync finished"
    );
    Ok(report)
}
