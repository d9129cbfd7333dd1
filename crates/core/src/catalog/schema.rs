pub(crate) const CREATE_STEAM_TABLE: &str = "CREATE TABLE IF NOT EXISTS games (
    game_id INTEGER PRIMARY KEY,
    game_name TEXT NOT NULL,
    playtime INTEGER NOT NULL DEFAULT 0
);";

pub(crate) const CREATE_MANUAL_TABLE: &str = "CREATE TABLE IF NOT EXISTS non_steam_games (
    id INTEGER PRIMARY KEY,
    game_name TEXT NOT NULL,
    install_path TEXT NOT NULL,
    playtime INTEGER NOT NULL DEFAULT 0
);";

pub(crate) const INSERT_OR_IGNORE_STEAM: &str =
    "INSERT OR IGNORE INTO games (game_id, game_name, playtime) VALUES (?1, ?2, ?3)";

pub(crate) const INSERT_OR_REPLACE_STEAM: &str =
    "INSERT INTO games (game_id, game_name, playtime) VALUES (?1, ?2, ?3)
     ON CONFLICT(game_id) DO UPDATE SET game_name = excluded.game_name, playtime = excluded.playtime";

pub(crate) const SELECT_STEAM_ROW: &str =
    "SELECT game_name, playtime FROM games WHERE game_id = ?1";

#[cfg(test)]
pub(crate) const STEAM_ROW_EXISTS: &str = "SELECT EXISTS(SELECT 1 FROM games WHERE game_id = ?1)";

// New manual ids start above every id held by either table.
pub(crate) const INSERT_MANUAL: &str =
    "INSERT INTO non_steam_games (id, game_name, install_path, playtime)
     VALUES (
        (SELECT MAX(top) + 1 FROM (
            SELECT MAX(id) AS top FROM non_steam_games
            UNION ALL SELECT MAX(game_id) FROM games
            UNION ALL SELECT 0
        )),
        ?1, ?2, ?3
     )";

pub(crate) const SELECT_ALL: &str =
    "SELECT game_id, game_name, NULL AS install_path, playtime FROM games
     UNION ALL
     SELECT id, game_name, install_path, playtime FROM non_steam_games
     ORDER BY game_name ASC";

pub(crate) const COUNT_STEAM: &str = "SELECT COUNT(*) FROM games";

pub(crate) const COUNT_MANUAL: &str = "SELECT COUNT(*) FROM non_steam_games";
