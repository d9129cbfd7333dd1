use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};

use lvl_core::{
    config, synchronize, validate_credentials, AppConfig, CatalogStore, GameRecord, GameSource,
    SteamClient, SyncReport,
};

fn open_store(config: &AppConfig) -> Result<CatalogStore> {
    let store = CatalogStore::open(&config.database_path)
        .with_context(|| format!("failed to open {}", config.database_path.display()))?;
    if let Err(err) = store.ensure_schema() {
        warn!("could not prepare catalog schema, storage may be unusable: {err}");
    }
    Ok(store)
}

pub fn list(config: &AppConfig, json: bool) -> Result<()> {
    let store = open_store(config)?;
    let games = store.fetch_all().context("failed to read catalog")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&games)?);
    } else if games.is_empty() {
        println!("No games yet. Use 'lvl sync <API_KEY> <STEAM_ID>' or 'lvl add <NAME> <PATH>'.");
    } else {
        print!("{}", render_games(&games));
    }
    Ok(())
}

pub fn sync(config: &AppConfig, api_key: &str, steam_id: &str) -> Result<()> {
    let credentials = validate_credentials(api_key, steam_id)?;
    let client = SteamClient::from_config(config)?;

    if config.verify_online && !client.confirm_account(&credentials) {
        bail!("Steam did not confirm account {}", credentials.account_id());
    }

    let mut store = open_store(config)?;
    let report = synchronize(&client, &credentials, &mut store, config.playtime_policy)
        .context("Steam sync failed")?;
    print!("{}", render_report(&report));
    Ok(())
}

pub fn add(config: &AppConfig, name: &str, path: &Path, playtime: u32) -> Result<()> {
    if !path.exists() {
        warn!("{} does not exist yet", path.display());
    }
    let store = open_store(config)?;
    let id = store
        .insert_manual_game(name, &path.to_string_lossy(), playtime)
        .with_context(|| format!("failed to add {name}"))?;
    println!("Added '{}' as #{id}", name.trim());
    Ok(())
}

pub fn validate(config: &AppConfig, api_key: &str, steam_id: &str, online: bool) -> Result<()> {
    let credentials = validate_credentials(api_key, steam_id)?;
    println!("Credentials are well formed.");

    if online || config.verify_online {
        let client = SteamClient::from_config(config)?;
        if !client.confirm_account(&credentials) {
            bail!("Steam did not confirm account {}", credentials.account_id());
        }
        println!("Steam confirmed account {}.", credentials.account_id());
    }
    Ok(())
}

pub fn whoami(config: &AppConfig, api_key: &str, steam_id: &str) -> Result<()> {
    let credentials = validate_credentials(api_key, steam_id)?;
    let client = SteamClient::from_config(config)?;
    match client.player_summary(&credentials)? {
        Some(player) => {
            info!(steamid = %player.steamid, "player summary fetched");
            println!("Name:     {}", player.personaname);
            println!("SteamID:  {}", player.steamid);
            if let Some(url) = player.profileurl {
                println!("Profile:  {url}");
            }
        }
        None => bail!("Steam has no profile for {}", credentials.account_id()),
    }
    Ok(())
}

pub fn paths(config: &AppConfig) -> Result<()> {
    println!("Config:   {}", config::config_file_path().display());
    println!("Catalog:  {}", config.database_path.display());
    println!("Logs:     {}", config::log_dir().display());
    Ok(())
}

fn render_games(games: &[GameRecord]) -> String {
    let mut out = format!("{:>10}  {:<6}  {:>12}  {}\n", "ID", "Source", "Playtime", "Name");
    out.push_str(&"-".repeat(60));
    out.push('\n');
    for game in games {
        let source = match game.source() {
            GameSource::Steam => "steam",
            GameSource::Manual => "manual",
        };
        out.push_str(&format!(
            "{:>10}  {:<6}  {:>12}  {}\n",
            game.id,
            source,
            game.playtime_label(),
            game.name
        ));
    }
    out.push_str(&format!("\n{} games\n", games.len()));
    out
}

fn render_report(report: &SyncReport) -> String {
    let mut out = String::from("Steam sync complete:\n");
    out.push_str(&format!("  Processed:  {}\n", report.processed));
    out.push_str(&format!("  New:        {}\n", report.inserted));
    out.push_str(&format!("  Unchanged:  {}\n", report.unchanged));
    if report.refreshed > 0 {
        out.push_str(&format!("  Refreshed:  {}\n", report.refreshed));
    }
    if report.failed > 0 {
        out.push_str(&format!("  Failed:     {}\n", report.failed));
    }
    if report.placeholders > 0 {
        out.push_str(&format!(
            "  Incomplete: {} (stored with placeholder id or name)\n",
            report.placeholders
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use lvl_core::steam::ingest;
    use lvl_core::PlaytimePolicy;
    use tempfile::tempdir;

    fn config_in(dir: &Path) -> AppConfig {
        AppConfig {
            database_path: dir.join("lvl").join("steam_games.db"),
            ..AppConfig::default()
        }
    }

    #[test]
    fn add_creates_catalog_and_row() -> Result<()> {
        let dir = tempdir()?;
        let config = config_in(dir.path());
        add(&config, " Doom ", Path::new("/opt/doom/doom"), 15)?;

        let games = open_store(&config)?.fetch_all()?;
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].name, "Doom");
        assert_eq!(games[0].install_path.as_deref(), Some("/opt/doom/doom"));
        assert_eq!(games[0].playtime_minutes, 15);
        Ok(())
    }

    #[test]
    fn add_rejects_blank_name() -> Result<()> {
        let dir = tempdir()?;
        let config = config_in(dir.path());
        assert!(add(&config, "", Path::new("/opt/game"), 0).is_err());
        Ok(())
    }

    #[test]
    fn sync_rejects_malformed_credentials_before_touching_storage() -> Result<()> {
        let dir = tempdir()?;
        let config = config_in(dir.path());
        assert!(sync(&config, "short", "123").is_err());
        assert!(!config.database_path.exists());
        Ok(())
    }

    #[test]
    fn table_lists_sources_and_count() {
        let games = vec![
            GameRecord {
                id: 730,
                name: "Counter-Strike 2".to_string(),
                install_path: None,
                playtime_minutes: 125,
            },
            GameRecord {
                id: 731,
                name: "Doom".to_string(),
                install_path: Some("/opt/doom".to_string()),
                playtime_minutes: 0,
            },
        ];
        let table = render_games(&games);
        assert!(table.contains("steam"));
        assert!(table.contains("manual"));
        assert!(table.contains("2h 05m"));
        assert!(table.ends_with("2 games\n"));
    }

    #[test]
    fn report_mentions_placeholders_only_when_present() -> Result<()> {
        let mut store = CatalogStore::open_in_memory()?;
        store.ensure_schema()?;
        let games = lvl_core::steam::parse_owned_games(
            br#"{"response":{"games":[{"appid":1,"name":"A"},{"name":"B"}]}}"#,
        )?;
        let report = ingest(&games, &mut store, PlaytimePolicy::KeepFirst);
        let text = render_report(&report);
        assert!(text.contains("Processed:  2"));
        assert!(text.contains("Incomplete: 1"));
        assert!(!text.contains("Failed"));
        Ok(())
    }
}
