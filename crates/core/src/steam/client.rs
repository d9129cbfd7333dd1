use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::credentials::SteamCredentials;
use crate::{
    config::AppConfig,
    error::{Error, Result},
};

const OWNED_GAMES_ENDPOINT: &str = "/IPlayerService/GetOwnedGames/v0001/";
const PLAYER_SUMMARIES_ENDPOINT: &str = "/ISteamUser/GetPlayerSummaries/v0002/";
const USER_AGENT: &str = concat!("lvl/", env!("CARGO_PKG_VERSION"));

/// Public profile fields returned by `GetPlayerSummaries`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSummary {
    /// SteamID64 of the account.
    pub steamid: String,
    /// Display name.
    #[serde(default)]
    pub personaname: String,
    /// Community profile URL.
    #[serde(default)]
    pub profileurl: Option<String>,
    /// Small avatar URL.
    #[serde(default)]
    pub avatar: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlayerSummariesEnvelope {
    response: PlayerSummariesResponse,
}

#[derive(Debug, Deserialize)]
struct PlayerSummariesResponse {
    #[serde(default)]
    players: Vec<PlayerSummary>,
}

/// Blocking client for the handful of Steam Web API calls lvl needs.
pub struct SteamClient {
    http: reqwest::blocking::Client,
    base_url: String,
}

impl SteamClient {
    /// Build a client against `base_url` with the given request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Build a client from the loaded configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::new(config.api_base_url.clone(), config.request_timeout())
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issue a GET and buffer the whole body.
    fn get(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Vec<u8>> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!("GET {url}");
        let resp = self.http.get(&url).query(params).send()?;
        let status = resp.status();

        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(Error::Network(format!(
                "{endpoint} answered {status}: {}",
                body.trim()
            )));
        }

        Ok(resp.bytes()?.to_vec())
    }

    /// Raw `GetOwnedGames` response body, app info included.
    pub fn fetch_owned_games(&self, credentials: &SteamCredentials) -> Result<Vec<u8>> {
        self.get(
            OWNED_GAMES_ENDPOINT,
            &[
                ("key", credentials.api_key()),
                ("steamid", credentials.account_id()),
                ("format", "json"),
                ("include_appinfo", "true"),
            ],
        )
    }

    /// Profile summary of the credential's account, if Steam knows it.
    pub fn player_summary(&self, credentials: &SteamCredentials) -> Result<Option<PlayerSummary>> {
        let body = self.get(
            PLAYER_SUMMARIES_ENDPOINT,
            &[
                ("key", credentials.api_key()),
                ("steamids", credentials.account_id()),
            ],
        )?;
        let envelope: PlayerSummariesEnvelope = serde_json::from_slice(&body)?;
        Ok(envelope.response.players.into_iter().next())
    }

    /// Live check that the key works and the account exists.
    ///
    /// Any transport or parse failure counts as "not confirmed".
    pub fn confirm_account(&self, credentials: &SteamCredentials) -> bool {
        match self.player_summary(credentials) {
            Ok(Some(_)) => true,
            Ok(None) => {
                warn!("Steam returned no player for {}", credentials.account_id());
                false
            }
            Err(err) => {
                warn!("account lookup failed: {err}");
                false
            }
        }
    }
}
