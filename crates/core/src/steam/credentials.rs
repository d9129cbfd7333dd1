use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Error, Result};

static API_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9A-Za-z]{32}$").expect("invalid api key regex"));

static STEAM_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{17,18}$").expect("invalid steam id regex"));

/// A Web API key paired with the 64-bit Steam id of the account to sync.
///
/// Only obtainable through [`validate_credentials`], so holding one means the
/// structural checks passed.
#[derive(Clone, PartialEq, Eq)]
pub struct SteamCredentials {
    api_key: String,
    account_id: String,
}

impl SteamCredentials {
    /// The Web API key.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// The account's SteamID64.
    pub fn account_id(&self) -> &str {
        &self.account_id
    }
}

impl fmt::Debug for SteamCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SteamCredentials")
            .field("api_key", &"<redacted>")
            .field("account_id", &self.account_id)
            .finish()
    }
}

/// Check the shape of a credential pair without touching the network.
///
/// The API key must be 32 alphanumeric characters and the account id 17 or
/// 18 ASCII digits. Surrounding whitespace is ignored.
pub fn validate_credentials(api_key: &str, account_id: &str) -> Result<SteamCredentials> {
    let api_key = api_key.trim();
    let account_id = account_id.trim();

    if !API_KEY_RE.is_match(api_key) {
        return Err(Error::Validation(format!(
            "API key must be 32 alphanumeric characters (got {})",
            api_key.chars().count()
        )));
    }
    if !STEAM_ID_RE.is_match(account_id) {
        return Err(Error::Validation(
            "Steam id must be 17 or 18 digits".to_string(),
        ));
    }

    Ok(SteamCredentials {
        api_key: api_key.to_string(),
        account_id: account_id.to_string(),
    })
}
