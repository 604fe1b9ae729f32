//! Process configuration, read once at startup from the environment (and a
//! `.env` file, if present).

use regex::Regex;
use std::{net::SocketAddr, time::Duration};
use thiserror::Error;

pub const DEFAULT_SHEET_NAME: &str = "Property Details";
pub const DEFAULT_SHEETS_ENDPOINT: &str = "https://sheets.googleapis.com/v4";
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_BIND: &str = "127.0.0.1:8000";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// How requests to the Sheets API are authorized. Obtaining either value is
/// left to whoever deploys the dashboard.
#[derive(Clone, PartialEq)]
pub enum Credentials {
    ApiKey(String),
    AccessToken(String),
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::ApiKey(_) => write!(f, "ApiKey(<redacted>)"),
            Credentials::AccessToken(_) => write!(f, "AccessToken(<redacted>)"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub spreadsheet_id: String,
    pub sheet_name: String,
    pub credentials: Credentials,
    pub sheets_endpoint: String,
    pub fetch_timeout: Duration,
    pub bind: SocketAddr,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Blank values are treated the same as unset ones.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let spreadsheet = get("PMS_SPREADSHEET")
            .ok_or(ConfigError::Missing("PMS_SPREADSHEET"))?;
        let spreadsheet_id = spreadsheet_id(&spreadsheet).ok_or_else(|| {
            ConfigError::Invalid {
                var: "PMS_SPREADSHEET",
                reason: format!("{spreadsheet} is not a spreadsheet url or id"),
            }
        })?;

        let credentials = match (get("PMS_ACCESS_TOKEN"), get("PMS_API_KEY")) {
            (Some(token), _) => Credentials::AccessToken(token),
            (None, Some(key)) => Credentials::ApiKey(key),
            (None, None) => {
                return Err(ConfigError::Missing(
                    "PMS_ACCESS_TOKEN or PMS_API_KEY",
                ))
            }
        };

        let fetch_timeout = match get("PMS_FETCH_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 =
                    raw.parse().map_err(|_| ConfigError::Invalid {
                        var: "PMS_FETCH_TIMEOUT_SECS",
                        reason: format!("{raw} is not a whole number"),
                    })?;
                if secs == 0 {
                    return Err(ConfigError::Invalid {
                        var: "PMS_FETCH_TIMEOUT_SECS",
                        reason: "must be greater than zero".into(),
                    });
                }
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
        };

        let bind_raw = get("PMS_BIND").unwrap_or_else(|| DEFAULT_BIND.into());
        let bind = bind_raw.parse().map_err(|_| ConfigError::Invalid {
            var: "PMS_BIND",
            reason: format!("{bind_raw} is not a socket address"),
        })?;

        Ok(Config {
            spreadsheet_id,
            sheet_name: get("PMS_SHEET_NAME")
                .unwrap_or_else(|| DEFAULT_SHEET_NAME.into()),
            credentials,
            sheets_endpoint: get("PMS_SHEETS_ENDPOINT")
                .unwrap_or_else(|| DEFAULT_SHEETS_ENDPOINT.into()),
            fetch_timeout,
            bind,
        })
    }
}

/// Accepts either a full `docs.google.com/spreadsheets/d/<id>/...` url or a
/// bare id.
pub fn spreadsheet_id(raw: &str) -> Option<String> {
    let from_url = Regex::new(r"/spreadsheets/d/([a-zA-Z0-9_-]+)")
        .expect("spreadsheet url regex is valid");
    if let Some(captures) = from_url.captures(raw) {
        return Some(captures[1].to_string());
    }
    let bare = Regex::new(r"^[a-zA-Z0-9_-]+$").expect("id regex is valid");
    bare.is_match(raw).then(|| raw.to_string())
}
