use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::errors::Result;

pub const DEFAULT_SHEETS_ENDPOINT: &str = "https://sheets.googleapis.com/";
pub const DEFAULT_DRIVE_ENDPOINT: &str = "https://www.googleapis.com/";
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

pub const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
pub const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive";

/// Configuration for the REST backend.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GoogleConfig {
    /// OAuth client id, needed for refreshing user tokens.
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub sheets_endpoint: String,
    pub drive_endpoint: String,
    pub token_uri: String,
    /// Scopes requested when exchanging service account credentials.
    pub scopes: Vec<String>,
    pub timeout_secs: Option<u64>,
    pub connect_timeout_secs: Option<u64>,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        GoogleConfig {
            client_id: None,
            client_secret: None,
            sheets_endpoint: DEFAULT_SHEETS_ENDPOINT.to_string(),
            drive_endpoint: DEFAULT_DRIVE_ENDPOINT.to_string(),
            token_uri: DEFAULT_TOKEN_URI.to_string(),
            scopes: vec![SPREADSHEETS_SCOPE.to_string(), DRIVE_SCOPE.to_string()],
            timeout_secs: None,
            connect_timeout_secs: None,
        }
    }
}

impl GoogleConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_secs.map(Duration::from_secs)
    }

    pub(crate) fn sheets_url(&self) -> Result<Url> {
        Ok(Url::parse(&self.sheets_endpoint)?)
    }

    pub(crate) fn drive_url(&self) -> Result<Url> {
        Ok(Url::parse(&self.drive_endpoint)?)
    }

    pub(crate) fn token_url(&self) -> Result<Url> {
        Ok(Url::parse(&self.token_uri)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_uses_defaults() {
        let config: GoogleConfig = serde_json::from_str(
            r#"{"client_id": "id", "client_secret": "secret", "timeout_secs": 30}"#,
        )
        .unwrap();

        assert_eq!(Some("id".to_string()), config.client_id);
        assert_eq!(DEFAULT_SHEETS_ENDPOINT, config.sheets_endpoint);
        assert_eq!(Some(Duration::from_secs(30)), config.timeout());
        assert_eq!(None, config.connect_timeout());
        assert_eq!(2, config.scopes.len());
    }
}
