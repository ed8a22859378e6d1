use std::path::Path;

use base64::Engine;
use base64::prelude::BASE64_URL_SAFE_NO_PAD;
use chrono::{Duration, Utc};
use ring::signature::RsaKeyPair;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::{Result, SheetsError};
use crate::req::GoogleHttpClient;

/// Seconds before the actual expiry at which a token is considered expired.
const EXPIRY_LEEWAY_SECS: i64 = 30;

/// An OAuth access token, optionally refreshable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Lifetime in seconds, relative to `created`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
    /// Unix timestamp of when the token was issued.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
}

impl AccessToken {
    pub fn new(access_token: impl Into<String>) -> Self {
        AccessToken {
            access_token: access_token.into(),
            ..Default::default()
        }
    }

    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }

    pub fn try_from_json(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now().timestamp())
    }

    /// Missing `created` or `expires_in` count as zero, so a token without
    /// expiry information is treated as expired.
    pub fn is_expired_at(&self, now: i64) -> bool {
        let created = self.created.unwrap_or(0);
        let expires_in = self.expires_in.unwrap_or(0);
        created
            .saturating_add(expires_in)
            .saturating_sub(EXPIRY_LEEWAY_SECS)
            <= now
    }

    pub fn is_refreshable(&self) -> bool {
        self.refresh_token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

impl From<&str> for AccessToken {
    fn from(value: &str) -> Self {
        AccessToken::new(value)
    }
}

impl From<String> for AccessToken {
    fn from(value: String) -> Self {
        AccessToken::new(value)
    }
}

/// Response from the token endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    access_token: String,
    expires_in: Option<i64>,
    refresh_token: Option<String>,
    scope: Option<String>,
    token_type: Option<String>,
}

impl TokenResponse {
    fn into_token(self, fallback_refresh: Option<String>) -> AccessToken {
        AccessToken {
            access_token: self.access_token,
            refresh_token: self.refresh_token.or(fallback_refresh),
            expires_in: self.expires_in,
            created: Some(Utc::now().timestamp()),
            scope: self.scope,
            token_type: self.token_type,
        }
    }
}

#[derive(Serialize)]
struct RefreshParams<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    refresh_token: &'a str,
    grant_type: &'static str,
}

/// Exchange a refresh token for a new access token.
///
/// The returned token keeps the refresh token if the endpoint doesn't hand
/// out a new one.
pub(crate) async fn refresh_access_token(
    client: &GoogleHttpClient,
    token_uri: Url,
    client_id: &str,
    client_secret: &str,
    refresh_token: &str,
) -> Result<AccessToken> {
    let params = RefreshParams {
        client_id,
        client_secret,
        refresh_token,
        grant_type: "refresh_token",
    };
    let resp: TokenResponse = client.post_form(token_uri, &params).await?;
    Ok(resp.into_token(Some(refresh_token.to_string())))
}

/// Service account key file as downloaded from the cloud console.
#[derive(Debug, Clone, Deserialize)]
#[allow(unused)]
pub struct ServiceAccount {
    project_id: Option<String>,
    private_key_id: Option<String>,
    private_key: String,
    client_email: String,
    token_uri: String,
    /// Impersonated user for domain wide delegation.
    #[serde(default)]
    subject: Option<String>,
}

#[derive(Serialize)]
struct JwtHeader {
    alg: &'static str,
    typ: &'static str,
}

#[derive(Serialize)]
struct JwtClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    exp: i64,
    iat: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    sub: Option<&'a str>,
}

impl ServiceAccount {
    pub fn try_from_str(input: &str) -> Result<Self> {
        serde_json::from_str(input).map_err(|e| {
            SheetsError::InvalidServiceAccount(format!(
                "failed to deserialize json service account key: {e}"
            ))
        })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::try_from_str(&content)
    }

    pub fn client_email(&self) -> &str {
        &self.client_email
    }

    /// Act on behalf of another user in the service account's domain.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Build the signed JWT assertion for the given scopes.
    pub(crate) fn signed_assertion(&self, scopes: &[String]) -> Result<String> {
        let now = Utc::now();
        let iat = now.timestamp();
        let exp = (now + Duration::hours(1)).timestamp();
        let scope = scopes.join(" ");

        let claims = JwtClaims {
            iss: &self.client_email,
            scope: &scope,
            aud: &self.token_uri,
            iat,
            exp,
            sub: self.subject.as_deref(),
        };
        let header = JwtHeader {
            alg: "RS256",
            typ: "JWT",
        };

        let header_b64 = BASE64_URL_SAFE_NO_PAD.encode(serde_json::to_string(&header)?);
        let claims_b64 = BASE64_URL_SAFE_NO_PAD.encode(serde_json::to_string(&claims)?);
        let signing_input = format!("{header_b64}.{claims_b64}");

        let key_pair = self.key_pair()?;

        // PKCS#1 v1.5 SHA-256 (RS256)
        let mut signature = vec![0; key_pair.public().modulus_len()];
        key_pair
            .sign(
                &ring::signature::RSA_PKCS1_SHA256,
                &ring::rand::SystemRandom::new(),
                signing_input.as_bytes(),
                &mut signature,
            )
            .map_err(|_| SheetsError::InvalidServiceAccount("failed to sign payload".into()))?;

        let sig_b64 = BASE64_URL_SAFE_NO_PAD.encode(&signature);
        Ok(format!("{signing_input}.{sig_b64}"))
    }

    fn key_pair(&self) -> Result<RsaKeyPair> {
        let mut reader = std::io::Cursor::new(self.private_key.as_bytes());
        let key = rustls_pemfile::read_one(&mut reader)
            .map_err(|e| SheetsError::InvalidServiceAccount(format!("invalid PEM private key: {e}")))?;
        match key {
            Some(rustls_pemfile::Item::Pkcs8Key(der)) => {
                RsaKeyPair::from_pkcs8(der.secret_pkcs8_der()).map_err(|_| {
                    SheetsError::InvalidServiceAccount(
                        "failed to create rsa key pair from pkcs8 key".into(),
                    )
                })
            }
            Some(rustls_pemfile::Item::Pkcs1Key(der)) => {
                RsaKeyPair::from_der(der.secret_pkcs1_der()).map_err(|_| {
                    SheetsError::InvalidServiceAccount(
                        "failed to create rsa key pair from pkcs1 key".into(),
                    )
                })
            }
            _ => Err(SheetsError::InvalidServiceAccount("missing private key".into())),
        }
    }

    /// Exchange a signed JWT for an access token.
    pub(crate) async fn fetch_access_token(
        &self,
        client: &GoogleHttpClient,
        scopes: &[String],
    ) -> Result<AccessToken> {
        let jwt = self.signed_assertion(scopes)?;
        let params = [
            ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
            ("assertion", jwt.as_str()),
        ];
        let url = Url::parse(&self.token_uri)?;
        let resp: TokenResponse = client.post_form(url, &params).await?;
        Ok(resp.into_token(None))
    }
}
