use std::time::Duration;

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{Client, Method, Response, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

use crate::errors::{Result, SheetsError};
use crate::rest::GoogleErrorResponse;

const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
const REQ_ACCEPT: &str = "application/json";

#[derive(Debug, Default)]
pub struct GoogleHttpClientBuilder {
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
}

impl GoogleHttpClientBuilder {
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn connect_timeout(mut self, connect_timeout: Option<Duration>) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    pub fn build(self) -> Result<GoogleHttpClient> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(ACCEPT, HeaderValue::from_static(REQ_ACCEPT));

        let mut builder = Client::builder()
            .user_agent(APP_USER_AGENT)
            .default_headers(default_headers);

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        if let Some(connect_timeout) = self.connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }

        let client = builder.build()?;
        Ok(GoogleHttpClient { inner: client })
    }
}

#[derive(Debug, Clone)]
pub struct GoogleHttpClient {
    inner: Client,
}

impl GoogleHttpClient {
    pub fn builder() -> GoogleHttpClientBuilder {
        GoogleHttpClientBuilder::default()
    }

    /// Send a request with an optional json body and bearer token.
    pub async fn execute<B, R>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
        token: Option<&str>,
    ) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        debug!(%method, %url, "google api request");

        let mut req = self.inner.request(method, url);
        if let Some(body) = body {
            req = req.json(body);
        }
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }

        let res = req.send().await?;
        read_json(res).await
    }

    /// Send a url encoded form, used for token exchanges.
    pub async fn post_form<F, R>(&self, url: Url, form: &F) -> Result<R>
    where
        F: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        debug!(%url, "token request");

        let res = self.inner.post(url).form(form).send().await?;
        read_json(res).await
    }
}

async fn read_json<R: DeserializeOwned>(res: Response) -> Result<R> {
    let status = res.status();
    let res = res.text().await?;
    trace!(%status, %res, "response");

    if !status.is_success() {
        return Err(SheetsError::Api {
            status,
            message: error_message(&res),
        });
    }

    // Some endpoints (e.g. clear) may send back an empty body.
    let res = if res.trim().is_empty() { "{}" } else { res.as_str() };
    let res: R = serde_json::from_str(res)?;
    Ok(res)
}

#[derive(serde::Deserialize)]
struct OAuthErrorResponse {
    error: String,
    error_description: Option<String>,
}

/// Pull a readable message out of an error body.
///
/// Google apis wrap errors in `{"error": {"message": ..}}`, the token endpoint
/// uses the OAuth `{"error": .., "error_description": ..}` form.
pub(crate) fn error_message(body: &str) -> String {
    if let Ok(resp) = serde_json::from_str::<GoogleErrorResponse>(body) {
        return match resp.error.status {
            Some(status) => format!("{status}: {}", resp.error.message),
            None => resp.error.message,
        };
    }
    if let Ok(resp) = serde_json::from_str::<OAuthErrorResponse>(body) {
        return match resp.error_description {
            Some(desc) => format!("{}: {desc}", resp.error),
            None => resp.error,
        };
    }
    body.to_string()
}
