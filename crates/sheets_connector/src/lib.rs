//! Fluent access to Google Sheets values.
//!
//! Select a spreadsheet and sheet, optionally narrow the range, then read the
//! values as header keyed records or write rows back.

pub use crate::api::{AuthApi, FilesApi, SheetsBackend, SpreadsheetsApi, ValuesApi};
pub use crate::auth::{AccessToken, ServiceAccount};
pub use crate::client::SheetsClient;
pub use crate::config::GoogleConfig;
pub use crate::google::GoogleApi;
pub use crate::macros::{MacroFn, MacroRegistry};
pub use crate::records::{
    AppendableRow,
    Record,
    RecordCollection,
    RowLookup,
    from_appendable,
    to_records,
};
pub use crate::selection::{MajorDimension, ReadOptions, Selection};

mod auth;
mod client;
mod google;
mod req;

pub mod api;
pub mod config;
pub mod errors;
pub mod macros;
pub mod records;
pub mod rest;
pub mod selection;

/// Client backed by the Google REST apis.
pub type GoogleSheetsClient = SheetsClient<GoogleApi>;

impl GoogleSheetsClient {
    /// Create a client authenticated with an OAuth access token.
    ///
    /// An expired token is refreshed if it carries a refresh token and the
    /// config has client credentials.
    pub async fn with_access_token(
        config: GoogleConfig,
        token: impl Into<AccessToken>,
    ) -> errors::Result<Self> {
        let mut client = SheetsClient::new(GoogleApi::new(config)?);
        client.set_access_token(token).await?;
        Ok(client)
    }

    /// Create a client authenticated as a service account.
    pub async fn with_service_account(
        config: GoogleConfig,
        account: &ServiceAccount,
    ) -> errors::Result<Self> {
        let api = GoogleApi::with_service_account(config, account).await?;
        Ok(SheetsClient::new(api))
    }
}
