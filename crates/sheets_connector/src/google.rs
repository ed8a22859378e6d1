//! REST backend for the Sheets v4 and Drive v3 apis.

use std::future::Future;

use reqwest::Method;
use tracing::debug;
use url::Url;

use crate::api::{AuthApi, FilesApi, SpreadsheetsApi, ValuesApi};
use crate::auth::{AccessToken, ServiceAccount, refresh_access_token};
use crate::config::GoogleConfig;
use crate::errors::{Result, SheetsError};
use crate::req::GoogleHttpClient;
use crate::rest::{
    AppendValuesResponse,
    BatchGetValuesResponse,
    BatchUpdateSpreadsheetRequest,
    BatchUpdateSpreadsheetResponse,
    BatchUpdateValuesRequest,
    BatchUpdateValuesResponse,
    ClearValuesResponse,
    DriveFile,
    DriveFileList,
    InsertDataOption,
    Spreadsheet,
    ValueInputOption,
    ValueRange,
};
use crate::selection::ReadOptions;

/// Page size requested from Drive when listing files.
const DRIVE_PAGE_SIZE: &str = "1000";

#[derive(Debug, Clone)]
pub struct GoogleApi {
    config: GoogleConfig,
    client: GoogleHttpClient,
    sheets_endpoint: Url,
    drive_endpoint: Url,
    token: Option<AccessToken>,
}

/// Append path segments to a base url.
fn endpoint_url(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| SheetsError::InvalidConfig(format!("endpoint cannot be a base: {base}")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

impl GoogleApi {
    pub fn new(config: GoogleConfig) -> Result<Self> {
        let client = GoogleHttpClient::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .build()?;

        Ok(GoogleApi {
            sheets_endpoint: config.sheets_url()?,
            drive_endpoint: config.drive_url()?,
            config,
            client,
            token: None,
        })
    }

    /// Create a backend authenticated as a service account.
    pub async fn with_service_account(
        config: GoogleConfig,
        account: &ServiceAccount,
    ) -> Result<Self> {
        let mut api = Self::new(config)?;
        let token = account
            .fetch_access_token(&api.client, &api.config.scopes)
            .await?;
        debug!(email = %account.client_email(), "authenticated service account");
        api.token = Some(token);
        Ok(api)
    }

    pub fn config(&self) -> &GoogleConfig {
        &self.config
    }

    fn bearer(&self) -> Option<&str> {
        self.token.as_ref().map(|t| t.access_token.as_str())
    }

    /// `v4/spreadsheets/{id}/values/...`
    fn values_url(&self, spreadsheet_id: &str, rest: &str) -> Result<Url> {
        endpoint_url(
            &self.sheets_endpoint,
            &["v4", "spreadsheets", spreadsheet_id, "values", rest],
        )
    }

    pub(crate) fn batch_get_url(
        &self,
        spreadsheet_id: &str,
        ranges: &[String],
        options: &ReadOptions,
    ) -> Result<Url> {
        let mut url = endpoint_url(
            &self.sheets_endpoint,
            &["v4", "spreadsheets", spreadsheet_id, "values:batchGet"],
        )?;
        {
            let mut pairs = url.query_pairs_mut();
            for range in ranges {
                pairs.append_pair("ranges", range);
            }
            pairs
                .append_pair("majorDimension", options.major_dimension.as_str())
                .append_pair("valueRenderOption", &options.value_render_option)
                .append_pair("dateTimeRenderOption", &options.date_time_render_option);
        }
        Ok(url)
    }

    pub(crate) fn append_url(
        &self,
        spreadsheet_id: &str,
        range: Option<&str>,
        value_input_option: ValueInputOption,
        insert_data_option: InsertDataOption,
    ) -> Result<Url> {
        let mut url = self.values_url(
            spreadsheet_id,
            &format!("{}:append", range.unwrap_or_default()),
        )?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", value_input_option.as_str())
            .append_pair("insertDataOption", insert_data_option.as_str());
        Ok(url)
    }

    pub(crate) fn files_url(&self, query: &str, page_token: Option<&str>) -> Result<Url> {
        let mut url = endpoint_url(&self.drive_endpoint, &["drive", "v3", "files"])?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("q", query)
                .append_pair("pageSize", DRIVE_PAGE_SIZE)
                .append_pair("fields", "nextPageToken,files(id,name)");
            if let Some(page_token) = page_token {
                pairs.append_pair("pageToken", page_token);
            }
        }
        Ok(url)
    }
}

impl ValuesApi for GoogleApi {
    async fn batch_get(
        &self,
        spreadsheet_id: &str,
        ranges: &[String],
        options: &ReadOptions,
    ) -> Result<BatchGetValuesResponse> {
        let url = self.batch_get_url(spreadsheet_id, ranges, options)?;
        self.client
            .execute::<(), _>(Method::GET, url, None, self.bearer())
            .await
    }

    async fn update(
        &self,
        spreadsheet_id: &str,
        request: BatchUpdateValuesRequest,
    ) -> Result<BatchUpdateValuesResponse> {
        let url = endpoint_url(
            &self.sheets_endpoint,
            &["v4", "spreadsheets", spreadsheet_id, "values:batchUpdate"],
        )?;
        self.client
            .execute(Method::POST, url, Some(&request), self.bearer())
            .await
    }

    async fn append(
        &self,
        spreadsheet_id: &str,
        range: Option<&str>,
        values: ValueRange,
        value_input_option: ValueInputOption,
        insert_data_option: InsertDataOption,
    ) -> Result<AppendValuesResponse> {
        let url = self.append_url(spreadsheet_id, range, value_input_option, insert_data_option)?;
        self.client
            .execute(Method::POST, url, Some(&values), self.bearer())
            .await
    }

    async fn clear(
        &self,
        spreadsheet_id: &str,
        range: Option<&str>,
    ) -> Result<Option<ClearValuesResponse>> {
        let url = self.values_url(
            spreadsheet_id,
            &format!("{}:clear", range.unwrap_or_default()),
        )?;
        let resp: ClearValuesResponse = self
            .client
            .execute(Method::POST, url, Some(&serde_json::json!({})), self.bearer())
            .await?;
        Ok(Some(resp))
    }
}

impl SpreadsheetsApi for GoogleApi {
    async fn get(&self, spreadsheet_id: &str) -> Result<Spreadsheet> {
        let url = endpoint_url(&self.sheets_endpoint, &["v4", "spreadsheets", spreadsheet_id])?;
        self.client
            .execute::<(), _>(Method::GET, url, None, self.bearer())
            .await
    }

    async fn batch_update(
        &self,
        spreadsheet_id: &str,
        request: BatchUpdateSpreadsheetRequest,
    ) -> Result<BatchUpdateSpreadsheetResponse> {
        let url = endpoint_url(
            &self.sheets_endpoint,
            &["v4", "spreadsheets", &format!("{spreadsheet_id}:batchUpdate")],
        )?;
        self.client
            .execute(Method::POST, url, Some(&request), self.bearer())
            .await
    }
}

impl FilesApi for GoogleApi {
    async fn list_files(&self, query: &str) -> Result<Vec<DriveFile>> {
        collect_pages(|page_token| async move {
            let url = self.files_url(query, page_token.as_deref())?;
            self.client
                .execute::<(), _>(Method::GET, url, None, self.bearer())
                .await
        })
        .await
    }
}

/// Fetch Drive pages until there's no next page token.
async fn collect_pages<F, Fut>(mut fetch: F) -> Result<Vec<DriveFile>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<DriveFileList>>,
{
    let mut files = Vec::new();
    let mut page_token: Option<String> = None;

    loop {
        let page = fetch(page_token.take()).await?;
        files.extend(page.files);

        match page.next_page_token {
            Some(token) if !token.is_empty() => page_token = Some(token),
            _ => break,
        }
    }

    Ok(files)
}

impl AuthApi for GoogleApi {
    async fn set_access_token(&mut self, token: AccessToken) -> Result<()> {
        if !(token.is_expired() && token.is_refreshable()) {
            self.token = Some(token);
            return Ok(());
        }

        let (client_id, client_secret) =
            match (&self.config.client_id, &self.config.client_secret) {
                (Some(id), Some(secret)) => (id.as_str(), secret.as_str()),
                _ => {
                    return Err(SheetsError::InvalidConfig(
                        "client_id and client_secret are required to refresh an access token"
                            .to_string(),
                    ));
                }
            };

        debug!("access token expired, refreshing");
        let refresh_token = token.refresh_token.as_deref().unwrap_or_default();
        let refreshed = refresh_access_token(
            &self.client,
            self.config.token_url()?,
            client_id,
            client_secret,
            refresh_token,
        )
        .await?;

        self.token = Some(refreshed);
        Ok(())
    }

    fn access_token(&self) -> Option<&AccessToken> {
        self.token.as_ref()
    }
}
