//! Capabilities the client needs from the remote spreadsheet services.
//!
//! [`GoogleApi`](crate::google::GoogleApi) implements all of these against the
//! REST apis. Tests implement them in memory.

use std::future::Future;

use crate::auth::AccessToken;
use crate::errors::Result;
use crate::rest::{
    AppendValuesResponse,
    BatchGetValuesResponse,
    BatchUpdateSpreadsheetRequest,
    BatchUpdateSpreadsheetResponse,
    BatchUpdateValuesRequest,
    BatchUpdateValuesResponse,
    ClearValuesResponse,
    DriveFile,
    InsertDataOption,
    Spreadsheet,
    ValueInputOption,
    ValueRange,
};
use crate::selection::ReadOptions;

/// Access to `spreadsheets.values`.
pub trait ValuesApi {
    fn batch_get(
        &self,
        spreadsheet_id: &str,
        ranges: &[String],
        options: &ReadOptions,
    ) -> impl Future<Output = Result<BatchGetValuesResponse>> + Send;

    /// Write one or more value ranges (`values.batchUpdate`).
    fn update(
        &self,
        spreadsheet_id: &str,
        request: BatchUpdateValuesRequest,
    ) -> impl Future<Output = Result<BatchUpdateValuesResponse>> + Send;

    fn append(
        &self,
        spreadsheet_id: &str,
        range: Option<&str>,
        values: ValueRange,
        value_input_option: ValueInputOption,
        insert_data_option: InsertDataOption,
    ) -> impl Future<Output = Result<AppendValuesResponse>> + Send;

    fn clear(
        &self,
        spreadsheet_id: &str,
        range: Option<&str>,
    ) -> impl Future<Output = Result<Option<ClearValuesResponse>>> + Send;
}

/// Access to `spreadsheets`.
pub trait SpreadsheetsApi {
    fn get(&self, spreadsheet_id: &str) -> impl Future<Output = Result<Spreadsheet>> + Send;

    fn batch_update(
        &self,
        spreadsheet_id: &str,
        request: BatchUpdateSpreadsheetRequest,
    ) -> impl Future<Output = Result<BatchUpdateSpreadsheetResponse>> + Send;
}

/// File listing, used for looking up spreadsheets by title.
pub trait FilesApi {
    /// List all files matching a Drive search query.
    fn list_files(&self, query: &str) -> impl Future<Output = Result<Vec<DriveFile>>> + Send;
}

/// Token handling for a backend.
pub trait AuthApi {
    /// Use a new access token, refreshing it first if it's expired and
    /// refreshable.
    fn set_access_token(&mut self, token: AccessToken) -> impl Future<Output = Result<()>> + Send;

    fn access_token(&self) -> Option<&AccessToken>;
}

/// Everything the client needs for reading, writing and lookups.
pub trait SheetsBackend: ValuesApi + SpreadsheetsApi + FilesApi {}

impl<T> SheetsBackend for T where T: ValuesApi + SpreadsheetsApi + FilesApi {}
