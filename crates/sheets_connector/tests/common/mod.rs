//! In-memory backend recording every call made by the client.

#![allow(dead_code)]

use parking_lot::Mutex;
use reqwest::StatusCode;
use sheets_connector::errors::{Result, SheetsError};
use sheets_connector::rest::{
    AppendValuesResponse,
    BatchGetValuesResponse,
    BatchUpdateSpreadsheetRequest,
    BatchUpdateSpreadsheetResponse,
    BatchUpdateValuesRequest,
    BatchUpdateValuesResponse,
    ClearValuesResponse,
    DriveFile,
    InsertDataOption,
    Sheet,
    SheetId,
    SheetProperties,
    Spreadsheet,
    SpreadsheetProperties,
    ValueInputOption,
    ValueRange,
};
use sheets_connector::{
    AccessToken,
    AuthApi,
    FilesApi,
    ReadOptions,
    SheetsClient,
    SpreadsheetsApi,
    ValuesApi,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    BatchGet {
        spreadsheet_id: String,
        ranges: Vec<String>,
        options: ReadOptions,
    },
    Update {
        spreadsheet_id: String,
        request: BatchUpdateValuesRequest,
    },
    Append {
        spreadsheet_id: String,
        range: Option<String>,
        values: ValueRange,
        value_input_option: ValueInputOption,
        insert_data_option: InsertDataOption,
    },
    Clear {
        spreadsheet_id: String,
        range: Option<String>,
    },
    Get {
        spreadsheet_id: String,
    },
    BatchUpdate {
        spreadsheet_id: String,
        request: BatchUpdateSpreadsheetRequest,
    },
    ListFiles {
        query: String,
    },
    SetAccessToken {
        token: AccessToken,
    },
}

#[derive(Debug, Default)]
pub struct MockBackend {
    /// Values returned by every batch get.
    pub values: Option<Vec<Vec<String>>>,
    pub spreadsheet_title: String,
    pub sheets: Vec<(SheetId, String)>,
    pub files: Vec<(String, String)>,
    /// Fail every values call with a bad request.
    pub fail_values: bool,
    pub token: Option<AccessToken>,
    pub calls: Mutex<Vec<Call>>,
}

impl MockBackend {
    pub fn with_values(values: &[&[&str]]) -> Self {
        MockBackend {
            values: Some(rows(values)),
            ..Default::default()
        }
    }

    pub fn with_sheets(sheets: &[(SheetId, &str)]) -> Self {
        MockBackend {
            sheets: sheets.iter().map(|(id, t)| (*id, t.to_string())).collect(),
            ..Default::default()
        }
    }

    pub fn with_files(files: &[(&str, &str)]) -> Self {
        MockBackend {
            files: files
                .iter()
                .map(|(id, name)| (id.to_string(), name.to_string()))
                .collect(),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }

    fn check_values(&self) -> Result<()> {
        if self.fail_values {
            return Err(SheetsError::Api {
                status: StatusCode::BAD_REQUEST,
                message: "Unable to parse range".to_string(),
            });
        }
        Ok(())
    }
}

pub fn rows(values: &[&[&str]]) -> Vec<Vec<String>> {
    values
        .iter()
        .map(|row| row.iter().map(|c| c.to_string()).collect())
        .collect()
}

pub fn client(backend: MockBackend) -> SheetsClient<MockBackend> {
    logutil::init_test();
    SheetsClient::new(backend)
}

impl ValuesApi for MockBackend {
    async fn batch_get(
        &self,
        spreadsheet_id: &str,
        ranges: &[String],
        options: &ReadOptions,
    ) -> Result<BatchGetValuesResponse> {
        self.record(Call::BatchGet {
            spreadsheet_id: spreadsheet_id.to_string(),
            ranges: ranges.to_vec(),
            options: options.clone(),
        });
        self.check_values()?;
        Ok(BatchGetValuesResponse::from_values(self.values.clone()))
    }

    async fn update(
        &self,
        spreadsheet_id: &str,
        request: BatchUpdateValuesRequest,
    ) -> Result<BatchUpdateValuesResponse> {
        self.record(Call::Update {
            spreadsheet_id: spreadsheet_id.to_string(),
            request,
        });
        self.check_values()?;
        Ok(BatchUpdateValuesResponse {
            spreadsheet_id: spreadsheet_id.to_string(),
            total_updated_rows: Some(1),
            ..Default::default()
        })
    }

    async fn append(
        &self,
        spreadsheet_id: &str,
        range: Option<&str>,
        values: ValueRange,
        value_input_option: ValueInputOption,
        insert_data_option: InsertDataOption,
    ) -> Result<AppendValuesResponse> {
        self.record(Call::Append {
            spreadsheet_id: spreadsheet_id.to_string(),
            range: range.map(String::from),
            values,
            value_input_option,
            insert_data_option,
        });
        self.check_values()?;
        Ok(AppendValuesResponse {
            spreadsheet_id: spreadsheet_id.to_string(),
            table_range: range.map(String::from),
            updates: None,
        })
    }

    async fn clear(
        &self,
        spreadsheet_id: &str,
        range: Option<&str>,
    ) -> Result<Option<ClearValuesResponse>> {
        self.record(Call::Clear {
            spreadsheet_id: spreadsheet_id.to_string(),
            range: range.map(String::from),
        });
        self.check_values()?;
        Ok(None)
    }
}

impl SpreadsheetsApi for MockBackend {
    async fn get(&self, spreadsheet_id: &str) -> Result<Spreadsheet> {
        self.record(Call::Get {
            spreadsheet_id: spreadsheet_id.to_string(),
        });
        Ok(Spreadsheet {
            spreadsheet_id: spreadsheet_id.to_string(),
            properties: SpreadsheetProperties {
                title: self.spreadsheet_title.clone(),
                ..Default::default()
            },
            sheets: self
                .sheets
                .iter()
                .enumerate()
                .map(|(idx, (id, title))| Sheet {
                    properties: SheetProperties {
                        sheet_id: *id,
                        title: title.clone(),
                        index: Some(idx as i64),
                        ..Default::default()
                    },
                })
                .collect(),
            spreadsheet_url: None,
        })
    }

    async fn batch_update(
        &self,
        spreadsheet_id: &str,
        request: BatchUpdateSpreadsheetRequest,
    ) -> Result<BatchUpdateSpreadsheetResponse> {
        self.record(Call::BatchUpdate {
            spreadsheet_id: spreadsheet_id.to_string(),
            request,
        });
        Ok(BatchUpdateSpreadsheetResponse {
            spreadsheet_id: spreadsheet_id.to_string(),
            replies: Vec::new(),
        })
    }
}

impl FilesApi for MockBackend {
    async fn list_files(&self, query: &str) -> Result<Vec<DriveFile>> {
        self.record(Call::ListFiles {
            query: query.to_string(),
        });
        Ok(self
            .files
            .iter()
            .map(|(id, name)| DriveFile {
                id: id.clone(),
                name: name.clone(),
            })
            .collect())
    }
}

impl AuthApi for MockBackend {
    async fn set_access_token(&mut self, token: AccessToken) -> Result<()> {
        self.record(Call::SetAccessToken {
            token: token.clone(),
        });
        self.token = Some(token);
        Ok(())
    }

    fn access_token(&self) -> Option<&AccessToken> {
        self.token.as_ref()
    }
}
