//! Request and response types for the Sheets v4 and Drive v3 JSON apis.

use serde::{Deserialize, Deserializer, Serialize};

use crate::selection::MajorDimension;

pub type SheetId = i64;

/// Mime type Drive uses for Google spreadsheets.
pub const SPREADSHEET_MIME_TYPE: &str = "application/vnd.google-apps.spreadsheet";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueInputOption {
    #[default]
    Raw,
    UserEntered,
}

impl ValueInputOption {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Raw => "RAW",
            Self::UserEntered => "USER_ENTERED",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InsertDataOption {
    #[default]
    Overwrite,
    InsertRows,
}

impl InsertDataOption {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Overwrite => "OVERWRITE",
            Self::InsertRows => "INSERT_ROWS",
        }
    }
}

/// Deserialize cells into strings.
///
/// Unformatted renders return numbers and booleans, and the api returns null
/// for rows or cells that have nothing in them.
fn deserialize_cells<'de, D>(deserializer: D) -> Result<Option<Vec<Vec<String>>>, D::Error>
where
    D: Deserializer<'de>,
{
    let rows: Option<Vec<Option<Vec<serde_json::Value>>>> = Option::deserialize(deserializer)?;
    Ok(rows.map(|rows| {
        rows.into_iter()
            .map(|row| row.unwrap_or_default().into_iter().map(cell_to_string).collect())
            .collect()
    }))
}

pub fn cell_to_string(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    }
}

// <https://developers.google.com/sheets/api/reference/rest/v4/spreadsheets.values#ValueRange>
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub major_dimension: Option<MajorDimension>,
    #[serde(
        default,
        deserialize_with = "deserialize_cells",
        skip_serializing_if = "Option::is_none"
    )]
    pub values: Option<Vec<Vec<String>>>,
}

impl ValueRange {
    pub fn new(range: Option<String>, values: Vec<Vec<String>>) -> Self {
        ValueRange {
            range,
            major_dimension: None,
            values: Some(values),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchGetValuesResponse {
    #[serde(default)]
    pub spreadsheet_id: String,
    #[serde(default)]
    pub value_ranges: Vec<ValueRange>,
}

impl BatchGetValuesResponse {
    /// Response holding a single value range.
    pub fn from_values(values: Option<Vec<Vec<String>>>) -> Self {
        BatchGetValuesResponse {
            spreadsheet_id: String::new(),
            value_ranges: vec![ValueRange {
                range: None,
                major_dimension: None,
                values,
            }],
        }
    }

    /// Values of the first range, empty if the api returned none.
    pub fn into_first_values(self) -> Vec<Vec<String>> {
        self.value_ranges
            .into_iter()
            .next()
            .and_then(|r| r.values)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchUpdateValuesRequest {
    pub value_input_option: ValueInputOption,
    pub data: Vec<ValueRange>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateValuesResponse {
    #[serde(default)]
    pub spreadsheet_id: String,
    pub updated_range: Option<String>,
    pub updated_rows: Option<i64>,
    pub updated_columns: Option<i64>,
    pub updated_cells: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchUpdateValuesResponse {
    #[serde(default)]
    pub spreadsheet_id: String,
    pub total_updated_rows: Option<i64>,
    pub total_updated_columns: Option<i64>,
    pub total_updated_cells: Option<i64>,
    pub total_updated_sheets: Option<i64>,
    #[serde(default)]
    pub responses: Vec<UpdateValuesResponse>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendValuesResponse {
    #[serde(default)]
    pub spreadsheet_id: String,
    pub table_range: Option<String>,
    pub updates: Option<UpdateValuesResponse>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearValuesResponse {
    #[serde(default)]
    pub spreadsheet_id: String,
    pub cleared_range: Option<String>,
}

// <https://developers.google.com/sheets/api/reference/rest/v4/spreadsheets#Spreadsheet>
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spreadsheet {
    #[serde(default)]
    pub spreadsheet_id: String,
    #[serde(default)]
    pub properties: SpreadsheetProperties,
    #[serde(default)]
    pub sheets: Vec<Sheet>,
    pub spreadsheet_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpreadsheetProperties {
    #[serde(default)]
    pub title: String,
    pub locale: Option<String>,
    pub time_zone: Option<String>,
    pub auto_recalc: Option<String>,
    /// Fields not modeled above, e.g. default format and theme.
    #[serde(flatten)]
    pub other: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sheet {
    #[serde(default)]
    pub properties: SheetProperties,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetProperties {
    #[serde(default)]
    pub sheet_id: SheetId,
    #[serde(default)]
    pub title: String,
    pub index: Option<i64>,
    pub sheet_type: Option<String>,
    pub hidden: Option<bool>,
    #[serde(flatten)]
    pub other: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchUpdateSpreadsheetRequest {
    pub requests: Vec<SpreadsheetRequest>,
}

/// The subset of spreadsheet update requests used for sheet management.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SpreadsheetRequest {
    AddSheet { properties: NewSheetProperties },
    DeleteSheet {
        #[serde(rename = "sheetId")]
        sheet_id: SheetId,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSheetProperties {
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchUpdateSpreadsheetResponse {
    #[serde(default)]
    pub spreadsheet_id: String,
    #[serde(default)]
    pub replies: Vec<serde_json::Value>,
}

// <https://developers.google.com/drive/api/reference/rest/v3/files/list>
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFileList {
    pub next_page_token: Option<String>,
    #[serde(default)]
    pub files: Vec<DriveFile>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id: String,
    pub name: String,
}

/// Error body returned by google apis on failure.
#[derive(Debug, Deserialize)]
pub struct GoogleErrorResponse {
    pub error: GoogleError,
}

#[derive(Debug, Deserialize)]
pub struct GoogleError {
    pub code: Option<u16>,
    pub message: String,
    pub status: Option<String>,
}
