//! Parameters accumulated by the fluent client between operations.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::SheetsError;

/// Separator between a sheet title and a cell range, e.g. `Sheet1!A1:B2`.
pub const SHEET_SEPARATOR: char = '!';

pub const DEFAULT_VALUE_RENDER_OPTION: &str = "FORMATTED_VALUE";
pub const DEFAULT_DATE_TIME_RENDER_OPTION: &str = "SERIAL_NUMBER";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MajorDimension {
    #[default]
    Rows,
    Columns,
}

impl MajorDimension {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rows => "ROWS",
            Self::Columns => "COLUMNS",
        }
    }
}

impl fmt::Display for MajorDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MajorDimension {
    type Err = SheetsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ROWS" => Ok(Self::Rows),
            "COLUMNS" => Ok(Self::Columns),
            other => Err(SheetsError::InvalidConfig(format!(
                "unknown major dimension '{other}', expected ROWS or COLUMNS"
            ))),
        }
    }
}

/// Rendering parameters passed verbatim to a values read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOptions {
    pub major_dimension: MajorDimension,
    pub value_render_option: String,
    pub date_time_render_option: String,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            major_dimension: MajorDimension::Rows,
            value_render_option: DEFAULT_VALUE_RENDER_OPTION.to_string(),
            date_time_render_option: DEFAULT_DATE_TIME_RENDER_OPTION.to_string(),
        }
    }
}

/// Currently selected target and rendering options.
///
/// The sheet and range only live for a single values operation, see
/// [`Selection::reset_target`]. The spreadsheet id and the read options stay
/// until they are explicitly changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    spreadsheet_id: Option<String>,
    sheet: Option<String>,
    range: Option<String>,
    read_options: ReadOptions,
}

/// Empty strings are treated the same as unset values.
fn filled(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spreadsheet_id(&self) -> Option<&str> {
        filled(self.spreadsheet_id.as_deref())
    }

    pub fn sheet(&self) -> Option<&str> {
        filled(self.sheet.as_deref())
    }

    pub fn range(&self) -> Option<&str> {
        filled(self.range.as_deref())
    }

    pub fn read_options(&self) -> &ReadOptions {
        &self.read_options
    }

    pub fn set_spreadsheet_id(&mut self, id: Option<String>) {
        self.spreadsheet_id = id;
    }

    pub fn set_sheet(&mut self, sheet: Option<String>) {
        self.sheet = sheet;
    }

    pub fn set_range(&mut self, range: Option<String>) {
        self.range = range;
    }

    pub fn set_major_dimension(&mut self, major_dimension: MajorDimension) {
        self.read_options.major_dimension = major_dimension;
    }

    pub fn set_value_render_option(&mut self, option: String) {
        self.read_options.value_render_option = option;
    }

    pub fn set_date_time_render_option(&mut self, option: String) {
        self.read_options.date_time_render_option = option;
    }

    /// Compute the range string the next operation targets.
    ///
    /// A range that already carries a sheet qualifier is used as is, an
    /// unqualified range is prefixed with the selected sheet. With no range
    /// the whole sheet is targeted.
    pub fn ranges(&self) -> Option<String> {
        match (self.sheet(), self.range()) {
            (Some(_), Some(range)) if range.contains(SHEET_SEPARATOR) => Some(range.to_string()),
            (Some(sheet), Some(range)) => Some(format!("{sheet}{SHEET_SEPARATOR}{range}")),
            (Some(sheet), None) => Some(sheet.to_string()),
            (None, Some(range)) => Some(range.to_string()),
            (None, None) => None,
        }
    }

    /// Clear the per-operation target (sheet and range).
    pub fn reset_target(&mut self) {
        self.sheet = None;
        self.range = None;
    }
}
