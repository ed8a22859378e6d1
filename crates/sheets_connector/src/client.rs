use indexmap::IndexMap;
use tracing::debug;

use crate::api::{AuthApi, FilesApi, SheetsBackend, SpreadsheetsApi, ValuesApi};
use crate::auth::AccessToken;
use crate::errors::{Result, SheetsError};
use crate::macros::MacroRegistry;
use crate::records::{Record, RecordCollection, RowLookup, from_appendable, split_header};
use crate::rest::{
    AppendValuesResponse,
    BatchUpdateSpreadsheetRequest,
    BatchUpdateSpreadsheetResponse,
    BatchUpdateValuesRequest,
    BatchUpdateValuesResponse,
    ClearValuesResponse,
    InsertDataOption,
    NewSheetProperties,
    SPREADSHEET_MIME_TYPE,
    SheetId,
    SheetProperties,
    SpreadsheetProperties,
    SpreadsheetRequest,
    ValueInputOption,
    ValueRange,
};
use crate::selection::{MajorDimension, Selection};

/// Target of a single values operation, taken out of the selection.
struct Target {
    spreadsheet_id: String,
    range: Option<String>,
}

impl Target {
    fn ranges(&self) -> Vec<String> {
        self.range.iter().cloned().collect()
    }
}

/// Fluent client for reading and writing spreadsheet values.
///
/// Setters accumulate the target of the next operation. Every values
/// operation consumes the selected sheet and range, so each read or write
/// starts from a clean target while the spreadsheet stays selected.
///
/// ```ignore
/// let rows = client.spreadsheet("id").sheet("Users").range("A1:C").all().await?;
/// ```
#[derive(Debug)]
pub struct SheetsClient<B> {
    service: B,
    selection: Selection,
    macros: MacroRegistry<B>,
}

impl<B> SheetsClient<B> {
    pub fn new(service: B) -> Self {
        SheetsClient {
            service,
            selection: Selection::new(),
            macros: MacroRegistry::new(),
        }
    }

    pub fn service(&self) -> &B {
        &self.service
    }

    pub fn service_mut(&mut self) -> &mut B {
        &mut self.service
    }

    pub fn set_service(&mut self, service: B) -> &mut Self {
        self.service = service;
        self
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn spreadsheet(&mut self, spreadsheet_id: impl Into<String>) -> &mut Self {
        self.selection.set_spreadsheet_id(Some(spreadsheet_id.into()));
        self
    }

    pub fn sheet(&mut self, sheet: impl Into<String>) -> &mut Self {
        self.selection.set_sheet(Some(sheet.into()));
        self
    }

    pub fn range(&mut self, range: impl Into<String>) -> &mut Self {
        self.selection.set_range(Some(range.into()));
        self
    }

    pub fn major_dimension(&mut self, major_dimension: MajorDimension) -> &mut Self {
        self.selection.set_major_dimension(major_dimension);
        self
    }

    pub fn value_render_option(&mut self, option: impl Into<String>) -> &mut Self {
        self.selection.set_value_render_option(option.into());
        self
    }

    pub fn date_time_render_option(&mut self, option: impl Into<String>) -> &mut Self {
        self.selection.set_date_time_render_option(option.into());
        self
    }

    /// The range the next values operation will target.
    pub fn ranges(&self) -> Option<String> {
        self.selection.ranges()
    }

    pub fn spreadsheet_id(&self) -> Option<&str> {
        self.selection.spreadsheet_id()
    }

    /// Convert a header and raw rows into records.
    pub fn collection<H, I, R>(&self, header: &[H], rows: I) -> RecordCollection
    where
        H: AsRef<str>,
        I: IntoIterator<Item = R>,
        R: AsRef<[String]>,
    {
        RecordCollection::from_rows(header, rows)
    }

    pub fn macros(&self) -> &MacroRegistry<B> {
        &self.macros
    }

    pub fn macros_mut(&mut self) -> &mut MacroRegistry<B> {
        &mut self.macros
    }

    /// Run a registered custom operation.
    pub async fn call(&mut self, name: &str) -> Result<serde_json::Value> {
        let op = self.macros.get(name)?;
        op(self).await
    }

    /// Resolve the current target and reset the sheet and range.
    fn take_target(&mut self) -> Target {
        let target = Target {
            spreadsheet_id: self
                .selection
                .spreadsheet_id()
                .unwrap_or_default()
                .to_string(),
            range: self.selection.ranges(),
        };
        self.selection.reset_target();
        target
    }
}

impl<B: AuthApi> SheetsClient<B> {
    pub async fn set_access_token(&mut self, token: impl Into<AccessToken>) -> Result<&mut Self> {
        self.service.set_access_token(token.into()).await?;
        Ok(self)
    }

    pub fn access_token(&self) -> Option<&AccessToken> {
        self.service.access_token()
    }
}

impl<B: SheetsBackend> SheetsClient<B> {
    /// Select the first spreadsheet with a matching title.
    ///
    /// The spreadsheet becomes unselected if there's no match.
    pub async fn spreadsheet_by_title(&mut self, title: &str) -> Result<&mut Self> {
        let list = self.spreadsheet_list().await?;
        let id = list
            .into_iter()
            .find_map(|(id, name)| (name == title).then_some(id));
        if id.is_none() {
            debug!(%title, "no spreadsheet found with title");
        }
        self.selection.set_spreadsheet_id(id);
        Ok(self)
    }

    /// Select a sheet by its numeric id.
    ///
    /// The sheet becomes unselected if there's no match.
    pub async fn sheet_by_id(&mut self, sheet_id: SheetId) -> Result<&mut Self> {
        let mut list = self.sheet_list().await?;
        let title = list.shift_remove(&sheet_id);
        if title.is_none() {
            debug!(%sheet_id, "no sheet found with id");
        }
        self.selection.set_sheet(title);
        Ok(self)
    }

    /// Sheet ids mapped to titles, in sheet order.
    pub async fn sheet_list(&self) -> Result<IndexMap<SheetId, String>> {
        let spreadsheet = self
            .service
            .get(self.selection.spreadsheet_id().unwrap_or_default())
            .await?;
        Ok(spreadsheet
            .sheets
            .into_iter()
            .map(|s| (s.properties.sheet_id, s.properties.title))
            .collect())
    }

    /// Spreadsheet file ids mapped to titles.
    pub async fn spreadsheet_list(&self) -> Result<IndexMap<String, String>> {
        let query = format!("mimeType = '{SPREADSHEET_MIME_TYPE}'");
        let files = self.service.list_files(&query).await?;
        Ok(files.into_iter().map(|f| (f.id, f.name)).collect())
    }

    /// Raw values of the target range.
    pub async fn values(&mut self) -> Result<Vec<Vec<String>>> {
        let target = self.take_target();
        self.fetch_values(&target).await
    }

    async fn fetch_values(&self, target: &Target) -> Result<Vec<Vec<String>>> {
        debug!(spreadsheet_id = %target.spreadsheet_id, range = ?target.range, "reading values");
        let resp = self
            .service
            .batch_get(
                &target.spreadsheet_id,
                &target.ranges(),
                self.selection.read_options(),
            )
            .await?;
        Ok(resp.into_first_values())
    }

    /// Records of the target range, using its first row as the header.
    pub async fn get(&mut self) -> Result<RecordCollection> {
        let values = self.values().await?;
        Ok(match split_header(values) {
            Some((header, rows)) => RecordCollection::from_rows(&header, rows),
            None => RecordCollection::default(),
        })
    }

    pub async fn all(&mut self) -> Result<Vec<Record>> {
        Ok(self.get().await?.into_vec())
    }

    /// First record of the target range, empty if there's none.
    pub async fn first(&mut self) -> Result<Record> {
        Ok(self.get().await?.into_iter().next().unwrap_or_default())
    }

    pub async fn update(
        &mut self,
        values: Vec<Vec<String>>,
        value_input_option: ValueInputOption,
    ) -> Result<BatchUpdateValuesResponse> {
        let target = self.take_target();
        debug!(spreadsheet_id = %target.spreadsheet_id, range = ?target.range, "updating values");

        let request = BatchUpdateValuesRequest {
            value_input_option,
            data: vec![ValueRange {
                range: target.range,
                major_dimension: Some(self.selection.read_options().major_dimension),
                values: Some(values),
            }],
        };
        self.service.update(&target.spreadsheet_id, request).await
    }

    pub async fn append(
        &mut self,
        values: Vec<Vec<String>>,
        value_input_option: ValueInputOption,
        insert_data_option: InsertDataOption,
    ) -> Result<AppendValuesResponse> {
        let target = self.take_target();
        self.append_to(&target, values, value_input_option, insert_data_option)
            .await
    }

    async fn append_to(
        &self,
        target: &Target,
        values: Vec<Vec<String>>,
        value_input_option: ValueInputOption,
        insert_data_option: InsertDataOption,
    ) -> Result<AppendValuesResponse> {
        debug!(spreadsheet_id = %target.spreadsheet_id, range = ?target.range, rows = values.len(), "appending values");
        self.service
            .append(
                &target.spreadsheet_id,
                target.range.as_deref(),
                ValueRange::new(target.range.clone(), values),
                value_input_option,
                insert_data_option,
            )
            .await
    }

    /// Append map-like rows ordered by the given header.
    pub async fn append_with_header<H, I, R>(
        &mut self,
        header: &[H],
        rows: I,
        value_input_option: ValueInputOption,
        insert_data_option: InsertDataOption,
    ) -> Result<AppendValuesResponse>
    where
        H: AsRef<str>,
        I: IntoIterator<Item = R>,
        R: RowLookup,
    {
        let values = from_appendable(header, rows);
        self.append(values, value_input_option, insert_data_option)
            .await
    }

    /// Append map-like rows ordered by the header row of the target range.
    ///
    /// Reads the header first, then appends. The target is reset once.
    ///
    /// The header is the first row of the selected range, so the range must
    /// span every header column. With `range("A1")` only one column is
    /// written per record. Select just the sheet to use its whole first row.
    pub async fn append_records<I, R>(
        &mut self,
        rows: I,
        value_input_option: ValueInputOption,
        insert_data_option: InsertDataOption,
    ) -> Result<AppendValuesResponse>
    where
        I: IntoIterator<Item = R>,
        R: RowLookup,
    {
        let target = self.take_target();
        let header = self
            .fetch_values(&target)
            .await?
            .into_iter()
            .next()
            .unwrap_or_default();
        debug!(columns = header.len(), "header read for append");
        let values = from_appendable(&header, rows);
        self.append_to(&target, values, value_input_option, insert_data_option)
            .await
    }

    pub async fn clear(&mut self) -> Result<Option<ClearValuesResponse>> {
        let target = self.take_target();
        debug!(spreadsheet_id = %target.spreadsheet_id, range = ?target.range, "clearing values");
        self.service
            .clear(&target.spreadsheet_id, target.range.as_deref())
            .await
    }

    pub async fn spreadsheet_properties(&self) -> Result<SpreadsheetProperties> {
        let spreadsheet = self
            .service
            .get(self.selection.spreadsheet_id().unwrap_or_default())
            .await?;
        Ok(spreadsheet.properties)
    }

    /// Properties of the selected sheet, `None` if it doesn't exist.
    pub async fn sheet_properties(&self) -> Result<Option<SheetProperties>> {
        let spreadsheet = self
            .service
            .get(self.selection.spreadsheet_id().unwrap_or_default())
            .await?;
        let sheet = self.selection.sheet();
        Ok(spreadsheet
            .sheets
            .into_iter()
            .map(|s| s.properties)
            .find(|p| Some(p.title.as_str()) == sheet))
    }

    pub async fn add_sheet(&self, title: &str) -> Result<BatchUpdateSpreadsheetResponse> {
        let request = BatchUpdateSpreadsheetRequest {
            requests: vec![SpreadsheetRequest::AddSheet {
                properties: NewSheetProperties {
                    title: title.to_string(),
                },
            }],
        };
        self.service
            .batch_update(self.selection.spreadsheet_id().unwrap_or_default(), request)
            .await
    }

    pub async fn delete_sheet(&self, title: &str) -> Result<BatchUpdateSpreadsheetResponse> {
        let sheet_id = self
            .sheet_list()
            .await?
            .into_iter()
            .find_map(|(id, name)| (name == title).then_some(id))
            .ok_or_else(|| SheetsError::NotFound(format!("sheet '{title}'")))?;

        let request = BatchUpdateSpreadsheetRequest {
            requests: vec![SpreadsheetRequest::DeleteSheet { sheet_id }],
        };
        self.service
            .batch_update(self.selection.spreadsheet_id().unwrap_or_default(), request)
            .await
    }
}
