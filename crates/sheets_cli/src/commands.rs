use std::io::{self, Write};

use serde_json::Value;
use sheets_connector::errors::{Result, SheetsError};
use sheets_connector::records::AppendableRow;
use sheets_connector::rest::cell_to_string;
use sheets_connector::{AccessToken, GoogleConfig, GoogleSheetsClient, ServiceAccount};
use tracing::info;

use crate::args::{AuthArgs, Command, TargetArgs};

pub async fn connect(auth: AuthArgs) -> Result<GoogleSheetsClient> {
    let config = GoogleConfig {
        client_id: auth.client_id,
        client_secret: auth.client_secret,
        timeout_secs: auth.timeout,
        ..Default::default()
    };

    if let Some(path) = auth.service_account {
        let mut account = ServiceAccount::from_file(&path)?;
        if let Some(subject) = auth.subject {
            account = account.with_subject(subject);
        }
        info!(path = %path.display(), "using service account");
        return GoogleSheetsClient::with_service_account(config, &account).await;
    }

    let access_token = auth.access_token.ok_or_else(|| {
        SheetsError::InvalidConfig(
            "missing credentials, provide an access token or a service account".to_string(),
        )
    })?;

    let mut token = AccessToken::new(access_token);
    if let Some(refresh_token) = auth.refresh_token {
        token = token.with_refresh_token(refresh_token);
    }
    if let Some(expires_in) = auth.expires_in {
        token.expires_in = Some(expires_in);
        token.created = Some(chrono::Utc::now().timestamp());
    }

    GoogleSheetsClient::with_access_token(config, token).await
}

/// Apply the target flags to the client selection.
pub async fn select(client: &mut GoogleSheetsClient, target: TargetArgs) -> Result<()> {
    if let Some(id) = target.spreadsheet {
        client.spreadsheet(id);
    }
    if let Some(title) = target.spreadsheet_title {
        client.spreadsheet_by_title(&title).await?;
        if client.spreadsheet_id().is_none() {
            return Err(SheetsError::NotFound(format!("spreadsheet '{title}'")));
        }
    }
    if let Some(sheet) = target.sheet {
        client.sheet(sheet);
    }
    if let Some(sheet_id) = target.sheet_id {
        client.sheet_by_id(sheet_id).await?;
        if client.selection().sheet().is_none() {
            return Err(SheetsError::NotFound(format!("sheet with id {sheet_id}")));
        }
    }
    if let Some(range) = target.range {
        client.range(range);
    }
    if let Some(dimension) = target.major_dimension {
        client.major_dimension(dimension);
    }
    if let Some(option) = target.value_render_option {
        client.value_render_option(option);
    }
    if let Some(option) = target.date_time_render_option {
        client.date_time_render_option(option);
    }
    Ok(())
}

pub async fn run(client: &mut GoogleSheetsClient, command: Command) -> Result<Value> {
    let output = match command {
        Command::Values => serde_json::to_value(client.values().await?)?,
        Command::All => serde_json::to_value(client.all().await?)?,
        Command::First => serde_json::to_value(client.first().await?)?,
        Command::Update { json, input } => {
            let rows = parse_rows(&json)?;
            serde_json::to_value(client.update(rows, input.into()).await?)?
        }
        Command::Append {
            json,
            input,
            insert,
        } => {
            let resp = match parse_append(&json)? {
                AppendInput::Rows(rows) => client.append(rows, input.into(), insert.into()).await?,
                AppendInput::Records(records) => {
                    client
                        .append_records(records, input.into(), insert.into())
                        .await?
                }
            };
            serde_json::to_value(resp)?
        }
        Command::Clear => serde_json::to_value(client.clear().await?)?,
        Command::Sheets => serde_json::to_value(client.sheet_list().await?)?,
        Command::Spreadsheets => serde_json::to_value(client.spreadsheet_list().await?)?,
        Command::Properties => serde_json::to_value(client.spreadsheet_properties().await?)?,
        Command::SheetProperties => serde_json::to_value(client.sheet_properties().await?)?,
        Command::AddSheet { title } => serde_json::to_value(client.add_sheet(&title).await?)?,
        Command::DeleteSheet { title } => {
            serde_json::to_value(client.delete_sheet(&title).await?)?
        }
    };
    Ok(output)
}

pub fn print_json(value: &Value) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}

#[derive(Debug, PartialEq)]
enum AppendInput {
    Rows(Vec<Vec<String>>),
    Records(Vec<AppendableRow>),
}

/// Parse a json array of rows. Non-string cells are stringified.
fn parse_rows(input: &str) -> Result<Vec<Vec<String>>> {
    let rows: Vec<Vec<Value>> = serde_json::from_str(input)?;
    Ok(rows
        .into_iter()
        .map(|row| row.into_iter().map(cell_to_string).collect())
        .collect())
}

/// Parse either a json array of rows or a json array of objects.
fn parse_append(input: &str) -> Result<AppendInput> {
    let items: Vec<Value> = serde_json::from_str(input)?;
    if !items.iter().all(Value::is_object) {
        return parse_rows(input).map(AppendInput::Rows);
    }

    let records = items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(fields) => Some(
                fields
                    .into_iter()
                    .map(|(field, value)| {
                        let value = match value {
                            Value::Null => None,
                            other => Some(cell_to_string(other)),
                        };
                        (field, value)
                    })
                    .collect(),
            ),
            _ => None,
        })
        .collect();

    Ok(AppendInput::Records(records))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_stringify_cells() {
        let rows = parse_rows(r#"[["1", 2, true], []]"#).unwrap();
        assert_eq!(
            vec![
                vec!["1".to_string(), "2".to_string(), "true".to_string()],
                Vec::new(),
            ],
            rows
        );
    }

    #[test]
    fn rows_reject_objects() {
        assert!(parse_rows(r#"[{"id": "1"}]"#).is_err());
    }

    #[test]
    fn append_objects_are_records() {
        let input = parse_append(r#"[{"name": "name1", "id": 1, "mail": null}]"#).unwrap();
        let AppendInput::Records(records) = input else {
            panic!("expected records, got {input:?}");
        };

        assert_eq!(1, records.len());
        assert_eq!(Some(&Some("name1".to_string())), records[0].get("name"));
        assert_eq!(Some(&Some("1".to_string())), records[0].get("id"));
        assert_eq!(Some(&None), records[0].get("mail"));
    }

    #[test]
    fn append_arrays_are_rows() {
        let input = parse_append(r#"[["3", "name3"]]"#).unwrap();
        assert_eq!(
            AppendInput::Rows(vec![vec!["3".to_string(), "name3".to_string()]]),
            input
        );
    }
}
