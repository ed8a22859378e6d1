use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use sheets_connector::MajorDimension;
use sheets_connector::rest::{InsertDataOption, SheetId, ValueInputOption};

#[derive(Parser, Debug)]
#[clap(name = "sheets", version, about = "Read and write Google Sheets values")]
pub struct Arguments {
    #[clap(flatten)]
    pub auth: AuthArgs,

    #[clap(flatten)]
    pub target: TargetArgs,

    /// Default log level, overridden by RUST_LOG.
    #[clap(long, default_value = "error")]
    pub log_level: tracing::Level,

    /// Emit logs as json.
    #[clap(long)]
    pub log_json: bool,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug)]
pub struct AuthArgs {
    /// OAuth access token.
    #[clap(long, env = "GOOGLE_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// Refresh token used when the access token is expired.
    #[clap(long, env = "GOOGLE_REFRESH_TOKEN", hide_env_values = true)]
    pub refresh_token: Option<String>,

    /// Seconds the access token is valid for. Without it the token is
    /// refreshed right away when a refresh token is given.
    #[clap(long)]
    pub expires_in: Option<i64>,

    #[clap(long, env = "GOOGLE_CLIENT_ID")]
    pub client_id: Option<String>,

    #[clap(long, env = "GOOGLE_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    /// Path to a service account json key. Takes precedence over tokens.
    #[clap(long, env = "GOOGLE_SERVICE_ACCOUNT_JSON_LOCATION")]
    pub service_account: Option<PathBuf>,

    /// User to impersonate with the service account.
    #[clap(long, requires = "service_account")]
    pub subject: Option<String>,

    /// Request timeout in seconds.
    #[clap(long)]
    pub timeout: Option<u64>,
}

#[derive(Args, Debug)]
pub struct TargetArgs {
    /// Spreadsheet id.
    #[clap(long, short = 's', env = "GOOGLE_SPREADSHEET_ID")]
    pub spreadsheet: Option<String>,

    /// Spreadsheet title, looked up through Drive. Applied after
    /// `--spreadsheet`.
    #[clap(long)]
    pub spreadsheet_title: Option<String>,

    /// Sheet title.
    #[clap(long)]
    pub sheet: Option<String>,

    /// Numeric sheet id.
    #[clap(long, conflicts_with = "sheet")]
    pub sheet_id: Option<SheetId>,

    /// Cell range, e.g. `A1:C10` or `Sheet1!A1`.
    #[clap(long, short = 'r')]
    pub range: Option<String>,

    #[clap(long)]
    pub major_dimension: Option<MajorDimension>,

    #[clap(long)]
    pub value_render_option: Option<String>,

    #[clap(long)]
    pub date_time_render_option: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print raw values of the range.
    Values,
    /// Print all records, using the first row as the header.
    All,
    /// Print the first record.
    First,
    /// Overwrite the range with a json array of rows.
    Update {
        json: String,
        #[clap(long, value_enum, default_value_t = InputOption::Raw)]
        input: InputOption,
    },
    /// Append a json array of rows, or of objects keyed by header.
    Append {
        json: String,
        #[clap(long, value_enum, default_value_t = InputOption::Raw)]
        input: InputOption,
        #[clap(long, value_enum, default_value_t = InsertOption::Overwrite)]
        insert: InsertOption,
    },
    /// Clear the range.
    Clear,
    /// List sheets of the spreadsheet.
    Sheets,
    /// List spreadsheets visible to the credentials.
    Spreadsheets,
    /// Print spreadsheet properties.
    Properties,
    /// Print properties of the selected sheet.
    SheetProperties,
    AddSheet {
        title: String,
    },
    DeleteSheet {
        title: String,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum InputOption {
    Raw,
    UserEntered,
}

impl From<InputOption> for ValueInputOption {
    fn from(value: InputOption) -> Self {
        match value {
            InputOption::Raw => ValueInputOption::Raw,
            InputOption::UserEntered => ValueInputOption::UserEntered,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum InsertOption {
    Overwrite,
    InsertRows,
}

impl From<InsertOption> for InsertDataOption {
    fn from(value: InsertOption) -> Self {
        match value {
            InsertOption::Overwrite => InsertDataOption::Overwrite,
            InsertOption::InsertRows => InsertDataOption::InsertRows,
        }
    }
}
