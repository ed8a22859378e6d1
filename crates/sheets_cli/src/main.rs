mod args;
mod commands;

use std::io;

use clap::Parser;
use logutil::LogFormat;
use sheets_connector::errors::Result;

use crate::args::Arguments;

fn main() {
    let args = Arguments::parse();

    let format = if args.log_json {
        LogFormat::Json
    } else {
        LogFormat::HumanReadable
    };
    logutil::configure_global_logger(args.log_level, format, io::stderr);

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("ERROR: failed to build runtime: {err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = runtime.block_on(inner(args)) {
        eprintln!("ERROR: {err}");
        std::process::exit(1);
    }
}

async fn inner(args: Arguments) -> Result<()> {
    let mut client = commands::connect(args.auth).await?;
    commands::select(&mut client, args.target).await?;
    let output = commands::run(&mut client, args.command).await?;
    commands::print_json(&output)
}
