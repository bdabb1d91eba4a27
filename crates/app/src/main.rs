use std::{process::ExitCode, sync::Arc};

use clap::Parser;
use engine::{Auth, FileStore, RecordStore};

use crate::{cli::Cli, commands::Context, error::Result, settings::Settings};

mod cli;
mod commands;
mod error;
mod form;
mod settings;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let settings = Settings::load(&cli)?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "tally={level},engine={level}",
            level = settings.level
        ))
        .with_writer(std::io::stderr)
        .init();

    let timezone = settings.timezone()?;
    tracing::debug!("using data directory {} in {timezone}", settings.data_dir);

    let kv = Arc::new(FileStore::new(&settings.data_dir));
    let auth = Auth::new(Arc::clone(&kv), settings.bcrypt_cost);
    auth.restore().await?;

    let ctx = Context {
        auth,
        records: RecordStore::new(kv),
        timezone,
    };
    commands::dispatch(&ctx, cli.command).await
}
