use carestaff::{
    cli::{self, Cli},
    config::{database, settings},
    errors::Result,
};
use clap::Parser;
use dotenvy::dotenv;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // 2. Load .env file; variables may also be set externally
    dotenv().ok();

    let args = Cli::parse();

    match run(args).await {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Cli) -> Result<String> {
    // 3. Load config.toml (defaults when absent)
    let config = settings::load_default_config()?;
    info!(
        primary_service = %config.compliance.primary_service_type,
        locations = config.locations.len(),
        staff = config.staff.len(),
        "Configuration loaded"
    );

    // 4. Connect and make sure the schema exists
    let db = database::create_connection().await?;
    database::create_tables(&db).await?;

    // 5. Dispatch
    cli::run(args.command, &db, &config).await
}
