#![allow(clippy::result_large_err)]

use clap::Parser;
use dotenvy::dotenv;
use relocation_desk::{
    cli::{self, Cli, Desk},
    config::{self, database},
    errors::Result,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Load .env first so RUST_LOG and DATABASE_URL can come from it
    dotenv().ok();

    // 2. Initialize tracing on stderr; stdout carries command output
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Cli::parse();

    // 3. Load the application configuration
    let app_config = config::load_app_configuration(args.config.as_deref())?;

    // 4. Open the database; missing tables are created on connect
    let db = database::create_connection(&app_config.database_url)
        .await
        .inspect(|_| info!("Database ready"))
        .inspect_err(|e| error!("Failed to open database: {}", e))?;

    // 5. Run the command
    let desk = Desk::new(db, &app_config, args.json);
    let mut stdout = std::io::stdout().lock();
    cli::run(&desk, args.command, &mut stdout)
        .await
        .inspect_err(|e| error!("{}", e))
}
