//! Command-line front end over the admin registries.
//!
//! `relocation-desk [--json] [--config PATH] <record type> <action>`. Every record type
//! supports `list`, `show`, `add`, `edit` and `delete`; a few add their own actions
//! (uploads, expense approval, crew membership).

/// Uploads, approval and crew membership
pub mod actions;
/// Generic record actions
pub mod crud;
/// Table, fieldset and JSON rendering
pub mod output;

use crate::{
    admin::{
        accounts::UserAdmin,
        clients::ClientAdmin,
        logistics::{AssignmentAdmin, DriverAdmin, TransferAdmin, VehicleAdmin},
        properties::{PropertyAdmin, PropertyInventoryAdmin},
        relocations::{QuoteAdmin, RequestAdmin, TimelineAdmin},
    },
    config::AppConfig,
    errors::Result,
    media::MediaStore,
};
use actions::{CrewAction, DocumentAction, ExpenseAction, ImageAction};
use clap::{Parser, Subcommand};
use crud::{CrudAction, run_crud};
use sea_orm::DatabaseConnection;
use std::io::Write;
use std::path::PathBuf;
use tracing::debug;

/// Back office for a moving company
#[derive(Parser, Debug)]
#[command(name = "relocation-desk", version, propagate_version = true)]
pub struct Cli {
    /// Emit JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to relocation-desk.toml when present)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Record type to act on
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Staff and user accounts
    #[command(subcommand)]
    User(CrudAction),
    /// Customers
    #[command(subcommand)]
    Client(CrudAction),
    /// Documents on file for a client
    #[command(subcommand)]
    ClientDocument(DocumentAction),
    /// Client properties
    #[command(subcommand)]
    Property(CrudAction),
    /// Property photos
    #[command(subcommand)]
    PropertyImage(ImageAction),
    /// Per-room inventory of a property
    #[command(subcommand)]
    PropertyInventory(CrudAction),
    /// Relocation requests
    #[command(subcommand)]
    Request(CrudAction),
    /// Quotes for requests
    #[command(subcommand)]
    Quote(CrudAction),
    /// Request milestones
    #[command(subcommand)]
    Timeline(CrudAction),
    /// Fleet vehicles
    #[command(subcommand)]
    Vehicle(CrudAction),
    /// Drivers and movers
    #[command(subcommand)]
    Driver(CrudAction),
    /// Moving crews
    #[command(subcommand)]
    Crew(CrewAction),
    /// Crews assigned to requests
    #[command(subcommand)]
    Assignment(CrudAction),
    /// Items moved during an assignment
    #[command(subcommand)]
    Transfer(CrudAction),
    /// Costs incurred during an assignment
    #[command(subcommand)]
    Expense(ExpenseAction),
}

/// What every command runs against
pub struct Desk {
    /// Open database
    pub db: DatabaseConnection,
    /// Upload storage
    pub media: MediaStore,
    /// Rows per list when `--limit` is absent
    pub list_limit: u64,
    /// JSON output
    pub json: bool,
}

impl Desk {
    /// Binds a connection to the loaded configuration.
    pub fn new(db: DatabaseConnection, config: &AppConfig, json: bool) -> Self {
        Self {
            db,
            media: MediaStore::new(config.media_root.clone()),
            list_limit: config.list_limit,
            json,
        }
    }
}

/// Runs one command, writing its output to `w`.
pub async fn run(desk: &Desk, command: Command, w: &mut dyn Write) -> Result<()> {
    debug!("Running {:?}", command);
    match command {
        Command::User(action) => run_crud::<UserAdmin>(desk, action, w).await,
        Command::Client(action) => run_crud::<ClientAdmin>(desk, action, w).await,
        Command::ClientDocument(action) => actions::run_document(desk, action, w).await,
        Command::Property(action) => run_crud::<PropertyAdmin>(desk, action, w).await,
        Command::PropertyImage(action) => actions::run_image(desk, action, w).await,
        Command::PropertyInventory(action) => {
            run_crud::<PropertyInventoryAdmin>(desk, action, w).await
        }
        Command::Request(action) => run_crud::<RequestAdmin>(desk, action, w).await,
        Command::Quote(action) => run_crud::<QuoteAdmin>(desk, action, w).await,
        Command::Timeline(action) => run_crud::<TimelineAdmin>(desk, action, w).await,
        Command::Vehicle(action) => run_crud::<VehicleAdmin>(desk, action, w).await,
        Command::Driver(action) => run_crud::<DriverAdmin>(desk, action, w).await,
        Command::Crew(action) => actions::run_crew(desk, action, w).await,
        Command::Assignment(action) => run_crud::<AssignmentAdmin>(desk, action, w).await,
        Command::Transfer(action) => run_crud::<TransferAdmin>(desk, action, w).await,
        Command::Expense(action) => actions::run_expense(desk, action, w).await,
    }
}
