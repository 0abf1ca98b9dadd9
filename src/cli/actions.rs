//! Actions beyond plain editing: uploads, expense approval and crew membership.

use super::{
    Desk,
    crud::{CrudAction, run_crud},
    output,
};
use crate::{
    admin::{
        ModelAdmin,
        clients::ClientDocumentAdmin,
        logistics::{CrewAdmin, ExpenseAdmin},
        properties::PropertyImageAdmin,
    },
    core::{client, crew, expense, property, validation::parse_choice},
    entities::client_document::DocumentType,
    errors::{Error, Result},
};
use clap::{Args, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};

/// File name and contents of a file to upload.
async fn read_upload(path: &Path) -> Result<(String, Vec<u8>)> {
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| Error::validation("file", "The submitted file has no name."))?
        .to_string();
    let bytes = tokio::fs::read(path).await?;
    Ok((name, bytes))
}

/// Client document actions
#[derive(Subcommand, Debug)]
pub enum DocumentAction {
    #[command(flatten)]
    Crud(CrudAction),
    /// Store a file and record it against a client
    Upload(DocumentUploadArgs),
}

/// Arguments of `client-document upload`
#[derive(Args, Debug)]
pub struct DocumentUploadArgs {
    /// Client primary key
    pub client_id: i64,
    /// File to store
    pub file: PathBuf,
    /// id, passport, lease, insurance or other
    #[arg(long = "type", default_value = "other")]
    pub document_type: String,
    /// Display name (defaults to the file name)
    #[arg(long)]
    pub name: Option<String>,
}

/// Dispatches a client document action.
pub async fn run_document(desk: &Desk, action: DocumentAction, w: &mut dyn Write) -> Result<()> {
    match action {
        DocumentAction::Crud(action) => run_crud::<ClientDocumentAdmin>(desk, action, w).await,
        DocumentAction::Upload(args) => {
            let document_type: DocumentType = parse_choice("document_type", &args.document_type)?;
            let (file_name, bytes) = read_upload(&args.file).await?;
            let name = args.name.unwrap_or_else(|| file_name.clone());
            let document = client::upload_document(
                &desk.db,
                &desk.media,
                args.client_id,
                document_type,
                &name,
                &file_name,
                &bytes,
            )
            .await?;
            output::saved(
                w,
                desk.json,
                "Uploaded",
                ClientDocumentAdmin::VERBOSE_NAME,
                document.id,
                &document,
            )
        }
    }
}

/// Property image actions
#[derive(Subcommand, Debug)]
pub enum ImageAction {
    #[command(flatten)]
    Crud(CrudAction),
    /// Store a photo of a property
    Upload(ImageUploadArgs),
}

/// Arguments of `property-image upload`
#[derive(Args, Debug)]
pub struct ImageUploadArgs {
    /// Property primary key
    pub property_id: i64,
    /// Image file
    pub file: PathBuf,
    /// Short description
    #[arg(long, default_value = "")]
    pub caption: String,
    /// Mark as the property's primary photo
    #[arg(long)]
    pub primary: bool,
}

/// Dispatches a property image action.
pub async fn run_image(desk: &Desk, action: ImageAction, w: &mut dyn Write) -> Result<()> {
    match action {
        ImageAction::Crud(action) => run_crud::<PropertyImageAdmin>(desk, action, w).await,
        ImageAction::Upload(args) => {
            let (file_name, bytes) = read_upload(&args.file).await?;
            let image = property::upload_image(
                &desk.db,
                &desk.media,
                args.property_id,
                &file_name,
                &args.caption,
                args.primary,
                &bytes,
            )
            .await?;
            output::saved(
                w,
                desk.json,
                "Uploaded",
                PropertyImageAdmin::VERBOSE_NAME,
                image.id,
                &image,
            )
        }
    }
}

/// Expense actions
#[derive(Subcommand, Debug)]
pub enum ExpenseAction {
    #[command(flatten)]
    Crud(CrudAction),
    /// Store a receipt image on an expense
    AttachReceipt {
        /// Expense primary key
        id: i64,
        /// Receipt file
        file: PathBuf,
    },
    /// Approve an expense on behalf of a staff account
    Approve {
        /// Expense primary key
        id: i64,
        /// Approving user's primary key
        #[arg(long = "by", value_name = "USER_ID")]
        approver_id: i64,
    },
}

/// Dispatches an expense action.
pub async fn run_expense(desk: &Desk, action: ExpenseAction, w: &mut dyn Write) -> Result<()> {
    let updated = match action {
        ExpenseAction::Crud(action) => return run_crud::<ExpenseAdmin>(desk, action, w).await,
        ExpenseAction::AttachReceipt { id, file } => {
            let (file_name, bytes) = read_upload(&file).await?;
            expense::attach_receipt(&desk.db, &desk.media, id, &file_name, &bytes).await?
        }
        ExpenseAction::Approve { id, approver_id } => {
            expense::approve_expense(&desk.db, id, approver_id).await?
        }
    };
    output::saved(
        w,
        desk.json,
        "Updated",
        ExpenseAdmin::VERBOSE_NAME,
        updated.id,
        &updated,
    )
}

/// Crew actions
#[derive(Subcommand, Debug)]
pub enum CrewAction {
    #[command(flatten)]
    Crud(CrudAction),
    /// Add a driver to a crew
    AddMember { crew_id: i64, driver_id: i64 },
    /// Remove a driver from a crew
    RemoveMember { crew_id: i64, driver_id: i64 },
    /// Assign a vehicle to a crew
    AddVehicle { crew_id: i64, vehicle_id: i64 },
    /// Take a vehicle off a crew
    RemoveVehicle { crew_id: i64, vehicle_id: i64 },
}

/// Dispatches a crew action.
pub async fn run_crew(desk: &Desk, action: CrewAction, w: &mut dyn Write) -> Result<()> {
    let message = match action {
        CrewAction::Crud(action) => return run_crud::<CrewAdmin>(desk, action, w).await,
        CrewAction::AddMember { crew_id, driver_id } => {
            crew::add_member(&desk.db, crew_id, driver_id).await?;
            format!("Added driver #{driver_id} to crew #{crew_id}")
        }
        CrewAction::RemoveMember { crew_id, driver_id } => {
            crew::remove_member(&desk.db, crew_id, driver_id).await?;
            format!("Removed driver #{driver_id} from crew #{crew_id}")
        }
        CrewAction::AddVehicle {
            crew_id,
            vehicle_id,
        } => {
            crew::add_vehicle(&desk.db, crew_id, vehicle_id).await?;
            format!("Added vehicle #{vehicle_id} to crew #{crew_id}")
        }
        CrewAction::RemoveVehicle {
            crew_id,
            vehicle_id,
        } => {
            crew::remove_vehicle(&desk.db, crew_id, vehicle_id).await?;
            format!("Removed vehicle #{vehicle_id} from crew #{crew_id}")
        }
    };
    output::done(w, desk.json, &message)
}
