//! Client business logic - customers and their documents.
//!
//! Provides functions for registering, retrieving, updating and deleting clients, and
//! for filing documents against them. All functions are async and return Result types.

use crate::{
    core::{
        account,
        validation::{
            ensure_unique, max_length, required, validate_email, validate_optional_phone,
        },
    },
    entities::{
        Client, ClientDocument,
        client::{self, ClientType},
        client_document::{self, DocumentType},
    },
    errors::{Error, Result},
    media::{MediaStore, UploadDir},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Deserialize;
use tracing::{info, instrument};

/// Country used when a form leaves it out
pub const DEFAULT_COUNTRY: &str = "United States";

pub(crate) fn default_country() -> String {
    DEFAULT_COUNTRY.to_string()
}

/// Editable fields of a client
#[derive(Debug, Clone, Deserialize)]
pub struct ClientForm {
    /// Linked login account
    #[serde(default)]
    pub user_id: Option<i64>,
    /// Business identifier, unique
    pub client_id: String,
    /// Individual or corporate
    #[serde(default)]
    pub client_type: ClientType,
    /// Contact's given name
    pub first_name: String,
    /// Contact's family name
    pub last_name: String,
    /// Company name for corporate clients
    #[serde(default)]
    pub company_name: Option<String>,
    /// Contact email
    pub email: String,
    /// Contact phone, may be blank
    #[serde(default)]
    pub phone: String,
    /// Street address
    pub address: String,
    /// City
    pub city: String,
    /// State or region
    pub state: String,
    /// Postal code
    pub zip_code: String,
    /// Country
    #[serde(default = "default_country")]
    pub country: String,
    /// Active client
    #[serde(default = "account::default_true")]
    pub is_active: bool,
}

impl ClientForm {
    fn clean(mut self) -> Result<Self> {
        self.client_id = required("client_id", &self.client_id, 20)?;
        self.first_name = required("first_name", &self.first_name, 100)?;
        self.last_name = required("last_name", &self.last_name, 100)?;
        self.company_name = self
            .company_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());
        if let Some(company) = &self.company_name {
            max_length("company_name", company, 200)?;
        }
        validate_email("email", &self.email)?;
        max_length("phone", &self.phone, 17)?;
        validate_optional_phone("phone", &self.phone)?;
        self.address = required("address", &self.address, usize::MAX)?;
        self.city = required("city", &self.city, 100)?;
        self.state = required("state", &self.state, 100)?;
        self.zip_code = required("zip_code", &self.zip_code, 10)?;
        self.country = required("country", &self.country, 100)?;
        Ok(self)
    }

    fn apply(self, model: &mut client::ActiveModel) {
        model.user_id = Set(self.user_id);
        model.client_id = Set(self.client_id);
        model.client_type = Set(self.client_type);
        model.first_name = Set(self.first_name);
        model.last_name = Set(self.last_name);
        model.company_name = Set(self.company_name);
        model.email = Set(self.email);
        model.phone = Set(self.phone);
        model.address = Set(self.address);
        model.city = Set(self.city);
        model.state = Set(self.state);
        model.zip_code = Set(self.zip_code);
        model.country = Set(self.country);
        model.is_active = Set(self.is_active);
    }
}

async fn check_client_constraints(
    db: &DatabaseConnection,
    form: &ClientForm,
    exclude: Option<i64>,
) -> Result<()> {
    let mut by_code = Client::find().filter(client::Column::ClientId.eq(&form.client_id));
    if let Some(id) = exclude {
        by_code = by_code.filter(client::Column::Id.ne(id));
    }
    ensure_unique(db, by_code, "Client", "client_id", &form.client_id).await?;

    if let Some(user_id) = form.user_id {
        account::require_user(db, user_id).await?;
        let mut by_user = Client::find().filter(client::Column::UserId.eq(user_id));
        if let Some(id) = exclude {
            by_user = by_user.filter(client::Column::Id.ne(id));
        }
        ensure_unique(db, by_user, "Client", "user", &user_id.to_string()).await?;
    }
    Ok(())
}

/// Finds a client by primary key.
pub async fn get_client_by_id(db: &DatabaseConnection, id: i64) -> Result<Option<client::Model>> {
    Client::find_by_id(id).one(db).await.map_err(Into::into)
}

/// Finds a client by primary key, failing if it does not exist.
pub async fn require_client(db: &DatabaseConnection, id: i64) -> Result<client::Model> {
    get_client_by_id(db, id)
        .await?
        .ok_or_else(|| Error::not_found("Client", id))
}

/// Finds a client by business identifier.
pub async fn get_client_by_code(
    db: &DatabaseConnection,
    client_id: &str,
) -> Result<Option<client::Model>> {
    Client::find()
        .filter(client::Column::ClientId.eq(client_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Registers a new client.
#[instrument(skip(db, form), fields(client_id = %form.client_id))]
pub async fn create_client(db: &DatabaseConnection, form: ClientForm) -> Result<client::Model> {
    let form = form.clean()?;
    check_client_constraints(db, &form, None).await?;

    let mut model = client::ActiveModel {
        ..Default::default()
    };
    form.apply(&mut model);
    let client = model.insert(db).await?;
    info!("Registered client {}", client);
    Ok(client)
}

/// Replaces every editable field of a client.
#[instrument(skip(db, form))]
pub async fn update_client(
    db: &DatabaseConnection,
    id: i64,
    form: ClientForm,
) -> Result<client::Model> {
    let form = form.clean()?;
    let existing = require_client(db, id).await?;
    check_client_constraints(db, &form, Some(id)).await?;

    let mut model: client::ActiveModel = existing.into();
    form.apply(&mut model);
    model.update(db).await.map_err(Into::into)
}

/// Deletes a client together with its documents, properties and requests.
#[instrument(skip(db))]
pub async fn delete_client(db: &DatabaseConnection, id: i64) -> Result<()> {
    let result = Client::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("Client", id));
    }
    info!("Deleted client {}", id);
    Ok(())
}

/// Editable fields of a client document
#[derive(Debug, Clone, Deserialize)]
pub struct ClientDocumentForm {
    /// Owning client
    pub client_id: i64,
    /// Kind of document
    pub document_type: DocumentType,
    /// Human-readable name
    pub document_name: String,
    /// Stored file, relative to the media root
    pub document_file: String,
}

impl ClientDocumentForm {
    fn clean(mut self) -> Result<Self> {
        self.document_name = required("document_name", &self.document_name, 200)?;
        self.document_file = required("document_file", &self.document_file, 100)?;
        Ok(self)
    }

    fn apply(self, model: &mut client_document::ActiveModel) {
        model.client_id = Set(self.client_id);
        model.document_type = Set(self.document_type);
        model.document_name = Set(self.document_name);
        model.document_file = Set(self.document_file);
    }
}

/// Finds a document by primary key, failing if it does not exist.
pub async fn require_document(
    db: &DatabaseConnection,
    id: i64,
) -> Result<client_document::Model> {
    ClientDocument::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Client document", id))
}

/// Documents filed for a client, newest first.
pub async fn get_documents_for_client(
    db: &DatabaseConnection,
    client_id: i64,
) -> Result<Vec<client_document::Model>> {
    ClientDocument::find()
        .filter(client_document::Column::ClientId.eq(client_id))
        .order_by_desc(client_document::Column::UploadedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Files a document whose content is already in media storage.
#[instrument(skip(db, form), fields(client = form.client_id))]
pub async fn create_document(
    db: &DatabaseConnection,
    form: ClientDocumentForm,
) -> Result<client_document::Model> {
    let form = form.clean()?;
    require_client(db, form.client_id).await?;

    let mut model = client_document::ActiveModel {
        ..Default::default()
    };
    form.apply(&mut model);
    let document = model.insert(db).await?;
    info!("Filed document {} for client {}", document.id, document.client_id);
    Ok(document)
}

/// Replaces every editable field of a document.
pub async fn update_document(
    db: &DatabaseConnection,
    id: i64,
    form: ClientDocumentForm,
) -> Result<client_document::Model> {
    let form = form.clean()?;
    let existing = require_document(db, id).await?;
    require_client(db, form.client_id).await?;

    let mut model: client_document::ActiveModel = existing.into();
    form.apply(&mut model);
    model.update(db).await.map_err(Into::into)
}

/// Stores `bytes` under `client_documents/` and files the document.
#[instrument(skip(db, store, bytes))]
pub async fn upload_document(
    db: &DatabaseConnection,
    store: &MediaStore,
    client_id: i64,
    document_type: DocumentType,
    document_name: &str,
    file_name: &str,
    bytes: &[u8],
) -> Result<client_document::Model> {
    require_client(db, client_id).await?;
    let document_file = store.save(UploadDir::ClientDocuments, file_name, bytes).await?;
    let created = create_document(
        db,
        ClientDocumentForm {
            client_id,
            document_type,
            document_name: document_name.to_string(),
            document_file: document_file.clone(),
        },
    )
    .await;
    if created.is_err() {
        store.discard(&document_file).await;
    }
    created
}

/// Removes a document record. The stored file is left in place.
pub async fn delete_document(db: &DatabaseConnection, id: i64) -> Result<()> {
    let result = ClientDocument::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("Client document", id));
    }
    Ok(())
}

/// `"{client full name} - {document name}"`
pub async fn document_display(
    db: &DatabaseConnection,
    document: &client_document::Model,
) -> Result<String> {
    let client = require_client(db, document.client_id).await?;
    Ok(format!("{} - {}", client.full_name(), document.document_name))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_client_integration() -> Result<()> {
        let db = setup_test_db().await?;

        let client = create_test_client(&db, "CL-0001").await?;
        assert_eq!(client.client_id, "CL-0001");
        assert_eq!(client.client_type, ClientType::Individual);
        assert_eq!(client.country, DEFAULT_COUNTRY);
        assert!(client.is_active);
        assert_eq!(client.to_string(), "Jane Doe (CL-0001)");
        assert_eq!(
            client.full_address(),
            "12 Elm Street, Springfield, IL 62701, United States"
        );
        assert_eq!(
            get_client_by_code(&db, "CL-0001").await?.map(|c| c.id),
            Some(client.id)
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_corporate_display_uses_company_name() -> Result<()> {
        let db = setup_test_db().await?;
        let mut form = client_form("CL-0002");
        form.client_type = ClientType::Corporate;
        form.company_name = Some("Acme Corp".to_string());

        let client = create_client(&db, form).await?;
        assert_eq!(client.to_string(), "Acme Corp (CL-0002)");

        // Corporate without a company name falls back to the contact
        let mut form = client_form("CL-0003");
        form.client_type = ClientType::Corporate;
        form.company_name = Some("   ".to_string());
        let client = create_client(&db, form).await?;
        assert!(client.company_name.is_none());
        assert_eq!(client.to_string(), "Jane Doe (CL-0003)");
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_client_id_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_client(&db, "CL-0001").await?;

        let result = create_test_client(&db, "CL-0001").await;
        assert!(matches!(
            result,
            Err(Error::Duplicate {
                field: "client_id",
                ..
            })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_unique_index_backs_form_check() -> Result<()> {
        let db = setup_test_db().await?;
        let existing = create_test_client(&db, "CL-0001").await?;

        // Bypass the form and insert the same business id directly
        let mut copy: client::ActiveModel = existing.into();
        copy.id = sea_orm::ActiveValue::NotSet;
        let result = copy.insert(&db).await;
        assert!(result.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_phone_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        let mut form = client_form("CL-0001");
        form.phone = "555-0100".to_string();

        let result = create_client(&db, form).await;
        assert!(matches!(
            result,
            Err(Error::Validation { field: "phone", .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_user_linked_to_one_client_only() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, "jane").await?;

        let mut form = client_form("CL-0001");
        form.user_id = Some(user.id);
        create_client(&db, form).await?;

        let mut form = client_form("CL-0002");
        form.user_id = Some(user.id);
        let result = create_client(&db, form).await;
        assert!(matches!(
            result,
            Err(Error::Duplicate { field: "user", .. })
        ));

        let mut form = client_form("CL-0003");
        form.user_id = Some(999);
        let result = create_client(&db, form).await;
        assert!(matches!(result, Err(Error::NotFound { entity: "User", .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_client_refreshes_timestamp() -> Result<()> {
        let db = setup_test_db().await?;
        let client = create_test_client(&db, "CL-0001").await?;

        let mut form = client_form("CL-0001");
        form.city = "Shelbyville".to_string();
        let updated = update_client(&db, client.id, form).await?;

        assert_eq!(updated.city, "Shelbyville");
        assert_eq!(updated.date_created, client.date_created);
        assert!(updated.date_updated >= client.date_updated);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_user_cascades_to_client() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, "jane").await?;
        let mut form = client_form("CL-0001");
        form.user_id = Some(user.id);
        let client = create_client(&db, form).await?;

        account::delete_user(&db, user.id).await?;
        assert!(get_client_by_id(&db, client.id).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_upload_document() -> Result<()> {
        let db = setup_test_db().await?;
        let media = tempfile::tempdir()?;
        let store = MediaStore::new(media.path());
        let client = create_test_client(&db, "CL-0001").await?;

        let document = upload_document(
            &db,
            &store,
            client.id,
            DocumentType::Passport,
            "Passport scan",
            "passport.pdf",
            b"%PDF-1.4",
        )
        .await?;

        assert_eq!(document.document_file, "client_documents/passport.pdf");
        assert!(media.path().join("client_documents/passport.pdf").exists());
        assert_eq!(
            document_display(&db, &document).await?,
            "Jane Doe - Passport scan"
        );

        let documents = get_documents_for_client(&db, client.id).await?;
        assert_eq!(documents.len(), 1);

        delete_client(&db, client.id).await?;
        assert!(get_documents_for_client(&db, client.id).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_upload_for_missing_client_stores_nothing() -> Result<()> {
        let db = setup_test_db().await?;
        let media = tempfile::tempdir()?;
        let store = MediaStore::new(media.path());

        let result = upload_document(
            &db,
            &store,
            7,
            DocumentType::Lease,
            "Lease",
            "lease.pdf",
            b"lease",
        )
        .await;
        assert!(matches!(result, Err(Error::NotFound { .. })));
        assert!(!media.path().join("client_documents/lease.pdf").exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_rejected_document_leaves_no_file() -> Result<()> {
        let db = setup_test_db().await?;
        let media = tempfile::tempdir()?;
        let store = MediaStore::new(media.path());
        let client = create_test_client(&db, "CL-0001").await?;

        let result = upload_document(
            &db,
            &store,
            client.id,
            DocumentType::Lease,
            &"L".repeat(201),
            "lease.pdf",
            b"lease",
        )
        .await;
        assert!(matches!(
            result,
            Err(Error::Validation {
                field: "document_name",
                ..
            })
        ));
        assert!(!media.path().join("client_documents/lease.pdf").exists());
        assert!(get_documents_for_client(&db, client.id).await?.is_empty());
        Ok(())
    }
}
