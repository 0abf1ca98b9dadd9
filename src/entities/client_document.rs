//! Client document entity - identity papers, leases and insurance files.

use super::Choice;
use sea_orm::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Kind of document on file
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    /// National identity card or similar
    #[sea_orm(string_value = "id")]
    Id,
    /// Passport
    #[sea_orm(string_value = "passport")]
    Passport,
    /// Lease agreement
    #[sea_orm(string_value = "lease")]
    Lease,
    /// Insurance policy
    #[sea_orm(string_value = "insurance")]
    Insurance,
    /// Anything else
    #[sea_orm(string_value = "other")]
    Other,
}

impl Choice for DocumentType {
    fn label(&self) -> &'static str {
        match self {
            Self::Id => "ID Document",
            Self::Passport => "Passport",
            Self::Lease => "Lease Agreement",
            Self::Insurance => "Insurance Document",
            Self::Other => "Other",
        }
    }
}

/// Client document database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "client_documents")]
pub struct Model {
    /// Surrogate key
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning client
    pub client_id: i64,
    /// Kind of document
    pub document_type: DocumentType,
    /// Human-readable name
    pub document_name: String,
    /// Path relative to the media root, under `client_documents/`
    pub document_file: String,
    /// When the file was uploaded
    pub uploaded_at: DateTimeUtc,
}

/// Each document belongs to one client
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Owning client
    #[sea_orm(
        belongs_to = "super::client::Entity",
        from = "Column::ClientId",
        to = "super::client::Column::Id",
        on_delete = "Cascade"
    )]
    Client,
}

impl Related<super::client::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Client.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if insert {
            self.uploaded_at = Set(chrono::Utc::now());
        }
        Ok(self)
    }
}
