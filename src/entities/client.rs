//! Client entity - individual and corporate customers.
//!
//! A client owns properties and files relocation requests. It may be linked to a
//! login account; deleting that account removes the client with it.

use super::Choice;
use sea_orm::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Whether the client is a private person or a company
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum ClientType {
    /// A private person
    #[default]
    #[sea_orm(string_value = "individual")]
    Individual,
    /// A company relocating staff or offices
    #[sea_orm(string_value = "corporate")]
    Corporate,
}

impl Choice for ClientType {
    fn label(&self) -> &'static str {
        match self {
            Self::Individual => "Individual",
            Self::Corporate => "Corporate",
        }
    }
}

/// Client database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "clients")]
pub struct Model {
    /// Surrogate key
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Optional login account, at most one client per account
    #[sea_orm(unique, nullable)]
    pub user_id: Option<i64>,
    /// Business identifier shown to staff (e.g. `CL-0001`)
    #[sea_orm(unique)]
    pub client_id: String,
    /// Individual or corporate
    pub client_type: ClientType,
    /// Contact's given name
    pub first_name: String,
    /// Contact's family name
    pub last_name: String,
    /// Company name for corporate clients
    pub company_name: Option<String>,
    /// Contact email
    pub email: String,
    /// Contact phone, blank when unknown
    pub phone: String,
    /// Street address
    #[sea_orm(column_type = "Text")]
    pub address: String,
    /// City
    pub city: String,
    /// State or region
    pub state: String,
    /// Postal code
    pub zip_code: String,
    /// Country
    pub country: String,
    /// When the client was registered
    pub date_created: DateTimeUtc,
    /// Last modification
    pub date_updated: DateTimeUtc,
    /// Inactive clients are hidden from day-to-day work
    pub is_active: bool,
}

/// Defines relationships between Client and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Optional login account
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
    /// Identity and contract documents
    #[sea_orm(has_many = "super::client_document::Entity")]
    Documents,
    /// Properties owned by the client
    #[sea_orm(has_many = "super::property::Entity")]
    OwnedProperties,
    /// Relocation requests filed by the client
    #[sea_orm(has_many = "super::relocation_request::Entity")]
    RelocationRequests,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::client_document::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Documents.def()
    }
}

impl Related<super::property::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OwnedProperties.def()
    }
}

impl Related<super::relocation_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RelocationRequests.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let now = chrono::Utc::now();
        if insert {
            self.date_created = Set(now);
        }
        self.date_updated = Set(now);
        Ok(self)
    }
}

impl Model {
    /// Contact person's first and last name.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Single-line postal address.
    #[must_use]
    pub fn full_address(&self) -> String {
        format!(
            "{}, {}, {} {}, {}",
            self.address, self.city, self.state, self.zip_code, self.country
        )
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.client_type, self.company_name.as_deref()) {
            (ClientType::Corporate, Some(company)) if !company.is_empty() => {
                write!(f, "{company} ({})", self.client_id)
            }
            _ => write!(f, "{} ({})", self.full_name(), self.client_id),
        }
    }
}
