//! Property entity - physical addresses moved from or to.
//!
//! Properties belong to a client and carry access details the crew needs on the day,
//! along with inline photos and a per-room inventory.

use super::Choice;
use sea_orm::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Kind of building
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    /// Apartment
    #[sea_orm(string_value = "apartment")]
    Apartment,
    /// Detached house
    #[sea_orm(string_value = "house")]
    House,
    /// Condominium
    #[sea_orm(string_value = "condo")]
    Condo,
    /// Townhouse
    #[sea_orm(string_value = "townhouse")]
    Townhouse,
    /// Office space
    #[sea_orm(string_value = "office")]
    Office,
    /// Warehouse
    #[sea_orm(string_value = "warehouse")]
    Warehouse,
    /// Anything else
    #[sea_orm(string_value = "other")]
    Other,
}

impl Choice for PropertyType {
    fn label(&self) -> &'static str {
        match self {
            Self::Apartment => "Apartment",
            Self::House => "House",
            Self::Condo => "Condominium",
            Self::Townhouse => "Townhouse",
            Self::Office => "Office",
            Self::Warehouse => "Warehouse",
            Self::Other => "Other",
        }
    }
}

/// Property database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "properties")]
pub struct Model {
    /// Surrogate key
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Business identifier (e.g. `PR-0001`)
    #[sea_orm(unique)]
    pub property_id: String,
    /// Owning client
    pub owner_id: i64,
    /// Kind of building
    pub property_type: PropertyType,
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
    /// Number of bedrooms
    pub bedrooms: Option<i32>,
    /// Number of bathrooms, halves allowed
    pub bathrooms: Option<f64>,
    /// Floor area
    pub square_feet: Option<i32>,
    /// Floor the unit is on
    pub floor_number: Option<i32>,
    /// Building has a usable elevator
    pub has_elevator: bool,
    /// Truck parking available on site
    pub has_parking: bool,
    /// Storage room available
    pub has_storage: bool,
    /// Special instructions for accessing the property
    #[sea_orm(column_type = "Text")]
    pub access_instructions: String,
    /// Where the keys are kept
    pub key_location: String,
    /// On-site contact
    pub contact_person: String,
    /// On-site contact phone
    pub contact_phone: String,
    /// When the property was registered
    pub date_created: DateTimeUtc,
    /// Last modification
    pub date_updated: DateTimeUtc,
    /// Inactive properties are kept for history
    pub is_active: bool,
}

/// Defines relationships between Property and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Owning client
    #[sea_orm(
        belongs_to = "super::client::Entity",
        from = "Column::OwnerId",
        to = "super::client::Column::Id",
        on_delete = "Cascade"
    )]
    Owner,
    /// Photos
    #[sea_orm(has_many = "super::property_image::Entity")]
    Images,
    /// Room-by-room inventory
    #[sea_orm(has_many = "super::property_inventory::Entity")]
    Inventory,
}

impl Related<super::client::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::property_image::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Images.def()
    }
}

impl Related<super::property_inventory::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Inventory.def()
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
        write!(f, "{} - {}, {}", self.property_id, self.address, self.city)
    }
}
