//! Property inventory entity - items recorded room by room before a move.

use super::Choice;
use sea_orm::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Condition of an inventoried item
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum ItemCondition {
    /// Like new
    #[sea_orm(string_value = "excellent")]
    Excellent,
    /// Normal wear
    #[default]
    #[sea_orm(string_value = "good")]
    Good,
    /// Visible wear
    #[sea_orm(string_value = "fair")]
    Fair,
    /// Heavy wear
    #[sea_orm(string_value = "poor")]
    Poor,
    /// Already damaged before the move
    #[sea_orm(string_value = "damaged")]
    Damaged,
}

impl Choice for ItemCondition {
    fn label(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::Poor => "Poor",
            Self::Damaged => "Damaged",
        }
    }
}

/// Property inventory database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "property_inventory")]
pub struct Model {
    /// Surrogate key
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Property the item is kept at
    pub property_id: i64,
    /// Room name
    pub room: String,
    /// Item name
    pub item_name: String,
    /// Free-form description
    #[sea_orm(column_type = "Text")]
    pub description: String,
    /// Recorded condition
    pub condition: ItemCondition,
    /// Declared value in dollars
    pub estimated_value: Option<f64>,
    /// Needs fragile handling
    pub is_fragile: bool,
    /// Needs special handling beyond fragile
    pub requires_special_handling: bool,
    /// Handling instructions for the crew
    #[sea_orm(column_type = "Text")]
    pub special_instructions: String,
    /// When the item was recorded
    pub date_created: DateTimeUtc,
}

/// Each inventory item belongs to one property
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Property holding the item
    #[sea_orm(
        belongs_to = "super::property::Entity",
        from = "Column::PropertyId",
        to = "super::property::Column::Id",
        on_delete = "Cascade"
    )]
    Property,
}

impl Related<super::property::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Property.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if insert {
            self.date_created = Set(chrono::Utc::now());
        }
        Ok(self)
    }
}
