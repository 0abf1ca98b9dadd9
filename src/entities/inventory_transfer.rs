//! Inventory transfer entity - one item tracked from packing to delivery.

use super::Choice;
use sea_orm::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Where the item is in the move
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum TransferStatus {
    /// Not yet handled
    #[default]
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Packed
    #[sea_orm(string_value = "packed")]
    Packed,
    /// On the truck
    #[sea_orm(string_value = "loaded")]
    Loaded,
    /// On the road
    #[sea_orm(string_value = "in_transit")]
    InTransit,
    /// At the destination
    #[sea_orm(string_value = "delivered")]
    Delivered,
    /// Damaged on the way
    #[sea_orm(string_value = "damaged")]
    Damaged,
    /// Missing
    #[sea_orm(string_value = "lost")]
    Lost,
}

impl Choice for TransferStatus {
    fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Packed => "Packed",
            Self::Loaded => "Loaded",
            Self::InTransit => "In Transit",
            Self::Delivered => "Delivered",
            Self::Damaged => "Damaged",
            Self::Lost => "Lost",
        }
    }
}

/// Inventory transfer database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inventory_transfers")]
pub struct Model {
    /// Surrogate key
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Assignment moving the item
    pub assignment_id: i64,
    /// Item name
    pub item_name: String,
    /// Free-form description
    #[sea_orm(column_type = "Text")]
    pub description: String,
    /// Room it leaves
    pub room_from: String,
    /// Room it goes to
    pub room_to: String,
    /// Estimated weight
    pub estimated_weight_kg: Option<f64>,
    /// L x W x H in cm
    pub dimensions: String,
    /// Needs fragile handling
    pub is_fragile: bool,
    /// Must be taken apart
    pub requires_disassembly: bool,
    /// Tracking status
    pub status: TransferStatus,
    /// When it was packed
    pub packed_datetime: Option<DateTimeUtc>,
    /// When it was loaded
    pub loaded_datetime: Option<DateTimeUtc>,
    /// When it was delivered
    pub delivered_datetime: Option<DateTimeUtc>,
    /// Condition observed on handling
    #[sea_orm(column_type = "Text")]
    pub condition_notes: String,
    /// Damage was reported
    pub damage_reported: bool,
    /// What the damage is
    #[sea_orm(column_type = "Text")]
    pub damage_description: String,
    /// Driver who handled the item
    pub handled_by_id: Option<i64>,
    /// When the item was added
    pub date_created: DateTimeUtc,
}

/// Defines relationships between `InventoryTransfer` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Assignment moving the item
    #[sea_orm(
        belongs_to = "super::moving_assignment::Entity",
        from = "Column::AssignmentId",
        to = "super::moving_assignment::Column::Id",
        on_delete = "Cascade"
    )]
    Assignment,
    /// Handling driver
    #[sea_orm(
        belongs_to = "super::driver::Entity",
        from = "Column::HandledById",
        to = "super::driver::Column::Id",
        on_delete = "SetNull"
    )]
    HandledBy,
}

impl Related<super::moving_assignment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assignment.def()
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
