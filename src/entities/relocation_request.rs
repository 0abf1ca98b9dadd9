//! Relocation request entity - a client's move order.
//!
//! Links a client and an origin property to either a destination property or a
//! free-text destination address, with scheduling, requested services and costing.
//! Quotes and timeline milestones hang off the request.

use super::Choice;
use sea_orm::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Where the request stands. Any value may follow any other.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// Awaiting review
    #[default]
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Accepted by the office
    #[sea_orm(string_value = "approved")]
    Approved,
    /// Move under way
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    /// Move finished
    #[sea_orm(string_value = "completed")]
    Completed,
    /// Called off
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
    /// Paused
    #[sea_orm(string_value = "on_hold")]
    OnHold,
}

impl Choice for RequestStatus {
    fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
            Self::OnHold => "On Hold",
        }
    }
}

/// Scheduling priority
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Low
    #[sea_orm(string_value = "low")]
    Low,
    /// Medium
    #[default]
    #[sea_orm(string_value = "medium")]
    Medium,
    /// High
    #[sea_orm(string_value = "high")]
    High,
    /// Urgent
    #[sea_orm(string_value = "urgent")]
    Urgent,
}

impl Choice for Priority {
    fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Urgent => "Urgent",
        }
    }
}

/// Kind of move
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum RelocationType {
    /// Same metro area
    #[default]
    #[sea_orm(string_value = "local")]
    Local,
    /// Different region
    #[sea_orm(string_value = "long_distance")]
    LongDistance,
    /// Cross-border
    #[sea_orm(string_value = "international")]
    International,
    /// Company relocation
    #[sea_orm(string_value = "corporate")]
    Corporate,
}

impl Choice for RelocationType {
    fn label(&self) -> &'static str {
        match self {
            Self::Local => "Local Move",
            Self::LongDistance => "Long Distance Move",
            Self::International => "International Move",
            Self::Corporate => "Corporate Relocation",
        }
    }
}

/// Relocation request database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "relocation_requests")]
pub struct Model {
    /// Surrogate key
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Business identifier (e.g. `RR-2024-001`)
    #[sea_orm(unique)]
    pub request_id: String,
    /// Client who filed the request
    pub client_id: i64,
    /// Property moved out of
    pub origin_property_id: i64,
    /// Property moved into, when it is on record
    pub destination_property_id: Option<i64>,
    /// Destination street address when no property record exists
    #[sea_orm(column_type = "Text")]
    pub destination_address: String,
    /// Destination city
    pub destination_city: String,
    /// Destination state
    pub destination_state: String,
    /// Destination postal code
    pub destination_zip: String,
    /// Destination country
    pub destination_country: String,
    /// Kind of move
    pub relocation_type: RelocationType,
    /// Current status
    pub status: RequestStatus,
    /// Scheduling priority
    pub priority: Priority,
    /// Client's preferred moving day
    pub preferred_date: Date,
    /// Fallback moving day
    pub alternative_date: Option<Date>,
    /// Day the office committed to
    pub scheduled_date: Option<Date>,
    /// When the move actually started
    pub actual_start_date: Option<DateTimeUtc>,
    /// When the move actually finished
    pub actual_completion_date: Option<DateTimeUtc>,
    /// Packing service requested
    pub requires_packing: bool,
    /// Unpacking service requested
    pub requires_unpacking: bool,
    /// Storage requested
    pub requires_storage: bool,
    /// Transit insurance requested
    pub requires_insurance: bool,
    /// Cleaning requested
    pub requires_cleaning: bool,
    /// Estimate in dollars
    pub estimated_cost: Option<f64>,
    /// Final cost in dollars
    pub actual_cost: Option<f64>,
    /// Client's special instructions
    #[sea_orm(column_type = "Text")]
    pub special_instructions: String,
    /// Internal notes
    #[sea_orm(column_type = "Text")]
    pub notes: String,
    /// Staff member handling the request
    pub assigned_to_id: Option<i64>,
    /// When the request was filed
    pub date_created: DateTimeUtc,
    /// Last modification
    pub date_updated: DateTimeUtc,
}

/// Defines relationships between `RelocationRequest` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Filing client
    #[sea_orm(
        belongs_to = "super::client::Entity",
        from = "Column::ClientId",
        to = "super::client::Column::Id",
        on_delete = "Cascade"
    )]
    Client,
    /// Origin property
    #[sea_orm(
        belongs_to = "super::property::Entity",
        from = "Column::OriginPropertyId",
        to = "super::property::Column::Id",
        on_delete = "Cascade"
    )]
    OriginProperty,
    /// Destination property, if recorded
    #[sea_orm(
        belongs_to = "super::property::Entity",
        from = "Column::DestinationPropertyId",
        to = "super::property::Column::Id",
        on_delete = "Cascade"
    )]
    DestinationProperty,
    /// Staff member handling the request
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AssignedToId",
        to = "super::user::Column::Id",
        on_delete = "SetNull"
    )]
    AssignedTo,
    /// Priced proposals
    #[sea_orm(has_many = "super::relocation_quote::Entity")]
    Quotes,
    /// Milestones
    #[sea_orm(has_many = "super::relocation_timeline::Entity")]
    Timeline,
}

impl Related<super::client::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Client.def()
    }
}

impl Related<super::relocation_quote::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Quotes.def()
    }
}

impl Related<super::relocation_timeline::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Timeline.def()
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
    /// Whole days between actual start and actual completion.
    ///
    /// `None` unless both dates are recorded. Only calendar dates count, so a move
    /// finishing the same day it started lasts zero days.
    #[must_use]
    pub fn duration_days(&self) -> Option<i64> {
        match (self.actual_start_date, self.actual_completion_date) {
            (Some(start), Some(end)) => Some((end.date_naive() - start.date_naive()).num_days()),
            _ => None,
        }
    }

    /// Destination assembled from the free-text fields.
    #[must_use]
    pub fn free_text_destination(&self) -> String {
        format!(
            "{}, {}, {} {}, {}",
            self.destination_address,
            self.destination_city,
            self.destination_state,
            self.destination_zip,
            self.destination_country
        )
    }
}
