//! Moving assignment entity - a crew bound to one relocation request.
//!
//! At most one assignment exists per request. Inventory transfers and expenses are
//! recorded against the assignment.

use super::Choice;
use sea_orm::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Execution status. Any value may follow any other.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    /// Planned
    #[default]
    #[sea_orm(string_value = "scheduled")]
    Scheduled,
    /// Crew on the job
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    /// Job done
    #[sea_orm(string_value = "completed")]
    Completed,
    /// Called off
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl Choice for AssignmentStatus {
    fn label(&self) -> &'static str {
        match self {
            Self::Scheduled => "Scheduled",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }
}

/// Moving assignment database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "moving_assignments")]
pub struct Model {
    /// Surrogate key
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Request being executed, one assignment each
    #[sea_orm(unique)]
    pub relocation_request_id: i64,
    /// Crew doing the work
    pub crew_id: i64,
    /// Execution status
    pub status: AssignmentStatus,
    /// Planned start
    pub scheduled_start_date: DateTimeUtc,
    /// Planned end
    pub scheduled_end_date: DateTimeUtc,
    /// Actual start
    pub actual_start_date: Option<DateTimeUtc>,
    /// Actual end
    pub actual_end_date: Option<DateTimeUtc>,
    /// Planned route length
    pub estimated_distance_km: Option<f64>,
    /// Driven route length
    pub actual_distance_km: Option<f64>,
    /// Planned duration
    pub estimated_duration_hours: Option<f64>,
    /// Actual duration
    pub actual_duration_hours: Option<f64>,
    /// Needs piano dollies, cranes and the like
    pub requires_special_equipment: bool,
    /// What equipment
    #[sea_orm(column_type = "Text")]
    pub special_equipment_notes: String,
    /// Free-form notes
    #[sea_orm(column_type = "Text")]
    pub notes: String,
    /// When the assignment was made
    pub date_created: DateTimeUtc,
    /// Last modification
    pub date_updated: DateTimeUtc,
}

/// Defines relationships between `MovingAssignment` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Request being executed
    #[sea_orm(
        belongs_to = "super::relocation_request::Entity",
        from = "Column::RelocationRequestId",
        to = "super::relocation_request::Column::Id",
        on_delete = "Cascade"
    )]
    RelocationRequest,
    /// Crew doing the work
    #[sea_orm(
        belongs_to = "super::moving_crew::Entity",
        from = "Column::CrewId",
        to = "super::moving_crew::Column::Id",
        on_delete = "Cascade"
    )]
    Crew,
    /// Tracked items
    #[sea_orm(has_many = "super::inventory_transfer::Entity")]
    InventoryTransfers,
    /// Costs incurred on the road
    #[sea_orm(has_many = "super::moving_expense::Entity")]
    Expenses,
}

impl Related<super::relocation_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RelocationRequest.def()
    }
}

impl Related<super::moving_crew::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Crew.def()
    }
}

impl Related<super::inventory_transfer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InventoryTransfers.def()
    }
}

impl Related<super::moving_expense::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
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
