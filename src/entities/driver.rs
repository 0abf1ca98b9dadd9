//! Driver entity - licensed crew members.
//!
//! Every driver is backed by exactly one user account, which supplies the name.

use super::Choice;
use sea_orm::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Duty status
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum DriverStatus {
    /// Can be scheduled
    #[default]
    #[sea_orm(string_value = "available")]
    Available,
    /// Working a job
    #[sea_orm(string_value = "on_duty")]
    OnDuty,
    /// Off shift
    #[sea_orm(string_value = "off_duty")]
    OffDuty,
    /// On leave
    #[sea_orm(string_value = "on_leave")]
    OnLeave,
}

impl Choice for DriverStatus {
    fn label(&self) -> &'static str {
        match self {
            Self::Available => "Available",
            Self::OnDuty => "On Duty",
            Self::OffDuty => "Off Duty",
            Self::OnLeave => "On Leave",
        }
    }
}

/// Driver database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "drivers")]
pub struct Model {
    /// Surrogate key
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Backing user account
    #[sea_orm(unique)]
    pub user_id: i64,
    /// Staff number
    #[sea_orm(unique)]
    pub driver_id: String,
    /// Mobile phone
    pub phone: String,
    /// Emergency contact
    pub emergency_contact_name: String,
    /// Emergency contact phone
    pub emergency_contact_phone: String,
    /// Driving licence number
    #[sea_orm(unique)]
    pub license_number: String,
    /// Licence valid until
    pub license_expiry: Date,
    /// CDL class if applicable
    pub cdl_class: String,
    /// Start of employment
    pub hire_date: Date,
    /// Duty status
    pub status: DriverStatus,
    /// Pay rate in dollars per hour
    pub hourly_rate: f64,
    /// Completed moves
    pub total_moves: i32,
    /// Average customer rating
    pub average_rating: Option<f64>,
    /// When the driver record was created
    pub date_created: DateTimeUtc,
    /// Inactive drivers are kept for history
    pub is_active: bool,
}

/// Defines relationships between Driver and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Backing user account
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
    /// Crews this driver leads
    #[sea_orm(has_many = "super::moving_crew::Entity")]
    LedCrews,
    /// Crew memberships
    #[sea_orm(has_many = "super::crew_member::Entity")]
    CrewMemberships,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::moving_crew::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LedCrews.def()
    }
}

impl Related<super::crew_member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CrewMemberships.def()
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
