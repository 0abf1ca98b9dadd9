//! Relocation timeline entity - milestones of a move.
//!
//! Entries list by scheduled time, then by creation.

use super::Choice;
use sea_orm::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Milestones a move passes through
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum MilestoneType {
    #[sea_orm(string_value = "quote_sent")]
    QuoteSent,
    #[sea_orm(string_value = "quote_accepted")]
    QuoteAccepted,
    #[sea_orm(string_value = "survey_scheduled")]
    SurveyScheduled,
    #[sea_orm(string_value = "survey_completed")]
    SurveyCompleted,
    #[sea_orm(string_value = "packing_started")]
    PackingStarted,
    #[sea_orm(string_value = "packing_completed")]
    PackingCompleted,
    #[sea_orm(string_value = "loading_started")]
    LoadingStarted,
    #[sea_orm(string_value = "loading_completed")]
    LoadingCompleted,
    #[sea_orm(string_value = "in_transit")]
    InTransit,
    #[sea_orm(string_value = "unloading_started")]
    UnloadingStarted,
    #[sea_orm(string_value = "unloading_completed")]
    UnloadingCompleted,
    #[sea_orm(string_value = "unpacking_started")]
    UnpackingStarted,
    #[sea_orm(string_value = "unpacking_completed")]
    UnpackingCompleted,
    #[sea_orm(string_value = "relocation_completed")]
    RelocationCompleted,
}

impl Choice for MilestoneType {
    fn label(&self) -> &'static str {
        match self {
            Self::QuoteSent => "Quote Sent",
            Self::QuoteAccepted => "Quote Accepted",
            Self::SurveyScheduled => "Survey Scheduled",
            Self::SurveyCompleted => "Survey Completed",
            Self::PackingStarted => "Packing Started",
            Self::PackingCompleted => "Packing Completed",
            Self::LoadingStarted => "Loading Started",
            Self::LoadingCompleted => "Loading Completed",
            Self::InTransit => "In Transit",
            Self::UnloadingStarted => "Unloading Started",
            Self::UnloadingCompleted => "Unloading Completed",
            Self::UnpackingStarted => "Unpacking Started",
            Self::UnpackingCompleted => "Unpacking Completed",
            Self::RelocationCompleted => "Relocation Completed",
        }
    }
}

/// Relocation timeline database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "relocation_timeline")]
pub struct Model {
    /// Surrogate key
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Request the milestone belongs to
    pub relocation_request_id: i64,
    /// Milestone reached
    pub milestone_type: MilestoneType,
    /// Short description
    pub description: String,
    /// When the milestone is planned
    pub scheduled_datetime: Option<DateTimeUtc>,
    /// When it actually happened
    pub actual_datetime: Option<DateTimeUtc>,
    /// Whether it happened
    pub is_completed: bool,
    /// Free-form notes
    #[sea_orm(column_type = "Text")]
    pub notes: String,
    /// Staff member who last touched the entry
    pub updated_by_id: Option<i64>,
    /// When the entry was created
    pub date_created: DateTimeUtc,
}

/// Defines relationships between `RelocationTimeline` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Owning request
    #[sea_orm(
        belongs_to = "super::relocation_request::Entity",
        from = "Column::RelocationRequestId",
        to = "super::relocation_request::Column::Id",
        on_delete = "Cascade"
    )]
    RelocationRequest,
    /// Staff member who last touched the entry
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UpdatedById",
        to = "super::user::Column::Id",
        on_delete = "SetNull"
    )]
    UpdatedBy,
}

impl Related<super::relocation_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RelocationRequest.def()
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
