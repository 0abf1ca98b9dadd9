//! Moving crew entity - a leader, members and the vehicles they take out.

use sea_orm::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Moving crew database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "moving_crews")]
pub struct Model {
    /// Surrogate key
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Crew code
    #[sea_orm(unique)]
    pub crew_id: String,
    /// Driver leading the crew
    pub crew_leader_id: i64,
    /// Combined payload the crew can handle
    pub max_capacity_kg: i32,
    /// Inactive crews are kept for history
    pub is_active: bool,
    /// When the crew was formed
    pub date_created: DateTimeUtc,
}

/// Defines relationships between `MovingCrew` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Crew leader
    #[sea_orm(
        belongs_to = "super::driver::Entity",
        from = "Column::CrewLeaderId",
        to = "super::driver::Column::Id",
        on_delete = "Cascade"
    )]
    CrewLeader,
    /// Member links
    #[sea_orm(has_many = "super::crew_member::Entity")]
    Members,
    /// Vehicle links
    #[sea_orm(has_many = "super::crew_vehicle::Entity")]
    Vehicles,
    /// Jobs handed to the crew
    #[sea_orm(has_many = "super::moving_assignment::Entity")]
    Assignments,
}

impl Related<super::driver::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CrewLeader.def()
    }
}

impl Related<super::crew_member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl Related<super::crew_vehicle::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vehicles.def()
    }
}

impl Related<super::moving_assignment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assignments.def()
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
