//! Crew vehicle link table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One vehicle assigned to one crew
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "crew_vehicles")]
pub struct Model {
    /// Crew side of the link
    #[sea_orm(primary_key, auto_increment = false)]
    pub moving_crew_id: i64,
    /// Vehicle side of the link
    #[sea_orm(primary_key, auto_increment = false)]
    pub vehicle_id: i64,
}

/// Both sides cascade
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Crew
    #[sea_orm(
        belongs_to = "super::moving_crew::Entity",
        from = "Column::MovingCrewId",
        to = "super::moving_crew::Column::Id",
        on_delete = "Cascade"
    )]
    MovingCrew,
    /// Vehicle
    #[sea_orm(
        belongs_to = "super::vehicle::Entity",
        from = "Column::VehicleId",
        to = "super::vehicle::Column::Id",
        on_delete = "Cascade"
    )]
    Vehicle,
}

impl Related<super::moving_crew::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MovingCrew.def()
    }
}

impl Related<super::vehicle::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vehicle.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
