//! Crew membership link table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One driver serving on one crew
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "crew_members")]
pub struct Model {
    /// Crew side of the link
    #[sea_orm(primary_key, auto_increment = false)]
    pub moving_crew_id: i64,
    /// Driver side of the link
    #[sea_orm(primary_key, auto_increment = false)]
    pub driver_id: i64,
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
    /// Driver
    #[sea_orm(
        belongs_to = "super::driver::Entity",
        from = "Column::DriverId",
        to = "super::driver::Column::Id",
        on_delete = "Cascade"
    )]
    Driver,
}

impl Related<super::moving_crew::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MovingCrew.def()
    }
}

impl Related<super::driver::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Driver.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
