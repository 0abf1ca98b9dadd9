//! Vehicle entity - the fleet of vans, trucks and containers.

use super::Choice;
use sea_orm::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Kind of vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum VehicleType {
    /// Van
    #[sea_orm(string_value = "van")]
    Van,
    /// Small truck
    #[sea_orm(string_value = "truck_small")]
    TruckSmall,
    /// Medium truck
    #[sea_orm(string_value = "truck_medium")]
    TruckMedium,
    /// Large truck
    #[sea_orm(string_value = "truck_large")]
    TruckLarge,
    /// Trailer
    #[sea_orm(string_value = "trailer")]
    Trailer,
    /// Shipping container
    #[sea_orm(string_value = "container")]
    Container,
}

impl Choice for VehicleType {
    fn label(&self) -> &'static str {
        match self {
            Self::Van => "Van",
            Self::TruckSmall => "Small Truck",
            Self::TruckMedium => "Medium Truck",
            Self::TruckLarge => "Large Truck",
            Self::Trailer => "Trailer",
            Self::Container => "Container",
        }
    }
}

/// Fleet availability
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum VehicleStatus {
    /// Ready for assignment
    #[default]
    #[sea_orm(string_value = "available")]
    Available,
    /// Out on a job
    #[sea_orm(string_value = "in_use")]
    InUse,
    /// In the shop
    #[sea_orm(string_value = "maintenance")]
    Maintenance,
    /// Retired or grounded
    #[sea_orm(string_value = "out_of_service")]
    OutOfService,
}

impl Choice for VehicleStatus {
    fn label(&self) -> &'static str {
        match self {
            Self::Available => "Available",
            Self::InUse => "In Use",
            Self::Maintenance => "Under Maintenance",
            Self::OutOfService => "Out of Service",
        }
    }
}

/// Vehicle database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vehicles")]
pub struct Model {
    /// Surrogate key
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Fleet number
    #[sea_orm(unique)]
    pub vehicle_id: String,
    /// Kind of vehicle
    pub vehicle_type: VehicleType,
    /// Manufacturer
    pub make: String,
    /// Model name
    #[sea_orm(column_name = "model")]
    pub model_name: String,
    /// Model year, 1990 or later
    pub year: i32,
    /// Registration plate
    #[sea_orm(unique)]
    pub license_plate: String,
    /// Payload limit
    pub max_weight_kg: i32,
    /// Cargo volume
    pub max_volume_cubic_meters: f64,
    /// Availability
    pub status: VehicleStatus,
    /// Last service
    pub last_service_date: Option<Date>,
    /// Next service due
    pub next_service_date: Option<Date>,
    /// Odometer reading
    pub mileage: i32,
    /// Insurance valid until
    pub insurance_expiry: Date,
    /// Registration valid until
    pub registration_expiry: Date,
    /// When the vehicle joined the fleet
    pub date_created: DateTimeUtc,
    /// Inactive vehicles are kept for history
    pub is_active: bool,
}

/// Vehicles join crews through `crew_vehicles`
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Crew assignments
    #[sea_orm(has_many = "super::crew_vehicle::Entity")]
    CrewVehicles,
}

impl Related<super::crew_vehicle::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CrewVehicles.def()
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

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} - {} {} ({})",
            self.vehicle_id, self.make, self.model_name, self.license_plate
        )
    }
}
