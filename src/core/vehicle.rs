//! Fleet business logic.

use crate::{
    core::{
        account,
        validation::{ensure_unique, min_amount, min_int, required},
    },
    entities::{
        Vehicle,
        vehicle::{self, VehicleStatus, VehicleType},
    },
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Deserialize;
use tracing::{info, instrument};

/// Oldest model year accepted into the fleet
pub const MIN_VEHICLE_YEAR: i32 = 1990;

/// Editable fields of a vehicle
#[derive(Debug, Clone, Deserialize)]
pub struct VehicleForm {
    /// Business identifier, unique
    pub vehicle_id: String,
    /// Kind of vehicle
    pub vehicle_type: VehicleType,
    /// Manufacturer
    pub make: String,
    /// Model name
    pub model: String,
    /// Model year
    pub year: i32,
    /// Registration plate, unique
    pub license_plate: String,
    /// Payload limit
    pub max_weight_kg: i32,
    /// Cargo volume
    pub max_volume_cubic_meters: f64,
    /// Availability
    #[serde(default)]
    pub status: VehicleStatus,
    /// Last service
    #[serde(default)]
    pub last_service_date: Option<NaiveDate>,
    /// Next service due
    #[serde(default)]
    pub next_service_date: Option<NaiveDate>,
    /// Odometer
    #[serde(default)]
    pub mileage: i32,
    /// Insurance expiry
    pub insurance_expiry: NaiveDate,
    /// Registration expiry
    pub registration_expiry: NaiveDate,
    /// In the active fleet
    #[serde(default = "account::default_true")]
    pub is_active: bool,
}

impl VehicleForm {
    fn clean(mut self) -> Result<Self> {
        self.vehicle_id = required("vehicle_id", &self.vehicle_id, 20)?;
        self.make = required("make", &self.make, 50)?;
        self.model = required("model", &self.model, 50)?;
        min_int("year", self.year, MIN_VEHICLE_YEAR)?;
        self.license_plate = required("license_plate", &self.license_plate, 15)?;
        min_int("max_weight_kg", self.max_weight_kg, 1)?;
        min_amount("max_volume_cubic_meters", self.max_volume_cubic_meters, 0.1)?;
        min_int("mileage", self.mileage, 0)?;
        Ok(self)
    }

    fn apply(self, model: &mut vehicle::ActiveModel) {
        model.vehicle_id = Set(self.vehicle_id);
        model.vehicle_type = Set(self.vehicle_type);
        model.make = Set(self.make);
        model.model_name = Set(self.model);
        model.year = Set(self.year);
        model.license_plate = Set(self.license_plate);
        model.max_weight_kg = Set(self.max_weight_kg);
        model.max_volume_cubic_meters = Set(self.max_volume_cubic_meters);
        model.status = Set(self.status);
        model.last_service_date = Set(self.last_service_date);
        model.next_service_date = Set(self.next_service_date);
        model.mileage = Set(self.mileage);
        model.insurance_expiry = Set(self.insurance_expiry);
        model.registration_expiry = Set(self.registration_expiry);
        model.is_active = Set(self.is_active);
    }
}

async fn check_vehicle_constraints(
    db: &DatabaseConnection,
    form: &VehicleForm,
    exclude: Option<i64>,
) -> Result<()> {
    let mut by_code = Vehicle::find().filter(vehicle::Column::VehicleId.eq(&form.vehicle_id));
    let mut by_plate =
        Vehicle::find().filter(vehicle::Column::LicensePlate.eq(&form.license_plate));
    if let Some(id) = exclude {
        by_code = by_code.filter(vehicle::Column::Id.ne(id));
        by_plate = by_plate.filter(vehicle::Column::Id.ne(id));
    }
    ensure_unique(db, by_code, "Vehicle", "vehicle_id", &form.vehicle_id).await?;
    ensure_unique(db, by_plate, "Vehicle", "license_plate", &form.license_plate).await
}

/// Finds a vehicle by primary key.
pub async fn get_vehicle_by_id(db: &DatabaseConnection, id: i64) -> Result<Option<vehicle::Model>> {
    Vehicle::find_by_id(id).one(db).await.map_err(Into::into)
}

/// Finds a vehicle by primary key, failing if it does not exist.
pub async fn require_vehicle(db: &DatabaseConnection, id: i64) -> Result<vehicle::Model> {
    get_vehicle_by_id(db, id)
        .await?
        .ok_or_else(|| Error::not_found("Vehicle", id))
}

/// Active vehicles with the given status, by identifier.
pub async fn get_vehicles_by_status(
    db: &DatabaseConnection,
    status: VehicleStatus,
) -> Result<Vec<vehicle::Model>> {
    Vehicle::find()
        .filter(vehicle::Column::Status.eq(status))
        .filter(vehicle::Column::IsActive.eq(true))
        .order_by_asc(vehicle::Column::VehicleId)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Adds a vehicle to the fleet.
#[instrument(skip(db, form), fields(vehicle_id = %form.vehicle_id))]
pub async fn create_vehicle(db: &DatabaseConnection, form: VehicleForm) -> Result<vehicle::Model> {
    let form = form.clean()?;
    check_vehicle_constraints(db, &form, None).await?;

    let mut model = vehicle::ActiveModel {
        ..Default::default()
    };
    form.apply(&mut model);
    let vehicle = model.insert(db).await?;
    info!("Added vehicle {}", vehicle);
    Ok(vehicle)
}

/// Replaces every editable field of a vehicle.
#[instrument(skip(db, form))]
pub async fn update_vehicle(
    db: &DatabaseConnection,
    id: i64,
    form: VehicleForm,
) -> Result<vehicle::Model> {
    let form = form.clean()?;
    let existing = require_vehicle(db, id).await?;
    check_vehicle_constraints(db, &form, Some(id)).await?;

    let mut model: vehicle::ActiveModel = existing.into();
    form.apply(&mut model);
    model.update(db).await.map_err(Into::into)
}

/// Removes a vehicle from the fleet and from every crew using it.
#[instrument(skip(db))]
pub async fn delete_vehicle(db: &DatabaseConnection, id: i64) -> Result<()> {
    let result = Vehicle::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("Vehicle", id));
    }
    info!("Deleted vehicle {}", id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_vehicle_integration() -> Result<()> {
        let db = setup_test_db().await?;

        let vehicle = create_test_vehicle(&db, "VH-01", "ABC123").await?;
        assert_eq!(vehicle.to_string(), "VH-01 - Ford Transit (ABC123)");
        assert_eq!(vehicle.status, VehicleStatus::Available);
        assert_eq!(vehicle.mileage, 0);

        let available = get_vehicles_by_status(&db, VehicleStatus::Available).await?;
        assert_eq!(available.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_vehicle_minimums() -> Result<()> {
        let db = setup_test_db().await?;

        let mut form = vehicle_form("VH-01", "ABC123");
        form.year = 1989;
        assert!(matches!(
            create_vehicle(&db, form).await,
            Err(Error::Validation { field: "year", .. })
        ));

        let mut form = vehicle_form("VH-01", "ABC123");
        form.max_weight_kg = 0;
        assert!(matches!(
            create_vehicle(&db, form).await,
            Err(Error::Validation {
                field: "max_weight_kg",
                ..
            })
        ));

        let mut form = vehicle_form("VH-01", "ABC123");
        form.max_volume_cubic_meters = 0.05;
        assert!(matches!(
            create_vehicle(&db, form).await,
            Err(Error::Validation {
                field: "max_volume_cubic_meters",
                ..
            })
        ));

        let mut form = vehicle_form("VH-01", "ABC123");
        form.mileage = -1;
        assert!(matches!(
            create_vehicle(&db, form).await,
            Err(Error::Validation {
                field: "mileage",
                ..
            })
        ));

        let mut form = vehicle_form("VH-01", "ABC123");
        form.year = MIN_VEHICLE_YEAR;
        form.max_volume_cubic_meters = 0.1;
        assert!(create_vehicle(&db, form).await.is_ok());
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_identifiers_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_vehicle(&db, "VH-01", "ABC123").await?;

        assert!(matches!(
            create_test_vehicle(&db, "VH-01", "XYZ789").await,
            Err(Error::Duplicate {
                field: "vehicle_id",
                ..
            })
        ));
        assert!(matches!(
            create_test_vehicle(&db, "VH-02", "ABC123").await,
            Err(Error::Duplicate {
                field: "license_plate",
                ..
            })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_vehicle_status() -> Result<()> {
        let db = setup_test_db().await?;
        let vehicle = create_test_vehicle(&db, "VH-01", "ABC123").await?;

        let mut form = vehicle_form("VH-01", "ABC123");
        form.status = VehicleStatus::Maintenance;
        form.mileage = 120_000;
        let updated = update_vehicle(&db, vehicle.id, form).await?;
        assert_eq!(updated.status, VehicleStatus::Maintenance);
        assert_eq!(updated.mileage, 120_000);
        assert!(
            get_vehicles_by_status(&db, VehicleStatus::Available)
                .await?
                .is_empty()
        );
        Ok(())
    }
}
