//! Moving crew business logic.
//!
//! A crew has one leading driver plus any number of member drivers and vehicles.
//! Memberships are link rows; saving a crew rewrites them in the same transaction as
//! the crew row itself.

use crate::{
    core::{
        driver, vehicle,
        validation::{ensure_unique, min_int, required},
    },
    entities::{
        CrewMember, CrewVehicle, Driver, MovingCrew, Vehicle, crew_member, crew_vehicle,
        driver as driver_entity, moving_crew, vehicle as vehicle_entity,
    },
    errors::{Error, Result},
};
use sea_orm::{DatabaseTransaction, QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Deserialize;
use tracing::{debug, info, instrument};

/// Editable fields of a crew, memberships included
#[derive(Debug, Clone, Deserialize)]
pub struct CrewForm {
    /// Business identifier, unique
    pub crew_id: String,
    /// Leading driver
    pub crew_leader_id: i64,
    /// Member drivers
    #[serde(default)]
    pub members: Vec<i64>,
    /// Vehicles the crew takes out
    #[serde(default)]
    pub vehicles: Vec<i64>,
    /// Combined load the crew can handle
    pub max_capacity_kg: i32,
    /// Active crew
    #[serde(default = "crate::core::account::default_true")]
    pub is_active: bool,
}

impl CrewForm {
    fn clean(mut self) -> Result<Self> {
        self.crew_id = required("crew_id", &self.crew_id, 20)?;
        min_int("max_capacity_kg", self.max_capacity_kg, 1)?;
        self.members.sort_unstable();
        self.members.dedup();
        self.vehicles.sort_unstable();
        self.vehicles.dedup();
        Ok(self)
    }
}

async fn check_crew_constraints(
    db: &DatabaseConnection,
    form: &CrewForm,
    exclude: Option<i64>,
) -> Result<()> {
    driver::require_driver(db, form.crew_leader_id).await?;
    for &member in &form.members {
        driver::require_driver(db, member).await?;
    }
    for &vehicle_id in &form.vehicles {
        vehicle::require_vehicle(db, vehicle_id).await?;
    }

    let mut query = MovingCrew::find().filter(moving_crew::Column::CrewId.eq(&form.crew_id));
    if let Some(id) = exclude {
        query = query.filter(moving_crew::Column::Id.ne(id));
    }
    ensure_unique(db, query, "Moving crew", "crew_id", &form.crew_id).await
}

async fn write_links(
    txn: &DatabaseTransaction,
    crew_id: i64,
    members: &[i64],
    vehicles: &[i64],
) -> Result<()> {
    CrewMember::delete_many()
        .filter(crew_member::Column::MovingCrewId.eq(crew_id))
        .exec(txn)
        .await?;
    CrewVehicle::delete_many()
        .filter(crew_vehicle::Column::MovingCrewId.eq(crew_id))
        .exec(txn)
        .await?;

    for &driver_id in members {
        crew_member::ActiveModel {
            moving_crew_id: Set(crew_id),
            driver_id: Set(driver_id),
        }
        .insert(txn)
        .await?;
    }
    for &vehicle_id in vehicles {
        crew_vehicle::ActiveModel {
            moving_crew_id: Set(crew_id),
            vehicle_id: Set(vehicle_id),
        }
        .insert(txn)
        .await?;
    }
    debug!(
        "Crew {} now has {} members and {} vehicles",
        crew_id,
        members.len(),
        vehicles.len()
    );
    Ok(())
}

/// Finds a crew by primary key.
pub async fn get_crew_by_id(
    db: &DatabaseConnection,
    id: i64,
) -> Result<Option<moving_crew::Model>> {
    MovingCrew::find_by_id(id).one(db).await.map_err(Into::into)
}

/// Finds a crew by primary key, failing if it does not exist.
pub async fn require_crew(db: &DatabaseConnection, id: i64) -> Result<moving_crew::Model> {
    get_crew_by_id(db, id)
        .await?
        .ok_or_else(|| Error::not_found("Moving crew", id))
}

/// Member drivers of a crew, by driver identifier.
pub async fn members_of(
    db: &DatabaseConnection,
    crew_id: i64,
) -> Result<Vec<driver_entity::Model>> {
    Driver::find()
        .inner_join(CrewMember)
        .filter(crew_member::Column::MovingCrewId.eq(crew_id))
        .order_by_asc(driver_entity::Column::DriverId)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Vehicles assigned to a crew, by vehicle identifier.
pub async fn vehicles_of(
    db: &DatabaseConnection,
    crew_id: i64,
) -> Result<Vec<vehicle_entity::Model>> {
    Vehicle::find()
        .inner_join(CrewVehicle)
        .filter(crew_vehicle::Column::MovingCrewId.eq(crew_id))
        .order_by_asc(vehicle_entity::Column::VehicleId)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Forms a crew together with its memberships.
#[instrument(skip(db, form), fields(crew_id = %form.crew_id))]
pub async fn create_crew(db: &DatabaseConnection, form: CrewForm) -> Result<moving_crew::Model> {
    let form = form.clean()?;
    check_crew_constraints(db, &form, None).await?;

    let txn = db.begin().await?;
    let crew = moving_crew::ActiveModel {
        crew_id: Set(form.crew_id),
        crew_leader_id: Set(form.crew_leader_id),
        max_capacity_kg: Set(form.max_capacity_kg),
        is_active: Set(form.is_active),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    write_links(&txn, crew.id, &form.members, &form.vehicles).await?;
    txn.commit().await?;

    info!("Formed crew {}", crew.crew_id);
    Ok(crew)
}

/// Replaces every editable field of a crew, memberships included.
#[instrument(skip(db, form))]
pub async fn update_crew(
    db: &DatabaseConnection,
    id: i64,
    form: CrewForm,
) -> Result<moving_crew::Model> {
    let form = form.clean()?;
    let existing = require_crew(db, id).await?;
    check_crew_constraints(db, &form, Some(id)).await?;

    let txn = db.begin().await?;
    let mut model: moving_crew::ActiveModel = existing.into();
    model.crew_id = Set(form.crew_id);
    model.crew_leader_id = Set(form.crew_leader_id);
    model.max_capacity_kg = Set(form.max_capacity_kg);
    model.is_active = Set(form.is_active);
    let crew = model.update(&txn).await?;
    write_links(&txn, crew.id, &form.members, &form.vehicles).await?;
    txn.commit().await?;
    Ok(crew)
}

/// Disbands a crew. Its assignments go with it.
#[instrument(skip(db))]
pub async fn delete_crew(db: &DatabaseConnection, id: i64) -> Result<()> {
    let result = MovingCrew::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("Moving crew", id));
    }
    info!("Disbanded crew {}", id);
    Ok(())
}

/// Adds a driver to a crew. Adding an existing member is a no-op.
#[instrument(skip(db))]
pub async fn add_member(db: &DatabaseConnection, crew_id: i64, driver_id: i64) -> Result<()> {
    require_crew(db, crew_id).await?;
    driver::require_driver(db, driver_id).await?;
    if CrewMember::find_by_id((crew_id, driver_id))
        .one(db)
        .await?
        .is_some()
    {
        return Ok(());
    }
    crew_member::ActiveModel {
        moving_crew_id: Set(crew_id),
        driver_id: Set(driver_id),
    }
    .insert(db)
    .await?;
    Ok(())
}

/// Removes a driver from a crew.
#[instrument(skip(db))]
pub async fn remove_member(db: &DatabaseConnection, crew_id: i64, driver_id: i64) -> Result<()> {
    let result = CrewMember::delete_by_id((crew_id, driver_id)).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found(
            "Crew member",
            format!("{crew_id}/{driver_id}"),
        ));
    }
    Ok(())
}

/// Assigns a vehicle to a crew. Assigning it twice is a no-op.
#[instrument(skip(db))]
pub async fn add_vehicle(db: &DatabaseConnection, crew_id: i64, vehicle_id: i64) -> Result<()> {
    require_crew(db, crew_id).await?;
    vehicle::require_vehicle(db, vehicle_id).await?;
    if CrewVehicle::find_by_id((crew_id, vehicle_id))
        .one(db)
        .await?
        .is_some()
    {
        return Ok(());
    }
    crew_vehicle::ActiveModel {
        moving_crew_id: Set(crew_id),
        vehicle_id: Set(vehicle_id),
    }
    .insert(db)
    .await?;
    Ok(())
}

/// Takes a vehicle away from a crew.
#[instrument(skip(db))]
pub async fn remove_vehicle(db: &DatabaseConnection, crew_id: i64, vehicle_id: i64) -> Result<()> {
    let result = CrewVehicle::delete_by_id((crew_id, vehicle_id))
        .exec(db)
        .await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found(
            "Crew vehicle",
            format!("{crew_id}/{vehicle_id}"),
        ));
    }
    Ok(())
}

/// Name of the crew's leader.
pub async fn leader_name(db: &DatabaseConnection, crew: &moving_crew::Model) -> Result<String> {
    let leader = driver::require_driver(db, crew.crew_leader_id).await?;
    driver::driver_name(db, &leader).await
}

/// `"Crew {crew_id} - Leader: {leader full name}"`
pub async fn crew_display(db: &DatabaseConnection, crew: &moving_crew::Model) -> Result<String> {
    Ok(format!(
        "Crew {} - Leader: {}",
        crew.crew_id,
        leader_name(db, crew).await?
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_crew_with_members_and_vehicles() -> Result<()> {
        let db = setup_test_db().await?;
        let leader = create_test_driver(&db, "lead", "DR-01").await?;
        let member = create_test_driver(&db, "helper", "DR-02").await?;
        let van = create_test_vehicle(&db, "VH-01", "ABC123").await?;

        let mut form = crew_form("CR-01", leader.id);
        form.members = vec![member.id, leader.id, member.id];
        form.vehicles = vec![van.id];
        let crew = create_crew(&db, form).await?;

        let members: Vec<String> = members_of(&db, crew.id)
            .await?
            .into_iter()
            .map(|d| d.driver_id)
            .collect();
        assert_eq!(members, vec!["DR-01", "DR-02"]);
        assert_eq!(vehicles_of(&db, crew.id).await?.len(), 1);
        assert_eq!(crew_display(&db, &crew).await?, "Crew CR-01 - Leader: Test lead");
        Ok(())
    }

    #[tokio::test]
    async fn test_update_crew_replaces_memberships() -> Result<()> {
        let db = setup_test_db().await?;
        let leader = create_test_driver(&db, "lead", "DR-01").await?;
        let first = create_test_driver(&db, "first", "DR-02").await?;
        let second = create_test_driver(&db, "second", "DR-03").await?;

        let mut form = crew_form("CR-01", leader.id);
        form.members = vec![first.id];
        let crew = create_crew(&db, form).await?;

        let mut form = crew_form("CR-01", leader.id);
        form.members = vec![second.id];
        form.max_capacity_kg = 9000;
        let updated = update_crew(&db, crew.id, form).await?;
        assert_eq!(updated.max_capacity_kg, 9000);

        let members = members_of(&db, crew.id).await?;
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].id, second.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_member_leaves_no_crew() -> Result<()> {
        let db = setup_test_db().await?;
        let leader = create_test_driver(&db, "lead", "DR-01").await?;

        let mut form = crew_form("CR-01", leader.id);
        form.members = vec![404];
        let result = create_crew(&db, form).await;
        assert!(matches!(result, Err(Error::NotFound { entity: "Driver", .. })));
        assert!(MovingCrew::find().all(&db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_add_and_remove_links() -> Result<()> {
        let db = setup_test_db().await?;
        let crew = create_test_crew(&db, "CR-01").await?;
        let helper = create_test_driver(&db, "helper", "DR-09").await?;
        let truck = create_test_vehicle(&db, "VH-02", "TRK999").await?;

        add_member(&db, crew.id, helper.id).await?;
        add_member(&db, crew.id, helper.id).await?;
        add_vehicle(&db, crew.id, truck.id).await?;
        assert_eq!(members_of(&db, crew.id).await?.len(), 1);
        assert_eq!(vehicles_of(&db, crew.id).await?.len(), 1);

        remove_member(&db, crew.id, helper.id).await?;
        remove_vehicle(&db, crew.id, truck.id).await?;
        assert!(members_of(&db, crew.id).await?.is_empty());
        assert!(vehicles_of(&db, crew.id).await?.is_empty());

        assert!(matches!(
            remove_member(&db, crew.id, helper.id).await,
            Err(Error::NotFound { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_links_cascade_from_both_sides() -> Result<()> {
        let db = setup_test_db().await?;
        let crew = create_test_crew(&db, "CR-01").await?;
        let helper = create_test_driver(&db, "helper", "DR-09").await?;
        let van = create_test_vehicle(&db, "VH-01", "ABC123").await?;
        add_member(&db, crew.id, helper.id).await?;
        add_vehicle(&db, crew.id, van.id).await?;

        driver::delete_driver(&db, helper.id).await?;
        vehicle::delete_vehicle(&db, van.id).await?;
        assert!(members_of(&db, crew.id).await?.is_empty());
        assert!(vehicles_of(&db, crew.id).await?.is_empty());
        assert!(get_crew_by_id(&db, crew.id).await?.is_some());

        driver::delete_driver(&db, crew.crew_leader_id).await?;
        assert!(get_crew_by_id(&db, crew.id).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_crew_id_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        let crew = create_test_crew(&db, "CR-01").await?;

        let result = create_crew(&db, crew_form("CR-01", crew.crew_leader_id)).await;
        assert!(matches!(
            result,
            Err(Error::Duplicate {
                field: "crew_id",
                ..
            })
        ));
        Ok(())
    }
}
