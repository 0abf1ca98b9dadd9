//! Driver business logic.
//!
//! A driver is an employment record on top of exactly one user account; the account
//! supplies the name shown everywhere a driver is displayed.

use crate::{
    core::{
        account,
        validation::{ensure_unique, max_length, min_amount, min_int, required, validate_phone},
    },
    entities::{
        Driver,
        driver::{self, DriverStatus},
    },
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Deserialize;
use tracing::{info, instrument};

/// Editable fields of a driver
#[derive(Debug, Clone, Deserialize)]
pub struct DriverForm {
    /// Backing user account, one driver per account
    pub user_id: i64,
    /// Business identifier, unique
    pub driver_id: String,
    /// Contact phone
    pub phone: String,
    /// Emergency contact
    pub emergency_contact_name: String,
    /// Emergency contact phone
    pub emergency_contact_phone: String,
    /// Driving licence number, unique
    pub license_number: String,
    /// Licence expiry
    pub license_expiry: NaiveDate,
    /// CDL class if applicable
    #[serde(default)]
    pub cdl_class: String,
    /// Start of employment
    pub hire_date: NaiveDate,
    /// Availability
    #[serde(default)]
    pub status: DriverStatus,
    /// Pay rate
    pub hourly_rate: f64,
    /// Completed moves
    #[serde(default)]
    pub total_moves: i32,
    /// Average customer rating
    #[serde(default)]
    pub average_rating: Option<f64>,
    /// Currently employed
    #[serde(default = "account::default_true")]
    pub is_active: bool,
}

impl DriverForm {
    fn clean(mut self) -> Result<Self> {
        self.driver_id = required("driver_id", &self.driver_id, 20)?;
        self.phone = required("phone", &self.phone, 17)?;
        validate_phone("phone", &self.phone)?;
        self.emergency_contact_name =
            required("emergency_contact_name", &self.emergency_contact_name, 100)?;
        self.emergency_contact_phone =
            required("emergency_contact_phone", &self.emergency_contact_phone, 17)?;
        validate_phone("emergency_contact_phone", &self.emergency_contact_phone)?;
        self.license_number = required("license_number", &self.license_number, 50)?;
        max_length("cdl_class", &self.cdl_class, 10)?;
        min_amount("hourly_rate", self.hourly_rate, 0.0)?;
        min_int("total_moves", self.total_moves, 0)?;
        if let Some(rating) = self.average_rating {
            min_amount("average_rating", rating, 0.0)?;
        }
        Ok(self)
    }

    fn apply(self, model: &mut driver::ActiveModel) {
        model.user_id = Set(self.user_id);
        model.driver_id = Set(self.driver_id);
        model.phone = Set(self.phone);
        model.emergency_contact_name = Set(self.emergency_contact_name);
        model.emergency_contact_phone = Set(self.emergency_contact_phone);
        model.license_number = Set(self.license_number);
        model.license_expiry = Set(self.license_expiry);
        model.cdl_class = Set(self.cdl_class);
        model.hire_date = Set(self.hire_date);
        model.status = Set(self.status);
        model.hourly_rate = Set(self.hourly_rate);
        model.total_moves = Set(self.total_moves);
        model.average_rating = Set(self.average_rating);
        model.is_active = Set(self.is_active);
    }
}

async fn check_driver_constraints(
    db: &DatabaseConnection,
    form: &DriverForm,
    exclude: Option<i64>,
) -> Result<()> {
    account::require_user(db, form.user_id).await?;

    let mut by_user = Driver::find().filter(driver::Column::UserId.eq(form.user_id));
    let mut by_code = Driver::find().filter(driver::Column::DriverId.eq(&form.driver_id));
    let mut by_license =
        Driver::find().filter(driver::Column::LicenseNumber.eq(&form.license_number));
    if let Some(id) = exclude {
        by_user = by_user.filter(driver::Column::Id.ne(id));
        by_code = by_code.filter(driver::Column::Id.ne(id));
        by_license = by_license.filter(driver::Column::Id.ne(id));
    }
    ensure_unique(db, by_user, "Driver", "user", &form.user_id.to_string()).await?;
    ensure_unique(db, by_code, "Driver", "driver_id", &form.driver_id).await?;
    ensure_unique(
        db,
        by_license,
        "Driver",
        "license_number",
        &form.license_number,
    )
    .await
}

/// Finds a driver by primary key.
pub async fn get_driver_by_id(db: &DatabaseConnection, id: i64) -> Result<Option<driver::Model>> {
    Driver::find_by_id(id).one(db).await.map_err(Into::into)
}

/// Finds a driver by primary key, failing if it does not exist.
pub async fn require_driver(db: &DatabaseConnection, id: i64) -> Result<driver::Model> {
    get_driver_by_id(db, id)
        .await?
        .ok_or_else(|| Error::not_found("Driver", id))
}

/// Active drivers currently available for work, by identifier.
pub async fn get_available_drivers(db: &DatabaseConnection) -> Result<Vec<driver::Model>> {
    Driver::find()
        .filter(driver::Column::Status.eq(DriverStatus::Available))
        .filter(driver::Column::IsActive.eq(true))
        .order_by_asc(driver::Column::DriverId)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Hires a driver on an existing account.
#[instrument(skip(db, form), fields(driver_id = %form.driver_id))]
pub async fn create_driver(db: &DatabaseConnection, form: DriverForm) -> Result<driver::Model> {
    let form = form.clean()?;
    check_driver_constraints(db, &form, None).await?;

    let mut model = driver::ActiveModel {
        ..Default::default()
    };
    form.apply(&mut model);
    let driver = model.insert(db).await?;
    info!("Hired driver {}", driver.driver_id);
    Ok(driver)
}

/// Replaces every editable field of a driver.
#[instrument(skip(db, form))]
pub async fn update_driver(
    db: &DatabaseConnection,
    id: i64,
    form: DriverForm,
) -> Result<driver::Model> {
    let form = form.clean()?;
    let existing = require_driver(db, id).await?;
    check_driver_constraints(db, &form, Some(id)).await?;

    let mut model: driver::ActiveModel = existing.into();
    form.apply(&mut model);
    model.update(db).await.map_err(Into::into)
}

/// Deletes a driver. Crews they lead and expenses they submitted go with them.
#[instrument(skip(db))]
pub async fn delete_driver(db: &DatabaseConnection, id: i64) -> Result<()> {
    let result = Driver::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("Driver", id));
    }
    info!("Deleted driver {}", id);
    Ok(())
}

/// The driver's name from their account.
pub async fn driver_name(db: &DatabaseConnection, driver: &driver::Model) -> Result<String> {
    Ok(account::require_user(db, driver.user_id).await?.full_name())
}

/// `"{driver_id} - {user full name}"`
pub async fn driver_display(db: &DatabaseConnection, driver: &driver::Model) -> Result<String> {
    Ok(format!(
        "{} - {}",
        driver.driver_id,
        driver_name(db, driver).await?
    ))
}
