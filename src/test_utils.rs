//! Shared test utilities for the relocation desk.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test records with sensible defaults.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use crate::{
    core::{
        account::{self, UserForm},
        assignment::{self, AssignmentForm},
        client::{self, ClientForm, DEFAULT_COUNTRY},
        crew::{self, CrewForm},
        driver::{self, DriverForm},
        property::{self, PropertyForm},
        quote::QuoteForm,
        relocation::{self, RequestForm},
        vehicle::{self, VehicleForm},
    },
    entities::{
        self,
        client::ClientType,
        property::PropertyType,
        vehicle::{VehicleStatus, VehicleType},
    },
    errors::Result,
};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Calendar date shorthand.
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
}

/// UTC timestamp on the hour.
pub fn datetime(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, 0, 0).unwrap()
}

/// Account form named "Test {username}".
pub fn user_form(username: &str) -> UserForm {
    UserForm {
        username: username.to_string(),
        first_name: "Test".to_string(),
        last_name: username.to_string(),
        email: format!("{username}@example.com"),
        is_staff: false,
        is_active: true,
    }
}

/// Creates an account with [`user_form`] defaults.
pub async fn create_test_user(
    db: &DatabaseConnection,
    username: &str,
) -> Result<entities::user::Model> {
    account::create_user(db, user_form(username)).await
}

/// Individual client "Jane Doe" in Springfield.
pub fn client_form(client_id: &str) -> ClientForm {
    ClientForm {
        user_id: None,
        client_id: client_id.to_string(),
        client_type: ClientType::Individual,
        first_name: "Jane".to_string(),
        last_name: "Doe".to_string(),
        company_name: None,
        email: "jane.doe@example.com".to_string(),
        phone: "+15551234567".to_string(),
        address: "12 Elm Street".to_string(),
        city: "Springfield".to_string(),
        state: "IL".to_string(),
        zip_code: "62701".to_string(),
        country: DEFAULT_COUNTRY.to_string(),
        is_active: true,
    }
}

/// Creates a client with [`client_form`] defaults.
pub async fn create_test_client(
    db: &DatabaseConnection,
    client_id: &str,
) -> Result<entities::client::Model> {
    client::create_client(db, client_form(client_id)).await
}

/// House at the client's address.
pub fn property_form(owner_id: i64, property_id: &str) -> PropertyForm {
    PropertyForm {
        property_id: property_id.to_string(),
        owner_id,
        property_type: PropertyType::House,
        address: "12 Elm Street".to_string(),
        city: "Springfield".to_string(),
        state: "IL".to_string(),
        zip_code: "62701".to_string(),
        country: DEFAULT_COUNTRY.to_string(),
        bedrooms: Some(3),
        bathrooms: Some(2.0),
        square_feet: Some(1800),
        floor_number: None,
        has_elevator: false,
        has_parking: true,
        has_storage: false,
        access_instructions: String::new(),
        key_location: String::new(),
        contact_person: String::new(),
        contact_phone: String::new(),
        is_active: true,
    }
}

/// Creates a property with [`property_form`] defaults.
pub async fn create_test_property(
    db: &DatabaseConnection,
    owner_id: i64,
    property_id: &str,
) -> Result<entities::property::Model> {
    property::create_property(db, property_form(owner_id, property_id)).await
}

/// Local move with every optional field left at its default.
pub fn request_form(client_id: i64, origin_property_id: i64, request_id: &str) -> RequestForm {
    RequestForm {
        request_id: request_id.to_string(),
        client_id,
        origin_property_id,
        destination_property_id: None,
        destination_address: String::new(),
        destination_city: String::new(),
        destination_state: String::new(),
        destination_zip: String::new(),
        destination_country: String::new(),
        relocation_type: Default::default(),
        status: Default::default(),
        priority: Default::default(),
        preferred_date: date(2024, 5, 1),
        alternative_date: None,
        scheduled_date: None,
        actual_start_date: None,
        actual_completion_date: None,
        requires_packing: false,
        requires_unpacking: false,
        requires_storage: false,
        requires_insurance: true,
        requires_cleaning: false,
        estimated_cost: None,
        actual_cost: None,
        special_instructions: String::new(),
        notes: String::new(),
        assigned_to_id: None,
    }
}

/// Creates a request with [`request_form`] defaults.
pub async fn create_test_request(
    db: &DatabaseConnection,
    client_id: i64,
    origin_property_id: i64,
    request_id: &str,
) -> Result<entities::relocation_request::Model> {
    relocation::create_request(db, request_form(client_id, origin_property_id, request_id)).await
}

/// Client `CL-0001`, property `PR-0001` and request `RR-0001` in one go.
pub async fn create_request_fixture(
    db: &DatabaseConnection,
) -> Result<entities::relocation_request::Model> {
    let client = create_test_client(db, "CL-0001").await?;
    let origin = create_test_property(db, client.id, "PR-0001").await?;
    create_test_request(db, client.id, origin.id, "RR-0001").await
}

/// Draft quote with a base cost of 1000 and nothing else.
pub fn quote_form(relocation_request_id: i64, quote_number: &str) -> QuoteForm {
    QuoteForm {
        relocation_request_id,
        quote_number: quote_number.to_string(),
        status: Default::default(),
        base_cost: 1000.0,
        packing_cost: 0.0,
        transportation_cost: 0.0,
        insurance_cost: 0.0,
        storage_cost: 0.0,
        additional_services_cost: 0.0,
        tax_amount: 0.0,
        valid_until: date(2024, 6, 1),
        terms_and_conditions: "Payment due on delivery.".to_string(),
        date_sent: None,
        date_responded: None,
    }
}

/// Ford Transit van.
pub fn vehicle_form(vehicle_id: &str, license_plate: &str) -> VehicleForm {
    VehicleForm {
        vehicle_id: vehicle_id.to_string(),
        vehicle_type: VehicleType::Van,
        make: "Ford".to_string(),
        model: "Transit".to_string(),
        year: 2020,
        license_plate: license_plate.to_string(),
        max_weight_kg: 1500,
        max_volume_cubic_meters: 12.5,
        status: VehicleStatus::Available,
        last_service_date: None,
        next_service_date: None,
        mileage: 0,
        insurance_expiry: date(2026, 1, 1),
        registration_expiry: date(2026, 1, 1),
        is_active: true,
    }
}

/// Creates a vehicle with [`vehicle_form`] defaults.
pub async fn create_test_vehicle(
    db: &DatabaseConnection,
    vehicle_id: &str,
    license_plate: &str,
) -> Result<entities::vehicle::Model> {
    vehicle::create_vehicle(db, vehicle_form(vehicle_id, license_plate)).await
}

/// Driver form on an existing account.
pub fn driver_form(user_id: i64, driver_id: &str, license_number: &str) -> DriverForm {
    DriverForm {
        user_id,
        driver_id: driver_id.to_string(),
        phone: "+15557654321".to_string(),
        emergency_contact_name: "Pat Doe".to_string(),
        emergency_contact_phone: "5551112222".to_string(),
        license_number: license_number.to_string(),
        license_expiry: date(2027, 1, 1),
        cdl_class: String::new(),
        hire_date: date(2020, 3, 15),
        status: Default::default(),
        hourly_rate: 25.0,
        total_moves: 0,
        average_rating: None,
        is_active: true,
    }
}

/// Creates an account `username` and a driver on it, licence `LIC-{driver_id}`.
pub async fn create_test_driver(
    db: &DatabaseConnection,
    username: &str,
    driver_id: &str,
) -> Result<entities::driver::Model> {
    let user = create_test_user(db, username).await?;
    driver::create_driver(
        db,
        driver_form(user.id, driver_id, &format!("LIC-{driver_id}")),
    )
    .await
}

/// Crew with no members or vehicles.
pub fn crew_form(crew_id: &str, crew_leader_id: i64) -> CrewForm {
    CrewForm {
        crew_id: crew_id.to_string(),
        crew_leader_id,
        members: Vec::new(),
        vehicles: Vec::new(),
        max_capacity_kg: 5000,
        is_active: true,
    }
}

/// Creates a crew led by a fresh driver `DR-{crew_id}` on account `lead-{crew_id}`.
pub async fn create_test_crew(
    db: &DatabaseConnection,
    crew_id: &str,
) -> Result<entities::moving_crew::Model> {
    let leader = create_test_driver(db, &format!("lead-{crew_id}"), &format!("DR-{crew_id}")).await?;
    crew::create_crew(db, crew_form(crew_id, leader.id)).await
}

/// Scheduled one-day assignment.
pub fn assignment_form(relocation_request_id: i64, crew_id: i64) -> AssignmentForm {
    AssignmentForm {
        relocation_request_id,
        crew_id,
        status: Default::default(),
        scheduled_start_date: datetime(2024, 5, 1, 8),
        scheduled_end_date: datetime(2024, 5, 1, 18),
        actual_start_date: None,
        actual_end_date: None,
        estimated_distance_km: Some(42.0),
        actual_distance_km: None,
        estimated_duration_hours: Some(10.0),
        actual_duration_hours: None,
        requires_special_equipment: false,
        special_equipment_notes: String::new(),
        notes: String::new(),
    }
}

/// Records created by [`setup_assignment`]
pub struct AssignmentFixture {
    /// Request `RR-0001`
    pub request: entities::relocation_request::Model,
    /// Crew `CR-01`
    pub crew: entities::moving_crew::Model,
    /// The assignment binding them
    pub assignment: entities::moving_assignment::Model,
}

/// Request `RR-0001` assigned to crew `CR-01`.
pub async fn setup_assignment(db: &DatabaseConnection) -> Result<AssignmentFixture> {
    let request = create_request_fixture(db).await?;
    let crew = create_test_crew(db, "CR-01").await?;
    let assignment =
        assignment::create_assignment(db, assignment_form(request.id, crew.id)).await?;
    Ok(AssignmentFixture {
        request,
        crew,
        assignment,
    })
}
