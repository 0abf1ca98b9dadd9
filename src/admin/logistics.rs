use super::{
    Detail, Fieldset, Inline, ListQuery, ModelAdmin, label, matches_term, money, optional,
    optional_date, optional_stamp, search_any, stamp, yes_no,
};
use crate::{
    core::{
        account,
        assignment::{self, AssignmentForm},
        crew::{self, CrewForm},
        driver::{self, DriverForm},
        expense::{self, ExpenseForm},
        relocation,
        transfer::{self, TransferForm},
        vehicle::{self, VehicleForm},
    },
    entities::{
        Driver, InventoryTransfer, MovingAssignment, MovingCrew, MovingExpense, Vehicle,
        driver::{self as driver_entity, DriverStatus},
        inventory_transfer::{self, TransferStatus},
        moving_assignment::{self, AssignmentStatus},
        moving_crew,
        moving_expense::{self, ExpenseType},
        relocation_request, user,
        vehicle::{self as vehicle_entity, VehicleStatus, VehicleType},
    },
    errors::Result,
};
use async_trait::async_trait;
use sea_orm::{Condition, JoinType, QueryOrder, QuerySelect, prelude::*};

/// The fleet
pub struct VehicleAdmin;

#[async_trait]
impl ModelAdmin for VehicleAdmin {
    type Model = vehicle_entity::Model;
    type Form = VehicleForm;

    const VERBOSE_NAME: &'static str = "Vehicle";
    const LIST_DISPLAY: &'static [&'static str] = &[
        "vehicle_id",
        "vehicle_type",
        "make",
        "model",
        "year",
        "license_plate",
        "status",
        "max_weight_kg",
    ];
    const SEARCH_FIELDS: &'static [&'static str] = &["vehicle_id", "license_plate", "make", "model"];
    const LIST_FILTER: &'static [&'static str] = &["vehicle_type", "status", "make", "year"];

    fn id(model: &vehicle_entity::Model) -> i64 {
        model.id
    }

    async fn get(db: &DatabaseConnection, id: i64) -> Result<vehicle_entity::Model> {
        vehicle::require_vehicle(db, id).await
    }

    async fn list(
        db: &DatabaseConnection,
        query: &ListQuery,
        limit: u64,
    ) -> Result<Vec<vehicle_entity::Model>> {
        query.check_filters(Self::LIST_FILTER)?;
        let mut select = Vehicle::find();
        if let Some(term) = query.term() {
            select = select.filter(search_any(
                &[
                    vehicle_entity::Column::VehicleId,
                    vehicle_entity::Column::LicensePlate,
                    vehicle_entity::Column::Make,
                    vehicle_entity::Column::ModelName,
                ],
                term,
            ));
        }
        if let Some(kind) = query.choice::<VehicleType>("vehicle_type")? {
            select = select.filter(vehicle_entity::Column::VehicleType.eq(kind));
        }
        if let Some(status) = query.choice::<VehicleStatus>("status")? {
            select = select.filter(vehicle_entity::Column::Status.eq(status));
        }
        if let Some(make) = query.text("make") {
            select = select.filter(vehicle_entity::Column::Make.eq(make));
        }
        if let Some(year) = query.number("year")? {
            select = select.filter(vehicle_entity::Column::Year.eq(year));
        }
        Ok(select
            .order_by_asc(vehicle_entity::Column::VehicleId)
            .limit(limit)
            .all(db)
            .await?)
    }

    async fn row(_db: &DatabaseConnection, model: &vehicle_entity::Model) -> Result<Vec<String>> {
        Ok(vec![
            model.vehicle_id.clone(),
            label(model.vehicle_type),
            model.make.clone(),
            model.model_name.clone(),
            model.year.to_string(),
            model.license_plate.clone(),
            label(model.status),
            model.max_weight_kg.to_string(),
        ])
    }

    async fn detail(_db: &DatabaseConnection, model: &vehicle_entity::Model) -> Result<Detail> {
        Ok(Detail {
            title: model.to_string(),
            fieldsets: vec![
                Fieldset::new("Vehicle Information")
                    .field("vehicle_id", &model.vehicle_id)
                    .field("vehicle_type", label(model.vehicle_type))
                    .field("make", &model.make)
                    .field("model", &model.model_name)
                    .field("year", model.year.to_string())
                    .field("license_plate", &model.license_plate),
                Fieldset::new("Capacity")
                    .field("max_weight_kg", model.max_weight_kg.to_string())
                    .field(
                        "max_volume_cubic_meters",
                        format!("{:.2}", model.max_volume_cubic_meters),
                    ),
                Fieldset::new("Status & Maintenance")
                    .field("status", label(model.status))
                    .field("mileage", model.mileage.to_string())
                    .field("last_service_date", optional_date(model.last_service_date))
                    .field("next_service_date", optional_date(model.next_service_date)),
                Fieldset::new("Documentation")
                    .field("insurance_expiry", model.insurance_expiry.to_string())
                    .field("registration_expiry", model.registration_expiry.to_string()),
                Fieldset::new("System")
                    .field("is_active", yes_no(model.is_active))
                    .field("date_created", stamp(model.date_created)),
            ],
            inlines: Vec::new(),
        })
    }

    async fn create(db: &DatabaseConnection, form: VehicleForm) -> Result<vehicle_entity::Model> {
        vehicle::create_vehicle(db, form).await
    }

    async fn update(
        db: &DatabaseConnection,
        id: i64,
        form: VehicleForm,
    ) -> Result<vehicle_entity::Model> {
        vehicle::update_vehicle(db, id, form).await
    }

    async fn delete(db: &DatabaseConnection, id: i64) -> Result<()> {
        vehicle::delete_vehicle(db, id).await
    }
}

/// Drivers and movers
pub struct DriverAdmin;

#[async_trait]
impl ModelAdmin for DriverAdmin {
    type Model = driver_entity::Model;
    type Form = DriverForm;

    const VERBOSE_NAME: &'static str = "Driver";
    const LIST_DISPLAY: &'static [&'static str] = &[
        "driver_id",
        "user",
        "phone",
        "license_number",
        "status",
        "total_moves",
        "average_rating",
    ];
    const SEARCH_FIELDS: &'static [&'static str] = &[
        "driver_id",
        "user__first_name",
        "user__last_name",
        "license_number",
        "phone",
    ];
    const LIST_FILTER: &'static [&'static str] = &["status", "is_active"];

    fn id(model: &driver_entity::Model) -> i64 {
        model.id
    }

    async fn get(db: &DatabaseConnection, id: i64) -> Result<driver_entity::Model> {
        driver::require_driver(db, id).await
    }

    async fn list(
        db: &DatabaseConnection,
        query: &ListQuery,
        limit: u64,
    ) -> Result<Vec<driver_entity::Model>> {
        query.check_filters(Self::LIST_FILTER)?;
        let mut select =
            Driver::find().join(JoinType::InnerJoin, driver_entity::Relation::User.def());
        if let Some(term) = query.term() {
            select = select.filter(
                Condition::any()
                    .add(search_any(
                        &[
                            driver_entity::Column::DriverId,
                            driver_entity::Column::LicenseNumber,
                            driver_entity::Column::Phone,
                        ],
                        term,
                    ))
                    .add(search_any(
                        &[user::Column::FirstName, user::Column::LastName],
                        term,
                    )),
            );
        }
        if let Some(status) = query.choice::<DriverStatus>("status")? {
            select = select.filter(driver_entity::Column::Status.eq(status));
        }
        if let Some(active) = query.flag("is_active")? {
            select = select.filter(driver_entity::Column::IsActive.eq(active));
        }
        Ok(select
            .order_by_asc(driver_entity::Column::DriverId)
            .limit(limit)
            .all(db)
            .await?)
    }

    async fn row(db: &DatabaseConnection, model: &driver_entity::Model) -> Result<Vec<String>> {
        let account = account::require_user(db, model.user_id).await?;
        Ok(vec![
            model.driver_id.clone(),
            account.to_string(),
            model.phone.clone(),
            model.license_number.clone(),
            label(model.status),
            model.total_moves.to_string(),
            optional(model.average_rating.map(|r| format!("{r:.2}"))),
        ])
    }

    async fn detail(db: &DatabaseConnection, model: &driver_entity::Model) -> Result<Detail> {
        let account = account::require_user(db, model.user_id).await?;
        Ok(Detail {
            title: driver::driver_display(db, model).await?,
            fieldsets: vec![
                Fieldset::new("Basic Information")
                    .field("user", account.to_string())
                    .field("driver_id", &model.driver_id)
                    .field("phone", &model.phone)
                    .field("emergency_contact_name", &model.emergency_contact_name)
                    .field("emergency_contact_phone", &model.emergency_contact_phone),
                Fieldset::new("License Information")
                    .field("license_number", &model.license_number)
                    .field("license_expiry", model.license_expiry.to_string())
                    .field("cdl_class", &model.cdl_class),
                Fieldset::new("Employment")
                    .field("hire_date", model.hire_date.to_string())
                    .field("status", label(model.status))
                    .field("hourly_rate", money(model.hourly_rate)),
                Fieldset::new("Performance")
                    .field("total_moves", model.total_moves.to_string())
                    .field(
                        "average_rating",
                        optional(model.average_rating.map(|r| format!("{r:.2}"))),
                    ),
                Fieldset::new("System")
                    .field("is_active", yes_no(model.is_active))
                    .field("date_created", stamp(model.date_created)),
            ],
            inlines: Vec::new(),
        })
    }

    async fn create(db: &DatabaseConnection, form: DriverForm) -> Result<driver_entity::Model> {
        driver::create_driver(db, form).await
    }

    async fn update(
        db: &DatabaseConnection,
        id: i64,
        form: DriverForm,
    ) -> Result<driver_entity::Model> {
        driver::update_driver(db, id, form).await
    }

    async fn delete(db: &DatabaseConnection, id: i64) -> Result<()> {
        driver::delete_driver(db, id).await
    }
}

/// Crews with their members and vehicles
pub struct CrewAdmin;

#[async_trait]
impl ModelAdmin for CrewAdmin {
    type Model = moving_crew::Model;
    type Form = CrewForm;

    const VERBOSE_NAME: &'static str = "Moving crew";
    const LIST_DISPLAY: &'static [&'static str] =
        &["crew_id", "crew_leader", "max_capacity_kg", "is_active"];
    const SEARCH_FIELDS: &'static [&'static str] = &[
        "crew_id",
        "crew_leader__user__first_name",
        "crew_leader__user__last_name",
    ];
    const LIST_FILTER: &'static [&'static str] = &["is_active"];

    fn id(model: &moving_crew::Model) -> i64 {
        model.id
    }

    async fn get(db: &DatabaseConnection, id: i64) -> Result<moving_crew::Model> {
        crew::require_crew(db, id).await
    }

    async fn list(
        db: &DatabaseConnection,
        query: &ListQuery,
        limit: u64,
    ) -> Result<Vec<moving_crew::Model>> {
        query.check_filters(Self::LIST_FILTER)?;
        let mut select = MovingCrew::find()
            .join(JoinType::InnerJoin, moving_crew::Relation::CrewLeader.def())
            .join(JoinType::InnerJoin, driver_entity::Relation::User.def());
        if let Some(term) = query.term() {
            select = select.filter(
                Condition::any()
                    .add(matches_term(moving_crew::Column::CrewId, term))
                    .add(search_any(
                        &[user::Column::FirstName, user::Column::LastName],
                        term,
                    )),
            );
        }
        if let Some(active) = query.flag("is_active")? {
            select = select.filter(moving_crew::Column::IsActive.eq(active));
        }
        Ok(select
            .order_by_asc(moving_crew::Column::CrewId)
            .limit(limit)
            .all(db)
            .await?)
    }

    async fn row(db: &DatabaseConnection, model: &moving_crew::Model) -> Result<Vec<String>> {
        let leader = driver::require_driver(db, model.crew_leader_id).await?;
        Ok(vec![
            model.crew_id.clone(),
            driver::driver_display(db, &leader).await?,
            model.max_capacity_kg.to_string(),
            yes_no(model.is_active),
        ])
    }

    async fn detail(db: &DatabaseConnection, model: &moving_crew::Model) -> Result<Detail> {
        let leader = driver::require_driver(db, model.crew_leader_id).await?;
        let members = crew::members_of(db, model.id).await?;
        let vehicles = crew::vehicles_of(db, model.id).await?;
        Ok(Detail {
            title: crew::crew_display(db, model).await?,
            fieldsets: vec![
                Fieldset::new("Crew")
                    .field("crew_id", &model.crew_id)
                    .field("crew_leader", driver::driver_display(db, &leader).await?)
                    .field("max_capacity_kg", model.max_capacity_kg.to_string())
                    .field("is_active", yes_no(model.is_active))
                    .field("date_created", stamp(model.date_created)),
            ],
            inlines: vec![
                Inline {
                    name: "Members",
                    table: DriverAdmin::table(db, &members).await?,
                },
                Inline {
                    name: "Vehicles",
                    table: VehicleAdmin::table(db, &vehicles).await?,
                },
            ],
        })
    }

    async fn create(db: &DatabaseConnection, form: CrewForm) -> Result<moving_crew::Model> {
        crew::create_crew(db, form).await
    }

    async fn update(db: &DatabaseConnection, id: i64, form: CrewForm) -> Result<moving_crew::Model> {
        crew::update_crew(db, id, form).await
    }

    async fn delete(db: &DatabaseConnection, id: i64) -> Result<()> {
        crew::delete_crew(db, id).await
    }
}

/// Crews bound to requests
pub struct AssignmentAdmin;

#[async_trait]
impl ModelAdmin for AssignmentAdmin {
    type Model = moving_assignment::Model;
    type Form = AssignmentForm;

    const VERBOSE_NAME: &'static str = "Moving assignment";
    const LIST_DISPLAY: &'static [&'static str] = &[
        "relocation_request",
        "crew",
        "status",
        "scheduled_start_date",
        "actual_start_date",
    ];
    const SEARCH_FIELDS: &'static [&'static str] =
        &["relocation_request__request_id", "crew__crew_id"];
    const LIST_FILTER: &'static [&'static str] = &["status", "requires_special_equipment"];

    fn id(model: &moving_assignment::Model) -> i64 {
        model.id
    }

    async fn get(db: &DatabaseConnection, id: i64) -> Result<moving_assignment::Model> {
        assignment::require_assignment(db, id).await
    }

    async fn list(
        db: &DatabaseConnection,
        query: &ListQuery,
        limit: u64,
    ) -> Result<Vec<moving_assignment::Model>> {
        query.check_filters(Self::LIST_FILTER)?;
        let mut select = MovingAssignment::find()
            .join(
                JoinType::InnerJoin,
                moving_assignment::Relation::RelocationRequest.def(),
            )
            .join(JoinType::InnerJoin, moving_assignment::Relation::Crew.def());
        if let Some(term) = query.term() {
            select = select.filter(
                Condition::any()
                    .add(matches_term(relocation_request::Column::RequestId, term))
                    .add(matches_term(moving_crew::Column::CrewId, term)),
            );
        }
        if let Some(status) = query.choice::<AssignmentStatus>("status")? {
            select = select.filter(moving_assignment::Column::Status.eq(status));
        }
        if let Some(special) = query.flag("requires_special_equipment")? {
            select = select.filter(moving_assignment::Column::RequiresSpecialEquipment.eq(special));
        }
        Ok(select
            .order_by_desc(moving_assignment::Column::ScheduledStartDate)
            .order_by_desc(moving_assignment::Column::Id)
            .limit(limit)
            .all(db)
            .await?)
    }

    async fn row(db: &DatabaseConnection, model: &moving_assignment::Model) -> Result<Vec<String>> {
        let request = relocation::require_request(db, model.relocation_request_id).await?;
        let team = crew::require_crew(db, model.crew_id).await?;
        Ok(vec![
            relocation::request_display(db, &request).await?,
            crew::crew_display(db, &team).await?,
            label(model.status),
            stamp(model.scheduled_start_date),
            optional_stamp(model.actual_start_date),
        ])
    }

    async fn detail(db: &DatabaseConnection, model: &moving_assignment::Model) -> Result<Detail> {
        let request = relocation::require_request(db, model.relocation_request_id).await?;
        let team = crew::require_crew(db, model.crew_id).await?;
        let transfers = transfer::get_transfers_for_assignment(db, model.id).await?;
        let expenses = expense::get_expenses_for_assignment(db, model.id).await?;
        let measure = |value: Option<f64>| optional(value.map(|v| format!("{v:.2}")));
        Ok(Detail {
            title: assignment::assignment_display(db, model).await?,
            fieldsets: vec![
                Fieldset::new("Assignment Information")
                    .field(
                        "relocation_request",
                        relocation::request_display(db, &request).await?,
                    )
                    .field("crew", crew::crew_display(db, &team).await?)
                    .field("status", label(model.status)),
                Fieldset::new("Scheduling")
                    .field("scheduled_start_date", stamp(model.scheduled_start_date))
                    .field("scheduled_end_date", stamp(model.scheduled_end_date))
                    .field("actual_start_date", optional_stamp(model.actual_start_date))
                    .field("actual_end_date", optional_stamp(model.actual_end_date)),
                Fieldset::new("Route Information")
                    .field("estimated_distance_km", measure(model.estimated_distance_km))
                    .field("actual_distance_km", measure(model.actual_distance_km))
                    .field(
                        "estimated_duration_hours",
                        measure(model.estimated_duration_hours),
                    )
                    .field("actual_duration_hours", measure(model.actual_duration_hours)),
                Fieldset::new("Special Requirements")
                    .field(
                        "requires_special_equipment",
                        yes_no(model.requires_special_equipment),
                    )
                    .field("special_equipment_notes", &model.special_equipment_notes),
                Fieldset::new("Additional Information")
                    .field("notes", &model.notes)
                    .field("date_created", stamp(model.date_created))
                    .field("date_updated", stamp(model.date_updated)),
            ],
            inlines: vec![
                Inline {
                    name: "Inventory transfers",
                    table: TransferAdmin::table(db, &transfers).await?,
                },
                Inline {
                    name: "Moving expenses",
                    table: ExpenseAdmin::table(db, &expenses).await?,
                },
            ],
        })
    }

    async fn create(
        db: &DatabaseConnection,
        form: AssignmentForm,
    ) -> Result<moving_assignment::Model> {
        assignment::create_assignment(db, form).await
    }

    async fn update(
        db: &DatabaseConnection,
        id: i64,
        form: AssignmentForm,
    ) -> Result<moving_assignment::Model> {
        assignment::update_assignment(db, id, form).await
    }

    async fn delete(db: &DatabaseConnection, id: i64) -> Result<()> {
        assignment::delete_assignment(db, id).await
    }
}

/// Items tracked through a move
pub struct TransferAdmin;

#[async_trait]
impl ModelAdmin for TransferAdmin {
    type Model = inventory_transfer::Model;
    type Form = TransferForm;

    const VERBOSE_NAME: &'static str = "Inventory transfer";
    const LIST_DISPLAY: &'static [&'static str] = &[
        "assignment",
        "item_name",
        "room_from",
        "room_to",
        "status",
        "is_fragile",
        "damage_reported",
    ];
    const SEARCH_FIELDS: &'static [&'static str] = &[
        "assignment__relocation_request__request_id",
        "item_name",
        "room_from",
        "room_to",
    ];
    const LIST_FILTER: &'static [&'static str] = &[
        "status",
        "is_fragile",
        "requires_disassembly",
        "damage_reported",
    ];

    fn id(model: &inventory_transfer::Model) -> i64 {
        model.id
    }

    async fn get(db: &DatabaseConnection, id: i64) -> Result<inventory_transfer::Model> {
        transfer::require_transfer(db, id).await
    }

    async fn list(
        db: &DatabaseConnection,
        query: &ListQuery,
        limit: u64,
    ) -> Result<Vec<inventory_transfer::Model>> {
        query.check_filters(Self::LIST_FILTER)?;
        let mut select = InventoryTransfer::find()
            .join(JoinType::InnerJoin, inventory_transfer::Relation::Assignment.def())
            .join(
                JoinType::InnerJoin,
                moving_assignment::Relation::RelocationRequest.def(),
            );
        if let Some(term) = query.term() {
            select = select.filter(
                Condition::any()
                    .add(matches_term(relocation_request::Column::RequestId, term))
                    .add(search_any(
                        &[
                            inventory_transfer::Column::ItemName,
                            inventory_transfer::Column::RoomFrom,
                            inventory_transfer::Column::RoomTo,
                        ],
                        term,
                    )),
            );
        }
        if let Some(status) = query.choice::<TransferStatus>("status")? {
            select = select.filter(inventory_transfer::Column::Status.eq(status));
        }
        if let Some(fragile) = query.flag("is_fragile")? {
            select = select.filter(inventory_transfer::Column::IsFragile.eq(fragile));
        }
        if let Some(disassembly) = query.flag("requires_disassembly")? {
            select = select.filter(inventory_transfer::Column::RequiresDisassembly.eq(disassembly));
        }
        if let Some(damage) = query.flag("damage_reported")? {
            select = select.filter(inventory_transfer::Column::DamageReported.eq(damage));
        }
        Ok(select
            .order_by_desc(inventory_transfer::Column::DateCreated)
            .order_by_desc(inventory_transfer::Column::Id)
            .limit(limit)
            .all(db)
            .await?)
    }

    async fn row(
        db: &DatabaseConnection,
        model: &inventory_transfer::Model,
    ) -> Result<Vec<String>> {
        let job = assignment::require_assignment(db, model.assignment_id).await?;
        Ok(vec![
            assignment::assignment_display(db, &job).await?,
            model.item_name.clone(),
            model.room_from.clone(),
            model.room_to.clone(),
            label(model.status),
            yes_no(model.is_fragile),
            yes_no(model.damage_reported),
        ])
    }

    async fn detail(
        db: &DatabaseConnection,
        model: &inventory_transfer::Model,
    ) -> Result<Detail> {
        let job = assignment::require_assignment(db, model.assignment_id).await?;
        let handler = match model.handled_by_id {
            Some(id) => {
                let mover = driver::require_driver(db, id).await?;
                Some(driver::driver_display(db, &mover).await?)
            }
            None => None,
        };
        Ok(Detail {
            title: transfer::transfer_display(db, model).await?,
            fieldsets: vec![
                Fieldset::new("Item")
                    .field("assignment", assignment::assignment_display(db, &job).await?)
                    .field("item_name", &model.item_name)
                    .field("description", &model.description)
                    .field("room_from", &model.room_from)
                    .field("room_to", &model.room_to)
                    .field(
                        "estimated_weight_kg",
                        optional(model.estimated_weight_kg.map(|w| format!("{w:.2}"))),
                    )
                    .field("dimensions", &model.dimensions)
                    .field("is_fragile", yes_no(model.is_fragile))
                    .field("requires_disassembly", yes_no(model.requires_disassembly)),
                Fieldset::new("Tracking")
                    .field("status", label(model.status))
                    .field("packed_datetime", optional_stamp(model.packed_datetime))
                    .field("loaded_datetime", optional_stamp(model.loaded_datetime))
                    .field("delivered_datetime", optional_stamp(model.delivered_datetime))
                    .field("handled_by", optional(handler)),
                Fieldset::new("Condition")
                    .field("condition_notes", &model.condition_notes)
                    .field("damage_reported", yes_no(model.damage_reported))
                    .field("damage_description", &model.damage_description)
                    .field("date_created", stamp(model.date_created)),
            ],
            inlines: Vec::new(),
        })
    }

    async fn create(
        db: &DatabaseConnection,
        form: TransferForm,
    ) -> Result<inventory_transfer::Model> {
        transfer::create_transfer(db, form).await
    }

    async fn update(
        db: &DatabaseConnection,
        id: i64,
        form: TransferForm,
    ) -> Result<inventory_transfer::Model> {
        transfer::update_transfer(db, id, form).await
    }

    async fn delete(db: &DatabaseConnection, id: i64) -> Result<()> {
        transfer::delete_transfer(db, id).await
    }
}

/// Costs claimed by drivers
pub struct ExpenseAdmin;

#[async_trait]
impl ModelAdmin for ExpenseAdmin {
    type Model = moving_expense::Model;
    type Form = ExpenseForm;

    const VERBOSE_NAME: &'static str = "Moving expense";
    const LIST_DISPLAY: &'static [&'static str] = &[
        "assignment",
        "expense_type",
        "amount",
        "date_incurred",
        "submitted_by",
        "is_approved",
    ];
    const SEARCH_FIELDS: &'static [&'static str] =
        &["assignment__relocation_request__request_id", "description"];
    const LIST_FILTER: &'static [&'static str] = &["expense_type", "is_approved"];

    fn id(model: &moving_expense::Model) -> i64 {
        model.id
    }

    async fn get(db: &DatabaseConnection, id: i64) -> Result<moving_expense::Model> {
        expense::require_expense(db, id).await
    }

    async fn list(
        db: &DatabaseConnection,
        query: &ListQuery,
        limit: u64,
    ) -> Result<Vec<moving_expense::Model>> {
        query.check_filters(Self::LIST_FILTER)?;
        let mut select = MovingExpense::find()
            .join(JoinType::InnerJoin, moving_expense::Relation::Assignment.def())
            .join(
                JoinType::InnerJoin,
                moving_assignment::Relation::RelocationRequest.def(),
            );
        if let Some(term) = query.term() {
            select = select.filter(
                Condition::any()
                    .add(matches_term(relocation_request::Column::RequestId, term))
                    .add(matches_term(moving_expense::Column::Description, term)),
            );
        }
        if let Some(kind) = query.choice::<ExpenseType>("expense_type")? {
            select = select.filter(moving_expense::Column::ExpenseType.eq(kind));
        }
        if let Some(approved) = query.flag("is_approved")? {
            select = select.filter(moving_expense::Column::IsApproved.eq(approved));
        }
        Ok(select
            .order_by_desc(moving_expense::Column::DateIncurred)
            .order_by_desc(moving_expense::Column::Id)
            .limit(limit)
            .all(db)
            .await?)
    }

    async fn row(db: &DatabaseConnection, model: &moving_expense::Model) -> Result<Vec<String>> {
        let job = assignment::require_assignment(db, model.assignment_id).await?;
        let submitter = driver::require_driver(db, model.submitted_by_id).await?;
        Ok(vec![
            assignment::assignment_display(db, &job).await?,
            label(model.expense_type),
            money(model.amount),
            model.date_incurred.to_string(),
            driver::driver_display(db, &submitter).await?,
            yes_no(model.is_approved),
        ])
    }

    async fn detail(db: &DatabaseConnection, model: &moving_expense::Model) -> Result<Detail> {
        let job = assignment::require_assignment(db, model.assignment_id).await?;
        let submitter = driver::require_driver(db, model.submitted_by_id).await?;
        let approver = match model.approved_by_id {
            Some(id) => account::get_user_by_id(db, id).await?,
            None => None,
        };
        Ok(Detail {
            title: expense::expense_display(db, model).await?,
            fieldsets: vec![
                Fieldset::new("Expense")
                    .field("assignment", assignment::assignment_display(db, &job).await?)
                    .field("expense_type", label(model.expense_type))
                    .field("amount", money(model.amount))
                    .field("description", &model.description)
                    .field("receipt_image", optional(model.receipt_image.as_deref()))
                    .field("date_incurred", model.date_incurred.to_string()),
                Fieldset::new("Approval")
                    .field(
                        "submitted_by",
                        driver::driver_display(db, &submitter).await?,
                    )
                    .field("is_approved", yes_no(model.is_approved))
                    .field("approved_by", optional(approver))
                    .field("date_created", stamp(model.date_created)),
            ],
            inlines: Vec::new(),
        })
    }

    async fn create(db: &DatabaseConnection, form: ExpenseForm) -> Result<moving_expense::Model> {
        expense::create_expense(db, form).await
    }

    async fn update(
        db: &DatabaseConnection,
        id: i64,
        form: ExpenseForm,
    ) -> Result<moving_expense::Model> {
        expense::update_expense(db, id, form).await
    }

    async fn delete(db: &DatabaseConnection, id: i64) -> Result<()> {
        expense::delete_expense(db, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_vehicle_search_and_filters() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_vehicle(&db, "VH-01", "ABC123").await?;
        let mut form = vehicle_form("VH-02", "XYZ789");
        form.vehicle_type = VehicleType::TruckLarge;
        form.make = "Volvo".to_string();
        form.model = "FH16".to_string();
        form.year = 2018;
        form.status = VehicleStatus::Maintenance;
        vehicle::create_vehicle(&db, form).await?;

        let by_model = VehicleAdmin::list(&db, &ListQuery::search("transit"), 10).await?;
        assert_eq!(by_model.len(), 1);
        assert_eq!(by_model[0].vehicle_id, "VH-01");

        let by_plate = VehicleAdmin::list(&db, &ListQuery::search("xyz"), 10).await?;
        assert_eq!(by_plate.len(), 1);
        assert_eq!(by_plate[0].vehicle_id, "VH-02");

        let query = ListQuery::default()
            .with_filter("make", "Volvo")
            .with_filter("year", "2018")
            .with_filter("status", "maintenance");
        assert_eq!(VehicleAdmin::list(&db, &query, 10).await?.len(), 1);

        let bad_year = ListQuery::default().with_filter("year", "recent");
        assert!(VehicleAdmin::list(&db, &bad_year, 10).await.is_err());

        let all = VehicleAdmin::list(&db, &ListQuery::default(), 10).await?;
        let table = VehicleAdmin::table(&db, &all).await?;
        assert_eq!(table.rows[0].cells[3], "Transit");
        assert_eq!(table.rows[1].cells[1], "Large Truck");
        Ok(())
    }

    #[tokio::test]
    async fn test_driver_search_by_user_name() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_driver(&db, "mike", "DR-01").await?;
        create_test_driver(&db, "sam", "DR-02").await?;

        let found = DriverAdmin::list(&db, &ListQuery::search("sam"), 10).await?;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].driver_id, "DR-02");

        let by_license = DriverAdmin::list(&db, &ListQuery::search("LIC-DR-01"), 10).await?;
        assert_eq!(by_license.len(), 1);

        let available = DriverAdmin::list(
            &db,
            &ListQuery::default().with_filter("status", "available"),
            10,
        )
        .await?;
        assert_eq!(available.len(), 2);
        assert_eq!(available[0].driver_id, "DR-01");
        Ok(())
    }

    #[tokio::test]
    async fn test_crew_search_by_leader_and_inlines() -> Result<()> {
        let db = setup_test_db().await?;
        let first = create_test_crew(&db, "CR-01").await?;
        create_test_crew(&db, "CR-02").await?;
        let van = create_test_vehicle(&db, "VH-01", "ABC123").await?;
        let helper = create_test_driver(&db, "helper", "DR-99").await?;
        crew::add_member(&db, first.id, helper.id).await?;
        crew::add_vehicle(&db, first.id, van.id).await?;

        let found = CrewAdmin::list(&db, &ListQuery::search("lead-CR-02"), 10).await?;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].crew_id, "CR-02");

        let detail = CrewAdmin::detail(&db, &first).await?;
        assert_eq!(detail.title, "Crew CR-01 - Leader: Test lead-CR-01");
        assert_eq!(detail.inlines[0].table.rows.len(), 1);
        assert_eq!(detail.inlines[0].table.rows[0].cells[0], "DR-99");
        assert_eq!(detail.inlines[1].table.rows[0].cells[0], "VH-01");
        Ok(())
    }

    #[tokio::test]
    async fn test_assignment_search_and_detail() -> Result<()> {
        let db = setup_test_db().await?;
        let fixture = setup_assignment(&db).await?;

        let by_crew = AssignmentAdmin::list(&db, &ListQuery::search("CR-01"), 10).await?;
        assert_eq!(by_crew.len(), 1);
        let by_request = AssignmentAdmin::list(&db, &ListQuery::search("RR-0001"), 10).await?;
        assert_eq!(by_request.len(), 1);
        assert!(
            AssignmentAdmin::list(&db, &ListQuery::search("RR-0002"), 10)
                .await?
                .is_empty()
        );

        let detail = AssignmentAdmin::detail(&db, &fixture.assignment).await?;
        assert_eq!(detail.title, "Assignment RR-0001 - Crew CR-01");
        assert_eq!(detail.fieldsets.len(), 5);
        assert_eq!(detail.inlines.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_transfer_and_expense_lists() -> Result<()> {
        let db = setup_test_db().await?;
        let fixture = setup_assignment(&db).await?;
        let transfer_form = |item: &str, damaged: bool| TransferForm {
            assignment_id: fixture.assignment.id,
            item_name: item.to_string(),
            description: String::new(),
            room_from: "Kitchen".to_string(),
            room_to: String::new(),
            estimated_weight_kg: None,
            dimensions: String::new(),
            is_fragile: false,
            requires_disassembly: false,
            status: TransferStatus::default(),
            packed_datetime: None,
            loaded_datetime: None,
            delivered_datetime: None,
            condition_notes: String::new(),
            damage_reported: damaged,
            damage_description: String::new(),
            handled_by_id: None,
        };
        transfer::create_transfer(&db, transfer_form("Fridge", false)).await?;
        transfer::create_transfer(&db, transfer_form("Vase", true)).await?;

        let by_request = TransferAdmin::list(&db, &ListQuery::search("RR-0001"), 10).await?;
        assert_eq!(by_request.len(), 2);
        let damaged = TransferAdmin::list(
            &db,
            &ListQuery::default().with_filter("damage_reported", "yes"),
            10,
        )
        .await?;
        assert_eq!(damaged.len(), 1);
        assert_eq!(damaged[0].item_name, "Vase");

        let fuel = expense::create_expense(
            &db,
            ExpenseForm {
                assignment_id: fixture.assignment.id,
                expense_type: ExpenseType::Fuel,
                amount: 85.5,
                description: "Diesel".to_string(),
                receipt_image: None,
                date_incurred: date(2024, 5, 1),
                submitted_by_id: fixture.crew.crew_leader_id,
                is_approved: false,
                approved_by_id: None,
            },
        )
        .await?;
        let pending = ExpenseAdmin::list(
            &db,
            &ListQuery::default().with_filter("is_approved", "no"),
            10,
        )
        .await?;
        assert_eq!(pending.len(), 1);
        let row = ExpenseAdmin::row(&db, &fuel).await?;
        assert_eq!(row[2], "85.50");
        assert_eq!(row[4], "DR-CR-01 - Test lead-CR-01");

        let detail = AssignmentAdmin::detail(&db, &fixture.assignment).await?;
        assert_eq!(detail.inlines[0].table.rows.len(), 2);
        assert_eq!(detail.inlines[1].table.rows.len(), 1);
        Ok(())
    }
}
