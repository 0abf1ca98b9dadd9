//! Moving assignment business logic - a crew bound to a request.

use crate::{
    core::{
        crew, relocation,
        validation::{ensure_unique, min_amount},
    },
    entities::{
        MovingAssignment,
        moving_assignment::{self, AssignmentStatus},
    },
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Deserialize;
use tracing::{info, instrument};

/// Editable fields of an assignment
#[derive(Debug, Clone, Deserialize)]
pub struct AssignmentForm {
    /// Request being carried out, one assignment per request
    pub relocation_request_id: i64,
    /// Crew doing the move
    pub crew_id: i64,
    /// Progress
    #[serde(default)]
    pub status: AssignmentStatus,
    /// Planned start
    pub scheduled_start_date: DateTime<Utc>,
    /// Planned end
    pub scheduled_end_date: DateTime<Utc>,
    /// Actual start
    #[serde(default)]
    pub actual_start_date: Option<DateTime<Utc>>,
    /// Actual end
    #[serde(default)]
    pub actual_end_date: Option<DateTime<Utc>>,
    /// Planned route length
    #[serde(default)]
    pub estimated_distance_km: Option<f64>,
    /// Driven route length
    #[serde(default)]
    pub actual_distance_km: Option<f64>,
    /// Planned duration
    #[serde(default)]
    pub estimated_duration_hours: Option<f64>,
    /// Actual duration
    #[serde(default)]
    pub actual_duration_hours: Option<f64>,
    /// Needs special equipment
    #[serde(default)]
    pub requires_special_equipment: bool,
    /// Which equipment
    #[serde(default)]
    pub special_equipment_notes: String,
    /// Notes
    #[serde(default)]
    pub notes: String,
}

impl AssignmentForm {
    fn clean(self) -> Result<Self> {
        for (field, value) in [
            ("estimated_distance_km", self.estimated_distance_km),
            ("actual_distance_km", self.actual_distance_km),
            ("estimated_duration_hours", self.estimated_duration_hours),
            ("actual_duration_hours", self.actual_duration_hours),
        ] {
            if let Some(value) = value {
                min_amount(field, value, 0.0)?;
            }
        }
        Ok(self)
    }

    fn apply(self, model: &mut moving_assignment::ActiveModel) {
        model.relocation_request_id = Set(self.relocation_request_id);
        model.crew_id = Set(self.crew_id);
        model.status = Set(self.status);
        model.scheduled_start_date = Set(self.scheduled_start_date);
        model.scheduled_end_date = Set(self.scheduled_end_date);
        model.actual_start_date = Set(self.actual_start_date);
        model.actual_end_date = Set(self.actual_end_date);
        model.estimated_distance_km = Set(self.estimated_distance_km);
        model.actual_distance_km = Set(self.actual_distance_km);
        model.estimated_duration_hours = Set(self.estimated_duration_hours);
        model.actual_duration_hours = Set(self.actual_duration_hours);
        model.requires_special_equipment = Set(self.requires_special_equipment);
        model.special_equipment_notes = Set(self.special_equipment_notes);
        model.notes = Set(self.notes);
    }
}

async fn check_assignment_constraints(
    db: &DatabaseConnection,
    form: &AssignmentForm,
    exclude: Option<i64>,
) -> Result<()> {
    let request = relocation::require_request(db, form.relocation_request_id).await?;
    crew::require_crew(db, form.crew_id).await?;

    let mut query = MovingAssignment::find().filter(
        moving_assignment::Column::RelocationRequestId.eq(form.relocation_request_id),
    );
    if let Some(id) = exclude {
        query = query.filter(moving_assignment::Column::Id.ne(id));
    }
    ensure_unique(
        db,
        query,
        "Moving assignment",
        "relocation_request",
        &request.request_id,
    )
    .await
}

/// Finds an assignment by primary key.
pub async fn get_assignment_by_id(
    db: &DatabaseConnection,
    id: i64,
) -> Result<Option<moving_assignment::Model>> {
    MovingAssignment::find_by_id(id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds an assignment by primary key, failing if it does not exist.
pub async fn require_assignment(
    db: &DatabaseConnection,
    id: i64,
) -> Result<moving_assignment::Model> {
    get_assignment_by_id(db, id)
        .await?
        .ok_or_else(|| Error::not_found("Moving assignment", id))
}

/// The assignment carrying out a request, if one exists.
pub async fn get_assignment_for_request(
    db: &DatabaseConnection,
    request_id: i64,
) -> Result<Option<moving_assignment::Model>> {
    MovingAssignment::find()
        .filter(moving_assignment::Column::RelocationRequestId.eq(request_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// A crew's assignments, latest scheduled start first.
pub async fn get_assignments_for_crew(
    db: &DatabaseConnection,
    crew_id: i64,
) -> Result<Vec<moving_assignment::Model>> {
    MovingAssignment::find()
        .filter(moving_assignment::Column::CrewId.eq(crew_id))
        .order_by_desc(moving_assignment::Column::ScheduledStartDate)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Assigns a crew to a request that has no assignment yet.
#[instrument(skip(db, form), fields(request = form.relocation_request_id, crew = form.crew_id))]
pub async fn create_assignment(
    db: &DatabaseConnection,
    form: AssignmentForm,
) -> Result<moving_assignment::Model> {
    let form = form.clean()?;
    check_assignment_constraints(db, &form, None).await?;

    let mut model = moving_assignment::ActiveModel {
        ..Default::default()
    };
    form.apply(&mut model);
    let assignment = model.insert(db).await?;
    info!("Created assignment {}", assignment.id);
    Ok(assignment)
}

/// Replaces every editable field of an assignment.
#[instrument(skip(db, form))]
pub async fn update_assignment(
    db: &DatabaseConnection,
    id: i64,
    form: AssignmentForm,
) -> Result<moving_assignment::Model> {
    let form = form.clean()?;
    let existing = require_assignment(db, id).await?;
    check_assignment_constraints(db, &form, Some(id)).await?;

    let mut model: moving_assignment::ActiveModel = existing.into();
    form.apply(&mut model);
    model.update(db).await.map_err(Into::into)
}

/// Deletes an assignment with its transfers and expenses.
#[instrument(skip(db))]
pub async fn delete_assignment(db: &DatabaseConnection, id: i64) -> Result<()> {
    let result = MovingAssignment::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("Moving assignment", id));
    }
    info!("Deleted assignment {}", id);
    Ok(())
}

/// `"Assignment {request_id} - Crew {crew_id}"`
pub async fn assignment_display(
    db: &DatabaseConnection,
    assignment: &moving_assignment::Model,
) -> Result<String> {
    let request = relocation::require_request(db, assignment.relocation_request_id).await?;
    let crew = crew::require_crew(db, assignment.crew_id).await?;
    Ok(format!(
        "Assignment {} - Crew {}",
        request.request_id, crew.crew_id
    ))
}
