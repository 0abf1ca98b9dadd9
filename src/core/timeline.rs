//! Relocation timeline business logic - milestones of a move.

use crate::{
    core::{
        account, relocation,
        validation::required,
    },
    entities::{
        Choice, RelocationTimeline,
        relocation_timeline::{self, MilestoneType},
    },
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, Select, Set, prelude::*};
use serde::Deserialize;
use tracing::{info, instrument};

/// Editable fields of a milestone
#[derive(Debug, Clone, Deserialize)]
pub struct TimelineForm {
    /// Request the milestone belongs to
    pub relocation_request_id: i64,
    /// Which milestone
    pub milestone_type: MilestoneType,
    /// Short description
    pub description: String,
    /// Planned time
    #[serde(default)]
    pub scheduled_datetime: Option<DateTime<Utc>>,
    /// Actual time
    #[serde(default)]
    pub actual_datetime: Option<DateTime<Utc>>,
    /// Done
    #[serde(default)]
    pub is_completed: bool,
    /// Notes
    #[serde(default)]
    pub notes: String,
    /// Staff member who last touched it
    #[serde(default)]
    pub updated_by_id: Option<i64>,
}

impl TimelineForm {
    fn clean(mut self) -> Result<Self> {
        self.description = required("description", &self.description, 200)?;
        Ok(self)
    }

    fn apply(self, model: &mut relocation_timeline::ActiveModel) {
        model.relocation_request_id = Set(self.relocation_request_id);
        model.milestone_type = Set(self.milestone_type);
        model.description = Set(self.description);
        model.scheduled_datetime = Set(self.scheduled_datetime);
        model.actual_datetime = Set(self.actual_datetime);
        model.is_completed = Set(self.is_completed);
        model.notes = Set(self.notes);
        model.updated_by_id = Set(self.updated_by_id);
    }
}

async fn check_timeline_constraints(db: &DatabaseConnection, form: &TimelineForm) -> Result<()> {
    relocation::require_request(db, form.relocation_request_id).await?;
    if let Some(user_id) = form.updated_by_id {
        account::require_user(db, user_id).await?;
    }
    Ok(())
}

/// Applies the standard milestone ordering: scheduled time, then creation.
///
/// Unscheduled entries sort first, as `SQLite` orders NULL before any value.
pub fn ordered(query: Select<RelocationTimeline>) -> Select<RelocationTimeline> {
    query
        .order_by_asc(relocation_timeline::Column::ScheduledDatetime)
        .order_by_asc(relocation_timeline::Column::DateCreated)
        .order_by_asc(relocation_timeline::Column::Id)
}

/// Finds a milestone by primary key, failing if it does not exist.
pub async fn require_entry(
    db: &DatabaseConnection,
    id: i64,
) -> Result<relocation_timeline::Model> {
    RelocationTimeline::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Relocation timeline", id))
}

/// Milestones of a request in timeline order.
pub async fn get_timeline_for_request(
    db: &DatabaseConnection,
    request_id: i64,
) -> Result<Vec<relocation_timeline::Model>> {
    ordered(
        RelocationTimeline::find()
            .filter(relocation_timeline::Column::RelocationRequestId.eq(request_id)),
    )
    .all(db)
    .await
    .map_err(Into::into)
}

/// Adds a milestone to a request.
#[instrument(skip(db, form), fields(request = form.relocation_request_id))]
pub async fn create_entry(
    db: &DatabaseConnection,
    form: TimelineForm,
) -> Result<relocation_timeline::Model> {
    let form = form.clean()?;
    check_timeline_constraints(db, &form).await?;

    let mut model = relocation_timeline::ActiveModel {
        ..Default::default()
    };
    form.apply(&mut model);
    let entry = model.insert(db).await?;
    info!(
        "Recorded milestone {} on request {}",
        entry.milestone_type.label(),
        entry.relocation_request_id
    );
    Ok(entry)
}

/// Replaces every editable field of a milestone.
pub async fn update_entry(
    db: &DatabaseConnection,
    id: i64,
    form: TimelineForm,
) -> Result<relocation_timeline::Model> {
    let form = form.clean()?;
    let existing = require_entry(db, id).await?;
    check_timeline_constraints(db, &form).await?;

    let mut model: relocation_timeline::ActiveModel = existing.into();
    form.apply(&mut model);
    model.update(db).await.map_err(Into::into)
}

/// Deletes a milestone.
pub async fn delete_entry(db: &DatabaseConnection, id: i64) -> Result<()> {
    let result = RelocationTimeline::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("Relocation timeline", id));
    }
    Ok(())
}

/// `"{request_id} - {milestone label}"`
pub async fn entry_display(
    db: &DatabaseConnection,
    entry: &relocation_timeline::Model,
) -> Result<String> {
    let request = relocation::require_request(db, entry.relocation_request_id).await?;
    Ok(format!(
        "{} - {}",
        request.request_id,
        entry.milestone_type.label()
    ))
}
