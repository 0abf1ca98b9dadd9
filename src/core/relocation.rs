//! Relocation request business logic.
//!
//! A request ties a client and an origin property to a destination, which is either
//! another registered property or a free-text address. Requests own their quotes and
//! timeline milestones; see [`crate::core::quote`] and [`crate::core::timeline`].

use crate::{
    core::{
        account, client, property,
        validation::{ensure_unique, max_length, min_amount, required},
    },
    entities::{
        RelocationRequest,
        relocation_request::{self, Priority, RelocationType, RequestStatus},
    },
    errors::{Error, Result},
};
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Deserialize;
use tracing::{info, instrument};

/// Editable fields of a relocation request
#[derive(Debug, Clone, Deserialize)]
pub struct RequestForm {
    /// Business identifier, unique
    pub request_id: String,
    /// Requesting client
    pub client_id: i64,
    /// Property moved out of
    pub origin_property_id: i64,
    /// Registered destination, if any
    #[serde(default)]
    pub destination_property_id: Option<i64>,
    /// Free-text destination street
    #[serde(default)]
    pub destination_address: String,
    /// Free-text destination city
    #[serde(default)]
    pub destination_city: String,
    /// Free-text destination state
    #[serde(default)]
    pub destination_state: String,
    /// Free-text destination postal code
    #[serde(default)]
    pub destination_zip: String,
    /// Free-text destination country
    #[serde(default)]
    pub destination_country: String,
    /// Kind of move
    #[serde(default)]
    pub relocation_type: RelocationType,
    /// Workflow status
    #[serde(default)]
    pub status: RequestStatus,
    /// Priority
    #[serde(default)]
    pub priority: Priority,
    /// Date the client asked for
    pub preferred_date: NaiveDate,
    /// Fallback date
    #[serde(default)]
    pub alternative_date: Option<NaiveDate>,
    /// Date the office committed to
    #[serde(default)]
    pub scheduled_date: Option<NaiveDate>,
    /// When the move actually started
    #[serde(default)]
    pub actual_start_date: Option<DateTime<Utc>>,
    /// When the move actually finished
    #[serde(default)]
    pub actual_completion_date: Option<DateTime<Utc>>,
    /// Packing service
    #[serde(default)]
    pub requires_packing: bool,
    /// Unpacking service
    #[serde(default)]
    pub requires_unpacking: bool,
    /// Storage service
    #[serde(default)]
    pub requires_storage: bool,
    /// Insurance, on unless declined
    #[serde(default = "account::default_true")]
    pub requires_insurance: bool,
    /// Cleaning service
    #[serde(default)]
    pub requires_cleaning: bool,
    /// Estimate
    #[serde(default)]
    pub estimated_cost: Option<f64>,
    /// Final cost
    #[serde(default)]
    pub actual_cost: Option<f64>,
    /// Client instructions
    #[serde(default)]
    pub special_instructions: String,
    /// Office notes
    #[serde(default)]
    pub notes: String,
    /// Staff member handling the request
    #[serde(default)]
    pub assigned_to_id: Option<i64>,
}

impl RequestForm {
    fn clean(mut self) -> Result<Self> {
        self.request_id = required("request_id", &self.request_id, 20)?;
        max_length("destination_city", &self.destination_city, 100)?;
        max_length("destination_state", &self.destination_state, 100)?;
        max_length("destination_zip", &self.destination_zip, 10)?;
        max_length("destination_country", &self.destination_country, 100)?;
        if let Some(cost) = self.estimated_cost {
            min_amount("estimated_cost", cost, 0.0)?;
        }
        if let Some(cost) = self.actual_cost {
            min_amount("actual_cost", cost, 0.0)?;
        }
        Ok(self)
    }

    fn apply(self, model: &mut relocation_request::ActiveModel) {
        model.request_id = Set(self.request_id);
        model.client_id = Set(self.client_id);
        model.origin_property_id = Set(self.origin_property_id);
        model.destination_property_id = Set(self.destination_property_id);
        model.destination_address = Set(self.destination_address);
        model.destination_city = Set(self.destination_city);
        model.destination_state = Set(self.destination_state);
        model.destination_zip = Set(self.destination_zip);
        model.destination_country = Set(self.destination_country);
        model.relocation_type = Set(self.relocation_type);
        model.status = Set(self.status);
        model.priority = Set(self.priority);
        model.preferred_date = Set(self.preferred_date);
        model.alternative_date = Set(self.alternative_date);
        model.scheduled_date = Set(self.scheduled_date);
        model.actual_start_date = Set(self.actual_start_date);
        model.actual_completion_date = Set(self.actual_completion_date);
        model.requires_packing = Set(self.requires_packing);
        model.requires_unpacking = Set(self.requires_unpacking);
        model.requires_storage = Set(self.requires_storage);
        model.requires_insurance = Set(self.requires_insurance);
        model.requires_cleaning = Set(self.requires_cleaning);
        model.estimated_cost = Set(self.estimated_cost);
        model.actual_cost = Set(self.actual_cost);
        model.special_instructions = Set(self.special_instructions);
        model.notes = Set(self.notes);
        model.assigned_to_id = Set(self.assigned_to_id);
    }
}

async fn check_request_constraints(
    db: &DatabaseConnection,
    form: &RequestForm,
    exclude: Option<i64>,
) -> Result<()> {
    client::require_client(db, form.client_id).await?;
    property::require_property(db, form.origin_property_id).await?;
    if let Some(destination) = form.destination_property_id {
        property::require_property(db, destination).await?;
    }
    if let Some(user_id) = form.assigned_to_id {
        account::require_user(db, user_id).await?;
    }

    let mut query = RelocationRequest::find()
        .filter(relocation_request::Column::RequestId.eq(&form.request_id));
    if let Some(id) = exclude {
        query = query.filter(relocation_request::Column::Id.ne(id));
    }
    ensure_unique(db, query, "Relocation request", "request_id", &form.request_id).await
}

/// Finds a request by primary key.
pub async fn get_request_by_id(
    db: &DatabaseConnection,
    id: i64,
) -> Result<Option<relocation_request::Model>> {
    RelocationRequest::find_by_id(id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a request by primary key, failing if it does not exist.
pub async fn require_request(
    db: &DatabaseConnection,
    id: i64,
) -> Result<relocation_request::Model> {
    get_request_by_id(db, id)
        .await?
        .ok_or_else(|| Error::not_found("Relocation request", id))
}

/// Finds a request by business identifier.
pub async fn get_request_by_code(
    db: &DatabaseConnection,
    request_id: &str,
) -> Result<Option<relocation_request::Model>> {
    RelocationRequest::find()
        .filter(relocation_request::Column::RequestId.eq(request_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Requests filed by a client, newest first.
pub async fn get_requests_for_client(
    db: &DatabaseConnection,
    client_id: i64,
) -> Result<Vec<relocation_request::Model>> {
    RelocationRequest::find()
        .filter(relocation_request::Column::ClientId.eq(client_id))
        .order_by_desc(relocation_request::Column::DateCreated)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Files a new relocation request.
#[instrument(skip(db, form), fields(request_id = %form.request_id))]
pub async fn create_request(
    db: &DatabaseConnection,
    form: RequestForm,
) -> Result<relocation_request::Model> {
    let form = form.clean()?;
    check_request_constraints(db, &form, None).await?;

    let mut model = relocation_request::ActiveModel {
        ..Default::default()
    };
    form.apply(&mut model);
    let request = model.insert(db).await?;
    info!("Filed relocation request {}", request.request_id);
    Ok(request)
}

/// Replaces every editable field of a request.
#[instrument(skip(db, form))]
pub async fn update_request(
    db: &DatabaseConnection,
    id: i64,
    form: RequestForm,
) -> Result<relocation_request::Model> {
    let form = form.clean()?;
    let existing = require_request(db, id).await?;
    check_request_constraints(db, &form, Some(id)).await?;

    let mut model: relocation_request::ActiveModel = existing.into();
    form.apply(&mut model);
    model.update(db).await.map_err(Into::into)
}

/// Deletes a request with its quotes, timeline and assignment.
#[instrument(skip(db))]
pub async fn delete_request(db: &DatabaseConnection, id: i64) -> Result<()> {
    let result = RelocationRequest::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("Relocation request", id));
    }
    info!("Deleted relocation request {}", id);
    Ok(())
}

/// The destination property's full address when one is linked, otherwise the
/// free-text destination fields.
pub async fn full_destination_address(
    db: &DatabaseConnection,
    request: &relocation_request::Model,
) -> Result<String> {
    match request.destination_property_id {
        Some(id) => Ok(property::require_property(db, id).await?.full_address()),
        None => Ok(request.free_text_destination()),
    }
}

/// `"{request_id} - {client full name}"`
pub async fn request_display(
    db: &DatabaseConnection,
    request: &relocation_request::Model,
) -> Result<String> {
    let client = client::require_client(db, request.client_id).await?;
    Ok(format!("{} - {}", request.request_id, client.full_name()))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use chrono::TimeZone;

    #[tokio::test]
    async fn test_create_request_integration() -> Result<()> {
        let db = setup_test_db().await?;
        let client = create_test_client(&db, "CL-0001").await?;
        let origin = create_test_property(&db, client.id, "PR-0001").await?;

        let request = create_test_request(&db, client.id, origin.id, "RR-0001").await?;
        assert_eq!(request.status, RequestStatus::Pending);
        assert_eq!(request.priority, Priority::Medium);
        assert_eq!(request.relocation_type, RelocationType::Local);
        assert!(request.requires_insurance);
        assert!(!request.requires_packing);
        assert_eq!(request_display(&db, &request).await?, "RR-0001 - Jane Doe");

        let found = get_request_by_code(&db, "RR-0001").await?.unwrap();
        assert_eq!(found.id, request.id);
        assert!(get_request_by_code(&db, "RR-9999").await?.is_none());
        assert_eq!(get_requests_for_client(&db, client.id).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_request_id_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        let client = create_test_client(&db, "CL-0001").await?;
        let origin = create_test_property(&db, client.id, "PR-0001").await?;
        create_test_request(&db, client.id, origin.id, "RR-0001").await?;

        let result = create_test_request(&db, client.id, origin.id, "RR-0001").await;
        assert!(matches!(
            result,
            Err(Error::Duplicate {
                field: "request_id",
                ..
            })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_full_destination_address() -> Result<()> {
        let db = setup_test_db().await?;
        let client = create_test_client(&db, "CL-0001").await?;
        let origin = create_test_property(&db, client.id, "PR-0001").await?;

        let mut form = request_form(client.id, origin.id, "RR-0001");
        form.destination_address = "1 Harbor Way".to_string();
        form.destination_city = "Portland".to_string();
        form.destination_state = "OR".to_string();
        form.destination_zip = "97201".to_string();
        form.destination_country = "United States".to_string();
        let request = create_request(&db, form).await?;
        assert_eq!(
            full_destination_address(&db, &request).await?,
            "1 Harbor Way, Portland, OR 97201, United States"
        );

        let mut dest_form = property_form(client.id, "PR-0002");
        dest_form.address = "77 Lake Road".to_string();
        dest_form.city = "Madison".to_string();
        dest_form.state = "WI".to_string();
        dest_form.zip_code = "53703".to_string();
        let destination = property::create_property(&db, dest_form).await?;

        let mut form = request_form(client.id, origin.id, "RR-0002");
        form.destination_property_id = Some(destination.id);
        form.destination_city = "ignored".to_string();
        let request = create_request(&db, form).await?;
        assert_eq!(
            full_destination_address(&db, &request).await?,
            "77 Lake Road, Madison, WI 53703, United States"
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_duration_days() -> Result<()> {
        let db = setup_test_db().await?;
        let client = create_test_client(&db, "CL-0001").await?;
        let origin = create_test_property(&db, client.id, "PR-0001").await?;

        let mut form = request_form(client.id, origin.id, "RR-0001");
        form.actual_start_date = Some(Utc.with_ymd_and_hms(2024, 3, 1, 23, 30, 0).unwrap());
        form.actual_completion_date = Some(Utc.with_ymd_and_hms(2024, 3, 4, 0, 15, 0).unwrap());
        let request = create_request(&db, form).await?;
        assert_eq!(request.duration_days(), Some(3));

        let mut form = request_form(client.id, origin.id, "RR-0002");
        form.actual_start_date = Some(Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap());
        let request = create_request(&db, form).await?;
        assert_eq!(request.duration_days(), None);
        Ok(())
    }

    #[tokio::test]
    async fn test_assigned_user_deletion_sets_null() -> Result<()> {
        let db = setup_test_db().await?;
        let staff = create_test_user(&db, "coordinator").await?;
        let client = create_test_client(&db, "CL-0001").await?;
        let origin = create_test_property(&db, client.id, "PR-0001").await?;

        let mut form = request_form(client.id, origin.id, "RR-0001");
        form.assigned_to_id = Some(staff.id);
        let request = create_request(&db, form).await?;
        assert_eq!(request.assigned_to_id, Some(staff.id));

        account::delete_user(&db, staff.id).await?;
        let request = require_request(&db, request.id).await?;
        assert_eq!(request.assigned_to_id, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_deleting_destination_property_removes_request() -> Result<()> {
        let db = setup_test_db().await?;
        let client = create_test_client(&db, "CL-0001").await?;
        let origin = create_test_property(&db, client.id, "PR-0001").await?;
        let destination = create_test_property(&db, client.id, "PR-0002").await?;

        let mut form = request_form(client.id, origin.id, "RR-0001");
        form.destination_property_id = Some(destination.id);
        let request = create_request(&db, form).await?;

        property::delete_property(&db, destination.id).await?;
        assert!(get_request_by_id(&db, request.id).await?.is_none());
        Ok(())
    }
}
