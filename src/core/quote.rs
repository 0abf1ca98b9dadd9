//! Relocation quote business logic.
//!
//! The form carries the cost components only. `total_cost` is derived on save by the
//! entity hook, so it cannot drift from the components.

use crate::{
    core::{
        client, relocation,
        validation::{ensure_unique, min_amount, required},
    },
    entities::{
        RelocationQuote,
        relocation_quote::{self, QuoteStatus},
    },
    errors::{Error, Result},
};
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Deserialize;
use tracing::{info, instrument};

/// Editable fields of a quote
#[derive(Debug, Clone, Deserialize)]
pub struct QuoteForm {
    /// Request being quoted
    pub relocation_request_id: i64,
    /// Business identifier, unique
    pub quote_number: String,
    /// Workflow status
    #[serde(default)]
    pub status: QuoteStatus,
    /// Base price
    pub base_cost: f64,
    /// Packing
    #[serde(default)]
    pub packing_cost: f64,
    /// Transportation
    #[serde(default)]
    pub transportation_cost: f64,
    /// Insurance
    #[serde(default)]
    pub insurance_cost: f64,
    /// Storage
    #[serde(default)]
    pub storage_cost: f64,
    /// Other services
    #[serde(default)]
    pub additional_services_cost: f64,
    /// Tax
    #[serde(default)]
    pub tax_amount: f64,
    /// Last day the quote can be accepted
    pub valid_until: NaiveDate,
    /// Terms shown to the client
    pub terms_and_conditions: String,
    /// When the quote was sent
    #[serde(default)]
    pub date_sent: Option<DateTime<Utc>>,
    /// When the client answered
    #[serde(default)]
    pub date_responded: Option<DateTime<Utc>>,
}

impl QuoteForm {
    fn clean(mut self) -> Result<Self> {
        self.quote_number = required("quote_number", &self.quote_number, 20)?;
        min_amount("base_cost", self.base_cost, 0.0)?;
        min_amount("packing_cost", self.packing_cost, 0.0)?;
        min_amount("transportation_cost", self.transportation_cost, 0.0)?;
        min_amount("insurance_cost", self.insurance_cost, 0.0)?;
        min_amount("storage_cost", self.storage_cost, 0.0)?;
        min_amount("additional_services_cost", self.additional_services_cost, 0.0)?;
        min_amount("tax_amount", self.tax_amount, 0.0)?;
        self.terms_and_conditions =
            required("terms_and_conditions", &self.terms_and_conditions, usize::MAX)?;
        Ok(self)
    }

    fn apply(self, model: &mut relocation_quote::ActiveModel) {
        model.relocation_request_id = Set(self.relocation_request_id);
        model.quote_number = Set(self.quote_number);
        model.status = Set(self.status);
        model.base_cost = Set(self.base_cost);
        model.packing_cost = Set(self.packing_cost);
        model.transportation_cost = Set(self.transportation_cost);
        model.insurance_cost = Set(self.insurance_cost);
        model.storage_cost = Set(self.storage_cost);
        model.additional_services_cost = Set(self.additional_services_cost);
        model.tax_amount = Set(self.tax_amount);
        model.valid_until = Set(self.valid_until);
        model.terms_and_conditions = Set(self.terms_and_conditions);
        model.date_sent = Set(self.date_sent);
        model.date_responded = Set(self.date_responded);
    }
}

async fn check_quote_constraints(
    db: &DatabaseConnection,
    form: &QuoteForm,
    exclude: Option<i64>,
) -> Result<()> {
    relocation::require_request(db, form.relocation_request_id).await?;
    let mut query = RelocationQuote::find()
        .filter(relocation_quote::Column::QuoteNumber.eq(&form.quote_number));
    if let Some(id) = exclude {
        query = query.filter(relocation_quote::Column::Id.ne(id));
    }
    ensure_unique(db, query, "Relocation quote", "quote_number", &form.quote_number).await
}

/// Finds a quote by primary key.
pub async fn get_quote_by_id(
    db: &DatabaseConnection,
    id: i64,
) -> Result<Option<relocation_quote::Model>> {
    RelocationQuote::find_by_id(id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a quote by primary key, failing if it does not exist.
pub async fn require_quote(db: &DatabaseConnection, id: i64) -> Result<relocation_quote::Model> {
    get_quote_by_id(db, id)
        .await?
        .ok_or_else(|| Error::not_found("Relocation quote", id))
}

/// Quotes issued for a request, newest first.
pub async fn get_quotes_for_request(
    db: &DatabaseConnection,
    request_id: i64,
) -> Result<Vec<relocation_quote::Model>> {
    RelocationQuote::find()
        .filter(relocation_quote::Column::RelocationRequestId.eq(request_id))
        .order_by_desc(relocation_quote::Column::DateCreated)
        .order_by_desc(relocation_quote::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Issues a quote against a request.
#[instrument(skip(db, form), fields(quote_number = %form.quote_number))]
pub async fn create_quote(
    db: &DatabaseConnection,
    form: QuoteForm,
) -> Result<relocation_quote::Model> {
    let form = form.clean()?;
    check_quote_constraints(db, &form, None).await?;

    let mut model = relocation_quote::ActiveModel {
        ..Default::default()
    };
    form.apply(&mut model);
    let quote = model.insert(db).await?;
    info!(
        "Issued quote {} totalling {:.2}",
        quote.quote_number, quote.total_cost
    );
    Ok(quote)
}

/// Replaces every editable field of a quote. The total follows the new components.
#[instrument(skip(db, form))]
pub async fn update_quote(
    db: &DatabaseConnection,
    id: i64,
    form: QuoteForm,
) -> Result<relocation_quote::Model> {
    let form = form.clean()?;
    let existing = require_quote(db, id).await?;
    check_quote_constraints(db, &form, Some(id)).await?;

    let mut model: relocation_quote::ActiveModel = existing.into();
    form.apply(&mut model);
    model.update(db).await.map_err(Into::into)
}

/// Deletes a quote.
#[instrument(skip(db))]
pub async fn delete_quote(db: &DatabaseConnection, id: i64) -> Result<()> {
    let result = RelocationQuote::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("Relocation quote", id));
    }
    info!("Deleted quote {}", id);
    Ok(())
}

/// `"Quote {quote_number} - {client full name}"`
pub async fn quote_display(
    db: &DatabaseConnection,
    quote: &relocation_quote::Model,
) -> Result<String> {
    let request = relocation::require_request(db, quote.relocation_request_id).await?;
    let client = client::require_client(db, request.client_id).await?;
    Ok(format!("Quote {} - {}", quote.quote_number, client.full_name()))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::ActiveValue;

    #[tokio::test]
    async fn test_total_is_sum_of_components_and_tax() -> Result<()> {
        let db = setup_test_db().await?;
        let request = create_request_fixture(&db).await?;

        let mut form = quote_form(request.id, "Q-0001");
        form.base_cost = 1000.0;
        form.packing_cost = 200.0;
        form.transportation_cost = 300.0;
        form.insurance_cost = 50.0;
        form.storage_cost = 25.0;
        form.additional_services_cost = 10.0;
        form.tax_amount = 15.0;
        let quote = create_quote(&db, form).await?;

        assert_eq!(quote.total_cost, 1600.0);
        assert_eq!(quote.total_cost, quote.computed_total());
        assert_eq!(quote.status, QuoteStatus::Draft);
        assert_eq!(quote_display(&db, &quote).await?, "Quote Q-0001 - Jane Doe");
        Ok(())
    }

    #[tokio::test]
    async fn test_total_follows_update() -> Result<()> {
        let db = setup_test_db().await?;
        let request = create_request_fixture(&db).await?;
        let quote = create_quote(&db, quote_form(request.id, "Q-0001")).await?;
        assert_eq!(quote.total_cost, 1000.0);

        let mut form = quote_form(request.id, "Q-0001");
        form.tax_amount = 80.0;
        let updated = update_quote(&db, quote.id, form).await?;
        assert_eq!(updated.total_cost, 1080.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_direct_total_assignment_is_overwritten() -> Result<()> {
        let db = setup_test_db().await?;
        let request = create_request_fixture(&db).await?;
        let quote = create_quote(&db, quote_form(request.id, "Q-0001")).await?;

        let mut model: relocation_quote::ActiveModel = quote.into();
        model.total_cost = ActiveValue::Set(1.0);
        model.packing_cost = ActiveValue::Set(40.0);
        let saved = model.update(&db).await?;
        assert_eq!(saved.total_cost, 1040.0);

        let stored = require_quote(&db, saved.id).await?;
        assert_eq!(stored.total_cost, 1040.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_partial_save_keeps_stored_components() -> Result<()> {
        let db = setup_test_db().await?;
        let request = create_request_fixture(&db).await?;
        let mut form = quote_form(request.id, "Q-0001");
        form.packing_cost = 200.0;
        form.tax_amount = 15.0;
        let quote = create_quote(&db, form).await?;
        assert_eq!(quote.total_cost, 1215.0);

        let saved = relocation_quote::ActiveModel {
            id: ActiveValue::Unchanged(quote.id),
            storage_cost: ActiveValue::Set(25.0),
            ..Default::default()
        }
        .update(&db)
        .await?;
        assert_eq!(saved.total_cost, 1240.0);

        let stored = require_quote(&db, quote.id).await?;
        assert_eq!(stored.base_cost, 1000.0);
        assert_eq!(stored.total_cost, stored.computed_total());
        assert_eq!(stored.total_cost, 1240.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_negative_component_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        let request = create_request_fixture(&db).await?;

        let mut form = quote_form(request.id, "Q-0001");
        form.storage_cost = -5.0;
        let result = create_quote(&db, form).await;
        assert!(matches!(
            result,
            Err(Error::Validation {
                field: "storage_cost",
                ..
            })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_quote_number_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        let request = create_request_fixture(&db).await?;
        create_quote(&db, quote_form(request.id, "Q-0001")).await?;

        let result = create_quote(&db, quote_form(request.id, "Q-0001")).await;
        assert!(matches!(
            result,
            Err(Error::Duplicate {
                field: "quote_number",
                ..
            })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_quotes_cascade_with_request() -> Result<()> {
        let db = setup_test_db().await?;
        let request = create_request_fixture(&db).await?;
        create_quote(&db, quote_form(request.id, "Q-0001")).await?;
        create_quote(&db, quote_form(request.id, "Q-0002")).await?;
        assert_eq!(get_quotes_for_request(&db, request.id).await?.len(), 2);

        relocation::delete_request(&db, request.id).await?;
        assert!(get_quotes_for_request(&db, request.id).await?.is_empty());
        Ok(())
    }
}
