//! Relocation quote entity - a priced proposal for a request.
//!
//! `total_cost` is derived: every save recomputes it from the cost components and
//! tax, so a value assigned directly never reaches the database.

use super::Choice;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};

/// Quote lifecycle
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    /// Being prepared
    #[default]
    #[sea_orm(string_value = "draft")]
    Draft,
    /// Sent to the client
    #[sea_orm(string_value = "sent")]
    Sent,
    /// Accepted by the client
    #[sea_orm(string_value = "accepted")]
    Accepted,
    /// Rejected by the client
    #[sea_orm(string_value = "rejected")]
    Rejected,
    /// Past its validity date
    #[sea_orm(string_value = "expired")]
    Expired,
}

impl Choice for QuoteStatus {
    fn label(&self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Sent => "Sent",
            Self::Accepted => "Accepted",
            Self::Rejected => "Rejected",
            Self::Expired => "Expired",
        }
    }
}

/// Relocation quote database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "relocation_quotes")]
pub struct Model {
    /// Surrogate key
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Request being priced
    pub relocation_request_id: i64,
    /// Business identifier printed on the quote
    #[sea_orm(unique)]
    pub quote_number: String,
    /// Lifecycle status
    pub status: QuoteStatus,
    /// Base price
    pub base_cost: f64,
    /// Packing service
    pub packing_cost: f64,
    /// Transport
    pub transportation_cost: f64,
    /// Transit insurance
    pub insurance_cost: f64,
    /// Storage
    pub storage_cost: f64,
    /// Everything else
    pub additional_services_cost: f64,
    /// Tax
    pub tax_amount: f64,
    /// Sum of all components and tax, maintained on save
    pub total_cost: f64,
    /// Last day the quote can be accepted
    pub valid_until: Date,
    /// Terms the client agrees to
    #[sea_orm(column_type = "Text")]
    pub terms_and_conditions: String,
    /// When the quote was drafted
    pub date_created: DateTimeUtc,
    /// When the quote was sent
    pub date_sent: Option<DateTimeUtc>,
    /// When the client answered
    pub date_responded: Option<DateTimeUtc>,
}

/// Each quote belongs to one relocation request
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Request being priced
    #[sea_orm(
        belongs_to = "super::relocation_request::Entity",
        from = "Column::RelocationRequestId",
        to = "super::relocation_request::Column::Id",
        on_delete = "Cascade"
    )]
    RelocationRequest,
}

impl Related<super::relocation_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RelocationRequest.def()
    }
}

fn component(value: &ActiveValue<f64>) -> f64 {
    match value {
        ActiveValue::Set(v) | ActiveValue::Unchanged(v) => *v,
        ActiveValue::NotSet => 0.0,
    }
}

fn fill_from(value: &mut ActiveValue<f64>, stored: f64) {
    if value.is_not_set() {
        *value = ActiveValue::Unchanged(stored);
    }
}

impl ActiveModel {
    fn components(&self) -> [&ActiveValue<f64>; 7] {
        [
            &self.base_cost,
            &self.packing_cost,
            &self.transportation_cost,
            &self.insurance_cost,
            &self.storage_cost,
            &self.additional_services_cost,
            &self.tax_amount,
        ]
    }

    /// Takes components missing from a partial update from the stored row.
    async fn fill_unset_components<C>(&mut self, db: &C) -> Result<(), DbErr>
    where
        C: ConnectionTrait,
    {
        if !self.components().iter().any(|value| value.is_not_set()) {
            return Ok(());
        }
        let id = match &self.id {
            ActiveValue::Set(id) | ActiveValue::Unchanged(id) => *id,
            ActiveValue::NotSet => return Ok(()),
        };
        let Some(stored) = Entity::find_by_id(id).one(db).await? else {
            return Ok(());
        };
        fill_from(&mut self.base_cost, stored.base_cost);
        fill_from(&mut self.packing_cost, stored.packing_cost);
        fill_from(&mut self.transportation_cost, stored.transportation_cost);
        fill_from(&mut self.insurance_cost, stored.insurance_cost);
        fill_from(&mut self.storage_cost, stored.storage_cost);
        fill_from(
            &mut self.additional_services_cost,
            stored.additional_services_cost,
        );
        fill_from(&mut self.tax_amount, stored.tax_amount);
        Ok(())
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if insert {
            self.date_created = Set(chrono::Utc::now());
        } else {
            self.fill_unset_components(db).await?;
        }
        let total = self.components().into_iter().map(component).sum::<f64>();
        self.total_cost = Set(total);
        Ok(self)
    }
}

impl Model {
    /// Total implied by the current components, in the order they are summed on save.
    #[must_use]
    pub fn computed_total(&self) -> f64 {
        [
            self.base_cost,
            self.packing_cost,
            self.transportation_cost,
            self.insurance_cost,
            self.storage_cost,
            self.additional_services_cost,
            self.tax_amount,
        ]
        .into_iter()
        .sum()
    }
}
