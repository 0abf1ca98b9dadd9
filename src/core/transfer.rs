//! Inventory transfer business logic - items tracked through an assignment.

use crate::{
    core::{
        assignment, driver, relocation,
        validation::{max_length, required},
    },
    entities::{
        InventoryTransfer,
        inventory_transfer::{self, TransferStatus},
    },
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Deserialize;
use tracing::{info, instrument};

/// Editable fields of a transfer
#[derive(Debug, Clone, Deserialize)]
pub struct TransferForm {
    /// Assignment moving the item
    pub assignment_id: i64,
    /// Item name
    pub item_name: String,
    /// Description
    #[serde(default)]
    pub description: String,
    /// Room at the origin
    pub room_from: String,
    /// Room at the destination
    #[serde(default)]
    pub room_to: String,
    /// Estimated weight
    #[serde(default)]
    pub estimated_weight_kg: Option<f64>,
    /// L x W x H in cm
    #[serde(default)]
    pub dimensions: String,
    /// Breakable
    #[serde(default)]
    pub is_fragile: bool,
    /// Needs taking apart
    #[serde(default)]
    pub requires_disassembly: bool,
    /// Where the item is
    #[serde(default)]
    pub status: TransferStatus,
    /// Packed at
    #[serde(default)]
    pub packed_datetime: Option<DateTime<Utc>>,
    /// Loaded at
    #[serde(default)]
    pub loaded_datetime: Option<DateTime<Utc>>,
    /// Delivered at
    #[serde(default)]
    pub delivered_datetime: Option<DateTime<Utc>>,
    /// Condition notes
    #[serde(default)]
    pub condition_notes: String,
    /// Damage was reported
    #[serde(default)]
    pub damage_reported: bool,
    /// What was damaged
    #[serde(default)]
    pub damage_description: String,
    /// Driver who handled the item
    #[serde(default)]
    pub handled_by_id: Option<i64>,
}

impl TransferForm {
    fn clean(mut self) -> Result<Self> {
        self.item_name = required("item_name", &self.item_name, 200)?;
        self.room_from = required("room_from", &self.room_from, 100)?;
        max_length("room_to", &self.room_to, 100)?;
        max_length("dimensions", &self.dimensions, 100)?;
        Ok(self)
    }

    fn apply(self, model: &mut inventory_transfer::ActiveModel) {
        model.assignment_id = Set(self.assignment_id);
        model.item_name = Set(self.item_name);
        model.description = Set(self.description);
        model.room_from = Set(self.room_from);
        model.room_to = Set(self.room_to);
        model.estimated_weight_kg = Set(self.estimated_weight_kg);
        model.dimensions = Set(self.dimensions);
        model.is_fragile = Set(self.is_fragile);
        model.requires_disassembly = Set(self.requires_disassembly);
        model.status = Set(self.status);
        model.packed_datetime = Set(self.packed_datetime);
        model.loaded_datetime = Set(self.loaded_datetime);
        model.delivered_datetime = Set(self.delivered_datetime);
        model.condition_notes = Set(self.condition_notes);
        model.damage_reported = Set(self.damage_reported);
        model.damage_description = Set(self.damage_description);
        model.handled_by_id = Set(self.handled_by_id);
    }
}

async fn check_transfer_constraints(db: &DatabaseConnection, form: &TransferForm) -> Result<()> {
    assignment::require_assignment(db, form.assignment_id).await?;
    if let Some(driver_id) = form.handled_by_id {
        driver::require_driver(db, driver_id).await?;
    }
    Ok(())
}

/// Finds a transfer by primary key, failing if it does not exist.
pub async fn require_transfer(
    db: &DatabaseConnection,
    id: i64,
) -> Result<inventory_transfer::Model> {
    InventoryTransfer::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Inventory transfer", id))
}

/// Items moved under an assignment, newest first.
pub async fn get_transfers_for_assignment(
    db: &DatabaseConnection,
    assignment_id: i64,
) -> Result<Vec<inventory_transfer::Model>> {
    InventoryTransfer::find()
        .filter(inventory_transfer::Column::AssignmentId.eq(assignment_id))
        .order_by_desc(inventory_transfer::Column::DateCreated)
        .order_by_desc(inventory_transfer::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Starts tracking an item.
#[instrument(skip(db, form), fields(assignment = form.assignment_id))]
pub async fn create_transfer(
    db: &DatabaseConnection,
    form: TransferForm,
) -> Result<inventory_transfer::Model> {
    let form = form.clean()?;
    check_transfer_constraints(db, &form).await?;

    let mut model = inventory_transfer::ActiveModel {
        ..Default::default()
    };
    form.apply(&mut model);
    let transfer = model.insert(db).await?;
    info!("Tracking {} on assignment {}", transfer.item_name, transfer.assignment_id);
    Ok(transfer)
}

/// Replaces every editable field of a transfer.
pub async fn update_transfer(
    db: &DatabaseConnection,
    id: i64,
    form: TransferForm,
) -> Result<inventory_transfer::Model> {
    let form = form.clean()?;
    let existing = require_transfer(db, id).await?;
    check_transfer_constraints(db, &form).await?;

    let mut model: inventory_transfer::ActiveModel = existing.into();
    form.apply(&mut model);
    model.update(db).await.map_err(Into::into)
}

/// Stops tracking an item.
pub async fn delete_transfer(db: &DatabaseConnection, id: i64) -> Result<()> {
    let result = InventoryTransfer::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("Inventory transfer", id));
    }
    Ok(())
}

/// `"{item_name} - {request_id}"`
pub async fn transfer_display(
    db: &DatabaseConnection,
    transfer: &inventory_transfer::Model,
) -> Result<String> {
    let assignment = assignment::require_assignment(db, transfer.assignment_id).await?;
    let request = relocation::require_request(db, assignment.relocation_request_id).await?;
    Ok(format!("{} - {}", transfer.item_name, request.request_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    fn sofa(assignment_id: i64) -> TransferForm {
        TransferForm {
            assignment_id,
            item_name: "Sofa".to_string(),
            description: "Three-seater".to_string(),
            room_from: "Living room".to_string(),
            room_to: "Den".to_string(),
            estimated_weight_kg: Some(60.0),
            dimensions: "220 x 90 x 85".to_string(),
            is_fragile: false,
            requires_disassembly: true,
            status: TransferStatus::default(),
            packed_datetime: None,
            loaded_datetime: None,
            delivered_datetime: None,
            condition_notes: String::new(),
            damage_reported: false,
            damage_description: String::new(),
            handled_by_id: None,
        }
    }

    #[tokio::test]
    async fn test_create_transfer_integration() -> Result<()> {
        let db = setup_test_db().await?;
        let fixture = setup_assignment(&db).await?;

        let transfer = create_transfer(&db, sofa(fixture.assignment.id)).await?;
        assert_eq!(transfer.status, TransferStatus::Pending);
        assert_eq!(transfer_display(&db, &transfer).await?, "Sofa - RR-0001");
        Ok(())
    }

    #[tokio::test]
    async fn test_any_status_change_allowed() -> Result<()> {
        let db = setup_test_db().await?;
        let fixture = setup_assignment(&db).await?;
        let transfer = create_transfer(&db, sofa(fixture.assignment.id)).await?;

        let mut form = sofa(fixture.assignment.id);
        form.status = TransferStatus::Delivered;
        form.delivered_datetime = Some(datetime(2024, 5, 2, 15));
        let delivered = update_transfer(&db, transfer.id, form).await?;
        assert_eq!(delivered.status, TransferStatus::Delivered);

        let mut form = sofa(fixture.assignment.id);
        form.status = TransferStatus::Pending;
        let back = update_transfer(&db, transfer.id, form).await?;
        assert_eq!(back.status, TransferStatus::Pending);
        Ok(())
    }

    #[tokio::test]
    async fn test_handler_deletion_sets_null() -> Result<()> {
        let db = setup_test_db().await?;
        let fixture = setup_assignment(&db).await?;
        let handler = create_test_driver(&db, "handler", "DR-77").await?;

        let mut form = sofa(fixture.assignment.id);
        form.handled_by_id = Some(handler.id);
        let transfer = create_transfer(&db, form).await?;

        driver::delete_driver(&db, handler.id).await?;
        let transfer = require_transfer(&db, transfer.id).await?;
        assert_eq!(transfer.handled_by_id, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_transfers_cascade_with_assignment() -> Result<()> {
        let db = setup_test_db().await?;
        let fixture = setup_assignment(&db).await?;
        create_transfer(&db, sofa(fixture.assignment.id)).await?;

        assignment::delete_assignment(&db, fixture.assignment.id).await?;
        assert!(
            get_transfers_for_assignment(&db, fixture.assignment.id)
                .await?
                .is_empty()
        );
        Ok(())
    }
}
