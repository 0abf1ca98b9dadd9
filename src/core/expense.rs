//! Moving expense business logic - driver costs, receipts and approval.

use crate::{
    core::{
        account, assignment, driver,
        validation::{max_length, min_amount, required},
    },
    entities::{
        Choice, MovingExpense,
        moving_expense::{self, ExpenseType},
    },
    errors::{Error, Result},
    media::{MediaStore, UploadDir},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Deserialize;
use tracing::{info, instrument};

/// Editable fields of an expense
#[derive(Debug, Clone, Deserialize)]
pub struct ExpenseForm {
    /// Assignment the cost belongs to
    pub assignment_id: i64,
    /// Kind of cost
    pub expense_type: ExpenseType,
    /// Amount spent
    pub amount: f64,
    /// What was bought
    pub description: String,
    /// Stored receipt, relative to the media root
    #[serde(default)]
    pub receipt_image: Option<String>,
    /// Day the cost was incurred
    pub date_incurred: NaiveDate,
    /// Driver claiming the cost
    pub submitted_by_id: i64,
    /// Approved for reimbursement
    #[serde(default)]
    pub is_approved: bool,
    /// Staff member who approved it
    #[serde(default)]
    pub approved_by_id: Option<i64>,
}

impl ExpenseForm {
    fn clean(mut self) -> Result<Self> {
        min_amount("amount", self.amount, 0.0)?;
        self.description = required("description", &self.description, 200)?;
        self.receipt_image = self
            .receipt_image
            .map(|path| path.trim().to_string())
            .filter(|path| !path.is_empty());
        if let Some(path) = &self.receipt_image {
            max_length("receipt_image", path, 100)?;
        }
        Ok(self)
    }

    fn apply(self, model: &mut moving_expense::ActiveModel) {
        model.assignment_id = Set(self.assignment_id);
        model.expense_type = Set(self.expense_type);
        model.amount = Set(self.amount);
        model.description = Set(self.description);
        model.receipt_image = Set(self.receipt_image);
        model.date_incurred = Set(self.date_incurred);
        model.submitted_by_id = Set(self.submitted_by_id);
        model.is_approved = Set(self.is_approved);
        model.approved_by_id = Set(self.approved_by_id);
    }
}

async fn check_expense_constraints(db: &DatabaseConnection, form: &ExpenseForm) -> Result<()> {
    assignment::require_assignment(db, form.assignment_id).await?;
    driver::require_driver(db, form.submitted_by_id).await?;
    if let Some(user_id) = form.approved_by_id {
        account::require_user(db, user_id).await?;
    }
    Ok(())
}

/// Finds an expense by primary key, failing if it does not exist.
pub async fn require_expense(db: &DatabaseConnection, id: i64) -> Result<moving_expense::Model> {
    MovingExpense::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Moving expense", id))
}

/// Expenses of an assignment, most recently incurred first.
pub async fn get_expenses_for_assignment(
    db: &DatabaseConnection,
    assignment_id: i64,
) -> Result<Vec<moving_expense::Model>> {
    MovingExpense::find()
        .filter(moving_expense::Column::AssignmentId.eq(assignment_id))
        .order_by_desc(moving_expense::Column::DateIncurred)
        .order_by_desc(moving_expense::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Sum of an assignment's expenses, optionally only the approved ones.
pub async fn assignment_expense_total(
    db: &DatabaseConnection,
    assignment_id: i64,
    approved_only: bool,
) -> Result<f64> {
    Ok(get_expenses_for_assignment(db, assignment_id)
        .await?
        .iter()
        .filter(|expense| !approved_only || expense.is_approved)
        .map(|expense| expense.amount)
        .sum())
}

/// Records an expense claim.
#[instrument(skip(db, form), fields(assignment = form.assignment_id))]
pub async fn create_expense(
    db: &DatabaseConnection,
    form: ExpenseForm,
) -> Result<moving_expense::Model> {
    let form = form.clean()?;
    check_expense_constraints(db, &form).await?;

    let mut model = moving_expense::ActiveModel {
        ..Default::default()
    };
    form.apply(&mut model);
    let expense = model.insert(db).await?;
    info!(
        "Recorded {} expense of {:.2}",
        expense.expense_type.label(),
        expense.amount
    );
    Ok(expense)
}

/// Replaces every editable field of an expense.
pub async fn update_expense(
    db: &DatabaseConnection,
    id: i64,
    form: ExpenseForm,
) -> Result<moving_expense::Model> {
    let form = form.clean()?;
    let existing = require_expense(db, id).await?;
    check_expense_constraints(db, &form).await?;

    let mut model: moving_expense::ActiveModel = existing.into();
    form.apply(&mut model);
    model.update(db).await.map_err(Into::into)
}

/// Deletes an expense. A stored receipt is left in place.
pub async fn delete_expense(db: &DatabaseConnection, id: i64) -> Result<()> {
    let result = MovingExpense::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("Moving expense", id));
    }
    Ok(())
}

/// Marks an expense approved by a staff member.
#[instrument(skip(db))]
pub async fn approve_expense(
    db: &DatabaseConnection,
    id: i64,
    approver_id: i64,
) -> Result<moving_expense::Model> {
    let existing = require_expense(db, id).await?;
    let approver = account::require_user(db, approver_id).await?;

    let mut model: moving_expense::ActiveModel = existing.into();
    model.is_approved = Set(true);
    model.approved_by_id = Set(Some(approver.id));
    let expense = model.update(db).await?;
    info!("Expense {} approved by {}", expense.id, approver.username);
    Ok(expense)
}

/// Stores a receipt under `expense_receipts/` and links it to the expense.
#[instrument(skip(db, store, bytes))]
pub async fn attach_receipt(
    db: &DatabaseConnection,
    store: &MediaStore,
    id: i64,
    file_name: &str,
    bytes: &[u8],
) -> Result<moving_expense::Model> {
    let existing = require_expense(db, id).await?;
    let receipt = store
        .save(UploadDir::ExpenseReceipts, file_name, bytes)
        .await?;

    let mut model: moving_expense::ActiveModel = existing.into();
    model.receipt_image = Set(Some(receipt.clone()));
    match model.update(db).await {
        Ok(updated) => Ok(updated),
        Err(e) => {
            store.discard(&receipt).await;
            Err(e.into())
        }
    }
}

/// `"{expense label} - ${amount} - {assignment display}"`
pub async fn expense_display(
    db: &DatabaseConnection,
    expense: &moving_expense::Model,
) -> Result<String> {
    let assignment = assignment::require_assignment(db, expense.assignment_id).await?;
    Ok(format!(
        "{} - ${:.2} - {}",
        expense.expense_type.label(),
        expense.amount,
        assignment::assignment_display(db, &assignment).await?
    ))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;

    fn fuel(assignment_id: i64, submitted_by_id: i64, amount: f64) -> ExpenseForm {
        ExpenseForm {
            assignment_id,
            expense_type: ExpenseType::Fuel,
            amount,
            description: "Diesel".to_string(),
            receipt_image: None,
            date_incurred: date(2024, 5, 1),
            submitted_by_id,
            is_approved: false,
            approved_by_id: None,
        }
    }

    #[tokio::test]
    async fn test_create_expense_integration() -> Result<()> {
        let db = setup_test_db().await?;
        let fixture = setup_assignment(&db).await?;

        let expense = create_expense(
            &db,
            fuel(fixture.assignment.id, fixture.crew.crew_leader_id, 85.5),
        )
        .await?;
        assert!(!expense.is_approved);
        assert_eq!(
            expense_display(&db, &expense).await?,
            "Fuel - $85.50 - Assignment RR-0001 - Crew CR-01"
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_negative_amount_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        let fixture = setup_assignment(&db).await?;

        let result = create_expense(
            &db,
            fuel(fixture.assignment.id, fixture.crew.crew_leader_id, -0.01),
        )
        .await;
        assert!(matches!(
            result,
            Err(Error::Validation {
                field: "amount",
                ..
            })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_approve_and_totals() -> Result<()> {
        let db = setup_test_db().await?;
        let fixture = setup_assignment(&db).await?;
        let manager = create_test_user(&db, "manager").await?;
        let leader = fixture.crew.crew_leader_id;

        let first = create_expense(&db, fuel(fixture.assignment.id, leader, 100.0)).await?;
        create_expense(&db, fuel(fixture.assignment.id, leader, 50.0)).await?;

        let approved = approve_expense(&db, first.id, manager.id).await?;
        assert!(approved.is_approved);
        assert_eq!(approved.approved_by_id, Some(manager.id));

        assert_eq!(
            assignment_expense_total(&db, fixture.assignment.id, false).await?,
            150.0
        );
        assert_eq!(
            assignment_expense_total(&db, fixture.assignment.id, true).await?,
            100.0
        );

        // Approval survives the approver's account as a plain flag
        account::delete_user(&db, manager.id).await?;
        let expense = require_expense(&db, first.id).await?;
        assert!(expense.is_approved);
        assert_eq!(expense.approved_by_id, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_attach_receipt() -> Result<()> {
        let db = setup_test_db().await?;
        let media = tempfile::tempdir()?;
        let store = MediaStore::new(media.path());
        let fixture = setup_assignment(&db).await?;
        let expense = create_expense(
            &db,
            fuel(fixture.assignment.id, fixture.crew.crew_leader_id, 40.0),
        )
        .await?;

        let expense = attach_receipt(&db, &store, expense.id, "receipt.png", b"png").await?;
        assert_eq!(
            expense.receipt_image.as_deref(),
            Some("expense_receipts/receipt.png")
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_submitter_deletion_removes_expense() -> Result<()> {
        let db = setup_test_db().await?;
        let fixture = setup_assignment(&db).await?;
        let helper = create_test_driver(&db, "helper", "DR-55").await?;
        let expense = create_expense(&db, fuel(fixture.assignment.id, helper.id, 12.0)).await?;

        driver::delete_driver(&db, helper.id).await?;
        assert!(matches!(
            require_expense(&db, expense.id).await,
            Err(Error::NotFound { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_receipt_update_leaves_no_file() -> Result<()> {
        let db = setup_test_db().await?;
        let media = tempfile::tempdir()?;
        let store = MediaStore::new(media.path());
        let fixture = setup_assignment(&db).await?;
        let expense = create_expense(
            &db,
            fuel(fixture.assignment.id, fixture.crew.crew_leader_id, 40.0),
        )
        .await?;
        db.execute_unprepared(
            "CREATE TRIGGER expenses_frozen BEFORE UPDATE ON moving_expenses \
             BEGIN SELECT RAISE(ABORT, 'expenses are frozen'); END",
        )
        .await?;

        let result = attach_receipt(&db, &store, expense.id, "receipt.png", b"png").await;
        assert!(matches!(result, Err(Error::Database(_))));
        assert!(!media.path().join("expense_receipts/receipt.png").exists());
        assert_eq!(require_expense(&db, expense.id).await?.receipt_image, None);
        Ok(())
    }
}
