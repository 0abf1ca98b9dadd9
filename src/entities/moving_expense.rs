//! Moving expense entity - costs a driver incurred on an assignment.

use super::Choice;
use sea_orm::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Expense category
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum ExpenseType {
    /// Fuel
    #[sea_orm(string_value = "fuel")]
    Fuel,
    /// Road tolls
    #[sea_orm(string_value = "tolls")]
    Tolls,
    /// Parking
    #[sea_orm(string_value = "parking")]
    Parking,
    /// Meals
    #[sea_orm(string_value = "meals")]
    Meals,
    /// Overnight stays
    #[sea_orm(string_value = "accommodation")]
    Accommodation,
    /// Rented equipment
    #[sea_orm(string_value = "equipment_rental")]
    EquipmentRental,
    /// Vehicle repairs
    #[sea_orm(string_value = "repairs")]
    Repairs,
    /// Anything else
    #[sea_orm(string_value = "other")]
    Other,
}

impl Choice for ExpenseType {
    fn label(&self) -> &'static str {
        match self {
            Self::Fuel => "Fuel",
            Self::Tolls => "Tolls",
            Self::Parking => "Parking",
            Self::Meals => "Meals",
            Self::Accommodation => "Accommodation",
            Self::EquipmentRental => "Equipment Rental",
            Self::Repairs => "Vehicle Repairs",
            Self::Other => "Other",
        }
    }
}

/// Moving expense database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "moving_expenses")]
pub struct Model {
    /// Surrogate key
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Assignment the cost belongs to
    pub assignment_id: i64,
    /// Category
    pub expense_type: ExpenseType,
    /// Amount in dollars
    pub amount: f64,
    /// What was paid for
    pub description: String,
    /// Receipt scan, relative to the media root under `expense_receipts/`
    pub receipt_image: Option<String>,
    /// Day the cost was incurred
    pub date_incurred: Date,
    /// Driver claiming the expense
    pub submitted_by_id: i64,
    /// Approved for reimbursement
    pub is_approved: bool,
    /// Staff member who approved it
    pub approved_by_id: Option<i64>,
    /// When the claim was entered
    pub date_created: DateTimeUtc,
}

/// Defines relationships between `MovingExpense` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Assignment the cost belongs to
    #[sea_orm(
        belongs_to = "super::moving_assignment::Entity",
        from = "Column::AssignmentId",
        to = "super::moving_assignment::Column::Id",
        on_delete = "Cascade"
    )]
    Assignment,
    /// Claiming driver
    #[sea_orm(
        belongs_to = "super::driver::Entity",
        from = "Column::SubmittedById",
        to = "super::driver::Column::Id",
        on_delete = "Cascade"
    )]
    SubmittedBy,
    /// Approving staff member
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ApprovedById",
        to = "super::user::Column::Id",
        on_delete = "SetNull"
    )]
    ApprovedBy,
}

impl Related<super::moving_assignment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assignment.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if insert {
            self.date_created = Set(chrono::Utc::now());
        }
        Ok(self)
    }
}
