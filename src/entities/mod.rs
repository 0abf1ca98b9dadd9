//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod client;
pub mod client_document;
pub mod crew_member;
pub mod crew_vehicle;
pub mod driver;
pub mod inventory_transfer;
pub mod moving_assignment;
pub mod moving_crew;
pub mod moving_expense;
pub mod property;
pub mod property_image;
pub mod property_inventory;
pub mod relocation_quote;
pub mod relocation_request;
pub mod relocation_timeline;
pub mod user;
pub mod vehicle;

use sea_orm::ActiveEnum;

// Re-export specific types to avoid conflicts
pub use client::{Column as ClientColumn, Entity as Client, Model as ClientModel};
pub use client_document::{
    Column as ClientDocumentColumn, Entity as ClientDocument, Model as ClientDocumentModel,
};
pub use crew_member::{Entity as CrewMember, Model as CrewMemberModel};
pub use crew_vehicle::{Entity as CrewVehicle, Model as CrewVehicleModel};
pub use driver::{Column as DriverColumn, Entity as Driver, Model as DriverModel};
pub use inventory_transfer::{
    Column as InventoryTransferColumn, Entity as InventoryTransfer, Model as InventoryTransferModel,
};
pub use moving_assignment::{
    Column as MovingAssignmentColumn, Entity as MovingAssignment, Model as MovingAssignmentModel,
};
pub use moving_crew::{Column as MovingCrewColumn, Entity as MovingCrew, Model as MovingCrewModel};
pub use moving_expense::{
    Column as MovingExpenseColumn, Entity as MovingExpense, Model as MovingExpenseModel,
};
pub use property::{Column as PropertyColumn, Entity as Property, Model as PropertyModel};
pub use property_image::{
    Column as PropertyImageColumn, Entity as PropertyImage, Model as PropertyImageModel,
};
pub use property_inventory::{
    Column as PropertyInventoryColumn, Entity as PropertyInventory, Model as PropertyInventoryModel,
};
pub use relocation_quote::{
    Column as RelocationQuoteColumn, Entity as RelocationQuote, Model as RelocationQuoteModel,
};
pub use relocation_request::{
    Column as RelocationRequestColumn, Entity as RelocationRequest, Model as RelocationRequestModel,
};
pub use relocation_timeline::{
    Column as RelocationTimelineColumn, Entity as RelocationTimeline,
    Model as RelocationTimelineModel,
};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};
pub use vehicle::{Column as VehicleColumn, Entity as Vehicle, Model as VehicleModel};

/// A labelled choice stored as its snake_case value.
///
/// Implemented by every status/type enumeration so the admin surface can show the
/// human label and parse filter values without knowing the concrete enum.
pub trait Choice: ActiveEnum<Value = String> + Copy {
    /// Human-readable label
    fn label(&self) -> &'static str;
}
