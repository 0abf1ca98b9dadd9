//! Database configuration module.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so unique constraints and foreign keys (including their `ON DELETE` actions) follow the
//! Rust structs without hand-written SQL.

use crate::entities::{
    Client, ClientDocument, CrewMember, CrewVehicle, Driver, InventoryTransfer, MovingAssignment,
    MovingCrew, MovingExpense, Property, PropertyImage, PropertyInventory, RelocationQuote,
    RelocationRequest, RelocationTimeline, User, Vehicle,
};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema, Statement};
use tracing::{debug, info, instrument};

/// Local `SQLite` file used when nothing else is configured
pub const DEFAULT_DATABASE_URL: &str = "sqlite://relocation_desk.sqlite?mode=rwc";

/// Opens a connection and makes sure every table exists.
#[instrument]
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    debug!("Connecting to {}", database_url);
    let db = Database::connect(database_url).await?;
    create_tables(&db).await?;
    Ok(db)
}

async fn create_table<E>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<()>
where
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

/// Creates all tables that do not exist yet, parents before children.
///
/// Foreign key enforcement is switched on first so cascading deletes behave the same on
/// every connection.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    db.execute(Statement::from_string(
        builder,
        "PRAGMA foreign_keys = ON;".to_string(),
    ))
    .await?;

    let schema = Schema::new(builder);

    create_table(db, &schema, User).await?;
    create_table(db, &schema, Client).await?;
    create_table(db, &schema, ClientDocument).await?;
    create_table(db, &schema, Property).await?;
    create_table(db, &schema, PropertyImage).await?;
    create_table(db, &schema, PropertyInventory).await?;
    create_table(db, &schema, RelocationRequest).await?;
    create_table(db, &schema, RelocationQuote).await?;
    create_table(db, &schema, RelocationTimeline).await?;
    create_table(db, &schema, Vehicle).await?;
    create_table(db, &schema, Driver).await?;
    create_table(db, &schema, MovingCrew).await?;
    create_table(db, &schema, CrewMember).await?;
    create_table(db, &schema, CrewVehicle).await?;
    create_table(db, &schema, MovingAssignment).await?;
    create_table(db, &schema, InventoryTransfer).await?;
    create_table(db, &schema, MovingExpense).await?;

    info!("Database tables ensured");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{ClientModel, MovingExpenseModel, RelocationQuoteModel, VehicleModel};
    use sea_orm::QuerySelect;

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Test that tables exist by querying them
        let _: Vec<ClientModel> = Client::find().limit(1).all(&db).await?;
        let _: Vec<RelocationQuoteModel> = RelocationQuote::find().limit(1).all(&db).await?;
        let _: Vec<VehicleModel> = Vehicle::find().limit(1).all(&db).await?;
        let _: Vec<MovingExpenseModel> = MovingExpense::find().limit(1).all(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_idempotent() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_create_connection() -> Result<()> {
        let db = create_connection("sqlite::memory:").await?;
        let _: Vec<ClientModel> = Client::find().limit(1).all(&db).await?;
        Ok(())
    }
}
