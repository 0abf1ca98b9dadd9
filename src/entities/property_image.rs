//! Property image entity - photos attached to a property.

use sea_orm::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Property image database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "property_images")]
pub struct Model {
    /// Surrogate key
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Property shown in the photo
    pub property_id: i64,
    /// Path relative to the media root, under `property_images/`
    pub image: String,
    /// Optional caption
    pub caption: String,
    /// Marks the photo shown first
    pub is_primary: bool,
    /// When the photo was uploaded
    pub uploaded_at: DateTimeUtc,
}

/// Each image belongs to one property
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Property shown
    #[sea_orm(
        belongs_to = "super::property::Entity",
        from = "Column::PropertyId",
        to = "super::property::Column::Id",
        on_delete = "Cascade"
    )]
    Property,
}

impl Related<super::property::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Property.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if insert {
            self.uploaded_at = Set(chrono::Utc::now());
        }
        Ok(self)
    }
}
