//! Property business logic - addresses, photos and room inventory.

use crate::{
    core::{
        account, client,
        validation::{ensure_unique, max_length, min_amount, min_int, required},
    },
    entities::{
        Property, PropertyImage, PropertyInventory,
        property::{self, PropertyType},
        property_image,
        property_inventory::{self, ItemCondition},
    },
    errors::{Error, Result},
    media::{MediaStore, UploadDir},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Deserialize;
use tracing::{info, instrument};

/// Editable fields of a property
#[derive(Debug, Clone, Deserialize)]
pub struct PropertyForm {
    /// Business identifier, unique
    pub property_id: String,
    /// Owning client
    pub owner_id: i64,
    /// Kind of building
    pub property_type: PropertyType,
    /// Street address
    pub address: String,
    /// City
    pub city: String,
    /// State or region
    pub state: String,
    /// Postal code
    pub zip_code: String,
    /// Country
    #[serde(default = "client::default_country")]
    pub country: String,
    /// Bedrooms, 0 or more
    #[serde(default)]
    pub bedrooms: Option<i32>,
    /// Bathrooms, 0 or more
    #[serde(default)]
    pub bathrooms: Option<f64>,
    /// Floor area, 1 or more
    #[serde(default)]
    pub square_feet: Option<i32>,
    /// Floor, 1 or more
    #[serde(default)]
    pub floor_number: Option<i32>,
    /// Elevator available
    #[serde(default)]
    pub has_elevator: bool,
    /// Parking available
    #[serde(default)]
    pub has_parking: bool,
    /// Storage available
    #[serde(default)]
    pub has_storage: bool,
    /// Access notes for the crew
    #[serde(default)]
    pub access_instructions: String,
    /// Where the keys are kept
    #[serde(default)]
    pub key_location: String,
    /// On-site contact
    #[serde(default)]
    pub contact_person: String,
    /// On-site contact phone
    #[serde(default)]
    pub contact_phone: String,
    /// Active property
    #[serde(default = "account::default_true")]
    pub is_active: bool,
}

impl PropertyForm {
    fn clean(mut self) -> Result<Self> {
        self.property_id = required("property_id", &self.property_id, 20)?;
        self.address = required("address", &self.address, usize::MAX)?;
        self.city = required("city", &self.city, 100)?;
        self.state = required("state", &self.state, 100)?;
        self.zip_code = required("zip_code", &self.zip_code, 10)?;
        self.country = required("country", &self.country, 100)?;
        if let Some(bedrooms) = self.bedrooms {
            min_int("bedrooms", bedrooms, 0)?;
        }
        if let Some(bathrooms) = self.bathrooms {
            min_amount("bathrooms", bathrooms, 0.0)?;
        }
        if let Some(square_feet) = self.square_feet {
            min_int("square_feet", square_feet, 1)?;
        }
        if let Some(floor) = self.floor_number {
            min_int("floor_number", floor, 1)?;
        }
        max_length("key_location", &self.key_location, 200)?;
        max_length("contact_person", &self.contact_person, 200)?;
        max_length("contact_phone", &self.contact_phone, 17)?;
        Ok(self)
    }

    fn apply(self, model: &mut property::ActiveModel) {
        model.property_id = Set(self.property_id);
        model.owner_id = Set(self.owner_id);
        model.property_type = Set(self.property_type);
        model.address = Set(self.address);
        model.city = Set(self.city);
        model.state = Set(self.state);
        model.zip_code = Set(self.zip_code);
        model.country = Set(self.country);
        model.bedrooms = Set(self.bedrooms);
        model.bathrooms = Set(self.bathrooms);
        model.square_feet = Set(self.square_feet);
        model.floor_number = Set(self.floor_number);
        model.has_elevator = Set(self.has_elevator);
        model.has_parking = Set(self.has_parking);
        model.has_storage = Set(self.has_storage);
        model.access_instructions = Set(self.access_instructions);
        model.key_location = Set(self.key_location);
        model.contact_person = Set(self.contact_person);
        model.contact_phone = Set(self.contact_phone);
        model.is_active = Set(self.is_active);
    }
}

async fn check_property_constraints(
    db: &DatabaseConnection,
    form: &PropertyForm,
    exclude: Option<i64>,
) -> Result<()> {
    client::require_client(db, form.owner_id).await?;
    let mut query = Property::find().filter(property::Column::PropertyId.eq(&form.property_id));
    if let Some(id) = exclude {
        query = query.filter(property::Column::Id.ne(id));
    }
    ensure_unique(db, query, "Property", "property_id", &form.property_id).await
}

/// Finds a property by primary key.
pub async fn get_property_by_id(
    db: &DatabaseConnection,
    id: i64,
) -> Result<Option<property::Model>> {
    Property::find_by_id(id).one(db).await.map_err(Into::into)
}

/// Finds a property by primary key, failing if it does not exist.
pub async fn require_property(db: &DatabaseConnection, id: i64) -> Result<property::Model> {
    get_property_by_id(db, id)
        .await?
        .ok_or_else(|| Error::not_found("Property", id))
}

/// Properties owned by a client, newest first.
pub async fn get_properties_for_owner(
    db: &DatabaseConnection,
    owner_id: i64,
) -> Result<Vec<property::Model>> {
    Property::find()
        .filter(property::Column::OwnerId.eq(owner_id))
        .order_by_desc(property::Column::DateCreated)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Registers a property for an existing client.
#[instrument(skip(db, form), fields(property_id = %form.property_id))]
pub async fn create_property(
    db: &DatabaseConnection,
    form: PropertyForm,
) -> Result<property::Model> {
    let form = form.clean()?;
    check_property_constraints(db, &form, None).await?;

    let mut model = property::ActiveModel {
        ..Default::default()
    };
    form.apply(&mut model);
    let property = model.insert(db).await?;
    info!("Registered property {}", property);
    Ok(property)
}

/// Replaces every editable field of a property.
#[instrument(skip(db, form))]
pub async fn update_property(
    db: &DatabaseConnection,
    id: i64,
    form: PropertyForm,
) -> Result<property::Model> {
    let form = form.clean()?;
    let existing = require_property(db, id).await?;
    check_property_constraints(db, &form, Some(id)).await?;

    let mut model: property::ActiveModel = existing.into();
    form.apply(&mut model);
    model.update(db).await.map_err(Into::into)
}

/// Deletes a property with its images, inventory and every request touching it.
#[instrument(skip(db))]
pub async fn delete_property(db: &DatabaseConnection, id: i64) -> Result<()> {
    let result = Property::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("Property", id));
    }
    info!("Deleted property {}", id);
    Ok(())
}

/// Editable fields of a property photo
#[derive(Debug, Clone, Deserialize)]
pub struct PropertyImageForm {
    /// Property shown
    pub property_id: i64,
    /// Stored file, relative to the media root
    pub image: String,
    /// Caption
    #[serde(default)]
    pub caption: String,
    /// Main photo of the property
    #[serde(default)]
    pub is_primary: bool,
}

impl PropertyImageForm {
    fn clean(mut self) -> Result<Self> {
        self.image = required("image", &self.image, 100)?;
        max_length("caption", &self.caption, 200)?;
        Ok(self)
    }

    fn apply(self, model: &mut property_image::ActiveModel) {
        model.property_id = Set(self.property_id);
        model.image = Set(self.image);
        model.caption = Set(self.caption);
        model.is_primary = Set(self.is_primary);
    }
}

/// Finds a photo by primary key, failing if it does not exist.
pub async fn require_image(db: &DatabaseConnection, id: i64) -> Result<property_image::Model> {
    PropertyImage::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Property image", id))
}

/// Photos of a property in upload order.
pub async fn get_images_for_property(
    db: &DatabaseConnection,
    property_id: i64,
) -> Result<Vec<property_image::Model>> {
    PropertyImage::find()
        .filter(property_image::Column::PropertyId.eq(property_id))
        .order_by_asc(property_image::Column::UploadedAt)
        .order_by_asc(property_image::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Records a photo whose file is already in media storage.
pub async fn create_image(
    db: &DatabaseConnection,
    form: PropertyImageForm,
) -> Result<property_image::Model> {
    let form = form.clean()?;
    require_property(db, form.property_id).await?;

    let mut model = property_image::ActiveModel {
        ..Default::default()
    };
    form.apply(&mut model);
    model.insert(db).await.map_err(Into::into)
}

/// Replaces every editable field of a photo.
pub async fn update_image(
    db: &DatabaseConnection,
    id: i64,
    form: PropertyImageForm,
) -> Result<property_image::Model> {
    let form = form.clean()?;
    let existing = require_image(db, id).await?;
    require_property(db, form.property_id).await?;

    let mut model: property_image::ActiveModel = existing.into();
    form.apply(&mut model);
    model.update(db).await.map_err(Into::into)
}

/// Stores `bytes` under `property_images/` and attaches the photo.
#[instrument(skip(db, store, bytes))]
pub async fn upload_image(
    db: &DatabaseConnection,
    store: &MediaStore,
    property_id: i64,
    file_name: &str,
    caption: &str,
    is_primary: bool,
    bytes: &[u8],
) -> Result<property_image::Model> {
    require_property(db, property_id).await?;
    let image = store.save(UploadDir::PropertyImages, file_name, bytes).await?;
    let created = create_image(
        db,
        PropertyImageForm {
            property_id,
            image: image.clone(),
            caption: caption.to_string(),
            is_primary,
        },
    )
    .await;
    if created.is_err() {
        store.discard(&image).await;
    }
    created
}

/// Removes a photo record. The stored file is left in place.
pub async fn delete_image(db: &DatabaseConnection, id: i64) -> Result<()> {
    let result = PropertyImage::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("Property image", id));
    }
    Ok(())
}

/// `"Image for {property_id}"`
pub async fn image_display(db: &DatabaseConnection, image: &property_image::Model) -> Result<String> {
    let property = require_property(db, image.property_id).await?;
    Ok(format!("Image for {}", property.property_id))
}

/// Editable fields of an inventory item
#[derive(Debug, Clone, Deserialize)]
pub struct InventoryForm {
    /// Property the item is in
    pub property_id: i64,
    /// Room name
    pub room: String,
    /// Item name
    pub item_name: String,
    /// Free-text description
    #[serde(default)]
    pub description: String,
    /// Current condition
    #[serde(default)]
    pub condition: ItemCondition,
    /// Estimated value
    #[serde(default)]
    pub estimated_value: Option<f64>,
    /// Breakable
    #[serde(default)]
    pub is_fragile: bool,
    /// Needs special handling
    #[serde(default)]
    pub requires_special_handling: bool,
    /// Handling notes
    #[serde(default)]
    pub special_instructions: String,
}

impl InventoryForm {
    fn clean(mut self) -> Result<Self> {
        self.room = required("room", &self.room, 100)?;
        self.item_name = required("item_name", &self.item_name, 200)?;
        if let Some(value) = self.estimated_value {
            min_amount("estimated_value", value, 0.0)?;
        }
        Ok(self)
    }

    fn apply(self, model: &mut property_inventory::ActiveModel) {
        model.property_id = Set(self.property_id);
        model.room = Set(self.room);
        model.item_name = Set(self.item_name);
        model.description = Set(self.description);
        model.condition = Set(self.condition);
        model.estimated_value = Set(self.estimated_value);
        model.is_fragile = Set(self.is_fragile);
        model.requires_special_handling = Set(self.requires_special_handling);
        model.special_instructions = Set(self.special_instructions);
    }
}

/// Finds an inventory item by primary key, failing if it does not exist.
pub async fn require_inventory_item(
    db: &DatabaseConnection,
    id: i64,
) -> Result<property_inventory::Model> {
    PropertyInventory::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Property inventory", id))
}

/// Inventory of a property, grouped by room.
pub async fn get_inventory_for_property(
    db: &DatabaseConnection,
    property_id: i64,
) -> Result<Vec<property_inventory::Model>> {
    PropertyInventory::find()
        .filter(property_inventory::Column::PropertyId.eq(property_id))
        .order_by_asc(property_inventory::Column::Room)
        .order_by_asc(property_inventory::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Records an inventory item.
#[instrument(skip(db, form), fields(property = form.property_id))]
pub async fn create_inventory_item(
    db: &DatabaseConnection,
    form: InventoryForm,
) -> Result<property_inventory::Model> {
    let form = form.clean()?;
    require_property(db, form.property_id).await?;

    let mut model = property_inventory::ActiveModel {
        ..Default::default()
    };
    form.apply(&mut model);
    model.insert(db).await.map_err(Into::into)
}

/// Replaces every editable field of an inventory item.
pub async fn update_inventory_item(
    db: &DatabaseConnection,
    id: i64,
    form: InventoryForm,
) -> Result<property_inventory::Model> {
    let form = form.clean()?;
    let existing = require_inventory_item(db, id).await?;
    require_property(db, form.property_id).await?;

    let mut model: property_inventory::ActiveModel = existing.into();
    form.apply(&mut model);
    model.update(db).await.map_err(Into::into)
}

/// Deletes an inventory item.
pub async fn delete_inventory_item(db: &DatabaseConnection, id: i64) -> Result<()> {
    let result = PropertyInventory::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("Property inventory", id));
    }
    Ok(())
}

/// `"{item_name} - {property_id}"`
pub async fn inventory_display(
    db: &DatabaseConnection,
    item: &property_inventory::Model,
) -> Result<String> {
    let property = require_property(db, item.property_id).await?;
    Ok(format!("{} - {}", item.item_name, property.property_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_property_integration() -> Result<()> {
        let db = setup_test_db().await?;
        let owner = create_test_client(&db, "CL-0001").await?;

        let property = create_test_property(&db, owner.id, "PR-0001").await?;
        assert_eq!(property.to_string(), "PR-0001 - 12 Elm Street, Springfield");
        assert_eq!(property.country, "United States");
        assert!(property.is_active);

        let owned = get_properties_for_owner(&db, owner.id).await?;
        assert_eq!(owned.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_property_minimums() -> Result<()> {
        let db = setup_test_db().await?;
        let owner = create_test_client(&db, "CL-0001").await?;

        let mut form = property_form(owner.id, "PR-0001");
        form.bedrooms = Some(0);
        form.bathrooms = Some(1.5);
        assert!(create_property(&db, form).await.is_ok());

        let mut form = property_form(owner.id, "PR-0002");
        form.square_feet = Some(0);
        assert!(matches!(
            create_property(&db, form).await,
            Err(Error::Validation {
                field: "square_feet",
                ..
            })
        ));

        let mut form = property_form(owner.id, "PR-0002");
        form.floor_number = Some(0);
        assert!(matches!(
            create_property(&db, form).await,
            Err(Error::Validation {
                field: "floor_number",
                ..
            })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_property_id_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        let owner = create_test_client(&db, "CL-0001").await?;
        create_test_property(&db, owner.id, "PR-0001").await?;

        let result = create_test_property(&db, owner.id, "PR-0001").await;
        assert!(matches!(
            result,
            Err(Error::Duplicate {
                field: "property_id",
                ..
            })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_property_requires_owner() -> Result<()> {
        let db = setup_test_db().await?;
        let result = create_test_property(&db, 99, "PR-0001").await;
        assert!(matches!(
            result,
            Err(Error::NotFound {
                entity: "Client",
                ..
            })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_images_and_inventory_cascade() -> Result<()> {
        let db = setup_test_db().await?;
        let media = tempfile::tempdir()?;
        let store = MediaStore::new(media.path());
        let owner = create_test_client(&db, "CL-0001").await?;
        let property = create_test_property(&db, owner.id, "PR-0001").await?;

        let image = upload_image(&db, &store, property.id, "front.jpg", "Front", true, b"img")
            .await?;
        assert_eq!(image.image, "property_images/front.jpg");
        assert_eq!(image_display(&db, &image).await?, "Image for PR-0001");

        let item = create_inventory_item(
            &db,
            InventoryForm {
                property_id: property.id,
                room: "Living room".to_string(),
                item_name: "Piano".to_string(),
                description: String::new(),
                condition: ItemCondition::default(),
                estimated_value: Some(4000.0),
                is_fragile: true,
                requires_special_handling: true,
                special_instructions: "Two people minimum".to_string(),
            },
        )
        .await?;
        assert_eq!(item.condition, ItemCondition::Good);
        assert_eq!(inventory_display(&db, &item).await?, "Piano - PR-0001");

        client::delete_client(&db, owner.id).await?;
        assert!(get_property_by_id(&db, property.id).await?.is_none());
        assert!(get_images_for_property(&db, property.id).await?.is_empty());
        assert!(get_inventory_for_property(&db, property.id).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_negative_estimated_value_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        let owner = create_test_client(&db, "CL-0001").await?;
        let property = create_test_property(&db, owner.id, "PR-0001").await?;

        let result = create_inventory_item(
            &db,
            InventoryForm {
                property_id: property.id,
                room: "Kitchen".to_string(),
                item_name: "Table".to_string(),
                description: String::new(),
                condition: ItemCondition::Fair,
                estimated_value: Some(-1.0),
                is_fragile: false,
                requires_special_handling: false,
                special_instructions: String::new(),
            },
        )
        .await;
        assert!(matches!(
            result,
            Err(Error::Validation {
                field: "estimated_value",
                ..
            })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_rejected_image_leaves_no_file() -> Result<()> {
        let db = setup_test_db().await?;
        let media = tempfile::tempdir()?;
        let store = MediaStore::new(media.path());
        let owner = create_test_client(&db, "CL-0001").await?;
        let property = create_test_property(&db, owner.id, "PR-0001").await?;

        let caption = "c".repeat(201);
        let result =
            upload_image(&db, &store, property.id, "back.jpg", &caption, false, b"img").await;
        assert!(matches!(
            result,
            Err(Error::Validation {
                field: "caption",
                ..
            })
        ));
        assert!(!media.path().join("property_images/back.jpg").exists());
        Ok(())
    }
}
