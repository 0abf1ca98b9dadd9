use super::{
    Detail, Fieldset, Inline, ListQuery, ModelAdmin, label, matches_term, optional,
    optional_money, search_any, stamp, yes_no,
};
use crate::{
    core::{
        client,
        property::{self, InventoryForm, PropertyForm, PropertyImageForm},
    },
    entities::{
        Property, PropertyImage, PropertyInventory, client as client_entity,
        property::{self as property_entity, PropertyType},
        property_image,
        property_inventory::{self, ItemCondition},
    },
    errors::Result,
};
use async_trait::async_trait;
use sea_orm::{Condition, JoinType, QueryOrder, QuerySelect, prelude::*};

/// Addresses moved from or to
pub struct PropertyAdmin;

#[async_trait]
impl ModelAdmin for PropertyAdmin {
    type Model = property_entity::Model;
    type Form = PropertyForm;

    const VERBOSE_NAME: &'static str = "Property";
    const LIST_DISPLAY: &'static [&'static str] = &[
        "property_id",
        "owner",
        "property_type",
        "city",
        "state",
        "bedrooms",
        "bathrooms",
        "square_feet",
        "is_active",
    ];
    const SEARCH_FIELDS: &'static [&'static str] = &[
        "property_id",
        "owner__first_name",
        "owner__last_name",
        "address",
        "city",
    ];
    const LIST_FILTER: &'static [&'static str] = &[
        "property_type",
        "is_active",
        "city",
        "state",
        "has_elevator",
        "has_parking",
    ];

    fn id(model: &property_entity::Model) -> i64 {
        model.id
    }

    async fn get(db: &DatabaseConnection, id: i64) -> Result<property_entity::Model> {
        property::require_property(db, id).await
    }

    async fn list(
        db: &DatabaseConnection,
        query: &ListQuery,
        limit: u64,
    ) -> Result<Vec<property_entity::Model>> {
        query.check_filters(Self::LIST_FILTER)?;
        let mut select =
            Property::find().join(JoinType::InnerJoin, property_entity::Relation::Owner.def());
        if let Some(term) = query.term() {
            select = select.filter(
                Condition::any()
                    .add(search_any(
                        &[
                            property_entity::Column::PropertyId,
                            property_entity::Column::Address,
                            property_entity::Column::City,
                        ],
                        term,
                    ))
                    .add(search_any(
                        &[
                            client_entity::Column::FirstName,
                            client_entity::Column::LastName,
                        ],
                        term,
                    )),
            );
        }
        if let Some(kind) = query.choice::<PropertyType>("property_type")? {
            select = select.filter(property_entity::Column::PropertyType.eq(kind));
        }
        if let Some(active) = query.flag("is_active")? {
            select = select.filter(property_entity::Column::IsActive.eq(active));
        }
        if let Some(city) = query.text("city") {
            select = select.filter(property_entity::Column::City.eq(city));
        }
        if let Some(state) = query.text("state") {
            select = select.filter(property_entity::Column::State.eq(state));
        }
        if let Some(elevator) = query.flag("has_elevator")? {
            select = select.filter(property_entity::Column::HasElevator.eq(elevator));
        }
        if let Some(parking) = query.flag("has_parking")? {
            select = select.filter(property_entity::Column::HasParking.eq(parking));
        }
        Ok(select
            .order_by_desc(property_entity::Column::DateCreated)
            .order_by_desc(property_entity::Column::Id)
            .limit(limit)
            .all(db)
            .await?)
    }

    async fn row(db: &DatabaseConnection, model: &property_entity::Model) -> Result<Vec<String>> {
        let owner = client::require_client(db, model.owner_id).await?;
        Ok(vec![
            model.property_id.clone(),
            owner.to_string(),
            label(model.property_type),
            model.city.clone(),
            model.state.clone(),
            optional(model.bedrooms),
            optional(model.bathrooms.map(|b| format!("{b:.1}"))),
            optional(model.square_feet),
            yes_no(model.is_active),
        ])
    }

    async fn detail(db: &DatabaseConnection, model: &property_entity::Model) -> Result<Detail> {
        let owner = client::require_client(db, model.owner_id).await?;
        let images = property::get_images_for_property(db, model.id).await?;
        let inventory = property::get_inventory_for_property(db, model.id).await?;
        Ok(Detail {
            title: model.to_string(),
            fieldsets: vec![
                Fieldset::new("Basic Information")
                    .field("property_id", &model.property_id)
                    .field("owner", owner.to_string())
                    .field("property_type", label(model.property_type)),
                Fieldset::new("Location")
                    .field("address", &model.address)
                    .field("city", &model.city)
                    .field("state", &model.state)
                    .field("zip_code", &model.zip_code)
                    .field("country", &model.country),
                Fieldset::new("Property Details")
                    .field("bedrooms", optional(model.bedrooms))
                    .field(
                        "bathrooms",
                        optional(model.bathrooms.map(|b| format!("{b:.1}"))),
                    )
                    .field("square_feet", optional(model.square_feet))
                    .field("floor_number", optional(model.floor_number))
                    .field("has_elevator", yes_no(model.has_elevator))
                    .field("has_parking", yes_no(model.has_parking))
                    .field("has_storage", yes_no(model.has_storage)),
                Fieldset::new("Access Information")
                    .field("access_instructions", &model.access_instructions)
                    .field("key_location", &model.key_location)
                    .field("contact_person", &model.contact_person)
                    .field("contact_phone", &model.contact_phone),
                Fieldset::new("Status")
                    .field("is_active", yes_no(model.is_active))
                    .field("date_created", stamp(model.date_created))
                    .field("date_updated", stamp(model.date_updated)),
            ],
            inlines: vec![
                Inline {
                    name: "Property images",
                    table: PropertyImageAdmin::table(db, &images).await?,
                },
                Inline {
                    name: "Property inventory",
                    table: PropertyInventoryAdmin::table(db, &inventory).await?,
                },
            ],
        })
    }

    async fn create(db: &DatabaseConnection, form: PropertyForm) -> Result<property_entity::Model> {
        property::create_property(db, form).await
    }

    async fn update(
        db: &DatabaseConnection,
        id: i64,
        form: PropertyForm,
    ) -> Result<property_entity::Model> {
        property::update_property(db, id, form).await
    }

    async fn delete(db: &DatabaseConnection, id: i64) -> Result<()> {
        property::delete_property(db, id).await
    }
}

/// Property photos
pub struct PropertyImageAdmin;

#[async_trait]
impl ModelAdmin for PropertyImageAdmin {
    type Model = property_image::Model;
    type Form = PropertyImageForm;

    const VERBOSE_NAME: &'static str = "Property image";
    const LIST_DISPLAY: &'static [&'static str] =
        &["property", "image", "caption", "is_primary", "uploaded_at"];
    const SEARCH_FIELDS: &'static [&'static str] = &[];
    const LIST_FILTER: &'static [&'static str] = &[];

    fn id(model: &property_image::Model) -> i64 {
        model.id
    }

    async fn get(db: &DatabaseConnection, id: i64) -> Result<property_image::Model> {
        property::require_image(db, id).await
    }

    async fn list(
        db: &DatabaseConnection,
        query: &ListQuery,
        limit: u64,
    ) -> Result<Vec<property_image::Model>> {
        query.check_filters(Self::LIST_FILTER)?;
        Ok(PropertyImage::find()
            .order_by_desc(property_image::Column::UploadedAt)
            .order_by_desc(property_image::Column::Id)
            .limit(limit)
            .all(db)
            .await?)
    }

    async fn row(db: &DatabaseConnection, model: &property_image::Model) -> Result<Vec<String>> {
        let owner = property::require_property(db, model.property_id).await?;
        Ok(vec![
            owner.property_id,
            model.image.clone(),
            model.caption.clone(),
            yes_no(model.is_primary),
            stamp(model.uploaded_at),
        ])
    }

    async fn detail(db: &DatabaseConnection, model: &property_image::Model) -> Result<Detail> {
        let owner = property::require_property(db, model.property_id).await?;
        Ok(Detail {
            title: property::image_display(db, model).await?,
            fieldsets: vec![
                Fieldset::new("Image")
                    .field("property", owner.to_string())
                    .field("image", &model.image)
                    .field("caption", &model.caption)
                    .field("is_primary", yes_no(model.is_primary))
                    .field("uploaded_at", stamp(model.uploaded_at)),
            ],
            inlines: Vec::new(),
        })
    }

    async fn create(
        db: &DatabaseConnection,
        form: PropertyImageForm,
    ) -> Result<property_image::Model> {
        property::create_image(db, form).await
    }

    async fn update(
        db: &DatabaseConnection,
        id: i64,
        form: PropertyImageForm,
    ) -> Result<property_image::Model> {
        property::update_image(db, id, form).await
    }

    async fn delete(db: &DatabaseConnection, id: i64) -> Result<()> {
        property::delete_image(db, id).await
    }
}

/// Room-by-room inventory
pub struct PropertyInventoryAdmin;

#[async_trait]
impl ModelAdmin for PropertyInventoryAdmin {
    type Model = property_inventory::Model;
    type Form = InventoryForm;

    const VERBOSE_NAME: &'static str = "Property inventory";
    const LIST_DISPLAY: &'static [&'static str] = &[
        "property",
        "room",
        "item_name",
        "condition",
        "is_fragile",
        "estimated_value",
    ];
    const SEARCH_FIELDS: &'static [&'static str] =
        &["property__property_id", "item_name", "room", "description"];
    const LIST_FILTER: &'static [&'static str] = &[
        "condition",
        "is_fragile",
        "requires_special_handling",
        "property_type",
    ];

    fn id(model: &property_inventory::Model) -> i64 {
        model.id
    }

    async fn get(db: &DatabaseConnection, id: i64) -> Result<property_inventory::Model> {
        property::require_inventory_item(db, id).await
    }

    async fn list(
        db: &DatabaseConnection,
        query: &ListQuery,
        limit: u64,
    ) -> Result<Vec<property_inventory::Model>> {
        query.check_filters(Self::LIST_FILTER)?;
        let mut select = PropertyInventory::find()
            .join(JoinType::InnerJoin, property_inventory::Relation::Property.def());
        if let Some(term) = query.term() {
            select = select.filter(
                Condition::any()
                    .add(matches_term(property_entity::Column::PropertyId, term))
                    .add(search_any(
                        &[
                            property_inventory::Column::ItemName,
                            property_inventory::Column::Room,
                            property_inventory::Column::Description,
                        ],
                        term,
                    )),
            );
        }
        if let Some(condition) = query.choice::<ItemCondition>("condition")? {
            select = select.filter(property_inventory::Column::Condition.eq(condition));
        }
        if let Some(fragile) = query.flag("is_fragile")? {
            select = select.filter(property_inventory::Column::IsFragile.eq(fragile));
        }
        if let Some(special) = query.flag("requires_special_handling")? {
            select =
                select.filter(property_inventory::Column::RequiresSpecialHandling.eq(special));
        }
        if let Some(kind) = query.choice::<PropertyType>("property_type")? {
            select = select.filter(property_entity::Column::PropertyType.eq(kind));
        }
        Ok(select
            .order_by_desc(property_inventory::Column::Id)
            .limit(limit)
            .all(db)
            .await?)
    }

    async fn row(
        db: &DatabaseConnection,
        model: &property_inventory::Model,
    ) -> Result<Vec<String>> {
        let owner = property::require_property(db, model.property_id).await?;
        Ok(vec![
            owner.to_string(),
            model.room.clone(),
            model.item_name.clone(),
            label(model.condition),
            yes_no(model.is_fragile),
            optional_money(model.estimated_value),
        ])
    }

    async fn detail(db: &DatabaseConnection, model: &property_inventory::Model) -> Result<Detail> {
        let owner = property::require_property(db, model.property_id).await?;
        Ok(Detail {
            title: property::inventory_display(db, model).await?,
            fieldsets: vec![
                Fieldset::new("Item")
                    .field("property", owner.to_string())
                    .field("room", &model.room)
                    .field("item_name", &model.item_name)
                    .field("description", &model.description)
                    .field("condition", label(model.condition))
                    .field("estimated_value", optional_money(model.estimated_value)),
                Fieldset::new("Handling")
                    .field("is_fragile", yes_no(model.is_fragile))
                    .field(
                        "requires_special_handling",
                        yes_no(model.requires_special_handling),
                    )
                    .field("special_instructions", &model.special_instructions)
                    .field("date_created", stamp(model.date_created)),
            ],
            inlines: Vec::new(),
        })
    }

    async fn create(
        db: &DatabaseConnection,
        form: InventoryForm,
    ) -> Result<property_inventory::Model> {
        property::create_inventory_item(db, form).await
    }

    async fn update(
        db: &DatabaseConnection,
        id: i64,
        form: InventoryForm,
    ) -> Result<property_inventory::Model> {
        property::update_inventory_item(db, id, form).await
    }

    async fn delete(db: &DatabaseConnection, id: i64) -> Result<()> {
        property::delete_inventory_item(db, id).await
    }
}
