use super::{
    Detail, Fieldset, Inline, ListQuery, ModelAdmin, label, matches_term, money, optional,
    optional_date, optional_money, optional_stamp, search_any, stamp, yes_no,
};
use crate::{
    core::{
        account, client, property,
        quote::{self, QuoteForm},
        relocation::{self, RequestForm},
        timeline::{self, TimelineForm},
    },
    entities::{
        RelocationQuote, RelocationRequest, RelocationTimeline, client as client_entity,
        property as property_entity,
        relocation_quote::{self, QuoteStatus},
        relocation_request::{self, Priority, RelocationType, RequestStatus},
        relocation_timeline::{self, MilestoneType},
    },
    errors::Result,
};
use async_trait::async_trait;
use sea_orm::{Condition, JoinType, QueryOrder, QuerySelect, prelude::*};

async fn user_name(db: &DatabaseConnection, user_id: Option<i64>) -> Result<String> {
    let user = match user_id {
        Some(id) => account::get_user_by_id(db, id).await?,
        None => None,
    };
    Ok(optional(user))
}

/// Move orders
pub struct RequestAdmin;

#[async_trait]
impl ModelAdmin for RequestAdmin {
    type Model = relocation_request::Model;
    type Form = RequestForm;

    const VERBOSE_NAME: &'static str = "Relocation request";
    const LIST_DISPLAY: &'static [&'static str] = &[
        "request_id",
        "client",
        "relocation_type",
        "status",
        "priority",
        "preferred_date",
        "assigned_to",
        "estimated_cost",
    ];
    const SEARCH_FIELDS: &'static [&'static str] = &[
        "request_id",
        "client__first_name",
        "client__last_name",
        "origin_property__address",
    ];
    const LIST_FILTER: &'static [&'static str] = &[
        "status",
        "priority",
        "relocation_type",
        "requires_packing",
        "requires_storage",
    ];

    fn id(model: &relocation_request::Model) -> i64 {
        model.id
    }

    async fn get(db: &DatabaseConnection, id: i64) -> Result<relocation_request::Model> {
        relocation::require_request(db, id).await
    }

    async fn list(
        db: &DatabaseConnection,
        query: &ListQuery,
        limit: u64,
    ) -> Result<Vec<relocation_request::Model>> {
        query.check_filters(Self::LIST_FILTER)?;
        let mut select = RelocationRequest::find()
            .join(JoinType::InnerJoin, relocation_request::Relation::Client.def())
            .join(
                JoinType::InnerJoin,
                relocation_request::Relation::OriginProperty.def(),
            );
        if let Some(term) = query.term() {
            select = select.filter(
                Condition::any()
                    .add(matches_term(relocation_request::Column::RequestId, term))
                    .add(search_any(
                        &[
                            client_entity::Column::FirstName,
                            client_entity::Column::LastName,
                        ],
                        term,
                    ))
                    .add(matches_term(property_entity::Column::Address, term)),
            );
        }
        if let Some(status) = query.choice::<RequestStatus>("status")? {
            select = select.filter(relocation_request::Column::Status.eq(status));
        }
        if let Some(priority) = query.choice::<Priority>("priority")? {
            select = select.filter(relocation_request::Column::Priority.eq(priority));
        }
        if let Some(kind) = query.choice::<RelocationType>("relocation_type")? {
            select = select.filter(relocation_request::Column::RelocationType.eq(kind));
        }
        if let Some(packing) = query.flag("requires_packing")? {
            select = select.filter(relocation_request::Column::RequiresPacking.eq(packing));
        }
        if let Some(storage) = query.flag("requires_storage")? {
            select = select.filter(relocation_request::Column::RequiresStorage.eq(storage));
        }
        Ok(select
            .order_by_desc(relocation_request::Column::DateCreated)
            .order_by_desc(relocation_request::Column::Id)
            .limit(limit)
            .all(db)
            .await?)
    }

    async fn row(
        db: &DatabaseConnection,
        model: &relocation_request::Model,
    ) -> Result<Vec<String>> {
        let owner = client::require_client(db, model.client_id).await?;
        Ok(vec![
            model.request_id.clone(),
            owner.to_string(),
            label(model.relocation_type),
            label(model.status),
            label(model.priority),
            model.preferred_date.to_string(),
            user_name(db, model.assigned_to_id).await?,
            optional_money(model.estimated_cost),
        ])
    }

    async fn detail(
        db: &DatabaseConnection,
        model: &relocation_request::Model,
    ) -> Result<Detail> {
        let owner = client::require_client(db, model.client_id).await?;
        let origin = property::require_property(db, model.origin_property_id).await?;
        let destination = match model.destination_property_id {
            Some(id) => Some(property::require_property(db, id).await?),
            None => None,
        };
        let quotes = quote::get_quotes_for_request(db, model.id).await?;
        let milestones = timeline::get_timeline_for_request(db, model.id).await?;
        Ok(Detail {
            title: relocation::request_display(db, model).await?,
            fieldsets: vec![
                Fieldset::new("Basic Information")
                    .field("request_id", &model.request_id)
                    .field("client", owner.to_string())
                    .field("relocation_type", label(model.relocation_type))
                    .field("status", label(model.status))
                    .field("priority", label(model.priority))
                    .field("assigned_to", user_name(db, model.assigned_to_id).await?),
                Fieldset::new("Properties")
                    .field("origin_property", origin.to_string())
                    .field("destination_property", optional(destination)),
                Fieldset::new("Destination Address (if no property record)")
                    .field("destination_address", &model.destination_address)
                    .field("destination_city", &model.destination_city)
                    .field("destination_state", &model.destination_state)
                    .field("destination_zip", &model.destination_zip)
                    .field("destination_country", &model.destination_country),
                Fieldset::new("Scheduling")
                    .field("preferred_date", model.preferred_date.to_string())
                    .field("alternative_date", optional_date(model.alternative_date))
                    .field("scheduled_date", optional_date(model.scheduled_date))
                    .field("actual_start_date", optional_stamp(model.actual_start_date))
                    .field(
                        "actual_completion_date",
                        optional_stamp(model.actual_completion_date),
                    )
                    .field("duration_days", optional(model.duration_days())),
                Fieldset::new("Services Required")
                    .field("requires_packing", yes_no(model.requires_packing))
                    .field("requires_unpacking", yes_no(model.requires_unpacking))
                    .field("requires_storage", yes_no(model.requires_storage))
                    .field("requires_insurance", yes_no(model.requires_insurance))
                    .field("requires_cleaning", yes_no(model.requires_cleaning)),
                Fieldset::new("Cost Information")
                    .field("estimated_cost", optional_money(model.estimated_cost))
                    .field("actual_cost", optional_money(model.actual_cost)),
                Fieldset::new("Additional Information")
                    .field("special_instructions", &model.special_instructions)
                    .field("notes", &model.notes)
                    .field("date_created", stamp(model.date_created))
                    .field("date_updated", stamp(model.date_updated)),
            ],
            inlines: vec![
                Inline {
                    name: "Relocation quotes",
                    table: QuoteAdmin::table(db, &quotes).await?,
                },
                Inline {
                    name: "Relocation timeline",
                    table: TimelineAdmin::table(db, &milestones).await?,
                },
            ],
        })
    }

    async fn create(db: &DatabaseConnection, form: RequestForm) -> Result<relocation_request::Model> {
        relocation::create_request(db, form).await
    }

    async fn update(
        db: &DatabaseConnection,
        id: i64,
        form: RequestForm,
    ) -> Result<relocation_request::Model> {
        relocation::update_request(db, id, form).await
    }

    async fn delete(db: &DatabaseConnection, id: i64) -> Result<()> {
        relocation::delete_request(db, id).await
    }
}

/// Priced proposals
pub struct QuoteAdmin;

#[async_trait]
impl ModelAdmin for QuoteAdmin {
    type Model = relocation_quote::Model;
    type Form = QuoteForm;

    const VERBOSE_NAME: &'static str = "Relocation quote";
    const LIST_DISPLAY: &'static [&'static str] = &[
        "quote_number",
        "relocation_request",
        "status",
        "total_cost",
        "valid_until",
        "date_created",
    ];
    const SEARCH_FIELDS: &'static [&'static str] = &[
        "quote_number",
        "relocation_request__request_id",
        "relocation_request__client__first_name",
    ];
    const LIST_FILTER: &'static [&'static str] = &["status"];

    fn id(model: &relocation_quote::Model) -> i64 {
        model.id
    }

    async fn get(db: &DatabaseConnection, id: i64) -> Result<relocation_quote::Model> {
        quote::require_quote(db, id).await
    }

    async fn list(
        db: &DatabaseConnection,
        query: &ListQuery,
        limit: u64,
    ) -> Result<Vec<relocation_quote::Model>> {
        query.check_filters(Self::LIST_FILTER)?;
        let mut select = RelocationQuote::find()
            .join(
                JoinType::InnerJoin,
                relocation_quote::Relation::RelocationRequest.def(),
            )
            .join(JoinType::InnerJoin, relocation_request::Relation::Client.def());
        if let Some(term) = query.term() {
            select = select.filter(
                Condition::any()
                    .add(matches_term(relocation_quote::Column::QuoteNumber, term))
                    .add(matches_term(relocation_request::Column::RequestId, term))
                    .add(matches_term(client_entity::Column::FirstName, term)),
            );
        }
        if let Some(status) = query.choice::<QuoteStatus>("status")? {
            select = select.filter(relocation_quote::Column::Status.eq(status));
        }
        Ok(select
            .order_by_desc(relocation_quote::Column::DateCreated)
            .order_by_desc(relocation_quote::Column::Id)
            .limit(limit)
            .all(db)
            .await?)
    }

    async fn row(db: &DatabaseConnection, model: &relocation_quote::Model) -> Result<Vec<String>> {
        let request = relocation::require_request(db, model.relocation_request_id).await?;
        Ok(vec![
            model.quote_number.clone(),
            relocation::request_display(db, &request).await?,
            label(model.status),
            money(model.total_cost),
            model.valid_until.to_string(),
            stamp(model.date_created),
        ])
    }

    async fn detail(db: &DatabaseConnection, model: &relocation_quote::Model) -> Result<Detail> {
        let request = relocation::require_request(db, model.relocation_request_id).await?;
        Ok(Detail {
            title: quote::quote_display(db, model).await?,
            fieldsets: vec![
                Fieldset::new("Quote Information")
                    .field("quote_number", &model.quote_number)
                    .field(
                        "relocation_request",
                        relocation::request_display(db, &request).await?,
                    )
                    .field("status", label(model.status))
                    .field("valid_until", model.valid_until.to_string()),
                Fieldset::new("Cost Breakdown")
                    .field("base_cost", money(model.base_cost))
                    .field("packing_cost", money(model.packing_cost))
                    .field("transportation_cost", money(model.transportation_cost))
                    .field("insurance_cost", money(model.insurance_cost))
                    .field("storage_cost", money(model.storage_cost))
                    .field(
                        "additional_services_cost",
                        money(model.additional_services_cost),
                    )
                    .field("tax_amount", money(model.tax_amount))
                    .field("total_cost", money(model.total_cost)),
                Fieldset::new("Terms").field("terms_and_conditions", &model.terms_and_conditions),
                Fieldset::new("Dates")
                    .field("date_created", stamp(model.date_created))
                    .field("date_sent", optional_stamp(model.date_sent))
                    .field("date_responded", optional_stamp(model.date_responded)),
            ],
            inlines: Vec::new(),
        })
    }

    async fn create(db: &DatabaseConnection, form: QuoteForm) -> Result<relocation_quote::Model> {
        quote::create_quote(db, form).await
    }

    async fn update(
        db: &DatabaseConnection,
        id: i64,
        form: QuoteForm,
    ) -> Result<relocation_quote::Model> {
        quote::update_quote(db, id, form).await
    }

    async fn delete(db: &DatabaseConnection, id: i64) -> Result<()> {
        quote::delete_quote(db, id).await
    }
}

/// Request milestones
pub struct TimelineAdmin;

#[async_trait]
impl ModelAdmin for TimelineAdmin {
    type Model = relocation_timeline::Model;
    type Form = TimelineForm;

    const VERBOSE_NAME: &'static str = "Relocation timeline";
    const LIST_DISPLAY: &'static [&'static str] = &[
        "relocation_request",
        "milestone_type",
        "scheduled_datetime",
        "actual_datetime",
        "is_completed",
        "updated_by",
    ];
    const SEARCH_FIELDS: &'static [&'static str] =
        &["relocation_request__request_id", "description"];
    const LIST_FILTER: &'static [&'static str] = &["milestone_type", "is_completed"];

    fn id(model: &relocation_timeline::Model) -> i64 {
        model.id
    }

    async fn get(db: &DatabaseConnection, id: i64) -> Result<relocation_timeline::Model> {
        timeline::require_entry(db, id).await
    }

    async fn list(
        db: &DatabaseConnection,
        query: &ListQuery,
        limit: u64,
    ) -> Result<Vec<relocation_timeline::Model>> {
        query.check_filters(Self::LIST_FILTER)?;
        let mut select = RelocationTimeline::find().join(
            JoinType::InnerJoin,
            relocation_timeline::Relation::RelocationRequest.def(),
        );
        if let Some(term) = query.term() {
            select = select.filter(
                Condition::any()
                    .add(matches_term(relocation_request::Column::RequestId, term))
                    .add(matches_term(relocation_timeline::Column::Description, term)),
            );
        }
        if let Some(milestone) = query.choice::<MilestoneType>("milestone_type")? {
            select = select.filter(relocation_timeline::Column::MilestoneType.eq(milestone));
        }
        if let Some(completed) = query.flag("is_completed")? {
            select = select.filter(relocation_timeline::Column::IsCompleted.eq(completed));
        }
        Ok(timeline::ordered(select).limit(limit).all(db).await?)
    }

    async fn row(
        db: &DatabaseConnection,
        model: &relocation_timeline::Model,
    ) -> Result<Vec<String>> {
        let request = relocation::require_request(db, model.relocation_request_id).await?;
        Ok(vec![
            relocation::request_display(db, &request).await?,
            label(model.milestone_type),
            optional_stamp(model.scheduled_datetime),
            optional_stamp(model.actual_datetime),
            yes_no(model.is_completed),
            user_name(db, model.updated_by_id).await?,
        ])
    }

    async fn detail(
        db: &DatabaseConnection,
        model: &relocation_timeline::Model,
    ) -> Result<Detail> {
        let request = relocation::require_request(db, model.relocation_request_id).await?;
        Ok(Detail {
            title: timeline::entry_display(db, model).await?,
            fieldsets: vec![
                Fieldset::new("Milestone")
                    .field(
                        "relocation_request",
                        relocation::request_display(db, &request).await?,
                    )
                    .field("milestone_type", label(model.milestone_type))
                    .field("description", &model.description),
                Fieldset::new("Progress")
                    .field("scheduled_datetime", optional_stamp(model.scheduled_datetime))
                    .field("actual_datetime", optional_stamp(model.actual_datetime))
                    .field("is_completed", yes_no(model.is_completed))
                    .field("notes", &model.notes)
                    .field("updated_by", user_name(db, model.updated_by_id).await?)
                    .field("date_created", stamp(model.date_created)),
            ],
            inlines: Vec::new(),
        })
    }

    async fn create(
        db: &DatabaseConnection,
        form: TimelineForm,
    ) -> Result<relocation_timeline::Model> {
        timeline::create_entry(db, form).await
    }

    async fn update(
        db: &DatabaseConnection,
        id: i64,
        form: TimelineForm,
    ) -> Result<relocation_timeline::Model> {
        timeline::update_entry(db, id, form).await
    }

    async fn delete(db: &DatabaseConnection, id: i64) -> Result<()> {
        timeline::delete_entry(db, id).await
    }
}
