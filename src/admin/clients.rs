use super::{
    Detail, Fieldset, ListQuery, ModelAdmin, label, matches_term, optional, search_any, stamp,
    yes_no,
};
use crate::{
    core::client::{self, ClientDocumentForm, ClientForm},
    entities::{
        Client, ClientDocument,
        client::{self as client_entity, ClientType},
        client_document::{self, DocumentType},
        user,
    },
    errors::Result,
};
use async_trait::async_trait;
use sea_orm::{Condition, JoinType, QueryOrder, QuerySelect, prelude::*};

/// Customers
pub struct ClientAdmin;

#[async_trait]
impl ModelAdmin for ClientAdmin {
    type Model = client_entity::Model;
    type Form = ClientForm;

    const VERBOSE_NAME: &'static str = "Client";
    const LIST_DISPLAY: &'static [&'static str] = &[
        "client_id",
        "first_name",
        "last_name",
        "company_name",
        "client_type",
        "email",
        "phone",
        "city",
        "is_active",
        "date_created",
    ];
    const SEARCH_FIELDS: &'static [&'static str] = &[
        "client_id",
        "first_name",
        "last_name",
        "company_name",
        "email",
        "phone",
    ];
    const LIST_FILTER: &'static [&'static str] = &["client_type", "is_active", "city", "state"];

    fn id(model: &client_entity::Model) -> i64 {
        model.id
    }

    async fn get(db: &DatabaseConnection, id: i64) -> Result<client_entity::Model> {
        client::require_client(db, id).await
    }

    async fn list(
        db: &DatabaseConnection,
        query: &ListQuery,
        limit: u64,
    ) -> Result<Vec<client_entity::Model>> {
        query.check_filters(Self::LIST_FILTER)?;
        let mut select = Client::find();
        if let Some(term) = query.term() {
            select = select.filter(search_any(
                &[
                    client_entity::Column::ClientId,
                    client_entity::Column::FirstName,
                    client_entity::Column::LastName,
                    client_entity::Column::CompanyName,
                    client_entity::Column::Email,
                    client_entity::Column::Phone,
                ],
                term,
            ));
        }
        if let Some(kind) = query.choice::<ClientType>("client_type")? {
            select = select.filter(client_entity::Column::ClientType.eq(kind));
        }
        if let Some(active) = query.flag("is_active")? {
            select = select.filter(client_entity::Column::IsActive.eq(active));
        }
        if let Some(city) = query.text("city") {
            select = select.filter(client_entity::Column::City.eq(city));
        }
        if let Some(state) = query.text("state") {
            select = select.filter(client_entity::Column::State.eq(state));
        }
        Ok(select
            .order_by_desc(client_entity::Column::DateCreated)
            .order_by_desc(client_entity::Column::Id)
            .limit(limit)
            .all(db)
            .await?)
    }

    async fn row(_db: &DatabaseConnection, model: &client_entity::Model) -> Result<Vec<String>> {
        Ok(vec![
            model.client_id.clone(),
            model.first_name.clone(),
            model.last_name.clone(),
            optional(model.company_name.as_deref()),
            label(model.client_type),
            model.email.clone(),
            model.phone.clone(),
            model.city.clone(),
            yes_no(model.is_active),
            stamp(model.date_created),
        ])
    }

    async fn detail(db: &DatabaseConnection, model: &client_entity::Model) -> Result<Detail> {
        let account = match model.user_id {
            Some(user_id) => user::Entity::find_by_id(user_id)
                .one(db)
                .await?
                .map(|user| user.to_string()),
            None => None,
        };
        Ok(Detail {
            title: model.to_string(),
            fieldsets: vec![
                Fieldset::new("Basic Information")
                    .field("client_id", &model.client_id)
                    .field("client_type", label(model.client_type))
                    .field("user", optional(account)),
                Fieldset::new("Personal/Company Details")
                    .field("first_name", &model.first_name)
                    .field("last_name", &model.last_name)
                    .field("company_name", optional(model.company_name.as_deref()))
                    .field("email", &model.email)
                    .field("phone", &model.phone),
                Fieldset::new("Address Information")
                    .field("address", &model.address)
                    .field("city", &model.city)
                    .field("state", &model.state)
                    .field("zip_code", &model.zip_code)
                    .field("country", &model.country),
                Fieldset::new("Status")
                    .field("is_active", yes_no(model.is_active))
                    .field("date_created", stamp(model.date_created))
                    .field("date_updated", stamp(model.date_updated)),
            ],
            inlines: Vec::new(),
        })
    }

    async fn create(db: &DatabaseConnection, form: ClientForm) -> Result<client_entity::Model> {
        client::create_client(db, form).await
    }

    async fn update(
        db: &DatabaseConnection,
        id: i64,
        form: ClientForm,
    ) -> Result<client_entity::Model> {
        client::update_client(db, id, form).await
    }

    async fn delete(db: &DatabaseConnection, id: i64) -> Result<()> {
        client::delete_client(db, id).await
    }
}

/// Identity and contract documents on file
pub struct ClientDocumentAdmin;

#[async_trait]
impl ModelAdmin for ClientDocumentAdmin {
    type Model = client_document::Model;
    type Form = ClientDocumentForm;

    const VERBOSE_NAME: &'static str = "Client document";
    const LIST_DISPLAY: &'static [&'static str] =
        &["client", "document_type", "document_name", "uploaded_at"];
    const SEARCH_FIELDS: &'static [&'static str] =
        &["client__first_name", "client__last_name", "document_name"];
    const LIST_FILTER: &'static [&'static str] = &["document_type"];

    fn id(model: &client_document::Model) -> i64 {
        model.id
    }

    async fn get(db: &DatabaseConnection, id: i64) -> Result<client_document::Model> {
        client::require_document(db, id).await
    }

    async fn list(
        db: &DatabaseConnection,
        query: &ListQuery,
        limit: u64,
    ) -> Result<Vec<client_document::Model>> {
        query.check_filters(Self::LIST_FILTER)?;
        let mut select = ClientDocument::find()
            .join(JoinType::InnerJoin, client_document::Relation::Client.def());
        if let Some(term) = query.term() {
            select = select.filter(
                Condition::any()
                    .add(search_any(
                        &[
                            client_entity::Column::FirstName,
                            client_entity::Column::LastName,
                        ],
                        term,
                    ))
                    .add(matches_term(client_document::Column::DocumentName, term)),
            );
        }
        if let Some(kind) = query.choice::<DocumentType>("document_type")? {
            select = select.filter(client_document::Column::DocumentType.eq(kind));
        }
        Ok(select
            .order_by_desc(client_document::Column::UploadedAt)
            .order_by_desc(client_document::Column::Id)
            .limit(limit)
            .all(db)
            .await?)
    }

    async fn row(db: &DatabaseConnection, model: &client_document::Model) -> Result<Vec<String>> {
        let owner = client::require_client(db, model.client_id).await?;
        Ok(vec![
            owner.to_string(),
            label(model.document_type),
            model.document_name.clone(),
            stamp(model.uploaded_at),
        ])
    }

    async fn detail(db: &DatabaseConnection, model: &client_document::Model) -> Result<Detail> {
        let owner = client::require_client(db, model.client_id).await?;
        Ok(Detail {
            title: client::document_display(db, model).await?,
            fieldsets: vec![
                Fieldset::new("Document")
                    .field("client", owner.to_string())
                    .field("document_type", label(model.document_type))
                    .field("document_name", &model.document_name)
                    .field("document_file", &model.document_file)
                    .field("uploaded_at", stamp(model.uploaded_at)),
            ],
            inlines: Vec::new(),
        })
    }

    async fn create(
        db: &DatabaseConnection,
        form: ClientDocumentForm,
    ) -> Result<client_document::Model> {
        client::create_document(db, form).await
    }

    async fn update(
        db: &DatabaseConnection,
        id: i64,
        form: ClientDocumentForm,
    ) -> Result<client_document::Model> {
        client::update_document(db, id, form).await
    }

    async fn delete(db: &DatabaseConnection, id: i64) -> Result<()> {
        client::delete_document(db, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{errors::Error, test_utils::*};

    #[tokio::test]
    async fn test_client_search_fields() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_client(&db, "CL-0001").await?;
        let mut form = client_form("CL-0002");
        form.client_type = ClientType::Corporate;
        form.company_name = Some("Acme Corp".to_string());
        form.first_name = "Wile".to_string();
        form.last_name = "Coyote".to_string();
        form.email = "wile@acme.example".to_string();
        client::create_client(&db, form).await?;

        let by_company = ClientAdmin::list(&db, &ListQuery::search("acme"), 10).await?;
        assert_eq!(by_company.len(), 1);
        assert_eq!(by_company[0].client_id, "CL-0002");

        let by_code = ClientAdmin::list(&db, &ListQuery::search("CL-000"), 10).await?;
        assert_eq!(by_code.len(), 2);
        // Newest first
        assert_eq!(by_code[0].client_id, "CL-0002");

        let none = ClientAdmin::list(&db, &ListQuery::search("Springfield"), 10).await?;
        assert!(none.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_search_wildcards_match_literally() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_client(&db, "CL-0001").await?;
        let mut form = client_form("CL-0002");
        form.client_type = ClientType::Corporate;
        form.company_name = Some("100% Movers".to_string());
        client::create_client(&db, form).await?;

        let percent = ClientAdmin::list(&db, &ListQuery::search("%"), 10).await?;
        assert_eq!(percent.len(), 1);
        assert_eq!(percent[0].client_id, "CL-0002");

        let underscore = ClientAdmin::list(&db, &ListQuery::search("_"), 10).await?;
        assert!(underscore.is_empty());
        let backslash = ClientAdmin::list(&db, &ListQuery::search("\\"), 10).await?;
        assert!(backslash.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_client_filters() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_client(&db, "CL-0001").await?;
        let mut form = client_form("CL-0002");
        form.city = "Shelbyville".to_string();
        form.is_active = false;
        client::create_client(&db, form).await?;

        let query = ListQuery::default()
            .with_filter("city", "Springfield")
            .with_filter("client_type", "individual");
        let found = ClientAdmin::list(&db, &query, 10).await?;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].client_id, "CL-0001");

        let inactive =
            ClientAdmin::list(&db, &ListQuery::default().with_filter("is_active", "no"), 10)
                .await?;
        assert_eq!(inactive.len(), 1);
        assert_eq!(inactive[0].client_id, "CL-0002");

        let result =
            ClientAdmin::list(&db, &ListQuery::default().with_filter("zip_code", "62701"), 10)
                .await;
        assert!(matches!(result, Err(Error::InvalidChoice { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_client_detail_fieldsets() -> Result<()> {
        let db = setup_test_db().await?;
        let client = create_test_client(&db, "CL-0001").await?;

        let detail = ClientAdmin::detail(&db, &client).await?;
        assert_eq!(detail.title, "Jane Doe (CL-0001)");
        let names: Vec<_> = detail.fieldsets.iter().map(|f| f.name).collect();
        assert_eq!(
            names,
            vec![
                "Basic Information",
                "Personal/Company Details",
                "Address Information",
                "Status"
            ]
        );
        assert_eq!(detail.fieldsets[0].fields[2].value, "-");
        Ok(())
    }

    #[tokio::test]
    async fn test_document_search_by_client_name() -> Result<()> {
        let db = setup_test_db().await?;
        let jane = create_test_client(&db, "CL-0001").await?;
        let mut form = client_form("CL-0002");
        form.first_name = "John".to_string();
        form.last_name = "Smith".to_string();
        let john = client::create_client(&db, form).await?;

        for (owner, name, kind) in [
            (jane.id, "Passport scan", DocumentType::Passport),
            (john.id, "Lease 2024", DocumentType::Lease),
        ] {
            client::create_document(
                &db,
                ClientDocumentForm {
                    client_id: owner,
                    document_type: kind,
                    document_name: name.to_string(),
                    document_file: "client_documents/file.pdf".to_string(),
                },
            )
            .await?;
        }

        let found = ClientDocumentAdmin::list(&db, &ListQuery::search("smith"), 10).await?;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].document_name, "Lease 2024");

        let passports = ClientDocumentAdmin::list(
            &db,
            &ListQuery::default().with_filter("document_type", "passport"),
            10,
        )
        .await?;
        assert_eq!(passports.len(), 1);
        let table = ClientDocumentAdmin::table(&db, &passports).await?;
        assert_eq!(table.rows[0].cells[0], "Jane Doe (CL-0001)");
        Ok(())
    }
}
