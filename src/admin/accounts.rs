use super::{Detail, Fieldset, ListQuery, ModelAdmin, search_any, stamp, yes_no};
use crate::{
    core::account::{self, UserForm},
    entities::{User, user},
    errors::Result,
};
use async_trait::async_trait;
use sea_orm::{QueryOrder, QuerySelect, prelude::*};

/// Staff and user accounts
pub struct UserAdmin;

#[async_trait]
impl ModelAdmin for UserAdmin {
    type Model = user::Model;
    type Form = UserForm;

    const VERBOSE_NAME: &'static str = "User";
    const LIST_DISPLAY: &'static [&'static str] =
        &["username", "email", "first_name", "last_name", "is_staff"];
    const SEARCH_FIELDS: &'static [&'static str] =
        &["username", "first_name", "last_name", "email"];
    const LIST_FILTER: &'static [&'static str] = &["is_staff", "is_active"];

    fn id(model: &user::Model) -> i64 {
        model.id
    }

    async fn get(db: &DatabaseConnection, id: i64) -> Result<user::Model> {
        account::require_user(db, id).await
    }

    async fn list(
        db: &DatabaseConnection,
        query: &ListQuery,
        limit: u64,
    ) -> Result<Vec<user::Model>> {
        query.check_filters(Self::LIST_FILTER)?;
        let mut select = User::find();
        if let Some(term) = query.term() {
            select = select.filter(search_any(
                &[
                    user::Column::Username,
                    user::Column::FirstName,
                    user::Column::LastName,
                    user::Column::Email,
                ],
                term,
            ));
        }
        if let Some(staff) = query.flag("is_staff")? {
            select = select.filter(user::Column::IsStaff.eq(staff));
        }
        if let Some(active) = query.flag("is_active")? {
            select = select.filter(user::Column::IsActive.eq(active));
        }
        Ok(select
            .order_by_asc(user::Column::Username)
            .limit(limit)
            .all(db)
            .await?)
    }

    async fn row(_db: &DatabaseConnection, model: &user::Model) -> Result<Vec<String>> {
        Ok(vec![
            model.username.clone(),
            model.email.clone(),
            model.first_name.clone(),
            model.last_name.clone(),
            yes_no(model.is_staff),
        ])
    }

    async fn detail(_db: &DatabaseConnection, model: &user::Model) -> Result<Detail> {
        Ok(Detail {
            title: model.full_name(),
            fieldsets: vec![
                Fieldset::new("Account").field("username", &model.username),
                Fieldset::new("Personal info")
                    .field("first_name", &model.first_name)
                    .field("last_name", &model.last_name)
                    .field("email", &model.email),
                Fieldset::new("Permissions")
                    .field("is_active", yes_no(model.is_active))
                    .field("is_staff", yes_no(model.is_staff)),
                Fieldset::new("Important dates").field("date_joined", stamp(model.date_joined)),
            ],
            inlines: Vec::new(),
        })
    }

    async fn create(db: &DatabaseConnection, form: UserForm) -> Result<user::Model> {
        account::create_user(db, form).await
    }

    async fn update(db: &DatabaseConnection, id: i64, form: UserForm) -> Result<user::Model> {
        account::update_user(db, id, form).await
    }

    async fn delete(db: &DatabaseConnection, id: i64) -> Result<()> {
        account::delete_user(db, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_user_search_and_staff_filter() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_user(&db, "dispatch").await?;
        let mut form = user_form("manager");
        form.is_staff = true;
        account::create_user(&db, form).await?;

        let found = UserAdmin::list(&db, &ListQuery::search("DISPATCH"), 10).await?;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].username, "dispatch");

        let staff = UserAdmin::list(&db, &ListQuery::default().with_filter("is_staff", "yes"), 10)
            .await?;
        assert_eq!(staff.len(), 1);
        assert_eq!(staff[0].username, "manager");

        let table = UserAdmin::table(&db, &staff).await?;
        assert_eq!(table.columns, UserAdmin::LIST_DISPLAY);
        assert_eq!(table.rows[0].cells[0], "manager");
        assert_eq!(table.rows[0].cells[4], "yes");
        Ok(())
    }
}
