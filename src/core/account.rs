//! User account business logic.
//!
//! Accounts back drivers, may be linked to clients, and record which staff member
//! assigned, updated or approved other records.

use crate::{
    core::validation::{ensure_unique, max_length, required, validate_email},
    entities::{User, user},
    errors::{Error, Result},
};
use sea_orm::{Set, prelude::*};
use serde::Deserialize;
use tracing::{info, instrument};

/// Editable fields of an account
#[derive(Debug, Clone, Deserialize)]
pub struct UserForm {
    /// Login name, unique
    pub username: String,
    /// Given name
    #[serde(default)]
    pub first_name: String,
    /// Family name
    #[serde(default)]
    pub last_name: String,
    /// Email, may be blank
    #[serde(default)]
    pub email: String,
    /// Office staff
    #[serde(default)]
    pub is_staff: bool,
    /// Active account
    #[serde(default = "default_true")]
    pub is_active: bool,
}

pub(crate) const fn default_true() -> bool {
    true
}

impl UserForm {
    fn clean(mut self) -> Result<Self> {
        self.username = required("username", &self.username, 150)?;
        max_length("first_name", &self.first_name, 150)?;
        max_length("last_name", &self.last_name, 150)?;
        if !self.email.is_empty() {
            validate_email("email", &self.email)?;
        }
        Ok(self)
    }

    fn apply(self, model: &mut user::ActiveModel) {
        model.username = Set(self.username);
        model.first_name = Set(self.first_name);
        model.last_name = Set(self.last_name);
        model.email = Set(self.email);
        model.is_staff = Set(self.is_staff);
        model.is_active = Set(self.is_active);
    }
}

async fn ensure_username_free(
    db: &DatabaseConnection,
    username: &str,
    exclude: Option<i64>,
) -> Result<()> {
    let mut query = User::find().filter(user::Column::Username.eq(username));
    if let Some(id) = exclude {
        query = query.filter(user::Column::Id.ne(id));
    }
    ensure_unique(db, query, "User", "username", username).await
}

/// Finds an account by primary key.
pub async fn get_user_by_id(db: &DatabaseConnection, id: i64) -> Result<Option<user::Model>> {
    User::find_by_id(id).one(db).await.map_err(Into::into)
}

/// Finds an account by primary key, failing if it does not exist.
pub async fn require_user(db: &DatabaseConnection, id: i64) -> Result<user::Model> {
    get_user_by_id(db, id)
        .await?
        .ok_or_else(|| Error::not_found("User", id))
}

/// Finds an account by login name.
pub async fn get_user_by_username(
    db: &DatabaseConnection,
    username: &str,
) -> Result<Option<user::Model>> {
    User::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates an account after validating the form.
#[instrument(skip(db, form), fields(username = %form.username))]
pub async fn create_user(db: &DatabaseConnection, form: UserForm) -> Result<user::Model> {
    let form = form.clean()?;
    ensure_username_free(db, &form.username, None).await?;

    let mut model = user::ActiveModel {
        ..Default::default()
    };
    form.apply(&mut model);
    let user = model.insert(db).await?;
    info!("Created user {}", user.username);
    Ok(user)
}

/// Replaces every editable field of an account.
#[instrument(skip(db, form))]
pub async fn update_user(db: &DatabaseConnection, id: i64, form: UserForm) -> Result<user::Model> {
    let form = form.clean()?;
    let existing = require_user(db, id).await?;
    ensure_username_free(db, &form.username, Some(id)).await?;

    let mut model: user::ActiveModel = existing.into();
    form.apply(&mut model);
    model.update(db).await.map_err(Into::into)
}

/// Deletes an account. Linked clients and drivers go with it; references from
/// requests, timeline entries and expenses are cleared.
#[instrument(skip(db))]
pub async fn delete_user(db: &DatabaseConnection, id: i64) -> Result<()> {
    let result = User::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("User", id));
    }
    info!("Deleted user {}", id);
    Ok(())
}
