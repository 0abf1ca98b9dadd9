//! `list`, `show`, `add`, `edit` and `delete`, shared by every record type.

use super::{Desk, output};
use crate::{
    admin::{ListQuery, ModelAdmin},
    errors::Result,
};
use clap::{Args, Subcommand};
use serde::de::DeserializeOwned;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Actions available on every record type
#[derive(Subcommand, Debug)]
pub enum CrudAction {
    #[command(
        about = "List records",
        after_help = "EXAMPLES:\n    relocation-desk client list --search acme\n    relocation-desk request list --filter status=pending --filter priority=urgent"
    )]
    List(ListArgs),
    /// Show one record with its related records
    Show {
        /// Primary key
        id: i64,
    },
    /// Create a record from a TOML form
    Add {
        /// Form file
        form: PathBuf,
    },
    /// Replace a record's fields from a TOML form
    Edit {
        /// Primary key
        id: i64,
        /// Form file
        form: PathBuf,
    },
    /// Delete a record and everything it owns
    Delete {
        /// Primary key
        id: i64,
    },
}

/// Search, filters and page size for `list`
#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Case-insensitive text matched against the search fields
    #[arg(long)]
    pub search: Option<String>,

    /// Exact filter, repeatable
    #[arg(long = "filter", value_name = "KEY=VALUE")]
    pub filters: Vec<String>,

    /// Maximum rows (defaults to the configured list limit)
    #[arg(long)]
    pub limit: Option<u64>,
}

impl ListArgs {
    /// Builds the query, rejecting malformed filters.
    pub fn into_query(self) -> Result<ListQuery> {
        let filters = self
            .filters
            .iter()
            .map(|raw| ListQuery::parse_filter(raw))
            .collect::<Result<_>>()?;
        Ok(ListQuery {
            search: self.search,
            filters,
            limit: self.limit,
        })
    }
}

/// Reads and parses a form file.
pub async fn read_form<F: DeserializeOwned>(path: &Path) -> Result<F> {
    debug!("Reading form {:?}", path);
    let text = tokio::fs::read_to_string(path).await?;
    Ok(toml::from_str(&text)?)
}

/// Runs a generic action against one record type.
pub async fn run_crud<A: ModelAdmin>(
    desk: &Desk,
    action: CrudAction,
    w: &mut dyn Write,
) -> Result<()> {
    match action {
        CrudAction::List(args) => {
            let query = args.into_query()?;
            let models = A::list(&desk.db, &query, query.limit_or(desk.list_limit)).await?;
            let table = A::table(&desk.db, &models).await?;
            output::table(w, desk.json, A::VERBOSE_NAME, &table)
        }
        CrudAction::Show { id } => {
            let model = A::get(&desk.db, id).await?;
            let detail = A::detail(&desk.db, &model).await?;
            output::detail(w, desk.json, &detail)
        }
        CrudAction::Add { form } => {
            let form = read_form::<A::Form>(&form).await?;
            let model = A::create(&desk.db, form).await?;
            output::saved(w, desk.json, "Created", A::VERBOSE_NAME, A::id(&model), &model)
        }
        CrudAction::Edit { id, form } => {
            let form = read_form::<A::Form>(&form).await?;
            let model = A::update(&desk.db, id, form).await?;
            output::saved(w, desk.json, "Updated", A::VERBOSE_NAME, A::id(&model), &model)
        }
        CrudAction::Delete { id } => {
            A::delete(&desk.db, id).await?;
            output::done(w, desk.json, &format!("Deleted {} #{id}", A::VERBOSE_NAME))
        }
    }
}
