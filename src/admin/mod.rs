//! Administrative surface - list, detail and edit views over every registry.
//!
//! Each record type has a zero-sized admin type implementing [`ModelAdmin`]. It names
//! the columns a list shows, the fields free-text search covers and the filters it
//! accepts, and it groups a record's fields into fieldsets with child records inline.

/// Staff accounts
pub mod accounts;
/// Clients and their documents
pub mod clients;
/// Vehicles, drivers, crews, assignments, transfers and expenses
pub mod logistics;
/// Properties, photos and inventory
pub mod properties;
/// Requests, quotes and timelines
pub mod relocations;

use crate::{
    core::validation::parse_choice,
    entities::Choice,
    errors::{Error, Result},
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection,
    sea_query::{Expr, LikeExpr, SimpleExpr},
};
use serde::{Serialize, de::DeserializeOwned};
use std::{collections::BTreeMap, fmt::Display};

/// Shown for empty optional values
pub const EMPTY_VALUE: &str = "-";

/// Search text, filters and page size for a list view
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    /// Free text matched case-insensitively against the search fields
    pub search: Option<String>,
    /// Exact-match filters keyed by filter name
    pub filters: BTreeMap<String, String>,
    /// Maximum number of rows
    pub limit: Option<u64>,
}

impl ListQuery {
    /// A query with only a search term.
    #[must_use]
    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search: Some(term.into()),
            ..Self::default()
        }
    }

    /// Adds a filter.
    #[must_use]
    pub fn with_filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    /// Splits a `KEY=VALUE` filter argument.
    pub fn parse_filter(raw: &str) -> Result<(String, String)> {
        match raw.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => {
                Ok((key.trim().to_string(), value.trim().to_string()))
            }
            _ => Err(Error::InvalidChoice {
                field: "filter".to_string(),
                value: raw.to_string(),
            }),
        }
    }

    /// The trimmed search term, if any.
    #[must_use]
    pub fn term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
    }

    /// Rejects filters the list view does not offer.
    pub fn check_filters(&self, allowed: &[&str]) -> Result<()> {
        match self.filters.keys().find(|key| !allowed.contains(&key.as_str())) {
            Some(unknown) => Err(Error::InvalidChoice {
                field: "filter".to_string(),
                value: unknown.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Raw filter value.
    #[must_use]
    pub fn text(&self, key: &str) -> Option<&str> {
        self.filters.get(key).map(String::as_str)
    }

    /// Yes/no filter.
    pub fn flag(&self, key: &str) -> Result<Option<bool>> {
        self.text(key)
            .map(|value| match value.to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" => Ok(true),
                "false" | "no" | "0" => Ok(false),
                _ => Err(invalid_filter(key, value)),
            })
            .transpose()
    }

    /// Choice filter, given as the stored value (`in_progress`).
    pub fn choice<E: Choice>(&self, key: &str) -> Result<Option<E>> {
        self.text(key)
            .map(|value| parse_choice::<E>(key, value))
            .transpose()
    }

    /// Integer filter.
    pub fn number(&self, key: &str) -> Result<Option<i32>> {
        self.text(key)
            .map(|value| value.parse().map_err(|_| invalid_filter(key, value)))
            .transpose()
    }

    /// Page size, falling back to the configured default.
    #[must_use]
    pub fn limit_or(&self, default: u64) -> u64 {
        self.limit.unwrap_or(default).max(1)
    }
}

fn invalid_filter(key: &str, value: &str) -> Error {
    Error::InvalidChoice {
        field: key.to_string(),
        value: value.to_string(),
    }
}

/// Matches `term` literally as a substring of `column`; wildcards are escaped.
pub(crate) fn matches_term<C: ColumnTrait>(column: C, term: &str) -> SimpleExpr {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    Expr::col((column.entity_name(), column)).like(LikeExpr::new(pattern).escape('\\'))
}

/// Matches `term` as a substring of any of `columns`.
pub(crate) fn search_any<C: ColumnTrait>(columns: &[C], term: &str) -> Condition {
    columns
        .iter()
        .fold(Condition::any(), |condition, column| {
            condition.add(matches_term(*column, term))
        })
}

/// One list row: the record's key and its display cells
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Row {
    /// Primary key
    pub id: i64,
    /// Cells in list-display order
    pub cells: Vec<String>,
}

/// Rows under named columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Table {
    /// Column headers
    pub columns: Vec<&'static str>,
    /// Rows
    pub rows: Vec<Row>,
}

/// Label and rendered value of one field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    /// Field label
    pub label: &'static str,
    /// Rendered value
    pub value: String,
}

/// A named group of fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fieldset {
    /// Group heading
    pub name: &'static str,
    /// Fields in display order
    pub fields: Vec<Field>,
}

impl Fieldset {
    /// An empty group.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            fields: Vec::new(),
        }
    }

    /// Appends a field.
    #[must_use]
    pub fn field(mut self, label: &'static str, value: impl Into<String>) -> Self {
        self.fields.push(Field {
            label,
            value: value.into(),
        });
        self
    }
}

/// Child records shown with their parent
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Inline {
    /// Section heading
    pub name: &'static str,
    /// Child rows
    pub table: Table,
}

/// Everything a detail view shows
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Detail {
    /// Record display name
    pub title: String,
    /// Grouped fields
    pub fieldsets: Vec<Fieldset>,
    /// Child records
    pub inlines: Vec<Inline>,
}

/// List, detail and edit behavior for one record type.
#[async_trait]
pub trait ModelAdmin: Send + Sync {
    /// Stored record
    type Model: Serialize + Send + Sync;
    /// Editable fields, read from form files
    type Form: DeserializeOwned + Send;

    /// Human name of the record type
    const VERBOSE_NAME: &'static str;
    /// List columns
    const LIST_DISPLAY: &'static [&'static str];
    /// Fields covered by free-text search, `related__field` for related rows
    const SEARCH_FIELDS: &'static [&'static str];
    /// Accepted filter names
    const LIST_FILTER: &'static [&'static str];

    /// Primary key of a record.
    fn id(model: &Self::Model) -> i64;

    /// Loads a record, failing if it does not exist.
    async fn get(db: &DatabaseConnection, id: i64) -> Result<Self::Model>;

    /// Records matching the query, in the list's default order.
    async fn list(db: &DatabaseConnection, query: &ListQuery, limit: u64)
    -> Result<Vec<Self::Model>>;

    /// Cells for [`Self::LIST_DISPLAY`].
    async fn row(db: &DatabaseConnection, model: &Self::Model) -> Result<Vec<String>>;

    /// Fieldsets and inlines of one record.
    async fn detail(db: &DatabaseConnection, model: &Self::Model) -> Result<Detail>;

    /// Validates and inserts a form.
    async fn create(db: &DatabaseConnection, form: Self::Form) -> Result<Self::Model>;

    /// Validates a form and replaces the record's fields.
    async fn update(db: &DatabaseConnection, id: i64, form: Self::Form) -> Result<Self::Model>;

    /// Deletes a record and whatever it owns.
    async fn delete(db: &DatabaseConnection, id: i64) -> Result<()>;

    /// Renders records as list rows.
    async fn table(db: &DatabaseConnection, models: &[Self::Model]) -> Result<Table> {
        let mut rows = Vec::with_capacity(models.len());
        for model in models {
            rows.push(Row {
                id: Self::id(model),
                cells: Self::row(db, model).await?,
            });
        }
        Ok(Table {
            columns: Self::LIST_DISPLAY.to_vec(),
            rows,
        })
    }
}

/// `"yes"` / `"no"`
pub(crate) fn yes_no(value: bool) -> String {
    if value { "yes" } else { "no" }.to_string()
}

/// Two decimals
pub(crate) fn money(value: f64) -> String {
    format!("{value:.2}")
}

/// Optional value, [`EMPTY_VALUE`] when absent
pub(crate) fn optional<T: Display>(value: Option<T>) -> String {
    value.map_or_else(|| EMPTY_VALUE.to_string(), |v| v.to_string())
}

/// Optional amount with two decimals
pub(crate) fn optional_money(value: Option<f64>) -> String {
    value.map_or_else(|| EMPTY_VALUE.to_string(), money)
}

/// Minute-precision UTC timestamp
pub(crate) fn stamp(value: DateTime<Utc>) -> String {
    value.format("%Y-%m-%d %H:%M").to_string()
}

/// Optional timestamp
pub(crate) fn optional_stamp(value: Option<DateTime<Utc>>) -> String {
    value.map_or_else(|| EMPTY_VALUE.to_string(), stamp)
}

/// Optional calendar date
pub(crate) fn optional_date(value: Option<NaiveDate>) -> String {
    optional(value)
}

/// Choice label
pub(crate) fn label<E: Choice>(value: E) -> String {
    value.label().to_string()
}
