//! Core business logic - framework-agnostic operations over every registry.
//!
//! Each module exposes a `*Form` describing the editable fields of one record type,
//! plus async create/update/delete/lookup functions. Forms are validated before any
//! write; the database's unique indexes and foreign keys back the checks up.

pub mod account;
pub mod assignment;
pub mod client;
pub mod crew;
pub mod driver;
pub mod expense;
pub mod property;
pub mod quote;
pub mod relocation;
pub mod timeline;
pub mod transfer;
pub mod validation;
pub mod vehicle;
