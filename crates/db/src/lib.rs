//! Persistence for the WebMarket backend.
//!
//! Two stores live here:
//!
//! - [`submissions::FormSubmissionStore`] keeps contact and project-request
//!   forms in a single JSON file on local disk.
//! - The tenant-scoped data access layer talks to the hosted Postgres
//!   service through a [`client::ScopedClient`]. Writes are stamped with the
//!   configured tenant / project pair; reads rely on the service's
//!   row-level-security policy. [`generic`] holds the table-agnostic CRUD
//!   helpers and [`repositories`] the table-specific ones.

pub mod client;
pub mod error;
pub mod gateways;
pub mod generic;
pub mod models;
pub mod query;
pub mod repositories;
pub mod response;
pub mod submissions;

pub use client::{ScopedClient, ScopedCredential, TableGateway};
pub use error::DbError;
pub use response::{ListResponse, QueryResponse};
