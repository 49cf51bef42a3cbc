//! Table-specific repositories.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&ScopedClient` as the first argument and return the
//! [`QueryResponse`](crate::response::QueryResponse) /
//! [`ListResponse`](crate::response::ListResponse) envelopes.

pub mod todo_repo;

pub use todo_repo::TodoRepo;
