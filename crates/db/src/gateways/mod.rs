//! [`TableGateway`](crate::client::TableGateway) implementations.
//!
//! - [`postgrest::PostgrestGateway`] talks to the hosted service over HTTP.
//! - [`memory::MemoryGateway`] evaluates requests in process with the same
//!   filter and row-level-security semantics.

pub mod memory;
pub mod postgrest;

pub use memory::MemoryGateway;
pub use postgrest::PostgrestGateway;
