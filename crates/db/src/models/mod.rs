//! Row types and DTOs for the hosted-database tables.

pub mod todo;
