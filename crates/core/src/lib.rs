//! Domain types shared by the WebMarket backend crates.
//!
//! Nothing in here performs I/O: the file store and the hosted-database
//! client live in `webmarket_db`, the HTTP surface in `webmarket_api`.

pub mod error;
pub mod form_submission;
pub mod scope;
pub mod todo;
pub mod types;
