//! Outbound notifications for the WebMarket backend.
//!
//! Form submissions are relayed to the site owner's inbox as HTML email.
//! [`render`] builds the subject and body for each form type and [`email`]
//! delivers them over SMTP.

pub mod email;
pub mod render;

pub use email::{EmailConfig, EmailDelivery, EmailError};
