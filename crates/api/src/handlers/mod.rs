pub mod email;
pub mod form_submissions;
pub mod todos;
