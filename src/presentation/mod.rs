// Presentation layer - HTTP inspection surface
pub mod app_state;
pub mod handlers;
