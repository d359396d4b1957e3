pub mod calendar_service;
pub mod oauth_service;
pub mod render;
pub mod selection;
pub mod urgency;
