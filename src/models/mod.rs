pub mod color;
pub mod event;
pub mod secret;
pub mod token;
