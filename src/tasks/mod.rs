pub mod register;
pub mod shutdown;
pub mod status_line;
