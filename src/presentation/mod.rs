pub mod admin;
pub mod script;
pub mod views;
