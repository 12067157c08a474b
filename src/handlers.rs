pub mod attendance;
pub mod auth;
pub mod documents;
pub mod employees;
pub mod inventory;
pub mod kiosk;
pub mod leave;
pub mod visitors;
