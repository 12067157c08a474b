pub mod attendance;
pub mod auth;
pub mod document;
pub mod employee;
pub mod inventory;
pub mod leave;
pub mod visitor;
