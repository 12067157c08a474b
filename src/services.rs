pub mod attendance_service;
pub mod auth;
pub mod document_service;
pub mod employee_service;
pub mod inventory_service;
pub mod leave_service;
pub mod ledger;
pub mod template_engine;
pub mod visitor_service;
