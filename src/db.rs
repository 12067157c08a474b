pub mod user_repo;
pub use user_repo::UserRepository;
pub mod employee_repo;
pub use employee_repo::EmployeeRepository;
pub mod contract_repo;
pub use contract_repo::ContractRepository;
pub mod document_repo;
pub use document_repo::DocumentRepository;
pub mod inventory_repo;
pub use inventory_repo::InventoryRepository;
pub mod attendance_repo;
pub use attendance_repo::AttendanceRepository;
pub mod visitor_repo;
pub use visitor_repo::VisitorRepository;
pub mod leave_repo;
pub use leave_repo::LeaveRepository;
