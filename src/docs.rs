// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::get_me,

        // --- Employees ---
        handlers::employees::create_employee,
        handlers::employees::list_employees,
        handlers::employees::get_employee,
        handlers::employees::update_employee,
        handlers::employees::set_employee_status,
        handlers::employees::get_employee_qr,
        handlers::employees::list_contracts,
        handlers::employees::create_contract,
        handlers::employees::deactivate_contract,

        // --- Inventory ---
        handlers::inventory::create_product,
        handlers::inventory::list_products,
        handlers::inventory::get_product,
        handlers::inventory::update_product,
        handlers::inventory::register_movement,
        handlers::inventory::get_kardex,
        handlers::inventory::recompute_balance,
        handlers::inventory::list_low_stock,
        handlers::inventory::close_period,

        // --- Documents ---
        handlers::documents::create_template,
        handlers::documents::list_templates,
        handlers::documents::generate_document,
        handlers::documents::list_employee_documents,
        handlers::documents::download_document,
        handlers::documents::export_document_pdf,

        // --- Attendance ---
        handlers::attendance::list_attendance,
        handlers::attendance::admin_check_in,

        // --- Visitors ---
        handlers::visitors::register_visitor,
        handlers::visitors::register_exit,
        handlers::visitors::list_visitors,

        // --- Leave ---
        handlers::leave::create_leave_request,
        handlers::leave::list_leave_requests,
        handlers::leave::approve_leave_request,
        handlers::leave::reject_leave_request,

        // --- Kiosk ---
        handlers::kiosk::kiosk_qr,
        handlers::kiosk::kiosk_token,
        handlers::kiosk::kiosk_scan,
        handlers::kiosk::kiosk_register_visitor,
        handlers::kiosk::kiosk_leave_request,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            // --- Employees ---
            models::employee::Employee,
            models::employee::Contract,
            handlers::employees::EmployeePayload,
            handlers::employees::EmployeeStatusPayload,
            handlers::employees::CreateContractPayload,

            // --- Inventory ---
            models::inventory::InventoryCategory,
            models::inventory::Product,
            models::inventory::MovementDirection,
            models::inventory::Movement,
            models::inventory::QuantitySpec,
            models::inventory::PriceSpec,
            models::inventory::MovementMetadata,
            models::inventory::KardexLine,
            models::inventory::LedgerTotals,
            models::inventory::Kardex,
            models::inventory::PeriodClosing,
            handlers::inventory::CreateProductPayload,
            handlers::inventory::UpdateProductPayload,
            handlers::inventory::RegisterMovementPayload,
            handlers::inventory::MovementRegistered,

            // --- Documents ---
            models::document::Cell,
            models::document::Sheet,
            models::document::Workbook,
            models::document::ContractTemplate,
            models::document::TemplateCreated,
            models::document::GeneratedDocument,
            models::document::DocumentSummary,
            handlers::documents::CreateTemplatePayload,
            handlers::documents::GenerateDocumentPayload,

            // --- Attendance / Kiosk ---
            models::attendance::AttendanceSource,
            models::attendance::AttendanceRecord,
            models::attendance::ScanAction,
            models::attendance::ScanResult,
            handlers::kiosk::KioskTokenResponse,
            handlers::kiosk::ScanPayload,
            handlers::kiosk::KioskLeavePayload,

            // --- Visitors ---
            models::visitor::VisitorLog,
            handlers::visitors::VisitorPayload,

            // --- Leave ---
            models::leave::LeaveKind,
            models::leave::LeaveStatus,
            models::leave::LeaveRequest,
            handlers::leave::CreateLeavePayload,
            handlers::leave::DecisionPayload,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Users", description = "Dados do Administrador"),
        (name = "Employees", description = "Funcionários e Contratos"),
        (name = "Inventory", description = "Livro-razão de Estoque por Período"),
        (name = "Documents", description = "Modelos e Documentos de Contrato"),
        (name = "Attendance", description = "Controle de Ponto"),
        (name = "Visitors", description = "Registro de Visitantes"),
        (name = "Leave", description = "Férias, Licenças e Permissões"),
        (name = "Kiosk", description = "Quiosque da Portaria (público)")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_inventory_and_kiosk_paths() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/inventory/products/{id}/movements"));
        assert!(doc.paths.paths.contains_key("/api/kiosk/scan"));
    }
}
