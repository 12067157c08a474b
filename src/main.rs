//src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, patch, post},
    Router,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::{AppState, Config};
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let config = Config::from_env()?;
    let app_state = AppState::new(&config).await?;

    sqlx::migrate!().run(&app_state.db_pool).await?;
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    // Quiosque da portaria (público; o ponto é protegido pelo token do QR)
    let kiosk_routes = Router::new()
        .route("/qr", get(handlers::kiosk::kiosk_qr))
        .route("/token", get(handlers::kiosk::kiosk_token))
        .route("/scan", post(handlers::kiosk::kiosk_scan))
        .route("/visitors", post(handlers::kiosk::kiosk_register_visitor))
        .route("/leave-requests", post(handlers::kiosk::kiosk_leave_request));

    let user_routes = Router::new()
        .route("/me", get(handlers::auth::get_me));

    let employee_routes = Router::new()
        .route("/"
               ,post(handlers::employees::create_employee)
               .get(handlers::employees::list_employees)
        )
        .route("/{id}"
               ,get(handlers::employees::get_employee)
               .put(handlers::employees::update_employee)
        )
        .route("/{id}/status", patch(handlers::employees::set_employee_status))
        .route("/{id}/qr", get(handlers::employees::get_employee_qr))
        .route("/{id}/contracts"
               ,post(handlers::employees::create_contract)
               .get(handlers::employees::list_contracts)
        )
        .route("/{id}/documents", get(handlers::documents::list_employee_documents));

    let contract_routes = Router::new()
        .route("/{id}", delete(handlers::employees::deactivate_contract));

    let inventory_routes = Router::new()
        .route("/products"
               ,post(handlers::inventory::create_product)
               .get(handlers::inventory::list_products)
        )
        .route("/products/{id}"
               ,get(handlers::inventory::get_product)
               .put(handlers::inventory::update_product)
        )
        .route("/products/{id}/movements", post(handlers::inventory::register_movement))
        .route("/products/{id}/kardex", get(handlers::inventory::get_kardex))
        .route("/products/{id}/recompute", post(handlers::inventory::recompute_balance))
        .route("/low-stock", get(handlers::inventory::list_low_stock))
        .route("/periods/{period}/close", post(handlers::inventory::close_period));

    let template_routes = Router::new()
        .route("/"
               ,post(handlers::documents::create_template)
               .get(handlers::documents::list_templates)
        );

    let document_routes = Router::new()
        .route("/", post(handlers::documents::generate_document))
        .route("/{id}/download", get(handlers::documents::download_document))
        .route("/{id}/pdf", get(handlers::documents::export_document_pdf));

    let attendance_routes = Router::new()
        .route("/", get(handlers::attendance::list_attendance))
        .route("/{employee_id}/check-in", post(handlers::attendance::admin_check_in));

    let visitor_routes = Router::new()
        .route("/"
               ,post(handlers::visitors::register_visitor)
               .get(handlers::visitors::list_visitors)
        )
        .route("/{id}/exit", post(handlers::visitors::register_exit));

    let leave_routes = Router::new()
        .route("/"
               ,post(handlers::leave::create_leave_request)
               .get(handlers::leave::list_leave_requests)
        )
        .route("/{id}/approve", post(handlers::leave::approve_leave_request))
        .route("/{id}/reject", post(handlers::leave::reject_leave_request));

    // Tudo o que é administrativo passa pelo auth_guard
    let protected = Router::new()
        .nest("/users", user_routes)
        .nest("/employees", employee_routes)
        .nest("/contracts", contract_routes)
        .nest("/inventory", inventory_routes)
        .nest("/templates", template_routes)
        .nest("/documents", document_routes)
        .nest("/attendance", attendance_routes)
        .nest("/visitors", visitor_routes)
        .nest("/leave-requests", leave_routes)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api/kiosk", kiosk_routes)
        .nest("/api", protected)
        .with_state(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", docs::ApiDoc::openapi()));

    let listener = TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
