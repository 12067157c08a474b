// src/handlers/inventory.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{db_utils::get_connection, error::AppError},
    config::AppState,
    models::inventory::{
        InventoryCategory, Kardex, Movement, MovementDirection, MovementMetadata, Period,
        PeriodClosing, PriceSpec, Product, QuantitySpec,
    },
    services::inventory_service::{ProductChanges, ProductDraft},
};

// ---
// Payloads
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductPayload {
    /// Se ausente, o código é gerado (`QUI-001`, `QUI-002`, ...)
    #[validate(length(min = 1, max = 20, message = "Código inválido."))]
    pub code: Option<String>,

    #[validate(length(min = 1, message = "El nombre es obligatorio."))]
    pub name: String,

    pub category: InventoryCategory,

    /// Período `AAAA-MM`; se ausente, o mês corrente
    #[schema(example = "2025-09")]
    pub period: Option<String>,

    #[validate(length(min = 1, message = "La unidad de medida es obligatoria."))]
    #[schema(example = "UNIDAD")]
    pub unit_of_measure: String,

    pub unit_price: Option<Decimal>,

    #[validate(range(min = 0, message = "El saldo inicial no puede ser negativo."))]
    #[serde(default)]
    pub opening_balance: i64,

    #[validate(range(min = 0, message = "El punto de reorden no puede ser negativo."))]
    #[serde(default)]
    pub reorder_threshold: i64,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductPayload {
    #[validate(length(min = 1, message = "El nombre es obligatorio."))]
    pub name: String,
    #[validate(length(min = 1, message = "La unidad de medida es obligatoria."))]
    pub unit_of_measure: String,
    pub unit_price: Option<Decimal>,
    #[validate(range(min = 0, message = "El punto de reorden no puede ser negativo."))]
    pub reorder_threshold: i64,
    pub is_active: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterMovementPayload {
    pub direction: MovementDirection,
    /// `{"units": n}` ou `{"packs": k, "contentPerPack": c}`
    pub quantity: QuantitySpec,
    /// `{"mode": "perUnit", "amount": ...}` ou `{"mode": "perPack", "amount": ...}`
    pub price: Option<PriceSpec>,
    #[serde(default)]
    pub metadata: MovementMetadata,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MovementRegistered {
    pub movement: Movement,
    pub product: Product,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ProductListQuery {
    pub category: Option<InventoryCategory>,
    /// Período `AAAA-MM`
    pub period: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PeriodQuery {
    /// Período `AAAA-MM`
    pub period: String,
}

// ---
// Produtos
// ---

#[utoipa::path(
    post,
    path = "/api/inventory/products",
    tag = "Inventory",
    request_body = CreateProductPayload,
    responses(
        (status = 201, description = "Produto criado", body = Product),
        (status = 409, description = "Código já existe no período")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_product(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let draft = ProductDraft {
        code: payload.code,
        name: payload.name,
        category: payload.category,
        period: match payload.period.as_deref() {
            Some(raw) => raw.parse::<Period>()?,
            None => Period::containing(Utc::now().date_naive()),
        },
        unit_of_measure: payload.unit_of_measure,
        unit_price: payload.unit_price,
        opening_balance: payload.opening_balance,
        reorder_threshold: payload.reorder_threshold,
    };

    let mut conn = get_connection(&app_state).await?;
    let product = app_state.inventory_service.create_product(&mut *conn, &draft).await?;

    Ok((StatusCode::CREATED, Json(product)))
}

#[utoipa::path(
    get,
    path = "/api/inventory/products",
    tag = "Inventory",
    params(ProductListQuery),
    responses((status = 200, description = "Produtos", body = Vec<Product>)),
    security(("api_jwt" = []))
)]
pub async fn list_products(
    State(app_state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let period = query.period.as_deref().map(str::parse::<Period>).transpose()?;

    let mut conn = get_connection(&app_state).await?;
    let products = app_state
        .inventory_service
        .list_products(&mut *conn, query.category, period)
        .await?;

    Ok(Json(products))
}

#[utoipa::path(
    get,
    path = "/api/inventory/products/{id}",
    tag = "Inventory",
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses(
        (status = 200, description = "Produto", body = Product),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_product(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_connection(&app_state).await?;
    let product = app_state.inventory_service.get_product(&mut *conn, id).await?;
    Ok(Json(product))
}

#[utoipa::path(
    put,
    path = "/api/inventory/products/{id}",
    tag = "Inventory",
    params(("id" = Uuid, Path, description = "ID do produto")),
    request_body = UpdateProductPayload,
    responses(
        (status = 200, description = "Produto atualizado", body = Product),
        (status = 409, description = "Período fechado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_product(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let changes = ProductChanges {
        name: payload.name,
        unit_of_measure: payload.unit_of_measure,
        unit_price: payload.unit_price,
        reorder_threshold: payload.reorder_threshold,
        is_active: payload.is_active,
    };

    let mut conn = get_connection(&app_state).await?;
    let product = app_state.inventory_service.update_product(&mut *conn, id, &changes).await?;

    Ok(Json(product))
}

// ---
// Movimentações e saldo
// ---

#[utoipa::path(
    post,
    path = "/api/inventory/products/{id}/movements",
    tag = "Inventory",
    params(("id" = Uuid, Path, description = "ID do produto")),
    request_body = RegisterMovementPayload,
    responses(
        (status = 201, description = "Movimentação registrada e saldo recalculado", body = MovementRegistered),
        (status = 409, description = "Período fechado"),
        (status = 422, description = "Quantidade ou preço inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn register_movement(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RegisterMovementPayload>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_connection(&app_state).await?;
    let (movement, product) = app_state
        .inventory_service
        .register_movement(
            &mut *conn,
            id,
            payload.direction,
            payload.quantity,
            payload.price,
            payload.metadata,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(MovementRegistered { movement, product })))
}

#[utoipa::path(
    get,
    path = "/api/inventory/products/{id}/kardex",
    tag = "Inventory",
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses((status = 200, description = "Kardex com saldo corrente", body = Kardex)),
    security(("api_jwt" = []))
)]
pub async fn get_kardex(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_connection(&app_state).await?;
    let kardex = app_state.inventory_service.kardex(&mut *conn, id).await?;
    Ok(Json(kardex))
}

#[utoipa::path(
    post,
    path = "/api/inventory/products/{id}/recompute",
    tag = "Inventory",
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses((status = 200, description = "Saldo recalculado a partir das movimentações", body = Product)),
    security(("api_jwt" = []))
)]
pub async fn recompute_balance(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_connection(&app_state).await?;
    let product = app_state.inventory_service.recompute_balance(&mut *conn, id).await?;
    Ok(Json(product))
}

#[utoipa::path(
    get,
    path = "/api/inventory/low-stock",
    tag = "Inventory",
    params(PeriodQuery),
    responses((status = 200, description = "Produtos abaixo do ponto de reposição", body = Vec<Product>)),
    security(("api_jwt" = []))
)]
pub async fn list_low_stock(
    State(app_state): State<AppState>,
    Query(query): Query<PeriodQuery>,
) -> Result<impl IntoResponse, AppError> {
    let period: Period = query.period.parse()?;

    let mut conn = get_connection(&app_state).await?;
    let products = app_state.inventory_service.list_low_stock(&mut *conn, period).await?;
    Ok(Json(products))
}

#[utoipa::path(
    post,
    path = "/api/inventory/periods/{period}/close",
    tag = "Inventory",
    params(("period" = String, Path, description = "Período `AAAA-MM`")),
    responses((status = 200, description = "Período fechado e seguinte aberto", body = PeriodClosing)),
    security(("api_jwt" = []))
)]
pub async fn close_period(
    State(app_state): State<AppState>,
    Path(period): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let period: Period = period.parse()?;

    let mut conn = get_connection(&app_state).await?;
    let closing = app_state.inventory_service.close_period(&mut *conn, period).await?;
    Ok(Json(closing))
}
