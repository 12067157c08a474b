// src/handlers/employees.rs

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    common::{db_utils::get_connection, error::AppError},
    config::AppState,
    models::employee::{Contract, Employee, EmployeeInput},
};

fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.message = Some("El valor no puede ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeePayload {
    #[validate(length(min = 3, max = 20, message = "Documento inválido."))]
    #[schema(example = "1032456789")]
    pub document_number: String,
    #[validate(length(min = 1, message = "El nombre es obligatorio."))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Los apellidos son obligatorios."))]
    pub last_name: String,
    pub position: Option<String>,
    #[validate(email(message = "El correo no es válido."))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub hired_at: Option<NaiveDate>,
}

impl From<EmployeePayload> for EmployeeInput {
    fn from(p: EmployeePayload) -> Self {
        EmployeeInput {
            document_number: p.document_number.trim().to_string(),
            first_name: p.first_name.trim().to_string(),
            last_name: p.last_name.trim().to_string(),
            position: p.position,
            email: p.email,
            phone: p.phone,
            hired_at: p.hired_at,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct EmployeeListQuery {
    /// Só funcionários ativos (padrão: true)
    pub only_active: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeStatusPayload {
    pub is_active: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateContractPayload {
    #[validate(length(min = 1, message = "El tipo de contrato es obligatorio."))]
    #[schema(example = "TERMINO FIJO")]
    pub contract_type: String,
    #[validate(custom(function = "validate_not_negative"))]
    #[schema(example = "1500000")]
    pub salary: Decimal,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

// ---
// Funcionários
// ---

#[utoipa::path(
    post,
    path = "/api/employees",
    tag = "Employees",
    request_body = EmployeePayload,
    responses(
        (status = 201, description = "Funcionário criado", body = Employee),
        (status = 409, description = "Documento já cadastrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_employee(
    State(app_state): State<AppState>,
    Json(payload): Json<EmployeePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let mut conn = get_connection(&app_state).await?;
    let employee = app_state
        .employee_service
        .create_employee(&mut *conn, &payload.into())
        .await?;

    Ok((StatusCode::CREATED, Json(employee)))
}

#[utoipa::path(
    get,
    path = "/api/employees",
    tag = "Employees",
    params(EmployeeListQuery),
    responses((status = 200, description = "Lista de funcionários", body = Vec<Employee>)),
    security(("api_jwt" = []))
)]
pub async fn list_employees(
    State(app_state): State<AppState>,
    Query(query): Query<EmployeeListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_connection(&app_state).await?;
    let employees = app_state
        .employee_service
        .list_employees(&mut *conn, query.only_active.unwrap_or(true))
        .await?;

    Ok(Json(employees))
}

#[utoipa::path(
    get,
    path = "/api/employees/{id}",
    tag = "Employees",
    params(("id" = Uuid, Path, description = "ID do funcionário")),
    responses(
        (status = 200, description = "Funcionário", body = Employee),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_employee(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_connection(&app_state).await?;
    let employee = app_state.employee_service.get_employee(&mut *conn, id).await?;
    Ok(Json(employee))
}

#[utoipa::path(
    put,
    path = "/api/employees/{id}",
    tag = "Employees",
    params(("id" = Uuid, Path, description = "ID do funcionário")),
    request_body = EmployeePayload,
    responses((status = 200, description = "Funcionário atualizado", body = Employee)),
    security(("api_jwt" = []))
)]
pub async fn update_employee(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<EmployeePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let mut conn = get_connection(&app_state).await?;
    let employee = app_state
        .employee_service
        .update_employee(&mut *conn, id, &payload.into())
        .await?;

    Ok(Json(employee))
}

#[utoipa::path(
    patch,
    path = "/api/employees/{id}/status",
    tag = "Employees",
    params(("id" = Uuid, Path, description = "ID do funcionário")),
    request_body = EmployeeStatusPayload,
    responses((status = 200, description = "Situação alterada", body = Employee)),
    security(("api_jwt" = []))
)]
pub async fn set_employee_status(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<EmployeeStatusPayload>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_connection(&app_state).await?;
    let employee = app_state
        .employee_service
        .set_employee_active(&mut *conn, id, payload.is_active)
        .await?;

    Ok(Json(employee))
}

#[utoipa::path(
    get,
    path = "/api/employees/{id}/qr",
    tag = "Employees",
    params(("id" = Uuid, Path, description = "ID do funcionário")),
    responses((status = 200, description = "QR do crachá (PNG)", content_type = "image/png")),
    security(("api_jwt" = []))
)]
pub async fn get_employee_qr(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_connection(&app_state).await?;
    let png = app_state.employee_service.badge_qr(&mut *conn, id).await?;

    Ok(([(header::CONTENT_TYPE, "image/png")], png))
}

// ---
// Contratos
// ---

#[utoipa::path(
    get,
    path = "/api/employees/{id}/contracts",
    tag = "Employees",
    params(("id" = Uuid, Path, description = "ID do funcionário")),
    responses((status = 200, description = "Contratos do funcionário", body = Vec<Contract>)),
    security(("api_jwt" = []))
)]
pub async fn list_contracts(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_connection(&app_state).await?;
    let contracts = app_state.employee_service.list_contracts(&mut *conn, id).await?;
    Ok(Json(contracts))
}

#[utoipa::path(
    post,
    path = "/api/employees/{id}/contracts",
    tag = "Employees",
    params(("id" = Uuid, Path, description = "ID do funcionário")),
    request_body = CreateContractPayload,
    responses(
        (status = 201, description = "Contrato criado", body = Contract),
        (status = 422, description = "Datas ou salário inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_contract(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateContractPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let mut conn = get_connection(&app_state).await?;
    let contract = app_state
        .employee_service
        .create_contract(
            &mut *conn,
            id,
            payload.contract_type.trim(),
            payload.salary,
            payload.start_date,
            payload.end_date,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(contract)))
}

#[utoipa::path(
    delete,
    path = "/api/contracts/{id}",
    tag = "Employees",
    params(("id" = Uuid, Path, description = "ID do contrato")),
    responses((status = 200, description = "Contrato desativado", body = Contract)),
    security(("api_jwt" = []))
)]
pub async fn deactivate_contract(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_connection(&app_state).await?;
    let contract = app_state.employee_service.deactivate_contract(&mut *conn, id).await?;
    Ok(Json(contract))
}
