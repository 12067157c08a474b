// src/handlers/visitors.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{db_utils::get_connection, error::AppError},
    config::AppState,
    models::visitor::VisitorLog,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VisitorPayload {
    #[validate(length(min = 3, message = "El nombre del visitante es obligatorio."))]
    pub full_name: String,
    #[validate(length(min = 3, max = 20, message = "Documento inválido."))]
    pub document_number: String,
    pub company: Option<String>,
    pub host_employee_id: Option<Uuid>,
    #[validate(length(max = 255))]
    pub purpose: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct VisitorListQuery {
    /// Só visitantes que ainda não saíram
    #[serde(default)]
    pub only_inside: bool,
    pub day: Option<NaiveDate>,
}

/// Usado também pelo quiosque.
pub(crate) async fn register(app_state: &AppState, payload: VisitorPayload) -> Result<VisitorLog, AppError> {
    payload.validate()?;

    let mut conn = get_connection(app_state).await?;
    app_state
        .visitor_service
        .register_entry(
            &mut *conn,
            &payload.full_name,
            &payload.document_number,
            payload.company.as_deref(),
            payload.host_employee_id,
            payload.purpose.as_deref(),
        )
        .await
}

#[utoipa::path(
    post,
    path = "/api/visitors",
    tag = "Visitors",
    request_body = VisitorPayload,
    responses((status = 201, description = "Entrada registrada", body = VisitorLog)),
    security(("api_jwt" = []))
)]
pub async fn register_visitor(
    State(app_state): State<AppState>,
    Json(payload): Json<VisitorPayload>,
) -> Result<impl IntoResponse, AppError> {
    let log = register(&app_state, payload).await?;
    Ok((StatusCode::CREATED, Json(log)))
}

#[utoipa::path(
    post,
    path = "/api/visitors/{id}/exit",
    tag = "Visitors",
    params(("id" = Uuid, Path, description = "ID da visita")),
    responses(
        (status = 200, description = "Saída registrada", body = VisitorLog),
        (status = 404, description = "Visita não encontrada ou já encerrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn register_exit(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_connection(&app_state).await?;
    let log = app_state.visitor_service.register_exit(&mut *conn, id).await?;
    Ok(Json(log))
}

#[utoipa::path(
    get,
    path = "/api/visitors",
    tag = "Visitors",
    params(VisitorListQuery),
    responses((status = 200, description = "Visitas", body = Vec<VisitorLog>)),
    security(("api_jwt" = []))
)]
pub async fn list_visitors(
    State(app_state): State<AppState>,
    Query(query): Query<VisitorListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_connection(&app_state).await?;
    let logs = app_state
        .visitor_service
        .list(&mut *conn, query.only_inside, query.day)
        .await?;

    Ok(Json(logs))
}
