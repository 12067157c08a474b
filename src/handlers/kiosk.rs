// src/handlers/kiosk.rs
//
// Rotas públicas do quiosque da portaria. Nada aqui exige login.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::{db_utils::get_connection, error::AppError},
    config::AppState,
    handlers::visitors::{self, VisitorPayload},
    models::{
        attendance::ScanResult,
        leave::{LeaveKind, LeaveRequest},
        visitor::VisitorLog,
    },
};

#[derive(Debug, Serialize, ToSchema)]
pub struct KioskTokenResponse {
    pub token: String,
    pub ttl_secs: i64,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScanPayload {
    #[validate(length(min = 1, message = "Token obligatorio."))]
    pub token: String,
    #[validate(length(min = 3, max = 20, message = "Documento inválido."))]
    pub document_number: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct KioskLeavePayload {
    #[validate(length(min = 3, max = 20, message = "Documento inválido."))]
    pub document_number: String,
    pub kind: LeaveKind,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/kiosk/qr",
    tag = "Kiosk",
    responses((status = 200, description = "QR de curta duração para o ponto (PNG)", content_type = "image/png"))
)]
pub async fn kiosk_qr(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let png = app_state.attendance_service.kiosk_qr()?;
    Ok((
        [(header::CONTENT_TYPE, "image/png"), (header::CACHE_CONTROL, "no-store")],
        png,
    ))
}

#[utoipa::path(
    get,
    path = "/api/kiosk/token",
    tag = "Kiosk",
    responses((status = 200, description = "Token do QR em texto", body = KioskTokenResponse))
)]
pub async fn kiosk_token(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let token = app_state.attendance_service.kiosk_token()?;
    Ok(Json(KioskTokenResponse {
        token,
        ttl_secs: app_state.attendance_service.kiosk_token_ttl_secs(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/kiosk/scan",
    tag = "Kiosk",
    request_body = ScanPayload,
    responses(
        (status = 200, description = "Entrada ou saída registrada", body = ScanResult),
        (status = 401, description = "QR expirado ou inválido"),
        (status = 404, description = "Funcionário não encontrado")
    )
)]
pub async fn kiosk_scan(
    State(app_state): State<AppState>,
    Json(payload): Json<ScanPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let mut conn = get_connection(&app_state).await?;
    let result = app_state
        .attendance_service
        .scan(&mut *conn, payload.token.trim(), &payload.document_number)
        .await?;

    Ok(Json(result))
}

#[utoipa::path(
    post,
    path = "/api/kiosk/visitors",
    tag = "Kiosk",
    request_body = VisitorPayload,
    responses((status = 201, description = "Entrada do visitante registrada", body = VisitorLog))
)]
pub async fn kiosk_register_visitor(
    State(app_state): State<AppState>,
    Json(payload): Json<VisitorPayload>,
) -> Result<impl IntoResponse, AppError> {
    let log = visitors::register(&app_state, payload).await?;
    Ok((StatusCode::CREATED, Json(log)))
}

#[utoipa::path(
    post,
    path = "/api/kiosk/leave-requests",
    tag = "Kiosk",
    request_body = KioskLeavePayload,
    responses(
        (status = 201, description = "Solicitação enviada", body = LeaveRequest),
        (status = 404, description = "Funcionário não encontrado")
    )
)]
pub async fn kiosk_leave_request(
    State(app_state): State<AppState>,
    Json(payload): Json<KioskLeavePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let mut conn = get_connection(&app_state).await?;
    let request = app_state
        .leave_service
        .submit_by_document(
            &mut *conn,
            &payload.document_number,
            payload.kind,
            payload.start_date,
            payload.end_date,
            payload.reason.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(request)))
}
