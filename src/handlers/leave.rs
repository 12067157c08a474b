// src/handlers/leave.rs

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
    middleware::auth::AuthenticatedUser,
    models::leave::{LeaveKind, LeaveRequest, LeaveStatus},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeavePayload {
    pub employee_id: Uuid,
    pub kind: LeaveKind,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DecisionPayload {
    #[validate(length(max = 500))]
    pub note: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct LeaveListQuery {
    pub status: Option<LeaveStatus>,
    pub employee_id: Option<Uuid>,
}

#[utoipa::path(
    post,
    path = "/api/leave-requests",
    tag = "Leave",
    request_body = CreateLeavePayload,
    responses((status = 201, description = "Solicitação criada", body = LeaveRequest)),
    security(("api_jwt" = []))
)]
pub async fn create_leave_request(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateLeavePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let mut conn = get_connection(&app_state).await?;
    let request = app_state
        .leave_service
        .create(
            &mut *conn,
            payload.employee_id,
            payload.kind,
            payload.start_date,
            payload.end_date,
            payload.reason.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(request)))
}

#[utoipa::path(
    get,
    path = "/api/leave-requests",
    tag = "Leave",
    params(LeaveListQuery),
    responses((status = 200, description = "Solicitações", body = Vec<LeaveRequest>)),
    security(("api_jwt" = []))
)]
pub async fn list_leave_requests(
    State(app_state): State<AppState>,
    Query(query): Query<LeaveListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_connection(&app_state).await?;
    let requests = app_state
        .leave_service
        .list(&mut *conn, query.status, query.employee_id)
        .await?;

    Ok(Json(requests))
}

async fn decide(
    app_state: &AppState,
    user: &AuthenticatedUser,
    id: Uuid,
    decision: LeaveStatus,
    payload: DecisionPayload,
) -> Result<LeaveRequest, AppError> {
    payload.validate()?;

    let mut conn = get_connection(app_state).await?;
    app_state
        .leave_service
        .decide(&mut *conn, id, decision, user.0.id, payload.note.as_deref())
        .await
}

#[utoipa::path(
    post,
    path = "/api/leave-requests/{id}/approve",
    tag = "Leave",
    params(("id" = Uuid, Path, description = "ID da solicitação")),
    request_body = DecisionPayload,
    responses(
        (status = 200, description = "Solicitação aprovada", body = LeaveRequest),
        (status = 409, description = "Solicitação já decidida")
    ),
    security(("api_jwt" = []))
)]
pub async fn approve_leave_request(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<DecisionPayload>,
) -> Result<impl IntoResponse, AppError> {
    let request = decide(&app_state, &user, id, LeaveStatus::Approved, payload).await?;
    Ok(Json(request))
}

#[utoipa::path(
    post,
    path = "/api/leave-requests/{id}/reject",
    tag = "Leave",
    params(("id" = Uuid, Path, description = "ID da solicitação")),
    request_body = DecisionPayload,
    responses(
        (status = 200, description = "Solicitação rejeitada", body = LeaveRequest),
        (status = 409, description = "Solicitação já decidida")
    ),
    security(("api_jwt" = []))
)]
pub async fn reject_leave_request(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<DecisionPayload>,
) -> Result<impl IntoResponse, AppError> {
    let request = decide(&app_state, &user, id, LeaveStatus::Rejected, payload).await?;
    Ok(Json(request))
}
