// src/handlers/attendance.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    common::{db_utils::get_connection, error::AppError},
    config::AppState,
    models::attendance::AttendanceRecord,
};

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AttendanceQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub employee_id: Option<Uuid>,
}

#[utoipa::path(
    get,
    path = "/api/attendance",
    tag = "Attendance",
    params(AttendanceQuery),
    responses((status = 200, description = "Registros de ponto no intervalo", body = Vec<AttendanceRecord>)),
    security(("api_jwt" = []))
)]
pub async fn list_attendance(
    State(app_state): State<AppState>,
    Query(query): Query<AttendanceQuery>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_connection(&app_state).await?;
    let records = app_state
        .attendance_service
        .list(&mut *conn, query.from, query.to, query.employee_id)
        .await?;

    Ok(Json(records))
}

#[utoipa::path(
    post,
    path = "/api/attendance/{employee_id}/check-in",
    tag = "Attendance",
    params(("employee_id" = Uuid, Path, description = "ID do funcionário")),
    responses(
        (status = 201, description = "Entrada manual registrada", body = AttendanceRecord),
        (status = 422, description = "Já existe entrada aberta")
    ),
    security(("api_jwt" = []))
)]
pub async fn admin_check_in(
    State(app_state): State<AppState>,
    Path(employee_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_connection(&app_state).await?;
    let record = app_state.attendance_service.admin_check_in(&mut *conn, employee_id).await?;
    Ok((StatusCode::CREATED, Json(record)))
}
