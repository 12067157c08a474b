// src/handlers/documents.rs

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::collections::BTreeMap;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{db_utils::get_connection, error::AppError},
    config::AppState,
    models::document::{ContractTemplate, DocumentSummary, GeneratedDocument, TemplateCreated, Workbook},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTemplatePayload {
    #[validate(length(min = 1, max = 120, message = "El nombre de la plantilla es obligatorio."))]
    pub name: String,
    pub content: Workbook,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateDocumentPayload {
    pub employee_id: Uuid,
    pub contract_id: Uuid,
    pub template_id: Uuid,
    /// Valores para tokens fora dos campos do contrato
    #[serde(default)]
    pub extra_fields: BTreeMap<String, String>,
}

fn attachment(content_type: &str, filename: &str, bytes: Vec<u8>) -> Response {
    let headers = [
        (header::CONTENT_TYPE, content_type.to_string()),
        (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", filename)),
    ];
    (headers, bytes).into_response()
}

// ---
// Modelos
// ---

#[utoipa::path(
    post,
    path = "/api/templates",
    tag = "Documents",
    request_body = CreateTemplatePayload,
    responses(
        (status = 201, description = "Modelo criado", body = TemplateCreated),
        (status = 409, description = "Nome já usado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_template(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateTemplatePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let mut conn = get_connection(&app_state).await?;
    let created = app_state
        .document_service
        .create_template(&mut *conn, &payload.name, &payload.content)
        .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/api/templates",
    tag = "Documents",
    responses((status = 200, description = "Modelos", body = Vec<ContractTemplate>)),
    security(("api_jwt" = []))
)]
pub async fn list_templates(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_connection(&app_state).await?;
    let templates = app_state.document_service.list_templates(&mut *conn).await?;
    Ok(Json(templates))
}

// ---
// Documentos
// ---

#[utoipa::path(
    post,
    path = "/api/documents",
    tag = "Documents",
    request_body = GenerateDocumentPayload,
    responses(
        (status = 201, description = "Documento gerado; tokens sem valor em `unresolvedTokens`", body = GeneratedDocument),
        (status = 404, description = "Funcionário, contrato ou modelo não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn generate_document(
    State(app_state): State<AppState>,
    Json(payload): Json<GenerateDocumentPayload>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_connection(&app_state).await?;
    let document = app_state
        .document_service
        .generate_contract_document(
            &mut *conn,
            payload.employee_id,
            payload.contract_id,
            payload.template_id,
            payload.extra_fields,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(document)))
}

#[utoipa::path(
    get,
    path = "/api/employees/{id}/documents",
    tag = "Documents",
    params(("id" = Uuid, Path, description = "ID do funcionário")),
    responses((status = 200, description = "Documentos do funcionário", body = Vec<DocumentSummary>)),
    security(("api_jwt" = []))
)]
pub async fn list_employee_documents(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_connection(&app_state).await?;
    let documents = app_state.document_service.list_for_employee(&mut *conn, id).await?;
    Ok(Json(documents))
}

#[utoipa::path(
    get,
    path = "/api/documents/{id}/download",
    tag = "Documents",
    params(("id" = Uuid, Path, description = "ID do documento")),
    responses((status = 200, description = "Conteúdo gravado do documento")),
    security(("api_jwt" = []))
)]
pub async fn download_document(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let mut conn = get_connection(&app_state).await?;
    let document = app_state.document_service.get_document(&mut *conn, id).await?;

    Ok(attachment(&document.content_type, &document.filename, document.content))
}

#[utoipa::path(
    get,
    path = "/api/documents/{id}/pdf",
    tag = "Documents",
    params(("id" = Uuid, Path, description = "ID do documento")),
    responses(
        (status = 200, description = "Documento em PDF", content_type = "application/pdf"),
        (status = 500, description = "Fonte não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn export_document_pdf(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let mut conn = get_connection(&app_state).await?;
    let (filename, pdf_bytes) = app_state.document_service.export_pdf(&mut *conn, id).await?;

    Ok(attachment("application/pdf", &filename, pdf_bytes))
}
