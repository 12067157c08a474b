// src/models/visitor.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VisitorLog {
    pub id: Uuid,
    #[schema(example = "Carlos Pérez")]
    pub full_name: String,
    pub document_number: String,
    pub company: Option<String>,
    pub host_employee_id: Option<Uuid>,
    #[schema(example = "Mantenimiento de ascensores")]
    pub purpose: Option<String>,
    pub entered_at: DateTime<Utc>,
    pub exited_at: Option<DateTime<Utc>>,
}
