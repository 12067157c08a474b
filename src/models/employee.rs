// src/models/employee.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Funcionário ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: Uuid,
    #[schema(example = "1032456789")]
    pub document_number: String,
    #[schema(example = "María Fernanda")]
    pub first_name: String,
    #[schema(example = "Gómez Ruiz")]
    pub last_name: String,
    #[schema(example = "Auxiliar de bodega")]
    pub position: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub hired_at: Option<NaiveDate>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
    }
}

// --- Contrato ---
// `end_date = None` significa contrato a termo indefinido.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    pub id: Uuid,
    pub employee_id: Uuid,
    #[schema(example = "TERMINO FIJO")]
    pub contract_type: String,
    #[schema(example = "1500000.00")]
    pub salary: Decimal,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Campos editáveis do funcionário.
#[derive(Debug, Clone, Default)]
pub struct EmployeeInput {
    pub document_number: String,
    pub first_name: String,
    pub last_name: String,
    pub position: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub hired_at: Option<NaiveDate>,
}
