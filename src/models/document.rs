// src/models/document.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Planilha (modelo e documento renderizado) ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Cell {
    Empty,
    Text(String),
    Number(Decimal),
    Bool(bool),
    Date(NaiveDate),
}

impl Cell {
    /// Texto exibido no PDF.
    pub fn display(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(text) => text.clone(),
            Cell::Number(n) => n.normalize().to_string(),
            Cell::Bool(b) => if *b { "SI".to_string() } else { "NO".to_string() },
            Cell::Date(d) => d.format("%d/%m/%Y").to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Sheet {
    #[schema(example = "Contrato")]
    pub name: String,
    pub rows: Vec<Vec<Cell>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

// --- Modelo de contrato ---
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContractTemplate {
    pub id: Uuid,
    #[schema(example = "Contrato término fijo")]
    pub name: String,
    #[schema(value_type = Workbook)]
    pub content: Json<Workbook>,
    pub created_at: DateTime<Utc>,
}

// --- Documento gerado ---
// Gravado uma vez e nunca alterado. Gerar de novo cria outra linha.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedDocument {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub contract_id: Uuid,
    pub template_id: Option<Uuid>,
    #[schema(example = "contrato_1032456789_20250915103000.json")]
    pub filename: String,
    pub content_type: String,
    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub content: Vec<u8>,
    pub unresolved_tokens: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

/// Listagem sem o blob.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub contract_id: Uuid,
    pub template_id: Option<Uuid>,
    pub filename: String,
    pub content_type: String,
    pub unresolved_tokens: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

/// Modelo recém-criado e os tokens que o gerador não sabe preencher sozinho.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TemplateCreated {
    pub template: ContractTemplate,
    pub unknown_tokens: Vec<String>,
}
