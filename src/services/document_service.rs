// src/services/document_service.rs

use chrono::Utc;
use genpdf::{elements, style, Element};
use std::collections::BTreeMap;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ContractRepository, DocumentRepository, EmployeeRepository},
    models::document::{
        ContractTemplate, DocumentSummary, GeneratedDocument, TemplateCreated, Workbook,
    },
    services::template_engine::{self, ContractFields},
};

pub const WORKBOOK_CONTENT_TYPE: &str = "application/json";

#[derive(Clone)]
pub struct DocumentService {
    document_repo: DocumentRepository,
    employee_repo: EmployeeRepository,
    contract_repo: ContractRepository,
    fonts_dir: String,
}

/// Nome do arquivo gerado: `contrato_{cedula}_{AAAAMMDDHHMMSS}.json`.
pub fn document_filename(document_number: &str, at: chrono::DateTime<Utc>) -> String {
    let cedula: String = document_number
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();
    format!("contrato_{}_{}.json", cedula, at.format("%Y%m%d%H%M%S"))
}

/// Tokens do modelo que não fazem parte de `ContractFields`.
pub fn unknown_tokens(content: &Workbook) -> Vec<String> {
    template_engine::workbook_tokens(content)
        .into_iter()
        .filter(|t| !ContractFields::KNOWN_TOKENS.contains(&t.as_str()))
        .collect()
}

fn pdf_error(e: impl std::fmt::Display) -> AppError {
    AppError::InternalServerError(anyhow::Error::msg(e.to_string()))
}

impl DocumentService {
    pub fn new(
        document_repo: DocumentRepository,
        employee_repo: EmployeeRepository,
        contract_repo: ContractRepository,
        fonts_dir: String,
    ) -> Self {
        Self { document_repo, employee_repo, contract_repo, fonts_dir }
    }

    // --- MODELOS ---

    pub async fn create_template<'e, E>(
        &self,
        executor: E,
        name: &str,
        content: &Workbook,
    ) -> Result<TemplateCreated, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if content.sheets.is_empty() {
            return Err(AppError::BusinessRule("La plantilla no tiene hojas.".into()));
        }

        let template = self.document_repo.create_template(executor, name.trim(), content).await?;
        let unknown = unknown_tokens(content);
        if !unknown.is_empty() {
            tracing::warn!(template = %template.name, tokens = ?unknown, "Modelo usa tokens sem campo conhecido");
        }

        Ok(TemplateCreated { template, unknown_tokens: unknown })
    }

    pub async fn list_templates<'e, E>(&self, executor: E) -> Result<Vec<ContractTemplate>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.document_repo.list_templates(executor).await
    }

    // --- DOCUMENTOS ---

    /// Renderiza o modelo com os dados do contrato e grava o documento.
    /// Tokens sem valor não impedem a geração; voltam em `unresolved_tokens`.
    pub async fn generate_contract_document<'e, E>(
        &self,
        executor: E,
        employee_id: Uuid,
        contract_id: Uuid,
        template_id: Uuid,
        extra: BTreeMap<String, String>,
    ) -> Result<GeneratedDocument, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let employee = self.employee_repo
            .find_by_id(&mut *tx, employee_id)
            .await?
            .ok_or(AppError::NotFound("Empleado"))?;

        let contract = self.contract_repo
            .find_by_id(&mut *tx, contract_id)
            .await?
            .filter(|c| c.employee_id == employee.id)
            .ok_or(AppError::NotFound("Contrato"))?;

        let template = self.document_repo
            .find_template(&mut *tx, template_id)
            .await?
            .ok_or(AppError::NotFound("Plantilla"))?;

        let now = Utc::now();
        let fields = ContractFields::new(&employee, &contract, now.date_naive()).with_extra(extra);
        let output = template_engine::render(&template.content, &fields)?;

        let unresolved: Vec<String> = output.unresolved.into_iter().collect();
        let filename = document_filename(&employee.document_number, now);

        let document = self.document_repo
            .insert_document(
                &mut *tx,
                employee.id,
                contract.id,
                template.id,
                &filename,
                WORKBOOK_CONTENT_TYPE,
                &output.bytes,
                &unresolved,
            )
            .await?;

        tx.commit().await?;

        if unresolved.is_empty() {
            tracing::info!(document_id = %document.id, %filename, "Documento gerado");
        } else {
            tracing::warn!(
                document_id = %document.id,
                tokens = ?unresolved,
                "Documento gerado com tokens sem valor"
            );
        }

        Ok(document)
    }

    pub async fn get_document<'e, E>(&self, executor: E, id: Uuid) -> Result<GeneratedDocument, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.document_repo
            .find_document(executor, id)
            .await?
            .ok_or(AppError::NotFound("Documento"))
    }

    pub async fn list_for_employee<'e, E>(
        &self,
        executor: E,
        employee_id: Uuid,
    ) -> Result<Vec<DocumentSummary>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.document_repo.list_for_employee(executor, employee_id).await
    }

    /// PDF do documento gravado: uma tabela por aba. Devolve (nome do arquivo, bytes).
    pub async fn export_pdf<'e, E>(&self, executor: E, id: Uuid) -> Result<(String, Vec<u8>), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let document = self.get_document(executor, id).await?;

        let workbook: Workbook = serde_json::from_slice(&document.content)
            .map_err(|e| AppError::InternalServerError(anyhow::Error::new(e)))?;

        let bytes = self.render_pdf(&document.filename, &workbook)?;
        let filename = document.filename.trim_end_matches(".json").to_string() + ".pdf";

        Ok((filename, bytes))
    }

    fn render_pdf(&self, title: &str, workbook: &Workbook) -> Result<Vec<u8>, AppError> {
        // Carrega a fonte da pasta configurada
        let font_family = genpdf::fonts::from_files(&self.fonts_dir, "Roboto", None)
            .map_err(|_| AppError::FontNotFound(self.fonts_dir.clone()))?;

        let mut doc = genpdf::Document::new(font_family);
        doc.set_title(title);
        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(10);
        doc.set_page_decorator(decorator);

        for sheet in &workbook.sheets {
            doc.push(elements::Paragraph::new(sheet.name.clone())
                .styled(style::Style::new().bold().with_font_size(14)));
            doc.push(elements::Break::new(1));

            let columns = sheet.rows.iter().map(Vec::len).max().unwrap_or(0);
            if columns == 0 {
                continue;
            }

            let mut table = elements::TableLayout::new(vec![1; columns]);
            table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));

            for row in &sheet.rows {
                let mut table_row = table.row();
                for col in 0..columns {
                    let text = row.get(col).map(|cell| cell.display()).unwrap_or_default();
                    table_row.push_element(
                        elements::Paragraph::new(text).styled(style::Style::new().with_font_size(9)),
                    );
                }
                table_row.push().map_err(pdf_error)?;
            }

            doc.push(table);
            doc.push(elements::Break::new(2));
        }

        let mut buffer = Vec::new();
        doc.render(&mut buffer).map_err(pdf_error)?;

        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::document::{Cell, Sheet};
    use chrono::TimeZone;

    #[test]
    fn filename_uses_document_number_and_timestamp() {
        let at = Utc.with_ymd_and_hms(2025, 9, 15, 10, 30, 0).unwrap();
        assert_eq!(
            document_filename("1.032.456.789", at),
            "contrato_1032456789_20250915103000.json"
        );
    }

    #[test]
    fn reports_only_tokens_outside_contract_fields() {
        let content = Workbook {
            sheets: vec![Sheet {
                name: "Contrato".into(),
                rows: vec![vec![
                    Cell::Text("{NOMBRE} - {CEDULA}".into()),
                    Cell::Text("{JORNADA}".into()),
                    Cell::Number(rust_decimal::Decimal::ONE),
                ]],
            }],
        };
        assert_eq!(unknown_tokens(&content), vec!["JORNADA".to_string()]);
    }
}
