// src/db/document_repo.rs

use sqlx::{types::Json, Executor, PgPool, Postgres};
use uuid::Uuid;
use crate::{
    common::{db_utils::unique_violation, error::AppError},
    models::document::{ContractTemplate, DocumentSummary, GeneratedDocument, Workbook},
};

#[derive(Clone)]
pub struct DocumentRepository {
    pool: PgPool,
}

impl DocumentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  MODELOS
    // =========================================================================

    pub async fn create_template<'e, E>(
        &self,
        executor: E,
        name: &str,
        content: &Workbook,
    ) -> Result<ContractTemplate, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, ContractTemplate>(
            "INSERT INTO contract_templates (name, content) VALUES ($1, $2) RETURNING *",
        )
        .bind(name)
        .bind(Json(content))
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if unique_violation(&e).is_some() {
                return AppError::TemplateNameAlreadyExists(name.to_string());
            }
            e.into()
        })
    }

    pub async fn list_templates<'e, E>(&self, executor: E) -> Result<Vec<ContractTemplate>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let templates = sqlx::query_as::<_, ContractTemplate>(
            "SELECT * FROM contract_templates ORDER BY name ASC",
        )
        .fetch_all(executor)
        .await?;
        Ok(templates)
    }

    pub async fn find_template<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<ContractTemplate>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let template = sqlx::query_as::<_, ContractTemplate>(
            "SELECT * FROM contract_templates WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(template)
    }

    // =========================================================================
    //  DOCUMENTOS GERADOS (somente INSERT e SELECT)
    // =========================================================================

    #[allow(clippy::too_many_arguments)]
    pub async fn insert_document<'e, E>(
        &self,
        executor: E,
        employee_id: Uuid,
        contract_id: Uuid,
        template_id: Uuid,
        filename: &str,
        content_type: &str,
        content: &[u8],
        unresolved_tokens: &[String],
    ) -> Result<GeneratedDocument, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let document = sqlx::query_as::<_, GeneratedDocument>(
            r#"
            INSERT INTO generated_documents
                (employee_id, contract_id, template_id, filename, content_type, content, unresolved_tokens)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(employee_id)
        .bind(contract_id)
        .bind(template_id)
        .bind(filename)
        .bind(content_type)
        .bind(content)
        .bind(unresolved_tokens)
        .fetch_one(executor)
        .await?;
        Ok(document)
    }

    pub async fn find_document<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<GeneratedDocument>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let document = sqlx::query_as::<_, GeneratedDocument>(
            "SELECT * FROM generated_documents WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(document)
    }

    pub async fn list_for_employee<'e, E>(
        &self,
        executor: E,
        employee_id: Uuid,
    ) -> Result<Vec<DocumentSummary>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let documents = sqlx::query_as::<_, DocumentSummary>(
            r#"
            SELECT id, employee_id, contract_id, template_id, filename, content_type,
                   unresolved_tokens, generated_at
            FROM generated_documents
            WHERE employee_id = $1
            ORDER BY generated_at DESC
            "#,
        )
        .bind(employee_id)
        .fetch_all(executor)
        .await?;
        Ok(documents)
    }
}
