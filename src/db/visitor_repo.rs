// src/db/visitor_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;
use crate::{common::error::AppError, models::visitor::VisitorLog};

#[derive(Clone)]
pub struct VisitorRepository {
    pool: PgPool,
}

impl VisitorRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn register_entry<'e, E>(
        &self,
        executor: E,
        full_name: &str,
        document_number: &str,
        company: Option<&str>,
        host_employee_id: Option<Uuid>,
        purpose: Option<&str>,
    ) -> Result<VisitorLog, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let log = sqlx::query_as::<_, VisitorLog>(
            r#"
            INSERT INTO visitor_logs (full_name, document_number, company, host_employee_id, purpose)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(full_name)
        .bind(document_number)
        .bind(company)
        .bind(host_employee_id)
        .bind(purpose)
        .fetch_one(executor)
        .await?;
        Ok(log)
    }

    /// Só fecha visitas ainda abertas; `None` se não achou ou já saiu.
    pub async fn register_exit<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Option<VisitorLog>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let log = sqlx::query_as::<_, VisitorLog>(
            r#"
            UPDATE visitor_logs SET exited_at = $2
            WHERE id = $1 AND exited_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(at)
        .fetch_optional(executor)
        .await?;
        Ok(log)
    }

    pub async fn list<'e, E>(
        &self,
        executor: E,
        only_inside: bool,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<VisitorLog>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let logs = sqlx::query_as::<_, VisitorLog>(
            r#"
            SELECT * FROM visitor_logs
            WHERE ($1 = FALSE OR exited_at IS NULL)
              AND ($2::TIMESTAMPTZ IS NULL OR entered_at >= $2)
              AND ($3::TIMESTAMPTZ IS NULL OR entered_at < $3)
            ORDER BY entered_at DESC
            "#,
        )
        .bind(only_inside)
        .bind(from)
        .bind(to)
        .fetch_all(executor)
        .await?;
        Ok(logs)
    }
}
