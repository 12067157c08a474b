// src/services/visitor_service.rs

use chrono::{NaiveDate, Utc};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, db::VisitorRepository, models::visitor::VisitorLog};

#[derive(Clone)]
pub struct VisitorService {
    visitor_repo: VisitorRepository,
}

impl VisitorService {
    pub fn new(visitor_repo: VisitorRepository) -> Self {
        Self { visitor_repo }
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
        let log = self.visitor_repo
            .register_entry(
                executor,
                full_name.trim(),
                document_number.trim(),
                company.map(str::trim).filter(|c| !c.is_empty()),
                host_employee_id,
                purpose,
            )
            .await?;

        tracing::info!(visitor_id = %log.id, "Entrada de visitante");
        Ok(log)
    }

    pub async fn register_exit<'e, E>(&self, executor: E, id: Uuid) -> Result<VisitorLog, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.visitor_repo
            .register_exit(executor, id, Utc::now())
            .await?
            .ok_or(AppError::NotFound("Visita abierta"))
    }

    /// `only_inside`: só quem ainda não saiu. `day`: entradas daquele dia.
    pub async fn list<'e, E>(
        &self,
        executor: E,
        only_inside: bool,
        day: Option<NaiveDate>,
    ) -> Result<Vec<VisitorLog>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let from = day.map(|d| d.and_time(chrono::NaiveTime::MIN).and_utc());
        let to = from.map(|f| f + chrono::Duration::days(1));
        self.visitor_repo.list(executor, only_inside, from, to).await
    }
}
