// src/services/leave_service.rs

use chrono::NaiveDate;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{EmployeeRepository, LeaveRepository},
    models::leave::{LeaveKind, LeaveRequest, LeaveStatus},
};

#[derive(Clone)]
pub struct LeaveService {
    leave_repo: LeaveRepository,
    employee_repo: EmployeeRepository,
}

impl LeaveService {
    pub fn new(leave_repo: LeaveRepository, employee_repo: EmployeeRepository) -> Self {
        Self { leave_repo, employee_repo }
    }

    /// Solicitação pelo quiosque: o funcionário se identifica pelo documento.
    pub async fn submit_by_document<'e, E>(
        &self,
        executor: E,
        document_number: &str,
        kind: LeaveKind,
        start_date: NaiveDate,
        end_date: NaiveDate,
        reason: Option<&str>,
    ) -> Result<LeaveRequest, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let employee = self.employee_repo
            .find_by_document(&mut *tx, document_number.trim())
            .await?
            .filter(|e| e.is_active)
            .ok_or(AppError::NotFound("Empleado"))?;

        let request = self.create_in(&mut *tx, employee.id, kind, start_date, end_date, reason).await?;

        tx.commit().await?;
        Ok(request)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        employee_id: Uuid,
        kind: LeaveKind,
        start_date: NaiveDate,
        end_date: NaiveDate,
        reason: Option<&str>,
    ) -> Result<LeaveRequest, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        self.employee_repo
            .find_by_id(&mut *tx, employee_id)
            .await?
            .ok_or(AppError::NotFound("Empleado"))?;

        let request = self.create_in(&mut *tx, employee_id, kind, start_date, end_date, reason).await?;

        tx.commit().await?;
        Ok(request)
    }

    async fn create_in(
        &self,
        conn: &mut sqlx::PgConnection,
        employee_id: Uuid,
        kind: LeaveKind,
        start_date: NaiveDate,
        end_date: NaiveDate,
        reason: Option<&str>,
    ) -> Result<LeaveRequest, AppError> {
        if end_date < start_date {
            return Err(AppError::BusinessRule(
                "La fecha final es anterior a la fecha inicial.".into(),
            ));
        }

        let request = self.leave_repo
            .create(conn, employee_id, kind, start_date, end_date, reason)
            .await?;

        tracing::info!(request_id = %request.id, kind = ?kind, days = request.days(), "Solicitação de ausência criada");
        Ok(request)
    }

    pub async fn list<'e, E>(
        &self,
        executor: E,
        status: Option<LeaveStatus>,
        employee_id: Option<Uuid>,
    ) -> Result<Vec<LeaveRequest>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.leave_repo.list(executor, status, employee_id).await
    }

    /// Aprova ou rejeita. Só vale para solicitações pendentes.
    pub async fn decide<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        decision: LeaveStatus,
        reviewer_id: Uuid,
        note: Option<&str>,
    ) -> Result<LeaveRequest, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let current = self.leave_repo
            .find_for_update(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("Solicitud"))?;

        if !current.status.can_transition_to(decision) {
            return Err(AppError::LeaveAlreadyDecided);
        }

        let updated = self.leave_repo
            .set_decision(&mut *tx, id, decision, reviewer_id, note)
            .await?;

        tx.commit().await?;

        tracing::info!(request_id = %id, status = ?decision, reviewer = %reviewer_id, "Solicitação decidida");
        Ok(updated)
    }
}
