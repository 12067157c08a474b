// src/db/leave_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;
use crate::{
    common::error::AppError,
    models::leave::{LeaveKind, LeaveRequest, LeaveStatus},
};

#[derive(Clone)]
pub struct LeaveRepository {
    pool: PgPool,
}

impl LeaveRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
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
        E: Executor<'e, Database = Postgres>,
    {
        let request = sqlx::query_as::<_, LeaveRequest>(
            r#"
            INSERT INTO leave_requests (employee_id, kind, start_date, end_date, reason)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(employee_id)
        .bind(kind)
        .bind(start_date)
        .bind(end_date)
        .bind(reason)
        .fetch_one(executor)
        .await?;
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
        let requests = sqlx::query_as::<_, LeaveRequest>(
            r#"
            SELECT * FROM leave_requests
            WHERE ($1::leave_status IS NULL OR status = $1)
              AND ($2::UUID IS NULL OR employee_id = $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(status)
        .bind(employee_id)
        .fetch_all(executor)
        .await?;
        Ok(requests)
    }

    pub async fn find_for_update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<LeaveRequest>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let request = sqlx::query_as::<_, LeaveRequest>(
            "SELECT * FROM leave_requests WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(request)
    }

    pub async fn set_decision<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: LeaveStatus,
        reviewer_id: Uuid,
        note: Option<&str>,
    ) -> Result<LeaveRequest, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let request = sqlx::query_as::<_, LeaveRequest>(
            r#"
            UPDATE leave_requests SET
                status = $2,
                reviewed_by = $3,
                reviewed_at = NOW(),
                review_note = $4
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(reviewer_id)
        .bind(note)
        .fetch_one(executor)
        .await?;
        Ok(request)
    }
}
