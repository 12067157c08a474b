// src/db/attendance_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;
use crate::{
    common::error::AppError,
    models::attendance::{AttendanceRecord, AttendanceSource},
};

#[derive(Clone)]
pub struct AttendanceRepository {
    pool: PgPool,
}

impl AttendanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Registro em aberto (sem saída) do funcionário, travado para a transação.
    pub async fn find_open_for_update<'e, E>(
        &self,
        executor: E,
        employee_id: Uuid,
    ) -> Result<Option<AttendanceRecord>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let record = sqlx::query_as::<_, AttendanceRecord>(
            r#"
            SELECT * FROM attendance_records
            WHERE employee_id = $1 AND check_out IS NULL
            ORDER BY check_in DESC
            LIMIT 1
            FOR UPDATE
            "#,
        )
        .bind(employee_id)
        .fetch_optional(executor)
        .await?;
        Ok(record)
    }

    pub async fn check_in<'e, E>(
        &self,
        executor: E,
        employee_id: Uuid,
        at: DateTime<Utc>,
        source: AttendanceSource,
    ) -> Result<AttendanceRecord, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let record = sqlx::query_as::<_, AttendanceRecord>(
            r#"
            INSERT INTO attendance_records (employee_id, check_in, source)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(employee_id)
        .bind(at)
        .bind(source)
        .fetch_one(executor)
        .await?;
        Ok(record)
    }

    pub async fn check_out<'e, E>(
        &self,
        executor: E,
        record_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<AttendanceRecord, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let record = sqlx::query_as::<_, AttendanceRecord>(
            "UPDATE attendance_records SET check_out = $2 WHERE id = $1 RETURNING *",
        )
        .bind(record_id)
        .bind(at)
        .fetch_one(executor)
        .await?;
        Ok(record)
    }

    pub async fn list_between<'e, E>(
        &self,
        executor: E,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        employee_id: Option<Uuid>,
    ) -> Result<Vec<AttendanceRecord>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let records = sqlx::query_as::<_, AttendanceRecord>(
            r#"
            SELECT * FROM attendance_records
            WHERE check_in >= $1 AND check_in < $2
              AND ($3::UUID IS NULL OR employee_id = $3)
            ORDER BY check_in ASC
            "#,
        )
        .bind(from)
        .bind(to)
        .bind(employee_id)
        .fetch_all(executor)
        .await?;
        Ok(records)
    }
}
