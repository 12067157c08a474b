// src/db/employee_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;
use crate::{
    common::{db_utils::unique_violation, error::AppError},
    models::employee::{Employee, EmployeeInput},
};

#[derive(Clone)]
pub struct EmployeeRepository {
    pool: PgPool,
}

impl EmployeeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Leitura
    // ---

    pub async fn list<'e, E>(&self, executor: E, only_active: bool) -> Result<Vec<Employee>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let employees = sqlx::query_as::<_, Employee>(
            r#"
            SELECT * FROM employees
            WHERE ($1 = FALSE OR is_active = TRUE)
            ORDER BY last_name ASC, first_name ASC
            "#,
        )
        .bind(only_active)
        .fetch_all(executor)
        .await?;
        Ok(employees)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Employee>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let employee = sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(employee)
    }

    /// Usado pelo quiosque: o funcionário se identifica pelo documento.
    pub async fn find_by_document<'e, E>(
        &self,
        executor: E,
        document_number: &str,
    ) -> Result<Option<Employee>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let employee = sqlx::query_as::<_, Employee>(
            "SELECT * FROM employees WHERE document_number = $1",
        )
        .bind(document_number.trim())
        .fetch_optional(executor)
        .await?;
        Ok(employee)
    }

    // ---
    // Escrita
    // ---

    pub async fn create<'e, E>(&self, executor: E, input: &EmployeeInput) -> Result<Employee, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Employee>(
            r#"
            INSERT INTO employees (document_number, first_name, last_name, position, email, phone, hired_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(input.document_number.trim())
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(&input.position)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(input.hired_at)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if unique_violation(&e).is_some() {
                return AppError::DocumentNumberAlreadyExists(input.document_number.clone());
            }
            e.into()
        })
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        input: &EmployeeInput,
    ) -> Result<Option<Employee>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Employee>(
            r#"
            UPDATE employees SET
                document_number = $2,
                first_name = $3,
                last_name = $4,
                position = $5,
                email = $6,
                phone = $7,
                hired_at = $8,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(input.document_number.trim())
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(&input.position)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(input.hired_at)
        .fetch_optional(executor)
        .await
        .map_err(|e| {
            if unique_violation(&e).is_some() {
                return AppError::DocumentNumberAlreadyExists(input.document_number.clone());
            }
            e.into()
        })
    }

    pub async fn set_active<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        is_active: bool,
    ) -> Result<Option<Employee>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let employee = sqlx::query_as::<_, Employee>(
            "UPDATE employees SET is_active = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(is_active)
        .fetch_optional(executor)
        .await?;
        Ok(employee)
    }
}
