// src/services/employee_service.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::{error::AppError, qr},
    db::{ContractRepository, EmployeeRepository},
    models::employee::{Contract, Employee, EmployeeInput},
};

#[derive(Clone)]
pub struct EmployeeService {
    employee_repo: EmployeeRepository,
    contract_repo: ContractRepository,
}

/// Regras do contrato que não dependem do banco.
pub fn validate_contract_terms(
    salary: Decimal,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
) -> Result<(), AppError> {
    if salary.is_sign_negative() {
        return Err(AppError::BusinessRule("El salario no puede ser negativo.".into()));
    }
    if let Some(end) = end_date {
        if end < start_date {
            return Err(AppError::BusinessRule(
                "La fecha de terminación es anterior a la fecha de inicio.".into(),
            ));
        }
    }
    Ok(())
}

impl EmployeeService {
    pub fn new(employee_repo: EmployeeRepository, contract_repo: ContractRepository) -> Self {
        Self { employee_repo, contract_repo }
    }

    // --- FUNCIONÁRIOS ---

    pub async fn list_employees<'e, E>(&self, executor: E, only_active: bool) -> Result<Vec<Employee>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.employee_repo.list(executor, only_active).await
    }

    pub async fn get_employee<'e, E>(&self, executor: E, id: Uuid) -> Result<Employee, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.employee_repo
            .find_by_id(executor, id)
            .await?
            .ok_or(AppError::NotFound("Empleado"))
    }

    pub async fn create_employee<'e, E>(&self, executor: E, input: &EmployeeInput) -> Result<Employee, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let employee = self.employee_repo.create(executor, input).await?;
        tracing::info!(employee_id = %employee.id, "Funcionário cadastrado");
        Ok(employee)
    }

    pub async fn update_employee<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        input: &EmployeeInput,
    ) -> Result<Employee, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.employee_repo
            .update(executor, id, input)
            .await?
            .ok_or(AppError::NotFound("Empleado"))
    }

    pub async fn set_employee_active<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        is_active: bool,
    ) -> Result<Employee, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.employee_repo
            .set_active(executor, id, is_active)
            .await?
            .ok_or(AppError::NotFound("Empleado"))
    }

    /// QR do crachá: o conteúdo é o número do documento.
    pub async fn badge_qr<'e, E>(&self, executor: E, id: Uuid) -> Result<Vec<u8>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let employee = self.get_employee(executor, id).await?;
        qr::png(&employee.document_number)
    }

    // --- CONTRATOS ---

    pub async fn list_contracts<'e, E>(&self, executor: E, employee_id: Uuid) -> Result<Vec<Contract>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.contract_repo.list_for_employee(executor, employee_id).await
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create_contract<'e, E>(
        &self,
        executor: E,
        employee_id: Uuid,
        contract_type: &str,
        salary: Decimal,
        start_date: NaiveDate,
        end_date: Option<NaiveDate>,
    ) -> Result<Contract, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        validate_contract_terms(salary, start_date, end_date)?;

        let mut tx = executor.begin().await?;

        let employee = self.employee_repo
            .find_by_id(&mut *tx, employee_id)
            .await?
            .ok_or(AppError::NotFound("Empleado"))?;

        if !employee.is_active {
            return Err(AppError::BusinessRule("El empleado está inactivo.".into()));
        }

        let contract = self.contract_repo
            .create(&mut *tx, employee_id, contract_type, salary.round_dp(2), start_date, end_date)
            .await?;

        tx.commit().await?;
        Ok(contract)
    }

    pub async fn deactivate_contract<'e, E>(&self, executor: E, id: Uuid) -> Result<Contract, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.contract_repo
            .deactivate(executor, id)
            .await?
            .ok_or(AppError::NotFound("Contrato"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn accepts_indefinite_contracts() {
        assert!(validate_contract_terms(Decimal::from(1_300_000), date(2025, 1, 1), None).is_ok());
    }

    #[test]
    fn rejects_end_before_start() {
        let result = validate_contract_terms(Decimal::from(1), date(2025, 6, 1), Some(date(2025, 5, 31)));
        assert!(matches!(result, Err(AppError::BusinessRule(_))));
    }

    #[test]
    fn rejects_negative_salary() {
        let result = validate_contract_terms(Decimal::from(-5), date(2025, 6, 1), None);
        assert!(result.is_err());
    }
}
