// src/services/attendance_service.rs

use chrono::{DateTime, Duration, NaiveDate, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::{error::AppError, qr},
    db::{AttendanceRepository, EmployeeRepository},
    models::attendance::{AttendanceRecord, AttendanceSource, KioskClaims, ScanAction, ScanResult},
};

const KIOSK_TOKEN_KIND: &str = "kiosk";

#[derive(Clone)]
pub struct AttendanceService {
    attendance_repo: AttendanceRepository,
    employee_repo: EmployeeRepository,
    jwt_secret: String,
    kiosk_token_ttl_secs: i64,
}

pub fn issue_kiosk_token(secret: &str, ttl_secs: i64, now: DateTime<Utc>) -> Result<String, AppError> {
    let claims = KioskClaims {
        kind: KIOSK_TOKEN_KIND.to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::seconds(ttl_secs)).timestamp(),
    };

    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )?)
}

/// Sem tolerância: o QR do quiosque expira exatamente no `exp`.
pub fn verify_kiosk_token(secret: &str, token: &str) -> Result<KioskClaims, AppError> {
    let mut validation = Validation::default();
    validation.leeway = 0;

    let claims = decode::<KioskClaims>(token, &DecodingKey::from_secret(secret.as_ref()), &validation)
        .map_err(|_| AppError::InvalidKioskToken)?
        .claims;

    if claims.kind != KIOSK_TOKEN_KIND {
        return Err(AppError::InvalidKioskToken);
    }
    Ok(claims)
}

impl AttendanceService {
    pub fn new(
        attendance_repo: AttendanceRepository,
        employee_repo: EmployeeRepository,
        jwt_secret: String,
        kiosk_token_ttl_secs: i64,
    ) -> Self {
        Self { attendance_repo, employee_repo, jwt_secret, kiosk_token_ttl_secs }
    }

    pub fn kiosk_token_ttl_secs(&self) -> i64 {
        self.kiosk_token_ttl_secs
    }

    pub fn kiosk_token(&self) -> Result<String, AppError> {
        issue_kiosk_token(&self.jwt_secret, self.kiosk_token_ttl_secs, Utc::now())
    }

    /// PNG do QR exibido na tela do quiosque.
    pub fn kiosk_qr(&self) -> Result<Vec<u8>, AppError> {
        qr::png(&self.kiosk_token()?)
    }

    /// Leitura no quiosque: com registro aberto, fecha; sem registro, abre um novo.
    pub async fn scan<'e, E>(
        &self,
        executor: E,
        token: &str,
        document_number: &str,
    ) -> Result<ScanResult, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        verify_kiosk_token(&self.jwt_secret, token)?;

        let mut tx = executor.begin().await?;

        let employee = self.employee_repo
            .find_by_document(&mut *tx, document_number.trim())
            .await?
            .filter(|e| e.is_active)
            .ok_or(AppError::NotFound("Empleado"))?;

        let now = Utc::now();
        let (action, record) = match self.attendance_repo.find_open_for_update(&mut *tx, employee.id).await? {
            Some(open) => (
                ScanAction::CheckOut,
                self.attendance_repo.check_out(&mut *tx, open.id, now).await?,
            ),
            None => (
                ScanAction::CheckIn,
                self.attendance_repo
                    .check_in(&mut *tx, employee.id, now, AttendanceSource::Kiosk)
                    .await?,
            ),
        };

        tx.commit().await?;

        tracing::info!(employee_id = %employee.id, action = ?action, "Ponto registrado no quiosque");

        Ok(ScanResult {
            action,
            employee_name: employee.full_name(),
            record,
        })
    }

    /// Entrada manual feita pelo administrador.
    pub async fn admin_check_in<'e, E>(&self, executor: E, employee_id: Uuid) -> Result<AttendanceRecord, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        self.employee_repo
            .find_by_id(&mut *tx, employee_id)
            .await?
            .ok_or(AppError::NotFound("Empleado"))?;

        if self.attendance_repo.find_open_for_update(&mut *tx, employee_id).await?.is_some() {
            return Err(AppError::BusinessRule("El empleado ya tiene una entrada abierta.".into()));
        }

        let record = self.attendance_repo
            .check_in(&mut *tx, employee_id, Utc::now(), AttendanceSource::Admin)
            .await?;

        tx.commit().await?;
        Ok(record)
    }

    /// Registros com entrada entre `from` e `to`, inclusive.
    pub async fn list<'e, E>(
        &self,
        executor: E,
        from: NaiveDate,
        to: NaiveDate,
        employee_id: Option<Uuid>,
    ) -> Result<Vec<AttendanceRecord>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if to < from {
            return Err(AppError::BusinessRule("Rango de fechas inválido.".into()));
        }
        let start = from.and_time(chrono::NaiveTime::MIN).and_utc();
        let end = (to + Duration::days(1)).and_time(chrono::NaiveTime::MIN).and_utc();

        self.attendance_repo.list_between(executor, start, end, employee_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_kiosk_token_verifies() {
        let token = issue_kiosk_token("segredo", 120, Utc::now()).unwrap();
        let claims = verify_kiosk_token("segredo", &token).unwrap();
        assert_eq!(claims.kind, "kiosk");
        assert_eq!(claims.exp - claims.iat, 120);
    }

    #[test]
    fn expired_kiosk_token_fails() {
        let issued = Utc::now() - Duration::seconds(121);
        let token = issue_kiosk_token("segredo", 120, issued).unwrap();
        assert!(matches!(
            verify_kiosk_token("segredo", &token),
            Err(AppError::InvalidKioskToken)
        ));
    }

    #[test]
    fn user_session_token_is_not_a_kiosk_token() {
        let session = crate::services::auth::issue_token("segredo", Uuid::new_v4(), Utc::now()).unwrap();
        assert!(verify_kiosk_token("segredo", &session).is_err());
    }
}
