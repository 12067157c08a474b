// src/config.rs

use crate::{
    db::{
        AttendanceRepository, ContractRepository, DocumentRepository, EmployeeRepository,
        InventoryRepository, LeaveRepository, UserRepository, VisitorRepository,
    },
    services::{
        attendance_service::AttendanceService, auth::AuthService, document_service::DocumentService,
        employee_service::EmployeeService, inventory_service::InventoryService,
        leave_service::LeaveService, visitor_service::VisitorService,
    },
};
use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;

/// Configuração lida do ambiente (.env em desenvolvimento).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub kiosk_token_ttl_secs: i64,
    pub fonts_dir: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Monta a configuração a partir de qualquer fonte chave -> valor.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = lookup("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string());

        let db_max_connections = match lookup("DB_MAX_CONNECTIONS") {
            Some(raw) => raw.parse().context("DB_MAX_CONNECTIONS deve ser um número")?,
            None => 5,
        };

        let kiosk_token_ttl_secs = match lookup("KIOSK_TOKEN_TTL_SECS") {
            Some(raw) => raw.parse().context("KIOSK_TOKEN_TTL_SECS deve ser um número")?,
            None => 120,
        };

        let fonts_dir = lookup("FONTS_DIR").unwrap_or_else(|| "./fonts".to_string());

        Ok(Self {
            database_url,
            jwt_secret,
            bind_addr,
            db_max_connections,
            kiosk_token_ttl_secs,
            fonts_dir,
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub auth_service: AuthService,
    pub employee_service: EmployeeService,
    pub inventory_service: InventoryService,
    pub document_service: DocumentService,
    pub attendance_service: AttendanceService,
    pub visitor_service: VisitorService,
    pub leave_service: LeaveService,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());
        let employee_repo = EmployeeRepository::new(db_pool.clone());
        let contract_repo = ContractRepository::new(db_pool.clone());
        let document_repo = DocumentRepository::new(db_pool.clone());
        let inventory_repo = InventoryRepository::new(db_pool.clone());
        let attendance_repo = AttendanceRepository::new(db_pool.clone());
        let visitor_repo = VisitorRepository::new(db_pool.clone());
        let leave_repo = LeaveRepository::new(db_pool.clone());

        let auth_service = AuthService::new(user_repo, config.jwt_secret.clone(), db_pool.clone());
        let employee_service = EmployeeService::new(employee_repo.clone(), contract_repo.clone());
        let inventory_service = InventoryService::new(inventory_repo);
        let document_service = DocumentService::new(
            document_repo,
            employee_repo.clone(),
            contract_repo,
            config.fonts_dir.clone(),
        );
        let attendance_service = AttendanceService::new(
            attendance_repo,
            employee_repo.clone(),
            config.jwt_secret.clone(),
            config.kiosk_token_ttl_secs,
        );
        let visitor_service = VisitorService::new(visitor_repo);
        let leave_service = LeaveService::new(leave_repo, employee_repo);

        Ok(Self {
            db_pool,
            auth_service,
            employee_service,
            inventory_service,
            document_service,
            attendance_service,
            visitor_service,
            leave_service,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_for_optional_keys() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/talento"),
            ("JWT_SECRET", "segredo"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.kiosk_token_ttl_secs, 120);
        assert_eq!(config.fonts_dir, "./fonts");
    }

    #[test]
    fn missing_required_key_fails() {
        let result = Config::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://x")]));
        assert!(result.is_err());
    }

    #[test]
    fn malformed_number_fails() {
        let result = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://x"),
            ("JWT_SECRET", "s"),
            ("KIOSK_TOKEN_TTL_SECS", "dois minutos"),
        ]));
        assert!(result.is_err());
    }
}
