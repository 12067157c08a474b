// src/common/db_utils.rs

use crate::common::error::AppError;
use crate::config::AppState;

/// Adquire uma conexão da pool para um handler.
/// Os services recebem `&mut *conn` como executor e abrem a transação quando precisam.
pub(crate) async fn get_connection(
    app_state: &AppState,
) -> Result<sqlx::pool::PoolConnection<sqlx::Postgres>, AppError> {
    // O operador '?' converte automaticamente sqlx::Error -> AppError::DatabaseError
    let conn = app_state.db_pool.acquire().await?;
    Ok(conn)
}

/// Nome da constraint violada, se o erro for de unicidade.
pub(crate) fn unique_violation(e: &sqlx::Error) -> Option<String> {
    if let sqlx::Error::Database(db_err) = e {
        if db_err.is_unique_violation() {
            return Some(db_err.constraint().unwrap_or_default().to_string());
        }
    }
    None
}
