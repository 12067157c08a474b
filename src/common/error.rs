use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro único. Cada variante vira um status HTTP + mensagem legível.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // Regras de negócio que não cabem no `validator` (ex: entrada sem preço)
    #[error("Regra de negócio violada: {0}")]
    BusinessRule(String),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("QR do quiosque expirado ou inválido")]
    InvalidKioskToken,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("{0} não encontrado")]
    NotFound(&'static str),

    #[error("Documento já cadastrado: {0}")]
    DocumentNumberAlreadyExists(String),

    #[error("Modelo já existe: {0}")]
    TemplateNameAlreadyExists(String),

    #[error("Código de produto em conflito: {0}")]
    ProductCodeConflict(String),

    #[error("Período fechado: {0}")]
    PeriodClosed(String),

    #[error("Período inválido: {0}")]
    InvalidPeriod(String),

    #[error("Solicitação já decidida")]
    LeaveAlreadyDecided,

    #[error("Fonte não encontrada: {0}")]
    FontNotFound(String),

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::BusinessRule(_) | AppError::InvalidPeriod(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::EmailAlreadyExists
            | AppError::DocumentNumberAlreadyExists(_)
            | AppError::TemplateNameAlreadyExists(_)
            | AppError::ProductCodeConflict(_)
            | AppError::PeriodClosed(_)
            | AppError::LeaveAlreadyDecided => StatusCode::CONFLICT,
            AppError::InvalidCredentials | AppError::InvalidToken | AppError::InvalidKioskToken => {
                StatusCode::UNAUTHORIZED
            }
            AppError::UserNotFound | AppError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let error_message = match self {
            // Retorna todos os detalhes da validação.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Uno o más campos son inválidos.",
                    "details": details,
                }));
                return (status, body).into_response();
            }
            AppError::BusinessRule(msg) => msg,
            AppError::EmailAlreadyExists => "Este correo ya está en uso.".to_string(),
            AppError::InvalidCredentials => "Correo o contraseña inválidos.".to_string(),
            AppError::InvalidToken => "Token de autenticación inválido o ausente.".to_string(),
            AppError::InvalidKioskToken => "El código QR expiró, escanee nuevamente.".to_string(),
            AppError::UserNotFound => "Usuario no encontrado.".to_string(),
            AppError::NotFound(what) => format!("{} no encontrado.", what),
            AppError::DocumentNumberAlreadyExists(doc) => {
                format!("Ya existe un empleado con el documento {}.", doc)
            }
            AppError::TemplateNameAlreadyExists(name) => {
                format!("Ya existe una plantilla llamada '{}'.", name)
            }
            AppError::ProductCodeConflict(code) => {
                format!("El código {} ya existe en el período, intente de nuevo.", code)
            }
            AppError::PeriodClosed(period) => format!("El período {} está cerrado.", period),
            AppError::InvalidPeriod(raw) => format!("Período inválido '{}', use AAAA-MM.", raw),
            AppError::LeaveAlreadyDecided => "La solicitud ya fue decidida.".to_string(),

            // Todos os outros erros viram 500. O detalhe só vai para o log.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {:?}", e);
                "Ocurrió un error inesperado.".to_string()
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_domain_errors_to_status_codes() {
        assert_eq!(AppError::NotFound("Producto").status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::PeriodClosed("2025-09".into()).status(), StatusCode::CONFLICT);
        assert_eq!(AppError::ProductCodeConflict("QUI-001".into()).status(), StatusCode::CONFLICT);
        assert_eq!(AppError::InvalidKioskToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::BusinessRule("sin precio".into()).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn internal_errors_are_500() {
        let err = AppError::InternalServerError(anyhow::anyhow!("boom"));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
