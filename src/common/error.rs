// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // Violação de regra de negócio (estado inválido, valor fora do permitido...)
    #[error("{0}")]
    BadRequest(String),

    #[error("Usuário ou senha inválidos")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0} não encontrado(a)")]
    NotFound(String),

    #[error("{0}")]
    UniqueConstraintViolation(String),

    #[error("O valor excede o saldo de gaji restante ({sisa})")]
    GajiExceedsRemaining { sisa: Decimal },

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
    /// Código estável enviado ao frontend junto da mensagem.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::InvalidCredentials | AppError::InvalidToken => "UNAUTHORIZED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::UniqueConstraintViolation(_) => "CONFLICT",
            AppError::GajiExceedsRemaining { .. } => "GAJI_EXCEEDS_REMAINING",
            _ => "INTERNAL_ERROR",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::BadRequest(_)
            | AppError::UniqueConstraintViolation(_)
            | AppError::GajiExceedsRemaining { .. } => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        let body = match &self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                json!({
                    "status": "error",
                    "code": code,
                    "message": "Um ou mais campos são inválidos.",
                    "errors": details,
                })
            }
            AppError::GajiExceedsRemaining { sisa } => json!({
                "status": "error",
                "code": code,
                "message": self.to_string(),
                "errors": { "sisa": sisa },
            }),

            // Erros internos: loga o detalhe e devolve uma mensagem genérica.
            e if status == StatusCode::INTERNAL_SERVER_ERROR => {
                tracing::error!("Erro Interno do Servidor: {:?}", e);
                json!({
                    "status": "error",
                    "code": code,
                    "message": "Ocorreu um erro inesperado.",
                })
            }

            e => json!({
                "status": "error",
                "code": code,
                "message": e.to_string(),
            }),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body legível");
        serde_json::from_slice(&bytes).expect("JSON válido")
    }

    #[tokio::test]
    async fn gaji_exceeds_remaining_is_a_bad_request_with_code() {
        let response = AppError::GajiExceedsRemaining { sisa: Decimal::new(5000, 0) }.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["status"], "error");
        assert_eq!(body["code"], "GAJI_EXCEEDS_REMAINING");
        assert_eq!(body["errors"]["sisa"], 5000.0);
    }

    #[tokio::test]
    async fn internal_errors_do_not_leak_details() {
        let response = AppError::InternalServerError(anyhow::anyhow!("senha do banco: hunter2")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["message"], "Ocorreu um erro inesperado.");
        assert!(!body.to_string().contains("hunter2"));
    }

    #[test]
    fn taxonomy_maps_to_http_status() {
        assert_eq!(AppError::InvalidToken.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Forbidden("x".into()).status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::NotFound("Sessão".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::BadRequest("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::UniqueConstraintViolation("NIM".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }
}
