// src/common/db_utils.rs

use crate::common::error::AppError;

/// Converte violação de chave única em um erro amigável; o resto vira DatabaseError.
pub(crate) fn map_unique_violation(e: sqlx::Error, message: impl Into<String>) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::UniqueConstraintViolation(message.into());
        }
    }
    e.into()
}

