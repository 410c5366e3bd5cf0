use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::{DbErr, RuntimeErr, SqlErr};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    credentials::CredentialError,
    pricing::PricingError,
    response::{ApiResponse, ErrorData, Meta},
};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Unauthenticated(String),

    #[error("Forbidden: Insufficient permissions")]
    Forbidden,

    #[error("{message}")]
    InvalidInput { field: &'static str, message: String },

    #[error("{message}")]
    Conflict { field: &'static str, message: String },

    #[error("{entity} with ID {id} not found")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("Not enough stock for product {product}. Available: {available}")]
    InsufficientStock {
        product_id: Uuid,
        product: String,
        available: i32,
    },

    #[error("Cart cannot be empty")]
    EmptyCart,

    #[error("Store is busy, please retry")]
    TransientStoreFailure,

    #[error("Database error")]
    Orm(DbErr),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        AppError::InvalidInput {
            field,
            message: message.into(),
        }
    }

    pub fn conflict(field: &'static str, message: impl Into<String>) -> Self {
        AppError::Conflict {
            field,
            message: message.into(),
        }
    }

    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        AppError::NotFound { entity, id }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Unauthenticated(_) => "unauthenticated",
            AppError::Forbidden => "forbidden",
            AppError::InvalidInput { .. } => "invalid_input",
            AppError::Conflict { .. } => "conflict",
            AppError::NotFound { .. } => "not_found",
            AppError::InsufficientStock { .. } => "insufficient_stock",
            AppError::EmptyCart => "empty_cart",
            AppError::TransientStoreFailure => "transient_store_failure",
            AppError::Orm(_) | AppError::Internal(_) => "unexpected",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::InvalidInput { .. } | AppError::EmptyCart => StatusCode::BAD_REQUEST,
            AppError::Conflict { .. } | AppError::InsufficientStock { .. } => StatusCode::CONFLICT,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::TransientStoreFailure => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Orm(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        if is_transient(&err) {
            tracing::debug!(error = %err, "transient store failure");
            return AppError::TransientStoreFailure;
        }
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                let field = constraint_field(&detail);
                AppError::conflict(field, format!("{field} already exists"))
            }
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => AppError::conflict(
                "reference",
                "Record is linked to existing sales",
            ),
            _ => AppError::Orm(err),
        }
    }
}

impl From<CredentialError> for AppError {
    fn from(err: CredentialError) -> Self {
        let message = match err {
            CredentialError::Expired => "Unauthorized: Token expired",
            CredentialError::Malformed | CredentialError::Invalid => "Unauthorized: Invalid token",
        };
        AppError::Unauthenticated(message.into())
    }
}

impl From<PricingError> for AppError {
    fn from(err: PricingError) -> Self {
        match err {
            PricingError::NonPositiveQuantity => AppError::invalid("quantity", err.to_string()),
            PricingError::NonPositivePrice => AppError::invalid("price", err.to_string()),
            PricingError::Overflow => AppError::invalid("cart_items", "Cart total is too large"),
        }
    }
}

/// Serialization failures, deadlocks and pool exhaustion are safe to retry.
pub fn is_transient(err: &DbErr) -> bool {
    match err {
        DbErr::ConnectionAcquire(_) => true,
        DbErr::Query(RuntimeErr::SqlxError(e)) | DbErr::Exec(RuntimeErr::SqlxError(e)) => match e {
            sqlx::Error::Database(db) => {
                matches!(db.code().as_deref(), Some("40001") | Some("40P01"))
            }
            sqlx::Error::PoolTimedOut => true,
            _ => false,
        },
        _ => false,
    }
}

fn constraint_field(detail: &str) -> &'static str {
    ["sku", "email", "phone", "username"]
        .into_iter()
        .find(|field| detail.contains(field))
        .unwrap_or("record")
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Orm(err) => {
                tracing::error!(error = %err, "store error");
                "Internal Server Error".to_string()
            }
            AppError::Internal(err) => {
                tracing::error!(error = ?err, "internal error");
                "Internal Server Error".to_string()
            }
            other => other.to_string(),
        };

        let body = ApiResponse {
            message: message.clone(),
            data: Some(ErrorData {
                kind: self.kind().to_string(),
                error: message,
            }),
            meta: Some(Meta::empty()),
        };

        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
