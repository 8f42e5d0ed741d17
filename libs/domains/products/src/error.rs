use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub enum ProductError {
    #[error("{0}")]
    Validation(String),

    #[error("Invalid Product ID")]
    InvalidId,

    #[error("Invalid amount; must be a positive number")]
    InvalidAmount,

    #[error("Product not found")]
    NotFound,

    #[error("Insufficient stock")]
    InsufficientStock { available: i64, requested: i64 },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ProductResult<T> = Result<T, ProductError>;

/// Prefix of every field-level validation message
pub const VALIDATION_PREFIX: &str = "Product validation failed";

/// Message used when a stock update would go below zero
pub const NEGATIVE_STOCK_MESSAGE: &str = "Stock quantity cannot be negative";

/// `Product validation failed: <field>: <reason>, <field>: <reason>`, fields sorted by name.
impl From<ValidationErrors> for ProductError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|(a, _), (b, _)| a.cmp(b));

        let reasons: Vec<String> = fields
            .into_iter()
            .filter_map(|(field, errors)| {
                errors.first().map(|error| {
                    let reason = error
                        .message
                        .as_deref()
                        .map(str::to_string)
                        .unwrap_or_else(|| error.code.to_string());
                    format!("{}: {}", field, reason)
                })
            })
            .collect();

        if reasons.is_empty() {
            ProductError::Validation(VALIDATION_PREFIX.to_string())
        } else {
            ProductError::Validation(format!("{}: {}", VALIDATION_PREFIX, reasons.join(", ")))
        }
    }
}

/// Convert ProductError to AppError for standardized error responses
impl From<ProductError> for AppError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::Validation(_)
            | ProductError::InvalidId
            | ProductError::InvalidAmount
            | ProductError::InsufficientStock { .. } => AppError::BadRequest(err.to_string()),
            ProductError::NotFound => AppError::NotFound(err.to_string()),
            ProductError::Database(msg) | ProductError::Internal(msg) => {
                AppError::InternalServerError(msg)
            }
        }
    }
}

impl IntoResponse for ProductError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for ProductError {
    fn from(err: mongodb::error::Error) -> Self {
        ProductError::Database(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CreateProduct;
    use validator::Validate;

    #[test]
    fn test_validation_message_lists_fields_in_order() {
        let errors = CreateProduct {
            name: None,
            description: None,
            stock_quantity: None,
            low_stock_threshold: Some(-1),
        }
        .validate()
        .unwrap_err();

        let err = ProductError::from(errors);
        assert_eq!(
            err.to_string(),
            "Product validation failed: low_stock_threshold: low_stock_threshold cannot be negative, \
             name: Product name is required, stock_quantity: stock_quantity is required"
        );
    }

    #[test]
    fn test_empty_name_reports_required() {
        let errors = CreateProduct {
            name: Some(String::new()),
            stock_quantity: Some(1),
            ..Default::default()
        }
        .validate()
        .unwrap_err();

        assert_eq!(
            ProductError::from(errors).to_string(),
            "Product validation failed: name: Product name is required"
        );
    }

    #[test]
    fn test_client_errors_map_to_bad_request() {
        for err in [
            ProductError::InvalidId,
            ProductError::InvalidAmount,
            ProductError::Validation("bad".into()),
            ProductError::InsufficientStock {
                available: 1,
                requested: 2,
            },
        ] {
            assert!(matches!(AppError::from(err), AppError::BadRequest(_)));
        }
    }

    #[test]
    fn test_insufficient_stock_message() {
        let app_error = AppError::from(ProductError::InsufficientStock {
            available: 10,
            requested: 15,
        });
        assert!(matches!(app_error, AppError::BadRequest(msg) if msg == "Insufficient stock"));
    }

    #[test]
    fn test_not_found_and_database_mapping() {
        assert!(matches!(
            AppError::from(ProductError::NotFound),
            AppError::NotFound(msg) if msg == "Product not found"
        ));
        assert!(matches!(
            AppError::from(ProductError::Database("timeout".into())),
            AppError::InternalServerError(msg) if msg == "timeout"
        ));
    }
}
