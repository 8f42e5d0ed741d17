use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use validator::Validate;

/// Threshold applied when a product is created without one
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 5;

/// Product entity as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    /// 24-character hex ObjectId
    #[schema(example = "665f1c2ab3d4e5f6a7b8c9d0")]
    pub id: String,
    #[schema(example = "Widget")]
    pub name: String,
    pub description: String,
    #[schema(example = 10)]
    pub stock_quantity: i64,
    #[schema(example = 5)]
    pub low_stock_threshold: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Strictly below the product's own threshold.
    pub fn is_low_stock(&self) -> bool {
        self.stock_quantity < self.low_stock_threshold
    }
}

/// Request body for creating a product.
///
/// Every field is optional here so that missing values are reported as
/// validation failures rather than JSON errors.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateProduct {
    #[validate(
        required(message = "Product name is required"),
        length(min = 1, message = "Product name is required")
    )]
    #[schema(example = "Widget")]
    pub name: Option<String>,
    /// Defaults to an empty string
    pub description: Option<String>,
    #[validate(
        required(message = "stock_quantity is required"),
        range(min = 0, message = "stock_quantity cannot be negative")
    )]
    #[schema(example = 10)]
    pub stock_quantity: Option<i64>,
    /// Defaults to 5
    #[validate(range(min = 0, message = "low_stock_threshold cannot be negative"))]
    pub low_stock_threshold: Option<i64>,
}

impl CreateProduct {
    /// Trim surrounding whitespace from the name.
    pub fn normalized(mut self) -> Self {
        self.name = self.name.map(|name| name.trim().to_string());
        self
    }
}

/// Validated create input handed to the repository
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub stock_quantity: i64,
    pub low_stock_threshold: i64,
}

/// Request body for updating a product; absent fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateProduct {
    #[validate(length(min = 1, message = "Product name is required"))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0, message = "stock_quantity cannot be negative"))]
    pub stock_quantity: Option<i64>,
    #[validate(range(min = 0, message = "low_stock_threshold cannot be negative"))]
    pub low_stock_threshold: Option<i64>,
}

impl UpdateProduct {
    pub fn normalized(mut self) -> Self {
        self.name = self.name.map(|name| name.trim().to_string());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.stock_quantity.is_none()
            && self.low_stock_threshold.is_none()
    }
}

/// Body of the addStock / reduceStock endpoints
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct StockChange {
    /// Positive whole number; numeric strings such as `"5"` are accepted
    #[serde(default)]
    #[schema(value_type = f64, example = 5)]
    pub amount: Value,
}

impl StockChange {
    pub fn new(amount: impl Into<Value>) -> Self {
        Self {
            amount: amount.into(),
        }
    }

    /// Numeric value of `amount`, or NaN when it is not a number.
    pub fn numeric_amount(&self) -> f64 {
        match &self.amount {
            Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
            Value::String(s) => s.trim().parse::<f64>().unwrap_or(f64::NAN),
            _ => f64::NAN,
        }
    }
}

/// Response body of a successful delete
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DeleteProductResponse {
    #[schema(example = "Product deleted successfully")]
    pub message: String,
    pub product: Product,
}

impl DeleteProductResponse {
    pub const MESSAGE: &'static str = "Product deleted successfully";

    pub fn new(product: Product) -> Self {
        Self {
            message: Self::MESSAGE.to_string(),
            product,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn product(stock_quantity: i64, low_stock_threshold: i64) -> Product {
        let now = Utc::now();
        Product {
            id: "665f1c2ab3d4e5f6a7b8c9d0".to_string(),
            name: "Widget".to_string(),
            description: String::new(),
            stock_quantity,
            low_stock_threshold,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_is_low_stock_is_strict() {
        assert!(product(4, 5).is_low_stock());
        assert!(!product(5, 5).is_low_stock());
        assert!(!product(0, 0).is_low_stock());
    }

    #[test]
    fn test_numeric_amount_coercion() {
        assert_eq!(StockChange::new(3).numeric_amount(), 3.0);
        assert_eq!(StockChange::new(2.5).numeric_amount(), 2.5);
        assert_eq!(StockChange::new(" 7 ").numeric_amount(), 7.0);
        assert!(StockChange::new("abc").numeric_amount().is_nan());
        assert!(StockChange::new(json!({"n": 1})).numeric_amount().is_nan());
        assert!(StockChange::default().numeric_amount().is_nan());
    }

    #[test]
    fn test_missing_amount_deserializes_to_null() {
        let change: StockChange = serde_json::from_value(json!({})).unwrap();
        assert!(change.amount.is_null());
    }

    #[test]
    fn test_create_product_normalizes_name() {
        let input = CreateProduct {
            name: Some("  Widget  ".to_string()),
            ..Default::default()
        }
        .normalized();
        assert_eq!(input.name.as_deref(), Some("Widget"));
    }

    #[test]
    fn test_update_product_is_empty() {
        assert!(UpdateProduct::default().is_empty());
        let patch = UpdateProduct {
            description: Some(String::new()),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }
}
