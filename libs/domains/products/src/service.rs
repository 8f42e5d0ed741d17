//! Product Service - Business logic layer

use mongodb::bson::oid::ObjectId;
use std::sync::Arc;
use tracing::instrument;
use validator::Validate;

use crate::error::{NEGATIVE_STOCK_MESSAGE, ProductError, ProductResult};
use crate::models::{
    CreateProduct, DEFAULT_LOW_STOCK_THRESHOLD, NewProduct, Product, StockChange, UpdateProduct,
};
use crate::repository::ProductRepository;

/// Product service providing business logic operations
///
/// Every operation validates identifiers first, then the payload, and only
/// then touches the repository.
pub struct ProductService<R: ProductRepository> {
    repository: Arc<R>,
}

impl<R: ProductRepository> ProductService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Create a product; name is trimmed, description defaults to "" and threshold to 5.
    #[instrument(skip(self, input))]
    pub async fn create_product(&self, input: CreateProduct) -> ProductResult<Product> {
        let new_product = NewProduct::try_from(input)?;
        self.repository.create(new_product).await
    }

    /// All products, newest first
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> ProductResult<Vec<Product>> {
        self.repository.list().await
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, id: &str) -> ProductResult<Product> {
        let id = parse_id(id)?;
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(ProductError::NotFound)
    }

    #[instrument(skip(self, input))]
    pub async fn update_product(&self, id: &str, input: UpdateProduct) -> ProductResult<Product> {
        let id = parse_id(id)?;

        if input.stock_quantity.is_some_and(|stock| stock < 0) {
            return Err(ProductError::Validation(NEGATIVE_STOCK_MESSAGE.to_string()));
        }

        let input = input.normalized();
        input.validate()?;

        self.repository
            .update(id, input)
            .await?
            .ok_or(ProductError::NotFound)
    }

    /// Permanently remove a product and return it
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: &str) -> ProductResult<Product> {
        let id = parse_id(id)?;
        self.repository
            .delete(id)
            .await?
            .ok_or(ProductError::NotFound)
    }

    #[instrument(skip(self, change))]
    pub async fn add_stock(&self, id: &str, change: StockChange) -> ProductResult<Product> {
        let id = parse_id(id)?;
        let amount = parse_amount(&change)?;

        let product = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or(ProductError::NotFound)?;

        let stock_quantity = product
            .stock_quantity
            .checked_add(amount)
            .ok_or(ProductError::InvalidAmount)?;

        tracing::debug!(product_id = %id, amount, stock_quantity, "Adding stock");
        self.repository
            .set_stock(id, stock_quantity)
            .await?
            .ok_or(ProductError::NotFound)
    }

    #[instrument(skip(self, change))]
    pub async fn reduce_stock(&self, id: &str, change: StockChange) -> ProductResult<Product> {
        let id = parse_id(id)?;
        let amount = parse_amount(&change)?;

        let product = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or(ProductError::NotFound)?;

        if amount > product.stock_quantity {
            tracing::info!(
                product_id = %id,
                available = product.stock_quantity,
                requested = amount,
                "Insufficient stock"
            );
            return Err(ProductError::InsufficientStock {
                available: product.stock_quantity,
                requested: amount,
            });
        }

        let stock_quantity = product.stock_quantity - amount;
        tracing::debug!(product_id = %id, amount, stock_quantity, "Reducing stock");
        self.repository
            .set_stock(id, stock_quantity)
            .await?
            .ok_or(ProductError::NotFound)
    }

    /// Products whose stock is strictly below their own threshold
    #[instrument(skip(self))]
    pub async fn low_stock_report(&self) -> ProductResult<Vec<Product>> {
        self.repository.low_stock().await
    }
}

impl<R: ProductRepository> Clone for ProductService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl TryFrom<CreateProduct> for NewProduct {
    type Error = ProductError;

    fn try_from(input: CreateProduct) -> Result<Self, Self::Error> {
        let input = input.normalized();
        input.validate()?;

        let CreateProduct {
            name: Some(name),
            description,
            stock_quantity: Some(stock_quantity),
            low_stock_threshold,
        } = input
        else {
            return Err(ProductError::Internal(
                "validated product is missing required fields".to_string(),
            ));
        };

        Ok(NewProduct {
            name,
            description: description.unwrap_or_default(),
            stock_quantity,
            low_stock_threshold: low_stock_threshold.unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD),
        })
    }
}

fn parse_id(id: &str) -> ProductResult<ObjectId> {
    ObjectId::parse_str(id).map_err(|_| ProductError::InvalidId)
}

/// Positive whole number that fits the stock counter
fn parse_amount(change: &StockChange) -> ProductResult<i64> {
    let amount = change.numeric_amount();

    if !amount.is_finite() || amount <= 0.0 || amount.fract() != 0.0 || amount >= i64::MAX as f64
    {
        return Err(ProductError::InvalidAmount);
    }

    Ok(amount as i64)
}
