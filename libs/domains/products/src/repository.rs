use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;

use crate::error::ProductResult;
use crate::models::{NewProduct, Product, UpdateProduct};

/// Repository trait for Product persistence
///
/// Lookups by id return `Ok(None)` when nothing matches; deciding that this
/// is an error is left to the service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Insert a product, assigning its id and timestamps
    async fn create(&self, input: NewProduct) -> ProductResult<Product>;

    /// All products, most recently created first
    async fn list(&self) -> ProductResult<Vec<Product>>;

    async fn get_by_id(&self, id: ObjectId) -> ProductResult<Option<Product>>;

    /// Apply the supplied fields and refresh `updated_at`
    async fn update(&self, id: ObjectId, input: UpdateProduct) -> ProductResult<Option<Product>>;

    /// Remove a product, returning the removed record
    async fn delete(&self, id: ObjectId) -> ProductResult<Option<Product>>;

    /// Overwrite the stock counter
    async fn set_stock(&self, id: ObjectId, stock_quantity: i64) -> ProductResult<Option<Product>>;

    /// Products whose stock is strictly below their own threshold
    async fn low_stock(&self) -> ProductResult<Vec<Product>>;
}
