//! In-process ProductRepository for tests and local runs without MongoDB

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use tokio::sync::RwLock;

use crate::error::ProductResult;
use crate::models::{NewProduct, Product, UpdateProduct};
use crate::repository::ProductRepository;

/// Products kept in insertion order
#[derive(Default)]
pub struct InMemoryProductRepository {
    products: RwLock<Vec<Product>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored products
    pub async fn len(&self) -> usize {
        self.products.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.products.read().await.is_empty()
    }

    async fn modify<F>(&self, id: ObjectId, apply: F) -> Option<Product>
    where
        F: FnOnce(&mut Product),
    {
        let key = id.to_hex();
        let mut products = self.products.write().await;
        let product = products.iter_mut().find(|p| p.id == key)?;
        apply(product);
        product.updated_at = now();
        Some(product.clone())
    }
}

/// Millisecond precision, matching the MongoDB store
fn now() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn create(&self, input: NewProduct) -> ProductResult<Product> {
        let at = now();
        let product = Product {
            id: ObjectId::new().to_hex(),
            name: input.name,
            description: input.description,
            stock_quantity: input.stock_quantity,
            low_stock_threshold: input.low_stock_threshold,
            created_at: at,
            updated_at: at,
        };

        self.products.write().await.push(product.clone());
        tracing::info!(product_id = %product.id, "Product created successfully");
        Ok(product)
    }

    async fn list(&self) -> ProductResult<Vec<Product>> {
        Ok(self.products.read().await.iter().rev().cloned().collect())
    }

    async fn get_by_id(&self, id: ObjectId) -> ProductResult<Option<Product>> {
        let key = id.to_hex();
        Ok(self
            .products
            .read()
            .await
            .iter()
            .find(|p| p.id == key)
            .cloned())
    }

    async fn update(&self, id: ObjectId, input: UpdateProduct) -> ProductResult<Option<Product>> {
        Ok(self
            .modify(id, |product| {
                if let Some(name) = input.name {
                    product.name = name;
                }
                if let Some(description) = input.description {
                    product.description = description;
                }
                if let Some(stock_quantity) = input.stock_quantity {
                    product.stock_quantity = stock_quantity;
                }
                if let Some(low_stock_threshold) = input.low_stock_threshold {
                    product.low_stock_threshold = low_stock_threshold;
                }
            })
            .await)
    }

    async fn delete(&self, id: ObjectId) -> ProductResult<Option<Product>> {
        let key = id.to_hex();
        let mut products = self.products.write().await;
        let removed = products
            .iter()
            .position(|p| p.id == key)
            .map(|index| products.remove(index));

        if removed.is_some() {
            tracing::info!(product_id = %key, "Product deleted successfully");
        }
        Ok(removed)
    }

    async fn set_stock(&self, id: ObjectId, stock_quantity: i64) -> ProductResult<Option<Product>> {
        Ok(self
            .modify(id, |product| product.stock_quantity = stock_quantity)
            .await)
    }

    async fn low_stock(&self) -> ProductResult<Vec<Product>> {
        Ok(self
            .products
            .read()
            .await
            .iter()
            .filter(|p| p.is_low_stock())
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_product(name: &str, stock_quantity: i64, low_stock_threshold: i64) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            description: String::new(),
            stock_quantity,
            low_stock_threshold,
        }
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let repo = InMemoryProductRepository::new();
        repo.create(new_product("first", 1, 5)).await.unwrap();
        repo.create(new_product("second", 1, 5)).await.unwrap();

        let names: Vec<_> = repo
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["second", "first"]);
    }

    #[tokio::test]
    async fn test_update_applies_only_supplied_fields() {
        let repo = InMemoryProductRepository::new();
        let created = repo.create(new_product("Widget", 10, 5)).await.unwrap();
        let id = ObjectId::parse_str(&created.id).unwrap();

        let updated = repo
            .update(
                id,
                UpdateProduct {
                    description: Some("blue".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.name, "Widget");
        assert_eq!(updated.description, "blue");
        assert_eq!(updated.stock_quantity, 10);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn test_unknown_id_yields_none() {
        let repo = InMemoryProductRepository::new();
        let id = ObjectId::new();

        assert!(repo.get_by_id(id).await.unwrap().is_none());
        assert!(repo.set_stock(id, 1).await.unwrap().is_none());
        assert!(repo.delete(id).await.unwrap().is_none());
        assert!(
            repo.update(id, UpdateProduct::default())
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_low_stock_evaluates_each_threshold() {
        let repo = InMemoryProductRepository::new();
        repo.create(new_product("below", 2, 5)).await.unwrap();
        repo.create(new_product("equal", 5, 5)).await.unwrap();
        repo.create(new_product("custom", 9, 10)).await.unwrap();
        repo.create(new_product("plenty", 50, 5)).await.unwrap();

        let names: Vec<_> = repo
            .low_stock()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["below", "custom"]);
    }

    #[tokio::test]
    async fn test_delete_removes_product() {
        let repo = InMemoryProductRepository::new();
        let created = repo.create(new_product("Widget", 1, 5)).await.unwrap();
        let id = ObjectId::parse_str(&created.id).unwrap();

        let removed = repo.delete(id).await.unwrap().unwrap();
        assert_eq!(removed, created);
        assert!(repo.is_empty().await);
    }
}
