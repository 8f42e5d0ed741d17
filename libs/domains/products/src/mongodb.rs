//! MongoDB implementation of ProductRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{self, Document, doc, oid::ObjectId},
    options::{IndexOptions, ReturnDocument},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::ProductResult;
use crate::models::{DEFAULT_LOW_STOCK_THRESHOLD, NewProduct, Product, UpdateProduct};
use crate::repository::ProductRepository;

/// Default collection name
pub const PRODUCTS_COLLECTION: &str = "products";

/// Stored shape of a product
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ProductDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    name: String,
    #[serde(default)]
    description: String,
    stock_quantity: i64,
    #[serde(default = "default_low_stock_threshold")]
    low_stock_threshold: i64,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    created_at: DateTime<Utc>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    updated_at: DateTime<Utc>,
}

fn default_low_stock_threshold() -> i64 {
    DEFAULT_LOW_STOCK_THRESHOLD
}

impl From<ProductDocument> for Product {
    fn from(doc: ProductDocument) -> Self {
        Product {
            id: doc.id.to_hex(),
            name: doc.name,
            description: doc.description,
            stock_quantity: doc.stock_quantity,
            low_stock_threshold: doc.low_stock_threshold,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        }
    }
}

/// BSON datetimes carry millisecond precision; truncate so the returned
/// value matches what a later read yields.
fn now() -> DateTime<Utc> {
    bson::DateTime::now().to_chrono()
}

/// `$set` document for a patch, always touching `updated_at`
fn update_document(input: &UpdateProduct, at: DateTime<Utc>) -> Document {
    let mut set = doc! { "updated_at": bson::DateTime::from_chrono(at) };

    if let Some(ref name) = input.name {
        set.insert("name", name.clone());
    }
    if let Some(ref description) = input.description {
        set.insert("description", description.clone());
    }
    if let Some(stock_quantity) = input.stock_quantity {
        set.insert("stock_quantity", stock_quantity);
    }
    if let Some(low_stock_threshold) = input.low_stock_threshold {
        set.insert("low_stock_threshold", low_stock_threshold);
    }

    doc! { "$set": set }
}

/// Per-document comparison of the two counters
fn low_stock_filter() -> Document {
    doc! { "$expr": { "$lt": ["$stock_quantity", "$low_stock_threshold"] } }
}

/// MongoDB implementation of the ProductRepository
pub struct MongoProductRepository {
    collection: Collection<ProductDocument>,
}

impl MongoProductRepository {
    pub fn new(db: &Database) -> Self {
        Self::with_collection(db, PRODUCTS_COLLECTION)
    }

    pub fn with_collection(db: &Database, collection_name: &str) -> Self {
        Self {
            collection: db.collection::<ProductDocument>(collection_name),
        }
    }

    /// Create the index backing the newest-first listing
    pub async fn init_indexes(&self) -> ProductResult<()> {
        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "created_at": -1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_created_at".to_string())
                        .build(),
                )
                .build(),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!("Product indexes created successfully");
        Ok(())
    }
}

#[async_trait]
impl ProductRepository for MongoProductRepository {
    #[instrument(skip(self, input), fields(product_name = %input.name))]
    async fn create(&self, input: NewProduct) -> ProductResult<Product> {
        let at = now();
        let document = ProductDocument {
            id: ObjectId::new(),
            name: input.name,
            description: input.description,
            stock_quantity: input.stock_quantity,
            low_stock_threshold: input.low_stock_threshold,
            created_at: at,
            updated_at: at,
        };

        self.collection.insert_one(&document).await?;

        tracing::info!(product_id = %document.id, "Product created successfully");
        Ok(document.into())
    }

    #[instrument(skip(self))]
    async fn list(&self) -> ProductResult<Vec<Product>> {
        let cursor = self
            .collection
            .find(doc! {})
            .sort(doc! { "created_at": -1 })
            .await?;
        let documents: Vec<ProductDocument> = cursor.try_collect().await?;

        Ok(documents.into_iter().map(Product::from).collect())
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: ObjectId) -> ProductResult<Option<Product>> {
        let document = self.collection.find_one(doc! { "_id": id }).await?;
        Ok(document.map(Product::from))
    }

    #[instrument(skip(self, input))]
    async fn update(&self, id: ObjectId, input: UpdateProduct) -> ProductResult<Option<Product>> {
        let updated = self
            .collection
            .find_one_and_update(doc! { "_id": id }, update_document(&input, now()))
            .return_document(ReturnDocument::After)
            .await?;

        if updated.is_some() {
            tracing::info!(product_id = %id, "Product updated successfully");
        }
        Ok(updated.map(Product::from))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: ObjectId) -> ProductResult<Option<Product>> {
        let deleted = self
            .collection
            .find_one_and_delete(doc! { "_id": id })
            .await?;

        if deleted.is_some() {
            tracing::info!(product_id = %id, "Product deleted successfully");
        }
        Ok(deleted.map(Product::from))
    }

    #[instrument(skip(self))]
    async fn set_stock(&self, id: ObjectId, stock_quantity: i64) -> ProductResult<Option<Product>> {
        let update = doc! {
            "$set": {
                "stock_quantity": stock_quantity,
                "updated_at": bson::DateTime::from_chrono(now()),
            }
        };

        let updated = self
            .collection
            .find_one_and_update(doc! { "_id": id }, update)
            .return_document(ReturnDocument::After)
            .await?;

        if updated.is_some() {
            tracing::info!(product_id = %id, stock_quantity, "Product stock updated");
        }
        Ok(updated.map(Product::from))
    }

    #[instrument(skip(self))]
    async fn low_stock(&self) -> ProductResult<Vec<Product>> {
        let cursor = self.collection.find(low_stock_filter()).await?;
        let documents: Vec<ProductDocument> = cursor.try_collect().await?;

        Ok(documents.into_iter().map(Product::from).collect())
    }
}
