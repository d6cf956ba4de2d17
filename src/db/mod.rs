use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, Document},
    Client, Collection,
};
use tracing::info;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{from_document, to_document, Product, ProductId};

#[cfg(test)]
pub mod memory;

/// The four operations the router needs from the product collection.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Store a new document and return the identifier the database assigned.
    async fn insert(&self, product: Product) -> AppResult<ProductId>;

    /// Every document in the collection, in natural (insertion) order.
    async fn find_all(&self) -> AppResult<Vec<Product>>;

    /// Merge `fields` into the document with `id`; returns the matched count.
    async fn update_partial(&self, id: &ProductId, fields: Product) -> AppResult<u64>;

    /// Returns the deleted count.
    async fn delete(&self, id: &ProductId) -> AppResult<u64>;
}

// ── MongoDB ───────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MongoStore {
    products: Collection<Document>,
}

impl MongoStore {
    /// Open a client and make sure the server answers before returning.
    pub async fn connect(config: &Config) -> AppResult<Self> {
        info!(uri = %config.mongodb_uri, "Connecting to MongoDB...");
        let client = Client::with_uri_str(&config.mongodb_uri).await?;
        let db = client.database(&config.database);

        db.run_command(doc! { "ping": 1 }, None).await?;

        info!(
            database = %config.database,
            collection = %config.collection,
            "Connected to MongoDB"
        );
        Ok(Self {
            products: db.collection(&config.collection),
        })
    }
}

#[async_trait]
impl ProductStore for MongoStore {
    async fn insert(&self, product: Product) -> AppResult<ProductId> {
        let result = self
            .products
            .insert_one(to_document(product)?, None)
            .await?;

        result
            .inserted_id
            .as_object_id()
            .map(ProductId::from)
            .ok_or_else(|| {
                AppError::Database(anyhow::anyhow!(
                    "unexpected inserted id {}",
                    result.inserted_id
                ))
            })
    }

    async fn find_all(&self) -> AppResult<Vec<Product>> {
        let docs: Vec<Document> = self.products.find(None, None).await?.try_collect().await?;
        Ok(docs.into_iter().map(from_document).collect())
    }

    async fn update_partial(&self, id: &ProductId, fields: Product) -> AppResult<u64> {
        let filter = doc! { "_id": id.object_id() };

        // `$set` with no fields is rejected by older servers.
        if fields.is_empty() {
            return Ok(self.products.count_documents(filter, None).await?);
        }

        let fields = to_document(fields)?;
        let result = self
            .products
            .update_one(filter, doc! { "$set": fields }, None)
            .await?;
        Ok(result.matched_count)
    }

    async fn delete(&self, id: &ProductId) -> AppResult<u64> {
        let result = self
            .products
            .delete_one(doc! { "_id": id.object_id() }, None)
            .await?;
        Ok(result.deleted_count)
    }
}
