//! In-process stand-ins for [`ProductStore`] used by router tests.

use async_trait::async_trait;
use indexmap::IndexMap;
use mongodb::bson::oid::ObjectId;
use serde_json::Value;
use tokio::sync::RwLock;

use super::ProductStore;
use crate::error::{AppError, AppResult};
use crate::models::{Product, ProductId, ID_FIELD};

/// Insertion-ordered collection held in memory, with `$set` merge semantics.
#[derive(Default)]
pub struct MemoryStore {
    products: RwLock<IndexMap<ProductId, Product>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn insert(&self, mut product: Product) -> AppResult<ProductId> {
        let id = ProductId::from(ObjectId::new());
        product.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
        self.products.write().await.insert(id, product);
        Ok(id)
    }

    async fn find_all(&self) -> AppResult<Vec<Product>> {
        Ok(self.products.read().await.values().cloned().collect())
    }

    async fn update_partial(&self, id: &ProductId, fields: Product) -> AppResult<u64> {
        let mut products = self.products.write().await;
        match products.get_mut(id) {
            Some(existing) => {
                existing.extend(fields);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete(&self, id: &ProductId) -> AppResult<u64> {
        Ok(self.products.write().await.shift_remove(id).map_or(0, |_| 1))
    }
}

/// Every call fails as if the database connection had dropped.
pub struct UnreachableStore;

const UNREACHABLE: &str = "connection closed by peer";

#[async_trait]
impl ProductStore for UnreachableStore {
    async fn insert(&self, _product: Product) -> AppResult<ProductId> {
        Err(AppError::Database(anyhow::anyhow!(UNREACHABLE)))
    }

    async fn find_all(&self) -> AppResult<Vec<Product>> {
        Err(AppError::Database(anyhow::anyhow!(UNREACHABLE)))
    }

    async fn update_partial(&self, _id: &ProductId, _fields: Product) -> AppResult<u64> {
        Err(AppError::Database(anyhow::anyhow!(UNREACHABLE)))
    }

    async fn delete(&self, _id: &ProductId) -> AppResult<u64> {
        Err(AppError::Database(anyhow::anyhow!(UNREACHABLE)))
    }
}
