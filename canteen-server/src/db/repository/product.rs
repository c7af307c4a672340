//! Product Repository

use std::time::Duration;

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{PLACEHOLDER_IMAGE, Product, ProductCreate, ProductUpdate};
use rust_decimal::Decimal;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const PRODUCT_TABLE: &str = "product";

#[derive(Clone)]
pub struct ProductRepository {
    base: BaseRepository,
}

impl ProductRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub fn with_timeout(db: Surreal<Db>, op_timeout: Duration) -> Self {
        Self {
            base: BaseRepository::with_timeout(db, op_timeout),
        }
    }

    /// Find the whole catalog (seller view)
    pub async fn find_all(&self) -> RepoResult<Vec<Product>> {
        let products: Vec<Product> = self
            .base
            .run(async {
                self.base
                    .db()
                    .query("SELECT * FROM product ORDER BY name")
                    .await?
                    .take(0)
            })
            .await?;
        Ok(products)
    }

    /// Find available products only (buyer view)
    pub async fn find_available(&self) -> RepoResult<Vec<Product>> {
        let products: Vec<Product> = self
            .base
            .run(async {
                self.base
                    .db()
                    .query("SELECT * FROM product WHERE is_available = true ORDER BY name")
                    .await?
                    .take(0)
            })
            .await?;
        Ok(products)
    }

    /// Find product by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Product>> {
        let thing: RecordId = id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))?;
        let product: Option<Product> = self.base.run(self.base.db().select(thing)).await?;
        Ok(product)
    }

    /// Create a new product owned by the given seller
    pub async fn create(&self, seller: RecordId, data: ProductCreate) -> RepoResult<Product> {
        // 名称与价格在落库前校验
        if data.name.trim().is_empty() {
            return Err(RepoError::Validation("name cannot be empty".into()));
        }
        if data.price < Decimal::ZERO {
            return Err(RepoError::Validation("price cannot be negative".into()));
        }

        let product = Product {
            id: None,
            name: data.name,
            price: data.price,
            image: data
                .image
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
            seller: Some(seller),
            is_available: data.is_available.unwrap_or(true),
        };

        let created: Option<Product> = self
            .base
            .run(self.base.db().create(PRODUCT_TABLE).content(product))
            .await?;

        created.ok_or_else(|| RepoError::Database("Failed to create product".to_string()))
    }

    /// Update a product
    pub async fn update(&self, id: &str, data: ProductUpdate) -> RepoResult<Product> {
        let thing: RecordId = id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))?;

        if let Some(ref name) = data.name
            && name.trim().is_empty()
        {
            return Err(RepoError::Validation("name cannot be empty".into()));
        }
        if let Some(price) = data.price
            && price < Decimal::ZERO
        {
            return Err(RepoError::Validation("price cannot be negative".into()));
        }

        // Build dynamic SET clauses, binding only the provided fields
        let mut set_parts: Vec<&str> = Vec::new();
        if data.name.is_some() {
            set_parts.push("name = $name");
        }
        if data.price.is_some() {
            set_parts.push("price = $price");
        }
        if data.image.is_some() {
            set_parts.push("image = $image");
        }
        if data.is_available.is_some() {
            set_parts.push("is_available = $is_available");
        }

        if set_parts.is_empty() {
            // No fields to update
            return self
                .find_by_id(id)
                .await?
                .ok_or_else(|| RepoError::NotFound(format!("Product {} not found", id)));
        }

        let query_str = format!("UPDATE $thing SET {} RETURN AFTER", set_parts.join(", "));

        let products: Vec<Product> = self
            .base
            .run(async {
                let mut query = self.base.db().query(&query_str).bind(("thing", thing));
                if let Some(v) = data.name {
                    query = query.bind(("name", v));
                }
                if let Some(v) = data.price {
                    query = query.bind(("price", v));
                }
                if let Some(v) = data.image {
                    query = query.bind(("image", v));
                }
                if let Some(v) = data.is_available {
                    query = query.bind(("is_available", v));
                }
                query.await?.take(0)
            })
            .await?;

        products
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Product {} not found", id)))
    }

    /// Hard delete a product
    pub async fn delete(&self, id: &str) -> RepoResult<()> {
        let thing: RecordId = id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))?;

        let deleted: Option<Product> = self.base.run(self.base.db().delete(thing)).await?;
        if deleted.is_none() {
            return Err(RepoError::NotFound(format!("Product {} not found", id)));
        }
        Ok(())
    }
}
