use crate::{
    entities::{product, product::DEFAULT_MIN_STOCK, store},
    errors::ServiceError,
    events::{Event, EventSender},
    queries::{ProductPage, ProductSearchQuery, Query},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Service owning the product write path and listing
#[derive(Clone)]
pub struct ProductService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

/// Product joined with its owning store
#[derive(Debug, Serialize, ToSchema)]
pub struct ProductWithStore {
    #[serde(flatten)]
    pub product: product::Model,
    pub store: Option<store::Model>,
}

impl ProductService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// List products by filter/sort/page.
    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        query: ProductSearchQuery,
    ) -> Result<ProductPage, ServiceError> {
        query.execute(&self.db).await
    }

    /// Get a product by ID joined with its store
    #[instrument(skip(self))]
    pub async fn get_product(&self, product_id: Uuid) -> Result<ProductWithStore, ServiceError> {
        let (product, store) = product::Entity::find_by_id(product_id)
            .find_also_related(store::Entity)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", product_id)))?;

        Ok(ProductWithStore { product, store })
    }

    /// Create a new product.
    ///
    /// Preconditions, in order: the referenced store must exist (NotFound),
    /// and the SKU must be unused across ALL stores (Conflict).
    #[instrument(skip(self))]
    pub async fn create_product(
        &self,
        input: CreateProductInput,
    ) -> Result<ProductWithStore, ServiceError> {
        let store = store::Entity::find_by_id(input.store_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Store {} not found", input.store_id)))?;

        self.ensure_unique_sku(&input.sku, None).await?;

        if input.price.is_sign_negative() {
            return Err(ServiceError::ValidationError(
                "Price cannot be negative".to_string(),
            ));
        }

        let product_id = Uuid::new_v4();
        let now = Utc::now();

        let product = product::ActiveModel {
            id: Set(product_id),
            name: Set(input.name.clone()),
            description: Set(input.description.clone()),
            sku: Set(input.sku.clone()),
            category: Set(input.category.clone()),
            price: Set(input.price),
            quantity: Set(input.quantity.unwrap_or(0)),
            min_stock: Set(input.min_stock.unwrap_or(DEFAULT_MIN_STOCK)),
            is_active: Set(true),
            version: Set(0),
            store_id: Set(input.store_id),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        };

        let product = product.insert(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::ProductCreated(product_id))
            .await;

        info!(product_id = %product_id, sku = %product.sku, "Created product");
        Ok(ProductWithStore {
            product,
            store: Some(store),
        })
    }

    /// Versioned field update.
    ///
    /// The caller supplies the version it believes is current; the row is
    /// patched and its version bumped by one in a single conditional UPDATE
    /// keyed on (id, version). A concurrent writer that got there first
    /// leaves this statement matching zero rows, which is then split into
    /// NotFound (row gone) or Conflict (version moved) by re-reading the id.
    /// Quantity is not updatable here; see [`Self::adjust_quantity`].
    #[instrument(skip(self))]
    pub async fn update_product(
        &self,
        product_id: Uuid,
        input: UpdateProductInput,
    ) -> Result<ProductWithStore, ServiceError> {
        if let Some(ref sku) = input.sku {
            self.ensure_unique_sku(sku, Some(product_id)).await?;
        }

        if let Some(price) = input.price {
            if price.is_sign_negative() {
                return Err(ServiceError::ValidationError(
                    "Price cannot be negative".to_string(),
                ));
            }
        }

        let mut update = product::Entity::update_many()
            .filter(product::Column::Id.eq(product_id))
            .filter(product::Column::Version.eq(input.version));

        if let Some(name) = input.name {
            update = update.col_expr(product::Column::Name, Expr::value(name));
        }
        if let Some(description) = input.description {
            update = update.col_expr(product::Column::Description, Expr::value(description));
        }
        if let Some(sku) = input.sku {
            update = update.col_expr(product::Column::Sku, Expr::value(sku));
        }
        if let Some(category) = input.category {
            update = update.col_expr(product::Column::Category, Expr::value(category));
        }
        if let Some(price) = input.price {
            update = update.col_expr(product::Column::Price, Expr::value(price));
        }
        if let Some(min_stock) = input.min_stock {
            update = update.col_expr(product::Column::MinStock, Expr::value(min_stock));
        }
        if let Some(is_active) = input.is_active {
            update = update.col_expr(product::Column::IsActive, Expr::value(is_active));
        }

        let result = update
            .col_expr(
                product::Column::Version,
                Expr::col(product::Column::Version).add(1),
            )
            .col_expr(product::Column::UpdatedAt, Expr::value(Utc::now()))
            .exec(&*self.db)
            .await?;

        if result.rows_affected == 0 {
            // Zero rows: the id is gone, or the version check lost the race.
            let existing = product::Entity::find_by_id(product_id).one(&*self.db).await?;
            return Err(match existing {
                None => ServiceError::NotFound(format!("Product {} not found", product_id)),
                Some(_) => ServiceError::Conflict(
                    "This product was modified by another user. Please refresh and try again."
                        .to_string(),
                ),
            });
        }

        let updated = self.get_product(product_id).await?;

        self.event_sender
            .send_or_log(Event::ProductUpdated(product_id))
            .await;

        info!(product_id = %product_id, version = %updated.product.version, "Updated product");
        Ok(updated)
    }

    /// Adjust the stock level by a signed delta.
    ///
    /// Deliberately version-free: stock movements are frequent and
    /// independent, so they must not contend on the optimistic lock. The
    /// increment is a single conditional UPDATE that also refuses to take
    /// the quantity below zero, which keeps the non-negativity invariant
    /// under concurrent decrements.
    #[instrument(skip(self))]
    pub async fn adjust_quantity(
        &self,
        product_id: Uuid,
        input: AdjustQuantityInput,
    ) -> Result<ProductWithStore, ServiceError> {
        let product = product::Entity::find_by_id(product_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", product_id)))?;

        let old_quantity = product.quantity;
        let new_quantity = i64::from(old_quantity) + i64::from(input.adjustment);
        if new_quantity < 0 {
            return Err(insufficient_stock_error(input.adjustment, old_quantity));
        }

        let mut update = product::Entity::update_many()
            .col_expr(
                product::Column::Quantity,
                Expr::col(product::Column::Quantity).add(input.adjustment),
            )
            .col_expr(product::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(product::Column::Id.eq(product_id));

        if input.adjustment < 0 {
            // Guard the decrement so racing reductions cannot take the
            // quantity below zero between our read and this statement.
            update = update.filter(product::Column::Quantity.gte(-i64::from(input.adjustment)));
        }

        let result = update.exec(&*self.db).await?;

        if result.rows_affected == 0 {
            // A concurrent adjustment drained the stock between our read and
            // the guarded increment; report against the current quantity.
            let current = product::Entity::find_by_id(product_id)
                .one(&*self.db)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("Product {} not found", product_id))
                })?;
            return Err(insufficient_stock_error(input.adjustment, current.quantity));
        }

        let updated = self.get_product(product_id).await?;

        self.event_sender
            .send_or_log(Event::QuantityAdjusted {
                product_id,
                old_quantity,
                new_quantity: updated.product.quantity,
                reason: input.reason.to_string(),
                note: input.note.clone(),
            })
            .await;

        info!(
            product_id = %product_id,
            adjustment = %input.adjustment,
            reason = %input.reason,
            "Adjusted product quantity"
        );
        Ok(updated)
    }

    /// Delete a product, returning its last-known state.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, product_id: Uuid) -> Result<product::Model, ServiceError> {
        let product = product::Entity::find_by_id(product_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", product_id)))?;

        let active: product::ActiveModel = product.clone().into();
        active.delete(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::ProductDeleted(product_id))
            .await;

        info!(product_id = %product_id, "Deleted product");
        Ok(product)
    }

    /// Distinct category labels, sorted ascending.
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<String>, ServiceError> {
        product::Entity::find()
            .select_only()
            .column(product::Column::Category)
            .distinct()
            .order_by_asc(product::Column::Category)
            .into_tuple::<String>()
            .all(&*self.db)
            .await
            .map_err(Into::into)
    }

    async fn ensure_unique_sku(
        &self,
        sku: &str,
        exclude_id: Option<Uuid>,
    ) -> Result<(), ServiceError> {
        let mut query = product::Entity::find().filter(product::Column::Sku.eq(sku));
        if let Some(id) = exclude_id {
            query = query.filter(product::Column::Id.ne(id));
        }

        if query.one(&*self.db).await?.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Product with SKU {} already exists",
                sku
            )));
        }

        Ok(())
    }
}

fn insufficient_stock_error(adjustment: i32, current_quantity: i32) -> ServiceError {
    ServiceError::ValidationError(format!(
        "Cannot reduce quantity by {}. Current stock is {}.",
        adjustment.unsigned_abs(),
        current_quantity
    ))
}

/// Why a stock level changed
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AdjustmentReason {
    Sale,
    Return,
    Restock,
    Damaged,
    Correction,
    Other,
}

/// Input for creating a product
#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct CreateProductInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub sku: String,
    #[validate(length(min = 1, max = 100))]
    pub category: String,
    #[validate(custom = "product::validate_non_negative_price")]
    pub price: Decimal,
    #[validate(range(min = 0))]
    pub quantity: Option<i32>,
    #[validate(range(min = 0))]
    pub min_stock: Option<i32>,
    pub store_id: Uuid,
}

/// Input for a versioned product update. `version` must match the stored
/// row for the patch to apply; quantity has its own operation.
#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct UpdateProductInput {
    pub version: i32,
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub sku: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub category: Option<String>,
    #[validate(custom = "product::validate_non_negative_price")]
    pub price: Option<Decimal>,
    #[validate(range(min = 0))]
    pub min_stock: Option<i32>,
    pub is_active: Option<bool>,
}

/// Input for a stock adjustment
#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct AdjustQuantityInput {
    /// Positive to add stock, negative to remove
    pub adjustment: i32,
    pub reason: AdjustmentReason,
    #[validate(length(max = 500))]
    pub note: Option<String>,
}
