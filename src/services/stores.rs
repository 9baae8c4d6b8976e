use crate::{
    entities::{product, store},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Service for managing stores
#[derive(Clone)]
pub struct StoreService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

/// Store joined with its derived product count
#[derive(Debug, Serialize, ToSchema)]
pub struct StoreWithProductCount {
    #[serde(flatten)]
    pub store: store::Model,
    pub product_count: i64,
}

impl StoreService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// List all stores, newest first, each with its product count.
    #[instrument(skip(self))]
    pub async fn list_stores(&self) -> Result<Vec<StoreWithProductCount>, ServiceError> {
        let stores = store::Entity::find()
            .order_by_desc(store::Column::CreatedAt)
            .all(&*self.db)
            .await?;

        let counts: Vec<(Uuid, i64)> = product::Entity::find()
            .select_only()
            .column(product::Column::StoreId)
            .column_as(Expr::col(product::Column::Id).count(), "product_count")
            .group_by(product::Column::StoreId)
            .into_tuple()
            .all(&*self.db)
            .await?;
        let counts: HashMap<Uuid, i64> = counts.into_iter().collect();

        Ok(stores
            .into_iter()
            .map(|s| StoreWithProductCount {
                product_count: counts.get(&s.id).copied().unwrap_or(0),
                store: s,
            })
            .collect())
    }

    /// Get a store by ID with its product count
    #[instrument(skip(self))]
    pub async fn get_store(&self, store_id: Uuid) -> Result<StoreWithProductCount, ServiceError> {
        let store = store::Entity::find_by_id(store_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Store {} not found", store_id)))?;

        let product_count = product::Entity::find()
            .filter(product::Column::StoreId.eq(store_id))
            .count(&*self.db)
            .await? as i64;

        Ok(StoreWithProductCount {
            store,
            product_count,
        })
    }

    /// Create a new store
    #[instrument(skip(self))]
    pub async fn create_store(&self, input: CreateStoreInput) -> Result<store::Model, ServiceError> {
        let store_id = Uuid::new_v4();
        let now = Utc::now();

        let store = store::ActiveModel {
            id: Set(store_id),
            name: Set(input.name),
            address: Set(input.address),
            city: Set(input.city),
            state: Set(input.state),
            zip: Set(input.zip),
            phone: Set(input.phone),
            email: Set(input.email),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        };

        let store = store.insert(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::StoreCreated(store_id))
            .await;

        info!("Created store: {}", store_id);
        Ok(store)
    }

    /// Apply a partial update to an existing store
    #[instrument(skip(self))]
    pub async fn update_store(
        &self,
        store_id: Uuid,
        input: UpdateStoreInput,
    ) -> Result<store::Model, ServiceError> {
        let store = store::Entity::find_by_id(store_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Store {} not found", store_id)))?;

        let mut active: store::ActiveModel = store.into();

        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(address) = input.address {
            active.address = Set(address);
        }
        if let Some(city) = input.city {
            active.city = Set(city);
        }
        if let Some(state) = input.state {
            active.state = Set(state);
        }
        if let Some(zip) = input.zip {
            active.zip = Set(zip);
        }
        if let Some(phone) = input.phone {
            active.phone = Set(Some(phone));
        }
        if let Some(email) = input.email {
            active.email = Set(Some(email));
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }

        active.updated_at = Set(Some(Utc::now()));

        let store = active.update(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::StoreUpdated(store_id))
            .await;

        info!("Updated store: {}", store_id);
        Ok(store)
    }

    /// Delete a store. Deletion is refused while products still reference
    /// the store, keeping every product attached to an existing store.
    #[instrument(skip(self))]
    pub async fn delete_store(&self, store_id: Uuid) -> Result<store::Model, ServiceError> {
        let store = store::Entity::find_by_id(store_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Store {} not found", store_id)))?;

        let product_count = product::Entity::find()
            .filter(product::Column::StoreId.eq(store_id))
            .count(&*self.db)
            .await?;

        if product_count > 0 {
            return Err(ServiceError::Conflict(format!(
                "Store {} still has {} products; delete or reassign them first",
                store_id, product_count
            )));
        }

        let active: store::ActiveModel = store.clone().into();
        active.delete(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::StoreDeleted(store_id))
            .await;

        info!("Deleted store: {}", store_id);
        Ok(store)
    }
}

/// Input for creating a store
#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct CreateStoreInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 1, max = 255))]
    pub address: String,
    #[validate(length(min = 1, max = 100))]
    pub city: String,
    #[validate(length(min = 1, max = 50))]
    pub state: String,
    #[validate(length(min = 1, max = 20))]
    pub zip: String,
    #[validate(length(max = 30))]
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
}

/// Input for partially updating a store
#[derive(Debug, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct UpdateStoreInput {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub address: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub city: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub state: Option<String>,
    #[validate(length(min = 1, max = 20))]
    pub zip: Option<String>,
    #[validate(length(max = 30))]
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub is_active: Option<bool>,
}
