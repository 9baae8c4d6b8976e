pub mod analytics;
pub mod common;
pub mod products;
pub mod stores;

use crate::db::DbPool;
use crate::events::EventSender;
use crate::services::{
    analytics::AnalyticsService, products::ProductService, stores::StoreService,
};
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub stores: Arc<StoreService>,
    pub products: Arc<ProductService>,
    pub analytics: Arc<AnalyticsService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        let stores = Arc::new(StoreService::new(db_pool.clone(), event_sender.clone()));
        let products = Arc::new(ProductService::new(db_pool.clone(), event_sender));
        let analytics = Arc::new(AnalyticsService::new(db_pool));

        Self {
            stores,
            products,
            analytics,
        }
    }
}
