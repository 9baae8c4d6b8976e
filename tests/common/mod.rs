use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request},
    routing::get,
    Router,
};
use rust_decimal::Decimal;
use serde_json::Value;
use stockroom_api::{
    config::AppConfig,
    db,
    entities::store,
    events::{self, EventSender},
    handlers::AppServices,
    services::products::{CreateProductInput, ProductWithStore},
    services::stores::CreateStoreInput,
    AppState,
};
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

/// Helper harness for spinning up an application state backed by a
/// file-based SQLite database in a private temp directory.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _db_dir: tempfile::TempDir,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let db_dir = tempfile::tempdir().expect("create temp dir for test database");
        let db_path = db_dir.path().join("stockroom_test.db");

        let mut cfg = AppConfig::new(
            format!("sqlite://{}?mode=rwc", db_path.display()),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.auto_migrate = true;
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");

        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let db_arc = Arc::new(pool);
        let (event_tx, event_rx) = mpsc::channel(256);
        let event_sender = EventSender::new(event_tx);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let services = AppServices::new(db_arc.clone(), Arc::new(event_sender.clone()));

        let state = AppState {
            db: db_arc,
            config: cfg,
            event_sender,
            services,
        };

        let router = Router::new()
            .route("/health", get(stockroom_api::health::health_check))
            .nest("/api/v1", stockroom_api::api_v1_routes())
            .with_state(state.clone());

        Self {
            router,
            state,
            _db_dir: db_dir,
            _event_task: event_task,
        }
    }

    /// Send a request against the router with an optional JSON body.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Seed a store through the service layer.
    #[allow(dead_code)]
    pub async fn seed_store(&self, name: &str) -> store::Model {
        self.state
            .services
            .stores
            .create_store(CreateStoreInput {
                name: name.to_string(),
                address: "1 Main St".to_string(),
                city: "Springfield".to_string(),
                state: "IL".to_string(),
                zip: "62701".to_string(),
                phone: None,
                email: None,
            })
            .await
            .expect("seed store for tests")
    }

    /// Seed a product through the service layer.
    #[allow(dead_code)]
    #[allow(clippy::too_many_arguments)]
    pub async fn seed_product(
        &self,
        store_id: Uuid,
        name: &str,
        sku: &str,
        category: &str,
        price: Decimal,
        quantity: i32,
        min_stock: i32,
    ) -> ProductWithStore {
        self.state
            .services
            .products
            .create_product(CreateProductInput {
                name: name.to_string(),
                description: None,
                sku: sku.to_string(),
                category: category.to_string(),
                price,
                quantity: Some(quantity),
                min_stock: Some(min_stock),
                store_id,
            })
            .await
            .expect("seed product for tests")
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self._event_task.abort();
    }
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn response_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    serde_json::from_slice(&bytes).expect("response body was not valid json")
}

/// Parse a decimal that the API serialized as a JSON string.
#[allow(dead_code)]
pub fn decimal_field(value: &Value, field: &str) -> Decimal {
    value[field]
        .as_str()
        .unwrap_or_else(|| panic!("field {} was not a string: {:?}", field, value[field]))
        .parse()
        .expect("field was not a valid decimal")
}
