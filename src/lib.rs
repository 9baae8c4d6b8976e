//! Stockroom API Library
//!
//! This crate provides the core functionality for the Stockroom API: a
//! multi-store inventory backend with an optimistic-concurrency product
//! write path, a filtered/paginated product query engine, and read-only
//! inventory analytics.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod health;
pub mod openapi;
pub mod queries;
pub mod services;

use axum::Router;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub services: handlers::AppServices,
}

/// Standard paginated response wrapper
#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

impl<T> PaginatedResponse<T> {
    /// `total` counts every row matching the active filters, not just the
    /// returned page; `total_pages` is zero for an empty result set.
    pub fn new(items: Vec<T>, page: u64, limit: u64, total: u64) -> Self {
        let limit = limit.max(1);
        let total_pages = if total == 0 {
            0
        } else {
            (total + limit - 1) / limit
        };

        Self {
            items,
            total,
            page,
            limit,
            total_pages,
            has_next_page: page < total_pages,
            has_previous_page: page > 1,
        }
    }
}

/// Compose the versioned API surface.
pub fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .nest("/stores", handlers::stores::stores_router())
        .nest("/products", handlers::products::products_router())
        .nest("/analytics", handlers::analytics::analytics_router())
}

#[cfg(test)]
mod pagination_tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case(50, 10, 2, 5, true, true)]
    #[case(50, 10, 5, 5, false, true)]
    #[case(50, 10, 1, 5, true, false)]
    #[case(0, 10, 1, 0, false, false)]
    #[case(5, 10, 1, 1, false, false)]
    #[case(11, 10, 2, 2, false, true)]
    fn metadata_matches_contract(
        #[case] total: u64,
        #[case] limit: u64,
        #[case] page: u64,
        #[case] expected_pages: u64,
        #[case] expected_next: bool,
        #[case] expected_previous: bool,
    ) {
        let response = PaginatedResponse::<()>::new(vec![], page, limit, total);
        assert_eq!(response.total_pages, expected_pages);
        assert_eq!(response.has_next_page, expected_next);
        assert_eq!(response.has_previous_page, expected_previous);
    }

    #[test]
    fn page_beyond_end_reports_no_next() {
        let response = PaginatedResponse::<()>::new(vec![], 9, 10, 50);
        assert_eq!(response.total_pages, 5);
        assert!(!response.has_next_page);
        assert!(response.has_previous_page);
    }

    proptest! {
        #[test]
        fn metadata_is_internally_consistent(
            total in 0u64..100_000,
            limit in 1u64..=100,
            page in 1u64..=1_000,
        ) {
            let response = PaginatedResponse::<()>::new(vec![], page, limit, total);

            // total_pages is the smallest page count covering every row.
            prop_assert!(response.total_pages * limit >= total);
            if total > 0 {
                prop_assert!((response.total_pages - 1) * limit < total);
            } else {
                prop_assert_eq!(response.total_pages, 0);
            }

            prop_assert_eq!(response.has_next_page, page < response.total_pages);
            prop_assert_eq!(response.has_previous_page, page > 1);
        }
    }
}
