use crate::{
    entities::{product, store},
    errors::ServiceError,
};
use async_trait::async_trait;
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, Order, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 20;
pub const MAX_LIMIT: u64 = 100;

#[async_trait]
pub trait Query: Send + Sync {
    type Result: Send + Sync;

    async fn execute(&self, db: &DatabaseConnection) -> Result<Self::Result, ServiceError>;
}

/// Sortable product columns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProductSortField {
    Name,
    Price,
    Quantity,
    #[default]
    CreatedAt,
    Category,
    Sku,
}

impl ProductSortField {
    fn column(self) -> product::Column {
        match self {
            Self::Name => product::Column::Name,
            Self::Price => product::Column::Price,
            Self::Quantity => product::Column::Quantity,
            Self::CreatedAt => product::Column::CreatedAt,
            Self::Category => product::Column::Category,
            Self::Sku => product::Column::Sku,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    fn order(self) -> Order {
        match self {
            Self::Asc => Order::Asc,
            Self::Desc => Order::Desc,
        }
    }
}

/// Filter/sort/page specification for the product listing.
///
/// All filters are optional and combined with AND; `search` is a
/// case-insensitive substring match over name, description and SKU.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductSearchQuery {
    pub store_id: Option<Uuid>,
    pub category: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub in_stock: Option<bool>,
    pub low_stock: Option<bool>,
    pub search: Option<String>,
    pub page: u64,
    pub limit: u64,
    pub sort_by: ProductSortField,
    pub sort_order: SortDirection,
}

impl ProductSearchQuery {
    /// Page number, 1-based.
    pub fn normalized_page(&self) -> u64 {
        self.page.max(DEFAULT_PAGE)
    }

    /// Page size, clamped to 1..=MAX_LIMIT.
    pub fn normalized_limit(&self) -> u64 {
        self.limit.clamp(1, MAX_LIMIT)
    }
}

/// One page of matching products joined with their store, plus the count
/// of ALL rows matching the active filters.
#[derive(Debug)]
pub struct ProductPage {
    pub items: Vec<(product::Model, Option<store::Model>)>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

fn search_condition(term: &str) -> Condition {
    let pattern = format!("%{}%", term.to_lowercase());
    Condition::any()
        .add(
            Expr::expr(Func::lower(Expr::col((
                product::Entity,
                product::Column::Name,
            ))))
            .like(pattern.clone()),
        )
        .add(
            Expr::expr(Func::lower(Expr::col((
                product::Entity,
                product::Column::Description,
            ))))
            .like(pattern.clone()),
        )
        .add(
            Expr::expr(Func::lower(Expr::col((
                product::Entity,
                product::Column::Sku,
            ))))
            .like(pattern),
        )
}

#[async_trait]
impl Query for ProductSearchQuery {
    type Result = ProductPage;

    async fn execute(&self, db: &DatabaseConnection) -> Result<Self::Result, ServiceError> {
        let page = self.normalized_page();
        let limit = self.normalized_limit();
        let offset = (page - 1) * limit;

        let mut query = product::Entity::find().find_also_related(store::Entity);

        if let Some(store_id) = self.store_id {
            query = query.filter(product::Column::StoreId.eq(store_id));
        }

        if let Some(category) = &self.category {
            query = query.filter(product::Column::Category.eq(category.clone()));
        }

        if let Some(min_price) = self.min_price {
            query = query.filter(product::Column::Price.gte(min_price));
        }

        if let Some(max_price) = self.max_price {
            query = query.filter(product::Column::Price.lte(max_price));
        }

        if self.in_stock == Some(true) {
            query = query.filter(product::Column::Quantity.gt(0));
        }

        if let Some(term) = &self.search {
            query = query.filter(search_condition(term));
        }

        query = query.order_by(self.sort_by.column(), self.sort_order.order());

        if self.low_stock == Some(true) {
            // quantity <= min_stock compares two columns of the same row, so
            // it cannot go through the regular filter set: fetch every row
            // matching the other filters (already sorted), apply the
            // threshold in memory, and only then slice the page. Total must
            // reflect the post-filter count.
            let rows = query.all(db).await?;
            let matching: Vec<(product::Model, Option<store::Model>)> = rows
                .into_iter()
                .filter(|(p, _)| p.quantity <= p.min_stock)
                .collect();
            let total = matching.len() as u64;
            let items = matching
                .into_iter()
                .skip(offset as usize)
                .take(limit as usize)
                .collect();

            Ok(ProductPage {
                items,
                total,
                page,
                limit,
            })
        } else {
            let total = query.clone().count(db).await?;
            let items = query.offset(offset).limit(limit).all(db).await?;

            Ok(ProductPage {
                items,
                total,
                page,
                limit,
            })
        }
    }
}
