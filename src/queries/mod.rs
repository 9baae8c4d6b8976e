pub mod product_queries;

pub use product_queries::{
    ProductPage, ProductSearchQuery, ProductSortField, Query, SortDirection, DEFAULT_LIMIT,
    DEFAULT_PAGE, MAX_LIMIT,
};
