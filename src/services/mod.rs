pub mod analytics;
pub mod products;
pub mod stores;
