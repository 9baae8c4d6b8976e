use crate::{
    entities::{product, store},
    errors::ServiceError,
};
use rust_decimal::{Decimal, RoundingStrategy};
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;

/// Read-only rollups over the current table contents. Stateless by design:
/// every call recomputes from a fresh snapshot, so there is no cache to
/// invalidate and results may trail concurrent writes.
#[derive(Clone)]
pub struct AnalyticsService {
    db: Arc<DatabaseConnection>,
}

/// Inventory totals for one store
#[derive(Debug, Serialize, ToSchema)]
pub struct StoreInventoryValue {
    pub store_id: Uuid,
    pub store_name: String,
    pub total_products: u64,
    pub total_quantity: i64,
    pub total_value: Decimal,
}

/// Inventory totals across all stores
#[derive(Debug, Serialize, ToSchema)]
pub struct InventoryValueReport {
    pub stores: Vec<StoreInventoryValue>,
    pub grand_total: Decimal,
}

/// A product at or below its low-stock threshold
#[derive(Debug, Serialize, ToSchema)]
pub struct LowStockProduct {
    pub id: Uuid,
    pub name: String,
    pub sku: String,
    pub category: String,
    pub quantity: i32,
    pub min_stock: i32,
    pub deficit: i32,
    pub store_id: Uuid,
    pub store_name: String,
}

/// Rollup of one category label
#[derive(Debug, Serialize, ToSchema)]
pub struct CategorySummary {
    pub category: String,
    pub product_count: u64,
    pub total_quantity: i64,
    pub total_value: Decimal,
    /// Average of listed unit prices (NOT quantity-weighted)
    pub average_price: Decimal,
}

/// Round to 2 decimal places, half-up on the 3rd decimal.
pub fn round_currency(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

impl AnalyticsService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Inventory value per store plus the grand total.
    #[instrument(skip(self))]
    pub async fn inventory_value(&self) -> Result<InventoryValueReport, ServiceError> {
        let rows = store::Entity::find()
            .find_with_related(product::Entity)
            .all(&*self.db)
            .await?;

        Ok(summarize_inventory(rows))
    }

    /// Every product at or below its threshold, lowest quantity first.
    #[instrument(skip(self))]
    pub async fn low_stock_products(&self) -> Result<Vec<LowStockProduct>, ServiceError> {
        let rows = product::Entity::find()
            .find_also_related(store::Entity)
            .order_by_asc(product::Column::Quantity)
            .all(&*self.db)
            .await?;

        Ok(collect_low_stock(rows))
    }

    /// Per-category rollups, sorted by category label.
    #[instrument(skip(self))]
    pub async fn category_summary(&self) -> Result<Vec<CategorySummary>, ServiceError> {
        let products = product::Entity::find().all(&*self.db).await?;

        Ok(summarize_categories(&products))
    }
}

pub(crate) fn summarize_inventory(
    rows: Vec<(store::Model, Vec<product::Model>)>,
) -> InventoryValueReport {
    let stores: Vec<StoreInventoryValue> = rows
        .into_iter()
        .map(|(store, products)| {
            let total_products = products.len() as u64;
            let total_quantity: i64 = products.iter().map(|p| i64::from(p.quantity)).sum();
            let total_value: Decimal = products
                .iter()
                .map(|p| p.price * Decimal::from(p.quantity))
                .sum();

            StoreInventoryValue {
                store_id: store.id,
                store_name: store.name,
                total_products,
                total_quantity,
                total_value: round_currency(total_value),
            }
        })
        .collect();

    // Per-store totals are rounded before summing, and the sum is rounded
    // again; cent-level results depend on this ordering.
    let grand_total = round_currency(stores.iter().map(|s| s.total_value).sum());

    InventoryValueReport {
        stores,
        grand_total,
    }
}

pub(crate) fn collect_low_stock(
    rows: Vec<(product::Model, Option<store::Model>)>,
) -> Vec<LowStockProduct> {
    rows.into_iter()
        .filter(|(p, _)| p.quantity <= p.min_stock)
        .map(|(p, s)| LowStockProduct {
            id: p.id,
            name: p.name,
            sku: p.sku,
            category: p.category,
            quantity: p.quantity,
            min_stock: p.min_stock,
            deficit: p.min_stock - p.quantity,
            store_id: p.store_id,
            store_name: s.map(|s| s.name).unwrap_or_default(),
        })
        .collect()
}

pub(crate) fn summarize_categories(products: &[product::Model]) -> Vec<CategorySummary> {
    #[derive(Default)]
    struct Accumulator {
        count: u64,
        total_quantity: i64,
        total_value: Decimal,
        total_price: Decimal,
    }

    // BTreeMap keeps the output sorted by category label.
    let mut groups: BTreeMap<String, Accumulator> = BTreeMap::new();

    for p in products {
        let entry = groups.entry(p.category.clone()).or_default();
        entry.count += 1;
        entry.total_quantity += i64::from(p.quantity);
        entry.total_value += p.price * Decimal::from(p.quantity);
        entry.total_price += p.price;
    }

    groups
        .into_iter()
        .map(|(category, acc)| CategorySummary {
            category,
            product_count: acc.count,
            total_quantity: acc.total_quantity,
            total_value: round_currency(acc.total_value),
            average_price: round_currency(acc.total_price / Decimal::from(acc.count)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn test_store(name: &str) -> store::Model {
        store::Model {
            id: Uuid::new_v4(),
            name: name.to_string(),
            address: "1 Main St".into(),
            city: "Springfield".into(),
            state: "IL".into(),
            zip: "62701".into(),
            phone: None,
            email: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn test_product(category: &str, price: Decimal, quantity: i32, min_stock: i32) -> product::Model {
        product::Model {
            id: Uuid::new_v4(),
            name: format!("{} item", category),
            description: None,
            sku: Uuid::new_v4().to_string(),
            category: category.to_string(),
            price,
            quantity,
            min_stock,
            is_active: true,
            version: 0,
            store_id: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn inventory_value_sums_price_times_quantity() {
        let store = test_store("Downtown");
        let products = vec![
            test_product("Electronics", dec!(100), 10, 10),
            test_product("Electronics", dec!(50), 20, 10),
        ];

        let report = summarize_inventory(vec![(store, products)]);

        assert_eq!(report.stores.len(), 1);
        assert_eq!(report.stores[0].total_products, 2);
        assert_eq!(report.stores[0].total_quantity, 30);
        assert_eq!(report.stores[0].total_value, dec!(2000));
        assert_eq!(report.grand_total, dec!(2000));
    }

    #[test]
    fn grand_total_sums_per_store_rounded_totals() {
        // 3.335 * 3 = 10.005 which rounds half-up to 10.01 per store; the
        // grand total must sum the rounded figures (20.02), not round the
        // raw sum (20.01).
        let rows = vec![
            (
                test_store("A"),
                vec![test_product("Misc", dec!(3.335), 3, 0)],
            ),
            (
                test_store("B"),
                vec![test_product("Misc", dec!(3.335), 3, 0)],
            ),
        ];

        let report = summarize_inventory(rows);
        assert_eq!(report.stores[0].total_value, dec!(10.01));
        assert_eq!(report.grand_total, dec!(20.02));
    }

    #[test]
    fn empty_store_yields_zeroed_rollup() {
        let report = summarize_inventory(vec![(test_store("Empty"), vec![])]);
        assert_eq!(report.stores[0].total_products, 0);
        assert_eq!(report.stores[0].total_quantity, 0);
        assert_eq!(report.stores[0].total_value, Decimal::ZERO);
        assert_eq!(report.grand_total, Decimal::ZERO);
    }

    #[test]
    fn low_stock_annotates_deficit_and_store_name() {
        let store = test_store("Depot");
        let mut low = test_product("Hardware", dec!(5), 2, 10);
        low.store_id = store.id;
        let healthy = test_product("Hardware", dec!(5), 50, 10);

        let rows = vec![
            (low.clone(), Some(store.clone())),
            (healthy, Some(store.clone())),
        ];
        let listing = collect_low_stock(rows);

        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].id, low.id);
        assert_eq!(listing[0].deficit, 8);
        assert_eq!(listing[0].store_name, "Depot");
    }

    #[test]
    fn low_stock_includes_exact_threshold() {
        let rows = vec![(test_product("Hardware", dec!(5), 10, 10), None)];
        assert_eq!(collect_low_stock(rows).len(), 1);
    }

    #[test]
    fn category_summary_groups_and_sorts() {
        let products = vec![
            test_product("Electronics", dec!(100), 5, 10),
            test_product("Electronics", dec!(150), 8, 10),
            test_product("Clothing", dec!(50), 3, 10),
        ];

        let summaries = summarize_categories(&products);

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].category, "Clothing");
        assert_eq!(summaries[0].product_count, 1);
        assert_eq!(summaries[0].total_quantity, 3);
        assert_eq!(summaries[0].total_value, dec!(150));
        assert_eq!(summaries[0].average_price, dec!(50));

        assert_eq!(summaries[1].category, "Electronics");
        assert_eq!(summaries[1].product_count, 2);
        assert_eq!(summaries[1].total_quantity, 13);
        assert_eq!(summaries[1].total_value, dec!(1700));
        assert_eq!(summaries[1].average_price, dec!(125));
    }

    #[test]
    fn average_price_is_not_quantity_weighted() {
        // One unit at 10, a thousand units at 1: the listed-price average is
        // 5.50 regardless of stock levels.
        let products = vec![
            test_product("Misc", dec!(10), 1, 0),
            test_product("Misc", dec!(1), 1000, 0),
        ];

        let summaries = summarize_categories(&products);
        assert_eq!(summaries[0].average_price, dec!(5.50));
    }

    #[test]
    fn round_currency_is_half_up() {
        assert_eq!(round_currency(dec!(10.005)), dec!(10.01));
        assert_eq!(round_currency(dec!(10.004)), dec!(10.00));
        assert_eq!(round_currency(dec!(2.675)), dec!(2.68));
    }
}
