//! Per-customer per-category purchase totals
//!
//! Each line item is attributed to every category its product belongs to,
//! with its full quantity. The PostgreSQL backend computes the same rows with
//! a join; this module is the in-process equivalent.

use crate::core::model::{Category, CategoryPurchase, Customer, Order, OrderLineItem};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Borrowed view over the tables the aggregation reads
pub struct PurchaseLedger<'a> {
    pub customers: &'a BTreeMap<i64, Customer>,
    pub categories: &'a BTreeMap<i64, Category>,
    pub orders: &'a BTreeMap<i64, Order>,
    pub line_items: &'a [OrderLineItem],
    /// `(category_id, product_id)` pairs
    pub category_products: &'a BTreeSet<(i64, i64)>,
}

impl PurchaseLedger<'_> {
    /// Rows ordered by customer id, then category id
    pub fn tally(&self) -> Vec<CategoryPurchase> {
        let mut categories_of: HashMap<i64, Vec<i64>> = HashMap::new();
        for &(category_id, product_id) in self.category_products {
            categories_of.entry(product_id).or_default().push(category_id);
        }

        let mut totals: BTreeMap<(i64, i64), i64> = BTreeMap::new();
        for line in self.line_items {
            let Some(order) = self.orders.get(&line.order_id) else {
                continue;
            };
            let Some(category_ids) = categories_of.get(&line.product_id) else {
                continue;
            };
            for &category_id in category_ids {
                *totals.entry((order.customer_id, category_id)).or_insert(0) +=
                    i64::from(line.quantity);
            }
        }

        totals
            .into_iter()
            .filter_map(|((customer_id, category_id), number_purchased)| {
                let customer = self.customers.get(&customer_id)?;
                let category = self.categories.get(&category_id)?;
                Some(CategoryPurchase {
                    customer_id,
                    customer_first_name: customer.first_name.clone(),
                    category_id,
                    category_name: category.name.clone(),
                    number_purchased,
                })
            })
            .collect()
    }
}
