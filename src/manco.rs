//! Shortage ("manco") detection and supplier fulfillment statistics.
//!
//! Both routines are a single pass over orders already fetched from the
//! store. Only orders with status `received` carry meaningful shortages.

use std::collections::HashMap;

use crate::models::{Article, Manco, Order, SupplierStat};

pub const STATUS_RECEIVED: &str = "received";

/// Weighed goods may be short by this fraction of the ordered amount.
pub const WEIGHED_TOLERANCE: f64 = 0.25;

pub const UNKNOWN_SUPPLIER: &str = "Onbekend";

/// Counted goods must match exactly; weighed goods are flagged only above
/// the tolerance (strictly greater).
pub fn is_significant_shortage(article: &Article) -> bool {
    let shortage = article.shortage;
    if shortage <= 0.0 {
        return false;
    }

    if article.is_weighed {
        let ordered = article.quantity;
        ordered > 0.0 && shortage / ordered > WEIGHED_TOLERANCE
    } else {
        true
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

fn received(orders: &[Order]) -> impl Iterator<Item = &Order> {
    orders.iter().filter(|o| o.status == STATUS_RECEIVED)
}

/// Significant shortages of all received orders, newest first.
///
/// Dates are compared as plain strings, which is chronological only for
/// uniformly formatted ISO dates.
pub fn extract_mancos(orders: &[Order]) -> Vec<Manco> {
    let mut mancos = Vec::new();

    for order in received(orders) {
        let date = non_empty(&order.delivery_date)
            .or_else(|| non_empty(&order.order_date))
            .unwrap_or_default()
            .to_string();

        for article in order.articles.iter().filter(|a| is_significant_shortage(a)) {
            let product = article.name.clone().unwrap_or_default();
            let key = article
                .ingredient_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| product.clone());

            mancos.push(Manco {
                id: format!("{}-{}", order.id, key),
                order_id: order.id,
                date: date.clone(),
                supplier: non_empty(&article.supplier)
                    .or_else(|| non_empty(&order.supplier))
                    .unwrap_or_default()
                    .to_string(),
                product,
                brand: article.brand.clone(),
                quantity: article.shortage,
                unit: article.unit.clone(),
                price: article.price,
            });
        }
    }

    // Stable sort keeps fetch order among equal dates
    mancos.sort_by(|a, b| b.date.cmp(&a.date));
    mancos
}

#[derive(Default)]
struct SupplyCounter {
    ordered: u32,
    supplied: u32,
}

/// Fulfillment rate per supplier, in order of first appearance.
pub fn supplier_stats(orders: &[Order]) -> Vec<SupplierStat> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut counters: Vec<(String, SupplyCounter)> = Vec::new();

    for order in received(orders) {
        for article in &order.articles {
            let supplier = non_empty(&article.supplier)
                .or_else(|| non_empty(&order.supplier))
                .unwrap_or(UNKNOWN_SUPPLIER);

            let slot = match index.get(supplier) {
                Some(&slot) => slot,
                None => {
                    counters.push((supplier.to_string(), SupplyCounter::default()));
                    index.insert(supplier.to_string(), counters.len() - 1);
                    counters.len() - 1
                }
            };

            if article.quantity > 0.0 {
                let counter = &mut counters[slot].1;
                counter.ordered += 1;
                if !is_significant_shortage(article) {
                    counter.supplied += 1;
                }
            }
        }
    }

    counters
        .into_iter()
        .map(|(supplier, c)| SupplierStat {
            supplier,
            total_ordered: c.ordered,
            total_supplied: c.supplied,
            percent_supplied: if c.ordered > 0 {
                f64::from(c.supplied) / f64::from(c.ordered) * 100.0
            } else {
                0.0
            },
        })
        .collect()
}
