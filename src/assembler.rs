// Order assembly: one row per order with its expanded items and price.
use crate::error::{Error, Result};
use crate::types::{
    AssembledOrder, AssembledTable, CleanOrder, CleanOrderDetail, Described, FieldDictionary,
    OrderRow, PizzaPrice,
};
use crate::util::TIMESTAMP_FORMAT;
use chrono::NaiveDateTime;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

/// Unit price per item identifier. A repeated identifier keeps its last price.
#[derive(Debug, Clone, Default)]
pub struct PriceTable(HashMap<String, f64>);

impl PriceTable {
    pub fn from_rows(rows: &[PizzaPrice]) -> Self {
        let mut prices = HashMap::with_capacity(rows.len());
        for row in rows {
            prices.insert(row.pizza_id.trim().to_string(), row.price);
        }
        PriceTable(prices)
    }

    pub fn price(&self, item: &str) -> Result<f64> {
        self.0
            .get(item)
            .copied()
            .ok_or_else(|| Error::PriceLookup(item.to_string()))
    }
}

/// Build one [`AssembledOrder`] per order id that has detail rows.
///
/// Each detail row contributes its item identifier `quantity` times, in the
/// detail table's order. Orders without detail rows, and detail rows whose
/// order has no timestamp, are left out.
pub fn assemble_orders(
    orders: &[CleanOrder],
    details: &[CleanOrderDetail],
    prices: &PriceTable,
) -> Result<Vec<AssembledOrder>> {
    let mut timestamps: HashMap<u64, NaiveDateTime> = HashMap::with_capacity(orders.len());
    for order in orders {
        timestamps
            .entry(order.order_id)
            .or_insert_with(|| order.timestamp());
    }

    let mut grouped: BTreeMap<u64, Vec<String>> = BTreeMap::new();
    for detail in details.iter().filter(|d| d.quantity > 0) {
        grouped
            .entry(detail.order_id)
            .or_default()
            .extend(std::iter::repeat(detail.pizza_id.clone()).take(detail.quantity as usize));
    }

    let mut assembled = Vec::with_capacity(grouped.len());
    let mut orphaned = 0usize;
    for (order_id, items) in grouped {
        let total_price = items
            .iter()
            .map(|item| prices.price(item))
            .sum::<Result<f64>>()?;
        let Some(timestamp) = timestamps.get(&order_id).copied() else {
            orphaned += 1;
            continue;
        };
        assembled.push(AssembledOrder {
            order_id,
            timestamp,
            item_count: items.len(),
            items,
            total_price,
        });
    }
    if orphaned > 0 {
        warn!(orphaned, "order details without a matching order were dropped");
    }
    debug!(orders = assembled.len(), "assembled orders");
    Ok(assembled)
}

/// Tag the assembled orders with the field dictionary.
pub fn describe(orders: Vec<AssembledOrder>, dictionary: &FieldDictionary) -> AssembledTable {
    Described::new("summed_orders", dictionary.clone(), orders)
}

pub fn order_rows(orders: &[AssembledOrder]) -> Vec<OrderRow> {
    orders
        .iter()
        .map(|o| OrderRow {
            order_id: o.order_id,
            timestamp: o.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            items: o.items.join(", "),
            item_count: o.item_count,
            total_price: o.total_price,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn order(id: u64, day: u32, hour: u32) -> CleanOrder {
        CleanOrder {
            order_id: id,
            date: NaiveDate::from_ymd_opt(2015, 1, day).unwrap(),
            time: NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
        }
    }

    fn line(line_id: u64, order_id: u64, pizza: &str, quantity: u32) -> CleanOrderDetail {
        CleanOrderDetail {
            order_details_id: line_id,
            order_id,
            pizza_id: pizza.to_string(),
            quantity,
        }
    }

    fn prices() -> PriceTable {
        PriceTable::from_rows(&[
            PizzaPrice {
                pizza_id: "hawaiian_m".to_string(),
                price: 13.25,
            },
            PizzaPrice {
                pizza_id: "bbq_ckn_s".to_string(),
                price: 12.75,
            },
        ])
    }

    #[test]
    fn quantities_expand_into_items() {
        let orders = vec![order(1, 1, 11), order(2, 1, 12), order(3, 2, 9)];
        let details = vec![
            line(1, 1, "hawaiian_m", 2),
            line(2, 1, "bbq_ckn_s", 1),
            line(3, 2, "bbq_ckn_s", 3),
        ];
        let assembled = assemble_orders(&orders, &details, &prices()).unwrap();

        assert_eq!(assembled.len(), 2, "order 3 has no lines");
        let first = &assembled[0];
        assert_eq!(first.order_id, 1);
        assert_eq!(first.items, vec!["hawaiian_m", "hawaiian_m", "bbq_ckn_s"]);
        assert_eq!(first.item_count, 3);
        assert!((first.total_price - 39.25).abs() < 1e-9);
        assert_eq!(
            first.timestamp,
            NaiveDate::from_ymd_opt(2015, 1, 1)
                .unwrap()
                .and_hms_opt(11, 0, 0)
                .unwrap()
        );
        assert_eq!(assembled[1].items.len(), 3);
        assert!((assembled[1].total_price - 38.25).abs() < 1e-9);
    }

    #[test]
    fn counts_and_prices_are_consistent() {
        let orders: Vec<CleanOrder> = (1..=6).map(|id| order(id, id as u32, 10)).collect();
        let details: Vec<CleanOrderDetail> = (1..=12)
            .map(|n| {
                let pizza = if n % 3 == 0 { "hawaiian_m" } else { "bbq_ckn_s" };
                line(n, (n + 1) / 2, pizza, (n % 4) as u32 + 1)
            })
            .collect();
        let table = prices();
        for o in assemble_orders(&orders, &details, &table).unwrap() {
            assert_eq!(o.item_count, o.items.len());
            let expected: f64 = o.items.iter().map(|i| table.price(i).unwrap()).sum();
            assert!((o.total_price - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn repeated_price_rows_keep_the_last() {
        let table = PriceTable::from_rows(&[
            PizzaPrice {
                pizza_id: "hawaiian_m".to_string(),
                price: 13.25,
            },
            PizzaPrice {
                pizza_id: "hawaiian_m".to_string(),
                price: 14.0,
            },
        ]);
        assert_eq!(table.price("hawaiian_m").unwrap(), 14.0);
    }

    #[test]
    fn unknown_item_price_is_fatal() {
        let orders = vec![order(1, 1, 11)];
        let details = vec![line(1, 1, "mystery_xl", 1)];
        let err = assemble_orders(&orders, &details, &prices()).unwrap_err();
        assert!(matches!(err, Error::PriceLookup(ref item) if item == "mystery_xl"));
    }

    #[test]
    fn lines_without_an_order_are_dropped() {
        let orders = vec![order(1, 1, 11)];
        let details = vec![line(1, 1, "hawaiian_m", 1), line(2, 9, "bbq_ckn_s", 1)];
        let assembled = assemble_orders(&orders, &details, &prices()).unwrap();
        assert_eq!(assembled.len(), 1);
        assert_eq!(assembled[0].order_id, 1);
    }

    #[test]
    fn rows_render_timestamp_and_items() {
        let orders = vec![order(1, 5, 18)];
        let details = vec![line(1, 1, "hawaiian_m", 1), line(2, 1, "bbq_ckn_s", 1)];
        let assembled = assemble_orders(&orders, &details, &prices()).unwrap();
        let rows = order_rows(&assembled);
        assert_eq!(rows[0].timestamp, "2015-01-05 18:00:00");
        assert_eq!(rows[0].items, "hawaiian_m, bbq_ckn_s");
        assert_eq!(rows[0].item_count, 2);
    }
}
