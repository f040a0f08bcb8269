// Summary tables the spreadsheet and PDF renderers chart.
use crate::types::{
    AssembledOrder, CategoryShareRow, MonthlyIncomeRow, PizzaSizeRow, PizzaType, WeeklyOrdersRow,
};
use crate::util::{base_item_type, format_number, item_size, week_of_year};
use crate::weekly::{week_label, WeeklyCountTable};
use chrono::Datelike;
use std::collections::{BTreeMap, HashMap};

/// Pizzas ordered and income per calendar month.
pub fn monthly_income(orders: &[AssembledOrder]) -> Vec<MonthlyIncomeRow> {
    let mut months: BTreeMap<u32, (usize, f64)> = BTreeMap::new();
    for o in orders {
        let e = months.entry(o.timestamp.month()).or_insert((0, 0.0));
        e.0 += o.item_count;
        e.1 += o.total_price;
    }
    months
        .into_iter()
        .map(|(month, (amount_ordered, income))| MonthlyIncomeRow {
            month,
            amount_ordered,
            income: format_number(income, 2),
        })
        .collect()
}

/// Orders, pizzas and income per week bucket.
pub fn weekly_orders(orders: &[AssembledOrder]) -> Vec<WeeklyOrdersRow> {
    #[derive(Default)]
    struct Acc {
        orders: usize,
        pizzas: usize,
        income: f64,
    }
    let mut weeks: BTreeMap<u32, Acc> = BTreeMap::new();
    for o in orders {
        let e = weeks.entry(week_of_year(o.timestamp.date())).or_default();
        e.orders += 1;
        e.pizzas += o.item_count;
        e.income += o.total_price;
    }
    weeks
        .into_iter()
        .map(|(week, acc)| WeeklyOrdersRow {
            week: week_label(week),
            orders: acc.orders,
            pizzas: acc.pizzas,
            income: format_number(acc.income, 2),
        })
        .collect()
}

/// Yearly amount per pizza and size, from the size-split weekly table.
pub fn pizza_sizes(weekly_with_sizes: &WeeklyCountTable) -> Vec<PizzaSizeRow> {
    let mut rows: Vec<PizzaSizeRow> = weekly_with_sizes
        .totals()
        .into_iter()
        .map(|(item, amount)| PizzaSizeRow {
            pizza: base_item_type(&item).to_string(),
            size: item_size(&item).unwrap_or_default().to_uppercase(),
            amount,
        })
        .collect();
    rows.sort_by(|a, b| a.pizza.cmp(&b.pizza));
    rows
}

/// Pizzas ordered per category, with each category's share of the total.
pub fn category_shares(
    weekly_types: &WeeklyCountTable,
    pizza_types: &[PizzaType],
) -> Vec<CategoryShareRow> {
    let category_of: HashMap<&str, &str> = pizza_types
        .iter()
        .map(|t| (t.pizza_type_id.trim(), t.category.trim()))
        .collect();

    let mut amounts: BTreeMap<String, u64> = BTreeMap::new();
    for (item_type, amount) in weekly_types.totals() {
        let category = match category_of.get(item_type.as_str()) {
            Some(c) if !c.is_empty() => c.to_string(),
            _ => "Unknown".to_string(),
        };
        *amounts.entry(category).or_insert(0) += amount;
    }

    let total: u64 = amounts.values().sum();
    let mut rows: Vec<CategoryShareRow> = amounts
        .into_iter()
        .map(|(category, amount)| {
            let pct = if total == 0 {
                0.0
            } else {
                amount as f64 / total as f64 * 100.0
            };
            CategoryShareRow {
                category,
                amount,
                share_pct: format_number(pct, 2),
            }
        })
        .collect();
    rows.sort_by(|a, b| b.amount.cmp(&a.amount).then_with(|| a.category.cmp(&b.category)));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weekly::weekly_item_counts;
    use chrono::NaiveDate;

    fn order(id: u64, month: u32, day: u32, items: &[&str], price: f64) -> AssembledOrder {
        AssembledOrder {
            order_id: id,
            timestamp: NaiveDate::from_ymd_opt(2015, month, day)
                .unwrap()
                .and_hms_opt(19, 30, 0)
                .unwrap(),
            items: items.iter().map(|s| s.to_string()).collect(),
            item_count: items.len(),
            total_price: price,
        }
    }

    fn sample() -> Vec<AssembledOrder> {
        vec![
            order(1, 1, 5, &["pep_s", "pep_l", "veg_m"], 1000.0),
            order(2, 1, 6, &["veg_m"], 16.5),
            order(3, 2, 2, &["pep_s"], 12.0),
        ]
    }

    #[test]
    fn income_grouped_by_month() {
        let rows = monthly_income(&sample());
        assert_eq!(rows.len(), 2);
        assert_eq!((rows[0].month, rows[0].amount_ordered), (1, 4));
        assert_eq!(rows[0].income, "1,016.50");
        assert_eq!(rows[1].income, "12.00");
    }

    #[test]
    fn orders_grouped_by_week() {
        let rows = weekly_orders(&sample());
        let weeks: Vec<(&str, usize, usize)> = rows
            .iter()
            .map(|r| (r.week.as_str(), r.orders, r.pizzas))
            .collect();
        assert_eq!(weeks, vec![("01", 2, 4), ("05", 1, 1)]);
    }

    #[test]
    fn sizes_split_from_identifiers() {
        let rows = pizza_sizes(&weekly_item_counts(&sample(), true));
        let flat: Vec<(&str, &str, u64)> = rows
            .iter()
            .map(|r| (r.pizza.as_str(), r.size.as_str(), r.amount))
            .collect();
        assert_eq!(flat, vec![("pep", "L", 1), ("pep", "S", 2), ("veg", "M", 2)]);
    }

    #[test]
    fn category_shares_sum_to_total() {
        let types = vec![
            PizzaType {
                pizza_type_id: "pep".to_string(),
                name: "The Pepperoni Pizza".to_string(),
                category: "Classic".to_string(),
                ingredients: String::new(),
            },
            PizzaType {
                pizza_type_id: "veg".to_string(),
                name: "The Vegetables Pizza".to_string(),
                category: "Veggie".to_string(),
                ingredients: String::new(),
            },
        ];
        let rows = category_shares(&weekly_item_counts(&sample(), false), &types);
        assert_eq!(rows[0].category, "Classic");
        assert_eq!(rows[0].amount, 3);
        assert_eq!(rows[0].share_pct, "60.00");
        assert_eq!(rows[1].share_pct, "40.00");
    }
}
