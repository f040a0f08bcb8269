// Weekly pivot tables of item and ingredient counts.

use crate::error::Result;
use crate::types::AssembledOrder;
use crate::util::{base_item_type, week_of_year};
use std::collections::{BTreeMap, BTreeSet};

/// Counts per week and category.
///
/// Only weeks with at least one occurrence have a row, but every row carries
/// every category seen anywhere in the table, zero when absent that week.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeeklyCountTable {
    categories: BTreeSet<String>,
    weeks: BTreeMap<u32, BTreeMap<String, u64>>,
}

impl WeeklyCountTable {
    pub fn from_occurrences<I, S>(occurrences: I) -> Self
    where
        I: IntoIterator<Item = (u32, S)>,
        S: Into<String>,
    {
        let mut table = WeeklyCountTable::default();
        for (week, category) in occurrences {
            let category = category.into();
            *table
                .weeks
                .entry(week)
                .or_default()
                .entry(category.clone())
                .or_insert(0) += 1;
            table.categories.insert(category);
        }
        table.zero_fill();
        table
    }

    /// Rebuild a table from a header of categories and one count row per week.
    pub fn from_grid(categories: Vec<String>, rows: Vec<(u32, Vec<u64>)>) -> Self {
        let mut table = WeeklyCountTable {
            categories: categories.iter().cloned().collect(),
            weeks: BTreeMap::new(),
        };
        for (week, counts) in rows {
            let row = table.weeks.entry(week).or_default();
            for (category, count) in categories.iter().zip(counts) {
                *row.entry(category.clone()).or_insert(0) += count;
            }
        }
        table.zero_fill();
        table
    }

    fn zero_fill(&mut self) {
        for row in self.weeks.values_mut() {
            for category in &self.categories {
                row.entry(category.clone()).or_insert(0);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.weeks.is_empty()
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(String::as_str)
    }

    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    pub fn weeks(&self) -> impl Iterator<Item = u32> + '_ {
        self.weeks.keys().copied()
    }

    /// Rows in week order; each row's entries are in category order.
    pub fn rows(&self) -> impl Iterator<Item = (u32, &BTreeMap<String, u64>)> {
        self.weeks.iter().map(|(week, row)| (*week, row))
    }

    /// `None` when the week has no row or the category is unknown.
    pub fn count(&self, week: u32, category: &str) -> Option<u64> {
        self.weeks.get(&week)?.get(category).copied()
    }

    pub fn week_total(&self, week: u32) -> u64 {
        self.weeks
            .get(&week)
            .map(|row| row.values().sum())
            .unwrap_or(0)
    }

    /// Counts of one category across the weeks present, in week order.
    pub fn column(&self, category: &str) -> Vec<u64> {
        self.weeks
            .values()
            .map(|row| row.get(category).copied().unwrap_or(0))
            .collect()
    }

    /// Sum of each category over all weeks.
    pub fn totals(&self) -> BTreeMap<String, u64> {
        self.categories
            .iter()
            .map(|category| (category.clone(), self.column(category).iter().sum()))
            .collect()
    }
}

/// Week label as persisted: zero-padded to two digits.
pub fn week_label(week: u32) -> String {
    format!("{:02}", week)
}

/// Bucket every label produced for an order into the order's week.
pub fn count_by_week<F>(orders: &[AssembledOrder], mut labels_of: F) -> Result<WeeklyCountTable>
where
    F: FnMut(&AssembledOrder) -> Result<Vec<String>>,
{
    let mut occurrences = Vec::new();
    for order in orders {
        let week = week_of_year(order.timestamp.date());
        occurrences.extend(labels_of(order)?.into_iter().map(|label| (week, label)));
    }
    Ok(WeeklyCountTable::from_occurrences(occurrences))
}

/// Items ordered per week, by full identifier when `sizes_included`,
/// otherwise by base item type.
pub fn weekly_item_counts(orders: &[AssembledOrder], sizes_included: bool) -> WeeklyCountTable {
    let mut occurrences = Vec::new();
    for order in orders {
        let week = week_of_year(order.timestamp.date());
        for item in &order.items {
            let label = if sizes_included {
                item.as_str()
            } else {
                base_item_type(item)
            };
            occurrences.push((week, label.to_string()));
        }
    }
    WeeklyCountTable::from_occurrences(occurrences)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn order(id: u64, month: u32, day: u32, items: &[&str]) -> AssembledOrder {
        AssembledOrder {
            order_id: id,
            timestamp: NaiveDate::from_ymd_opt(2015, month, day)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
            items: items.iter().map(|s| s.to_string()).collect(),
            item_count: items.len(),
            total_price: 0.0,
        }
    }

    #[test]
    fn four_orders_in_week_three() {
        let orders = vec![
            order(1, 1, 19, &["A", "A", "B"]),
            order(2, 1, 20, &["A"]),
            order(3, 1, 22, &["B", "B"]),
            order(4, 1, 25, &["A"]),
        ];
        let table = weekly_item_counts(&orders, true);
        assert_eq!(table.weeks().collect::<Vec<_>>(), vec![3]);
        assert_eq!(table.count(3, "A"), Some(4));
        assert_eq!(table.count(3, "B"), Some(3));
    }

    #[test]
    fn sizes_are_dropped_unless_requested() {
        let orders = vec![
            order(1, 1, 5, &["bbq_ckn_s", "bbq_ckn_l"]),
            order(2, 1, 6, &["big_meat_s"]),
        ];
        let types = weekly_item_counts(&orders, false);
        assert_eq!(types.categories().collect::<Vec<_>>(), vec!["bbq_ckn", "big_meat"]);
        assert_eq!(types.count(1, "bbq_ckn"), Some(2));

        let sizes = weekly_item_counts(&orders, true);
        assert_eq!(
            sizes.categories().collect::<Vec<_>>(),
            vec!["bbq_ckn_l", "bbq_ckn_s", "big_meat_s"]
        );
        assert_eq!(sizes.count(1, "bbq_ckn_l"), Some(1));
    }

    #[test]
    fn every_week_row_has_every_category() {
        let orders = vec![
            order(1, 1, 2, &["a_s"]),
            order(2, 1, 14, &["b_m", "b_m"]),
            order(3, 3, 2, &["c_l"]),
        ];
        let table = weekly_item_counts(&orders, false);
        assert_eq!(table.weeks().collect::<Vec<_>>(), vec![0, 2, 9]);
        for (_, row) in table.rows() {
            assert_eq!(row.keys().map(String::as_str).collect::<Vec<_>>(), vec!["a", "b", "c"]);
        }
        assert_eq!(table.count(0, "b"), Some(0));
        assert_eq!(table.count(2, "b"), Some(2));
        assert_eq!(table.count(5, "b"), None, "empty weeks have no row");
    }

    #[test]
    fn week_sums_match_item_occurrences() {
        let orders = vec![
            order(1, 2, 2, &["a_s", "b_s", "a_m"]),
            order(2, 2, 3, &["c_l"]),
            order(3, 2, 10, &["a_s", "a_s"]),
            order(4, 2, 15, &["b_m"]),
        ];
        let table = weekly_item_counts(&orders, true);
        for week in table.weeks() {
            let expected: usize = orders
                .iter()
                .filter(|o| week_of_year(o.timestamp.date()) == week)
                .map(|o| o.items.len())
                .sum();
            assert_eq!(table.week_total(week), expected as u64);
        }
        assert_eq!(table.totals()["a_s"], 3);
    }

    #[test]
    fn grid_rebuild_matches_counting() {
        let orders = vec![order(1, 1, 19, &["x", "y", "y"]), order(2, 2, 2, &["x"])];
        let counted = weekly_item_counts(&orders, true);
        let rebuilt = WeeklyCountTable::from_grid(
            vec!["x".to_string(), "y".to_string()],
            vec![(3, vec![1, 2]), (5, vec![1, 0])],
        );
        assert_eq!(counted, rebuilt);
        assert_eq!(counted.column("y"), vec![2, 0]);
        assert_eq!(week_label(5), "05");
    }
}
