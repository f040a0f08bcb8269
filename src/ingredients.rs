// Ingredient catalog and per-week ingredient consumption.

use crate::error::{Error, Result};
use crate::types::{AssembledOrder, IngredientTotalRow, PizzaType};
use crate::util::base_item_type;
use crate::weekly::{count_by_week, WeeklyCountTable};
use std::collections::BTreeMap;
use tracing::debug;

/// Added when an ingredient list names no sauce at all.
pub const DEFAULT_SAUCE: &str = "Tomato Sauce";
/// Added when an ingredient list does not name this cheese.
pub const DEFAULT_CHEESE: &str = "Mozzarella Cheese";

/// Base item type → ordered ingredient names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngredientCatalog(BTreeMap<String, Vec<String>>);

impl IngredientCatalog {
    pub fn from_pizza_types(types: &[PizzaType]) -> Self {
        let catalog = types
            .iter()
            .map(|t| {
                (
                    t.pizza_type_id.trim().to_string(),
                    parse_ingredients(&t.ingredients),
                )
            })
            .collect();
        IngredientCatalog(catalog)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn ingredients(&self, item_type: &str) -> Result<&[String]> {
        self.0
            .get(item_type)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::UnknownItemType(item_type.to_string()))
    }

    /// Ingredients of an item identifier, looked up by its base type.
    pub fn ingredients_for_item(&self, item: &str) -> Result<&[String]> {
        self.ingredients(base_item_type(item))
    }

    /// Flat ingredient list of an order; one entry per ingredient per unit.
    pub fn order_ingredients(&self, order: &AssembledOrder) -> Result<Vec<String>> {
        let mut out = Vec::new();
        for item in &order.items {
            out.extend(self.ingredients_for_item(item)?.iter().cloned());
        }
        Ok(out)
    }
}

/// Split a `", "`-separated ingredient string, adding the default sauce
/// and cheese when the raw text lacks them. Duplicates keep their first
/// position.
pub fn parse_ingredients(raw: &str) -> Vec<String> {
    let mut text = raw.trim().to_string();
    if !text.contains("Sauce") {
        text.push_str(", ");
        text.push_str(DEFAULT_SAUCE);
    }
    if !text.contains(DEFAULT_CHEESE) {
        text.push_str(", ");
        text.push_str(DEFAULT_CHEESE);
    }

    let mut out: Vec<String> = Vec::new();
    for name in text.split(", ").map(str::trim).filter(|s| !s.is_empty()) {
        if !out.iter().any(|seen| seen == name) {
            out.push(name.to_string());
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq)]
pub struct IngredientUsage {
    /// Occurrences of each ingredient over the whole dataset.
    pub totals: BTreeMap<String, u64>,
    pub weekly: WeeklyCountTable,
}

pub fn resolve_ingredients(
    orders: &[AssembledOrder],
    catalog: &IngredientCatalog,
) -> Result<IngredientUsage> {
    let mut totals: BTreeMap<String, u64> = BTreeMap::new();
    let weekly = count_by_week(orders, |order| {
        let ingredients = catalog.order_ingredients(order)?;
        for name in &ingredients {
            *totals.entry(name.clone()).or_insert(0) += 1;
        }
        Ok(ingredients)
    })?;
    debug!(ingredients = totals.len(), "resolved ingredients");
    Ok(IngredientUsage { totals, weekly })
}

/// Totals as rows, most used first.
pub fn total_rows(totals: &BTreeMap<String, u64>) -> Vec<IngredientTotalRow> {
    let mut rows: Vec<IngredientTotalRow> = totals
        .iter()
        .map(|(ingredient, count)| IngredientTotalRow {
            ingredient: ingredient.clone(),
            total_count: *count,
        })
        .collect();
    rows.sort_by(|a, b| {
        b.total_count
            .cmp(&a.total_count)
            .then_with(|| a.ingredient.cmp(&b.ingredient))
    });
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn pizza_type(id: &str, ingredients: &str) -> PizzaType {
        PizzaType {
            pizza_type_id: id.to_string(),
            name: String::new(),
            category: String::new(),
            ingredients: ingredients.to_string(),
        }
    }

    fn order(id: u64, day: u32, items: &[&str]) -> AssembledOrder {
        AssembledOrder {
            order_id: id,
            timestamp: NaiveDate::from_ymd_opt(2015, 1, day)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
            items: items.iter().map(|s| s.to_string()).collect(),
            item_count: items.len(),
            total_price: 0.0,
        }
    }

    #[test]
    fn sauce_is_injected_when_cheese_present() {
        assert_eq!(
            parse_ingredients("Pepperoni, Mozzarella Cheese"),
            vec!["Pepperoni", "Mozzarella Cheese", "Tomato Sauce"]
        );
    }

    #[test]
    fn both_defaults_are_injected() {
        assert_eq!(
            parse_ingredients("Sliced Ham, Pineapple"),
            vec!["Sliced Ham", "Pineapple", "Tomato Sauce", "Mozzarella Cheese"]
        );
    }

    #[test]
    fn any_sauce_counts_as_sauce() {
        assert_eq!(
            parse_ingredients("Chicken, Barbecue Sauce, Red Onions"),
            vec!["Chicken", "Barbecue Sauce", "Red Onions", "Mozzarella Cheese"]
        );
    }

    #[test]
    fn duplicates_keep_first_position() {
        assert_eq!(
            parse_ingredients("Garlic, Tomato Sauce, Garlic, Mozzarella Cheese"),
            vec!["Garlic", "Tomato Sauce", "Mozzarella Cheese"]
        );
    }

    #[test]
    fn order_ingredients_repeat_per_unit() {
        let catalog = IngredientCatalog::from_pizza_types(&[pizza_type(
            "pep",
            "Pepperoni, Mozzarella Cheese, Tomato Sauce",
        )]);
        let two = order(1, 5, &["pep_s", "pep_l"]);
        let ingredients = catalog.order_ingredients(&two).unwrap();
        assert_eq!(ingredients.len(), 6);
        assert_eq!(ingredients.iter().filter(|i| *i == "Pepperoni").count(), 2);
    }

    #[test]
    fn unknown_type_is_an_error() {
        let catalog = IngredientCatalog::from_pizza_types(&[pizza_type("pep", "Pepperoni")]);
        let err = catalog
            .order_ingredients(&order(1, 5, &["veggie_m"]))
            .unwrap_err();
        assert!(matches!(err, Error::UnknownItemType(ref t) if t == "veggie"));
    }

    #[test]
    fn usage_totals_and_weeks_agree() {
        let catalog = IngredientCatalog::from_pizza_types(&[
            pizza_type("pep", "Pepperoni, Mozzarella Cheese, Tomato Sauce"),
            pizza_type("veg", "Mushrooms, Tomato Sauce"),
        ]);
        let orders = vec![
            order(1, 5, &["pep_s", "veg_m"]),
            order(2, 6, &["veg_l"]),
            order(3, 13, &["pep_m", "pep_m"]),
        ];
        let usage = resolve_ingredients(&orders, &catalog).unwrap();

        assert_eq!(usage.totals["Tomato Sauce"], 5);
        assert_eq!(usage.totals["Mozzarella Cheese"], 5);
        assert_eq!(usage.totals["Mushrooms"], 2);
        assert_eq!(usage.totals["Pepperoni"], 3);
        assert_eq!(usage.weekly.totals(), usage.totals);

        // week 1: pep + veg + veg = 3 + 3 + 3
        assert_eq!(usage.weekly.week_total(1), 9);
        assert_eq!(usage.weekly.count(2, "Mushrooms"), Some(0));

        let rows = total_rows(&usage.totals);
        assert_eq!(rows[0].total_count, 5);
        assert_eq!(rows[0].ingredient, "Mozzarella Cheese");
        assert_eq!(rows.last().unwrap().ingredient, "Mushrooms");
    }
}
