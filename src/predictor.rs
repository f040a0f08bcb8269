// Next-week ingredient estimate: the median weekly count of each ingredient.

use crate::types::PredictionRow;
use crate::util::median;
use crate::weekly::WeeklyCountTable;
use serde::Serialize;
use std::collections::BTreeMap;

/// Ingredient → median weekly count.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PredictionTable(BTreeMap<String, f64>);

impl PredictionTable {
    pub fn get(&self, ingredient: &str) -> Option<f64> {
        self.0.get(ingredient).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

pub fn predict_next_week(weekly: &WeeklyCountTable) -> PredictionTable {
    let medians = weekly
        .categories()
        .map(|ingredient| {
            let counts = weekly
                .column(ingredient)
                .into_iter()
                .map(|c| c as f64)
                .collect();
            (ingredient.to_string(), median(counts))
        })
        .collect();
    PredictionTable(medians)
}

/// Structured export of a [`PredictionTable`].
#[derive(Debug, Clone, Serialize)]
pub struct PredictionDocument {
    pub comment: &'static str,
    pub ingredients: Vec<PredictionRow>,
}

/// Export rows, with stray leading symbols (left over from mis-encoded
/// quotes such as `‘Nduja Salami`) dropped from the names.
pub fn prediction_rows(predictions: &PredictionTable) -> Vec<PredictionRow> {
    predictions
        .iter()
        .map(|(ingredient, amount)| PredictionRow {
            ingredient: export_name(ingredient).to_string(),
            amount,
        })
        .collect()
}

pub fn prediction_document(predictions: &PredictionTable) -> PredictionDocument {
    PredictionDocument {
        comment: "Vague prediction of next week ingredients amount.",
        ingredients: prediction_rows(predictions),
    }
}

fn export_name(name: &str) -> &str {
    let trimmed = name.trim_start_matches(|c: char| !c.is_ascii_alphanumeric());
    if trimmed.is_empty() {
        name
    } else {
        trimmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_per_ingredient_across_weeks() {
        let weekly = WeeklyCountTable::from_grid(
            vec!["Basil".to_string(), "Garlic".to_string()],
            vec![
                (1, vec![10, 1]),
                (2, vec![30, 4]),
                (3, vec![20, 2]),
                (4, vec![40, 0]),
            ],
        );
        let predictions = predict_next_week(&weekly);
        assert_eq!(predictions.len(), 2);
        assert_eq!(predictions.get("Basil"), Some(25.0));
        assert_eq!(predictions.get("Garlic"), Some(1.5));
    }

    #[test]
    fn odd_week_count_takes_middle_value() {
        let weekly = WeeklyCountTable::from_grid(
            vec!["Onions".to_string()],
            vec![(0, vec![7]), (1, vec![3]), (2, vec![5])],
        );
        assert_eq!(predict_next_week(&weekly).get("Onions"), Some(5.0));
    }

    #[test]
    fn export_names_drop_leading_symbols() {
        let weekly = WeeklyCountTable::from_grid(
            vec!["\u{c2}\u{2018}Nduja Salami".to_string(), "Pesto Sauce".to_string()],
            vec![(1, vec![2, 3])],
        );
        let rows = prediction_rows(&predict_next_week(&weekly));
        let names: Vec<&str> = rows.iter().map(|r| r.ingredient.as_str()).collect();
        assert_eq!(names, vec!["Pesto Sauce", "Nduja Salami"]);
        let doc = prediction_document(&predict_next_week(&weekly));
        assert_eq!(doc.ingredients.len(), 2);
    }

    #[test]
    fn empty_table_predicts_nothing() {
        assert!(predict_next_week(&WeeklyCountTable::default()).is_empty());
    }
}
