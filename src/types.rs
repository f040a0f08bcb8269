// Row types shared by the stages, from raw CSV rows to report rows.
use crate::error::{Error, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use csv::StringRecord;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tabled::Tabled;

/// Field name → human-readable description, loaded from the data dictionary.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FieldDictionary(BTreeMap<String, String>);

impl FieldDictionary {
    /// Keeps the first description seen for a field.
    pub fn insert(&mut self, field: impl Into<String>, description: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| description.into());
    }

    pub fn describe(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn restricted_to<'a>(&self, fields: impl IntoIterator<Item = &'a str>) -> FieldDictionary {
        let mut out = FieldDictionary::default();
        for field in fields {
            if let Some(desc) = self.describe(field) {
                out.insert(field, desc);
            }
        }
        out
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A table tagged with its name and the descriptions of its fields.
#[derive(Debug, Clone)]
pub struct Described<T> {
    pub name: String,
    pub description: FieldDictionary,
    pub data: T,
}

impl<T> Described<T> {
    pub fn new(name: impl Into<String>, description: FieldDictionary, data: T) -> Self {
        Self {
            name: name.into(),
            description,
            data,
        }
    }
}

/// Header and rows of one delimited file, as read. Empty cells are missing.
#[derive(Debug, Clone)]
pub struct Records {
    pub path: PathBuf,
    pub headers: StringRecord,
    pub rows: Vec<StringRecord>,
}

pub type RawTable = Described<Records>;

impl Records {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cells of column `idx`, `None` where the cell is missing.
    pub fn column(&self, idx: usize) -> impl Iterator<Item = Option<&str>> + '_ {
        self.rows
            .iter()
            .map(move |row| row.get(idx).filter(|cell| !cell.is_empty()))
    }

    /// Deserialize every row into `T`, matching fields by header name.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        self.rows
            .iter()
            .enumerate()
            .map(|(idx, row)| {
                row.deserialize(Some(&self.headers))
                    .map_err(|e| Error::load(&self.path, format!("row {}: {}", idx + 1, e)))
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawOrder {
    pub order_id: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawOrderDetail {
    pub order_details_id: Option<String>,
    pub order_id: Option<String>,
    pub pizza_id: Option<String>,
    pub quantity: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PizzaPrice {
    pub pizza_id: String,
    pub price: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PizzaType {
    pub pizza_type_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: String,
    pub ingredients: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CleanOrder {
    pub order_id: u64,
    pub date: NaiveDate,
    pub time: NaiveTime,
}

impl CleanOrder {
    pub fn timestamp(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CleanOrderDetail {
    pub order_details_id: u64,
    pub order_id: u64,
    pub pizza_id: String,
    pub quantity: u32,
}

/// One order with its purchased items expanded one entry per unit.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledOrder {
    pub order_id: u64,
    pub timestamp: NaiveDateTime,
    pub items: Vec<String>,
    pub item_count: usize,
    pub total_price: f64,
}

pub type AssembledTable = Described<Vec<AssembledOrder>>;

#[derive(Debug, Clone, Serialize, Tabled)]
pub struct OrderRow {
    pub order_id: u64,
    pub timestamp: String,
    pub items: String,
    pub item_count: usize,
    pub total_price: f64,
}

#[derive(Debug, Clone, Serialize, Tabled)]
pub struct IngredientTotalRow {
    #[serde(rename = "Ingredient")]
    #[tabled(rename = "Ingredient")]
    pub ingredient: String,
    #[serde(rename = "TotalCount")]
    #[tabled(rename = "TotalCount")]
    pub total_count: u64,
}

#[derive(Debug, Clone, Serialize, Tabled)]
pub struct PredictionRow {
    pub ingredient: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize, Tabled)]
pub struct MonthlyIncomeRow {
    #[serde(rename = "Month")]
    #[tabled(rename = "Month")]
    pub month: u32,
    #[serde(rename = "AmountOrdered")]
    #[tabled(rename = "AmountOrdered")]
    pub amount_ordered: usize,
    #[serde(rename = "Income")]
    #[tabled(rename = "Income")]
    pub income: String,
}

#[derive(Debug, Clone, Serialize, Tabled)]
pub struct WeeklyOrdersRow {
    #[serde(rename = "Week")]
    #[tabled(rename = "Week")]
    pub week: String,
    #[serde(rename = "Orders")]
    #[tabled(rename = "Orders")]
    pub orders: usize,
    #[serde(rename = "Pizzas")]
    #[tabled(rename = "Pizzas")]
    pub pizzas: usize,
    #[serde(rename = "Income")]
    #[tabled(rename = "Income")]
    pub income: String,
}

#[derive(Debug, Clone, Serialize, Tabled)]
pub struct PizzaSizeRow {
    #[serde(rename = "Pizza")]
    #[tabled(rename = "Pizza")]
    pub pizza: String,
    #[serde(rename = "Size")]
    #[tabled(rename = "Size")]
    pub size: String,
    #[serde(rename = "Amount")]
    #[tabled(rename = "Amount")]
    pub amount: u64,
}

#[derive(Debug, Clone, Serialize, Tabled)]
pub struct CategoryShareRow {
    #[serde(rename = "Category")]
    #[tabled(rename = "Category")]
    pub category: String,
    #[serde(rename = "Amount")]
    #[tabled(rename = "Amount")]
    pub amount: u64,
    #[serde(rename = "SharePct")]
    #[tabled(rename = "SharePct")]
    pub share_pct: String,
}
