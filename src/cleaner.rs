// Repairs malformed cells of the `orders` and `order_details` tables.
//
// Quantity and identifier repairs turn bad cells into missing values or
// canonical text; dates and times are parsed leniently. Whatever is still
// missing afterwards is filled positionally: both tables are sorted by their
// natural key and every column is filled forward, then backward for leading
// gaps. That fill assumes neighbours in key order carry the right value,
// which is a heuristic and not a statistical imputation.

use crate::error::{Error, Result};
use crate::types::{CleanOrder, CleanOrderDetail, RawOrder, RawOrderDetail};
use crate::util::{parse_date_lenient, parse_id, parse_quantity, parse_time_lenient};
use chrono::{NaiveDate, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;

static SEPARATOR_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s-]+").expect("separator pattern is valid"));

/// Digits typed in place of letters in item identifiers.
const LETTER_SUBSTITUTES: [(char, char); 3] = [('@', 'a'), ('0', 'o'), ('3', 'e')];

/// Counters describing what the cleaner had to repair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanReport {
    pub invalid_quantities: usize,
    pub repaired_item_ids: usize,
    pub unparseable_dates: usize,
    pub unparseable_times: usize,
    pub filled_cells: usize,
}

#[derive(Debug, Clone)]
pub struct CleanedTables {
    pub orders: Vec<CleanOrder>,
    pub order_details: Vec<CleanOrderDetail>,
    pub report: CleanReport,
}

/// Canonical item identifier: letter substitutes reversed, each run of
/// whitespace or hyphens replaced by one underscore.
pub fn repair_item_id(raw: &str) -> String {
    let letters: String = raw
        .chars()
        .map(|c| {
            LETTER_SUBSTITUTES
                .iter()
                .find(|(from, _)| *from == c)
                .map_or(c, |(_, to)| *to)
        })
        .collect();
    SEPARATOR_RUN.replace_all(&letters, "_").into_owned()
}

pub fn clean(orders: &[RawOrder], order_details: &[RawOrderDetail]) -> Result<CleanedTables> {
    let mut report = CleanReport::default();
    let orders = clean_orders(orders, &mut report)?;
    let order_details = clean_order_details(order_details, &mut report)?;
    Ok(CleanedTables {
        orders,
        order_details,
        report,
    })
}

struct OrderCells {
    order_id: Option<u64>,
    date: Option<NaiveDate>,
    time: Option<NaiveTime>,
}

pub fn clean_orders(raw: &[RawOrder], report: &mut CleanReport) -> Result<Vec<CleanOrder>> {
    let mut rows: Vec<OrderCells> = raw
        .iter()
        .map(|r| {
            let date = parse_date_lenient(r.date.as_deref());
            if date.is_none() && r.date.as_deref().is_some_and(|s| !s.trim().is_empty()) {
                report.unparseable_dates += 1;
            }
            let time = parse_time_lenient(r.time.as_deref());
            if time.is_none() && r.time.as_deref().is_some_and(|s| !s.trim().is_empty()) {
                report.unparseable_times += 1;
            }
            OrderCells {
                order_id: parse_id(r.order_id.as_deref()),
                date,
                time,
            }
        })
        .collect();

    rows.sort_by_key(|r| (r.order_id.is_none(), r.order_id));

    report.filled_cells += fill_column(&mut rows, |r| &mut r.order_id);
    report.filled_cells += fill_column(&mut rows, |r| &mut r.date);
    report.filled_cells += fill_column(&mut rows, |r| &mut r.time);

    rows.into_iter()
        .map(|r| {
            Ok(CleanOrder {
                order_id: r.order_id.ok_or_else(|| empty_column("orders", "order_id"))?,
                date: r.date.ok_or_else(|| empty_column("orders", "date"))?,
                time: r.time.ok_or_else(|| empty_column("orders", "time"))?,
            })
        })
        .collect()
}

struct DetailCells {
    order_details_id: Option<u64>,
    order_id: Option<u64>,
    pizza_id: Option<String>,
    quantity: Option<u32>,
}

pub fn clean_order_details(
    raw: &[RawOrderDetail],
    report: &mut CleanReport,
) -> Result<Vec<CleanOrderDetail>> {
    let mut rows: Vec<DetailCells> = raw
        .iter()
        .map(|r| {
            let quantity = parse_quantity(r.quantity.as_deref());
            if quantity.is_none() {
                report.invalid_quantities += 1;
            }
            let pizza_id = r.pizza_id.as_deref().map(|raw_id| {
                let repaired = repair_item_id(raw_id);
                if repaired != raw_id {
                    report.repaired_item_ids += 1;
                }
                repaired
            });
            DetailCells {
                order_details_id: parse_id(r.order_details_id.as_deref()),
                order_id: parse_id(r.order_id.as_deref()),
                pizza_id,
                quantity,
            }
        })
        .collect();

    rows.sort_by_key(|r| {
        (
            r.order_id.is_none(),
            r.order_id,
            r.order_details_id.is_none(),
            r.order_details_id,
        )
    });

    report.filled_cells += fill_column(&mut rows, |r| &mut r.order_details_id);
    report.filled_cells += fill_column(&mut rows, |r| &mut r.order_id);
    report.filled_cells += fill_column(&mut rows, |r| &mut r.pizza_id);
    report.filled_cells += fill_column(&mut rows, |r| &mut r.quantity);

    rows.into_iter()
        .map(|r| {
            Ok(CleanOrderDetail {
                order_details_id: r
                    .order_details_id
                    .ok_or_else(|| empty_column("order_details", "order_details_id"))?,
                order_id: r
                    .order_id
                    .ok_or_else(|| empty_column("order_details", "order_id"))?,
                pizza_id: r
                    .pizza_id
                    .ok_or_else(|| empty_column("order_details", "pizza_id"))?,
                quantity: r
                    .quantity
                    .ok_or_else(|| empty_column("order_details", "quantity"))?,
            })
        })
        .collect()
}

/// Fill missing cells of one column forward, then fill the leading gap
/// backward from the first present value. Returns the number of cells filled.
fn fill_column<R, T: Clone>(rows: &mut [R], mut cell: impl FnMut(&mut R) -> &mut Option<T>) -> usize {
    let mut filled = 0;
    let mut last: Option<T> = None;
    for row in rows.iter_mut() {
        let slot = cell(row);
        if slot.is_some() {
            last = slot.clone();
        } else if last.is_some() {
            *slot = last.clone();
            filled += 1;
        }
    }

    let first = rows.iter_mut().find_map(|row| cell(row).clone());
    if let Some(value) = first {
        for row in rows.iter_mut() {
            let slot = cell(row);
            if slot.is_some() {
                break;
            }
            *slot = Some(value.clone());
            filled += 1;
        }
    }
    filled
}

fn empty_column(table: &str, column: &str) -> Error {
    Error::EmptyColumn {
        table: table.to_string(),
        column: column.to_string(),
    }
}
