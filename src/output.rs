// CSV/JSON writers, the weekly table reader and console previews.
use crate::config::DisplayOptions;
use crate::error::{Error, Result};
use crate::weekly::{week_label, WeeklyCountTable};
use csv::{ReaderBuilder, Writer};
use serde::Serialize;
use std::path::Path;
use tabled::{builder::Builder, settings::Style, Table, Tabled};

/// Index column of persisted weekly tables.
pub const WEEK_COLUMN: &str = "week";

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

/// One row per week, `week` first, then one column per category.
pub fn write_weekly_csv(path: &Path, table: &WeeklyCountTable) -> Result<()> {
    let mut wtr = Writer::from_path(path)?;
    let mut header = vec![WEEK_COLUMN.to_string()];
    header.extend(table.categories().map(str::to_string));
    wtr.write_record(&header)?;
    for (week, row) in table.rows() {
        let mut record = vec![week_label(week)];
        record.extend(row.values().map(u64::to_string));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn read_weekly_csv(path: &Path) -> Result<WeeklyCountTable> {
    let mut rdr = ReaderBuilder::new().from_path(path)?;
    let headers = rdr.headers()?.clone();
    if headers.get(0) != Some(WEEK_COLUMN) {
        return Err(Error::load(path, "first column must be `week`"));
    }
    let categories: Vec<String> = headers.iter().skip(1).map(str::to_string).collect();

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let week = parse_cell::<u32>(path, record.get(0))?;
        let counts = record
            .iter()
            .skip(1)
            .map(|cell| parse_cell::<u64>(path, Some(cell)))
            .collect::<Result<Vec<u64>>>()?;
        rows.push((week, counts));
    }
    Ok(WeeklyCountTable::from_grid(categories, rows))
}

fn parse_cell<T: std::str::FromStr>(path: &Path, cell: Option<&str>) -> Result<T> {
    let cell = cell.unwrap_or_default().trim();
    cell.parse::<T>()
        .map_err(|_| Error::load(path, format!("`{}` is not a count", cell)))
}

/// Print a titled markdown preview of the first rows.
pub fn preview_table<T>(title: &str, rows: &[T], display: &DisplayOptions)
where
    T: Tabled + Clone,
{
    if !display.enabled {
        return;
    }
    println!("\n{}\n", title);
    let slice: Vec<T> = rows.iter().take(display.max_rows).cloned().collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}", table_str);
    print_elided(rows.len(), display.max_rows);
}

/// Print a weekly pivot limited to the first `max_columns` categories.
pub fn preview_weekly(title: &str, table: &WeeklyCountTable, display: &DisplayOptions) {
    if !display.enabled {
        return;
    }
    println!("\n{}\n", title);
    if table.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let shown: Vec<&str> = table.categories().take(display.max_columns).collect();
    let mut builder = Builder::default();
    let mut header = vec![WEEK_COLUMN.to_string()];
    header.extend(shown.iter().map(|c| c.to_string()));
    if table.category_count() > shown.len() {
        header.push("...".to_string());
    }
    builder.push_record(header);

    for (week, row) in table.rows().take(display.max_rows) {
        let mut record = vec![week_label(week)];
        record.extend(
            shown
                .iter()
                .map(|c| row.get(*c).copied().unwrap_or(0).to_string()),
        );
        if table.category_count() > shown.len() {
            record.push("...".to_string());
        }
        builder.push_record(record);
    }
    println!("{}", builder.build().with(Style::markdown()));
    print_elided(table.weeks().count(), display.max_rows);
}

fn print_elided(total: usize, shown: usize) {
    if total > shown {
        println!("({} more rows)\n", total - shown);
    } else {
        println!();
    }
}
