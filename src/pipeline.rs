// Stage orchestration.
//
// `process` runs every stage in memory. `run` loads the inputs, writes the
// diagnostics document, and only writes the remaining artifacts once every
// stage has succeeded.

use crate::assembler::{self, PriceTable};
use crate::cleaner::{self, CleanReport, CleanedTables};
use crate::config::PipelineConfig;
use crate::diagnostics::{self, Analysis};
use crate::error::Result;
use crate::ingredients::{self, IngredientCatalog, IngredientUsage};
use crate::loader::{self, Dataset};
use crate::output;
use crate::predictor::{self, PredictionTable};
use crate::reports;
use crate::types::{AssembledTable, PizzaPrice, PizzaType, RawOrder, RawOrderDetail};
use crate::util::format_int;
use crate::weekly::{self, WeeklyCountTable};
use std::path::PathBuf;
use tracing::info;

pub const ANALYSIS_FILE: &str = "analysis_dataframes.json";
pub const ORDERS_FILE: &str = "clean_orders.csv";
pub const PIZZAS_WEEKS_TYPES_FILE: &str = "pizzas_weeks_types.csv";
pub const PIZZAS_WEEKS_SIZES_FILE: &str = "pizzas_weeks_sizes.csv";
pub const INGREDIENTS_WEEKS_FILE: &str = "ingredients_weeks.csv";
pub const INGREDIENT_TOTALS_FILE: &str = "ingredient_totals.csv";
pub const PREDICTIONS_CSV_FILE: &str = "predictions.csv";
pub const PREDICTIONS_JSON_FILE: &str = "predictions.json";
pub const MONTHLY_INCOME_FILE: &str = "monthly_income.csv";
pub const WEEKLY_ORDERS_FILE: &str = "weekly_orders.csv";
pub const PIZZA_SIZES_FILE: &str = "pizza_sizes.csv";
pub const CATEGORY_SHARES_FILE: &str = "category_shares.csv";

#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub clean_report: CleanReport,
    pub orders: AssembledTable,
    pub weekly_types: WeeklyCountTable,
    pub weekly_sizes: WeeklyCountTable,
    pub ingredients: IngredientUsage,
    pub predictions: PredictionTable,
    pub pizza_types: Vec<PizzaType>,
}

/// Clean, assemble, aggregate and predict, all in memory.
pub fn process(dataset: &Dataset) -> Result<PipelineOutput> {
    let raw_orders: Vec<RawOrder> = dataset.orders.data.deserialize()?;
    let raw_details: Vec<RawOrderDetail> = dataset.order_details.data.deserialize()?;
    let prices: Vec<PizzaPrice> = dataset.pizzas.data.deserialize()?;
    let pizza_types: Vec<PizzaType> = dataset.pizza_types.data.deserialize()?;

    let CleanedTables {
        orders,
        order_details,
        report,
    } = cleaner::clean(&raw_orders, &raw_details)?;
    info!(
        invalid_quantities = report.invalid_quantities,
        repaired_item_ids = report.repaired_item_ids,
        unparseable_dates = report.unparseable_dates,
        unparseable_times = report.unparseable_times,
        filled_cells = report.filled_cells,
        "cleaned orders and order details"
    );

    let price_table = PriceTable::from_rows(&prices);
    let assembled = assembler::assemble_orders(&orders, &order_details, &price_table)?;
    info!("assembled {} orders", format_int(assembled.len()));
    let assembled = assembler::describe(assembled, &dataset.dictionary);

    let weekly_types = weekly::weekly_item_counts(&assembled.data, false);
    let weekly_sizes = weekly::weekly_item_counts(&assembled.data, true);
    info!(
        weeks = weekly_types.weeks().count(),
        pizza_types = weekly_types.category_count(),
        pizza_sizes = weekly_sizes.category_count(),
        "aggregated pizzas per week"
    );

    let catalog = IngredientCatalog::from_pizza_types(&pizza_types);
    let usage = ingredients::resolve_ingredients(&assembled.data, &catalog)?;
    info!(
        catalog = catalog.len(),
        ingredients = usage.totals.len(),
        "resolved ingredients per week"
    );

    let predictions = predictor::predict_next_week(&usage.weekly);

    Ok(PipelineOutput {
        clean_report: report,
        orders: assembled,
        weekly_types,
        weekly_sizes,
        ingredients: usage,
        predictions,
        pizza_types,
    })
}

/// Write every artifact derived from a successful [`process`] run.
pub fn write_artifacts(cfg: &PipelineConfig, out: &PipelineOutput) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(&cfg.output_dir)?;
    let mut written = Vec::new();
    let mut path = |name: &str| {
        let p = cfg.output_path(name);
        written.push(p.clone());
        p
    };

    output::write_csv(&path(ORDERS_FILE), &assembler::order_rows(&out.orders.data))?;
    output::write_weekly_csv(&path(PIZZAS_WEEKS_TYPES_FILE), &out.weekly_types)?;
    output::write_weekly_csv(&path(PIZZAS_WEEKS_SIZES_FILE), &out.weekly_sizes)?;
    output::write_weekly_csv(&path(INGREDIENTS_WEEKS_FILE), &out.ingredients.weekly)?;
    output::write_csv(
        &path(INGREDIENT_TOTALS_FILE),
        &ingredients::total_rows(&out.ingredients.totals),
    )?;
    output::write_csv(
        &path(PREDICTIONS_CSV_FILE),
        &predictor::prediction_rows(&out.predictions),
    )?;
    output::write_json(
        &path(PREDICTIONS_JSON_FILE),
        &predictor::prediction_document(&out.predictions),
    )?;
    output::write_csv(
        &path(MONTHLY_INCOME_FILE),
        &reports::monthly_income(&out.orders.data),
    )?;
    output::write_csv(
        &path(WEEKLY_ORDERS_FILE),
        &reports::weekly_orders(&out.orders.data),
    )?;
    output::write_csv(&path(PIZZA_SIZES_FILE), &reports::pizza_sizes(&out.weekly_sizes))?;
    output::write_csv(
        &path(CATEGORY_SHARES_FILE),
        &reports::category_shares(&out.weekly_types, &out.pizza_types),
    )?;

    Ok(written)
}

pub fn write_analysis(cfg: &PipelineConfig, dataset: &Dataset) -> Result<Analysis> {
    let analysis = diagnostics::analyze(dataset.tables());
    std::fs::create_dir_all(&cfg.output_dir)?;
    output::write_json(&cfg.output_path(ANALYSIS_FILE), &analysis)?;
    Ok(analysis)
}

/// Print console previews of the main tables.
pub fn preview(cfg: &PipelineConfig, out: &PipelineOutput) {
    let display = &cfg.display;
    let order_rows = assembler::order_rows(&out.orders.data);
    output::preview_table("Summed orders", &order_rows, display);
    output::preview_weekly("Pizzas per week", &out.weekly_types, display);
    output::preview_table(
        "Total amount of ingredients",
        &ingredients::total_rows(&out.ingredients.totals),
        display,
    );
    output::preview_weekly("Ingredients per week", &out.ingredients.weekly, display);

    let mut predictions = predictor::prediction_rows(&out.predictions);
    for row in &mut predictions {
        let factor = 10f64.powi(display.precision as i32);
        row.amount = (row.amount * factor).round() / factor;
    }
    output::preview_table("Next week prediction", &predictions, display);
}

pub fn run(cfg: &PipelineConfig) -> Result<PipelineOutput> {
    info!(data_dir = %cfg.data_dir.display(), "loading input tables");
    let dataset = loader::load_dataset(cfg)?;

    let analysis = write_analysis(cfg, &dataset)?;
    info!(tables = analysis.tables.len(), "wrote {}", ANALYSIS_FILE);

    let out = process(&dataset)?;
    let written = write_artifacts(cfg, &out)?;
    info!(
        files = written.len(),
        out_dir = %cfg.output_dir.display(),
        "wrote artifacts"
    );
    preview(cfg, &out);
    Ok(out)
}
