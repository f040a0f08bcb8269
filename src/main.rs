// Entry point: parse the command line, set up logging and run the pipeline
// once over the input directory.
use anyhow::{Context, Result};
use clap::Parser;
use pizza_report::config::{DisplayOptions, PipelineConfig};
use pizza_report::pipeline;
use pizza_report::util::format_number;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "pizza_report", version, about = "Weekly pizza and ingredient report")]
struct Cli {
    /// Directory holding the input CSV files
    #[arg(long, env = "PIZZA_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    /// Directory the processed tables are written to
    #[arg(long, env = "PIZZA_OUT_DIR", default_value = "processed_data")]
    out_dir: PathBuf,

    /// Rows shown per console preview
    #[arg(long, default_value_t = 15)]
    max_rows: usize,

    /// Category columns shown for weekly tables
    #[arg(long, default_value_t = 5)]
    max_columns: usize,

    /// Decimal places in previews
    #[arg(long, default_value_t = 3)]
    precision: usize,

    /// Skip console previews
    #[arg(long)]
    no_preview: bool,
}

impl Cli {
    fn into_config(self) -> PipelineConfig {
        let mut cfg = PipelineConfig::new(self.data_dir, self.out_dir);
        cfg.display = DisplayOptions {
            max_rows: self.max_rows,
            max_columns: self.max_columns,
            precision: self.precision,
            enabled: !self.no_preview,
        };
        cfg
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cfg = Cli::parse().into_config();
    info!(
        "Starting pizza_report v{} (data: {}, output: {})",
        env!("CARGO_PKG_VERSION"),
        cfg.data_dir.display(),
        cfg.output_dir.display()
    );

    let out = pipeline::run(&cfg).context("report pipeline failed")?;

    let income: f64 = out.orders.data.iter().map(|o| o.total_price).sum();
    info!(
        "Done: {} orders, {} income, {} ingredients predicted",
        out.orders.data.len(),
        format_number(income, 2),
        out.predictions.len()
    );
    Ok(())
}
