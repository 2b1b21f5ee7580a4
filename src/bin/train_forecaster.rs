//! Offline trainer producing the artifacts consumed by the server.
//!
//! Reads a CSV of daily closes, fits the min-max scaler, trains a random
//! forest on `look_back` lagged values and writes model, scaler and metadata
//! files into the output directory.

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use clap::Parser;
use pricecast::application::training::{
    build_supervised_windows, chronological_split, evaluate_forecast,
};
use pricecast::domain::metadata::ModelMetadata;
use pricecast::domain::scaler::MinMaxScaler;
use pricecast::infrastructure::artifacts::{ArtifactPaths, write_json};
use pricecast::infrastructure::forest_model::{ForestForecastModel, ForestParams};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use tracing::{Level, info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a CSV of historical prices
    #[arg(long)]
    input: PathBuf,

    /// Column holding the closing price
    #[arg(long, default_value = "Close")]
    price_column: String,

    /// Optional column holding the observation date (YYYY-MM-DD)
    #[arg(long, default_value = "Date")]
    date_column: String,

    /// Ticker recorded in the metadata
    #[arg(long)]
    symbol: Option<String>,

    /// Directory receiving the artifacts
    #[arg(long, default_value = "model_artifacts")]
    output_dir: PathBuf,

    /// Number of trailing observations per sample
    #[arg(long, default_value_t = 60)]
    look_back: usize,

    /// Share of samples used for training (chronological split)
    #[arg(long, default_value_t = 0.8)]
    train_ratio: f64,

    /// Number of trees in the random forest
    #[arg(long, default_value_t = 100)]
    n_trees: usize,

    /// Maximum depth of trees
    #[arg(long, default_value_t = 10)]
    max_depth: u16,

    /// Minimum samples required to split an internal node
    #[arg(long, default_value_t = 5)]
    min_split: usize,
}

struct PriceSeries {
    closes: Vec<f64>,
    first_date: Option<NaiveDate>,
    last_date: Option<NaiveDate>,
}

fn read_prices(args: &Args) -> Result<PriceSeries> {
    let file = File::open(&args.input)
        .with_context(|| format!("Failed to open {:?}", args.input))?;
    let mut rdr = csv::Reader::from_reader(BufReader::new(file));

    let headers = rdr.headers()?.clone();
    let price_idx = headers
        .iter()
        .position(|h| h.trim() == args.price_column)
        .with_context(|| format!("Column {:?} not found in {:?}", args.price_column, headers))?;
    let date_idx = headers.iter().position(|h| h.trim() == args.date_column);

    let mut closes = Vec::new();
    let mut dates = Vec::new();
    let mut skipped = 0usize;

    for record in rdr.records() {
        let record = record?;
        match record.get(price_idx).map(|v| v.trim().parse::<f64>()) {
            Some(Ok(price)) if price.is_finite() => closes.push(price),
            _ => {
                skipped += 1;
                continue;
            }
        }
        if let Some(date) = date_idx
            .and_then(|idx| record.get(idx))
            .and_then(|raw| NaiveDate::parse_from_str(raw.trim().get(..10)?, "%Y-%m-%d").ok())
        {
            dates.push(date);
        }
    }

    if skipped > 0 {
        warn!("Skipped {} rows without a numeric {}", skipped, args.price_column);
    }

    Ok(PriceSeries {
        closes,
        first_date: dates.first().copied(),
        last_date: dates.last().copied(),
    })
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let args = Args::parse();
    if args.look_back == 0 {
        bail!("--look-back must be at least 1");
    }

    let series = read_prices(&args)?;
    info!("Loaded {} closing prices from {:?}", series.closes.len(), args.input);

    let scaler = MinMaxScaler::fit(&series.closes)?;
    let scaled = scaler.transform(&series.closes);

    let (x, y) = build_supervised_windows(&scaled, args.look_back);
    if x.len() < 2 {
        bail!(
            "Need more than {} prices to train with look_back={}, got {}",
            args.look_back + 1,
            args.look_back,
            series.closes.len()
        );
    }

    let (x_train, x_test) = chronological_split(&x, args.train_ratio);
    let (y_train, y_test) = chronological_split(&y, args.train_ratio);
    if x_train.is_empty() {
        bail!("Training split is empty; increase --train-ratio");
    }
    info!("Training on {} samples, testing on {}", x_train.len(), x_test.len());

    let params = ForestParams {
        n_trees: args.n_trees,
        max_depth: args.max_depth,
        min_split: args.min_split,
    };
    let model = ForestForecastModel::train(&x_train, &y_train, params)?;

    let mut metadata = ModelMetadata::new(args.look_back);
    metadata.stock_symbol = args.symbol.clone();
    metadata.start_date = series.first_date;
    metadata.end_date = series.last_date;

    if x_test.is_empty() {
        warn!("Test split is empty; metadata will carry no metrics");
    } else {
        let predicted = scaler.inverse_transform(&model.predict_batch(&x_test)?);
        let actual = scaler.inverse_transform(&y_test);
        if let Some(metrics) = evaluate_forecast(&actual, &predicted) {
            info!(
                "MAE: {:.2} | RMSE: {:.2} | MAPE: {:.2}%",
                metrics.mae, metrics.rmse, metrics.mape
            );
            metadata.metrics = metrics.to_metadata();
        }
    }

    let paths = ArtifactPaths::in_dir(
        &args.output_dir,
        "forest_model.json",
        "scaler.json",
        "metadata.json",
    );
    model.save(&paths.model)?;
    write_json(&paths.scaler, &scaler)?;
    write_json(&paths.metadata, &metadata)?;

    info!(
        "Artifacts written to {:?}. Serve with MODEL_DIR={:?} MODEL_FILE=forest_model.json",
        args.output_dir, args.output_dir
    );
    Ok(())
}
