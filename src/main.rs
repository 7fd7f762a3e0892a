//! RustSense CLI - train a next-day direction classifier and query it.
//!
//! The model lives only for the duration of the process, so `train` takes
//! the tickers to predict in the same run.
//!
//! # Usage
//! ```sh
//! PRICE_PROVIDER=alpaca cargo run -- train AAPL MSFT --start 2023-01-01 --end 2024-01-01 --predict AAPL
//! cargo run -- popular
//! ```

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rustsense::application::ml::DirectionModelService;
use rustsense::config::Config;
use rustsense::domain::catalog::POPULAR_STOCKS;
use rustsense::domain::ml::TrainRequest;
use rustsense::infrastructure::PriceProviderFactory;
use tracing::{Level, info};
use tracing_subscriber::prelude::*;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fit a classifier on the given tickers, then optionally predict
    Train {
        /// Tickers to train on (case and surrounding spaces are ignored)
        #[arg(required = true)]
        tickers: Vec<String>,

        /// First day of history (YYYY-MM-DD), defaults to DEFAULT_START_DATE
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Last day of history (YYYY-MM-DD), defaults to DEFAULT_END_DATE
        #[arg(long)]
        end: Option<NaiveDate>,

        /// Tickers to predict after training
        #[arg(long, num_args = 1..)]
        predict: Vec<String>,
    },
    /// List the popular tickers
    Popular,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stdout_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Popular => {
            let json = serde_json::to_string_pretty(POPULAR_STOCKS)
                .context("Failed to serialize ticker list")?;
            println!("{}", json);
        }
        Command::Train {
            tickers,
            start,
            end,
            predict,
        } => {
            let config = Config::from_env()?;
            info!(
                "RustSense {} starting (provider={:?})",
                env!("CARGO_PKG_VERSION"),
                config.provider.kind
            );

            let provider = PriceProviderFactory::create(&config.provider)?;
            let service = DirectionModelService::new(provider, config.model.service_config());

            let request = TrainRequest::new(
                tickers,
                start.unwrap_or(config.default_start_date),
                end.unwrap_or(config.default_end_date),
            );
            let summary = service.train(&request).await?;
            println!(
                "{}",
                serde_json::to_string_pretty(&summary).context("Failed to serialize summary")?
            );

            for ticker in predict {
                let prediction = service.predict_next(&ticker)?;
                println!(
                    "{}",
                    serde_json::to_string_pretty(&prediction)
                        .context("Failed to serialize prediction")?
                );
            }
        }
    }

    Ok(())
}
