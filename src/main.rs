// src/main.rs
mod converters;
mod edgar;
mod pipeline;
mod storage;
mod utils;

use clap::{ArgGroup, Parser};
use edgar::client::{ClientConfig, SecClient};
use edgar::resolver::CompanyTarget;
use pipeline::Pipeline;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use storage::StorageManager;
use utils::config::AppConfig;
use utils::AppError;

/// Fetch a company's latest 10-K from SEC EDGAR and archive it as HTML, text and PDF.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(group(ArgGroup::new("company").required(true).args(["ticker", "cik"])))]
struct Args {
    /// Company ticker, e.g. AAPL
    #[arg(long)]
    ticker: Option<String>,

    /// Company CIK (10 digits or not), e.g. 320193 or 0000320193
    #[arg(long)]
    cik: Option<String>,

    /// SEC requires a real User-Agent with contact info (email)
    #[arg(long)]
    user_agent: String,

    /// Output directory
    #[arg(long, default_value = "output")]
    out: String,

    /// Logging level: DEBUG, INFO, WARNING, ERROR (RUST_LOG takes precedence)
    #[arg(long, default_value = "INFO")]
    log_level: String,

    /// Only accept the primary form type, never an amendment
    #[arg(long)]
    no_amended_fallback: bool,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// Retries after the first attempt for rate-limited or failing requests
    #[arg(long, default_value_t = 3)]
    max_retries: u32,

    /// First backoff delay in seconds, doubled on every retry
    #[arg(long, default_value_t = 0.8)]
    backoff_base_secs: f64,

    /// Upper bound in seconds for any backoff delay, including Retry-After hints
    #[arg(long, default_value_t = 10.0)]
    backoff_max_secs: f64,
}

impl Args {
    fn target(&self) -> Result<CompanyTarget, AppError> {
        match (&self.ticker, &self.cik) {
            (Some(ticker), None) => Ok(CompanyTarget::Ticker(ticker.clone())),
            (None, Some(cik)) => Ok(CompanyTarget::Cik(cik.clone())),
            _ => Err(AppError::Config("exactly one of --ticker or --cik is required".to_string())),
        }
    }

    fn client_config(&self) -> Result<ClientConfig, AppError> {
        let secs = |flag: &str, value: f64| {
            Duration::try_from_secs_f64(value)
                .map_err(|e| AppError::Config(format!("{} must be a non-negative number of seconds: {}", flag, e)))
        };
        Ok(ClientConfig::new(self.user_agent.clone())
            .with_timeout(Duration::from_secs(self.timeout_secs))
            .with_max_retries(self.max_retries)
            .with_backoff(
                secs("--backoff-base-secs", self.backoff_base_secs)?,
                secs("--backoff-max-secs", self.backoff_max_secs)?,
            ))
    }
}

/// What the operator sees when the run fails.
fn failure_message(err: &AppError) -> String {
    format!("Error: {}", err)
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // 1. Setup Logging (RUST_LOG wins over --log-level)
    utils::logging::setup_logging(&args.log_level);
    tracing::info!("Starting SEC 10-K fetch");
    tracing::debug!("Args: {:?}", args);

    match run(&args).await {
        Ok(out_dir) => {
            tracing::info!("Output written to {}", out_dir.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", failure_message(&e));
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &Args) -> Result<PathBuf, AppError> {
    // 2. Environment configuration, read once
    let config = AppConfig::from_env()?;
    let target = args.target()?;

    // 3. One HTTP client for the whole run
    let client = SecClient::new(args.client_config()?)?;

    // 4. Run the pipeline
    let storage = StorageManager::new(&args.out)?;
    let pipeline = Pipeline::new(&client, &config, !args.no_amended_fallback, storage);
    pipeline.run(&target).await
}
