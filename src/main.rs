//! txfeed main entry point

use anyhow::{bail, Context};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::runtime::Runtime;

use txfeed_config::{Config, ConfigError};
use txfeed_core::{Employee, Feed, Selection};
use txfeed_mock::MockApi;
use txfeed_utils::{employee_label, format_number, transaction_row};

#[derive(Parser, Debug)]
#[command(name = "txfeed")]
#[command(version = "0.1.0")]
#[command(about = "Browse a paginated, employee-filterable transaction feed", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Fixture file, overrides data.fixture from the config
    #[arg(short, long)]
    fixture: Option<PathBuf>,

    /// Show only this employee's transactions
    #[arg(short, long)]
    employee: Option<String>,

    /// Press "load more" up to this many times
    #[arg(short, long, default_value_t = 0)]
    load_more: usize,

    /// Print the feed snapshot as JSON
    #[arg(long)]
    json: bool,

    /// Print the default configuration and exit
    #[arg(long)]
    print_default_config: bool,
}

/// A missing config file is not fatal; the error is handed back so it can be
/// logged once logging is up
fn load_config(path: &Path) -> anyhow::Result<(Config, Option<ConfigError>)> {
    match Config::load(path) {
        Ok(config) => Ok((config, None)),
        Err(e @ ConfigError::FileNotFound { .. }) => Ok((Config::default(), Some(e))),
        Err(e) => bail!("{}", e.to_details()),
    }
}

fn init_logging(level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.print_default_config {
        print!("{}", Config::generate_default());
        return Ok(());
    }

    let (config, missing) = load_config(&args.config)?;
    init_logging(&config.logging.level);
    if let Some(e) = missing {
        log::warn!("{}; using defaults", e);
    }

    let base = args
        .config
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let fixture = args.fixture.clone().unwrap_or_else(|| config.fixture_path(base));

    let rt = Runtime::new()?;
    rt.block_on(run(args, config, fixture))
}

async fn run(args: Args, config: Config, fixture: PathBuf) -> anyhow::Result<()> {
    let api = MockApi::load(&fixture, &config.mock)
        .await
        .with_context(|| format!("Failed to load fixture {}", fixture.display()))?;
    let feed = Arc::new(Feed::new(Arc::new(api)));

    feed.initialize().await.map_err(|e| anyhow::anyhow!("{}", e.to_details()))?;

    if let Some(id) = args.employee.as_deref() {
        let selection = match feed.find_employee(id) {
            Some(employee) => Selection::from_employee(Some(&employee)),
            None => {
                log::warn!("Employee {} is not in the directory", id);
                Selection::Employee(id.to_string())
            }
        };
        feed.select(selection)
            .await
            .map_err(|e| anyhow::anyhow!("{}", e.to_details()))?;
    }

    for _ in 0..args.load_more {
        if !feed.has_more_data() {
            log::info!("Nothing more to load");
            break;
        }
        feed.load_more().await.map_err(|e| anyhow::anyhow!("{}", e.to_details()))?;
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&feed.snapshot())?);
        return Ok(());
    }

    let snapshot = feed.snapshot();
    let filter = match snapshot.selection.employee_id() {
        None => employee_label(&Employee::all_employees()),
        Some(id) => feed
            .find_employee(id)
            .map(|employee| employee_label(&employee))
            .unwrap_or_else(|| id.to_string()),
    };
    println!("Employee: {}", filter);
    println!(
        "Employees: {}",
        snapshot.employees.iter().map(employee_label).collect::<Vec<_>>().join(", ")
    );
    println!();
    for transaction in &snapshot.transactions {
        println!("{}", transaction_row(transaction));
    }
    println!();
    println!(
        "{} transactions{}",
        format_number(snapshot.transactions.len()),
        if snapshot.has_more_data { " (more available)" } else { "" }
    );

    Ok(())
}
