//! BreachLab CLI — disclosure listing, price fetch, and stock analysis.
//!
//! Commands:
//! - `companies` — list the companies in the store, optionally exporting them
//! - `disclosures` — list disclosure dates and export the per-company summary
//! - `stocks` — join stock prices with the Dow Jones index and export
//! - `fetch` — pull daily prices from the market-data API into the store
//! - `dedupe` — remove duplicate stock-data rows
//! - `analyze` — align disclosure dates with the market calendar and export
//! - `about` — describe the tool

use anyhow::{Context, Result};
use breachlab_core::data::{CsvStore, StdoutProgress};
use breachlab_core::domain::CompanyId;
use breachlab_runner::summary::display_date;
use breachlab_runner::{
    fetch_company_prices, run_company_info, run_disclosure_summary, run_duplicate_check,
    run_stock_analysis, run_stock_with_index, AnalysisConfig,
};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

const ABOUT: &str = "Correlates database-related disclosure events of publicly traded \
companies with their stock prices. Each disclosure date is checked against the market \
calendar; closed days are explained and paired with the next trading day, open days are \
matched with that day's opening and closing prices.";

#[derive(Parser)]
#[command(
    name = "breachlab",
    about = "BreachLab CLI — disclosure dates against the market calendar"
)]
struct Cli {
    /// Path to a TOML config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Data directory; overrides the config file.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List companies.
    Companies {
        /// Also export the list to the workbook.
        #[arg(long, default_value_t = false)]
        export: bool,
    },
    /// List disclosure dates and export the per-company summary.
    Disclosures,
    /// Join daily stock prices with the Dow Jones index and export the sheet.
    Stocks {
        /// Limit to these company ids (e.g., --ids 1,2,3).
        #[arg(long, value_delimiter = ',')]
        ids: Option<Vec<CompanyId>>,
    },
    /// Fetch daily prices for stored companies from the market-data API.
    Fetch {
        /// Limit to these company ids (e.g., --ids 1,2,3).
        #[arg(long, value_delimiter = ',')]
        ids: Option<Vec<CompanyId>>,

        /// Start date (YYYY-MM-DD). Defaults to 14 days ago.
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        end: Option<String>,

        /// Extra API keys added to the configured pool.
        #[arg(long = "api-key")]
        api_keys: Vec<String>,
    },
    /// Remove duplicate stock-data rows.
    Dedupe,
    /// Align disclosure dates with the market calendar and export the workbook.
    Analyze {
        /// Align on all cores.
        #[arg(long, default_value_t = false)]
        parallel: bool,
    },
    /// Describe the tool.
    About,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => AnalysisConfig::from_file(path)
            .with_context(|| format!("load config {}", path.display()))?,
        None => AnalysisConfig::default(),
    };
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    tracing::debug!(
        data_dir = %config.data_dir.display(),
        output_dir = %config.output_dir.display(),
        "resolved configuration"
    );

    match cli.command {
        Commands::Companies { export } => run_companies(&config, export),
        Commands::Stocks { ids } => run_stocks(&config, ids),
        Commands::Disclosures => run_disclosures(&config),
        Commands::Fetch {
            ids,
            start,
            end,
            api_keys,
        } => run_fetch(&config, ids, start, end, api_keys),
        Commands::Dedupe => run_dedupe(&config),
        Commands::Analyze { parallel } => {
            config.parallel |= parallel;
            run_analyze(&config)
        }
        Commands::About => {
            println!("{ABOUT}");
            Ok(())
        }
    }
}

fn run_companies(config: &AnalysisConfig, export: bool) -> Result<()> {
    let store = CsvStore::new(&config.data_dir);
    let companies = store.companies()?;
    if companies.is_empty() {
        println!("No companies in {}", store.data_dir().display());
        return Ok(());
    }

    println!("{:>4}  {:<32} {:<20} Symbol", "ID", "Name", "Location");
    for c in &companies {
        println!("{:>4}  {:<32} {:<20} {}", c.id, c.name, c.location, c.symbol);
    }
    if export {
        let report = run_company_info(config)?;
        println!("\nCompanies exported to: {}", report.sheet_csv.display());
    }
    Ok(())
}

fn run_stocks(config: &AnalysisConfig, ids: Option<Vec<CompanyId>>) -> Result<()> {
    let report = run_stock_with_index(config, ids.as_deref())?;
    let first = report.rows.first().map(|r| r.date);
    let last = report.rows.last().map(|r| r.date);
    if let (Some(first), Some(last)) = (first, last) {
        println!(
            "Joined {} stock rows with the Dow Jones index ({first} to {last})",
            report.rows.len()
        );
    }
    println!("Sheet: {}", report.sheet_csv.display());
    Ok(())
}

fn run_disclosures(config: &AnalysisConfig) -> Result<()> {
    let report = run_disclosure_summary(config)?;

    println!("Disclosure Dates:");
    for r in &report.disclosures {
        println!(
            "{:>4}  {:<32} {:<8} {}",
            r.company_id,
            r.company_name,
            r.symbol,
            display_date(r.disclosure_date())
        );
    }

    println!("\nDisclosure Dates Analysis:");
    println!("{:>4}  {:<32} {:<8} {:>13}  Most Recent", "ID", "Name", "Symbol", "# Disclosures");
    for s in &report.summaries {
        println!(
            "{:>4}  {:<32} {:<8} {:>13}  {}",
            s.company_id,
            s.company_name,
            s.symbol,
            s.disclosures,
            display_date(s.most_recent)
        );
    }
    println!("\nSummary exported to: {}", report.sheet_csv.display());
    Ok(())
}

fn run_fetch(
    config: &AnalysisConfig,
    ids: Option<Vec<CompanyId>>,
    start: Option<String>,
    end: Option<String>,
    api_keys: Vec<String>,
) -> Result<()> {
    let today = chrono::Local::now().date_naive();
    let from = parse_date(start.as_deref())?.unwrap_or(today - chrono::Duration::days(14));
    let to = parse_date(end.as_deref())?.unwrap_or(today);

    let keys = config.polygon.key_pool();
    for key in api_keys {
        keys.add(key);
    }
    let client = config.polygon.build_client(keys)?;
    let store = CsvStore::new(&config.data_dir);

    let report = fetch_company_prices(&store, &client, ids.as_deref(), from, to, &StdoutProgress)?;
    println!(
        "Appended {} rows for {}/{} companies",
        report.appended, report.succeeded, report.companies
    );
    if !report.failures.is_empty() {
        for (symbol, err) in &report.failures {
            eprintln!("Error for {symbol}: {err}");
        }
        std::process::exit(1);
    }
    Ok(())
}

fn run_dedupe(config: &AnalysisConfig) -> Result<()> {
    let store = CsvStore::new(&config.data_dir);
    let report = run_duplicate_check(&store)?;
    if report.is_clean() {
        println!("No duplicate rows found in {} rows.", report.rows_checked);
        return Ok(());
    }

    println!("Duplicate rows:");
    for g in &report.groups {
        println!(
            "  company {} on {} appears {} times",
            g.record.company_id, g.record.date, g.count
        );
    }
    println!("Removed {} duplicate rows.", report.rows_removed);
    Ok(())
}

fn run_analyze(config: &AnalysisConfig) -> Result<()> {
    let outcome = run_stock_analysis(config)?;
    println!(
        "Aligned {} disclosures into {} rows ({} closed, {} priced, {} without stock data)",
        outcome.disclosures,
        outcome.rows.len(),
        outcome.closed_rows(),
        outcome.priced_rows(),
        outcome.missing_price_rows()
    );
    println!("Sheet: {}", outcome.paths.sheet_csv.display());
    println!("Rows hash: {}", outcome.rows_hash);
    Ok(())
}

fn parse_date(raw: Option<&str>) -> Result<Option<NaiveDate>> {
    raw.map(|s| {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("invalid date '{s}'"))
    })
    .transpose()
}
