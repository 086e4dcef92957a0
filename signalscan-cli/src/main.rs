//! signalscan CLI: scan, resolve, download, order and cache commands.
//!
//! Commands:
//! - `scan`: load a symbol, detect buy signals, store the flat file, render the chart
//! - `resolve`: show close company-name matches
//! - `download`: fetch daily bars from Alpha Vantage and store them
//! - `order buy|cancel|cancel-all`: talk to the Alpaca trading API
//! - `cache status`: list stored symbols

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use signalscan_core::broker::{AlpacaCredentials, AlpacaGateway, OrderGateway, OrderRequest};
use signalscan_core::config::{secret_from_env, AppConfig, ALPHAVANTAGE_KEY_VAR};
use signalscan_core::data::{download_symbols, AlphaVantageProvider, DataProvider, SeriesStore, StdoutProgress};
use signalscan_core::symbols::{CompanyTable, SymbolResolver};
use signalscan_core::domain::normalize_symbol;
use signalscan_runner::{order_from_signal, run_scan, ChartRenderer, HtmlChart, LoadOptions, ScanOutcome, ScanReport, ScanSettings};

#[derive(Parser)]
#[command(name = "signalscan", about = "Daily-bar buy-signal scanner")]
struct Cli {
    /// Path to a TOML config file. Defaults to ./signalscan.toml if present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan one symbol for buy signals.
    Scan {
        /// Ticker to scan.
        #[arg(long, conflicts_with = "company")]
        symbol: Option<String>,

        /// Company name to resolve to a ticker.
        #[arg(long)]
        company: Option<String>,

        /// Offline mode: no network access.
        #[arg(long, default_value_t = false)]
        offline: bool,

        /// Use synthetic data as fallback.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Fetch again even if the symbol is stored.
        #[arg(long, default_value_t = false)]
        force: bool,

        /// First bar to scan (YYYY-MM-DD).
        #[arg(long)]
        start: Option<String>,

        /// Last bar to scan (YYYY-MM-DD).
        #[arg(long)]
        end: Option<String>,

        /// Directory for the HTML chart.
        #[arg(long, default_value = ".")]
        chart_dir: PathBuf,

        /// Skip chart rendering.
        #[arg(long, default_value_t = false)]
        no_chart: bool,
    },
    /// Print up to three close company-name matches.
    Resolve {
        /// Free-text company name.
        name: String,
    },
    /// Fetch daily bars and store them as flat files.
    Download {
        /// Symbols to download (e.g., SPY QQQ AAPL).
        #[arg(required = true)]
        symbols: Vec<String>,

        /// Force re-download even if stored.
        #[arg(long, default_value_t = false)]
        force: bool,
    },
    /// Broker orders.
    Order {
        #[command(subcommand)]
        action: OrderAction,
    },
    /// Flat-file store commands.
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum OrderAction {
    /// Market bracket buy, good till canceled.
    Buy {
        #[arg(long)]
        symbol: String,

        #[arg(long)]
        qty: f64,

        #[arg(long, required_unless_present = "from_signal")]
        take_profit: Option<f64>,

        #[arg(long, required_unless_present = "from_signal")]
        stop_loss: Option<f64>,

        /// Price the bracket from signal N (as numbered by `scan`) of the
        /// stored series, with the configured stop-loss fraction.
        #[arg(long, conflicts_with_all = ["take_profit", "stop_loss"])]
        from_signal: Option<usize>,

        /// Actually submit (without this flag, only previews the request).
        #[arg(long, default_value_t = false)]
        confirm: bool,
    },
    /// Cancel one order by id.
    Cancel { id: String },
    /// Cancel every open order.
    CancelAll {
        /// Actually cancel (without this flag, only previews).
        #[arg(long, default_value_t = false)]
        confirm: bool,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// List stored symbols with date range and bar count.
    Status,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Scan {
            symbol,
            company,
            offline,
            synthetic,
            force,
            start,
            end,
            chart_dir,
            no_chart,
        } => {
            let opts = LoadOptions {
                start: parse_date(start.as_deref())?,
                end: parse_date(end.as_deref())?,
                offline,
                synthetic,
                force,
            };
            let chart_dir = (!no_chart).then_some(chart_dir);
            run_scan_cmd(&config, symbol, company, &opts, chart_dir.as_deref())
        }
        Commands::Resolve { name } => run_resolve(&config, &name),
        Commands::Download { symbols, force } => run_download(&config, &symbols, force),
        Commands::Order { action } => match action {
            OrderAction::Buy {
                symbol,
                qty,
                take_profit,
                stop_loss,
                from_signal,
                confirm,
            } => {
                let symbol = normalize_symbol(&symbol);
                let order = match (from_signal, take_profit, stop_loss) {
                    (Some(index), _, _) => order_from_stored_scan(&config, &symbol, index, qty)?,
                    (None, Some(take_profit), Some(stop_loss)) => {
                        OrderRequest::new(symbol, qty, take_profit, stop_loss)
                    }
                    _ => bail!("pass --take-profit and --stop-loss, or --from-signal"),
                };
                run_order_buy(&config, order, confirm)
            }
            OrderAction::Cancel { id } => run_cancel(&config, &id),
            OrderAction::CancelAll { confirm } => run_cancel_all(&config, confirm),
        },
        Commands::Cache { action } => match action {
            CacheAction::Status => run_cache_status(&config.data.data_dir),
        },
    }
}

fn parse_date(value: Option<&str>) -> Result<Option<NaiveDate>> {
    value
        .map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("invalid date '{s}'")))
        .transpose()
}

fn load_resolver(config: &AppConfig) -> Result<SymbolResolver> {
    let path = &config.data.companies_file;
    let table = CompanyTable::from_file(path)
        .with_context(|| format!("failed to load company table {}", path.display()))?;
    Ok(SymbolResolver::new(table))
}

/// The Alpha Vantage provider, or `None` when no API key is set.
fn provider(config: &AppConfig) -> Result<Option<AlphaVantageProvider>> {
    match secret_from_env(ALPHAVANTAGE_KEY_VAR) {
        Ok(key) => Ok(Some(AlphaVantageProvider::new(key, config.data.output_size)?)),
        Err(e) => {
            tracing::warn!("downloads disabled: {e}");
            Ok(None)
        }
    }
}

fn gateway(config: &AppConfig) -> Result<AlpacaGateway> {
    let credentials = AlpacaCredentials::from_env()?;
    Ok(AlpacaGateway::new(&config.broker.endpoint, &credentials)?)
}

fn run_scan_cmd(
    config: &AppConfig,
    symbol: Option<String>,
    company: Option<String>,
    opts: &LoadOptions,
    chart_dir: Option<&Path>,
) -> Result<()> {
    let symbol = match (symbol, company) {
        (Some(symbol), _) => normalize_symbol(&symbol),
        (None, Some(name)) => match load_resolver(config)?.propose(&name) {
            Some(found) => {
                println!("Resolved '{name}' to {} ({})", found.company, found.symbol);
                found.symbol
            }
            None => bail!("no company close to '{name}'"),
        },
        (None, None) => {
            let resolver = load_resolver(config)?;
            let found = resolver.resolve_interactive(&mut io::stdin().lock(), &mut io::stdout().lock())?;
            found.symbol
        }
    };

    let store = SeriesStore::new(&config.data.data_dir);
    let provider = if opts.offline { None } else { provider(config)? };
    let provider_ref = provider.as_ref().map(|p| p as &dyn DataProvider);
    let settings = ScanSettings {
        indicators: config.indicators,
        signals: config.signals,
    };

    let report = run_scan(&symbol, &store, provider_ref, &settings, opts)?;
    print_report(&report);

    if let Some(dir) = chart_dir {
        let path = HtmlChart::new(dir).render(&symbol, &report.augmented, &report.signals)?;
        println!("Chart written to: {}", path.display());
    }
    Ok(())
}

fn print_report(report: &ScanReport) {
    for (i, signal) in report.signals.iter().enumerate() {
        println!(
            "[{i}] {} Strategy match at {} on date {}",
            signal.strategy.label(),
            signal.trigger_price,
            signal.date
        );
    }

    println!();
    println!("=== Scan Result ===");
    println!("Symbol:         {}", report.symbol());
    println!("Source:         {}", report.source);
    println!(
        "Period:         {} to {}",
        report.augmented.series().first_date(),
        report.augmented.series().last_date()
    );
    println!("Bars:           {}", report.augmented.len());
    println!("Signals:        {}", report.signals.len());
    println!("Dataset hash:   {}", report.dataset_hash);
    if let Some(path) = &report.stored_path {
        println!("Stored at:      {}", path.display());
    }
    if let ScanOutcome::Aborted(err) = &report.outcome {
        println!();
        println!("WARNING: scan incomplete: {err}");
    }
    if report.is_synthetic() {
        println!();
        println!("WARNING: Results based on SYNTHETIC data");
    }
}

fn run_resolve(config: &AppConfig, name: &str) -> Result<()> {
    let resolver = load_resolver(config)?;
    let matches = resolver.candidates(name);
    if matches.is_empty() {
        println!("No close matches for '{name}'.");
        return Ok(());
    }
    for m in matches {
        let symbol = resolver.table().symbol_for(&m.candidate).unwrap_or("?");
        println!("{:<8} {:<40} {:.3}", symbol, m.candidate, m.score);
    }
    Ok(())
}

fn run_download(config: &AppConfig, symbols: &[String], force: bool) -> Result<()> {
    let Some(provider) = provider(config)? else {
        bail!("{ALPHAVANTAGE_KEY_VAR} must be set to download data");
    };
    let store = SeriesStore::new(&config.data.data_dir);
    let sym_refs: Vec<&str> = symbols.iter().map(|s| s.as_str()).collect();

    let summary = download_symbols(&provider, &store, &sym_refs, &config.indicators, force, &StdoutProgress);

    if !summary.all_succeeded() {
        for (sym, err) in &summary.errors {
            eprintln!("Error for {sym}: {err}");
        }
        std::process::exit(1);
    }
    Ok(())
}

/// Rescan the stored series offline and price an order from one of its signals.
fn order_from_stored_scan(config: &AppConfig, symbol: &str, index: usize, qty: f64) -> Result<OrderRequest> {
    let store = SeriesStore::new(&config.data.data_dir);
    let settings = ScanSettings {
        indicators: config.indicators,
        signals: config.signals,
    };
    let opts = LoadOptions {
        offline: true,
        ..Default::default()
    };
    let report = run_scan(symbol, &store, None, &settings, &opts)?;
    if let ScanOutcome::Aborted(err) = &report.outcome {
        tracing::warn!(symbol, "scan incomplete: {err}");
    }
    let order = order_from_signal(&report, index, qty, config.broker.stop_loss_fraction)?;
    if let Some(signal) = report.signals.get(index) {
        println!(
            "Signal [{index}]: {} on {} at {}",
            signal.strategy.label(),
            signal.date,
            signal.trigger_price
        );
    }
    Ok(order)
}

fn run_order_buy(config: &AppConfig, order: OrderRequest, confirm: bool) -> Result<()> {
    if !(order.qty > 0.0) {
        bail!("--qty must be positive");
    }
    let body = order.to_json()?;

    if !confirm {
        println!("{}", serde_json_pretty(&body));
        println!();
        println!("Dry run: pass --confirm to submit.");
        return Ok(());
    }

    let ack = gateway(config)?.submit(&order)?;
    println!("Order {} {}", ack.id, ack.status);
    Ok(())
}

fn run_cancel(config: &AppConfig, id: &str) -> Result<()> {
    gateway(config)?.cancel(id)?;
    println!("Order {id} canceled.");
    Ok(())
}

fn run_cancel_all(config: &AppConfig, confirm: bool) -> Result<()> {
    if !confirm {
        println!("Would cancel every open order at {}.", config.broker.endpoint);
        println!("Dry run: pass --confirm to cancel.");
        return Ok(());
    }
    gateway(config)?.cancel_all()?;
    println!("All open orders canceled.");
    Ok(())
}

fn run_cache_status(data_dir: &Path) -> Result<()> {
    let store = SeriesStore::new(data_dir);
    let stored = store.status()?;

    if stored.is_empty() {
        println!("Store is empty: {}", data_dir.display());
        return Ok(());
    }

    let total_size: u64 = stored.iter().map(|s| s.size_bytes).sum();
    println!("Store: {}", data_dir.display());
    println!("Symbols: {}", stored.len());
    println!("Total size: {}", format_size(total_size));
    println!();
    println!("{:<8} {:<25} {:<12} {:>10}", "Symbol", "Date Range", "Bars", "Size");
    println!("{}", "-".repeat(58));
    for s in &stored {
        println!(
            "{:<8} {:<25} {:<12} {:>10}",
            s.symbol,
            format!("{} to {}", s.first_date, s.last_date),
            format!("{} bars", s.bar_count),
            format_size(s.size_bytes)
        );
    }
    Ok(())
}

fn serde_json_pretty(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
