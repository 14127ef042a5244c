use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tally_core::today_in;
use tally_finance::{CategoryMapping, Session, WindowOptions, MAX_WINDOW_MONTHS};
use tally_ingest::LoadOptions;
use tracing::{info, warn};

mod config;
mod logging;
mod render;
mod state;

use config::Config;
use render::OutputFormat;

const LONG_VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("TALLY_BUILD_SHA"), ")");

#[derive(Parser, Debug)]
#[command(
    name = "tally",
    version,
    long_version = LONG_VERSION,
    about = "Summarize a bank export by month and category"
)]
struct Cli {
    /// Config file (default: ~/.tally/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Monthly debits, credits, net change and category totals over a trailing window
    Report(ReportArgs),

    /// List every transaction with the category it resolves to
    Categorize(CategorizeArgs),

    /// Manage ~/.tally/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Transactions CSV with date, description, amount[, category] columns
    #[arg(long)]
    csv: PathBuf,

    /// Category mapping JSON (default: config, then ~/.tally/category_mappings.json)
    #[arg(long)]
    mapping: Option<PathBuf>,

    /// Fail on the first malformed row instead of skipping it
    #[arg(long)]
    strict: bool,
}

#[derive(Args, Debug)]
struct ReportArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Reference date, YYYY-MM-DD (default: today in the configured timezone)
    #[arg(long)]
    as_of: Option<NaiveDate>,

    /// Trailing window length in months (1-1200)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=MAX_WINDOW_MONTHS as i64))]
    months: Option<u32>,

    /// Include months with no transactions
    #[arg(long)]
    dense: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Write to a file instead of stdout
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct CategorizeArgs {
    #[command(flatten)]
    input: InputArgs,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config file if none exists
    Init,
    /// Print the effective config
    Show,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose, cli.quiet);

    let cfg_path = config::config_path(cli.config.as_deref())?;

    match cli.command {
        Command::Report(args) => {
            let cfg = config::load_config(&cfg_path)?;
            run_report(&cfg, args)?;
        }

        Command::Categorize(args) => {
            let cfg = config::load_config(&cfg_path)?;
            run_categorize(&cfg, args)?;
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config(&cfg_path)?,
            ConfigCommand::Show => {
                let cfg = config::load_config(&cfg_path)?;
                println!("# {}", cfg_path.display());
                print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
            }
        },
    }

    Ok(())
}

fn load_mapping(explicit: Option<&Path>, cfg: &Config) -> Result<CategoryMapping> {
    if let Some(path) = explicit.or(cfg.report.mapping.as_deref()) {
        return CategoryMapping::from_path(path)
            .with_context(|| format!("loading category mapping {}", path.display()));
    }

    let fallback = state::default_mapping_path()?;
    if fallback.exists() {
        return CategoryMapping::from_path(&fallback)
            .with_context(|| format!("loading category mapping {}", fallback.display()));
    }

    warn!("no category mapping found; every transaction will be Uncategorized");
    Ok(CategoryMapping::default())
}

fn build_session(cfg: &Config, input: &InputArgs, as_of: NaiveDate) -> Result<Session> {
    if !input.csv.exists() {
        bail!("CSV not found: {} (pass --csv <path>)", input.csv.display());
    }

    let mapping = load_mapping(input.mapping.as_deref(), cfg)?;
    info!(rules = mapping.len(), "category mapping ready");

    let mut load = LoadOptions::default().with_date_formats(cfg.ingest.date_formats.clone());
    if input.strict {
        load = load.strict();
    }

    Ok(Session::new(mapping, as_of).with_load_options(load))
}

fn open_output(out: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match out {
        Some(path) => {
            state::ensure_parent_dir(path)?;
            let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(BufWriter::new(io::stdout().lock())),
    })
}

fn run_report(cfg: &Config, args: ReportArgs) -> Result<()> {
    let as_of = match args.as_of {
        Some(d) => d,
        None => today_in(&cfg.profile.timezone)?,
    };

    let mut window = WindowOptions::default().with_months(args.months.unwrap_or(cfg.report.months));
    if args.dense || cfg.report.dense {
        window = window.dense();
    }

    let session = build_session(cfg, &args.input, as_of)?.with_window(window);
    let report = session
        .run_path(&args.input.csv)
        .with_context(|| format!("processing {}", args.input.csv.display()))?;

    if report.skipped_rows > 0 {
        warn!(skipped = report.skipped_rows, "some rows could not be parsed and were skipped");
    }

    let mut out = open_output(args.out.as_deref())?;
    render::render_report(&report, args.format, &mut out)?;
    out.flush()?;
    Ok(())
}

fn run_categorize(cfg: &Config, args: CategorizeArgs) -> Result<()> {
    // As-of only matters for aggregation; categorizing ignores it.
    let session = build_session(cfg, &args.input, NaiveDate::MIN)?;
    let categorized = session
        .categorize_path(&args.input.csv)
        .with_context(|| format!("processing {}", args.input.csv.display()))?;

    let mut out = open_output(args.out.as_deref())?;
    render::render_categorization(&categorized, args.format, &mut out)?;
    out.flush()?;
    Ok(())
}
