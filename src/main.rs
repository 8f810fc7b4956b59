use anyhow::{Context, Result, bail};
use backline_import::airtable::{self, Airtable};
use backline_import::assemble::ReferencePolicy;
use backline_import::driver::{self, DriverArgs, Summary};
use backline_import::store::{Combined, JsonLines, MemoryStore};
use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use log::{error, info};
use std::io::{self, Write};
use std::{fs, process};

/// Import a delivery schedule (CSV) into the Backline Airtable base
#[derive(Parser)]
#[command(author, version, about)]
struct Args {
    /// Input file (CSV)
    #[arg(long)]
    csv: String,
    /// Write delivery records as JSON lines instead of inserting them
    #[arg(long)]
    dry_run: bool,
    /// Output file for --dry-run [default: standard output]
    #[arg(short, long, requires = "dry_run")]
    output: Option<String>,
    /// Reject rows with names that do not match any record
    /// (needs the record store, so not with --dry-run)
    #[arg(long, conflicts_with = "dry_run")]
    strict_references: bool,
    /// Airtable API key
    #[arg(
        long,
        env = "AIRTABLE_API_KEY",
        hide_env_values = true,
        required_unless_present = "dry_run"
    )]
    api_key: Option<String>,
    /// Airtable base id
    #[arg(long, env = "AIRTABLE_BASE_BACKLINE", required_unless_present = "dry_run")]
    base: Option<String>,
    /// Airtable API endpoint
    #[arg(long, default_value = airtable::DEFAULT_API_URL)]
    api_url: String,
    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,
}

fn dry_run(args: &Args, file: fs::File, driver_args: &DriverArgs) -> Result<Summary> {
    let writer: Box<dyn Write> = match &args.output {
        Some(path) => {
            info!("write: {path}");
            let out = fs::File::create(path).with_context(|| format!("cannot create {path}"))?;
            Box::new(io::BufWriter::new(out))
        }
        None => Box::new(io::stdout().lock()),
    };
    let mut store = Combined {
        resolver: MemoryStore::new(),
        sink: JsonLines::new(writer),
    };
    let summary = driver::run(file, driver_args, &mut store)?;
    store.sink.into_inner().flush()?;
    Ok(summary)
}

fn import(args: &Args, file: fs::File, driver_args: &DriverArgs) -> Result<Summary> {
    let (Some(api_key), Some(base)) = (&args.api_key, &args.base) else {
        bail!("Airtable API key and base are required");
    };
    let mut store = Airtable::new(&args.api_url, base, api_key)?;
    Ok(driver::run(file, driver_args, &mut store)?)
}

fn process(args: &Args) -> Result<Summary> {
    info!("read: {}", args.csv);
    let file = fs::File::open(&args.csv).with_context(|| format!("cannot read {}", args.csv))?;
    let driver_args = DriverArgs {
        references: if args.strict_references {
            ReferencePolicy::Strict
        } else {
            ReferencePolicy::Permissive
        },
    };
    if args.dry_run {
        dry_run(args, file, &driver_args)
    } else {
        import(args, file, &driver_args)
    }
}

fn main() {
    let args = Args::parse();
    pretty_env_logger::formatted_timed_builder()
        .filter_level(args.verbose.log_level_filter())
        .init();
    match process(&args) {
        Ok(summary) => info!(
            "finished: {} rows, {} deliveries",
            summary.rows, summary.records
        ),
        Err(e) => {
            error!("{e:#}");
            process::exit(1);
        }
    }
}
