use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use payrates::application::pay_band::transition_pay_band;
use payrates::application::service::ActivityService;
use payrates::domain::activity::Activity;
use payrates::domain::allocation::{Allocation, PayBandAssignment};
use payrates::domain::pay_rate::{ActivityId, PayRate, RequestedPayRate};
use payrates::domain::ports::{ActivityStoreBox, AllocationStoreBox};
use payrates::infrastructure::in_memory::{
    InMemoryActivityStore, InMemoryAllocationStore, InMemoryReferenceData,
};
use payrates::interfaces::csv::pay_band::{PayBandReader, PayBandWriter};
use payrates::interfaces::csv::pay_rate::{PayRateReader, PayRateWriter};
use payrates::interfaces::csv::requested_reader::RequestedPayRateReader;
use std::env;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Reconcile an activity's pay rates with a requested set and print the result
    Reconcile(ReconcileArgs),
    /// Move an allocation onto a new pay band and print its assignments
    PayBand(PayBandArgs),
}

#[derive(Args)]
struct ReconcileArgs {
    /// Requested pay rates CSV file (incentive_level,pay_band,rate)
    #[arg(long)]
    requested: PathBuf,

    /// Existing pay-rate rows CSV file. Overrides rows held in --db-path.
    #[arg(long)]
    existing: Option<PathBuf>,

    #[arg(long, default_value_t = 1)]
    activity_id: ActivityId,

    /// Prison the activity belongs to
    #[arg(long, default_value = "MDI")]
    prison: String,

    /// Incentive level codes valid for the prison
    #[arg(long, value_delimiter = ',', required = true)]
    incentive_levels: Vec<String>,

    /// Pay band codes valid for the prison
    #[arg(long, value_delimiter = ',', required = true)]
    pay_bands: Vec<String>,

    /// An active allocation, as OFFENDER_NO=PAY_BAND. May be repeated.
    #[arg(long = "allocation", value_parser = parse_allocation)]
    allocations: Vec<(String, String)>,

    /// Date the update takes effect (defaults to the local date)
    #[arg(long)]
    today: Option<NaiveDate>,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,
}

#[derive(Args)]
struct PayBandArgs {
    /// Pay band assignments CSV file (pay_band,start_date,end_date)
    #[arg(long)]
    assignments: PathBuf,

    /// Requested pay band code
    #[arg(long)]
    band: String,

    /// Date the change is requested (defaults to the local date)
    #[arg(long)]
    today: Option<NaiveDate>,
}

fn parse_allocation(value: &str) -> std::result::Result<(String, String), String> {
    match value.split_once('=') {
        Some((offender, band)) if !offender.is_empty() && !band.is_empty() => {
            Ok((offender.to_string(), band.to_string()))
        }
        _ => Err(format!("expected OFFENDER_NO=PAY_BAND, got '{value}'")),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Reconcile(args) => reconcile(args).await,
        Command::PayBand(args) => pay_band(args),
    }
}

async fn reconcile(args: ReconcileArgs) -> Result<()> {
    let today = args.today.unwrap_or_else(local_today);
    let (activities, allocations) = open_stores(args.db_path.as_deref())?;

    let mut activity = activities
        .get(args.activity_id)
        .await?
        .unwrap_or_else(|| Activity::new(args.activity_id, &args.prison));
    if let Some(path) = &args.existing {
        let file = File::open(path).into_diagnostic()?;
        let rows = PayRateReader::new(file, args.activity_id)
            .pay_rates()
            .collect::<payrates::error::Result<Vec<PayRate>>>()?;
        activity = activity.with_pay_rates(rows);
    }
    activity.prison_id = args.prison.clone();
    activities.store(activity).await?;

    for (idx, (offender_no, pay_band)) in args.allocations.iter().enumerate() {
        allocations
            .store(Allocation {
                id: idx as i64 + 1,
                activity_id: args.activity_id,
                offender_no: offender_no.clone(),
                start_date: today,
                end_date: None,
                pay_bands: vec![PayBandAssignment::open(pay_band, today)],
            })
            .await?;
    }

    let mut reference_data = InMemoryReferenceData::new();
    for code in &args.incentive_levels {
        reference_data = reference_data.with_incentive_level(&args.prison, code, code);
    }
    for code in &args.pay_bands {
        reference_data = reference_data.with_pay_band(&args.prison, code, code);
    }

    let file = File::open(&args.requested).into_diagnostic()?;
    let requested = RequestedPayRateReader::new(file)
        .requested_rates()
        .collect::<payrates::error::Result<Vec<RequestedPayRate>>>()?;
    info!(activity_id = args.activity_id, requested = requested.len(), %today, "reconciling pay rates");

    let service = ActivityService::new(Box::new(reference_data), activities, allocations);
    let pay_rates = service
        .update_pay_rates(args.activity_id, &requested, today)
        .await?;

    let stdout = io::stdout();
    let mut writer = PayRateWriter::new(stdout.lock());
    writer.write_pay_rates(&pay_rates)?;

    Ok(())
}

fn pay_band(args: PayBandArgs) -> Result<()> {
    let today = args.today.unwrap_or_else(local_today);
    let file = File::open(&args.assignments).into_diagnostic()?;
    let assignments = PayBandReader::new(file)
        .assignments()
        .collect::<payrates::error::Result<Vec<PayBandAssignment>>>()?;

    let updated = transition_pay_band(&assignments, &args.band, today);

    let stdout = io::stdout();
    let mut writer = PayBandWriter::new(stdout.lock());
    writer.write_assignments(&updated)?;

    Ok(())
}

fn local_today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn open_stores(db_path: Option<&Path>) -> Result<(ActivityStoreBox, AllocationStoreBox)> {
    #[cfg(feature = "storage-rocksdb")]
    {
        if let Some(path) = db_path {
            let store = payrates::infrastructure::rocksdb::RocksDBStore::open(path)?;
            let activities: ActivityStoreBox = Box::new(store.clone());
            let allocations: AllocationStoreBox = Box::new(store);
            return Ok((activities, allocations));
        }
    }

    #[cfg(not(feature = "storage-rocksdb"))]
    {
        if db_path.is_some() {
            tracing::warn!(
                "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to in-memory storage."
            );
        }
    }

    let activities: ActivityStoreBox = Box::new(InMemoryActivityStore::new());
    let allocations: AllocationStoreBox = Box::new(InMemoryAllocationStore::new());
    Ok((activities, allocations))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("PAYRATES_LOG")
        .unwrap_or_else(|_| EnvFilter::new("payrates=info,warn"));

    let format = env::var("PAYRATES_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(io::stderr))
                .init();
        }
    }
}
