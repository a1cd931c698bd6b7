use std::fmt;

use chrono::Duration;
use liftlog_core::model::{
    Entry, ExerciseCatalog, ExerciseName, Ledger, LoggedAt, Performance, UserName,
};
use storage::{Storage, StorageConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_EXERCISES: [&str; 5] = ["Bench Press", "Squat", "Dips", "Bent-over Row", "Pull-up"];
const MAX_SEED_ENTRIES: u32 = 10_000;

#[derive(Debug, Clone)]
struct Args {
    db_url: Option<String>,
    user: String,
    entries: u32,
    now: Option<LoggedAt>,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidEntries { raw: String },
    InvalidNow { raw: String },
    TimeOutOfRange { entry: u32 },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidEntries { raw } => {
                write!(f, "invalid --entries value (expected 0..={MAX_SEED_ENTRIES}): {raw}")
            }
            ArgsError::InvalidNow { raw } => {
                write!(f, "invalid --now value (expected YYYY/MM/DD HH:MM:SS): {raw}")
            }
            ArgsError::TimeOutOfRange { entry } => {
                write!(f, "sample entry {entry} falls outside the representable time range")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url = None;
        let mut user = std::env::var("LIFTLOG_SEED_USER").unwrap_or_else(|_| "al".into());
        let mut entries = std::env::var("LIFTLOG_SEED_ENTRIES")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .filter(|n| *n <= MAX_SEED_ENTRIES)
            .unwrap_or(6);
        let mut now = None;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = Some(value);
                }
                "--user" => {
                    user = require_value(&mut args, "--user")?;
                }
                "--entries" => {
                    let value = require_value(&mut args, "--entries")?;
                    entries = value
                        .parse::<u32>()
                        .ok()
                        .filter(|n| *n <= MAX_SEED_ENTRIES)
                        .ok_or_else(|| ArgsError::InvalidEntries { raw: value.clone() })?;
                }
                "--now" => {
                    let value = require_value(&mut args, "--now")?;
                    let parsed = LoggedAt::parse(&value)
                        .map_err(|_| ArgsError::InvalidNow { raw: value.clone() })?;
                    now = Some(parsed);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            user,
            entries,
            now,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <url>                Ledger URL: sqlite:... or http(s)://... (default: LIFTLOG_LEDGER_URL)");
    eprintln!("  --user <name>             User the sample entries belong to (default: al)");
    eprintln!("  --entries <n>             Number of sample entries to append (default: 6)");
    eprintln!("  --now <timestamp>         Fixed current time, YYYY/MM/DD HH:MM:SS");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment:");
    eprintln!(
        "  LIFTLOG_LEDGER_URL, LIFTLOG_SHEETS_TOKEN, LIFTLOG_TIMEOUT_SECS, LIFTLOG_SEED_USER, LIFTLOG_SEED_ENTRIES, RUST_LOG"
    );
}

/// Sample `i` cycles through the default exercises, two per day going back
/// from `now`, seven minutes apart.
fn sample_entry(
    user: &UserName,
    now: LoggedAt,
    i: u32,
) -> Result<Entry, Box<dyn std::error::Error>> {
    let idx = usize::try_from(i)? % DEFAULT_EXERCISES.len();
    let offset = Duration::days(i64::from(i / 2)) + Duration::minutes(i64::from(i) * 7);
    let logged_at = now
        .value()
        .checked_sub_signed(offset)
        .ok_or(ArgsError::TimeOutOfRange { entry: i })?;
    let performance = Performance {
        weight: 20.0 + f64::from(i) * 2.5,
        sets: 3,
        reps: 8,
        last_set_reps: 6,
        effort: 7,
    };
    Ok(Entry::new(
        user.clone(),
        LoggedAt::new(logged_at),
        ExerciseName::new(DEFAULT_EXERCISES[idx])?,
        performance,
    )?)
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let mut config = StorageConfig::from_env()?;
    if let Some(url) = &args.db_url {
        config.backend = storage::LedgerBackend::from_url(url)?;
    }
    let storage = Storage::connect(&config).await?;
    let now = args
        .now
        .unwrap_or_else(|| liftlog_core::Clock::default_clock().now());
    let user = UserName::for_sign_in(args.user.clone())?;

    let mut catalog = storage.catalog.list_exercises().await?;
    if catalog.is_empty() {
        catalog = ExerciseCatalog::from_cells(DEFAULT_EXERCISES);
        storage.catalog.replace_exercises(&catalog).await?;
        info!(exercises = catalog.len(), "seeded exercise catalog");
    }

    let samples = (0..args.entries)
        .map(|i| sample_entry(&user, now, i))
        .collect::<Result<Vec<_>, _>>()?;

    let current = storage.ledger.read_all().await?;
    let merged: Ledger = current.appended(&samples);
    storage
        .ledger
        .overwrite_if_unchanged(current.len(), &merged)
        .await?;

    info!(
        user = %user,
        appended = samples.len(),
        total = merged.len(),
        "seeded ledger"
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
