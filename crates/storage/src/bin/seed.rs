use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use storage::repository::{ResponseRecord, Storage};
use wheel_core::model::{Catalog, LifeArea, Score, UserId};

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    catalog_file: Option<PathBuf>,
    user_id: UserId,
    history: u32,
    now: Option<DateTime<Utc>>,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidUserId { raw: String },
    InvalidHistory { raw: String },
    InvalidDbUrl { raw: String },
    InvalidNow { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidUserId { raw } => write!(f, "invalid --user value: {raw}"),
            ArgsError::InvalidHistory { raw } => write!(f, "invalid --history value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidNow { raw } => {
                write!(f, "invalid --now value (expected RFC3339): {raw}")
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
        let mut db_url =
            std::env::var("WHEEL_DB_URL").unwrap_or_else(|_| "sqlite:wheel.sqlite3".into());
        let mut user_id = std::env::var("WHEEL_USER_ID")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .map_or_else(|| UserId::new(1), UserId::new);
        let mut catalog_file = None;
        let mut history = 0;
        let mut now = None;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--catalog" => {
                    catalog_file = Some(PathBuf::from(require_value(&mut args, "--catalog")?));
                }
                "--user" => {
                    let value = require_value(&mut args, "--user")?;
                    let parsed: u64 = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidUserId { raw: value.clone() })?;
                    user_id = UserId::new(parsed);
                }
                "--history" => {
                    let value = require_value(&mut args, "--history")?;
                    history = value
                        .parse::<u32>()
                        .map_err(|_| ArgsError::InvalidHistory { raw: value.clone() })?;
                }
                "--now" => {
                    let value = require_value(&mut args, "--now")?;
                    let parsed = DateTime::parse_from_rfc3339(&value)
                        .map_err(|_| ArgsError::InvalidNow { raw: value.clone() })?
                        .with_timezone(&Utc);
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
            catalog_file,
            user_id,
            history,
            now,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>         SQLite URL (default: sqlite:wheel.sqlite3)");
    eprintln!("  --catalog <file.json>     Catalog to store instead of the built-in one");
    eprintln!("  --user <id>               User owning the sample history (default: 1)");
    eprintln!("  --history <n>             Completed sample assessments to add (default: 0)");
    eprintln!("  --now <rfc3339>           Fixed current time for deterministic seeding");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!("  WHEEL_DB_URL, WHEEL_USER_ID");
}

/// `{ "areas": [ ...LifeArea ] }`
#[derive(Debug, Deserialize)]
struct CatalogFile {
    areas: Vec<LifeArea>,
}

fn load_catalog(path: Option<&PathBuf>) -> Result<Catalog, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)?;
            let file: CatalogFile = serde_json::from_str(&raw)?;
            Ok(Catalog::new(file.areas)?)
        }
        None => Ok(storage::default_catalog()?),
    }
}

/// Deterministic 3..=9 pattern so sample history shows varied wedges.
fn sample_score(run: u32, index: usize) -> Result<Score, Box<dyn std::error::Error>> {
    let value = (index as u64 * 7 + u64::from(run) * 3) % 7 + 3;
    Ok(Score::try_from(i64::try_from(value)?)?)
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let catalog = load_catalog(args.catalog_file.as_ref())?;
    let storage = Storage::sqlite(&args.db_url).await?;
    storage.catalog.upsert_catalog(&catalog).await?;
    let now = args.now.unwrap_or_else(Utc::now);

    for run in 0..args.history {
        let days_ago = i64::from(args.history - run) * 30;
        let started_at = now - Duration::days(days_ago);
        let record = storage
            .assessments
            .start_or_resume(args.user_id, started_at)
            .await?;

        let mut responses = Vec::with_capacity(catalog.question_count());
        for (index, question) in catalog.areas().iter().flat_map(|a| a.questions()).enumerate() {
            responses.push(ResponseRecord::new(question.id, sample_score(run, index)?));
        }
        storage
            .assessments
            .save_responses(record.id(), &responses)
            .await?;
        storage
            .assessments
            .finalize_assessment(record.id(), started_at + Duration::minutes(15))
            .await?;
    }

    println!(
        "Seeded {} life areas ({} questions) and {} completed assessments for user {} into {}",
        catalog.step_count(),
        catalog.question_count(),
        args.history,
        args.user_id,
        args.db_url
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
