use serde::Serialize;
use std::sync::Arc;
use tracing::debug;
use tutor_schedule::database::memory_repository::MemoryRepository;
use tutor_schedule::models::fixture::Fixture;
use tutor_schedule::models::session::{Participant, SessionFilter};
use tutor_schedule::util::{parse_date, parse_time};
use tutor_schedule::{AppError, Config, Scheduler, init_tracing};
use uuid::Uuid;

fn print_usage(bin_name: &str) {
    eprintln!("Usage:");
    eprintln!("  {bin_name} slots <fixture.json> <tutor-id> <YYYY-MM-DD> [granularity-minutes]");
    eprintln!("  {bin_name} bookable <fixture.json> <tutor-id> <YYYY-MM-DD> <HH:MM> <duration-minutes>");
    eprintln!("  {bin_name} sessions <fixture.json> <participant-id>");
    eprintln!("  {bin_name} summary <fixture.json> <participant-id>");
}

enum Command {
    Slots {
        tutor_id: String,
        date: String,
        granularity: Option<String>,
    },
    Bookable {
        tutor_id: String,
        date: String,
        start: String,
        duration: String,
    },
    Sessions {
        participant_id: String,
    },
    Summary {
        participant_id: String,
    },
}

fn parse_args(args: &[String]) -> Option<(String, Command)> {
    let (name, rest) = args.split_first()?;
    let (fixture, rest) = rest.split_first()?;

    let command = match (name.as_str(), rest) {
        ("slots", [tutor_id, date]) => Command::Slots {
            tutor_id: tutor_id.clone(),
            date: date.clone(),
            granularity: None,
        },
        ("slots", [tutor_id, date, granularity]) => Command::Slots {
            tutor_id: tutor_id.clone(),
            date: date.clone(),
            granularity: Some(granularity.clone()),
        },
        ("bookable", [tutor_id, date, start, duration]) => Command::Bookable {
            tutor_id: tutor_id.clone(),
            date: date.clone(),
            start: start.clone(),
            duration: duration.clone(),
        },
        ("sessions", [participant_id]) => Command::Sessions {
            participant_id: participant_id.clone(),
        },
        ("summary", [participant_id]) => Command::Summary {
            participant_id: participant_id.clone(),
        },
        _ => return None,
    };

    Some((fixture.clone(), command))
}

fn parse_minutes(raw: &str) -> Result<u32, AppError> {
    raw.parse().map_err(|_| AppError::InvalidInput(format!("Invalid number of minutes: {raw}")))
}

fn load_fixture(path: &str) -> Result<Fixture, AppError> {
    let raw = std::fs::read_to_string(path).map_err(|err| AppError::InvalidInput(format!("Cannot read fixture {path}: {err}")))?;
    serde_json::from_str(&raw).map_err(|err| AppError::InvalidInput(format!("Invalid fixture {path}: {err}")))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, AppError> {
    serde_json::to_string_pretty(value).map_err(|err| AppError::InvalidInput(format!("Cannot encode output: {err}")))
}

async fn run(config: Config, fixture_path: &str, command: Command) -> Result<String, AppError> {
    let repository = MemoryRepository::from_fixture(load_fixture(fixture_path)?)?;
    let default_granularity = config.scheduling.default_granularity_minutes;
    let scheduler = Scheduler::new(Arc::new(repository), config.scheduling)?;
    debug!(fixture = fixture_path, "store loaded");

    match command {
        Command::Slots { tutor_id, date, granularity } => {
            let granularity = granularity.as_deref().map(parse_minutes).transpose()?.unwrap_or(default_granularity);
            let slots = scheduler
                .resolve_slots(&Uuid::parse_str(&tutor_id)?, parse_date(&date)?, granularity)
                .await?;
            to_json(&slots)
        }
        Command::Bookable {
            tutor_id,
            date,
            start,
            duration,
        } => {
            let bookable = scheduler
                .is_slot_bookable(&Uuid::parse_str(&tutor_id)?, parse_date(&date)?, parse_time(&start)?, parse_minutes(&duration)?)
                .await?;
            to_json(&bookable)
        }
        Command::Sessions { participant_id } => {
            let sessions = scheduler.query_sessions(&SessionFilter::involving(Uuid::parse_str(&participant_id)?)).await?;
            to_json(&sessions.iter().collect::<Vec<_>>())
        }
        Command::Summary { participant_id } => {
            let summary = scheduler.summary(Participant::Any(Uuid::parse_str(&participant_id)?)).await?;
            to_json(&summary)
        }
    }
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let mut args = std::env::args();
    let bin_name = args.next().unwrap_or_else(|| "schedule".to_string());
    let args: Vec<String> = args.collect();

    let Some((fixture_path, command)) = parse_args(&args) else {
        print_usage(&bin_name);
        std::process::exit(2);
    };

    let config = match Config::load().map_err(AppError::from) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    init_tracing(&config.logging.level, config.logging.json_format);

    match run(config, &fixture_path, command).await {
        Ok(output) => println!("{output}"),
        Err(err) => {
            eprintln!("{}: {err}", err.user_message());
            std::process::exit(1);
        }
    }
}
