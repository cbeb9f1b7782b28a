//! Command-line front end for the habit tracking core.
//!
//! # Responsibility
//! - Stand in for a request-handling collaborator: resolve config, open the
//!   database and dispatch one operation per invocation.
//! - Print results as JSON on stdout; errors go to stderr with exit code 1.
//!
//! # Invariants
//! - The owner id is the first positional argument; authentication is out
//!   of scope.

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use habitflow_core::db::migrations::latest_version;
use habitflow_core::db::open_db;
use habitflow_core::{
    core_version, init_logging_from_config, ping, CoreConfig, CreateHabitRequest, Frequency,
    HabitService, OwnerId,
};
use log::error;
use std::process::ExitCode;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "habitflow")]
#[command(about = "Habit occurrence and completion tracking")]
#[command(
    after_help = "Environment:\n  HABITFLOW_DB_PATH       SQLite database file\n  HABITFLOW_LOG_LEVEL     trace|debug|info|warn|error\n  HABITFLOW_LOG_DIR       Absolute log directory (file logging off when unset)\n  HABITFLOW_STATS_WINDOW  Default window for `stats`"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
enum Command {
    /// Opens the database and reports versions.
    Ping,
    /// Lists habits, newest first.
    Habits {
        #[arg(value_parser = parse_uuid)]
        owner: OwnerId,
    },
    /// Creates a habit.
    Add {
        #[arg(value_parser = parse_uuid)]
        owner: OwnerId,
        name: String,
        #[arg(value_enum)]
        frequency: FrequencyArg,
        #[arg(value_parser = parse_date)]
        start: NaiveDate,
        /// Weekday indices for `custom`, 0 = Sunday (e.g. 1,3,5).
        #[arg(value_delimiter = ',')]
        days: Vec<u8>,
    },
    /// Deletes a habit and its completions.
    Delete {
        #[arg(value_parser = parse_uuid)]
        owner: OwnerId,
        #[arg(value_parser = parse_uuid)]
        habit: Uuid,
    },
    /// Marks a habit complete for a day.
    Complete {
        #[arg(value_parser = parse_uuid)]
        owner: OwnerId,
        #[arg(value_parser = parse_uuid)]
        habit: Uuid,
        #[arg(value_parser = parse_date)]
        date: NaiveDate,
    },
    /// Due habits for a day with their completion flags.
    Due {
        #[arg(value_parser = parse_uuid)]
        owner: OwnerId,
        #[arg(value_parser = parse_date)]
        date: NaiveDate,
    },
    /// Completions in an inclusive date range.
    Completions {
        #[arg(value_parser = parse_uuid)]
        owner: OwnerId,
        #[arg(value_parser = parse_date)]
        start: NaiveDate,
        #[arg(value_parser = parse_date)]
        end: NaiveDate,
    },
    /// Rolling completion stats ending at a day.
    Stats {
        #[arg(value_parser = parse_uuid)]
        owner: OwnerId,
        #[arg(value_parser = parse_date)]
        date: NaiveDate,
        window_days: Option<u32>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum FrequencyArg {
    Daily,
    Weekly,
    Custom,
}

impl From<FrequencyArg> for Frequency {
    fn from(value: FrequencyArg) -> Self {
        match value {
            FrequencyArg::Daily => Frequency::Daily,
            FrequencyArg::Weekly => Frequency::Weekly,
            FrequencyArg::Custom => Frequency::Custom,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli.command) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(message) => {
            error!("event=cli_command module=cli status=error error={message}");
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<String, String> {
    let config = CoreConfig::from_env().map_err(|err| err.to_string())?;
    init_logging_from_config(&config).map_err(|err| err.to_string())?;

    let conn = open_db(&config.db_path).map_err(|err| err.to_string())?;
    let service = HabitService::from_connection(&conn)
        .map_err(|err| err.to_string())?
        .with_max_window_days(config.max_window_days);

    let value = match command {
        Command::Ping => Ok(serde_json::json!({
            "ping": ping(),
            "version": core_version(),
            "schema_version": latest_version(),
        })),
        Command::Habits { owner } => to_json(service.list_habits(owner)),
        Command::Add {
            owner,
            name,
            frequency,
            start,
            days,
        } => to_json(service.create_habit(owner, &add_request(name, frequency, start, days))),
        Command::Delete { owner, habit } => to_json(
            service
                .delete_habit(owner, habit)
                .map(|()| serde_json::json!({ "deleted": habit })),
        ),
        Command::Complete { owner, habit, date } => {
            to_json(service.mark_complete(owner, habit, date))
        }
        Command::Due { owner, date } => to_json(service.today_overview(owner, date)),
        Command::Completions { owner, start, end } => {
            to_json(service.list_completions(owner, start, end))
        }
        Command::Stats {
            owner,
            date,
            window_days,
        } => to_json(service.get_rolling_stats(
            owner,
            window_days.unwrap_or(config.default_window_days),
            date,
        )),
    }?;

    serde_json::to_string_pretty(&value).map_err(|err| err.to_string())
}

fn to_json<T, E>(result: Result<T, E>) -> Result<serde_json::Value, String>
where
    T: serde::Serialize,
    E: std::fmt::Display,
{
    let value = result.map_err(|err| err.to_string())?;
    serde_json::to_value(value).map_err(|err| err.to_string())
}

fn parse_uuid(value: &str) -> Result<Uuid, String> {
    Uuid::parse_str(value).map_err(|_| format!("invalid id `{value}`"))
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| format!("invalid date `{value}`; expected YYYY-MM-DD"))
}

fn add_request(
    name: String,
    frequency: FrequencyArg,
    start: NaiveDate,
    days: Vec<u8>,
) -> CreateHabitRequest {
    CreateHabitRequest {
        name: Some(name),
        frequency: Some(frequency.into()),
        custom_days: (!days.is_empty()).then_some(days),
        start_date: Some(start),
    }
}
