//! Command-line boundary for the habit tracker core.
//!
//! # Responsibility
//! - Translate command-line requests into `habit_core` service calls.
//! - Render service results as JSON on stdout.
//!
//! # Invariants
//! - Every invocation opens its own connection; the store is the only
//!   shared state between concurrent invocations.
//! - "Not found" outcomes exit non-zero with a message on stderr.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use habit_core::db::open_db;
use habit_core::{
    default_log_level, init_logging, parse_entry_date, EntryService, HabitDraft, HabitPatch,
    HabitService, HabitType, SqliteStore,
};
use log::debug;
use rusqlite::Connection;
use serde_json::json;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "habit", version, about = "Track habits and their daily completion")]
struct Cli {
    /// SQLite database file
    #[arg(long, env = "HABIT_DB", default_value = "habits.sqlite3", global = true)]
    db: PathBuf,

    /// Absolute directory for rolling log files (logging is off when unset)
    #[arg(long, env = "HABIT_LOG_DIR", global = true)]
    log_dir: Option<PathBuf>,

    /// Log level: trace|debug|info|warn|error (defaults by build mode)
    #[arg(long, env = "HABIT_LOG_LEVEL", global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Health check: prints core ping and version
    Ping,
    /// Manage habit definitions
    #[command(subcommand)]
    Habit(HabitCommand),
    /// Manage per-date completion entries
    #[command(subcommand)]
    Entry(EntryCommand),
}

#[derive(Subcommand, Debug)]
enum HabitCommand {
    /// List all habits
    List,
    /// Show one habit
    Get { id: i64 },
    /// Create a habit
    Create {
        #[command(flatten)]
        fields: HabitFields,
        /// Creation date (YYYY-MM-DD); defaults to today
        #[arg(long, value_parser = parse_entry_date)]
        created_at: Option<NaiveDate>,
    },
    /// Update the supplied fields of a habit
    Update {
        id: i64,
        #[command(flatten)]
        fields: HabitFields,
    },
    /// Delete a habit and all of its entries
    Delete { id: i64 },
}

#[derive(Args, Debug)]
struct HabitFields {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    color: Option<String>,
    #[arg(long)]
    icon: Option<String>,
    /// daily|weekly
    #[arg(long = "type")]
    kind: Option<HabitType>,
    #[arg(long)]
    target_per_week: Option<i32>,
}

#[derive(Subcommand, Debug)]
enum EntryCommand {
    /// List entries of one habit, optionally within an inclusive date range
    Habit {
        habit_id: i64,
        #[arg(long, value_parser = parse_entry_date, requires = "to")]
        from: Option<NaiveDate>,
        #[arg(long, value_parser = parse_entry_date, requires = "from")]
        to: Option<NaiveDate>,
    },
    /// List entries of all habits on one date
    Date {
        #[arg(value_parser = parse_entry_date)]
        date: NaiveDate,
    },
    /// List entries of all habits within an inclusive date range
    Range {
        #[arg(value_parser = parse_entry_date)]
        from: NaiveDate,
        #[arg(value_parser = parse_entry_date)]
        to: NaiveDate,
    },
    /// Flip completion for a habit on a date
    Toggle {
        habit_id: i64,
        #[arg(value_parser = parse_entry_date)]
        date: NaiveDate,
    },
    /// Set completion for a habit on a date
    Set {
        habit_id: i64,
        #[arg(value_parser = parse_entry_date)]
        date: NaiveDate,
        #[arg(long, action = clap::ArgAction::Set, default_value_t = true)]
        completed: bool,
    },
    /// Delete one entry by id
    Delete { id: i64 },
}

impl HabitFields {
    fn into_draft(self, created_at: Option<NaiveDate>) -> HabitDraft {
        HabitDraft {
            name: self.name,
            description: self.description,
            color: self.color,
            icon: self.icon,
            kind: self.kind,
            target_per_week: self.target_per_week,
            created_at,
        }
    }
}

impl From<HabitFields> for HabitPatch {
    fn from(fields: HabitFields) -> Self {
        Self {
            name: fields.name,
            description: fields.description,
            color: fields.color,
            icon: fields.icon,
            kind: fields.kind,
            target_per_week: fields.target_per_week,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(log_dir) = &cli.log_dir {
        let level = cli
            .log_level
            .clone()
            .unwrap_or_else(|| default_log_level().as_str().to_string());
        init_logging(&level, log_dir).context("failed to initialize logging")?;
    }
    debug!("event=cli_start module=cli status=ok command={:?}", cli.command);

    match cli.command {
        Command::Ping => print_json(&json!({
            "ping": habit_core::ping(),
            "version": habit_core::core_version(),
        })),
        Command::Habit(command) => {
            let conn = open_store(&cli.db)?;
            run_habit(&conn, command)
        }
        Command::Entry(command) => {
            let conn = open_store(&cli.db)?;
            run_entry(&conn, command)
        }
    }
}

fn open_store(path: &Path) -> Result<Connection> {
    open_db(path).with_context(|| format!("failed to open habit store `{}`", path.display()))
}

fn run_habit(conn: &Connection, command: HabitCommand) -> Result<()> {
    let service = HabitService::new(SqliteStore::try_new(conn)?);
    match command {
        HabitCommand::List => print_json(&service.list_habits()?),
        HabitCommand::Get { id } => match service.get_habit(id)? {
            Some(habit) => print_json(&habit),
            None => bail!("habit not found: {id}"),
        },
        HabitCommand::Create { fields, created_at } => {
            print_json(&service.create_habit(fields.into_draft(created_at))?)
        }
        HabitCommand::Update { id, fields } => {
            match service.update_habit(id, &HabitPatch::from(fields))? {
                Some(habit) => print_json(&habit),
                None => bail!("habit not found: {id}"),
            }
        }
        HabitCommand::Delete { id } => {
            if !service.delete_habit(id)? {
                bail!("habit not found: {id}");
            }
            print_json(&json!({ "deleted": id }))
        }
    }
}

fn run_entry(conn: &Connection, command: EntryCommand) -> Result<()> {
    let service = EntryService::new(SqliteStore::try_new(conn)?);
    match command {
        EntryCommand::Habit { habit_id, from, to } => match (from, to) {
            (Some(from), Some(to)) => {
                print_json(&service.list_for_habit_in_range(habit_id, from, to)?)
            }
            _ => print_json(&service.list_for_habit(habit_id)?),
        },
        EntryCommand::Date { date } => print_json(&service.list_for_date(date)?),
        EntryCommand::Range { from, to } => print_json(&service.list_in_range(from, to)?),
        EntryCommand::Toggle { habit_id, date } => {
            print_json(&service.toggle_entry(habit_id, date)?)
        }
        EntryCommand::Set {
            habit_id,
            date,
            completed,
        } => print_json(&service.set_entry(habit_id, date, completed)?),
        EntryCommand::Delete { id } => {
            if !service.delete_entry(id)? {
                bail!("habit entry not found: {id}");
            }
            print_json(&json!({ "deleted": id }))
        }
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command, EntryCommand, HabitCommand};
    use chrono::NaiveDate;
    use clap::{CommandFactory, Parser};
    use habit_core::HabitType;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn create_parses_type_and_dates() {
        let cli = Cli::try_parse_from([
            "habit",
            "habit",
            "create",
            "--name",
            "Sport",
            "--type",
            "weekly",
            "--target-per-week",
            "3",
            "--created-at",
            "2025-01-01",
        ])
        .unwrap();
        let Command::Habit(HabitCommand::Create { fields, created_at }) = cli.command else {
            panic!("expected habit create");
        };
        assert_eq!(fields.name.as_deref(), Some("Sport"));
        assert_eq!(fields.kind, Some(HabitType::Weekly));
        assert_eq!(fields.target_per_week, Some(3));
        assert_eq!(created_at, NaiveDate::from_ymd_opt(2025, 1, 1));
    }

    #[test]
    fn update_does_not_accept_created_at() {
        let parsed = Cli::try_parse_from([
            "habit",
            "habit",
            "update",
            "3",
            "--created-at",
            "2025-01-01",
        ]);
        assert!(parsed.is_err());

        let cli = Cli::try_parse_from(["habit", "habit", "update", "3", "--name", "Run"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Habit(HabitCommand::Update { id: 3, .. })
        ));
    }

    #[test]
    fn dates_beyond_four_digit_years_are_rejected() {
        assert!(Cli::try_parse_from(["habit", "entry", "toggle", "7", "+10000-01-01"]).is_err());
        assert!(Cli::try_parse_from(["habit", "entry", "range", "2025-01-01", "+10000-01-01"])
            .is_err());
    }

    #[test]
    fn entry_set_defaults_to_completed_and_rejects_bad_dates() {
        let cli = Cli::try_parse_from(["habit", "entry", "set", "7", "2025-01-01"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Entry(EntryCommand::Set {
                habit_id: 7,
                completed: true,
                ..
            })
        ));

        assert!(Cli::try_parse_from(["habit", "entry", "toggle", "7", "2025-13-01"]).is_err());
    }
}
