//! `delivery-rules` CLI — edit blocked delivery dates and check selections.
//!
//! ## Usage
//!
//! ```sh
//! # Block Saturdays and Sundays
//! delivery-rules toggle-day 0
//! delivery-rules toggle-day 6
//!
//! # Block a specific date and a range
//! delivery-rules add-date 2024-12-25
//! delivery-rules add-range 2024-07-01 2024-07-14
//!
//! # List entries with their ids, then edit or remove by id
//! delivery-rules list
//! delivery-rules add-date 2024-12-26 --replace 0
//! delivery-rules remove range 1
//!
//! # Check a buyer's selection (exit status 1 when blocked)
//! delivery-rules check 2024-06-08 --today 2024-06-03
//! delivery-rules check 2024-06-08T10:00:00Z --json
//!
//! # Show every blocked day in a window
//! delivery-rules blocked --from 2024-07-01 --to 2024-07-31
//! ```
//!
//! Exit status: 0 on success, 1 when `check` finds the date blocked, 2 on
//! invalid input or a store failure (clap's usage errors also exit 2).
//!
//! The store directory and owner key come from `--store` / `DELIVERY_RULES_STORE`
//! and `--owner` / `DELIVERY_RULES_OWNER`. Logs go to stderr, filtered by
//! `RUST_LOG` or `--log-level` / `DELIVERY_RULES_LOG`.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use delivery_rules::calendar::{self, format_date};
use delivery_rules::{
    can_proceed, load_configuration, next_available, persist_session, Configuration,
    EditorSession, EntryId, EntryKind, FileStore, GateResponse,
};
use std::process;
use tracing_subscriber::EnvFilter;

/// How far ahead `check` looks for an alternative date.
const SUGGESTION_HORIZON_DAYS: u32 = 366;

const EXIT_BLOCKED: i32 = 1;
const EXIT_ERROR: i32 = 2;

#[derive(Parser)]
#[command(
    name = "delivery-rules",
    version,
    about = "Manage blocked delivery dates and check date selections"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory holding stored configurations
    #[arg(long, global = true, env = "DELIVERY_RULES_STORE", default_value = ".")]
    store: String,

    /// Owner key the configuration is stored under
    #[arg(long, global = true, env = "DELIVERY_RULES_OWNER", default_value = "shop")]
    owner: String,

    /// Reference date for the past-date cutoff (defaults to the local date)
    #[arg(long, global = true)]
    today: Option<String>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, env = "DELIVERY_RULES_LOG", default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the stored configuration as JSON
    Show,
    /// List blocked weekdays, dates and ranges with their entry ids
    List,
    /// Block or unblock a weekday (0 = Sunday .. 6 = Saturday)
    ToggleDay {
        day: u8,
    },
    /// Block a specific date, or replace an existing one
    AddDate {
        /// Date to block (YYYY-MM-DD)
        date: String,
        /// Id of the date entry to replace
        #[arg(long)]
        replace: Option<EntryId>,
    },
    /// Block an inclusive date range, or replace an existing one
    AddRange {
        /// First blocked date (YYYY-MM-DD)
        start: String,
        /// Last blocked date (YYYY-MM-DD)
        end: String,
        /// Id of the range entry to replace
        #[arg(long)]
        replace: Option<EntryId>,
    },
    /// Remove a date or range entry by id
    Remove {
        kind: KindArg,
        id: EntryId,
    },
    /// Check whether a delivery date may be selected
    Check {
        /// Selected date; a timestamp is truncated to its date. Omit for "no selection".
        date: Option<String>,
        /// Print the gate response as JSON
        #[arg(long)]
        json: bool,
    },
    /// List every blocked date in a window, with the reason
    Blocked {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Date,
    Range,
}

impl From<KindArg> for EntryKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Date => EntryKind::Date,
            KindArg::Range => EntryKind::Range,
        }
    }
}

fn main() {
    let code = match run(Cli::parse()) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            EXIT_ERROR
        }
    };
    process::exit(code);
}

fn run(cli: Cli) -> Result<i32> {
    init_logging(&cli.log_level)?;

    let store = FileStore::new(&cli.store);
    let config = load_configuration(&store, &cli.owner)
        .with_context(|| format!("Failed to load configuration for owner '{}'", cli.owner))?;

    match cli.command {
        Commands::Show => {
            println!("{}", config.to_json_pretty()?);
        }
        Commands::List => {
            print_listing(&EditorSession::from_configuration(&config));
        }
        Commands::ToggleDay { day } => {
            let mut session = EditorSession::from_configuration(&config);
            let blocked = session.toggle_weekday(day)?;
            save(&store, &cli.owner, session)?;
            let name = calendar::weekday_name(day).unwrap_or("?");
            println!("{}: {}", name, if blocked { "blocked" } else { "open" });
        }
        Commands::AddDate { date, replace } => {
            let date = calendar::parse_date(&date)?;
            let mut session = EditorSession::from_configuration(&config);
            let id = session.upsert_date(date, replace)?;
            save(&store, &cli.owner, session)?;
            println!("[{}] {}", id, format_date(date));
        }
        Commands::AddRange {
            start,
            end,
            replace,
        } => {
            let start = calendar::parse_date(&start)?;
            let end = calendar::parse_date(&end)?;
            let mut session = EditorSession::from_configuration(&config);
            let id = session.upsert_range_bounds(start, end, replace)?;
            save(&store, &cli.owner, session)?;
            println!("[{}] {} - {}", id, format_date(start), format_date(end));
        }
        Commands::Remove { kind, id } => {
            let mut session = EditorSession::from_configuration(&config);
            if session.remove(kind.into(), id) {
                save(&store, &cli.owner, session)?;
                println!("removed {}", id);
            } else {
                println!("no entry {}", id);
            }
        }
        Commands::Check { date, json } => {
            let today = resolve_today(cli.today.as_deref())?;
            let selection = date
                .as_deref()
                .map(calendar::parse_candidate)
                .transpose()?;
            let decision = can_proceed(&config, selection, today);

            if json {
                let response = GateResponse::from(decision);
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                print_decision(&config, selection, today, decision.reason());
            }

            if decision.is_blocked() {
                return Ok(EXIT_BLOCKED);
            }
        }
        Commands::Blocked { from, to } => {
            let today = resolve_today(cli.today.as_deref())?;
            let from = calendar::parse_date(&from)?;
            let to = calendar::parse_date(&to)?;
            for (date, reason) in delivery_rules::blocked_dates_between(&config, from, to, today) {
                println!("{}  {}", format_date(date), reason);
            }
        }
    }

    Ok(0)
}

/// Install the stderr subscriber. `RUST_LOG` wins over `level` when set.
fn init_logging(level: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)
            .with_context(|| format!("Invalid log level/filter '{}'", level))?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install log subscriber: {}", e))
}

fn resolve_today(today: Option<&str>) -> Result<NaiveDate> {
    match today {
        Some(raw) => Ok(calendar::parse_date(raw).context("Invalid --today")?),
        None => Ok(chrono::Local::now().date_naive()),
    }
}

fn save(store: &FileStore, owner: &str, session: EditorSession) -> Result<()> {
    let path = store.path_for(owner);
    persist_session(store, owner, session)
        .map(|_| ())
        .with_context(|| format!("Failed to save configuration to {}", path.display()))
}

fn print_listing(session: &EditorSession) {
    let days: Vec<&str> = session
        .blocked_weekdays()
        .iter()
        .filter_map(|&d| calendar::weekday_name(d))
        .collect();
    if days.is_empty() {
        println!("Blocked days: none");
    } else {
        println!("Blocked days: {}", days.join(", "));
    }

    println!("Dates:");
    for (id, date) in session.dates() {
        println!("  [{}] {}", id, format_date(date));
    }

    println!("Ranges:");
    for (id, range) in session.ranges() {
        println!("  [{}] {}", id, range);
    }
}

fn print_decision(
    config: &Configuration,
    selection: Option<NaiveDate>,
    today: NaiveDate,
    reason: Option<delivery_rules::BlockReason>,
) {
    let label = selection
        .map(format_date)
        .unwrap_or_else(|| "(none)".to_string());

    match reason {
        None => println!("available: {}", label),
        Some(reason) => {
            println!("blocked: {}: {}", label, reason);
            if let Some(from) = selection {
                match next_available(config, from, today, SUGGESTION_HORIZON_DAYS) {
                    Some(next) => println!("next available: {}", format_date(next)),
                    None => println!(
                        "next available: none within {} days",
                        SUGGESTION_HORIZON_DAYS
                    ),
                }
            }
        }
    }
}
