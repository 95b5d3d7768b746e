mod commands;
mod render;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use datemark_core::config::DatemarkConfig;
use datemark_core::store::EventStore;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt, reload};

use commands::EventArgs;

const DEFAULT_LOG_LEVEL: &str = "warn";

#[derive(Parser)]
#[command(name = "datemark")]
#[command(about = "Recurring calendar events, day markers and holiday overlays")]
struct Cli {
    /// Event store file (defaults to store_path from config)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every date a recurrence produces
    Occurrences {
        /// Anchor date (YYYY-MM-DD)
        date: String,

        /// none, daily, weekly or monthly
        #[arg(short, long, default_value = "none")]
        repeat: String,

        /// Inclusive end date (YYYY-MM-DD)
        #[arg(short, long)]
        until: Option<String>,
    },
    /// Check whether a recurrence lands on a date
    OccursOn {
        /// Anchor date (YYYY-MM-DD)
        date: String,

        /// Date to check (YYYY-MM-DD)
        target: String,

        #[arg(short, long, default_value = "none")]
        repeat: String,

        #[arg(short, long)]
        until: Option<String>,
    },
    /// Create an event
    Add {
        title: String,

        #[command(flatten)]
        args: EventArgs,
    },
    /// Change an event (by id or id prefix)
    Edit {
        id: String,

        /// New title
        #[arg(long)]
        title: Option<String>,

        #[command(flatten)]
        args: EventArgs,

        /// Remove the repeat end date
        #[arg(long, conflicts_with = "until")]
        no_end: bool,
    },
    /// Delete an event (by id or id prefix)
    Delete { id: String },
    /// List all stored events
    List,
    /// Show the events on a day
    Day {
        /// Date (YYYY-MM-DD), defaults to today
        date: Option<String>,
    },
    /// Show day markers and holidays for a month
    Month {
        /// Month (YYYY-MM), defaults to the current month
        month: Option<String>,

        /// Skip the holiday overlay
        #[arg(long)]
        no_holidays: bool,
    },
    /// Write an event as .ics
    Export {
        id: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Import the first event of an .ics file
    Import { file: PathBuf },
    /// Print a shareable text summary of an event
    Share { id: String },
    /// Write a default config file
    Init,
}

impl Commands {
    /// Pure date arithmetic and `init` run without reading the config file.
    fn needs_config(&self) -> bool {
        !matches!(
            self,
            Commands::Occurrences { .. } | Commands::OccursOn { .. } | Commands::Init
        )
    }
}

type LogFilter = reload::Handle<EnvFilter, Registry>;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_filter = init_tracing();
    let config = if cli.command.needs_config() {
        let config = DatemarkConfig::load().context("Failed to load configuration")?;
        apply_log_level(log_filter.as_ref(), &config.log_level);
        config
    } else {
        DatemarkConfig::default()
    };

    match cli.command {
        Commands::Occurrences {
            date,
            repeat,
            until,
        } => commands::recurrence::occurrences(&date, &repeat, until.as_deref()),
        Commands::OccursOn {
            date,
            target,
            repeat,
            until,
        } => commands::recurrence::occurs_on(&date, &target, &repeat, until.as_deref()),
        Commands::Add { title, args } => {
            let mut store = open_store(cli.store, &config)?;
            commands::events::add(&mut store, title, args)
        }
        Commands::Edit {
            id,
            title,
            args,
            no_end,
        } => {
            let mut store = open_store(cli.store, &config)?;
            commands::events::edit(&mut store, &id, title, args, no_end)
        }
        Commands::Delete { id } => {
            let mut store = open_store(cli.store, &config)?;
            commands::events::delete(&mut store, &id)
        }
        Commands::List => commands::events::list(&open_store(cli.store, &config)?),
        Commands::Day { date } => {
            commands::events::day(&open_store(cli.store, &config)?, date.as_deref())
        }
        Commands::Month { month, no_holidays } => {
            let store = open_store(cli.store, &config)?;
            let country = if no_holidays {
                None
            } else {
                config.holiday_country.as_deref()
            };
            commands::month::run(&store, month.as_deref(), country, &config.holiday_api).await
        }
        Commands::Export { id, output } => {
            commands::share::export(&open_store(cli.store, &config)?, &id, output.as_deref())
        }
        Commands::Import { file } => {
            let mut store = open_store(cli.store, &config)?;
            commands::share::import(&mut store, &file)
        }
        Commands::Share { id } => commands::share::share(&open_store(cli.store, &config)?, &id),
        Commands::Init => commands::init::run(),
    }
}

/// Log to stderr at RUST_LOG, or `warn` until the configured level is known.
///
/// Returns a handle for swapping in the configured level; `None` when RUST_LOG
/// is set, since it takes precedence.
fn init_tracing() -> Option<LogFilter> {
    let from_env = EnvFilter::try_from_default_env().ok();
    let pinned = from_env.is_some();
    let (filter, handle) =
        reload::Layer::new(from_env.unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_LEVEL)));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();

    (!pinned).then_some(handle)
}

fn apply_log_level(log_filter: Option<&LogFilter>, level: &str) {
    let Some(handle) = log_filter else {
        return;
    };

    match EnvFilter::try_new(level) {
        Ok(filter) => {
            if let Err(e) = handle.reload(filter) {
                tracing::warn!(error = %e, "Could not apply configured log level");
            }
        }
        Err(e) => tracing::warn!(level, error = %e, "Ignoring invalid log_level"),
    }
}

fn open_store(path: Option<PathBuf>, config: &DatemarkConfig) -> Result<EventStore> {
    let path = path.unwrap_or_else(|| config.store_path());
    EventStore::open(path.clone())
        .with_context(|| format!("Failed to open event store at {}", path.display()))
}
