use std::path::PathBuf;

use clap::{ArgGroup, CommandFactory, Parser, Subcommand};
use dailydose_core::tracker::MAX_HISTORY_DAYS;
use dailydose_core::Config;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "dailydose", version, about = "Daily intake and streak tracker")]
struct Cli {
    /// Database file (overrides storage.database_path)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mark today's intake as taken
    Take {
        /// Optional note for the day
        #[arg(long)]
        notes: Option<String>,
    },
    /// Mark today's intake as missed
    Skip {
        #[arg(long)]
        notes: Option<String>,
    },
    /// Record or edit the outcome for a past date
    #[command(group(ArgGroup::new("outcome").required(true).args(["taken", "missed"])))]
    Log {
        /// Date as yyyy-MM-dd
        date: String,
        #[arg(long)]
        taken: bool,
        #[arg(long)]
        missed: bool,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Print today's status and streak as JSON
    Status,
    /// Show the last N days, filling days without a record
    History {
        /// Number of days (default from history.default_days)
        #[arg(long, value_parser = clap::value_parser!(u32).range(0..=i64::from(MAX_HISTORY_DAYS)))]
        days: Option<u32>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Print the stored streak aggregate
    Streak,
    /// Rebuild the streak from history and repair drift
    Reconcile,
    /// Reminder and goal settings
    Settings {
        #[command(subcommand)]
        action: commands::settings::SettingsAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Delete all records, streak data and settings
    Reset {
        /// Confirm the irreversible reset
        #[arg(long)]
        yes: bool,
    },
    /// Generate shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    let config = Config::load_or_default();
    init_tracing(&config);

    let ctx = commands::Context::new(config, cli.db);
    let result = match cli.command {
        Commands::Take { notes } => commands::intake::record_today(&ctx, true, notes),
        Commands::Skip { notes } => commands::intake::record_today(&ctx, false, notes),
        Commands::Log {
            date,
            taken,
            missed: _,
            notes,
        } => commands::intake::record_date(&ctx, &date, taken, notes),
        Commands::Status => commands::intake::status(&ctx),
        Commands::History { days, json } => commands::history::run(&ctx, days, json),
        Commands::Streak => commands::intake::streak(&ctx),
        Commands::Reconcile => commands::intake::reconcile(&ctx),
        Commands::Settings { action } => commands::settings::run(&ctx, action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Reset { yes } => commands::reset::run(&ctx, yes),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "dailydose", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
