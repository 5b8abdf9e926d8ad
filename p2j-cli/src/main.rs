use anyhow::Result;
use clap::{Parser, Subcommand};
use p2j_core::Personality;
use tracing_subscriber::EnvFilter;

mod auth;
mod config;
mod focus_cmd;
mod llm;
mod report_cmd;
#[cfg(feature = "server")]
mod server;
mod setup;
mod state;
mod task_cmd;
mod timeline_cmd;
mod user_cmd;

use setup::parse_personality;
use task_cmd::TaskCommand;
use timeline_cmd::TimelineCommand;
use user_cmd::{MoodCommand, UserCommand, XpCommand};

#[derive(Parser, Debug)]
#[command(
    name = "p2j",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("P2J_BUILD_SHA"), ")"),
    about = "P2J: plan, track and level up your tasks"
)]
struct Cli {
    /// Log debug output to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// One-time interactive setup: name, assistant personality, timezone
    Setup,

    /// Read or initialize ~/.p2j/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Store the model API key
    Auth {
        #[command(subcommand)]
        command: AuthCommand,
    },

    /// Add, list, edit and complete tasks
    Task {
        #[command(subcommand)]
        command: TaskCommand,
    },

    /// Profile, level and daily goal
    User {
        #[command(subcommand)]
        command: UserCommand,
    },

    /// Adjust XP by hand
    Xp {
        #[command(subcommand)]
        command: XpCommand,
    },

    /// Daily mood log
    Mood {
        #[command(subcommand)]
        command: MoodCommand,
    },

    /// Day/month timeline of task bars
    Timeline {
        #[command(subcommand)]
        command: TimelineCommand,
    },

    /// Let the assistant break a goal into scheduled tasks
    Plan {
        /// What you want to get done
        #[arg(required = true, num_args = 1..)]
        input: Vec<String>,

        /// Override the profile's assistant personality
        #[arg(long, value_parser = parse_personality)]
        personality: Option<Personality>,

        /// Print the generated tasks without saving them
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },

    /// Weekly completion report with an assistant summary
    Report {
        /// Skip the summary request
        #[arg(long, default_value_t = false)]
        offline: bool,
    },

    /// Focus/break countdown in the terminal
    Focus {
        /// Stop after this many focus phases
        #[arg(long, default_value_t = 1)]
        cycles: u32,
    },

    /// Run the schedule/summary request proxy
    #[cfg(feature = "server")]
    Serve {
        #[arg(long, default_value = "127.0.0.1:3001")]
        addr: String,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config if none exists
    Init,
    /// Print the effective config
    Show,
}

#[derive(Subcommand, Debug)]
enum AuthCommand {
    /// Paste an OpenRouter (or other OpenAI-compatible) API key
    PasteKey,
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Setup => setup::run_setup()?,

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => config::show_config()?,
        },

        Command::Auth { command } => match command {
            AuthCommand::PasteKey => auth::paste_key()?,
        },

        Command::Task { command } => task_cmd::run(command)?,
        Command::User { command } => user_cmd::run_user(command)?,
        Command::Xp { command } => user_cmd::run_xp(command)?,
        Command::Mood { command } => user_cmd::run_mood(command)?,
        Command::Timeline { command } => timeline_cmd::run(command)?,

        Command::Plan {
            input,
            personality,
            dry_run,
        } => report_cmd::plan(input.join(" "), personality, dry_run).await?,

        Command::Report { offline } => report_cmd::report(offline).await?,

        Command::Focus { cycles } => focus_cmd::run(cycles).await?,

        #[cfg(feature = "server")]
        Command::Serve { addr } => {
            let cfg = config::load_config()?;
            let client = llm::LlmClient::from_config(&cfg.llm)?;
            server::serve(client, &addr).await?;
        }
    }

    Ok(())
}
