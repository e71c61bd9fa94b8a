use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod configuration;
mod error;
mod session;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// Flags shared by `ask` and `session`
#[derive(Args, Clone, Debug, Default)]
pub struct RunArgs {
    /// Question words and NAME=value settings (eg: OPENAI_API_KEY=sk-...)
    #[arg(value_name = "QUESTION")]
    words: Vec<String>,

    /// Maximum number of model calls per question
    #[arg(long)]
    max_steps: Option<usize>,

    /// Give up on a question after this many seconds
    #[arg(long)]
    deadline_secs: Option<u64>,

    /// Write the conversation to this file as JSON Lines after every run
    #[arg(long)]
    trace_file: Option<PathBuf>,

    /// Tera template to use instead of the built-in system prompt
    #[arg(long)]
    system_prompt_file: Option<PathBuf>,

    /// Settings file (defaults to ~/.config/abacus/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Answer one question and exit
    Ask {
        #[command(flatten)]
        args: RunArgs,
    },

    /// Ask questions interactively, recording each run
    Session {
        /// Name for the session trace under ~/.config/abacus/sessions
        #[arg(short, long)]
        name: Option<String>,

        #[command(flatten)]
        args: RunArgs,
    },

    /// List the known models
    Models,

    /// Print the version
    Version,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("abacus=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Command::Ask { args } => commands::ask::execute(args).await,
        Command::Session { name, args } => commands::session::execute(args, name).await,
        Command::Models => commands::models::execute(),
        Command::Version => {
            commands::version::print_version();
            Ok(())
        }
    }
}
