mod commands;
mod logging;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "edgeplan")]
#[command(about = "Declarative property rules, GTM and bot manager resources", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Property rule tree commands
    #[command(subcommand)]
    Rules(RulesCommands),
    /// Recorded resource state
    #[command(subcommand)]
    State(StateCommands),
    /// Show version information
    Version,
}

#[derive(Subcommand)]
enum RulesCommands {
    /// Build the rule tree document from a rules block (JSON or YAML)
    Build {
        /// File holding one `rules_<format>` block
        file: PathBuf,
        /// Write the document here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Check that a rules block builds
    Validate {
        /// File holding one `rules_<format>` block
        file: PathBuf,
    },
}

#[derive(Subcommand)]
enum StateCommands {
    /// List recorded resources
    List,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Version needs no settings
    if matches!(cli.command, Commands::Version) {
        println!("edgeplan {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let settings = edgeplan_config::load()?;
    logging::init_logging(&settings)?;

    match cli.command {
        Commands::Rules(RulesCommands::Build { file, output }) => {
            commands::rules::handle_build(&file, output.as_deref())?;
        }
        Commands::Rules(RulesCommands::Validate { file }) => {
            commands::rules::handle_validate(&file)?;
        }
        Commands::State(StateCommands::List) => {
            commands::state::handle_list(&settings).await?;
        }
        Commands::Version => {}
    }

    Ok(())
}
