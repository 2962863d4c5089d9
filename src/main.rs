use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use ratewise::core::ProviderKind;
use ratewise::core::log::init_logging;
use rust_decimal::Decimal;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    /// Provider to try first (frankfurter, floatrates, erapi_open)
    #[arg(short, long, global = true)]
    provider: Option<ProviderKind>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for ratewise::AppCommand {
    fn from(cmd: Commands) -> ratewise::AppCommand {
        match cmd {
            Commands::Rates => ratewise::AppCommand::Rates,
            Commands::Refresh => ratewise::AppCommand::Refresh,
            Commands::Convert { amount, from, to } => {
                ratewise::AppCommand::Convert { amount, from, to }
            }
            Commands::Diagnose => ratewise::AppCommand::Diagnose,
            Commands::Summary => ratewise::AppCommand::Summary,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Show current exchange rates and where they came from
    Rates,
    /// Discard today's cached rates and fetch again
    Refresh,
    /// Convert an amount between two currencies
    Convert {
        amount: Decimal,
        /// Source currency code
        from: String,
        /// Target currency code, defaults to the configured display currency
        to: Option<String>,
    },
    /// Show provider priority, circuit state and a sample conversion
    Diagnose,
    /// Display subscription costs in the display currency
    Summary,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => ratewise::cli::setup::setup(),
        Some(cmd) => {
            ratewise::run_command(cmd.into(), cli.config_path.as_deref(), cli.provider).await
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
