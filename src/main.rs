use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use fundscope::cli::funds::FundsQuery;
use fundscope::core::SortKey;
use fundscope::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// List funds from the daily NAV feed
    Funds {
        /// Category to keep, or "all"
        #[arg(long, default_value = "all")]
        category: String,
        /// One of returns, returns-asc, nav, nav-asc, name, name-desc
        #[arg(short, long, default_value = "returns")]
        sort: String,
        /// Keep funds whose fund house contains this text
        #[arg(short, long)]
        fund_house: Option<String>,
        /// Fetch trailing returns for every listed fund
        #[arg(short = 'r', long)]
        with_returns: bool,
        /// Show at most this many funds. With --with-returns and a returns
        /// sort, every matching fund is still fetched before the cut
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Display 1Y, 3Y and 5Y returns for scheme codes
    Returns {
        #[arg(required = true)]
        scheme_codes: Vec<String>,
    },
    /// List fund houses in the NAV feed
    Houses,
}

impl From<Commands> for fundscope::AppCommand {
    fn from(cmd: Commands) -> fundscope::AppCommand {
        match cmd {
            Commands::Funds {
                category,
                sort,
                fund_house,
                with_returns,
                limit,
            } => fundscope::AppCommand::Funds(FundsQuery {
                category,
                sort: sort.parse::<SortKey>().unwrap_or_default(),
                fund_house,
                with_returns,
                limit,
            }),
            Commands::Returns { scheme_codes } => fundscope::AppCommand::Returns(scheme_codes),
            Commands::Houses => fundscope::AppCommand::Houses,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => fundscope::cli::setup::setup(),
        Some(cmd) => fundscope::run_command(cmd.into(), cli.config_path.as_deref()).await,
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
