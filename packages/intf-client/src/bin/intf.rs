//! `intf` command-line tool.

use clap::{Parser, Subcommand};
use intf_client::commands::{self, fetch::FetchArgs, find::FindArgs, sign::SignArgs, Outcome};
use intf_client::logging::init_tracing;
use intf_client::{Settings, System};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

#[derive(Debug, Parser)]
#[command(
    name = "intf",
    version,
    about = "Signed pagination and user search for the Interfolio APIs"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fetch every user of a system and save them as JSON.
    Fetch {
        /// RPT, FS or FAR.
        system: System,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        page_size: Option<usize>,
        /// sequential, windowed or pool.
        #[arg(long)]
        strategy: Option<String>,
    },
    /// Find the FAR user ids behind FIRSTNAME/LASTNAME.
    Find {
        #[arg(long)]
        strategy: Option<String>,
        #[arg(long)]
        page_size: Option<usize>,
        /// Also write the found users as JSON.
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        skip_profiles: bool,
    },
    /// Show one page of users.
    Preview {
        system: System,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Print signed headers and a curl command for a path.
    Sign {
        /// Path and query, e.g. "/users?limit=1&page=1".
        path: String,
        #[arg(long, default_value = "FAR")]
        system: System,
        /// Verify this Authorization header instead of signing.
        #[arg(long, requires = "timestamp")]
        verify: Option<String>,
        /// Timestamp that goes with --verify.
        #[arg(long)]
        timestamp: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match Settings::load() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = init_tracing(settings.log_file()) {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_ctrl_c(cancel.clone()));

    let result = match cli.command {
        Command::Fetch { system, output, page_size, strategy } => {
            let args = FetchArgs { system, output, page_size, strategy };
            commands::fetch::run(&settings, args, &cancel).await
        }
        Command::Find { strategy, page_size, output, skip_profiles } => {
            let args = FindArgs { strategy, page_size, output, skip_profiles };
            commands::find::run(&settings, args, &cancel).await
        }
        Command::Preview { system, limit } => {
            commands::preview::run(&settings, system, limit, &cancel).await
        }
        Command::Sign { path, system, verify, timestamp } => {
            let verify = verify.zip(timestamp);
            commands::sign::run(&settings, SignArgs { path, system, verify })
        }
    };

    // A Ctrl-C that landed after the last cancellation check still counts.
    let result = result.map(|outcome| {
        if cancel.is_cancelled() {
            Outcome::Interrupted
        } else {
            outcome
        }
    });

    match result {
        Ok(outcome) => {
            if outcome == Outcome::Interrupted {
                warn!("Interrupted");
            }
            outcome.exit_code()
        }
        Err(e) => {
            error!(error = %e, "Failed");
            ExitCode::FAILURE
        }
    }
}

async fn cancel_on_ctrl_c(cancel: CancellationToken) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            warn!("Received SIGINT, stopping after in-flight work");
            cancel.cancel();
        }
        Err(e) => error!(error = %e, "Failed to install Ctrl+C handler"),
    }
}
