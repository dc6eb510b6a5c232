mod commands;
mod serve;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

/// Conforma process conformance toolchain.
#[derive(Parser)]
#[command(name = "conforma", version, about = "Conforma process conformance toolchain")]
struct Cli {
    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Align an event log against a process model and print per-trace fitness
    Align {
        /// Path to the process model document
        model: PathBuf,
        /// Path to the event log document
        log: PathBuf,
    },

    /// Run conformance analytics and print the aggregated report
    Analyze {
        /// Path to the process model document
        model: PathBuf,
        /// Path to the event log document
        log: PathBuf,
        /// Comma-separated list of analytics to run
        /// (fitness,bins,outcomes,roles,resources,amounts,sequences). Default: all.
        #[arg(long)]
        analysis: Option<String>,
    },

    /// Start the Conforma HTTP API server
    Serve {
        /// Port to listen on
        #[arg(long, default_value = "8080")]
        port: u16,
        /// Directory that receives uploaded artifact pairs
        #[arg(long, default_value = "uploads")]
        upload_dir: PathBuf,
        /// Process model document to pre-load (requires --log)
        #[arg(long)]
        model: Option<PathBuf>,
        /// Event log document to pre-load (requires --model)
        #[arg(long)]
        log: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Align { model, log } => {
            commands::cmd_align(&model, &log, cli.quiet);
        }
        Commands::Analyze {
            model,
            log,
            analysis,
        } => {
            commands::cmd_analyze(&model, &log, analysis.as_deref(), cli.quiet);
        }
        Commands::Serve {
            port,
            upload_dir,
            model,
            log,
        } => {
            if model.is_some() != log.is_some() {
                eprintln!("error: --model and --log must both be provided");
                process::exit(1);
            }
            let preload = model.zip(log);
            let rt = tokio::runtime::Runtime::new().expect("failed to create tokio runtime");
            if let Err(e) = rt.block_on(serve::start_server(port, upload_dir, preload)) {
                eprintln!("Server error: {}", e);
                process::exit(1);
            }
        }
    }
}

/// Print an error to stderr unless quiet, then let the caller exit.
pub(crate) fn report_error(message: &str, quiet: bool) {
    if !quiet {
        eprintln!("error: {}", message);
    }
}
