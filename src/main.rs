use anyhow::Result;
use clap::Parser;
use drivedb_patch::{PatchOptions, PatchOrchestrator, Settings};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "drivedb-patch")]
#[command(about = "Add installed drives to the NAS drive compatibility database")]
#[command(version = "1.0.0")]
struct Cli {
    /// Show the entries added to each database
    #[arg(short = 's', long = "showedits")]
    show_edits: bool,

    /// Also disable the OS drive compatibility check
    #[arg(short, long)]
    force: bool,

    /// Block drive database updates (always applied)
    #[arg(short = 'n', long = "nodbupdate")]
    no_db_update: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    /// Settings file (default: /etc/drivedb-patch.toml if present)
    #[arg(short, long, env = "DRIVEDB_CONFIG")]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Check for root privileges
    if !is_root() {
        eprintln!("Error: This program requires root privileges.");
        eprintln!("Please run with sudo or as root user.");
        std::process::exit(1);
    }

    init_logging(cli.debug);

    let options = PatchOptions {
        show_edits: cli.show_edits,
        force: cli.force,
        no_db_update: cli.no_db_update,
    };

    let result = Settings::load(cli.config.as_deref())
        .and_then(|settings| PatchOrchestrator::new(settings, options).execute());

    match result {
        Ok(summary) => {
            tracing::info!(
                platform = %summary.platform,
                ata = summary.ata.len(),
                nvme = summary.nvme.len(),
                edits = summary.edits.total(),
                "Patch run complete"
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!(error = %e, code = e.exit_code(), "Patch run failed");
            eprintln!("\nError: {}", e);
            std::process::exit(e.exit_code());
        }
    }
}

fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn is_root() -> bool {
    unsafe { libc::geteuid() == 0 }
}
