//! hearth - Entry Point
//!
//! | Command | Description |
//! |---------|-------------|
//! | `hearth` | Start every registered unit and serve until Ctrl+C |
//! | `hearth --check` | Start, run the status probes, stop |
//! | `hearth --list-units` | Print the link-time configuration units |

use clap::Parser;
use hearth::host::{HostOptions, ensure_clean, run};
use hearth::infrastructure::di::list_units;

/// Command line interface for hearth
#[derive(Parser, Debug)]
#[command(name = "hearth")]
#[command(about = "hearth - In-process component host")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<std::path::PathBuf>,

    /// Print the registered configuration units and exit
    #[arg(long)]
    pub list_units: bool,

    /// Start the runtime, report its status and stop
    #[arg(long)]
    pub check: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if cli.list_units {
        for (name, description) in list_units() {
            println!("{name:<16} {description}");
        }
        return Ok(());
    }

    let report = run(HostOptions {
        config_path: cli.config,
        check: cli.check,
    })
    .await?;
    ensure_clean(&report)
}
