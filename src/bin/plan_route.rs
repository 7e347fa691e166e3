//! Offline planning: run the waypoint pipeline from the map's home anchor and write the plan as JSON.

use std::path::PathBuf;

use clap::Parser;
use motion_planning::export::plan::write_plan;
use motion_planning::session::{self, Overrides};

#[derive(Parser)]
#[command(author, version, about = "Plan a waypoint route without a vehicle")]
struct Cli {
    /// Mission manifest (TOML or YAML)
    #[arg(long, default_value = "configs/mission.toml")]
    config: PathBuf,

    /// Obstacle map to use instead of the manifest's
    #[arg(long)]
    colliders: Option<PathBuf>,

    /// Output path for the JSON plan (`-` for stdout)
    #[arg(long, default_value = "-")]
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let settings = session::load_settings(
        &cli.config,
        Overrides {
            colliders: cli.colliders,
            ..Overrides::default()
        },
    )?;

    let document = session::plan_offline(&settings)?;
    write_plan(&cli.output, &document)?;

    if cli.output.as_os_str() != "-" {
        println!(
            "Wrote {} waypoints ({} planner) to {}",
            document.waypoints.len(),
            document.planner,
            cli.output.display()
        );
    }
    Ok(())
}
