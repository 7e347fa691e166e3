//! Fly one mission: connect over MAVLink, plan once after arming, follow the waypoints, land.

use std::path::PathBuf;

use clap::Parser;
use motion_planning::link::{self, MavlinkVehicle, NavLog};
use motion_planning::mission::{Supervisor, planners};
use motion_planning::session::{self, Overrides};

#[derive(Parser)]
#[command(author, version, about = "Supervise a single waypoint mission over MAVLink")]
struct Cli {
    /// Mission manifest (TOML or YAML)
    #[arg(long, default_value = "configs/mission.toml")]
    config: PathBuf,

    /// Vehicle host (overrides the manifest)
    #[arg(long)]
    host: Option<String>,

    /// Vehicle TCP port (overrides the manifest)
    #[arg(long)]
    port: Option<u16>,

    /// CSV telemetry log (overrides the manifest)
    #[arg(long)]
    nav_log: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let settings = session::load_settings(
        &cli.config,
        Overrides {
            host: cli.host,
            port: cli.port,
            nav_log: cli.nav_log,
            ..Overrides::default()
        },
    )?;

    let mut planner = planners::from_settings(&settings)?;
    let mut vehicle = MavlinkVehicle::connect(&settings.connection.socket_address())?;
    let mut nav_log = settings.nav_log.as_ref().map(NavLog::create).transpose()?;
    let mut supervisor = Supervisor::new(settings.guards);

    let result = link::run(
        &mut vehicle,
        &mut supervisor,
        planner.as_mut(),
        nav_log.as_mut(),
    );
    if let Some(nav_log) = nav_log {
        if let Err(err) = nav_log.finish() {
            log::warn!("nav log not flushed: {err}");
        }
    }

    match result {
        Ok(state) => {
            println!("Mission finished in {state}");
            Ok(())
        }
        Err(err) => {
            if let Some(failure) = supervisor.failure() {
                eprintln!("[error] mission failed ({:?}): {}", failure.kind, failure.message);
            }
            session::teardown(&mut vehicle);
            Err(err.into())
        }
    }
}
