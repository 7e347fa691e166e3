//! Configuration models and loaders for a motion planning mission.

use std::fs::File;
use std::path::{Path, PathBuf};

use mp_core::GlobalPosition;
use serde::Deserialize;
use thiserror::Error;

/// Top-level mission settings parsed from a TOML or YAML manifest.
#[derive(Debug, Deserialize, Clone)]
pub struct MissionSettings {
    /// Obstacle map (`colliders.csv`), relative to the working directory.
    pub colliders: PathBuf,
    pub goal: GoalConfig,
    #[serde(default = "default_target_altitude")]
    pub target_altitude: f64,
    #[serde(default = "default_safety_margin")]
    pub safety_margin: f64,
    #[serde(default)]
    pub planner: PlannerConfig,
    #[serde(default)]
    pub guards: GuardThresholds,
    #[serde(default)]
    pub connection: ConnectionConfig,
    /// CSV telemetry log written while flying; no log when omitted.
    #[serde(default)]
    pub nav_log: Option<PathBuf>,
}

/// Goal position in geodetic coordinates.
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct GoalConfig {
    pub longitude: f64,
    pub latitude: f64,
    #[serde(default)]
    pub altitude: f64,
}

impl GoalConfig {
    pub fn to_global(&self) -> GlobalPosition {
        GlobalPosition::new(self.longitude, self.latitude, self.altitude)
    }
}

/// Which planner adapter builds the navigable space.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(tag = "kind")]
pub enum PlannerConfig {
    #[default]
    #[serde(rename = "grid")]
    Grid,
    #[serde(rename = "roadmap")]
    Roadmap {
        #[serde(default = "default_node_spacing")]
        node_spacing: usize,
    },
}

impl PlannerConfig {
    pub fn name(&self) -> &'static str {
        match self {
            PlannerConfig::Grid => "grid",
            PlannerConfig::Roadmap { .. } => "roadmap",
        }
    }
}

/// Thresholds used by the supervisor's transition guards.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct GuardThresholds {
    /// Takeoff completes once altitude reaches this fraction of the target altitude.
    pub takeoff_altitude_fraction: f64,
    /// Horizontal distance (m) at which a waypoint counts as reached.
    pub waypoint_radius: f64,
    /// Horizontal speed (m/s) below which the final waypoint may transition to landing.
    pub landing_speed: f64,
    /// Global altitude above home (m) below which the vehicle counts as landed.
    pub landed_altitude: f64,
    /// Absolute local down (m) below which the vehicle counts as landed.
    pub landed_down: f64,
}

impl Default for GuardThresholds {
    fn default() -> Self {
        Self {
            takeoff_altitude_fraction: 0.95,
            waypoint_radius: 1.0,
            landing_speed: 1.0,
            landed_altitude: 0.1,
            landed_down: 0.01,
        }
    }
}

/// Vehicle link endpoint.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5760,
        }
    }
}

impl ConnectionConfig {
    /// `host:port` of the vehicle's MAVLink TCP endpoint.
    pub fn socket_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_target_altitude() -> f64 {
    5.0
}

fn default_safety_margin() -> f64 {
    5.0
}

fn default_node_spacing() -> usize {
    10
}

/// Errors that can occur while loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl MissionSettings {
    /// Reject values the pipeline or supervisor cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.target_altitude.is_finite() && self.target_altitude > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "target_altitude must be positive, got {}",
                self.target_altitude
            )));
        }
        if !(self.safety_margin.is_finite() && self.safety_margin >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "safety_margin must be non-negative, got {}",
                self.safety_margin
            )));
        }
        if !self.goal.to_global().is_valid() {
            return Err(ConfigError::Invalid(format!(
                "goal ({}, {}) is outside the supported geodetic range",
                self.goal.longitude, self.goal.latitude
            )));
        }
        if let PlannerConfig::Roadmap { node_spacing: 0 } = self.planner {
            return Err(ConfigError::Invalid(
                "planner.node_spacing must be at least 1".to_string(),
            ));
        }

        let guards = &self.guards;
        let positive = [
            ("takeoff_altitude_fraction", guards.takeoff_altitude_fraction),
            ("waypoint_radius", guards.waypoint_radius),
            ("landing_speed", guards.landing_speed),
            ("landed_altitude", guards.landed_altitude),
            ("landed_down", guards.landed_down),
        ];
        if let Some((name, value)) = positive
            .iter()
            .find(|(_, value)| !(value.is_finite() && *value > 0.0))
        {
            return Err(ConfigError::Invalid(format!(
                "guards.{name} must be positive, got {value}"
            )));
        }

        Ok(())
    }
}

/// Load and validate mission settings; `.toml` files are parsed as TOML, anything else as YAML.
pub fn load_mission_settings<P: AsRef<Path>>(path: P) -> Result<MissionSettings, ConfigError> {
    let path = path.as_ref();
    let settings: MissionSettings = if path.extension().map(|ext| ext == "toml").unwrap_or(false)
    {
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents)?
    } else {
        let reader = File::open(path)?;
        serde_yaml::from_reader(reader)?
    };
    settings.validate()?;
    Ok(settings)
}
