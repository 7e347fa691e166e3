//! CSV flight log of the telemetry received during a mission.

use std::fs::{self, File};
use std::path::Path;
use std::time::Instant;

use mp_mission::VehicleTelemetry;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct NavLogRow<'a> {
    time: f64,
    message: &'a str,
    north: f64,
    east: f64,
    down: f64,
    velocity_north: f64,
    velocity_east: f64,
    velocity_down: f64,
    longitude: f64,
    latitude: f64,
    altitude: f64,
    armed: bool,
    guided: bool,
}

/// One row per accepted telemetry update, stamped with seconds since the log opened.
pub struct NavLog {
    writer: csv::Writer<File>,
    started: Instant,
    rows: usize,
}

impl NavLog {
    /// Create the log file, and its parent directories if needed.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, csv::Error> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let writer = csv::Writer::from_path(path)?;
        log::info!("recording telemetry to {}", path.display());
        Ok(Self {
            writer,
            started: Instant::now(),
            rows: 0,
        })
    }

    /// Append the snapshot as it stands after `message` was applied.
    pub fn record(&mut self, message: &str, telemetry: &VehicleTelemetry) -> Result<(), csv::Error> {
        let local = telemetry.local_position;
        let [velocity_north, velocity_east, velocity_down] = telemetry.local_velocity;
        let global = telemetry.global_position;
        self.writer.serialize(NavLogRow {
            time: self.started.elapsed().as_secs_f64(),
            message,
            north: local.north,
            east: local.east,
            down: local.down,
            velocity_north,
            velocity_east,
            velocity_down,
            longitude: global.longitude,
            latitude: global.latitude,
            altitude: global.altitude,
            armed: telemetry.armed,
            guided: telemetry.guided,
        })?;
        self.rows += 1;
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Flush and close the log, returning the number of rows written.
    pub fn finish(mut self) -> Result<usize, csv::Error> {
        self.writer.flush()?;
        log::info!("telemetry log closed after {} rows", self.rows);
        Ok(self.rows)
    }
}
