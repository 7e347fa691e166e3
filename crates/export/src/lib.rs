//! Export helpers for waypoint payloads and JSON plan artifacts.

pub mod waypoints {
    use mp_core::Waypoint;

    /// Serialize waypoints as a MessagePack array of `[north, east, altitude, heading]` rows,
    /// the overlay format the simulator reads.
    pub fn encode(waypoints: &[Waypoint]) -> Result<Vec<u8>, rmp_serde::encode::Error> {
        rmp_serde::to_vec(waypoints)
    }

    /// Parse a payload produced by [`encode`].
    pub fn decode(bytes: &[u8]) -> Result<Vec<Waypoint>, rmp_serde::decode::Error> {
        rmp_serde::from_slice(bytes)
    }
}

pub mod plan {
    use std::fs::{self, File};
    use std::io::{self, BufWriter, Write};
    use std::path::Path;

    use mp_core::{GlobalPosition, Waypoint};
    use serde::{Deserialize, Serialize};

    /// Create a writer for the target path, handling stdout (`-`) by convention.
    pub fn writer_for_path(path: &Path) -> io::Result<Box<dyn Write>> {
        if path == Path::new("-") {
            return Ok(Box::new(BufWriter::new(io::stdout())));
        }
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = File::create(path)?;
        Ok(Box::new(BufWriter::new(file)))
    }

    /// Offline plan artifact: inputs and the resulting waypoint list.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct PlanDocument {
        pub planner: String,
        pub home: GlobalPosition,
        pub start: GlobalPosition,
        pub goal: GlobalPosition,
        pub target_altitude: f64,
        pub safety_margin: f64,
        pub waypoints: Vec<Waypoint>,
    }

    impl PlanDocument {
        /// Pretty-printed JSON, newline terminated.
        pub fn write_to(&self, writer: &mut dyn Write) -> io::Result<()> {
            serde_json::to_writer_pretty(&mut *writer, self)?;
            writeln!(writer)?;
            writer.flush()
        }
    }

    /// Write a plan document to `path` (`-` for stdout).
    pub fn write_plan(path: &Path, document: &PlanDocument) -> io::Result<()> {
        let mut writer = writer_for_path(path)?;
        document.write_to(writer.as_mut())
    }
}
