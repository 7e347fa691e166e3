//! Loader for the static obstacle-map artifact (`colliders.csv`).
//!
//! Layout:
//! * line 1: `lat0 <deg>, lon0 <deg>` home anchor;
//! * line 2: column titles, ignored;
//! * lines 3+: `north,east,alt,d_north,d_east,d_alt` obstacle rows.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use mp_core::{GlobalPosition, ObstacleRecord};
use thiserror::Error;

/// Geodetic anchor of the map's local frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HomeAnchor {
    pub latitude: f64,
    pub longitude: f64,
}

impl HomeAnchor {
    /// Home position at altitude zero.
    pub fn to_global(&self) -> GlobalPosition {
        GlobalPosition::new(self.longitude, self.latitude, 0.0)
    }
}

/// Parsed obstacle map.
#[derive(Debug, Clone)]
pub struct ObstacleMap {
    pub home: HomeAnchor,
    pub obstacles: Vec<ObstacleRecord>,
}

/// Errors raised while reading an obstacle map.
#[derive(Debug, Error)]
pub enum ObstacleMapError {
    #[error("failed to read obstacle map: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse obstacle map: {0}")]
    Csv(#[from] csv::Error),
    #[error("obstacle map is empty (missing `lat0, lon0` header)")]
    MissingHeader,
    #[error("malformed obstacle map header: {0}")]
    MalformedHeader(String),
    #[error("malformed obstacle row at line {line}: {reason}")]
    MalformedRow { line: u64, reason: String },
}

const ROW_FIELDS: usize = 6;

/// Load an obstacle map from disk.
pub fn load_obstacle_map<P: AsRef<Path>>(path: P) -> Result<ObstacleMap, ObstacleMapError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let map = parse_obstacle_map(file)?;
    log::debug!(
        "loaded {} obstacles from {} (lat0 = {}, lon0 = {})",
        map.obstacles.len(),
        path.display(),
        map.home.latitude,
        map.home.longitude
    );
    Ok(map)
}

/// Parse an obstacle map from any reader.
pub fn parse_obstacle_map<R: Read>(reader: R) -> Result<ObstacleMap, ObstacleMapError> {
    let mut csv = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);
    let mut records = csv.records();

    let header = records.next().ok_or(ObstacleMapError::MissingHeader)??;
    let home = parse_header(&header)?;
    // The line after the header holds column titles or nothing; the reader drops
    // empty lines, so match on the line number rather than on record order.
    let titles_line = record_line(&header) + 1;

    let mut obstacles = Vec::new();
    for record in records {
        let record = record?;
        if record_line(&record) == titles_line
            || record.iter().all(|field| field.trim().is_empty())
        {
            continue;
        }
        obstacles.push(parse_row(&record)?);
    }

    Ok(ObstacleMap { home, obstacles })
}

fn parse_header(record: &StringRecord) -> Result<HomeAnchor, ObstacleMapError> {
    if record.len() < 2 {
        return Err(ObstacleMapError::MalformedHeader(format!(
            "expected `lat0 <deg>, lon0 <deg>`, found {} field(s)",
            record.len()
        )));
    }

    let latitude = header_value(&record[0], "lat0")?;
    let longitude = header_value(&record[1], "lon0")?;

    if !(-90.0..=90.0).contains(&latitude) {
        return Err(ObstacleMapError::MalformedHeader(format!(
            "lat0 {latitude} outside [-90, 90]"
        )));
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(ObstacleMapError::MalformedHeader(format!(
            "lon0 {longitude} outside [-180, 180]"
        )));
    }

    Ok(HomeAnchor {
        latitude,
        longitude,
    })
}

/// Extract `<value>` from a `"<key> <value>"` field; empty tokens from leading spaces are skipped.
fn header_value(field: &str, key: &str) -> Result<f64, ObstacleMapError> {
    let mut tokens = field.split_whitespace();
    match (tokens.next(), tokens.next()) {
        (Some(name), Some(value)) if name.eq_ignore_ascii_case(key) => {
            let parsed: f64 = value.parse().map_err(|_| {
                ObstacleMapError::MalformedHeader(format!("{key} value `{value}` is not a number"))
            })?;
            if parsed.is_finite() {
                Ok(parsed)
            } else {
                Err(ObstacleMapError::MalformedHeader(format!(
                    "{key} value `{value}` is not finite"
                )))
            }
        }
        _ => Err(ObstacleMapError::MalformedHeader(format!(
            "expected `{key} <value>`, found `{}`",
            field.trim()
        ))),
    }
}

fn record_line(record: &StringRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or_default()
}

fn parse_row(record: &StringRecord) -> Result<ObstacleRecord, ObstacleMapError> {
    let line = record_line(record);
    if record.len() != ROW_FIELDS {
        return Err(ObstacleMapError::MalformedRow {
            line,
            reason: format!("expected {ROW_FIELDS} fields, found {}", record.len()),
        });
    }

    let mut values = [0.0; ROW_FIELDS];
    for (slot, field) in values.iter_mut().zip(record.iter()) {
        let field = field.trim();
        *slot = field
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| ObstacleMapError::MalformedRow {
                line,
                reason: format!("`{field}` is not a finite number"),
            })?;
    }

    let [north, east, altitude, half_north, half_east, half_altitude] = values;
    if half_north < 0.0 || half_east < 0.0 || half_altitude < 0.0 {
        return Err(ObstacleMapError::MalformedRow {
            line,
            reason: "half-extents must be non-negative".to_string(),
        });
    }

    Ok(ObstacleRecord {
        north,
        east,
        altitude,
        half_north,
        half_east,
        half_altitude,
    })
}
