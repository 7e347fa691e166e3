//! 2.5-D occupancy grid at a fixed planning altitude.

use mp_core::{FrameOffsets, GridPoint, ObstacleRecord};

use crate::adapter::{NavigableSpace, PlannerError};

/// Upper bound on grid cells, so a corrupt map cannot request an absurd allocation.
const MAX_CELLS: usize = 64_000_000;

/// Integer cell index `(north, east)`.
pub type Cell = (i64, i64);

/// Boolean occupancy grid with 1 m cells; `true` marks a blocked cell.
#[derive(Debug, Clone)]
pub struct OccupancyGrid {
    north_size: usize,
    east_size: usize,
    cells: Vec<bool>,
    offsets: FrameOffsets,
}

impl OccupancyGrid {
    /// Rasterize every obstacle whose top, grown by `safety_margin`, rises above `target_altitude`.
    ///
    /// The grid spans the obstacles' un-inflated footprints; inflated footprints are clipped to it.
    pub fn from_obstacles(
        obstacles: &[ObstacleRecord],
        target_altitude: f64,
        safety_margin: f64,
    ) -> Result<Self, PlannerError> {
        if obstacles.is_empty() {
            return Err(PlannerError::EmptyMap);
        }
        if !target_altitude.is_finite() {
            return Err(PlannerError::InvalidParameter(format!(
                "target altitude {target_altitude} is not finite"
            )));
        }
        if !safety_margin.is_finite() || safety_margin < 0.0 {
            return Err(PlannerError::InvalidParameter(format!(
                "safety margin {safety_margin} must be a non-negative number"
            )));
        }

        let north_min = fold_min(obstacles, |o| o.north - o.half_north).floor();
        let north_max = fold_max(obstacles, |o| o.north + o.half_north).ceil();
        let east_min = fold_min(obstacles, |o| o.east - o.half_east).floor();
        let east_max = fold_max(obstacles, |o| o.east + o.half_east).ceil();

        let north_size = ((north_max - north_min).ceil() as usize).max(1);
        let east_size = ((east_max - east_min).ceil() as usize).max(1);
        let total = north_size.checked_mul(east_size).unwrap_or(usize::MAX);
        if total > MAX_CELLS {
            return Err(PlannerError::InvalidParameter(format!(
                "obstacle map spans {north_size} x {east_size} cells, above the {MAX_CELLS} cell limit"
            )));
        }

        let mut grid = Self {
            north_size,
            east_size,
            cells: vec![false; total],
            offsets: FrameOffsets {
                north: north_min,
                east: east_min,
            },
        };

        let clip = |v: f64, size: usize| v.clamp(0.0, (size - 1) as f64) as usize;
        let mut blocking = 0usize;
        for obstacle in obstacles
            .iter()
            .filter(|o| o.blocks_altitude(target_altitude, safety_margin))
        {
            blocking += 1;
            let (n_lo, n_hi, e_lo, e_hi) = obstacle.footprint(safety_margin);
            let n0 = clip(n_lo - north_min, north_size);
            let n1 = clip(n_hi - north_min, north_size);
            let e0 = clip(e_lo - east_min, east_size);
            let e1 = clip(e_hi - east_min, east_size);
            for n in n0..=n1 {
                let row = n * east_size;
                grid.cells[row + e0..=row + e1].fill(true);
            }
        }

        log::debug!(
            "occupancy grid {}x{} (offsets {}, {}), {} of {} obstacles block altitude {}",
            north_size,
            east_size,
            north_min,
            east_min,
            blocking,
            obstacles.len(),
            target_altitude
        );
        Ok(grid)
    }

    pub fn north_size(&self) -> usize {
        self.north_size
    }

    pub fn east_size(&self) -> usize {
        self.east_size
    }

    /// Number of blocked cells.
    pub fn blocked_count(&self) -> usize {
        self.cells.iter().filter(|c| **c).count()
    }

    pub fn in_bounds(&self, cell: Cell) -> bool {
        (0..self.north_size as i64).contains(&cell.0) && (0..self.east_size as i64).contains(&cell.1)
    }

    /// Blocked, or outside the grid.
    pub fn is_blocked(&self, cell: Cell) -> bool {
        if !self.in_bounds(cell) {
            return true;
        }
        self.cells[cell.0 as usize * self.east_size + cell.1 as usize]
    }

    pub fn is_free(&self, cell: Cell) -> bool {
        !self.is_blocked(cell)
    }

    /// Cell nearest to a (possibly fractional) grid point.
    pub fn cell_of(point: &GridPoint) -> Cell {
        (point.north.round() as i64, point.east.round() as i64)
    }

    pub fn point_of(cell: Cell) -> GridPoint {
        GridPoint::new(cell.0 as f64, cell.1 as f64)
    }

    /// Free cell closest to `point`, or `None` when the whole grid is blocked.
    pub fn nearest_free(&self, point: &GridPoint) -> Option<Cell> {
        let cell = Self::cell_of(point);
        if self.is_free(cell) {
            return Some(cell);
        }

        let mut best: Option<(f64, Cell)> = None;
        for n in 0..self.north_size {
            let row = n * self.east_size;
            for e in 0..self.east_size {
                if self.cells[row + e] {
                    continue;
                }
                let dn = n as f64 - point.north;
                let de = e as f64 - point.east;
                let d2 = dn * dn + de * de;
                if best.is_none_or(|(bd, _)| d2 < bd) {
                    best = Some((d2, (n as i64, e as i64)));
                }
            }
        }
        best.map(|(_, cell)| cell)
    }

    /// True when every cell on the Bresenham line from `from` to `to` (inclusive) is free.
    pub fn line_of_sight(&self, from: Cell, to: Cell) -> bool {
        bresenham(from, to).all(|cell| self.is_free(cell))
    }
}

impl NavigableSpace for OccupancyGrid {
    fn offsets(&self) -> FrameOffsets {
        self.offsets
    }
}

/// Integer Bresenham line, endpoints included.
pub fn bresenham(from: Cell, to: Cell) -> impl Iterator<Item = Cell> {
    let (mut n, mut e) = from;
    let dn = (to.0 - from.0).abs();
    let de = -(to.1 - from.1).abs();
    let sn = if from.0 < to.0 { 1 } else { -1 };
    let se = if from.1 < to.1 { 1 } else { -1 };
    let mut err = dn + de;
    let mut done = false;

    std::iter::from_fn(move || {
        if done {
            return None;
        }
        let current = (n, e);
        if current == to {
            done = true;
            return Some(current);
        }
        let e2 = 2 * err;
        if e2 >= de {
            err += de;
            n += sn;
        }
        if e2 <= dn {
            err += dn;
            e += se;
        }
        Some(current)
    })
}

fn fold_min(obstacles: &[ObstacleRecord], f: impl Fn(&ObstacleRecord) -> f64) -> f64 {
    obstacles.iter().map(f).fold(f64::INFINITY, f64::min)
}

fn fold_max(obstacles: &[ObstacleRecord], f: impl Fn(&ObstacleRecord) -> f64) -> f64 {
    obstacles.iter().map(f).fold(f64::NEG_INFINITY, f64::max)
}
