//! Path simplification against the occupancy grid.

use mp_core::{GridPoint, Path};

use crate::occupancy::OccupancyGrid;

const COLLINEAR_EPSILON: f64 = 1e-6;

/// Twice the signed area of the triangle `a, b, c` is (near) zero.
pub fn is_collinear(a: &GridPoint, b: &GridPoint, c: &GridPoint) -> bool {
    let det = a.north * (b.east - c.east) + b.north * (c.east - a.east) + c.north * (a.east - b.east);
    det.abs() < COLLINEAR_EPSILON
}

/// Straight segment between two points crosses only free cells.
pub fn segment_is_clear(grid: &OccupancyGrid, from: &GridPoint, to: &GridPoint) -> bool {
    grid.line_of_sight(OccupancyGrid::cell_of(from), OccupancyGrid::cell_of(to))
}

/// Drop interior points collinear with their neighbours, then greedily skip ahead to the
/// furthest point still in line of sight.
///
/// Endpoints are always kept. Consecutive input points are assumed connected.
pub fn prune_path(path: &Path, grid: &OccupancyGrid) -> Path {
    let without_collinear = remove_collinear(path, grid);
    shortcut(&without_collinear, grid)
}

fn remove_collinear(path: &Path, grid: &OccupancyGrid) -> Path {
    let mut pruned: Path = Vec::with_capacity(path.len());
    for point in path {
        while pruned.len() >= 2 {
            let a = pruned[pruned.len() - 2];
            let b = pruned[pruned.len() - 1];
            if is_collinear(&a, &b, point) && segment_is_clear(grid, &a, point) {
                pruned.pop();
            } else {
                break;
            }
        }
        pruned.push(*point);
    }
    pruned
}

fn shortcut(path: &Path, grid: &OccupancyGrid) -> Path {
    if path.len() <= 2 {
        return path.clone();
    }

    let mut out = vec![path[0]];
    let mut anchor = 0;
    while anchor < path.len() - 1 {
        let mut next = path.len() - 1;
        while next > anchor + 1 && !segment_is_clear(grid, &path[anchor], &path[next]) {
            next -= 1;
        }
        out.push(path[next]);
        anchor = next;
    }
    out
}
