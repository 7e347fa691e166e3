//! Distance heuristics for the planners' A* searches.

use mp_core::GridPoint;

/// Straight-line distance. Admissible for both the 8-connected grid and the roadmap.
pub fn euclidean(from: &GridPoint, to: &GridPoint) -> f64 {
    from.distance_to(to)
}

/// Octile distance: exact cost on an obstacle-free 8-connected grid.
pub fn octile(from: &GridPoint, to: &GridPoint) -> f64 {
    let dn = (from.north - to.north).abs();
    let de = (from.east - to.east).abs();
    let (short, long) = if dn < de { (dn, de) } else { (de, dn) };
    long + (std::f64::consts::SQRT_2 - 1.0) * short
}

/// Always zero; turns A* into Dijkstra.
pub fn zero(_from: &GridPoint, _to: &GridPoint) -> f64 {
    0.0
}
