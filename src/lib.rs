//! Mission supervision and one-shot waypoint planning for a single vehicle.
//!
//! The member crates carry the logic; this crate wires them into sessions the
//! binaries drive and re-exports them for integration tests.

pub mod session;

pub use mp_colliders as colliders;
pub use mp_config as config;
pub use mp_core as primitives;
pub use mp_export as export;
pub use mp_link as link;
pub use mp_mission as mission;
pub use mp_planner as planner;
