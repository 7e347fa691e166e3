//! Mission façade crate: vehicle contract, waypoint pipeline, and the supervisory state machine.

pub mod pipeline;
pub mod supervisor;
pub mod vehicle;

pub use facade::*;
pub use mp_planner as planner;

mod facade;
