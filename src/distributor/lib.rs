//! The placement side of the gateway: the part-server client pool and the
//! weighted placement planner.
#[macro_use]
extern crate tracing;

pub mod planner;
pub mod registry;

pub use planner::{Plan, Planner};
pub use registry::Registry;
