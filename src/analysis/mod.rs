//! Structural analytics over a frozen [`crate::core::TemporalGraph`].

pub mod cycles;
pub mod depth;

pub use cycles::{detect_cycles, Cycle};
pub use depth::{depth_of, max_depth, root_depths};
