//! Core geometry for square-grid target detection.
//!
//! This crate is intentionally small and purely geometric. It does *not*
//! depend on any concrete shape detector or image type.

mod geom;
mod logger;

pub use geom::{
    acute_angle, add_offset, segment_intersection, side_direction, LineSegment, Quad,
};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
