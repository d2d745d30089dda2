//! Coordinate frames, orientations, and box arithmetic.

mod bounds;
pub use bounds::*;

mod coord;
pub use coord::*;

mod orientation;
pub use orientation::*;
