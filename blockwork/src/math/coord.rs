//! Numeric types used for coordinates and related quantities.
//!
//! Two coordinate frames exist and must not be confused: the *template* frame,
//! in which a structure's requirements are authored as if the controller faced
//! [`Orientation::North`](crate::math::Orientation::North), and the *world*
//! frame of actual block positions. They are kept apart at the type level by
//! `euclid` unit parameters.

use euclid::{Point3D, Size3D, Vector3D};

/// Scalar type for block coordinates in either frame.
pub type GridCoordinate = i32;

/// Numeric type in a [`GridSize`].
pub type GridSizeCoord = u32;

/// Unit marker for the canonical template coordinate frame: offsets relative to
/// a controller as if it faced north.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[expect(clippy::exhaustive_structs)]
pub struct TemplateSpace;

/// Unit marker for absolute block positions in a world.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[expect(clippy::exhaustive_structs)]
pub struct WorldSpace;

/// A block offset within a structure template, relative to its controller.
pub type TemplatePoint = Point3D<GridCoordinate, TemplateSpace>;

/// A displacement between [`TemplatePoint`]s.
pub type TemplateVector = Vector3D<GridCoordinate, TemplateSpace>;

/// An absolute block position in a world.
pub type WorldPoint = Point3D<GridCoordinate, WorldSpace>;

/// A displacement between [`WorldPoint`]s.
pub type WorldVector = Vector3D<GridCoordinate, WorldSpace>;

/// Sizes of grid-aligned boxes in the template frame.
pub type GridSize = Size3D<GridSizeCoord, TemplateSpace>;
