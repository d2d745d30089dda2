//! The six axis-aligned directions a structure may face: [`Orientation`].
//! This module is private but reexported by its parent.

use core::fmt;

use euclid::Vector3D;

use crate::math::{GridCoordinate, TemplatePoint, TemplateVector, WorldPoint, WorldVector};

/// A direction a structure controller may face: one of the four compass
/// directions, or straight up or down.
///
/// Template offsets and stored facing property values are written as if the
/// controller faced [`North`](Self::North); the other five orientations are
/// rotations applied to that canonical frame. The coordinate convention is
/// right-handed with +Y up: north is −Z, south is +Z, east is +X, west is −X.
///
/// ```
/// use blockwork::math::Orientation;
///
/// assert_eq!(Orientation::from_name("east"), Some(Orientation::East));
/// assert_eq!(Orientation::East.opposite(), Orientation::West);
/// assert_eq!(Orientation::default(), Orientation::North);
/// ```
#[expect(clippy::exhaustive_enums)]
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, exhaust::Exhaust)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[repr(u8)]
pub enum Orientation {
    /// Facing −Z. The canonical orientation, and the fallback for
    /// unrecognized orientation data.
    #[default]
    North,
    /// Facing +Z; a half turn from north.
    South,
    /// Facing −X; a quarter turn counterclockwise from north, seen from above.
    West,
    /// Facing +X; a quarter turn clockwise from north, seen from above.
    East,
    /// Facing +Y; north pitched upward.
    Up,
    /// Facing −Y; north pitched downward.
    Down,
}

impl Orientation {
    /// All six orientations, in declaration order.
    pub const ALL: [Orientation; 6] = [
        Orientation::North,
        Orientation::South,
        Orientation::West,
        Orientation::East,
        Orientation::Up,
        Orientation::Down,
    ];

    /// The name used for this orientation in block property values,
    /// lowercase.
    #[inline]
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::North => "north",
            Self::South => "south",
            Self::West => "west",
            Self::East => "east",
            Self::Up => "up",
            Self::Down => "down",
        }
    }

    /// Inverse of [`Orientation::name()`]. Names are matched exactly;
    /// anything else returns [`None`].
    #[inline]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "north" => Some(Self::North),
            "south" => Some(Self::South),
            "west" => Some(Self::West),
            "east" => Some(Self::East),
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            _ => None,
        }
    }

    /// Returns the orientation facing the other way.
    #[inline]
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::South => Self::North,
            Self::West => Self::East,
            Self::East => Self::West,
            Self::Up => Self::Down,
            Self::Down => Self::Up,
        }
    }

    /// Returns whether this orientation lies in the horizontal plane
    /// (all but [`Up`](Self::Up) and [`Down`](Self::Down)).
    #[inline]
    #[must_use]
    pub const fn is_horizontal(self) -> bool {
        matches!(self, Self::North | Self::South | Self::West | Self::East)
    }

    /// Returns whether this orientation points along the positive direction
    /// of its axis.
    #[inline]
    #[must_use]
    pub const fn is_positive(self) -> bool {
        matches!(self, Self::South | Self::East | Self::Up)
    }

    /// Returns the axis-aligned unit vector pointing in this direction,
    /// in whichever frame the caller needs.
    #[inline]
    #[must_use]
    pub const fn unit_vector<U>(self) -> Vector3D<GridCoordinate, U> {
        match self {
            Self::North => Vector3D::new(0, 0, -1),
            Self::South => Vector3D::new(0, 0, 1),
            Self::West => Vector3D::new(-1, 0, 0),
            Self::East => Vector3D::new(1, 0, 0),
            Self::Up => Vector3D::new(0, 1, 0),
            Self::Down => Vector3D::new(0, -1, 0),
        }
    }

    /// Inverse of [`Orientation::unit_vector()`]. Vectors that are not unit
    /// vectors return [`None`].
    #[inline]
    pub fn from_unit_vector<U>(vector: Vector3D<GridCoordinate, U>) -> Option<Self> {
        match (vector.x, vector.y, vector.z) {
            (0, 0, -1) => Some(Self::North),
            (0, 0, 1) => Some(Self::South),
            (-1, 0, 0) => Some(Self::West),
            (1, 0, 0) => Some(Self::East),
            (0, 1, 0) => Some(Self::Up),
            (0, -1, 0) => Some(Self::Down),
            _ => None,
        }
    }

    /// The orientation whose rotation undoes this orientation's rotation.
    ///
    /// The quarter turns swap (east with west, up with down) and the rest are
    /// their own inverses.
    #[inline]
    #[must_use]
    pub const fn inverse(self) -> Self {
        match self {
            Self::North => Self::North,
            Self::South => Self::South,
            Self::West => Self::East,
            Self::East => Self::West,
            Self::Up => Self::Down,
            Self::Down => Self::Up,
        }
    }

    /// Rotates a template-frame offset into the world frame of a controller
    /// facing this orientation.
    ///
    /// ```
    /// use blockwork::math::{Orientation, TemplateVector, WorldVector};
    ///
    /// // One block ahead of a north-facing controller is one block east of
    /// // an east-facing one.
    /// assert_eq!(
    ///     Orientation::East.rotate_vector(TemplateVector::new(0, 0, -1)),
    ///     WorldVector::new(1, 0, 0),
    /// );
    /// ```
    #[inline]
    #[must_use]
    pub fn rotate_vector(self, offset: TemplateVector) -> WorldVector {
        let [x, y, z] = self.rotate_components(offset.x, offset.y, offset.z);
        WorldVector::new(x, y, z)
    }

    /// Exact inverse of [`Orientation::rotate_vector()`]: expresses a
    /// world-frame offset in the template frame of a controller facing this
    /// orientation.
    #[inline]
    #[must_use]
    pub fn unrotate_vector(self, offset: WorldVector) -> TemplateVector {
        let [x, y, z] = self.inverse().rotate_components(offset.x, offset.y, offset.z);
        TemplateVector::new(x, y, z)
    }

    /// Maps a template offset to the world position it occupies for a
    /// controller at `origin` facing this orientation.
    #[inline]
    #[must_use]
    pub fn local_to_world(self, origin: WorldPoint, offset: TemplatePoint) -> WorldPoint {
        origin + self.rotate_vector(offset.to_vector())
    }

    /// Exact inverse of [`Orientation::local_to_world()`].
    #[inline]
    #[must_use]
    pub fn world_to_local(self, origin: WorldPoint, position: WorldPoint) -> TemplatePoint {
        self.unrotate_vector(position - origin).to_point()
    }

    /// Rotates a direction as [`Orientation::rotate_vector()`] rotates its
    /// unit vector.
    ///
    /// This is how a stored facing value, recorded as if its structure faced
    /// north, is rewritten for a controller actually facing `self`:
    ///
    /// ```
    /// use blockwork::math::Orientation;
    ///
    /// // A block that faces forward still faces forward after the whole
    /// // structure is turned to face east.
    /// assert_eq!(
    ///     Orientation::East.rotate_direction(Orientation::North),
    ///     Orientation::East,
    /// );
    /// ```
    #[inline]
    #[must_use]
    pub const fn rotate_direction(self, direction: Orientation) -> Orientation {
        let rotated = self.basis()[direction.axis_index()];
        if direction.is_positive() {
            rotated
        } else {
            rotated.opposite()
        }
    }

    /// Exact inverse of [`Orientation::rotate_direction()`]: rewrites a live
    /// facing value relative to north, given the orientation of the structure
    /// it was observed in. `o.unrotate_direction(o.rotate_direction(d)) == d`
    /// for every `o` and `d`.
    #[inline]
    #[must_use]
    pub const fn unrotate_direction(self, direction: Orientation) -> Orientation {
        self.inverse().rotate_direction(direction)
    }

    /// Applies this orientation's rotation to raw components.
    ///
    /// The horizontal orientations are quarter and half turns of the X/Z
    /// plane; `Up` and `Down` exchange Y and Z. All six have determinant +1.
    const fn rotate_components(
        self,
        x: GridCoordinate,
        y: GridCoordinate,
        z: GridCoordinate,
    ) -> [GridCoordinate; 3] {
        match self {
            Self::North => [x, y, z],
            Self::South => [-x, y, -z],
            Self::West => [z, y, -x],
            Self::East => [-z, y, x],
            Self::Up => [x, -z, y],
            Self::Down => [x, z, -y],
        }
    }

    /// Images of the +X, +Y, and +Z directions under this orientation's
    /// rotation, in that order.
    const fn basis(self) -> [Orientation; 3] {
        match self {
            Self::North => [Self::East, Self::Up, Self::South],
            Self::South => [Self::West, Self::Up, Self::North],
            Self::West => [Self::North, Self::Up, Self::East],
            Self::East => [Self::South, Self::Up, Self::West],
            Self::Up => [Self::East, Self::South, Self::Down],
            Self::Down => [Self::East, Self::North, Self::Up],
        }
    }

    /// Index of this orientation's axis: X = 0, Y = 1, Z = 2.
    const fn axis_index(self) -> usize {
        match self {
            Self::West | Self::East => 0,
            Self::Up | Self::Down => 1,
            Self::North | Self::South => 2,
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{TemplateSpace, WorldSpace};
    use exhaust::Exhaust as _;
    use itertools::iproduct;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn exhaust_equals_all() {
        assert_eq!(
            Orientation::exhaust().collect::<Vec<_>>(),
            Orientation::ALL.to_vec(),
        );
    }

    #[test]
    fn names_round_trip() {
        for orientation in Orientation::ALL {
            assert_eq!(
                Orientation::from_name(orientation.name()),
                Some(orientation),
            );
            assert_eq!(orientation.to_string(), orientation.name());
        }
        assert_eq!(Orientation::from_name("NORTH"), None);
        assert_eq!(Orientation::from_name(""), None);
        assert_eq!(Orientation::from_name("northeast"), None);
    }

    #[test]
    fn opposite_involution() {
        for orientation in Orientation::ALL {
            assert_ne!(orientation, orientation.opposite());
            assert_eq!(orientation, orientation.opposite().opposite());
        }
    }

    #[test]
    fn horizontal_count() {
        assert_eq!(
            Orientation::ALL.iter().filter(|o| o.is_horizontal()).count(),
            4,
        );
    }

    #[test]
    fn unit_vectors_round_trip() {
        for orientation in Orientation::ALL {
            assert_eq!(
                Orientation::from_unit_vector(orientation.unit_vector::<WorldSpace>()),
                Some(orientation),
            );
        }
        assert_eq!(
            Orientation::from_unit_vector(TemplateVector::new(0, 0, 0)),
            None,
        );
        assert_eq!(
            Orientation::from_unit_vector(TemplateVector::new(1, 1, 0)),
            None,
        );
    }

    /// The canonical forward direction must map to the direction the
    /// controller actually faces.
    #[test]
    fn forward_maps_to_facing() {
        for orientation in Orientation::ALL {
            assert_eq!(
                orientation.rotate_vector(Orientation::North.unit_vector::<TemplateSpace>()),
                orientation.unit_vector::<WorldSpace>(),
                "{orientation:?}",
            );
        }
    }

    #[rstest]
    #[case(Orientation::North, [1, 2, 3], [1, 2, 3])]
    #[case(Orientation::South, [1, 2, 3], [-1, 2, -3])]
    #[case(Orientation::West, [1, 2, 3], [3, 2, -1])]
    #[case(Orientation::East, [1, 2, 3], [-3, 2, 1])]
    #[case(Orientation::Up, [1, 2, 3], [1, -3, 2])]
    #[case(Orientation::Down, [1, 2, 3], [1, 3, -2])]
    fn rotate_vector_concrete(
        #[case] orientation: Orientation,
        #[case] input: [GridCoordinate; 3],
        #[case] expected: [GridCoordinate; 3],
    ) {
        assert_eq!(
            orientation.rotate_vector(TemplateVector::from(input)),
            WorldVector::from(expected),
        );
    }

    #[test]
    fn rotate_unrotate_round_trip() {
        for (orientation, x, y, z) in iproduct!(Orientation::ALL, -2..=2, -2..=2, -2..=2) {
            let local = TemplateVector::new(x, y, z);
            assert_eq!(
                orientation.unrotate_vector(orientation.rotate_vector(local)),
                local,
                "{orientation:?}",
            );
            let world = WorldVector::new(x, y, z);
            assert_eq!(
                orientation.rotate_vector(orientation.unrotate_vector(world)),
                world,
                "{orientation:?}",
            );
        }
    }

    #[test]
    fn inverse_involution_and_effect() {
        for orientation in Orientation::ALL {
            assert_eq!(orientation, orientation.inverse().inverse());
            for direction in Orientation::ALL {
                // Rotating by the inverse is the same as unrotating.
                assert_eq!(
                    orientation.inverse().rotate_direction(direction),
                    orientation.unrotate_direction(direction),
                );
            }
        }
    }

    /// All six orientations are proper rotations, not reflections.
    #[test]
    fn determinant_is_one() {
        for orientation in Orientation::ALL {
            let [cx, cy, cz] = [
                orientation.rotate_components(1, 0, 0),
                orientation.rotate_components(0, 1, 0),
                orientation.rotate_components(0, 0, 1),
            ];
            let det = cx[0] * (cy[1] * cz[2] - cy[2] * cz[1])
                - cy[0] * (cx[1] * cz[2] - cx[2] * cz[1])
                + cz[0] * (cx[1] * cy[2] - cx[2] * cy[1]);
            assert_eq!(det, 1, "{orientation:?}");
        }
    }

    #[test]
    fn direction_rotation_matches_vector_rotation() {
        for (orientation, direction) in iproduct!(Orientation::ALL, Orientation::ALL) {
            assert_eq!(
                orientation
                    .rotate_direction(direction)
                    .unit_vector::<WorldSpace>(),
                orientation.rotate_vector(direction.unit_vector::<TemplateSpace>()),
                "{orientation:?} applied to {direction:?}",
            );
        }
    }

    #[test]
    fn direction_round_trip() {
        for (orientation, direction) in iproduct!(Orientation::ALL, Orientation::ALL) {
            assert_eq!(
                orientation.unrotate_direction(orientation.rotate_direction(direction)),
                direction,
                "{orientation:?} applied to {direction:?}",
            );
            assert_eq!(
                orientation.rotate_direction(orientation.unrotate_direction(direction)),
                direction,
                "{orientation:?} applied to {direction:?}",
            );
        }
    }

    #[test]
    fn local_global_round_trip() {
        let origin = WorldPoint::new(10, 64, -7);
        for (orientation, x, y, z) in iproduct!(Orientation::ALL, -2..=2, -2..=2, -2..=2) {
            let offset = TemplatePoint::new(x, y, z);
            let position = orientation.local_to_world(origin, offset);
            assert_eq!(orientation.world_to_local(origin, position), offset);
        }
    }
}
