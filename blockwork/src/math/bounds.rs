//! Axis-aligned boxes of template cells: [`Bounds`].
//! This module is private but reexported by its parent.

use core::fmt;
use core::iter::FusedIterator;
use core::ops::Range;

use crate::math::{GridCoordinate, GridSize, GridSizeCoord, TemplatePoint};

// -------------------------------------------------------------------------------------------

/// An axis-aligned box of template cells, identified by an inclusive lower corner and an
/// exclusive upper corner.
///
/// Besides membership, a `Bounds` defines a linearization of its interior: each contained
/// offset has a unique dense index, with the X coordinate varying slowest and the Z
/// coordinate varying fastest. [`Bounds::index_of()`] and [`Bounds::offset_at()`] convert
/// between offsets and indices, and [`Bounds::interior_iter()`] visits offsets in index
/// order.
#[derive(Clone, Copy, Eq, Hash, PartialEq)]
pub struct Bounds {
    lower: TemplatePoint,
    upper: TemplatePoint,
}

impl Bounds {
    /// Constructs a [`Bounds`] from inclusive lower and exclusive upper corners.
    ///
    /// Returns an error if `lower` exceeds `upper` on any axis. Equal corners are
    /// permitted and produce an empty box.
    ///
    /// ```
    /// use blockwork::math::{Bounds, TemplatePoint};
    ///
    /// let bounds = Bounds::from_lower_upper([0, 0, 0], [2, 3, 4]).unwrap();
    /// assert_eq!(bounds.volume(), Some(24));
    /// assert!(bounds.contains(TemplatePoint::new(1, 2, 3)));
    /// assert!(!bounds.contains(TemplatePoint::new(2, 0, 0)));
    /// ```
    pub fn from_lower_upper(
        lower: impl Into<TemplatePoint>,
        upper: impl Into<TemplatePoint>,
    ) -> Result<Self, BoundsError> {
        let (lower, upper) = (lower.into(), upper.into());
        if lower.x > upper.x || lower.y > upper.y || lower.z > upper.z {
            return Err(BoundsError(BoundsErrorKind::Inverted { lower, upper }));
        }
        Ok(Self { lower, upper })
    }

    /// The bounds occupying exactly the single cell `offset`.
    ///
    /// Returns an error if a coordinate of `offset` is at the numeric limit, leaving the
    /// cell's upper corner unrepresentable.
    pub fn cell(offset: TemplatePoint) -> Result<Self, BoundsError> {
        match cell_upper(offset) {
            Some(upper) => Ok(Self { lower: offset, upper }),
            None => Err(BoundsError(BoundsErrorKind::Overflow { offset })),
        }
    }

    /// Extends the box as needed to contain the cell `offset`.
    ///
    /// Note that this keeps the extent of an empty `self`; it unions corners, not cell
    /// sets.
    pub fn union_cell(self, offset: TemplatePoint) -> Result<Self, BoundsError> {
        let Some(unit_upper) = cell_upper(offset) else {
            return Err(BoundsError(BoundsErrorKind::Overflow { offset }));
        };
        Ok(Self {
            lower: self.lower.min(offset),
            upper: self.upper.max(unit_upper),
        })
    }

    /// Inclusive lower corner, the most negative corner of the box.
    #[inline]
    pub fn lower_bounds(&self) -> TemplatePoint {
        self.lower
    }

    /// Exclusive upper corner, the most positive corner of the box.
    #[inline]
    pub fn upper_bounds(&self) -> TemplatePoint {
        self.upper
    }

    /// Size of the box in each axis; equivalent to
    /// `self.upper_bounds() - self.lower_bounds()`, except that the result is unsigned
    /// (which is necessary so that it cannot overflow).
    #[inline]
    pub const fn size(&self) -> GridSize {
        // Two's complement arithmetic trick: if the subtraction overflows and wraps, the
        // reinterpretation as unsigned gives the right answer anyway.
        GridSize::new(
            i32::wrapping_sub(self.upper.x, self.lower.x).cast_unsigned(),
            i32::wrapping_sub(self.upper.y, self.lower.y).cast_unsigned(),
            i32::wrapping_sub(self.upper.z, self.lower.z).cast_unsigned(),
        )
    }

    /// Computes the number of cells in the box, the product of its three sizes.
    ///
    /// Returns [`None`] if that product overflows `usize`.
    pub const fn volume(&self) -> Option<usize> {
        // The conversions to usize are lossless because 16-bit platforms are unsupported.
        const {
            assert!(size_of::<GridSizeCoord>() <= size_of::<usize>());
        }
        let size = self.size();
        let area = match (size.width as usize).checked_mul(size.height as usize) {
            Some(area) => area,
            None => return None,
        };
        area.checked_mul(size.depth as usize)
    }

    /// Returns whether the box contains no cells (its volume is zero).
    ///
    /// This does not necessarily mean that its size is zero on all axes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size().is_empty()
    }

    /// Returns whether the box contains the cell `offset`.
    #[inline]
    pub fn contains(&self, offset: TemplatePoint) -> bool {
        (self.lower.x <= offset.x && offset.x < self.upper.x)
            && (self.lower.y <= offset.y && offset.y < self.upper.y)
            && (self.lower.z <= offset.z && offset.z < self.upper.z)
    }

    /// Returns the dense index of `offset` within the box, or [`None`] if the offset is
    /// outside it or the box is too large to linearize.
    ///
    /// Indices run from 0 at the lower corner through `volume() - 1`, in the order
    /// produced by [`Bounds::interior_iter()`].
    #[inline]
    pub fn index_of(&self, offset: TemplatePoint) -> Option<usize> {
        let size = self.size();
        // If a subtraction wraps, the reinterpretation as unsigned makes the range check
        // below fail, which is the correct outcome.
        let dx = offset.x.wrapping_sub(self.lower.x).cast_unsigned();
        let dy = offset.y.wrapping_sub(self.lower.y).cast_unsigned();
        let dz = offset.z.wrapping_sub(self.lower.z).cast_unsigned();
        if dx >= size.width || dy >= size.height || dz >= size.depth {
            return None;
        }
        // The arithmetic cannot overflow because every partial result is less than the
        // volume, which was just checked to fit in usize.
        self.volume()?;
        Some((dx as usize * size.height as usize + dy as usize) * size.depth as usize + dz as usize)
    }

    /// Exact inverse of [`Bounds::index_of()`]: returns the cell at the given dense
    /// index, or [`None`] if `index` is not less than the volume.
    #[inline]
    pub fn offset_at(&self, index: usize) -> Option<TemplatePoint> {
        if index >= self.volume()? {
            return None;
        }
        let size = self.size();
        let height = size.height as usize;
        let depth = size.depth as usize;
        // Wrapping arithmetic produces the exact answer here: the true result is a
        // coordinate inside the box, so it is representable.
        let component = |lower: GridCoordinate, delta: usize| {
            lower.wrapping_add((delta as GridSizeCoord).cast_signed())
        };
        Some(TemplatePoint::new(
            component(self.lower.x, index / (height * depth)),
            component(self.lower.y, index / depth % height),
            component(self.lower.z, index % depth),
        ))
    }

    /// The range of X coordinates of cells within the box.
    #[inline]
    pub fn x_range(&self) -> Range<GridCoordinate> {
        self.lower.x..self.upper.x
    }

    /// The range of Y coordinates of cells within the box.
    #[inline]
    pub fn y_range(&self) -> Range<GridCoordinate> {
        self.lower.y..self.upper.y
    }

    /// The range of Z coordinates of cells within the box.
    #[inline]
    pub fn z_range(&self) -> Range<GridCoordinate> {
        self.lower.z..self.upper.z
    }

    /// Iterates over all cells in the box, in dense index order.
    #[inline]
    pub fn interior_iter(self) -> InteriorIter {
        InteriorIter::new(self)
    }
}

impl fmt::Debug for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Bounds")
            .field(&self.x_range())
            .field(&self.y_range())
            .field(&self.z_range())
            .finish()
    }
}

/// Upper corner of the unit cell at `offset`, if representable.
fn cell_upper(offset: TemplatePoint) -> Option<TemplatePoint> {
    Some(TemplatePoint::new(
        offset.x.checked_add(1)?,
        offset.y.checked_add(1)?,
        offset.z.checked_add(1)?,
    ))
}

// -------------------------------------------------------------------------------------------

/// Iterator produced by [`Bounds::interior_iter()`].
#[derive(Clone, Debug)]
pub struct InteriorIter {
    x_range: Range<GridCoordinate>,
    y_range: Range<GridCoordinate>,
    z_range: Range<GridCoordinate>,
    cursor: TemplatePoint,
}

impl InteriorIter {
    fn new(bounds: Bounds) -> Self {
        Self {
            x_range: bounds.x_range(),
            y_range: bounds.y_range(),
            z_range: bounds.z_range(),
            // next() produces the cursor whenever its X coordinate is in range, which is
            // only correct if the box is nonempty.
            cursor: if bounds.is_empty() {
                bounds.upper_bounds()
            } else {
                bounds.lower_bounds()
            },
        }
    }
}

impl Iterator for InteriorIter {
    type Item = TemplatePoint;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor.x >= self.x_range.end {
            return None;
        }
        let result = self.cursor;

        self.cursor.z += 1;
        if self.cursor.z >= self.z_range.end {
            self.cursor.z = self.z_range.start;
            self.cursor.y += 1;
            if self.cursor.y >= self.y_range.end {
                self.cursor.y = self.y_range.start;
                // X running off the end is what terminates the iteration.
                self.cursor.x += 1;
            }
        }

        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.cursor.x >= self.x_range.end {
            return (0, Some(0));
        }
        // The cursor is inside the box, so the differences are all nonnegative, and the
        // u128 arithmetic cannot overflow even for boxes spanning the whole coordinate
        // range.
        let axis_len = |range: &Range<GridCoordinate>| u128::from(range.end.abs_diff(range.start));
        let slices = u128::from(self.x_range.end.abs_diff(self.cursor.x)) - 1;
        let rows = slices * axis_len(&self.y_range)
            + u128::from(self.y_range.end.abs_diff(self.cursor.y))
            - 1;
        let cells = rows * axis_len(&self.z_range)
            + u128::from(self.z_range.end.abs_diff(self.cursor.z));
        match usize::try_from(cells) {
            Ok(cells) => (cells, Some(cells)),
            Err(_) => (usize::MAX, None),
        }
    }
}

impl FusedIterator for InteriorIter {}

// -------------------------------------------------------------------------------------------

/// Error when a [`Bounds`] cannot be constructed from the given input.
#[derive(Clone, Copy, Debug, displaydoc::Display, Eq, PartialEq)]
#[displaydoc("{0}")]
pub struct BoundsError(BoundsErrorKind);

/// Error details for [`BoundsError`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum BoundsErrorKind {
    Inverted {
        lower: TemplatePoint,
        upper: TemplatePoint,
    },
    Overflow {
        offset: TemplatePoint,
    },
}

impl fmt::Display for BoundsErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundsErrorKind::Inverted { lower, upper } => {
                write!(
                    f,
                    "bounds lower corner {lower:?} was greater than upper corner {upper:?}"
                )
            }
            BoundsErrorKind::Overflow { offset } => {
                write!(
                    f,
                    "bounds including the cell {offset:?} would overflow the coordinate range"
                )
            }
        }
    }
}

impl core::error::Error for BoundsError {}

// -------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn b(lower: [GridCoordinate; 3], upper: [GridCoordinate; 3]) -> Bounds {
        Bounds::from_lower_upper(lower, upper).unwrap()
    }

    #[test]
    fn construction_rejects_inverted_corners() {
        assert!(Bounds::from_lower_upper([0, 0, 0], [0, 0, 0]).is_ok());
        assert!(Bounds::from_lower_upper([2, 0, 0], [1, 1, 1]).is_err());
        assert!(Bounds::from_lower_upper([0, 2, 0], [1, 1, 1]).is_err());
        assert!(Bounds::from_lower_upper([0, 0, 2], [1, 1, 1]).is_err());
    }

    #[test]
    fn inverted_corner_message() {
        let error = Bounds::from_lower_upper([2, 0, 0], [1, 1, 1]).unwrap_err();
        assert_eq!(
            error.to_string(),
            format!(
                "bounds lower corner {:?} was greater than upper corner {:?}",
                TemplatePoint::new(2, 0, 0),
                TemplatePoint::new(1, 1, 1),
            ),
        );
    }

    #[test]
    fn cell_is_a_unit_box() {
        let bounds = Bounds::cell(TemplatePoint::new(1, -2, 3)).unwrap();
        assert_eq!(bounds, b([1, -2, 3], [2, -1, 4]));
        assert_eq!(bounds.volume(), Some(1));
        assert!(bounds.contains(TemplatePoint::new(1, -2, 3)));
        assert!(!bounds.contains(TemplatePoint::new(1, -2, 4)));
    }

    #[test]
    fn union_cell_grows_to_fit() {
        let points = [
            TemplatePoint::new(0, 0, 0),
            TemplatePoint::new(2, -1, 3),
            TemplatePoint::new(-5, 2, 1),
            TemplatePoint::new(1, 1, 1),
        ];
        let accumulate = |order: &[usize]| {
            order[1..].iter().fold(
                Bounds::cell(points[order[0]]).unwrap(),
                |bounds, &i| bounds.union_cell(points[i]).unwrap(),
            )
        };
        let expected = b([-5, -1, 0], [3, 3, 4]);
        assert_eq!(accumulate(&[0, 1, 2, 3]), expected);
        assert_eq!(accumulate(&[3, 2, 1, 0]), expected);
        assert_eq!(accumulate(&[2, 0, 3, 1]), expected);
    }

    #[test]
    fn overflow_at_numeric_limit() {
        let limit = TemplatePoint::new(0, 0, GridCoordinate::MAX);
        assert!(Bounds::cell(limit).is_err());
        assert!(b([0, 0, 0], [1, 1, 1]).union_cell(limit).is_err());
        assert_eq!(
            Bounds::cell(limit).unwrap_err().to_string(),
            format!("bounds including the cell {limit:?} would overflow the coordinate range"),
        );
    }

    #[test]
    fn size_spans_the_full_numeric_range() {
        let bounds = b(
            [GridCoordinate::MIN; 3],
            [GridCoordinate::MAX; 3],
        );
        assert_eq!(
            bounds.size(),
            GridSize::new(GridSizeCoord::MAX, GridSizeCoord::MAX, GridSizeCoord::MAX),
        );
        assert_eq!(bounds.volume(), None);
    }

    #[test]
    fn volume_and_emptiness() {
        assert_eq!(b([0, 0, 0], [2, 3, 4]).volume(), Some(24));
        assert_eq!(b([-1, -1, -1], [1, 1, 1]).volume(), Some(8));

        let empty = b([1, 2, 3], [1, 9, 9]);
        assert_eq!(empty.volume(), Some(0));
        assert!(empty.is_empty());
        assert!(!b([0, 0, 0], [1, 1, 1]).is_empty());
    }

    #[test]
    fn contains_boundaries() {
        let bounds = b([4, 4, 4], [10, 10, 10]);
        assert!(!bounds.contains(TemplatePoint::new(3, 5, 5)));
        assert!(bounds.contains(TemplatePoint::new(4, 5, 5)));
        assert!(bounds.contains(TemplatePoint::new(9, 5, 5)));
        assert!(!bounds.contains(TemplatePoint::new(10, 5, 5)));
    }

    #[test]
    fn index_of_matches_iteration_order() {
        let bounds = b([-1, 10, 3], [2, 12, 5]);
        for (index, offset) in bounds.interior_iter().enumerate() {
            assert_eq!(bounds.index_of(offset), Some(index), "{offset:?}");
        }
    }

    #[test]
    fn index_of_outside_is_none() {
        let bounds = b([0, 0, 0], [2, 2, 2]);
        for offset in b([-1, -1, -1], [3, 3, 3]).interior_iter() {
            assert_eq!(bounds.index_of(offset).is_some(), bounds.contains(offset));
        }
    }

    /// A box too large to linearize has no indices at all.
    #[test]
    fn index_of_unlinearizable_is_none() {
        let bounds = b([GridCoordinate::MIN; 3], [GridCoordinate::MAX; 3]);
        assert_eq!(bounds.index_of(TemplatePoint::new(0, 0, 0)), None);
    }

    #[test]
    fn offset_at_inverts_index_of() {
        let bounds = b([-1, 10, 3], [2, 12, 5]);
        let volume = bounds.volume().unwrap();
        for index in 0..volume {
            let offset = bounds.offset_at(index).unwrap();
            assert_eq!(bounds.index_of(offset), Some(index));
        }
        assert_eq!(bounds.offset_at(volume), None);
        assert_eq!(b([1, 1, 1], [1, 1, 1]).offset_at(0), None);
    }

    #[test]
    fn interior_iter_order() {
        assert_eq!(
            b([0, 0, 0], [2, 2, 2]).interior_iter().collect::<Vec<_>>(),
            vec![
                TemplatePoint::new(0, 0, 0),
                TemplatePoint::new(0, 0, 1),
                TemplatePoint::new(0, 1, 0),
                TemplatePoint::new(0, 1, 1),
                TemplatePoint::new(1, 0, 0),
                TemplatePoint::new(1, 0, 1),
                TemplatePoint::new(1, 1, 0),
                TemplatePoint::new(1, 1, 1),
            ],
        );
    }

    #[test]
    fn interior_iter_empty() {
        assert_eq!(b([3, 3, 3], [3, 9, 9]).interior_iter().count(), 0);
        assert_eq!(b([3, 3, 3], [9, 9, 3]).interior_iter().count(), 0);
    }

    #[test]
    fn interior_iter_size_hint_is_exact() {
        let mut iter = b([0, 0, 0], [2, 3, 2]).interior_iter();
        let mut remaining = 12;
        loop {
            assert_eq!(iter.size_hint(), (remaining, Some(remaining)));
            if iter.next().is_none() {
                break;
            }
            remaining -= 1;
        }
        assert_eq!(remaining, 0);
    }

    #[test]
    fn debug_format() {
        assert_eq!(
            format!("{:?}", b([0, 0, 0], [2, 3, 4])),
            "Bounds(0..2, 0..3, 0..4)",
        );
    }
}
