//! Structure templates: the per-cell requirements a multiblock structure is made of,
//! indexed densely over their bounding box.

use core::fmt;

use once_cell::sync::OnceCell;

use crate::block::{BlockState, BlockTypeId, FACING_PROPERTY};
use crate::math::{Bounds, BoundsError, Orientation, TemplatePoint, WorldPoint};

// -------------------------------------------------------------------------------------------

/// One cell of a structure template: the offset it occupies, relative to the controller in
/// the canonical frame, and the block state expected there.
///
/// Facing values in the expected state are stored normalized, as if the structure faced
/// [`North`](Orientation::North); capture paths apply
/// [`BlockState::normalize_facing()`] before constructing a requirement.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockRequirement {
    offset: TemplatePoint,
    expected: BlockState,
}

impl BlockRequirement {
    /// Constructs a requirement that the cell at `offset` hold `expected`.
    pub fn new(offset: impl Into<TemplatePoint>, expected: BlockState) -> Self {
        Self {
            offset: offset.into(),
            expected,
        }
    }

    /// The cell this requirement applies to, relative to the controller.
    #[inline]
    pub fn offset(&self) -> TemplatePoint {
        self.offset
    }

    /// The expected block state, in normalized (north-facing) form.
    #[inline]
    pub fn expected(&self) -> &BlockState {
        &self.expected
    }

    /// Whether this requirement can ever be satisfied: a nonempty block type, and a
    /// facing value (if present) that names a direction.
    ///
    /// Unresolvable requirements are not errors; they are simply never valid, so the
    /// cell they occupy reports a permanent mismatch.
    pub fn is_resolvable(&self) -> bool {
        !self.expected.block_type().is_empty()
            && (self.expected.property(&FACING_PROPERTY).is_none()
                || self.expected.facing().is_some())
    }

    /// Whether `live` satisfies this requirement in a structure facing `orientation`.
    ///
    /// The live block type must equal the expected type, and every expected property
    /// must be present with an equal value, the facing property being denormalized to
    /// `orientation` first. Properties of `live` that the requirement does not mention
    /// are ignored.
    pub fn matches(&self, live: &BlockState, orientation: Orientation) -> bool {
        self.is_resolvable()
            && live.block_type() == self.expected.block_type()
            && self.expected.properties().iter().all(|(key, value)| {
                let live_value = live.property(key);
                if *key == FACING_PROPERTY {
                    self.expected.facing().is_some_and(|stored| {
                        live_value == Some(orientation.rotate_direction(stored).name())
                    })
                } else {
                    live_value == Some(value.as_str())
                }
            })
    }

    /// The state a live block must hold to satisfy this requirement in a structure
    /// facing `orientation`: the expected state with its facing denormalized.
    pub fn expected_state(&self, orientation: Orientation) -> BlockState {
        self.expected.clone().denormalize_facing(orientation)
    }

    /// Classifies how `live` fails this requirement, or [`None`] if it matches.
    pub fn diff(
        &self,
        live: &BlockState,
        orientation: Orientation,
    ) -> Option<(MismatchKind, BlockState)> {
        if self.matches(live, orientation) {
            return None;
        }
        let kind = if live.block_type() == self.expected.block_type() {
            MismatchKind::WrongProperty
        } else {
            MismatchKind::MissingBlock
        };
        Some((kind, self.expected_state(orientation)))
    }
}

// -------------------------------------------------------------------------------------------

/// The reusable definition of a multiblock structure: the block states that must surround
/// a controller of the given type, one requirement per cell of the bounding box.
///
/// A template is inert until [`StructureTemplate::initialize()`] sorts its requirements
/// and computes the dense index over them; all lookup operations return their "absent"
/// value before that.
#[derive(Debug)]
pub struct StructureTemplate {
    controller_block_type: BlockTypeId,
    /// In construction order; `resolved` holds the sorted copy.
    requirements: Vec<BlockRequirement>,
    resolved: OnceCell<Result<Resolved, TemplateError>>,
}

/// Outcome of successful initialization.
#[derive(Debug)]
struct Resolved {
    /// Sorted by offset, ascending in (x, y, z), which coincides with dense index order.
    requirements: Box<[BlockRequirement]>,
    bounds: Bounds,
}

impl StructureTemplate {
    /// Constructs a template from its controller block type and its requirements, in any
    /// order.
    pub fn new(
        controller_block_type: impl Into<BlockTypeId>,
        requirements: impl IntoIterator<Item = BlockRequirement>,
    ) -> Self {
        Self {
            controller_block_type: controller_block_type.into(),
            requirements: Vec::from_iter(requirements),
            resolved: OnceCell::new(),
        }
    }

    /// The block type whose placement anchors this structure.
    #[inline]
    pub fn controller_block_type(&self) -> &BlockTypeId {
        &self.controller_block_type
    }

    /// Sorts the requirements, computes their bounding box, and verifies that they fill
    /// it densely (exactly one requirement per cell).
    ///
    /// Idempotent: the first call computes and caches the outcome, including a failed
    /// one; later calls return it in O(1). An initialized template is immutable short of
    /// [`StructureTemplate::invalidate()`].
    pub fn initialize(&self) -> Result<(), TemplateError> {
        match self.resolved.get_or_init(|| resolve(&self.requirements)) {
            Ok(_) => Ok(()),
            Err(error) => Err(error.clone()),
        }
    }

    /// Discards the cached outcome of [`StructureTemplate::initialize()`] so that the
    /// next call recomputes it.
    ///
    /// Exclusive access means a shared (`Arc`ed) template cannot be invalidated in
    /// place; replace it instead.
    pub fn invalidate(&mut self) {
        self.resolved = OnceCell::new();
    }

    /// Number of requirements, which after successful initialization is also the volume
    /// of the bounding box.
    #[inline]
    pub fn len(&self) -> usize {
        self.requirements.len()
    }

    /// Whether the template has no requirements. Such a template never initializes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }

    /// The requirements, in dense index order once initialization has succeeded, or in
    /// construction order before that.
    pub fn requirements(&self) -> &[BlockRequirement] {
        match self.resolved_ok() {
            Some(resolved) => &resolved.requirements,
            None => &self.requirements,
        }
    }

    /// The bounding box of all requirement offsets, or [`None`] if the template has not
    /// been successfully initialized.
    pub fn bounds(&self) -> Option<Bounds> {
        self.resolved_ok().map(|resolved| resolved.bounds)
    }

    /// Maps a cell offset to its dense index, or [`None`] if the offset is outside the
    /// bounding box or the template is uninitialized.
    ///
    /// Exact inverse of [`StructureTemplate::index_to_offset()`] over the box.
    pub fn offset_to_index(&self, offset: TemplatePoint) -> Option<usize> {
        self.bounds()?.index_of(offset)
    }

    /// Maps a dense index back to its cell offset, or [`None`] if `index` is out of
    /// range or the template is uninitialized.
    pub fn index_to_offset(&self, index: usize) -> Option<TemplatePoint> {
        self.bounds()?.offset_at(index)
    }

    /// The requirement for the cell at `offset`, or [`None`] if the offset is outside
    /// the bounding box or the template is uninitialized.
    pub fn requirement_at(&self, offset: TemplatePoint) -> Option<&BlockRequirement> {
        let resolved = self.resolved_ok()?;
        resolved.requirements.get(resolved.bounds.index_of(offset)?)
    }

    /// Whether `live` satisfies the requirement at `offset` in a structure facing
    /// `orientation`. A cell with no requirement (or an uninitialized template) is
    /// never valid.
    pub fn validate_cell(
        &self,
        offset: TemplatePoint,
        live: &BlockState,
        orientation: Orientation,
    ) -> bool {
        self.requirement_at(offset)
            .is_some_and(|requirement| requirement.matches(live, orientation))
    }

    /// Classifies how `live` fails the requirement at `offset`, or [`None`] if it
    /// matches (or the cell has no requirement).
    pub fn diff_cell(
        &self,
        offset: TemplatePoint,
        live: &BlockState,
        orientation: Orientation,
    ) -> Option<(MismatchKind, BlockState)> {
        self.requirement_at(offset)?.diff(live, orientation)
    }

    fn resolved_ok(&self) -> Option<&Resolved> {
        self.resolved.get().and_then(|result| result.as_ref().ok())
    }
}

/// The initialization computation cached by [`StructureTemplate::initialize()`].
fn resolve(requirements: &[BlockRequirement]) -> Result<Resolved, TemplateError> {
    let mut sorted = requirements.to_vec();
    sorted.sort_by_key(|requirement| {
        let offset = requirement.offset();
        (offset.x, offset.y, offset.z)
    });

    let Some(first) = sorted.first() else {
        return Err(TemplateError::Empty);
    };

    // After sorting, duplicates are adjacent.
    for pair in sorted.windows(2) {
        if pair[0].offset() == pair[1].offset() {
            return Err(TemplateError::DuplicateOffset(pair[0].offset()));
        }
    }

    let mut bounds = Bounds::cell(first.offset()).map_err(TemplateError::Bounds)?;
    for requirement in &sorted[1..] {
        bounds = bounds
            .union_cell(requirement.offset())
            .map_err(TemplateError::Bounds)?;
    }

    // Distinct offsets filling the box's exact volume must cover every cell once, and
    // (x, y, z)-ascending order coincides with dense index order.
    if bounds.volume() != Some(sorted.len()) {
        return Err(TemplateError::NotDense {
            len: sorted.len(),
            bounds,
        });
    }

    Ok(Resolved {
        requirements: sorted.into_boxed_slice(),
        bounds,
    })
}

// -------------------------------------------------------------------------------------------

/// Error from [`StructureTemplate::initialize()`]: the requirements cannot support dense
/// indexing.
#[derive(Clone, Debug, Eq, PartialEq, displaydoc::Display)]
#[non_exhaustive]
pub enum TemplateError {
    /// template has no requirements
    Empty,

    /// template has more than one requirement for offset {0:?}
    DuplicateOffset(TemplatePoint),

    /// template with {len} requirements does not densely fill its bounding box {bounds:?}
    NotDense {
        /// Number of requirements in the template.
        len: usize,
        /// The bounding box of their offsets, whose volume does not equal `len`.
        bounds: Bounds,
    },

    /// template bounding box is unrepresentable: {0}
    Bounds(BoundsError),
}

impl core::error::Error for TemplateError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            TemplateError::Bounds(error) => Some(error),
            _ => None,
        }
    }
}

// -------------------------------------------------------------------------------------------

/// How one cell of a structure fails to match its requirement.
#[expect(clippy::exhaustive_enums)]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MismatchKind {
    /// The cell holds the wrong block type entirely (or no block at all).
    MissingBlock,
    /// The block type is right, but at least one required property value differs.
    WrongProperty,
}

/// One cell's discrepancy between expected and live state, for diagnostics.
///
/// The expected state is already denormalized to the controller's orientation, so its
/// [`Display`](fmt::Display) form is directly presentable.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Mismatch {
    position: WorldPoint,
    kind: MismatchKind,
    expected: BlockState,
}

impl Mismatch {
    pub(crate) fn new(position: WorldPoint, kind: MismatchKind, expected: BlockState) -> Self {
        Self {
            position,
            kind,
            expected,
        }
    }

    /// The world position of the failing cell.
    #[inline]
    pub fn position(&self) -> WorldPoint {
        self.position
    }

    /// Which way the cell fails.
    #[inline]
    pub fn kind(&self) -> MismatchKind {
        self.kind
    }

    /// The block state the cell must hold, denormalized to the controller's
    /// orientation.
    #[inline]
    pub fn expected(&self) -> &BlockState {
        &self.expected
    }
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            MismatchKind::MissingBlock => {
                write!(f, "missing {} at {:?}", self.expected, self.position)
            }
            MismatchKind::WrongProperty => {
                write!(
                    f,
                    "wrong properties at {:?}, expected {}",
                    self.position, self.expected
                )
            }
        }
    }
}

// -------------------------------------------------------------------------------------------
