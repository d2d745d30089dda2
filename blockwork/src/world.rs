//! World-side identities and the collaborator interfaces the validator calls into:
//! live block state, template definitions, and controller bindings.

use core::num::NonZeroU64;
use core::sync::atomic::{AtomicU64, Ordering::Relaxed};
use std::sync::Arc;

use crate::block::{BlockState, StructureId};
use crate::math::{Orientation, WorldPoint};
use crate::template::StructureTemplate;

// -------------------------------------------------------------------------------------------

/// Copiable unique (within this process) identifier for a world.
///
/// Hosts that simulate several worlds at once, and tests, allocate one per world so
/// that positions in different worlds can never collide as [`ControllerKey`]s.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub struct WorldId(NonZeroU64);

impl WorldId {
    /// Allocates an identifier distinct from every other allocated in this process.
    #[expect(
        clippy::new_without_default,
        reason = "every call returns a distinct value"
    )]
    pub fn new() -> Self {
        static WORLD_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

        let id = WORLD_ID_COUNTER
            .fetch_update(Relaxed, Relaxed, |counter| counter.checked_add(1))
            .expect("world id overflow");

        Self(NonZeroU64::new(id).expect("uncaught world id overflow??"))
    }
}

// -------------------------------------------------------------------------------------------

/// Unique identity of a controller instance: which world its controller block is in,
/// and where.
#[expect(clippy::exhaustive_structs)]
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub struct ControllerKey {
    /// The world holding the controller block.
    pub world: WorldId,
    /// The position of the controller block within that world.
    pub position: WorldPoint,
}

impl ControllerKey {
    /// Bundles a world and a position into a key.
    pub fn new(world: WorldId, position: impl Into<WorldPoint>) -> Self {
        Self {
            world,
            position: position.into(),
        }
    }
}

// -------------------------------------------------------------------------------------------

/// What kind of block mutation a change event reports.
///
/// Contract for event sources: replacing one block with a different one is a single
/// [`ChangeKind::Modify`] event, never [`ChangeKind::Break`] followed by
/// [`ChangeKind::Place`]; delivered separately, the pair would leave affected validity
/// counters transiently wrong between the two calls.
#[expect(clippy::exhaustive_enums)]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, exhaust::Exhaust)]
pub enum ChangeKind {
    /// A block appeared where there was none.
    Place,
    /// A block was removed, leaving the host's "nothing there" state.
    Break,
    /// A block's type or properties changed in place.
    Modify,
}

// -------------------------------------------------------------------------------------------

/// The binding of one controller block: which structure definition it anchors and
/// which way the structure faces.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ControllerState {
    structure: StructureId,
    orientation: Orientation,
}

impl ControllerState {
    /// Constructs a binding from its parts.
    pub fn new(structure: impl Into<StructureId>, orientation: Orientation) -> Self {
        Self {
            structure: structure.into(),
            orientation,
        }
    }

    /// Derives the binding of a controller bound to `structure` from its live block
    /// state: the orientation is the block's facing property, falling back to
    /// [`Orientation::North`] when that property is absent or names no direction.
    pub fn from_properties(structure: impl Into<StructureId>, state: &BlockState) -> Self {
        Self {
            structure: structure.into(),
            orientation: state.facing().unwrap_or_default(),
        }
    }

    /// Identifier of the structure definition the controller is bound to.
    #[inline]
    pub fn structure(&self) -> &StructureId {
        &self.structure
    }

    /// Which way the structure faces.
    #[inline]
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }
}

// -------------------------------------------------------------------------------------------

/// Read access to live block state.
///
/// Implemented by the host world; the validator only ever reads through it.
pub trait WorldSource {
    /// The block state at `position` in the world identified by `world`.
    ///
    /// This is a total function: for unloaded or empty positions it returns whatever
    /// state the host uses for "nothing there", which simply fails to match any
    /// resolvable requirement.
    fn block_at(&self, world: WorldId, position: WorldPoint) -> BlockState;
}

/// Source of structure template definitions, keyed by structure id.
pub trait TemplateSource {
    /// The template definition for `structure`, or [`None`] if there is none.
    ///
    /// Parsing and caching of definitions is the store's business; the validator
    /// receives a shared value and initializes it on first use.
    fn resolve(&self, structure: &StructureId) -> Option<Arc<StructureTemplate>>;
}

/// Knowledge of which blocks are controllers and what they are bound to.
pub trait ControllerSource {
    /// The binding of the controller block at `position`, or [`None`] if that
    /// position does not currently hold a controller.
    ///
    /// Implementations must answer for every controller the validator has registered:
    /// on a [`ChangeKind::Place`] or [`ChangeKind::Modify`] event at a registered
    /// key's position, [`None`] means the controller is gone and the key is
    /// unregistered.
    fn controller_at(&self, world: WorldId, position: WorldPoint) -> Option<ControllerState>;
}

// -------------------------------------------------------------------------------------------
