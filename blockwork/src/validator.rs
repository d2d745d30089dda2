//! The incremental validator: registration of controllers against structure templates,
//! O(1) upkeep of per-cell validity under block changes, and on-demand mismatch
//! diagnostics.

use std::sync::Arc;

use hashbrown::HashMap;

use crate::block::StructureId;
use crate::math::{Orientation, WorldPoint};
use crate::template::{Mismatch, StructureTemplate};
use crate::world::{
    ChangeKind, ControllerKey, ControllerSource, TemplateSource, WorldId, WorldSource,
};


// -------------------------------------------------------------------------------------------

/// A single block position within a specific world, as keyed by the reverse index.
type WorldCell = (WorldId, WorldPoint);

/// Incremental validity tracker for every registered multiblock structure.
///
/// The validator owns two mutually consistent indices: a forward map from
/// [`ControllerKey`] to that controller's per-cell validity cache, and a reverse map
/// from world position to the controllers whose rotated bounding box covers it. Hosts
/// feed every block mutation to [`Validator::on_block_change()`]; in exchange,
/// [`Validator::is_valid()`] is an O(1) counter comparison instead of a rescan.
///
/// All mutating calls and synchronous queries belong to one logical simulation thread.
/// A concurrent presentation consumer should be handed owned snapshots, such as the
/// [`Vec<Mismatch>`](Mismatch) from [`Validator::compute_mismatches()`], never the
/// validator itself.
///
/// # Example
///
/// ```
/// # use std::collections::HashMap;
/// # use std::sync::Arc;
/// use blockwork::math::{Orientation, WorldPoint};
/// use blockwork::{
///     BlockRequirement, BlockState, ChangeKind, ControllerKey, ControllerSource,
///     ControllerState, StructureId, StructureTemplate, TemplateSource, Validator, WorldId,
///     WorldSource,
/// };
///
/// // The host side: one world held in a hash map, one template, one controller at the
/// // origin.
/// struct Host {
///     world: WorldId,
///     blocks: HashMap<WorldPoint, BlockState>,
///     furnace: Arc<StructureTemplate>,
/// }
/// impl WorldSource for Host {
///     fn block_at(&self, _: WorldId, position: WorldPoint) -> BlockState {
///         self.blocks
///             .get(&position)
///             .cloned()
///             .unwrap_or_else(|| BlockState::new("air"))
///     }
/// }
/// impl TemplateSource for Host {
///     fn resolve(&self, structure: &StructureId) -> Option<Arc<StructureTemplate>> {
///         (*structure == "furnace").then(|| self.furnace.clone())
///     }
/// }
/// impl ControllerSource for Host {
///     fn controller_at(&self, _: WorldId, position: WorldPoint) -> Option<ControllerState> {
///         (position == WorldPoint::new(0, 0, 0))
///             .then(|| ControllerState::new("furnace", Orientation::East))
///     }
/// }
///
/// let mut host = Host {
///     world: WorldId::new(),
///     blocks: HashMap::new(),
///     furnace: Arc::new(StructureTemplate::new(
///         "furnace_controller",
///         [BlockRequirement::new([0, 0, -1], BlockState::new("firebrick"))],
///     )),
/// };
/// let key = ControllerKey::new(host.world, [0, 0, 0]);
///
/// let mut validator = Validator::new();
/// validator.register(&host, &host, key, Orientation::East, "furnace".into());
/// assert!(!validator.is_valid(key));
///
/// // The template wants a firebrick one cell in front of the controller; facing east,
/// // “in front” is world position (1, 0, 0). Placing it completes the structure.
/// let in_front = Orientation::East.local_to_world(key.position, [0, 0, -1].into());
/// assert_eq!(in_front, WorldPoint::new(1, 0, 0));
/// host.blocks.insert(in_front, BlockState::new("firebrick"));
/// validator.on_block_change(&host, &host, &host, host.world, in_front, ChangeKind::Place);
/// assert!(validator.is_valid(key));
/// ```
#[derive(Debug, Default)]
pub struct Validator {
    controllers: HashMap<ControllerKey, ControllerInstance>,
    /// Invariant: `reverse[cell]` lists `key` exactly once iff `controllers[key]`
    /// scanned `cell`; there are no empty buckets.
    reverse: HashMap<WorldCell, Vec<ControllerKey>>,
}

impl Validator {
    /// Constructs a validator with nothing registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered controllers.
    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    /// Whether no controllers are registered.
    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }

    /// The keys of all registered controllers, in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = ControllerKey> + '_ {
        self.controllers.keys().copied()
    }

    /// Unregisters everything.
    pub fn clear(&mut self) {
        self.controllers.clear();
        self.reverse.clear();
    }

    /// Whether the structure anchored at `key` is currently complete: every cell of
    /// its template is satisfied by live world state.
    ///
    /// O(1); reads the maintained counter. An unregistered key is not valid (no
    /// error); hosts registering lazily must register before relying on the answer.
    pub fn is_valid(&self, key: ControllerKey) -> bool {
        self.controllers
            .get(&key)
            .is_some_and(|instance| instance.valid_count >= instance.cell_validity.len())
    }

    /// Registers (or re-registers) `key` as anchoring the structure `structure`,
    /// facing `orientation`, then scans every cell of the template's bounding box
    /// against live world state to build the validity cache.
    ///
    /// If `structure` does not resolve or its template fails to initialize, this is a
    /// no-op apart from a warning: an existing registration for `key` is deliberately
    /// left as it was. Callers that mean to clear the key call
    /// [`Validator::unregister()`].
    pub fn register(
        &mut self,
        world: &dyn WorldSource,
        templates: &dyn TemplateSource,
        key: ControllerKey,
        orientation: Orientation,
        structure: StructureId,
    ) {
        let Some(template) = templates.resolve(&structure) else {
            log::warn!(
                "structure {structure:?} did not resolve; leaving controller {key:?} as it was"
            );
            return;
        };
        if let Err(error) = template.initialize() {
            log::warn!(
                "template for structure {structure:?} failed to initialize: {error}; \
                 leaving controller {key:?} as it was"
            );
            return;
        }

        // Tear down any previous instance using its own orientation and template,
        // which need not match the new ones.
        if let Some(old) = self.controllers.remove(&key) {
            self.remove_reverse_entries(key, &old);
        }

        let requirements = template.requirements();
        let mut cell_validity = Vec::with_capacity(requirements.len());
        let mut valid_count = 0;
        for requirement in requirements {
            let position = orientation.local_to_world(key.position, requirement.offset());
            let live = world.block_at(key.world, position);
            let valid = requirement.matches(&live, orientation);
            cell_validity.push(valid);
            if valid {
                valid_count += 1;
            }
            self.reverse
                .entry((key.world, position))
                .or_default()
                .push(key);
        }

        log::trace!(
            "registered {key:?} against structure {structure:?} \
             ({valid_count}/{cell_count} cells valid)",
            cell_count = cell_validity.len(),
        );
        self.controllers.insert(
            key,
            ControllerInstance {
                structure,
                orientation,
                template,
                cell_validity: cell_validity.into_boxed_slice(),
                valid_count,
            },
        );
    }

    /// Unregisters whatever is registered at `key`, removing its reverse entries.
    /// No-op for an unregistered key.
    pub fn unregister(&mut self, key: ControllerKey) {
        if let Some(old) = self.controllers.remove(&key) {
            self.remove_reverse_entries(key, &old);
        }
    }

    /// Applies one block mutation at `position` in the world `world_id`.
    ///
    /// Two steps. First, controller lifecycle: unless `kind` is
    /// [`ChangeKind::Break`] (a broken block cannot be a controller), ask the
    /// controller source whether `position` holds a controller, and register or
    /// unregister accordingly; a registration whose structure and orientation are
    /// unchanged is skipped rather than rescanned. Second, cell upkeep: revalidate
    /// the changed position for every registered controller whose bounding box covers
    /// it, in O(1) each.
    ///
    /// A replacement of one block by another must arrive as a single
    /// [`ChangeKind::Modify`] (see [`ChangeKind`] for the coalescing contract).
    pub fn on_block_change(
        &mut self,
        world: &dyn WorldSource,
        templates: &dyn TemplateSource,
        controllers: &dyn ControllerSource,
        world_id: WorldId,
        position: WorldPoint,
        kind: ChangeKind,
    ) {
        let key = ControllerKey::new(world_id, position);
        let identity = match kind {
            ChangeKind::Break => None,
            ChangeKind::Place | ChangeKind::Modify => {
                controllers.controller_at(world_id, position)
            }
        };
        if let Some(state) = identity {
            let unchanged = self.controllers.get(&key).is_some_and(|instance| {
                instance.structure == *state.structure()
                    && instance.orientation == state.orientation()
            });
            // An unchanged binding needs no rescan; the upkeep below covers the
            // block's own new state.
            if !unchanged {
                self.register(
                    world,
                    templates,
                    key,
                    state.orientation(),
                    state.structure().clone(),
                );
            }
        } else {
            // No controller here (any longer). Covers both Break at a registered key
            // and the identity source dropping one.
            self.unregister(key);
        }

        let cell = (world_id, position);
        let Some(bucket) = self.reverse.get(&cell) else {
            return;
        };
        for &referencing in bucket {
            let Some(instance) = self.controllers.get_mut(&referencing) else {
                log::error!(
                    "reverse index corrupt: {cell:?} lists {referencing:?}, \
                     which is not registered"
                );
                continue;
            };
            let offset = instance
                .orientation
                .world_to_local(referencing.position, position);
            let Some(index) = instance.template.offset_to_index(offset) else {
                log::error!(
                    "reverse index corrupt: {cell:?} is outside the template \
                     bounding box of {referencing:?}"
                );
                continue;
            };
            let live = world.block_at(referencing.world, position);
            let valid = instance
                .template
                .validate_cell(offset, &live, instance.orientation);

            let was_valid = instance.cell_validity[index];
            if was_valid {
                instance.valid_count -= 1;
            }
            instance.cell_validity[index] = valid;
            if valid {
                instance.valid_count += 1;
            }
            log::trace!("revalidated cell {position:?} of {referencing:?}: {was_valid} -> {valid}");
        }
    }

    /// Recomputes, from live world state, the list of cells at which the structure
    /// anchored at `key` fails its template, expected states denormalized to the
    /// controller's orientation.
    ///
    /// O(template size). This deliberately never consults the incremental validity
    /// cache, so the diagnostics are right even if the cache is not. Unregistered key
    /// yields an empty list.
    pub fn compute_mismatches(&self, world: &dyn WorldSource, key: ControllerKey) -> Vec<Mismatch> {
        let Some(instance) = self.controllers.get(&key) else {
            return Vec::new();
        };
        let orientation = instance.orientation;
        let mut mismatches = Vec::new();
        for requirement in instance.template.requirements() {
            let position = orientation.local_to_world(key.position, requirement.offset());
            let live = world.block_at(key.world, position);
            if let Some((kind, expected)) = requirement.diff(&live, orientation) {
                mismatches.push(Mismatch::new(position, kind, expected));
            }
        }
        mismatches
    }

    /// Unregisters every controller whose bound structure id satisfies `predicate`,
    /// returning the keys that were unregistered, in no particular order.
    pub fn forget_matching(
        &mut self,
        predicate: impl Fn(&StructureId) -> bool,
    ) -> Vec<ControllerKey> {
        // Snapshot first; unregistration mutates the map being iterated.
        let matching: Vec<ControllerKey> = self
            .controllers
            .iter()
            .filter(|(_, instance)| predicate(&instance.structure))
            .map(|(&key, _)| key)
            .collect();
        for &key in &matching {
            self.unregister(key);
        }
        matching
    }

    /// Forces re-registration of every controller bound to `structure`, for use when
    /// that structure's template definition has changed: each one is unregistered and
    /// then, if the controller source still reports it, registered afresh against a
    /// freshly resolved template.
    ///
    /// Controllers the source no longer reports stay unregistered, ready for lazy
    /// re-registration by the host.
    pub fn invalidate_templates_matching(
        &mut self,
        world: &dyn WorldSource,
        templates: &dyn TemplateSource,
        controllers: &dyn ControllerSource,
        structure: &StructureId,
    ) {
        for key in self.forget_matching(|candidate| candidate == structure) {
            if let Some(state) = controllers.controller_at(key.world, key.position) {
                self.register(
                    world,
                    templates,
                    key,
                    state.orientation(),
                    state.structure().clone(),
                );
            }
        }
    }

    /// Removes `key` from the reverse bucket of every cell `instance` scanned.
    ///
    /// `instance` must already be out of `self.controllers`. A bucket or entry that
    /// is unexpectedly absent means the indices desynchronized; that is reported and
    /// skipped, never a panic.
    fn remove_reverse_entries(&mut self, key: ControllerKey, instance: &ControllerInstance) {
        for requirement in instance.template.requirements() {
            let position = instance
                .orientation
                .local_to_world(key.position, requirement.offset());
            let cell = (key.world, position);
            let Some(bucket) = self.reverse.get_mut(&cell) else {
                log::error!("reverse index corrupt: no bucket for {cell:?} while removing {key:?}");
                continue;
            };
            if let Some(index) = bucket.iter().position(|entry| *entry == key) {
                bucket.swap_remove(index);
            } else {
                log::error!("reverse index corrupt: bucket for {cell:?} does not list {key:?}");
            }
            if bucket.is_empty() {
                self.reverse.remove(&cell);
            }
        }
    }

    /// Check that the two indices mirror each other exactly and every validity
    /// counter accurately counts its cache.
    #[cfg(test)]
    #[track_caller]
    fn consistency_check(&self) {
        let mut problems = Vec::new();

        for (key, instance) in &self.controllers {
            let actual = instance.cell_validity.iter().filter(|&&valid| valid).count();
            if instance.valid_count != actual {
                problems.push(format!(
                    "{key:?} has valid_count {count} but {actual} valid cells",
                    count = instance.valid_count,
                ));
            }
            if instance.cell_validity.len() != instance.template.len() {
                problems.push(format!(
                    "{key:?} caches {cached} cells for a template of {expected}",
                    cached = instance.cell_validity.len(),
                    expected = instance.template.len(),
                ));
            }
        }

        // Forward to reverse: every scanned cell lists its controller exactly once.
        let mut expected: HashMap<WorldCell, Vec<ControllerKey>> = HashMap::new();
        for (&key, instance) in &self.controllers {
            for requirement in instance.template.requirements() {
                let position = instance
                    .orientation
                    .local_to_world(key.position, requirement.offset());
                expected.entry((key.world, position)).or_default().push(key);
            }
        }
        for (cell, expected_bucket) in &expected {
            if let Some(actual_bucket) = self.reverse.get(cell) {
                for key in expected_bucket {
                    let occurrences = actual_bucket.iter().filter(|entry| *entry == key).count();
                    if occurrences != 1 {
                        problems.push(format!(
                            "reverse bucket for {cell:?} lists {key:?} {occurrences} times"
                        ));
                    }
                }
            } else {
                problems.push(format!("reverse index has no bucket for {cell:?}"));
            }
        }

        // Reverse to forward: no stray entries, no empty buckets.
        for (cell, actual_bucket) in &self.reverse {
            let expected_bucket = expected.get(cell).map_or(&[][..], Vec::as_slice);
            for key in actual_bucket {
                if !expected_bucket.contains(key) {
                    problems.push(format!(
                        "reverse bucket for {cell:?} lists {key:?}, which did not scan it"
                    ));
                }
            }
            if actual_bucket.is_empty() {
                problems.push(format!("reverse index has an empty bucket for {cell:?}"));
            }
        }

        if !problems.is_empty() {
            panic!(
                "Validator consistency check failed:\n • {}\n",
                problems.join("\n • ")
            );
        }
    }
}

// -------------------------------------------------------------------------------------------

/// One registered controller's cached state.
#[derive(Debug)]
struct ControllerInstance {
    structure: StructureId,
    orientation: Orientation,
    template: Arc<StructureTemplate>,
    /// One flag per template requirement, aligned to the dense index.
    cell_validity: Box<[bool]>,
    /// Count of `true` entries in `cell_validity`.
    valid_count: usize,
}
