//! Block identities and observed block states.

use core::fmt;
use std::collections::BTreeMap;

use arcstr::ArcStr;

use crate::math::Orientation;

// -------------------------------------------------------------------------------------------

/// Identifier of a block type, such as `"stone"` or `"machine_controller"`.
///
/// Two ids are the same block type iff they are equal as strings; there is no separate
/// type registry in this crate.
pub type BlockTypeId = ArcStr;

/// Identifier of a structure definition, resolvable through a
/// [`TemplateSource`](crate::world::TemplateSource).
pub type StructureId = ArcStr;

/// Property key-value pairs attached to a block, such as `facing=east`.
///
/// A `BTreeMap` keeps iteration order deterministic for display and comparison.
pub type PropertyMap = BTreeMap<ArcStr, ArcStr>;

/// The property key whose value names the direction a block faces.
///
/// Values of this property are subject to orientation
/// [normalization](BlockState::normalize_facing); all other properties are compared
/// verbatim.
pub const FACING_PROPERTY: ArcStr = arcstr::literal!("facing");

// -------------------------------------------------------------------------------------------

/// A block type together with its properties, as observed in a world or expected by a
/// template.
///
/// ```
/// use blockwork::BlockState;
///
/// let state = BlockState::new("furnace").with_property("facing", "east");
/// assert_eq!(state.property("facing"), Some("east"));
/// assert_eq!(state.to_string(), "furnace[facing=east]");
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockState {
    block_type: BlockTypeId,
    properties: PropertyMap,
}

impl BlockState {
    /// Constructs a state of the given block type with no properties.
    pub fn new(block_type: impl Into<BlockTypeId>) -> Self {
        Self {
            block_type: block_type.into(),
            properties: PropertyMap::new(),
        }
    }

    /// Returns `self` with the given property added, replacing any previous value for
    /// the same key.
    #[must_use]
    pub fn with_property(mut self, key: impl Into<ArcStr>, value: impl Into<ArcStr>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// The block type identifier.
    #[inline]
    pub fn block_type(&self) -> &BlockTypeId {
        &self.block_type
    }

    /// All properties of this state.
    #[inline]
    pub fn properties(&self) -> &PropertyMap {
        &self.properties
    }

    /// The value of the property `key`, if present.
    #[inline]
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(ArcStr::as_str)
    }

    /// The direction this block faces, according to its [`FACING_PROPERTY`].
    ///
    /// Returns [`None`] if the property is absent or its value names no direction.
    #[inline]
    pub fn facing(&self) -> Option<Orientation> {
        self.property(&FACING_PROPERTY)
            .and_then(Orientation::from_name)
    }

    /// Rewrites the [`FACING_PROPERTY`] of a state observed in a structure facing
    /// `orientation`, to what it would be if the structure faced
    /// [`North`](Orientation::North).
    ///
    /// Template authors apply this when capturing requirements, so that stored
    /// templates are orientation independent. Exact inverse of
    /// [`BlockState::denormalize_facing()`]. A state without a recognizable facing
    /// value is returned unchanged.
    #[must_use]
    pub fn normalize_facing(self, orientation: Orientation) -> Self {
        self.map_facing(|facing| orientation.unrotate_direction(facing))
    }

    /// Rewrites the canonical [`FACING_PROPERTY`] of a stored state to what a live
    /// block must report in a structure facing `orientation`.
    #[must_use]
    pub fn denormalize_facing(self, orientation: Orientation) -> Self {
        self.map_facing(|facing| orientation.rotate_direction(facing))
    }

    fn map_facing(mut self, f: impl FnOnce(Orientation) -> Orientation) -> Self {
        if let Some(facing) = self.facing() {
            self.properties
                .insert(FACING_PROPERTY, ArcStr::from(f(facing).name()));
        }
        self
    }
}

/// Formats the state as `type[key=value, ...]`, or bare `type` when there are no
/// properties.
impl fmt::Display for BlockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.block_type)?;
        if !self.properties.is_empty() {
            f.write_str("[")?;
            for (i, (key, value)) in self.properties.iter().enumerate() {
                if i != 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            f.write_str("]")?;
        }
        Ok(())
    }
}

// -------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn property_access() {
        let state = BlockState::new("boiler")
            .with_property("lit", "true")
            .with_property("level", "3");
        assert_eq!(state.block_type().as_str(), "boiler");
        assert_eq!(state.property("lit"), Some("true"));
        assert_eq!(state.property("level"), Some("3"));
        assert_eq!(state.property("missing"), None);
        assert_eq!(state.properties().len(), 2);
    }

    #[test]
    fn with_property_replaces() {
        let state = BlockState::new("lamp")
            .with_property("lit", "false")
            .with_property("lit", "true");
        assert_eq!(state.property("lit"), Some("true"));
        assert_eq!(state.properties().len(), 1);
    }

    #[test]
    fn display_forms() {
        assert_eq!(BlockState::new("stone").to_string(), "stone");
        assert_eq!(
            BlockState::new("furnace")
                .with_property("lit", "true")
                .with_property("facing", "west")
                .to_string(),
            // BTreeMap ordering puts the keys in sorted order.
            "furnace[facing=west, lit=true]",
        );
    }

    #[test]
    fn facing_parses_or_not() {
        assert_eq!(
            BlockState::new("fan").with_property("facing", "up").facing(),
            Some(Orientation::Up),
        );
        assert_eq!(
            BlockState::new("fan").with_property("facing", "sideways").facing(),
            None,
        );
        assert_eq!(BlockState::new("fan").facing(), None);
    }

    /// Denormalization undoes normalization for every direction and orientation.
    #[test]
    fn facing_normalization_round_trip() {
        for orientation in Orientation::ALL {
            for direction in Orientation::ALL {
                let observed = BlockState::new("piston").with_property(
                    FACING_PROPERTY,
                    direction.name(),
                );
                let stored = observed.clone().normalize_facing(orientation);
                assert_eq!(
                    stored.denormalize_facing(orientation),
                    observed,
                    "{orientation:?} applied to {direction:?}",
                );
            }
        }
    }

    /// A concrete case: a block facing east in an east-facing structure is stored
    /// facing north, the canonical forward direction.
    #[test]
    fn normalization_concrete() {
        let observed = BlockState::new("nozzle").with_property("facing", "east");
        assert_eq!(
            observed.normalize_facing(Orientation::East).property("facing"),
            Some("north"),
        );
    }

    #[test]
    fn normalization_leaves_unrelated_states_alone() {
        let plain = BlockState::new("stone");
        assert_eq!(plain.clone().normalize_facing(Orientation::East), plain);

        let garbled = BlockState::new("fan").with_property("facing", "widdershins");
        assert_eq!(garbled.clone().denormalize_facing(Orientation::Up), garbled);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_round_trip() {
        use serde_json::{from_value, json, to_value};

        let state = BlockState::new("furnace")
            .with_property("facing", "east")
            .with_property("lit", "true");
        let value = to_value(&state).unwrap();
        assert_eq!(
            value,
            json!({
                "block_type": "furnace",
                "properties": {"facing": "east", "lit": "true"},
            })
        );
        assert_eq!(from_value::<BlockState>(value).unwrap(), state);
    }
}
