//! Incremental validation of multiblock structures in voxel worlds.
//!
//! A multiblock structure is a shape built out of individual blocks (a furnace with its
//! chimney, a portal frame, a pillar) which has its behavior only while every one of
//! its blocks is in place. This crate keeps that completeness judgement cheap: the host
//! reports each block mutation once, and in exchange [`Validator::is_valid()`] is an
//! O(1) counter read instead of a bounding-box rescan, no matter how large the
//! structure is or how often it is queried.
//!
//! The crate never stores a world of its own. The host supplies observations through
//! three traits:
//!
//! * [`WorldSource`] reports the block at a position.
//! * [`TemplateSource`] resolves structure identifiers to [`StructureTemplate`]s.
//! * [`ControllerSource`] reports whether a position holds a controller block and, if
//!   so, which structure it anchors and which way it faces.
//!
//! Restrictions and caveats:
//!
//! * Orientations are the four compass directions plus up and down
//!   ([`math::Orientation`]); arbitrary rotation and mirroring are not supported.
//! * A template must fill its bounding box densely; sparse or duplicated requirements
//!   are reported as [`TemplateError`]s when the template is first used.
//! * A [`Validator`] is plain mutable state belonging to one logical simulation thread.
//!   Hand concurrent consumers owned snapshots (such as the output of
//!   [`Validator::compute_mismatches()`]), not the validator itself.
//!
//! # Getting started
//!
//! [`Validator`] is the central type, and its documentation contains a worked example.
//! Everything else supports describing structures ([`StructureTemplate`],
//! [`BlockRequirement`], [`BlockState`]) or connecting the validator to the host
//! ([`WorldSource`], [`TemplateSource`], [`ControllerSource`], [`ControllerKey`],
//! [`ChangeKind`]).
//!
//! ## Crate features
//!
//! This crate, `blockwork`, defines the following feature flags:
//!
//! * `serde`:
//!   Adds [`serde`] serialization of the data model types ([`BlockState`],
//!   [`BlockRequirement`], [`math::Orientation`]) so that hosts can keep template
//!   libraries on disk.
//!
//! ## Dependencies and global state
//!
//! This crate has no global state other than the allocation of [`WorldId`]s. It reports
//! runtime problems, such as a structure identifier that does not resolve, using the
//! [`log`] crate and is therefore subject to that global configuration.
//!
//! [`euclid`] is depended on and re-exported as part of the public API
//! (as `blockwork::euclid`).
#![cfg_attr(not(feature = "serde"), doc = "[`serde`]: https://docs.rs/serde/")]
// Crate-specific lint settings. (General settings can be found in the workspace manifest.)
#![forbid(unsafe_code)]

mod block;
pub use block::*;
pub mod math;
mod template;
pub use template::*;
mod validator;
pub use validator::*;
mod world;
pub use world::*;

/// Re-export of the version of the [`euclid`] vector math library used in this crate's
/// public API.
pub use euclid;
