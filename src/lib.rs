//! Typed diagram-model core for the visual modeling editor.
//!
//! This crate owns the part of the editor that has real invariants: the closed
//! set of element and relationship kinds, container ownership and layout
//! clamping, the per-source-kind relationship allow-list, and the JSON
//! contract shared with the renderer, the importer and the exporters. Hosts
//! drive it by applying [`command::Command`]s to a [`diagram::Diagram`] and
//! read the result back through [`serialize`].
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`kind`] | Closed type tags for elements, relationships and diagrams |
//! | [`registry`] | Immutable per-kind defaults, minimum sizes and allow-lists |
//! | [`geometry`] | Bounds, points, paths and clamping helpers |
//! | [`style`] | Optional fill/stroke/text colors shared by all records |
//! | [`element`] | Element record, kind-specific props and default merging |
//! | [`layout`] | Clamps container children into the content region |
//! | [`relationship`] | Relationship record and type validation |
//! | [`diagram`] | The in-memory graph and its read-side queries |
//! | [`command`] | Single-writer command application |
//! | [`serialize`] | Plain JSON records and the persisted model shape |
//! | [`persistence`] | Debounced snapshot writer running on tokio |
//! | [`session`] | A diagram paired with its persistence handle |
//! | [`config`] | Environment-driven settings |
//! | [`consts`] | Shared constants (model version, default path, palette sizes) |
//! | [`error`] | Error types and grepable error codes |

pub mod command;
pub mod config;
pub mod consts;
pub mod diagram;
pub mod element;
pub mod error;
pub mod geometry;
pub mod kind;
pub mod layout;
pub mod persistence;
pub mod registry;
pub mod relationship;
pub mod serialize;
pub mod session;
pub mod style;

pub use command::{Applied, Command};
pub use diagram::Diagram;
pub use element::{Element, ElementId, ElementPatch};
pub use error::{ErrorCode, ModelError};
pub use kind::{DiagramType, ElementType, RelationshipType};
pub use relationship::{Relationship, RelationshipId, RelationshipPatch};
