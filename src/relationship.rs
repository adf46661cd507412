//! Relationship model and type validation.
//!
//! DESIGN
//! ======
//! Every proposed relationship kind is checked against the allow-list of the
//! source element's kind. A proposal is either accepted or rejected; a
//! rejected proposal falls back to the generic link, which every source kind
//! allows, so creation never fails on the kind alone.
//!
//! When an accepted decision changes a relationship's kind, its `name` and
//! `strokeColor` are reset to the new kind's defaults unless the same patch
//! supplies them. Kind-specific metadata of the old kind is dropped.

#[cfg(test)]
#[path = "relationship_test.rs"]
mod relationship_test;

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::consts::DEFAULT_PATH;
use crate::element::ElementId;
use crate::error::ModelError;
use crate::geometry::{Bounds, Path, Point};
use crate::kind::{Direction, ElementType, RelationshipType};
use crate::registry;
use crate::style::{Annotations, Style, StylePatch};

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Opaque relationship identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelationshipId(String);

impl RelationshipId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RelationshipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RelationshipId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

// =============================================================================
// TYPES
// =============================================================================

/// One end of a relationship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub element: ElementId,
    #[serde(default)]
    pub direction: Direction,
}

impl Endpoint {
    #[must_use]
    pub fn new(element: ElementId, direction: Direction) -> Self {
        Self { element, direction }
    }
}

/// A directed, typed edge between two elements.
#[derive(Debug, Clone, PartialEq)]
pub struct Relationship {
    pub id: RelationshipId,
    pub name: String,
    pub relationship_type: RelationshipType,
    pub source: Endpoint,
    pub target: Endpoint,
    pub path: Path,
    /// Bounding box of `path`.
    pub bounds: Bounds,
    pub style: Style,
    pub description: Option<String>,
    pub annotations: Annotations,
    /// Set by the editor once a user drags the path by hand.
    pub is_manually_layouted: Option<bool>,
    /// DelegationLink only, e.g. "task" or "query".
    pub delegation_type: Option<String>,
    /// SupervisionLink only, e.g. "direct" or "advisory".
    pub supervision_level: Option<String>,
}

/// Outcome of checking a proposed kind against the source's allow-list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeDecision {
    Accepted(RelationshipType),
    Rejected { proposed: RelationshipType, fallback: RelationshipType },
}

impl TypeDecision {
    /// The kind the relationship ends up with.
    #[must_use]
    pub fn resolved(self) -> RelationshipType {
        match self {
            Self::Accepted(t) => t,
            Self::Rejected { fallback, .. } => fallback,
        }
    }

    #[must_use]
    pub fn is_accepted(self) -> bool {
        matches!(self, Self::Accepted(_))
    }
}

/// Check `proposed` against the allow-list of `source`.
#[must_use]
pub fn validate_type(source: ElementType, proposed: RelationshipType) -> TypeDecision {
    if registry::element_entry(source).allowed_relationships.contains(&proposed) {
        TypeDecision::Accepted(proposed)
    } else {
        debug!(%source, %proposed, "relationship kind not allowed for source; using generic link");
        TypeDecision::Rejected { proposed, fallback: RelationshipType::GENERIC }
    }
}

impl Relationship {
    /// A relationship of `relationship_type` with the kind's default name and
    /// stroke color and a straight default path. The kind is taken as given;
    /// callers validate it first.
    #[must_use]
    pub fn new(relationship_type: RelationshipType, source: Endpoint, target: Endpoint) -> Self {
        let entry = registry::relationship_entry(relationship_type);
        let [(x1, y1), (x2, y2)] = DEFAULT_PATH;
        let path = Path::straight(Point::new(x1, y1), Point::new(x2, y2));
        Self {
            id: RelationshipId::generate(),
            name: entry.default_name.to_owned(),
            relationship_type,
            source,
            target,
            bounds: path.bounds(),
            path,
            style: Style::stroke(entry.stroke_color),
            description: None,
            annotations: Annotations::default(),
            is_manually_layouted: None,
            delegation_type: None,
            supervision_level: None,
        }
    }

    /// Replace the path and recompute the bounds.
    pub fn set_path(&mut self, path: Path) {
        self.bounds = path.bounds();
        self.path = path;
    }

    /// Where the label is drawn.
    #[must_use]
    pub fn label_anchor(&self) -> Point {
        self.path.midpoint()
    }

    /// Swap source and target and reverse the path.
    pub fn flip(&mut self) {
        std::mem::swap(&mut self.source, &mut self.target);
        self.path = self.path.reversed();
    }

    /// Switch to `new_type`, resetting name and stroke color to its defaults.
    /// Returns false and leaves the relationship untouched when the kind does
    /// not change.
    pub fn retype(&mut self, new_type: RelationshipType) -> bool {
        if new_type == self.relationship_type {
            return false;
        }
        let entry = registry::relationship_entry(new_type);
        self.relationship_type = new_type;
        self.name = entry.default_name.to_owned();
        self.style.stroke_color = Some(entry.stroke_color.to_owned());
        if new_type != RelationshipType::DelegationLink {
            self.delegation_type = None;
        }
        if new_type != RelationshipType::SupervisionLink {
            self.supervision_level = None;
        }
        true
    }

    /// Apply `patch` given the already-validated kind `decided`.
    ///
    /// The kind change runs first so explicit `name` and colors in the patch
    /// override the new kind's defaults. Endpoint existence is the caller's
    /// concern.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidPath`] if the patch carries a path shorter
    /// than two points; nothing is modified in that case.
    pub fn apply_patch(&mut self, patch: &RelationshipPatch, decided: RelationshipType) -> Result<(), ModelError> {
        let path = patch.path.clone().map(Path::new).transpose()?;

        self.retype(decided);
        if let Some(ref name) = patch.name {
            self.name.clone_from(name);
        }
        patch.style.apply_to(&mut self.style);
        if let Some(ref source) = patch.source {
            self.source = source.clone();
        }
        if let Some(ref target) = patch.target {
            self.target = target.clone();
        }
        if let Some(path) = path {
            self.set_path(path);
        }
        if self.relationship_type == RelationshipType::DelegationLink {
            if let Some(ref t) = patch.delegation_type {
                self.delegation_type = Some(t.clone());
            }
        }
        if self.relationship_type == RelationshipType::SupervisionLink {
            if let Some(ref level) = patch.supervision_level {
                self.supervision_level = Some(level.clone());
            }
        }
        Ok(())
    }
}

// =============================================================================
// PARTIAL UPDATE
// =============================================================================

/// Sparse update for a relationship. Only present fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RelationshipPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Proposed new kind; validated against the source's allow-list.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub relationship_type: Option<RelationshipType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<Endpoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<Endpoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<Point>>,
    #[serde(flatten)]
    pub style: StylePatch,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delegation_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supervision_level: Option<String>,
}

impl RelationshipPatch {
    /// Patch proposing a new kind and nothing else.
    #[must_use]
    pub fn retype(relationship_type: RelationshipType) -> Self {
        Self { relationship_type: Some(relationship_type), ..Self::default() }
    }
}
