//! The in-memory diagram graph and its read-side queries.
//!
//! DESIGN
//! ======
//! A `Diagram` owns every element and relationship by id. Mutation goes
//! exclusively through [`Diagram::apply`] (see [`crate::command`]), which
//! keeps three invariants after every command:
//!
//! - ownership is bidirectional: `child.owner == Some(c)` iff `c.children`
//!   lists the child;
//! - both endpoints of every relationship exist;
//! - every relationship kind is in the allow-list of its source's kind.
//!
//! Reads never observe a half-applied command because commands run on a
//! working copy that replaces the graph only on success.

#[cfg(test)]
#[path = "diagram_test.rs"]
mod diagram_test;

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::consts::MODEL_VERSION;
use crate::element::{Element, ElementId, Placement};
use crate::kind::DiagramType;
use crate::layout;
use crate::relationship::{Relationship, RelationshipId};

// =============================================================================
// AUXILIARY MODEL DATA
// =============================================================================

/// Per-id interactivity flags carried with the model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Selection {
    pub elements: BTreeMap<String, bool>,
    pub relationships: BTreeMap<String, bool>,
}

/// Grading result attached to a model element. Carried through unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub model_element_id: String,
    pub element_type: String,
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drop_info: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correction_status: Option<CorrectionStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: CorrectionState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CorrectionState {
    Correct,
    Incorrect,
    NotValidated,
}

/// Canvas extent of the diagram.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// Non-fatal condition worth showing to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// Element placed on the canvas without an owning container.
    Orphan(ElementId),
}

// =============================================================================
// DIAGRAM
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Diagram {
    pub(crate) version: String,
    pub(crate) diagram_type: DiagramType,
    pub(crate) elements: HashMap<ElementId, Element>,
    pub(crate) relationships: HashMap<RelationshipId, Relationship>,
    pub(crate) interactive: Selection,
    pub(crate) assessments: BTreeMap<String, Assessment>,
    /// Opaque payload a host attaches for side-by-side comparison.
    pub(crate) reference_diagram_data: Option<serde_json::Value>,
}

impl Diagram {
    /// Empty diagram of the given family.
    #[must_use]
    pub fn new(diagram_type: DiagramType) -> Self {
        Self {
            version: MODEL_VERSION.to_owned(),
            diagram_type,
            elements: HashMap::new(),
            relationships: HashMap::new(),
            interactive: Selection::default(),
            assessments: BTreeMap::new(),
            reference_diagram_data: None,
        }
    }

    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    #[must_use]
    pub fn diagram_type(&self) -> DiagramType {
        self.diagram_type
    }

    #[must_use]
    pub fn element(&self, id: &ElementId) -> Option<&Element> {
        self.elements.get(id)
    }

    #[must_use]
    pub fn relationship(&self, id: &RelationshipId) -> Option<&Relationship> {
        self.relationships.get(id)
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.elements.values()
    }

    pub fn relationships(&self) -> impl Iterator<Item = &Relationship> {
        self.relationships.values()
    }

    #[must_use]
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn relationship_count(&self) -> usize {
        self.relationships.len()
    }

    #[must_use]
    pub fn interactive(&self) -> &Selection {
        &self.interactive
    }

    #[must_use]
    pub fn assessments(&self) -> &BTreeMap<String, Assessment> {
        &self.assessments
    }

    #[must_use]
    pub fn reference_diagram_data(&self) -> Option<&serde_json::Value> {
        self.reference_diagram_data.as_ref()
    }

    /// Children of `id` in container order. Empty for unknown ids and
    /// non-containers.
    #[must_use]
    pub fn children_of(&self, id: &ElementId) -> Vec<&Element> {
        self.elements
            .get(id)
            .map(|c| c.children.iter().filter_map(|child| self.elements.get(child)).collect())
            .unwrap_or_default()
    }

    /// Relationships with `id` as source or target, sorted by id.
    #[must_use]
    pub fn incident_relationships(&self, id: &ElementId) -> Vec<RelationshipId> {
        let mut ids: Vec<RelationshipId> = self
            .relationships
            .values()
            .filter(|r| &r.source.element == id || &r.target.element == id)
            .map(|r| r.id.clone())
            .collect();
        ids.sort();
        ids
    }

    /// Orphan warnings, sorted by element id.
    #[must_use]
    pub fn warnings(&self) -> Vec<Warning> {
        let mut orphans: Vec<&ElementId> = self
            .elements
            .values()
            .filter(|e| e.placement() == Placement::Orphan)
            .map(|e| &e.id)
            .collect();
        orphans.sort();
        orphans.into_iter().map(|id| Warning::Orphan(id.clone())).collect()
    }

    /// Extent covering every top-level element and every relationship path.
    #[must_use]
    pub fn size(&self) -> Size {
        let elements = self
            .elements
            .values()
            .filter(|e| e.owner.is_none())
            .map(|e| (e.bounds.right(), e.bounds.bottom()));
        let relationships = self.relationships.values().map(|r| (r.bounds.right(), r.bounds.bottom()));
        elements
            .chain(relationships)
            .fold(Size::default(), |size, (right, bottom)| Size {
                width: size.width.max(right),
                height: size.height.max(bottom),
            })
    }

    /// Whether owner back-references and container child lists agree.
    #[must_use]
    pub fn ownership_consistent(&self) -> bool {
        let owners_agree = self.elements.values().all(|e| match &e.owner {
            Some(owner) => self.elements.get(owner).is_some_and(|c| c.children.contains(&e.id)),
            None => true,
        });
        let children_agree = self.elements.values().all(|c| {
            c.children
                .iter()
                .all(|child| self.elements.get(child).is_some_and(|e| e.owner.as_ref() == Some(&c.id)))
        });
        owners_agree && children_agree
    }

    /// Re-run layout for every container.
    pub fn relayout_all(&mut self) {
        let mut containers: Vec<ElementId> = self
            .elements
            .values()
            .filter(|e| e.is_container())
            .map(|e| e.id.clone())
            .collect();
        containers.sort();
        for id in containers {
            self.relayout(&id);
        }
    }

    /// Lay out the children of `id`, then walk up the owner chain so every
    /// ancestor sees the container's possibly raised size.
    pub(crate) fn relayout(&mut self, id: &ElementId) {
        let mut current = Some(id.clone());
        while let Some(container_id) = current.take() {
            let Some(container) = self.elements.get(&container_id) else {
                break;
            };
            if container.is_container() {
                let children: Vec<Element> = container
                    .children
                    .iter()
                    .filter_map(|child| self.elements.get(child).cloned())
                    .collect();
                let result = layout::layout(container, &children);
                for child in result.children {
                    self.elements.insert(child.id.clone(), child);
                }
                self.elements.insert(container_id.clone(), result.container);
            }
            current = self.elements.get(&container_id).and_then(|c| c.owner.clone());
        }
    }
}
