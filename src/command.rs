//! Single-writer command application.
//!
//! DESIGN
//! ======
//! Every mutation of a [`Diagram`] is a [`Command`]. Applying a command is a
//! function `(graph, command) -> graph'`: the command runs against a working
//! copy, and the copy replaces the graph only when every step succeeded. A
//! failing command therefore leaves the graph exactly as it was.
//!
//! After the structural change, layout re-runs for each container the
//! command touched (the element itself when it is a container, its old owner
//! and its new owner) and cascades up their owner chains.
//!
//! ERROR HANDLING
//! ==============
//! Missing ids, non-container owners, containment cycles, dangling endpoints
//! and short paths are errors. A relationship kind the source may not
//! originate is not: it falls back to the generic link and the decision is
//! reported in [`Applied`].

#[cfg(test)]
#[path = "command_test.rs"]
mod command_test;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::diagram::Diagram;
use crate::element::{ElementId, ElementPatch, build_from_partial};
use crate::error::ModelError;
use crate::geometry::BoundsPatch;
use crate::kind::{ElementType, RelationshipType};
use crate::relationship::{
    Endpoint, Relationship, RelationshipId, RelationshipPatch, TypeDecision, validate_type,
};

// =============================================================================
// TYPES
// =============================================================================

/// A single mutation of the diagram graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    /// Add an element built from registry defaults overlaid by `patch`.
    CreateElement {
        #[serde(default)]
        id: Option<ElementId>,
        element_type: ElementType,
        #[serde(default)]
        owner: Option<ElementId>,
        #[serde(default)]
        patch: ElementPatch,
    },
    UpdateElement {
        id: ElementId,
        patch: ElementPatch,
    },
    /// Re-parent an element. `owner: None` moves it to the top level.
    MoveElement {
        id: ElementId,
        owner: Option<ElementId>,
        #[serde(default)]
        bounds: Option<BoundsPatch>,
    },
    /// Remove an element and its incident relationships. Children of a
    /// deleted container are orphaned, not deleted.
    DeleteElement {
        id: ElementId,
    },
    CreateRelationship {
        #[serde(default)]
        id: Option<RelationshipId>,
        relationship_type: RelationshipType,
        source: Endpoint,
        target: Endpoint,
        #[serde(default)]
        patch: RelationshipPatch,
    },
    UpdateRelationship {
        id: RelationshipId,
        patch: RelationshipPatch,
    },
    FlipRelationship {
        id: RelationshipId,
    },
    DeleteRelationship {
        id: RelationshipId,
    },
}

/// What a successful command did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    ElementCreated(ElementId),
    ElementUpdated(ElementId),
    ElementMoved(ElementId),
    ElementDeleted {
        id: ElementId,
        /// Incident relationships removed in the same command, sorted.
        relationships: Vec<RelationshipId>,
        /// Former children, now without an owner.
        orphaned: Vec<ElementId>,
    },
    RelationshipCreated {
        id: RelationshipId,
        decision: TypeDecision,
    },
    RelationshipUpdated {
        id: RelationshipId,
        decision: TypeDecision,
    },
    RelationshipFlipped {
        id: RelationshipId,
        decision: TypeDecision,
    },
    RelationshipDeleted(RelationshipId),
}

// =============================================================================
// APPLICATION
// =============================================================================

/// Apply `command` to a copy of `diagram` and return the new graph.
///
/// # Errors
///
/// Returns the first [`ModelError`] raised; `diagram` is never modified.
pub fn apply(diagram: &Diagram, command: Command) -> Result<(Diagram, Applied), ModelError> {
    let mut next = diagram.clone();
    let applied = next.execute(command)?;
    Ok((next, applied))
}

impl Diagram {
    /// Apply `command` in place. On error the graph is unchanged.
    ///
    /// # Errors
    ///
    /// Returns the first [`ModelError`] raised by the command.
    pub fn apply(&mut self, command: Command) -> Result<Applied, ModelError> {
        let (next, applied) = apply(self, command)?;
        *self = next;
        Ok(applied)
    }

    fn execute(&mut self, command: Command) -> Result<Applied, ModelError> {
        match command {
            Command::CreateElement { id, element_type, owner, patch } => {
                self.create_element(id, element_type, owner, &patch)
            }
            Command::UpdateElement { id, patch } => self.update_element(id, &patch),
            Command::MoveElement { id, owner, bounds } => self.move_element(id, owner, bounds),
            Command::DeleteElement { id } => self.delete_element(id),
            Command::CreateRelationship { id, relationship_type, source, target, patch } => {
                self.create_relationship(id, relationship_type, source, target, &patch)
            }
            Command::UpdateRelationship { id, patch } => self.update_relationship(id, &patch),
            Command::FlipRelationship { id } => self.flip_relationship(id),
            Command::DeleteRelationship { id } => self.delete_relationship(id),
        }
    }

    // =========================================================================
    // ELEMENTS
    // =========================================================================

    fn create_element(
        &mut self,
        id: Option<ElementId>,
        element_type: ElementType,
        owner: Option<ElementId>,
        patch: &ElementPatch,
    ) -> Result<Applied, ModelError> {
        let id = id.unwrap_or_else(ElementId::generate);
        if self.elements.contains_key(&id) {
            return Err(ModelError::DuplicateId(id.to_string()));
        }
        if let Some(ref owner) = owner {
            self.check_owner(owner)?;
        }

        let mut element = build_from_partial(element_type, patch);
        element.id = id.clone();
        element.owner.clone_from(&owner);
        self.elements.insert(id.clone(), element);

        match owner {
            Some(owner) => {
                if let Some(container) = self.elements.get_mut(&owner) {
                    container.children.push(id.clone());
                }
                self.relayout(&owner);
            }
            None => self.relayout(&id),
        }

        debug!(%id, %element_type, "element created");
        Ok(Applied::ElementCreated(id))
    }

    fn update_element(&mut self, id: ElementId, patch: &ElementPatch) -> Result<Applied, ModelError> {
        let element = self.elements.get_mut(&id).ok_or_else(|| ModelError::ElementNotFound(id.clone()))?;
        patch.apply_to(element);

        // Layout of a container cascades to its owner; a leaf only needs its
        // owner re-clamped.
        let target = if element.is_container() { Some(id.clone()) } else { element.owner.clone() };
        if let Some(target) = target {
            self.relayout(&target);
        }

        debug!(%id, "element updated");
        Ok(Applied::ElementUpdated(id))
    }

    fn move_element(
        &mut self,
        id: ElementId,
        owner: Option<ElementId>,
        bounds: Option<BoundsPatch>,
    ) -> Result<Applied, ModelError> {
        let Some(element) = self.elements.get(&id) else {
            return Err(ModelError::ElementNotFound(id));
        };
        let previous = element.owner.clone();
        if let Some(ref owner) = owner {
            self.check_owner(owner)?;
            if self.is_within(owner, &id) {
                return Err(ModelError::ContainmentCycle { element: id, owner: owner.clone() });
            }
        }

        if previous != owner {
            if let Some(ref previous) = previous {
                if let Some(container) = self.elements.get_mut(previous) {
                    container.children.retain(|child| child != &id);
                }
            }
            if let Some(ref owner) = owner {
                if let Some(container) = self.elements.get_mut(owner) {
                    container.children.push(id.clone());
                }
            }
        }
        if let Some(element) = self.elements.get_mut(&id) {
            element.owner.clone_from(&owner);
            if let Some(bounds) = bounds {
                bounds.apply_to(&mut element.bounds);
                element.enforce_minimum();
            }
        }

        // Relayout of the element walks up to its new owner.
        self.relayout(&id);
        if let Some(ref previous) = previous {
            self.relayout(previous);
        }

        debug!(%id, owner = ?owner.as_ref().map(ElementId::as_str), "element moved");
        Ok(Applied::ElementMoved(id))
    }

    fn delete_element(&mut self, id: ElementId) -> Result<Applied, ModelError> {
        let Some(element) = self.elements.remove(&id) else {
            return Err(ModelError::ElementNotFound(id));
        };

        // PHASE: CASCADE TO INCIDENT RELATIONSHIPS
        let relationships = self.incident_relationships(&id);
        for rel_id in &relationships {
            self.relationships.remove(rel_id);
            self.interactive.relationships.remove(rel_id.as_str());
            self.assessments.remove(rel_id.as_str());
        }

        // PHASE: ORPHAN CHILDREN
        // Children keep their coordinates; they become top-level elements.
        for child in &element.children {
            if let Some(child) = self.elements.get_mut(child) {
                child.owner = None;
            }
        }

        // PHASE: DETACH FROM OWNER
        if let Some(ref owner) = element.owner {
            if let Some(container) = self.elements.get_mut(owner) {
                container.children.retain(|child| child != &id);
            }
            self.relayout(owner);
        }

        self.interactive.elements.remove(id.as_str());
        self.assessments.remove(id.as_str());

        debug!(
            %id,
            relationships = relationships.len(),
            orphaned = element.children.len(),
            "element deleted"
        );
        Ok(Applied::ElementDeleted { id, relationships, orphaned: element.children })
    }

    /// `owner` exists and can own children.
    fn check_owner(&self, owner: &ElementId) -> Result<(), ModelError> {
        match self.elements.get(owner) {
            None => Err(ModelError::ElementNotFound(owner.clone())),
            Some(container) if !container.is_container() => Err(ModelError::NotAContainer(owner.clone())),
            Some(_) => Ok(()),
        }
    }

    /// Whether `candidate` is `ancestor` or sits somewhere below it.
    fn is_within(&self, candidate: &ElementId, ancestor: &ElementId) -> bool {
        let mut current = Some(candidate);
        let mut steps = 0;
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            steps += 1;
            if steps > self.elements.len() {
                return false;
            }
            current = self.elements.get(id).and_then(|e| e.owner.as_ref());
        }
        false
    }

    // =========================================================================
    // RELATIONSHIPS
    // =========================================================================

    fn create_relationship(
        &mut self,
        id: Option<RelationshipId>,
        proposed: RelationshipType,
        source: Endpoint,
        target: Endpoint,
        patch: &RelationshipPatch,
    ) -> Result<Applied, ModelError> {
        let id = id.unwrap_or_else(RelationshipId::generate);
        if self.relationships.contains_key(&id) {
            return Err(ModelError::DuplicateId(id.to_string()));
        }
        let source_type = self.endpoint_type(&id, &source.element)?;
        self.endpoint_type(&id, &target.element)?;

        let decision = validate_type(source_type, proposed);
        let mut relationship = Relationship::new(decision.resolved(), source, target);
        relationship.id = id.clone();

        // Endpoints and kind are fixed above; only cosmetic fields apply.
        let cosmetic = RelationshipPatch { relationship_type: None, source: None, target: None, ..patch.clone() };
        relationship.apply_patch(&cosmetic, decision.resolved())?;
        self.relationships.insert(id.clone(), relationship);

        debug!(%id, kind = %decision.resolved(), accepted = decision.is_accepted(), "relationship created");
        Ok(Applied::RelationshipCreated { id, decision })
    }

    fn update_relationship(&mut self, id: RelationshipId, patch: &RelationshipPatch) -> Result<Applied, ModelError> {
        let Some(current) = self.relationships.get(&id) else {
            return Err(ModelError::RelationshipNotFound(id));
        };
        let source = patch.source.as_ref().map_or(&current.source.element, |e| &e.element);
        let target = patch.target.as_ref().map_or(&current.target.element, |e| &e.element);
        let proposed = patch.relationship_type.unwrap_or(current.relationship_type);

        let source_type = self.endpoint_type(&id, source)?;
        self.endpoint_type(&id, target)?;
        let decision = validate_type(source_type, proposed);

        if let Some(relationship) = self.relationships.get_mut(&id) {
            relationship.apply_patch(patch, decision.resolved())?;
        }

        debug!(%id, kind = %decision.resolved(), accepted = decision.is_accepted(), "relationship updated");
        Ok(Applied::RelationshipUpdated { id, decision })
    }

    fn flip_relationship(&mut self, id: RelationshipId) -> Result<Applied, ModelError> {
        let Some(current) = self.relationships.get(&id) else {
            return Err(ModelError::RelationshipNotFound(id));
        };
        // The old target becomes the source.
        let source_type = self.endpoint_type(&id, &current.target.element)?;
        let decision = validate_type(source_type, current.relationship_type);

        if let Some(relationship) = self.relationships.get_mut(&id) {
            relationship.flip();
            relationship.retype(decision.resolved());
        }

        debug!(%id, kind = %decision.resolved(), "relationship flipped");
        Ok(Applied::RelationshipFlipped { id, decision })
    }

    fn delete_relationship(&mut self, id: RelationshipId) -> Result<Applied, ModelError> {
        if self.relationships.remove(&id).is_none() {
            return Err(ModelError::RelationshipNotFound(id));
        }
        self.interactive.relationships.remove(id.as_str());
        self.assessments.remove(id.as_str());

        debug!(%id, "relationship deleted");
        Ok(Applied::RelationshipDeleted(id))
    }

    /// Kind of the endpoint element, or `DanglingEndpoint` if it is missing.
    fn endpoint_type(&self, relationship: &RelationshipId, element: &ElementId) -> Result<ElementType, ModelError> {
        self.elements
            .get(element)
            .map(|e| e.element_type)
            .ok_or_else(|| ModelError::DanglingEndpoint { relationship: relationship.clone(), element: element.clone() })
    }
}
