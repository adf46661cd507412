//! Type registry: the one table mapping each kind tag to its defaults,
//! minimum size, container layout and relationship allow-list.
//!
//! DESIGN
//! ======
//! Entries are `static` items selected by an exhaustive `match` on the tag,
//! so every kind is registered by construction and the table can never be
//! mutated at runtime. New kinds are added here and nowhere else; every
//! other module reads defaults through this module.

#[cfg(test)]
#[path = "registry_test.rs"]
mod registry_test;

use std::collections::BTreeSet;

use crate::consts::{PALETTE_SWARM_HEIGHT, PALETTE_SWARM_WIDTH};
use crate::element::{AgentProps, Element, ElementId, ElementProps, LanguageModelProps, SwarmProps};
use crate::error::ModelError;
use crate::geometry::Bounds;
use crate::kind::{ElementType, RelationshipType};
use crate::relationship::{Endpoint, Relationship};
use crate::style::{Annotations, Style};

const DEFAULT_FRAMEWORK: &str = "BESSER-BAF";

// =============================================================================
// ENTRY TYPES
// =============================================================================

/// Content region of a container kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContainerLayout {
    /// Height of the title band children may not overlap.
    pub header_height: f64,
    /// Gap kept between children and the container edge.
    pub padding: f64,
}

/// Registry entry for an element kind.
#[derive(Debug)]
pub struct ElementEntry {
    pub element_type: ElementType,
    pub default_name: &'static str,
    pub default_width: f64,
    pub default_height: f64,
    pub min_width: f64,
    pub min_height: f64,
    pub fill_color: Option<&'static str>,
    /// `Some` for kinds that own children.
    pub container: Option<ContainerLayout>,
    /// Relationship kinds this element may originate.
    pub allowed_relationships: &'static [RelationshipType],
    default_props: fn() -> ElementProps,
}

impl ElementEntry {
    #[must_use]
    pub fn default_props(&self) -> ElementProps {
        (self.default_props)()
    }
}

/// Registry entry for a relationship kind.
#[derive(Debug)]
pub struct RelationshipEntry {
    pub relationship_type: RelationshipType,
    pub default_name: &'static str,
    pub stroke_color: &'static str,
}

// =============================================================================
// ELEMENT TABLE
// =============================================================================

const GENERIC_ONLY: &[RelationshipType] = &[RelationshipType::SwarmLink];

static SWARM: ElementEntry = ElementEntry {
    element_type: ElementType::Swarm,
    default_name: "Swarm",
    default_width: 200.0,
    default_height: 150.0,
    min_width: 200.0,
    min_height: 150.0,
    fill_color: None,
    container: Some(ContainerLayout { header_height: 50.0, padding: 10.0 }),
    allowed_relationships: GENERIC_ONLY,
    default_props: || ElementProps::Swarm(SwarmProps { framework: DEFAULT_FRAMEWORK.to_owned() }),
};

static AGENT_GROUP: ElementEntry = ElementEntry {
    element_type: ElementType::AgentGroup,
    default_name: "AgentGroup",
    default_width: 150.0,
    default_height: 80.0,
    min_width: 100.0,
    min_height: 60.0,
    fill_color: None,
    container: None,
    allowed_relationships: GENERIC_ONLY,
    default_props: || agent_props(""),
};

static EVALUATOR: ElementEntry = ElementEntry {
    element_type: ElementType::Evaluator,
    default_name: "Evaluator",
    default_width: 60.0,
    default_height: 80.0,
    min_width: 40.0,
    min_height: 60.0,
    fill_color: Some("#f59e0b"),
    container: None,
    allowed_relationships: GENERIC_ONLY,
    default_props: || agent_props("evaluator"),
};

static SOLVER: ElementEntry = ElementEntry {
    element_type: ElementType::Solver,
    default_name: "Solver",
    default_width: 60.0,
    default_height: 80.0,
    min_width: 40.0,
    min_height: 60.0,
    fill_color: Some("#10b981"),
    container: None,
    allowed_relationships: GENERIC_ONLY,
    default_props: || agent_props("solver"),
};

static SUPERVISOR: ElementEntry = ElementEntry {
    element_type: ElementType::Supervisor,
    default_name: "Supervisor",
    default_width: 60.0,
    default_height: 80.0,
    min_width: 40.0,
    min_height: 60.0,
    fill_color: Some("#ef4444"),
    container: None,
    allowed_relationships: &[RelationshipType::SupervisionLink, RelationshipType::SwarmLink],
    default_props: || agent_props("supervisor"),
};

static DISPATCHER: ElementEntry = ElementEntry {
    element_type: ElementType::Dispatcher,
    default_name: "Dispatcher",
    default_width: 60.0,
    default_height: 80.0,
    min_width: 40.0,
    min_height: 60.0,
    fill_color: Some("#3b82f6"),
    container: None,
    allowed_relationships: &[RelationshipType::DelegationLink, RelationshipType::SwarmLink],
    default_props: || agent_props("dispatcher"),
};

static LANGUAGE_MODEL: ElementEntry = ElementEntry {
    element_type: ElementType::LanguageModel,
    default_name: "LanguageModel",
    default_width: 160.0,
    default_height: 70.0,
    min_width: 120.0,
    min_height: 50.0,
    fill_color: None,
    container: None,
    allowed_relationships: GENERIC_ONLY,
    default_props: || {
        ElementProps::LanguageModel(LanguageModelProps {
            provider: "OpenAI".to_owned(),
            model: "gpt-4".to_owned(),
            endpoint: String::new(),
            temperature: 0.7,
            max_tokens: 1024,
            api_key_secret: String::new(),
        })
    },
};

fn agent_props(role: &str) -> ElementProps {
    ElementProps::Agent(AgentProps {
        num_agents: 1,
        framework: DEFAULT_FRAMEWORK.to_owned(),
        persona: String::new(),
        role: role.to_owned(),
    })
}

// =============================================================================
// RELATIONSHIP TABLE
// =============================================================================

static SWARM_LINK: RelationshipEntry = RelationshipEntry {
    relationship_type: RelationshipType::SwarmLink,
    default_name: "",
    stroke_color: "#000000",
};

static DELEGATION_LINK: RelationshipEntry = RelationshipEntry {
    relationship_type: RelationshipType::DelegationLink,
    default_name: "delegates",
    stroke_color: "#3b82f6",
};

static SUPERVISION_LINK: RelationshipEntry = RelationshipEntry {
    relationship_type: RelationshipType::SupervisionLink,
    default_name: "supervises",
    stroke_color: "#6b7280",
};

// =============================================================================
// LOOKUP
// =============================================================================

/// Registry entry for an element kind.
#[must_use]
pub fn element_entry(element_type: ElementType) -> &'static ElementEntry {
    match element_type {
        ElementType::Swarm => &SWARM,
        ElementType::AgentGroup => &AGENT_GROUP,
        ElementType::Evaluator => &EVALUATOR,
        ElementType::Solver => &SOLVER,
        ElementType::Supervisor => &SUPERVISOR,
        ElementType::Dispatcher => &DISPATCHER,
        ElementType::LanguageModel => &LANGUAGE_MODEL,
    }
}

/// Registry entry for a relationship kind.
#[must_use]
pub fn relationship_entry(relationship_type: RelationshipType) -> &'static RelationshipEntry {
    match relationship_type {
        RelationshipType::SwarmLink => &SWARM_LINK,
        RelationshipType::DelegationLink => &DELEGATION_LINK,
        RelationshipType::SupervisionLink => &SUPERVISION_LINK,
    }
}

/// Look up an element kind by its wire tag.
///
/// # Errors
///
/// Returns [`ModelError::UnknownType`] for tags outside the closed set.
pub fn lookup_element(tag: &str) -> Result<&'static ElementEntry, ModelError> {
    Ok(element_entry(tag.parse()?))
}

/// Look up a relationship kind by its wire tag.
///
/// # Errors
///
/// Returns [`ModelError::UnknownType`] for tags outside the closed set.
pub fn lookup_relationship(tag: &str) -> Result<&'static RelationshipEntry, ModelError> {
    Ok(relationship_entry(tag.parse()?))
}

/// Relationship kinds an element of `source` may originate. Always contains
/// the generic link.
#[must_use]
pub fn allowed_relationship_kinds(source: ElementType) -> BTreeSet<RelationshipType> {
    element_entry(source).allowed_relationships.iter().copied().collect()
}

// =============================================================================
// CONSTRUCTION
// =============================================================================

/// A fresh element of `element_type` carrying the kind's documented defaults.
#[must_use]
pub fn create_default(element_type: ElementType) -> Element {
    let entry = element_entry(element_type);
    Element {
        id: ElementId::generate(),
        name: entry.default_name.to_owned(),
        element_type,
        owner: None,
        bounds: Bounds::sized(entry.default_width, entry.default_height),
        style: entry.fill_color.map(Style::fill).unwrap_or_default(),
        description: None,
        annotations: Annotations::default(),
        children: Vec::new(),
        props: entry.default_props(),
    }
}

/// A fresh relationship of `relationship_type` with the kind's default name,
/// stroke color and path. The kind is not checked against the source.
#[must_use]
pub fn create_default_relationship(
    relationship_type: RelationshipType,
    source: Endpoint,
    target: Endpoint,
) -> Relationship {
    Relationship::new(relationship_type, source, target)
}

/// [`create_default`] keyed by the wire tag.
///
/// # Errors
///
/// Returns [`ModelError::UnknownType`] for tags outside the closed set.
pub fn create_default_by_tag(tag: &str) -> Result<Element, ModelError> {
    Ok(create_default(tag.parse()?))
}

/// One default instance per element kind, in palette order. The swarm is
/// enlarged so it reads as a container in the palette.
#[must_use]
pub fn palette() -> Vec<Element> {
    ElementType::ALL
        .into_iter()
        .map(|element_type| {
            let mut element = create_default(element_type);
            if element_type == ElementType::Swarm {
                element.bounds.width = PALETTE_SWARM_WIDTH;
                element.bounds.height = PALETTE_SWARM_HEIGHT;
            }
            element
        })
        .collect()
}
