//! Element model: the record every diagram node shares, the kind-specific
//! props, and the default-merge used for construction and partial updates.
//!
//! DESIGN
//! ======
//! One record type covers every kind. The `element_type` tag selects the
//! registry entry (defaults, minimum size, container layout) and the
//! [`ElementProps`] variant holding the kind-specific fields. There is no
//! per-kind type hierarchy; behavior dispatches on the tag.
//!
//! Merge precedence for [`build_from_partial`] and [`ElementPatch::apply_to`]:
//! a field present in the patch wins, an absent field keeps the current
//! value. `bounds` and the style colors merge per field, so a patch carrying
//! only `{"bounds": {"width": 90}}` keeps the current `x`, `y` and `height`.
//! Minimum sizes are enforced after the merge.

#[cfg(test)]
#[path = "element_test.rs"]
mod element_test;

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::{Bounds, BoundsPatch};
use crate::kind::ElementType;
use crate::registry;
use crate::style::{Annotations, Style, StylePatch};

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Opaque element identifier. Imported ids are kept verbatim; new ids are
/// UUID v4 strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh random id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

// =============================================================================
// KIND-SPECIFIC PROPS
// =============================================================================

/// Props shared by every agent kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentProps {
    pub num_agents: u32,
    pub framework: String,
    pub persona: String,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwarmProps {
    pub framework: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageModelProps {
    pub provider: String,
    pub model: String,
    pub endpoint: String,
    pub temperature: f64,
    pub max_tokens: u32,
    /// Name of the secret holding the API key, never the key itself.
    pub api_key_secret: String,
}

/// Kind-specific fields. The variant always matches the element's tag.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementProps {
    Swarm(SwarmProps),
    Agent(AgentProps),
    LanguageModel(LanguageModelProps),
}

impl ElementProps {
    /// Whether this variant is the one `element_type` carries.
    #[must_use]
    pub fn fits(&self, element_type: ElementType) -> bool {
        match self {
            Self::Swarm(_) => element_type == ElementType::Swarm,
            Self::Agent(_) => element_type.is_agent(),
            Self::LanguageModel(_) => element_type == ElementType::LanguageModel,
        }
    }
}

// =============================================================================
// ELEMENT
// =============================================================================

/// A positioned, styled node of the diagram graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub id: ElementId,
    pub name: String,
    pub element_type: ElementType,
    /// Owning container. Back-reference only; the container's `children`
    /// list is authoritative and the two are kept in sync by the diagram.
    pub owner: Option<ElementId>,
    pub bounds: Bounds,
    pub style: Style,
    pub description: Option<String>,
    pub annotations: Annotations,
    /// Ordered child ids. Always empty for non-container kinds.
    pub children: Vec<ElementId>,
    pub props: ElementProps,
}

/// Where an element sits relative to the containment hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Inside a container.
    Owned,
    /// No owner and still at the origin: treated as not yet placed.
    Preview,
    /// Placed on the canvas without an owning container.
    Orphan,
}

impl Element {
    /// Whether this element's kind can own children.
    #[must_use]
    pub fn is_container(&self) -> bool {
        registry::element_entry(self.element_type).container.is_some()
    }

    /// Raise width and height to the kind's minimums.
    pub fn enforce_minimum(&mut self) {
        let entry = registry::element_entry(self.element_type);
        self.bounds.width = self.bounds.width.max(entry.min_width);
        self.bounds.height = self.bounds.height.max(entry.min_height);
    }

    /// Classify the element as owned, preview or orphan.
    ///
    /// An element without an owner whose bounds still sit at the origin is
    /// assumed to be a palette preview rather than an orphan. A genuinely
    /// orphaned element that happens to sit at the origin is misclassified;
    /// hosts depend on this exact rule, so it is kept as is.
    #[must_use]
    pub fn placement(&self) -> Placement {
        match (&self.owner, self.bounds.at_origin()) {
            (Some(_), _) => Placement::Owned,
            (None, true) => Placement::Preview,
            (None, false) => Placement::Orphan,
        }
    }

    #[must_use]
    pub fn agent(&self) -> Option<&AgentProps> {
        match &self.props {
            ElementProps::Agent(p) => Some(p),
            _ => None,
        }
    }

    #[must_use]
    pub fn swarm(&self) -> Option<&SwarmProps> {
        match &self.props {
            ElementProps::Swarm(p) => Some(p),
            _ => None,
        }
    }

    #[must_use]
    pub fn language_model(&self) -> Option<&LanguageModelProps> {
        match &self.props {
            ElementProps::LanguageModel(p) => Some(p),
            _ => None,
        }
    }
}

/// Construct an element of `element_type`: registry defaults overlaid by
/// `partial`, with minimum sizes enforced. The element gets a fresh id.
#[must_use]
pub fn build_from_partial(element_type: ElementType, partial: &ElementPatch) -> Element {
    let mut element = registry::create_default(element_type);
    partial.apply_to(&mut element);
    element
}

// =============================================================================
// PARTIAL UPDATE
// =============================================================================

/// Sparse update for an element. Only present fields are applied; props that
/// do not belong to the element's kind are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ElementPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<BoundsPatch>,
    #[serde(flatten)]
    pub style: StylePatch,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    // Agent kinds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_agents: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persona: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    // Agent kinds and Swarm.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub framework: Option<String>,

    // LanguageModel.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_secret: Option<String>,
}

impl ElementPatch {
    #[must_use]
    pub fn named(name: &str) -> Self {
        Self { name: Some(name.to_owned()), ..Self::default() }
    }

    /// Patch setting all four bounds fields.
    #[must_use]
    pub fn with_bounds(mut self, x: f64, y: f64, width: f64, height: f64) -> Self {
        self.bounds = Some(BoundsPatch { x: Some(x), y: Some(y), width: Some(width), height: Some(height) });
        self
    }

    /// Patch setting only the size.
    #[must_use]
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.bounds = Some(BoundsPatch { width: Some(width), height: Some(height), ..BoundsPatch::default() });
        self
    }

    /// Overlay the present fields onto `element`, then enforce the kind's
    /// minimum size.
    pub fn apply_to(&self, element: &mut Element) {
        if let Some(ref name) = self.name {
            element.name.clone_from(name);
        }
        if let Some(ref bounds) = self.bounds {
            bounds.apply_to(&mut element.bounds);
        }
        self.style.apply_to(&mut element.style);
        if let Some(ref description) = self.description {
            element.description = Some(description.clone());
        }
        self.apply_props(&mut element.props);
        element.enforce_minimum();
    }

    /// Overlay the kind-specific fields that belong to `props`' variant.
    pub(crate) fn apply_props(&self, props: &mut ElementProps) {
        match props {
            ElementProps::Swarm(p) => {
                overlay(&mut p.framework, self.framework.as_ref());
            }
            ElementProps::Agent(p) => {
                if let Some(n) = self.num_agents {
                    p.num_agents = n;
                }
                overlay(&mut p.framework, self.framework.as_ref());
                overlay(&mut p.persona, self.persona.as_ref());
                overlay(&mut p.role, self.role.as_ref());
            }
            ElementProps::LanguageModel(p) => {
                overlay(&mut p.provider, self.provider.as_ref());
                overlay(&mut p.model, self.model.as_ref());
                overlay(&mut p.endpoint, self.endpoint.as_ref());
                if let Some(t) = self.temperature {
                    p.temperature = t;
                }
                if let Some(m) = self.max_tokens {
                    p.max_tokens = m;
                }
                overlay(&mut p.api_key_secret, self.api_key_secret.as_ref());
            }
        }
    }
}

fn overlay(slot: &mut String, value: Option<&String>) {
    if let Some(v) = value {
        slot.clone_from(v);
    }
}
