//! Closed type tags.
//!
//! Elements, relationships and diagrams each carry a tag from a closed
//! enumeration. The wire form is the variant name (`"Dispatcher"`,
//! `"DelegationLink"`, `"SwarmDiagram"`), matching the persisted model.
//! Parsing an unknown tag fails with [`ModelError::UnknownType`].

#[cfg(test)]
#[path = "kind_test.rs"]
mod kind_test;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

// =============================================================================
// ELEMENT TYPES
// =============================================================================

/// Kind of a diagram element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ElementType {
    /// Container grouping agents that run under one framework.
    Swarm,
    /// Generic group of agents.
    AgentGroup,
    /// Agent that scores or checks results.
    Evaluator,
    /// Agent that works on tasks.
    Solver,
    /// Agent that oversees other agents.
    Supervisor,
    /// Agent that hands tasks to other agents.
    Dispatcher,
    /// Model endpoint the agents talk to.
    LanguageModel,
}

impl ElementType {
    /// Every element type, in palette order.
    pub const ALL: [Self; 7] = [
        Self::Swarm,
        Self::AgentGroup,
        Self::Evaluator,
        Self::Solver,
        Self::Supervisor,
        Self::Dispatcher,
        Self::LanguageModel,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Swarm => "Swarm",
            Self::AgentGroup => "AgentGroup",
            Self::Evaluator => "Evaluator",
            Self::Solver => "Solver",
            Self::Supervisor => "Supervisor",
            Self::Dispatcher => "Dispatcher",
            Self::LanguageModel => "LanguageModel",
        }
    }

    /// Agent kinds share the same set of props (`numAgents`, `framework`,
    /// `persona`, `role`) and differ only in their defaults.
    #[must_use]
    pub fn is_agent(self) -> bool {
        matches!(
            self,
            Self::AgentGroup | Self::Evaluator | Self::Solver | Self::Supervisor | Self::Dispatcher
        )
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ElementType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ModelError::UnknownType(s.to_owned()))
    }
}

// =============================================================================
// RELATIONSHIP TYPES
// =============================================================================

/// Kind of a relationship between two elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RelationshipType {
    /// Generic link; allowed from every source kind.
    SwarmLink,
    /// Task handed from a dispatcher to another agent.
    DelegationLink,
    /// Oversight from a supervisor to another agent.
    SupervisionLink,
}

impl RelationshipType {
    pub const ALL: [Self; 3] = [Self::SwarmLink, Self::DelegationLink, Self::SupervisionLink];

    /// The kind every rejected proposal falls back to.
    pub const GENERIC: Self = Self::SwarmLink;

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SwarmLink => "SwarmLink",
            Self::DelegationLink => "DelegationLink",
            Self::SupervisionLink => "SupervisionLink",
        }
    }
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationshipType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ModelError::UnknownType(s.to_owned()))
    }
}

// =============================================================================
// DIAGRAM TYPES
// =============================================================================

/// Diagram family recorded in the model header.
///
/// These are the families whose models use the element/relationship graph.
/// GUI and quantum-circuit projects persist their own non-graph payloads and
/// never reach this layer, so their tags parse as
/// [`ModelError::UnknownType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagramType {
    ClassDiagram,
    ObjectDiagram,
    StateMachineDiagram,
    AgentDiagram,
    SwarmDiagram,
}

impl DiagramType {
    pub const ALL: [Self; 5] = [
        Self::ClassDiagram,
        Self::ObjectDiagram,
        Self::StateMachineDiagram,
        Self::AgentDiagram,
        Self::SwarmDiagram,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ClassDiagram => "ClassDiagram",
            Self::ObjectDiagram => "ObjectDiagram",
            Self::StateMachineDiagram => "StateMachineDiagram",
            Self::AgentDiagram => "AgentDiagram",
            Self::SwarmDiagram => "SwarmDiagram",
        }
    }
}

impl fmt::Display for DiagramType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiagramType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ModelError::UnknownType(s.to_owned()))
    }
}

// =============================================================================
// PORT DIRECTION
// =============================================================================

/// Side of an element a relationship endpoint attaches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    Up,
    Right,
    Down,
    Left,
    Upright,
    Upleft,
    Downright,
    Downleft,
    Topright,
    Topleft,
    Bottomright,
    Bottomleft,
}
