//! Plain JSON records for elements, relationships and the whole model.
//!
//! DESIGN
//! ======
//! Records are built by hand rather than derived so the wire shape stays
//! flat (style colors and kind props sit next to `id` and `name`) and so
//! serializing an element can never fail. Deserialization reads the `type`
//! tag first and dispatches on it; kind props are overlaid onto the
//! registry defaults for that tag, so a record written by an older editor
//! that lacks a newer prop still loads.
//!
//! Absent optional fields stay absent on the way out: a `None` color,
//! description or annotation is omitted rather than written as `null`. The one exception
//! is `owner`, which is always present so readers can tell "no owner" from
//! "field missing".
//!
//! ERROR HANDLING
//! ==============
//! Model import is all-or-nothing. The first unknown tag, dangling
//! reference or malformed record aborts the import and nothing is returned.
//! Inconsistencies the model can repair (a container child list that
//! disagrees with `owner` back-references, a relationship kind the source
//! does not allow) are repaired and logged at warn.

#[cfg(test)]
#[path = "serialize_test.rs"]
mod serialize_test;

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::{info, warn};

use crate::consts::MODEL_VERSION_PREFIX;
use crate::diagram::{Assessment, Diagram, Selection, Size};
use crate::element::{Element, ElementId, ElementPatch, ElementProps};
use crate::error::ModelError;
use crate::geometry::{Bounds, Path, Point};
use crate::kind::{DiagramType, ElementType, RelationshipType};
use crate::registry;
use crate::relationship::{Endpoint, Relationship, RelationshipId, validate_type};
use crate::style::{Annotations, Style};

// =============================================================================
// ELEMENTS
// =============================================================================

#[derive(Deserialize)]
struct ElementRecord {
    id: ElementId,
    name: Option<String>,
    #[serde(default)]
    owner: Option<ElementId>,
    bounds: Bounds,
    #[serde(flatten)]
    style: Style,
    description: Option<String>,
    #[serde(flatten)]
    annotations: Annotations,
    #[serde(default)]
    children: Vec<ElementId>,
}

/// Element as a flat JSON record.
#[must_use]
pub fn serialize_element(element: &Element) -> Value {
    let mut record = Map::new();
    record.insert("id".into(), json!(element.id));
    record.insert("name".into(), json!(element.name));
    record.insert("type".into(), json!(element.element_type.as_str()));
    record.insert("owner".into(), json!(element.owner));
    record.insert("bounds".into(), bounds_value(&element.bounds));
    insert_style(&mut record, &element.style);
    insert_extras(&mut record, element.description.as_deref(), &element.annotations);
    if element.is_container() {
        record.insert("children".into(), json!(element.children));
    }
    insert_props(&mut record, &element.props);
    Value::Object(record)
}

/// Element from a flat JSON record.
///
/// # Errors
///
/// - [`ModelError::MissingField`] when `type` is absent or not a string.
/// - [`ModelError::UnknownType`] when `type` is outside the closed set.
/// - [`ModelError::Malformed`] when a field has the wrong shape.
pub fn deserialize_element(value: &Value) -> Result<Element, ModelError> {
    let element_type: ElementType = type_tag(value)?.parse()?;
    let entry = registry::element_entry(element_type);
    let record = ElementRecord::deserialize(value)?;

    let mut props = entry.default_props();
    ElementPatch::deserialize(value)?.apply_props(&mut props);

    let mut element = Element {
        id: record.id,
        name: record.name.unwrap_or_else(|| entry.default_name.to_owned()),
        element_type,
        owner: record.owner,
        bounds: record.bounds,
        style: record.style,
        description: record.description,
        annotations: record.annotations,
        children: Vec::new(),
        props,
    };
    if element.is_container() {
        element.children = record.children;
    }
    element.enforce_minimum();
    Ok(element)
}

fn insert_props(record: &mut Map<String, Value>, props: &ElementProps) {
    match props {
        ElementProps::Swarm(p) => {
            record.insert("framework".into(), json!(p.framework));
        }
        ElementProps::Agent(p) => {
            record.insert("numAgents".into(), json!(p.num_agents));
            record.insert("framework".into(), json!(p.framework));
            record.insert("persona".into(), json!(p.persona));
            record.insert("role".into(), json!(p.role));
        }
        ElementProps::LanguageModel(p) => {
            record.insert("provider".into(), json!(p.provider));
            record.insert("model".into(), json!(p.model));
            record.insert("endpoint".into(), json!(p.endpoint));
            record.insert("temperature".into(), json!(p.temperature));
            record.insert("maxTokens".into(), json!(p.max_tokens));
            record.insert("apiKeySecret".into(), json!(p.api_key_secret));
        }
    }
}

// =============================================================================
// RELATIONSHIPS
// =============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RelationshipRecord {
    id: RelationshipId,
    name: Option<String>,
    source: Endpoint,
    target: Endpoint,
    path: Vec<Point>,
    #[serde(flatten)]
    style: Style,
    description: Option<String>,
    #[serde(flatten)]
    annotations: Annotations,
    is_manually_layouted: Option<bool>,
    delegation_type: Option<String>,
    supervision_level: Option<String>,
}

/// Relationship as a flat JSON record.
#[must_use]
pub fn serialize_relationship(relationship: &Relationship) -> Value {
    let mut record = Map::new();
    record.insert("id".into(), json!(relationship.id));
    record.insert("name".into(), json!(relationship.name));
    record.insert("type".into(), json!(relationship.relationship_type.as_str()));
    record.insert("owner".into(), Value::Null);
    record.insert("bounds".into(), bounds_value(&relationship.bounds));
    record.insert("path".into(), json!(relationship.path.points().iter().map(point_value).collect::<Vec<_>>()));
    record.insert("source".into(), endpoint_value(&relationship.source));
    record.insert("target".into(), endpoint_value(&relationship.target));
    insert_style(&mut record, &relationship.style);
    insert_extras(&mut record, relationship.description.as_deref(), &relationship.annotations);
    if let Some(manual) = relationship.is_manually_layouted {
        record.insert("isManuallyLayouted".into(), json!(manual));
    }
    if let Some(ref t) = relationship.delegation_type {
        record.insert("delegationType".into(), json!(t));
    }
    if let Some(ref level) = relationship.supervision_level {
        record.insert("supervisionLevel".into(), json!(level));
    }
    Value::Object(record)
}

/// Relationship from a flat JSON record.
///
/// The kind is taken as written; checking it against the source's
/// allow-list needs the source element and happens on model import.
/// `bounds` is recomputed from the path.
///
/// # Errors
///
/// - [`ModelError::MissingField`] / [`ModelError::UnknownType`] for the tag.
/// - [`ModelError::InvalidPath`] for paths shorter than two points.
/// - [`ModelError::Malformed`] when a field has the wrong shape.
pub fn deserialize_relationship(value: &Value) -> Result<Relationship, ModelError> {
    let relationship_type: RelationshipType = type_tag(value)?.parse()?;
    let record = RelationshipRecord::deserialize(value)?;
    let path = Path::new(record.path)?;

    let mut relationship = Relationship::new(relationship_type, record.source, record.target);
    relationship.id = record.id;
    if let Some(name) = record.name {
        relationship.name = name;
    }
    relationship.style = record.style;
    relationship.description = record.description;
    relationship.annotations = record.annotations;
    relationship.is_manually_layouted = record.is_manually_layouted;
    relationship.set_path(path);
    if relationship_type == RelationshipType::DelegationLink {
        relationship.delegation_type = record.delegation_type;
    }
    if relationship_type == RelationshipType::SupervisionLink {
        relationship.supervision_level = record.supervision_level;
    }
    Ok(relationship)
}

fn endpoint_value(endpoint: &Endpoint) -> Value {
    json!({ "element": endpoint.element, "direction": endpoint.direction })
}

// =============================================================================
// MODEL
// =============================================================================

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelRecord {
    version: String,
    #[serde(rename = "type")]
    diagram_type: String,
    #[serde(default)]
    size: Size,
    #[serde(default)]
    elements: BTreeMap<String, Value>,
    #[serde(default)]
    relationships: BTreeMap<String, Value>,
    #[serde(default)]
    interactive: Selection,
    #[serde(default)]
    assessments: BTreeMap<String, Assessment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reference_diagram_data: Option<Value>,
}

impl Diagram {
    /// The whole graph in the persisted model shape. `size` is recomputed
    /// from the current bounds.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Malformed`] if an assessment's carried payload
    /// cannot be represented as JSON.
    pub fn to_model(&self) -> Result<Value, ModelError> {
        let record = ModelRecord {
            version: self.version.clone(),
            diagram_type: self.diagram_type.as_str().to_owned(),
            size: self.size(),
            elements: self
                .elements
                .values()
                .map(|e| (e.id.to_string(), serialize_element(e)))
                .collect(),
            relationships: self
                .relationships
                .values()
                .map(|r| (r.id.to_string(), serialize_relationship(r)))
                .collect(),
            interactive: self.interactive.clone(),
            assessments: self.assessments.clone(),
            reference_diagram_data: self.reference_diagram_data.clone(),
        };
        Ok(serde_json::to_value(record)?)
    }

    /// Rebuild a diagram from the persisted model shape.
    ///
    /// Container child lists are rebuilt from `owner` back-references: a
    /// listed child keeps its position, an owned child missing from the list
    /// is appended, and a listed id that does not point back is dropped.
    /// Every record must sit under its own id; `interactive` and
    /// `assessments` are keyed by those ids.
    ///
    /// # Errors
    ///
    /// Any error aborts the import; see the module docs.
    pub fn from_model(value: &Value) -> Result<Self, ModelError> {
        let record = ModelRecord::deserialize(value)?;
        if !record.version.starts_with(MODEL_VERSION_PREFIX) {
            return Err(ModelError::UnsupportedVersion(record.version));
        }
        let diagram_type: DiagramType = record.diagram_type.parse()?;

        let mut elements: HashMap<ElementId, Element> = HashMap::with_capacity(record.elements.len());
        for (key, element_value) in &record.elements {
            let element = deserialize_element(element_value)?;
            check_key(key, element.id.as_str())?;
            if elements.contains_key(&element.id) {
                return Err(ModelError::DuplicateId(element.id.to_string()));
            }
            elements.insert(element.id.clone(), element);
        }
        check_owners(&elements)?;
        rebuild_children(&mut elements);

        let mut relationships: HashMap<RelationshipId, Relationship> =
            HashMap::with_capacity(record.relationships.len());
        for (key, relationship_value) in &record.relationships {
            let mut relationship = deserialize_relationship(relationship_value)?;
            check_key(key, relationship.id.as_str())?;
            if relationships.contains_key(&relationship.id) {
                return Err(ModelError::DuplicateId(relationship.id.to_string()));
            }
            let Some(source) = elements.get(&relationship.source.element) else {
                return Err(ModelError::DanglingEndpoint {
                    relationship: relationship.id,
                    element: relationship.source.element,
                });
            };
            if !elements.contains_key(&relationship.target.element) {
                return Err(ModelError::DanglingEndpoint {
                    relationship: relationship.id,
                    element: relationship.target.element,
                });
            }
            let decision = validate_type(source.element_type, relationship.relationship_type);
            if !decision.is_accepted() {
                warn!(
                    id = %relationship.id,
                    source = %source.element_type,
                    proposed = %relationship.relationship_type,
                    "imported relationship kind not allowed for source; downgraded to generic link"
                );
                relationship.retype(decision.resolved());
            }
            relationships.insert(relationship.id.clone(), relationship);
        }

        info!(
            %diagram_type,
            elements = elements.len(),
            relationships = relationships.len(),
            "model imported"
        );

        Ok(Self {
            version: record.version,
            diagram_type,
            elements,
            relationships,
            interactive: record.interactive,
            assessments: record.assessments,
            reference_diagram_data: record.reference_diagram_data,
        })
    }
}

fn check_key(key: &str, id: &str) -> Result<(), ModelError> {
    if key == id {
        return Ok(());
    }
    Err(ModelError::KeyMismatch { key: key.to_owned(), id: id.to_owned() })
}

/// Every owner exists, is a container, and no owner chain loops.
fn check_owners(elements: &HashMap<ElementId, Element>) -> Result<(), ModelError> {
    for element in elements.values() {
        let Some(ref owner_id) = element.owner else {
            continue;
        };
        let Some(owner) = elements.get(owner_id) else {
            return Err(ModelError::ElementNotFound(owner_id.clone()));
        };
        if !owner.is_container() {
            return Err(ModelError::NotAContainer(owner_id.clone()));
        }

        let mut seen = HashSet::from([&element.id]);
        let mut current = element.owner.as_ref();
        while let Some(id) = current {
            if !seen.insert(id) {
                return Err(ModelError::ContainmentCycle { element: element.id.clone(), owner: owner_id.clone() });
            }
            current = elements.get(id).and_then(|e| e.owner.as_ref());
        }
    }
    Ok(())
}

fn rebuild_children(elements: &mut HashMap<ElementId, Element>) {
    let mut owned: HashMap<ElementId, Vec<ElementId>> = HashMap::new();
    for element in elements.values() {
        if let Some(ref owner) = element.owner {
            owned.entry(owner.clone()).or_default().push(element.id.clone());
        }
    }

    for container in elements.values_mut().filter(|e| e.is_container()) {
        let mut expected = owned.remove(&container.id).unwrap_or_default();
        expected.sort();

        let mut children: Vec<ElementId> = Vec::with_capacity(expected.len());
        for id in container.children.iter().chain(expected.iter()) {
            if expected.contains(id) && !children.contains(id) {
                children.push(id.clone());
            }
        }

        if children != container.children {
            warn!(id = %container.id, "container child list disagreed with owner references; rebuilt");
            container.children = children;
        }
    }
}

// =============================================================================
// HELPERS
// =============================================================================

fn type_tag(value: &Value) -> Result<&str, ModelError> {
    value.get("type").and_then(Value::as_str).ok_or(ModelError::MissingField("type"))
}

fn bounds_value(bounds: &Bounds) -> Value {
    json!({ "x": bounds.x, "y": bounds.y, "width": bounds.width, "height": bounds.height })
}

fn point_value(point: &Point) -> Value {
    json!({ "x": point.x, "y": point.y })
}

fn insert_style(record: &mut Map<String, Value>, style: &Style) {
    let colors = [
        ("fillColor", &style.fill_color),
        ("strokeColor", &style.stroke_color),
        ("textColor", &style.text_color),
    ];
    for (key, color) in colors {
        if let Some(c) = color {
            record.insert(key.into(), json!(c));
        }
    }
}

fn insert_extras(record: &mut Map<String, Value>, description: Option<&str>, annotations: &Annotations) {
    let fields = [
        ("description", description),
        ("highlight", annotations.highlight.as_deref()),
        ("icon", annotations.icon.as_deref()),
        ("uri", annotations.uri.as_deref()),
        ("assessmentNote", annotations.assessment_note.as_deref()),
    ];
    for (key, field) in fields {
        if let Some(v) = field {
            record.insert(key.into(), json!(v));
        }
    }
}
