//! End-to-end model scenarios driven through the public API only.
#![allow(clippy::float_cmp)]

use diagram_model::element::build_from_partial;
use diagram_model::geometry::Bounds;
use diagram_model::layout::layout;
use diagram_model::relationship::{Endpoint, RelationshipPatch};
use diagram_model::serialize::{deserialize_element, serialize_element};
use diagram_model::{
    Applied, Command, Diagram, DiagramType, ElementId, ElementPatch, ElementType, RelationshipId, RelationshipType,
};

#[test]
fn default_dispatcher() {
    let d = build_from_partial(ElementType::Dispatcher, &ElementPatch::default());
    let record = serialize_element(&d);
    assert_eq!(record["name"], "Dispatcher");
    assert_eq!(record["role"], "dispatcher");
    assert_eq!(record["fillColor"], "#3b82f6");
    assert_eq!(d.bounds, Bounds::new(0.0, 0.0, 60.0, 80.0));
}

#[test]
fn supervision_from_solver_becomes_generic_link() {
    let mut diagram = Diagram::new(DiagramType::SwarmDiagram);
    for (id, kind, x) in [("solver", ElementType::Solver, 50.0), ("other", ElementType::Evaluator, 200.0)] {
        diagram
            .apply(Command::CreateElement {
                id: Some(ElementId::new(id)),
                element_type: kind,
                owner: None,
                patch: ElementPatch::default().with_bounds(x, 50.0, 60.0, 80.0),
            })
            .unwrap();
    }
    let applied = diagram
        .apply(Command::CreateRelationship {
            id: Some(RelationshipId::new("r")),
            relationship_type: RelationshipType::SupervisionLink,
            source: Endpoint::new(ElementId::new("solver"), Default::default()),
            target: Endpoint::new(ElementId::new("other"), Default::default()),
            patch: RelationshipPatch::default(),
        })
        .unwrap();
    assert!(matches!(applied, Applied::RelationshipCreated { .. }));
    let stored = diagram.relationship(&RelationshipId::new("r")).unwrap();
    assert_eq!(stored.relationship_type, RelationshipType::SwarmLink);
}

#[test]
fn child_at_five_five_lands_below_header() {
    let swarm = build_from_partial(ElementType::Swarm, &ElementPatch::default().with_bounds(0.0, 0.0, 300.0, 200.0));
    let child = build_from_partial(ElementType::Solver, &ElementPatch::default().with_bounds(5.0, 5.0, 60.0, 80.0));
    let result = layout(&swarm, &[child]);
    assert_eq!(result.children[0].bounds.y, 60.0);
}

#[test]
fn undersized_swarm_is_raised_by_layout() {
    let mut swarm = build_from_partial(ElementType::Swarm, &ElementPatch::default());
    swarm.bounds.width = 100.0;
    swarm.bounds.height = 50.0;
    let result = layout(&swarm, &[]);
    assert_eq!(result.container.bounds.width, 200.0);
    assert_eq!(result.container.bounds.height, 150.0);
}

#[test]
fn agent_group_props_roundtrip() {
    let patch: ElementPatch =
        serde_json::from_str(r#"{"numAgents": 5, "framework": "BESSER-BAF", "persona": "x", "role": "y"}"#).unwrap();
    let group = build_from_partial(ElementType::AgentGroup, &patch);
    let back = deserialize_element(&serialize_element(&group)).unwrap();
    assert_eq!(back.element_type, ElementType::AgentGroup);
    assert_eq!(back.agent(), group.agent());
    let agent = back.agent().unwrap();
    assert_eq!((agent.num_agents, agent.persona.as_str(), agent.role.as_str()), (5, "x", "y"));
}

#[test]
fn language_model_settings_survive_text_roundtrip() {
    let temperature = 0.1 + 0.2;
    let mut diagram = Diagram::new(DiagramType::SwarmDiagram);
    diagram
        .apply(Command::CreateElement {
            id: Some(ElementId::new("lm")),
            element_type: ElementType::LanguageModel,
            owner: None,
            patch: ElementPatch {
                temperature: Some(temperature),
                max_tokens: Some(u32::MAX),
                model: Some("gpt-4o-mini".into()),
                ..ElementPatch::default().with_bounds(30.0, 30.0, 160.0, 70.0)
            },
        })
        .unwrap();

    let text = serde_json::to_string_pretty(&diagram.to_model().unwrap()).unwrap();
    let back = Diagram::from_model(&serde_json::from_str(&text).unwrap()).unwrap();

    let settings = back.element(&ElementId::new("lm")).unwrap().language_model().unwrap();
    assert_eq!(settings.temperature.to_bits(), temperature.to_bits());
    assert_eq!(settings.max_tokens, u32::MAX);
    assert_eq!(settings.model, "gpt-4o-mini");
    assert_eq!(back, diagram);
}
