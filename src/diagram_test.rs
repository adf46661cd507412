#![allow(clippy::float_cmp)]

use super::*;
use crate::command::Command;
use crate::element::ElementPatch;
use crate::kind::{Direction, ElementType, RelationshipType};
use crate::relationship::{Endpoint, RelationshipPatch};

fn populated() -> Diagram {
    let mut d = Diagram::new(DiagramType::SwarmDiagram);
    d.apply(Command::CreateElement {
        id: Some(ElementId::new("s")),
        element_type: ElementType::Swarm,
        owner: None,
        patch: ElementPatch::default().with_bounds(0.0, 0.0, 300.0, 200.0),
    })
    .unwrap();
    for (id, x) in [("b", 20.0), ("a", 120.0)] {
        d.apply(Command::CreateElement {
            id: Some(ElementId::new(id)),
            element_type: ElementType::Solver,
            owner: Some(ElementId::new("s")),
            patch: ElementPatch::default().with_bounds(x, 70.0, 60.0, 80.0),
        })
        .unwrap();
    }
    d.apply(Command::CreateElement {
        id: Some(ElementId::new("free")),
        element_type: ElementType::Evaluator,
        owner: None,
        patch: ElementPatch::default().with_bounds(500.0, 40.0, 60.0, 80.0),
    })
    .unwrap();
    d
}

#[test]
fn new_diagram_is_empty_and_versioned() {
    let d = Diagram::new(DiagramType::AgentDiagram);
    assert_eq!(d.version(), "3.0.0");
    assert_eq!(d.diagram_type(), DiagramType::AgentDiagram);
    assert_eq!(d.element_count(), 0);
    assert_eq!(d.relationship_count(), 0);
    assert_eq!(d.size(), Size::default());
}

#[test]
fn children_of_keeps_container_order() {
    let d = populated();
    let names: Vec<&str> = d.children_of(&ElementId::new("s")).iter().map(|e| e.id.as_str()).collect();
    assert_eq!(names, vec!["b", "a"]);
    assert!(d.children_of(&ElementId::new("free")).is_empty());
    assert!(d.children_of(&ElementId::new("ghost")).is_empty());
}

#[test]
fn warnings_list_only_placed_orphans() {
    let mut d = populated();
    d.apply(Command::CreateElement {
        id: Some(ElementId::new("preview")),
        element_type: ElementType::Solver,
        owner: None,
        patch: ElementPatch::default(),
    })
    .unwrap();
    assert_eq!(d.warnings(), vec![Warning::Orphan(ElementId::new("free"))]);
}

#[test]
fn size_tracks_top_level_extent() {
    let d = populated();
    assert_eq!(d.size(), Size { width: 560.0, height: 200.0 });
}

#[test]
fn incident_relationships_are_sorted() {
    let mut d = populated();
    for (id, source, target) in [("r2", "a", "b"), ("r1", "b", "free")] {
        d.apply(Command::CreateRelationship {
            id: Some(RelationshipId::new(id)),
            relationship_type: RelationshipType::SwarmLink,
            source: Endpoint::new(ElementId::new(source), Direction::Right),
            target: Endpoint::new(ElementId::new(target), Direction::Left),
            patch: RelationshipPatch::default(),
        })
        .unwrap();
    }
    assert_eq!(d.incident_relationships(&ElementId::new("b")), vec![RelationshipId::new("r1"), RelationshipId::new("r2")]);
    assert_eq!(d.incident_relationships(&ElementId::new("free")), vec![RelationshipId::new("r1")]);
}

#[test]
fn ownership_check_detects_broken_back_reference() {
    let mut d = populated();
    assert!(d.ownership_consistent());
    if let Some(a) = d.elements.get_mut(&ElementId::new("a")) {
        a.owner = None;
    }
    assert!(!d.ownership_consistent());
}

#[test]
fn relayout_all_clamps_every_container() {
    let mut d = populated();
    if let Some(a) = d.elements.get_mut(&ElementId::new("a")) {
        a.bounds.x = -40.0;
        a.bounds.y = 999.0;
    }
    d.relayout_all();
    let a = d.element(&ElementId::new("a")).unwrap();
    assert_eq!(a.bounds.x, 10.0);
    assert_eq!(a.bounds.y, 200.0 - 80.0 - 10.0);
}
