#![allow(clippy::float_cmp)]

use super::*;
use crate::relationship::Endpoint;

#[test]
fn every_kind_has_an_entry_for_its_own_tag() {
    for t in ElementType::ALL {
        assert_eq!(element_entry(t).element_type, t);
    }
    for t in RelationshipType::ALL {
        assert_eq!(relationship_entry(t).relationship_type, t);
    }
}

#[test]
fn defaults_never_violate_minimums() {
    for t in ElementType::ALL {
        let entry = element_entry(t);
        assert!(entry.default_width >= entry.min_width, "{t}");
        assert!(entry.default_height >= entry.min_height, "{t}");
    }
}

#[test]
fn swarm_is_the_only_container() {
    let layout = element_entry(ElementType::Swarm).container.unwrap();
    assert_eq!(layout.header_height, 50.0);
    assert_eq!(layout.padding, 10.0);
    for t in ElementType::ALL.into_iter().filter(|t| *t != ElementType::Swarm) {
        assert!(element_entry(t).container.is_none(), "{t}");
    }
}

#[test]
fn allow_list_per_source_kind() {
    use RelationshipType::*;
    assert_eq!(
        allowed_relationship_kinds(ElementType::Dispatcher),
        BTreeSet::from([DelegationLink, SwarmLink])
    );
    assert_eq!(
        allowed_relationship_kinds(ElementType::Supervisor),
        BTreeSet::from([SupervisionLink, SwarmLink])
    );
    for t in [
        ElementType::Swarm,
        ElementType::AgentGroup,
        ElementType::Evaluator,
        ElementType::Solver,
        ElementType::LanguageModel,
    ] {
        assert_eq!(allowed_relationship_kinds(t), BTreeSet::from([SwarmLink]), "{t}");
    }
}

#[test]
fn generic_link_allowed_everywhere() {
    for t in ElementType::ALL {
        assert!(allowed_relationship_kinds(t).contains(&RelationshipType::GENERIC), "{t}");
    }
}

#[test]
fn lookup_by_tag() {
    assert_eq!(lookup_element("Solver").unwrap().default_name, "Solver");
    assert_eq!(lookup_relationship("DelegationLink").unwrap().default_name, "delegates");
    assert!(matches!(lookup_element("Robot"), Err(ModelError::UnknownType(_))));
    assert!(matches!(lookup_relationship("Inheritance"), Err(ModelError::UnknownType(_))));
}

#[test]
fn create_default_by_tag_matches_typed() {
    let e = create_default_by_tag("LanguageModel").unwrap();
    let p = e.language_model().unwrap();
    assert_eq!(p.provider, "OpenAI");
    assert_eq!(p.model, "gpt-4");
    assert_eq!(e.bounds, Bounds::sized(160.0, 70.0));
    assert!(create_default_by_tag("nope").is_err());
}

#[test]
fn agent_defaults() {
    let group = create_default(ElementType::AgentGroup);
    let agent = group.agent().unwrap();
    assert_eq!(agent.num_agents, 1);
    assert_eq!(agent.framework, "BESSER-BAF");
    assert_eq!(agent.role, "");
    assert!(group.style.fill_color.is_none());

    let cases = [
        (ElementType::Evaluator, "evaluator", "#f59e0b"),
        (ElementType::Solver, "solver", "#10b981"),
        (ElementType::Supervisor, "supervisor", "#ef4444"),
        (ElementType::Dispatcher, "dispatcher", "#3b82f6"),
    ];
    for (t, role, fill) in cases {
        let e = create_default(t);
        assert_eq!(e.agent().unwrap().role, role);
        assert_eq!(e.style.fill_color.as_deref(), Some(fill));
        assert_eq!(e.bounds, Bounds::sized(60.0, 80.0));
    }
}

#[test]
fn default_relationship_takes_kind_defaults() {
    let rel = create_default_relationship(
        RelationshipType::SupervisionLink,
        Endpoint::new(ElementId::new("a"), crate::kind::Direction::Right),
        Endpoint::new(ElementId::new("b"), crate::kind::Direction::Left),
    );
    assert_eq!(rel.name, "supervises");
    assert_eq!(rel.style.stroke_color.as_deref(), Some("#6b7280"));
    assert_eq!(rel.path.len(), 2);
}

#[test]
fn palette_has_one_of_each_in_order() {
    let palette = palette();
    let kinds: Vec<ElementType> = palette.iter().map(|e| e.element_type).collect();
    assert_eq!(kinds, ElementType::ALL.to_vec());
    assert_eq!(palette[0].bounds, Bounds::sized(250.0, 200.0));
    assert!(palette.iter().all(|e| e.owner.is_none()));
}
