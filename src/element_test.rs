#![allow(clippy::float_cmp)]

use super::*;
use crate::geometry::Bounds;

// =============================================================
// build_from_partial
// =============================================================

#[test]
fn dispatcher_without_overrides_gets_documented_defaults() {
    let d = build_from_partial(ElementType::Dispatcher, &ElementPatch::default());
    assert_eq!(d.name, "Dispatcher");
    assert_eq!(d.agent().unwrap().role, "dispatcher");
    assert_eq!(d.style.fill_color.as_deref(), Some("#3b82f6"));
    assert_eq!(d.bounds, Bounds::new(0.0, 0.0, 60.0, 80.0));
}

#[test]
fn present_fields_win_absent_fields_keep_defaults() {
    let patch = ElementPatch { persona: Some("critic".into()), ..ElementPatch::named("Judge") };
    let e = build_from_partial(ElementType::Evaluator, &patch);
    assert_eq!(e.name, "Judge");
    let agent = e.agent().unwrap();
    assert_eq!(agent.persona, "critic");
    assert_eq!(agent.role, "evaluator");
    assert_eq!(agent.num_agents, 1);
    assert_eq!(agent.framework, "BESSER-BAF");
}

#[test]
fn bounds_merge_per_field() {
    let patch: ElementPatch = serde_json::from_str(r#"{"bounds": {"width": 300}}"#).unwrap();
    let e = build_from_partial(ElementType::AgentGroup, &patch);
    assert_eq!(e.bounds, Bounds::new(0.0, 0.0, 300.0, 80.0));
}

#[test]
fn style_merge_per_field() {
    let patch: ElementPatch = serde_json::from_str(r##"{"strokeColor": "#111111"}"##).unwrap();
    let e = build_from_partial(ElementType::Solver, &patch);
    assert_eq!(e.style.fill_color.as_deref(), Some("#10b981"));
    assert_eq!(e.style.stroke_color.as_deref(), Some("#111111"));
    assert!(e.style.text_color.is_none());
}

#[test]
fn props_for_other_kinds_are_ignored() {
    let patch = ElementPatch { provider: Some("Anthropic".into()), num_agents: Some(4), ..ElementPatch::default() };
    let swarm = build_from_partial(ElementType::Swarm, &patch);
    assert_eq!(swarm.props, ElementProps::Swarm(SwarmProps { framework: "BESSER-BAF".into() }));

    let lm = build_from_partial(ElementType::LanguageModel, &patch);
    assert_eq!(lm.language_model().unwrap().provider, "Anthropic");
    assert!(lm.agent().is_none());
}

#[test]
fn undersized_bounds_are_raised_to_minimum() {
    let patch = ElementPatch::default().with_size(10.0, 10.0);
    for t in ElementType::ALL {
        let e = build_from_partial(t, &patch);
        let entry = registry::element_entry(t);
        assert_eq!(e.bounds.width, entry.min_width, "{t}");
        assert_eq!(e.bounds.height, entry.min_height, "{t}");
    }
}

#[test]
fn every_kind_gets_a_fresh_id() {
    let a = build_from_partial(ElementType::Solver, &ElementPatch::default());
    let b = build_from_partial(ElementType::Solver, &ElementPatch::default());
    assert_ne!(a.id, b.id);
}

// =============================================================
// apply_to
// =============================================================

#[test]
fn patch_updates_language_model_props() {
    let mut lm = registry::create_default(ElementType::LanguageModel);
    let patch: ElementPatch =
        serde_json::from_str(r#"{"model": "claude", "temperature": 0.2, "maxTokens": 4096, "apiKeySecret": "LLM_KEY"}"#)
            .unwrap();
    patch.apply_to(&mut lm);
    let p = lm.language_model().unwrap();
    assert_eq!(p.model, "claude");
    assert_eq!(p.temperature, 0.2);
    assert_eq!(p.max_tokens, 4096);
    assert_eq!(p.api_key_secret, "LLM_KEY");
    assert_eq!(p.provider, "OpenAI");
}

#[test]
fn empty_patch_is_noop() {
    let mut e = registry::create_default(ElementType::Supervisor);
    let before = e.clone();
    ElementPatch::default().apply_to(&mut e);
    assert_eq!(e, before);
}

#[test]
fn description_is_set_only_when_present() {
    let mut e = registry::create_default(ElementType::AgentGroup);
    assert!(e.description.is_none());
    ElementPatch { description: Some("workers".into()), ..ElementPatch::default() }.apply_to(&mut e);
    assert_eq!(e.description.as_deref(), Some("workers"));
}

// =============================================================
// placement
// =============================================================

#[test]
fn placement_classifies_owner_and_origin() {
    let mut e = registry::create_default(ElementType::Solver);
    assert_eq!(e.placement(), Placement::Preview);

    e.bounds.x = 40.0;
    assert_eq!(e.placement(), Placement::Orphan);

    e.owner = Some(ElementId::new("swarm"));
    assert_eq!(e.placement(), Placement::Owned);
}

#[test]
fn orphan_at_origin_reads_as_preview() {
    let mut e = registry::create_default(ElementType::Solver);
    e.bounds = Bounds::new(0.0, 0.0, 60.0, 80.0);
    assert_eq!(e.placement(), Placement::Preview);
}

#[test]
fn only_swarm_is_a_container() {
    for t in ElementType::ALL {
        assert_eq!(registry::create_default(t).is_container(), t == ElementType::Swarm, "{t}");
    }
}

#[test]
fn props_fit_their_kind() {
    for t in ElementType::ALL {
        let e = registry::create_default(t);
        assert!(e.props.fits(t), "{t}");
    }
    assert!(!ElementProps::Swarm(SwarmProps { framework: String::new() }).fits(ElementType::Solver));
}

#[test]
fn element_id_display_and_generate() {
    let id = ElementId::from("abc");
    assert_eq!(id.to_string(), "abc");
    assert_eq!(id.as_str(), "abc");
    assert_eq!(ElementId::generate().as_str().len(), 36);
}
