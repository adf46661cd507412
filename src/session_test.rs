use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::*;
use crate::config::PersistConfig;
use crate::element::{ElementId, ElementPatch};
use crate::kind::{DiagramType, ElementType};
use crate::persistence::{SnapshotSink, spawn_persister};

#[derive(Clone, Default)]
struct RecordingSink {
    writes: Arc<Mutex<Vec<Value>>>,
}

#[async_trait]
impl SnapshotSink for RecordingSink {
    async fn write(&self, snapshot: &Value) -> Result<(), PersistError> {
        self.writes.lock().unwrap().push(snapshot.clone());
        Ok(())
    }
}

fn session(sink: &RecordingSink) -> DiagramSession {
    let config = PersistConfig { debounce_ms: 500, interval_ms: 30_000, channel_capacity: 4 };
    DiagramSession::new(Diagram::new(DiagramType::SwarmDiagram), spawn_persister(sink.clone(), config))
}

fn create_swarm(id: &str) -> Command {
    Command::CreateElement {
        id: Some(ElementId::new(id)),
        element_type: ElementType::Swarm,
        owner: None,
        patch: ElementPatch::default().with_bounds(20.0, 20.0, 300.0, 200.0),
    }
}

#[tokio::test(start_paused = true)]
async fn edits_are_persisted_once_after_debounce() {
    let sink = RecordingSink::default();
    let mut s = session(&sink);

    s.apply(create_swarm("a")).unwrap();
    s.apply(create_swarm("b")).unwrap();
    tokio::time::sleep(Duration::from_millis(600)).await;

    let writes = sink.writes.lock().unwrap().clone();
    assert_eq!(writes.len(), 1);
    let elements = writes[0]["elements"].as_object().unwrap();
    assert!(elements.contains_key("a") && elements.contains_key("b"));
}

#[tokio::test(start_paused = true)]
async fn failed_command_queues_nothing() {
    let sink = RecordingSink::default();
    let mut s = session(&sink);

    let err = s.apply(Command::DeleteElement { id: ElementId::new("ghost") }).unwrap_err();
    assert_eq!(err.error_code(), "E_ELEMENT_NOT_FOUND");
    tokio::time::sleep(Duration::from_millis(1_000)).await;
    assert!(sink.writes.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn close_flushes_and_returns_diagram() {
    let sink = RecordingSink::default();
    let mut s = session(&sink);
    s.apply(create_swarm("a")).unwrap();
    assert_eq!(s.warnings().len(), 1);

    let diagram = s.close().await.unwrap();
    assert_eq!(diagram.element_count(), 1);
    let writes = sink.writes.lock().unwrap().clone();
    assert_eq!(writes.len(), 1);
    assert_eq!(Diagram::from_model(&writes[0]).unwrap(), diagram);
}

#[tokio::test(start_paused = true)]
async fn flush_persists_current_state() {
    let sink = RecordingSink::default();
    let mut s = session(&sink);
    s.apply(create_swarm("a")).unwrap();
    s.flush().await.unwrap();
    assert_eq!(sink.writes.lock().unwrap().len(), 1);
    assert_eq!(s.diagram().element_count(), 1);
}
