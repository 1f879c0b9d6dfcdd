use mri_core::{build_flow_definition_auto, CoreEngineError, EventStore, ExecutionContext, FlowEventKind, FlowRepository,
               InMemoryEventStore, InMemoryFlowRepository, StepDefinition, StepKind, StepRunResult, StepStatus};
use serde_json::json;
use uuid::Uuid;

struct Noop(&'static str);

impl StepDefinition for Noop {
    fn id(&self) -> &str { self.0 }
    fn base_params(&self) -> serde_json::Value { json!({}) }
    fn run(&self, _ctx: &ExecutionContext) -> StepRunResult { StepRunResult::Success { outputs: vec![] } }
    fn kind(&self) -> StepKind { StepKind::Transform }
}

#[test]
fn replay_marks_failed_flow_and_keeps_cursor() {
    let mut store = InMemoryEventStore::default();
    let flow_id = Uuid::new_v4();
    let def = build_flow_definition_auto(vec![Box::new(Noop("a")), Box::new(Noop("b")), Box::new(Noop("c"))]);

    store.append_kind(flow_id, FlowEventKind::FlowInitialized { definition_hash: def.definition_hash.clone(), step_count: 3 });
    store.append_kind(flow_id, FlowEventKind::StepStarted { step_index: 0, step_id: "a".into() });
    store.append_kind(flow_id,
                      FlowEventKind::StepFinished { step_index: 0, step_id: "a".into(), outputs: vec!["x".into()], fingerprint: "fp".into() });
    store.append_kind(flow_id, FlowEventKind::StepStarted { step_index: 1, step_id: "b".into() });
    store.append_kind(flow_id,
                      FlowEventKind::StepFailed { step_index: 1,
                                                  step_id: "b".into(),
                                                  error: CoreEngineError::Internal("x".into()),
                                                  fingerprint: "fp2".into() });

    let instance = InMemoryFlowRepository::new().load(flow_id, &store.list(flow_id), &def);
    assert!(instance.failed);
    assert!(!instance.completed);
    assert_eq!(instance.cursor, 2);
    assert_eq!(instance.last_finished(), Some(0));
    assert_eq!(instance.steps[0].outputs, vec!["x".to_string()]);
    assert_eq!(instance.steps[1].status, StepStatus::Failed);
    assert_eq!(instance.steps[2].status, StepStatus::Pending);
}

#[test]
fn definition_hash_depends_on_step_order() {
    let ab = build_flow_definition_auto(vec![Box::new(Noop("a")), Box::new(Noop("b"))]);
    let ba = build_flow_definition_auto(vec![Box::new(Noop("b")), Box::new(Noop("a"))]);
    assert_ne!(ab.definition_hash, ba.definition_hash);
    assert_eq!(ab.step_ids(), vec!["a", "b"]);
}
