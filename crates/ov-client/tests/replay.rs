//! Integration tests: replay scripts against the in-memory backend.

use ov_client::script::{Script, Step, replay};
use ov_editor::memory::Op;
use ov_editor::Editor;
use pretty_assertions::assert_eq;
use std::sync::Arc;

const SCRIPT: &str = r#"{
    "page": { "project_id": "demo", "page_number": 0 },
    "config": { "compose_delay_ms": 200 },
    "seed": {
        "regions": [ { "id": "r1", "bbox": [10, 10, 210, 40], "src_text": "VALVE" } ]
    },
    "steps": [
        { "step": "tool", "tool": "rect" },
        { "step": "input", "event": { "type": "pointer_down", "x": 50, "y": 400 } },
        { "step": "input", "event": { "type": "pointer_move", "x": 100, "y": 430 } },
        { "step": "input", "event": { "type": "pointer_up", "x": 150, "y": 460 } },
        { "step": "settle" },
        { "step": "tool", "tool": "select" },
        { "step": "input", "event": { "type": "pointer_down", "x": 150, "y": 460 } },
        { "step": "input", "event": { "type": "pointer_move", "x": 180, "y": 490 } },
        { "step": "input", "event": { "type": "pointer_up", "x": 200, "y": 510 } },
        { "step": "wait_ms", "ms": 500 }
    ]
}"#;

#[test]
fn parses_steps_and_config() {
    let script = Script::parse(SCRIPT).unwrap();
    assert_eq!(script.page.project_id, "demo");
    assert_eq!(script.config.compose_delay_ms, 200);
    assert_eq!(script.config.history_depth, 100);
    assert_eq!(script.seed.regions.len(), 1);
    assert_eq!(script.steps.len(), 10);
    assert!(matches!(script.steps[4], Step::Settle));
}

#[test]
fn rejects_unknown_steps() {
    let text = r#"{ "page": { "project_id": "p", "page_number": 0 }, "steps": [ { "step": "explode" } ] }"#;
    assert!(Script::parse(text).is_err());
}

#[tokio::test(start_paused = true)]
async fn offline_replay_creates_resizes_and_composes() {
    let script = Script::parse(SCRIPT).unwrap();
    let backend = Arc::new(script.offline_backend());
    let mut editor = Editor::open(Arc::clone(&backend), script.page.clone(), script.config.clone())
        .await
        .unwrap();

    let report = replay(&mut editor, &script).await;
    assert_eq!(report.errors(), 0);
    assert_eq!((report.regions, report.drawings), (1, 1));
    assert_eq!(backend.calls(Op::CreateDrawing), 1);
    assert_eq!(backend.calls(Op::UpdateDrawing), 1);
    assert_eq!(backend.calls(Op::Recompose), 1);
    assert_eq!(backend.drawings(&script.page)[0].points, vec![50.0, 400.0, 200.0, 510.0]);
}
