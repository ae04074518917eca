//! Integration tests: pointer and keyboard gestures driven through the
//! `Editor` against the in-memory backend.

use kurbo::{Point, Rect};
use ov_core::model::{DrawingKind, Shape, ShapeFamily};
use ov_core::wire::{DrawingRecord, TextRegionRecord};
use ov_core::ShapeId;
use ov_editor::{
    Editor, EditorConfig, InputEvent, MemoryBackend, Modifiers, Op, PageRef, SessionKind, ToolKind,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn page() -> PageRef {
    PageRef::new("proj-1", 1)
}

async fn open(backend: &MemoryBackend) -> Editor<MemoryBackend> {
    Editor::open(Arc::new(backend.clone()), page(), EditorConfig::default())
        .await
        .unwrap()
}

fn seed_rect(backend: &MemoryBackend, id: &str, bbox: [f64; 4]) {
    let record: DrawingRecord = serde_json::from_value(serde_json::json!({
        "id": id,
        "page_number": 1,
        "element_type": "rect",
        "points": bbox,
    }))
    .unwrap();
    backend.seed_drawing(&page(), record);
}

fn seed_region(backend: &MemoryBackend, id: &str, bbox: [f64; 4], src: &str, tgt: &str) {
    let record: TextRegionRecord = serde_json::from_value(serde_json::json!({
        "id": id,
        "page_number": 1,
        "bbox": bbox,
        "src_text": src,
        "tgt_text": tgt,
    }))
    .unwrap();
    backend.seed_region(&page(), record);
}

fn drag(editor: &mut Editor<MemoryBackend>, from: (f64, f64), to: (f64, f64), frames: usize) {
    editor.handle(&InputEvent::down(from.0, from.1));
    for i in 1..=frames {
        let t = i as f64 / frames as f64;
        editor.handle(&InputEvent::moved(
            from.0 + (to.0 - from.0) * t,
            from.1 + (to.1 - from.1) * t,
        ));
    }
    editor.handle(&InputEvent::up(to.0, to.1));
}

fn click(editor: &mut Editor<MemoryBackend>, x: f64, y: f64) {
    editor.handle(&InputEvent::down(x, y));
    editor.handle(&InputEvent::up(x, y));
}

fn only_drawing(editor: &Editor<MemoryBackend>) -> Shape {
    let shapes = editor.shapes(ShapeFamily::Drawing);
    assert_eq!(shapes.len(), 1);
    shapes[0].clone()
}

// ─── Drawing and resizing ───────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn draw_rect_then_resize_from_se_handle() {
    let backend = MemoryBackend::new();
    let mut editor = open(&backend).await;

    editor.set_tool(ToolKind::Rect);
    drag(&mut editor, (50.0, 400.0), (150.0, 460.0), 4);
    let created = only_drawing(&editor);
    assert_eq!(created.bounds(), Rect::new(50.0, 400.0, 150.0, 460.0));
    assert_eq!(editor.selection().drawings.single(), Some(created.id()));
    editor.settle().await;
    assert_eq!(backend.calls(Op::CreateDrawing), 1);

    editor.set_tool(ToolKind::Select);
    drag(&mut editor, (150.0, 460.0), (200.0, 510.0), 5);
    assert_eq!(only_drawing(&editor).bounds(), Rect::new(50.0, 400.0, 200.0, 510.0));

    editor.settle().await;
    let updates = backend.drawing_updates();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].1.points, Some(vec![50.0, 400.0, 200.0, 510.0]));
}

#[tokio::test(start_paused = true)]
async fn resize_keeps_anchor_across_frames() {
    let backend = MemoryBackend::new();
    seed_rect(&backend, "r1", [100.0, 100.0, 180.0, 180.0]);
    let mut editor = open(&backend).await;
    editor.set_surface(ShapeFamily::Drawing);
    click(&mut editor, 140.0, 140.0);

    editor.handle(&InputEvent::down(180.0, 180.0));
    for (x, y) in [(190.0, 200.0), (30.0, 20.0), (260.0, 250.0), (240.0, 230.0)] {
        editor.handle(&InputEvent::moved(x, y));
        let bounds = only_drawing(&editor).bounds();
        assert_eq!((bounds.x0, bounds.y0), (100.0, 100.0));
    }
    editor.handle(&InputEvent::up(240.0, 230.0));
    assert_eq!(only_drawing(&editor).bounds(), Rect::new(100.0, 100.0, 240.0, 230.0));
}

#[tokio::test(start_paused = true)]
async fn resize_past_the_opposite_corner_clamps_to_minimum() {
    let backend = MemoryBackend::new();
    seed_region(&backend, "t1", [100.0, 100.0, 180.0, 180.0], "A", "B");
    let mut editor = open(&backend).await;
    click(&mut editor, 140.0, 140.0);

    drag(&mut editor, (100.0, 100.0), (900.0, 900.0), 3);
    let min = EditorConfig::default().region_min;
    let bounds = editor.shapes(ShapeFamily::Region)[0].bounds();
    assert!(bounds.width() >= min.width && bounds.height() >= min.height);
    assert_eq!((bounds.x1, bounds.y1), (180.0, 180.0));

    // Outwards the nw handle just grows the box.
    drag(&mut editor, (bounds.x0, bounds.y0), (bounds.x0 - 800.0, bounds.y0 - 800.0), 2);
    let grown = editor.shapes(ShapeFamily::Region)[0].bounds();
    assert!(grown.width() > 800.0 && grown.height() > 800.0);
    assert!(grown.is_finite());
}

#[tokio::test(start_paused = true)]
async fn degenerate_drawings_are_discarded() {
    let backend = MemoryBackend::new();
    let mut editor = open(&backend).await;
    editor.set_tool(ToolKind::Rect);
    drag(&mut editor, (10.0, 10.0), (80.0, 10.0), 2);
    editor.set_tool(ToolKind::Line);
    click(&mut editor, 40.0, 40.0);
    editor.settle().await;
    assert!(editor.shapes(ShapeFamily::Drawing).is_empty());
    assert_eq!(backend.mutation_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn shift_line_snaps_to_dominant_axis() {
    let backend = MemoryBackend::new();
    let mut editor = open(&backend).await;
    editor.set_tool(ToolKind::Line);
    editor.handle(&InputEvent::down(10.0, 10.0));
    editor.handle(&InputEvent::PointerUp {
        x: 90.0,
        y: 25.0,
        modifiers: Modifiers::SHIFT,
    });
    match only_drawing(&editor) {
        Shape::Drawing(d) => assert_eq!(
            d.kind,
            DrawingKind::Line {
                from: Point::new(10.0, 10.0),
                to: Point::new(90.0, 10.0),
            }
        ),
        other => panic!("expected a drawing, got {other:?}"),
    }
}

// ─── Dragging ────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn drag_with_many_frames_sends_one_update() {
    let backend = MemoryBackend::new();
    seed_rect(&backend, "r1", [0.0, 0.0, 100.0, 100.0]);
    let mut editor = open(&backend).await;
    editor.set_surface(ShapeFamily::Drawing);
    click(&mut editor, 50.0, 50.0);

    drag(&mut editor, (50.0, 50.0), (80.0, 70.0), 25);
    editor.settle().await;
    assert_eq!(backend.calls(Op::UpdateDrawing), 1);
    assert_eq!(only_drawing(&editor).bounds(), Rect::new(30.0, 20.0, 130.0, 120.0));
}

#[tokio::test(start_paused = true)]
async fn click_without_movement_sends_nothing() {
    let backend = MemoryBackend::new();
    seed_rect(&backend, "r1", [0.0, 0.0, 100.0, 100.0]);
    let mut editor = open(&backend).await;
    editor.set_surface(ShapeFamily::Drawing);
    click(&mut editor, 50.0, 50.0);
    drag(&mut editor, (50.0, 50.0), (50.2, 49.9), 3);
    editor.settle().await;
    assert_eq!(backend.mutation_calls(), 0);
    assert_eq!(only_drawing(&editor).bounds(), Rect::new(0.0, 0.0, 100.0, 100.0));
}

#[tokio::test(start_paused = true)]
async fn press_on_unselected_region_drags_in_one_gesture() {
    let backend = MemoryBackend::new();
    seed_region(&backend, "t1", [100.0, 100.0, 200.0, 140.0], "A", "B");
    let mut editor = open(&backend).await;
    assert!(editor.selection().regions.is_empty());

    drag(&mut editor, (150.0, 120.0), (350.0, 240.0), 20);
    assert_eq!(editor.selection().regions.single(), Some(ShapeId::intern("t1")));
    let bounds = editor.shapes(ShapeFamily::Region)[0].bounds();
    assert_eq!(bounds, Rect::new(300.0, 220.0, 400.0, 260.0));

    editor.settle().await;
    assert_eq!(backend.calls(Op::UpdateRegion), 1);
    assert_eq!(backend.mutation_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn press_on_unselected_locked_region_selects_without_moving() {
    let backend = MemoryBackend::new();
    let mut record: TextRegionRecord = serde_json::from_value(serde_json::json!({
        "id": "t1",
        "bbox": [100.0, 100.0, 200.0, 140.0],
        "src_text": "A",
    }))
    .unwrap();
    record.locked = true;
    backend.seed_region(&page(), record);
    let mut editor = open(&backend).await;

    drag(&mut editor, (150.0, 120.0), (350.0, 240.0), 5);
    assert_eq!(editor.selection().regions.single(), Some(ShapeId::intern("t1")));
    assert_eq!(
        editor.shapes(ShapeFamily::Region)[0].bounds(),
        Rect::new(100.0, 100.0, 200.0, 140.0)
    );
    editor.settle().await;
    assert_eq!(backend.mutation_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn escape_mid_drag_restores_without_requests() {
    let backend = MemoryBackend::new();
    seed_rect(&backend, "r1", [0.0, 0.0, 100.0, 100.0]);
    let mut editor = open(&backend).await;
    editor.set_surface(ShapeFamily::Drawing);

    editor.handle(&InputEvent::down(50.0, 50.0));
    for (x, y) in [(60.0, 55.0), (90.0, 80.0), (120.0, 130.0)] {
        editor.handle(&InputEvent::moved(x, y));
    }
    assert_eq!(only_drawing(&editor).bounds(), Rect::new(70.0, 80.0, 170.0, 180.0));
    assert_eq!(editor.session(), SessionKind::Dragging);

    editor.handle(&InputEvent::key("Escape"));
    assert_eq!(editor.session(), SessionKind::Idle);
    assert_eq!(only_drawing(&editor).bounds(), Rect::new(0.0, 0.0, 100.0, 100.0));

    // The release after the abort is a stray pointer-up.
    editor.handle(&InputEvent::up(120.0, 130.0));
    editor.settle().await;
    assert_eq!(backend.mutation_calls(), 0);
    assert_eq!(only_drawing(&editor).bounds(), Rect::new(0.0, 0.0, 100.0, 100.0));
    assert!(!editor.can_undo());
}

#[tokio::test(start_paused = true)]
async fn escape_mid_resize_restores_without_requests() {
    let backend = MemoryBackend::new();
    seed_rect(&backend, "r1", [100.0, 100.0, 180.0, 180.0]);
    let mut editor = open(&backend).await;
    editor.set_surface(ShapeFamily::Drawing);
    click(&mut editor, 140.0, 140.0);

    editor.handle(&InputEvent::down(180.0, 180.0));
    editor.handle(&InputEvent::moved(220.0, 210.0));
    editor.handle(&InputEvent::moved(260.0, 250.0));
    assert_eq!(only_drawing(&editor).bounds(), Rect::new(100.0, 100.0, 260.0, 250.0));
    assert_eq!(editor.session(), SessionKind::Resizing);

    editor.handle(&InputEvent::key("Escape"));
    editor.handle(&InputEvent::up(260.0, 250.0));
    editor.settle().await;
    assert_eq!(editor.session(), SessionKind::Idle);
    assert_eq!(only_drawing(&editor).bounds(), Rect::new(100.0, 100.0, 180.0, 180.0));
    assert_eq!(backend.mutation_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn switching_tools_mid_drag_restores_without_requests() {
    let backend = MemoryBackend::new();
    seed_rect(&backend, "r1", [0.0, 0.0, 100.0, 100.0]);
    let mut editor = open(&backend).await;
    editor.set_surface(ShapeFamily::Drawing);

    editor.handle(&InputEvent::down(50.0, 50.0));
    editor.handle(&InputEvent::moved(80.0, 90.0));
    assert_eq!(only_drawing(&editor).bounds(), Rect::new(30.0, 40.0, 130.0, 140.0));

    editor.set_tool(ToolKind::Rect);
    assert_eq!(editor.session(), SessionKind::Idle);
    assert_eq!(only_drawing(&editor).bounds(), Rect::new(0.0, 0.0, 100.0, 100.0));
    editor.settle().await;
    assert_eq!(backend.mutation_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn group_drag_shares_one_delta_and_undoes_as_one_step() {
    let backend = MemoryBackend::new();
    seed_rect(&backend, "a", [0.0, 0.0, 50.0, 50.0]);
    seed_rect(&backend, "b", [200.0, 0.0, 250.0, 50.0]);
    let mut editor = open(&backend).await;
    editor.set_surface(ShapeFamily::Drawing);
    editor.select(ShapeFamily::Drawing, [ShapeId::intern("a"), ShapeId::intern("b")]);

    drag(&mut editor, (25.0, 25.0), (35.0, 45.0), 3);
    let bounds: Vec<Rect> = editor
        .shapes(ShapeFamily::Drawing)
        .iter()
        .map(|s| s.bounds())
        .collect();
    assert_eq!(
        bounds,
        vec![Rect::new(10.0, 20.0, 60.0, 70.0), Rect::new(210.0, 20.0, 260.0, 70.0)]
    );
    editor.settle().await;

    assert_eq!(editor.undo().as_deref(), Some("move"));
    let bounds: Vec<Rect> = editor
        .shapes(ShapeFamily::Drawing)
        .iter()
        .map(|s| s.bounds())
        .collect();
    assert_eq!(
        bounds,
        vec![Rect::new(0.0, 0.0, 50.0, 50.0), Rect::new(200.0, 0.0, 250.0, 50.0)]
    );
    assert!(!editor.can_undo());
}

// ─── Selection ───────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn topmost_shape_wins_on_overlap() {
    let backend = MemoryBackend::new();
    seed_rect(&backend, "a", [0.0, 0.0, 100.0, 100.0]);
    seed_rect(&backend, "b", [50.0, 50.0, 150.0, 150.0]);
    let mut editor = open(&backend).await;
    editor.set_surface(ShapeFamily::Drawing);
    editor.select(ShapeFamily::Drawing, [ShapeId::intern("a")]);

    click(&mut editor, 75.0, 75.0);
    assert_eq!(editor.selection().drawings.as_slice(), &[ShapeId::intern("b")]);
}

#[tokio::test(start_paused = true)]
async fn empty_click_clears_unless_modified() {
    let backend = MemoryBackend::new();
    seed_rect(&backend, "a", [0.0, 0.0, 100.0, 100.0]);
    let mut editor = open(&backend).await;
    editor.set_surface(ShapeFamily::Drawing);
    click(&mut editor, 50.0, 50.0);
    assert_eq!(editor.selection().drawings.len(), 1);

    editor.handle(&InputEvent::down_with(500.0, 500.0, Modifiers::SHIFT));
    editor.handle(&InputEvent::up(500.0, 500.0));
    assert_eq!(editor.selection().drawings.len(), 1);

    click(&mut editor, 500.0, 500.0);
    assert!(editor.selection().drawings.is_empty());
}

#[tokio::test(start_paused = true)]
async fn marquee_adds_intersecting_shapes() {
    let backend = MemoryBackend::new();
    seed_rect(&backend, "a", [0.0, 0.0, 50.0, 50.0]);
    seed_rect(&backend, "b", [100.0, 100.0, 150.0, 150.0]);
    seed_rect(&backend, "c", [300.0, 300.0, 350.0, 350.0]);
    let mut editor = open(&backend).await;
    editor.set_surface(ShapeFamily::Drawing);
    editor.select(ShapeFamily::Drawing, [ShapeId::intern("c")]);

    editor.handle(&InputEvent::down_with(120.0, 30.0, Modifiers::SHIFT));
    editor.handle(&InputEvent::moved(80.0, 80.0));
    assert_eq!(editor.session(), SessionKind::Marquee);
    editor.handle(&InputEvent::up(40.0, 110.0));

    let mut ids: Vec<&str> = editor
        .selection()
        .drawings
        .as_slice()
        .iter()
        .map(|id| id.as_str())
        .collect();
    ids.sort_unstable();
    assert_eq!(ids, vec!["a", "b", "c"]);
}

#[tokio::test(start_paused = true)]
async fn select_all_uses_active_surface() {
    let backend = MemoryBackend::new();
    seed_rect(&backend, "a", [0.0, 0.0, 50.0, 50.0]);
    seed_region(&backend, "t1", [0.0, 0.0, 50.0, 20.0], "x", "y");
    seed_region(&backend, "t2", [0.0, 40.0, 50.0, 60.0], "x", "y");
    let mut editor = open(&backend).await;
    editor.handle(&InputEvent::key_with("a", Modifiers::CTRL));
    assert_eq!(editor.selection().regions.len(), 2);
    assert!(editor.selection().drawings.is_empty());
}

// ─── Keyboard ────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn delete_removes_shape_and_selection() {
    let backend = MemoryBackend::new();
    seed_rect(&backend, "a", [0.0, 0.0, 50.0, 50.0]);
    let mut editor = open(&backend).await;
    editor.set_surface(ShapeFamily::Drawing);
    click(&mut editor, 25.0, 25.0);

    editor.handle(&InputEvent::key("Delete"));
    assert!(editor.shapes(ShapeFamily::Drawing).is_empty());
    assert!(editor.selection().drawings.is_empty());
    assert!(editor.shape(ShapeId::intern("a")).is_none());

    editor.settle().await;
    assert!(backend.drawings(&page()).is_empty());
}

#[tokio::test(start_paused = true)]
async fn each_nudge_is_its_own_update() {
    let backend = MemoryBackend::new();
    seed_rect(&backend, "a", [0.0, 0.0, 50.0, 50.0]);
    let mut editor = open(&backend).await;
    editor.set_surface(ShapeFamily::Drawing);
    click(&mut editor, 25.0, 25.0);

    editor.handle(&InputEvent::key("ArrowRight"));
    editor.handle(&InputEvent::key_with("ArrowDown", Modifiers::SHIFT));
    editor.settle().await;
    assert_eq!(only_drawing(&editor).bounds(), Rect::new(1.0, 10.0, 51.0, 60.0));
    assert_eq!(backend.calls(Op::UpdateDrawing), 2);
}

#[tokio::test(start_paused = true)]
async fn tool_shortcuts_switch_surface() {
    let backend = MemoryBackend::new();
    let mut editor = open(&backend).await;
    editor.handle(&InputEvent::key("r"));
    assert_eq!(editor.tool(), ToolKind::Rect);
    assert_eq!(editor.surface(), ShapeFamily::Drawing);
    editor.handle(&InputEvent::key("b"));
    assert_eq!(editor.tool(), ToolKind::TextBox);
    assert_eq!(editor.surface(), ShapeFamily::Region);
}

// ─── Text editing ────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn text_edit_commit_then_cancel() {
    let backend = MemoryBackend::new();
    seed_region(&backend, "t1", [0.0, 0.0, 200.0, 40.0], "PUMP", "Pompe");
    let mut editor = open(&backend).await;
    let id = ShapeId::intern("t1");

    editor.handle(&InputEvent::double_click(20.0, 20.0));
    assert_eq!(editor.session(), SessionKind::TextEditing);
    editor.handle(&InputEvent::TextInput {
        text: "Pompe 2".into(),
    });
    editor.handle(&InputEvent::key("Enter"));
    editor.handle(&InputEvent::Blur);
    editor.settle().await;
    assert_eq!(backend.calls(Op::UpdateRegion), 1);
    assert_eq!(editor.shape(id).and_then(Shape::text), Some("Pompe 2"));

    editor.handle(&InputEvent::double_click(20.0, 20.0));
    editor.handle(&InputEvent::TextInput {
        text: "scrap".into(),
    });
    editor.handle(&InputEvent::key("Escape"));
    editor.handle(&InputEvent::Blur);
    editor.settle().await;
    assert_eq!(backend.calls(Op::UpdateRegion), 1);
    assert_eq!(editor.shape(id).and_then(Shape::text), Some("Pompe 2"));
    assert_eq!(editor.session(), SessionKind::Idle);
}

#[tokio::test(start_paused = true)]
async fn locked_region_does_not_open_editor() {
    let backend = MemoryBackend::new();
    let mut record: TextRegionRecord = serde_json::from_value(serde_json::json!({
        "id": "t1",
        "bbox": [0.0, 0.0, 200.0, 40.0],
        "src_text": "A",
    }))
    .unwrap();
    record.locked = true;
    backend.seed_region(&page(), record);
    let mut editor = open(&backend).await;
    editor.handle(&InputEvent::double_click(20.0, 20.0));
    assert_eq!(editor.session(), SessionKind::Idle);
}

#[tokio::test(start_paused = true)]
async fn text_annotation_tool_creates_on_enter() {
    let backend = MemoryBackend::new();
    let mut editor = open(&backend).await;
    editor.set_tool(ToolKind::Text);
    click(&mut editor, 30.0, 40.0);
    for key in ["N", "o", "t", "e"] {
        editor.handle(&InputEvent::key(key));
    }
    assert!(editor.shapes(ShapeFamily::Drawing).is_empty());
    editor.handle(&InputEvent::key("Enter"));
    editor.settle().await;

    let drawings = backend.drawings(&page());
    assert_eq!(drawings.len(), 1);
    assert_eq!(drawings[0].element_type, "text");
    assert_eq!(drawings[0].text.as_deref(), Some("Note"));
    assert_eq!(drawings[0].points, vec![30.0, 40.0]);
}

#[tokio::test(start_paused = true)]
async fn text_box_click_places_default_region() {
    let backend = MemoryBackend::new();
    let mut editor = open(&backend).await;
    editor.set_tool(ToolKind::TextBox);
    click(&mut editor, 10.0, 20.0);
    editor.settle().await;
    let regions = editor.shapes(ShapeFamily::Region);
    assert_eq!(regions.len(), 1);
    assert_eq!(regions[0].bounds(), Rect::new(10.0, 20.0, 160.0, 50.0));
    assert_eq!(backend.regions(&page()).len(), 1);
}

// ─── Polyline ────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn polyline_needs_two_vertices() {
    let backend = MemoryBackend::new();
    let mut editor = open(&backend).await;
    editor.set_tool(ToolKind::Polyline);
    click(&mut editor, 10.0, 10.0);
    editor.handle(&InputEvent::key("Enter"));
    editor.handle(&InputEvent::key("Escape"));
    editor.settle().await;
    assert_eq!(backend.mutation_calls(), 0);
    assert_eq!(editor.session(), SessionKind::Idle);

    // Finishing by double-click or right-click with one vertex discards too.
    click(&mut editor, 10.0, 10.0);
    editor.handle(&InputEvent::double_click(10.0, 10.0));
    assert_eq!(editor.session(), SessionKind::Idle);
    click(&mut editor, 30.0, 30.0);
    editor.handle(&InputEvent::right_click(30.0, 30.0));
    assert_eq!(editor.session(), SessionKind::Idle);
    editor.settle().await;
    assert_eq!(backend.mutation_calls(), 0);
    assert!(editor.shapes(ShapeFamily::Drawing).is_empty());

    click(&mut editor, 10.0, 10.0);
    click(&mut editor, 60.0, 10.0);
    editor.handle(&InputEvent::down_with(60.0, 70.0, Modifiers::SHIFT));
    editor.handle(&InputEvent::up(60.0, 70.0));
    assert_eq!(backend.mutation_calls(), 0);
    editor.handle(&InputEvent::double_click(60.0, 70.0));
    editor.settle().await;

    match only_drawing(&editor) {
        Shape::Drawing(d) => match d.kind {
            DrawingKind::Polyline { points } => assert_eq!(
                points.as_slice(),
                &[Point::new(10.0, 10.0), Point::new(60.0, 10.0), Point::new(60.0, 70.0)]
            ),
            other => panic!("expected a polyline, got {other:?}"),
        },
        other => panic!("expected a drawing, got {other:?}"),
    }
    assert_eq!(backend.calls(Op::CreateDrawing), 1);
}

// ─── Display list ────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn grips_show_for_single_unlocked_selection() {
    let backend = MemoryBackend::new();
    seed_rect(&backend, "a", [0.0, 0.0, 50.0, 50.0]);
    seed_rect(&backend, "b", [100.0, 0.0, 150.0, 50.0]);
    let mut editor = open(&backend).await;
    editor.set_surface(ShapeFamily::Drawing);
    assert_eq!(editor.display_list().grips().count(), 0);

    click(&mut editor, 25.0, 25.0);
    assert_eq!(editor.display_list().grips().count(), 4);

    editor.select(ShapeFamily::Drawing, [ShapeId::intern("a"), ShapeId::intern("b")]);
    assert_eq!(editor.display_list().grips().count(), 0);
}
