//! Tools and the interaction state machine.
//!
//! One `Interaction` owns the active tool, the selection sets and the
//! current gesture session. It translates input events into [`Effect`]s:
//! previews (local only), persisted edits, and editor commands such as
//! undo or zoom. It never talks to the backend itself.
//!
//! There is exactly one session at a time, so a drag, a resize, a text
//! edit and a half-built polyline can never overlap.

use crate::config::EditorConfig;
use crate::input::{InputEvent, Modifiers, PointerButton};
use crate::selection::{Selection, Selections};
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use crate::store::ShapeStore;
use kurbo::{Point, Rect, Vec2};
use ov_core::id::ShapeId;
use ov_core::model::{Drawing, DrawingKind, PolyPoints, Shape, ShapeFamily, TextRegion};
use ov_core::patch::ShapePatch;
use ov_core::resize::{Grip, resize_shape};
use ov_core::view::ViewTransform;
use ov_core::wire::kind_points;
use ov_render::hit::{hit_grip, hit_test, hit_test_rect};
use serde::{Deserialize, Serialize};

/// The available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    #[default]
    Select,
    Line,
    Rect,
    Circle,
    Polyline,
    /// Free-standing text annotation (a drawing).
    Text,
    /// Manual text region.
    TextBox,
}

impl ToolKind {
    /// The family this tool creates. `Select` works on the current surface.
    pub fn family(self) -> Option<ShapeFamily> {
        match self {
            ToolKind::Select => None,
            ToolKind::TextBox => Some(ShapeFamily::Region),
            ToolKind::Line
            | ToolKind::Rect
            | ToolKind::Circle
            | ToolKind::Polyline
            | ToolKind::Text => Some(ShapeFamily::Drawing),
        }
    }

    fn from_shortcut(action: ShortcutAction) -> Option<ToolKind> {
        match action {
            ShortcutAction::ToolSelect => Some(ToolKind::Select),
            ShortcutAction::ToolLine => Some(ToolKind::Line),
            ShortcutAction::ToolRect => Some(ToolKind::Rect),
            ShortcutAction::ToolCircle => Some(ToolKind::Circle),
            ShortcutAction::ToolPolyline => Some(ToolKind::Polyline),
            ShortcutAction::ToolText => Some(ToolKind::Text),
            ShortcutAction::ToolTextBox => Some(ToolKind::TextBox),
            _ => None,
        }
    }
}

/// What an event asks the editor to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Show a transient version of an existing shape. Never persisted.
    Preview(Shape),
    /// Persist a change. `before` is the shape at gesture start.
    Update {
        id: ShapeId,
        patch: ShapePatch,
        before: Shape,
    },
    Create(Shape),
    Delete(Vec<ShapeId>),
    Undo,
    Redo,
    ZoomIn,
    ZoomOut,
    ZoomReset,
}

impl Effect {
    /// Number of history entries this effect produces.
    pub fn edit_count(&self) -> usize {
        match self {
            Effect::Update { .. } | Effect::Create(_) => 1,
            Effect::Delete(ids) => ids.len(),
            _ => 0,
        }
    }
}

/// Public view of the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    Idle,
    Drawing,
    Marquee,
    Dragging,
    Resizing,
    Polyline,
    TextEditing,
}

#[derive(Debug, Clone, PartialEq)]
enum EditTarget {
    Shape(ShapeId),
    /// A new text annotation anchored here.
    Annotation(Point),
}

#[derive(Debug, Clone, Default)]
enum Session {
    #[default]
    Idle,
    Drawing {
        tool: ToolKind,
        anchor: Point,
        current: Point,
        constrain: bool,
    },
    Marquee {
        anchor: Point,
        current: Point,
    },
    Dragging {
        originals: Vec<Shape>,
        start: Point,
    },
    Resizing {
        basis: Shape,
        grip: Grip,
        start: Point,
        previewed: bool,
    },
    Polyline {
        points: PolyPoints,
    },
    TextEditing {
        target: EditTarget,
        original: String,
        buffer: String,
        /// Set once the edit was committed or cancelled.
        done: bool,
    },
}

/// Read-only context for event handling.
pub struct Scene<'a> {
    pub store: &'a ShapeStore,
    pub view: &'a ViewTransform,
    pub config: &'a EditorConfig,
    pub page_number: u32,
}

impl Scene<'_> {
    fn tolerance(&self) -> f64 {
        self.view.length_to_document(self.config.hit_tolerance_px)
    }

    fn grip_radius(&self) -> f64 {
        self.view.length_to_document(self.config.handle_radius_px)
    }
}

// ─── Geometry helpers ────────────────────────────────────────────────────

/// Keep only the dominant axis of `d`.
fn dominant(d: Vec2) -> Vec2 {
    if d.x.abs() >= d.y.abs() {
        Vec2::new(d.x, 0.0)
    } else {
        Vec2::new(0.0, d.y)
    }
}

/// Move `p` onto the horizontal or vertical through `anchor`.
fn snap_axis(anchor: Point, p: Point) -> Point {
    anchor + dominant(p - anchor)
}

/// Corner opposite `anchor` of the square spanned towards `p`.
fn square(anchor: Point, p: Point) -> Point {
    let d = p - anchor;
    let side = d.x.abs().max(d.y.abs());
    anchor + Vec2::new(side * d.x.signum(), side * d.y.signum())
}

fn coordinates(shape: &Shape) -> Vec<f64> {
    match shape {
        Shape::Region(r) => vec![r.bbox.x0, r.bbox.y0, r.bbox.x1, r.bbox.y1],
        Shape::Drawing(d) => kind_points(&d.kind),
    }
}

/// Whether any coordinate moved by at least `epsilon`.
fn moved_beyond(a: &Shape, b: &Shape, epsilon: f64) -> bool {
    let (a, b) = (coordinates(a), coordinates(b));
    a.len() != b.len() || a.iter().zip(&b).any(|(x, y)| (x - y).abs() >= epsilon)
}

fn preview_id() -> ShapeId {
    ShapeId::intern("__preview__")
}

// ─── Interaction ─────────────────────────────────────────────────────────

/// The interaction state machine.
#[derive(Debug)]
pub struct Interaction {
    tool: ToolKind,
    surface: ShapeFamily,
    selection: Selections,
    session: Session,
    /// Last pointer position, document space.
    cursor: Option<Point>,
}

impl Default for Interaction {
    fn default() -> Self {
        Self::new()
    }
}

impl Interaction {
    pub fn new() -> Self {
        Self {
            tool: ToolKind::Select,
            surface: ShapeFamily::Region,
            selection: Selections::default(),
            session: Session::Idle,
            cursor: None,
        }
    }

    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    /// The family the select tool and keyboard commands act on.
    pub fn surface(&self) -> ShapeFamily {
        self.surface
    }

    pub fn selection(&self) -> &Selections {
        &self.selection
    }

    fn active(&mut self) -> &mut Selection {
        self.selection.get_mut(self.surface)
    }

    /// Replace the selection of `family`, e.g. from a list panel.
    pub fn select(&mut self, family: ShapeFamily, ids: impl IntoIterator<Item = ShapeId>) {
        self.selection.get_mut(family).set(ids);
    }

    pub fn session(&self) -> SessionKind {
        match self.session {
            Session::Idle => SessionKind::Idle,
            Session::Drawing { .. } => SessionKind::Drawing,
            Session::Marquee { .. } => SessionKind::Marquee,
            Session::Dragging { .. } => SessionKind::Dragging,
            Session::Resizing { .. } => SessionKind::Resizing,
            Session::Polyline { .. } => SessionKind::Polyline,
            Session::TextEditing { .. } => SessionKind::TextEditing,
        }
    }

    /// Switch tools. The current gesture is abandoned, except an open text
    /// edit, which is committed.
    pub fn set_tool(&mut self, tool: ToolKind, scene: &Scene<'_>) -> Vec<Effect> {
        let mut effects = Vec::new();
        self.end_session(scene, &mut effects);
        self.tool = tool;
        if let Some(family) = tool.family() {
            self.surface = family;
        }
        log::debug!("tool -> {tool:?} (surface {:?})", self.surface);
        effects
    }

    /// Switch the active surface. A drawing tool that does not fit the new
    /// surface falls back to select.
    pub fn set_surface(&mut self, family: ShapeFamily, scene: &Scene<'_>) -> Vec<Effect> {
        let mut effects = Vec::new();
        self.end_session(scene, &mut effects);
        self.surface = family;
        if self.tool.family().is_some_and(|f| f != family) {
            self.tool = ToolKind::Select;
        }
        effects
    }

    /// Drop selected ids (and an edit target) that no longer exist.
    pub fn retain_existing(&mut self, store: &ShapeStore) {
        self.selection.regions.retain(|id| store.contains(*id));
        self.selection.drawings.retain(|id| store.contains(*id));
        if let Session::TextEditing {
            target: EditTarget::Shape(id),
            ..
        } = &self.session
            && !store.contains(*id)
        {
            self.session = Session::Idle;
        }
    }

    // ─── Overlay state ───────────────────────────────────────────────────

    /// Rubber-band rectangle, document space.
    pub fn marquee(&self) -> Option<Rect> {
        match &self.session {
            Session::Marquee { anchor, current } => Some(Rect::from_points(*anchor, *current)),
            _ => None,
        }
    }

    pub fn polyline(&self) -> &[Point] {
        match &self.session {
            Session::Polyline { points } => points.as_slice(),
            _ => &[],
        }
    }

    pub fn cursor(&self) -> Option<Point> {
        self.cursor
    }

    /// The shape whose text is open in the inline editor, with the buffer.
    pub fn editing(&self) -> Option<(ShapeId, &str)> {
        match &self.session {
            Session::TextEditing {
                target: EditTarget::Shape(id),
                buffer,
                done: false,
                ..
            } => Some((*id, buffer.as_str())),
            _ => None,
        }
    }

    /// A shape under construction that is not in the store yet.
    pub fn preview(&self, scene: &Scene<'_>) -> Option<Shape> {
        match &self.session {
            Session::Drawing {
                tool,
                anchor,
                current,
                constrain,
            } => build(*tool, *anchor, *current, *constrain, preview_id(), scene),
            Session::TextEditing {
                target: EditTarget::Annotation(anchor),
                buffer,
                done: false,
                ..
            } => Some(annotation(preview_id(), *anchor, buffer, scene)),
            _ => None,
        }
    }

    // ─── Events ──────────────────────────────────────────────────────────

    pub fn handle(&mut self, event: &InputEvent, scene: &Scene<'_>) -> Vec<Effect> {
        let mut effects = Vec::new();
        if let Some(screen) = event.position() {
            if !(screen.x.is_finite() && screen.y.is_finite()) {
                log::warn!("ignoring pointer event with non-finite position");
                return effects;
            }
            self.cursor = Some(scene.view.to_document(screen));
        }

        match event {
            InputEvent::PointerDown {
                x,
                y,
                button,
                click_count,
                modifiers,
            } => {
                let p = scene.view.to_document(Point::new(*x, *y));
                self.pointer_down(p, *button, *click_count, *modifiers, scene, &mut effects);
            }
            InputEvent::PointerMove { x, y, modifiers } => {
                let p = scene.view.to_document(Point::new(*x, *y));
                self.pointer_move(p, *modifiers, scene, &mut effects);
            }
            InputEvent::PointerUp { x, y, modifiers } => {
                let p = scene.view.to_document(Point::new(*x, *y));
                self.pointer_up(p, *modifiers, scene, &mut effects);
            }
            InputEvent::Key { key, modifiers } => self.key(key, *modifiers, scene, &mut effects),
            InputEvent::TextInput { text } => {
                if let Session::TextEditing {
                    buffer,
                    done: false,
                    ..
                } = &mut self.session
                {
                    buffer.clone_from(text);
                }
            }
            InputEvent::Blur => self.finish_edit(true, scene, &mut effects),
        }
        effects
    }

    fn pointer_down(
        &mut self,
        p: Point,
        button: PointerButton,
        click_count: u8,
        modifiers: Modifiers,
        scene: &Scene<'_>,
        effects: &mut Vec<Effect>,
    ) {
        // A press elsewhere ends an open text edit, like losing focus.
        if matches!(self.session, Session::TextEditing { .. }) {
            self.finish_edit(true, scene, effects);
        }
        if self.tool == ToolKind::Polyline {
            self.polyline_press(p, button, click_count, modifiers, scene, effects);
            return;
        }
        // A missed pointer-up must not leave a gesture dangling.
        self.cancel(scene, effects);
        if button != PointerButton::Primary {
            return;
        }
        match self.tool {
            ToolKind::Select => self.select_press(p, click_count, modifiers, scene),
            ToolKind::Text => {
                self.session = Session::TextEditing {
                    target: EditTarget::Annotation(p),
                    original: String::new(),
                    buffer: String::new(),
                    done: false,
                };
            }
            tool => {
                self.session = Session::Drawing {
                    tool,
                    anchor: p,
                    current: p,
                    constrain: modifiers.shift,
                };
            }
        }
    }

    fn select_press(&mut self, p: Point, click_count: u8, modifiers: Modifiers, scene: &Scene<'_>) {
        let family = self.surface;

        // Grips of a single selected, unlocked shape come first.
        if click_count < 2
            && let Some(id) = self.selection.get(family).single()
            && let Some(shape) = scene.store.get(id)
            && !shape.is_locked()
            && let Some(grip) = hit_grip(shape, p, scene.grip_radius())
        {
            self.session = Session::Resizing {
                basis: shape.clone(),
                grip,
                start: p,
                previewed: false,
            };
            return;
        }

        let shapes = scene.store.ordered(family);
        let hit = hit_test(shapes.iter().copied(), p, scene.tolerance());

        if click_count >= 2 {
            if let Some(id) = hit
                && let Some(shape) = scene.store.get(id)
                && !shape.is_locked()
                && let Some(text) = shape.text()
            {
                self.active().replace(id);
                self.session = Session::TextEditing {
                    target: EditTarget::Shape(id),
                    original: text.to_string(),
                    buffer: text.to_string(),
                    done: false,
                };
            }
            return;
        }

        match hit {
            Some(id) => {
                if modifiers.command() || modifiers.shift {
                    self.active().toggle(id);
                    return;
                }
                // A press on an unselected shape selects it and drags it in
                // the same gesture.
                if !self.active().contains(id) {
                    self.active().replace(id);
                }
                let originals: Vec<Shape> = self
                    .selection
                    .get(family)
                    .as_slice()
                    .iter()
                    .filter_map(|id| scene.store.get(*id))
                    .filter(|s| !s.is_locked())
                    .cloned()
                    .collect();
                if !originals.is_empty() {
                    self.session = Session::Dragging { originals, start: p };
                }
            }
            None => {
                if !(modifiers.command() || modifiers.shift) {
                    self.active().clear();
                }
                self.session = Session::Marquee {
                    anchor: p,
                    current: p,
                };
            }
        }
    }

    fn polyline_press(
        &mut self,
        p: Point,
        button: PointerButton,
        click_count: u8,
        modifiers: Modifiers,
        scene: &Scene<'_>,
        effects: &mut Vec<Effect>,
    ) {
        if !matches!(self.session, Session::Polyline { .. }) {
            if button != PointerButton::Primary || click_count >= 2 {
                return;
            }
            self.session = Session::Polyline {
                points: PolyPoints::new(),
            };
        }
        let finish = button == PointerButton::Secondary || click_count >= 2;
        if finish {
            self.finish_polyline(scene, effects);
            return;
        }
        if let Session::Polyline { points } = &mut self.session {
            let p = match points.last() {
                Some(last) if modifiers.shift => snap_axis(*last, p),
                _ => p,
            };
            points.push(p);
        }
    }

    fn pointer_move(&mut self, p: Point, modifiers: Modifiers, scene: &Scene<'_>, effects: &mut Vec<Effect>) {
        match &mut self.session {
            Session::Dragging { originals, start } => {
                let mut delta = p - *start;
                if modifiers.shift {
                    delta = dominant(delta);
                }
                effects.extend(originals.iter().map(|s| Effect::Preview(s.translated(delta))));
            }
            Session::Resizing {
                basis,
                grip,
                start,
                previewed,
            } => {
                if let Some(next) = resize_shape(basis, *grip, p - *start, scene.config.limits())
                    && next.is_finite()
                {
                    *previewed = true;
                    effects.push(Effect::Preview(next));
                }
            }
            Session::Drawing {
                current, constrain, ..
            } => {
                *current = p;
                *constrain = modifiers.shift;
            }
            Session::Marquee { current, .. } => *current = p,
            _ => {}
        }
    }

    fn pointer_up(&mut self, p: Point, modifiers: Modifiers, scene: &Scene<'_>, effects: &mut Vec<Effect>) {
        let epsilon = scene.config.move_epsilon;
        match std::mem::take(&mut self.session) {
            Session::Dragging { originals, start } => {
                let mut delta = p - start;
                if modifiers.shift {
                    delta = dominant(delta);
                }
                if delta.hypot() < epsilon {
                    restore(originals, scene, effects);
                    return;
                }
                for original in originals {
                    let moved = original.translated(delta);
                    if let Some(patch) = ShapePatch::diff(&original, &moved)
                        && !patch.is_empty()
                    {
                        effects.push(Effect::Update {
                            id: original.id(),
                            patch,
                            before: original,
                        });
                    }
                }
            }
            Session::Resizing {
                basis,
                grip,
                start,
                previewed,
            } => match resize_shape(&basis, grip, p - start, scene.config.limits()) {
                Some(next) if next.is_finite() && moved_beyond(&basis, &next, epsilon) => {
                    if let Some(patch) = ShapePatch::diff(&basis, &next) {
                        effects.push(Effect::Update {
                            id: basis.id(),
                            patch,
                            before: basis,
                        });
                    }
                }
                _ if previewed => restore(vec![basis], scene, effects),
                _ => {}
            },
            Session::Drawing { tool, anchor, .. } => {
                if let Some(shape) = build(tool, anchor, p, modifiers.shift, ShapeId::local(), scene) {
                    effects.push(Effect::Create(shape));
                } else {
                    log::debug!("discarding degenerate {tool:?}");
                }
            }
            Session::Marquee { anchor, .. } => {
                let rect = Rect::from_points(anchor, p);
                if rect.width() >= epsilon || rect.height() >= epsilon {
                    let family = self.surface;
                    let hits = hit_test_rect(scene.store.ordered(family).into_iter(), rect);
                    self.active().union(hits);
                }
            }
            other => self.session = other,
        }
    }

    fn key(&mut self, key: &str, modifiers: Modifiers, scene: &Scene<'_>, effects: &mut Vec<Effect>) {
        // The inline editor owns the keyboard while it is open.
        if let Session::TextEditing {
            buffer,
            done: false,
            ..
        } = &mut self.session
        {
            let finish = match key {
                "Enter" if !modifiers.shift => Some(true),
                "Enter" => {
                    buffer.push('\n');
                    None
                }
                "Escape" => Some(false),
                "Backspace" => {
                    buffer.pop();
                    None
                }
                k if !modifiers.command() && k.chars().count() == 1 => {
                    buffer.push_str(k);
                    None
                }
                _ => None,
            };
            if let Some(commit) = finish {
                self.finish_edit(commit, scene, effects);
            }
            return;
        }

        let action = ShortcutMap::resolve(key, modifiers.ctrl, modifiers.shift, modifiers.alt, modifiers.meta);

        if let Session::Polyline { points } = &mut self.session {
            match action {
                Some(ShortcutAction::Confirm) => self.finish_polyline(scene, effects),
                Some(ShortcutAction::Escape) => self.session = Session::Idle,
                Some(ShortcutAction::Undo) => {
                    points.pop();
                    if points.is_empty() {
                        self.session = Session::Idle;
                    }
                }
                _ => {}
            }
            return;
        }

        if !matches!(self.session, Session::Idle) {
            if action == Some(ShortcutAction::Escape) {
                self.cancel(scene, effects);
            }
            return;
        }

        let Some(action) = action else {
            return;
        };
        if let Some(tool) = ToolKind::from_shortcut(action) {
            effects.extend(self.set_tool(tool, scene));
            return;
        }
        let family = self.surface;
        match action {
            ShortcutAction::Undo => effects.push(Effect::Undo),
            ShortcutAction::Redo => effects.push(Effect::Redo),
            ShortcutAction::ZoomIn => effects.push(Effect::ZoomIn),
            ShortcutAction::ZoomOut => effects.push(Effect::ZoomOut),
            ShortcutAction::ZoomReset => effects.push(Effect::ZoomReset),
            ShortcutAction::Escape => self.active().clear(),
            ShortcutAction::SelectAll => {
                let ids = scene.store.ids(family).to_vec();
                self.active().set(ids);
            }
            ShortcutAction::Delete => {
                let ids: Vec<ShapeId> = self
                    .selected_unlocked(scene)
                    .into_iter()
                    .map(|s| s.id())
                    .collect();
                if !ids.is_empty() {
                    self.active().retain(|id| !ids.contains(id));
                    effects.push(Effect::Delete(ids));
                }
            }
            ShortcutAction::Nudge { dx, dy, large } => {
                let step = if large {
                    scene.config.nudge_step_large
                } else {
                    scene.config.nudge_step
                };
                let delta = Vec2::new(f64::from(dx) * step, f64::from(dy) * step);
                for shape in self.selected_unlocked(scene) {
                    let moved = shape.translated(delta);
                    if let Some(patch) = ShapePatch::diff(&shape, &moved) {
                        effects.push(Effect::Update {
                            id: shape.id(),
                            patch,
                            before: shape,
                        });
                    }
                }
            }
            _ => {}
        }
    }

    fn selected_unlocked(&self, scene: &Scene<'_>) -> Vec<Shape> {
        self.selection
            .get(self.surface)
            .as_slice()
            .iter()
            .filter_map(|id| scene.store.get(*id))
            .filter(|s| !s.is_locked())
            .cloned()
            .collect()
    }

    // ─── Session endings ─────────────────────────────────────────────────

    fn finish_polyline(&mut self, scene: &Scene<'_>, effects: &mut Vec<Effect>) {
        if let Session::Polyline { points } = std::mem::take(&mut self.session) {
            if points.len() < 2 {
                log::debug!("discarding polyline with {} point(s)", points.len());
                return;
            }
            let drawing = Drawing::new(
                ShapeId::local(),
                scene.page_number,
                DrawingKind::Polyline { points },
                scene.config.draw_style.clone(),
            );
            effects.push(Effect::Create(Shape::Drawing(drawing)));
        }
    }

    /// Close the inline editor. Runs at most once per edit session: Enter
    /// followed by the blur it causes commits once.
    fn finish_edit(&mut self, commit: bool, scene: &Scene<'_>, effects: &mut Vec<Effect>) {
        let Session::TextEditing {
            target,
            original,
            buffer,
            done,
        } = &mut self.session
        else {
            return;
        };
        if *done {
            return;
        }
        *done = true;
        let target = target.clone();
        let original = std::mem::take(original);
        let buffer = std::mem::take(buffer);
        self.session = Session::Idle;
        if !commit {
            return;
        }
        match target {
            EditTarget::Shape(id) => {
                if buffer == original {
                    return;
                }
                if let Some(shape) = scene.store.get(id)
                    && let Some(patch) = ShapePatch::text(shape, &buffer)
                {
                    effects.push(Effect::Update {
                        id,
                        patch,
                        before: shape.clone(),
                    });
                }
            }
            EditTarget::Annotation(anchor) => {
                if buffer.trim().is_empty() {
                    return;
                }
                effects.push(Effect::Create(annotation(ShapeId::local(), anchor, &buffer, scene)));
            }
        }
    }

    /// Abandon a pointer gesture or construction, restoring previewed
    /// shapes. Text edits are left alone.
    fn cancel(&mut self, scene: &Scene<'_>, effects: &mut Vec<Effect>) {
        match std::mem::take(&mut self.session) {
            Session::Dragging { originals, .. } => restore(originals, scene, effects),
            Session::Resizing { basis, .. } => restore(vec![basis], scene, effects),
            text @ Session::TextEditing { .. } => self.session = text,
            _ => {}
        }
    }

    fn end_session(&mut self, scene: &Scene<'_>, effects: &mut Vec<Effect>) {
        if matches!(self.session, Session::TextEditing { .. }) {
            self.finish_edit(true, scene, effects);
        }
        self.cancel(scene, effects);
    }
}

/// Preview the originals again wherever the store shows something else.
fn restore(originals: Vec<Shape>, scene: &Scene<'_>, effects: &mut Vec<Effect>) {
    for original in originals {
        if scene.store.get(original.id()) != Some(&original) {
            effects.push(Effect::Preview(original));
        }
    }
}

/// Build the shape a drawing tool would create for a drag from `anchor`
/// to `current`. `None` for degenerate geometry.
fn build(
    tool: ToolKind,
    anchor: Point,
    current: Point,
    constrain: bool,
    id: ShapeId,
    scene: &Scene<'_>,
) -> Option<Shape> {
    let style = || scene.config.draw_style.clone();
    let drawing = |kind| Some(Shape::Drawing(Drawing::new(id, scene.page_number, kind, style())));
    match tool {
        ToolKind::Line => {
            let to = if constrain {
                snap_axis(anchor, current)
            } else {
                current
            };
            if to == anchor {
                return None;
            }
            drawing(DrawingKind::Line { from: anchor, to })
        }
        ToolKind::Rect | ToolKind::Circle => {
            let corner = if constrain {
                square(anchor, current)
            } else {
                current
            };
            let bounds = Rect::from_points(anchor, corner);
            if !(bounds.width() > 0.0 && bounds.height() > 0.0) {
                return None;
            }
            if tool == ToolKind::Rect {
                drawing(DrawingKind::Rect { bounds })
            } else {
                drawing(DrawingKind::Circle { bounds })
            }
        }
        ToolKind::TextBox => {
            let corner = if constrain {
                square(anchor, current)
            } else {
                current
            };
            let dragged = Rect::from_points(anchor, corner);
            let epsilon = scene.config.move_epsilon;
            // A click (or a drag flat along one axis) places a default box.
            let bbox = if dragged.width() >= epsilon && dragged.height() >= epsilon {
                dragged
            } else {
                Rect::from_origin_size(anchor, scene.config.text_box_size)
            };
            let region = TextRegion {
                render_order: scene.store.next_render_order(),
                ..TextRegion::manual(id, scene.page_number, bbox)
            };
            Some(Shape::Region(region).normalized(scene.config.region_min))
        }
        ToolKind::Select | ToolKind::Polyline | ToolKind::Text => None,
    }
}

fn annotation(id: ShapeId, anchor: Point, text: &str, scene: &Scene<'_>) -> Shape {
    Shape::Drawing(Drawing::new(
        id,
        scene.page_number,
        DrawingKind::Text {
            anchor,
            text: text.to_string(),
            font: scene.config.annotation_font.clone(),
        },
        scene.config.draw_style.clone(),
    ))
}
