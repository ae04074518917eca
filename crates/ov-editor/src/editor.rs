//! The editor facade: one page, one interaction, one history.
//!
//! Hosts feed input events in and read a display list out. Everything the
//! interaction asks for is routed through the command stack, so pointer
//! edits, keyboard edits and panel edits all reach the synchronizer the
//! same way.

use crate::backend::{Backend, PageRef};
use crate::commands::{CommandStack, Edit};
use crate::config::EditorConfig;
use crate::input::InputEvent;
use crate::selection::Selections;
use crate::store::ShapeStore;
use crate::sync::{Notice, SyncEngine, SyncError};
use crate::tools::{Effect, Interaction, Scene, SessionKind, ToolKind};
use kurbo::Size;
use ov_core::filter::RegionFilter;
use ov_core::id::ShapeId;
use ov_core::model::{Shape, ShapeFamily};
use ov_core::patch::ShapePatch;
use ov_core::view::ViewTransform;
use ov_render::paint::{DisplayList, Overlay, paint};
use std::sync::Arc;

pub struct Editor<B: Backend> {
    sync: SyncEngine<B>,
    interaction: Interaction,
    history: CommandStack,
    view: ViewTransform,
    config: EditorConfig,
}

fn scene<'a, B: Backend>(
    sync: &'a SyncEngine<B>,
    view: &'a ViewTransform,
    config: &'a EditorConfig,
) -> Scene<'a> {
    Scene {
        store: sync.store(),
        view,
        config,
        page_number: sync.page().page_number,
    }
}

/// History label for an edit.
fn describe(effect: &Effect) -> &'static str {
    match effect {
        Effect::Update { patch, .. } if patch.touches_geometry() => "move",
        Effect::Update { .. } => "edit",
        Effect::Create(_) => "create",
        Effect::Delete(_) => "delete",
        _ => "",
    }
}

impl<B: Backend> Editor<B> {
    /// An editor with an empty page. Call [`Editor::reload`] to fetch the
    /// shapes, or use [`Editor::open`].
    pub fn new(backend: Arc<B>, page: PageRef, config: EditorConfig) -> Result<Self, SyncError> {
        let sync = SyncEngine::new(backend, page, &config)?;
        Ok(Self {
            sync,
            interaction: Interaction::new(),
            history: CommandStack::new(config.history_depth),
            view: ViewTransform::new(config.zoom),
            config,
        })
    }

    pub async fn open(backend: Arc<B>, page: PageRef, config: EditorConfig) -> Result<Self, SyncError> {
        let mut editor = Self::new(backend, page, config)?;
        editor.reload().await?;
        Ok(editor)
    }

    /// Fetch the page again. History is dropped; selections keep the ids
    /// that still exist.
    pub async fn reload(&mut self) -> Result<(), SyncError> {
        self.sync.load().await?;
        self.history.clear();
        self.interaction.retain_existing(self.sync.store());
        Ok(())
    }

    // ─── Input ───────────────────────────────────────────────────────────

    /// Process one input event.
    pub fn handle(&mut self, event: &InputEvent) {
        self.sync.pump();
        self.interaction.retain_existing(self.sync.store());
        let effects = {
            let scene = scene(&self.sync, &self.view, &self.config);
            self.interaction.handle(event, &scene)
        };
        self.apply(effects);
    }

    pub fn set_tool(&mut self, tool: ToolKind) {
        let effects = {
            let scene = scene(&self.sync, &self.view, &self.config);
            self.interaction.set_tool(tool, &scene)
        };
        self.apply(effects);
    }

    pub fn set_surface(&mut self, family: ShapeFamily) {
        let effects = {
            let scene = scene(&self.sync, &self.view, &self.config);
            self.interaction.set_surface(family, &scene)
        };
        self.apply(effects);
    }

    fn apply(&mut self, effects: Vec<Effect>) {
        let edits: usize = effects.iter().map(Effect::edit_count).sum();
        let batched = edits > 1;
        if batched && let Some(first) = effects.iter().find(|e| e.edit_count() > 0) {
            self.history.begin_batch(describe(first));
        }

        let mut created = Vec::new();
        for effect in effects {
            let description = describe(&effect);
            match effect {
                Effect::Preview(shape) => {
                    self.sync.preview(shape);
                }
                Effect::Update { id, patch, before } => {
                    self.history
                        .execute(&mut self.sync, Edit::Update { id, patch, before }, description);
                }
                Effect::Create(shape) => {
                    let id = shape.id();
                    if self.history.execute(&mut self.sync, Edit::Create(shape), description) {
                        created.push(id);
                    }
                }
                Effect::Delete(ids) => {
                    for id in ids {
                        self.history.execute(&mut self.sync, Edit::Delete(id), description);
                    }
                }
                Effect::Undo => {
                    self.undo();
                }
                Effect::Redo => {
                    self.redo();
                }
                Effect::ZoomIn => self.view.zoom_in(),
                Effect::ZoomOut => self.view.zoom_out(),
                Effect::ZoomReset => self.view.reset_zoom(),
            }
        }

        if batched {
            self.history.end_batch();
        }
        // A freshly drawn shape comes up selected.
        if let [id] = created[..]
            && let Some(family) = self.sync.store().get(id).map(Shape::family)
        {
            self.interaction.select(family, [id]);
        }
        self.interaction.retain_existing(self.sync.store());
    }

    // ─── History ─────────────────────────────────────────────────────────

    /// Undo the last edit. `None` when there is nothing to undo or the
    /// previous undo/redo is still being persisted.
    pub fn undo(&mut self) -> Option<String> {
        self.sync.pump();
        let description = self.history.undo(&mut self.sync);
        self.interaction.retain_existing(self.sync.store());
        description
    }

    pub fn redo(&mut self) -> Option<String> {
        self.sync.pump();
        let description = self.history.redo(&mut self.sync);
        self.interaction.retain_existing(self.sync.store());
        description
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ─── Panel access ────────────────────────────────────────────────────

    /// Apply a partial update from outside the canvas, e.g. a properties
    /// panel. Goes through the same optimistic path as pointer edits.
    pub fn update(&mut self, id: ShapeId, patch: ShapePatch) -> bool {
        let Some(before) = self.sync.store().get(id).cloned() else {
            return false;
        };
        let description = if patch.touches_geometry() { "move" } else { "edit" };
        self.history
            .execute(&mut self.sync, Edit::Update { id, patch, before }, description)
    }

    /// Delete shapes through history. Returns how many were deleted.
    pub fn delete(&mut self, ids: &[ShapeId]) -> usize {
        self.history.begin_batch("delete");
        let deleted = ids
            .iter()
            .filter(|id| self.history.execute(&mut self.sync, Edit::Delete(**id), "delete"))
            .count();
        self.history.end_batch();
        self.interaction.retain_existing(self.sync.store());
        deleted
    }

    /// Drop shapes that were removed behind the editor's back (a bulk
    /// delete by the backend). No requests are made.
    pub fn forget(&mut self, ids: &[ShapeId]) {
        self.sync.forget(ids);
        self.interaction.retain_existing(self.sync.store());
    }

    pub fn select(&mut self, family: ShapeFamily, ids: impl IntoIterator<Item = ShapeId>) {
        let store = self.sync.store();
        self.interaction
            .select(family, ids.into_iter().filter(|id| store.contains(*id)));
    }

    /// Select every region the filter matches. A blank filter selects
    /// nothing. Returns the number of selected regions.
    pub fn select_matching(&mut self, filter: &RegionFilter) -> usize {
        if !filter.is_active() {
            self.interaction.select(ShapeFamily::Region, []);
            return 0;
        }
        let ids: Vec<ShapeId> = self
            .sync
            .store()
            .regions()
            .filter(|r| filter.matches(r))
            .map(|r| r.id)
            .collect();
        let count = ids.len();
        self.interaction.select(ShapeFamily::Region, ids);
        count
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    pub fn selection(&self) -> &Selections {
        self.interaction.selection()
    }

    /// Selected shapes of the active surface.
    pub fn selected(&self) -> Vec<&Shape> {
        let store = self.sync.store();
        self.interaction
            .selection()
            .get(self.interaction.surface())
            .as_slice()
            .iter()
            .filter_map(|id| store.get(*id))
            .collect()
    }

    pub fn shape(&self, id: ShapeId) -> Option<&Shape> {
        self.sync.store().get(id)
    }

    /// Shapes of one family in paint order.
    pub fn shapes(&self, family: ShapeFamily) -> Vec<&Shape> {
        self.sync.store().ordered(family)
    }

    pub fn store(&self) -> &ShapeStore {
        self.sync.store()
    }

    pub fn session(&self) -> SessionKind {
        self.interaction.session()
    }

    pub fn tool(&self) -> ToolKind {
        self.interaction.tool()
    }

    pub fn surface(&self) -> ShapeFamily {
        self.interaction.surface()
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn page(&self) -> &PageRef {
        self.sync.page()
    }

    // ─── View ────────────────────────────────────────────────────────────

    pub fn view(&self) -> &ViewTransform {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut ViewTransform {
        &mut self.view
    }

    /// Set the viewport and page image sizes; the fit scale follows.
    pub fn set_layout(&mut self, viewport: Size, image: Size) {
        self.view.set_viewport(viewport);
        self.view.set_image(image);
    }

    pub fn zoom_in(&mut self) {
        self.view.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.view.zoom_out();
    }

    pub fn reset_zoom(&mut self) {
        self.view.reset_zoom();
    }

    /// Everything the host has to draw, in screen space.
    pub fn display_list(&self) -> DisplayList {
        let scene = scene(&self.sync, &self.view, &self.config);
        let preview = self.interaction.preview(&scene);
        let selection = self.interaction.selection();
        let overlay = Overlay {
            selected_regions: selection.regions.as_slice(),
            selected_drawings: selection.drawings.as_slice(),
            preview: preview.as_ref(),
            polyline: self.interaction.polyline(),
            cursor: self.interaction.cursor(),
            marquee: self.interaction.marquee(),
            editing: self.interaction.editing(),
        };
        let store = self.sync.store();
        paint(
            &self.view,
            store.ordered(ShapeFamily::Region).into_iter(),
            store.ordered(ShapeFamily::Drawing).into_iter(),
            &overlay,
        )
    }

    // ─── Persistence ─────────────────────────────────────────────────────

    /// Apply backend results that have arrived. Never blocks.
    pub fn pump(&mut self) -> usize {
        let applied = self.sync.pump();
        if applied > 0 {
            self.interaction.retain_existing(self.sync.store());
        }
        applied
    }

    /// Wait for every outstanding request.
    pub async fn settle(&mut self) {
        self.sync.settle().await;
        self.interaction.retain_existing(self.sync.store());
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.sync.drain_notices()
    }

    pub fn compose_now(&self) {
        self.sync.compose_now();
    }

    pub fn in_flight(&self) -> usize {
        self.sync.in_flight()
    }

    pub fn sync(&self) -> &SyncEngine<B> {
        &self.sync
    }
}
