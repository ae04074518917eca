//! Undo/Redo command stack.
//!
//! Every persisted edit is wrapped in a reversible `Command`. Undo pops a
//! command and replays its inverse through the synchronizer, so undone
//! edits are persisted like any other.
//!
//! Gestures that touch several shapes at once (a multi-selection drag, a
//! delete of three shapes) are grouped with `begin_batch`/`end_batch` and
//! undo as one step.
//!
//! Undo and redo refuse to run while the requests of the previous undo or
//! redo are still in flight.

use crate::backend::Backend;
use crate::sync::{SyncEngine, Ticket};
use ov_core::id::ShapeId;
use ov_core::model::Shape;
use ov_core::patch::ShapePatch;

/// An edit to execute and record.
#[derive(Debug, Clone, PartialEq)]
pub enum Edit {
    /// `before` is the shape as it was when the gesture started.
    Update {
        id: ShapeId,
        patch: ShapePatch,
        before: Shape,
    },
    Create(Shape),
    Delete(ShapeId),
}

/// A recorded, reversible edit.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Update {
        id: ShapeId,
        forward: ShapePatch,
        inverse: ShapePatch,
    },
    /// Undo deletes the shape; redo creates it again under the same local id.
    Create { shape: Shape },
    /// Undo recreates the shape at `index`; redo deletes it again.
    Delete { shape: Shape, index: usize },
    Batch(Vec<Command>),
}

#[derive(Debug, Clone)]
struct Recorded {
    command: Command,
    description: String,
}

/// Manages undo/redo stacks with batch grouping.
pub struct CommandStack {
    undo_stack: Vec<Recorded>,
    redo_stack: Vec<Recorded>,
    /// Maximum undo depth.
    max_depth: usize,
    /// Batch nesting depth (0 = not batching).
    batch_depth: usize,
    batch: Vec<Command>,
    batch_description: String,
    /// Requests issued by the last undo or redo.
    pending: Vec<Ticket>,
}

impl CommandStack {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: Vec::with_capacity(max_depth.min(256)),
            redo_stack: Vec::new(),
            max_depth: max_depth.max(1),
            batch_depth: 0,
            batch: Vec::new(),
            batch_description: String::new(),
            pending: Vec::new(),
        }
    }

    /// Start a batch group. Everything executed until the matching
    /// `end_batch()` undoes as one step.
    pub fn begin_batch(&mut self, description: &str) {
        if self.batch_depth == 0 {
            self.batch.clear();
            self.batch_description = description.to_string();
        }
        self.batch_depth += 1;
    }

    /// End a batch group. When the outermost batch closes, push whatever
    /// it collected.
    pub fn end_batch(&mut self) {
        if self.batch_depth == 0 {
            return;
        }
        self.batch_depth -= 1;
        if self.batch_depth == 0 {
            let mut commands = std::mem::take(&mut self.batch);
            let description = std::mem::take(&mut self.batch_description);
            match commands.len() {
                0 => {}
                1 => {
                    if let Some(command) = commands.pop() {
                        self.push(command, description);
                    }
                }
                _ => self.push(Command::Batch(commands), description),
            }
        }
    }

    /// Execute an edit via the synchronizer and record it.
    ///
    /// Returns `false` when the synchronizer rejected the edit; nothing is
    /// recorded then.
    pub fn execute<B: Backend>(&mut self, engine: &mut SyncEngine<B>, edit: Edit, description: &str) -> bool {
        let command = match edit {
            Edit::Update { id, patch, before } => {
                let inverse = match patch.capture(&before) {
                    Ok(inverse) => inverse,
                    Err(error) => {
                        log::warn!("cannot record {description} on {id}: {error}");
                        return false;
                    }
                };
                if engine.commit(id, &patch).is_none() {
                    return false;
                }
                Command::Update {
                    id,
                    forward: patch,
                    inverse,
                }
            }
            Edit::Create(shape) => {
                if engine.create(shape.clone()).is_none() {
                    return false;
                }
                // Keep what the store actually holds (normalized).
                let shape = engine.store().get(shape.id()).cloned().unwrap_or(shape);
                Command::Create { shape }
            }
            Edit::Delete(id) => match engine.delete(id) {
                Some((_, removed)) => Command::Delete {
                    shape: removed.shape,
                    index: removed.index,
                },
                None => return false,
            },
        };

        if self.batch_depth > 0 {
            self.batch.push(command);
        } else {
            self.push(command, description.to_string());
        }
        true
    }

    fn push(&mut self, command: Command, description: String) {
        self.undo_stack.push(Recorded {
            command,
            description,
        });
        if self.undo_stack.len() > self.max_depth {
            self.undo_stack.remove(0);
        }
        // Clear redo stack on new action
        self.redo_stack.clear();
    }

    /// Whether the previous undo or redo is still being persisted.
    pub fn is_busy<B: Backend>(&self, engine: &SyncEngine<B>) -> bool {
        self.pending.iter().any(|t| !engine.is_settled(*t))
    }

    /// Undo the last command (or batch).
    pub fn undo<B: Backend>(&mut self, engine: &mut SyncEngine<B>) -> Option<String> {
        if self.is_busy(engine) {
            log::debug!("undo ignored: previous undo/redo still in flight");
            return None;
        }
        let mut recorded = self.undo_stack.pop()?;
        let mut tickets = Vec::new();
        revert(&mut recorded.command, engine, &mut tickets);
        self.pending = tickets;
        let description = recorded.description.clone();
        self.redo_stack.push(recorded);
        Some(description)
    }

    /// Redo the last undone command (or batch).
    pub fn redo<B: Backend>(&mut self, engine: &mut SyncEngine<B>) -> Option<String> {
        if self.is_busy(engine) {
            log::debug!("redo ignored: previous undo/redo still in flight");
            return None;
        }
        let mut recorded = self.redo_stack.pop()?;
        let mut tickets = Vec::new();
        replay(&mut recorded.command, engine, &mut tickets);
        self.pending = tickets;
        let description = recorded.description.clone();
        self.undo_stack.push(recorded);
        Some(description)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.batch.clear();
        self.batch_depth = 0;
        self.pending.clear();
    }
}

/// Apply the inverse of `command`. Snapshots are refreshed from the store
/// so that a later redo restores what was actually there.
fn revert<B: Backend>(command: &mut Command, engine: &mut SyncEngine<B>, tickets: &mut Vec<Ticket>) {
    match command {
        Command::Update { id, inverse, .. } => tickets.extend(engine.commit(*id, inverse)),
        Command::Create { shape } => {
            if let Some(current) = engine.store().get(shape.id()) {
                *shape = current.clone();
            }
            if let Some((ticket, _)) = engine.delete(shape.id()) {
                tickets.push(ticket);
            }
        }
        Command::Delete { shape, index } => {
            tickets.extend(engine.create_at(shape.clone(), Some(*index)));
        }
        Command::Batch(commands) => {
            for command in commands.iter_mut().rev() {
                revert(command, engine, tickets);
            }
        }
    }
}

fn replay<B: Backend>(command: &mut Command, engine: &mut SyncEngine<B>, tickets: &mut Vec<Ticket>) {
    match command {
        Command::Update { id, forward, .. } => tickets.extend(engine.commit(*id, forward)),
        Command::Create { shape } => tickets.extend(engine.create(shape.clone())),
        Command::Delete { shape, index } => {
            if let Some(current) = engine.store().get(shape.id()) {
                *shape = current.clone();
            }
            if let Some((ticket, removed)) = engine.delete(shape.id()) {
                *index = removed.index;
                tickets.push(ticket);
            }
        }
        Command::Batch(commands) => {
            for command in commands.iter_mut() {
                replay(command, engine, tickets);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::PageRef;
    use crate::config::EditorConfig;
    use crate::memory::{MemoryBackend, Op};
    use kurbo::{Rect, Vec2};
    use ov_core::model::{DrawStyle, Drawing, DrawingKind};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn setup() -> (MemoryBackend, SyncEngine<MemoryBackend>) {
        let backend = MemoryBackend::new();
        let engine = SyncEngine::new(
            Arc::new(backend.clone()),
            PageRef::new("cmd", 1),
            &EditorConfig::default(),
        )
        .unwrap();
        (backend, engine)
    }

    fn rect() -> Shape {
        Shape::Drawing(Drawing::new(
            ShapeId::local(),
            1,
            DrawingKind::Rect {
                bounds: Rect::new(0.0, 0.0, 40.0, 40.0),
            },
            DrawStyle::default(),
        ))
    }

    fn moved(shape: &Shape, dx: f64) -> Edit {
        let after = shape.translated(Vec2::new(dx, 0.0));
        Edit::Update {
            id: shape.id(),
            patch: ShapePatch::diff(shape, &after).unwrap(),
            before: shape.clone(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn undo_redo_move() {
        let (_backend, mut engine) = setup();
        let mut stack = CommandStack::new(100);
        let shape = rect();
        let id = shape.id();
        stack.execute(&mut engine, Edit::Create(shape.clone()), "create");
        stack.execute(&mut engine, moved(&shape, 30.0), "move");
        engine.settle().await;

        assert_eq!(stack.undo(&mut engine).as_deref(), Some("move"));
        assert_eq!(engine.store().get(id).unwrap().bounds().x0, 0.0);
        engine.settle().await;
        assert_eq!(stack.redo(&mut engine).as_deref(), Some("move"));
        assert_eq!(engine.store().get(id).unwrap().bounds().x0, 30.0);
    }

    #[tokio::test(start_paused = true)]
    async fn batch_undoes_as_one_step() {
        let (_backend, mut engine) = setup();
        let mut stack = CommandStack::new(100);
        let (a, b) = (rect(), rect());
        stack.execute(&mut engine, Edit::Create(a.clone()), "create");
        stack.execute(&mut engine, Edit::Create(b.clone()), "create");
        engine.settle().await;

        stack.begin_batch("move selection");
        stack.execute(&mut engine, moved(&a, 10.0), "move");
        stack.execute(&mut engine, moved(&b, 10.0), "move");
        stack.end_batch();
        engine.settle().await;

        assert_eq!(stack.undo(&mut engine).as_deref(), Some("move selection"));
        assert_eq!(engine.store().get(a.id()).unwrap().bounds().x0, 0.0);
        assert_eq!(engine.store().get(b.id()).unwrap().bounds().x0, 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn undo_refused_while_previous_undo_in_flight() {
        let (backend, mut engine) = setup();
        let mut stack = CommandStack::new(100);
        let shape = rect();
        stack.execute(&mut engine, Edit::Create(shape.clone()), "create");
        stack.execute(&mut engine, moved(&shape, 5.0), "move");
        stack.execute(&mut engine, moved(&shape.translated(Vec2::new(5.0, 0.0)), 5.0), "move");
        engine.settle().await;

        assert!(stack.undo(&mut engine).is_some());
        assert!(stack.is_busy(&engine));
        assert!(stack.undo(&mut engine).is_none());
        engine.settle().await;
        assert!(stack.undo(&mut engine).is_some());
        engine.settle().await;
        assert_eq!(backend.calls(Op::UpdateDrawing), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn depth_is_bounded() {
        let (_backend, mut engine) = setup();
        let mut stack = CommandStack::new(2);
        for _ in 0..3 {
            stack.execute(&mut engine, Edit::Create(rect()), "create");
        }
        engine.settle().await;
        assert!(stack.undo(&mut engine).is_some());
        engine.settle().await;
        assert!(stack.undo(&mut engine).is_some());
        engine.settle().await;
        assert!(!stack.can_undo());
    }
}
