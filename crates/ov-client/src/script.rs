//! Replay scripts: a page, an optional seed and a list of steps to drive
//! an [`Editor`] through.
//!
//! ```json
//! {
//!   "page": { "project_id": "demo", "page_number": 0 },
//!   "image": { "width": 2480, "height": 3508 },
//!   "viewport": { "width": 1200, "height": 900 },
//!   "steps": [
//!     { "step": "tool", "tool": "rect" },
//!     { "step": "input", "event": { "type": "pointer_down", "x": 50, "y": 400 } },
//!     { "step": "input", "event": { "type": "pointer_up", "x": 150, "y": 460 } },
//!     { "step": "settle" }
//!   ]
//! }
//! ```

use kurbo::Size;
use ov_core::model::ShapeFamily;
use ov_core::wire::{DrawingRecord, TextRegionRecord};
use ov_editor::backend::{Backend, PageRef};
use ov_editor::memory::MemoryBackend;
use ov_editor::sync::Notice;
use ov_editor::tools::ToolKind;
use ov_editor::{Editor, EditorConfig, InputEvent};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("cannot read script: {0}")]
    Read(#[from] std::io::Error),

    #[error("invalid script: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Script {
    pub page: PageRef,
    #[serde(default)]
    pub image: Option<Size>,
    #[serde(default)]
    pub viewport: Option<Size>,
    #[serde(default)]
    pub config: EditorConfig,
    /// Records preloaded into the in-memory backend in offline mode.
    #[serde(default)]
    pub seed: Seed,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Seed {
    #[serde(default)]
    pub regions: Vec<TextRegionRecord>,
    #[serde(default)]
    pub drawings: Vec<DrawingRecord>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Step {
    Input { event: InputEvent },
    Tool { tool: ToolKind },
    Surface { family: ShapeFamily },
    Undo,
    Redo,
    /// Wait for every outstanding request.
    Settle,
    WaitMs { ms: u64 },
    ComposeNow,
}

impl Script {
    pub fn parse(text: &str) -> Result<Self, ScriptError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: &std::path::Path) -> Result<Self, ScriptError> {
        Self::parse(&std::fs::read_to_string(path)?)
    }

    /// An in-memory backend holding the seed records.
    pub fn offline_backend(&self) -> MemoryBackend {
        let backend = MemoryBackend::new();
        for record in &self.seed.regions {
            backend.seed_region(&self.page, record.clone());
        }
        for record in &self.seed.drawings {
            backend.seed_drawing(&self.page, record.clone());
        }
        backend
    }
}

/// What happened during a replay.
#[derive(Debug, Default)]
pub struct Report {
    pub notices: Vec<Notice>,
    pub regions: usize,
    pub drawings: usize,
}

impl Report {
    pub fn errors(&self) -> usize {
        self.notices.iter().filter(|n| n.is_error()).count()
    }
}

/// Apply the script's layout and run its steps, then settle.
pub async fn replay<B: Backend>(editor: &mut Editor<B>, script: &Script) -> Report {
    if let (Some(viewport), Some(image)) = (script.viewport, script.image) {
        editor.set_layout(viewport, image);
    }
    let mut report = Report::default();
    for (index, step) in script.steps.iter().enumerate() {
        log::debug!("step {index}: {step:?}");
        match step {
            Step::Input { event } => editor.handle(event),
            Step::Tool { tool } => editor.set_tool(*tool),
            Step::Surface { family } => editor.set_surface(*family),
            Step::Undo => {
                if editor.undo().is_none() {
                    log::info!("step {index}: nothing to undo");
                }
            }
            Step::Redo => {
                if editor.redo().is_none() {
                    log::info!("step {index}: nothing to redo");
                }
            }
            Step::Settle => editor.settle().await,
            Step::WaitMs { ms } => {
                tokio::time::sleep(Duration::from_millis(*ms)).await;
                editor.pump();
            }
            Step::ComposeNow => editor.compose_now(),
        }
        report.notices.extend(editor.drain_notices());
    }
    editor.settle().await;
    report.notices.extend(editor.drain_notices());
    report.regions = editor.shapes(ShapeFamily::Region).len();
    report.drawings = editor.shapes(ShapeFamily::Drawing).len();
    report
}
