//! Editor tuning knobs.
//!
//! Every field has a default, so a host can deserialize a partial JSON
//! object (or nothing at all) and override only what it cares about.

use kurbo::Size;
use ov_core::model::{AnnotationFont, DrawStyle, MinSize};
use ov_core::resize::ResizeLimits;
use ov_core::view::ZoomRange;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub region_min: MinSize,
    pub drawing_min: MinSize,
    /// Grip pick radius, screen pixels.
    pub handle_radius_px: f64,
    /// Extra reach for hitting thin lines, screen pixels.
    pub hit_tolerance_px: f64,
    /// Drags shorter than this (document units) are treated as clicks.
    pub move_epsilon: f64,
    pub nudge_step: f64,
    pub nudge_step_large: f64,
    /// Size of a text box placed with a single click.
    pub text_box_size: Size,
    pub zoom: ZoomRange,
    /// Quiet period after the last persisted edit before the page is
    /// recomposed.
    pub compose_delay_ms: u64,
    pub auto_compose: bool,
    pub request_timeout_ms: u64,
    pub history_depth: usize,
    pub draw_style: DrawStyle,
    pub annotation_font: AnnotationFont,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            region_min: MinSize::default(),
            drawing_min: MinSize::default(),
            handle_radius_px: 6.0,
            hit_tolerance_px: 4.0,
            move_epsilon: 0.5,
            nudge_step: 1.0,
            nudge_step_large: 10.0,
            text_box_size: Size::new(150.0, 30.0),
            zoom: ZoomRange::default(),
            compose_delay_ms: 1500,
            auto_compose: true,
            request_timeout_ms: 60_000,
            history_depth: 100,
            draw_style: DrawStyle::default(),
            annotation_font: AnnotationFont::default(),
        }
    }
}

impl EditorConfig {
    pub fn limits(&self) -> ResizeLimits {
        ResizeLimits {
            region: self.region_min,
            drawing: self.drawing_min,
        }
    }

    pub fn compose_delay(&self) -> Duration {
        Duration::from_millis(self.compose_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
