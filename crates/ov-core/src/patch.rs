//! Partial updates.
//!
//! A patch names only the fields that change. Applying a patch is the one
//! way the synchronizer mutates a stored shape, and `capture` records the
//! values a patch is about to overwrite so that the same mechanism builds
//! undo inverses and rollback snapshots.
//!
//! Nullable fields use `Option<Option<T>>`: the outer `None` means
//! "unchanged", `Some(None)` means "clear".

use crate::error::ModelError;
use crate::model::{Drawing, DrawingKind, Shape, ShapeFamily, TextAlign, TextRegion};
use kurbo::Rect;

fn set<T: Clone>(patch: &Option<T>, target: &mut T) {
    if let Some(value) = patch {
        *target = value.clone();
    }
}

fn keep<T: Clone>(patch: &Option<T>, current: &T) -> Option<T> {
    patch.as_ref().map(|_| current.clone())
}

fn changed<T: Clone + PartialEq>(before: &T, after: &T) -> Option<T> {
    (before != after).then(|| after.clone())
}

// ─── Regions ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegionPatch {
    pub bbox: Option<Rect>,
    pub tgt_text: Option<Option<String>>,
    pub locked: Option<bool>,
    pub needs_review: Option<bool>,
    pub compose_mode: Option<String>,
    pub render_order: Option<i32>,
    pub font_family: Option<String>,
    pub font_size: Option<Option<u32>>,
    pub text_color: Option<String>,
    pub text_align: Option<TextAlign>,
    pub rotation: Option<f64>,
    pub line_height: Option<f64>,
    pub bg_color: Option<Option<String>>,
}

impl RegionPatch {
    pub fn apply(&self, r: &mut TextRegion) {
        set(&self.bbox, &mut r.bbox);
        set(&self.tgt_text, &mut r.tgt_text);
        set(&self.locked, &mut r.locked);
        set(&self.needs_review, &mut r.needs_review);
        set(&self.compose_mode, &mut r.compose_mode);
        set(&self.render_order, &mut r.render_order);
        set(&self.font_family, &mut r.typography.font_family);
        set(&self.font_size, &mut r.typography.font_size);
        set(&self.text_color, &mut r.typography.text_color);
        set(&self.text_align, &mut r.typography.text_align);
        set(&self.rotation, &mut r.typography.rotation);
        set(&self.line_height, &mut r.typography.line_height);
        set(&self.bg_color, &mut r.bg_color);
    }

    pub fn capture(&self, r: &TextRegion) -> RegionPatch {
        RegionPatch {
            bbox: keep(&self.bbox, &r.bbox),
            tgt_text: keep(&self.tgt_text, &r.tgt_text),
            locked: keep(&self.locked, &r.locked),
            needs_review: keep(&self.needs_review, &r.needs_review),
            compose_mode: keep(&self.compose_mode, &r.compose_mode),
            render_order: keep(&self.render_order, &r.render_order),
            font_family: keep(&self.font_family, &r.typography.font_family),
            font_size: keep(&self.font_size, &r.typography.font_size),
            text_color: keep(&self.text_color, &r.typography.text_color),
            text_align: keep(&self.text_align, &r.typography.text_align),
            rotation: keep(&self.rotation, &r.typography.rotation),
            line_height: keep(&self.line_height, &r.typography.line_height),
            bg_color: keep(&self.bg_color, &r.bg_color),
        }
    }

    pub fn diff(a: &TextRegion, b: &TextRegion) -> RegionPatch {
        RegionPatch {
            bbox: changed(&a.bbox, &b.bbox),
            tgt_text: changed(&a.tgt_text, &b.tgt_text),
            locked: changed(&a.locked, &b.locked),
            needs_review: changed(&a.needs_review, &b.needs_review),
            compose_mode: changed(&a.compose_mode, &b.compose_mode),
            render_order: changed(&a.render_order, &b.render_order),
            font_family: changed(&a.typography.font_family, &b.typography.font_family),
            font_size: changed(&a.typography.font_size, &b.typography.font_size),
            text_color: changed(&a.typography.text_color, &b.typography.text_color),
            text_align: changed(&a.typography.text_align, &b.typography.text_align),
            rotation: changed(&a.typography.rotation, &b.typography.rotation),
            line_height: changed(&a.typography.line_height, &b.typography.line_height),
            bg_color: changed(&a.bg_color, &b.bg_color),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == RegionPatch::default()
    }

    fn is_finite(&self) -> bool {
        self.bbox.is_none_or(|b| b.is_finite())
            && self.rotation.is_none_or(f64::is_finite)
            && self.line_height.is_none_or(f64::is_finite)
    }
}

// ─── Drawings ────────────────────────────────────────────────────────────

/// Drawing geometry (and annotation text) travel together as `kind`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawingPatch {
    pub kind: Option<DrawingKind>,
    pub stroke_color: Option<String>,
    pub stroke_width: Option<u32>,
    pub fill_color: Option<Option<String>>,
    pub locked: Option<bool>,
}

impl DrawingPatch {
    pub fn apply(&self, d: &mut Drawing) {
        set(&self.kind, &mut d.kind);
        set(&self.stroke_color, &mut d.style.stroke_color);
        set(&self.stroke_width, &mut d.style.stroke_width);
        set(&self.fill_color, &mut d.style.fill_color);
        set(&self.locked, &mut d.locked);
    }

    pub fn capture(&self, d: &Drawing) -> DrawingPatch {
        DrawingPatch {
            kind: keep(&self.kind, &d.kind),
            stroke_color: keep(&self.stroke_color, &d.style.stroke_color),
            stroke_width: keep(&self.stroke_width, &d.style.stroke_width),
            fill_color: keep(&self.fill_color, &d.style.fill_color),
            locked: keep(&self.locked, &d.locked),
        }
    }

    pub fn diff(a: &Drawing, b: &Drawing) -> DrawingPatch {
        DrawingPatch {
            kind: changed(&a.kind, &b.kind),
            stroke_color: changed(&a.style.stroke_color, &b.style.stroke_color),
            stroke_width: changed(&a.style.stroke_width, &b.style.stroke_width),
            fill_color: changed(&a.style.fill_color, &b.style.fill_color),
            locked: changed(&a.locked, &b.locked),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == DrawingPatch::default()
    }
}

// ─── Either family ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum ShapePatch {
    Region(RegionPatch),
    Drawing(DrawingPatch),
}

impl ShapePatch {
    pub fn family(&self) -> ShapeFamily {
        match self {
            ShapePatch::Region(_) => ShapeFamily::Region,
            ShapePatch::Drawing(_) => ShapeFamily::Drawing,
        }
    }

    /// Fields that differ between two versions of the same shape. `None`
    /// when the shapes belong to different families.
    pub fn diff(before: &Shape, after: &Shape) -> Option<ShapePatch> {
        match (before, after) {
            (Shape::Region(a), Shape::Region(b)) => Some(ShapePatch::Region(RegionPatch::diff(a, b))),
            (Shape::Drawing(a), Shape::Drawing(b)) => {
                Some(ShapePatch::Drawing(DrawingPatch::diff(a, b)))
            }
            _ => None,
        }
    }

    /// Replace the editable text of a region or a text annotation.
    pub fn text(shape: &Shape, text: &str) -> Option<ShapePatch> {
        match shape {
            Shape::Region(_) => Some(ShapePatch::Region(RegionPatch {
                tgt_text: Some(Some(text.to_string())),
                ..RegionPatch::default()
            })),
            Shape::Drawing(d) => match &d.kind {
                DrawingKind::Text { anchor, font, .. } => Some(ShapePatch::Drawing(DrawingPatch {
                    kind: Some(DrawingKind::Text {
                        anchor: *anchor,
                        text: text.to_string(),
                        font: font.clone(),
                    }),
                    ..DrawingPatch::default()
                })),
                _ => None,
            },
        }
    }

    pub fn apply(&self, shape: &mut Shape) -> Result<(), ModelError> {
        match (self, shape) {
            (ShapePatch::Region(p), Shape::Region(r)) => p.apply(r),
            (ShapePatch::Drawing(p), Shape::Drawing(d)) => p.apply(d),
            (patch, shape) => {
                return Err(ModelError::FamilyMismatch {
                    patch: patch.family(),
                    shape: shape.family(),
                });
            }
        }
        Ok(())
    }

    /// The current values of every field this patch would overwrite.
    pub fn capture(&self, shape: &Shape) -> Result<ShapePatch, ModelError> {
        match (self, shape) {
            (ShapePatch::Region(p), Shape::Region(r)) => Ok(ShapePatch::Region(p.capture(r))),
            (ShapePatch::Drawing(p), Shape::Drawing(d)) => Ok(ShapePatch::Drawing(p.capture(d))),
            (patch, shape) => Err(ModelError::FamilyMismatch {
                patch: patch.family(),
                shape: shape.family(),
            }),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            ShapePatch::Region(p) => p.is_empty(),
            ShapePatch::Drawing(p) => p.is_empty(),
        }
    }

    /// Whether the patch touches geometry (as opposed to text or style).
    pub fn touches_geometry(&self) -> bool {
        match self {
            ShapePatch::Region(p) => p.bbox.is_some(),
            ShapePatch::Drawing(p) => p.kind.is_some(),
        }
    }

    /// No NaN or infinite coordinate anywhere in the patch.
    pub fn is_finite(&self) -> bool {
        match self {
            ShapePatch::Region(p) => p.is_finite(),
            ShapePatch::Drawing(p) => p.kind.as_ref().is_none_or(DrawingKind::is_finite),
        }
    }
}
