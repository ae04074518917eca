//! Shape model for the two overlay families.
//!
//! A page carries **text regions** (translated text boxes, usually produced
//! by OCR) and **drawings** (free-form vector annotations). Both are wrapped
//! by [`Shape`] so that hit testing, dragging and persistence can treat them
//! uniformly, while every geometry operation stays an exhaustive `match`.
//!
//! All coordinates are document-space pixels of the rendered page image.

use crate::id::ShapeId;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Inline storage for polyline vertices; most annotations are short.
pub type PolyPoints = SmallVec<[Point; 8]>;

// ─── Families and limits ─────────────────────────────────────────────────

/// Which selection/persistence family a shape belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeFamily {
    Region,
    Drawing,
}

/// Minimum bounding-box extent for box-shaped geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinSize {
    pub width: f64,
    pub height: f64,
}

impl Default for MinSize {
    fn default() -> Self {
        Self {
            width: 20.0,
            height: 10.0,
        }
    }
}

impl MinSize {
    /// Grow `rect` to at least this size, keeping its top-left corner.
    pub fn clamp(&self, rect: Rect) -> Rect {
        let rect = rect.abs();
        Rect::new(
            rect.x0,
            rect.y0,
            rect.x0 + rect.width().max(self.width),
            rect.y0 + rect.height().max(self.height),
        )
    }
}

// ─── Text regions ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

/// Typography of a text region. Orthogonal to geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct Typography {
    pub font_family: String,
    /// `None` lets the composer pick a size that fits the box.
    pub font_size: Option<u32>,
    pub text_color: String,
    pub text_align: TextAlign,
    /// Degrees, 0..360.
    pub rotation: f64,
    pub line_height: f64,
}

impl Default for Typography {
    fn default() -> Self {
        Self {
            font_family: "Arial".into(),
            font_size: None,
            text_color: "#000000".into(),
            text_align: TextAlign::Center,
            rotation: 0.0,
            line_height: 1.0,
        }
    }
}

/// A translated text box over the page image.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRegion {
    pub id: ShapeId,
    pub page_number: u32,
    /// Always normalized (`x0 <= x1`, `y0 <= y1`).
    pub bbox: Rect,
    /// Recognized source text; never edited by the engine.
    pub src_text: String,
    pub tgt_text: Option<String>,
    pub confidence: f64,
    pub locked: bool,
    pub needs_review: bool,
    pub compose_mode: String,
    /// Higher draws on top.
    pub render_order: i32,
    pub typography: Typography,
    /// `None` means the background is estimated when composing.
    pub bg_color: Option<String>,
    pub is_manual: bool,
}

impl TextRegion {
    /// A user-created region with empty text.
    pub fn manual(id: ShapeId, page_number: u32, bbox: Rect) -> Self {
        Self {
            id,
            page_number,
            bbox: bbox.abs(),
            src_text: String::new(),
            tgt_text: Some(String::new()),
            confidence: 1.0,
            locked: false,
            needs_review: false,
            compose_mode: "patch".into(),
            render_order: 0,
            typography: Typography::default(),
            bg_color: None,
            is_manual: true,
        }
    }

    /// Text shown in the editor: the translation, or the source when there
    /// is no translation yet.
    pub fn display_text(&self) -> &str {
        self.tgt_text.as_deref().unwrap_or(&self.src_text)
    }
}

// ─── Drawings ────────────────────────────────────────────────────────────

/// Stroke and fill of a drawing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawStyle {
    pub stroke_color: String,
    pub stroke_width: u32,
    pub fill_color: Option<String>,
}

impl Default for DrawStyle {
    fn default() -> Self {
        Self {
            stroke_color: "#000000".into(),
            stroke_width: 2,
            fill_color: None,
        }
    }
}

/// Font of a text annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationFont {
    pub font_size: u32,
    pub font_family: String,
    pub text_color: String,
}

impl Default for AnnotationFont {
    fn default() -> Self {
        Self {
            font_size: 14,
            font_family: "Arial".into(),
            text_color: "#000000".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawingKind {
    Line { from: Point, to: Point },
    Rect { bounds: Rect },
    /// An ellipse inscribed in `bounds`.
    Circle { bounds: Rect },
    /// At least two vertices.
    Polyline { points: PolyPoints },
    Text {
        anchor: Point,
        text: String,
        font: AnnotationFont,
    },
    /// `data` is an embedded base64 raster; opaque to the engine.
    Image { bounds: Rect, data: Option<String> },
}

impl DrawingKind {
    /// The backend's `element_type` tag.
    pub fn tag(&self) -> &'static str {
        match self {
            DrawingKind::Line { .. } => "line",
            DrawingKind::Rect { .. } => "rect",
            DrawingKind::Circle { .. } => "circle",
            DrawingKind::Polyline { .. } => "polyline",
            DrawingKind::Text { .. } => "text",
            DrawingKind::Image { .. } => "image",
        }
    }

    pub fn is_finite(&self) -> bool {
        match self {
            DrawingKind::Line { from, to } => from.is_finite() && to.is_finite(),
            DrawingKind::Rect { bounds }
            | DrawingKind::Circle { bounds }
            | DrawingKind::Image { bounds, .. } => bounds.is_finite(),
            DrawingKind::Polyline { points } => points.iter().all(|p| p.is_finite()),
            DrawingKind::Text { anchor, .. } => anchor.is_finite(),
        }
    }

    /// Box-shaped kinds obey the minimum-size clamp.
    pub fn is_boxed(&self) -> bool {
        matches!(
            self,
            DrawingKind::Rect { .. } | DrawingKind::Circle { .. } | DrawingKind::Image { .. }
        )
    }
}

/// A vector annotation. Z-order is creation order on the page.
#[derive(Debug, Clone, PartialEq)]
pub struct Drawing {
    pub id: ShapeId,
    pub page_number: u32,
    pub kind: DrawingKind,
    pub style: DrawStyle,
    pub locked: bool,
}

impl Drawing {
    pub fn bounds(&self) -> Rect {
        drawing_bounds(&self.kind)
    }

    pub fn new(id: ShapeId, page_number: u32, kind: DrawingKind, style: DrawStyle) -> Self {
        Self {
            id,
            page_number,
            kind,
            style,
            locked: false,
        }
    }
}

// ─── Shape ───────────────────────────────────────────────────────────────

/// Any overlay shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Region(TextRegion),
    Drawing(Drawing),
}

impl Shape {
    pub fn id(&self) -> ShapeId {
        match self {
            Shape::Region(r) => r.id,
            Shape::Drawing(d) => d.id,
        }
    }

    pub fn family(&self) -> ShapeFamily {
        match self {
            Shape::Region(_) => ShapeFamily::Region,
            Shape::Drawing(_) => ShapeFamily::Drawing,
        }
    }

    pub fn is_locked(&self) -> bool {
        match self {
            Shape::Region(r) => r.locked,
            Shape::Drawing(d) => d.locked,
        }
    }

    pub fn as_region(&self) -> Option<&TextRegion> {
        match self {
            Shape::Region(r) => Some(r),
            Shape::Drawing(_) => None,
        }
    }

    pub fn as_drawing(&self) -> Option<&Drawing> {
        match self {
            Shape::Drawing(d) => Some(d),
            Shape::Region(_) => None,
        }
    }

    /// Axis-aligned bounds used for marquee intersection and handles.
    pub fn bounds(&self) -> Rect {
        match self {
            Shape::Region(r) => r.bbox,
            Shape::Drawing(d) => d.bounds(),
        }
    }

    /// Pure translation: every geometry point shifted by `delta`.
    pub fn translated(&self, delta: Vec2) -> Shape {
        let mut shape = self.clone();
        match &mut shape {
            Shape::Region(r) => r.bbox = r.bbox + delta,
            Shape::Drawing(d) => match &mut d.kind {
                DrawingKind::Line { from, to } => {
                    *from += delta;
                    *to += delta;
                }
                DrawingKind::Rect { bounds }
                | DrawingKind::Circle { bounds }
                | DrawingKind::Image { bounds, .. } => *bounds = *bounds + delta,
                DrawingKind::Polyline { points } => {
                    for p in points.iter_mut() {
                        *p += delta;
                    }
                }
                DrawingKind::Text { anchor, .. } => *anchor += delta,
            },
        }
        shape
    }

    /// Editable text, if the shape carries any.
    pub fn text(&self) -> Option<&str> {
        match self {
            Shape::Region(r) => Some(r.display_text()),
            Shape::Drawing(Drawing {
                kind: DrawingKind::Text { text, .. },
                ..
            }) => Some(text),
            Shape::Drawing(_) => None,
        }
    }

    /// Every coordinate is finite. Anything else must never be persisted.
    pub fn is_finite(&self) -> bool {
        match self {
            Shape::Region(r) => r.bbox.is_finite(),
            Shape::Drawing(d) => d.kind.is_finite(),
        }
    }

    /// Restore the box invariant after a direct edit and, for regions,
    /// grow to the minimum size.
    pub fn normalized(mut self, region_min: MinSize) -> Shape {
        match &mut self {
            Shape::Region(r) => r.bbox = region_min.clamp(r.bbox),
            Shape::Drawing(d) => match &mut d.kind {
                DrawingKind::Rect { bounds }
                | DrawingKind::Circle { bounds }
                | DrawingKind::Image { bounds, .. } => *bounds = bounds.abs(),
                DrawingKind::Line { .. }
                | DrawingKind::Polyline { .. }
                | DrawingKind::Text { .. } => {}
            },
        }
        self
    }
}

/// Approximate text extent: 0.6em per character, 1.2em per line.
fn text_extent(text: &str, font_size: u32) -> Vec2 {
    let size = f64::from(font_size.max(1));
    let lines = text.lines().count().max(1);
    let longest = text.lines().map(|l| l.chars().count()).max().unwrap_or(0).max(1);
    Vec2::new(longest as f64 * size * 0.6, lines as f64 * size * 1.2)
}

fn drawing_bounds(kind: &DrawingKind) -> Rect {
    match kind {
        DrawingKind::Line { from, to } => Rect::from_points(*from, *to),
        DrawingKind::Rect { bounds }
        | DrawingKind::Circle { bounds }
        | DrawingKind::Image { bounds, .. } => bounds.abs(),
        DrawingKind::Polyline { points } => points_bounds(points),
        DrawingKind::Text { anchor, text, font } => {
            let extent = text_extent(text, font.font_size);
            Rect::from_origin_size(*anchor, (extent.x, extent.y))
        }
    }
}

/// Bounding box of a point list. Empty lists give a zero rect.
pub fn points_bounds(points: &[Point]) -> Rect {
    let mut iter = points.iter();
    let Some(first) = iter.next() else {
        return Rect::ZERO;
    };
    iter.fold(Rect::from_points(*first, *first), |acc, p| acc.union_pt(*p))
}
