//! Backend JSON records and their conversion to the typed model.
//!
//! The REST collaborator stores boxes as `[x1, y1, x2, y2]` arrays and
//! drawings as an `element_type` tag plus a flat `points` list. Records are
//! lenient on input (missing fields take the backend's defaults) and
//! conversion into the model is strict: unknown kinds, wrong arity and
//! non-finite numbers are rejected.
//!
//! Update bodies carry only changed fields; see [`RegionUpdate`] and
//! [`DrawingUpdate`].

use crate::error::ModelError;
use crate::id::ShapeId;
use crate::model::{
    AnnotationFont, DrawStyle, Drawing, DrawingKind, TextAlign, TextRegion, Typography,
};
use crate::patch::{DrawingPatch, RegionPatch};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

fn default_compose_mode() -> String {
    "patch".into()
}

fn default_font_family() -> String {
    "Arial".into()
}

fn default_color() -> String {
    "#000000".into()
}

fn default_line_height() -> f64 {
    1.0
}

fn default_stroke_width() -> u32 {
    2
}

fn default_font_size() -> u32 {
    14
}

fn is_false(v: &bool) -> bool {
    !*v
}

fn rect_to_array(r: Rect) -> [f64; 4] {
    [r.x0, r.y0, r.x1, r.y1]
}

fn bbox_from_slice(values: &[f64]) -> Result<Rect, ModelError> {
    let [x0, y0, x1, y1] = values else {
        return Err(ModelError::BadBbox(values.len()));
    };
    if !values.iter().all(|v| v.is_finite()) {
        return Err(ModelError::NonFinite("bbox"));
    }
    Ok(Rect::new(*x0, *y0, *x1, *y1).abs())
}

// ─── Text regions ────────────────────────────────────────────────────────

/// A text region as the backend returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRegionRecord {
    pub id: String,
    #[serde(default)]
    pub page_number: u32,
    pub bbox: Vec<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bbox_normalized: Vec<f64>,
    #[serde(default)]
    pub src_text: String,
    #[serde(default)]
    pub tgt_text: Option<String>,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub needs_review: bool,
    #[serde(default = "default_compose_mode")]
    pub compose_mode: String,
    #[serde(default)]
    pub font_size: Option<u32>,
    #[serde(default)]
    pub render_order: i32,
    #[serde(default = "default_font_family")]
    pub font_family: String,
    #[serde(default = "default_color")]
    pub text_color: String,
    #[serde(default)]
    pub bg_color: Option<String>,
    #[serde(default)]
    pub text_align: TextAlign,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub is_manual: bool,
    #[serde(default = "default_line_height")]
    pub line_height: f64,
}

impl TextRegionRecord {
    pub fn to_region(&self) -> Result<TextRegion, ModelError> {
        let bbox = bbox_from_slice(&self.bbox)?;
        if !(self.rotation.is_finite() && self.line_height.is_finite()) {
            return Err(ModelError::NonFinite("typography"));
        }
        Ok(TextRegion {
            id: ShapeId::intern(&self.id),
            page_number: self.page_number,
            bbox,
            src_text: self.src_text.clone(),
            tgt_text: self.tgt_text.clone(),
            confidence: self.confidence,
            locked: self.locked,
            needs_review: self.needs_review,
            compose_mode: self.compose_mode.clone(),
            render_order: self.render_order,
            typography: Typography {
                font_family: self.font_family.clone(),
                font_size: self.font_size,
                text_color: self.text_color.clone(),
                text_align: self.text_align,
                rotation: self.rotation,
                line_height: self.line_height,
            },
            bg_color: self.bg_color.clone(),
            is_manual: self.is_manual,
        })
    }

    /// The record a backend stores for a create request.
    pub fn from_new(id: String, page_number: u32, new: &NewTextRegion) -> Self {
        Self {
            id,
            page_number,
            bbox: new.bbox.to_vec(),
            bbox_normalized: Vec::new(),
            src_text: new.src_text.clone(),
            tgt_text: new.tgt_text.clone(),
            confidence: 1.0,
            locked: new.locked,
            needs_review: false,
            compose_mode: default_compose_mode(),
            font_size: new.font_size,
            render_order: new.render_order,
            font_family: new.font_family.clone(),
            text_color: new.text_color.clone(),
            bg_color: new.bg_color.clone(),
            text_align: new.text_align,
            rotation: new.rotation,
            is_manual: new.is_manual,
            line_height: new.line_height,
        }
    }

    /// Partial-update semantics: only fields present in `update` change.
    pub fn apply(&mut self, update: &RegionUpdate) {
        if let Some(bbox) = update.bbox {
            self.bbox = bbox.to_vec();
        }
        if let Some(v) = &update.tgt_text {
            self.tgt_text = v.clone();
        }
        if let Some(v) = update.locked {
            self.locked = v;
        }
        if let Some(v) = update.needs_review {
            self.needs_review = v;
        }
        if let Some(v) = &update.compose_mode {
            self.compose_mode = v.clone();
        }
        if let Some(v) = update.render_order {
            self.render_order = v;
        }
        if let Some(v) = &update.font_family {
            self.font_family = v.clone();
        }
        if let Some(v) = update.font_size {
            self.font_size = v;
        }
        if let Some(v) = &update.text_color {
            self.text_color = v.clone();
        }
        if let Some(v) = update.text_align {
            self.text_align = v;
        }
        if let Some(v) = update.rotation {
            self.rotation = v;
        }
        if let Some(v) = update.line_height {
            self.line_height = v;
        }
        if let Some(v) = &update.bg_color {
            self.bg_color = v.clone();
        }
    }
}

/// Create body for a text region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTextRegion {
    pub bbox: [f64; 4],
    pub src_text: String,
    pub tgt_text: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub locked: bool,
    pub render_order: i32,
    pub font_family: String,
    pub font_size: Option<u32>,
    pub text_color: String,
    pub text_align: TextAlign,
    pub rotation: f64,
    pub line_height: f64,
    pub bg_color: Option<String>,
    pub is_manual: bool,
}

impl From<&TextRegion> for NewTextRegion {
    fn from(r: &TextRegion) -> Self {
        Self {
            bbox: rect_to_array(r.bbox),
            src_text: r.src_text.clone(),
            tgt_text: r.tgt_text.clone(),
            locked: r.locked,
            render_order: r.render_order,
            font_family: r.typography.font_family.clone(),
            font_size: r.typography.font_size,
            text_color: r.typography.text_color.clone(),
            text_align: r.typography.text_align,
            rotation: r.typography.rotation,
            line_height: r.typography.line_height,
            bg_color: r.bg_color.clone(),
            is_manual: r.is_manual,
        }
    }
}

/// PATCH body for a text region. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RegionUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bbox: Option<[f64; 4]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tgt_text: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub needs_review: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compose_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub render_order: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<Option<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_align: Option<TextAlign>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bg_color: Option<Option<String>>,
}

impl From<&RegionPatch> for RegionUpdate {
    fn from(p: &RegionPatch) -> Self {
        Self {
            bbox: p.bbox.map(rect_to_array),
            tgt_text: p.tgt_text.clone(),
            locked: p.locked,
            needs_review: p.needs_review,
            compose_mode: p.compose_mode.clone(),
            render_order: p.render_order,
            font_family: p.font_family.clone(),
            font_size: p.font_size,
            text_color: p.text_color.clone(),
            text_align: p.text_align,
            rotation: p.rotation,
            line_height: p.line_height,
            bg_color: p.bg_color.clone(),
        }
    }
}

// ─── Drawings ────────────────────────────────────────────────────────────

/// A drawing element as the backend returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawingRecord {
    pub id: String,
    #[serde(default)]
    pub page_number: u32,
    pub element_type: String,
    pub points: Vec<f64>,
    #[serde(default = "default_color")]
    pub stroke_color: String,
    #[serde(default = "default_stroke_width")]
    pub stroke_width: u32,
    #[serde(default)]
    pub fill_color: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default = "default_font_size")]
    pub font_size: u32,
    #[serde(default = "default_font_family")]
    pub font_family: String,
    #[serde(default = "default_color")]
    pub text_color: String,
    #[serde(default)]
    pub image_data: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub locked: bool,
}

fn pairs(points: &[f64]) -> impl Iterator<Item = Point> + '_ {
    points.chunks_exact(2).map(|c| Point::new(c[0], c[1]))
}

fn arity(kind: &str, expected: &'static str, got: usize) -> ModelError {
    ModelError::PointArity {
        kind: kind.to_string(),
        expected,
        got,
    }
}

/// Parse a tag plus flat point list into a typed kind.
pub fn parse_kind(
    element_type: &str,
    points: &[f64],
    text: Option<&str>,
    font: AnnotationFont,
    image_data: Option<&str>,
) -> Result<DrawingKind, ModelError> {
    if !points.iter().all(|v| v.is_finite()) {
        return Err(ModelError::NonFinite("points"));
    }
    let four = || -> Result<Rect, ModelError> {
        match points {
            [x0, y0, x1, y1] => Ok(Rect::new(*x0, *y0, *x1, *y1).abs()),
            _ => Err(arity(element_type, "4", points.len())),
        }
    };
    Ok(match element_type {
        "line" => match points {
            [x0, y0, x1, y1] => DrawingKind::Line {
                from: Point::new(*x0, *y0),
                to: Point::new(*x1, *y1),
            },
            _ => return Err(arity(element_type, "4", points.len())),
        },
        "rect" => DrawingKind::Rect { bounds: four()? },
        "circle" => DrawingKind::Circle { bounds: four()? },
        "image" => DrawingKind::Image {
            bounds: four()?,
            data: image_data.map(str::to_string),
        },
        "polyline" => {
            if points.len() < 4 || points.len() % 2 != 0 {
                return Err(arity(element_type, "an even count of at least 4", points.len()));
            }
            DrawingKind::Polyline {
                points: pairs(points).collect(),
            }
        }
        "text" => match points {
            [x, y] => DrawingKind::Text {
                anchor: Point::new(*x, *y),
                text: text.unwrap_or_default().to_string(),
                font,
            },
            _ => return Err(arity(element_type, "2", points.len())),
        },
        other => return Err(ModelError::UnknownElementType(other.to_string())),
    })
}

/// Flatten a kind's geometry into the backend's `points` list.
pub fn kind_points(kind: &DrawingKind) -> Vec<f64> {
    match kind {
        DrawingKind::Line { from, to } => vec![from.x, from.y, to.x, to.y],
        DrawingKind::Rect { bounds }
        | DrawingKind::Circle { bounds }
        | DrawingKind::Image { bounds, .. } => rect_to_array(*bounds).to_vec(),
        DrawingKind::Polyline { points } => points.iter().flat_map(|p| [p.x, p.y]).collect(),
        DrawingKind::Text { anchor, .. } => vec![anchor.x, anchor.y],
    }
}

impl DrawingRecord {
    pub fn to_drawing(&self) -> Result<Drawing, ModelError> {
        let font = AnnotationFont {
            font_size: self.font_size,
            font_family: self.font_family.clone(),
            text_color: self.text_color.clone(),
        };
        let kind = parse_kind(
            &self.element_type,
            &self.points,
            self.text.as_deref(),
            font,
            self.image_data.as_deref(),
        )?;
        Ok(Drawing {
            id: ShapeId::intern(&self.id),
            page_number: self.page_number,
            kind,
            style: DrawStyle {
                stroke_color: self.stroke_color.clone(),
                stroke_width: self.stroke_width,
                fill_color: self.fill_color.clone(),
            },
            locked: self.locked,
        })
    }

    pub fn from_new(id: String, page_number: u32, new: &NewDrawing) -> Self {
        Self {
            id,
            page_number,
            element_type: new.element_type.clone(),
            points: new.points.clone(),
            stroke_color: new.stroke_color.clone(),
            stroke_width: new.stroke_width,
            fill_color: new.fill_color.clone(),
            text: new.text.clone(),
            font_size: new.font_size,
            font_family: new.font_family.clone(),
            text_color: new.text_color.clone(),
            image_data: new.image_data.clone(),
            locked: new.locked,
        }
    }

    pub fn apply(&mut self, update: &DrawingUpdate) {
        if let Some(v) = &update.points {
            self.points = v.clone();
        }
        if let Some(v) = &update.stroke_color {
            self.stroke_color = v.clone();
        }
        if let Some(v) = update.stroke_width {
            self.stroke_width = v;
        }
        if let Some(v) = &update.fill_color {
            self.fill_color = v.clone();
        }
        if let Some(v) = &update.text {
            self.text = Some(v.clone());
        }
        if let Some(v) = update.font_size {
            self.font_size = v;
        }
        if let Some(v) = &update.font_family {
            self.font_family = v.clone();
        }
        if let Some(v) = &update.text_color {
            self.text_color = v.clone();
        }
        if let Some(v) = update.locked {
            self.locked = v;
        }
    }
}

/// Create body for a drawing element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDrawing {
    pub element_type: String,
    pub points: Vec<f64>,
    pub stroke_color: String,
    pub stroke_width: u32,
    pub fill_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub font_size: u32,
    pub font_family: String,
    pub text_color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_data: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub locked: bool,
}

impl From<&Drawing> for NewDrawing {
    fn from(d: &Drawing) -> Self {
        let (text, font, image_data) = match &d.kind {
            DrawingKind::Text { text, font, .. } => (Some(text.clone()), font.clone(), None),
            DrawingKind::Image { data, .. } => (None, AnnotationFont::default(), data.clone()),
            _ => (None, AnnotationFont::default(), None),
        };
        Self {
            element_type: d.kind.tag().to_string(),
            points: kind_points(&d.kind),
            stroke_color: d.style.stroke_color.clone(),
            stroke_width: d.style.stroke_width,
            fill_color: d.style.fill_color.clone(),
            text,
            font_size: font.font_size,
            font_family: font.font_family,
            text_color: font.text_color,
            image_data,
            locked: d.locked,
        }
    }
}

/// PATCH body for a drawing element. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DrawingUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
}

impl From<&DrawingPatch> for DrawingUpdate {
    fn from(p: &DrawingPatch) -> Self {
        let mut update = Self {
            points: p.kind.as_ref().map(kind_points),
            stroke_color: p.stroke_color.clone(),
            stroke_width: p.stroke_width,
            fill_color: p.fill_color.clone(),
            locked: p.locked,
            ..Self::default()
        };
        if let Some(DrawingKind::Text { text, font, .. }) = &p.kind {
            update.text = Some(text.clone());
            update.font_size = Some(font.font_size);
            update.font_family = Some(font.font_family.clone());
            update.text_color = Some(font.text_color.clone());
        }
        update
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn region_record_defaults() {
        let json = r#"{"id":"r-1","page_number":2,"bbox":[150,460,50,400],"src_text":"Ventil"}"#;
        let record: TextRegionRecord = serde_json::from_str(json).unwrap();
        let region = record.to_region().unwrap();
        assert_eq!(region.bbox, Rect::new(50.0, 400.0, 150.0, 460.0));
        assert_eq!(region.compose_mode, "patch");
        assert_eq!(region.typography.font_family, "Arial");
        assert_eq!(region.typography.text_align, TextAlign::Center);
        assert_eq!(region.display_text(), "Ventil");
    }

    #[test]
    fn bad_bbox_is_rejected() {
        let record = TextRegionRecord {
            bbox: vec![1.0, 2.0, 3.0],
            ..serde_json::from_str(r#"{"id":"r","bbox":[0,0,1,1]}"#).unwrap()
        };
        assert_eq!(record.to_region(), Err(ModelError::BadBbox(3)));
    }

    #[test]
    fn drawing_kinds_parse() {
        let font = AnnotationFont::default();
        assert!(matches!(
            parse_kind("circle", &[0.0, 0.0, 10.0, 10.0], None, font.clone(), None),
            Ok(DrawingKind::Circle { .. })
        ));
        assert!(matches!(
            parse_kind("polyline", &[0.0, 0.0, 10.0, 10.0, 20.0, 0.0], None, font.clone(), None),
            Ok(DrawingKind::Polyline { points }) if points.len() == 3
        ));
        assert_eq!(
            parse_kind("polyline", &[0.0, 0.0, 10.0], None, font.clone(), None).map(|_| ()),
            Err(arity("polyline", "an even count of at least 4", 3))
        );
        assert_eq!(
            parse_kind("star", &[0.0, 0.0], None, font.clone(), None).map(|_| ()),
            Err(ModelError::UnknownElementType("star".into()))
        );
        assert_eq!(
            parse_kind("line", &[0.0, f64::NAN, 1.0, 1.0], None, font, None).map(|_| ()),
            Err(ModelError::NonFinite("points"))
        );
    }

    #[test]
    fn update_serializes_only_changed_fields() {
        let patch = RegionPatch {
            bbox: Some(Rect::new(50.0, 400.0, 200.0, 510.0)),
            bg_color: Some(None),
            ..RegionPatch::default()
        };
        let body = serde_json::to_value(RegionUpdate::from(&patch)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "bbox": [50.0, 400.0, 200.0, 510.0], "bg_color": null })
        );
    }

    #[test]
    fn text_annotation_update_carries_text() {
        let patch = DrawingPatch {
            kind: Some(DrawingKind::Text {
                anchor: Point::new(4.0, 5.0),
                text: "Pumpe".into(),
                font: AnnotationFont::default(),
            }),
            ..DrawingPatch::default()
        };
        let update = DrawingUpdate::from(&patch);
        assert_eq!(update.points, Some(vec![4.0, 5.0]));
        assert_eq!(update.text.as_deref(), Some("Pumpe"));
    }

    #[test]
    fn record_update_merges() {
        let mut record = DrawingRecord::from_new(
            "d-9".into(),
            1,
            &NewDrawing::from(&Drawing::new(
                ShapeId::intern("tmp"),
                1,
                DrawingKind::Rect {
                    bounds: Rect::new(0.0, 0.0, 10.0, 10.0),
                },
                DrawStyle::default(),
            )),
        );
        record.apply(&DrawingUpdate {
            points: Some(vec![1.0, 1.0, 11.0, 11.0]),
            ..DrawingUpdate::default()
        });
        let drawing = record.to_drawing().unwrap();
        assert_eq!(drawing.id.as_str(), "d-9");
        assert_eq!(
            drawing.kind,
            DrawingKind::Rect {
                bounds: Rect::new(1.0, 1.0, 11.0, 11.0)
            }
        );
        assert_eq!(drawing.style.stroke_width, 2);
    }
}
