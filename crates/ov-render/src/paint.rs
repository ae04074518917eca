//! Shapes → screen-space display list.
//!
//! The host toolkit owns the actual drawing. This module walks the page in
//! paint order and emits one item per visible thing: region boxes, drawing
//! outlines as kurbo paths, annotation labels, in-progress previews, the
//! marquee, and grip handles. Everything is already mapped through the
//! view transform.

use kurbo::{BezPath, Ellipse, Line, Point, Rect, Shape as _};
use ov_core::id::ShapeId;
use ov_core::model::{DrawStyle, Drawing, DrawingKind, Shape, TextAlign, TextRegion};
use ov_core::resize::{Grip, grips};
use ov_core::view::ViewTransform;

/// Transient interaction state the painter needs on top of the shapes.
#[derive(Debug, Clone, Copy, Default)]
pub struct Overlay<'a> {
    pub selected_regions: &'a [ShapeId],
    pub selected_drawings: &'a [ShapeId],
    /// A shape being drawn but not created yet.
    pub preview: Option<&'a Shape>,
    /// Committed vertices of a polyline under construction.
    pub polyline: &'a [Point],
    /// Live pointer position, for the rubber-band polyline segment.
    pub cursor: Option<Point>,
    /// Marquee rectangle in document space.
    pub marquee: Option<Rect>,
    /// Shape whose text is open in the inline editor, with the buffer.
    pub editing: Option<(ShapeId, &'a str)>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DisplayItem {
    Region {
        id: ShapeId,
        rect: Rect,
        text: String,
        font_px: Option<f64>,
        align: TextAlign,
        bg_color: Option<String>,
        selected: bool,
        locked: bool,
        manual: bool,
        editing: bool,
    },
    Outline {
        id: Option<ShapeId>,
        path: BezPath,
        style: DrawStyle,
        closed: bool,
        selected: bool,
    },
    Label {
        id: Option<ShapeId>,
        anchor: Point,
        text: String,
        font_px: f64,
        color: String,
        selected: bool,
        editing: bool,
    },
    Image {
        id: ShapeId,
        rect: Rect,
        selected: bool,
    },
    Marquee(Rect),
    Grip {
        at: Point,
        grip: Grip,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayList {
    pub items: Vec<DisplayItem>,
}

impl DisplayList {
    pub fn grips(&self) -> impl Iterator<Item = (Grip, Point)> + '_ {
        self.items.iter().filter_map(|item| match item {
            DisplayItem::Grip { at, grip } => Some((*grip, *at)),
            _ => None,
        })
    }
}

/// Build the display list for one frame.
///
/// `regions` and `drawings` are in paint order. Regions paint first and
/// drawings sit on top of them.
pub fn paint<'a>(
    view: &ViewTransform,
    regions: impl Iterator<Item = &'a Shape>,
    drawings: impl Iterator<Item = &'a Shape>,
    overlay: &Overlay<'_>,
) -> DisplayList {
    let mut list = DisplayList::default();
    let editing_id = overlay.editing.map(|(id, _)| id);

    let mut with_grips: Vec<&Shape> = Vec::new();

    for shape in regions {
        if let Shape::Region(r) = shape {
            let selected = overlay.selected_regions.contains(&r.id);
            if selected && overlay.selected_regions.len() == 1 && !r.locked {
                with_grips.push(shape);
            }
            list.items.push(paint_region(view, r, selected, overlay));
        }
    }
    for shape in drawings {
        if let Shape::Drawing(d) = shape {
            let selected = overlay.selected_drawings.contains(&d.id);
            if selected && overlay.selected_drawings.len() == 1 && !d.locked {
                with_grips.push(shape);
            }
            list.items.push(paint_drawing(view, d, Some(d.id), selected, overlay));
        }
    }

    if let Some(preview) = overlay.preview {
        match preview {
            Shape::Region(r) => list.items.push(DisplayItem::Outline {
                id: None,
                path: view_rect(view, r.bbox).to_path(0.1),
                style: DrawStyle::default(),
                closed: true,
                selected: false,
            }),
            Shape::Drawing(d) => list
                .items
                .push(paint_drawing(view, d, None, false, overlay)),
        }
    }

    if !overlay.polyline.is_empty() {
        let mut path = BezPath::new();
        let mut points = overlay.polyline.iter().map(|p| view.to_screen(*p));
        if let Some(first) = points.next() {
            path.move_to(first);
        }
        for p in points {
            path.line_to(p);
        }
        if let Some(cursor) = overlay.cursor {
            path.line_to(view.to_screen(cursor));
        }
        list.items.push(DisplayItem::Outline {
            id: None,
            path,
            style: DrawStyle::default(),
            closed: false,
            selected: false,
        });
    }

    if let Some(marquee) = overlay.marquee {
        list.items.push(DisplayItem::Marquee(view_rect(view, marquee.abs())));
    }

    // Handles render only for a single, unlocked selection.
    for shape in with_grips {
        if editing_id == Some(shape.id()) {
            continue;
        }
        for (grip, at) in grips(shape) {
            list.items.push(DisplayItem::Grip {
                at: view.to_screen(at),
                grip,
            });
        }
    }
    log::trace!("paint: {} items", list.items.len());
    list
}

fn view_rect(view: &ViewTransform, r: Rect) -> Rect {
    view.rect_to_screen(r)
}

fn paint_region(view: &ViewTransform, r: &TextRegion, selected: bool, overlay: &Overlay<'_>) -> DisplayItem {
    let (editing, text) = match overlay.editing {
        Some((id, buffer)) if id == r.id => (true, buffer.to_string()),
        _ => (false, r.display_text().to_string()),
    };
    log::trace!("REGION {} {:?} {:?}", r.id, r.bbox, text);
    DisplayItem::Region {
        id: r.id,
        rect: view_rect(view, r.bbox),
        text,
        font_px: r.typography.font_size.map(|s| f64::from(s) * view.scale()),
        align: r.typography.text_align,
        bg_color: r.bg_color.clone(),
        selected,
        locked: r.locked,
        manual: r.is_manual,
        editing,
    }
}

fn paint_drawing(
    view: &ViewTransform,
    d: &Drawing,
    id: Option<ShapeId>,
    selected: bool,
    overlay: &Overlay<'_>,
) -> DisplayItem {
    let outline = |path: BezPath, closed: bool| DisplayItem::Outline {
        id,
        path,
        style: d.style.clone(),
        closed,
        selected,
    };
    match &d.kind {
        DrawingKind::Line { from, to } => outline(
            Line::new(view.to_screen(*from), view.to_screen(*to)).to_path(0.1),
            false,
        ),
        DrawingKind::Rect { bounds } => outline(view_rect(view, *bounds).to_path(0.1), true),
        DrawingKind::Circle { bounds } => {
            outline(Ellipse::from_rect(view_rect(view, *bounds)).to_path(0.1), true)
        }
        DrawingKind::Polyline { points } => {
            let mut path = BezPath::new();
            for (i, p) in points.iter().enumerate() {
                if i == 0 {
                    path.move_to(view.to_screen(*p));
                } else {
                    path.line_to(view.to_screen(*p));
                }
            }
            outline(path, false)
        }
        DrawingKind::Text { anchor, text, font } => {
            let buffer = overlay
                .editing
                .filter(|(edit_id, _)| Some(*edit_id) == id)
                .map(|(_, buffer)| buffer);
            DisplayItem::Label {
                id,
                anchor: view.to_screen(*anchor),
                text: buffer.unwrap_or(text.as_str()).to_string(),
                font_px: f64::from(font.font_size) * view.scale(),
                color: font.text_color.clone(),
                selected,
                editing: buffer.is_some(),
            }
        }
        DrawingKind::Image { bounds, .. } => match id {
            Some(id) => DisplayItem::Image {
                id,
                rect: view_rect(view, *bounds),
                selected,
            },
            None => outline(view_rect(view, *bounds).to_path(0.1), true),
        },
    }
}
