//! Hit testing: point → shape lookup.
//!
//! Shapes are passed in paint order (bottom first). The point query walks
//! them in reverse so the topmost shape wins; the area of the candidates
//! plays no part. Containment is inclusive of the boundary.

use kurbo::{Point, Rect};
use ov_core::id::ShapeId;
use ov_core::model::{Drawing, DrawingKind, Shape};
use ov_core::resize::{Grip, grips};

fn rect_contains(r: Rect, p: Point) -> bool {
    p.x >= r.x0 && p.x <= r.x1 && p.y >= r.y0 && p.y <= r.y1
}

/// Inclusive AABB overlap; touching edges count.
pub fn rects_intersect(a: Rect, b: Rect) -> bool {
    a.x0 <= b.x1 && a.x1 >= b.x0 && a.y0 <= b.y1 && a.y1 >= b.y0
}

/// Distance from `p` to the segment `a`–`b`.
pub fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let ab = b - a;
    let len2 = ab.hypot2();
    if len2 <= f64::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

fn ellipse_contains(bounds: Rect, p: Point, tolerance: f64) -> bool {
    let rx = bounds.width() / 2.0 + tolerance;
    let ry = bounds.height() / 2.0 + tolerance;
    if rx <= f64::EPSILON || ry <= f64::EPSILON {
        return rect_contains(bounds.inflate(tolerance, tolerance), p);
    }
    let c = bounds.center();
    let dx = (p.x - c.x) / rx;
    let dy = (p.y - c.y) / ry;
    dx * dx + dy * dy <= 1.0
}

fn drawing_contains(d: &Drawing, p: Point, tolerance: f64) -> bool {
    let reach = tolerance + f64::from(d.style.stroke_width) / 2.0;
    match &d.kind {
        DrawingKind::Line { from, to } => distance_to_segment(p, *from, *to) <= reach,
        DrawingKind::Polyline { points } => points
            .windows(2)
            .any(|w| distance_to_segment(p, w[0], w[1]) <= reach),
        DrawingKind::Circle { bounds } => ellipse_contains(*bounds, p, reach),
        DrawingKind::Rect { bounds } | DrawingKind::Image { bounds, .. } => rect_contains(*bounds, p),
        DrawingKind::Text { .. } => rect_contains(d.bounds(), p),
    }
}

/// Whether the rendered geometry of `shape` covers `p`.
///
/// `tolerance` widens thin geometry (lines, polylines, ellipse outlines)
/// and is given in document units.
pub fn contains(shape: &Shape, p: Point, tolerance: f64) -> bool {
    match shape {
        Shape::Region(r) => rect_contains(r.bbox, p),
        Shape::Drawing(d) => drawing_contains(d, p, tolerance),
    }
}

/// Find the topmost shape at `p`. `shapes` is in paint order.
/// Returns `None` for empty canvas.
pub fn hit_test<'a>(
    shapes: impl DoubleEndedIterator<Item = &'a Shape>,
    p: Point,
    tolerance: f64,
) -> Option<ShapeId> {
    let hit = shapes.rev().find(|s| contains(s, p, tolerance)).map(Shape::id);
    log::trace!("hit_test {p:?} -> {hit:?}");
    hit
}

/// Every shape whose bounds intersect `rect`. Used for marquee selection.
pub fn hit_test_rect<'a>(shapes: impl Iterator<Item = &'a Shape>, rect: Rect) -> Vec<ShapeId> {
    let rect = rect.abs();
    shapes
        .filter(|s| rects_intersect(s.bounds(), rect))
        .map(Shape::id)
        .collect()
}

/// The grip of `shape` nearest to `p`, if within `radius`.
pub fn hit_grip(shape: &Shape, p: Point, radius: f64) -> Option<Grip> {
    grips(shape)
        .into_iter()
        .map(|(grip, at)| (grip, at.distance(p)))
        .filter(|(_, d)| *d <= radius)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(grip, _)| grip)
}
