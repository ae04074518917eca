//! Handle-driven resize math.
//!
//! Every frame of a resize gesture is computed from the shape as it was
//! when the gesture started (the *basis*) plus the cumulative pointer
//! delta. The edge opposite the dragged handle is the anchor and never
//! moves. A moving edge is clamped so that it stops at `anchor ± min`
//! instead of crossing the anchor; the box therefore never flips and never
//! drops below the minimum extent.

use crate::model::{Drawing, DrawingKind, MinSize, Shape, TextRegion};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Compass position of a box handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handle {
    N,
    S,
    E,
    W,
    Ne,
    Nw,
    Se,
    Sw,
}

impl Handle {
    pub const ALL: [Handle; 8] = [
        Handle::Nw,
        Handle::N,
        Handle::Ne,
        Handle::E,
        Handle::Se,
        Handle::S,
        Handle::Sw,
        Handle::W,
    ];

    pub const CORNERS: [Handle; 4] = [Handle::Nw, Handle::Ne, Handle::Se, Handle::Sw];

    pub fn is_corner(self) -> bool {
        matches!(self, Handle::Ne | Handle::Nw | Handle::Se | Handle::Sw)
    }

    /// Which edge moves on each axis: -1 the min edge, 1 the max edge,
    /// 0 neither.
    fn axes(self) -> (i8, i8) {
        match self {
            Handle::N => (0, -1),
            Handle::S => (0, 1),
            Handle::E => (1, 0),
            Handle::W => (-1, 0),
            Handle::Ne => (1, -1),
            Handle::Nw => (-1, -1),
            Handle::Se => (1, 1),
            Handle::Sw => (-1, 1),
        }
    }

    /// Where this handle sits on `rect`.
    pub fn position(self, rect: Rect) -> Point {
        let (hx, hy) = self.axes();
        let pick = |axis: i8, lo: f64, hi: f64| match axis {
            -1 => lo,
            1 => hi,
            _ => (lo + hi) / 2.0,
        };
        Point::new(pick(hx, rect.x0, rect.x1), pick(hy, rect.y0, rect.y1))
    }
}

/// A draggable control on a selected shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grip {
    /// A compass handle on the bounding box.
    Box(Handle),
    /// A line endpoint: 0 is `from`, 1 is `to`.
    Endpoint(usize),
}

pub type GripList = SmallVec<[(Grip, Point); 8]>;

/// Grips offered by a shape, with their document positions.
///
/// Regions get all eight compass handles. Box-like drawings get the four
/// corners, lines get their two endpoints and text annotations get none.
pub fn grips(shape: &Shape) -> GripList {
    let corners = |rect: Rect| -> GripList {
        Handle::CORNERS
            .iter()
            .map(|h| (Grip::Box(*h), h.position(rect)))
            .collect()
    };
    match shape {
        Shape::Region(r) => Handle::ALL
            .iter()
            .map(|h| (Grip::Box(*h), h.position(r.bbox)))
            .collect(),
        Shape::Drawing(d) => match &d.kind {
            DrawingKind::Line { from, to } => {
                let mut list = GripList::new();
                list.push((Grip::Endpoint(0), *from));
                list.push((Grip::Endpoint(1), *to));
                list
            }
            DrawingKind::Rect { .. }
            | DrawingKind::Circle { .. }
            | DrawingKind::Image { .. }
            | DrawingKind::Polyline { .. } => corners(shape.bounds()),
            DrawingKind::Text { .. } => GripList::new(),
        },
    }
}

/// Resize a normalized box by dragging `handle` by `delta`.
///
/// Only the edges under the handle move. Each one stops at the opposite
/// edge plus or minus the minimum extent.
pub fn resize_box(basis: Rect, handle: Handle, delta: Vec2, min: MinSize) -> Rect {
    let b = basis.abs();
    let (hx, hy) = handle.axes();
    let (mut x0, mut y0, mut x1, mut y1) = (b.x0, b.y0, b.x1, b.y1);
    match hx {
        -1 => x0 = (b.x0 + delta.x).min(b.x1 - min.width),
        1 => x1 = (b.x1 + delta.x).max(b.x0 + min.width),
        _ => {}
    }
    match hy {
        -1 => y0 = (b.y0 + delta.y).min(b.y1 - min.height),
        1 => y1 = (b.y1 + delta.y).max(b.y0 + min.height),
        _ => {}
    }
    Rect::new(x0, y0, x1, y1)
}

/// Map a point from `from` to `to` by an axis-wise affine scale. A
/// degenerate axis only translates.
fn remap(p: Point, from: Rect, to: Rect) -> Point {
    let axis = |v: f64, lo: f64, len: f64, new_lo: f64, new_len: f64| {
        if len.abs() < f64::EPSILON {
            v - lo + new_lo
        } else {
            new_lo + (v - lo) * new_len / len
        }
    };
    Point::new(
        axis(p.x, from.x0, from.width(), to.x0, to.width()),
        axis(p.y, from.y0, from.height(), to.y0, to.height()),
    )
}

/// Minimum extents for both families.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ResizeLimits {
    pub region: MinSize,
    pub drawing: MinSize,
}

/// One resize frame computed from the gesture basis.
///
/// Returns `None` when the grip does not apply to the shape (a box handle
/// on a line, any grip on a text annotation).
pub fn resize_shape(basis: &Shape, grip: Grip, delta: Vec2, limits: ResizeLimits) -> Option<Shape> {
    match (basis, grip) {
        (Shape::Region(r), Grip::Box(handle)) => {
            let bbox = limits.region.clamp(resize_box(r.bbox, handle, delta, limits.region));
            Some(Shape::Region(TextRegion { bbox, ..r.clone() }))
        }
        (Shape::Drawing(d), grip) => {
            let kind = resize_drawing(&d.kind, grip, delta, limits.drawing)?;
            Some(Shape::Drawing(Drawing { kind, ..d.clone() }))
        }
        (Shape::Region(_), Grip::Endpoint(_)) => None,
    }
}

fn resize_drawing(kind: &DrawingKind, grip: Grip, delta: Vec2, min: MinSize) -> Option<DrawingKind> {
    match (kind, grip) {
        (DrawingKind::Line { from, to }, Grip::Endpoint(0)) => Some(DrawingKind::Line {
            from: *from + delta,
            to: *to,
        }),
        (DrawingKind::Line { from, to }, Grip::Endpoint(1)) => Some(DrawingKind::Line {
            from: *from,
            to: *to + delta,
        }),
        (DrawingKind::Rect { bounds }, Grip::Box(h)) => Some(DrawingKind::Rect {
            bounds: resize_box(*bounds, h, delta, min),
        }),
        (DrawingKind::Circle { bounds }, Grip::Box(h)) => Some(DrawingKind::Circle {
            bounds: resize_box(*bounds, h, delta, min),
        }),
        (DrawingKind::Image { bounds, data }, Grip::Box(h)) => Some(DrawingKind::Image {
            bounds: resize_box(*bounds, h, delta, min),
            data: data.clone(),
        }),
        (DrawingKind::Polyline { points }, Grip::Box(h)) => {
            let old = crate::model::points_bounds(points);
            let new = resize_box(old, h, delta, min);
            Some(DrawingKind::Polyline {
                points: points.iter().map(|p| remap(*p, old, new)).collect(),
            })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::ShapeId;
    use crate::model::DrawStyle;
    use smallvec::smallvec;

    const MIN: MinSize = MinSize {
        width: 20.0,
        height: 10.0,
    };

    #[test]
    fn se_handle_grows_from_fixed_anchor() {
        let basis = Rect::new(50.0, 400.0, 150.0, 460.0);
        let out = resize_box(basis, Handle::Se, Vec2::new(50.0, 50.0), MIN);
        assert_eq!(out, Rect::new(50.0, 400.0, 200.0, 510.0));
    }

    #[test]
    fn dragging_past_anchor_clamps_instead_of_flipping() {
        let basis = Rect::new(100.0, 100.0, 180.0, 180.0);
        let out = resize_box(basis, Handle::Se, Vec2::new(-800.0, -800.0), MIN);
        assert_eq!(out, Rect::new(100.0, 100.0, 120.0, 110.0));

        let out = resize_box(basis, Handle::Nw, Vec2::new(800.0, 800.0), MIN);
        assert_eq!(out, Rect::new(160.0, 170.0, 180.0, 180.0));
    }

    #[test]
    fn edge_handles_move_one_edge() {
        let basis = Rect::new(0.0, 0.0, 100.0, 50.0);
        assert_eq!(
            resize_box(basis, Handle::E, Vec2::new(10.0, 99.0), MIN),
            Rect::new(0.0, 0.0, 110.0, 50.0)
        );
        assert_eq!(
            resize_box(basis, Handle::N, Vec2::new(99.0, -5.0), MIN),
            Rect::new(0.0, -5.0, 100.0, 50.0)
        );
    }

    #[test]
    fn frames_from_basis_do_not_drift() {
        let basis = Rect::new(10.0, 10.0, 90.0, 90.0);
        let mut last = basis;
        for step in 1..=20 {
            let d = step as f64 * 7.0;
            last = resize_box(basis, Handle::Se, Vec2::new(d, d), MIN);
            assert_eq!(last.origin(), Point::new(10.0, 10.0));
        }
        assert_eq!(last, Rect::new(10.0, 10.0, 230.0, 230.0));
    }

    #[test]
    fn region_unmoved_axis_is_grown_to_minimum() {
        let region = Shape::Region(TextRegion {
            bbox: Rect::new(0.0, 0.0, 100.0, 4.0),
            ..TextRegion::manual(ShapeId::intern("thin"), 1, Rect::ZERO)
        });
        let out = resize_shape(&region, Grip::Box(Handle::E), Vec2::new(5.0, 0.0), ResizeLimits::default())
            .unwrap_or_else(|| panic!("region accepts box handles"));
        assert_eq!(out.bounds(), Rect::new(0.0, 0.0, 105.0, 10.0));
    }

    #[test]
    fn line_endpoint_has_no_clamp() {
        let line = Shape::Drawing(Drawing::new(
            ShapeId::intern("l1"),
            1,
            DrawingKind::Line {
                from: Point::new(0.0, 0.0),
                to: Point::new(100.0, 0.0),
            },
            DrawStyle::default(),
        ));
        let out = resize_shape(&line, Grip::Endpoint(1), Vec2::new(-99.0, 0.0), ResizeLimits::default());
        let Some(Shape::Drawing(Drawing {
            kind: DrawingKind::Line { to, .. },
            ..
        })) = out
        else {
            panic!("line resize");
        };
        assert_eq!(to, Point::new(1.0, 0.0));
        assert!(resize_shape(&line, Grip::Box(Handle::Se), Vec2::ZERO, ResizeLimits::default()).is_none());
    }

    #[test]
    fn polyline_scales_into_new_bounds() {
        let poly = Shape::Drawing(Drawing::new(
            ShapeId::intern("pl"),
            1,
            DrawingKind::Polyline {
                points: smallvec![Point::new(0.0, 0.0), Point::new(50.0, 20.0), Point::new(100.0, 0.0)],
            },
            DrawStyle::default(),
        ));
        let out = resize_shape(&poly, Grip::Box(Handle::Se), Vec2::new(100.0, 20.0), ResizeLimits::default())
            .unwrap_or_else(|| panic!("polyline accepts corners"));
        assert_eq!(out.bounds(), Rect::new(0.0, 0.0, 200.0, 40.0));
    }

    #[test]
    fn grips_per_kind() {
        let region = Shape::Region(TextRegion::manual(
            ShapeId::intern("g1"),
            1,
            Rect::new(0.0, 0.0, 40.0, 20.0),
        ));
        assert_eq!(grips(&region).len(), 8);
        let rect = Shape::Drawing(Drawing::new(
            ShapeId::intern("g2"),
            1,
            DrawingKind::Rect {
                bounds: Rect::new(0.0, 0.0, 40.0, 20.0),
            },
            DrawStyle::default(),
        ));
        let g = grips(&rect);
        assert_eq!(g.len(), 4);
        assert!(g.iter().all(|(grip, _)| matches!(grip, Grip::Box(h) if h.is_corner())));
        assert_eq!(Handle::Se.position(Rect::new(0.0, 0.0, 40.0, 20.0)), Point::new(40.0, 20.0));
        assert_eq!(Handle::N.position(Rect::new(0.0, 0.0, 40.0, 20.0)), Point::new(20.0, 0.0));
    }
}
