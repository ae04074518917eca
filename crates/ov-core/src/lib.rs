pub mod error;
pub mod filter;
pub mod id;
pub mod model;
pub mod patch;
pub mod resize;
pub mod view;
pub mod wire;

pub use error::ModelError;
pub use id::ShapeId;
pub use model::*;
pub use patch::{DrawingPatch, RegionPatch, ShapePatch};
pub use resize::{Grip, Handle, ResizeLimits, grips, resize_box, resize_shape};
pub use view::{ViewTransform, ZoomRange, fit_scale};

/// Re-exported geometry primitives.
pub use kurbo::{Point, Rect, Size, Vec2};
