pub mod hit;
pub mod paint;

pub use hit::{contains, hit_grip, hit_test, hit_test_rect};
pub use paint::{DisplayItem, DisplayList, Overlay, paint};
