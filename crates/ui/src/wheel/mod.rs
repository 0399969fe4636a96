//! Life wheel renderer: geometry, hit-testing, SVG output and the Dioxus component.

mod component;
mod data;
mod geometry;
mod svg;

pub use component::WheelDiagram;
pub use data::{Granularity, live_segments, segments};
pub use geometry::{
    GRID_RINGS, Hit, Point, SliceGeometry, Segment, WheelConfig, WheelLayout, angle_step, arc_path,
    center_percentage, hit_test, slice_angles,
};
pub use svg::{label_orientation, render_svg};
