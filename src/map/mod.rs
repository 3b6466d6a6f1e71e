mod geometry;
mod path;
mod projection;
mod renderer;
mod spatial;
mod zoom;

pub use path::{build_outlines, Outline};
pub use projection::{Projection, Surface, CANVAS_HEIGHT, CANVAS_WIDTH};
pub use renderer::{MapLayers, MapRenderer};
pub use spatial::FeatureGrid;
pub use zoom::{
    ViewTransform, Zoom, RESET_DURATION, SCALE_EXTENT, WHEEL_FACTOR, ZOOM_DURATION,
    ZOOM_IN_FACTOR, ZOOM_OUT_FACTOR,
};
