//! Chart rendering core: painter state, sampling, label placement and
//! geometry renderers on top of a [`PaintBackend`].

pub mod backend;
pub mod circle;
pub mod context;
pub mod layer;
pub mod linestring;
pub mod passes;
pub mod procedure;
pub mod sampler;
pub mod text;

pub use backend::{DashStyle, DisplayList, DrawCommand, PaintBackend, Pen};
pub use context::{FrameOptions, RenderContext, MAX_OBJECT_COUNT};
pub use layer::{LayerSettings, MapLayer};
pub use passes::{ChartScene, MapPainter};
