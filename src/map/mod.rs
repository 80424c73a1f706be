pub mod convert;
pub mod geometry;
mod projection;

pub use convert::{CoordinateConverter, ScaleProvider, ScreenPoint, ScreenRect};
pub use projection::Viewport;
