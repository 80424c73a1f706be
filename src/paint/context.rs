//! Frame scoped render state shared by all painters.

use log::debug;
use serde::Deserialize;
use std::ops::{BitOr, BitOrAssign};

use crate::geo::GeoRect;
use crate::map::convert::{CoordinateConverter, ScaleProvider};
use crate::paint::backend::PaintBackend;
use crate::paint::layer::MapLayer;

/// Needs to be larger than the number of objects in the densest sensible view
pub const MAX_OBJECT_COUNT: usize = 2500;

/// Map object categories a render pass can be restricted to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ObjectTypes(u32);

impl ObjectTypes {
    pub const NONE: ObjectTypes = ObjectTypes(0);
    pub const RANGE_RINGS: ObjectTypes = ObjectTypes(1 << 0);
    pub const AIRWAY: ObjectTypes = ObjectTypes(1 << 1);
    pub const HOLD: ObjectTypes = ObjectTypes(1 << 2);
    pub const PROCEDURE: ObjectTypes = ObjectTypes(1 << 3);
    pub const FLIGHTPLAN: ObjectTypes = ObjectTypes(1 << 4);
    pub const ALL: ObjectTypes = ObjectTypes(0b1_1111);

    pub fn contains(self, other: ObjectTypes) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    pub fn without(self, other: ObjectTypes) -> ObjectTypes {
        ObjectTypes(self.0 & !other.0)
    }

    /// Parse a category name as used in configuration files
    pub fn from_name(name: &str) -> Option<ObjectTypes> {
        match name.trim().to_ascii_lowercase().as_str() {
            "range_rings" | "rings" => Some(Self::RANGE_RINGS),
            "airway" | "airways" => Some(Self::AIRWAY),
            "hold" | "holds" => Some(Self::HOLD),
            "procedure" | "procedures" => Some(Self::PROCEDURE),
            "flightplan" | "route" => Some(Self::FLIGHTPLAN),
            "all" => Some(Self::ALL),
            _ => None,
        }
    }
}

impl BitOr for ObjectTypes {
    type Output = ObjectTypes;

    fn bitor(self, rhs: ObjectTypes) -> ObjectTypes {
        ObjectTypes(self.0 | rhs.0)
    }
}

impl BitOrAssign for ObjectTypes {
    fn bitor_assign(&mut self, rhs: ObjectTypes) {
        self.0 |= rhs.0;
    }
}

/// User toggles for optional labels and decorations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DisplayOptions(u32);

impl DisplayOptions {
    pub const NONE: DisplayOptions = DisplayOptions(0);
    pub const AIRWAY_LABELS: DisplayOptions = DisplayOptions(1 << 0);
    pub const RING_LABELS: DisplayOptions = DisplayOptions(1 << 1);
    pub const HOLD_LABELS: DisplayOptions = DisplayOptions(1 << 2);
    pub const FLIGHTPLAN_LABELS: DisplayOptions = DisplayOptions(1 << 3);
    pub const PROCEDURE_EXTENSION: DisplayOptions = DisplayOptions(1 << 4);
    pub const ALL: DisplayOptions = DisplayOptions(0b1_1111);

    pub fn contains(self, other: DisplayOptions) -> bool {
        self.0 & other.0 != 0
    }

    pub fn set(&mut self, other: DisplayOptions, enabled: bool) {
        if enabled {
            self.0 |= other.0;
        } else {
            self.0 &= !other.0;
        }
    }
}

impl BitOr for DisplayOptions {
    type Output = DisplayOptions;

    fn bitor(self, rhs: DisplayOptions) -> DisplayOptions {
        DisplayOptions(self.0 | rhs.0)
    }
}

/// Detail kept while the map is moving and `draw_fast` is set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollDetail {
    /// Everything as when the map is still
    Full,
    /// Geometry and labels
    Higher,
    /// Geometry without labels
    #[default]
    Normal,
    /// Only the flight plan
    None,
}

/// Whether the map is still or being dragged/zoomed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewContext {
    #[default]
    Still,
    Animation,
}

/// Per category scale factors for drawn dimensions
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct SizeMultipliers {
    pub text_size_aircraft_ai: f32,
    pub symbol_size_navaid: f32,
    pub thickness_flightplan: f32,
    pub text_size_navaid: f32,
    pub symbol_size_airport: f32,
    pub symbol_size_aircraft_ai: f32,
    pub text_size_flightplan: f32,
    pub text_size_aircraft_user: f32,
    pub symbol_size_aircraft_user: f32,
    pub text_size_airport: f32,
    pub thickness_trail: f32,
    pub thickness_range_distance: f32,
}

impl Default for SizeMultipliers {
    fn default() -> Self {
        Self {
            text_size_aircraft_ai: 1.0,
            symbol_size_navaid: 1.0,
            thickness_flightplan: 1.0,
            text_size_navaid: 1.0,
            symbol_size_airport: 1.0,
            symbol_size_aircraft_ai: 1.0,
            text_size_flightplan: 1.0,
            text_size_aircraft_user: 1.0,
            symbol_size_aircraft_user: 1.0,
            text_size_airport: 1.0,
            thickness_trail: 1.0,
            thickness_range_distance: 1.0,
        }
    }
}

/// Negative and non finite factors become zero
fn clamp_multiplier(value: f32) -> f32 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}

impl SizeMultipliers {
    pub fn clamped(self) -> SizeMultipliers {
        SizeMultipliers {
            text_size_aircraft_ai: clamp_multiplier(self.text_size_aircraft_ai),
            symbol_size_navaid: clamp_multiplier(self.symbol_size_navaid),
            thickness_flightplan: clamp_multiplier(self.thickness_flightplan),
            text_size_navaid: clamp_multiplier(self.text_size_navaid),
            symbol_size_airport: clamp_multiplier(self.symbol_size_airport),
            symbol_size_aircraft_ai: clamp_multiplier(self.symbol_size_aircraft_ai),
            text_size_flightplan: clamp_multiplier(self.text_size_flightplan),
            text_size_aircraft_user: clamp_multiplier(self.text_size_aircraft_user),
            symbol_size_aircraft_user: clamp_multiplier(self.symbol_size_aircraft_user),
            text_size_airport: clamp_multiplier(self.text_size_airport),
            thickness_trail: clamp_multiplier(self.thickness_trail),
            thickness_range_distance: clamp_multiplier(self.thickness_range_distance),
        }
    }
}

/// Read-only option snapshot copied into every frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameOptions {
    pub draw_fast: bool,
    pub object_types: ObjectTypes,
    pub scroll_detail: ScrollDetail,
    pub display_options: DisplayOptions,
    pub sizes: SizeMultipliers,
    pub default_font_size: f32,
}

impl Default for FrameOptions {
    fn default() -> Self {
        Self {
            draw_fast: false,
            object_types: ObjectTypes::ALL,
            scroll_detail: ScrollDetail::default(),
            display_options: DisplayOptions::ALL,
            sizes: SizeMultipliers::default(),
            default_font_size: 12.0,
        }
    }
}

/// State passed to every painter during one frame.
///
/// Created by the frame driver, mutated by the painters and dropped at the end
/// of the frame. The object counter is never reset while the context lives,
/// so overflow is sticky until the next frame builds a new context.
pub struct RenderContext<'a> {
    /// Layer for the current zoom distance also affected by the detail level.
    /// Decides visibility of map objects.
    pub map_layer: &'a MapLayer,
    /// Layer for the current zoom distance not affected by the detail level.
    /// Decides text visibility and object sizes.
    pub map_layer_effective: &'a MapLayer,
    pub painter: &'a mut dyn PaintBackend,
    pub converter: &'a dyn CoordinateConverter,
    pub scale: &'a dyn ScaleProvider,
    pub view_context: ViewContext,
    /// Reduced detail while the map moves
    pub draw_fast: bool,
    pub object_types: ObjectTypes,
    /// Geographic bounds of the viewport
    pub viewport_rect: GeoRect,
    pub scroll_detail: ScrollDetail,
    pub default_font_size: f32,
    pub display_options: DisplayOptions,
    pub sizes: SizeMultipliers,
    object_count: usize,
    max_object_count: usize,
}

impl<'a> RenderContext<'a> {
    pub fn new(
        painter: &'a mut dyn PaintBackend,
        converter: &'a dyn CoordinateConverter,
        scale: &'a dyn ScaleProvider,
        map_layer: &'a MapLayer,
        map_layer_effective: &'a MapLayer,
        viewport_rect: GeoRect,
        options: &FrameOptions,
    ) -> Self {
        Self {
            map_layer,
            map_layer_effective,
            painter,
            converter,
            scale,
            view_context: if options.draw_fast {
                ViewContext::Animation
            } else {
                ViewContext::Still
            },
            draw_fast: options.draw_fast,
            object_types: options.object_types,
            viewport_rect,
            scroll_detail: options.scroll_detail,
            default_font_size: clamp_multiplier(options.default_font_size),
            display_options: options.display_options,
            sizes: options.sizes.clamped(),
            object_count: 0,
            max_object_count: MAX_OBJECT_COUNT,
        }
    }

    /// Use a different object ceiling for this frame
    pub fn with_max_object_count(mut self, max: usize) -> Self {
        self.max_object_count = max;
        self
    }

    /// Count one more object. Returns true if the frame is in overflow now.
    pub fn obj_count(&mut self) -> bool {
        self.object_count += 1;
        if self.object_count == self.max_object_count + 1 {
            debug!(
                "Object overflow: more than {} objects in frame",
                self.max_object_count
            );
        }
        self.is_overflow()
    }

    pub fn is_overflow(&self) -> bool {
        self.object_count > self.max_object_count
    }

    pub fn object_count(&self) -> usize {
        self.object_count
    }

    pub fn d_opt(&self, opts: DisplayOptions) -> bool {
        self.display_options.contains(opts)
    }

    pub fn object_types_contain(&self, types: ObjectTypes) -> bool {
        self.object_types.contains(types)
    }

    /// Labels are dropped while moving unless scroll detail keeps them
    pub fn labels_allowed(&self) -> bool {
        !self.draw_fast || matches!(self.scroll_detail, ScrollDetail::Full | ScrollDetail::Higher)
    }

    /// Everything except the flight plan is dropped while moving with no scroll detail
    pub fn details_allowed(&self) -> bool {
        !self.draw_fast || self.scroll_detail != ScrollDetail::None
    }

    /// Calculate real symbol size
    pub fn sz(&self, scale: f32, size: impl Into<f64>) -> i32 {
        (scale as f64 * size.into()).round() as i32
    }

    pub fn sz_f(&self, scale: f32, size: impl Into<f64>) -> f32 {
        (scale as f64 * size.into()) as f32
    }

    /// Set the backend font from the default font size and a scale factor
    pub fn sz_font(&mut self, scale: f32) {
        let size = self.sz_f(scale, self.default_font_size);
        self.painter.set_font_size(size);
    }

    /// Antialiasing only while the map is still
    pub fn set_render_hints(&mut self) {
        self.painter
            .set_antialiasing(self.view_context == ViewContext::Still);
    }
}
