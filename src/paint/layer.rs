//! Zoom bucketed detail tiers.

/// Each detail step scales the zoom distance by this factor
const DETAIL_STEP_FACTOR: f64 = 1.6;

/// Lowest and highest supported detail shift
pub const DETAIL_MIN: i32 = -2;
pub const DETAIL_MAX: i32 = 2;

/// What to draw and how large at one zoom distance bucket
#[derive(Debug, Clone, PartialEq)]
pub struct MapLayer {
    /// Bucket applies up to this visible ground width
    pub max_range_km: f64,
    pub airway: bool,
    pub airway_ident: bool,
    pub hold: bool,
    pub hold_info: bool,
    pub procedure: bool,
    pub range_rings: bool,
    pub range_ring_text: bool,
    pub flightplan: bool,
    pub flightplan_text: bool,
    /// Base symbol size in pixels before multipliers
    pub symbol_size: i32,
    /// Base font size in pixels before multipliers
    pub text_size: f32,
}

impl MapLayer {
    pub fn new(max_range_km: f64) -> Self {
        Self {
            max_range_km,
            airway: true,
            airway_ident: true,
            hold: true,
            hold_info: true,
            procedure: true,
            range_rings: true,
            range_ring_text: true,
            flightplan: true,
            flightplan_text: true,
            symbol_size: 10,
            text_size: 12.0,
        }
    }

    fn airways(mut self, draw: bool, ident: bool) -> Self {
        self.airway = draw;
        self.airway_ident = ident;
        self
    }

    fn holds(mut self, draw: bool, info: bool) -> Self {
        self.hold = draw;
        self.hold_info = info;
        self
    }

    fn procedures(mut self, draw: bool) -> Self {
        self.procedure = draw;
        self
    }

    fn texts(mut self, ring_text: bool, flightplan_text: bool) -> Self {
        self.range_ring_text = ring_text;
        self.flightplan_text = flightplan_text;
        self
    }

    fn sizes(mut self, symbol_size: i32, text_size: f32) -> Self {
        self.symbol_size = symbol_size;
        self.text_size = text_size;
        self
    }
}

/// Ordered table of layers from closest to farthest zoom
#[derive(Debug, Clone, PartialEq)]
pub struct LayerSettings {
    layers: Vec<MapLayer>,
}

impl LayerSettings {
    pub fn new(mut layers: Vec<MapLayer>) -> Self {
        layers.sort_by(|a, b| a.max_range_km.total_cmp(&b.max_range_km));
        if layers.is_empty() {
            layers.push(MapLayer::new(f64::MAX));
        }
        Self { layers }
    }

    /// Layer for the given visible ground width. A positive `detail` shows the
    /// content of closer zoom buckets, a negative one of farther buckets.
    pub fn layer_for(&self, distance_km: f64, detail: i32) -> &MapLayer {
        let detail = detail.clamp(DETAIL_MIN, DETAIL_MAX);
        let distance = distance_km / DETAIL_STEP_FACTOR.powi(detail);
        self.layers
            .iter()
            .find(|layer| distance <= layer.max_range_km)
            .unwrap_or_else(|| &self.layers[self.layers.len() - 1])
    }

    pub fn layers(&self) -> &[MapLayer] {
        &self.layers
    }
}

impl Default for LayerSettings {
    fn default() -> Self {
        Self::new(vec![
            MapLayer::new(50.0).sizes(14, 14.0),
            MapLayer::new(200.0).sizes(12, 13.0),
            MapLayer::new(600.0).sizes(10, 12.0),
            MapLayer::new(1500.0)
                .airways(true, false)
                .holds(true, false)
                .sizes(8, 11.0),
            MapLayer::new(4000.0)
                .airways(true, false)
                .holds(false, false)
                .procedures(false)
                .texts(false, true)
                .sizes(6, 10.0),
            MapLayer::new(f64::MAX)
                .airways(false, false)
                .holds(false, false)
                .procedures(false)
                .texts(false, false)
                .sizes(4, 9.0),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_buckets() {
        let settings = LayerSettings::default();
        assert_eq!(settings.layer_for(10.0, 0).max_range_km, 50.0);
        assert_eq!(settings.layer_for(300.0, 0).max_range_km, 600.0);
        assert!(!settings.layer_for(10_000.0, 0).airway);
    }

    #[test]
    fn test_detail_shifts_bucket() {
        let settings = LayerSettings::default();
        let normal = settings.layer_for(250.0, 0).max_range_km;
        let more = settings.layer_for(250.0, 2).max_range_km;
        let less = settings.layer_for(250.0, -2).max_range_km;
        assert!(more < normal);
        assert!(less > normal);
        // Out of range detail is clamped
        assert_eq!(settings.layer_for(250.0, 9), settings.layer_for(250.0, DETAIL_MAX));
    }

    #[test]
    fn test_empty_table_gets_catch_all() {
        let settings = LayerSettings::new(Vec::new());
        assert_eq!(settings.layers().len(), 1);
        assert!(settings.layer_for(1e9, 0).airway);
    }
}
