use anyhow::{Context, Result};
use geojson::{GeoJson, Geometry, Value};
use log::{info, warn};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

use crate::geo::{GeoPoint, GeoRect};
use crate::paint::linestring::LineString;
use crate::paint::passes::{
    Airway, AirwayPainter, ChartScene, FlightplanPainter, Hold, HoldPainter, ProcedureTurn,
    ProcedureTurnPainter, RangeRingPainter, RangeRings, Waypoint,
};

/// Background line with precomputed bounds for culling
#[derive(Debug, Clone)]
pub struct Coastline {
    pub line: LineString,
    pub bounds: GeoRect,
}

impl Coastline {
    pub fn new(line: LineString) -> Option<Self> {
        let bounds = GeoRect::bounding(&line.points)?;
        Some(Self { line, bounds })
    }
}

/// Load all GeoJSON files of a directory in parallel. Files that fail to
/// load are logged and skipped.
pub fn load_coastlines(data_dir: &Path) -> Result<Vec<Coastline>> {
    let mut files: Vec<PathBuf> = fs::read_dir(data_dir)
        .with_context(|| format!("Cannot read data directory {data_dir:?}"))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.extension()
                .is_some_and(|ext| ext == "json" || ext == "geojson")
        })
        .collect();
    files.sort();

    let coastlines: Vec<Coastline> = files
        .par_iter()
        .map(|path| match load_lines(path) {
            Ok(lines) => {
                info!("Loaded {} lines from {path:?}", lines.len());
                lines
            }
            Err(e) => {
                warn!("Failed to load {path:?}: {e:#}");
                Vec::new()
            }
        })
        .flatten()
        .filter_map(Coastline::new)
        .collect();

    Ok(coastlines)
}

fn load_lines(path: &Path) -> Result<Vec<LineString>> {
    let content = fs::read_to_string(path)?;
    parse_lines(&content)
}

/// Extract line features. Polygons contribute their exterior ring.
pub fn parse_lines(content: &str) -> Result<Vec<LineString>> {
    let geojson: GeoJson = content.parse()?;
    let mut lines = Vec::new();
    for_each_geometry(&geojson, &mut |geometry| collect_lines(geometry, &mut lines));
    Ok(lines)
}

/// Flight plan from a GeoJSON feature collection of points. The waypoint
/// ident comes from the `ident` or `name` property, a third coordinate is
/// taken as altitude in feet.
pub fn parse_waypoints(content: &str) -> Result<Vec<Waypoint>> {
    let geojson: GeoJson = content.parse()?;
    let GeoJson::FeatureCollection(fc) = geojson else {
        anyhow::bail!("Flight plan must be a feature collection");
    };

    let waypoints = fc
        .features
        .iter()
        .filter_map(|feature| {
            let geometry = feature.geometry.as_ref()?;
            let Value::Point(coords) = &geometry.value else {
                return None;
            };
            if coords.len() < 2 {
                return None;
            }
            let ident = feature
                .properties
                .as_ref()
                .and_then(|p| p.get("ident").or_else(|| p.get("name")))
                .and_then(|v| v.as_str())
                .unwrap_or("WPT")
                .to_string();
            // Optional third coordinate is the altitude in feet
            let pos = match coords.get(2) {
                Some(&alt) => GeoPoint::with_alt(coords[0], coords[1], alt),
                None => GeoPoint::new(coords[0], coords[1]),
            };
            Some(Waypoint { ident, pos })
        })
        .collect();
    Ok(waypoints)
}

pub fn load_waypoints(path: &Path) -> Result<Vec<Waypoint>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Cannot read flight plan {path:?}"))?;
    parse_waypoints(&content)
}

fn for_each_geometry<F>(geojson: &GeoJson, visit: &mut F)
where
    F: FnMut(&Geometry),
{
    match geojson {
        GeoJson::FeatureCollection(fc) => {
            for feature in &fc.features {
                if let Some(ref geometry) = feature.geometry {
                    visit(geometry);
                }
            }
        }
        GeoJson::Feature(f) => {
            if let Some(ref geometry) = f.geometry {
                visit(geometry);
            }
        }
        GeoJson::Geometry(geometry) => visit(geometry),
    }
}

fn to_line(coords: &[Vec<f64>]) -> LineString {
    LineString::pre_tessellated(
        coords
            .iter()
            .filter(|c| c.len() >= 2)
            .map(|c| GeoPoint::new(c[0], c[1]))
            .collect(),
    )
}

fn collect_lines(geometry: &Geometry, lines: &mut Vec<LineString>) {
    match &geometry.value {
        Value::LineString(coords) => lines.push(to_line(coords)),
        Value::MultiLineString(parts) => lines.extend(parts.iter().map(|c| to_line(c))),
        Value::Polygon(rings) => lines.extend(rings.first().map(|c| to_line(c))),
        Value::MultiPolygon(polygons) => {
            lines.extend(polygons.iter().filter_map(|rings| rings.first()).map(|c| to_line(c)))
        }
        Value::GeometryCollection(geometries) => {
            for g in geometries {
                collect_lines(g, lines);
            }
        }
        _ => {}
    }
}

/// Coarse Alpine region outlines for when no data directory is available
pub fn generate_simple_region() -> Vec<Coastline> {
    let outlines: [&[(f64, f64)]; 3] = [
        // Switzerland
        &[
            (6.0, 46.2), (6.8, 46.4), (7.0, 45.9), (7.9, 45.9), (8.4, 46.3),
            (9.0, 45.8), (9.3, 46.5), (10.1, 46.2), (10.5, 46.6), (10.4, 46.9),
            (9.6, 47.1), (9.6, 47.5), (8.6, 47.8), (7.6, 47.6), (6.9, 47.4),
            (6.0, 46.2),
        ],
        // Lake Constance
        &[
            (9.0, 47.8), (9.2, 47.65), (9.55, 47.5), (9.7, 47.55), (9.4, 47.65),
            (9.0, 47.8),
        ],
        // Lake Geneva
        &[
            (6.15, 46.25), (6.5, 46.45), (6.9, 46.4), (6.8, 46.35), (6.4, 46.35),
            (6.15, 46.25),
        ],
    ];

    outlines
        .iter()
        .filter_map(|coords| Coastline::new(LineString::from(coords.to_vec())))
        .collect()
}

/// Built-in chart objects around Zurich
pub fn demo_scene() -> ChartScene {
    let lszh = GeoPoint::new(8.549, 47.458);
    let fix = |ident: &str, lon: f64, lat: f64| Waypoint {
        ident: ident.to_string(),
        pos: GeoPoint::new(lon, lat),
    };
    let airway = |name: &str, from: (f64, f64), to: (f64, f64)| Airway {
        name: name.to_string(),
        from: GeoPoint::new(from.0, from.1),
        to: GeoPoint::new(to.0, to.1),
    };

    ChartScene {
        range_rings: RangeRingPainter {
            rings: vec![RangeRings {
                center: lszh,
                radii_nm: vec![10.0, 25.0, 50.0, 100.0],
            }],
        },
        airways: AirwayPainter {
            airways: vec![
                airway("UN871", (6.23, 46.25), (8.55, 47.46)),
                airway("UL613", (8.55, 47.46), (11.29, 48.35)),
                airway("UN850", (8.55, 47.46), (9.87, 45.63)),
                airway("UM729", (7.02, 48.69), (8.55, 47.46)),
            ],
        },
        procedures: ProcedureTurnPainter {
            turns: vec![ProcedureTurn {
                ident: "KLO".to_string(),
                fix: GeoPoint::new(8.489, 47.456),
                turn_heading: 280.0,
                distance_nm: 5.0,
                left: false,
            }],
        },
        holds: HoldPainter {
            holds: vec![
                Hold {
                    ident: "AMIKI".to_string(),
                    fix: GeoPoint::new(8.761, 47.569),
                    inbound_course: 163.0,
                    leg_nm: 4.0,
                    left: false,
                },
                Hold {
                    ident: "GIPOL".to_string(),
                    fix: GeoPoint::new(8.280, 47.390),
                    inbound_course: 68.0,
                    leg_nm: 4.0,
                    left: true,
                },
                Hold {
                    ident: "RILAX".to_string(),
                    fix: GeoPoint::new(8.861, 47.351),
                    inbound_course: 328.0,
                    leg_nm: 4.0,
                    left: false,
                },
            ],
        },
        flightplan: FlightplanPainter {
            waypoints: vec![
                fix("LSZH", 8.549, 47.458),
                fix("TRA", 8.815, 47.687),
                fix("ELMUR", 9.333, 47.789),
                fix("LSZR", 9.561, 47.485),
            ],
            rhumb: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lines() {
        let content = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {},
                 "geometry": {"type": "LineString", "coordinates": [[0, 0], [1, 1]]}},
                {"type": "Feature", "properties": {},
                 "geometry": {"type": "MultiLineString",
                              "coordinates": [[[0, 0], [1, 0]], [[2, 2], [3, 3], [4, 4]]]}},
                {"type": "Feature", "properties": {},
                 "geometry": {"type": "Polygon",
                              "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 0]], [[0.2, 0.2], [0.3, 0.2], [0.2, 0.2]]]}},
                {"type": "Feature", "properties": {},
                 "geometry": {"type": "Point", "coordinates": [5, 5]}}
            ]
        }"#;
        let lines = parse_lines(content).unwrap();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[2].len(), 3);
        assert_eq!(lines[3].len(), 4);
        assert!(lines.iter().all(|l| l.tessellated));
    }

    #[test]
    fn test_parse_waypoints() {
        let content = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {"ident": "LSZH"},
                 "geometry": {"type": "Point", "coordinates": [8.549, 47.458]}},
                {"type": "Feature", "properties": {"name": "TRA"},
                 "geometry": {"type": "Point", "coordinates": [8.815, 47.687, 5000]}},
                {"type": "Feature", "properties": null,
                 "geometry": {"type": "LineString", "coordinates": [[0, 0], [1, 1]]}}
            ]
        }"#;
        let waypoints = parse_waypoints(content).unwrap();
        assert_eq!(waypoints.len(), 2);
        assert_eq!(waypoints[0].ident, "LSZH");
        assert_eq!(waypoints[1].ident, "TRA");
        assert!((waypoints[1].pos.lat - 47.687).abs() < 1e-12);
        assert_eq!(waypoints[0].pos.alt, None);
        assert_eq!(waypoints[1].pos.alt, Some(5000.0));
    }

    #[test]
    fn test_invalid_geojson() {
        assert!(parse_lines("not json").is_err());
        assert!(parse_waypoints(r#"{"type": "Point", "coordinates": [0, 0]}"#).is_err());
    }

    #[test]
    fn test_fallback_region_has_bounds() {
        let region = generate_simple_region();
        assert_eq!(region.len(), 3);
        assert!(region[0].bounds.contains(&GeoPoint::new(8.5, 47.0)));
    }

    #[test]
    fn test_missing_data_dir() {
        assert!(load_coastlines(Path::new("/nonexistent/tui-navmap-data")).is_err());
    }
}
