//! Module d'export
//!
//! - `geojson`: FeatureCollection GeoJSON avec CRS nommé

pub mod geojson;
