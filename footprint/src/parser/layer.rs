//! Lecture d'une couche nommée dans une base géographique
//!
//! Une base est un dossier (`.gdb`). Les couches `<nom>.geojson` sont lues
//! directement; avec le feature `gdal`, les autres formats (FileGDB, ...) passent
//! par OGR. Les géométries sont transmises telles quelles.

use std::path::Path;

use geo::{Geometry, GeometryCollection};
use geojson::{FeatureCollection, GeoJson, JsonObject, JsonValue};

use crate::types::{Crs, SpatialFeatureTable, Table};
use crate::FootprintError;

/// Lit la couche `layer` de la base `path`
pub fn read_layer(path: &Path, layer: &str) -> Result<SpatialFeatureTable, FootprintError> {
    // Chemin absent -> Io
    std::fs::metadata(path)?;

    let geojson_path = path.join(format!("{}.geojson", layer));
    if geojson_path.is_file() {
        return read_geojson_layer(&geojson_path, layer);
    }

    read_other_layer(path, layer)
}

#[cfg(feature = "gdal")]
fn read_other_layer(path: &Path, layer: &str) -> Result<SpatialFeatureTable, FootprintError> {
    read_ogr_layer(path, layer)
}

#[cfg(not(feature = "gdal"))]
fn read_other_layer(path: &Path, layer: &str) -> Result<SpatialFeatureTable, FootprintError> {
    Err(FootprintError::LayerNotFound {
        layer: layer.to_string(),
        path: path.to_path_buf(),
    })
}

/// Lit une couche stockée en GeoJSON
pub fn read_geojson_layer(path: &Path, layer: &str) -> Result<SpatialFeatureTable, FootprintError> {
    let content = std::fs::read_to_string(path)?;
    parse_geojson_layer(&content, layer)
}

/// Parse une couche GeoJSON (FeatureCollection ou Feature isolée).
///
/// Le CRS est lu depuis le membre `crs` nommé, WGS 84 sinon. Les propriétés
/// deviennent des colonnes (union des clés, ordre de première apparition).
/// Une géométrie nulle devient une collection vide.
pub fn parse_geojson_layer(
    content: &str,
    layer: &str,
) -> Result<SpatialFeatureTable, FootprintError> {
    let geojson: GeoJson = content
        .parse()
        .map_err(|e: geojson::Error| FootprintError::invalid_layer(layer, e.to_string()))?;

    let collection = match geojson {
        GeoJson::FeatureCollection(fc) => fc,
        GeoJson::Feature(feature) => FeatureCollection {
            bbox: None,
            features: vec![feature],
            foreign_members: None,
        },
        GeoJson::Geometry(_) => {
            return Err(FootprintError::invalid_layer(
                layer,
                "expected a Feature or FeatureCollection",
            ))
        }
    };

    let crs = declared_crs(collection.foreign_members.as_ref()).unwrap_or_default();

    let mut columns: Vec<String> = Vec::new();
    for feature in &collection.features {
        for key in feature.properties.iter().flat_map(|p| p.keys()) {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }

    let mut table = Table::new(columns);
    let mut geometries = Vec::with_capacity(collection.features.len());

    for feature in collection.features {
        let values = table
            .columns()
            .iter()
            .map(|column| {
                feature
                    .properties
                    .as_ref()
                    .and_then(|p| p.get(column))
                    .map(property_to_string)
                    .unwrap_or_default()
            })
            .collect();
        table.push_row(values);

        let geometry = match feature.geometry {
            Some(g) => Geometry::<f64>::try_from(g)
                .map_err(|e| FootprintError::invalid_layer(layer, e.to_string()))?,
            None => Geometry::GeometryCollection(GeometryCollection(Vec::new())),
        };
        geometries.push(geometry);
    }

    tracing::debug!(layer, features = geometries.len(), crs = %crs, "GeoJSON layer read");
    Ok(SpatialFeatureTable::new(table, geometries, crs))
}

/// CRS nommé: `{"crs": {"type": "name", "properties": {"name": "..."}}}`
fn declared_crs(members: Option<&JsonObject>) -> Option<Crs> {
    members?
        .get("crs")?
        .get("properties")?
        .get("name")?
        .as_str()
        .and_then(Crs::parse)
}

fn property_to_string(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => String::new(),
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Lit une couche via GDAL/OGR (FileGDB, GeoPackage, Shapefile...)
#[cfg(feature = "gdal")]
pub fn read_ogr_layer(path: &Path, layer: &str) -> Result<SpatialFeatureTable, FootprintError> {
    use gdal::vector::LayerAccess;
    use gdal::Dataset;

    let dataset =
        Dataset::open(path).map_err(|e| FootprintError::invalid_layer(layer, e.to_string()))?;
    let mut ogr_layer =
        dataset
            .layer_by_name(layer)
            .map_err(|_| FootprintError::LayerNotFound {
                layer: layer.to_string(),
                path: path.to_path_buf(),
            })?;

    let crs = ogr_layer
        .spatial_ref()
        .and_then(|srs| srs.auth_code().ok())
        .map(|code| Crs::from_epsg(code as u32))
        .unwrap_or_default();

    let columns: Vec<String> = ogr_layer.defn().fields().map(|f| f.name()).collect();
    let mut table = Table::new(columns);
    let mut geometries = Vec::new();

    for feature in ogr_layer.features() {
        let values = feature
            .fields()
            .map(|(_, value)| value.and_then(|v| v.into_string()).unwrap_or_default())
            .collect();
        table.push_row(values);

        let geometry = match feature.geometry() {
            Some(g) => g
                .to_geo()
                .map_err(|e| FootprintError::invalid_layer(layer, e.to_string()))?,
            None => Geometry::GeometryCollection(GeometryCollection(Vec::new())),
        };
        geometries.push(geometry);
    }

    tracing::debug!(layer, features = geometries.len(), crs = %crs, "OGR layer read");
    Ok(SpatialFeatureTable::new(table, geometries, crs))
}
