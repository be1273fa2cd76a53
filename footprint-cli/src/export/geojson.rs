//! Export vers GeoJSON avec geozero (streaming)

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use footprint::{Row, SpatialFeatureTable};
use geo::Geometry;
use geozero::geojson::GeoJsonWriter;
use geozero::GeozeroGeometry;

/// Exporte une table spatiale en FeatureCollection GeoJSON, CRS déclaré inclus
pub fn export_to_geojson(table: &SpatialFeatureTable, output_path: &Path) -> Result<()> {
    let file = File::create(output_path)
        .context(format!("Failed to create file: {}", output_path.display()))?;
    let mut writer = BufWriter::new(file);

    write_feature_collection(&mut writer, table)?;
    writer.flush()?;

    Ok(())
}

/// Écrit la FeatureCollection complète dans `writer`
pub fn write_feature_collection<W: Write>(
    writer: &mut W,
    table: &SpatialFeatureTable,
) -> Result<()> {
    // Header FeatureCollection avec CRS
    write!(
        writer,
        r#"{{"type":"FeatureCollection","crs":{{"type":"name","properties":{{"name":"{}"}}}},"features":["#,
        table.crs().urn()
    )?;

    for (i, (row, geometry)) in table.features().enumerate() {
        if i > 0 {
            write!(writer, ",")?;
        }
        write_feature(writer, i, row, geometry)?;
    }

    write!(writer, "]}}")?;
    Ok(())
}

/// Écrit une feature en GeoJSON
fn write_feature<W: Write>(
    writer: &mut W,
    id: usize,
    row: Row<'_>,
    geometry: &Geometry<f64>,
) -> Result<()> {
    write!(writer, r#"{{"type":"Feature","id":{},"#, id)?;

    // Geometry via geozero
    write!(writer, r#""geometry":"#)?;
    let mut geom_buf = Vec::new();
    let mut geom_writer = GeoJsonWriter::new(&mut geom_buf);
    geometry.process_geom(&mut geom_writer)?;
    writer.write_all(&geom_buf)?;

    // Properties, valeurs texte telles que lues
    write!(writer, r#","properties":{{"#)?;
    for (i, (key, value)) in row.fields().enumerate() {
        if i > 0 {
            write!(writer, ",")?;
        }
        write!(
            writer,
            "{}:{}",
            serde_json::to_string(key)?,
            serde_json::to_string(value)?
        )?;
    }
    write!(writer, "}}}}")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use footprint::parser::delimited;
    use footprint::{polygon, Crs, LoadOptions, COORDINATE_COLUMNS};

    fn sample() -> SpatialFeatureTable {
        let data = "LLlat;LLlon;LRlat;LRlon;ULlat;ULlon;URlat;URlon;Column1\n\
                    10;20;10;21;11;20;11;21;say \"hi\"\n";
        let mut required: Vec<&str> = COORDINATE_COLUMNS.to_vec();
        required.push("Column1");
        let table =
            delimited::parse(data.as_bytes(), &required, &LoadOptions::default(), "mem").unwrap();
        polygon::synthesize(table, Crs::from_epsg(4326)).unwrap()
    }

    #[test]
    fn test_write_feature_collection() {
        let mut buffer = Vec::new();
        write_feature_collection(&mut buffer, &sample()).unwrap();

        let json: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(json["type"], "FeatureCollection");
        assert_eq!(
            json["crs"]["properties"]["name"],
            "urn:ogc:def:crs:EPSG::4326"
        );

        let feature = &json["features"][0];
        assert_eq!(feature["geometry"]["type"], "Polygon");
        assert_eq!(feature["geometry"]["coordinates"][0][1][0], 21.0);
        assert_eq!(feature["properties"]["Column1"], "say \"hi\"");
        assert_eq!(feature["properties"]["LLlat"], "10");
    }

    #[test]
    fn test_export_to_geojson() {
        let dir = tempfile::tempdir().unwrap();
        let output_path = dir.path().join("footprints.geojson");

        export_to_geojson(&sample(), &output_path).unwrap();

        let content = std::fs::read_to_string(&output_path).unwrap();
        assert!(content.contains(r#""type":"FeatureCollection""#));
        assert!(content.contains("EPSG::4326"));
    }
}
