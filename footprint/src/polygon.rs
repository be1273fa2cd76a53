//! Construction des polygones d'emprise à partir des huit colonnes de coins

use geo::{Coord, Geometry, LineString, Polygon};
use tracing::debug;

use crate::filter::parse_coordinate;
use crate::types::{Corner, Crs, SpatialFeatureTable, Table};
use crate::FootprintError;

/// Convertit chaque ligne en polygone LL → LR → UR → UL → LL, en (x=lon, y=lat).
///
/// Les colonnes de coordonnées sont conservées dans la table résultante.
///
/// # Errors
///
/// `ParseError` dès qu'une coordonnée n'est pas un nombre fini: aucune table
/// partielle n'est retournée.
pub fn synthesize(table: Table, crs: Crs) -> Result<SpatialFeatureTable, FootprintError> {
    let corners = corner_indices(&table)?;

    let geometries = (0..table.len())
        .map(|row| footprint_polygon(&table, row, &corners).map(Geometry::Polygon))
        .collect::<Result<Vec<_>, _>>()?;

    debug!(features = geometries.len(), crs = %crs, "Footprint polygons built");
    Ok(SpatialFeatureTable::new(table, geometries, crs))
}

/// Index (lon, lat) de chaque coin, dans l'ordre du ring
fn corner_indices(table: &Table) -> Result<[(usize, usize); 4], FootprintError> {
    let mut indices = [(0, 0); 4];
    for (slot, corner) in indices.iter_mut().zip(Corner::RING) {
        *slot = (
            table.require_column(corner.lon_column())?,
            table.require_column(corner.lat_column())?,
        );
    }
    Ok(indices)
}

fn footprint_polygon(
    table: &Table,
    row: usize,
    corners: &[(usize, usize); 4],
) -> Result<Polygon<f64>, FootprintError> {
    let mut ring = Vec::with_capacity(5);
    for &(lon, lat) in corners {
        ring.push(Coord {
            x: coordinate(table, row, lon)?,
            y: coordinate(table, row, lat)?,
        });
    }
    // Fermeture explicite: 5 sommets même si deux coins coïncident
    ring.push(ring[0]);

    Ok(Polygon::new(LineString::new(ring), vec![]))
}

fn coordinate(table: &Table, row: usize, column: usize) -> Result<f64, FootprintError> {
    let value = table.value(row, column);
    parse_coordinate(value).ok_or_else(|| FootprintError::ParseError {
        row,
        column: table.columns()[column].clone(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::COORDINATE_COLUMNS;

    fn table(rows: &[[&str; 8]]) -> Table {
        let mut t = Table::new(COORDINATE_COLUMNS.iter().map(|c| c.to_string()).collect());
        for row in rows {
            t.push_row(row.iter().map(|v| v.to_string()).collect());
        }
        t
    }

    // LLlat, LLlon, LRlat, LRlon, ULlat, ULlon, URlat, URlon
    const SQUARE: [&str; 8] = ["10", "20", "10", "21", "11", "20", "11", "21"];

    #[test]
    fn test_polygon_vertex_order() {
        let result = synthesize(table(&[SQUARE]), Crs::WGS84).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result.crs(), Crs::WGS84);

        let Geometry::Polygon(polygon) = &result.geometries()[0] else {
            panic!("Expected a polygon");
        };
        let coords: Vec<(f64, f64)> = polygon.exterior().coords().map(|c| (c.x, c.y)).collect();
        assert_eq!(
            coords,
            vec![(20.0, 10.0), (21.0, 10.0), (21.0, 11.0), (20.0, 11.0), (20.0, 10.0)]
        );
        assert!(polygon.interiors().is_empty());
    }

    #[test]
    fn test_degenerate_ring_still_has_five_vertices() {
        let point = ["1", "1", "1", "1", "1", "1", "1", "1"];
        let result = synthesize(table(&[point]), Crs::WGS84).unwrap();
        let Geometry::Polygon(polygon) = &result.geometries()[0] else {
            panic!("Expected a polygon");
        };
        assert_eq!(polygon.exterior().0.len(), 5);
    }

    #[test]
    fn test_coordinate_columns_are_kept() {
        let result = synthesize(table(&[SQUARE, SQUARE]), Crs::from_epsg(2154)).unwrap();
        assert_eq!(result.table().columns().len(), 8);
        assert_eq!(result.geometries().len(), result.table().len());
        let (row, _) = result.features().next().unwrap();
        assert_eq!(row.get("URlon"), Some("21"));
    }

    #[test]
    fn test_unparsable_coordinate_fails_whole_table() {
        let mut bad = SQUARE;
        bad[6] = "abc";
        match synthesize(table(&[SQUARE, bad]), Crs::WGS84) {
            Err(FootprintError::ParseError { row, column, value }) => {
                assert_eq!(row, 1);
                assert_eq!(column, "URlat");
                assert_eq!(value, "abc");
            }
            other => panic!("Expected ParseError, got {:?}", other),
        }
    }

    #[test]
    fn test_non_finite_coordinate_is_rejected() {
        for value in ["inf", "NaN", ""] {
            let mut bad = SQUARE;
            bad[1] = value;
            assert!(matches!(
                synthesize(table(&[bad]), Crs::WGS84),
                Err(FootprintError::ParseError { .. })
            ));
        }
    }
}
