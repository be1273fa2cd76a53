//! Filtres de lignes: coordonnées sentinelles et égalité d'attribut
//!
//! Les deux filtres suppriment des lignes sans les réordonner et sans modifier
//! les valeurs des lignes conservées.

use tracing::debug;

use crate::types::{Table, COORDINATE_COLUMNS};
use crate::FootprintError;

/// Valeurs sentinelles par défaut ("pas de coordonnée relevée")
pub const DEFAULT_SENTINELS: [f64; 2] = [0.0, 9999.0];

/// Parse une coordonnée texte en `f64` fini
pub(crate) fn parse_coordinate(value: &str) -> Option<f64> {
    fast_float::parse::<f64, _>(value.trim())
        .ok()
        .filter(|v| v.is_finite())
}

/// Supprime les lignes dont au moins une des huit coordonnées vaut `sentinel`.
///
/// La comparaison est numérique (`"0.0"` vaut `0`). Un champ non numérique
/// n'est égal à aucune sentinelle: la ligne est conservée et l'erreur sera
/// levée à la construction du polygone.
///
/// Retourne le nombre de lignes supprimées.
pub fn drop_sentinel_coordinates(
    table: &mut Table,
    sentinel: f64,
) -> Result<usize, FootprintError> {
    let indices = coordinate_indices(table)?;

    let removed = table.retain_rows(|values| {
        !indices
            .iter()
            .any(|&i| parse_coordinate(&values[i]) == Some(sentinel))
    });

    debug!(sentinel, removed, remaining = table.len(), "Sentinel filter applied");
    Ok(removed)
}

/// Applique successivement chaque sentinelle
pub fn drop_all_sentinels(table: &mut Table, sentinels: &[f64]) -> Result<usize, FootprintError> {
    let mut removed = 0;
    for &sentinel in sentinels {
        removed += drop_sentinel_coordinates(table, sentinel)?;
    }
    Ok(removed)
}

/// Conserve uniquement les lignes dont `column` vaut exactement `value`.
///
/// Retourne le nombre de lignes supprimées.
pub fn retain_attribute(
    table: &mut Table,
    column: &str,
    value: &str,
) -> Result<usize, FootprintError> {
    let index = table.require_column(column)?;
    let removed = table.retain_rows(|values| values[index] == value);

    debug!(column, value, removed, remaining = table.len(), "Attribute filter applied");
    Ok(removed)
}

fn coordinate_indices(table: &Table) -> Result<[usize; 8], FootprintError> {
    let mut indices = [0; 8];
    for (slot, column) in indices.iter_mut().zip(COORDINATE_COLUMNS) {
        *slot = table.require_column(column)?;
    }
    Ok(indices)
}
