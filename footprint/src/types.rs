//! Types de données pour le crate footprint

use std::fmt;

use geo::Geometry;

use crate::FootprintError;

/// Noms EPSG connus, utilisés pour les logs et le rapport
const KNOWN_CRS: &[(u32, &str)] = &[
    (4326, "WGS84"),
    (4258, "ETRS89"),
    (3857, "WebMercator"),
    (2154, "LAMB93"),
];

/// Système de coordonnées déclaré pour une table spatiale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Crs {
    /// Code EPSG
    pub epsg: u32,
}

impl Crs {
    /// WGS 84, axes (lon, lat) en degrés
    pub const WGS84: Crs = Crs { epsg: 4326 };

    pub const fn from_epsg(epsg: u32) -> Self {
        Self { epsg }
    }

    /// Nom court si le code est connu
    pub fn name(&self) -> Option<&'static str> {
        KNOWN_CRS
            .iter()
            .find(|(epsg, _)| *epsg == self.epsg)
            .map(|(_, name)| *name)
    }

    /// URN OGC, telle qu'écrite dans le membre `crs` d'un GeoJSON
    pub fn urn(&self) -> String {
        format!("urn:ogc:def:crs:EPSG::{}", self.epsg)
    }

    /// Relit un identifiant `EPSG:xxxx` ou une URN OGC
    pub fn parse(s: &str) -> Option<Self> {
        let code = s.trim().rsplit(':').next()?;
        code.parse().ok().map(Self::from_epsg)
    }
}

impl Default for Crs {
    fn default() -> Self {
        Self::WGS84
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg)
    }
}

/// Coin d'une emprise, avec ses deux colonnes de coordonnées
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    LowerLeft,
    LowerRight,
    UpperRight,
    UpperLeft,
}

impl Corner {
    /// Ordre de parcours du ring (avant fermeture sur le premier coin)
    pub const RING: [Corner; 4] = [
        Corner::LowerLeft,
        Corner::LowerRight,
        Corner::UpperRight,
        Corner::UpperLeft,
    ];

    pub const fn lat_column(self) -> &'static str {
        match self {
            Corner::LowerLeft => "LLlat",
            Corner::LowerRight => "LRlat",
            Corner::UpperRight => "URlat",
            Corner::UpperLeft => "ULlat",
        }
    }

    pub const fn lon_column(self) -> &'static str {
        match self {
            Corner::LowerLeft => "LLlon",
            Corner::LowerRight => "LRlon",
            Corner::UpperRight => "URlon",
            Corner::UpperLeft => "ULlon",
        }
    }
}

/// Les huit colonnes de coordonnées d'une emprise
pub const COORDINATE_COLUMNS: [&str; 8] = [
    "LLlat", "LLlon", "LRlat", "LRlon", "ULlat", "ULlon", "URlat", "URlon",
];

/// Table ordonnée de lignes partageant le même schéma.
///
/// Les valeurs sont stockées sous forme texte, alignées sur `columns`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// Vue sur une ligne d'une `Table`
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    columns: &'a [String],
    values: &'a [String],
}

impl<'a> Row<'a> {
    /// Valeur d'un champ par nom de colonne
    pub fn get(&self, column: &str) -> Option<&'a str> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| self.values[i].as_str())
    }

    pub fn values(&self) -> &'a [String] {
        self.values
    }

    /// Paires (colonne, valeur) dans l'ordre du schéma
    pub fn fields(&self) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        self.columns
            .iter()
            .zip(self.values)
            .map(|(c, v)| (c.as_str(), v.as_str()))
    }
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Ajoute une ligne. Les lignes courtes sont complétées par des champs vides,
    /// les valeurs en trop sont ignorées.
    pub fn push_row(&mut self, mut values: Vec<String>) {
        values.resize(self.columns.len(), String::new());
        self.rows.push(values);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Index d'une colonne obligatoire, `SchemaMismatch` si absente
    pub fn require_column(&self, column: &str) -> Result<usize, FootprintError> {
        self.column_index(column)
            .ok_or_else(|| FootprintError::schema_mismatch(column, "table"))
    }

    pub fn row(&self, index: usize) -> Option<Row<'_>> {
        self.rows.get(index).map(|values| Row {
            columns: &self.columns,
            values,
        })
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().map(move |values| Row {
            columns: &self.columns,
            values,
        })
    }

    /// Valeur brute (ligne, index de colonne)
    pub(crate) fn value(&self, row: usize, column: usize) -> &str {
        &self.rows[row][column]
    }

    /// Supprime les lignes refusées par le prédicat, dans l'ordre.
    /// Retourne le nombre de lignes supprimées.
    pub(crate) fn retain_rows<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&[String]) -> bool,
    {
        let before = self.rows.len();
        self.rows.retain(|values| keep(values));
        before - self.rows.len()
    }
}

/// Table munie d'une géométrie par ligne et d'un CRS déclaré
#[derive(Debug, Clone)]
pub struct SpatialFeatureTable {
    table: Table,
    geometries: Vec<Geometry<f64>>,
    crs: Crs,
}

impl SpatialFeatureTable {
    /// Invariant: une géométrie par ligne
    pub(crate) fn new(table: Table, geometries: Vec<Geometry<f64>>, crs: Crs) -> Self {
        debug_assert_eq!(table.len(), geometries.len());
        Self {
            table,
            geometries,
            crs,
        }
    }

    /// Nombre de features
    pub fn len(&self) -> usize {
        self.geometries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.geometries.is_empty()
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn geometries(&self) -> &[Geometry<f64>] {
        &self.geometries
    }

    pub fn crs(&self) -> Crs {
        self.crs
    }

    /// Features (attributs, géométrie) dans l'ordre des lignes
    pub fn features(&self) -> impl Iterator<Item = (Row<'_>, &Geometry<f64>)> {
        self.table.rows().zip(self.geometries.iter())
    }
}
