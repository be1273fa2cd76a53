//! Sources de features interchangeables
//!
//! Deux variantes produisent une `SpatialFeatureTable`:
//! - [`GeodatabaseSource`]: couche lue dans une base géographique, géométrie d'origine
//! - [`DelimitedSource`]: table texte filtrée puis convertie en polygones d'emprise
//!
//! Chaque appel à `load` relit la source; aucune table n'est partagée.

use std::path::PathBuf;

use tracing::info;

use crate::filter::{self, DEFAULT_SENTINELS};
use crate::parser::{delimited, layer, LoadOptions};
use crate::polygon;
use crate::types::{Crs, SpatialFeatureTable, COORDINATE_COLUMNS};
use crate::FootprintError;

/// Interface commune aux sources de features
pub trait FeatureSource {
    /// Nom logique de la feature class
    fn name(&self) -> &str;

    /// Lit la source et retourne la table spatiale
    fn load(&self) -> Result<SpatialFeatureTable, FootprintError>;

    /// Nombre de features après chargement
    fn feature_count(&self) -> Result<usize, FootprintError> {
        Ok(self.load()?.len())
    }
}

/// Couche nommée d'une base géographique (dossier `.gdb`)
#[derive(Debug, Clone)]
pub struct GeodatabaseSource {
    path: PathBuf,
    layer: String,
}

impl GeodatabaseSource {
    pub fn new(path: impl Into<PathBuf>, layer: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            layer: layer.into(),
        }
    }
}

impl FeatureSource for GeodatabaseSource {
    fn name(&self) -> &str {
        &self.layer
    }

    fn load(&self) -> Result<SpatialFeatureTable, FootprintError> {
        layer::read_layer(&self.path, &self.layer)
    }
}

/// Filtre d'égalité sur un attribut
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeFilter {
    pub column: String,
    pub value: String,
}

impl AttributeFilter {
    pub fn new(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }
}

/// Paramètres de conversion d'une table délimitée
#[derive(Debug, Clone)]
pub struct ConversionOptions {
    /// Colonnes à conserver en plus des huit coordonnées
    pub columns: Vec<String>,

    /// Séparateur et encodage
    pub load: LoadOptions,

    /// Sentinelles appliquées dans l'ordre
    pub sentinels: Vec<f64>,

    /// Filtre d'attribut optionnel
    pub filter: Option<AttributeFilter>,

    /// CRS déclaré pour les polygones
    pub crs: Crs,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            columns: Vec::new(),
            load: LoadOptions::default(),
            sentinels: DEFAULT_SENTINELS.to_vec(),
            filter: None,
            crs: Crs::default(),
        }
    }
}

impl ConversionOptions {
    /// Colonnes exigées au chargement: coordonnées, colonnes configurées,
    /// colonne du filtre. Sans doublon.
    pub fn required_columns(&self) -> Vec<String> {
        let mut required: Vec<String> = COORDINATE_COLUMNS.iter().map(|c| c.to_string()).collect();
        let extra = self
            .columns
            .iter()
            .chain(self.filter.as_ref().map(|f| &f.column));
        for column in extra {
            if !required.contains(column) {
                required.push(column.clone());
            }
        }
        required
    }
}

/// Compteurs de lignes à chaque étape de la conversion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionStats {
    pub loaded: usize,
    pub after_sentinels: usize,
    pub after_attribute: usize,
}

/// Table texte délimitée convertie en polygones d'emprise
#[derive(Debug, Clone)]
pub struct DelimitedSource {
    path: PathBuf,
    name: String,
    options: ConversionOptions,
}

impl DelimitedSource {
    pub fn new(
        path: impl Into<PathBuf>,
        name: impl Into<String>,
        options: ConversionOptions,
    ) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            options,
        }
    }

    /// Chargement, filtres puis polygones, avec les compteurs intermédiaires
    pub fn convert(&self) -> Result<(SpatialFeatureTable, ConversionStats), FootprintError> {
        let required = self.options.required_columns();
        let mut table = delimited::load(&self.path, &required, &self.options.load)?;
        let loaded = table.len();
        info!(feature_class = %self.name, features = loaded, "Table loaded");

        filter::drop_all_sentinels(&mut table, &self.options.sentinels)?;
        let after_sentinels = table.len();
        info!(
            feature_class = %self.name,
            features = after_sentinels,
            "After coordinates filter"
        );

        if let Some(f) = &self.options.filter {
            filter::retain_attribute(&mut table, &f.column, &f.value)?;
        }
        let after_attribute = table.len();
        info!(
            feature_class = %self.name,
            features = after_attribute,
            "After attribute filter"
        );

        let spatial = polygon::synthesize(table, self.options.crs)?;
        Ok((
            spatial,
            ConversionStats {
                loaded,
                after_sentinels,
                after_attribute,
            },
        ))
    }
}

impl FeatureSource for DelimitedSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&self) -> Result<SpatialFeatureTable, FootprintError> {
        self.convert().map(|(table, _)| table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_columns_without_duplicates() {
        let options = ConversionOptions {
            columns: vec!["Column1".into(), "LLlat".into()],
            filter: Some(AttributeFilter::new("Font", "Arial")),
            ..Default::default()
        };
        let required = options.required_columns();
        assert_eq!(required.len(), 10);
        assert_eq!(&required[8..], &["Column1", "Font"]);
    }

    #[test]
    fn test_sources_share_the_interface() {
        let sources: Vec<Box<dyn FeatureSource>> = vec![
            Box::new(GeodatabaseSource::new("nonexistent.gdb", "parcels")),
            Box::new(DelimitedSource::new(
                "nonexistent.csv",
                "footprints",
                ConversionOptions::default(),
            )),
        ];
        let names: Vec<&str> = sources.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["parcels", "footprints"]);
        for source in &sources {
            assert!(matches!(source.feature_count(), Err(FootprintError::Io(_))));
        }
    }
}
