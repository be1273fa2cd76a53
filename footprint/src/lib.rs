//! # footprint
//!
//! Conversion de tables d'emprises (huit colonnes de coins) en feature classes
//! de polygones.
//!
//! ## Features
//!
//! - Lecture de tables délimitées (`;` par défaut) avec sélection de colonnes
//! - Filtres de coordonnées sentinelles (0, 9999) et d'égalité d'attribut
//! - Polygones LL → LR → UR → UL fermés, types `geo`
//! - Sources interchangeables: table texte ou couche de base géographique
//! - Extraction des bases zippées (`.gdb.zip`)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use footprint::{run, RunOptions, ConversionOptions};
//!
//! let options = RunOptions::new(
//!     "data.gdb.zip",
//!     "footprints.csv",
//!     "FOOTPRINTS",
//!     ConversionOptions::default(),
//! );
//! let summary = run(&options)?;
//! println!("{}", summary);
//! ```

pub mod archive;
pub mod error;
pub mod filter;
pub mod parser;
pub mod polygon;
pub mod source;
pub mod types;

pub use archive::extract_archive;
pub use error::FootprintError;
pub use parser::LoadOptions;
pub use source::{
    AttributeFilter, ConversionOptions, ConversionStats, DelimitedSource, FeatureSource,
    GeodatabaseSource,
};
pub use types::{Corner, Crs, Row, SpatialFeatureTable, Table, COORDINATE_COLUMNS};

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::info;

/// Paramètres d'une conversion complète
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Base géographique: dossier `.gdb` ou archive `.gdb.zip`
    pub database: PathBuf,

    /// Table délimitée à convertir
    pub table: PathBuf,

    /// Nom de la feature class (couche de la base)
    pub feature_class: String,

    pub conversion: ConversionOptions,
}

impl RunOptions {
    pub fn new(
        database: impl Into<PathBuf>,
        table: impl Into<PathBuf>,
        feature_class: impl Into<String>,
        conversion: ConversionOptions,
    ) -> Self {
        Self {
            database: database.into(),
            table: table.into(),
            feature_class: feature_class.into(),
            conversion,
        }
    }
}

/// Résultat d'une conversion
#[derive(Debug, Clone)]
pub struct Summary {
    pub feature_class: String,

    /// Nombre de features de la couche de référence dans la base
    pub database_features: usize,

    pub stats: ConversionStats,

    /// Features converties
    pub features: SpatialFeatureTable,
}

impl Summary {
    /// Nombre de features après filtres
    pub fn feature_count(&self) -> usize {
        self.features.len()
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "csv_feature_class: {}, features number: {}",
            self.feature_class,
            self.feature_count()
        )
    }
}

/// Résout le chemin de la base: extrait les `.zip`, exige un dossier `.gdb`
pub fn resolve_database(path: &Path) -> Result<PathBuf, FootprintError> {
    let resolved = if has_extension(path, "zip") {
        extract_archive(path)?
    } else {
        path.to_path_buf()
    };

    if has_extension(&resolved, "gdb") {
        Ok(resolved)
    } else {
        Err(FootprintError::NotAGeodatabase(resolved))
    }
}

/// Exécute la conversion complète: base, table, filtres, polygones.
///
/// # Errors
///
/// Toute erreur interrompt la conversion; aucun résultat partiel.
pub fn run(options: &RunOptions) -> Result<Summary, FootprintError> {
    let database = resolve_database(&options.database)?;

    let reference = GeodatabaseSource::new(&database, &options.feature_class);
    let database_features = reference.feature_count()?;
    info!(
        feature_class = %options.feature_class,
        features = database_features,
        "Geodatabase layer loaded"
    );

    let source = DelimitedSource::new(
        &options.table,
        &options.feature_class,
        options.conversion.clone(),
    );
    let (features, stats) = source.convert()?;

    info!(
        feature_class = %options.feature_class,
        features = features.len(),
        crs = %features.crs(),
        crs_name = features.crs().name().unwrap_or("unknown"),
        "Conversion done"
    );

    Ok(Summary {
        feature_class: options.feature_class.clone(),
        database_features,
        stats,
        features,
    })
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .map_or(false, |e| e.eq_ignore_ascii_case(ext))
}
