//! Types d'erreurs pour le crate footprint

use std::path::PathBuf;

use thiserror::Error;

/// Erreurs pouvant survenir lors de la conversion
#[derive(Debug, Error)]
pub enum FootprintError {
    /// Erreur d'I/O (chemin illisible, dossier non supprimable, ...)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Colonne obligatoire absente de la source
    #[error("Schema mismatch in {source_name}: missing required column '{column}'")]
    SchemaMismatch { column: String, source_name: String },

    /// Coordonnée non convertible en nombre fini
    #[error("Parse error at row {row}, column {column}: '{value}' is not a finite number")]
    ParseError {
        row: usize,
        column: String,
        value: String,
    },

    /// Ligne du fichier texte mal formée
    #[error("Malformed table at line {line}: {reason}")]
    MalformedTable { line: u64, reason: String },

    /// Encodage non supporté
    #[error("Unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    /// Archive corrompue ou contenu inattendu
    #[error("Invalid archive: {0}")]
    InvalidArchive(String),

    /// Le chemin ne désigne pas une base géographique (.gdb)
    #[error("Not a geodatabase: {}", .0.display())]
    NotAGeodatabase(PathBuf),

    /// Couche absente de la base
    #[error("Layer '{layer}' not found in {}", .path.display())]
    LayerNotFound { layer: String, path: PathBuf },

    /// Contenu de couche illisible
    #[error("Invalid layer '{layer}': {reason}")]
    InvalidLayer { layer: String, reason: String },
}

impl FootprintError {
    /// Crée une erreur de schéma avec contexte
    pub fn schema_mismatch(column: impl Into<String>, source_name: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            column: column.into(),
            source_name: source_name.into(),
        }
    }

    /// Crée une erreur de couche illisible
    pub fn invalid_layer(layer: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidLayer {
            layer: layer.into(),
            reason: reason.into(),
        }
    }
}

impl From<zip::result::ZipError> for FootprintError {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => Self::Io(e),
            other => Self::InvalidArchive(other.to_string()),
        }
    }
}
