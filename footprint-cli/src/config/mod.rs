//! Configuration du convertisseur

use serde::{Deserialize, Serialize};
use std::path::Path;

use anyhow::{Context, Result};
use footprint::{AttributeFilter, ConversionOptions, Crs, LoadOptions};

/// Presets embarqués
pub const PRESETS: &[&str] = &["default"];

/// Configuration principale
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Code EPSG déclaré pour les polygones
    #[serde(default = "default_crs_epsg")]
    pub crs_epsg: u32,

    /// Noms des feature classes (couches de la base)
    pub feature_classes: Vec<String>,

    /// Colonnes conservées depuis la table texte
    #[serde(default)]
    pub columns: Vec<String>,

    /// Séparateur de champs (un caractère ASCII)
    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    /// Label d'encodage WHATWG
    #[serde(default = "default_encoding")]
    pub encoding: String,

    /// Valeurs de coordonnées à écarter
    #[serde(default = "default_sentinels")]
    pub sentinels: Vec<f64>,

    /// Filtre d'égalité d'attribut
    #[serde(default)]
    pub filter: Option<FilterConfig>,
}

/// Filtre d'attribut configuré
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct FilterConfig {
    pub column: String,
    pub value: String,
}

fn default_crs_epsg() -> u32 {
    Crs::WGS84.epsg
}

fn default_delimiter() -> char {
    ';'
}

fn default_encoding() -> String {
    "utf-8".to_string()
}

fn default_sentinels() -> Vec<f64> {
    footprint::filter::DEFAULT_SENTINELS.to_vec()
}

impl Config {
    /// Charge une configuration depuis un fichier
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        serde_json::from_str(&content).context("Failed to parse config JSON")
    }

    /// Charge une configuration depuis un preset embarqué
    pub fn from_preset(preset: &str) -> Result<Self> {
        match preset {
            "default" => Self::load_embedded(include_str!("presets/default.json")),
            _ => anyhow::bail!("Unknown preset: {}. Use: {}", preset, PRESETS.join(", ")),
        }
    }

    /// Nom de preset ou chemin vers un fichier JSON
    pub fn resolve(spec: &str) -> Result<Self> {
        if PRESETS.contains(&spec) {
            Self::from_preset(spec)
        } else {
            Self::load(Path::new(spec))
        }
    }

    fn load_embedded(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse embedded config")
    }

    /// Première feature class configurée
    pub fn default_feature_class(&self) -> Result<&str> {
        self.feature_classes
            .first()
            .map(String::as_str)
            .context("No feature class configured")
    }

    /// Paramètres de conversion pour le crate footprint
    pub fn conversion_options(&self) -> Result<ConversionOptions> {
        if !self.delimiter.is_ascii() {
            anyhow::bail!("Delimiter must be an ASCII character, got '{}'", self.delimiter);
        }

        let load = LoadOptions {
            delimiter: self.delimiter as u8,
            ..LoadOptions::default()
        }
        .with_encoding_label(&self.encoding)?;

        Ok(ConversionOptions {
            columns: self.columns.clone(),
            load,
            sentinels: self.sentinels.clone(),
            filter: self
                .filter
                .as_ref()
                .map(|f| AttributeFilter::new(&f.column, &f.value)),
            crs: Crs::from_epsg(self.crs_epsg),
        })
    }
}
