//! Rapport d'exécution d'une conversion

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use footprint::Summary;
use serde::Serialize;

/// Rapport sérialisable d'une conversion
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Nom de la feature class
    pub feature_class: String,
    /// Résumé textuel
    pub summary: String,
    /// CRS déclaré (EPSG:xxxx)
    pub crs: String,
    /// Nom court du CRS s'il est connu
    pub crs_name: Option<String>,
    /// Features de la couche de référence dans la base
    pub database_features: usize,
    /// Lignes chargées depuis la table texte
    pub loaded: usize,
    /// Lignes après filtre des sentinelles
    pub after_sentinels: usize,
    /// Lignes après filtre d'attribut
    pub after_attribute: usize,
    /// Features converties
    pub features: usize,
    /// Fichier GeoJSON écrit
    pub output: Option<String>,
    /// Durée de la conversion
    pub duration_secs: f64,
}

impl RunReport {
    pub fn new(summary: &Summary, duration: Duration) -> Self {
        Self {
            feature_class: summary.feature_class.clone(),
            summary: summary.to_string(),
            crs: summary.features.crs().to_string(),
            crs_name: summary.features.crs().name().map(str::to_string),
            database_features: summary.database_features,
            loaded: summary.stats.loaded,
            after_sentinels: summary.stats.after_sentinels,
            after_attribute: summary.stats.after_attribute,
            features: summary.feature_count(),
            output: None,
            duration_secs: duration.as_secs_f64(),
        }
    }

    pub fn with_output(mut self, path: &Path) -> Self {
        self.output = Some(path.display().to_string());
        self
    }

    /// Lignes écartées par les filtres
    pub fn removed(&self) -> usize {
        self.loaded - self.features
    }

    /// Affiche le rapport sur la console
    pub fn display(&self) {
        println!("\n{}", "=".repeat(60));
        println!("CONVERSION REPORT - {}", self.feature_class);
        println!("{}", "=".repeat(60));

        println!("Duration: {:.2}s", self.duration_secs);
        match self.crs_name {
            Some(ref name) => println!("CRS: {} ({})", self.crs, name),
            None => println!("CRS: {}", self.crs),
        }
        println!("Geodatabase features: {}", self.database_features);
        println!("Rows loaded: {}", self.loaded);
        println!("After coordinates filter: {}", self.after_sentinels);
        println!("After attribute filter: {}", self.after_attribute);
        println!("Features: {} ({} removed)", self.features, self.removed());
        if let Some(ref output) = self.output {
            println!("Output: {}", output);
        }

        println!("{}", "=".repeat(60));
    }

    /// Rapport en JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
