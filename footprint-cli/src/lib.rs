//! # footprint-cli
//!
//! Conversion de tables d'emprises en feature classes de polygones, en ligne
//! de commande.
//!
//! ## Features
//!
//! - Presets de configuration embarqués ou fichier JSON
//! - Export GeoJSON des features converties
//! - Rapport de conversion (console ou JSON)
//!
//! ## Usage CLI
//!
//! ```bash
//! # Base zippée + table texte
//! footprint run ./data.gdb.zip ./footprints.csv --filter-column Column1 --filter-value Arial
//!
//! # Export GeoJSON et rapport JSON
//! footprint run ./data.gdb ./footprints.csv --output ./footprints.geojson --report
//!
//! # Nombre de features d'une couche
//! footprint count --gdb ./data.gdb --layer FOOTPRINTS
//! ```

pub mod config;
pub mod export;
pub mod report;

pub use config::Config;
pub use report::RunReport;
