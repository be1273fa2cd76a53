//! Définition et implémentation des commandes CLI
//!
//! - `run`: base géographique + table texte → polygones, résumé
//! - `count`: nombre de features d'une couche de base géographique

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Subcommand, ValueEnum};
use footprint::{AttributeFilter, FeatureSource, GeodatabaseSource, RunOptions};
use tracing::{info, warn};

use footprint_cli::export::geojson::export_to_geojson;
use footprint_cli::{Config, RunReport};

/// Taille maximale par défaut d'un fichier d'entrée (20 Mio)
pub const DEFAULT_MAX_SIZE: u64 = 20 * 1024 * 1024;

/// Extensions acceptées en entrée
const ALLOWED_EXTENSIONS: &[&str] = &["zip", "gdb", "csv"];

#[derive(Subcommand)]
pub enum Commands {
    /// Convert a footprint table and report the feature count
    Run(RunArgs),

    /// Count the features of a geodatabase layer
    Count {
        /// Path to the geodatabase (.gdb directory or .gdb.zip archive)
        #[arg(long)]
        gdb: PathBuf,

        /// Layer name (défaut : première feature class configurée)
        #[arg(long)]
        layer: Option<String>,

        /// Config preset name or path to a JSON config
        #[arg(long, env = "FOOTPRINT_CONFIG", default_value = "default")]
        config: String,
    },
}

#[derive(Args)]
pub struct RunArgs {
    /// Input files: one geodatabase (.zip or .gdb) and one table (.csv)
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Config preset name or path to a JSON config
    #[arg(long, env = "FOOTPRINT_CONFIG", default_value = "default")]
    pub config: String,

    /// Feature class name (défaut : première feature class configurée)
    #[arg(long)]
    pub layer: Option<String>,

    /// Column of the attribute filter (overrides the config)
    #[arg(long, requires = "filter_value")]
    pub filter_column: Option<String>,

    /// Value kept by the attribute filter
    #[arg(long, requires = "filter_column")]
    pub filter_value: Option<String>,

    /// Write the converted features to this GeoJSON file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print a conversion report
    #[arg(long, value_enum)]
    pub report: Option<ReportFormat>,

    /// Maximum size of an input file, in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_SIZE)]
    pub max_size: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Text,
    Json,
}

/// Entrées d'une conversion, classées par extension
#[derive(Debug, PartialEq, Eq)]
pub struct Inputs {
    pub database: PathBuf,
    pub table: PathBuf,
}

/// Exécute la commande run
pub fn cmd_run(args: &RunArgs) -> Result<()> {
    let config = Config::resolve(&args.config)?;
    let inputs = classify_inputs(&args.files, args.max_size)?;

    let feature_class = match &args.layer {
        Some(layer) => layer.clone(),
        None => config.default_feature_class()?.to_string(),
    };

    let mut conversion = config.conversion_options()?;
    if let (Some(column), Some(value)) = (&args.filter_column, &args.filter_value) {
        conversion.filter = Some(AttributeFilter::new(column, value));
    }

    info!(
        database = %inputs.database.display(),
        table = %inputs.table.display(),
        feature_class = %feature_class,
        config = %args.config,
        "Starting conversion"
    );

    let started_at = Instant::now();
    let options = RunOptions::new(&inputs.database, &inputs.table, &feature_class, conversion);
    let summary = footprint::run(&options)
        .with_context(|| format!("Conversion failed for feature class {}", feature_class))?;

    let mut report = RunReport::new(&summary, started_at.elapsed());

    if let Some(output) = &args.output {
        export_to_geojson(&summary.features, output)?;
        info!(
            features = summary.feature_count(),
            output = %output.display(),
            "GeoJSON written"
        );
        report = report.with_output(output);
    }

    println!("{}", summary);

    match args.report {
        Some(ReportFormat::Text) => report.display(),
        Some(ReportFormat::Json) => println!("{}", report.to_json()?),
        None => {}
    }

    Ok(())
}

/// Exécute la commande count
pub fn cmd_count(gdb: &Path, layer: Option<&str>, config_spec: &str) -> Result<()> {
    let layer = match layer {
        Some(layer) => layer.to_string(),
        None => Config::resolve(config_spec)?
            .default_feature_class()?
            .to_string(),
    };

    let database = footprint::resolve_database(gdb)
        .with_context(|| format!("Cannot open geodatabase {}", gdb.display()))?;
    let source = GeodatabaseSource::new(database, &layer);
    let count = source.feature_count()?;

    println!("gdb_feature_class: {}, features number: {}", source.name(), count);
    Ok(())
}

/// Classe les fichiers d'entrée: `.zip`/`.gdb` → base, `.csv` → table.
///
/// Tous les fichiers refusés sont listés dans une seule erreur. En cas de
/// doublon, le dernier fichier d'un type l'emporte.
pub fn classify_inputs(files: &[PathBuf], max_size: u64) -> Result<Inputs> {
    let mut database = None;
    let mut table = None;
    let mut rejected = Vec::new();

    for file in files {
        let extension = file
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .filter(|e| ALLOWED_EXTENSIONS.contains(&e.as_str()));

        let slot = match extension.as_deref() {
            Some("zip") | Some("gdb") => &mut database,
            Some("csv") => &mut table,
            _ => {
                rejected.push(file.display().to_string());
                continue;
            }
        };

        if let Some(previous) = slot.replace(file.clone()) {
            warn!(
                previous = %previous.display(),
                file = %file.display(),
                "Several inputs of the same kind, keeping the last one"
            );
        }
    }

    if !rejected.is_empty() {
        anyhow::bail!("File type is not allowed: {}", rejected.join(", "));
    }

    let (Some(database), Some(table)) = (database, table) else {
        anyhow::bail!(
            "No files provided: expected a geodatabase (.zip or .gdb) and a table (.csv)"
        );
    };

    for path in [&database, &table] {
        check_size(path, max_size)?;
    }

    Ok(Inputs { database, table })
}

/// Refuse les fichiers plus gros que `max_size` (les dossiers `.gdb` ne sont pas mesurés)
fn check_size(path: &Path, max_size: u64) -> Result<()> {
    let metadata =
        std::fs::metadata(path).with_context(|| format!("Cannot read {}", path.display()))?;
    if metadata.is_file() && metadata.len() > max_size {
        anyhow::bail!(
            "File too large: {} ({} bytes, max {})",
            path.display(),
            metadata.len(),
            max_size
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str, size: usize) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, vec![b'x'; size]).unwrap();
        path
    }

    #[test]
    fn test_classify_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let zip = touch(dir.path(), "data.gdb.zip", 10);
        let csv = touch(dir.path(), "footprints.CSV", 10);

        let inputs = classify_inputs(&[csv.clone(), zip.clone()], DEFAULT_MAX_SIZE).unwrap();
        assert_eq!(inputs, Inputs { database: zip, table: csv });
    }

    #[test]
    fn test_classify_rejects_every_disallowed_file() {
        let dir = tempfile::tempdir().unwrap();
        let files = vec![
            touch(dir.path(), "data.gdb.zip", 1),
            touch(dir.path(), "notes.txt", 1),
            touch(dir.path(), "image.png", 1),
        ];

        let message = classify_inputs(&files, DEFAULT_MAX_SIZE)
            .unwrap_err()
            .to_string();
        assert!(message.starts_with("File type is not allowed"));
        assert!(message.contains("notes.txt"));
        assert!(message.contains("image.png"));
    }

    #[test]
    fn test_classify_requires_both_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let files = vec![touch(dir.path(), "footprints.csv", 1)];
        let message = classify_inputs(&files, DEFAULT_MAX_SIZE)
            .unwrap_err()
            .to_string();
        assert!(message.starts_with("No files provided"));
    }

    #[test]
    fn test_classify_rejects_large_files() {
        let dir = tempfile::tempdir().unwrap();
        let files = vec![
            touch(dir.path(), "data.gdb.zip", 1),
            touch(dir.path(), "footprints.csv", 64),
        ];
        let message = classify_inputs(&files, 32).unwrap_err().to_string();
        assert!(message.starts_with("File too large"));
    }

    #[test]
    fn test_classify_accepts_gdb_directory() {
        let dir = tempfile::tempdir().unwrap();
        let gdb = dir.path().join("data.gdb");
        std::fs::create_dir(&gdb).unwrap();
        let csv = touch(dir.path(), "footprints.csv", 1);

        let err = classify_inputs(&[gdb.clone(), csv], 0).unwrap_err();
        // Le dossier n'est pas mesuré, la table de 1 octet dépasse 0
        assert!(err.to_string().contains("footprints.csv"));

        let csv = touch(dir.path(), "footprints.csv", 0);
        let inputs = classify_inputs(&[gdb.clone(), csv], 0).unwrap();
        assert_eq!(inputs.database, gdb);
    }
}
