//! Extraction des bases géographiques zippées (`xxx.gdb.zip`)

use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::{Path, PathBuf};

use tracing::debug;
use zip::ZipArchive;

use crate::FootprintError;

/// Extrait une archive zip à côté d'elle et retourne le dossier obtenu.
///
/// Le dossier cible est `<parent>/<nom sans .zip>`. S'il existe déjà il est
/// supprimé avant l'extraction: l'opération écrase, elle n'ajoute pas.
/// L'archive doit contenir ce dossier à sa racine.
///
/// # Errors
///
/// - `Io` si l'archive est illisible ou si l'ancien dossier ne peut être supprimé
/// - `InvalidArchive` si le zip est corrompu ou ne contient pas le dossier attendu
pub fn extract_archive(zip_path: &Path) -> Result<PathBuf, FootprintError> {
    let stem = zip_path.file_stem().ok_or_else(|| {
        FootprintError::InvalidArchive(format!("no file name in {}", zip_path.display()))
    })?;
    let parent = match zip_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let target = parent.join(stem);

    // Ouvrir avant de supprimer: une archive absente ne doit rien effacer
    let file = File::open(zip_path)?;
    let mut archive = ZipArchive::new(BufReader::new(file))?;

    match std::fs::remove_dir_all(&target) {
        Ok(()) => debug!(path = %target.display(), "Removed previous extraction"),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }

    archive.extract(parent)?;

    if !target.is_dir() {
        return Err(FootprintError::InvalidArchive(format!(
            "{} does not contain a top-level '{}' directory",
            zip_path.display(),
            stem.to_string_lossy()
        )));
    }

    debug!(
        archive = %zip_path.display(),
        path = %target.display(),
        entries = archive.len(),
        "Archive extracted"
    );
    Ok(target)
}
