//! Chargement des tables texte délimitées (CSV à point-virgule)

use std::borrow::Cow;
use std::path::Path;

use encoding_rs::Encoding;
use tracing::{debug, warn};

use crate::types::Table;
use crate::FootprintError;

/// Options de lecture d'une table délimitée
#[derive(Debug, Clone, Copy)]
pub struct LoadOptions {
    /// Séparateur de champs
    pub delimiter: u8,

    /// Encodage du fichier
    pub encoding: &'static Encoding,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            delimiter: b';',
            encoding: encoding_rs::UTF_8,
        }
    }
}

impl LoadOptions {
    /// Résout un label d'encodage WHATWG (`utf-8`, `windows-1252`, `latin1`...)
    pub fn with_encoding_label(mut self, label: &str) -> Result<Self, FootprintError> {
        self.encoding = Encoding::for_label(label.trim().as_bytes())
            .ok_or_else(|| FootprintError::UnsupportedEncoding(label.to_string()))?;
        Ok(self)
    }
}

/// Charge un fichier délimité en ne gardant que les colonnes demandées.
///
/// Le fichier est lu en une fois; le handle est fermé avant le parsing.
///
/// # Errors
///
/// - `Io` si le chemin est illisible
/// - `SchemaMismatch` si une colonne demandée est absente de l'en-tête
/// - `MalformedTable` si une ligne n'a pas le nombre de champs de l'en-tête
pub fn load<S: AsRef<str>>(
    path: &Path,
    required: &[S],
    options: &LoadOptions,
) -> Result<Table, FootprintError> {
    let data = std::fs::read(path)?;
    parse(&data, required, options, &path.display().to_string())
}

/// Parse le contenu d'une table délimitée déjà en mémoire
pub fn parse<S: AsRef<str>>(
    data: &[u8],
    required: &[S],
    options: &LoadOptions,
    source_name: &str,
) -> Result<Table, FootprintError> {
    let text = decode(data, options.encoding)?;

    // Le lecteur csv saute les lignes vides sans le signaler
    for line in blank_lines(&text) {
        warn!(source = source_name, line, "Empty line skipped");
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader.headers().map_err(map_csv_error)?.clone();

    // Index source des colonnes retenues, dans l'ordre du fichier
    let mut selected: Vec<usize> = Vec::with_capacity(required.len());
    let mut columns: Vec<String> = Vec::with_capacity(required.len());
    for (i, header) in headers.iter().enumerate() {
        let wanted = required.iter().any(|r| r.as_ref() == header);
        if wanted && !columns.iter().any(|c| c == header) {
            selected.push(i);
            columns.push(header.to_string());
        }
    }

    if let Some(missing) = required
        .iter()
        .map(AsRef::as_ref)
        .find(|r| !columns.iter().any(|c| c == r))
    {
        return Err(FootprintError::schema_mismatch(missing, source_name));
    }

    let mut table = Table::new(columns);
    for record in reader.records() {
        let record = record.map_err(map_csv_error)?;
        let values = selected
            .iter()
            .map(|&i| record.get(i).unwrap_or_default().to_string())
            .collect();
        table.push_row(values);
    }

    debug!(
        source = source_name,
        rows = table.len(),
        columns = table.columns().len(),
        dropped_columns = headers.len() - selected.len(),
        "Table loaded"
    );

    Ok(table)
}

/// Décode les bytes avec l'encodage configuré
fn decode<'a>(data: &'a [u8], encoding: &'static Encoding) -> Result<Cow<'a, str>, FootprintError> {
    if encoding == encoding_rs::UTF_8 {
        let text = simdutf8::compat::from_utf8(data).map_err(|e| {
            let line = data[..e.valid_up_to()]
                .iter()
                .filter(|&&b| b == b'\n')
                .count()
                + 1;
            FootprintError::MalformedTable {
                line: line as u64,
                reason: "invalid UTF-8 sequence".to_string(),
            }
        })?;
        return Ok(Cow::Borrowed(text.strip_prefix('\u{feff}').unwrap_or(text)));
    }

    // encoding_rs retire le BOM éventuel
    let (decoded, _, _) = encoding.decode(data);
    Ok(decoded)
}

/// Numéros (base 1) des lignes vides hors d'un champ entre guillemets
fn blank_lines(text: &str) -> Vec<u64> {
    let mut quoted = false;
    let mut blanks = Vec::new();
    for (i, line) in text.lines().enumerate() {
        if !quoted && line.is_empty() {
            blanks.push(i as u64 + 1);
        }
        if line.bytes().filter(|&b| b == b'"').count() % 2 == 1 {
            quoted = !quoted;
        }
    }
    blanks
}

fn map_csv_error(err: csv::Error) -> FootprintError {
    let message = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(e) => FootprintError::Io(e),
        csv::ErrorKind::UnequalLengths {
            pos,
            expected_len,
            len,
        } => FootprintError::MalformedTable {
            line: pos.map(|p| p.line()).unwrap_or_default(),
            reason: format!("expected {} fields, found {}", expected_len, len),
        },
        csv::ErrorKind::Utf8 { pos, .. } => FootprintError::MalformedTable {
            line: pos.map(|p| p.line()).unwrap_or_default(),
            reason: message,
        },
        _ => FootprintError::MalformedTable {
            line: 0,
            reason: message,
        },
    }
}
