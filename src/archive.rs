//! Archive rewriter: streams a ZIP container, substituting the one
//! normalized XML entry.
//!
//! Beide Formate sind ZIP-Container mit genau einem kanonischen
//! Text-Eintrag: `word/document.xml` (.docx) bzw. `content.xml` (.odt).
//! Alle anderen Eintraege werden roh durchkopiert — gleiche Kompression,
//! gleiche Metadaten, byte-identisch. Output-Atomaritaet wie im Rest des
//! Hauses: erst komplett in `{output}.tmp` schreiben, bei Erfolg einmal
//! umbenennen, bei jedem Fehler tmp loeschen und das Original unberuehrt
//! lassen.

use std::fs;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::Serialize;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::collapse::FixStats;
use crate::error::Error;
use crate::namespace::{docx_namespaces, odt_namespaces, XmlNamespaces};
use crate::tree::{Document, Element};
use crate::{docx, odt, Result};

/// Result record of one fix operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FixReport {
    /// Number of space runs / marker elements collapsed.
    pub runs_collapsed: u32,
    /// Number of characters removed.
    pub chars_removed: u32,
    /// Plain-text projection before normalization.
    pub before: String,
    /// Plain-text projection after normalization.
    pub after: String,
}

impl FixReport {
    /// True when the document was already clean.
    pub fn is_clean(&self) -> bool {
        self.runs_collapsed == 0
    }
}

/// Ein Dialekt: kanonischer Eintrag, Registry, Normalizer, Projektion.
struct Dialect {
    entry: &'static str,
    registry: fn() -> &'static XmlNamespaces,
    normalize: fn(&mut Element) -> FixStats,
    plain_text: fn(&Element) -> String,
}

const DOCX: Dialect = Dialect {
    entry: "word/document.xml",
    registry: docx_namespaces,
    normalize: docx::normalize,
    plain_text: docx::plain_text,
};

const ODT: Dialect = Dialect {
    entry: "content.xml",
    registry: odt_namespaces,
    normalize: odt::normalize,
    plain_text: odt::plain_text,
};

/// Fixes one document, dispatching on the input file extension.
///
/// Jede andere Extension ist ein Fehler — kein best-effort Parse von
/// unbekannten Containern.
pub fn fix_file(input: &Path, output: &Path) -> Result<FixReport> {
    let ext = input
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "docx" => rewrite(input, output, &DOCX),
        "odt" => rewrite(input, output, &ODT),
        other => Err(Error::UnsupportedFormat(other.to_string())),
    }
}

/// Fixes a `.docx` regardless of its extension.
pub fn fix_docx(input: &Path, output: &Path) -> Result<FixReport> {
    rewrite(input, output, &DOCX)
}

/// Fixes an `.odt` regardless of its extension.
pub fn fix_odt(input: &Path, output: &Path) -> Result<FixReport> {
    rewrite(input, output, &ODT)
}

fn rewrite(input: &Path, output: &Path, dialect: &Dialect) -> Result<FixReport> {
    let file = fs::File::open(input)
        .map_err(|e| Error::IoError(format!("open '{}': {e}", input.display())))?;
    let mut zin = ZipArchive::new(BufReader::new(file))
        .map_err(|e| Error::ArchiveError(format!("read '{}': {e}", input.display())))?;

    // Erst die komplette Transformation im Speicher — schlaegt das Parsen
    // fehl, wurde noch nichts geschrieben.
    let payload = read_entry(&mut zin, dialect.entry)?;
    let mut doc = Document::parse(&payload)?;
    let before = (dialect.plain_text)(&doc.root);
    let stats = (dialect.normalize)(&mut doc.root);
    let after = (dialect.plain_text)(&doc.root);
    let fixed = doc.to_bytes((dialect.registry)())?;

    let tmp = tmp_path(output);
    let result = copy_entries(&mut zin, &tmp, dialect.entry, &fixed);
    match result {
        Ok(()) => {
            fs::rename(&tmp, output)
                .map_err(|e| Error::IoError(format!("rename to '{}': {e}", output.display())))?;
        }
        Err(e) => {
            let _ = fs::remove_file(&tmp);
            return Err(e);
        }
    }

    Ok(FixReport {
        runs_collapsed: stats.runs,
        chars_removed: stats.chars_removed,
        before,
        after,
    })
}

fn tmp_path(output: &Path) -> std::path::PathBuf {
    let mut os = output.as_os_str().to_os_string();
    os.push(".tmp");
    os.into()
}

fn read_entry<R: Read + std::io::Seek>(
    zin: &mut ZipArchive<R>,
    name: &str,
) -> Result<Vec<u8>> {
    let mut entry = zin
        .by_name(name)
        .map_err(|_| Error::ArchiveError(format!("entry '{name}' missing")))?;
    let mut buf = Vec::with_capacity(entry.size() as usize);
    entry
        .read_to_end(&mut buf)
        .map_err(|e| Error::ArchiveError(format!("read entry '{name}': {e}")))?;
    Ok(buf)
}

/// Kopiert alle Eintraege nach `tmp`, ersetzt nur den Ziel-Eintrag.
///
/// `raw_copy_file` kopiert die komprimierten Bytes unveraendert — Stored
/// bleibt Stored, Deflated bleibt Deflated, Metadaten inklusive. Damit
/// bleibt auch der ODF-`mimetype`-Eintrag an Position 0 und unkomprimiert
/// (ODF 1.2 Part 3 Sec. 3.3), weil `by_index` die Original-Reihenfolge
/// liefert.
fn copy_entries<R: Read + std::io::Seek>(
    zin: &mut ZipArchive<R>,
    tmp: &Path,
    target: &str,
    fixed: &[u8],
) -> Result<()> {
    let out = fs::File::create(tmp)
        .map_err(|e| Error::IoError(format!("create '{}': {e}", tmp.display())))?;
    let mut zout = ZipWriter::new(BufWriter::new(out));

    for i in 0..zin.len() {
        let entry = zin
            .by_index(i)
            .map_err(|e| Error::ArchiveError(format!("read entry #{i}: {e}")))?;
        if entry.name() == target {
            let mut options =
                SimpleFileOptions::default().compression_method(entry.compression());
            if let Some(t) = entry.last_modified() {
                options = options.last_modified_time(t);
            }
            if let Some(mode) = entry.unix_mode() {
                options = options.unix_permissions(mode);
            }
            let name = entry.name().to_string();
            drop(entry);
            zout.start_file(name, options)
                .map_err(|e| Error::ArchiveError(format!("write entry '{target}': {e}")))?;
            zout.write_all(fixed)
                .map_err(|e| Error::IoError(format!("write entry '{target}': {e}")))?;
        } else {
            zout.raw_copy_file(entry)
                .map_err(|e| Error::ArchiveError(format!("copy entry #{i}: {e}")))?;
        }
    }

    zout.finish()
        .map_err(|e| Error::ArchiveError(format!("finish archive: {e}")))?
        .flush()
        .map_err(|e| Error::IoError(format!("flush archive: {e}")))?;
    Ok(())
}
