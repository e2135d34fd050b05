//! despace – removes phantom spaces from .docx / .odt documents.
//!
//! Web-Editoren (Word Online, kollaboratives LibreOffice) kodieren
//! Mehrfach-Leerzeichen auf zwei Arten: als literale Space/NBSP-Runs in
//! `<w:t>`-Textknoten (.docx) oder als `<text:s text:c="N"/>`
//! Marker-Elemente (.odt). Beide kollabieren hier zu genau einem
//! Leerzeichen; alles andere Markup bleibt byte-identisch erhalten.
//!
//! # Beispiel
//!
//! ```
//! use despace::tree::Document;
//! use despace::odt;
//!
//! let xml = br#"<text:p xmlns:text="urn:oasis:names:tc:opendocument:xmlns:text:1.0">cheers<text:s text:c="44"/>erupting</text:p>"#;
//! let mut doc = Document::parse(xml).unwrap();
//! let stats = odt::normalize(&mut doc.root);
//! assert_eq!(stats.runs, 1);
//! assert_eq!(stats.chars_removed, 43);
//! assert_eq!(odt::plain_text(&doc.root), "cheers erupting");
//! ```
//!
//! Ganze Archive laufen ueber [`fix_file`]: ein Eintrag wird normalisiert,
//! alle anderen byte-identisch durchkopiert, Output atomar via tmp+rename.

pub mod archive;
pub mod collapse;
pub mod docx;
pub mod error;
pub mod namespace;
pub mod odt;
pub mod qname;
pub mod selfcheck;
pub mod tree;

pub use archive::{fix_docx, fix_file, fix_odt, FixReport};
pub use collapse::{collapse, FixStats};
pub use error::{Error, Result};
pub use qname::QName;
pub use tree::{Document, Element};

/// HashMap mit ahash (schneller, nicht DoS-resistent — fuer interne
/// Datenstrukturen wie den QName-Pool).
pub(crate) type FastHashMap<K, V> = hashbrown::HashMap<K, V, ahash::RandomState>;

/// IndexMap mit ahash (deterministische Iteration + schnelles Hashing) —
/// traegt die Namespace-Registry und die Prefix-Zuordnung beim Schreiben.
pub(crate) type FastIndexMap<K, V> = indexmap::IndexMap<K, V, ahash::RandomState>;
