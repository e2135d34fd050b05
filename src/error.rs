//! Central error types for the phantom-space fixer.
//!
//! Parse- und Archivfehler propagieren unveraendert bis zum Aufrufer; nur
//! der Default fuer ein fehlerhaftes `text:c`-Attribut wird lokal behandelt
//! (ODF 1.2 Part 1 Sec. 19.763: fehlender Wert bedeutet 1).

use core::fmt;

/// All error conditions a fix operation can surface.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// The input file extension is neither `.docx` nor `.odt`.
    UnsupportedFormat(String),
    /// The ZIP container is unreadable, unwritable, or the dialect's
    /// canonical XML entry is missing.
    ArchiveError(String),
    /// XML parsing failed.
    XmlParseError(String),
    /// A filesystem error outside the archive layer.
    IoError(String),
    /// A canned self-check scenario did not normalize to the expected
    /// phrase. Fatal: the normalizer itself is unreliable.
    SelfCheckFailed {
        /// Name des fehlgeschlagenen Szenarios.
        case: &'static str,
        /// Der tatsaechlich rekonstruierte Text.
        got: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedFormat(ext) => {
                if ext.is_empty() {
                    write!(f, "unsupported file type (use .docx or .odt)")
                } else {
                    write!(f, "unsupported file type '.{ext}' (use .docx or .odt)")
                }
            }
            Self::ArchiveError(msg) => write!(f, "archive error: {msg}"),
            Self::XmlParseError(msg) => write!(f, "XML parse error: {msg}"),
            Self::IoError(msg) => write!(f, "IO error: {msg}"),
            Self::SelfCheckFailed { case, got } => {
                write!(f, "self-check case '{case}' failed: got {got:?}")
            }
        }
    }
}

impl std::error::Error for Error {}

/// A convenience `Result` type alias using [`Error`].
pub type Result<T> = core::result::Result<T, Error>;
