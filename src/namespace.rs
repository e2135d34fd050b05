//! Namespace Registry: fixed prefix -> URI tables per dialect.
//!
//! Beide Office-Dialekte binden ihre Vokabulare an wohlbekannte Prefixes
//! (`w:` fuer WordprocessingML, `text:` fuer ODF-Textinhalte). Die Registry
//! haelt genau diese Bindings, damit der Serializer beim Zurueckschreiben
//! dieselben Prefixes verwendet statt sich eigene auszudenken — sonst
//! erkennt kein Mensch (und kein Diff) das Markup wieder.
//!
//! Matching von Elementen/Attributen laeuft dagegen immer ueber
//! URI + local-name, nie ueber den Prefix.

use std::sync::OnceLock;

use crate::qname::QName;
use crate::FastIndexMap;

/// WordprocessingML main namespace (ECMA-376 Part 1).
pub const URI_W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
/// ODF text namespace (OASIS ODF 1.2 Part 1).
pub const URI_ODF_TEXT: &str = "urn:oasis:names:tc:opendocument:xmlns:text:1.0";
/// The built-in `xml` namespace (never re-declared in output).
pub const URI_XML: &str = "http://www.w3.org/XML/1998/namespace";

/// An immutable prefix -> URI table with deterministic iteration order.
///
/// Nach der Konstruktion unveraenderlich; wird als `&'static` geteilt.
pub struct XmlNamespaces {
    map: FastIndexMap<&'static str, &'static str>,
}

impl XmlNamespaces {
    fn from_pairs(pairs: &[(&'static str, &'static str)]) -> Self {
        let mut map =
            FastIndexMap::with_capacity_and_hasher(pairs.len(), ahash::RandomState::new());
        for (prefix, uri) in pairs {
            map.insert(*prefix, *uri);
        }
        Self { map }
    }

    /// Resolves a prefix to its URI.
    pub fn uri(&self, prefix: &str) -> Option<&'static str> {
        self.map.get(prefix).copied()
    }

    /// Reverse lookup: the registered prefix for a URI.
    ///
    /// Lineare Suche — die Tabellen haben ~20 Eintraege.
    pub fn prefix_for(&self, uri: &str) -> Option<&'static str> {
        self.map
            .iter()
            .find(|(_, u)| **u == uri)
            .map(|(p, _)| *p)
    }

    /// Iterates bindings in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.map.iter().map(|(p, u)| (*p, *u))
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// The WordprocessingML registry (.docx, `word/document.xml`).
///
/// Der volle Satz an Prefixes den Word selbst auf `w:document` deklariert —
/// auch die, die nur in Teilen der Dokumente vorkommen (Ink, Shapes,
/// Canvas). Nur so bleiben Dokumente mit diesen Inhalten stabil.
pub fn docx_namespaces() -> &'static XmlNamespaces {
    static REGISTRY: OnceLock<XmlNamespaces> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        XmlNamespaces::from_pairs(&[
            (
                "wpc",
                "http://schemas.microsoft.com/office/word/2010/wordprocessingCanvas",
            ),
            (
                "mc",
                "http://schemas.openxmlformats.org/markup-compatibility/2006",
            ),
            ("o", "urn:schemas-microsoft-com:office:office"),
            (
                "r",
                "http://schemas.openxmlformats.org/officeDocument/2006/relationships",
            ),
            (
                "m",
                "http://schemas.openxmlformats.org/officeDocument/2006/math",
            ),
            ("v", "urn:schemas-microsoft-com:vml"),
            (
                "wp",
                "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing",
            ),
            (
                "wp14",
                "http://schemas.microsoft.com/office/word/2010/wordprocessingDrawing",
            ),
            ("w10", "urn:schemas-microsoft-com:office:word"),
            ("w", URI_W),
            ("w14", "http://schemas.microsoft.com/office/word/2010/wordml"),
            ("w15", "http://schemas.microsoft.com/office/word/2012/wordml"),
            ("w16", "http://schemas.microsoft.com/office/word/2018/wordml"),
            (
                "w16cid",
                "http://schemas.microsoft.com/office/word/2016/wordml/cid",
            ),
            (
                "w16cex",
                "http://schemas.microsoft.com/office/word/2018/wordml/cex",
            ),
            (
                "w16se",
                "http://schemas.microsoft.com/office/word/2015/wordml/symex",
            ),
            (
                "wpg",
                "http://schemas.microsoft.com/office/word/2010/wordprocessingGroup",
            ),
            (
                "wpi",
                "http://schemas.microsoft.com/office/word/2010/wordprocessingInk",
            ),
            ("wne", "http://schemas.microsoft.com/office/word/2006/wordml"),
            (
                "wps",
                "http://schemas.microsoft.com/office/word/2010/wordprocessingShape",
            ),
            ("xml", URI_XML),
        ])
    })
}

/// The OpenDocument registry (.odt, `content.xml`).
pub fn odt_namespaces() -> &'static XmlNamespaces {
    static REGISTRY: OnceLock<XmlNamespaces> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        XmlNamespaces::from_pairs(&[
            ("office", "urn:oasis:names:tc:opendocument:xmlns:office:1.0"),
            ("text", URI_ODF_TEXT),
            ("style", "urn:oasis:names:tc:opendocument:xmlns:style:1.0"),
            ("draw", "urn:oasis:names:tc:opendocument:xmlns:drawing:1.0"),
            (
                "fo",
                "urn:oasis:names:tc:opendocument:xmlns:xsl-fo-compatible:1.0",
            ),
            ("xlink", "http://www.w3.org/1999/xlink"),
            ("dc", "http://purl.org/dc/elements/1.1/"),
            ("meta", "urn:oasis:names:tc:opendocument:xmlns:meta:1.0"),
            (
                "number",
                "urn:oasis:names:tc:opendocument:xmlns:datastyle:1.0",
            ),
            ("svg", "urn:oasis:names:tc:opendocument:xmlns:svg-compatible:1.0"),
            ("table", "urn:oasis:names:tc:opendocument:xmlns:table:1.0"),
            (
                "loext",
                "urn:org:documentfoundation:names:experimental:office:xmlns:loext:1.0",
            ),
            ("xml", URI_XML),
        ])
    })
}

thread_local! {
    static XML_SPACE_CACHED: QName = QName::with_prefix(URI_XML, "space", "xml");
    static TEXT_C_CACHED: QName = QName::with_prefix(URI_ODF_TEXT, "c", "text");
}

/// `xml:space` attribute QName (XML 1.0 Sec. 2.10).
pub fn xml_space() -> QName {
    XML_SPACE_CACHED.with(|q| q.clone())
}

/// `text:c` repeat-count attribute QName (ODF 1.2 Sec. 19.763).
pub fn text_c() -> QName {
    TEXT_C_CACHED.with(|q| q.clone())
}
