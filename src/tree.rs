//! Document tree with the lxml-style text/tail model.
//!
//! Jedes Element traegt optionalen fuehrenden Text (`text`) und optionalen
//! Text NACH seinem End-Tag (`tail`), der logisch zum Textstrom des Parents
//! gehoert. Der volle Text eines Absatzes ist die Verschraenkung von
//! `text` und den `tail`-Werten der Kinder in Dokumentreihenfolge:
//!
//! ```xml
//! <p>TEXT<span>inner</span>TAIL</p>
//! ```
//!
//! `TEXT` ist `p.text`, `TAIL` ist `span.tail`. Invariante: der Absatztext
//! ist aus `(text, [child, tail]*)` verlustfrei rekonstruierbar.
//!
//! Ein Baum lebt genau eine Fix-Operation lang: aus den Bytes eines
//! Archiv-Eintrags geparst, in place mutiert, zurueckserialisiert.

mod parse;
mod write;

use crate::error::Result;
use crate::namespace::XmlNamespaces;
use crate::qname::QName;

/// An element node: qualified name, attributes, leading text, children,
/// and the tail text following its end tag.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Qualified element name.
    pub name: QName,
    /// Attributes in document order (namespace declarations excluded —
    /// die liefert beim Schreiben die Registry).
    pub attrs: Vec<(QName, String)>,
    /// Text before the first child.
    pub text: Option<String>,
    /// Child elements in document order.
    pub children: Vec<Element>,
    /// Text after this element's end tag, owned by the parent's text stream.
    pub tail: Option<String>,
}

impl Element {
    /// Creates an empty element.
    pub fn new(name: QName) -> Self {
        Self {
            name,
            attrs: Vec::new(),
            text: None,
            children: Vec::new(),
            tail: None,
        }
    }

    /// Looks up an attribute value by URI + local-name.
    pub fn attr(&self, uri: &str, local_name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(q, _)| q.is(uri, local_name))
            .map(|(_, v)| v.as_str())
    }

    /// Sets an attribute, replacing an existing one with the same identity.
    pub fn set_attr(&mut self, name: QName, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(q, _)| *q == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name, value)),
        }
    }
}

/// A parsed XML payload: root element plus the declaration's standalone flag.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// The root element.
    pub root: Element,
    /// `standalone` aus der XML-Deklaration (docx schreibt `yes`, ODF keins).
    pub(crate) standalone: Option<bool>,
}

impl Document {
    /// Parses a UTF-8 XML payload into a tree.
    pub fn parse(bytes: &[u8]) -> Result<Document> {
        parse::parse_document(bytes)
    }

    /// Serializes the tree back to bytes.
    ///
    /// The root element re-declares every namespace the tree actually uses,
    /// with the registry's prefixes; URIs the registry does not know get
    /// synthesized `ns0`, `ns1`, ... prefixes.
    pub fn to_bytes(&self, ns: &XmlNamespaces) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        write::write_document(self, ns, &mut buf)?;
        Ok(buf)
    }
}
