//! [`Document`] -> XML bytes.
//!
//! Streaming-Serializer, der direkt in `impl Write` schreibt. Das
//! Root-Element deklariert jeden tatsaechlich benutzten Namespace mit dem
//! Prefix aus der Registry; URIs ausserhalb der Registry bekommen
//! synthetische `ns0`, `ns1`, ... Prefixes. Textinhalt wird exakt so
//! geschrieben wie er im Baum steht — der Serializer trimmt und
//! normalisiert nichts, `xml:space="preserve"` landet byte-genau im Output.

use std::io::Write;

use crate::error::Error;
use crate::namespace::{XmlNamespaces, URI_XML};
use crate::qname::QName;
use crate::FastIndexMap;
use crate::Result;

use super::{Document, Element};

pub(crate) fn write_document(
    doc: &Document,
    ns: &XmlNamespaces,
    writer: &mut impl Write,
) -> Result<()> {
    w(writer, "<?xml version=\"1.0\" encoding=\"UTF-8\"")?;
    match doc.standalone {
        Some(true) => w(writer, " standalone=\"yes\"")?,
        Some(false) => w(writer, " standalone=\"no\"")?,
        None => {}
    }
    w(writer, "?>")?;

    let prefixes = collect_prefixes(&doc.root, ns);
    write_element(writer, &doc.root, &prefixes, true)?;
    writer.flush().map_err(io_err)
}

/// URI -> Prefix fuer alle im Baum benutzten Namespaces, in der Reihenfolge
/// des ersten Auftretens.
fn collect_prefixes(root: &Element, ns: &XmlNamespaces) -> FastIndexMap<String, String> {
    let mut map = FastIndexMap::default();
    let mut synthetic_counter = 0usize;
    collect(root, ns, &mut map, &mut synthetic_counter);
    map
}

fn collect(
    elem: &Element,
    ns: &XmlNamespaces,
    map: &mut FastIndexMap<String, String>,
    counter: &mut usize,
) {
    note_uri(&elem.name, ns, map, counter);
    for (attr_name, _) in &elem.attrs {
        note_uri(attr_name, ns, map, counter);
    }
    for child in &elem.children {
        collect(child, ns, map, counter);
    }
}

fn note_uri(
    name: &QName,
    ns: &XmlNamespaces,
    map: &mut FastIndexMap<String, String>,
    counter: &mut usize,
) {
    let uri = &*name.uri;
    // xml ist implizit gebunden und wird nie deklariert.
    if uri.is_empty() || uri == URI_XML || map.contains_key(uri) {
        return;
    }
    let prefix = match ns.prefix_for(uri) {
        Some(p) => p.to_string(),
        None => loop {
            let candidate = format!("ns{counter}");
            *counter += 1;
            if ns.uri(&candidate).is_none() {
                break candidate;
            }
        },
    };
    map.insert(uri.to_string(), prefix);
}

fn write_element(
    writer: &mut impl Write,
    elem: &Element,
    prefixes: &FastIndexMap<String, String>,
    is_root: bool,
) -> Result<()> {
    w(writer, "<")?;
    write_name(writer, &elem.name, prefixes)?;

    if is_root {
        for (uri, prefix) in prefixes {
            w(writer, " xmlns:")?;
            w(writer, prefix)?;
            w(writer, "=\"")?;
            write_escaped_attr(writer, uri)?;
            w(writer, "\"")?;
        }
    }

    for (attr_name, value) in &elem.attrs {
        w(writer, " ")?;
        write_name(writer, attr_name, prefixes)?;
        w(writer, "=\"")?;
        write_escaped_attr(writer, value)?;
        w(writer, "\"")?;
    }

    if elem.text.is_none() && elem.children.is_empty() {
        return w(writer, "/>");
    }

    w(writer, ">")?;
    if let Some(text) = &elem.text {
        write_escaped_text(writer, text)?;
    }
    for child in &elem.children {
        write_element(writer, child, prefixes, false)?;
        if let Some(tail) = &child.tail {
            write_escaped_text(writer, tail)?;
        }
    }
    w(writer, "</")?;
    write_name(writer, &elem.name, prefixes)?;
    w(writer, ">")
}

/// Schreibt einen qualifizierten Namen mit dem Registry-/Synthese-Prefix.
fn write_name(
    writer: &mut impl Write,
    name: &QName,
    prefixes: &FastIndexMap<String, String>,
) -> Result<()> {
    let uri = &*name.uri;
    if uri.is_empty() {
        return w(writer, &name.local_name);
    }
    if uri == URI_XML {
        w(writer, "xml:")?;
        return w(writer, &name.local_name);
    }
    // collect_prefixes hat jeden Baum-URI erfasst.
    let prefix = prefixes
        .get(uri)
        .map(String::as_str)
        .or(name.prefix.as_deref())
        .unwrap_or_default();
    if !prefix.is_empty() {
        w(writer, prefix)?;
        w(writer, ":")?;
    }
    w(writer, &name.local_name)
}

/// io::Error -> Error Konvertierung.
fn io_err(e: std::io::Error) -> Error {
    Error::IoError(e.to_string())
}

/// Schreibt einen String als Bytes in den Writer.
#[inline]
fn w(writer: &mut impl Write, s: &str) -> Result<()> {
    writer.write_all(s.as_bytes()).map_err(io_err)
}

/// XML-Escaping mit memchr3-SIMD: Sucht drei Zeichen gleichzeitig und
/// ersetzt sie. Grosse Bloecke ohne Escape-Zeichen werden in einem Stueck
/// geschrieben.
fn write_escaped_memchr3(
    w: &mut impl Write,
    s: &str,
    needle: [u8; 3],
    replacement: [&[u8]; 3],
) -> Result<()> {
    let bytes = s.as_bytes();
    let mut start = 0;
    while start < bytes.len() {
        match memchr::memchr3(needle[0], needle[1], needle[2], &bytes[start..]) {
            Some(offset) => {
                let pos = start + offset;
                if start < pos {
                    w.write_all(&bytes[start..pos]).map_err(io_err)?;
                }
                let idx = needle.iter().position(|&n| n == bytes[pos]).unwrap();
                w.write_all(replacement[idx]).map_err(io_err)?;
                start = pos + 1;
            }
            None => {
                w.write_all(&bytes[start..]).map_err(io_err)?;
                break;
            }
        }
    }
    Ok(())
}

/// XML-Escaping fuer Text-Inhalt: & < > -> &amp; &lt; &gt;
fn write_escaped_text(w: &mut impl Write, s: &str) -> Result<()> {
    write_escaped_memchr3(w, s, [b'&', b'<', b'>'], [b"&amp;", b"&lt;", b"&gt;"])
}

/// XML-Escaping fuer Attribut-Werte: & < " -> &amp; &lt; &quot;
fn write_escaped_attr(w: &mut impl Write, s: &str) -> Result<()> {
    write_escaped_memchr3(w, s, [b'&', b'<', b'"'], [b"&amp;", b"&lt;", b"&quot;"])
}
