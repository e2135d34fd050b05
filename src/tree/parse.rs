//! XML bytes -> [`Document`] via quick-xml.
//!
//! Baut den Baum aus dem NsReader-Eventstrom. Textzuordnung folgt dem
//! text/tail-Modell: Text vor dem ersten Kind landet in `text`, Text nach
//! Kind k im `tail` von Kind k; benachbarte Text-Events werden koalesziert.
//! Kommentare und PIs kommen in `word/document.xml` / `content.xml` in der
//! Praxis nicht vor und werden uebersprungen.

use std::borrow::Cow;

use memchr::memchr;
use quick_xml::escape::{resolve_predefined_entity, unescape};
use quick_xml::events::{BytesCData, BytesStart, BytesText, Event};
use quick_xml::name::{QName as XmlQName, ResolveResult};
use quick_xml::reader::NsReader;

use super::{Document, Element};
use crate::error::Error;
use crate::qname::{compute_identity, QName};
use crate::FastHashMap;
use crate::Result;

pub(crate) fn parse_document(bytes: &[u8]) -> Result<Document> {
    let mut reader = NsReader::from_reader(bytes);
    reader.config_mut().trim_text(false);

    let mut buf = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;
    let mut standalone: Option<bool> = None;
    // QName-Pool: cached wiederkehrende QNames — ein document.xml wiederholt
    // dieselben ~20 Namen tausendfach.
    let mut qname_pool: FastHashMap<u64, QName> =
        FastHashMap::with_capacity_and_hasher(32, Default::default());

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Decl(d)) => {
                standalone = match d.standalone() {
                    Some(Ok(v)) => Some(v.as_ref() == b"yes"),
                    _ => None,
                };
            }
            Ok(Event::Start(e)) => {
                if stack.is_empty() && root.is_some() {
                    return Err(Error::XmlParseError("second root element".to_string()));
                }
                let elem = start_element(&reader, &e, &mut qname_pool)?;
                stack.push(elem);
            }
            Ok(Event::Empty(e)) => {
                if stack.is_empty() && root.is_some() {
                    return Err(Error::XmlParseError("second root element".to_string()));
                }
                let elem = start_element(&reader, &e, &mut qname_pool)?;
                attach(elem, &mut stack, &mut root);
            }
            Ok(Event::End(_)) => {
                let elem = stack.pop().ok_or_else(|| {
                    Error::XmlParseError("unerwartetes End-Element bei depth=0".to_string())
                })?;
                attach(elem, &mut stack, &mut root);
            }
            Ok(Event::Text(e)) => {
                if let Some(text) = decode_text(&e)? {
                    push_text(&mut stack, &text)?;
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(text) = decode_cdata(&e)? {
                    push_text(&mut stack, &text)?;
                }
            }
            Ok(Event::GeneralRef(e)) => {
                let name = std::str::from_utf8(e.as_ref())
                    .map_err(|er| Error::XmlParseError(er.to_string()))?;
                if name.starts_with('#') {
                    if let Some(ch) = resolve_char_reference(name) {
                        push_text(&mut stack, &ch.to_string())?;
                    }
                } else if let Some(resolved) = resolve_predefined_entity(name) {
                    push_text(&mut stack, resolved)?;
                } else {
                    // DTD-Entities kommen in Office-Payloads nicht vor.
                    log::warn!("unresolved entity reference '&{name};' dropped");
                }
            }
            Ok(Event::Comment(_) | Event::PI(_) | Event::DocType(_)) => {}
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlParseError(format!(
                    "parse XML error at {:?}: {e}",
                    reader.buffer_position()
                )));
            }
        }

        buf.clear();
    }

    if !stack.is_empty() {
        return Err(Error::XmlParseError("unclosed element at end of input".to_string()));
    }
    let root = root.ok_or_else(|| Error::XmlParseError("no root element".to_string()))?;
    Ok(Document { root, standalone })
}

/// Haengt ein fertiges Element an den Parent (oder setzt es als Root).
fn attach(elem: Element, stack: &mut Vec<Element>, root: &mut Option<Element>) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(elem),
        None => *root = Some(elem),
    }
}

/// Haengt Text an die aktuelle Position: `text` des offenen Elements wenn
/// es noch keine Kinder hat, sonst `tail` des letzten Kindes.
fn push_text(stack: &mut Vec<Element>, text: &str) -> Result<()> {
    let Some(top) = stack.last_mut() else {
        if text.trim().is_empty() {
            return Ok(());
        }
        return Err(Error::XmlParseError(
            "character data outside root element".to_string(),
        ));
    };
    let slot = match top.children.last_mut() {
        Some(last) => &mut last.tail,
        None => &mut top.text,
    };
    match slot {
        Some(existing) => existing.push_str(text),
        None => *slot = Some(text.to_string()),
    }
    Ok(())
}

fn start_element(
    reader: &NsReader<impl std::io::BufRead>,
    e: &BytesStart<'_>,
    pool: &mut FastHashMap<u64, QName>,
) -> Result<Element> {
    let name = resolve_qname(reader, e.name(), pool, true)?;
    let mut elem = Element::new(name);

    for attr in e.attributes().with_checks(false) {
        let attr = attr.map_err(|er| Error::XmlParseError(er.to_string()))?;
        let key = attr.key.as_ref();
        // xmlns-Deklarationen landen nicht im Baum — beim Schreiben
        // deklariert die Registry.
        if key == b"xmlns" || key.starts_with(b"xmlns:") {
            continue;
        }
        let qname = resolve_qname(reader, attr.key, pool, false)?;
        let raw = std::str::from_utf8(attr.value.as_ref())
            .map_err(|er| Error::XmlParseError(er.to_string()))?;
        let value = unescape(raw).map_err(|er| Error::XmlParseError(er.to_string()))?;
        let value = normalize_line_endings(&value).into_owned();
        elem.attrs.push((qname, value));
    }

    Ok(elem)
}

/// Loest einen rohen XML-Namen zu (URI, local, prefix) auf, gepoolt.
fn resolve_qname(
    reader: &NsReader<impl std::io::BufRead>,
    name: XmlQName<'_>,
    pool: &mut FastHashMap<u64, QName>,
    is_element: bool,
) -> Result<QName> {
    let (ns, local) = if is_element {
        reader.resolver().resolve_element(name)
    } else {
        reader.resolver().resolve_attribute(name)
    };
    let uri = resolve_to_uri(ns)?;
    let local_name = std::str::from_utf8(local.as_ref())
        .map_err(|er| Error::XmlParseError(er.to_string()))?;

    let identity = compute_identity(&uri, local_name);
    let qname = pool.entry(identity).or_insert_with(|| {
        let prefix = split_prefix(name.as_ref())
            .and_then(|p| std::str::from_utf8(p).ok())
            .map(Into::into);
        QName::with_optional_prefix(uri.as_str().into(), local_name.into(), prefix)
    });
    debug_assert!(
        &*qname.uri == uri && &*qname.local_name == local_name,
        "resolve_qname: Hash-Kollision fuer ({uri}, {local_name}) vs ({}, {})",
        qname.uri,
        qname.local_name,
    );
    Ok(qname.clone())
}

fn resolve_to_uri(ns: ResolveResult<'_>) -> Result<String> {
    match ns {
        ResolveResult::Bound(ns) => std::str::from_utf8(ns.as_ref())
            .map(str::to_owned)
            .map_err(|er| Error::XmlParseError(er.to_string())),
        ResolveResult::Unbound => Ok(String::new()),
        ResolveResult::Unknown(_) => {
            Err(Error::XmlParseError("unknown namespace prefix".into()))
        }
    }
}

fn split_prefix(name: &[u8]) -> Option<&[u8]> {
    let pos = name.iter().position(|b| *b == b':')?;
    Some(&name[..pos])
}

fn decode_text(e: &BytesText<'_>) -> Result<Option<String>> {
    let raw = std::str::from_utf8(e.as_ref())
        .map_err(|er| Error::XmlParseError(er.to_string()))?;
    let text = unescape(raw).map_err(|er| Error::XmlParseError(er.to_string()))?;
    if text.is_empty() {
        Ok(None)
    } else {
        Ok(Some(normalize_line_endings(&text).into_owned()))
    }
}

fn decode_cdata(e: &BytesCData<'_>) -> Result<Option<String>> {
    let raw = std::str::from_utf8(e.as_ref())
        .map_err(|er| Error::XmlParseError(er.to_string()))?;
    if raw.is_empty() {
        Ok(None)
    } else {
        Ok(Some(normalize_line_endings(raw).into_owned()))
    }
}

/// XML 1.0 Sec. 2.11: \r\n -> \n, alleinstehende \r -> \n
fn normalize_line_endings<'a>(s: &'a str) -> Cow<'a, str> {
    if memchr(b'\r', s.as_bytes()).is_none() {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\r' {
            if matches!(chars.peek(), Some('\n')) {
                chars.next();
            }
            out.push('\n');
        } else {
            out.push(ch);
        }
    }
    Cow::Owned(out)
}

/// Loest `#xHH` / `#DD` Zeichenreferenzen auf.
fn resolve_char_reference(name: &str) -> Option<char> {
    let rest = name.strip_prefix('#')?;
    let code = if let Some(hex) = rest.strip_prefix('x').or_else(|| rest.strip_prefix('X')) {
        u32::from_str_radix(hex, 16).ok()?
    } else {
        rest.parse().ok()?
    };
    char::from_u32(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespace::URI_ODF_TEXT;

    fn parse(xml: &str) -> Document {
        Document::parse(xml.as_bytes()).expect("parse")
    }

    #[test]
    fn einfaches_element_mit_text() {
        let doc = parse("<root>hello</root>");
        assert!(doc.root.name.is("", "root"));
        assert_eq!(doc.root.text.as_deref(), Some("hello"));
        assert!(doc.root.children.is_empty());
    }

    #[test]
    fn text_und_tail_zuordnung() {
        let doc = parse("<p>TEXT<span>inner</span>TAIL</p>");
        assert_eq!(doc.root.text.as_deref(), Some("TEXT"));
        assert_eq!(doc.root.children.len(), 1);
        let span = &doc.root.children[0];
        assert_eq!(span.text.as_deref(), Some("inner"));
        assert_eq!(span.tail.as_deref(), Some("TAIL"));
    }

    #[test]
    fn tail_zwischen_geschwistern() {
        let doc = parse("<p><a/>eins<b/>zwei</p>");
        assert!(doc.root.text.is_none());
        assert_eq!(doc.root.children[0].tail.as_deref(), Some("eins"));
        assert_eq!(doc.root.children[1].tail.as_deref(), Some("zwei"));
    }

    #[test]
    fn namespace_aufloesung() {
        let doc = parse(
            r#"<text:p xmlns:text="urn:oasis:names:tc:opendocument:xmlns:text:1.0"><text:s text:c="5"/></text:p>"#,
        );
        assert!(doc.root.name.is(URI_ODF_TEXT, "p"));
        let s = &doc.root.children[0];
        assert!(s.name.is(URI_ODF_TEXT, "s"));
        assert_eq!(s.attr(URI_ODF_TEXT, "c"), Some("5"));
    }

    #[test]
    fn xmlns_deklarationen_nicht_als_attribute() {
        let doc = parse(r#"<r xmlns:a="urn:a" xmlns="urn:default" a:x="1"/>"#);
        assert_eq!(doc.root.attrs.len(), 1);
        assert_eq!(doc.root.attr("urn:a", "x"), Some("1"));
    }

    #[test]
    fn entities_werden_aufgeloest() {
        let doc = parse("<r>a&amp;b&#x20;c&#65;</r>");
        assert_eq!(doc.root.text.as_deref(), Some("a&b cA"));
    }

    #[test]
    fn xml_space_attribut_aufgeloest() {
        let doc = parse(r#"<r xml:space="preserve"> x </r>"#);
        assert_eq!(
            doc.root.attr("http://www.w3.org/XML/1998/namespace", "space"),
            Some("preserve")
        );
        assert_eq!(doc.root.text.as_deref(), Some(" x "));
    }

    #[test]
    fn standalone_aus_deklaration() {
        let doc = parse(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><r/>"#);
        assert_eq!(doc.standalone, Some(true));
        let doc = parse(r#"<?xml version="1.0" encoding="UTF-8"?><r/>"#);
        assert_eq!(doc.standalone, None);
    }

    #[test]
    fn cr_lf_normalisierung() {
        let doc = Document::parse(b"<r>a\r\nb\rc</r>").expect("parse");
        assert_eq!(doc.root.text.as_deref(), Some("a\nb\nc"));
    }

    #[test]
    fn nbsp_ueberlebt_den_parser() {
        let doc = parse("<r>a\u{00A0}\u{00A0}b</r>");
        assert_eq!(doc.root.text.as_deref(), Some("a\u{00A0}\u{00A0}b"));
    }

    #[test]
    fn malformed_xml_ist_fehler() {
        let err = Document::parse(b"<r><unclosed></r>").unwrap_err();
        assert!(matches!(err, Error::XmlParseError(_)));
    }

    #[test]
    fn leere_eingabe_ist_fehler() {
        let err = Document::parse(b"").unwrap_err();
        assert!(matches!(err, Error::XmlParseError(msg) if msg.contains("no root")));
    }

    #[test]
    fn text_ausserhalb_root_ist_fehler() {
        let err = Document::parse(b"<r/>oops").unwrap_err();
        assert!(matches!(err, Error::XmlParseError(_)));
    }

    #[test]
    fn whitespace_ausserhalb_root_ok() {
        let doc = Document::parse(b"  <r/>\n").expect("parse");
        assert!(doc.root.name.is("", "r"));
    }
}
