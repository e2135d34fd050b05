//! Dialect A: WordprocessingML (.docx) — literal space runs.
//!
//! Word Online schreibt Mehrfach-Leerzeichen als wortwoertliche Space/NBSP-
//! Runs in `<w:t>`-Textknoten (ECMA-376 Part 1 Sec. 17.3.3.31). Der Walk
//! kollabiert `text` und `tail` jedes `w:t` unabhaengig. Bleibt nach dem
//! Kollabieren fuehrender oder schliessender Whitespace im *Text* stehen,
//! wird `xml:space="preserve"` gesetzt — sonst darf ein Konsument den
//! Randwhitespace beim Wiederoeffnen strippen (XML 1.0 Sec. 2.10).
//! Tail-Werte brauchen das Flag nie. Dieser Dialekt aendert nur Strings,
//! nie die Struktur.

use crate::collapse::{collapse, collapse_slot, FixStats};
use crate::namespace::{xml_space, URI_W};
use crate::tree::Element;

/// Collapses every space run under `root` in place and returns the totals.
pub fn normalize(root: &mut Element) -> FixStats {
    let mut stats = FixStats::default();
    walk(root, &mut stats);
    stats
}

fn walk(elem: &mut Element, stats: &mut FixStats) {
    if elem.name.is(URI_W, "t") {
        fix_text_node(elem, stats);
    }
    for child in &mut elem.children {
        walk(child, stats);
    }
}

fn fix_text_node(elem: &mut Element, stats: &mut FixStats) {
    if let Some(text) = elem.text.take() {
        let (fixed, s) = collapse(&text);
        if s.runs > 0 {
            let fixed = fixed.into_owned();
            if fixed != fixed.trim() {
                elem.set_attr(xml_space(), "preserve");
            }
            stats.merge(s);
            elem.text = Some(fixed);
        } else {
            elem.text = Some(text);
        }
    }
    collapse_slot(&mut elem.tail, stats);
}

/// Plain-text projection: one line per `w:p`, the concatenation of all
/// descendant `w:t` text values in document order.
///
/// Verschachtelte `w:p` (Textboxen) liefern wie beim Tree-Iterator eigene
/// Zeilen zusaetzlich zur umschliessenden. Lossy by design — nur fuer
/// Vorher/Nachher-Anzeige, wird nie zurueckgeschrieben.
pub fn plain_text(root: &Element) -> String {
    let mut lines = Vec::new();
    visit_paragraphs(root, &mut lines);
    lines.join("\n")
}

fn visit_paragraphs(elem: &Element, lines: &mut Vec<String>) {
    if elem.name.is(URI_W, "p") {
        let mut line = String::new();
        gather_text(elem, &mut line);
        lines.push(line);
    }
    for child in &elem.children {
        visit_paragraphs(child, lines);
    }
}

fn gather_text(elem: &Element, out: &mut String) {
    if elem.name.is(URI_W, "t") {
        if let Some(text) = &elem.text {
            out.push_str(text);
        }
    }
    for child in &elem.children {
        gather_text(child, out);
    }
}
