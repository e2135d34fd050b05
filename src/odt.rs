//! Dialect B: OpenDocument Text (.odt) — run-length marker elements.
//!
//! ODF kodiert Mehrfach-Leerzeichen nicht als Literale sondern als
//! kinderloses Marker-Element `<text:s text:c="N"/>` (ODF 1.2 Part 1
//! Sec. 6.1.3): N aufeinanderfolgende Spaces, die in keinem Text- oder
//! Tail-String stehen. Der Normalizer entfernt jeden Marker mit N > 1 und
//! spleisst ein einzelnes Leerzeichen an seiner Position in den Textstrom;
//! literale Runs werden zusaetzlich kollabiert.
//!
//! Ablauf pro Element (rekursiv, Kinder vor Entfernungs-Entscheidung):
//! 1. Eigenen `text` kollabieren.
//! 2. Kinder in Dokumentreihenfolge: erst rekursiv fixen, dann
//!    klassifizieren — jeder Kind-Tail wird kollabiert; Marker mit N > 1
//!    werden per Index zum Entfernen vorgemerkt.
//! 3. Vorgemerkte Entfernungen rueckwaerts (hoechster Index zuerst)
//!    anwenden, damit die vorher notierten Indizes gueltig bleiben. Der
//!    Tail wird erst JETZT vom Marker genommen — ein frueherer Splice kann
//!    ihn verlaengert haben (Marker direkt rechts von einem Marker), und
//!    der verlaengerte Teil darf nicht mit dem Element verschwinden. Dann:
//!    Space + Tail bauen, an `text` des Parents (Index 0) bzw. den Tail
//!    des linken Geschwisters anhaengen, Marker abhaengen.
//!
//! Statistik: ein Marker mit N > 1 zaehlt als genau ein Run mit N-1
//! entfernten Zeichen — dieselbe Semantik wie ein literaler Run; literale
//! Runs in Tails zaehlen im Vorwaertslauf. Die Schutz-Kollabierung beim
//! Spleissen (injiziertes Space + bereits bereinigter Nachbartext) zaehlt
//! nicht noch einmal; gezaehlt wird was im Quelldokument stand, nicht was
//! der Splice-Guard glattzieht.

use crate::collapse::{collapse, collapse_slot, FixStats};
use crate::namespace::URI_ODF_TEXT;
use crate::tree::Element;

/// Normalizes the tree in place and returns the totals.
pub fn normalize(root: &mut Element) -> FixStats {
    let mut stats = FixStats::default();
    fix_element(root, &mut stats);
    stats
}

/// Liest `text:c` mit Default 1 (fehlend oder fehlerhaft; ODF 1.2
/// Sec. 19.763). Kein Fehlerpfad — ein kaputtes Attribut macht aus dem
/// Marker ein einzelnes echtes Leerzeichen.
fn repeat_count(elem: &Element) -> u32 {
    match elem.attr(URI_ODF_TEXT, "c") {
        None => 1,
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            log::warn!("malformed text:c value {raw:?}, treating as 1");
            1
        }),
    }
}

fn is_space_marker(elem: &Element) -> bool {
    elem.name.is(URI_ODF_TEXT, "s")
}

fn fix_element(elem: &mut Element, stats: &mut FixStats) {
    collapse_slot(&mut elem.text, stats);

    // Indizes der zu entfernenden Marker (text:s mit c > 1).
    let mut to_remove: Vec<usize> = Vec::new();
    for (i, child) in elem.children.iter_mut().enumerate() {
        fix_element(child, stats);
        if is_space_marker(child) {
            let count = repeat_count(child);
            if count > 1 {
                stats.merge(FixStats {
                    runs: 1,
                    chars_removed: count - 1,
                });
                to_remove.push(i);
            }
        }
        // Jeder Tail traegt seine eigenen literalen Runs — die zaehlen,
        // auch der Tail eines Markers der gleich verschwindet.
        collapse_slot(&mut child.tail, stats);
    }

    // Rueckwaerts entfernen, damit die Indizes gueltig bleiben. Der Tail
    // wird erst hier gelesen: ein bereits verarbeiteter rechter Nachbar
    // kann ihn per Splice verlaengert haben.
    for i in to_remove.into_iter().rev() {
        let tail = elem.children[i].tail.take().unwrap_or_default();
        // Injiziertes Space + Tail: Guard gegen neues Doppel-Space, zaehlt
        // nicht (das Space ersetzt den Marker, der schon gezaehlt ist; der
        // Tail ist seit dem Vorwaertslauf sauber).
        let space_plus_tail_src = format!(" {tail}");
        let (space_plus_tail, _) = collapse(&space_plus_tail_src);
        if i == 0 {
            let joined = format!(
                "{}{space_plus_tail}",
                elem.text.take().unwrap_or_default()
            );
            let (fixed, _) = collapse(&joined);
            elem.text = Some(fixed.into_owned());
        } else {
            let prev = &mut elem.children[i - 1];
            let joined = format!("{}{space_plus_tail}", prev.tail.take().unwrap_or_default());
            let (fixed, _) = collapse(&joined);
            prev.tail = Some(fixed.into_owned());
        }
        elem.children.remove(i);
    }
}

/// Plain-text projection: one line per `text:p` / `text:h`.
///
/// Ueberlebende `text:s`-Marker expandieren zu `text:c` Leerzeichen, damit
/// der rekonstruierte Text dem Dokumenttext entspricht. Lossy by design —
/// nur fuer Vorher/Nachher-Anzeige, wird nie zurueckgeschrieben.
pub fn plain_text(root: &Element) -> String {
    let mut lines = Vec::new();
    visit_paragraphs(root, &mut lines);
    lines.join("\n")
}

fn is_paragraph(elem: &Element) -> bool {
    elem.name.is(URI_ODF_TEXT, "p") || elem.name.is(URI_ODF_TEXT, "h")
}

fn visit_paragraphs(elem: &Element, lines: &mut Vec<String>) {
    if is_paragraph(elem) {
        let mut line = String::new();
        if let Some(text) = &elem.text {
            line.push_str(text);
        }
        for child in &elem.children {
            render(child, &mut line);
        }
        lines.push(line);
    }
    for child in &elem.children {
        visit_paragraphs(child, lines);
    }
}

fn render(elem: &Element, out: &mut String) {
    if is_space_marker(elem) {
        for _ in 0..repeat_count(elem) {
            out.push(' ');
        }
        if let Some(tail) = &elem.tail {
            out.push_str(tail);
        }
        return;
    }
    if let Some(text) = &elem.text {
        out.push_str(text);
    }
    for child in &elem.children {
        render(child, out);
    }
    if let Some(tail) = &elem.tail {
        out.push_str(tail);
    }
}
