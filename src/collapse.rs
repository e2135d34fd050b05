//! Space-run collapsing: the scalar half of the normalizer.
//!
//! Ein "space run" ist eine maximale Folge von 2+ Zeichen aus
//! {U+0020 SPACE, U+00A0 NO-BREAK SPACE}. Jeder Run wird durch genau ein
//! ASCII-Leerzeichen ersetzt. Einzelne Spaces/NBSPs bleiben unberuehrt —
//! die sind bereits semantisch korrekt.
//!
//! Die Funktion ist pur und zustandslos; die Statistik akkumuliert der
//! Aufrufer pro Dokument in [`FixStats`].

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

/// Matcht jede maximale Folge von 2+ Space/NBSP-Zeichen.
static EXTRA_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("[ \u{00A0}]{2,}").expect("space-run pattern"));

/// Counters accumulated over one fix pass.
///
/// `runs` zaehlt kollabierte Runs bzw. entfernte Marker-Elemente;
/// `chars_removed` die dabei eliminierten Zeichen (Run-Laenge minus 1,
/// ueber alle Runs summiert; Zeichen, nicht Bytes — NBSP zaehlt als 1).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FixStats {
    /// Number of space runs / marker elements collapsed.
    pub runs: u32,
    /// Number of characters eliminated.
    pub chars_removed: u32,
}

impl FixStats {
    /// Adds another accumulator into this one.
    pub fn merge(&mut self, other: FixStats) {
        self.runs += other.runs;
        self.chars_removed += other.chars_removed;
    }

    /// True when nothing was collapsed.
    pub fn is_clean(&self) -> bool {
        self.runs == 0
    }
}

/// Collapses every space run in `s` to a single ASCII space.
///
/// Returns the transformed string (borrowed when nothing matched) and the
/// per-string statistics. Gemischte Space/NBSP-Runs kollabieren identisch
/// zu reinen Runs — beide Zeichen gelten als gleichwertiger Whitespace.
pub fn collapse(s: &str) -> (Cow<'_, str>, FixStats) {
    let mut stats = FixStats::default();
    let mut out = String::new();
    let mut last = 0;
    for m in EXTRA_SPACE.find_iter(s) {
        if stats.runs == 0 {
            out.reserve(s.len());
        }
        stats.runs += 1;
        stats.chars_removed += m.as_str().chars().count() as u32 - 1;
        out.push_str(&s[last..m.start()]);
        out.push(' ');
        last = m.end();
    }
    if stats.runs == 0 {
        return (Cow::Borrowed(s), stats);
    }
    out.push_str(&s[last..]);
    (Cow::Owned(out), stats)
}

/// Collapses an optional text slot in place, accumulating into `stats`.
///
/// `None` ist ein No-op (abwesender Text zaehlt nicht als leerer Text).
/// Returns true when the value changed.
pub(crate) fn collapse_slot(slot: &mut Option<String>, stats: &mut FixStats) -> bool {
    let Some(value) = slot.as_deref() else {
        return false;
    };
    let (fixed, s) = collapse(value);
    if s.runs == 0 {
        return false;
    }
    let fixed = fixed.into_owned();
    stats.merge(s);
    *slot = Some(fixed);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collapsed(s: &str) -> (String, u32, u32) {
        let (value, stats) = collapse(s);
        (value.into_owned(), stats.runs, stats.chars_removed)
    }

    #[test]
    fn leerer_string_bleibt_leer() {
        let (value, runs, chars) = collapsed("");
        assert_eq!(value, "");
        assert_eq!((runs, chars), (0, 0));
    }

    #[test]
    fn einzelnes_space_unberuehrt() {
        let (value, runs, _) = collapsed("a b");
        assert_eq!(value, "a b");
        assert_eq!(runs, 0);
    }

    #[test]
    fn einzelnes_nbsp_unberuehrt() {
        let (value, runs, _) = collapsed("a\u{00A0}b");
        assert_eq!(value, "a\u{00A0}b");
        assert_eq!(runs, 0);
    }

    #[test]
    fn zwei_spaces_werden_eins() {
        let (value, runs, chars) = collapsed("a  b");
        assert_eq!(value, "a b");
        assert_eq!((runs, chars), (1, 1));
    }

    #[test]
    fn zwanzig_spaces_ein_run() {
        let input = format!("cheers{}erupting", " ".repeat(20));
        let (value, runs, chars) = collapsed(&input);
        assert_eq!(value, "cheers erupting");
        assert_eq!((runs, chars), (1, 19));
    }

    #[test]
    fn nbsp_run_kollabiert_zu_ascii_space() {
        let (value, runs, chars) = collapsed("cheers\u{00A0}\u{00A0}\u{00A0}\u{00A0}\u{00A0}erupting");
        assert_eq!(value, "cheers erupting");
        assert_eq!((runs, chars), (1, 4));
    }

    #[test]
    fn gemischter_run_kollabiert_identisch() {
        let (value, runs, chars) = collapsed("a \u{00A0} \u{00A0}b");
        assert_eq!(value, "a b");
        assert_eq!((runs, chars), (1, 3));
    }

    #[test]
    fn mehrere_runs_im_string() {
        let (value, runs, chars) = collapsed("a  b   c    d");
        assert_eq!(value, "a b c d");
        assert_eq!(runs, 3);
        assert_eq!(chars, 1 + 2 + 3);
    }

    #[test]
    fn runs_am_rand() {
        let (value, runs, chars) = collapsed("  mitte  ");
        assert_eq!(value, " mitte ");
        assert_eq!((runs, chars), (2, 2));
    }

    #[test]
    fn tabs_und_newlines_sind_kein_run() {
        let (value, runs, _) = collapsed("a\t\tb\n\nc");
        assert_eq!(value, "a\t\tb\n\nc");
        assert_eq!(runs, 0);
    }

    #[test]
    fn unveraenderter_string_ist_borrowed() {
        let (value, _) = collapse("kein run");
        assert!(matches!(value, Cow::Borrowed(_)));
    }

    #[test]
    fn idempotent() {
        let (once, stats1) = collapse("a    b");
        assert_eq!(stats1.runs, 1);
        let (twice, stats2) = collapse(&once);
        assert_eq!(&*twice, &*once);
        assert!(stats2.is_clean());
    }

    #[test]
    fn nicht_whitespace_bleibt_erhalten() {
        let input = "x  \u{00A0}y  z";
        let (value, _) = collapse(input);
        let strip = |s: &str| {
            s.chars()
                .filter(|c| *c != ' ' && *c != '\u{00A0}')
                .collect::<String>()
        };
        assert_eq!(strip(input), strip(&value));
    }

    #[test]
    fn slot_none_ist_noop() {
        let mut slot: Option<String> = None;
        let mut stats = FixStats::default();
        assert!(!collapse_slot(&mut slot, &mut stats));
        assert!(slot.is_none());
        assert!(stats.is_clean());
    }

    #[test]
    fn slot_wird_in_place_kollabiert() {
        let mut slot = Some("a   b".to_string());
        let mut stats = FixStats::default();
        assert!(collapse_slot(&mut slot, &mut stats));
        assert_eq!(slot.as_deref(), Some("a b"));
        assert_eq!(stats.runs, 1);
        assert_eq!(stats.chars_removed, 2);
    }

    #[test]
    fn stats_merge_addiert() {
        let mut a = FixStats {
            runs: 2,
            chars_removed: 7,
        };
        a.merge(FixStats {
            runs: 1,
            chars_removed: 3,
        });
        assert_eq!(a.runs, 3);
        assert_eq!(a.chars_removed, 10);
    }
}
