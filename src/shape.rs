/*!
Structural analysis of a parsed pattern.

The selection rules don't want to re-walk the HIR over and over, so this
module computes all of the shape facts once: anchoring, "dot star" prefixes,
byte-class sequences, literal branch tables, digit-lead proofs and inner
literals. Everything here is conservative: when a pattern doesn't fit a shape
exactly, the fact is simply absent and a more general strategy gets picked.
*/

use regex_syntax::hir::{
    literal::{Extractor, Seq},
    Class, Hir, HirKind, Look,
};

use crate::util::byteset::ByteSet;

/// The shape facts for one pattern.
#[derive(Debug, Default)]
pub(crate) struct Shape {
    /// Every match starts at the beginning of the haystack (`^` or `\A`).
    pub(crate) start_anchored: bool,
    /// Every match ends at the end of the haystack (`\z`, or `$` outside
    /// multiline mode).
    pub(crate) end_anchored: bool,
    /// Every match starts at a `(?m)^` line boundary.
    pub(crate) line_start: bool,
    /// A `\b` or `\B` appears somewhere.
    pub(crate) has_word_boundary: bool,
    /// The pattern is `^prefix(?s:.)*suffix$` (or `^literal$`), decidable by
    /// comparing the ends of the haystack.
    pub(crate) anchored_ends: Option<AnchoredEnds>,
    /// The pattern begins with an unbounded universal repetition.
    pub(crate) dot_star: Option<DotStar>,
    /// For a `(?m)^` pattern: the part after the anchor cannot match `\n`,
    /// so every match stays on one line.
    pub(crate) line_suffix_ok: bool,
    /// The pattern is a concatenation of greedy `[class]+` repetitions with
    /// ASCII-expressible, pairwise-disjoint classes.
    pub(crate) classes: Option<Vec<ByteSet>>,
    /// The pattern is `^(lit|lit|...)` with distinct first bytes.
    pub(crate) branches: Option<Vec<Vec<u8>>>,
    /// Every match starts with an ASCII digit.
    pub(crate) digit_lead: bool,
    /// Literals extracted from just after a leading dot-star, usable as an
    /// inner prefilter.
    pub(crate) inner_literals: Option<Vec<Vec<u8>>>,
}

/// The decomposition of `^prefix(?s:.)*suffix$`.
#[derive(Debug)]
pub(crate) struct AnchoredEnds {
    pub(crate) prefix: Vec<u8>,
    pub(crate) suffix: Vec<u8>,
    /// When false, there is no wildcard: the pattern is `^literal$` and the
    /// haystack must equal `prefix` exactly.
    pub(crate) wild: bool,
}

/// A leading `.*`-style repetition.
#[derive(Debug)]
pub(crate) struct DotStar {
    /// The repeated class also matches `\n`.
    pub(crate) dotall: bool,
    /// The rest of the pattern cannot match `\n`. Required for the
    /// line-bounded candidate logic when `dotall` is false.
    pub(crate) one_line_body: bool,
}

impl Shape {
    pub(crate) fn analyze(hir: &Hir) -> Shape {
        let props = hir.properties();
        let mut shape = Shape {
            start_anchored: props.look_set_prefix().contains(Look::Start),
            end_anchored: props.look_set_suffix().contains(Look::End),
            line_start: props.look_set_prefix().contains(Look::StartLF),
            has_word_boundary: props.look_set().contains_word(),
            ..Shape::default()
        };
        let elems: &[Hir] = match hir.kind() {
            HirKind::Concat(ref elems) => elems,
            _ => core::slice::from_ref(hir),
        };
        shape.anchored_ends = anchored_ends(elems);
        shape.classes = class_plus_sequence(elems);
        shape.branches = branch_literals(elems);
        shape.digit_lead = digit_lead(hir);
        if let Some(dotall) = universal_rep(&elems[0]) {
            let body = &elems[1..];
            let one_line_body = body.iter().all(cannot_match_newline);
            if !body.is_empty() {
                shape.inner_literals =
                    inner_literals(body, dotall || one_line_body);
            }
            shape.dot_star = Some(DotStar { dotall, one_line_body });
        }
        if matches!(elems[0].kind(), HirKind::Look(Look::StartLF)) {
            shape.line_suffix_ok =
                elems[1..].iter().all(cannot_match_newline);
        }
        shape
    }
}

/// Recognizes an unbounded repetition of a universal character class, i.e.
/// `.*` under `(?s)` or not. Returns whether the class also matches `\n`.
fn universal_rep(hir: &Hir) -> Option<bool> {
    let rep = match hir.kind() {
        HirKind::Repetition(ref rep) => rep,
        _ => return None,
    };
    if rep.min != 0 || rep.max.is_some() {
        return None;
    }
    let class = match rep.sub.kind() {
        HirKind::Class(ref class) => class,
        _ => return None,
    };
    match *class {
        Class::Unicode(ref cls) => {
            let mut excludes_nl = false;
            let mut prev: Option<char> = None;
            for range in cls.ranges() {
                if let Some(p) = prev {
                    // The only gaps tolerated are '\n' and the surrogate
                    // block, which no valid char can occupy anyway.
                    let gap_nl = p == '\x09' && range.start() == '\x0B';
                    let gap_surrogate =
                        p == '\u{D7FF}' && range.start() == '\u{E000}';
                    if gap_nl {
                        excludes_nl = true;
                    } else if !gap_surrogate {
                        return None;
                    }
                }
                prev = Some(range.end());
            }
            let first =
                cls.ranges().first().map(|r| r.start()).unwrap_or('\x01');
            if first != '\0' || prev != Some('\u{10FFFF}') {
                return None;
            }
            Some(!excludes_nl)
        }
        Class::Bytes(ref cls) => {
            let mut excludes_nl = false;
            let mut prev: Option<u8> = None;
            for range in cls.ranges() {
                if let Some(p) = prev {
                    if p == 0x09 && range.start() == 0x0B {
                        excludes_nl = true;
                    } else {
                        return None;
                    }
                }
                prev = Some(range.end());
            }
            let first = cls.ranges().first().map(|r| r.start()).unwrap_or(1);
            if first != 0 || prev != Some(0xFF) {
                return None;
            }
            Some(!excludes_nl)
        }
    }
}

/// True when nothing this sub-expression matches can contain `\n`.
fn cannot_match_newline(hir: &Hir) -> bool {
    match hir.kind() {
        HirKind::Empty => true,
        HirKind::Literal(ref lit) => !lit.0.contains(&b'\n'),
        HirKind::Class(Class::Unicode(ref cls)) => {
            !cls.ranges().iter().any(|r| r.start() <= '\n' && '\n' <= r.end())
        }
        HirKind::Class(Class::Bytes(ref cls)) => {
            !cls.ranges().iter().any(|r| r.start() <= b'\n' && b'\n' <= r.end())
        }
        HirKind::Look(_) => true,
        HirKind::Repetition(ref rep) => cannot_match_newline(&rep.sub),
        HirKind::Capture(ref cap) => cannot_match_newline(&cap.sub),
        HirKind::Concat(ref subs) | HirKind::Alternation(ref subs) => {
            subs.iter().all(cannot_match_newline)
        }
    }
}

fn anchored_ends(elems: &[Hir]) -> Option<AnchoredEnds> {
    if elems.len() < 2 {
        return None;
    }
    if !matches!(elems[0].kind(), HirKind::Look(Look::Start)) {
        return None;
    }
    if !matches!(elems[elems.len() - 1].kind(), HirKind::Look(Look::End)) {
        return None;
    }
    let mut middle = elems[1..elems.len() - 1].iter().peekable();
    let mut prefix = vec![];
    if let Some(HirKind::Literal(lit)) = middle.peek().map(|h| h.kind()) {
        prefix.extend_from_slice(&lit.0);
        middle.next();
    }
    let wild = match middle.peek() {
        // `^literal$` (or `^$`): full equality against the prefix.
        None => {
            return Some(AnchoredEnds { prefix, suffix: vec![], wild: false })
        }
        // Only a dot-all wildcard keeps the ends check O(1): a `.` that
        // excludes `\n` would require scanning the middle.
        Some(h) => match universal_rep(h) {
            Some(true) => true,
            _ => return None,
        },
    };
    middle.next();
    let mut suffix = vec![];
    if let Some(HirKind::Literal(lit)) = middle.peek().map(|h| h.kind()) {
        suffix.extend_from_slice(&lit.0);
        middle.next();
    }
    if middle.next().is_some() {
        return None;
    }
    Some(AnchoredEnds { prefix, suffix, wild })
}

/// Converts a class to a byte set when every member is a single byte (any
/// byte class, or a Unicode class entirely within ASCII).
pub(crate) fn class_byteset(class: &Class) -> Option<ByteSet> {
    let mut set = ByteSet::empty();
    match *class {
        Class::Unicode(ref cls) => {
            for range in cls.ranges() {
                if range.end() > '\x7F' {
                    return None;
                }
                set.add_range(range.start() as u8, range.end() as u8);
            }
        }
        Class::Bytes(ref cls) => {
            for range in cls.ranges() {
                set.add_range(range.start(), range.end());
            }
        }
    }
    if set.is_empty() {
        return None;
    }
    Some(set)
}

/// Recognizes `[A]+[B]+...` with greedy plus repetitions over ASCII classes
/// where consecutive classes are disjoint. Disjointness is what lets a
/// scanner consume each run maximally without backtracking.
fn class_plus_sequence(elems: &[Hir]) -> Option<Vec<ByteSet>> {
    let mut sets = Vec::with_capacity(elems.len());
    for elem in elems {
        let rep = match elem.kind() {
            HirKind::Repetition(ref rep) => rep,
            _ => return None,
        };
        if rep.min != 1 || rep.max.is_some() || !rep.greedy {
            return None;
        }
        let class = match rep.sub.kind() {
            HirKind::Class(ref class) => class,
            _ => return None,
        };
        sets.push(class_byteset(class)?);
    }
    for pair in sets.windows(2) {
        if !pair[0].is_disjoint(&pair[1]) {
            return None;
        }
    }
    // The scanner restarts at the position where a run came up empty. That
    // skips the consumed region, which is only sound when no later class
    // shares bytes with the first one: otherwise a match could begin inside
    // a consumed run.
    for set in &sets[1..] {
        if !sets[0].is_disjoint(set) {
            return None;
        }
    }
    Some(sets)
}

/// The bytes of a pure literal sub-expression.
fn literal_bytes(hir: &Hir) -> Option<Vec<u8>> {
    match hir.kind() {
        HirKind::Literal(ref lit) => Some(lit.0.to_vec()),
        HirKind::Concat(ref subs) => {
            let mut bytes = vec![];
            for sub in subs {
                match sub.kind() {
                    HirKind::Literal(ref lit) => {
                        bytes.extend_from_slice(&lit.0)
                    }
                    _ => return None,
                }
            }
            Some(bytes)
        }
        _ => None,
    }
}

/// Recognizes `^(lit|lit|...)`, possibly with the alternation in a capture
/// group, where all branch literals begin with distinct bytes.
fn branch_literals(elems: &[Hir]) -> Option<Vec<Vec<u8>>> {
    if elems.len() != 2 {
        return None;
    }
    if !matches!(elems[0].kind(), HirKind::Look(Look::Start)) {
        return None;
    }
    let alt = match elems[1].kind() {
        HirKind::Capture(ref cap) => &cap.sub,
        _ => &elems[1],
    };
    let arms = match alt.kind() {
        HirKind::Alternation(ref arms) => arms,
        _ => return None,
    };
    if arms.len() < 2 || arms.len() > 255 {
        return None;
    }
    let mut lits = Vec::with_capacity(arms.len());
    let mut seen = ByteSet::empty();
    for arm in arms {
        let bytes = literal_bytes(arm)?;
        let first = *bytes.first()?;
        if seen.contains(first) {
            return None;
        }
        seen.add(first);
        lits.push(bytes);
    }
    Some(lits)
}

/// Computes the set of bytes a match can start with, along with whether the
/// expression can match the empty string. The byte set may overapproximate
/// for non-ASCII classes, which only ever makes callers more conservative.
fn leading_bytes(hir: &Hir) -> (ByteSet, bool) {
    match hir.kind() {
        HirKind::Empty => (ByteSet::empty(), true),
        HirKind::Literal(ref lit) => {
            let mut set = ByteSet::empty();
            match lit.0.first() {
                None => return (set, true),
                Some(&b) => set.add(b),
            }
            (set, false)
        }
        HirKind::Class(Class::Unicode(ref cls)) => {
            let mut set = ByteSet::empty();
            for range in cls.ranges() {
                set.add_range(
                    first_utf8_byte(range.start()),
                    first_utf8_byte(range.end()),
                );
            }
            (set, false)
        }
        HirKind::Class(Class::Bytes(ref cls)) => {
            let mut set = ByteSet::empty();
            for range in cls.ranges() {
                set.add_range(range.start(), range.end());
            }
            (set, false)
        }
        HirKind::Look(_) => (ByteSet::empty(), true),
        HirKind::Repetition(ref rep) => {
            let (set, empty) = leading_bytes(&rep.sub);
            (set, empty || rep.min == 0)
        }
        HirKind::Capture(ref cap) => leading_bytes(&cap.sub),
        HirKind::Concat(ref subs) => {
            let mut set = ByteSet::empty();
            for sub in subs {
                let (s, empty) = leading_bytes(sub);
                set.union(&s);
                if !empty {
                    return (set, false);
                }
            }
            (set, true)
        }
        HirKind::Alternation(ref subs) => {
            let mut set = ByteSet::empty();
            let mut any_empty = false;
            for sub in subs {
                let (s, empty) = leading_bytes(sub);
                set.union(&s);
                any_empty = any_empty || empty;
            }
            (set, any_empty)
        }
    }
}

/// The first byte of the UTF-8 encoding of `c`. Monotone in the codepoint,
/// which is what makes range overapproximation sound.
fn first_utf8_byte(c: char) -> u8 {
    let mut buf = [0u8; 4];
    c.encode_utf8(&mut buf).as_bytes()[0]
}

/// Proves that every match begins with an ASCII digit.
fn digit_lead(hir: &Hir) -> bool {
    let (set, can_be_empty) = leading_bytes(hir);
    !can_be_empty && !set.is_empty() && set.is_subset(&ByteSet::digits())
}

/// Extracts prefix literals from the part of the pattern following a leading
/// dot-star. Only useful when candidate positions can be bounded, which the
/// caller guarantees via `usable`.
fn inner_literals(body: &[Hir], usable: bool) -> Option<Vec<Vec<u8>>> {
    if !usable {
        return None;
    }
    let rest = Hir::concat(body.to_vec());
    let mut seq: Seq = Extractor::new().extract(&rest);
    seq.optimize_for_prefix_by_preference();
    let lits = seq.literals()?;
    if lits.is_empty() || lits.iter().any(|l| l.is_empty()) {
        return None;
    }
    Some(lits.iter().map(|l| l.as_bytes().to_vec()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hir(pattern: &str) -> Hir {
        regex_syntax::ParserBuilder::new()
            .utf8(false)
            .build()
            .parse(pattern)
            .unwrap()
    }

    fn shape(pattern: &str) -> Shape {
        Shape::analyze(&hir(pattern))
    }

    #[test]
    fn anchors() {
        assert!(shape(r"^foo").start_anchored);
        assert!(shape(r"foo$").end_anchored);
        assert!(!shape(r"(?m)^foo").start_anchored);
        assert!(shape(r"(?m)^foo").line_start);
        assert!(shape(r"\bfoo").has_word_boundary);
    }

    #[test]
    fn anchored_ends_with_wildcard() {
        let ends = shape(r"^(?s)foo.*bar$").anchored_ends.unwrap();
        assert_eq!(b"foo".to_vec(), ends.prefix);
        assert_eq!(b"bar".to_vec(), ends.suffix);
        assert!(ends.wild);
    }

    #[test]
    fn anchored_exact_literal() {
        let ends = shape(r"^foo$").anchored_ends.unwrap();
        assert_eq!(b"foo".to_vec(), ends.prefix);
        assert!(!ends.wild);
    }

    #[test]
    fn anchored_ends_rejects_line_dot() {
        // Without (?s), the middle can't cross '\n', so an ends check alone
        // would claim false matches.
        assert!(shape(r"^foo.*bar$").anchored_ends.is_none());
    }

    #[test]
    fn dot_star_shapes() {
        let ds = shape(r".*\.txt").dot_star.unwrap();
        assert!(!ds.dotall);
        assert!(ds.one_line_body);
        let ds = shape(r"(?s).*\.txt").dot_star.unwrap();
        assert!(ds.dotall);
        assert!(shape(r"foo.*").dot_star.is_none());
    }

    #[test]
    fn inner_literals_found() {
        let s = shape(r".*keyword.*");
        assert_eq!(Some(vec![b"keyword".to_vec()]), s.inner_literals);
    }

    #[test]
    fn class_sequences() {
        let s = shape(r"[a-zA-Z]+[0-9]+");
        let sets = s.classes.unwrap();
        assert_eq!(2, sets.len());
        assert!(sets[0].contains(b'q'));
        assert!(sets[1].contains(b'7'));

        assert!(shape(r"[a-z]+").classes.unwrap().len() == 1);
        // Overlapping adjacent classes cannot be scanned run-by-run.
        assert!(shape(r"[a-z0-9]+[0-9]+").classes.is_none());
        // A later class sharing bytes with the first would let a match start
        // inside a consumed run.
        assert!(shape(r"[ax]+[0-9]+[x]+").classes.is_none());
        // Lazy repetitions have different match extents.
        assert!(shape(r"[a-z]+?").classes.is_none());
    }

    #[test]
    fn branch_tables() {
        let branches = shape(r"^(foo|bar|baz|qux)").branches.unwrap();
        assert_eq!(4, branches.len());
        assert_eq!(b"foo".to_vec(), branches[0]);
        // Shared first byte.
        assert!(shape(r"^(foo|fizz)").branches.is_none());
        // Not anchored.
        assert!(shape(r"(foo|bar)").branches.is_none());
    }

    #[test]
    fn digit_lead_patterns() {
        assert!(shape(r"\d+\.\d+\.\d+").digit_lead);
        assert!(shape(r"(1|2|3)[0-9]*").digit_lead);
        assert!(!shape(r"x\d+").digit_lead);
        assert!(!shape(r"\d*").digit_lead);
    }

    #[test]
    fn multiline_suffix_shape() {
        let s = shape(r"(?m)^/.*\.php");
        assert!(s.line_start);
        assert!(s.line_suffix_ok);
        let s = shape(r"(?ms)^/.*\.php");
        assert!(!s.line_suffix_ok);
    }
}
