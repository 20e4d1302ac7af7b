/*!
Literal prefilters.

A prefilter is the single best literal searcher that can be assembled from a
pattern's extracted literals: a byte scan for one single-byte literal, a
substring search for one longer literal, the packed SIMD multi-pattern
searcher (Teddy, including its fat variant and its own small-haystack
fallback) for small sets, and an Aho-Corasick automaton for everything
bigger. All variants search with leftmost-first preference so that candidate
order agrees with match order.

A *complete* prefilter is one whose literal set is exactly the language of
the pattern; a hit from it is itself a match and bypasses the regex engines
entirely.
*/

use aho_corasick::{
    packed, AhoCorasick, Input as AcInput, MatchKind as AcMatchKind,
    Span as AcSpan,
};
use memchr::{memchr, memmem};

#[derive(Debug)]
enum Searcher {
    Byte(u8),
    Memmem(memmem::Finder<'static>),
    Teddy(packed::Searcher),
    AhoCorasick(AhoCorasick),
}

#[derive(Debug)]
pub(crate) struct Prefilter {
    searcher: Searcher,
    complete: bool,
    /// Set when all literals share one length.
    literal_len: Option<usize>,
    min_len: usize,
}

impl Prefilter {
    /// Builds the best searcher for the given literal set, in preference
    /// order. Returns `None` for empty sets, sets containing the empty
    /// literal, or when no searcher can be constructed.
    pub(crate) fn new(
        lits: &[Vec<u8>],
        complete: bool,
        teddy_max: usize,
    ) -> Option<Prefilter> {
        if lits.is_empty() || lits.iter().any(|l| l.is_empty()) {
            return None;
        }
        let min_len = lits.iter().map(|l| l.len()).min().unwrap();
        let literal_len = lits
            .iter()
            .all(|l| l.len() == lits[0].len())
            .then(|| lits[0].len());
        let searcher = if lits.len() == 1 {
            if lits[0].len() == 1 {
                Searcher::Byte(lits[0][0])
            } else {
                Searcher::Memmem(memmem::Finder::new(&lits[0]).into_owned())
            }
        } else if lits.len() <= teddy_max {
            let built = packed::Config::new()
                .match_kind(packed::MatchKind::LeftmostFirst)
                .builder()
                .extend(lits)
                .build();
            match built {
                Some(searcher) => {
                    trace!("prefilter: Teddy over {} literals", lits.len());
                    Searcher::Teddy(searcher)
                }
                None => Searcher::AhoCorasick(aho_corasick(lits)?),
            }
        } else {
            trace!("prefilter: Aho-Corasick over {} literals", lits.len());
            Searcher::AhoCorasick(aho_corasick(lits)?)
        };
        Some(Prefilter { searcher, complete, literal_len, min_len })
    }

    /// Finds the leftmost occurrence of any literal in
    /// `haystack[at..end]`, returning its absolute span.
    pub(crate) fn find(
        &self,
        haystack: &[u8],
        at: usize,
        end: usize,
    ) -> Option<(usize, usize)> {
        match self.searcher {
            Searcher::Byte(b) => {
                memchr(b, &haystack[at..end]).map(|i| (at + i, at + i + 1))
            }
            Searcher::Memmem(ref finder) => finder
                .find(&haystack[at..end])
                .map(|i| (at + i, at + i + finder.needle().len())),
            Searcher::Teddy(ref searcher) => searcher
                .find_in(&haystack, AcSpan::from(at..end))
                .map(|m| (m.start(), m.end())),
            Searcher::AhoCorasick(ref searcher) => searcher
                .find(AcInput::new(haystack).span(at..end))
                .map(|m| (m.start(), m.end())),
        }
    }

    /// Whether a hit from this prefilter is itself a full match.
    pub(crate) fn is_complete(&self) -> bool {
        self.complete
    }

    /// The common literal length, when there is one.
    pub(crate) fn literal_len(&self) -> Option<usize> {
        self.literal_len
    }

    /// The length of the shortest literal.
    pub(crate) fn min_len(&self) -> usize {
        self.min_len
    }

    /// True when the underlying searcher is an Aho-Corasick automaton (used
    /// for telemetry attribution).
    pub(crate) fn is_aho_corasick(&self) -> bool {
        matches!(self.searcher, Searcher::AhoCorasick(_))
    }
}

fn aho_corasick(lits: &[Vec<u8>]) -> Option<AhoCorasick> {
    AhoCorasick::builder()
        .match_kind(AcMatchKind::LeftmostFirst)
        .build(lits)
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pre(lits: &[&[u8]]) -> Prefilter {
        let owned: Vec<Vec<u8>> = lits.iter().map(|l| l.to_vec()).collect();
        Prefilter::new(&owned, false, 8).unwrap()
    }

    #[test]
    fn single_byte() {
        let p = pre(&[b"x"]);
        assert_eq!(Some((3, 4)), p.find(b"aaax", 0, 4));
        assert_eq!(None, p.find(b"aaax", 0, 3));
        assert_eq!(Some(1), p.literal_len());
    }

    #[test]
    fn substring() {
        let p = pre(&[b"needle"]);
        let h = b"hay needle hay";
        assert_eq!(Some((4, 10)), p.find(h, 0, h.len()));
        assert_eq!(None, p.find(h, 5, h.len()));
    }

    #[test]
    fn small_set_prefers_leftmost() {
        let p = pre(&[b"foo", b"bar", b"baz"]);
        let h = b"xx bar foo";
        assert_eq!(Some((3, 6)), p.find(h, 0, h.len()));
        assert_eq!(Some((7, 10)), p.find(h, 4, h.len()));
    }

    #[test]
    fn large_set_uses_aho_corasick() {
        let lits: Vec<Vec<u8>> =
            (0..32u8).map(|i| format!("lit{:02}", i).into_bytes()).collect();
        let p = Prefilter::new(&lits, false, 8).unwrap();
        assert!(p.is_aho_corasick());
        let h = b"aa lit07 zz";
        assert_eq!(Some((3, 8)), p.find(h, 0, h.len()));
    }

    #[test]
    fn empty_literals_rejected() {
        assert!(Prefilter::new(&[], false, 8).is_none());
        assert!(Prefilter::new(&[vec![]], false, 8).is_none());
    }
}
