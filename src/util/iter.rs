/// Drives non-overlapping match iteration over repeated single searches.
///
/// The searches themselves are supplied by the caller as a closure, so this
/// one piece of logic backs `count`, the `find_all_*` operations and the
/// public iterators, no matter which strategy answers the individual
/// searches.
///
/// Progress is made by starting the next search at the end of the previous
/// match. Empty matches need special handling: they don't advance the search
/// on their own, and an empty match at the ending position of the previous
/// non-empty match would overlap with it. Such a match is skipped by
/// advancing the start position one byte, which matches the presiding
/// behavior of general purpose regex engines.
#[derive(Clone, Debug)]
pub(crate) struct Advancer {
    pos: usize,
    last_nonempty: Option<usize>,
}

impl Advancer {
    pub(crate) fn new(start: usize) -> Advancer {
        Advancer { pos: start, last_nonempty: None }
    }

    /// Returns the next non-overlapping match produced by `find`, where
    /// `find(pos)` must return the leftmost match whose start is at or after
    /// `pos`.
    pub(crate) fn advance(
        &mut self,
        len: usize,
        mut find: impl FnMut(usize) -> Option<(usize, usize)>,
    ) -> Option<(usize, usize)> {
        loop {
            if self.pos > len {
                return None;
            }
            let (start, end) = find(self.pos)?;
            if start == end {
                if Some(start) == self.last_nonempty {
                    // A degenerate repeat of the previous match's endpoint.
                    self.pos = start + 1;
                    continue;
                }
                self.pos = end + 1;
                return Some((start, end));
            }
            self.last_nonempty = Some(end);
            self.pos = end;
            return Some((start, end));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // A toy finder over precomputed matches, standing in for a dispatch
    // call. Returns the first span starting at or after the given position.
    fn finder(spans: &[(usize, usize)]) -> impl FnMut(usize) -> Option<(usize, usize)> + '_ {
        move |pos| spans.iter().copied().find(|&(s, _)| s >= pos)
    }

    fn collect(
        len: usize,
        spans: &[(usize, usize)],
    ) -> Vec<(usize, usize)> {
        let mut adv = Advancer::new(0);
        let mut got = vec![];
        while let Some(span) = adv.advance(len, finder(spans)) {
            got.push(span);
        }
        got
    }

    #[test]
    fn nonempty_matches_advance_to_their_end() {
        let spans = &[(0, 2), (2, 4), (5, 6)];
        assert_eq!(vec![(0, 2), (2, 4), (5, 6)], collect(6, spans));
    }

    #[test]
    fn empty_match_at_last_end_is_skipped() {
        // Mirrors 'a|(?:)' on "ab": after [0, 1), the empty match at 1 is
        // suppressed and iteration resumes at 2.
        let spans = &[(0, 1), (1, 1), (2, 2)];
        assert_eq!(vec![(0, 1), (2, 2)], collect(2, spans));
    }

    #[test]
    fn empty_matches_elsewhere_are_emitted() {
        // Mirrors 'a*' on "b": one empty match per position.
        let spans = &[(0, 0), (1, 1)];
        assert_eq!(vec![(0, 0), (1, 1)], collect(1, spans));
    }

    #[test]
    fn iteration_terminates_at_len() {
        let mut adv = Advancer::new(0);
        let mut calls = 0;
        while adv
            .advance(3, |pos| {
                calls += 1;
                Some((pos, pos))
            })
            .is_some()
        {}
        assert!(calls <= 8);
    }
}
