/*!
Candidate scans for patterns with a leading `.*`, an inner literal, or a
`(?m)^` line anchor plus a suffix literal.

These strategies share one mechanism. A literal scan locates the first place
any match could possibly touch; from that hit, the leftmost position a match
could *begin* at is computed and the regular forward engines take over from
there. The per-shape selection guards establish the bound:

- For a `(?s:.)*` prefix, a match can begin anywhere, so the bound is the
  search start itself and the scan's only job is the fast no-candidate case.
- For a `.*` prefix (no `\n`) or a `(?m)^` anchor, a match touching the hit
  cannot begin before the start of the hit's line: the leading dot cannot
  cross a newline, the rest of the pattern is newline-free, and a line
  anchor only matches at line starts. Anything before that line start is
  skipped without being examined.

Because the forward engines re-search from the bound with full pattern
semantics, a candidate is never trusted: false positives cost one engine
scan, never a wrong match.
*/

use crate::{prefilter::Prefilter, util};

/// How to turn a candidate hit into a lower bound on match starts.
#[derive(Clone, Copy, Debug)]
pub(crate) enum StartBound {
    /// Matches can start anywhere at or after the search start.
    SearchStart,
    /// Matches touching the hit start no earlier than the hit's line.
    LineStart,
}

/// A literal candidate scan feeding the forward engines.
#[derive(Debug)]
pub(crate) struct CandidateScan {
    pre: Prefilter,
    bound: StartBound,
}

impl CandidateScan {
    pub(crate) fn new(pre: Prefilter, bound: StartBound) -> CandidateScan {
        CandidateScan { pre, bound }
    }

    /// Returns the adjusted search start, or `None` when no candidate
    /// exists (and hence no match can).
    pub(crate) fn start_bound(
        &self,
        haystack: &[u8],
        at: usize,
        end: usize,
    ) -> Option<usize> {
        let (hit, _) = self.pre.find(haystack, at, end)?;
        Some(match self.bound {
            StartBound::SearchStart => at,
            StartBound::LineStart => {
                core::cmp::max(at, util::line_start(haystack, hit))
            }
        })
    }
}
