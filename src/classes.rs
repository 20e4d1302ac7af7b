/*!
Specialized searchers over byte classes and literal tables.

These are the engines behind the cheapest strategies: a membership bitmap and
a scan loop, with no NFA simulation at all. They are only constructed for
pattern shapes where the scan provably reproduces leftmost-first semantics
(see the shape checks), so none of them needs a verification step.
*/

use crate::{shape::AnchoredEnds, util::byteset::ByteSet};

/// Matcher for `^prefix(?s:.)*suffix$` and `^literal$`: the whole match is
/// decided by the ends of the haystack.
#[derive(Debug)]
pub(crate) struct AnchoredLiteral {
    prefix: Vec<u8>,
    suffix: Vec<u8>,
    wild: bool,
}

impl AnchoredLiteral {
    pub(crate) fn new(ends: AnchoredEnds) -> AnchoredLiteral {
        AnchoredLiteral {
            prefix: ends.prefix,
            suffix: ends.suffix,
            wild: ends.wild,
        }
    }

    pub(crate) fn find(
        &self,
        haystack: &[u8],
        at: usize,
    ) -> Option<(usize, usize)> {
        if at > 0 {
            return None;
        }
        if !self.wild {
            return (haystack == &*self.prefix).then_some((0, haystack.len()));
        }
        let fits = haystack.len() >= self.prefix.len() + self.suffix.len();
        if fits
            && haystack.starts_with(&self.prefix)
            && haystack.ends_with(&self.suffix)
        {
            Some((0, haystack.len()))
        } else {
            None
        }
    }
}

/// Matcher for a single greedy `[class]+`: a match is a maximal run of
/// class bytes.
#[derive(Debug)]
pub(crate) struct ClassRun {
    set: ByteSet,
}

impl ClassRun {
    pub(crate) fn new(set: ByteSet) -> ClassRun {
        ClassRun { set }
    }

    #[inline]
    pub(crate) fn find(
        &self,
        haystack: &[u8],
        at: usize,
    ) -> Option<(usize, usize)> {
        let start = self.next_member(haystack, at)?;
        let mut end = start + 1;
        while end < haystack.len() && self.set.contains(haystack[end]) {
            end += 1;
        }
        Some((start, end))
    }

    #[inline]
    pub(crate) fn is_match(&self, haystack: &[u8], at: usize) -> bool {
        self.next_member(haystack, at).is_some()
    }

    /// Emits every maximal run in a single pass. The callback returns false
    /// to stop early (e.g. when a count limit is reached).
    pub(crate) fn for_each_run(
        &self,
        haystack: &[u8],
        mut emit: impl FnMut(usize, usize) -> bool,
    ) {
        let mut at = 0;
        while let Some((start, end)) = self.find(haystack, at) {
            if !emit(start, end) {
                return;
            }
            at = end;
        }
    }

    #[inline]
    fn next_member(&self, haystack: &[u8], at: usize) -> Option<usize> {
        haystack[at..]
            .iter()
            .position(|&b| self.set.contains(b))
            .map(|i| at + i)
    }
}

/// Matcher for `[A]+[B]+...` with greedy plus repetitions. The shape check
/// guarantees adjacent classes are disjoint (each run is maximal without
/// backtracking) and that no later class shares bytes with the first (a
/// failed attempt cannot hide a match start inside its consumed runs).
#[derive(Debug)]
pub(crate) struct ClassSeq {
    sets: Vec<ByteSet>,
}

impl ClassSeq {
    pub(crate) fn new(sets: Vec<ByteSet>) -> ClassSeq {
        ClassSeq { sets }
    }

    pub(crate) fn find(
        &self,
        haystack: &[u8],
        at: usize,
    ) -> Option<(usize, usize)> {
        let first = &self.sets[0];
        let mut pos = at;
        'candidates: loop {
            let start = haystack[pos..]
                .iter()
                .position(|&b| first.contains(b))
                .map(|i| pos + i)?;
            let mut cur = start;
            for set in &self.sets {
                let run_start = cur;
                while cur < haystack.len() && set.contains(haystack[cur]) {
                    cur += 1;
                }
                if cur == run_start {
                    pos = cur;
                    continue 'candidates;
                }
            }
            return Some((start, cur));
        }
    }
}

/// First-byte dispatch for `^(lit|lit|...)` with distinct first bytes: at
/// most one branch can apply, found with a single table lookup.
#[derive(Debug)]
pub(crate) struct BranchTable {
    /// Branch index + 1 for each possible first byte; 0 means no branch.
    table: [u8; 256],
    branches: Vec<Vec<u8>>,
}

impl BranchTable {
    pub(crate) fn new(branches: Vec<Vec<u8>>) -> Option<BranchTable> {
        if branches.len() > u8::MAX as usize {
            return None;
        }
        let mut table = [0u8; 256];
        for (i, branch) in branches.iter().enumerate() {
            let first = *branch.first()?;
            if table[usize::from(first)] != 0 {
                return None;
            }
            table[usize::from(first)] = (i + 1) as u8;
        }
        Some(BranchTable { table, branches })
    }

    pub(crate) fn find(
        &self,
        haystack: &[u8],
        at: usize,
    ) -> Option<(usize, usize)> {
        if at > 0 {
            return None;
        }
        let first = *haystack.first()?;
        let slot = self.table[usize::from(first)];
        if slot == 0 {
            return None;
        }
        let branch = &self.branches[usize::from(slot) - 1];
        haystack.starts_with(branch).then_some((0, branch.len()))
    }
}

/// Position of the next ASCII digit at or after `at`.
#[inline]
pub(crate) fn next_digit(haystack: &[u8], at: usize, end: usize) -> Option<usize> {
    haystack[at..end].iter().position(|b| b.is_ascii_digit()).map(|i| at + i)
}
