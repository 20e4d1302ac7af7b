/*!
Per-search routing.

Every public operation funnels into one of three entry points on the
compiled engine: `search` (full span), `is_match` (presence only) and
`search_slots` (capture groups). Each switches on the active strategy and
orchestrates prefilters and engines, with the PikeVM as the fallback that
can always answer. Engine-level soft failures (a lazy DFA giving up under
cache pressure, a backtracker refusing a too-long haystack) are converted
into fallbacks here and surface only in the statistics counters, never in
results.
*/

use regex_automata::{
    util::primitives::NonMaxUsize, Anchored, Input, MatchError,
    MatchErrorKind, PatternID,
};

use crate::{
    classes,
    engine::EngineI,
    prefilter::Prefilter,
    reverse::CandidateScan,
    strategy::Strategy,
    wrappers::SearchState,
};

/// Candidate verification failures tolerated before a scanning strategy
/// stops consulting its prefilter for the rest of the search.
const PREFILTER_ABANDON_FAILURES: u32 = 8;

impl EngineI {
    /// The leftmost match within `input`'s span, as byte offsets.
    pub(crate) fn search(
        &self,
        state: &mut SearchState,
        input: &Input<'_>,
    ) -> Option<(usize, usize)> {
        state.scratch.reset();
        self.dispatch(state, input)
    }

    fn dispatch(
        &self,
        state: &mut SearchState,
        input: &Input<'_>,
    ) -> Option<(usize, usize)> {
        let (haystack, at) = (input.haystack(), input.start());
        match self.strategy {
            Strategy::AnchoredLiteral(ref lit) => lit.find(haystack, at),
            Strategy::MultilineSuffix(ref scan)
            | Strategy::ReverseSuffix(ref scan)
            | Strategy::ReverseSuffixSet(ref scan)
            | Strategy::ReverseInner(ref scan) => {
                self.candidate_search(state, input, scan)
            }
            Strategy::ReverseAnchored => {
                self.reverse_anchored_search(state, input)
            }
            Strategy::DigitPrefilter => self.digit_search(state, input),
            Strategy::Teddy(ref pre) | Strategy::AhoCorasick(ref pre) => {
                self.literal_search(pre, input)
            }
            Strategy::BranchDispatch(ref table) => table.find(haystack, at),
            Strategy::Composite(ref seq) => seq.find(haystack, at),
            Strategy::CharClass(ref run) => run.find(haystack, at),
            Strategy::Backtrack
            | Strategy::Nfa
            | Strategy::Both
            | Strategy::Dfa => self.core_search(state, input),
        }
    }

    /// Presence check. Uses the same routing as `search`, but lets engines
    /// stop at the earliest match and permits the backtracker even for
    /// patterns that can match empty (only presence is reported, so its
    /// greedy bias cannot skew offsets).
    pub(crate) fn is_match(
        &self,
        state: &mut SearchState,
        input: &Input<'_>,
    ) -> bool {
        state.scratch.reset();
        let (haystack, at) = (input.haystack(), input.start());
        match self.strategy {
            Strategy::AnchoredLiteral(ref lit) => {
                lit.find(haystack, at).is_some()
            }
            Strategy::MultilineSuffix(ref scan)
            | Strategy::ReverseSuffix(ref scan)
            | Strategy::ReverseSuffixSet(ref scan)
            | Strategy::ReverseInner(ref scan) => {
                match self.candidate_bound(input, scan) {
                    None => false,
                    Some(bound) => {
                        let sub =
                            input.clone().span(bound..input.end());
                        self.core_is_match(state, &sub)
                    }
                }
            }
            Strategy::ReverseAnchored => {
                self.reverse_anchored_search(state, input).is_some()
            }
            Strategy::DigitPrefilter => {
                self.digit_search(state, input).is_some()
            }
            Strategy::Teddy(ref pre) | Strategy::AhoCorasick(ref pre) => {
                self.literal_search(pre, input).is_some()
            }
            Strategy::BranchDispatch(ref table) => {
                table.find(haystack, at).is_some()
            }
            Strategy::Composite(ref seq) => seq.find(haystack, at).is_some(),
            Strategy::CharClass(ref run) => run.is_match(haystack, at),
            Strategy::Backtrack
            | Strategy::Nfa
            | Strategy::Both
            | Strategy::Dfa => self.core_is_match(state, input),
        }
    }

    /// Capture-group resolution: find the match bounds with the active
    /// strategy, then resolve groups over just the match span with the most
    /// specialized capture engine available (one-pass, backtracker, PikeVM).
    pub(crate) fn search_slots(
        &self,
        state: &mut SearchState,
        input: &Input<'_>,
        slots: &mut [Option<NonMaxUsize>],
    ) -> Option<PatternID> {
        state.scratch.reset();
        if slots.len() <= 2 {
            let (start, end) = self.dispatch(state, input)?;
            copy_span_to_slots(start, end, slots);
            return Some(PatternID::ZERO);
        }
        match self.strategy {
            // No bounds engine worth running first: resolve in one pass.
            // (Under leftmost-longest semantics the bounds pass is still
            // needed, since the match-kind=All PikeVM is only meaningful on
            // an anchored span.)
            Strategy::Backtrack | Strategy::Nfa if !self.longest() => {
                return self.slots_nofail(state, input, slots)
            }
            _ => {}
        }
        let (start, end) = self.dispatch(state, input)?;
        let sub =
            input.clone().span(start..end).anchored(Anchored::Yes);
        self.slots_nofail(state, &sub, slots)
    }

    fn literal_search(
        &self,
        pre: &Prefilter,
        input: &Input<'_>,
    ) -> Option<(usize, usize)> {
        if pre.is_aho_corasick() {
            self.stats.aho_corasick_search();
        }
        match pre.find(input.haystack(), input.start(), input.end()) {
            Some(span) => {
                self.stats.prefilter_hit();
                Some(span)
            }
            None => {
                self.stats.prefilter_miss();
                None
            }
        }
    }

    fn candidate_bound(
        &self,
        input: &Input<'_>,
        scan: &CandidateScan,
    ) -> Option<usize> {
        match scan.start_bound(
            input.haystack(),
            input.start(),
            input.end(),
        ) {
            Some(bound) => {
                self.stats.prefilter_hit();
                Some(bound)
            }
            None => {
                self.stats.prefilter_miss();
                None
            }
        }
    }

    fn candidate_search(
        &self,
        state: &mut SearchState,
        input: &Input<'_>,
        scan: &CandidateScan,
    ) -> Option<(usize, usize)> {
        let bound = self.candidate_bound(input, scan)?;
        let sub = input.clone().span(bound..input.end());
        self.core_search(state, &sub)
    }

    fn reverse_anchored_search(
        &self,
        state: &mut SearchState,
        input: &Input<'_>,
    ) -> Option<(usize, usize)> {
        if let Some(engine) = self.hybrid.get() {
            self.stats.dfa_search();
            let rev = input.clone().anchored(Anchored::Yes);
            match engine.try_search_half_rev(&mut state.hybrid, &rev) {
                Ok(m) => return m.map(|hm| (hm.offset(), input.end())),
                Err(err) => self.note_dfa_failure(&err),
            }
        }
        self.core_search_nofail(state, input)
    }

    fn digit_search(
        &self,
        state: &mut SearchState,
        input: &Input<'_>,
    ) -> Option<(usize, usize)> {
        let (haystack, end) = (input.haystack(), input.end());
        let mut at = input.start();
        while at < end {
            if state.scratch.abandoned {
                let sub = input.clone().span(at..end);
                return self.core_search(state, &sub);
            }
            let pos = match classes::next_digit(haystack, at, end) {
                None => {
                    self.stats.prefilter_miss();
                    return None;
                }
                Some(pos) => {
                    self.stats.prefilter_hit();
                    pos
                }
            };
            if let Some(mut me) = self.anchored_end(state, input, pos) {
                if self.longest() {
                    me = self
                        .longest_end(state, input, pos)
                        .unwrap_or(me);
                }
                return Some((pos, me));
            }
            state.scratch.failures += 1;
            if state.scratch.failures >= PREFILTER_ABANDON_FAILURES {
                state.scratch.abandoned = true;
                self.stats.prefilter_abandon();
                trace!(
                    "digit prefilter abandoned after {} failed candidates",
                    state.scratch.failures
                );
            }
            at = pos + 1;
        }
        None
    }

    /// A search through the shared engines: complete-prefilter bypass, then
    /// lazy DFA, then backtracker/PikeVM.
    pub(crate) fn core_search(
        &self,
        state: &mut SearchState,
        input: &Input<'_>,
    ) -> Option<(usize, usize)> {
        if let Some(ref pre) = self.prefilter {
            // A complete prefilter's hit is the match. Under
            // leftmost-longest semantics literal preference order is not
            // the right tie-break, so the bypass is skipped.
            if pre.is_complete() && !self.longest() {
                return self.literal_search(pre, input);
            }
        }
        let (start, end) = self.core_leftmost(state, input)?;
        if self.longest() {
            let end = self.longest_end(state, input, start).unwrap_or(end);
            return Some((start, end));
        }
        Some((start, end))
    }

    fn core_leftmost(
        &self,
        state: &mut SearchState,
        input: &Input<'_>,
    ) -> Option<(usize, usize)> {
        if let Some(engine) = self.hybrid.get() {
            self.stats.dfa_search();
            match engine.try_search(&mut state.hybrid, input) {
                Ok(m) => return m.map(|m| (m.start(), m.end())),
                Err(err) => self.note_dfa_failure(&err),
            }
        }
        self.core_search_nofail(state, input)
    }

    fn core_search_nofail(
        &self,
        state: &mut SearchState,
        input: &Input<'_>,
    ) -> Option<(usize, usize)> {
        self.stats.nfa_search();
        let mut slots = [None, None];
        if !self.longest() && !self.can_match_empty {
            if let Some(bt) = self.backtrack.get(input) {
                match bt.try_search_slots(
                    state.backtrack.get_mut(),
                    input,
                    &mut slots,
                ) {
                    Ok(pid) => return pid.map(|_| span_of(&slots)),
                    Err(_) => {}
                }
            }
        }
        self.pikevm
            .search_slots(&mut state.pikevm, input, &mut slots)
            .map(|_| span_of(&slots))
    }

    fn core_is_match(
        &self,
        state: &mut SearchState,
        input: &Input<'_>,
    ) -> bool {
        if let Some(ref pre) = self.prefilter {
            if pre.is_complete() {
                return self.literal_search(pre, input).is_some();
            }
        }
        let input = input.clone().earliest(true);
        if let Some(engine) = self.hybrid.get() {
            self.stats.dfa_search();
            match engine.try_search_half_fwd(&mut state.hybrid, &input) {
                Ok(m) => return m.is_some(),
                Err(err) => self.note_dfa_failure(&err),
            }
        }
        self.stats.nfa_search();
        if let Some(bt) = self.backtrack.get(&input) {
            if let Ok(pid) = bt.try_search_slots(
                state.backtrack.get_mut(),
                &input,
                &mut [],
            ) {
                return pid.is_some();
            }
        }
        self.pikevm.search_slots(&mut state.pikevm, &input, &mut []).is_some()
    }

    /// Resolves capture slots with the most specialized engine that can
    /// handle the given (usually anchored, match-bounded) input.
    fn slots_nofail(
        &self,
        state: &mut SearchState,
        input: &Input<'_>,
        slots: &mut [Option<NonMaxUsize>],
    ) -> Option<PatternID> {
        if self.longest() {
            // Leftmost-longest group spans come from the match-kind=All
            // PikeVM; the one-pass DFA and backtracker only know
            // leftmost-first.
            self.stats.nfa_search();
            return self.pikevm_all.search_slots(
                &mut state.pikevm_all,
                input,
                slots,
            );
        }
        if let Some(engine) = self.onepass.get(input) {
            self.stats.one_pass_search();
            match engine.try_search_slots(
                state.onepass.get_mut(),
                input,
                slots,
            ) {
                Ok(pid) => return pid,
                Err(_err) => {
                    trace!("one-pass capture search failed: {}", _err)
                }
            }
        }
        if !self.can_match_empty || input.get_anchored().is_anchored() {
            if let Some(bt) = self.backtrack.get(input) {
                match bt.try_search_slots(
                    state.backtrack.get_mut(),
                    input,
                    slots,
                ) {
                    Ok(pid) => return pid,
                    Err(_) => {}
                }
            }
        }
        self.stats.nfa_search();
        self.pikevm.search_slots(&mut state.pikevm, input, slots)
    }

    /// The end of the leftmost-first match beginning exactly at `start`.
    fn anchored_end(
        &self,
        state: &mut SearchState,
        input: &Input<'_>,
        start: usize,
    ) -> Option<usize> {
        let sub =
            input.clone().span(start..input.end()).anchored(Anchored::Yes);
        if let Some(engine) = self.hybrid.get() {
            self.stats.dfa_search();
            match engine.try_search_half_fwd(&mut state.hybrid, &sub) {
                Ok(m) => return m.map(|hm| hm.offset()),
                Err(err) => self.note_dfa_failure(&err),
            }
        }
        self.stats.nfa_search();
        let mut slots = [None, None];
        self.pikevm
            .search_slots(&mut state.pikevm, &sub, &mut slots)
            .map(|_| span_of(&slots).1)
    }

    /// The end of the *longest* match beginning exactly at `start`,
    /// resolved by the match-kind=All PikeVM.
    fn longest_end(
        &self,
        state: &mut SearchState,
        input: &Input<'_>,
        start: usize,
    ) -> Option<usize> {
        let sub =
            input.clone().span(start..input.end()).anchored(Anchored::Yes);
        self.stats.nfa_search();
        let mut slots = [None, None];
        self.pikevm_all
            .search_slots(&mut state.pikevm_all, &sub, &mut slots)
            .map(|_| span_of(&slots).1)
    }

    fn note_dfa_failure(&self, err: &MatchError) {
        match *err.kind() {
            MatchErrorKind::GaveUp { .. } => {
                trace!("lazy DFA gave up under cache pressure: {}", err);
                self.stats.dfa_gave_up();
            }
            _ => {
                trace!("lazy DFA failed, using NFA fallback: {}", err);
            }
        }
    }
}

#[inline(always)]
fn span_of(slots: &[Option<NonMaxUsize>; 2]) -> (usize, usize) {
    // A reported match always fills the implicit group's slots.
    (slots[0].unwrap().get(), slots[1].unwrap().get())
}

#[inline(always)]
fn copy_span_to_slots(
    start: usize,
    end: usize,
    slots: &mut [Option<NonMaxUsize>],
) {
    if let Some(slot) = slots.get_mut(0) {
        *slot = NonMaxUsize::new(start);
    }
    if let Some(slot) = slots.get_mut(1) {
        *slot = NonMaxUsize::new(end);
    }
}
