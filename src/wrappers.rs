/*!
Thin wrappers around the component regex engines.

Each wrapper hides both "was this engine built at all" and the engine's own
cache plumbing behind a small internal API, so that the dispatch layer reads
as a sequence of `get` probes and search calls. An engine that is not
constructed costs nothing here: the wrapper is just `None`, and its cache
wrapper is `None` too.
*/

use regex_automata::{
    dfa::onepass,
    hybrid,
    nfa::thompson::{backtrack, pikevm, NFA},
    util::{prefilter::Prefilter as RaPrefilter, primitives::NonMaxUsize},
    HalfMatch, Input, Match, MatchError, MatchKind, PatternID,
};

use crate::{config::Config, error::BuildError};

#[derive(Debug)]
pub(crate) struct PikeVM(pikevm::PikeVM);

impl PikeVM {
    pub(crate) fn new(
        nfa: &NFA,
        kind: MatchKind,
        pre: Option<RaPrefilter>,
    ) -> Result<PikeVM, BuildError> {
        let pikevm_config =
            pikevm::Config::new().match_kind(kind).prefilter(pre);
        let engine = pikevm::Builder::new()
            .configure(pikevm_config)
            .build_from_nfa(nfa.clone())
            .map_err(BuildError::nfa)?;
        trace!("PikeVM built with match kind {:?}", kind);
        Ok(PikeVM(engine))
    }

    pub(crate) fn create_cache(&self) -> PikeVMCache {
        PikeVMCache(self.0.create_cache())
    }

    #[inline(always)]
    pub(crate) fn search_slots(
        &self,
        cache: &mut PikeVMCache,
        input: &Input<'_>,
        slots: &mut [Option<NonMaxUsize>],
    ) -> Option<PatternID> {
        self.0.search_slots(&mut cache.0, input, slots)
    }

    pub(crate) fn memory_usage(&self) -> usize {
        self.0.get_nfa().memory_usage()
    }
}

#[derive(Clone, Debug)]
pub(crate) struct PikeVMCache(pikevm::Cache);

#[derive(Debug)]
pub(crate) struct BoundedBacktracker(Option<backtrack::BoundedBacktracker>);

impl BoundedBacktracker {
    pub(crate) fn none() -> BoundedBacktracker {
        BoundedBacktracker(None)
    }

    pub(crate) fn new(
        config: &Config,
        nfa: &NFA,
        pre: Option<RaPrefilter>,
    ) -> Result<BoundedBacktracker, BuildError> {
        if !config.get_backtrack() {
            return Ok(BoundedBacktracker::none());
        }
        let backtrack_config = backtrack::Config::new()
            .visited_capacity(config.get_backtrack_limit())
            .prefilter(pre);
        let engine = backtrack::Builder::new()
            .configure(backtrack_config)
            .build_from_nfa(nfa.clone())
            .map_err(BuildError::nfa)?;
        trace!(
            "BoundedBacktracker built, max haystack len: {}",
            engine.max_haystack_len()
        );
        Ok(BoundedBacktracker(Some(engine)))
    }

    pub(crate) fn create_cache(&self) -> BoundedBacktrackerCache {
        BoundedBacktrackerCache(self.0.as_ref().map(|e| e.create_cache()))
    }

    /// Returns the engine only when it can handle the span of the given
    /// search, i.e. when `nfa_states * span_len` fits the visited budget.
    #[inline(always)]
    pub(crate) fn get(
        &self,
        input: &Input<'_>,
    ) -> Option<&backtrack::BoundedBacktracker> {
        let engine = self.0.as_ref()?;
        if input.get_span().len() > engine.max_haystack_len() {
            return None;
        }
        Some(engine)
    }

    pub(crate) fn memory_usage(&self) -> usize {
        self.0.as_ref().map_or(0, |e| e.get_nfa().memory_usage())
    }
}

#[derive(Clone, Debug)]
pub(crate) struct BoundedBacktrackerCache(Option<backtrack::Cache>);

impl BoundedBacktrackerCache {
    #[inline(always)]
    pub(crate) fn get_mut(&mut self) -> &mut backtrack::Cache {
        // Only reachable via BoundedBacktracker::get, which implies the
        // engine and therefore its cache were built.
        self.0.as_mut().unwrap()
    }
}

#[derive(Debug)]
pub(crate) struct OnePass(Option<onepass::DFA>);

impl OnePass {
    pub(crate) fn none() -> OnePass {
        OnePass(None)
    }

    pub(crate) fn new(config: &Config, nfa: &NFA) -> OnePass {
        if !config.get_onepass() || !config.get_dfa() {
            return OnePass::none();
        }
        let onepass_config =
            onepass::Config::new().match_kind(MatchKind::LeftmostFirst);
        let result = onepass::Builder::new()
            .configure(onepass_config)
            .build_from_nfa(nfa.clone());
        let engine = match result {
            Ok(engine) => engine,
            Err(_err) => {
                // Most patterns are not one-pass. This is expected and the
                // capture path simply uses another engine.
                trace!("OnePass failed to build: {}", _err);
                return OnePass::none();
            }
        };
        trace!("OnePass built");
        OnePass(Some(engine))
    }

    pub(crate) fn create_cache(&self) -> OnePassCache {
        OnePassCache(self.0.as_ref().map(|e| e.create_cache()))
    }

    /// The one-pass DFA only supports anchored searches.
    #[inline(always)]
    pub(crate) fn get(&self, input: &Input<'_>) -> Option<&onepass::DFA> {
        let engine = self.0.as_ref()?;
        if !input.get_anchored().is_anchored() {
            return None;
        }
        Some(engine)
    }

    pub(crate) fn memory_usage(&self) -> usize {
        self.0.as_ref().map_or(0, |e| e.memory_usage())
    }
}

#[derive(Clone, Debug)]
pub(crate) struct OnePassCache(Option<onepass::Cache>);

impl OnePassCache {
    #[inline(always)]
    pub(crate) fn get_mut(&mut self) -> &mut onepass::Cache {
        // Only reachable via OnePass::get.
        self.0.as_mut().unwrap()
    }
}

#[derive(Debug)]
pub(crate) struct Hybrid(Option<hybrid::regex::Regex>);

impl Hybrid {
    pub(crate) fn none() -> Hybrid {
        Hybrid(None)
    }

    /// Builds the forward/reverse lazy DFA pair. Failure is not an error:
    /// the caller demotes to an NFA strategy.
    pub(crate) fn new(
        config: &Config,
        nfa: &NFA,
        nfarev: &NFA,
        pre: Option<RaPrefilter>,
    ) -> Hybrid {
        if !config.get_dfa() {
            return Hybrid::none();
        }
        let dfa_config = hybrid::dfa::Config::new()
            .match_kind(MatchKind::LeftmostFirst)
            // Unicode word boundaries compile heuristically: the DFA quits
            // when it sees a non-ASCII byte and the search falls back to an
            // NFA engine.
            .unicode_word_boundary(true)
            .specialize_start_states(pre.is_some())
            .prefilter(pre)
            .cache_capacity(config.get_dfa_cache_capacity())
            // Bounding the number of cache clears is what turns cache
            // thrashing into a `GaveUp` error, which the dispatch layer
            // converts into an NFA fallback plus a counter bump.
            .minimum_cache_clear_count(Some(config.get_dfa_clear_limit()));
        let fwd = match hybrid::dfa::Builder::new()
            .configure(dfa_config.clone())
            .build_from_nfa(nfa.clone())
        {
            Ok(fwd) => fwd,
            Err(_err) => {
                debug!("forward lazy DFA failed to build: {}", _err);
                return Hybrid::none();
            }
        };
        let rev = match hybrid::dfa::Builder::new()
            .configure(
                dfa_config
                    .clone()
                    .match_kind(MatchKind::All)
                    .prefilter(None)
                    .specialize_start_states(false),
            )
            .build_from_nfa(nfarev.clone())
        {
            Ok(rev) => rev,
            Err(_err) => {
                debug!("reverse lazy DFA failed to build: {}", _err);
                return Hybrid::none();
            }
        };
        let engine = hybrid::regex::Builder::new().build_from_dfas(fwd, rev);
        trace!("lazy DFA built");
        Hybrid(Some(engine))
    }

    pub(crate) fn create_cache(&self) -> HybridCache {
        HybridCache(self.0.as_ref().map(|e| e.create_cache()))
    }

    #[inline(always)]
    pub(crate) fn get(&self) -> Option<HybridEngine<'_>> {
        self.0.as_ref().map(HybridEngine)
    }

    pub(crate) fn is_some(&self) -> bool {
        self.0.is_some()
    }
}

/// A borrowed lazy DFA pair, with the cache unwrapping kept in one place.
#[derive(Debug)]
pub(crate) struct HybridEngine<'e>(&'e hybrid::regex::Regex);

impl<'e> HybridEngine<'e> {
    /// A full search: forward scan for the end, reverse scan for the start.
    #[inline(always)]
    pub(crate) fn try_search(
        &self,
        cache: &mut HybridCache,
        input: &Input<'_>,
    ) -> Result<Option<Match>, MatchError> {
        self.0.try_search(cache.get_mut(), input)
    }

    /// A forward half search, reporting only the end of a match.
    #[inline(always)]
    pub(crate) fn try_search_half_fwd(
        &self,
        cache: &mut HybridCache,
        input: &Input<'_>,
    ) -> Result<Option<HalfMatch>, MatchError> {
        let (fwdcache, _) = cache.get_mut().as_parts_mut();
        self.0.forward().try_search_fwd(fwdcache, input)
    }

    /// A reverse half search, reporting only the start of a match whose end
    /// is the end of the given span.
    #[inline(always)]
    pub(crate) fn try_search_half_rev(
        &self,
        cache: &mut HybridCache,
        input: &Input<'_>,
    ) -> Result<Option<HalfMatch>, MatchError> {
        let (_, revcache) = cache.get_mut().as_parts_mut();
        self.0.reverse().try_search_rev(revcache, input)
    }
}

#[derive(Debug)]
pub(crate) struct HybridCache(Option<hybrid::regex::Cache>);

impl HybridCache {
    #[inline(always)]
    fn get_mut(&mut self) -> &mut hybrid::regex::Cache {
        // Only reachable via Hybrid::get.
        self.0.as_mut().unwrap()
    }
}

/// Per-search scratch used by prefilter-driven strategies to decide when
/// candidate verification is failing too often to keep consulting the
/// prefilter.
#[derive(Clone, Debug, Default)]
pub(crate) struct PrefilterScratch {
    pub(crate) failures: u32,
    pub(crate) abandoned: bool,
}

impl PrefilterScratch {
    pub(crate) fn reset(&mut self) {
        self.failures = 0;
        self.abandoned = false;
    }
}

/// The block of per-search mutable state checked out of the engine's pool
/// for the duration of one call.
///
/// The engines themselves are pure programs; everything a search mutates
/// (PikeVM thread lists, the backtracker's visited set, one-pass capture
/// slots, lazy DFA transition caches) lives here. Caches are reused warm
/// across searches on purpose: the lazy DFA in particular benefits from
/// keeping its transition table between calls.
#[derive(Debug)]
pub(crate) struct SearchState {
    pub(crate) pikevm: PikeVMCache,
    pub(crate) pikevm_all: PikeVMCache,
    pub(crate) backtrack: BoundedBacktrackerCache,
    pub(crate) onepass: OnePassCache,
    pub(crate) hybrid: HybridCache,
    pub(crate) scratch: PrefilterScratch,
}
