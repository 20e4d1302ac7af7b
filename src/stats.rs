use core::sync::atomic::{AtomicU64, Ordering};

/// Diagnostic counters shared by every clone of an engine.
///
/// All updates use relaxed ordering. The counters are advisory: they exist so
/// that callers (and tests) can observe which engines a pattern's searches
/// actually exercised, and they make silent fallbacks visible. They carry no
/// synchronization meaning.
#[derive(Debug, Default)]
pub(crate) struct Stats {
    nfa_searches: AtomicU64,
    dfa_searches: AtomicU64,
    one_pass_searches: AtomicU64,
    aho_corasick_searches: AtomicU64,
    prefilter_hits: AtomicU64,
    prefilter_misses: AtomicU64,
    prefilter_abandoned: AtomicU64,
    dfa_cache_full: AtomicU64,
}

impl Stats {
    pub(crate) fn new() -> Stats {
        Stats::default()
    }

    pub(crate) fn nfa_search(&self) {
        self.nfa_searches.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn dfa_search(&self) {
        self.dfa_searches.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn one_pass_search(&self) {
        self.one_pass_searches.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn aho_corasick_search(&self) {
        self.aho_corasick_searches.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn prefilter_hit(&self) {
        self.prefilter_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn prefilter_miss(&self) {
        self.prefilter_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn prefilter_abandon(&self) {
        self.prefilter_abandoned.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn dfa_gave_up(&self) {
        self.dfa_cache_full.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            nfa_searches: self.nfa_searches.load(Ordering::Relaxed),
            dfa_searches: self.dfa_searches.load(Ordering::Relaxed),
            one_pass_searches: self.one_pass_searches.load(Ordering::Relaxed),
            aho_corasick_searches: self
                .aho_corasick_searches
                .load(Ordering::Relaxed),
            prefilter_hits: self.prefilter_hits.load(Ordering::Relaxed),
            prefilter_misses: self.prefilter_misses.load(Ordering::Relaxed),
            prefilter_abandoned: self
                .prefilter_abandoned
                .load(Ordering::Relaxed),
            dfa_cache_full: self.dfa_cache_full.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn reset(&self) {
        self.nfa_searches.store(0, Ordering::Relaxed);
        self.dfa_searches.store(0, Ordering::Relaxed);
        self.one_pass_searches.store(0, Ordering::Relaxed);
        self.aho_corasick_searches.store(0, Ordering::Relaxed);
        self.prefilter_hits.store(0, Ordering::Relaxed);
        self.prefilter_misses.store(0, Ordering::Relaxed);
        self.prefilter_abandoned.store(0, Ordering::Relaxed);
        self.dfa_cache_full.store(0, Ordering::Relaxed);
    }
}

/// A point-in-time copy of an engine's diagnostic counters.
///
/// Returned by [`Engine::stats`](crate::Engine::stats).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct StatsSnapshot {
    /// Searches answered by the PikeVM or the bounded backtracker.
    pub nfa_searches: u64,
    /// Searches (or search attempts) answered by the lazy DFA.
    pub dfa_searches: u64,
    /// Capture resolutions answered by the one-pass DFA.
    pub one_pass_searches: u64,
    /// Searches answered by an Aho-Corasick automaton.
    pub aho_corasick_searches: u64,
    /// Prefilter scans that produced a candidate.
    pub prefilter_hits: u64,
    /// Prefilter scans that exhausted the haystack.
    pub prefilter_misses: u64,
    /// Searches that stopped consulting their prefilter because candidate
    /// verification kept failing.
    pub prefilter_abandoned: u64,
    /// Lazy DFA searches that gave up under cache pressure and fell back to
    /// an NFA engine.
    pub dfa_cache_full: u64,
}
