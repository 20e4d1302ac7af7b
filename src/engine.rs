use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use regex_automata::{
    nfa::thompson::{self, WhichCaptures, NFA},
    util::{prefilter::Prefilter as RaPrefilter, primitives::NonMaxUsize},
    Input, MatchKind, PatternID,
};
use regex_syntax::hir::Hir;

use crate::{
    config::Config,
    error::BuildError,
    literal::Literals,
    matches::{Captures, Match},
    prefilter::Prefilter,
    shape::Shape,
    stats::{Stats, StatsSnapshot},
    strategy::{self, Strategy, StrategyKind},
    util::{
        iter::Advancer,
        pool::{StatePool, StatePoolFn},
    },
    wrappers::{self, SearchState},
};

/// A compiled pattern, ready to search.
///
/// An `Engine` bundles the strategy picked for the pattern, the component
/// engines that strategy needs, an optional literal prefilter, shared
/// diagnostic counters and a pool of per-search mutable state. Everything
/// except the pool and the counters is immutable after compilation, which is
/// what makes one engine safe to share (and cheap to clone) across threads.
///
/// All positions taken and returned are byte offsets into the haystack.
#[derive(Clone, Debug)]
pub struct Engine {
    imp: Arc<EngineI>,
    pool: Arc<StatePool>,
}

/// The immutable interior of an engine, shared by all of its clones.
#[derive(Debug)]
pub(crate) struct EngineI {
    pub(crate) strategy: Strategy,
    pub(crate) prefilter: Option<Prefilter>,
    pub(crate) pikevm: wrappers::PikeVM,
    pub(crate) pikevm_all: wrappers::PikeVM,
    pub(crate) backtrack: wrappers::BoundedBacktracker,
    pub(crate) onepass: wrappers::OnePass,
    pub(crate) hybrid: wrappers::Hybrid,
    pub(crate) stats: Stats,
    pub(crate) nfa: NFA,
    pub(crate) longest: AtomicBool,
    pub(crate) always_anchored: bool,
    pub(crate) can_match_empty: bool,
    pub(crate) slot_len: usize,
    pub(crate) capture_names: Arc<Vec<Option<String>>>,
}

impl EngineI {
    #[inline]
    pub(crate) fn longest(&self) -> bool {
        self.longest.load(Ordering::Relaxed)
    }

    pub(crate) fn create_search_state(&self) -> SearchState {
        SearchState {
            pikevm: self.pikevm.create_cache(),
            pikevm_all: self.pikevm_all.create_cache(),
            backtrack: self.backtrack.create_cache(),
            onepass: self.onepass.create_cache(),
            hybrid: self.hybrid.create_cache(),
            scratch: Default::default(),
        }
    }

    pub(crate) fn captures_from_slots<'h>(
        &self,
        haystack: &'h [u8],
        slots: &[Option<NonMaxUsize>],
    ) -> Captures<'h> {
        let groups = slots
            .chunks(2)
            .map(|pair| {
                let start = pair.get(0).copied().flatten()?;
                let end = pair.get(1).copied().flatten()?;
                Some((start.get(), end.get()))
            })
            .collect();
        Captures::new(haystack, groups, Arc::clone(&self.capture_names))
    }
}

/// A builder for [`Engine`]s, used to set a non-default [`Config`].
#[derive(Clone, Debug, Default)]
pub struct Builder {
    config: Config,
}

impl Builder {
    /// Create a builder with a default configuration.
    pub fn new() -> Builder {
        Builder::default()
    }

    /// Apply the given configuration. Options explicitly set in `config`
    /// override earlier settings; unset options are left alone.
    pub fn configure(&mut self, config: Config) -> &mut Builder {
        self.config = self.config.overwrite(config);
        self
    }

    /// Compile the given pattern.
    pub fn build(&self, pattern: &str) -> Result<Engine, BuildError> {
        self.config.validate()?;
        let mut parser = regex_syntax::ParserBuilder::new();
        parser
            .utf8(false)
            .nest_limit(self.config.get_nest_limit())
            .case_insensitive(self.config.get_case_insensitive())
            .multi_line(self.config.get_multi_line())
            .dot_matches_new_line(self.config.get_dot_matches_new_line())
            .swap_greed(self.config.get_swap_greed())
            .ignore_whitespace(self.config.get_ignore_whitespace())
            .unicode(self.config.get_unicode());
        let hir =
            parser.build().parse(pattern).map_err(BuildError::syntax)?;
        self.build_from_hir(&hir)
    }

    /// Compile from an already-parsed pattern.
    pub fn build_from_hir(&self, hir: &Hir) -> Result<Engine, BuildError> {
        let config = &self.config;
        config.validate()?;

        let thompson_config = thompson::Config::new()
            .utf8(config.get_utf8())
            .nfa_size_limit(config.get_nfa_size_limit())
            .shrink(false)
            .which_captures(WhichCaptures::All);
        let nfa = thompson::Compiler::new()
            .configure(thompson_config.clone())
            .build_from_hir(hir)
            .map_err(BuildError::nfa)?;

        let props = hir.properties();
        let mut shape = Shape::analyze(hir);
        let lits = Literals::extract(hir);
        let state_count = nfa.states().len();
        let always_anchored = nfa.is_always_start_anchored();
        let can_match_empty = nfa.has_empty();
        let explicit_captures = props.explicit_captures_len();
        let has_any_look = !props.look_set().is_empty();

        let group_info = nfa.group_info().clone();
        let slot_len = group_info.slot_len();
        let capture_names: Arc<Vec<Option<String>>> = Arc::new(
            group_info
                .pattern_names(PatternID::ZERO)
                .map(|name| name.map(|n| n.to_string()))
                .collect(),
        );

        // The prefilter narrows candidates for the core engines. It is
        // "complete" when a hit is itself a match, which additionally
        // requires that there is nothing a literal cannot express: no
        // capture groups and no look-around (literal extraction treats
        // look-arounds as matching every empty string, so 'foo\bbar' would
        // otherwise claim the exact literal "foobar").
        let mut prefilter = None;
        let mut ra_prefilter = None;
        if config.get_prefilter() && !always_anchored {
            let good = lits.good_prefixes(
                config.get_min_literal_len(),
                config.get_max_literals(),
            );
            if good {
                if let Some(prefix_lits) = lits.prefix_literals() {
                    let complete = lits.prefixes_exact()
                        && explicit_captures == 0
                        && !has_any_look;
                    prefilter = Prefilter::new(
                        &prefix_lits,
                        complete,
                        config.get_teddy_max_literals(),
                    );
                    ra_prefilter = RaPrefilter::new(
                        MatchKind::LeftmostFirst,
                        &prefix_lits,
                    );
                }
            }
        }

        let mut kind = {
            let inp = strategy::SelInput {
                config,
                shape: &shape,
                lits: &lits,
                state_count,
                explicit_captures,
                has_any_look,
                always_anchored,
            };
            strategy::select(&inp)
        };

        let pikevm = wrappers::PikeVM::new(
            &nfa,
            MatchKind::LeftmostFirst,
            ra_prefilter.clone(),
        )?;
        let pikevm_all =
            wrappers::PikeVM::new(&nfa, MatchKind::All, None)?;
        let backtrack = wrappers::BoundedBacktracker::new(
            config,
            &nfa,
            ra_prefilter.clone(),
        )?;
        let onepass = if explicit_captures > 0 {
            wrappers::OnePass::new(config, &nfa)
        } else {
            wrappers::OnePass::none()
        };

        // Strategy payloads can fail to build, and DFA-dependent strategies
        // can find the lazy DFA unavailable. Either way the kind demotes
        // along its chain; the chain bottoms out at Nfa, which always
        // succeeds. The reverse NFA is only compiled when some kind on the
        // way actually wants a DFA.
        let mut hybrid = wrappers::Hybrid::none();
        let mut hybrid_attempted = false;
        let strategy = loop {
            let needs_dfa = kind.requires_dfa();
            if (needs_dfa || kind.wants_dfa())
                && config.get_dfa()
                && !hybrid_attempted
            {
                hybrid_attempted = true;
                let nfarev = thompson::Compiler::new()
                    .configure(
                        thompson_config
                            .clone()
                            .reverse(true)
                            .which_captures(WhichCaptures::None),
                    )
                    .build_from_hir(hir);
                match nfarev {
                    Ok(nfarev) => {
                        hybrid = wrappers::Hybrid::new(
                            config,
                            &nfa,
                            &nfarev,
                            ra_prefilter.clone(),
                        );
                    }
                    Err(_err) => {
                        debug!("reverse NFA failed to build: {}", _err);
                    }
                }
            }
            if needs_dfa && !hybrid.is_some() {
                let next = kind.demote();
                debug!(
                    "strategy {:?} needs the lazy DFA, demoting to {:?}",
                    kind, next
                );
                kind = next;
                continue;
            }
            match strategy::build(kind, config, &mut shape, &lits) {
                Ok(strategy) => break strategy,
                Err(()) => {
                    let next = kind.demote();
                    debug!(
                        "failed to build strategy {:?}, demoting to {:?}",
                        kind, next
                    );
                    kind = next;
                }
            }
        };
        debug!("compiled with strategy {:?}", strategy.kind());

        let imp = Arc::new(EngineI {
            strategy,
            prefilter,
            pikevm,
            pikevm_all,
            backtrack,
            onepass,
            hybrid,
            stats: Stats::new(),
            nfa,
            longest: AtomicBool::new(config.get_longest()),
            always_anchored,
            can_match_empty,
            slot_len,
            capture_names,
        });
        let pool = {
            let imp = Arc::clone(&imp);
            let create: StatePoolFn =
                Box::new(move || imp.create_search_state());
            Arc::new(StatePool::new(create))
        };
        Ok(Engine { imp, pool })
    }
}

impl Engine {
    /// Compile a pattern with the default configuration.
    pub fn new(pattern: &str) -> Result<Engine, BuildError> {
        Engine::builder().build(pattern)
    }

    /// A fresh default configuration.
    pub fn config() -> Config {
        Config::new()
    }

    /// A builder for configuring compilation.
    pub fn builder() -> Builder {
        Builder::new()
    }

    /// The leftmost match in `haystack`.
    ///
    /// # Example
    ///
    /// ```
    /// use regex_meta::Engine;
    ///
    /// let re = Engine::new(r"\d+\.\d+\.\d+")?;
    /// let m = re.find(b"x 1.2.3 y 4.5.6").unwrap();
    /// assert_eq!((2, 7), (m.start(), m.end()));
    /// assert_eq!(b"1.2.3", m.as_bytes());
    /// # Ok::<(), regex_meta::BuildError>(())
    /// ```
    pub fn find<'h>(&self, haystack: &'h [u8]) -> Option<Match<'h>> {
        self.find_at(haystack, 0)
    }

    /// The leftmost match whose start is at or after `at`.
    ///
    /// Returns `None` when `at > haystack.len()`, and always returns `None`
    /// for `at > 0` when the pattern is anchored to the start of the
    /// haystack.
    ///
    /// # Example
    ///
    /// ```
    /// use regex_meta::Engine;
    ///
    /// let re = Engine::new(r"[a-z]+")?;
    /// let m = re.find_at(b"ab cd", 2).unwrap();
    /// assert_eq!((3, 5), (m.start(), m.end()));
    /// // An anchored pattern can never match past the start.
    /// let re = Engine::new(r"^foo")?;
    /// assert!(re.find_at(b"foofoo", 1).is_none());
    /// # Ok::<(), regex_meta::BuildError>(())
    /// ```
    pub fn find_at<'h>(
        &self,
        haystack: &'h [u8],
        at: usize,
    ) -> Option<Match<'h>> {
        let (start, end) = self.find_indices_at(haystack, at)?;
        Some(Match::new(haystack, start, end))
    }

    /// Like [`Engine::find`], but returns only the `(start, end)` offsets.
    pub fn find_indices(&self, haystack: &[u8]) -> Option<(usize, usize)> {
        self.find_indices_at(haystack, 0)
    }

    /// Like [`Engine::find_at`], but returns only the `(start, end)`
    /// offsets.
    pub fn find_indices_at(
        &self,
        haystack: &[u8],
        at: usize,
    ) -> Option<(usize, usize)> {
        if at > haystack.len() {
            return None;
        }
        if at > 0 && self.imp.always_anchored {
            return None;
        }
        let mut guard = self.pool.get();
        let state = &mut *guard;
        let input = Input::new(haystack).span(at..haystack.len());
        self.imp.search(state, &input)
    }

    /// Whether the pattern matches anywhere in `haystack`. May use engines
    /// that only report presence, which is faster than [`Engine::find`].
    pub fn is_match(&self, haystack: &[u8]) -> bool {
        let mut guard = self.pool.get();
        let state = &mut *guard;
        self.imp.is_match(state, &Input::new(haystack))
    }

    /// The leftmost match along with the spans of all capture groups.
    ///
    /// A group that did not participate in the match reports `None`, never
    /// a zeroed span.
    ///
    /// # Example
    ///
    /// ```
    /// use regex_meta::Engine;
    ///
    /// let re = Engine::new(r"(\w+)@(\w+)\.(\w+)")?;
    /// let caps = re.find_submatch(b"u@e.com").unwrap();
    /// assert_eq!(Some((0, 1)), caps.get(1));
    /// assert_eq!(Some((2, 3)), caps.get(2));
    /// assert_eq!(Some(&b"com"[..]), caps.group(3));
    /// # Ok::<(), regex_meta::BuildError>(())
    /// ```
    pub fn find_submatch<'h>(
        &self,
        haystack: &'h [u8],
    ) -> Option<Captures<'h>> {
        self.find_submatch_at(haystack, 0)
    }

    /// Like [`Engine::find_submatch`], starting at `at`.
    pub fn find_submatch_at<'h>(
        &self,
        haystack: &'h [u8],
        at: usize,
    ) -> Option<Captures<'h>> {
        if at > haystack.len() {
            return None;
        }
        if at > 0 && self.imp.always_anchored {
            return None;
        }
        let mut guard = self.pool.get();
        let state = &mut *guard;
        let mut slots = vec![None; self.imp.slot_len];
        let input = Input::new(haystack).span(at..haystack.len());
        self.imp.search_slots(state, &input, &mut slots)?;
        Some(self.imp.captures_from_slots(haystack, &slots))
    }

    /// The number of non-overlapping matches in `haystack`, up to `limit`
    /// (`None` counts them all).
    ///
    /// # Example
    ///
    /// ```
    /// use regex_meta::Engine;
    ///
    /// let re = Engine::new(r"[a-z]+")?;
    /// assert_eq!(4, re.count(b"ab cd ef gh", None));
    /// assert_eq!(2, re.count(b"ab cd ef gh", Some(2)));
    /// assert_eq!(0, re.count(b"ab cd ef gh", Some(0)));
    /// # Ok::<(), regex_meta::BuildError>(())
    /// ```
    pub fn count(&self, haystack: &[u8], limit: Option<usize>) -> usize {
        if limit == Some(0) {
            return 0;
        }
        // A single character class emits all of its runs in one pass,
        // without going through per-match dispatch.
        if let Strategy::CharClass(ref run) = self.imp.strategy {
            let mut n = 0;
            run.for_each_run(haystack, |_, _| {
                n += 1;
                limit.map_or(true, |l| n < l)
            });
            return n;
        }
        let mut guard = self.pool.get();
        let state = &mut *guard;
        let mut adv = Advancer::new(0);
        let mut n = 0;
        while adv
            .advance(haystack.len(), |pos| {
                let input = Input::new(haystack).span(pos..haystack.len());
                self.imp.search(state, &input)
            })
            .is_some()
        {
            n += 1;
            if limit.map_or(false, |l| n >= l) {
                break;
            }
        }
        n
    }

    /// Appends the spans of all non-overlapping matches (up to `limit`) to
    /// `out`.
    pub fn find_all_indices(
        &self,
        haystack: &[u8],
        limit: Option<usize>,
        out: &mut Vec<(usize, usize)>,
    ) {
        if limit == Some(0) {
            return;
        }
        if let Strategy::CharClass(ref run) = self.imp.strategy {
            let mut n = 0;
            run.for_each_run(haystack, |s, e| {
                out.push((s, e));
                n += 1;
                limit.map_or(true, |l| n < l)
            });
            return;
        }
        let mut guard = self.pool.get();
        let state = &mut *guard;
        let mut adv = Advancer::new(0);
        let mut n = 0;
        while let Some(span) = adv.advance(haystack.len(), |pos| {
            let input = Input::new(haystack).span(pos..haystack.len());
            self.imp.search(state, &input)
        }) {
            out.push(span);
            n += 1;
            if limit.map_or(false, |l| n >= l) {
                break;
            }
        }
    }

    /// All non-overlapping matches (up to `limit`) with their capture
    /// groups.
    pub fn find_all_submatch<'h>(
        &self,
        haystack: &'h [u8],
        limit: Option<usize>,
    ) -> Vec<Captures<'h>> {
        let mut out = vec![];
        if limit == Some(0) {
            return out;
        }
        let mut guard = self.pool.get();
        let state = &mut *guard;
        let mut adv = Advancer::new(0);
        loop {
            let mut found: Option<Captures<'h>> = None;
            let advanced = adv.advance(haystack.len(), |pos| {
                let mut slots = vec![None; self.imp.slot_len];
                let input = Input::new(haystack).span(pos..haystack.len());
                self.imp.search_slots(state, &input, &mut slots)?;
                let caps = self.imp.captures_from_slots(haystack, &slots);
                // Group 0 is always present for a reported match.
                let span = caps.get(0).unwrap();
                found = Some(caps);
                Some(span)
            });
            match advanced {
                None => break,
                Some(_) => out.push(found.take().unwrap()),
            }
            if limit.map_or(false, |l| out.len() >= l) {
                break;
            }
        }
        out
    }

    /// An iterator over all non-overlapping matches.
    ///
    /// # Example
    ///
    /// ```
    /// use regex_meta::Engine;
    ///
    /// let re = Engine::new(r"[a-z]+[0-9]+")?;
    /// let spans: Vec<(usize, usize)> = re
    ///     .find_iter(b"--abc123--de45--")
    ///     .map(|m| (m.start(), m.end()))
    ///     .collect();
    /// assert_eq!(vec![(2, 8), (10, 14)], spans);
    /// # Ok::<(), regex_meta::BuildError>(())
    /// ```
    pub fn find_iter<'e, 'h>(&'e self, haystack: &'h [u8]) -> FindIter<'e, 'h> {
        FindIter { engine: self, haystack, adv: Advancer::new(0) }
    }

    /// An iterator over all non-overlapping matches with capture groups.
    pub fn captures_iter<'e, 'h>(
        &'e self,
        haystack: &'h [u8],
    ) -> CapturesIter<'e, 'h> {
        CapturesIter { engine: self, haystack, adv: Advancer::new(0) }
    }

    /// Switches between leftmost-first (the default) and leftmost-longest
    /// (POSIX) semantics on the engines that support both. Strategies that
    /// bypass the NFA engines entirely are unaffected.
    ///
    /// The setting is shared by every clone of this engine.
    ///
    /// # Example
    ///
    /// ```
    /// use regex_meta::Engine;
    ///
    /// let re = Engine::new(r"a|ab")?;
    /// assert_eq!((0, 1), re.find_indices(b"ab").unwrap());
    /// re.set_longest(true);
    /// assert_eq!((0, 2), re.find_indices(b"ab").unwrap());
    /// # Ok::<(), regex_meta::BuildError>(())
    /// ```
    pub fn set_longest(&self, yes: bool) {
        self.imp.longest.store(yes, Ordering::Relaxed);
    }

    /// The number of capture groups, including the implicit group 0.
    pub fn num_captures(&self) -> usize {
        self.imp.capture_names.len()
    }

    /// The names of all capture groups, `None` for unnamed ones. The length
    /// always equals [`Engine::num_captures`].
    pub fn capture_names(&self) -> &[Option<String>] {
        &self.imp.capture_names
    }

    /// The strategy this pattern compiled to.
    ///
    /// # Example
    ///
    /// ```
    /// use regex_meta::{Engine, StrategyKind};
    ///
    /// let re = Engine::new(r".*\.txt")?;
    /// assert_eq!(StrategyKind::ReverseSuffix, re.strategy());
    /// let re = Engine::new(r"foo|bar|baz")?;
    /// assert_eq!(StrategyKind::Teddy, re.strategy());
    /// # Ok::<(), regex_meta::BuildError>(())
    /// ```
    pub fn strategy(&self) -> StrategyKind {
        self.imp.strategy.kind()
    }

    /// A human-readable explanation of the chosen strategy, for
    /// diagnostics.
    pub fn strategy_reason(&self) -> &'static str {
        self.strategy().reason()
    }

    /// A snapshot of the diagnostic counters.
    pub fn stats(&self) -> StatsSnapshot {
        self.imp.stats.snapshot()
    }

    /// Resets all diagnostic counters to zero.
    pub fn reset_stats(&self) {
        self.imp.stats.reset()
    }

    /// An approximation of the heap memory held by the compiled engines,
    /// excluding per-search state.
    pub fn memory_usage(&self) -> usize {
        self.imp.nfa.memory_usage()
            + self.imp.onepass.memory_usage()
            + self.imp.backtrack.memory_usage()
    }
}

/// An iterator over non-overlapping matches. Created by
/// [`Engine::find_iter`].
#[derive(Debug)]
pub struct FindIter<'e, 'h> {
    engine: &'e Engine,
    haystack: &'h [u8],
    adv: Advancer,
}

impl<'e, 'h> Iterator for FindIter<'e, 'h> {
    type Item = Match<'h>;

    fn next(&mut self) -> Option<Match<'h>> {
        let imp = &self.engine.imp;
        let haystack = self.haystack;
        let mut guard = self.engine.pool.get();
        let state = &mut *guard;
        let (start, end) = self.adv.advance(haystack.len(), |pos| {
            let input = Input::new(haystack).span(pos..haystack.len());
            imp.search(state, &input)
        })?;
        Some(Match::new(haystack, start, end))
    }
}

/// An iterator over non-overlapping matches with capture groups. Created by
/// [`Engine::captures_iter`].
#[derive(Debug)]
pub struct CapturesIter<'e, 'h> {
    engine: &'e Engine,
    haystack: &'h [u8],
    adv: Advancer,
}

impl<'e, 'h> Iterator for CapturesIter<'e, 'h> {
    type Item = Captures<'h>;

    fn next(&mut self) -> Option<Captures<'h>> {
        let imp = &self.engine.imp;
        let haystack = self.haystack;
        let mut guard = self.engine.pool.get();
        let state = &mut *guard;
        let mut found: Option<Captures<'h>> = None;
        self.adv.advance(haystack.len(), |pos| {
            let mut slots = vec![None; imp.slot_len];
            let input = Input::new(haystack).span(pos..haystack.len());
            imp.search_slots(state, &input, &mut slots)?;
            let caps = imp.captures_from_slots(haystack, &slots);
            let span = caps.get(0).unwrap();
            found = Some(caps);
            Some(span)
        })?;
        found
    }
}
