use crate::error::BuildError;

/// The configuration of an [`Engine`](crate::Engine).
///
/// As with other configuration types in this family of crates, every knob is
/// stored as an `Option` so that "default" and "not set" can be
/// distinguished. This makes it possible to combine multiple configurations
/// without default values overwriting explicitly specified values. See the
/// `overwrite` method.
///
/// Most options are tuning knobs: they change which strategies and engines
/// are eligible, but never the observable match semantics (with the sole
/// exception of [`Config::longest`], which switches to leftmost-longest
/// matching). The syntax flags (`case_insensitive` and friends) configure the
/// default flags applied when the pattern is parsed.
///
/// # Example
///
/// ```
/// use regex_meta::{Config, Engine, StrategyKind};
///
/// // With DFAs disabled, every DFA-based strategy demotes to an NFA one.
/// let re = Engine::builder()
///     .configure(Config::new().dfa(false).prefilter(false))
///     .build(r"(\w+)=(\w+)")?;
/// assert_eq!(StrategyKind::Nfa, re.strategy());
/// # Ok::<(), regex_meta::BuildError>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct Config {
    dfa: Option<bool>,
    prefilter: Option<bool>,
    onepass: Option<bool>,
    backtrack: Option<bool>,
    longest: Option<bool>,
    utf8: Option<bool>,
    min_literal_len: Option<usize>,
    max_literals: Option<usize>,
    teddy_min_literals: Option<usize>,
    teddy_max_literals: Option<usize>,
    dfa_cache_capacity: Option<usize>,
    dfa_clear_limit: Option<usize>,
    backtrack_limit: Option<usize>,
    nfa_size_limit: Option<Option<usize>>,
    nest_limit: Option<u32>,
    case_insensitive: Option<bool>,
    multi_line: Option<bool>,
    dot_matches_new_line: Option<bool>,
    swap_greed: Option<bool>,
    ignore_whitespace: Option<bool>,
    unicode: Option<bool>,
}

impl Config {
    /// Return a new configuration with default settings.
    pub fn new() -> Config {
        Config::default()
    }

    /// Toggle whether DFA-based strategies may be used. When disabled, every
    /// strategy that needs a lazy DFA demotes to an NFA-based one, and no
    /// one-pass DFA is built.
    pub fn dfa(self, yes: bool) -> Config {
        Config { dfa: Some(yes), ..self }
    }

    /// Toggle whether a literal prefilter may be built. When disabled,
    /// strategies that require one demote.
    pub fn prefilter(self, yes: bool) -> Config {
        Config { prefilter: Some(yes), ..self }
    }

    /// Toggle whether a one-pass DFA may be built for resolving capture
    /// groups.
    pub fn onepass(self, yes: bool) -> Config {
        Config { onepass: Some(yes), ..self }
    }

    /// Toggle whether the bounded backtracker may be used.
    pub fn backtrack(self, yes: bool) -> Config {
        Config { backtrack: Some(yes), ..self }
    }

    /// Use leftmost-longest (POSIX) match semantics by default instead of
    /// leftmost-first.
    pub fn longest(self, yes: bool) -> Config {
        Config { longest: Some(yes), ..self }
    }

    /// Toggle whether empty matches are only permitted on UTF-8 codepoint
    /// boundaries. Since this engine searches arbitrary byte slices, this is
    /// disabled by default.
    pub fn utf8(self, yes: bool) -> Config {
        Config { utf8: Some(yes), ..self }
    }

    /// The minimum length, in bytes, for an extracted literal to be
    /// considered "good" enough to drive a prefilter or a literal strategy.
    pub fn min_literal_len(self, len: usize) -> Config {
        Config { min_literal_len: Some(len), ..self }
    }

    /// An upper bound on the size of any extracted literal set.
    pub fn max_literals(self, len: usize) -> Config {
        Config { max_literals: Some(len), ..self }
    }

    /// The smallest complete literal alternation that routes to the Teddy
    /// strategy.
    pub fn teddy_min_literals(self, len: usize) -> Config {
        Config { teddy_min_literals: Some(len), ..self }
    }

    /// The largest complete literal alternation that routes to the Teddy
    /// strategy. Bigger alternations route to Aho-Corasick.
    pub fn teddy_max_literals(self, len: usize) -> Config {
        Config { teddy_max_literals: Some(len), ..self }
    }

    /// The capacity, in bytes, of the lazy DFA's transition table cache.
    pub fn dfa_cache_capacity(self, bytes: usize) -> Config {
        Config { dfa_cache_capacity: Some(bytes), ..self }
    }

    /// The number of times the lazy DFA's cache may be cleared before a
    /// search gives up and falls back to an NFA engine.
    pub fn dfa_clear_limit(self, count: usize) -> Config {
        Config { dfa_clear_limit: Some(count), ..self }
    }

    /// The capacity, in bytes, of the bounded backtracker's visited set. The
    /// backtracker handles a haystack only when
    /// `nfa_states * haystack_len` fits this budget.
    pub fn backtrack_limit(self, bytes: usize) -> Config {
        Config { backtrack_limit: Some(bytes), ..self }
    }

    /// A limit, in bytes, on the total compiled size of the NFA.
    pub fn nfa_size_limit(self, limit: Option<usize>) -> Config {
        Config { nfa_size_limit: Some(limit), ..self }
    }

    /// A limit on the nesting depth of the pattern.
    pub fn nest_limit(self, limit: u32) -> Config {
        Config { nest_limit: Some(limit), ..self }
    }

    /// Default the `i` flag on, matching case insensitively.
    pub fn case_insensitive(self, yes: bool) -> Config {
        Config { case_insensitive: Some(yes), ..self }
    }

    /// Default the `m` flag on, making `^` and `$` match at line boundaries.
    pub fn multi_line(self, yes: bool) -> Config {
        Config { multi_line: Some(yes), ..self }
    }

    /// Default the `s` flag on, making `.` match any character including
    /// `\n`.
    pub fn dot_matches_new_line(self, yes: bool) -> Config {
        Config { dot_matches_new_line: Some(yes), ..self }
    }

    /// Default the `U` flag on, swapping the meaning of greedy and lazy
    /// repetitions.
    pub fn swap_greed(self, yes: bool) -> Config {
        Config { swap_greed: Some(yes), ..self }
    }

    /// Default the `x` flag on, ignoring whitespace in the pattern.
    pub fn ignore_whitespace(self, yes: bool) -> Config {
        Config { ignore_whitespace: Some(yes), ..self }
    }

    /// Default the `u` flag, controlling Unicode-aware classes and case
    /// folding.
    pub fn unicode(self, yes: bool) -> Config {
        Config { unicode: Some(yes), ..self }
    }

    pub(crate) fn get_dfa(&self) -> bool {
        self.dfa.unwrap_or(true)
    }

    pub(crate) fn get_prefilter(&self) -> bool {
        self.prefilter.unwrap_or(true)
    }

    pub(crate) fn get_onepass(&self) -> bool {
        self.onepass.unwrap_or(true)
    }

    pub(crate) fn get_backtrack(&self) -> bool {
        self.backtrack.unwrap_or(true)
    }

    pub(crate) fn get_longest(&self) -> bool {
        self.longest.unwrap_or(false)
    }

    pub(crate) fn get_utf8(&self) -> bool {
        self.utf8.unwrap_or(false)
    }

    pub(crate) fn get_min_literal_len(&self) -> usize {
        self.min_literal_len.unwrap_or(3)
    }

    pub(crate) fn get_max_literals(&self) -> usize {
        self.max_literals.unwrap_or(64)
    }

    pub(crate) fn get_teddy_min_literals(&self) -> usize {
        self.teddy_min_literals.unwrap_or(2)
    }

    pub(crate) fn get_teddy_max_literals(&self) -> usize {
        self.teddy_max_literals.unwrap_or(8)
    }

    pub(crate) fn get_dfa_cache_capacity(&self) -> usize {
        self.dfa_cache_capacity.unwrap_or(2 * (1 << 20))
    }

    pub(crate) fn get_dfa_clear_limit(&self) -> usize {
        self.dfa_clear_limit.unwrap_or(3)
    }

    pub(crate) fn get_backtrack_limit(&self) -> usize {
        self.backtrack_limit.unwrap_or(256 * (1 << 10))
    }

    pub(crate) fn get_nfa_size_limit(&self) -> Option<usize> {
        self.nfa_size_limit.unwrap_or(Some(10 * (1 << 20)))
    }

    pub(crate) fn get_nest_limit(&self) -> u32 {
        self.nest_limit.unwrap_or(250)
    }

    pub(crate) fn get_case_insensitive(&self) -> bool {
        self.case_insensitive.unwrap_or(false)
    }

    pub(crate) fn get_multi_line(&self) -> bool {
        self.multi_line.unwrap_or(false)
    }

    pub(crate) fn get_dot_matches_new_line(&self) -> bool {
        self.dot_matches_new_line.unwrap_or(false)
    }

    pub(crate) fn get_swap_greed(&self) -> bool {
        self.swap_greed.unwrap_or(false)
    }

    pub(crate) fn get_ignore_whitespace(&self) -> bool {
        self.ignore_whitespace.unwrap_or(false)
    }

    pub(crate) fn get_unicode(&self) -> bool {
        self.unicode.unwrap_or(true)
    }

    pub(crate) fn validate(&self) -> Result<(), BuildError> {
        if self.get_min_literal_len() == 0 {
            return Err(BuildError::config("min_literal_len must be at least 1"));
        }
        if self.get_teddy_min_literals() < 2 {
            return Err(BuildError::config(
                "teddy_min_literals must be at least 2",
            ));
        }
        if self.get_teddy_min_literals() > self.get_teddy_max_literals() {
            return Err(BuildError::config(
                "teddy_min_literals must not exceed teddy_max_literals",
            ));
        }
        if self.get_max_literals() < self.get_teddy_max_literals() {
            return Err(BuildError::config(
                "max_literals must be at least teddy_max_literals",
            ));
        }
        if self.get_backtrack_limit() == 0 {
            return Err(BuildError::config("backtrack_limit must be non-zero"));
        }
        if self.get_dfa_clear_limit() == 0 {
            return Err(BuildError::config("dfa_clear_limit must be non-zero"));
        }
        Ok(())
    }

    /// Overwrite the default configuration such that the options in `o` are
    /// always used. If an option in `o` is not set, then the corresponding
    /// option in `self` is used. If it's not set in `self` either, then it
    /// remains not set.
    pub(crate) fn overwrite(&self, o: Config) -> Config {
        Config {
            dfa: o.dfa.or(self.dfa),
            prefilter: o.prefilter.or(self.prefilter),
            onepass: o.onepass.or(self.onepass),
            backtrack: o.backtrack.or(self.backtrack),
            longest: o.longest.or(self.longest),
            utf8: o.utf8.or(self.utf8),
            min_literal_len: o.min_literal_len.or(self.min_literal_len),
            max_literals: o.max_literals.or(self.max_literals),
            teddy_min_literals: o.teddy_min_literals.or(self.teddy_min_literals),
            teddy_max_literals: o.teddy_max_literals.or(self.teddy_max_literals),
            dfa_cache_capacity: o.dfa_cache_capacity.or(self.dfa_cache_capacity),
            dfa_clear_limit: o.dfa_clear_limit.or(self.dfa_clear_limit),
            backtrack_limit: o.backtrack_limit.or(self.backtrack_limit),
            nfa_size_limit: o.nfa_size_limit.or(self.nfa_size_limit),
            nest_limit: o.nest_limit.or(self.nest_limit),
            case_insensitive: o.case_insensitive.or(self.case_insensitive),
            multi_line: o.multi_line.or(self.multi_line),
            dot_matches_new_line: o
                .dot_matches_new_line
                .or(self.dot_matches_new_line),
            swap_greed: o.swap_greed.or(self.swap_greed),
            ignore_whitespace: o.ignore_whitespace.or(self.ignore_whitespace),
            unicode: o.unicode.or(self.unicode),
        }
    }
}
