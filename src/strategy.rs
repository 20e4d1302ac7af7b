/*!
Strategy selection.

The selector maps the facts gathered at compile time (pattern shape, literal
summary, NFA size, configuration) to an execution plan. Selection is an
ordered cascade of individually testable rules; the first rule that applies
wins, and patterns that fit no rule land in one of the core tiers chosen by
NFA size and literal strength.

A selected strategy still has to be *built* (prefilters and tables can fail
to construct, DFAs can be disabled or refuse to build). Failure is never an
error: each strategy has a deterministic demotion target, and the chain
always terminates at `Nfa`, which cannot fail.
*/

use crate::{
    classes::{AnchoredLiteral, BranchTable, ClassRun, ClassSeq},
    config::Config,
    literal::Literals,
    prefilter::Prefilter,
    reverse::{CandidateScan, StartBound},
    shape::Shape,
};

/// The execution plan picked for a compiled pattern.
///
/// Returned by [`Engine::strategy`](crate::Engine::strategy) for
/// diagnostics. The variant never changes after compilation, and it never
/// affects observable match semantics, only how searches are executed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StrategyKind {
    /// `^prefix(?s:.)*suffix$`: decided by comparing the haystack's ends.
    AnchoredLiteral,
    /// `(?m)^...suffix`: scan for the suffix, search from the line start.
    MultilineReverseSuffix,
    /// End-anchored pattern: one reverse DFA scan from the end.
    ReverseAnchored,
    /// Leading `.*` with a common literal suffix.
    ReverseSuffix,
    /// Leading `.*` with a small set of distinct literal suffixes.
    ReverseSuffixSet,
    /// Leading `.*` with an inner literal.
    ReverseInner,
    /// Every match starts with an ASCII digit: scan digits, verify anchored.
    DigitPrefilter,
    /// A complete small literal alternation: the packed literal searcher is
    /// the whole engine.
    Teddy,
    /// A complete large literal alternation: an Aho-Corasick automaton is
    /// the whole engine.
    AhoCorasick,
    /// `^(lit|lit|...)` with distinct first bytes: first-byte table dispatch.
    BranchDispatch,
    /// Consecutive `[class]+` runs scanned over byte bitmaps.
    CompositeSearcher,
    /// A single `[class]+` scanned over a byte bitmap.
    CharClassSearcher,
    /// A small NFA with captures: bounded backtracker first.
    BoundedBacktracker,
    /// Not a dispatch strategy: the one-pass DFA used on the capture path.
    OnePass,
    /// Lazy DFA with NFA fallback; picked for big NFAs or strong prefixes.
    Dfa,
    /// Lazy DFA with NFA fallback for medium patterns.
    Both,
    /// PikeVM (and backtracker when it fits).
    Nfa,
}

impl StrategyKind {
    /// A human-readable explanation of why this strategy gets picked. For
    /// diagnostics only.
    pub fn reason(&self) -> &'static str {
        use self::StrategyKind::*;
        match *self {
            AnchoredLiteral => {
                "pattern is anchored at both ends with literal edges, so a \
                 match is decided by comparing the ends of the haystack"
            }
            MultilineReverseSuffix => {
                "every match starts at a (?m)^ line boundary and ends with a \
                 known literal, so candidate lines are found by suffix scan"
            }
            ReverseAnchored => {
                "pattern is anchored at the end only, so a single reverse \
                 DFA scan from the end replaces repeated forward attempts"
            }
            ReverseSuffix => {
                "matches end with a common literal suffix, so a substring \
                 scan bounds where the engines need to look"
            }
            ReverseSuffixSet => {
                "matches end with one of a few distinct literal suffixes, \
                 found with a packed multi-literal scan"
            }
            ReverseInner => {
                "no usable prefix or suffix literal, but an inner literal \
                 bounds candidate positions"
            }
            DigitPrefilter => {
                "every match starts with an ASCII digit and no prefix \
                 literal exists, so a digit scan feeds anchored verification"
            }
            Teddy => {
                "pattern is a complete alternation of a few literals, so the \
                 packed literal searcher is the entire engine"
            }
            AhoCorasick => {
                "pattern is a complete alternation of many literals, so an \
                 Aho-Corasick automaton is the entire engine"
            }
            BranchDispatch => {
                "pattern is an anchored literal alternation with distinct \
                 first bytes, dispatched through a 256-entry table"
            }
            CompositeSearcher => {
                "pattern is a concatenation of disjoint character-class \
                 repetitions, scanned run by run"
            }
            CharClassSearcher => {
                "pattern is a single character-class repetition without \
                 captures, scanned over a byte bitmap"
            }
            BoundedBacktracker => {
                "NFA is small and captures are needed, so the bounded \
                 backtracker is tried first when the haystack fits its budget"
            }
            OnePass => {
                "anchored NFA has at most one viable transition per state \
                 and byte, so captures resolve in one pass"
            }
            Dfa => {
                "NFA is large or has a strong prefix literal, favoring the \
                 lazy DFA with NFA fallback"
            }
            Both => {
                "medium NFA without special structure: lazy DFA first, \
                 PikeVM on cache pressure"
            }
            Nfa => {
                "small NFA without literals (or DFAs disabled): PikeVM, \
                 with the backtracker when the haystack fits"
            }
        }
    }

    /// The strategy to fall back to when this one cannot be built.
    pub(crate) fn demote(self) -> StrategyKind {
        use self::StrategyKind::*;
        match self {
            AnchoredLiteral => Dfa,
            MultilineReverseSuffix => Dfa,
            ReverseAnchored => Dfa,
            ReverseSuffix => Dfa,
            ReverseSuffixSet => Both,
            ReverseInner => Dfa,
            DigitPrefilter => Both,
            Teddy => Nfa,
            AhoCorasick => Nfa,
            BranchDispatch => BoundedBacktracker,
            CompositeSearcher => BoundedBacktracker,
            CharClassSearcher => BoundedBacktracker,
            BoundedBacktracker => Nfa,
            OnePass => Nfa,
            Dfa => Both,
            Both => Nfa,
            Nfa => Nfa,
        }
    }

    /// Whether the strategy cannot function without the lazy DFA pair.
    pub(crate) fn requires_dfa(self) -> bool {
        use self::StrategyKind::*;
        matches!(self, ReverseAnchored | Dfa | Both)
    }

    /// Whether the strategy runs faster with the lazy DFA pair available,
    /// without depending on it.
    pub(crate) fn wants_dfa(self) -> bool {
        use self::StrategyKind::*;
        matches!(
            self,
            MultilineReverseSuffix
                | ReverseSuffix
                | ReverseSuffixSet
                | ReverseInner
                | DigitPrefilter
        )
    }
}

/// The strategy together with whatever engines only it uses. Shared engines
/// (PikeVM, backtracker, one-pass, lazy DFA) live on the engine itself.
#[derive(Debug)]
pub(crate) enum Strategy {
    AnchoredLiteral(AnchoredLiteral),
    MultilineSuffix(CandidateScan),
    ReverseAnchored,
    ReverseSuffix(CandidateScan),
    ReverseSuffixSet(CandidateScan),
    ReverseInner(CandidateScan),
    DigitPrefilter,
    Teddy(Prefilter),
    AhoCorasick(Prefilter),
    BranchDispatch(BranchTable),
    Composite(ClassSeq),
    CharClass(ClassRun),
    Backtrack,
    Dfa,
    Both,
    Nfa,
}

impl Strategy {
    pub(crate) fn kind(&self) -> StrategyKind {
        match *self {
            Strategy::AnchoredLiteral(_) => StrategyKind::AnchoredLiteral,
            Strategy::MultilineSuffix(_) => {
                StrategyKind::MultilineReverseSuffix
            }
            Strategy::ReverseAnchored => StrategyKind::ReverseAnchored,
            Strategy::ReverseSuffix(_) => StrategyKind::ReverseSuffix,
            Strategy::ReverseSuffixSet(_) => StrategyKind::ReverseSuffixSet,
            Strategy::ReverseInner(_) => StrategyKind::ReverseInner,
            Strategy::DigitPrefilter => StrategyKind::DigitPrefilter,
            Strategy::Teddy(_) => StrategyKind::Teddy,
            Strategy::AhoCorasick(_) => StrategyKind::AhoCorasick,
            Strategy::BranchDispatch(_) => StrategyKind::BranchDispatch,
            Strategy::Composite(_) => StrategyKind::CompositeSearcher,
            Strategy::CharClass(_) => StrategyKind::CharClassSearcher,
            Strategy::Backtrack => StrategyKind::BoundedBacktracker,
            Strategy::Dfa => StrategyKind::Dfa,
            Strategy::Both => StrategyKind::Both,
            Strategy::Nfa => StrategyKind::Nfa,
        }
    }
}

/// Everything the selection rules look at.
#[derive(Debug)]
pub(crate) struct SelInput<'a> {
    pub(crate) config: &'a Config,
    pub(crate) shape: &'a Shape,
    pub(crate) lits: &'a Literals,
    pub(crate) state_count: usize,
    pub(crate) explicit_captures: usize,
    pub(crate) has_any_look: bool,
    pub(crate) always_anchored: bool,
}

/// One selection rule: a predicate over the compile-time facts.
pub(crate) struct SelectorRule {
    pub(crate) kind: StrategyKind,
    pub(crate) applies: fn(&SelInput<'_>) -> bool,
}

/// The cascade, highest priority first.
pub(crate) const RULES: &[SelectorRule] = &[
    SelectorRule {
        kind: StrategyKind::AnchoredLiteral,
        applies: rule_anchored_literal,
    },
    SelectorRule {
        kind: StrategyKind::MultilineReverseSuffix,
        applies: rule_multiline_suffix,
    },
    SelectorRule {
        kind: StrategyKind::ReverseAnchored,
        applies: rule_reverse_anchored,
    },
    SelectorRule {
        kind: StrategyKind::ReverseSuffix,
        applies: rule_reverse_suffix,
    },
    SelectorRule {
        kind: StrategyKind::ReverseSuffixSet,
        applies: rule_reverse_suffix_set,
    },
    SelectorRule {
        kind: StrategyKind::ReverseInner,
        applies: rule_reverse_inner,
    },
    SelectorRule {
        kind: StrategyKind::DigitPrefilter,
        applies: rule_digit_prefilter,
    },
    SelectorRule { kind: StrategyKind::Teddy, applies: rule_teddy },
    SelectorRule {
        kind: StrategyKind::AhoCorasick,
        applies: rule_aho_corasick,
    },
    SelectorRule {
        kind: StrategyKind::BranchDispatch,
        applies: rule_branch_dispatch,
    },
    SelectorRule {
        kind: StrategyKind::CompositeSearcher,
        applies: rule_composite,
    },
    SelectorRule {
        kind: StrategyKind::CharClassSearcher,
        applies: rule_char_class,
    },
    SelectorRule {
        kind: StrategyKind::BoundedBacktracker,
        applies: rule_backtrack,
    },
];

/// NFA sizes at which the core tiers switch over. These are tuning knobs,
/// not semantics.
const SMALL_NFA_STATES: usize = 20;
const LARGE_NFA_STATES: usize = 500;
const BACKTRACK_NFA_STATES: usize = 40;

fn rule_anchored_literal(inp: &SelInput<'_>) -> bool {
    inp.shape.anchored_ends.is_some()
}

fn rule_multiline_suffix(inp: &SelInput<'_>) -> bool {
    inp.shape.line_start
        && inp.shape.line_suffix_ok
        && !inp.always_anchored
        && inp.config.get_prefilter()
        && inp.lits.lcs().len() >= inp.config.get_min_literal_len()
}

fn rule_reverse_anchored(inp: &SelInput<'_>) -> bool {
    inp.shape.end_anchored
        && !inp.shape.start_anchored
        && !inp.shape.has_word_boundary
        && inp.config.get_dfa()
}

fn rule_reverse_suffix(inp: &SelInput<'_>) -> bool {
    let ds = match inp.shape.dot_star {
        Some(ref ds) => ds,
        None => return false,
    };
    (ds.dotall || ds.one_line_body)
        && inp.config.get_prefilter()
        && inp.lits.lcs().len() >= inp.config.get_min_literal_len()
}

fn rule_reverse_suffix_set(inp: &SelInput<'_>) -> bool {
    let ds = match inp.shape.dot_star {
        Some(ref ds) => ds,
        None => return false,
    };
    if !(ds.dotall || ds.one_line_body) || !inp.config.get_prefilter() {
        return false;
    }
    match inp.lits.suffix_literals() {
        None => false,
        Some(lits) => {
            lits.len() >= 2
                && lits.len() <= inp.config.get_teddy_max_literals()
                && lits.iter().all(|l| l.len() >= 2)
        }
    }
}

fn rule_reverse_inner(inp: &SelInput<'_>) -> bool {
    if inp.shape.dot_star.is_none() || !inp.config.get_prefilter() {
        return false;
    }
    match inp.shape.inner_literals {
        None => false,
        Some(ref lits) => {
            lits.len() <= inp.config.get_teddy_max_literals()
                && lits
                    .iter()
                    .all(|l| l.len() >= inp.config.get_min_literal_len())
        }
    }
}

fn rule_digit_prefilter(inp: &SelInput<'_>) -> bool {
    inp.shape.digit_lead
        && inp.config.get_prefilter()
        && !inp.lits.good_prefixes(
            inp.config.get_min_literal_len(),
            inp.config.get_max_literals(),
        )
}

fn complete_literals(inp: &SelInput<'_>) -> bool {
    inp.lits.prefixes_exact()
        && inp.explicit_captures == 0
        && !inp.has_any_look
        && !inp.always_anchored
        && !inp.config.get_longest()
}

fn rule_teddy(inp: &SelInput<'_>) -> bool {
    if !complete_literals(inp) {
        return false;
    }
    match inp.lits.prefix_literals() {
        None => false,
        Some(lits) => {
            lits.len() >= inp.config.get_teddy_min_literals()
                && lits.len() <= inp.config.get_teddy_max_literals()
                && inp.lits.min_prefix_len()
                    >= inp.config.get_min_literal_len()
        }
    }
}

fn rule_aho_corasick(inp: &SelInput<'_>) -> bool {
    if !complete_literals(inp) {
        return false;
    }
    match inp.lits.prefix_literals() {
        None => false,
        Some(lits) => {
            lits.len() > inp.config.get_teddy_max_literals()
                && inp.lits.min_prefix_len() >= 2
        }
    }
}

fn rule_branch_dispatch(inp: &SelInput<'_>) -> bool {
    inp.shape.branches.is_some()
}

fn rule_composite(inp: &SelInput<'_>) -> bool {
    inp.explicit_captures == 0
        && !inp.has_any_look
        && inp.shape.classes.as_ref().map_or(false, |c| c.len() >= 2)
}

fn rule_char_class(inp: &SelInput<'_>) -> bool {
    inp.explicit_captures == 0
        && !inp.has_any_look
        && inp.shape.classes.as_ref().map_or(false, |c| c.len() == 1)
}

fn rule_backtrack(inp: &SelInput<'_>) -> bool {
    inp.config.get_backtrack()
        && inp.explicit_captures > 0
        && inp.state_count <= BACKTRACK_NFA_STATES
}

/// Picks the core tier for patterns no specialized rule claimed.
fn core_tier(inp: &SelInput<'_>) -> StrategyKind {
    if !inp.config.get_dfa() {
        return StrategyKind::Nfa;
    }
    let strong_prefix = inp.lits.good_prefixes(
        inp.config.get_min_literal_len(),
        inp.config.get_max_literals(),
    );
    if strong_prefix || inp.state_count > LARGE_NFA_STATES {
        StrategyKind::Dfa
    } else if inp.state_count < SMALL_NFA_STATES {
        StrategyKind::Nfa
    } else {
        StrategyKind::Both
    }
}

/// Runs the cascade.
pub(crate) fn select(inp: &SelInput<'_>) -> StrategyKind {
    for rule in RULES {
        if (rule.applies)(inp) {
            debug!("strategy selected: {:?}", rule.kind);
            return rule.kind;
        }
    }
    let kind = core_tier(inp);
    debug!("no specialized rule applied, core tier: {:?}", kind);
    kind
}

/// Builds the payload for a selected strategy. `Err` means "demote and try
/// again"; the core tiers and `DigitPrefilter` cannot fail here.
pub(crate) fn build(
    kind: StrategyKind,
    config: &Config,
    shape: &mut Shape,
    lits: &Literals,
) -> Result<Strategy, ()> {
    let teddy_max = config.get_teddy_max_literals();
    let bound = |shape: &Shape| match shape.dot_star {
        Some(ref ds) if ds.dotall => StartBound::SearchStart,
        _ => StartBound::LineStart,
    };
    match kind {
        StrategyKind::AnchoredLiteral => {
            let ends = shape.anchored_ends.take().ok_or(())?;
            Ok(Strategy::AnchoredLiteral(AnchoredLiteral::new(ends)))
        }
        StrategyKind::MultilineReverseSuffix => {
            let lcs = lits.lcs().to_vec();
            let pre =
                Prefilter::new(&[lcs], false, teddy_max).ok_or(())?;
            Ok(Strategy::MultilineSuffix(CandidateScan::new(
                pre,
                StartBound::LineStart,
            )))
        }
        StrategyKind::ReverseAnchored => Ok(Strategy::ReverseAnchored),
        StrategyKind::ReverseSuffix => {
            let lcs = lits.lcs().to_vec();
            let pre =
                Prefilter::new(&[lcs], false, teddy_max).ok_or(())?;
            Ok(Strategy::ReverseSuffix(CandidateScan::new(
                pre,
                bound(shape),
            )))
        }
        StrategyKind::ReverseSuffixSet => {
            let suffixes = lits.suffix_literals().ok_or(())?;
            let pre =
                Prefilter::new(&suffixes, false, teddy_max).ok_or(())?;
            Ok(Strategy::ReverseSuffixSet(CandidateScan::new(
                pre,
                bound(shape),
            )))
        }
        StrategyKind::ReverseInner => {
            let inner = shape.inner_literals.take().ok_or(())?;
            let pre =
                Prefilter::new(&inner, false, teddy_max).ok_or(())?;
            Ok(Strategy::ReverseInner(CandidateScan::new(
                pre,
                bound(shape),
            )))
        }
        StrategyKind::DigitPrefilter => Ok(Strategy::DigitPrefilter),
        StrategyKind::Teddy => {
            let prefixes = lits.prefix_literals().ok_or(())?;
            let pre =
                Prefilter::new(&prefixes, true, teddy_max).ok_or(())?;
            Ok(Strategy::Teddy(pre))
        }
        StrategyKind::AhoCorasick => {
            let prefixes = lits.prefix_literals().ok_or(())?;
            let pre =
                Prefilter::new(&prefixes, true, teddy_max).ok_or(())?;
            Ok(Strategy::AhoCorasick(pre))
        }
        StrategyKind::BranchDispatch => {
            let branches = shape.branches.take().ok_or(())?;
            let table = BranchTable::new(branches).ok_or(())?;
            Ok(Strategy::BranchDispatch(table))
        }
        StrategyKind::CompositeSearcher => {
            let sets = shape.classes.take().ok_or(())?;
            Ok(Strategy::Composite(ClassSeq::new(sets)))
        }
        StrategyKind::CharClassSearcher => {
            let mut sets = shape.classes.take().ok_or(())?;
            let set = sets.pop().ok_or(())?;
            Ok(Strategy::CharClass(ClassRun::new(set)))
        }
        StrategyKind::BoundedBacktracker => Ok(Strategy::Backtrack),
        // Not selectable as a dispatch strategy.
        StrategyKind::OnePass => Err(()),
        StrategyKind::Dfa => Ok(Strategy::Dfa),
        StrategyKind::Both => Ok(Strategy::Both),
        StrategyKind::Nfa => Ok(Strategy::Nfa),
    }
}
