use regex_syntax::hir::{
    literal::{ExtractKind, Extractor, Seq},
    Hir,
};

/// The prefix and suffix literal sequences extracted from a pattern, in
/// preference order.
///
/// These drive both prefilter construction and several selection rules. An
/// infinite sequence means extraction gave up (e.g. a leading `.*`); such a
/// sequence yields no literals and no common prefix/suffix.
#[derive(Debug)]
pub(crate) struct Literals {
    prefixes: Seq,
    suffixes: Seq,
}

impl Literals {
    pub(crate) fn extract(hir: &Hir) -> Literals {
        let mut prefixes = Extractor::new().extract(hir);
        prefixes.optimize_for_prefix_by_preference();
        let mut suffixes =
            Extractor::new().kind(ExtractKind::Suffix).extract(hir);
        suffixes.optimize_for_suffix_by_preference();
        trace!(
            "extracted prefixes {:?} and suffixes {:?}",
            prefixes,
            suffixes
        );
        Literals { prefixes, suffixes }
    }

    /// The prefix literals as owned byte strings, when the set is finite and
    /// contains no empty literal.
    pub(crate) fn prefix_literals(&self) -> Option<Vec<Vec<u8>>> {
        seq_literals(&self.prefixes)
    }

    /// Like `prefix_literals`, but for suffixes.
    pub(crate) fn suffix_literals(&self) -> Option<Vec<Vec<u8>>> {
        seq_literals(&self.suffixes)
    }

    /// True when every prefix literal is exact, i.e. the literal set *is*
    /// the language of the pattern and a literal match is a full match.
    pub(crate) fn prefixes_exact(&self) -> bool {
        self.prefixes.is_exact()
    }

    /// The longest common prefix of all prefix literals (empty when there
    /// are none or the set is infinite).
    pub(crate) fn lcp(&self) -> &[u8] {
        self.prefixes.longest_common_prefix().unwrap_or(b"")
    }

    /// The longest common suffix of all suffix literals.
    pub(crate) fn lcs(&self) -> &[u8] {
        self.suffixes.longest_common_suffix().unwrap_or(b"")
    }

    /// The length of the shortest prefix literal, or 0 when there are none.
    pub(crate) fn min_prefix_len(&self) -> usize {
        self.prefixes.min_literal_len().unwrap_or(0)
    }

    /// True when the prefix literal set is worth using to narrow candidate
    /// positions: finite, not too large and with literals long enough that
    /// hits are selective.
    pub(crate) fn good_prefixes(&self, min_len: usize, max: usize) -> bool {
        match self.prefix_literals() {
            None => false,
            Some(lits) => {
                lits.len() <= max
                    && (self.prefixes_exact()
                        || lits.iter().all(|l| l.len() >= min_len))
            }
        }
    }
}

fn seq_literals(seq: &Seq) -> Option<Vec<Vec<u8>>> {
    let lits = seq.literals()?;
    if lits.is_empty() || lits.iter().any(|l| l.is_empty()) {
        return None;
    }
    Some(lits.iter().map(|l| l.as_bytes().to_vec()).collect())
}
