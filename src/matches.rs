use std::sync::Arc;

/// A single match of a pattern in a haystack.
///
/// A match borrows the haystack it was found in, so the matched bytes can be
/// retrieved without copying. The positions reported are byte offsets, with
/// `start <= end` and `end <= haystack.len()`.
#[derive(Clone, Copy, Eq, PartialEq)]
pub struct Match<'h> {
    haystack: &'h [u8],
    start: usize,
    end: usize,
}

impl<'h> Match<'h> {
    pub(crate) fn new(haystack: &'h [u8], start: usize, end: usize) -> Match<'h> {
        debug_assert!(start <= end);
        debug_assert!(end <= haystack.len());
        Match { haystack, start, end }
    }

    /// The byte offset at which this match begins.
    #[inline]
    pub fn start(&self) -> usize {
        self.start
    }

    /// The byte offset immediately after the last byte of this match.
    #[inline]
    pub fn end(&self) -> usize {
        self.end
    }

    /// The match offsets as a half-open range.
    #[inline]
    pub fn range(&self) -> core::ops::Range<usize> {
        self.start..self.end
    }

    /// The length of this match, in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns true when this match is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The matched bytes.
    #[inline]
    pub fn as_bytes(&self) -> &'h [u8] {
        &self.haystack[self.start..self.end]
    }
}

impl<'h> core::fmt::Debug for Match<'h> {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.debug_struct("Match")
            .field("start", &self.start)
            .field("end", &self.end)
            .finish()
    }
}

/// The spans of every capture group for a single match.
///
/// Group `0` is the implicit group corresponding to the overall match and is
/// always present. An explicit group that did not participate in the match
/// reports `None`, which is distinct from a group that matched the empty
/// string at some position.
#[derive(Clone)]
pub struct Captures<'h> {
    haystack: &'h [u8],
    groups: Vec<Option<(usize, usize)>>,
    names: Arc<Vec<Option<String>>>,
}

impl<'h> Captures<'h> {
    pub(crate) fn new(
        haystack: &'h [u8],
        groups: Vec<Option<(usize, usize)>>,
        names: Arc<Vec<Option<String>>>,
    ) -> Captures<'h> {
        debug_assert_eq!(groups.len(), names.len());
        debug_assert!(groups[0].is_some());
        Captures { haystack, groups, names }
    }

    /// The number of groups, including the implicit group `0`.
    #[inline]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Returns true only when there are no groups. This never happens for a
    /// value produced by a search.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// The span of the group at the given index, or `None` when the group
    /// did not participate in the match or the index is out of bounds.
    #[inline]
    pub fn get(&self, index: usize) -> Option<(usize, usize)> {
        self.groups.get(index).copied().flatten()
    }

    /// The bytes matched by the group at the given index.
    #[inline]
    pub fn group(&self, index: usize) -> Option<&'h [u8]> {
        self.get(index).map(|(s, e)| &self.haystack[s..e])
    }

    /// The span of the group with the given name.
    #[inline]
    pub fn get_by_name(&self, name: &str) -> Option<(usize, usize)> {
        let index = self
            .names
            .iter()
            .position(|n| n.as_deref() == Some(name))?;
        self.get(index)
    }

    /// The name of the group at the given index, when it has one.
    #[inline]
    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index)?.as_deref()
    }

    /// The overall match, as a [`Match`].
    #[inline]
    pub fn entire(&self) -> Match<'h> {
        // Group 0 is always present for a reported match.
        let (s, e) = self.groups[0].unwrap_or((0, 0));
        Match::new(self.haystack, s, e)
    }
}

impl<'h> core::fmt::Debug for Captures<'h> {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.debug_struct("Captures").field("groups", &self.groups).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_access() {
        let names =
            Arc::new(vec![None, Some("user".to_string()), None]);
        let caps = Captures::new(
            b"u@e",
            vec![Some((0, 3)), Some((0, 1)), None],
            names,
        );
        assert_eq!(3, caps.len());
        assert_eq!(Some(&b"u"[..]), caps.group(1));
        assert_eq!(None, caps.group(2));
        assert_eq!(Some((0, 1)), caps.get_by_name("user"));
        assert_eq!((0, 3), (caps.entire().start(), caps.entire().end()));
    }
}
