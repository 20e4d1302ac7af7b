/*!
Generic helpers shared by the strategy and dispatch layers.
*/

pub(crate) mod byteset;
pub(crate) mod iter;
pub(crate) mod pool;

/// Returns the position of the first byte of the line containing `at`, i.e.
/// one past the last `\n` strictly before `at` (or `0`).
#[inline]
pub(crate) fn line_start(haystack: &[u8], at: usize) -> usize {
    memchr::memrchr(b'\n', &haystack[..at]).map_or(0, |i| i + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_bounds() {
        let h = b"ab\ncd\nef";
        assert_eq!(0, line_start(h, 0));
        assert_eq!(0, line_start(h, 2));
        assert_eq!(3, line_start(h, 3));
        assert_eq!(3, line_start(h, 5));
        assert_eq!(6, line_start(h, 7));
    }
}
