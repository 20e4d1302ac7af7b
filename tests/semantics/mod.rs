/*!
Semantic equivalence with the reference engine, across configurations,
strategies and adversarial inputs.
*/

use regex_meta::{Config, StrategyKind};

use crate::{engine, engine_with, find_all, oracle_find_all};

/// Patterns spanning every strategy family, run against every input below
/// under every interesting configuration.
const PATTERNS: &[&str] = &[
    r"hello",
    r"foo|bar|baz",
    r"[a-z]+",
    r"[a-zA-Z]+[0-9]+",
    r"\d+\.\d+",
    r".*\.txt",
    r".*\.(txt|log|md)",
    r".*keyword.*",
    r"(?m)^/.*\.php",
    r"^(foo|bar|baz|qux)",
    r"(\w+)@(\w+)",
    r"[a-z]+!$",
    r"^(?s)GET .*1$",
    r"a*",
    r"x?y",
    r"(foo)?bar",
    r"\bword\b",
    r"(?i)hello",
    r".{2,4}end",
];

const HAYSTACKS: &[&[u8]] = &[
    b"",
    b"a",
    b"\n",
    b"say hello world",
    b"xxfoo yy bar zz baz",
    b"ab 12 cd",
    b"---abc123---def456---",
    b"x 1.2.3 y 4.5.6",
    b"a/b/readme.txt",
    b"one.log two.md",
    b"a keyword b",
    b"/a.php\n/b.php\nx/c.php",
    b"quxxx",
    b"u@e.com",
    b"well hello there!",
    b"GET /index.html 1",
    b"aab b",
    b"yyy xy",
    b"barbar foobar",
    b"word words sword word",
    b"the end of the end",
    b"\xFFa.txt\nb.txt",
    b"0.txt0.txt0.txt",
    b"keyword\nkeyword",
    b"1.2.3.4.5.6.7.8",
];

fn configs() -> Vec<Config> {
    let mut out = vec![];
    for dfa in [true, false] {
        for prefilter in [true, false] {
            for backtrack in [true, false] {
                out.push(
                    Config::new()
                        .dfa(dfa)
                        .prefilter(prefilter)
                        .backtrack(backtrack),
                );
            }
        }
    }
    out
}

#[test]
fn all_strategies_agree_with_reference() {
    for pattern in PATTERNS {
        let expected: Vec<Vec<(usize, usize)>> = HAYSTACKS
            .iter()
            .map(|h| oracle_find_all(pattern, h))
            .collect();
        for config in configs() {
            let re = engine_with(pattern, config);
            for (h, want) in HAYSTACKS.iter().zip(expected.iter()) {
                assert_eq!(
                    *want,
                    find_all(&re, h),
                    "pattern {:?} on {:?} with strategy {:?}",
                    pattern,
                    h,
                    re.strategy(),
                );
                assert_eq!(
                    want.first().copied(),
                    re.find_indices(h),
                    "pattern {:?} on {:?} (find)",
                    pattern,
                    h,
                );
                assert_eq!(
                    !want.is_empty(),
                    re.is_match(h),
                    "pattern {:?} on {:?} (is_match)",
                    pattern,
                    h,
                );
                assert_eq!(want.len(), re.count(h, None));
            }
        }
    }
}

#[test]
fn count_limits() {
    let re = engine("[a-z]+");
    let h = b"ab cd ef gh";
    assert_eq!(0, re.count(h, Some(0)));
    assert_eq!(1, re.count(h, Some(1)));
    assert_eq!(3, re.count(h, Some(3)));
    assert_eq!(4, re.count(h, Some(100)));
    assert_eq!(4, re.count(h, None));

    let mut out = vec![];
    re.find_all_indices(h, Some(2), &mut out);
    assert_eq!(vec![(0, 2), (3, 5)], out);
}

#[test]
fn empty_matches_follow_the_skip_rule() {
    let re = engine("a*");
    let h = b"aab b";
    // The empty match at the end of "aa" is suppressed; later empties are
    // reported.
    assert_eq!(vec![(0, 2), (3, 3), (4, 4), (5, 5)], find_all(&re, h));
    assert_eq!(oracle_find_all("a*", h), find_all(&re, h));
    assert_eq!(4, re.count(h, None));

    let re = engine("b|");
    let h = b"ab";
    assert_eq!(oracle_find_all("b|", h), find_all(&re, h));
}

#[test]
fn at_position_searches() {
    let re = engine("[a-z]+");
    let h = b"ab cd";
    assert_eq!(Some((1, 2)), re.find_indices_at(h, 1));
    assert_eq!(Some((3, 5)), re.find_indices_at(h, 2));
    assert_eq!(None, re.find_indices_at(h, 5));
    // Positions past the end never match; the end itself can host an empty
    // match.
    assert_eq!(None, re.find_indices_at(h, 6));
    assert_eq!(Some((5, 5)), engine("x*").find_indices_at(h, 5));
    assert_eq!(None, engine("x*").find_indices_at(h, 6));
}

#[test]
fn anchored_patterns_reject_positive_offsets() {
    for pattern in [r"^foo", r"^(foo|bar|baz|qux)", r"^(?s)a.*b$", r"\Afoo"] {
        let re = engine(pattern);
        assert_eq!(None, re.find_indices_at(b"foo bar baz", 1), "{}", pattern);
        assert!(re.find_submatch_at(b"foo bar baz", 1).is_none());
    }
}

#[test]
fn multiline_anchors_match_at_line_boundaries() {
    let re = engine(r"(?m)^x$");
    let h = b"a\nx\nb";
    assert_eq!(Some((2, 3)), re.find_indices(h));
    assert_eq!(oracle_find_all(r"(?m)^x$", h), find_all(&re, h));
}

#[test]
fn longest_mode_switches_to_leftmost_longest() {
    let re = engine("a|ab");
    assert_eq!(Some((0, 1)), re.find_indices(b"ab"));
    re.set_longest(true);
    assert_eq!(Some((0, 2)), re.find_indices(b"ab"));
    re.set_longest(false);
    assert_eq!(Some((0, 1)), re.find_indices(b"ab"));

    // Configured from the start, selection avoids literal bypasses.
    let re = engine_with("samwise|sam", Config::new().longest(true));
    assert_ne!(StrategyKind::Teddy, re.strategy());
    assert_eq!(Some((0, 7)), re.find_indices(b"samwise"));
    assert_eq!(Some((0, 7)), engine("samwise|sam").find_indices(b"samwise"));
    assert_eq!(Some((0, 3)), engine("sam|samwise").find_indices(b"samwise"));
    let re = engine_with("sam|samwise", Config::new().longest(true));
    assert_eq!(Some((0, 7)), re.find_indices(b"samwise"));
}

#[test]
fn longest_mode_capture_spans_cover_the_longest_match() {
    let re = engine_with(r"(a|ab)(c|bcd)", Config::new().longest(true));
    let caps = re.find_submatch(b"abcd").unwrap();
    assert_eq!((0, 4), (caps.entire().start(), caps.entire().end()));
}

#[test]
fn lazy_dfa_cache_pressure_falls_back_to_nfa() {
    let pattern = r"([a-z0-9+/=]{1,24})@([a-z0-9+/=]{1,24})\.(com|net|org|io|dev)";
    let re = engine_with(
        pattern,
        Config::new().dfa_cache_capacity(8 * 1024).dfa_clear_limit(1),
    );
    assert!(matches!(re.strategy(), StrategyKind::Dfa | StrategyKind::Both));

    // A pseudo-random haystack with enough byte diversity to keep minting
    // new lazy DFA states.
    let alphabet = b"abcdefghijklmnopqrstuvwxyz0123456789@.+/= ";
    let mut x = 0x2545F4914F6CDD1Du64;
    let mut h = Vec::with_capacity(1 << 16);
    for _ in 0..(1 << 16) {
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        h.push(alphabet[(x % alphabet.len() as u64) as usize]);
    }
    h.extend_from_slice(b" user01@example99.com ");

    assert_eq!(oracle_find_all(pattern, &h), find_all(&re, &h));
    let stats = re.stats();
    assert!(
        stats.dfa_cache_full > 0,
        "expected lazy DFA to give up at least once: {:?}",
        stats
    );
    assert!(stats.nfa_searches > 0);
}

#[test]
fn digit_prefilter_abandons_on_hostile_input() {
    let re = engine(r"\d+\.\d+\.\d+");
    assert_eq!(StrategyKind::DigitPrefilter, re.strategy());
    // A long run of digits with no dots produces one failed candidate per
    // digit until the scanner gives up and hands the search to the core
    // engines.
    let mut h = vec![b'7'; 4096];
    h.extend_from_slice(b" 1.2.3");
    assert_eq!(
        oracle_find_all(r"\d+\.\d+\.\d+", &h),
        find_all(&re, &h)
    );
    assert!(re.stats().prefilter_abandoned > 0);
}

#[cfg(not(miri))]
#[test]
fn suffix_heavy_inputs_stay_roughly_linear() {
    use std::time::Instant;

    // Every ".txt" is a candidate and none of them matches.
    let unit = b"0000.txt";
    let small: Vec<u8> = unit.iter().copied().cycle().take(1 << 18).collect();
    let large: Vec<u8> = unit.iter().copied().cycle().take(1 << 19).collect();
    let re = engine(r"[a-z]+\.txt");

    let t = Instant::now();
    assert_eq!(0, re.count(&small, None));
    let t_small = t.elapsed();
    let t = Instant::now();
    assert_eq!(0, re.count(&large, None));
    let t_large = t.elapsed();

    // Doubling the input must not blow up the search time. The bound is
    // deliberately loose to keep this stable on slow or noisy machines.
    if t_small.as_millis() >= 5 {
        assert!(
            t_large < t_small * 16,
            "doubling input went from {:?} to {:?}",
            t_small,
            t_large,
        );
    }
}

quickcheck::quickcheck! {
    fn prop_agrees_with_reference(bytes: Vec<u8>) -> bool {
        // Map random bytes onto a small alphabet so literal hits, digits,
        // newlines and invalid UTF-8 all actually occur.
        let alphabet = b"abtx.01/ph\n \xFF";
        let h: Vec<u8> = bytes
            .iter()
            .map(|&b| alphabet[usize::from(b) % alphabet.len()])
            .collect();
        for pattern in [
            r".*\.txt",
            r"(?m)^/.*\.ph",
            r".*abba.*",
            r"\d+\.\d+",
            r"aba|bab|tat",
            r"[ab]+[01]+",
            r"a*",
            r"ph$",
        ] {
            let re = engine(pattern);
            if find_all(&re, &h) != oracle_find_all(pattern, &h) {
                return false;
            }
        }
        true
    }
}
