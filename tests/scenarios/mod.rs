/*!
End-to-end scenarios pinning down which strategy each pattern shape compiles
to and what the searches report.
*/

use regex_meta::StrategyKind;

use crate::{engine, find_all, oracle_find, oracle_find_all};

#[test]
fn plain_literal_uses_core_with_complete_prefilter() {
    let re = engine("hello");
    let h = b"say hello world";
    assert_eq!(StrategyKind::Dfa, re.strategy());
    assert_eq!(Some((4, 9)), re.find_indices(h));
    // The hit came straight from the literal searcher.
    assert_eq!(1, re.stats().prefilter_hits);
    assert_eq!(0, re.stats().dfa_searches);
    assert_eq!(1, re.count(h, None));
}

#[test]
fn dot_star_suffix() {
    let re = engine(r".*\.txt");
    let h = b"a/b/readme.txt";
    assert_eq!(StrategyKind::ReverseSuffix, re.strategy());
    assert_eq!(Some((0, 14)), re.find_indices(h));
    assert_eq!(1, re.count(h, None));
    assert_eq!(None, re.find_indices(b"a/b/readme.md"));
}

#[test]
fn dot_star_suffix_set() {
    let re = engine(r".*\.(txt|log|md)");
    let h = b"one.log two.md";
    assert_eq!(StrategyKind::ReverseSuffixSet, re.strategy());
    assert_eq!(oracle_find(r".*\.(txt|log|md)", h), re.find_indices(h));
    assert_eq!(oracle_find_all(r".*\.(txt|log|md)", h).len(), re.count(h, None));
    assert_eq!(1, re.count(h, None));
}

#[test]
fn inner_literal() {
    let re = engine(r".*keyword.*");
    let h = b"a keyword b";
    assert_eq!(StrategyKind::ReverseInner, re.strategy());
    assert_eq!(Some((0, 11)), re.find_indices(h));
    assert_eq!(1, re.count(h, None));
    assert_eq!(None, re.find_indices(b"a keywor b"));
}

#[test]
fn small_literal_alternation_is_teddy() {
    let re = engine("foo|bar|baz");
    let h = b"xxfoo yy bar zz baz";
    assert_eq!(StrategyKind::Teddy, re.strategy());
    assert_eq!(Some((2, 5)), re.find_indices(h));
    assert_eq!(3, re.count(h, None));
    assert_eq!(vec![(2, 5), (9, 12), (16, 19)], find_all(&re, h));
}

#[test]
fn large_literal_alternation_is_aho_corasick() {
    let lits: Vec<String> =
        (0..24).map(|i| format!("pattern{:02}x", i)).collect();
    let pattern = lits.join("|");
    let re = engine(&pattern);
    assert_eq!(StrategyKind::AhoCorasick, re.strategy());
    let h = b"zz pattern13x yy";
    assert_eq!(Some((3, 13)), re.find_indices(h));
    assert!(re.stats().aho_corasick_searches > 0);
}

#[test]
fn digit_lead_pattern() {
    let re = engine(r"\d+\.\d+\.\d+");
    let h = b"x 1.2.3 y 4.5.6";
    assert_eq!(StrategyKind::DigitPrefilter, re.strategy());
    assert_eq!(Some((2, 7)), re.find_indices(h));
    assert_eq!(2, re.count(h, None));
    assert_eq!(vec![(2, 7), (10, 15)], find_all(&re, h));
}

#[test]
fn email_like_captures() {
    let re = engine(r"(\w+)@(\w+)\.(\w+)");
    let h = b"u@e.com";
    let caps = re.find_submatch(h).unwrap();
    assert_eq!((0, 7), (caps.entire().start(), caps.entire().end()));
    assert_eq!(Some((0, 1)), caps.get(1));
    assert_eq!(Some((2, 3)), caps.get(2));
    assert_eq!(Some((4, 7)), caps.get(3));
    assert_eq!(1, re.count(h, None));
    // Capture resolution went through the one-pass DFA.
    assert!(re.stats().one_pass_searches > 0);
}

#[test]
fn multiline_line_start_suffix() {
    let re = engine(r"(?m)^/.*\.php");
    let h = b"/a.php\n/b.php\nx/c.php";
    assert_eq!(StrategyKind::MultilineReverseSuffix, re.strategy());
    assert_eq!(Some((0, 6)), re.find_indices(h));
    assert_eq!(2, re.count(h, None));
    assert_eq!(vec![(0, 6), (7, 13)], find_all(&re, h));
}

#[test]
fn anchored_branch_dispatch() {
    let re = engine("^(foo|bar|baz|qux)");
    let h = b"quxxx";
    assert_eq!(StrategyKind::BranchDispatch, re.strategy());
    assert_eq!(Some((0, 3)), re.find_indices(h));
    assert_eq!(1, re.count(h, None));
    assert_eq!(None, re.find_indices_at(h, 1));
    let caps = re.find_submatch(h).unwrap();
    assert_eq!(Some((0, 3)), caps.get(1));
}

#[test]
fn composite_class_runs() {
    let re = engine("[a-zA-Z]+[0-9]+");
    let h = b"---abc123---def456---";
    assert_eq!(StrategyKind::CompositeSearcher, re.strategy());
    assert_eq!(Some((3, 9)), re.find_indices(h));
    assert_eq!(2, re.count(h, None));
    assert_eq!(vec![(3, 9), (12, 18)], find_all(&re, h));
}

#[test]
fn single_class_run() {
    let re = engine("[a-z]+");
    let h = b"ab 12 cd ef";
    assert_eq!(StrategyKind::CharClassSearcher, re.strategy());
    assert_eq!(Some((0, 2)), re.find_indices(h));
    assert_eq!(3, re.count(h, None));
    assert_eq!(vec![(0, 2), (6, 8), (9, 11)], find_all(&re, h));
}

#[test]
fn end_anchored_uses_reverse_scan() {
    let re = engine(r"[a-z]+!$");
    assert_eq!(StrategyKind::ReverseAnchored, re.strategy());
    let h = b"well hello there!";
    assert_eq!(Some((11, 17)), re.find_indices(h));
    assert_eq!(None, re.find_indices(b"hello! there"));
    assert!(re.stats().dfa_searches > 0);
}

#[test]
fn both_ends_anchored_literal() {
    let re = engine(r"^(?s)GET .*HTTP/1\.1$");
    assert_eq!(StrategyKind::AnchoredLiteral, re.strategy());
    let h = b"GET /index.html HTTP/1.1";
    assert_eq!(Some((0, 24)), re.find_indices(h));
    assert!(re.is_match(h));
    assert_eq!(None, re.find_indices(b"POST /index.html HTTP/1.1"));
    assert_eq!(None, re.find_indices_at(h, 3));
    assert_eq!(1, re.count(h, None));
}

#[test]
fn backtracker_for_small_capturing_patterns() {
    let re = engine(r"([a-p])x([0-9])");
    assert_eq!(StrategyKind::BoundedBacktracker, re.strategy());
    let h = b"zz cx7 yy";
    assert_eq!(Some((3, 6)), re.find_indices(h));
    let caps = re.find_submatch(h).unwrap();
    assert_eq!(Some((3, 4)), caps.get(1));
    assert_eq!(Some((5, 6)), caps.get(2));
}
