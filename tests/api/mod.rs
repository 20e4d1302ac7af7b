/*!
Public surface behavior: captures, names, iterators, errors, statistics.
*/

use regex_meta::{Config, Engine};

use crate::{engine, engine_with, oracle_captures};

#[test]
fn capture_names_line_up_with_group_count() {
    for pattern in [
        r"abc",
        r"(\w+)@(\w+)\.(\w+)",
        r"(?P<user>\w+)@(?P<host>\w+)",
        r"(a)(b(c))?",
    ] {
        let re = engine(pattern);
        assert_eq!(re.num_captures(), re.capture_names().len(), "{}", pattern);
        assert!(re.capture_names()[0].is_none());
    }

    let re = engine(r"(?P<user>\w+)@(?P<host>\w+)");
    assert_eq!(
        &[None, Some("user".to_string()), Some("host".to_string())][..],
        re.capture_names(),
    );
    let caps = re.find_submatch(b"u@e").unwrap();
    assert_eq!(Some((0, 1)), caps.get_by_name("user"));
    assert_eq!(Some((2, 3)), caps.get_by_name("host"));
    assert_eq!(None, caps.get_by_name("nope"));
}

#[test]
fn submatch_spans_substring_back_to_capture_text() {
    let pattern = r"(\w+)@(\w+)\.(\w+)";
    let h = b"mail from u@e.com today";
    let re = engine(pattern);
    let caps = re.find_submatch(h).unwrap();
    assert_eq!(Some(&b"u"[..]), caps.group(1));
    assert_eq!(Some(&b"e"[..]), caps.group(2));
    assert_eq!(Some(&b"com"[..]), caps.group(3));
    // And the reference engine agrees on every span.
    let want = oracle_captures(pattern, h).unwrap();
    let got: Vec<Option<(usize, usize)>> =
        (0..caps.len()).map(|i| caps.get(i)).collect();
    assert_eq!(want, got);
}

#[test]
fn optional_groups_report_none_not_zero() {
    let re = engine(r"(foo)?bar");
    let caps = re.find_submatch(b"xxbar").unwrap();
    assert_eq!((2, 5), (caps.entire().start(), caps.entire().end()));
    assert_eq!(None, caps.get(1));
    assert_eq!(None, caps.group(1));

    let caps = re.find_submatch(b"foobar").unwrap();
    assert_eq!(Some((0, 3)), caps.get(1));
}

#[test]
fn submatch_agrees_with_reference_across_strategies() {
    let cases: &[(&str, &[u8])] = &[
        (r"(\d+)\.(\d+)", b"ver 12.34"),
        (r"^(foo|bar|baz|qux)", b"barracks"),
        (r"([a-p])x([0-9])", b"zz cx7"),
        (r"(a*)(b*)", b"aabb"),
        (r"(?m)^(/.*)\.php", b"/a.php\nx"),
    ];
    for &(pattern, h) in cases {
        let re = engine(pattern);
        let want = oracle_captures(pattern, h);
        let got = re.find_submatch(h).map(|caps| {
            (0..caps.len()).map(|i| caps.get(i)).collect::<Vec<_>>()
        });
        assert_eq!(want, got, "pattern {:?} on {:?}", pattern, h);
    }
}

#[test]
fn iterators_walk_all_matches() {
    let re = engine("[a-z]+[0-9]+");
    let h = b"--abc123--de45--";
    let got: Vec<(usize, usize)> =
        re.find_iter(h).map(|m| (m.start(), m.end())).collect();
    assert_eq!(vec![(2, 8), (10, 14)], got);
    assert_eq!(b"abc123", re.find_iter(h).next().unwrap().as_bytes());

    let re = engine(r"([a-z]+)([0-9]+)");
    let groups: Vec<_> =
        re.captures_iter(h).map(|c| (c.get(1), c.get(2))).collect();
    assert_eq!(
        vec![
            (Some((2, 5)), Some((5, 8))),
            (Some((10, 12)), Some((12, 14))),
        ],
        groups
    );
}

#[test]
fn find_all_submatch_respects_limits() {
    let re = engine(r"([a-z])([0-9])");
    let h = b"a1 b2 c3";
    assert_eq!(3, re.find_all_submatch(h, None).len());
    assert_eq!(2, re.find_all_submatch(h, Some(2)).len());
    assert!(re.find_all_submatch(h, Some(0)).is_empty());
    let all = re.find_all_submatch(h, None);
    assert_eq!(Some((3, 4)), all[1].get(1));
    assert_eq!(Some((4, 5)), all[1].get(2));
}

#[test]
fn syntax_errors_surface_the_parser_message() {
    let err = Engine::new("a(").unwrap_err();
    assert!(err.syntax_error().is_some());
    assert!(!err.to_string().is_empty());

    let err = Engine::new("a{4,2}").unwrap_err();
    assert!(err.syntax_error().is_some());
}

#[test]
fn nest_limit_is_enforced() {
    let pattern = format!("{}a{}", "(".repeat(60), ")".repeat(60));
    let err = Engine::builder()
        .configure(Config::new().nest_limit(10))
        .build(&pattern)
        .unwrap_err();
    assert!(err.syntax_error().is_some());
}

#[test]
fn invalid_configs_are_rejected() {
    let err = Engine::builder()
        .configure(Config::new().min_literal_len(0))
        .build("abc")
        .unwrap_err();
    assert!(err.is_config());
}

#[test]
fn nfa_size_limit_reports_complexity() {
    let err = Engine::builder()
        .configure(Config::new().nfa_size_limit(Some(64)))
        .build(r"\w{100}")
        .unwrap_err();
    assert!(err.is_complexity());
}

#[test]
fn syntax_flags_from_config() {
    let re = engine_with("hello", Config::new().case_insensitive(true));
    assert!(re.is_match(b"say HeLLo"));

    let re = engine_with("^x$", Config::new().multi_line(true));
    assert_eq!(Some((2, 3)), re.find_indices(b"a\nx\nb"));

    let re = engine_with("a.b", Config::new().dot_matches_new_line(true));
    assert!(re.is_match(b"a\nb"));
}

#[test]
fn stats_reset() {
    let re = engine("[a-z]+[0-9]+");
    re.count(b"ab12 cd34", None);
    re.reset_stats();
    assert_eq!(regex_meta::StatsSnapshot::default(), re.stats());
}

#[test]
fn strategy_reasons_are_diagnostic_strings() {
    for pattern in [
        "hello",
        "foo|bar|baz",
        "[a-z]+",
        r".*\.txt",
        r"\d+\.\d+",
        r"(?m)^/.*\.php",
        "^(foo|bar|baz|qux)",
    ] {
        let re = engine(pattern);
        assert!(!re.strategy_reason().is_empty(), "{}", pattern);
    }
}

#[test]
fn memory_usage_is_nonzero() {
    assert!(engine(r"(\w+)@(\w+)").memory_usage() > 0);
}

#[test]
fn clones_share_state_pool_and_stats() {
    let re = engine("[a-z]+");
    let re2 = re.clone();
    assert!(re2.is_match(b"abc"));
    assert_eq!(re.strategy(), re2.strategy());
}
