/*!
One compiled engine, many concurrent searchers.
*/

use std::thread;

use crate::{engine, find_all};

const PATTERNS: &[&str] = &[
    r"[a-z]+[0-9]+",
    r".*\.txt",
    r"(\w+)@(\w+)",
    r"foo|bar|baz",
];

const HAYSTACKS: &[&[u8]] = &[
    b"--abc123--de45--",
    b"a/b/readme.txt\nnotes.txt",
    b"mail u@e and v@f",
    b"xxfoo yy bar zz baz",
    b"",
    b"no matches here at all........",
];

#[test]
fn concurrent_searches_match_sequential_results() {
    for pattern in PATTERNS {
        let re = engine(pattern);
        let sequential: Vec<_> =
            HAYSTACKS.iter().map(|h| find_all(&re, h)).collect();
        thread::scope(|scope| {
            let mut handles = vec![];
            for _ in 0..8 {
                let re = re.clone();
                let sequential = &sequential;
                handles.push(scope.spawn(move || {
                    for _ in 0..50 {
                        for (h, want) in
                            HAYSTACKS.iter().zip(sequential.iter())
                        {
                            assert_eq!(*want, find_all(&re, h));
                            assert_eq!(
                                !want.is_empty(),
                                re.is_match(h)
                            );
                        }
                    }
                }));
            }
            for handle in handles {
                handle.join().unwrap();
            }
        });
    }
}

#[test]
fn pool_reuse_across_sequential_searches() {
    let re = engine(r"(\w+)@(\w+)");
    for i in 0..100 {
        let h = format!("user{} at u{}@host{}", i, i, i);
        let caps = re.find_submatch(h.as_bytes()).unwrap();
        assert!(caps.get(1).is_some());
        assert!(caps.get(2).is_some());
    }
}
