/*!
A meta regex engine.

This crate provides [`Engine`], a regex searcher that does not itself execute
a single regex instruction. Instead, it inspects the parsed pattern, picks the
most specialized execution strategy it can and routes every search through
literal prefilters and the component engines of [`regex_automata`]: the
PikeVM, the bounded backtracker, the lazy DFA and the one-pass DFA, with
[`aho_corasick`] and [`memchr`] supplying multi-literal and substring search.

The observable semantics are always leftmost-first (with an opt-in
leftmost-longest mode), regardless of which strategy was picked. Strategy
selection is a pure optimization layer: when a specialized engine cannot be
built or hits one of its runtime limits, the search falls back to a more
general engine that can always answer.

# Example

```
use regex_meta::Engine;

let re = Engine::new(r"[a-zA-Z]+[0-9]+")?;
let m = re.find(b"---abc123---").unwrap();
assert_eq!((3, 9), (m.start(), m.end()));
# Ok::<(), regex_meta::BuildError>(())
```

A compiled `Engine` is immutable and cheap to clone. It can be shared across
any number of threads; per-search mutable state is checked out of an internal
pool for the duration of each call.
*/

#![deny(missing_docs)]

#[macro_use]
mod macros;

mod classes;
mod config;
mod dispatch;
mod engine;
mod error;
mod literal;
mod matches;
mod prefilter;
mod reverse;
mod shape;
mod stats;
mod strategy;
mod util;
mod wrappers;

pub use crate::{
    config::Config,
    engine::{Builder, CapturesIter, Engine, FindIter},
    error::BuildError,
    matches::{Captures, Match},
    stats::StatsSnapshot,
    strategy::StrategyKind,
};
