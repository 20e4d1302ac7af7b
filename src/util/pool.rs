use core::panic::{RefUnwindSafe, UnwindSafe};

use regex_automata::util::pool::{Pool, PoolGuard};

use crate::wrappers::SearchState;

/// The constructor for fresh search state blocks.
///
/// A boxed closure (instead of a generic parameter) keeps the pool type
/// nameable from the engine, at the cost of one indirect call on the rare
/// miss path.
pub(crate) type StatePoolFn =
    Box<dyn Fn() -> SearchState + Send + Sync + UnwindSafe + RefUnwindSafe>;

/// A pool of [`SearchState`] blocks.
///
/// Every search checks a block out at entry and returns it at exit, which is
/// what makes one compiled engine safe to use from many threads at once. The
/// underlying pool keeps a bounded free list and falls back to constructing
/// a fresh block when empty, so acquisition never fails and never blocks for
/// long.
pub(crate) struct StatePool(Pool<SearchState, StatePoolFn>);

impl StatePool {
    pub(crate) fn new(create: StatePoolFn) -> StatePool {
        StatePool(Pool::new(create))
    }

    #[inline]
    pub(crate) fn get(&self) -> PoolGuard<'_, SearchState, StatePoolFn> {
        self.0.get()
    }
}

impl core::fmt::Debug for StatePool {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.debug_tuple("StatePool").finish()
    }
}
