//! Stack growth for the recursive parser and evaluator.
//!
//! Deep user recursion maps onto deep native recursion, so the recursive entry points run through
//! `ensure_sufficient_stack` and `stacker` grows the stack on demand.

/// Runs `f`, first moving to a fresh stack segment when less than the red zone remains.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    const RED_ZONE: usize = 128 * 1024;
    const STACK_PER_RECURSION: usize = 2 * 1024 * 1024;

    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
