//! The open-recursion evaluator: memoized top-down evaluation of
//! caller-supplied recurrences.
//!
//! A recurrence never calls itself by name. It is handed a [`Recur`]
//! capability and must recurse through that, which lets the evaluator
//! interpose a memo store around every recursive step. Because every
//! sub-problem is reached through the store, results are independent of the
//! order sub-problems are requested in.

use std::fmt;
use std::marker::PhantomData;

use thiserror::Error;

use crate::memo::{MemoError, MemoStore};

/// Recursion depth allowed before [`EvalError::DepthExceeded`], unless
/// overridden via [`Evaluator::with_max_depth`].
pub const DEFAULT_MAX_DEPTH: usize = 4096;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EvalError {
    /// The depth guard tripped. Almost always a cyclic recurrence or a
    /// missing base case; fatal to the call, never retried.
    #[error("recursion depth limit {limit} exceeded (cyclic recurrence or missing base case?)")]
    DepthExceeded { limit: usize },
    /// The memo store rejected a write. A duplicate-key conflict here means
    /// the recurrence is not deterministic.
    #[error(transparent)]
    Memo(#[from] MemoError),
}

/// The "how to recurse" capability handed to a [`Recurrence`].
///
/// Object safe so that plain closures can be recurrences without naming the
/// evaluator's internal session type.
pub trait Recur<K, V> {
    fn recur(&mut self, index: K) -> Result<V, EvalError>;
}

/// A recurrence: the value at `index`, defined in terms of recursive calls on
/// strictly smaller indices.
///
/// `define` must be pure and must only `recur` on indices smaller than its
/// input under some well-founded order. The evaluator cannot check that
/// order; what it can do is trip the depth guard instead of looping forever
/// when the contract is violated.
pub trait Recurrence {
    type Index: Clone + fmt::Debug;
    type Value: Clone + PartialEq;

    fn define(
        &self,
        recur: &mut dyn Recur<Self::Index, Self::Value>,
        index: Self::Index,
    ) -> Result<Self::Value, EvalError>;
}

/// Adapter making a plain closure `Fn(&mut dyn Recur, index)` a [`Recurrence`].
///
/// ```rust
/// use memofold::{Evaluator, FnRecurrence, SparseMemo};
///
/// let fib = FnRecurrence::new(|recur, n: u64| {
///     if n <= 1 {
///         Ok(n)
///     } else {
///         Ok(recur.recur(n - 1)? + recur.recur(n - 2)?)
///     }
/// });
///
/// let mut eval = Evaluator::new(fib, SparseMemo::new());
/// assert_eq!(eval.evaluate(10), Ok(55));
/// ```
pub struct FnRecurrence<K, V, F> {
    f: F,
    _marker: PhantomData<fn(K) -> V>,
}

impl<K, V, F> FnRecurrence<K, V, F>
where
    F: Fn(&mut dyn Recur<K, V>, K) -> Result<V, EvalError>,
{
    pub fn new(f: F) -> Self {
        FnRecurrence {
            f,
            _marker: PhantomData,
        }
    }
}

impl<K, V, F> Recurrence for FnRecurrence<K, V, F>
where
    K: Clone + fmt::Debug,
    V: Clone + PartialEq,
    F: Fn(&mut dyn Recur<K, V>, K) -> Result<V, EvalError>,
{
    type Index = K;
    type Value = V;

    fn define(
        &self,
        recur: &mut dyn Recur<K, V>,
        index: K,
    ) -> Result<V, EvalError> {
        (self.f)(recur, index)
    }
}

/// A memoized evaluator for one recurrence.
///
/// The store persists across [`Evaluator::evaluate`] calls, so sub-problems
/// shared between top-level indices are computed once for the lifetime of
/// the evaluator.
pub struct Evaluator<R, S> {
    recurrence: R,
    store: S,
    max_depth: usize,
}

impl<R, S> Evaluator<R, S>
where
    R: Recurrence,
    S: MemoStore<R::Index, R::Value>,
{
    pub fn new(recurrence: R, store: S) -> Self {
        Evaluator {
            recurrence,
            store,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Evaluate the recurrence at `index`. Equal to a direct unmemoized
    /// evaluation of the same recurrence, except each distinct sub-problem
    /// is computed at most once per store.
    pub fn evaluate(&mut self, index: R::Index) -> Result<R::Value, EvalError> {
        let mut session = Session {
            recurrence: &self.recurrence,
            store: &mut self.store,
            depth: 0,
            max_depth: self.max_depth,
        };
        session.recur(index)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

/// One in-progress evaluation: splits the evaluator's borrows so the
/// recurrence can re-enter it as a `&mut dyn Recur`.
struct Session<'a, R: Recurrence, S> {
    recurrence: &'a R,
    store: &'a mut S,
    depth: usize,
    max_depth: usize,
}

impl<R, S> Recur<R::Index, R::Value> for Session<'_, R, S>
where
    R: Recurrence,
    S: MemoStore<R::Index, R::Value>,
{
    fn recur(&mut self, index: R::Index) -> Result<R::Value, EvalError> {
        // compute-if-absent through the store: a hit never re-runs `define`
        if let Some(value) = self.store.get(&index) {
            return Ok(value.clone());
        }
        if self.depth >= self.max_depth {
            return Err(EvalError::DepthExceeded {
                limit: self.max_depth,
            });
        }
        self.depth += 1;
        let recurrence = self.recurrence;
        let value = recurrence.define(self, index.clone())?;
        self.depth -= 1;
        self.store.insert(index, value.clone())?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memo::{DenseMemo, SparseMemo};
    use std::cell::Cell;

    fn catalan(
    ) -> FnRecurrence<u64, u64, impl Fn(&mut dyn Recur<u64, u64>, u64) -> Result<u64, EvalError>>
    {
        FnRecurrence::new(|recur, n| {
            if n <= 1 {
                return Ok(1);
            }
            let mut total = 0;
            for i in 0..n {
                total += recur.recur(i)? * recur.recur(n - 1 - i)?;
            }
            Ok(total)
        })
    }

    #[test]
    fn catalan_five_is_42() {
        let mut eval = Evaluator::new(catalan(), SparseMemo::new());
        assert_eq!(eval.evaluate(5), Ok(42));
    }

    #[test]
    fn dense_and_sparse_stores_agree() {
        let mut sparse = Evaluator::new(catalan(), SparseMemo::new());
        let mut dense = Evaluator::new(
            FnRecurrence::new(|recur: &mut dyn Recur<usize, u64>, n: usize| {
                if n <= 1 {
                    return Ok(1);
                }
                let mut total = 0;
                for i in 0..n {
                    total += recur.recur(i)? * recur.recur(n - 1 - i)?;
                }
                Ok(total)
            }),
            DenseMemo::with_capacity(16),
        );
        for n in 0..10u64 {
            assert_eq!(sparse.evaluate(n), dense.evaluate(n as usize));
        }
    }

    #[test]
    fn each_index_computed_at_most_once() {
        let calls = Cell::new(0u32);
        let fib = FnRecurrence::new(|recur: &mut dyn Recur<u64, u64>, n| {
            calls.set(calls.get() + 1);
            if n <= 1 {
                Ok(n)
            } else {
                Ok(recur.recur(n - 1)? + recur.recur(n - 2)?)
            }
        });
        let mut eval = Evaluator::new(fib, SparseMemo::new());
        assert_eq!(eval.evaluate(20), Ok(6765));
        // one define call per distinct index 0..=20, shared across repeats
        assert_eq!(calls.get(), 21);
        assert_eq!(eval.evaluate(20), Ok(6765));
        assert_eq!(eval.evaluate(15), Ok(610));
        assert_eq!(calls.get(), 21);
        assert_eq!(eval.store().len(), 21);
    }

    #[test]
    fn evaluation_order_does_not_matter() {
        let mut low_first = Evaluator::new(catalan(), SparseMemo::new());
        let mut high_first = Evaluator::new(catalan(), SparseMemo::new());

        let lows: Vec<_> = (0..8).map(|n| low_first.evaluate(n)).collect();
        let highs: Vec<_> = (0..8).rev().map(|n| high_first.evaluate(n)).collect();

        for (n, low) in lows.iter().enumerate() {
            assert_eq!(low, &highs[7 - n]);
        }
        assert_eq!(low_first.store().len(), high_first.store().len());
    }

    #[test]
    fn base_case_never_recurs() {
        let recurred = Cell::new(false);
        let rec = FnRecurrence::new(|recur: &mut dyn Recur<u64, u64>, n| {
            if n == 0 {
                Ok(1)
            } else {
                recurred.set(true);
                recur.recur(n - 1)
            }
        });
        let mut eval = Evaluator::new(rec, SparseMemo::new());
        assert_eq!(eval.evaluate(0), Ok(1));
        assert!(!recurred.get());
    }

    #[test]
    fn cyclic_recurrence_trips_depth_guard() {
        // n depends on n: never terminates without the guard
        let cyclic = FnRecurrence::new(|recur: &mut dyn Recur<u64, u64>, n| recur.recur(n));
        let mut eval = Evaluator::new(cyclic, SparseMemo::new()).with_max_depth(64);
        assert_eq!(
            eval.evaluate(1),
            Err(EvalError::DepthExceeded { limit: 64 })
        );
    }

    #[test]
    fn out_of_range_dense_key_surfaces() {
        let fib = FnRecurrence::new(|recur: &mut dyn Recur<usize, u64>, n| {
            if n <= 1 {
                Ok(n as u64)
            } else {
                Ok(recur.recur(n - 1)? + recur.recur(n - 2)?)
            }
        });
        let mut eval = Evaluator::new(fib, DenseMemo::with_capacity(4));
        assert!(matches!(
            eval.evaluate(10),
            Err(EvalError::Memo(MemoError::KeyOutOfRange { .. }))
        ));
    }
}
