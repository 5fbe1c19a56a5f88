//! Recurrence definitions shared by tests and benches.

use memofold::{EvalError, FnRecurrence, Recur};

/// Catalan numbers: `c(n) = sum(c(i) * c(n-1-i) for i in 0..n)`, `c(0) = c(1) = 1`.
///
/// Quadratic fan-out per index makes this the classic case where memoized
/// and unmemoized evaluation diverge in cost but must not diverge in value.
pub fn catalan(
) -> FnRecurrence<u64, u64, impl Fn(&mut dyn Recur<u64, u64>, u64) -> Result<u64, EvalError>> {
    FnRecurrence::new(|recur, n| {
        if n <= 1 {
            return Ok(1);
        }
        let mut total: u64 = 0;
        for i in 0..n {
            total += recur.recur(i)? * recur.recur(n - 1 - i)?;
        }
        Ok(total)
    })
}

pub fn fibonacci(
) -> FnRecurrence<u64, u64, impl Fn(&mut dyn Recur<u64, u64>, u64) -> Result<u64, EvalError>> {
    FnRecurrence::new(|recur, n| {
        if n <= 1 {
            Ok(n)
        } else {
            Ok(recur.recur(n - 1)? + recur.recur(n - 2)?)
        }
    })
}

/// Unmemoized reference implementations.
pub fn naive_catalan(n: u64) -> u64 {
    if n <= 1 {
        return 1;
    }
    (0..n).map(|i| naive_catalan(i) * naive_catalan(n - 1 - i)).sum()
}

pub fn naive_fibonacci(n: u64) -> u64 {
    if n <= 1 {
        n
    } else {
        naive_fibonacci(n - 1) + naive_fibonacci(n - 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memofold::{DenseMemo, Evaluator, FnRecurrence, Recur, SparseMemo};
    use proptest::{prop_assert_eq, proptest};
    use std::cell::Cell;

    #[test]
    fn catalan_of_five_is_42() {
        let mut eval = Evaluator::new(catalan(), SparseMemo::new());
        assert_eq!(eval.evaluate(5), Ok(42));
    }

    // C(0)..C(15)
    const CATALAN: [u64; 16] = [
        1, 1, 2, 5, 14, 42, 132, 429, 1430, 4862, 16796, 58786, 208012, 742900, 2674440, 9694845,
    ];

    proptest! {
        // naive_catalan blows up exponentially, keep n small
        #[test]
        fn memoized_matches_naive(n in 0u64..10) {
            let mut sparse = Evaluator::new(catalan(), SparseMemo::new());
            prop_assert_eq!(sparse.evaluate(n), Ok(naive_catalan(n)));

            let mut fib = Evaluator::new(fibonacci(), SparseMemo::new());
            prop_assert_eq!(fib.evaluate(n), Ok(naive_fibonacci(n)));
        }

        #[test]
        fn store_choice_is_invisible(n in 0usize..22) {
            let mut dense = Evaluator::new(
                FnRecurrence::new(|recur: &mut dyn Recur<usize, u64>, i: usize| {
                    if i <= 1 {
                        Ok(i as u64)
                    } else {
                        Ok(recur.recur(i - 1)? + recur.recur(i - 2)?)
                    }
                }),
                DenseMemo::with_capacity(32),
            );
            prop_assert_eq!(dense.evaluate(n), Ok(naive_fibonacci(n as u64)));
        }

        #[test]
        fn evaluation_order_is_irrelevant(indices in proptest::collection::vec(0u64..16, 1..12)) {
            let mut shuffled = Evaluator::new(catalan(), SparseMemo::new());
            for &n in &indices {
                prop_assert_eq!(shuffled.evaluate(n), Ok(CATALAN[n as usize]));
            }
        }
    }

    #[test]
    fn sub_problems_are_shared_across_top_level_calls() {
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
        assert_eq!(eval.evaluate(30), Ok(832_040));
        assert_eq!(calls.get(), 31);
        assert_eq!(eval.evaluate(25), Ok(75_025));
        // nothing new to compute
        assert_eq!(calls.get(), 31);
    }
}
