use std::collections::HashMap;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use memofold::{rewrite, Evaluator, Expandable, Fused, SparseMemo};
use memofold_tests::expr::eval::{eval, naive_eval};
use memofold_tests::expr::rewrite::{fold_constant_adds, optimize, shortcircuit_zero_muls};
use memofold_tests::expr::{Expr, ExprFrame, OpTag};
use memofold_tests::recurrences::{fibonacci, naive_fibonacci};
use pprof::criterion::{Output, PProfProfiler};

fn big_expr(depth: i32) -> Expr {
    // a full binary tree of additions with a zero mul at every leaf, so the
    // rewrite passes have something to chew on. Negative seeds mark the
    // constants under the leaf muls.
    Expr::expand_frames(depth, |x| match x {
        x if x > 0 => ExprFrame::Op(OpTag::Add, vec![x - 1, x - 1]),
        0 => ExprFrame::Op(OpTag::Mul, vec![-1, -2]),
        -1 => ExprFrame::Const(0),
        _ => ExprFrame::Const(2),
    })
}

fn bench_eval(criterion: &mut Criterion) {
    let env = HashMap::new();
    let mut group = criterion.benchmark_group("evaluate expression tree");

    for depth in 17..18 {
        let expr = Expr::expand_frames(depth, |x: u32| {
            if x > 0 {
                ExprFrame::Op(OpTag::Add, vec![x - 1, x - 1])
            } else {
                ExprFrame::Const(0)
            }
        });

        group.bench_with_input(
            BenchmarkId::new("traditional boxed method", depth),
            &expr,
            |b, expr| b.iter(|| naive_eval(expr, &env)),
        );

        group.bench_with_input(
            BenchmarkId::new("fold with stack machine", depth),
            &expr,
            |b, expr| b.iter(|| eval(expr, &env)),
        );
    }
    group.finish();
}

fn bench_rewrite(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("rewrite expression tree");

    for depth in 16..17i32 {
        let expr = big_expr(depth);

        group.bench_with_input(
            BenchmarkId::new("fused passes, one traversal", depth),
            &expr,
            |b, expr| b.iter(|| optimize(expr.clone())),
        );

        group.bench_with_input(
            BenchmarkId::new("sequential passes, one traversal each", depth),
            &expr,
            |b, expr| {
                b.iter(|| {
                    rewrite(
                        rewrite(expr.clone(), &mut fold_constant_adds),
                        &mut shortcircuit_zero_muls,
                    )
                })
            },
        );

        group.bench_with_input(
            BenchmarkId::new("fused passes via Fused built per iter", depth),
            &expr,
            |b, expr| {
                b.iter(|| {
                    let mut fused = Fused::new()
                        .then(fold_constant_adds)
                        .then(shortcircuit_zero_muls);
                    rewrite(expr.clone(), &mut fused)
                })
            },
        );
    }
    group.finish();
}

fn bench_memoized_recurrence(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("fibonacci recurrence");

    group.bench_function("naive recursion, n=30", |b| {
        b.iter(|| naive_fibonacci(30))
    });

    group.bench_function("memoized evaluator, fresh store, n=30", |b| {
        b.iter(|| {
            let mut evaluator = Evaluator::new(fibonacci(), SparseMemo::new());
            evaluator.evaluate(30).unwrap()
        })
    });

    group.bench_function("memoized evaluator, warm store, n=30", |b| {
        let mut evaluator = Evaluator::new(fibonacci(), SparseMemo::new());
        evaluator.evaluate(30).unwrap();
        b.iter(|| evaluator.evaluate(30).unwrap())
    });

    group.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default()
        .with_profiler(
            PProfProfiler::new(100, Output::Flamegraph(None))
        );
    targets = bench_eval, bench_rewrite, bench_memoized_recurrence
}
criterion_main!(benches);
