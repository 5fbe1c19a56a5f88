//! Memoized open recursion and stack safe composable tree folds.
//!
//! Two engines share one idea, separating the shape of a recursive
//! computation from the machinery that runs it:
//!
//! - [`Evaluator`] memoizes an open recurrence: a definition that recurses
//!   through an injected [`Recur`] capability instead of calling itself, so
//!   every recursive step goes through a pluggable [`MemoStore`] and
//!   evaluation order stops mattering.
//! - [`Collapsible`] folds recursive trees bottom up with caller-supplied
//!   one-level algebras, stack safely by default, with fallible and
//!   context-aware (paramorphism) variants; [`Fused`] composes tree-to-tree
//!   algebras so several rewrites run in one traversal.

mod algebra;
mod eval;
mod frame;
mod memo;
mod recursive;

pub use algebra::{rewrite, Fused, RewritePass};
pub use eval::{
    EvalError, Evaluator, FnRecurrence, Recur, Recurrence, DEFAULT_MAX_DEPTH,
};
pub use frame::{
    expand_and_collapse, expand_and_collapse_with_context, try_expand_and_collapse,
    try_expand_and_collapse_with_context, MappableFrame, PartiallyApplied,
};
pub use memo::{DenseMemo, MemoError, MemoStore, SharedMemo, SparseMemo};
pub use recursive::{Collapsible, Expandable};
