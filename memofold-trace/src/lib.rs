//! Instrumented folds: run a collapse while recording the order nodes were
//! expanded and collapsed in, as a serializable event log.
//!
//! The trace exists so that ordering guarantees of the fold engine can be
//! observed instead of assumed: [`FoldTrace::is_post_order`] checks that
//! every node collapsed strictly after all of its children, left to right.

mod trace;

pub use trace::{CollapsibleTraceExt, FoldTrace, TraceEvent};
