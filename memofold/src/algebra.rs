//! Fusing tree-to-tree rewrite passes so several independent one-level
//! rewrites run in a single traversal.
//!
//! A rewrite pass is an algebra whose output type is the tree itself: it
//! takes one frame whose elements are already-rewritten subtrees and builds
//! a replacement node. Passes know nothing about traversal or about each
//! other, so independently-owned rewrites (constant folding here, a
//! strength reduction there) can be fused without coordination.

use crate::frame::MappableFrame;
use crate::recursive::{Collapsible, Expandable};

/// One level of a tree-to-tree rewrite.
///
/// A pass that does not care about some node kind should rebuild it
/// unchanged; `T::from_frame` is exactly that identity pass and can be used
/// directly wherever a pass is expected.
pub trait RewritePass<T: Collapsible> {
    fn rewrite(&mut self, frame: <T::FrameToken as MappableFrame>::Frame<T>) -> T;
}

impl<T, F> RewritePass<T> for F
where
    T: Collapsible,
    F: FnMut(<T::FrameToken as MappableFrame>::Frame<T>) -> T,
{
    fn rewrite(&mut self, frame: <T::FrameToken as MappableFrame>::Frame<T>) -> T {
        self(frame)
    }
}

/// An ordered sequence of rewrite passes fused into a single pass.
///
/// At every node the first pass consumes the incoming frame and produces a
/// tree; each following pass consumes that tree's top-level frame in turn.
/// `rewrite(tree, &mut Fused::new().then(a).then(b))` produces the same tree
/// as `rewrite(rewrite(tree, &mut a), &mut b)` for one-level passes, in one
/// traversal instead of two.
///
/// Passes are fused over a single tree type, so composing passes with
/// mismatched result types is a compile error rather than a runtime one.
pub struct Fused<T: Collapsible> {
    passes: Vec<Box<dyn RewritePass<T>>>,
}

impl<T: Collapsible> Fused<T> {
    pub fn new() -> Self {
        Fused { passes: Vec::new() }
    }

    pub fn then(mut self, pass: impl RewritePass<T> + 'static) -> Self {
        self.passes.push(Box::new(pass));
        self
    }

    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }
}

impl<T: Collapsible> Default for Fused<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RewritePass<T> for Fused<T>
where
    T: Collapsible + Expandable<FrameToken = <T as Collapsible>::FrameToken>,
{
    fn rewrite(&mut self, frame: <<T as Collapsible>::FrameToken as MappableFrame>::Frame<T>) -> T {
        let mut passes = self.passes.iter_mut();
        // an empty fusion is the identity pass
        let mut tree = match passes.next() {
            Some(pass) => pass.rewrite(frame),
            None => T::from_frame(frame),
        };
        for pass in passes {
            tree = pass.rewrite(tree.into_frame());
        }
        tree
    }
}

/// Rewrite a whole tree bottom up with one pass (possibly a [`Fused`] one),
/// in a single stack safe traversal.
pub fn rewrite<T: Collapsible>(tree: T, pass: &mut impl RewritePass<T>) -> T {
    tree.collapse_frames(|frame| pass.rewrite(frame))
}
