use crate::frame::{
    expand_and_collapse, expand_and_collapse_with_context, try_expand_and_collapse,
    try_expand_and_collapse_with_context, MappableFrame,
};

/// The ability to recursively collapse some type into some output type, frame by frame.
/// For example:
///
/// ```rust
/// use memofold::{Collapsible, MappableFrame, PartiallyApplied};
///
/// enum IntTreeFrame<A> {
///     Leaf { value: i64 },
///     Node { left: A, right: A },
/// }
///
/// impl MappableFrame for IntTreeFrame<PartiallyApplied> {
///     type Frame<X> = IntTreeFrame<X>;
///
///     fn map_frame<A, B>(input: Self::Frame<A>, mut f: impl FnMut(A) -> B) -> Self::Frame<B> {
///         match input {
///             IntTreeFrame::Leaf { value } => IntTreeFrame::Leaf { value },
///             IntTreeFrame::Node { left, right } => IntTreeFrame::Node {
///                 left: f(left),
///                 right: f(right),
///             },
///         }
///     }
/// }
///
/// enum IntTree {
///     Leaf { value: i64 },
///     Node { left: Box<Self>, right: Box<Self> },
/// }
///
/// impl<'a> Collapsible for &'a IntTree {
///     type FrameToken = IntTreeFrame<PartiallyApplied>;
///
///     fn into_frame(self) -> <Self::FrameToken as MappableFrame>::Frame<Self> {
///         match self {
///             IntTree::Leaf { value } => IntTreeFrame::Leaf { value: *value },
///             IntTree::Node { left, right } => IntTreeFrame::Node {
///                 left: left.as_ref(),
///                 right: right.as_ref(),
///             },
///         }
///     }
/// }
///
/// let tree = IntTree::Node {
///     left: Box::new(IntTree::Leaf { value: 1 }),
///     right: Box::new(IntTree::Leaf { value: 2 }),
/// };
///
/// let sum = (&tree).collapse_frames(|frame| match frame {
///     IntTreeFrame::Leaf { value } => value,
///     IntTreeFrame::Node { left, right } => left + right,
/// });
///
/// assert_eq!(sum, 3);
/// ```
pub trait Collapsible
where
    Self: Sized,
{
    type FrameToken: MappableFrame;

    /// Given an instance of this type, generate a frame holding the data owned by it,
    /// with any recursive instances of 'Self' owned by this node as the frame elements
    fn into_frame(self) -> <Self::FrameToken as MappableFrame>::Frame<Self>;

    /// Collapse this structure into a single value of type `Out`, one frame at
    /// a time, bottom up: every frame element is fully collapsed, left to
    /// right, before `collapse_frame` runs on the frame holding it.
    ///
    /// Stack safe: uses an explicit heap-allocated stack instead of the call
    /// stack, so arbitrarily deep structures can be collapsed. For shallow
    /// structures [`Collapsible::collapse_frames_recursive`] produces the same
    /// result with less bookkeeping.
    fn collapse_frames<Out>(
        self,
        collapse_frame: impl FnMut(<Self::FrameToken as MappableFrame>::Frame<Out>) -> Out,
    ) -> Out {
        expand_and_collapse::<Self::FrameToken, Self, Out>(self, Self::into_frame, collapse_frame)
    }

    /// Collapse this structure into a single value of type `Out`, where the
    /// collapse function can fail. The first error aborts the traversal.
    fn try_collapse_frames<Out, E>(
        self,
        collapse_frame: impl FnMut(<Self::FrameToken as MappableFrame>::Frame<Out>) -> Result<Out, E>,
    ) -> Result<Out, E> {
        try_expand_and_collapse::<Self::FrameToken, Self, Out, E>(
            self,
            |x| Ok(Self::into_frame(x)),
            collapse_frame,
        )
    }

    /// Call-stack variant of [`Collapsible::collapse_frames`]: identical
    /// results, but recursion depth is proportional to structure depth.
    fn collapse_frames_recursive<Out>(
        self,
        collapse_frame: &mut impl FnMut(<Self::FrameToken as MappableFrame>::Frame<Out>) -> Out,
    ) -> Out {
        let frame = <Self::FrameToken as MappableFrame>::map_frame(self.into_frame(), |child| {
            child.collapse_frames_recursive(collapse_frame)
        });
        collapse_frame(frame)
    }

    /// Paramorphism: like [`Collapsible::collapse_frames`], but the collapse
    /// function sees each frame element as a pair of the original, uncollapsed
    /// substructure and the value it collapsed to. Useful when a frame's
    /// result depends on the shape of a child and not just its value, eg
    /// "parenthesize this operand only if it was itself an addition".
    fn collapse_frames_with_context<Out>(
        self,
        collapse_frame: impl FnMut(<Self::FrameToken as MappableFrame>::Frame<(Self, Out)>) -> Out,
    ) -> Out
    where
        Self: Clone,
    {
        expand_and_collapse_with_context::<Self::FrameToken, Self, Out>(
            self,
            Self::into_frame,
            collapse_frame,
        )
    }

    /// Fallible version of [`Collapsible::collapse_frames_with_context`].
    fn try_collapse_frames_with_context<Out, E>(
        self,
        collapse_frame: impl FnMut(
            <Self::FrameToken as MappableFrame>::Frame<(Self, Out)>,
        ) -> Result<Out, E>,
    ) -> Result<Out, E>
    where
        Self: Clone,
    {
        try_expand_and_collapse_with_context::<Self::FrameToken, Self, Out, E>(
            self,
            |x| Ok(Self::into_frame(x)),
            collapse_frame,
        )
    }
}
