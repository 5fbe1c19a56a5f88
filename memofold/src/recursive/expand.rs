use crate::frame::{expand_and_collapse, MappableFrame};

/// The ability to recursively expand a seed into some type, frame by frame.
pub trait Expandable
where
    Self: Sized,
{
    type FrameToken: MappableFrame;

    /// Given a frame holding instances of 'Self', generate an instance of 'Self'
    fn from_frame(val: <Self::FrameToken as MappableFrame>::Frame<Self>) -> Self;

    /// Build a structure from a seed value, one frame at a time
    ///
    /// defined on the trait for convenience and to allow for optimized impls
    fn expand_frames<In>(
        input: In,
        expand_frame: impl FnMut(In) -> <Self::FrameToken as MappableFrame>::Frame<In>,
    ) -> Self {
        expand_and_collapse::<Self::FrameToken, In, Self>(input, expand_frame, Self::from_frame)
    }
}
