/// A single 'frame' containing values that can be mapped over via `map_frame`.
///
/// A frame is one level of some recursive structure with the recursive
/// positions replaced by a type parameter. For example:
/// `enum ExprFrame<A> { Literal(i64), Add(A, A), Mul(A, A) }` is a single
/// frame of an expression tree; the concrete tree is the fixed point of that
/// shape, with `A` instantiated to the tree type itself.
///
/// # Implementing this trait
///
/// This trait is usually implemented for some marker token, because rust does
/// not allow implementing a trait for a partially applied type. That is, we
/// can implement a trait for `Option<usize>` but we can't implement a trait
/// for just `Option`, because `Option` is a partially applied type.
///
/// For this reason, the convention is to implement this trait using the
/// uninhabited [`PartiallyApplied`] enum marker, eg
///
/// ```rust
/// # use memofold::{MappableFrame, PartiallyApplied};
/// # #[derive(Debug, PartialEq, Eq)]
/// enum MyOption<A> {
///     Some(A),
///     None,
/// }
///
/// impl MappableFrame for MyOption<PartiallyApplied> {
///     type Frame<X> = MyOption<X>;
///
///     fn map_frame<A, B>(input: Self::Frame<A>, mut f: impl FnMut(A) -> B) -> Self::Frame<B> {
///         match input {
///             MyOption::Some(x) => MyOption::Some(f(x)),
///             MyOption::None => MyOption::None,
///         }
///     }
/// }
/// ```
pub trait MappableFrame {
    /// the frame type that is mapped over by `map_frame`
    type Frame<X>;

    /// Apply some function `f` to each element inside a frame
    fn map_frame<A, B>(input: Self::Frame<A>, f: impl FnMut(A) -> B) -> Self::Frame<B>;
}

/// An uninhabited type used to define [`MappableFrame`] instances for partially-applied types.
///
/// For example: the MappableFrame instance for `MyFrame<A>` cannot be written over the
/// partially-applied type `MyFrame`, so instead we write it over `MyFrame<PartiallyApplied>`
#[derive(Clone, Debug)]
pub enum PartiallyApplied {}

/// This function generates a stack machine for some frame `F::Frame`,
/// expanding some seed value `Seed` into frames via a function `Seed -> Frame<Seed>`
/// and collapsing those values via a function `Frame<Out> -> Out`.
///
/// The traversal is depth first; every element of a frame is collapsed, in
/// left-to-right order, strictly before the frame that holds it is collapsed.
/// Algebras handed to this machine may rely on that ordering.
///
/// This function is stack safe (it does not use the call stack), but it
/// does use an internal stack data structure and is thus, technically,
/// susceptible to memory exhaustion if said stack expands
pub fn expand_and_collapse<F: MappableFrame, Seed, Out>(
    seed: Seed,
    mut expand_frame: impl FnMut(Seed) -> F::Frame<Seed>,
    mut collapse_frame: impl FnMut(F::Frame<Out>) -> Out,
) -> Out {
    enum State<Seed, CollapsibleInternal> {
        Expand(usize, Seed),
        Collapse(usize, CollapsibleInternal),
    }

    let mut vals: Vec<Option<Out>> = vec![None];
    let mut stack = vec![State::Expand(0, seed)];

    while let Some(item) = stack.pop() {
        match item {
            State::Expand(val_idx, seed) => {
                let node = expand_frame(seed);
                let mut seeds = Vec::new();
                let node = F::map_frame(node, |seed| {
                    vals.push(None);
                    let idx = vals.len() - 1;
                    seeds.push(State::Expand(idx, seed));
                    idx
                });

                stack.push(State::Collapse(val_idx, node));
                // reversed so the leftmost element is popped, and so collapsed, first
                stack.extend(seeds.into_iter().rev());
            }
            State::Collapse(val_idx, node) => {
                let node = F::map_frame(node, |k| vals[k].take().unwrap());
                vals[val_idx] = Some(collapse_frame(node));
            }
        };
    }
    vals[0].take().unwrap()
}

/// Fallible version of [`expand_and_collapse`]: both the expand and the
/// collapse function may fail, and the first error aborts the traversal.
///
/// Same ordering guarantee and same stack safety properties as
/// [`expand_and_collapse`].
pub fn try_expand_and_collapse<F: MappableFrame, Seed, Out, E>(
    seed: Seed,
    mut expand_frame: impl FnMut(Seed) -> Result<F::Frame<Seed>, E>,
    mut collapse_frame: impl FnMut(F::Frame<Out>) -> Result<Out, E>,
) -> Result<Out, E> {
    enum State<Seed, CollapsibleInternal> {
        Expand(usize, Seed),
        Collapse(usize, CollapsibleInternal),
    }

    let mut vals: Vec<Option<Out>> = vec![None];
    let mut stack = vec![State::Expand(0, seed)];

    while let Some(item) = stack.pop() {
        match item {
            State::Expand(val_idx, seed) => {
                let node = expand_frame(seed)?;
                let mut seeds = Vec::new();
                let node = F::map_frame(node, |seed| {
                    vals.push(None);
                    let idx = vals.len() - 1;
                    seeds.push(State::Expand(idx, seed));
                    idx
                });

                stack.push(State::Collapse(val_idx, node));
                // reversed so the leftmost element is popped, and so collapsed, first
                stack.extend(seeds.into_iter().rev());
            }
            State::Collapse(val_idx, node) => {
                let node = F::map_frame(node, |k| vals[k].take().unwrap());
                vals[val_idx] = Some(collapse_frame(node)?);
            }
        };
    }
    Ok(vals[0].take().unwrap())
}

/// Paramorphism stack machine: like [`expand_and_collapse`], but the collapse
/// function sees, for every element of a frame, both the original seed the
/// element was expanded from and the value it collapsed to.
///
/// `Seed: Clone` because each seed is consumed once by `expand_frame` and
/// handed once, unexpanded, to `collapse_frame`. When folding by reference
/// (`Seed` is `&Tree`) the clone is a pointer copy.
pub fn expand_and_collapse_with_context<F: MappableFrame, Seed: Clone, Out>(
    seed: Seed,
    mut expand_frame: impl FnMut(Seed) -> F::Frame<Seed>,
    mut collapse_frame: impl FnMut(F::Frame<(Seed, Out)>) -> Out,
) -> Out {
    enum State<Seed, CollapsibleInternal> {
        Expand(usize, Seed),
        Collapse(usize, CollapsibleInternal),
    }

    let mut vals: Vec<Option<Out>> = vec![None];
    let mut stack = vec![State::Expand(0, seed)];

    while let Some(item) = stack.pop() {
        match item {
            State::Expand(val_idx, seed) => {
                let node = expand_frame(seed);
                let mut seeds = Vec::new();
                let node = F::map_frame(node, |seed: Seed| {
                    vals.push(None);
                    let idx = vals.len() - 1;
                    seeds.push(State::Expand(idx, seed.clone()));
                    (seed, idx)
                });

                stack.push(State::Collapse(val_idx, node));
                // reversed so the leftmost element is popped, and so collapsed, first
                stack.extend(seeds.into_iter().rev());
            }
            State::Collapse(val_idx, node) => {
                let node = F::map_frame(node, |(seed, k)| (seed, vals[k].take().unwrap()));
                vals[val_idx] = Some(collapse_frame(node));
            }
        };
    }
    vals[0].take().unwrap()
}

/// Fallible version of [`expand_and_collapse_with_context`].
pub fn try_expand_and_collapse_with_context<F: MappableFrame, Seed: Clone, Out, E>(
    seed: Seed,
    mut expand_frame: impl FnMut(Seed) -> Result<F::Frame<Seed>, E>,
    mut collapse_frame: impl FnMut(F::Frame<(Seed, Out)>) -> Result<Out, E>,
) -> Result<Out, E> {
    enum State<Seed, CollapsibleInternal> {
        Expand(usize, Seed),
        Collapse(usize, CollapsibleInternal),
    }

    let mut vals: Vec<Option<Out>> = vec![None];
    let mut stack = vec![State::Expand(0, seed)];

    while let Some(item) = stack.pop() {
        match item {
            State::Expand(val_idx, seed) => {
                let node = expand_frame(seed)?;
                let mut seeds = Vec::new();
                let node = F::map_frame(node, |seed: Seed| {
                    vals.push(None);
                    let idx = vals.len() - 1;
                    seeds.push(State::Expand(idx, seed.clone()));
                    (seed, idx)
                });

                stack.push(State::Collapse(val_idx, node));
                // reversed so the leftmost element is popped, and so collapsed, first
                stack.extend(seeds.into_iter().rev());
            }
            State::Collapse(val_idx, node) => {
                let node = F::map_frame(node, |(seed, k)| (seed, vals[k].take().unwrap()));
                vals[val_idx] = Some(collapse_frame(node)?);
            }
        };
    }
    Ok(vals[0].take().unwrap())
}

#[cfg(test)]
mod tests {
    use super::*;

    enum ListFrame<A> {
        Cons(i64, A),
        Nil,
    }

    impl MappableFrame for ListFrame<PartiallyApplied> {
        type Frame<X> = ListFrame<X>;

        fn map_frame<A, B>(input: Self::Frame<A>, mut f: impl FnMut(A) -> B) -> Self::Frame<B> {
            match input {
                ListFrame::Cons(x, next) => ListFrame::Cons(x, f(next)),
                ListFrame::Nil => ListFrame::Nil,
            }
        }
    }

    // deep enough to overflow the call stack if the machine recursed
    const DEPTH: i64 = 500_000;

    #[test]
    fn deep_expand_and_collapse_is_stack_safe() {
        let sum = expand_and_collapse::<ListFrame<PartiallyApplied>, i64, i64>(
            DEPTH,
            |n| if n == 0 { ListFrame::Nil } else { ListFrame::Cons(n, n - 1) },
            |frame| match frame {
                ListFrame::Cons(x, acc) => x + acc,
                ListFrame::Nil => 0,
            },
        );
        assert_eq!(sum, DEPTH * (DEPTH + 1) / 2);
    }

    #[test]
    fn try_expand_and_collapse_short_circuits() {
        let res = try_expand_and_collapse::<ListFrame<PartiallyApplied>, i64, i64, &str>(
            10,
            |n| {
                if n == 3 {
                    Err("boom")
                } else if n == 0 {
                    Ok(ListFrame::Nil)
                } else {
                    Ok(ListFrame::Cons(n, n - 1))
                }
            },
            |frame| match frame {
                ListFrame::Cons(x, acc) => Ok(x + acc),
                ListFrame::Nil => Ok(0),
            },
        );
        assert_eq!(res, Err("boom"));
    }

    #[test]
    fn with_context_sees_original_seeds() {
        let res = expand_and_collapse_with_context::<ListFrame<PartiallyApplied>, i64, i64>(
            4,
            |n| if n == 0 { ListFrame::Nil } else { ListFrame::Cons(n, n - 1) },
            |frame| match frame {
                ListFrame::Cons(x, (seed, acc)) => {
                    assert_eq!(seed, x - 1);
                    x + acc
                }
                ListFrame::Nil => 0,
            },
        );
        assert_eq!(res, 10);
    }
}
