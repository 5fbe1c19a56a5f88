pub mod eval;
pub mod rewrite;

use memofold::{Collapsible, Expandable, MappableFrame, PartiallyApplied};
use proptest::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpTag {
    Add,
    Mul,
}

impl OpTag {
    pub fn symbol(self) -> &'static str {
        match self {
            OpTag::Add => "+",
            OpTag::Mul => "*",
        }
    }
}

/// One level of an arithmetic expression: integer constants, named
/// variables, and n-ary operator nodes.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprFrame<A> {
    Const(i64),
    Var(String),
    Op(OpTag, Vec<A>),
}

impl MappableFrame for ExprFrame<PartiallyApplied> {
    type Frame<X> = ExprFrame<X>;

    #[inline(always)]
    fn map_frame<A, B>(input: Self::Frame<A>, f: impl FnMut(A) -> B) -> Self::Frame<B> {
        match input {
            ExprFrame::Const(x) => ExprFrame::Const(x),
            ExprFrame::Var(name) => ExprFrame::Var(name),
            ExprFrame::Op(tag, args) => ExprFrame::Op(tag, args.into_iter().map(f).collect()),
        }
    }
}

/// The expression tree: the fixed point of [`ExprFrame`].
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Const(i64),
    Var(String),
    Op(OpTag, Vec<Expr>),
}

impl<'a> Collapsible for &'a Expr {
    type FrameToken = ExprFrame<PartiallyApplied>;

    #[inline(always)]
    fn into_frame(self) -> <Self::FrameToken as MappableFrame>::Frame<Self> {
        match self {
            Expr::Const(x) => ExprFrame::Const(*x),
            Expr::Var(name) => ExprFrame::Var(name.clone()),
            Expr::Op(tag, args) => ExprFrame::Op(*tag, args.iter().collect()),
        }
    }
}

impl Collapsible for Expr {
    type FrameToken = ExprFrame<PartiallyApplied>;

    #[inline(always)]
    fn into_frame(self) -> <Self::FrameToken as MappableFrame>::Frame<Self> {
        match self {
            Expr::Const(x) => ExprFrame::Const(x),
            Expr::Var(name) => ExprFrame::Var(name),
            Expr::Op(tag, args) => ExprFrame::Op(tag, args),
        }
    }
}

impl Expandable for Expr {
    type FrameToken = ExprFrame<PartiallyApplied>;

    fn from_frame(val: <Self::FrameToken as MappableFrame>::Frame<Self>) -> Self {
        match val {
            ExprFrame::Const(x) => Expr::Const(x),
            ExprFrame::Var(name) => Expr::Var(name),
            ExprFrame::Op(tag, args) => Expr::Op(tag, args),
        }
    }
}

pub fn cst(x: i64) -> Expr {
    Expr::Const(x)
}

pub fn var(name: &str) -> Expr {
    Expr::Var(name.to_owned())
}

pub fn op(tag: OpTag, args: Vec<Expr>) -> Expr {
    Expr::Op(tag, args)
}

pub fn add(args: Vec<Expr>) -> Expr {
    op(OpTag::Add, args)
}

pub fn mul(args: Vec<Expr>) -> Expr {
    op(OpTag::Mul, args)
}

pub fn arb_expr() -> impl Strategy<Value = Expr> {
    let leaf = prop_oneof![
        any::<i8>().prop_map(|x| cst(x as i64)),
        prop_oneof![Just("x"), Just("y"), Just("z")].prop_map(var),
    ];
    leaf.prop_recursive(
        8,   // 8 levels deep
        256, // Shoot for maximum size of 256 nodes
        10,  // We put up to 10 items per collection
        |inner| {
            prop_oneof![
                proptest::collection::vec(inner.clone(), 1..10).prop_map(add),
                proptest::collection::vec(inner, 1..10).prop_map(mul),
            ]
        },
    )
}

/// Closed expressions only (no variables); handy for properties that want
/// evaluation to be total.
pub fn arb_closed_expr() -> impl Strategy<Value = Expr> {
    let leaf = any::<i8>().prop_map(|x| cst(x as i64));
    leaf.prop_recursive(8, 256, 10, |inner| {
        prop_oneof![
            proptest::collection::vec(inner.clone(), 1..10).prop_map(add),
            proptest::collection::vec(inner, 1..10).prop_map(mul),
        ]
    })
}
