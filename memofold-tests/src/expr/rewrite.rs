use memofold::{rewrite, Expandable, Fused};

use crate::expr::{Expr, ExprFrame, OpTag};

/// Replaces additions whose operands are all constants with their sum.
pub fn fold_constant_adds(frame: ExprFrame<Expr>) -> Expr {
    match frame {
        ExprFrame::Op(OpTag::Add, args) => {
            let consts: Option<Vec<i64>> = args
                .iter()
                .map(|arg| match arg {
                    Expr::Const(x) => Some(*x),
                    _ => None,
                })
                .collect();
            match consts {
                Some(xs) if !xs.is_empty() => {
                    Expr::Const(xs.iter().fold(0i64, |acc, x| acc.wrapping_add(*x)))
                }
                _ => Expr::Op(OpTag::Add, args),
            }
        }
        other => Expr::from_frame(other),
    }
}

/// Short-circuits any multiplication with a literal zero operand to zero.
pub fn shortcircuit_zero_muls(frame: ExprFrame<Expr>) -> Expr {
    match frame {
        ExprFrame::Op(OpTag::Mul, args) if args.iter().any(|arg| *arg == Expr::Const(0)) => {
            Expr::Const(0)
        }
        other => Expr::from_frame(other),
    }
}

/// Splices the operands of additions directly nested in additions into the
/// outer node: `(+ a (+ b c))` becomes `(+ a b c)`.
pub fn flatten_nested_adds(frame: ExprFrame<Expr>) -> Expr {
    match frame {
        ExprFrame::Op(OpTag::Add, args) => {
            let mut flat = Vec::with_capacity(args.len());
            for arg in args {
                match arg {
                    Expr::Op(OpTag::Add, inner) => flat.extend(inner),
                    other => flat.push(other),
                }
            }
            Expr::Op(OpTag::Add, flat)
        }
        other => Expr::from_frame(other),
    }
}

/// Constant-add folding and zero-mul short-circuiting, fused into one
/// bottom-up traversal.
///
/// These two passes feed each other: the add folder manufactures constants
/// the mul pass can short-circuit on, and vice versa. Fusing interleaves
/// them at every node, so the fused result can be *more* reduced than the
/// two passes run as separate whole-tree traversals; what is preserved
/// either way is the meaning of the tree. Passes with disjoint triggers
/// (see `flatten_nested_adds` vs `shortcircuit_zero_muls`) produce
/// identical trees fused or sequential.
pub fn optimize(expr: Expr) -> Expr {
    let mut fused = Fused::new()
        .then(fold_constant_adds)
        .then(shortcircuit_zero_muls);
    rewrite(expr, &mut fused)
}
