use std::collections::{BTreeSet, HashMap};

use memofold::Collapsible;
use thiserror::Error;

use crate::expr::{Expr, ExprFrame, OpTag};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExprError {
    /// A variable leaf with no binding in the environment. Recoverable by
    /// the caller, eg by reporting dependencies instead (see
    /// [`eval_or_missing`]).
    #[error("variable '{name}' has no binding")]
    UnboundVariable { name: String },
    /// An operator node with no operands. Propagated rather than papered
    /// over with an identity element, to avoid silently-partial results.
    #[error("operator '{op}' applied to no operands")]
    MalformedOp { op: &'static str },
}

// all arithmetic is wrapping so arbitrarily deep generated products stay total
fn apply(tag: OpTag, args: &[i64]) -> i64 {
    match tag {
        OpTag::Add => args.iter().fold(0i64, |acc, x| acc.wrapping_add(*x)),
        OpTag::Mul => args.iter().fold(1i64, |acc, x| acc.wrapping_mul(*x)),
    }
}

/// Print one layer in s-expression form.
pub fn print_layer(frame: ExprFrame<String>) -> String {
    match frame {
        ExprFrame::Const(x) => x.to_string(),
        ExprFrame::Var(name) => name,
        ExprFrame::Op(tag, args) => format!("({} {})", tag.symbol(), args.join(" ")),
    }
}

pub fn print(expr: &Expr) -> String {
    expr.collapse_frames(print_layer)
}

/// Evaluate one layer against an environment.
pub fn eval_layer(env: &HashMap<String, i64>, frame: ExprFrame<i64>) -> Result<i64, ExprError> {
    match frame {
        ExprFrame::Const(x) => Ok(x),
        ExprFrame::Var(name) => env
            .get(&name)
            .copied()
            .ok_or(ExprError::UnboundVariable { name }),
        ExprFrame::Op(tag, args) => {
            if args.is_empty() {
                return Err(ExprError::MalformedOp { op: tag.symbol() });
            }
            Ok(apply(tag, &args))
        }
    }
}

pub fn eval(expr: &Expr, env: &HashMap<String, i64>) -> Result<i64, ExprError> {
    expr.try_collapse_frames(|frame| eval_layer(env, frame))
}

/// Direct recursive evaluation, used as the reference point for the fold
/// based evaluators.
pub fn naive_eval(expr: &Expr, env: &HashMap<String, i64>) -> Result<i64, ExprError> {
    match expr {
        Expr::Const(x) => Ok(*x),
        Expr::Var(name) => env
            .get(name)
            .copied()
            .ok_or_else(|| ExprError::UnboundVariable { name: name.clone() }),
        Expr::Op(tag, args) => {
            if args.is_empty() {
                return Err(ExprError::MalformedOp { op: tag.symbol() });
            }
            let mut vals = Vec::with_capacity(args.len());
            for arg in args {
                vals.push(naive_eval(arg, env)?);
            }
            Ok(apply(*tag, &vals))
        }
    }
}

/// The set of variable names an expression depends on.
pub fn dependencies(expr: &Expr) -> BTreeSet<String> {
    expr.collapse_frames(|frame| match frame {
        ExprFrame::Const(_) => BTreeSet::new(),
        ExprFrame::Var(name) => BTreeSet::from([name]),
        ExprFrame::Op(_, args) => args.into_iter().flatten().collect(),
    })
}

/// Evaluate, or report every unbound variable the result depends on, in a
/// single traversal. The outer error is reserved for malformed trees, which
/// stay fatal.
pub fn eval_or_missing(
    expr: &Expr,
    env: &HashMap<String, i64>,
) -> Result<Result<i64, BTreeSet<String>>, ExprError> {
    expr.try_collapse_frames(
        |frame: ExprFrame<Result<i64, BTreeSet<String>>>| match frame {
            ExprFrame::Const(x) => Ok(Ok(x)),
            ExprFrame::Var(name) => Ok(match env.get(&name) {
                Some(v) => Ok(*v),
                None => Err(BTreeSet::from([name])),
            }),
            ExprFrame::Op(tag, args) => {
                if args.is_empty() {
                    return Err(ExprError::MalformedOp { op: tag.symbol() });
                }
                let mut missing = BTreeSet::new();
                let mut vals = Vec::with_capacity(args.len());
                for arg in args {
                    match arg {
                        Ok(v) => vals.push(v),
                        Err(names) => missing.extend(names),
                    }
                }
                Ok(if missing.is_empty() {
                    Ok(apply(tag, &vals))
                } else {
                    Err(missing)
                })
            }
        },
    )
}

/// Infix printer, written as a paramorphism: an operand is parenthesized
/// only when it is itself an addition directly under a multiplication, which
/// needs the operand's original shape and not just its rendering.
pub fn print_infix(expr: &Expr) -> String {
    expr.collapse_frames_with_context(|frame: ExprFrame<(&Expr, String)>| match frame {
        ExprFrame::Const(x) => x.to_string(),
        ExprFrame::Var(name) => name,
        ExprFrame::Op(tag, args) => {
            let rendered: Vec<String> = args
                .into_iter()
                .map(|(orig, rendered)| {
                    if tag == OpTag::Mul && matches!(orig, Expr::Op(OpTag::Add, _)) {
                        format!("({rendered})")
                    } else {
                        rendered
                    }
                })
                .collect();
            rendered.join(&format!(" {} ", tag.symbol()))
        }
    })
}
