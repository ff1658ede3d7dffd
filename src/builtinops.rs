//! Built-in primitive registry.
//!
//! The seven primitives of the language are defined once in a static table and looked
//! up by name. The table is immutable, so any number of evaluations can share it.
//!
//! ## Argument Convention
//!
//! Every primitive receives the unevaluated tail of its form and decides for itself what
//! to evaluate:
//!
//! ```text
//! (quote.X)            ; X itself, unevaluated
//! (atom.X)             ; X is the single argument
//! (eq.(X.Y))           ; X and Y are the two arguments
//! (cond.(C1.(C2.nil))) ; clause list, each clause (predicate.value)
//! ```
//!
//! ## Adding New Primitives
//!
//! 1. **Implement the function** following the signature
//!    `fn(tail: &Expr, env: &Environment) -> Result<Expr, LispError>`
//! 2. **Add to PRIMITIVES** with its name
//! 3. **Add tests** covering the error cases as well as the happy path

use crate::LispError;
use crate::ast::Expr;
use crate::evaluator::{Environment, eval_expr};
use crate::list;
use std::collections::HashMap;
use std::sync::LazyLock;

pub type PrimitiveFn = fn(&Expr, &Environment) -> Result<Expr, LispError>;

/// Definition of a built-in primitive
#[derive(Debug, Clone)]
pub struct Primitive {
    pub name: &'static str,
    pub func: PrimitiveFn,
}

impl Primitive {
    /// Run the primitive on the unevaluated tail of its form
    pub fn apply(&self, tail: &Expr, env: &Environment) -> Result<Expr, LispError> {
        (self.func)(tail, env)
    }
}

/// Split a binary primitive's tail into its two argument expressions
fn arguments<'a>(name: &str, tail: &'a Expr) -> Result<(&'a Expr, &'a Expr), LispError> {
    tail.as_pair().ok_or_else(|| {
        LispError::TypeError(format!("{} expects a pair of arguments, got {}", name, tail))
    })
}

pub fn prim_quote(tail: &Expr, _env: &Environment) -> Result<Expr, LispError> {
    Ok(tail.clone())
}

pub fn prim_atom(tail: &Expr, env: &Environment) -> Result<Expr, LispError> {
    let value = eval_expr(tail, env)?;
    Ok(Expr::truth(value.is_atom()))
}

/// Symbol equality: two atoms with the same name. Pairs are never `eq`, not even to
/// a structurally identical pair.
pub fn prim_eq(tail: &Expr, env: &Environment) -> Result<Expr, LispError> {
    let (x, y) = arguments("eq", tail)?;
    let x = eval_expr(x, env)?;
    let y = eval_expr(y, env)?;
    let same = match (x.as_atom(), y.as_atom()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    };
    Ok(Expr::truth(same))
}

pub fn prim_car(tail: &Expr, env: &Environment) -> Result<Expr, LispError> {
    eval_expr(tail, env)?.car().cloned()
}

pub fn prim_cdr(tail: &Expr, env: &Environment) -> Result<Expr, LispError> {
    eval_expr(tail, env)?.cdr().cloned()
}

pub fn prim_cons(tail: &Expr, env: &Environment) -> Result<Expr, LispError> {
    let (head, rest) = arguments("cons", tail)?;
    Ok(Expr::cons(eval_expr(head, env)?, eval_expr(rest, env)?))
}

/// Return the value of the first clause whose predicate is not `nil`
///
/// Clauses are tried in order and only the winning clause's value is evaluated.
/// Running out of clauses gives `nil`.
pub fn prim_cond(tail: &Expr, env: &Environment) -> Result<Expr, LispError> {
    for clause in list::iter(tail) {
        let clause = clause?;
        let (predicate, value) = clause.as_pair().ok_or_else(|| {
            LispError::TypeError(format!("cond clause is not a pair: {}", clause))
        })?;
        if !eval_expr(predicate, env)?.is_nil() {
            return eval_expr(value, env);
        }
    }
    Ok(Expr::nil())
}

/// Global registry of all primitives as a simple array
static PRIMITIVES: &[Primitive] = &[
    // The only primitive that suppresses evaluation
    Primitive {
        name: "quote",
        func: prim_quote,
    },
    // Predicates
    Primitive {
        name: "atom",
        func: prim_atom,
    },
    Primitive {
        name: "eq",
        func: prim_eq,
    },
    // Pair operations
    Primitive {
        name: "car",
        func: prim_car,
    },
    Primitive {
        name: "cdr",
        func: prim_cdr,
    },
    Primitive {
        name: "cons",
        func: prim_cons,
    },
    // Control flow
    Primitive {
        name: "cond",
        func: prim_cond,
    },
];

/// Lazy static map from name to Primitive (private - use find_primitive)
static PRIMITIVE_TABLE: LazyLock<HashMap<&'static str, &'static Primitive>> =
    LazyLock::new(|| PRIMITIVES.iter().map(|op| (op.name, op)).collect());

/// Get all primitives
pub fn primitives() -> &'static [Primitive] {
    PRIMITIVES
}

/// Find a primitive by the spelling of its atom
pub fn find_primitive(name: &str) -> Option<&'static Primitive> {
    PRIMITIVE_TABLE.get(name).copied()
}
