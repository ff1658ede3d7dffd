use crate::LispError;
use crate::ast::{Atom, Expr, Procedure};
use crate::builtinops::find_primitive;
use crate::list;
use log::{debug, trace};
use std::sync::Arc;

/// Environment for atom bindings
///
/// An association list of `(name value)` entries, searched front to back. Extending an
/// environment conses new entries onto the front and returns a new value; the original
/// is left as it was, so nested and concurrent evaluations never see each other's
/// bindings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    bindings: Expr,
}

impl Default for Environment {
    fn default() -> Self {
        Environment::new()
    }
}

impl Environment {
    /// Create an environment where `t` and `nil` evaluate to themselves
    pub fn new() -> Self {
        Environment::empty()
            .bind(Atom::nil(), Expr::nil())
            .bind(Atom::t(), Expr::t())
    }

    /// Create an environment with no bindings at all
    pub fn empty() -> Self {
        Environment {
            bindings: Expr::nil(),
        }
    }

    pub fn lookup(&self, name: &Atom) -> Result<Expr, LispError> {
        list::assoc(name, &self.bindings)
    }

    /// Return a new environment with `name` bound in front of the existing bindings
    pub fn bind(&self, name: Atom, value: Expr) -> Self {
        let entry = Expr::list([Expr::Atom(name), value]);
        Environment {
            bindings: Expr::cons(entry, self.bindings.clone()),
        }
    }

    /// Return a new environment with a block of `(name value)` entries spliced on front
    pub fn extend(&self, entries: &Expr) -> Result<Self, LispError> {
        Ok(Environment {
            bindings: list::concat(entries, &self.bindings)?,
        })
    }

    /// Iterate the `(name value)` entries, front to back
    pub fn entries(&self) -> list::ListIter<'_> {
        list::iter(&self.bindings)
    }
}

/// Evaluate an S-expression in the given environment
pub fn eval(expr: &Expr, env: &Environment) -> Result<Expr, LispError> {
    eval_expr(expr, env).map_err(|err| add_context(err, expr))
}

/// Helper function to add expression context to errors
fn add_context(error: LispError, expr: &Expr) -> LispError {
    let context = format!("while evaluating: {}", expr);
    match error {
        LispError::EvalError(msg) => {
            LispError::EvalError(format!("{}\n  Context: {}", msg, context))
        }
        LispError::TypeError(msg) => {
            LispError::TypeError(format!("{}\n  Context: {}", msg, context))
        }
        _ => error, // Unbound atoms and arity errors carry their own context
    }
}

/// The recursive evaluator, without the top-level error context
pub(crate) fn eval_expr(expr: &Expr, env: &Environment) -> Result<Expr, LispError> {
    match expr {
        Expr::Atom(atom) => env.lookup(atom),
        Expr::Procedure(_) => Ok(expr.clone()),
        Expr::Pair(head, tail) => match head.as_ref() {
            Expr::Atom(op) => eval_application(op, tail, env),
            Expr::Pair(form, definition) => apply(form, definition, tail, env),
            Expr::Procedure(procedure) => apply_procedure(procedure, tail, env),
        },
    }
}

/// Evaluate every element of an argument list, left to right
pub fn evlis(args: &Expr, env: &Environment) -> Result<Expr, LispError> {
    let mut values = Vec::new();
    for arg in list::iter(args) {
        values.push(eval_expr(arg?, env)?);
    }
    Ok(Expr::list(values))
}

/// Evaluate a form whose head is an atom: a primitive, a bare `lambda` or `label`
/// form, or a bound procedure
fn eval_application(op: &Atom, tail: &Expr, env: &Environment) -> Result<Expr, LispError> {
    if let Some(primitive) = find_primitive(op.as_str()) {
        trace!("primitive {}", primitive.name);
        return primitive.apply(tail, env);
    }

    match op.as_str() {
        "lambda" => return make_procedure(tail, env).map(|p| Expr::Procedure(Arc::new(p))),
        "label" => {
            let (_, procedure, env) = label_binding(tail, env)?;
            return eval_expr(procedure, &env);
        }
        _ => {}
    }

    let procedure = env.lookup(op)?;
    if let Expr::Atom(value) = &procedure {
        return Err(LispError::TypeError(format!(
            "not a procedure: {} (bound to {})",
            op, value
        )));
    }
    trace!("applying {} as {}", op, procedure);
    eval_expr(&Expr::cons(procedure, tail.clone()), env)
}

/// Apply a `label` or `lambda` form to an argument list
fn apply(
    form: &Expr,
    definition: &Expr,
    args: &Expr,
    env: &Environment,
) -> Result<Expr, LispError> {
    match form.as_atom().map(Atom::as_str) {
        Some("label") => apply_label(definition, args, env),
        Some("lambda") => apply_procedure(&make_procedure(definition, env)?, args, env),
        _ => Err(LispError::EvalError(format!(
            "could not evaluate expression: {}",
            Expr::cons(Expr::cons(form.clone(), definition.clone()), args.clone())
        ))),
    }
}

/// Split `(name.procedure)` and bind `name` to the unevaluated procedure form
///
/// Calls to `name` from inside the procedure look the form up again and
/// re-dispatch it, which is what makes recursion work.
fn label_binding<'a>(
    definition: &'a Expr,
    env: &Environment,
) -> Result<(Atom, &'a Expr, Environment), LispError> {
    let (name, procedure) = definition.as_pair().ok_or_else(|| {
        LispError::TypeError(format!("label requires (name.procedure), got {}", definition))
    })?;
    let name = name.as_atom().ok_or_else(|| {
        LispError::TypeError(format!("cannot use non-atom as label: {}", name))
    })?;

    debug!("label {} bound to {}", name, procedure);
    let env = env.bind(name.clone(), procedure.clone());
    Ok((name.clone(), procedure, env))
}

/// `((label.(name.procedure)).args)`: evaluate `(name.args)` with `name` bound
fn apply_label(definition: &Expr, args: &Expr, env: &Environment) -> Result<Expr, LispError> {
    let (name, _, env) = label_binding(definition, env)?;
    eval_expr(&Expr::cons(Expr::Atom(name), args.clone()), &env)
}

/// Build a procedure value from `(parameters.body)`, capturing `env`
fn make_procedure(definition: &Expr, env: &Environment) -> Result<Procedure, LispError> {
    let (params, body) = definition.as_pair().ok_or_else(|| {
        LispError::TypeError(format!(
            "lambda requires (parameters.body), got {}",
            definition
        ))
    })?;
    for param in list::iter(params) {
        let param = param?;
        if param.as_atom().is_none() {
            return Err(LispError::TypeError(format!(
                "lambda parameter is not an atom: {}",
                param
            )));
        }
    }

    Ok(Procedure {
        params: params.clone(),
        body: body.clone(),
        env: env.clone(),
    })
}

/// Evaluate every argument once in the caller's environment, bind the results to the
/// parameters positionally, and evaluate the body in the procedure's own environment
/// with those bindings in front.
fn apply_procedure(
    procedure: &Procedure,
    args: &Expr,
    env: &Environment,
) -> Result<Expr, LispError> {
    let values = evlis(args, env)?;
    let bindings = list::zip(&procedure.params, &values)?;
    debug!("lambda bindings {}", bindings);
    let body_env = procedure.env.extend(&bindings)?;
    eval_expr(&procedure.body, &body_env)
}
