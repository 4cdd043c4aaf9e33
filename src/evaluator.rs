//! The eval/apply engine.
//!
//! An [`Evaluator`] owns everything one interpreter session needs: the frame
//! stack, the evaluation limits and the sink that `print` writes to. Several
//! evaluators can live side by side; none of them touches global state.
//!
//! Evaluation of a form `(head operand...)` first evaluates `head`. A builtin
//! name (or anything bound to one) dispatches through the registry in
//! [`crate::builtinops`]; a [`Procedure`] is applied to the operands; anything
//! else is not applicable. Scoping is dynamic: a procedure body sees whatever
//! frames are live when it runs.

use std::io::{self, Write};
use std::rc::Rc;

use crate::ast::{Procedure, Value, cons, sym};
use crate::builtinops::{Arity, BuiltinOp, OpKind, find_builtin_op};
use crate::stack::ensure_sufficient_stack;
use crate::{Error, MAX_EVAL_DEPTH};

mod environment;

pub use environment::{Environment, GLOBAL_BUCKETS, LOCAL_BUCKETS, Scope, SymbolTable};

/// Limits applied while evaluating
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalConfig {
    /// Maximum nesting of `eval` calls before [`Error::DepthLimitExceeded`]
    pub max_depth: usize,
}

impl Default for EvalConfig {
    fn default() -> Self {
        EvalConfig {
            max_depth: MAX_EVAL_DEPTH,
        }
    }
}

/// A self-contained interpreter session
pub struct Evaluator {
    env: Environment,
    config: EvalConfig,
    output: Box<dyn Write>,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    /// Fresh evaluator printing to stdout
    pub fn new() -> Self {
        Self::with_config(EvalConfig::default())
    }

    pub fn with_config(config: EvalConfig) -> Self {
        Evaluator {
            env: Environment::new(),
            config,
            output: Box::new(io::stdout()),
        }
    }

    /// Redirect the output of `print`
    pub fn with_output(mut self, output: impl Write + 'static) -> Self {
        self.output = Box::new(output);
        self
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    /// Drop every user definition, keeping config and output
    pub fn reset(&mut self) {
        self.env = Environment::new();
    }

    /// Evaluate one expression tree.
    ///
    /// Any local frame entered during evaluation is gone again when this returns,
    /// whether evaluation succeeded or not.
    pub fn eval(&mut self, expr: &Value) -> Result<Value, Error> {
        self.eval_with_depth_tracking(expr, 0)
    }

    /// Apply a procedure (or builtin name) to a list of argument expressions.
    ///
    /// Arguments are evaluated in the current scope before the procedure's frame
    /// is entered. A non-list `args` is treated as a one-element list.
    pub fn apply(&mut self, procedure: &Value, args: &Value) -> Result<Value, Error> {
        let args = as_argument_list(args);
        self.apply_with_depth(procedure, &args, 0)
    }

    /// Parse and evaluate a single expression
    #[cfg(feature = "reader")]
    pub fn eval_str(&mut self, input: &str) -> Result<Value, Error> {
        let expr = crate::reader::parse(input)?;
        self.eval(&expr)
    }

    /// Parse a sequence of expressions and evaluate them in order, stopping at
    /// the first error
    #[cfg(feature = "reader")]
    pub fn eval_all_str(&mut self, input: &str) -> Result<Vec<Value>, Error> {
        crate::reader::parse_all(input)?
            .iter()
            .map(|expr| self.eval(expr))
            .collect()
    }

    /// Evaluate an expression with depth tracking to prevent runaway recursion
    pub(crate) fn eval_with_depth_tracking(
        &mut self,
        expr: &Value,
        depth: usize,
    ) -> Result<Value, Error> {
        if depth >= self.config.max_depth {
            tracing::warn!(max_depth = self.config.max_depth, "evaluation depth limit hit");
            return Err(Error::DepthLimitExceeded(self.config.max_depth));
        }
        ensure_sufficient_stack(|| self.eval_expr(expr, depth))
    }

    fn eval_expr(&mut self, expr: &Value, depth: usize) -> Result<Value, Error> {
        match expr {
            Value::Nil => Err(Error::EmptyEvaluation),

            // Self-evaluating forms
            Value::Integer(_) | Value::Float(_) | Value::Procedure(_) => Ok(expr.clone()),

            // Variable lookup
            Value::Symbol(name) => self.env.lookup(name).cloned(),

            // Call form: evaluate the head, then dispatch on what it produced
            Value::Pair(pair) => {
                let head = self.eval_with_depth_tracking(&pair.head, depth + 1)?;
                self.apply_with_depth(&head, &pair.tail, depth)
            }
        }
    }

    fn apply_with_depth(
        &mut self,
        procedure: &Value,
        operands: &Value,
        depth: usize,
    ) -> Result<Value, Error> {
        match procedure {
            Value::Symbol(name) => match find_builtin_op(name) {
                Some(op) => self.apply_builtin(op, operands, depth),
                None => Err(Error::NotApplicable(format!(
                    "symbol {name} does not name a procedure"
                ))),
            },
            Value::Procedure(proc) => self.apply_procedure(proc, operands, depth),
            // A head that evaluates to () is an empty call, e.g. `((quote ()) 1)`
            Value::Nil => Err(Error::EmptyEvaluation),
            other => Err(Error::NotApplicable(format!(
                "cannot apply a value that is not a function: {other}"
            ))),
        }
    }

    fn apply_builtin(
        &mut self,
        op: &'static BuiltinOp,
        operands: &Value,
        depth: usize,
    ) -> Result<Value, Error> {
        let count = operands.length()?;
        if op.validate_arity(count).is_err() {
            let call = cons(sym(op.name), operands.clone());
            return Err(Error::arity_error_with_expr(op.arity, count, call.to_string()));
        }

        match op.kind {
            OpKind::Function(func) => {
                let args = self.eval_operands(operands, depth)?;
                func(&args)
            }
            OpKind::SpecialForm(special_form) => special_form(self, operands, depth),
        }
    }

    /// Evaluate each element of an operand list, left to right
    fn eval_operands(&mut self, operands: &Value, depth: usize) -> Result<Vec<Value>, Error> {
        operands.length()?;
        operands
            .iter()
            .map(|operand| self.eval_with_depth_tracking(operand, depth + 1))
            .collect()
    }

    #[tracing::instrument(level = "trace", skip(self, procedure, args), fields(args = %args))]
    fn apply_procedure(
        &mut self,
        procedure: &Procedure,
        args: &Value,
        depth: usize,
    ) -> Result<Value, Error> {
        let formals = procedure.formals();

        // Arguments are evaluated in the caller's scope
        let values = match formals {
            Value::Symbol(_) => self.eval_operands(args, depth)?,
            _ => {
                let expected = formals.length()?;
                let got = args.length()?;
                if expected != got {
                    return Err(Error::arity_error(Arity::Exact(expected), got));
                }
                self.eval_operands(args, depth)?
            }
        };

        self.with_frame(|ev| {
            match formals {
                Value::Symbol(rest) => ev.env.define_in_current(rest, Value::list(values))?,
                _ => {
                    for (formal, value) in formals.iter().zip(values) {
                        let name = formal.as_symbol().ok_or_else(|| {
                            Error::TypeError(format!("lambda parameter must be a symbol: {formal}"))
                        })?;
                        ev.env.define_in_current(name, value)?;
                    }
                }
            }

            let mut result = Value::Nil;
            for expr in procedure.body() {
                result = ev.eval_with_depth_tracking(expr, depth + 1)?;
            }
            Ok(result)
        })
    }

    /// Run `f` inside a fresh local frame. The frame is cleared and popped on
    /// every exit path.
    fn with_frame<T>(
        &mut self,
        f: impl FnOnce(&mut Evaluator) -> Result<T, Error>,
    ) -> Result<T, Error> {
        self.env.push_frame();
        let result = f(self);
        self.env.pop_frame();
        result
    }
}

fn as_argument_list(args: &Value) -> Value {
    if args.is_list() {
        args.clone()
    } else {
        Value::list([args.clone()])
    }
}

/// Validate formals and build a procedure value
fn make_procedure(formals: &Value, body: Vec<Value>) -> Result<Value, Error> {
    match formals {
        Value::Symbol(_) => {}
        Value::Nil | Value::Pair(_) => {
            formals.length()?;
            let mut seen: Vec<&str> = Vec::new();
            for formal in formals.iter() {
                let name = formal.as_symbol().ok_or_else(|| {
                    Error::TypeError(format!("lambda parameter must be a symbol: {formal}"))
                })?;
                if seen.contains(&name) {
                    return Err(Error::DuplicateDefinition(name.to_owned()));
                }
                seen.push(name);
            }
        }
        other => {
            return Err(Error::TypeError(format!(
                "lambda formals must be a symbol or a list of symbols: {other}"
            )));
        }
    }
    Ok(Value::Procedure(Rc::new(Procedure::new(formals.clone(), body))))
}

/// Evaluate quote special form
pub(crate) fn eval_quote(
    _ev: &mut Evaluator,
    operands: &Value,
    _depth: usize,
) -> Result<Value, Error> {
    match operands.to_vec()?.as_slice() {
        [expr] => Ok(expr.clone()),
        args => Err(Error::arity_error(Arity::Exact(1), args.len())),
    }
}

/// Evaluate if special form
pub(crate) fn eval_if(
    ev: &mut Evaluator,
    operands: &Value,
    depth: usize,
) -> Result<Value, Error> {
    let args = operands.to_vec()?;
    let (condition_expr, then_expr, else_expr) = match args.as_slice() {
        [c, t] => (c, t, None),
        [c, t, e] => (c, t, Some(e)),
        _ => return Err(Error::arity_error(Arity::Range(2, 3), args.len())),
    };

    // Truth is numeric; a non-number condition is an error, not false
    let condition = ev.eval_with_depth_tracking(condition_expr, depth + 1)?;
    let truth = condition
        .as_double()
        .map_err(|_| Error::TypeError(format!("if condition must be a number, got {condition}")))?;

    if truth != 0.0 {
        ev.eval_with_depth_tracking(then_expr, depth + 1)
    } else if let Some(else_expr) = else_expr {
        ev.eval_with_depth_tracking(else_expr, depth + 1)
    } else {
        Ok(Value::Nil)
    }
}

/// Evaluate define special form
pub(crate) fn eval_define(
    ev: &mut Evaluator,
    operands: &Value,
    depth: usize,
) -> Result<Value, Error> {
    match operands.to_vec()?.as_slice() {
        [Value::Symbol(name), expr] => {
            let value = ev.eval_with_depth_tracking(expr, depth + 1)?;
            tracing::debug!(name = %name, value = %value, frames = ev.env.depth(), "define");
            ev.env.define_in_current(name, value)?;
            Ok(Value::Nil)
        }
        [Value::Nil, _] => Err(Error::TypeError("cannot define ()".to_owned())),
        [other, _] => Err(Error::TypeError(format!(
            "define requires a symbol, got {other}"
        ))),
        args => Err(Error::arity_error(Arity::Exact(2), args.len())),
    }
}

/// Evaluate print special form
pub(crate) fn eval_print(
    ev: &mut Evaluator,
    operands: &Value,
    depth: usize,
) -> Result<Value, Error> {
    match operands.to_vec()?.as_slice() {
        [expr] => {
            let value = ev.eval_with_depth_tracking(expr, depth + 1)?;
            writeln!(ev.output, "{value}")?;
            ev.output.flush()?;
            Ok(Value::Nil)
        }
        args => Err(Error::arity_error(Arity::Exact(1), args.len())),
    }
}

/// Evaluate eval special form: the operand's value is evaluated once more
pub(crate) fn eval_eval(
    ev: &mut Evaluator,
    operands: &Value,
    depth: usize,
) -> Result<Value, Error> {
    match operands.to_vec()?.as_slice() {
        [expr] => {
            let code = ev.eval_with_depth_tracking(expr, depth + 1)?;
            ev.eval_with_depth_tracking(&code, depth + 1)
        }
        args => Err(Error::arity_error(Arity::Exact(1), args.len())),
    }
}

/// Evaluate lambda special form
pub(crate) fn eval_lambda(
    _ev: &mut Evaluator,
    operands: &Value,
    _depth: usize,
) -> Result<Value, Error> {
    match operands.to_vec()?.as_slice() {
        [formals, body @ ..] if !body.is_empty() => make_procedure(formals, body.to_vec()),
        args => Err(Error::arity_error(Arity::AtLeast(2), args.len())),
    }
}

/// Evaluate apply special form: `(apply name args)`
pub(crate) fn eval_apply(
    ev: &mut Evaluator,
    operands: &Value,
    depth: usize,
) -> Result<Value, Error> {
    match operands.to_vec()?.as_slice() {
        [Value::Symbol(name), args_expr] => {
            let procedure = ev.env.lookup(name)?.clone();
            let args = ev.eval_with_depth_tracking(args_expr, depth + 1)?;
            ev.apply_with_depth(&procedure, &as_argument_list(&args), depth)
        }
        [other, _] => Err(Error::NotApplicable(format!(
            "apply requires a procedure name, got {other}"
        ))),
        args => Err(Error::arity_error(Arity::Exact(2), args.len())),
    }
}

/// Evaluate let special form: `(let ((name expr) ...) body...)`
pub(crate) fn eval_let(
    ev: &mut Evaluator,
    operands: &Value,
    depth: usize,
) -> Result<Value, Error> {
    let args = operands.to_vec()?;
    let (bindings, body) = match args.as_slice() {
        [bindings, body @ ..] if !body.is_empty() => (bindings, body),
        _ => return Err(Error::arity_error(Arity::AtLeast(2), args.len())),
    };

    if !bindings.is_list() {
        return Err(Error::TypeError(format!(
            "let bindings must be a list, got {bindings}"
        )));
    }

    let mut names = Vec::new();
    let mut value_exprs = Vec::new();
    for binding in bindings.to_vec()? {
        match binding.to_vec().as_deref() {
            Ok([name @ Value::Symbol(_), expr]) => {
                names.push(name.clone());
                value_exprs.push(expr.clone());
            }
            _ => {
                return Err(Error::TypeError(format!(
                    "let binding must be (name expression), got {binding}"
                )));
            }
        }
    }

    let procedure = make_procedure(&Value::list(names), body.to_vec())?;
    ev.apply_with_depth(&procedure, &Value::list(value_exprs), depth)
}
