//! Built-in operations registry.
//!
//! Every name that the global frame binds at start-up is described here by a
//! [`BuiltinOp`]: its name, its arity and how it is implemented.
//!
//! ```scheme
//! (+ 1 2 3)          ; arithmetic
//! (car (quote (a)))  ; list access
//! (if (< 1 2) 10 20) ; special form
//! ```
//!
//! ## Functions vs Special Forms
//!
//! - **Functions**: every operand is evaluated left to right before the
//!   implementation sees the values (e.g. `+`, `cons`, `not`)
//! - **Special Forms**: receive the unevaluated operand list together with the
//!   evaluator and control evaluation themselves (e.g. `if`, `quote`, `define`)
//!
//! Arity is validated by the evaluator before either kind is invoked, so the
//! implementations below may rely on the operand count they declare.
//!
//! ## Numeric Tower
//!
//! Arithmetic works in exact `Integer` arithmetic unless some operand is a
//! `Float`, in which case every operand is widened and the result is a `Float`.
//! Integer overflow is reported as [`Error::Overflow`] and an exact zero divisor
//! is [`Error::DivideByZero`] in both modes.

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use crate::Error;
use crate::ast::{IntegerType, Value, cons};
use crate::evaluator::{
    Evaluator, eval_apply, eval_define, eval_eval, eval_if, eval_lambda, eval_let, eval_print,
    eval_quote,
};

/// Accepted operand counts of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly this many operands
    Exact(usize),
    /// This many operands or more
    AtLeast(usize),
    /// Inclusive range of operand counts
    Range(usize, usize),
    /// Any number of operands, including none
    Any,
}

impl Arity {
    /// Check an operand count against this arity
    pub fn validate(&self, got: usize) -> Result<(), Error> {
        let accepted = match *self {
            Arity::Exact(n) => got == n,
            Arity::AtLeast(n) => got >= n,
            Arity::Range(min, max) => (min..=max).contains(&got),
            Arity::Any => true,
        };
        if accepted {
            Ok(())
        } else {
            Err(Error::arity_error(*self, got))
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exact(n) => write!(f, "{n}"),
            Arity::AtLeast(n) => write!(f, "at least {n}"),
            Arity::Range(min, max) => write!(f, "{min} to {max}"),
            Arity::Any => write!(f, "any number of"),
        }
    }
}

/// Eager builtin over evaluated operands
pub type FunctionImpl = fn(&[Value]) -> Result<Value, Error>;

/// Special form over the unevaluated operand list and the current depth
pub type SpecialFormImpl = fn(&mut Evaluator, &Value, usize) -> Result<Value, Error>;

/// Represents the implementation of a built-in operation (function or special form)
#[derive(Clone, Copy)]
pub enum OpKind {
    /// Regular function that takes evaluated operands and returns a value
    Function(FunctionImpl),
    /// Special form that receives the evaluator, its unevaluated operands and the
    /// current evaluation depth
    SpecialForm(SpecialFormImpl),
}

impl fmt::Debug for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpKind::Function(_) => write!(f, "Function(<fn>)"),
            OpKind::SpecialForm(_) => write!(f, "SpecialForm(<fn>)"),
        }
    }
}

/// Definition of a built-in operation
#[derive(Debug, Clone)]
pub struct BuiltinOp {
    /// The name bound in the global frame
    pub name: &'static str,
    /// The implementation of this operation (function or special form)
    pub kind: OpKind,
    /// Expected number of operands
    pub arity: Arity,
}

impl PartialEq for BuiltinOp {
    fn eq(&self, other: &Self) -> bool {
        // Names uniquely identify operations
        self.name == other.name
    }
}

impl BuiltinOp {
    pub fn is_special_form(&self) -> bool {
        matches!(self.kind, OpKind::SpecialForm(_))
    }

    /// Check if the given number of operands is valid for this operation
    pub fn validate_arity(&self, operand_count: usize) -> Result<(), Error> {
        self.arity.validate(operand_count)
    }
}

//
// Numeric helpers
//

/// Operands of an arithmetic builtin after applying the coercion rule
enum Operands {
    Integers(Vec<IntegerType>),
    Floats(Vec<f64>),
}

fn numeric_operands(op: &str, args: &[Value]) -> Result<Operands, Error> {
    let mut any_float = false;
    for arg in args {
        match arg {
            Value::Integer(_) => {}
            Value::Float(_) => any_float = true,
            other => {
                return Err(Error::TypeError(format!(
                    "{op} requires numeric operands, got {other}"
                )));
            }
        }
    }

    if any_float {
        args.iter()
            .map(Value::as_double)
            .collect::<Result<_, _>>()
            .map(Operands::Floats)
    } else {
        Ok(Operands::Integers(
            args.iter()
                .filter_map(|arg| match arg {
                    Value::Integer(n) => Some(*n),
                    _ => None,
                })
                .collect(),
        ))
    }
}

fn overflow(op: &str) -> Error {
    Error::Overflow(format!("integer overflow in {op}"))
}

/// Convert an already rounded double to an exact integer
fn float_to_integer(op: &str, x: f64) -> Result<Value, Error> {
    // 2^63 is exactly representable; anything at or above it does not fit
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if x.is_finite() && (-LIMIT..LIMIT).contains(&x) {
        Ok(Value::Integer(x as IntegerType))
    } else {
        Err(Error::Overflow(format!(
            "{op}: {} does not fit in an integer",
            Value::Float(x)
        )))
    }
}

fn boolean(b: bool) -> Value {
    Value::Integer(IntegerType::from(b))
}

//
// Builtin Function Implementations
//

fn builtin_add(args: &[Value]) -> Result<Value, Error> {
    match numeric_operands("+", args)? {
        Operands::Integers(ns) => ns
            .into_iter()
            .try_fold(0, IntegerType::checked_add)
            .map(Value::Integer)
            .ok_or_else(|| overflow("+")),
        Operands::Floats(xs) => Ok(Value::Float(xs.into_iter().sum())),
    }
}

fn builtin_sub(args: &[Value]) -> Result<Value, Error> {
    match numeric_operands("-", args)? {
        Operands::Integers(ns) => match ns.split_first() {
            Some((first, [])) => first.checked_neg(),
            Some((first, rest)) => rest.iter().try_fold(*first, |acc, n| acc.checked_sub(*n)),
            None => return Err(Error::arity_error(Arity::AtLeast(1), 0)),
        }
        .map(Value::Integer)
        .ok_or_else(|| overflow("-")),
        Operands::Floats(xs) => match xs.split_first() {
            Some((first, [])) => Ok(Value::Float(-first)),
            Some((first, rest)) => Ok(Value::Float(rest.iter().fold(*first, |acc, x| acc - x))),
            None => Err(Error::arity_error(Arity::AtLeast(1), 0)),
        },
    }
}

fn builtin_mul(args: &[Value]) -> Result<Value, Error> {
    match numeric_operands("*", args)? {
        Operands::Integers(ns) => ns
            .into_iter()
            .try_fold(1, IntegerType::checked_mul)
            .map(Value::Integer)
            .ok_or_else(|| overflow("*")),
        Operands::Floats(xs) => Ok(Value::Float(xs.into_iter().product())),
    }
}

fn builtin_div(args: &[Value]) -> Result<Value, Error> {
    let operands = numeric_operands("/", args)?;

    // A lone operand is the divisor of 1; otherwise all but the first divide
    let divisors = if args.len() == 1 { args } else { &args[1..] };
    if divisors.iter().any(|d| matches!(d, Value::Integer(0))) {
        return Err(Error::DivideByZero);
    }

    match operands {
        // Exact quotients truncate toward zero
        Operands::Integers(ns) => match ns.split_first() {
            Some((first, [])) => IntegerType::checked_div(1, *first),
            Some((first, rest)) => rest.iter().try_fold(*first, |acc, n| acc.checked_div(*n)),
            None => return Err(Error::arity_error(Arity::AtLeast(1), 0)),
        }
        .map(Value::Integer)
        .ok_or_else(|| overflow("/")),
        Operands::Floats(xs) => match xs.split_first() {
            Some((first, [])) => Ok(Value::Float(1.0 / first)),
            Some((first, rest)) => Ok(Value::Float(rest.iter().fold(*first, |acc, x| acc / x))),
            None => Err(Error::arity_error(Arity::AtLeast(1), 0)),
        },
    }
}

macro_rules! rounding_op {
    ($name:ident, $op_name:expr, $round:ident) => {
        fn $name(args: &[Value]) -> Result<Value, Error> {
            match args {
                [Value::Integer(n)] => Ok(Value::Integer(*n)),
                [Value::Float(x)] => float_to_integer($op_name, x.$round()),
                [other] => Err(Error::TypeError(format!(
                    concat!($op_name, " requires a number, got {}"),
                    other
                ))),
                _ => Err(Error::arity_error(Arity::Exact(1), args.len())),
            }
        }
    };
}

rounding_op!(builtin_ceiling, "ceiling", ceil);
rounding_op!(builtin_floor, "floor", floor);

macro_rules! type_predicate {
    ($name:ident, $test:ident) => {
        fn $name(args: &[Value]) -> Result<Value, Error> {
            match args {
                [value] => Ok(boolean(value.$test())),
                _ => Err(Error::arity_error(Arity::Exact(1), args.len())),
            }
        }
    };
}

type_predicate!(builtin_nullp, is_nil);
type_predicate!(builtin_symbolp, is_symbol);
type_predicate!(builtin_intp, is_integer);
type_predicate!(builtin_doublep, is_float);
type_predicate!(builtin_listp, is_list);
type_predicate!(builtin_procedurep, is_procedure);

fn builtin_cons(args: &[Value]) -> Result<Value, Error> {
    match args {
        [head, tail] => Ok(cons(head.clone(), tail.clone())),
        _ => Err(Error::arity_error(Arity::Exact(2), args.len())),
    }
}

fn builtin_car(args: &[Value]) -> Result<Value, Error> {
    match args {
        [pair] => pair.car().cloned(),
        _ => Err(Error::arity_error(Arity::Exact(1), args.len())),
    }
}

fn builtin_cdr(args: &[Value]) -> Result<Value, Error> {
    match args {
        [pair] => pair.cdr().cloned(),
        _ => Err(Error::arity_error(Arity::Exact(1), args.len())),
    }
}

/// Strict `<` between two comparable operands
fn less_than(a: &Value, b: &Value) -> Result<bool, Error> {
    match (a, b) {
        (Value::Integer(x), Value::Integer(y)) => Ok(x < y),
        (Value::Symbol(x), Value::Symbol(y)) => Ok(x < y),
        (x, y) if x.is_number() && y.is_number() => Ok(x.as_double()? < y.as_double()?),
        (x, y) => Err(Error::TypeError(format!(
            "< can only compare values of the same kind, got {x} and {y}"
        ))),
    }
}

fn builtin_less(args: &[Value]) -> Result<Value, Error> {
    if let Some(bad) = args.iter().find(|v| !(v.is_number() || v.is_symbol())) {
        return Err(Error::TypeError(format!(
            "< requires numbers or symbols, got {bad}"
        )));
    }

    // Every adjacent pair is checked, even after the chain is known to fail
    let mut increasing = true;
    for pair in args.windows(2) {
        if !less_than(&pair[0], &pair[1])? {
            increasing = false;
        }
    }
    Ok(boolean(increasing))
}

fn builtin_not(args: &[Value]) -> Result<Value, Error> {
    match args {
        [Value::Integer(n)] => Ok(boolean(*n == 0)),
        [Value::Float(x)] => Ok(boolean(*x == 0.0)),
        [_] => Ok(boolean(false)),
        _ => Err(Error::arity_error(Arity::Exact(1), args.len())),
    }
}

/// The registry, in the order the names are bound in the global frame
static BUILTIN_OPS: LazyLock<Vec<BuiltinOp>> = LazyLock::new(|| {
    fn function(name: &'static str, f: FunctionImpl, arity: Arity) -> BuiltinOp {
        BuiltinOp {
            name,
            kind: OpKind::Function(f),
            arity,
        }
    }

    fn special_form(name: &'static str, f: SpecialFormImpl, arity: Arity) -> BuiltinOp {
        BuiltinOp {
            name,
            kind: OpKind::SpecialForm(f),
            arity,
        }
    }

    vec![
        function("+", builtin_add, Arity::Any),
        function("-", builtin_sub, Arity::AtLeast(1)),
        function("*", builtin_mul, Arity::Any),
        function("/", builtin_div, Arity::AtLeast(1)),
        function("ceiling", builtin_ceiling, Arity::Exact(1)),
        function("floor", builtin_floor, Arity::Exact(1)),
        special_form("quote", eval_quote, Arity::Exact(1)),
        special_form("if", eval_if, Arity::Range(2, 3)),
        function("cons", builtin_cons, Arity::Exact(2)),
        function("car", builtin_car, Arity::Exact(1)),
        function("cdr", builtin_cdr, Arity::Exact(1)),
        function("nullp", builtin_nullp, Arity::Exact(1)),
        function("symbolp", builtin_symbolp, Arity::Exact(1)),
        function("intp", builtin_intp, Arity::Exact(1)),
        function("doublep", builtin_doublep, Arity::Exact(1)),
        function("listp", builtin_listp, Arity::Exact(1)),
        function("procedurep", builtin_procedurep, Arity::Exact(1)),
        special_form("define", eval_define, Arity::Exact(2)),
        function("<", builtin_less, Arity::Any),
        function("not", builtin_not, Arity::Exact(1)),
        special_form("print", eval_print, Arity::Exact(1)),
        special_form("eval", eval_eval, Arity::Exact(1)),
        special_form("lambda", eval_lambda, Arity::AtLeast(2)),
        special_form("apply", eval_apply, Arity::Exact(2)),
        special_form("let", eval_let, Arity::AtLeast(2)),
    ]
});

/// Lazy static map from name to BuiltinOp (private - use find_builtin_op)
static BUILTIN_INDEX: LazyLock<HashMap<&'static str, &'static BuiltinOp>> = LazyLock::new(|| {
    let ops: &'static [BuiltinOp] = BUILTIN_OPS.as_slice();
    ops.iter().map(|op| (op.name, op)).collect()
});

/// All builtin operations in registry order
pub fn get_builtin_ops() -> &'static [BuiltinOp] {
    BUILTIN_OPS.as_slice()
}

/// Find a builtin operation by name
pub fn find_builtin_op(name: &str) -> Option<&'static BuiltinOp> {
    BUILTIN_INDEX.get(name).copied()
}

/// Names bound in a fresh global frame
pub fn builtin_names() -> impl Iterator<Item = &'static str> {
    get_builtin_ops().iter().map(|op| op.name)
}

#[cfg(test)]
#[expect(clippy::unwrap_used)] // test code OK
mod tests {
    use super::*;
    use crate::ast::{Procedure, nil, sym, val};
    use pretty_assertions::assert_eq;

    /// Micro-helper for success cases in comprehensive tests
    fn success<T: Into<Value>>(value: T) -> Option<Value> {
        Some(val(value))
    }

    /// Invoke an eager builtin through the registry
    fn call_builtin(name: &str, args: &[Value]) -> Result<Value, Error> {
        let op = find_builtin_op(name).unwrap();
        op.validate_arity(args.len())?;
        match op.kind {
            OpKind::Function(func) => func(args),
            OpKind::SpecialForm(_) => {
                panic!("expected function builtin in tests, got special form: {name}")
            }
        }
    }

    #[test]
    fn test_builtin_ops_registry() {
        let names: Vec<&str> = builtin_names().collect();
        assert_eq!(
            names,
            vec![
                "+", "-", "*", "/", "ceiling", "floor", "quote", "if", "cons", "car", "cdr",
                "nullp", "symbolp", "intp", "doublep", "listp", "procedurep", "define", "<",
                "not", "print", "eval", "lambda", "apply", "let",
            ]
        );

        let not_op = find_builtin_op("not").unwrap();
        assert_eq!(not_op.arity, Arity::Exact(1));
        assert!(!not_op.is_special_form());

        let if_op = find_builtin_op("if").unwrap();
        assert!(if_op.is_special_form());
        assert_eq!(if_op.arity, Arity::Range(2, 3));

        for name in ["quote", "define", "print", "eval", "lambda", "apply", "let"] {
            assert!(find_builtin_op(name).unwrap().is_special_form(), "{name}");
        }

        assert!(find_builtin_op("unknown").is_none());
        assert!(find_builtin_op("list").is_none());
        assert!(std::ptr::eq(
            find_builtin_op("+").unwrap(),
            &get_builtin_ops()[0]
        ));
    }

    /// Macro to create test cases, invoking builtins via the registry.
    macro_rules! test {
        ($name:expr, $args:expr, $expected:expr) => {
            ($name, call_builtin($name, $args), $expected)
        };
    }

    #[test]
    #[expect(clippy::too_many_lines)] // Comprehensive test coverage is intentionally thorough
    fn test_builtin_function_implementations() {
        type TestCase = (&'static str, Result<Value, Error>, Option<Value>);

        let many_ones: Vec<Value> = (0..100).map(|_| val(1)).collect();
        let ascending: Vec<Value> = (0..20).map(val).collect();
        let proc = val(Procedure::new(sym("x"), vec![sym("x")]));

        let test_cases: Vec<TestCase> = vec![
            // =================================================================
            // ARITHMETIC
            // =================================================================
            test!("+", &[], success(0)),
            test!("+", &[val(1), val(2), val(3)], success(6)),
            test!("+", &many_ones, success(100)),
            test!("+", &[val(1), val(2.0)], success(3.0)),
            test!("+", &[val(0.5), val(0.25)], success(0.75)),
            test!("+", &[val(i64::MAX), val(1)], None),
            test!("+", &[val(1), sym("a")], None),
            test!("+", &[val(1), nil()], None),
            test!("-", &[val(10)], success(-10)),
            test!("-", &[val(2.5)], success(-2.5)),
            test!("-", &[val(10), val(3), val(2)], success(5)),
            test!("-", &[val(10), val(0.5)], success(9.5)),
            test!("-", &[val(i64::MIN)], None),
            test!("-", &[val(i64::MIN), val(1)], None),
            test!("-", &[], None),
            test!("*", &[], success(1)),
            test!("*", &[val(2), val(3), val(4)], success(24)),
            test!("*", &[val(2), val(3.0)], success(6.0)),
            test!("*", &[val(4_611_686_018_427_387_904_i64), val(2)], None),
            test!("/", &[val(12), val(3)], success(4)),
            test!("/", &[val(7), val(2)], success(3)),
            test!("/", &[val(-7), val(2)], success(-3)),
            test!("/", &[val(100), val(5), val(2)], success(10)),
            test!("/", &[val(2)], success(0)),
            test!("/", &[val(1)], success(1)),
            test!("/", &[val(4.0)], success(0.25)),
            test!("/", &[val(7), val(2.0)], success(3.5)),
            test!("/", &[val(1), val(0)], None),
            test!("/", &[val(0)], None),
            test!("/", &[val(1.5), val(0)], None),
            test!("/", &[val(i64::MIN), val(-1)], None),
            test!("/", &[], None),
            // =================================================================
            // ROUNDING
            // =================================================================
            test!("ceiling", &[val(2.1)], success(3)),
            test!("ceiling", &[val(-2.1)], success(-2)),
            test!("ceiling", &[val(7)], success(7)),
            test!("floor", &[val(2.9)], success(2)),
            test!("floor", &[val(-2.1)], success(-3)),
            test!("floor", &[val(-4)], success(-4)),
            test!("floor", &[val(1e300)], None),
            test!("floor", &[val(f64::NAN)], None),
            test!("floor", &[sym("x")], None),
            test!("ceiling", &[val(1), val(2)], None),
            // =================================================================
            // TYPE PREDICATES
            // =================================================================
            test!("nullp", &[nil()], success(1)),
            test!("nullp", &[val([1])], success(0)),
            test!("nullp", &[val(0)], success(0)),
            test!("symbolp", &[sym("a")], success(1)),
            test!("symbolp", &[val(1)], success(0)),
            test!("intp", &[val(1)], success(1)),
            test!("intp", &[val(1.0)], success(0)),
            test!("doublep", &[val(1.0)], success(1)),
            test!("doublep", &[val(1)], success(0)),
            test!("listp", &[nil()], success(1)),
            test!("listp", &[cons(val(1), val(2))], success(1)),
            test!("listp", &[sym("a")], success(0)),
            test!("procedurep", &[proc.clone()], success(1)),
            test!("procedurep", &[sym("car")], success(0)),
            test!("nullp", &[], None),
            // =================================================================
            // PAIRS
            // =================================================================
            test!("cons", &[val(1), nil()], success([1])),
            test!("cons", &[val(1), val(2)], Some(cons(val(1), val(2)))),
            test!("car", &[val([1, 2])], success(1)),
            test!("cdr", &[val([1, 2])], success([2])),
            test!("cdr", &[val([1])], Some(nil())),
            test!("car", &[nil()], None),
            test!("cdr", &[val(5)], None),
            test!("cons", &[val(1)], None),
            // =================================================================
            // COMPARISON AND NEGATION
            // =================================================================
            test!("<", &[], success(1)),
            test!("<", &[val(5)], success(1)),
            test!("<", &[val(1), val(2)], success(1)),
            test!("<", &[val(2), val(1)], success(0)),
            test!("<", &[val(1), val(1)], success(0)),
            test!("<", &ascending, success(1)),
            test!("<", &[val(1), val(1.5), val(2)], success(1)),
            test!("<", &[val(i64::MAX - 1), val(i64::MAX)], success(1)),
            test!("<", &[sym("abc"), sym("abd")], success(1)),
            test!("<", &[sym("b"), sym("a")], success(0)),
            test!("<", &[val(1), sym("a")], None),
            test!("<", &[val(2), val(1), sym("a")], None),
            test!("<", &[val(1), nil()], None),
            test!("<", &[proc.clone()], None),
            test!("not", &[val(0)], success(1)),
            test!("not", &[val(0.0)], success(1)),
            test!("not", &[val(3)], success(0)),
            test!("not", &[val(-0.5)], success(0)),
            test!("not", &[nil()], success(0)),
            test!("not", &[sym("a")], success(0)),
            test!("not", &[proc], success(0)),
        ];

        for (i, (name, result, expected)) in test_cases.into_iter().enumerate() {
            match (result, expected) {
                (Ok(actual), Some(expected)) => {
                    assert_eq!(actual, expected, "#{} ({name}) returned wrong value", i + 1);
                }
                (Err(_), None) => {}
                (Ok(actual), None) => {
                    panic!("#{} ({name}) should have failed, got {actual:?}", i + 1)
                }
                (Err(err), Some(expected)) => {
                    panic!("#{} ({name}) expected {expected:?}, got error {err:?}", i + 1)
                }
            }
        }
    }

    #[test]
    fn test_specific_errors() {
        assert_eq!(
            call_builtin("/", &[val(1.5), val(0)]),
            Err(Error::DivideByZero)
        );
        assert!(matches!(
            call_builtin("+", &[val(i64::MAX), val(1)]),
            Err(Error::Overflow(_))
        ));
        assert!(matches!(
            call_builtin("car", &[nil()]),
            Err(Error::TypeError(_))
        ));
        assert!(matches!(
            call_builtin("<", &[val(1), sym("a")]),
            Err(Error::TypeError(_))
        ));
        // Float zero divisors follow IEEE
        assert_eq!(
            call_builtin("/", &[val(1.0), val(0.0)]).unwrap(),
            val(f64::INFINITY)
        );
    }

    #[test]
    fn test_arity_validation() {
        use Arity::*;

        // Test Exact validation
        Exact(2).validate(2).unwrap();
        Exact(2).validate(1).unwrap_err();
        Exact(2).validate(3).unwrap_err();

        // Test AtLeast validation
        AtLeast(1).validate(1).unwrap();
        AtLeast(1).validate(2).unwrap();
        AtLeast(1).validate(0).unwrap_err();

        // Test Range validation
        Range(2, 3).validate(2).unwrap();
        Range(2, 3).validate(3).unwrap();
        Range(2, 3).validate(1).unwrap_err();
        Range(2, 3).validate(4).unwrap_err();

        // Test Any validation
        Any.validate(0).unwrap();
        Any.validate(100).unwrap();

        // Test error contents
        match Exact(2).validate(1).unwrap_err() {
            Error::ArityError { expected, got, .. } => {
                assert_eq!(expected, Exact(2));
                assert_eq!(got, 1);
            }
            _ => panic!("Expected ArityError"),
        }

        assert_eq!(
            AtLeast(1).validate(0).unwrap_err().to_string(),
            "ArityError: expected at least 1 arguments, got 0"
        );
        assert_eq!(
            Error::arity_error_with_expr(Range(2, 3), 4, "(if 1 2 3 4)".to_owned()).to_string(),
            "ArityError: expression (if 1 2 3 4): expected 2 to 3 arguments, got 4"
        );
    }
}
