//! This module defines the value model of the interpreter. Every datum, whether
//! program text handed over by a reader or a result produced by evaluation, is a
//! [`Value`]: the empty list, an exact integer, an inexact float, a symbol, a cons
//! [`Pair`] or a user [`Procedure`]. Pairs and procedures are reference counted,
//! so lists share structure freely and cloning a value is cheap.
//!
//! Ergonomic helpers such as [`val`], [`sym`], [`nil`] and [`cons`] build trees in
//! code and tests; `From` conversions turn Rust integers, floats, arrays and vectors
//! into values (sequences become proper lists). The `Display` impl is the printed
//! representation used by the `print` builtin.

use std::fmt;
use std::iter::FusedIterator;
use std::rc::Rc;

use crate::Error;

/// Type alias for exact numbers in the interpreter
pub type IntegerType = i64;

/// Core value type of the interpreter
///
/// To build a tree, use the helper functions:
/// - `val(42)` / `val(2.5)` for numbers, `sym("name")` for symbols, `nil()` for `()`
/// - `val([1, 2, 3])` for homogeneous proper lists
/// - `val(vec![sym("op"), val(42)])` for mixed lists
/// - `cons(a, b)` for a single pair, including improper tails
#[derive(Clone)]
pub enum Value {
    /// The empty list `()`
    Nil,
    /// Exact integers
    Integer(IntegerType),
    /// Inexact double-precision numbers
    Float(f64),
    /// Symbols, compared by name
    Symbol(Rc<str>),
    /// Cons cells
    Pair(Rc<Pair>),
    /// User-defined procedures created by `lambda`
    Procedure(Rc<Procedure>),
}

/// A cons cell. Immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct Pair {
    pub head: Value,
    pub tail: Value,
}

// Unlinks the spine in a loop so dropping a long list does not recurse per cell
impl Drop for Pair {
    fn drop(&mut self) {
        let mut tail = std::mem::replace(&mut self.tail, Value::Nil);
        while let Value::Pair(rc) = tail {
            match Rc::try_unwrap(rc) {
                Ok(mut pair) => tail = std::mem::replace(&mut pair.tail, Value::Nil),
                // Still shared, so the rest of the spine outlives this cell
                Err(_) => break,
            }
        }
    }
}

/// A procedure created by `lambda` (or synthesized by `let`).
///
/// `formals` is either a single symbol, which receives the whole argument list,
/// or a proper list of distinct symbols bound positionally. The body holds one or
/// more expressions evaluated in order. Nothing is captured: free symbols in the
/// body resolve against the environment live at call time.
#[derive(Debug)]
pub struct Procedure {
    formals: Value,
    body: Vec<Value>,
}

impl Procedure {
    pub fn new(formals: Value, body: Vec<Value>) -> Self {
        Procedure { formals, body }
    }

    pub fn formals(&self) -> &Value {
        &self.formals
    }

    pub fn body(&self) -> &[Value] {
        &self.body
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "Nil"),
            Value::Integer(n) => write!(f, "Integer({n})"),
            Value::Float(x) => write!(f, "Float({x:?})"),
            Value::Symbol(s) => write!(f, "Symbol({s})"),
            Value::Pair(_) => {
                write!(f, "List(")?;
                let mut items = self.iter();
                for (i, item) in items.by_ref().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item:?}")?;
                }
                if !items.rest().is_nil() {
                    write!(f, " . {:?}", items.rest())?;
                }
                write!(f, ")")
            }
            Value::Procedure(proc) => write!(
                f,
                "Procedure(formals={:?}, body={:?})",
                proc.formals, proc.body
            ),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::Pair(a), Value::Pair(b)) => Rc::ptr_eq(a, b) || list_eq(self, other),
            // Procedures have identity, not structure
            (Value::Procedure(a), Value::Procedure(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Walks both spines side by side; only heads recurse
fn list_eq(a: &Value, b: &Value) -> bool {
    let (mut left, mut right) = (a.iter(), b.iter());
    loop {
        match (left.next(), right.next()) {
            (Some(x), Some(y)) if x == y => {}
            (None, None) => return left.rest() == right.rest(),
            _ => return false,
        }
    }
}

macro_rules! impl_from_integer {
    ($int_type:ty) => {
        impl From<$int_type> for Value {
            fn from(n: $int_type) -> Self {
                Value::Integer(n as IntegerType)
            }
        }
    };
}

impl_from_integer!(i8);
impl_from_integer!(i16);
impl_from_integer!(i32);
impl_from_integer!(IntegerType);
impl_from_integer!(u8);
impl_from_integer!(u16);
impl_from_integer!(u32);

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<f32> for Value {
    fn from(x: f32) -> Self {
        Value::Float(f64::from(x))
    }
}

impl From<Procedure> for Value {
    fn from(proc: Procedure) -> Self {
        Value::Procedure(Rc::new(proc))
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::list(v.into_iter().map(Into::into))
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Value {
    fn from(arr: [T; N]) -> Self {
        Value::list(arr.into_iter().map(Into::into))
    }
}

impl<T: Into<Value> + Clone> From<&[T]> for Value {
    fn from(slice: &[T]) -> Self {
        Value::list(slice.iter().cloned().map(Into::into))
    }
}

/// Helper function for creating symbols
pub fn sym<S: AsRef<str>>(name: S) -> Value {
    Value::Symbol(Rc::from(name.as_ref()))
}

/// Helper function for creating Values from anything convertible
pub fn val<T: Into<Value>>(value: T) -> Value {
    value.into()
}

/// The empty list
pub fn nil() -> Value {
    Value::Nil
}

/// Allocate a new pair. Never fails; the tail need not be a list.
pub fn cons(head: Value, tail: Value) -> Value {
    Value::Pair(Rc::new(Pair { head, tail }))
}

impl Value {
    /// Build a proper list from the given elements
    pub fn list<I>(items: I) -> Value
    where
        I: IntoIterator<Item = Value>,
    {
        Value::list_with_tail(items, Value::Nil)
    }

    /// Build a list from the given elements ending in `tail` instead of `()`
    pub fn list_with_tail<I>(items: I, tail: Value) -> Value
    where
        I: IntoIterator<Item = Value>,
    {
        let items: Vec<Value> = items.into_iter().collect();
        items
            .into_iter()
            .rev()
            .fold(tail, |acc, item| cons(item, acc))
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn is_pair(&self) -> bool {
        matches!(self, Value::Pair(_))
    }

    pub fn is_symbol(&self) -> bool {
        matches!(self, Value::Symbol(_))
    }

    pub fn is_procedure(&self) -> bool {
        matches!(self, Value::Procedure(_))
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Value::Integer(_))
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Value::Float(_))
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Float(_))
    }

    /// `()` or a pair. Does not walk the spine.
    pub fn is_list(&self) -> bool {
        matches!(self, Value::Nil | Value::Pair(_))
    }

    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Value::Symbol(name) => Some(name),
            _ => None,
        }
    }

    /// Head of a pair
    pub fn car(&self) -> Result<&Value, Error> {
        match self {
            Value::Pair(pair) => Ok(&pair.head),
            other => Err(Error::TypeError(format!("car: not a pair: {other}"))),
        }
    }

    /// Tail of a pair
    pub fn cdr(&self) -> Result<&Value, Error> {
        match self {
            Value::Pair(pair) => Ok(&pair.tail),
            other => Err(Error::TypeError(format!("cdr: not a pair: {other}"))),
        }
    }

    /// Number of elements on the spine of a proper list.
    /// Fails on anything that is not `()` or a chain of pairs ending in `()`.
    pub fn length(&self) -> Result<usize, Error> {
        if !self.is_list() {
            return Err(Error::TypeError(format!("not a list: {self}")));
        }
        let mut items = self.iter();
        let count = items.by_ref().count();
        if items.rest().is_nil() {
            Ok(count)
        } else {
            Err(Error::TypeError(format!("not a proper list: {self}")))
        }
    }

    /// Numeric value widened to a double
    pub fn as_double(&self) -> Result<f64, Error> {
        match self {
            Value::Integer(n) => Ok(*n as f64),
            Value::Float(x) => Ok(*x),
            other => Err(Error::TypeError(format!("not a number: {other}"))),
        }
    }

    /// Iterate over the elements of a list. Stops at the first non-pair tail;
    /// use [`ListIter::rest`] to find out what that tail was.
    pub fn iter(&self) -> ListIter<'_> {
        ListIter { current: self }
    }

    /// Elements of a proper list
    pub fn to_vec(&self) -> Result<Vec<Value>, Error> {
        self.length()?;
        Ok(self.iter().cloned().collect())
    }
}

/// Borrowing iterator over the spine of a list
#[derive(Debug, Clone)]
pub struct ListIter<'a> {
    current: &'a Value,
}

impl<'a> ListIter<'a> {
    /// The unconsumed remainder: `()` once a proper list is exhausted
    pub fn rest(&self) -> &'a Value {
        self.current
    }
}

impl<'a> Iterator for ListIter<'a> {
    type Item = &'a Value;

    fn next(&mut self) -> Option<Self::Item> {
        match self.current {
            Value::Pair(pair) => {
                self.current = &pair.tail;
                Some(&pair.head)
            }
            _ => None,
        }
    }
}

impl FusedIterator for ListIter<'_> {}

/// Significant digits used for non-integral floats
const FLOAT_SIGNIFICANT_DIGITS: i32 = 6;

/// Write a float the way the printer shows it: integral values keep one
/// decimal (`3.0`), everything else uses at most six significant digits with
/// exponent notation for very large or small magnitudes.
fn write_float(f: &mut fmt::Formatter<'_>, x: f64) -> fmt::Result {
    if x.is_nan() {
        return write!(f, "nan");
    }
    if x.is_infinite() {
        return write!(f, "{}", if x > 0.0 { "inf" } else { "-inf" });
    }
    if x.trunc() == x {
        return write!(f, "{x:.1}");
    }

    let precision = (FLOAT_SIGNIFICANT_DIGITS - 1) as usize;
    let scientific = format!("{x:.precision$e}");
    let (mantissa, exponent) = scientific
        .split_once('e')
        .and_then(|(m, e)| e.parse::<i32>().ok().map(|e| (m, e)))
        .unwrap_or((scientific.as_str(), 0));

    if exponent < -4 || exponent >= FLOAT_SIGNIFICANT_DIGITS {
        let sign = if exponent < 0 { '-' } else { '+' };
        write!(
            f,
            "{}e{sign}{:02}",
            trim_fraction(mantissa),
            exponent.abs()
        )
    } else {
        let decimals = (FLOAT_SIGNIFICANT_DIGITS - 1 - exponent) as usize;
        let fixed = format!("{x:.decimals$}");
        write!(f, "{}", trim_fraction(&fixed))
    }
}

fn trim_fraction(digits: &str) -> &str {
    if digits.contains('.') {
        digits.trim_end_matches('0').trim_end_matches('.')
    } else {
        digits
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "()"),
            Value::Integer(n) => write!(f, "{n}"),
            Value::Float(x) => write_float(f, *x),
            Value::Symbol(s) => write!(f, "{s}"),
            Value::Pair(_) => {
                write!(f, "(")?;
                let mut items = self.iter();
                for (i, item) in items.by_ref().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{item}")?;
                }
                if !items.rest().is_nil() {
                    write!(f, " . {}", items.rest())?;
                }
                write!(f, ")")
            }
            Value::Procedure(_) => write!(f, "#<function>"),
        }
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used)] // test code OK
mod helper_function_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_helper_functions_data_driven() {
        // (helper_result, expected_value)
        let test_cases = vec![
            (val(42), Value::Integer(42)),
            (val(-17), Value::Integer(-17)),
            (val(255u8), Value::Integer(255)),
            (val(-32768i16), Value::Integer(-32768)),
            (val(IntegerType::MAX), Value::Integer(IntegerType::MAX)),
            (val(2.5), Value::Float(2.5)),
            (val(0.5f32), Value::Float(0.5)),
            (sym("foo-bar"), Value::Symbol(Rc::from("foo-bar"))),
            (sym(String::from("+")), Value::Symbol(Rc::from("+"))),
            (nil(), Value::Nil),
            (
                val([1, 2]),
                cons(Value::Integer(1), cons(Value::Integer(2), Value::Nil)),
            ),
            (
                val(vec![sym("op"), val(1.5)]),
                cons(sym("op"), cons(Value::Float(1.5), Value::Nil)),
            ),
            (val(Vec::<Value>::new()), Value::Nil),
        ];

        for (i, (actual, expected)) in test_cases.iter().enumerate() {
            assert_eq!(actual, expected, "helper case #{}", i + 1);
        }
    }

    #[test]
    fn test_numbers_of_different_kinds_are_not_equal() {
        assert_ne!(val(3), val(3.0));
        assert_ne!(sym("1"), val(1));
        assert_ne!(nil(), val([0]));
    }

    #[test]
    fn test_procedure_equality_is_identity() {
        let proc = val(Procedure::new(sym("args"), vec![sym("args")]));
        let same = proc.clone();
        let lookalike = val(Procedure::new(sym("args"), vec![sym("args")]));
        assert_eq!(proc, same);
        assert_ne!(proc, lookalike);
    }

    #[test]
    fn test_car_cdr_and_cons() {
        let pair = cons(val(1), sym("b"));
        assert_eq!(pair.car().unwrap(), &val(1));
        assert_eq!(pair.cdr().unwrap(), &sym("b"));

        for not_pair in [nil(), val(1), val(1.0), sym("x")] {
            assert!(matches!(not_pair.car(), Err(Error::TypeError(_))));
            assert!(matches!(not_pair.cdr(), Err(Error::TypeError(_))));
        }
    }

    #[test]
    fn test_length() {
        assert_eq!(nil().length().unwrap(), 0);
        assert_eq!(val([1, 2, 3]).length().unwrap(), 3);
        // Nested lists count once
        assert_eq!(val(vec![val([1, 2]), val(3)]).length().unwrap(), 2);

        let improper = Value::list_with_tail([val(1), val(2)], val(3));
        assert!(matches!(improper.length(), Err(Error::TypeError(_))));
        assert!(matches!(val(7).length(), Err(Error::TypeError(_))));
        assert!(matches!(sym("x").length(), Err(Error::TypeError(_))));
    }

    #[test]
    fn test_as_double() {
        assert_eq!(val(3).as_double().unwrap(), 3.0);
        assert_eq!(val(-0.25).as_double().unwrap(), -0.25);
        assert!(sym("x").as_double().is_err());
        assert!(nil().as_double().is_err());
        assert!(val([1]).as_double().is_err());
    }

    #[test]
    fn test_predicates() {
        let proc = val(Procedure::new(nil(), vec![val(1)]));
        assert!(nil().is_nil() && nil().is_list() && !nil().is_pair());
        assert!(val([1]).is_pair() && val([1]).is_list());
        assert!(sym("a").is_symbol());
        assert!(proc.is_procedure() && !proc.is_list());
        assert!(val(1).is_integer() && !val(1).is_float());
        assert!(val(1.0).is_float() && val(1.0).is_number());
    }

    #[test]
    fn test_display() {
        let cases = vec![
            (val(42), "42"),
            (val(-7), "-7"),
            (val(3.0), "3.0"),
            (val(-2.0), "-2.0"),
            (val(0.5), "0.5"),
            (val(3.14159265), "3.14159"),
            (val(1.0 / 3.0), "0.333333"),
            (val(123456.7), "123457"),
            (val(1234567.5), "1.23457e+06"),
            (val(0.0001234), "0.0001234"),
            (val(0.00001234), "1.234e-05"),
            (val(f64::INFINITY), "inf"),
            (sym("hello"), "hello"),
            (nil(), "()"),
            (val([1, 2, 3]), "(1 2 3)"),
            (val(vec![sym("a"), val([val(1.5)]), nil()]), "(a (1.5) ())"),
            (cons(val(1), val(2)), "(1 . 2)"),
            (Value::list_with_tail([val(1), val(2)], sym("c")), "(1 2 . c)"),
            (val(Procedure::new(sym("x"), vec![sym("x")])), "#<function>"),
        ];

        for (value, expected) in cases {
            assert_eq!(format!("{value}"), expected);
        }
    }

    #[test]
    fn test_iter_reports_improper_tail() {
        let improper = Value::list_with_tail([val(1), val(2)], val(3));
        let mut items = improper.iter();
        assert_eq!(items.next(), Some(&val(1)));
        assert_eq!(items.next(), Some(&val(2)));
        assert_eq!(items.next(), None);
        assert_eq!(items.rest(), &val(3));
        assert!(improper.to_vec().is_err());
        assert_eq!(val([4, 5]).to_vec().unwrap(), vec![val(4), val(5)]);
    }

    #[test]
    fn test_long_lists_drop_and_compare_without_recursion() {
        let long = Value::list((0..1_000_000).map(val));
        assert_eq!(long.length().unwrap(), 1_000_000);

        let same = Value::list((0..1_000_000).map(val));
        assert!(long == same);
        let shorter = Value::list((0..999_999).map(val));
        assert!(long != shorter);

        drop(same);
        drop(shorter);
        drop(long);
    }

    #[test]
    fn test_drop_keeps_shared_tails_alive() {
        let shared = Value::list((0..1_000_000).map(val));
        let front = cons(sym("a"), shared.clone());
        drop(front);
        assert_eq!(shared.length().unwrap(), 1_000_000);
        assert_eq!(shared.car().unwrap(), &val(0));

        let first = cons(val(1), cons(val(2), nil()));
        let second = cons(val(0), first.cdr().unwrap().clone());
        drop(first);
        assert_eq!(second, val([0, 2]));
    }
}
