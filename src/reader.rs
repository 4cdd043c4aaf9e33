//! S-expression reader.
//!
//! Turns source text into [`Value`] trees: integers, floats, symbols, `()`,
//! proper and dotted lists, and the `'x` shorthand for `(quote x)`. A `;`
//! starts a comment running to the end of the line.

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{take_till, take_while1},
    character::complete::{char, digit0, digit1, multispace0, one_of},
    combinator::{all_consuming, opt, recognize},
    error::ErrorKind,
};

use crate::ast::{Value, sym};
use crate::{Error, MAX_PARSE_DEPTH, ParseError, ParseErrorKind};

/// Reader settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseConfig {
    /// Treat `;` as the start of a line comment
    pub handle_comments: bool,
    /// Maximum nesting of lists and quote shorthand
    pub max_depth: usize,
}

impl Default for ParseConfig {
    fn default() -> Self {
        ParseConfig {
            handle_comments: true,
            max_depth: MAX_PARSE_DEPTH,
        }
    }
}

/// Characters that end an atom
fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || matches!(c, '(' | ')' | '\'' | ';' | '"')
}

fn fail<T>(input: &str, kind: ErrorKind) -> IResult<&str, T> {
    Err(nom::Err::Failure(nom::error::Error::new(input, kind)))
}

fn reject<T>(input: &str, kind: ErrorKind) -> IResult<&str, T> {
    Err(nom::Err::Error(nom::error::Error::new(input, kind)))
}

/// Skip whitespace and, when enabled, comments
fn skip_blank<'a>(input: &'a str, config: &ParseConfig) -> IResult<&'a str, ()> {
    let mut input = input;
    loop {
        let (rest, _) = multispace0.parse(input)?;
        input = rest;
        if config.handle_comments && input.starts_with(';') {
            let (rest, _) = take_till(|c| c == '\n').parse(input)?;
            input = rest;
        } else {
            return Ok((input, ()));
        }
    }
}

fn sign(input: &str) -> IResult<&str, Option<char>> {
    opt(one_of("+-")).parse(input)
}

fn integer_literal(input: &str) -> IResult<&str, &str> {
    all_consuming(recognize((sign, digit1))).parse(input)
}

/// `1.5`, `1.`, `.5`, `1e3`, `-2.5E-3`
fn float_literal(input: &str) -> IResult<&str, &str> {
    all_consuming(recognize((
        sign,
        alt((
            recognize((digit1, opt((char('.'), digit0)))),
            recognize((char('.'), digit1)),
        )),
        opt((one_of("eE"), sign, digit1)),
    )))
    .parse(input)
}

/// Whether a token was meant to be a number
fn looks_numeric(token: &str) -> bool {
    let unsigned = token.strip_prefix(['+', '-']).unwrap_or(token);
    let unsigned = unsigned.strip_prefix('.').unwrap_or(unsigned);
    unsigned.starts_with(|c: char| c.is_ascii_digit())
}

/// Parse a number or a symbol
fn parse_atom(input: &str) -> IResult<&str, Value> {
    let (rest, token) = take_while1(|c: char| !is_delimiter(c)).parse(input)?;

    if integer_literal(token).is_ok() {
        return match token.parse::<i64>() {
            Ok(n) => Ok((rest, Value::Integer(n))),
            // Bignums are not supported
            Err(_) => fail(input, ErrorKind::Digit),
        };
    }
    if float_literal(token).is_ok() {
        return match token.parse::<f64>() {
            Ok(x) => Ok((rest, Value::Float(x))),
            Err(_) => fail(input, ErrorKind::Float),
        };
    }
    if looks_numeric(token) {
        return fail(input, ErrorKind::Float);
    }
    if token == "." {
        return fail(input, ErrorKind::Char);
    }
    Ok((rest, sym(token)))
}

/// Whether `input` starts with the `.` of a dotted tail
fn at_dot(input: &str) -> bool {
    let mut chars = input.chars();
    chars.next() == Some('.') && chars.next().is_none_or(is_delimiter)
}

/// Parse a list body after `(`, including dotted tails
fn parse_list<'a>(
    input: &'a str,
    config: &ParseConfig,
    depth: usize,
) -> IResult<&'a str, Value> {
    let (mut input, _) = char('(').parse(input)?;
    let mut items = Vec::new();

    loop {
        let (rest, _) = skip_blank(input, config)?;
        input = rest;

        if let Ok((rest, _)) = char::<_, nom::error::Error<&str>>(')').parse(input) {
            return Ok((rest, Value::list(items)));
        }

        if at_dot(input) {
            if items.is_empty() {
                return fail(input, ErrorKind::Char);
            }
            let (rest, tail) = parse_sexpr(&input[1..], config, depth + 1)?;
            let (rest, _) = skip_blank(rest, config)?;
            let (rest, _) = match char::<_, nom::error::Error<&str>>(')').parse(rest) {
                Ok(ok) => ok,
                Err(_) if rest.is_empty() => return fail(rest, ErrorKind::Eof),
                Err(_) => return fail(rest, ErrorKind::Char),
            };
            return Ok((rest, Value::list_with_tail(items, tail)));
        }

        let (rest, item) = parse_sexpr(input, config, depth + 1)?;
        items.push(item);
        input = rest;
    }
}

/// Parse quoted expression ('expr -> (quote expr))
fn parse_quote<'a>(
    input: &'a str,
    config: &ParseConfig,
    depth: usize,
) -> IResult<&'a str, Value> {
    let (input, _) = char('\'').parse(input)?;
    let (input, expr) = parse_sexpr(input, config, depth + 1)?;
    Ok((input, Value::list([sym("quote"), expr])))
}

/// Parse one s-expression, skipping leading blanks
fn parse_sexpr<'a>(
    input: &'a str,
    config: &ParseConfig,
    depth: usize,
) -> IResult<&'a str, Value> {
    if depth >= config.max_depth {
        return fail(input, ErrorKind::TooLarge);
    }
    let (input, _) = skip_blank(input, config)?;
    match input.chars().next() {
        None => fail(input, ErrorKind::Eof),
        Some('(') => parse_list(input, config, depth),
        Some('\'') => parse_quote(input, config, depth),
        Some(')') => fail(input, ErrorKind::Char),
        Some('"') => reject(input, ErrorKind::Tag),
        Some(_) => parse_atom(input),
    }
}

/// Convert nom parsing errors to structured reader errors
fn parse_error_to_error(
    input: &str,
    error: nom::Err<nom::error::Error<&str>>,
    config: &ParseConfig,
) -> Error {
    let parse_error = match error {
        nom::Err::Error(e) | nom::Err::Failure(e) => {
            let position = input.len().saturating_sub(e.input.len());
            let near: String = e.input.chars().take(10).collect();
            let (kind, message) = match e.code {
                ErrorKind::TooLarge => (
                    ParseErrorKind::TooDeeplyNested,
                    format!(
                        "Expression too deeply nested (max depth: {})",
                        config.max_depth
                    ),
                ),
                ErrorKind::Eof => (
                    ParseErrorKind::Incomplete,
                    "Unexpected end of input".to_owned(),
                ),
                ErrorKind::Digit => (
                    ParseErrorKind::InvalidSyntax,
                    format!("Integer literal out of range at position {position}"),
                ),
                ErrorKind::Float => (
                    ParseErrorKind::InvalidSyntax,
                    format!(
                        "Invalid number '{}' at position {position}",
                        first_token(e.input)
                    ),
                ),
                ErrorKind::Char => (
                    ParseErrorKind::InvalidSyntax,
                    format!("Unexpected '{near}' at position {position}"),
                ),
                _ => (
                    ParseErrorKind::InvalidSyntax,
                    format!("Invalid syntax near '{near}'"),
                ),
            };
            ParseError::with_context(kind, message, input, position)
        }
        nom::Err::Incomplete(_) => {
            ParseError::from_message(ParseErrorKind::Incomplete, "Incomplete input")
        }
    };
    Error::ParseError(parse_error)
}

fn first_token(input: &str) -> &str {
    let end = input.find(is_delimiter).unwrap_or(input.len());
    &input[..end]
}

/// Parse exactly one expression with the default configuration
pub fn parse(input: &str) -> Result<Value, Error> {
    parse_with_config(input, &ParseConfig::default())
}

/// Parse exactly one expression. Blank or comment-only input is an error, as
/// is anything but blanks after the expression.
pub fn parse_with_config(input: &str, config: &ParseConfig) -> Result<Value, Error> {
    let (rest, _) =
        skip_blank(input, config).map_err(|e| parse_error_to_error(input, e, config))?;
    if rest.is_empty() {
        return Err(Error::ParseError(ParseError::from_message(
            ParseErrorKind::InvalidSyntax,
            "Empty input",
        )));
    }

    let (rest, value) =
        parse_sexpr(rest, config, 0).map_err(|e| parse_error_to_error(input, e, config))?;
    let (rest, _) =
        skip_blank(rest, config).map_err(|e| parse_error_to_error(input, e, config))?;

    if rest.is_empty() {
        Ok(value)
    } else {
        let position = input.len() - rest.len();
        let near: String = rest.chars().take(10).collect();
        Err(Error::ParseError(ParseError::with_context(
            ParseErrorKind::TrailingContent,
            format!("Unexpected remaining input: '{near}'"),
            input,
            position,
        )))
    }
}

/// Parse every expression in `input`, in order
pub fn parse_all(input: &str) -> Result<Vec<Value>, Error> {
    parse_all_with_config(input, &ParseConfig::default())
}

pub fn parse_all_with_config(input: &str, config: &ParseConfig) -> Result<Vec<Value>, Error> {
    let mut values = Vec::new();
    let mut rest = input;
    loop {
        let (after_blank, _) =
            skip_blank(rest, config).map_err(|e| parse_error_to_error(input, e, config))?;
        if after_blank.is_empty() {
            return Ok(values);
        }
        let (after, value) = parse_sexpr(after_blank, config, 0)
            .map_err(|e| parse_error_to_error(input, e, config))?;
        values.push(value);
        rest = after;
    }
}
