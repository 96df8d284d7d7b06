use std::iter::Peekable;

use crate::{
    ast::{Accessor, Term},
    error::ParseError,
    interpreter::{
        lexer::{Token, starts_atom},
        parser::{
            block::parse_do_block,
            core::{ParseResult, Scope, parse_expression},
            relational::parse_table_literal,
            utils::{parse_column_list, parse_comma_separated, parse_identifier, parse_record_fields},
        },
    },
};

/// Parses a unary expression.
///
/// Supports the prefix operators `not`, `succ`, `pred` and `iszero`. They are
/// right-associative, so `succ succ 0` parses as `succ (succ 0)`. A run of
/// prefix operators is collected first and applied innermost-first, so its
/// length is not bounded by the native stack.
///
/// The operand after the last prefix operator is parsed by
/// [`parse_application`].
///
/// Grammar:
/// ```text
///     unary := ("not" | "succ" | "pred" | "iszero") unary
///            | application
/// ```
pub(crate) fn parse_unary<'a, I>(tokens: &mut Peekable<I>, scope: &mut Scope) -> ParseResult<Term>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let mut prefixes: Vec<fn(Term) -> Term> = Vec::new();
    loop {
        let build: fn(Term) -> Term = match tokens.peek() {
            Some((Token::Not, _)) => Term::not,
            Some((Token::Succ, _)) => Term::succ,
            Some((Token::Pred, _)) => Term::pred,
            Some((Token::IsZero, _)) => Term::iszero,
            _ => break,
        };
        tokens.next();
        prefixes.push(build);
    }

    let operand = parse_application(tokens, scope)?;
    Ok(prefixes.into_iter().rev().fold(operand, |term, build| build(term)))
}

/// Parses application by juxtaposition.
///
/// Application is left-associative: `f a b` is `(f a) b`. Arguments are
/// postfix expressions, so `f r.a` applies `f` to the field `a` of `r`.
///
/// Grammar: `application := postfix postfix*`
pub fn parse_application<'a, I>(tokens: &mut Peekable<I>, scope: &mut Scope) -> ParseResult<Term>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let mut function = parse_postfix(tokens, scope)?;

    while let Some((token, _)) = tokens.peek()
          && starts_atom(token)
    {
        let argument = parse_postfix(tokens, scope)?;
        function = Term::app(function, argument);
    }

    Ok(function)
}

/// Parses a primary expression followed by any number of postfix forms:
///
/// - `.name` selects a field or a single column.
/// - `.{a, b}` selects several fields or columns.
/// - `[a, b]` calls a multi-parameter function.
///
/// Grammar: `postfix := primary ("." IDENT | "." "{" names "}" | "[" args "]")*`
pub fn parse_postfix<'a, I>(tokens: &mut Peekable<I>, scope: &mut Scope) -> ParseResult<Term>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let mut term = parse_primary(tokens, scope)?;

    loop {
        match tokens.peek() {
            Some((Token::Dot, _)) => {
                tokens.next();
                let accessor = match tokens.peek() {
                    Some((Token::LBrace, _)) => Accessor::Columns(parse_column_list(tokens, scope)?),
                    _ => Accessor::Field(parse_identifier(tokens)?),
                };
                term = Term::Member { receiver: Box::new(term),
                                      accessor };
            },
            Some((Token::LBracket, _)) => {
                tokens.next();
                let arguments = parse_comma_separated(tokens, scope, parse_expression, &Token::RBracket)?;
                term = Term::Call { function: Box::new(term),
                                    arguments };
            },
            _ => break,
        }
    }

    Ok(term)
}

/// Parses a primary (atomic) expression.
///
/// Primary expressions form the base of the expression grammar and include:
/// - natural, boolean and unit literals
/// - identifiers, resolved against the current [`Scope`]
/// - parenthesized expressions and tuples
/// - record literals (`{a = 1}`)
/// - table literals (`table {a: Nat} [...]`)
/// - `do` blocks
///
/// # Errors
/// Returns a `ParseError` for any token that cannot start an expression.
pub fn parse_primary<'a, I>(tokens: &mut Peekable<I>, scope: &mut Scope) -> ParseResult<Term>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    match tokens.peek() {
        Some((Token::Table, _)) => return parse_table_literal(tokens, scope),
        Some((Token::Do, _)) => return parse_do_block(tokens, scope),
        _ => {},
    }

    match tokens.next() {
        Some((Token::Nat(n), _)) => Ok(Term::Nat(n.clone())),
        Some((Token::Bool(b), _)) => Ok(Term::Bool(*b)),
        Some((Token::Unit, _)) => Ok(Term::Unit),
        Some((Token::Identifier(name), _)) => Ok(scope.resolve(name)),
        Some((Token::LParen, line)) => parse_parenthesized(tokens, scope, *line),
        Some((Token::LBrace, _)) => Ok(Term::Record(parse_record_fields(tokens, scope)?)),
        Some((tok, line)) => {
            Err(ParseError::UnexpectedToken { token: format!("{tok:?}"),
                                              line:  *line, })
        },
        None => Err(ParseError::UnexpectedEndOfInput { line: 0 }),
    }
}

/// Parses the remainder of a parenthesized form after `(`.
///
/// - `()` is `unit`.
/// - `(e)` is `e`.
/// - `(a, b, ...)` is a tuple.
fn parse_parenthesized<'a, I>(tokens: &mut Peekable<I>, scope: &mut Scope, line: usize) -> ParseResult<Term>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let mut elements = parse_comma_separated(tokens, scope, parse_expression, &Token::RParen)
        .map_err(|e| match e {
            ParseError::UnexpectedEndOfInput { .. } => ParseError::ExpectedClosingParen { line },
            other => other,
        })?;

    match elements.len() {
        0 => Ok(Term::Unit),
        1 => Ok(elements.remove(0)),
        _ => Ok(Term::Tuple(elements)),
    }
}
