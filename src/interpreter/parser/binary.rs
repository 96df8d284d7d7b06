use std::iter::Peekable;

use crate::{
    ast::{BinaryOperator, Term},
    interpreter::{
        lexer::Token,
        parser::{
            core::{ParseResult, Scope},
            unary::parse_unary,
        },
    },
};

/// Maps a token to its corresponding binary operator.
///
/// Returns `Some(BinaryOperator)` for `and`, `or`, `==`, `<` and the three set
/// operators. Returns `None` for all other tokens.
///
/// # Example
/// ```
/// use tabula::{
///     ast::BinaryOperator,
///     interpreter::{lexer::Token, parser::binary::token_to_binary_operator},
/// };
///
/// assert_eq!(token_to_binary_operator(&Token::Union),
///            Some(BinaryOperator::Union));
/// assert_eq!(token_to_binary_operator(&Token::Comma), None);
/// ```
#[must_use]
pub const fn token_to_binary_operator(token: &Token) -> Option<BinaryOperator> {
    match token {
        Token::And => Some(BinaryOperator::And),
        Token::Or => Some(BinaryOperator::Or),
        Token::EqualEqual => Some(BinaryOperator::Equal),
        Token::Less => Some(BinaryOperator::Less),
        Token::Union => Some(BinaryOperator::Union),
        Token::Intersect => Some(BinaryOperator::Intersect),
        Token::Except => Some(BinaryOperator::Except),
        _ => None,
    }
}

/// Returns `true` for `union`, `intersect` and `except`.
///
/// # Example
/// ```
/// use tabula::{ast::BinaryOperator, interpreter::parser::binary::is_set_op};
///
/// assert!(is_set_op(BinaryOperator::Except));
/// assert!(!is_set_op(BinaryOperator::Less));
/// ```
#[must_use]
pub const fn is_set_op(op: BinaryOperator) -> bool {
    matches!(op,
             BinaryOperator::Union | BinaryOperator::Intersect | BinaryOperator::Except)
}

/// Parses one left-associative precedence level.
///
/// `accepts` selects the operators of this level and `next` parses the
/// operands, which belong to the next tighter level.
fn parse_level<'a, I>(tokens: &mut Peekable<I>,
                      scope: &mut Scope,
                      accepts: fn(BinaryOperator) -> bool,
                      next: fn(&mut Peekable<I>, &mut Scope) -> ParseResult<Term>)
                      -> ParseResult<Term>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let mut left = next(tokens, scope)?;

    loop {
        if let Some((token, _)) = tokens.peek()
           && let Some(op) = token_to_binary_operator(token)
           && accepts(op)
        {
            tokens.next();
            let right = next(tokens, scope)?;
            left = Term::binary(op, left, right);
            continue;
        }

        break;
    }

    Ok(left)
}

/// Parses logical OR expressions.
///
/// Lowest binary precedence.
///
/// Grammar: `logical_or := logical_and ("or" logical_and)*`
pub fn parse_logical_or<'a, I>(tokens: &mut Peekable<I>, scope: &mut Scope) -> ParseResult<Term>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    parse_level(tokens,
                scope,
                |op| matches!(op, BinaryOperator::Or),
                parse_logical_and)
}

/// Parses logical AND expressions.
///
/// Grammar: `logical_and := comparison ("and" comparison)*`
pub fn parse_logical_and<'a, I>(tokens: &mut Peekable<I>, scope: &mut Scope) -> ParseResult<Term>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    parse_level(tokens,
                scope,
                |op| matches!(op, BinaryOperator::And),
                parse_comparison)
}

/// Parses structural comparisons.
///
/// Both `==` and `<` compare any two values, including records and tables.
///
/// Grammar: `comparison := set_op (("==" | "<") set_op)*`
pub fn parse_comparison<'a, I>(tokens: &mut Peekable<I>, scope: &mut Scope) -> ParseResult<Term>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    parse_level(tokens,
                scope,
                |op| matches!(op, BinaryOperator::Equal | BinaryOperator::Less),
                parse_set_op)
}

/// Parses table set operations.
///
/// The three operators share one precedence level and associate to the left,
/// so `a union b except c` is `(a union b) except c`.
///
/// Grammar: `set_op := unary (("union" | "intersect" | "except") unary)*`
pub fn parse_set_op<'a, I>(tokens: &mut Peekable<I>, scope: &mut Scope) -> ParseResult<Term>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    parse_level(tokens, scope, is_set_op, parse_unary)
}
