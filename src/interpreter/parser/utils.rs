use std::iter::Peekable;

use crate::{
    ast::Field,
    error::ParseError,
    interpreter::{
        lexer::Token,
        parser::core::{ParseResult, Scope, parse_expression},
    },
};

/// Parses a comma-separated list of items until a closing token.
///
/// This utility is shared by parameter lists, call arguments, tuples, record
/// literals, schemas and column lists. It repeatedly calls `parse_item` to
/// parse one element, expecting either:
///
/// - a comma, to continue the list, or
/// - the specified closing token, to end it.
///
/// An immediately encountered closing token produces an empty list. Line
/// breaks between items are ignored, so long table literals may span several
/// lines.
///
/// Grammar (simplified): `list := item ("," item)*`
///
/// # Parameters
/// - `tokens`: Token iterator positioned at the first item or closing token.
/// - `scope`: Name resolution state, handed through to `parse_item`.
/// - `parse_item`: Function used to parse each list element.
/// - `closing`: The token that terminates the list (e.g., `]` or `)`).
///
/// # Returns
/// A vector of parsed items.
///
/// # Errors
/// Returns a `ParseError` if:
/// - an item fails to parse,
/// - an unexpected token is encountered,
/// - the stream ends before the closing token.
pub(in crate::interpreter::parser) fn parse_comma_separated<'a, I, T>(
    tokens: &mut Peekable<I>,
    scope: &mut Scope,
    parse_item: impl Fn(&mut Peekable<I>, &mut Scope) -> ParseResult<T>,
    closing: &Token)
    -> Result<Vec<T>, ParseError>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let mut items = Vec::new();
    skip_newlines(tokens);
    if let Some((tok, _)) = tokens.peek()
       && tok == closing
    {
        tokens.next();

        return Ok(items);
    }
    loop {
        skip_newlines(tokens);
        items.push(parse_item(tokens, scope)?);
        skip_newlines(tokens);
        match tokens.peek() {
            Some((Token::Comma, _)) => {
                tokens.next();
            },
            Some((tok, _)) if tok == closing => {
                tokens.next();
                break;
            },
            Some((tok, line)) => {
                return Err(ParseError::UnexpectedToken { token: format!("Expected ',' or {closing:?}, found {tok:?}"),
                                                         line:  *line, });
            },
            None => return Err(ParseError::UnexpectedEndOfInput { line: 0 }),
        }
    }
    Ok(items)
}

/// Parses a plain identifier and returns its name.
///
/// The next token must be `Token::Identifier`. Keywords are lexed as their
/// own tokens and therefore never reach this function as identifiers.
///
/// # Errors
/// Returns a `ParseError` if:
/// - the next token is not an identifier,
/// - the input ends unexpectedly.
pub(in crate::interpreter::parser) fn parse_identifier<'a, I>(tokens: &mut Peekable<I>)
                                                              -> ParseResult<String>
    where I: Iterator<Item = &'a (Token, usize)>
{
    match tokens.next() {
        Some((Token::Identifier(s), _)) => Ok(s.clone()),
        Some((tok, line)) => {
            Err(ParseError::UnexpectedToken { token: format!("Expected identifier, found {tok:?}"),
                                              line:  *line, })
        },
        None => Err(ParseError::UnexpectedEndOfInput { line: 0 }),
    }
}

/// Consumes the next token, which must equal `expected`.
///
/// `what` describes the expected token for the error message; `line` is used
/// when the input ends early.
///
/// # Errors
/// `UnexpectedToken` for any other token, `UnexpectedEndOfInput` when the
/// stream is exhausted.
pub(in crate::interpreter::parser) fn expect<'a, I>(tokens: &mut Peekable<I>,
                                                    expected: &Token,
                                                    what: &str,
                                                    line: usize)
                                                    -> ParseResult<()>
    where I: Iterator<Item = &'a (Token, usize)>
{
    match tokens.next() {
        Some((tok, _)) if tok == expected => Ok(()),
        Some((tok, l)) => {
            Err(ParseError::UnexpectedToken { token: format!("Expected {what}, found {tok:?}"),
                                              line:  *l, })
        },
        None => Err(ParseError::UnexpectedEndOfInput { line }),
    }
}

/// Skips any line breaks at the current position.
pub(in crate::interpreter::parser) fn skip_newlines<'a, I>(tokens: &mut Peekable<I>)
    where I: Iterator<Item = &'a (Token, usize)>
{
    while let Some((Token::NewLine, _)) = tokens.peek() {
        tokens.next();
    }
}

/// Parses a braced column list such as `{name, salary}`.
///
/// # Errors
/// Returns a `ParseError` if the opening brace is missing or an entry is not
/// an identifier.
pub(in crate::interpreter::parser) fn parse_column_list<'a, I>(tokens: &mut Peekable<I>,
                                                               scope: &mut Scope)
                                                               -> ParseResult<Vec<String>>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let line = tokens.peek().map_or(0, |(_, l)| *l);
    expect(tokens, &Token::LBrace, "'{' to open a column list", line)?;
    parse_comma_separated(tokens, scope, |t, _| parse_identifier(t), &Token::RBrace)
}

/// Parses the body of a record literal after its opening brace:
/// `name = expr, ...}`.
///
/// `{}` is the empty record.
///
/// # Errors
/// Returns a `ParseError` when a field is malformed or the brace is not
/// closed.
pub(in crate::interpreter::parser) fn parse_record_fields<'a, I>(tokens: &mut Peekable<I>,
                                                                 scope: &mut Scope)
                                                                 -> ParseResult<Vec<Field>>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    parse_comma_separated(tokens, scope, parse_field, &Token::RBrace)
}

fn parse_field<'a, I>(tokens: &mut Peekable<I>, scope: &mut Scope) -> ParseResult<Field>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let line = tokens.peek().map_or(0, |(_, l)| *l);
    let name = parse_identifier(tokens)?;
    expect(tokens, &Token::Equals, "'=' after field name", line)?;
    let value = parse_expression(tokens, scope)?;
    Ok(Field::new(&name, value))
}
