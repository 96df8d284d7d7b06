use std::iter::Peekable;

use crate::{
    ast::{Column, Type},
    error::ParseError,
    interpreter::{
        lexer::Token,
        parser::{
            core::{ParseResult, Scope},
            utils::{expect, parse_comma_separated, parse_identifier},
        },
    },
};

/// Parses a type.
///
/// Arrows are right-associative: `Nat -> Nat -> Bool` is
/// `Nat -> (Nat -> Bool)`. A parenthesized list of two or more types must be
/// followed by `->` and forms a multi-parameter function type.
///
/// Grammar:
/// ```text
///     type  := atype ("->" type)?
///     atype := "Bool" | "Nat" | "Unit" | IDENT
///            | "{" (IDENT ":" type),* "}"
///            | "table" "{" (IDENT ":" type),* "}"
///            | "(" type ("," type)* ")"
/// ```
///
/// # Example
/// ```
/// use tabula::{
///     ast::Type,
///     interpreter::{lexer::tokenize, parser::types::parse_type},
/// };
///
/// let tokens = tokenize("(Nat, Bool) -> Unit").unwrap();
/// let ty = parse_type(&mut tokens.iter().peekable()).unwrap();
///
/// assert_eq!(ty,
///            Type::Function(vec![Type::Nat, Type::Bool], Box::new(Type::Unit)));
/// ```
///
/// # Errors
/// Returns a `ParseError` for malformed types.
pub fn parse_type<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Type>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let line = tokens.peek().map_or(0, |(_, l)| *l);
    let mut parameters = match tokens.next() {
        Some((Token::BoolType, _)) => vec![Type::Bool],
        Some((Token::NatType, _)) => vec![Type::Nat],
        Some((Token::UnitType, _)) => vec![Type::Unit],
        Some((Token::Identifier(name), _)) => vec![Type::Named(name.clone())],
        Some((Token::LBrace, _)) => vec![Type::Record(parse_schema_body(tokens)?)],
        Some((Token::Table, l)) => {
            expect(tokens, &Token::LBrace, "'{' after 'table'", *l)?;
            vec![Type::Table(parse_schema_body(tokens)?)]
        },
        Some((Token::LParen, _)) => {
            parse_comma_separated(tokens, &mut Scope::new(), |t, _| parse_type(t), &Token::RParen)?
        },
        Some((tok, l)) => {
            return Err(ParseError::UnexpectedToken { token: format!("Expected a type, found {tok:?}"),
                                                     line:  *l, });
        },
        None => return Err(ParseError::UnexpectedEndOfInput { line }),
    };

    if let Some((Token::Arrow, _)) = tokens.peek() {
        tokens.next();
        let result = Box::new(parse_type(tokens)?);
        return Ok(if parameters.len() == 1 {
                      Type::Arrow(Box::new(parameters.remove(0)), result)
                  } else {
                      Type::Function(parameters, result)
                  });
    }

    match parameters.len() {
        1 => Ok(parameters.remove(0)),
        _ => {
            Err(ParseError::Other { message: "A parenthesized type list must be followed by '->'".to_string(),
                                    line })
        },
    }
}

/// Parses `name: Type, ...}` after an opening brace.
///
/// Used for record types, table types and table literal schemas.
///
/// # Errors
/// Returns a `ParseError` when a column is malformed or the brace is not
/// closed.
pub fn parse_schema_body<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Vec<Column>>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    parse_comma_separated(tokens, &mut Scope::new(), |t, _| parse_column(t), &Token::RBrace)
}

fn parse_column<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Column>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let line = tokens.peek().map_or(0, |(_, l)| *l);
    let name = parse_identifier(tokens)?;
    expect(tokens, &Token::Colon, "':' after column name", line)?;
    let ty = parse_type(tokens)?;
    Ok(Column::new(&name, ty))
}
