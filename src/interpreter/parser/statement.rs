use std::{iter::Peekable, rc::Rc};

use crate::{
    ast::{Binding, Definition, Term},
    error::ParseError,
    interpreter::{
        lexer::Token,
        parser::{
            core::{ParseResult, Scope, parse_expression},
            types::parse_type,
            utils::{expect, parse_identifier},
        },
    },
};

/// Parses a single top-level statement.
///
/// A statement may be one of:
/// - a term definition, `def <name> = <expression>`.
/// - a type declaration, `type <Name> = <type>`.
/// - an expression used as a statement.
///
/// Definitions are registered in `scope`, so later statements resolve the
/// name to the new definition.
///
/// # Parameters
/// - `tokens`: Token iterator containing `(Token, line)` pairs.
/// - `scope`: Name resolution state shared by the whole program.
///
/// # Returns
/// A `Term::Def` for definitions and declarations, otherwise the expression.
pub fn parse_statement<'a, I>(tokens: &mut Peekable<I>, scope: &mut Scope) -> ParseResult<Term>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    match tokens.peek() {
        Some((Token::Def, line)) => {
            let line = *line;
            tokens.next();
            parse_definition(tokens, scope, line)
        },
        Some((Token::Type, line)) => {
            let line = *line;
            tokens.next();
            parse_type_declaration(tokens, scope, line)
        },
        _ => parse_expression(tokens, scope),
    }
}

/// Parses a statement inside a `do` block.
///
/// Only expressions are allowed here; definitions live at the top level.
///
/// # Errors
/// `NestedDefinition` when the statement starts with `def` or `type`.
pub fn parse_nested_statement<'a, I>(tokens: &mut Peekable<I>, scope: &mut Scope) -> ParseResult<Term>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    if let Some((Token::Def | Token::Type, line)) = tokens.peek() {
        let line = *line;
        tokens.next();
        let name = parse_identifier(tokens).unwrap_or_default();
        return Err(ParseError::NestedDefinition { name, line });
    }
    parse_expression(tokens, scope)
}

/// Parses the next top-level statement, skipping separators around it.
///
/// Returns `Ok(None)` once the input is exhausted. Statements are separated by
/// line breaks or `;`. Anything else after a complete statement is an error,
/// which catches input such as `1 )`. The driver calls this once per
/// statement and reduces each one before parsing the next.
///
/// # Example
/// ```
/// use tabula::interpreter::{
///     lexer::tokenize,
///     parser::{core::Scope, statement::next_statement},
/// };
///
/// let tokens = tokenize("def one = succ 0\nprint one; one").unwrap();
/// let mut iter = tokens.iter().peekable();
/// let mut scope = Scope::new();
///
/// let mut count = 0;
/// while let Some(_) = next_statement(&mut iter, &mut scope).unwrap() {
///     count += 1;
/// }
/// assert_eq!(count, 3);
///
/// let tokens = tokenize("1 )").unwrap();
/// assert!(next_statement(&mut tokens.iter().peekable(), &mut Scope::new()).is_err());
/// ```
///
/// # Errors
/// Propagates statement errors and reports `UnexpectedTrailingTokens` when a
/// statement is not followed by a separator.
pub fn next_statement<'a, I>(tokens: &mut Peekable<I>, scope: &mut Scope) -> ParseResult<Option<Term>>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    while let Some((Token::NewLine | Token::Semicolon, _)) = tokens.peek() {
        tokens.next();
    }
    if tokens.peek().is_none() {
        return Ok(None);
    }

    let statement = parse_statement(tokens, scope)?;

    match tokens.peek() {
        None | Some((Token::NewLine | Token::Semicolon, _)) => Ok(Some(statement)),
        Some((tok, line)) => {
            Err(ParseError::UnexpectedTrailingTokens { token: format!("{tok:?}"),
                                                       line:  *line, })
        },
    }
}

/// Parses `<name> = <expression>` after `def`.
///
/// The definition is registered before its initializer is parsed so that the
/// initializer can refer to it recursively.
fn parse_definition<'a, I>(tokens: &mut Peekable<I>, scope: &mut Scope, line: usize) -> ParseResult<Term>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let name = parse_identifier(tokens)?;
    expect(tokens, &Token::Equals, "'=' after definition name", line)?;

    let def = Definition::declare(&name);
    scope.define(Rc::clone(&def), line)?;

    let initializer = parse_expression(tokens, scope)?;
    def.bind(Binding::Term(initializer));

    Ok(Term::Def(def))
}

/// Parses `<Name> = <type>` after `type`.
fn parse_type_declaration<'a, I>(tokens: &mut Peekable<I>, scope: &mut Scope, line: usize) -> ParseResult<Term>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let name = parse_identifier(tokens)?;
    expect(tokens, &Token::Equals, "'=' after type name", line)?;
    let ty = parse_type(tokens)?;

    let def = Definition::with_type(&name, ty);
    scope.define(Rc::clone(&def), line)?;

    Ok(Term::Def(def))
}
