use std::iter::Peekable;

use crate::{
    ast::Term,
    error::ParseError,
    interpreter::{
        lexer::Token,
        parser::{
            core::{ParseResult, Scope},
            statement::parse_nested_statement,
            utils::expect,
        },
    },
};

/// Parses a `do` block.
///
/// A block consists of zero or more expression statements separated by line
/// breaks or `;`. Parsing continues until a closing `}` token is encountered.
/// Leading and trailing separators inside the block are ignored.
///
/// Grammar: `block := "do" "{" (statement (NEWLINE | ";")*)* "}"`
///
/// The resulting term is `Term::Seq`; an empty block reduces to `unit`.
///
/// # Parameters
/// - `tokens`: Token stream positioned at the `do` keyword.
/// - `scope`: Name resolution state.
///
/// # Returns
/// A sequence term containing all parsed statements.
pub fn parse_do_block<'a, I>(tokens: &mut Peekable<I>, scope: &mut Scope) -> ParseResult<Term>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let line = tokens.peek().map_or(0, |(_, l)| *l);
    expect(tokens, &Token::Do, "'do'", line)?;
    expect(tokens, &Token::LBrace, "'{' after 'do'", line)?;

    let mut statements = Vec::new();

    loop {
        while let Some((Token::NewLine | Token::Semicolon, _)) = tokens.peek() {
            tokens.next();
        }

        if let Some((Token::RBrace, _)) = tokens.peek() {
            tokens.next();
            break;
        }

        statements.push(parse_nested_statement(tokens, scope)?);

        match tokens.peek() {
            Some((Token::NewLine | Token::Semicolon | Token::RBrace, _)) => {},
            Some((tok, l)) => {
                return Err(ParseError::UnexpectedToken { token: format!("Expected ';', line break or '}}', found {tok:?}"),
                                                         line:  *l, });
            },
            None => return Err(ParseError::UnexpectedEndOfInput { line }),
        }
    }

    Ok(Term::Seq(statements))
}
