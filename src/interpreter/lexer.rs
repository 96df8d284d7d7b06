use logos::Logos;
use num_bigint::BigUint;

use crate::{error::ParseError, util::num::parse_natural};

/// Represents a lexical token in the source input.
/// A token is a minimal but meaningful unit of text produced by the lexer.
/// This enum defines all recognized tokens in the language.
#[derive(Logos, Debug, PartialEq, Clone)]
#[logos(extras = LexerExtras)]
pub enum Token {
    /// Natural number literal tokens, such as `42`. Arbitrary precision.
    #[regex(r"[0-9]+", parse_nat)]
    Nat(BigUint),
    /// Boolean literal tokens, such as `true`.
    #[token("true", parse_bool)]
    #[token("false", parse_bool)]
    Bool(bool),
    /// `unit`
    #[token("unit")]
    Unit,
    /// `if`
    #[token("if")]
    If,
    /// `then`
    #[token("then")]
    Then,
    /// `else`
    #[token("else")]
    Else,
    /// `succ`
    #[token("succ")]
    Succ,
    /// `pred`
    #[token("pred")]
    Pred,
    /// `iszero`
    #[token("iszero")]
    IsZero,
    /// `not`
    #[token("not")]
    Not,
    /// `and`
    #[token("and")]
    And,
    /// `or`
    #[token("or")]
    Or,
    /// `print`
    #[token("print")]
    Print,
    /// `def`
    #[token("def")]
    Def,
    /// `type`
    #[token("type")]
    Type,
    /// `fn`
    #[token("fn")]
    Fn,
    /// `do`
    #[token("do")]
    Do,
    /// `table`
    #[token("table")]
    Table,
    /// `select`
    #[token("select")]
    Select,
    /// `from`
    #[token("from")]
    From,
    /// `where`
    #[token("where")]
    Where,
    /// `join`
    #[token("join")]
    Join,
    /// `with`
    #[token("with")]
    With,
    /// `on`
    #[token("on")]
    On,
    /// `project`
    #[token("project")]
    Project,
    /// `union`
    #[token("union")]
    Union,
    /// `intersect`
    #[token("intersect")]
    Intersect,
    /// `except`
    #[token("except")]
    Except,
    /// `Bool`
    #[token("Bool")]
    BoolType,
    /// `Nat`
    #[token("Nat")]
    NatType,
    /// `Unit`
    #[token("Unit")]
    UnitType,
    /// Identifier tokens; variable, definition or column names such as `x`
    /// or `employees`.
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_']*", |lex| lex.slice().to_string())]
    Identifier(String),
    /// `// Comments.`
    #[regex(r"//[^\n\r]*", logos::skip, allow_greedy = true)]
    Comment,
    /// `\` or `λ`
    #[token("\\")]
    #[token("λ")]
    Lambda,
    /// `->`
    #[token("->")]
    Arrow,
    /// `=>`
    #[token("=>")]
    FatArrow,
    /// `==`
    #[token("==")]
    EqualEqual,
    /// `=`
    #[token("=")]
    Equals,
    /// `<`
    #[token("<")]
    Less,
    /// `:`
    #[token(":")]
    Colon,
    /// `;`
    #[token(";")]
    Semicolon,
    /// `.`
    #[token(".")]
    Dot,
    /// `,`
    #[token(",")]
    Comma,
    /// `(`
    #[token("(")]
    LParen,
    /// `)`
    #[token(")")]
    RParen,
    /// `{`
    #[token("{")]
    LBrace,
    /// `}`
    #[token("}")]
    RBrace,
    /// `[`
    #[token("[")]
    LBracket,
    /// `]`
    #[token("]")]
    RBracket,

    /// Line breaks separate statements.
    #[token("\n", |lex| {
        lex.extras.line += 1;
        Token::NewLine
    })]
    NewLine,
    /// Spaces, tabs, carriage returns and feeds.
    #[regex(r"[ \t\r\f]+", logos::skip)]
    Ignored,
}

/// Additional information carried by the lexer during tokenization.
///
/// Tracks the current line number for error reporting and diagnostics.
/// Automatically increments as newlines are processed.
#[derive(Default)]
pub struct LexerExtras {
    /// The current line number in the source being tokenized.
    pub line: usize,
}

/// Parses a natural number literal from the current token slice.
fn parse_nat(lex: &logos::Lexer<Token>) -> Option<BigUint> {
    parse_natural(lex.slice())
}

/// Parses a boolean literal from the current token slice (`true` or `false`).
///
/// # Returns
/// - `Some(true)` if the slice is `"true"`.
/// - `Some(false)` if the slice is `"false"`.
/// - `None` otherwise.
fn parse_bool(lex: &logos::Lexer<Token>) -> Option<bool> {
    match lex.slice() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// Returns `true` when `token` can begin an application argument.
///
/// Application is written by juxtaposition, so the parser keeps consuming
/// arguments while the next token is one of these.
#[must_use]
pub const fn starts_atom(token: &Token) -> bool {
    matches!(token,
             Token::Nat(_)
             | Token::Bool(_)
             | Token::Unit
             | Token::Identifier(_)
             | Token::LParen
             | Token::LBrace
             | Token::Table
             | Token::Do)
}

/// Converts source text into `(Token, line)` pairs.
///
/// Lines are counted from 1. A line break token carries the number of the
/// line it starts.
///
/// ## Example
/// ```
/// use tabula::interpreter::lexer::{Token, tokenize};
///
/// let tokens = tokenize("succ 0 // one").unwrap();
///
/// assert_eq!(tokens.len(), 2);
/// assert_eq!(tokens[0], (Token::Succ, 1));
/// ```
///
/// # Errors
/// Returns `ParseError::UnexpectedToken` for input that is not a token.
pub fn tokenize(source: &str) -> Result<Vec<(Token, usize)>, ParseError> {
    let mut tokens = Vec::new();
    let mut lexer = Token::lexer_with_extras(source, LexerExtras { line: 1 });

    while let Some(token) = lexer.next() {
        if let Ok(tok) = token {
            tokens.push((tok, lexer.extras.line));
        } else {
            return Err(ParseError::UnexpectedToken { token: lexer.slice().to_string(),
                                                     line:  lexer.extras.line, });
        }
    }

    Ok(tokens)
}
