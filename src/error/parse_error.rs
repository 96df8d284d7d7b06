/// Errors raised while turning source text into terms.
///
/// Every variant records the line the problem was found on.
#[derive(Debug)]
pub enum ParseError {
    /// A token that cannot appear here, or a character that starts no token.
    UnexpectedToken {
        /// The offending token, sometimes with what was expected instead.
        token: String,
        /// Line number.
        line:  usize,
    },
    /// The input ended in the middle of a statement.
    UnexpectedEndOfInput {
        /// Line number.
        line: usize,
    },
    /// A parenthesized form was never closed.
    ExpectedClosingParen {
        /// Line of the opening parenthesis.
        line: usize,
    },
    /// `def` or `type` inside a `do` block.
    NestedDefinition {
        /// The name being defined.
        name: String,
        /// Line number.
        line: usize,
    },
    /// A top-level name defined twice.
    Redefinition {
        /// The name being defined.
        name: String,
        /// Line of the second definition.
        line: usize,
    },
    /// A complete statement followed by something other than a line break or
    /// `;`.
    UnexpectedTrailingTokens {
        /// The first token after the statement.
        token: String,
        /// Line number.
        line:  usize,
    },
    /// Anything else.
    Other {
        /// What went wrong.
        message: String,
        /// Line number.
        line:    usize,
    },
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnexpectedToken { token, line } => {
                write!(f, "Syntax error on line {line}: unexpected {token}.")
            },
            Self::UnexpectedEndOfInput { line } => {
                write!(f, "Syntax error on line {line}: the program ends mid-statement.")
            },
            Self::ExpectedClosingParen { line } => {
                write!(f, "Syntax error on line {line}: '(' is never closed.")
            },
            Self::NestedDefinition { name, line } => write!(f,
                                                            "Syntax error on line {line}: '{name}' can only be defined at the top level, not inside a block."),
            Self::Redefinition { name, line } => {
                write!(f, "Syntax error on line {line}: '{name}' is defined more than once.")
            },
            Self::UnexpectedTrailingTokens { token, line } => write!(f,
                                                                     "Syntax error on line {line}: {token} follows a complete statement; separate statements with a line break or ';'."),
            Self::Other { message, line } => write!(f, "Syntax error on line {line}: {message}"),
        }
    }
}

impl std::error::Error for ParseError {}
