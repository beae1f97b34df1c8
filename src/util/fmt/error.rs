use std::fmt;

use crate::{lexer, parser, token::Spanned};

/// The alternate form (`{:#}`) prefixes the message with the `line:column`
/// where the error was found.
impl fmt::Display for Spanned<parser::Error> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Spanned {
            pos, inner: error, ..
        } = self;

        if f.alternate() {
            write!(f, "{pos}: ")?;
        }

        use parser::Error::*;
        match error {
            UnexpectedTokenInExpr { token } => {
                write!(f, "unexpected token {token:?} in expression")
            }
            Unexpected { actual, expected } => {
                write!(f, "expected token {expected:?}, but got {actual:?}")
            }
            UnexpectedAny { actual, expected } => {
                write!(f, "expected one of {expected:?}, but got {actual:?}")
            }
            ExpectedType { actual } => write!(f, "expected type, but got {actual:?}"),
            ExpectedFunctionBody { actual } => {
                write!(f, "expected function body block, but got {actual:?}")
            }
            ParseInt => write!(f, "parse int error, out of bounds"),
            TooDeep => write!(
                f,
                "nesting too deep (limit is {})",
                parser::MAX_NESTING_DEPTH
            ),
            Lexer(error) => write!(f, "{error}"),
        }
    }
}

impl std::error::Error for Spanned<parser::Error> {}

impl fmt::Display for lexer::Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            lexer::Error::UnexpectedChar => write!(f, "unexpected character"),
            lexer::Error::UnclosedString => write!(f, "unclosed string"),
            lexer::Error::UnclosedCharacter => write!(f, "unclosed character literal"),
            lexer::Error::UnclosedComment => write!(f, "unclosed comment"),
        }
    }
}
