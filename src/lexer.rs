use std::{num::ParseIntError, str::Chars};

use crate::{
    token::{Position, Span, Token, TokenKind, KEYWORDS},
    util::BreakableIteratorExt,
};

pub const SUGGESTED_TOKENS_CAPACITY: usize = 8_192;

/// A convenience function that lexes the whole input (up to and including the
/// end-of-input token) into a new buffer.
pub fn lex_in_new(src: &str) -> Vec<Token> {
    let mut tokens = Vec::with_capacity(SUGGESTED_TOKENS_CAPACITY.min(src.len() + 1));
    tokens.extend(Lexer::new(src).up_to(Token::is_eof));
    tokens
}

/// Lexical errors. The lexer never stops on them: it produces a
/// [`TokenKind::Error`] token and lets the consumer decide.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    UnexpectedChar,
    UnclosedString,
    UnclosedCharacter,
    UnclosedComment,
}

/// The B-Minor lexer.
///
/// Tokens are produced on demand through [`Lexer::next_token`]. Once the input
/// is exhausted, every further call yields an [`TokenKind::Eof`] token.
#[derive(Clone)]
pub struct Lexer<'src> {
    src: &'src str,
    iter: Chars<'src>,
    cursor: usize,
    current_lo: usize,
    pos: Position,
    current_pos: Position,
}

impl<'src> Lexer<'src> {
    /// Constructs a new lexer with the default state.
    pub fn new(src: &'src str) -> Lexer<'src> {
        Lexer {
            src,
            iter: src.chars(),
            cursor: 0,
            current_lo: 0,
            pos: Position::START,
            current_pos: Position::START,
        }
    }

    /// Skips any whitespace and scans the next token.
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();
        let kind = self.scan_token_kind();
        self.produce(kind)
    }

    /// Returns the source string this lexer reads from.
    pub fn src(&self) -> &'src str {
        self.src
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        Some(self.next_token())
    }
}

impl Lexer<'_> {
    /// Tries to scan the current character.
    fn scan_token_kind(&mut self) -> TokenKind {
        use TokenKind::*;
        self.mark();
        if self.is_at_end() {
            return Eof;
        }
        match self.advance() {
            '+' => Plus,
            '-' => Minus,
            '*' => Star,
            '/' => match self.peek() {
                '/' => self.inline_comment(),
                '*' => self.multiline_comment(),
                _ => Slash,
            },
            '%' => Percent,
            '^' => Caret,
            '(' => LParen,
            ')' => RParen,
            '{' => LBrace,
            '}' => RBrace,
            '[' => LBracket,
            ']' => RBracket,
            ';' => Semicolon,
            ':' => Colon,
            ',' => Comma,
            '=' => match self.peek() {
                '=' => self.advance_with(Eq),
                _ => Assign,
            },
            '!' => match self.peek() {
                '=' => self.advance_with(NotEq),
                _ => Not,
            },
            '<' => match self.peek() {
                '=' => self.advance_with(LessEq),
                _ => Less,
            },
            '>' => match self.peek() {
                '=' => self.advance_with(GreaterEq),
                _ => Greater,
            },
            '&' => match self.peek() {
                '&' => self.advance_with(And),
                _ => Error(self::Error::UnexpectedChar),
            },
            '|' => match self.peek() {
                '|' => self.advance_with(Or),
                _ => Error(self::Error::UnexpectedChar),
            },
            '"' => self.string(),
            '\'' => self.character(),
            c if c.is_ascii_alphabetic() || c == '_' => self.identifier_or_keyword(),
            c if c.is_ascii_digit() => self.number(),
            _ => Error(self::Error::UnexpectedChar),
        }
    }

    /// Lexes a string token. The only escape recognized here is `\"`, which
    /// must not end the string; every other escape sequence is kept verbatim
    /// and only interpreted when the string is emitted.
    fn string(&mut self) -> TokenKind {
        loop {
            match self.peek() {
                _ if self.is_at_end() => return TokenKind::Error(Error::UnclosedString),
                '"' => return self.advance_with(TokenKind::String),
                '\\' if self.peek_next() == '"' => {
                    self.advance();
                    self.advance();
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    fn character(&mut self) -> TokenKind {
        match self.peek() {
            _ if self.is_at_end() => (),
            '\\' => {
                self.advance();
                if matches!(self.peek(), 'n' | 't' | '\\' | '\'') {
                    self.advance();
                }
            }
            '\'' => (),
            _ => {
                self.advance();
            }
        }
        if self.peek() != '\'' {
            return TokenKind::Error(Error::UnclosedCharacter);
        }
        self.advance_with(TokenKind::Character)
    }

    fn identifier_or_keyword(&mut self) -> TokenKind {
        let valid_identifier_suffix = |c: char| c.is_ascii_alphanumeric() || c == '_';

        while valid_identifier_suffix(self.peek()) {
            self.advance();
        }
        KEYWORDS
            .get(self.substr())
            .copied()
            .unwrap_or(TokenKind::Identifier)
    }

    fn number(&mut self) -> TokenKind {
        while self.peek().is_ascii_digit() {
            self.advance();
        }
        TokenKind::Number
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), ' ' | '\t' | '\n' | '\r' | '\x0b' | '\x0c') {
            self.advance();
        }
    }

    fn inline_comment(&mut self) -> TokenKind {
        assert_eq!(self.advance(), '/');
        while !self.is_at_end() && self.peek() != '\n' {
            self.advance();
        }
        TokenKind::InlineComment
    }

    fn multiline_comment(&mut self) -> TokenKind {
        assert_eq!(self.advance(), '*');
        loop {
            match (self.peek(), self.peek_next()) {
                _ if self.is_at_end() => return TokenKind::Error(Error::UnclosedComment),
                ('*', '/') => break,
                _ => {
                    self.advance();
                }
            }
        }
        self.advance();
        self.advance();
        TokenKind::MultilineComment
    }
}

impl Lexer<'_> {
    /// Starts a new token "mark" at the current cursor.
    fn mark(&mut self) {
        self.current_lo = self.cursor;
        self.current_pos = self.pos;
    }

    /// Returns the next char and advances the iterator, keeping track of the
    /// line and column.
    fn advance(&mut self) -> char {
        let Some(c) = self.iter.next() else {
            return '\0';
        };
        self.cursor += c.len_utf8();
        if c == '\n' {
            self.pos.line += 1;
            self.pos.column = 1;
        } else {
            self.pos.column += 1;
        }
        c
    }

    /// Advances and returns the provided value.
    fn advance_with<T>(&mut self, value: T) -> T {
        self.advance();
        value
    }

    /// Whether the whole input has been consumed. A NUL byte in the source is
    /// an ordinary (unexpected) character, not the end.
    fn is_at_end(&self) -> bool {
        self.iter.as_str().is_empty()
    }

    /// Returns the next char without advancing the iterator. Yields NUL past
    /// the end; use [`Lexer::is_at_end`] to tell the two apart.
    fn peek(&self) -> char {
        self.iter.clone().next().unwrap_or('\0')
    }

    /// Returns the char after the next one without advancing the iterator.
    fn peek_next(&self) -> char {
        self.iter.clone().nth(1).unwrap_or('\0')
    }

    /// Returns the current span.
    fn span(&self) -> Span {
        Span::new_of_bounds(self.current_lo..self.cursor)
    }

    /// Returns the substring of the current marked bounds.
    fn substr(&self) -> &str {
        self.span().substr(self.src)
    }

    /// Produces a token using the marked bounds.
    fn produce(&self, kind: TokenKind) -> Token {
        Token::new(kind, self.span(), self.current_pos)
    }
}

/// Recovers token payloads from the source string.
pub mod extract {
    use super::*;

    pub fn int(token: Token, src: &str) -> Result<i64, ParseIntError> {
        debug_assert_eq!(token.kind, TokenKind::Number);
        token.span().substr(src).parse()
    }

    pub fn ident(token: Token, src: &str) -> Box<str> {
        debug_assert_eq!(token.kind, TokenKind::Identifier);
        Box::from(token.span().substr(src))
    }

    /// Returns the string body, without the quotes. Escape sequences are kept
    /// as written.
    pub fn string(token: Token, src: &str) -> Box<str> {
        debug_assert_eq!(token.kind, TokenKind::String);
        Box::from(token.span().offset(1, -1).substr(src))
    }

    /// Returns the decoded character. An empty literal decodes to NUL.
    pub fn character(token: Token, src: &str) -> char {
        debug_assert_eq!(token.kind, TokenKind::Character);
        let raw = token.span().offset(1, -1).substr(src);
        let mut chars = raw.chars();
        match (chars.next(), chars.next()) {
            (None, _) => '\0',
            (Some('\\'), Some('n')) => '\n',
            (Some('\\'), Some('t')) => '\t',
            (Some('\\'), Some(escaped)) => escaped,
            (Some(c), _) => c,
        }
    }

    /// Returns the full comment text, delimiters included.
    pub fn comment(token: Token, src: &str) -> Box<str> {
        debug_assert!(token.kind.is_comment());
        Box::from(token.span().substr(src))
    }
}
