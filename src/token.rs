use std::{fmt, ops::Range};

use crate::lexer;

#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub pos: Position,
    lo: usize,
    len: u32,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span, pos: Position) -> Token {
        Token {
            kind,
            pos,
            len: span.len,
            lo: span.lo,
        }
    }

    pub fn span(&self) -> Span {
        Span {
            len: self.len,
            lo: self.lo,
        }
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }

    /// Attaches this token's location to the given value.
    pub fn wrap<T>(&self, inner: T) -> Spanned<T> {
        Spanned {
            inner,
            span: self.span(),
            pos: self.pos,
        }
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token({:?}, {}, {})", self.kind, self.span(), self.pos)
    }
}

#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Span {
    pub len: u32,
    pub lo: usize,
}

impl Span {
    pub fn new_of_bounds(Range { start: lo, end: hi }: Range<usize>) -> Span {
        debug_assert!(hi >= lo);
        Self::new_of_length(lo, u32::try_from(hi - lo).unwrap())
    }

    pub fn new_of_length(lo: usize, len: u32) -> Span {
        Span { len, lo }
    }

    pub fn hi(&self) -> usize {
        self.lo + self.len as usize
    }

    /// Returns a span that covers both `self` and `other`.
    pub fn to(self, other: Span) -> Span {
        let lo = self.lo.min(other.lo);
        let hi = self.hi().max(other.hi());
        Span::new_of_bounds(lo..hi)
    }

    /// Shrinks or grows the span bounds by the given offsets.
    pub fn offset(self, lo: isize, hi: isize) -> Span {
        let new_lo = self.lo.checked_add_signed(lo).unwrap();
        let new_hi = self.hi().checked_add_signed(hi).unwrap();
        Span::new_of_bounds(new_lo..new_hi)
    }

    pub fn substr(self, src: &str) -> &str {
        &src[self.lo..self.hi()]
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Span({self}, len: {})", self.len)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lo = self.lo;
        let hi = self.hi();
        write!(f, "{lo}..{hi}")
    }
}

/// A 1-based line and column pair.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub const START: Position = Position { line: 1, column: 1 };
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Spanned<T> {
    pub inner: T,
    pub span: Span,
    pub pos: Position,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TokenKind {
    If,
    Else,
    For,
    Return,
    Print,
    VoidTy,
    BooleanTy,
    CharTy,
    IntegerTy,
    StringTy,
    Array,
    Function,
    True,
    False,

    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Semicolon,
    Colon,
    Comma,
    /// `=`
    Assign,
    /// `==`
    Eq,
    /// `!=`
    NotEq,
    Less,
    LessEq,
    Greater,
    GreaterEq,
    /// `&&`
    And,
    /// `||`
    Or,
    /// `!`
    Not,

    Identifier,
    Number,
    String,
    Character,

    /// `// ...`, up to (but excluding) the line break.
    InlineComment,
    /// `/* ... */`, delimiters included.
    MultilineComment,

    Eof,
    Error(lexer::Error),
}

impl TokenKind {
    pub fn is_error(&self) -> bool {
        matches!(self, TokenKind::Error(_))
    }

    pub fn is_comment(&self) -> bool {
        matches!(self, TokenKind::InlineComment | TokenKind::MultilineComment)
    }
}

pub static KEYWORDS: phf::Map<&'static str, TokenKind> = phf::phf_map! {
    "if" => TokenKind::If,
    "else" => TokenKind::Else,
    "for" => TokenKind::For,
    "return" => TokenKind::Return,
    "print" => TokenKind::Print,
    "void" => TokenKind::VoidTy,
    "boolean" => TokenKind::BooleanTy,
    "char" => TokenKind::CharTy,
    "integer" => TokenKind::IntegerTy,
    "string" => TokenKind::StringTy,
    "array" => TokenKind::Array,
    "function" => TokenKind::Function,
    "true" => TokenKind::True,
    "false" => TokenKind::False,
};
