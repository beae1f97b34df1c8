// program ::= decl*
// decl ::= comment
//        | ID ':' type ['=' expr] ';'
//        | ID ':' function_type ['=' block]
//        | function ID '(' [type ID (',' type ID)*] ')' ':' type stmt
// type ::= void | boolean | char | integer | string
//        | array '[' expr ']' type
//        | function type '(' [ID ':' type (',' ID ':' type)*] ')'
// stmt ::= decl
//        | expr ';'
//        | if '(' expr ')' stmt [else stmt]
//        | for '(' [expr] ';' [expr] ';' [expr] ')' stmt
//        | print expr (',' expr)* ';'
//        | return [expr] ';'
//        | '{' stmt* '}'
//        | comment
// expr ::= expr '=' expr
//        | expr ('||' | '&&') expr
//        | expr ('==' | '!=' | '<' | '<=' | '>' | '>=') expr
//        | expr ('+' | '-' | '*' | '/' | '%' | '^') expr
//        | ('-' | '!') expr
//        | expr '(' [expr (',' expr)*] ')'
//        | expr '[' expr ']'
//        | '{' [expr (',' expr)*] '}'
//        | '(' expr ')'
//        | ID | integer | string | char | true | false

// Precedence (lowest first)
//
// =
// ||
// &&
// == !=
// < <= > >=
// + -
// * / %
// ^
// - ! (prefix)
// () [] (postfix)

use crate::token::Span;

#[derive(Debug, PartialEq, Default)]
pub struct Program {
    pub decls: Vec<Decl>,
}

#[derive(Debug, PartialEq)]
pub enum Decl {
    Variable(Variable),
    Function(Function),
    Comment(Comment),
}

#[derive(Debug, PartialEq)]
pub struct Variable {
    pub name: Ident,
    pub ty: Type,
    pub initializer: Option<Expr>,
}

#[derive(Debug, PartialEq)]
pub struct Function {
    pub name: Ident,
    pub ty: FunctionType,
    /// `None` for prototypes.
    pub body: Option<Box<Stmt>>,
}

#[derive(Debug, PartialEq)]
pub struct Comment {
    pub kind: CommentKind,
    /// The comment text, delimiters included.
    pub text: Box<str>,
    pub span: Span,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CommentKind {
    Inline,
    Multiline,
}

#[derive(Debug, PartialEq)]
pub enum Type {
    Void,
    Boolean,
    Char,
    Integer,
    String,
    Array { element: Box<Type>, size: Box<Expr> },
    Function(FunctionType),
}

impl Type {
    pub fn kind(&self) -> TypeKind {
        match self {
            Type::Void => TypeKind::Void,
            Type::Boolean => TypeKind::Boolean,
            Type::Char => TypeKind::Char,
            Type::Integer => TypeKind::Integer,
            Type::String => TypeKind::String,
            Type::Array { .. } => TypeKind::Array,
            Type::Function(_) => TypeKind::Function,
        }
    }

    /// The kind of an array's element type, or of the type itself otherwise.
    pub fn element_kind(&self) -> TypeKind {
        match self {
            Type::Array { element, .. } => element.kind(),
            other => other.kind(),
        }
    }
}

/// The shape of a [`Type`], without its children.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TypeKind {
    Void,
    Boolean,
    Char,
    Integer,
    String,
    Array,
    Function,
}

#[derive(Debug, PartialEq)]
pub struct FunctionType {
    pub return_ty: Box<Type>,
    pub params: Vec<Param>,
}

#[derive(Debug, PartialEq)]
pub struct Param {
    pub name: Ident,
    pub ty: Type,
}

#[derive(Debug, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

#[derive(Debug, PartialEq)]
pub enum StmtKind {
    Decl(Decl),
    Expr(Expr),
    If {
        predicate: Expr,
        then_arm: Box<Stmt>,
        else_arm: Option<Box<Stmt>>,
    },
    For {
        init: Option<Expr>,
        predicate: Option<Expr>,
        step: Option<Expr>,
        body: Box<Stmt>,
    },
    /// Non empty list of arguments.
    Print(Vec<Expr>),
    Return(Option<Expr>),
    Block(Vec<Stmt>),
    Comment(Comment),
}

#[derive(Debug, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Debug, PartialEq)]
pub enum ExprKind {
    Assignment {
        target: Box<Expr>,
        value: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Subscript {
        target: Box<Expr>,
        index: Box<Expr>,
    },
    Unary {
        op: UnaryOperator,
        expr: Box<Expr>,
    },
    Binary {
        op: BinaryOperator,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// Possibly empty list of elements.
    Array(Vec<Expr>),
    Id(Ident),
    Int(i64),
    /// Raw string body; escape sequences are kept as written.
    String(Box<str>),
    Char(char),
    Bool(bool),
}

impl Expr {
    /// Returns the name if this is a bare identifier.
    pub fn as_id(&self) -> Option<&Ident> {
        match &self.kind {
            ExprKind::Id(ident) => Some(ident),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UnaryOperator {
    Neg,
    Not,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BinaryOperator {
    Or,
    And,
    Eq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
}

impl BinaryOperator {
    /// The operator as written in source. Also valid C for every operator but
    /// [`BinaryOperator::Pow`].
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::Or => "||",
            BinaryOperator::And => "&&",
            BinaryOperator::Eq => "==",
            BinaryOperator::NotEq => "!=",
            BinaryOperator::Lt => "<",
            BinaryOperator::Le => "<=",
            BinaryOperator::Gt => ">",
            BinaryOperator::Ge => ">=",
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "/",
            BinaryOperator::Mod => "%",
            BinaryOperator::Pow => "^",
        }
    }
}

#[derive(Debug, PartialEq)]
pub struct Ident {
    pub name: Box<str>,
    pub span: Span,
}

impl std::fmt::Display for Ident {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}
