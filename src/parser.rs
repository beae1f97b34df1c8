use crate::{
    ast::{
        BinaryOperator, Comment, CommentKind, Decl, Expr, ExprKind, Function, FunctionType, Ident,
        Param, Program, Stmt, StmtKind, Type, UnaryOperator, Variable,
    },
    lexer::{self, extract, Lexer},
    token::{Span, Spanned, Token, TokenKind},
};

type Result<T, E = Spanned<Error>> = std::result::Result<T, E>;

/// Parses a whole program. The first lexical or syntax error aborts the parse;
/// no partial tree is ever returned.
pub fn parse_program(src: &str) -> Result<Program> {
    let mut p = Parser::new(src)?;
    let program = p.parse_program()?;
    tracing::debug!(decls = program.decls.len(), "parsed program");
    Ok(program)
}

/// Parses a single expression, which must span the whole input.
pub fn parse_expr(src: &str) -> Result<Expr> {
    let mut p = Parser::new(src)?;
    let expr = p.parse_expr()?;
    p.consume(TokenKind::Eof)?;
    Ok(expr)
}

struct Parser<'src> {
    lexer: Lexer<'src>,
    current: Token,
    /// One token of lookahead, filled on demand.
    lookahead: Option<Token>,
    prev_span: Span,
    /// Current nesting of statements, expressions and types.
    depth: usize,
}

/// Deeper input is rejected with [`Error::TooDeep`] instead of exhausting the
/// stack.
pub const MAX_NESTING_DEPTH: usize = 128;

const PREFIX_BINDING_POWER: u8 = 17;

const POSTFIX_BINDING_POWER: u8 = 19;

#[derive(Copy, Clone)]
enum Infix {
    Assignment,
    Binary(BinaryOperator),
}

#[derive(Copy, Clone)]
enum Postfix {
    Call,
    Subscript,
}

impl Parser<'_> {
    fn parse_program(&mut self) -> Result<Program> {
        let mut decls = Vec::with_capacity(16);
        while !self.is(TokenKind::Eof) {
            decls.push(self.parse_decl()?);
        }
        Ok(Program { decls })
    }

    fn parse_decl(&mut self) -> Result<Decl> {
        let token = self.peek();
        match token.kind {
            kind if kind.is_comment() => self.parse_comment().map(Decl::Comment),
            TokenKind::Function => self.parse_function_decl().map(Decl::Function),
            TokenKind::Identifier => self.parse_binding_decl(),
            actual => Err(token.wrap(Error::UnexpectedAny {
                actual,
                expected: Box::from([TokenKind::Identifier, TokenKind::Function]),
            })),
        }
    }

    fn parse_comment(&mut self) -> Result<Comment> {
        let token = self.consume_any(&[TokenKind::InlineComment, TokenKind::MultilineComment])?;
        let kind = if token.kind == TokenKind::InlineComment {
            CommentKind::Inline
        } else {
            CommentKind::Multiline
        };
        Ok(Comment {
            kind,
            text: extract::comment(token, self.src()),
            span: token.span(),
        })
    }

    /// `function name ( type name, ... ) : type stmt`
    fn parse_function_decl(&mut self) -> Result<Function> {
        self.consume(TokenKind::Function)?;
        let name = self.parse_ident()?;

        self.consume(TokenKind::LParen)?;
        let params = self.parse_list(TokenKind::RParen, TokenKind::Comma, |p| {
            let ty = p.parse_type()?;
            let name = p.parse_ident()?;
            Ok(Param { name, ty })
        })?;
        self.consume(TokenKind::RParen)?;
        self.consume(TokenKind::Colon)?;
        let return_ty = self.parse_type()?;
        let body = self.parse_stmt()?;

        Ok(Function {
            name,
            ty: FunctionType {
                return_ty: Box::new(return_ty),
                params,
            },
            body: Some(Box::new(body)),
        })
    }

    /// `name : type [= initializer] ;`
    ///
    /// Function-typed bindings take a block as their "initializer", which
    /// isn't followed by a semicolon.
    fn parse_binding_decl(&mut self) -> Result<Decl> {
        let name = self.parse_ident()?;
        self.consume(TokenKind::Colon)?;

        match self.parse_type()? {
            Type::Function(ty) => {
                let body = if self.take(TokenKind::Assign)? {
                    let token = self.peek();
                    if token.kind != TokenKind::LBrace {
                        return Err(token.wrap(Error::ExpectedFunctionBody { actual: token.kind }));
                    }
                    Some(Box::new(self.parse_stmt()?))
                } else {
                    self.consume(TokenKind::Semicolon)?;
                    None
                };
                Ok(Decl::Function(Function { name, ty, body }))
            }
            ty => {
                let initializer = self.parse_initializer()?;
                self.consume(TokenKind::Semicolon)?;
                Ok(Decl::Variable(Variable {
                    name,
                    ty,
                    initializer,
                }))
            }
        }
    }

    fn parse_initializer(&mut self) -> Result<Option<Expr>> {
        if !self.take(TokenKind::Assign)? {
            return Ok(None);
        }
        let expr = self.parse_expr()?;
        Ok(Some(expr))
    }

    fn parse_type(&mut self) -> Result<Type> {
        self.nested(Self::parse_type_inner)
    }

    fn parse_type_inner(&mut self) -> Result<Type> {
        let token = self.advance()?;
        let ty = match token.kind {
            TokenKind::VoidTy => Type::Void,
            TokenKind::BooleanTy => Type::Boolean,
            TokenKind::CharTy => Type::Char,
            TokenKind::IntegerTy => Type::Integer,
            TokenKind::StringTy => Type::String,

            // array [size] type
            TokenKind::Array => {
                self.consume(TokenKind::LBracket)?;
                let size = self.parse_expr()?;
                self.consume(TokenKind::RBracket)?;
                let element = self.parse_type()?;
                Type::Array {
                    element: Box::new(element),
                    size: Box::new(size),
                }
            }

            // function type ( name : type, ... )
            TokenKind::Function => {
                let return_ty = self.parse_type()?;
                self.consume(TokenKind::LParen)?;
                let params = self.parse_list(TokenKind::RParen, TokenKind::Comma, |p| {
                    let name = p.parse_ident()?;
                    p.consume(TokenKind::Colon)?;
                    let ty = p.parse_type()?;
                    Ok(Param { name, ty })
                })?;
                self.consume(TokenKind::RParen)?;
                Type::Function(FunctionType {
                    return_ty: Box::new(return_ty),
                    params,
                })
            }

            actual => return Err(token.wrap(Error::ExpectedType { actual })),
        };
        Ok(ty)
    }

    fn parse_ident(&mut self) -> Result<Ident> {
        let token = self.consume(TokenKind::Identifier)?;
        Ok(Ident {
            name: extract::ident(token, self.src()),
            span: token.span(),
        })
    }

    fn parse_stmt(&mut self) -> Result<Stmt> {
        self.nested(Self::parse_stmt_inner)
    }

    fn parse_stmt_inner(&mut self) -> Result<Stmt> {
        let start = self.peek();
        let kind = match start.kind {
            // Both declarations and expressions may start with an identifier.
            // Only declarations have a colon right after it.
            TokenKind::Identifier if self.lookahead()?.kind == TokenKind::Colon => {
                StmtKind::Decl(self.parse_binding_decl()?)
            }
            TokenKind::Function => StmtKind::Decl(Decl::Function(self.parse_function_decl()?)),
            kind if kind.is_comment() => StmtKind::Comment(self.parse_comment()?),

            // if ( expr ) stmt [else stmt]
            TokenKind::If => {
                self.advance()?;
                self.consume(TokenKind::LParen)?;
                let predicate = self.parse_expr()?;
                self.consume(TokenKind::RParen)?;
                let then_arm = self.parse_stmt()?;
                let else_arm = if self.take(TokenKind::Else)? {
                    Some(Box::new(self.parse_stmt()?))
                } else {
                    None
                };
                StmtKind::If {
                    predicate,
                    then_arm: Box::new(then_arm),
                    else_arm,
                }
            }

            // for ( [expr] ; [expr] ; [expr] ) stmt
            TokenKind::For => {
                self.advance()?;
                self.consume(TokenKind::LParen)?;
                let init = self.parse_optional_expr(TokenKind::Semicolon)?;
                self.consume(TokenKind::Semicolon)?;
                let predicate = self.parse_optional_expr(TokenKind::Semicolon)?;
                self.consume(TokenKind::Semicolon)?;
                let step = self.parse_optional_expr(TokenKind::RParen)?;
                self.consume(TokenKind::RParen)?;
                let body = self.parse_stmt()?;
                StmtKind::For {
                    init,
                    predicate,
                    step,
                    body: Box::new(body),
                }
            }

            // print expr [, expr]* ;
            TokenKind::Print => {
                self.advance()?;
                let mut args = vec![self.parse_expr()?];
                while self.take(TokenKind::Comma)? {
                    args.push(self.parse_expr()?);
                }
                self.consume(TokenKind::Semicolon)?;
                StmtKind::Print(args)
            }

            // return [expr] ;
            TokenKind::Return => {
                self.advance()?;
                let value = self.parse_optional_expr(TokenKind::Semicolon)?;
                self.consume(TokenKind::Semicolon)?;
                StmtKind::Return(value)
            }

            // { stmt* }
            TokenKind::LBrace => {
                self.advance()?;
                let mut body = Vec::new();
                while !self.is(TokenKind::RBrace) && !self.is(TokenKind::Eof) {
                    body.push(self.parse_stmt()?);
                }
                self.consume(TokenKind::RBrace)?;
                StmtKind::Block(body)
            }

            _ => {
                let expr = self.parse_expr()?;
                self.consume(TokenKind::Semicolon)?;
                StmtKind::Expr(expr)
            }
        };

        Ok(Stmt {
            kind,
            span: start.span().to(self.prev_span),
        })
    }

    fn parse_optional_expr(&mut self, end_delim: TokenKind) -> Result<Option<Expr>> {
        if self.is(end_delim) {
            Ok(None)
        } else {
            self.parse_expr().map(Some)
        }
    }

    fn parse_expr(&mut self) -> Result<Expr> {
        self.parse_expr_bp(0)
    }

    fn parse_expr_bp(&mut self, min_bp: u8) -> Result<Expr> {
        self.nested(|p| p.parse_expr_bp_inner(min_bp))
    }

    fn parse_expr_bp_inner(&mut self, min_bp: u8) -> Result<Expr> {
        let lhs_token = self.advance()?;
        let mut lhs = self.parse_nud(lhs_token)?;

        loop {
            let op_token = self.peek();

            if let Some(postfix) = Self::postfix_operator(op_token.kind) {
                if POSTFIX_BINDING_POWER < min_bp {
                    break;
                }
                self.advance()?;
                lhs = self.parse_postfix(postfix, lhs)?;
            } else if let Some((infix, (lbp, rbp))) = Self::infix_operator(op_token.kind) {
                if lbp < min_bp {
                    // Operator binds less tightly than the minimum required
                    break;
                }
                self.advance()?;
                lhs = self.parse_led(infix, lhs, rbp)?;
            } else {
                break;
            }
        }

        Ok(lhs)
    }

    /// nud: Parses tokens that start an expression
    /// (prefix operators, literals, grouping, array literals)
    fn parse_nud(&mut self, token: Token) -> Result<Expr> {
        let (kind, span) = match token.kind {
            TokenKind::Identifier => {
                let ident = Ident {
                    name: extract::ident(token, self.src()),
                    span: token.span(),
                };
                (ExprKind::Id(ident), token.span())
            }
            TokenKind::Number => {
                let Ok(parsed) = extract::int(token, self.src()) else {
                    return Err(token.wrap(Error::ParseInt));
                };
                (ExprKind::Int(parsed), token.span())
            }
            TokenKind::String => (
                ExprKind::String(extract::string(token, self.src())),
                token.span(),
            ),
            TokenKind::Character => (
                ExprKind::Char(extract::character(token, self.src())),
                token.span(),
            ),
            TokenKind::True => (ExprKind::Bool(true), token.span()),
            TokenKind::False => (ExprKind::Bool(false), token.span()),

            // Grouping: ( expr )
            TokenKind::LParen => {
                let expr = self.parse_expr()?;
                let end = self.consume(TokenKind::RParen)?;
                (expr.kind, token.span().to(end.span()))
            }

            // Array literal: { expr, expr, ... }
            TokenKind::LBrace => {
                let elements =
                    self.parse_list(TokenKind::RBrace, TokenKind::Comma, Parser::parse_expr)?;
                let end = self.consume(TokenKind::RBrace)?;
                (ExprKind::Array(elements), token.span().to(end.span()))
            }

            // Prefix operators: -, !
            kind @ (TokenKind::Minus | TokenKind::Not) => {
                let op = if kind == TokenKind::Minus {
                    UnaryOperator::Neg
                } else {
                    UnaryOperator::Not
                };
                let expr = self.parse_expr_bp(PREFIX_BINDING_POWER)?;
                let span = token.span().to(expr.span);
                let unary = ExprKind::Unary {
                    op,
                    expr: Box::new(expr),
                };
                (unary, span)
            }

            other => return Err(token.wrap(Error::UnexpectedTokenInExpr { token: other })),
        };

        Ok(Expr { kind, span })
    }

    /// led: Parses the right-hand side of infix operators.
    fn parse_led(&mut self, infix: Infix, lhs: Expr, rbp: u8) -> Result<Expr> {
        let rhs = self.parse_expr_bp(rbp)?;
        let span = lhs.span.to(rhs.span);
        let kind = match infix {
            Infix::Assignment => ExprKind::Assignment {
                target: Box::new(lhs),
                value: Box::new(rhs),
            },
            Infix::Binary(op) => ExprKind::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
        };
        Ok(Expr { kind, span })
    }

    /// Parses calls and subscripts. The opening delimiter is already consumed.
    fn parse_postfix(&mut self, postfix: Postfix, lhs: Expr) -> Result<Expr> {
        let lo = lhs.span;
        let (kind, end) = match postfix {
            Postfix::Call => {
                let args =
                    self.parse_list(TokenKind::RParen, TokenKind::Comma, Parser::parse_expr)?;
                let end = self.consume(TokenKind::RParen)?;
                let call = ExprKind::Call {
                    callee: Box::new(lhs),
                    args,
                };
                (call, end)
            }
            Postfix::Subscript => {
                let index = self.parse_expr()?;
                let end = self.consume(TokenKind::RBracket)?;
                let subscript = ExprKind::Subscript {
                    target: Box::new(lhs),
                    index: Box::new(index),
                };
                (subscript, end)
            }
        };
        Ok(Expr {
            kind,
            span: lo.to(end.span()),
        })
    }

    /// Parses `item (separator item)*` until `end_delim` is found. The list may
    /// be empty. Does **NOT** consume the end delimiter.
    fn parse_list<T>(
        &mut self,
        end_delim: TokenKind,
        separator: TokenKind,
        parse_item: impl Fn(&mut Self) -> Result<T>,
    ) -> Result<Vec<T>> {
        debug_assert_ne!(end_delim, separator);

        let mut items = Vec::new();
        if self.is(end_delim) {
            return Ok(items);
        }
        loop {
            items.push(parse_item(self)?);
            if !self.take(separator)? {
                break;
            }
        }
        Ok(items)
    }

    fn infix_operator(kind: TokenKind) -> Option<(Infix, (u8, u8))> {
        use BinaryOperator::*;
        let op = match kind {
            // Assignment (right-associative)
            TokenKind::Assign => return Some((Infix::Assignment, (2, 1))),

            TokenKind::Or => Or,
            TokenKind::And => And,
            TokenKind::Eq => Eq,
            TokenKind::NotEq => NotEq,
            TokenKind::Less => Lt,
            TokenKind::LessEq => Le,
            TokenKind::Greater => Gt,
            TokenKind::GreaterEq => Ge,
            TokenKind::Plus => Add,
            TokenKind::Minus => Sub,
            TokenKind::Star => Mul,
            TokenKind::Slash => Div,
            TokenKind::Percent => Mod,
            TokenKind::Caret => Pow,
            _ => return None,
        };
        let bp = match op {
            Or => (3, 4),
            And => (5, 6),
            Eq | NotEq => (7, 8),
            Lt | Le | Gt | Ge => (9, 10),
            Add | Sub => (11, 12),
            Mul | Div | Mod => (13, 14),
            // Right-associative, binds less tightly than prefix operators.
            Pow => (16, 15),
        };
        Some((Infix::Binary(op), bp))
    }

    fn postfix_operator(kind: TokenKind) -> Option<Postfix> {
        match kind {
            TokenKind::LParen => Some(Postfix::Call),
            TokenKind::LBracket => Some(Postfix::Subscript),
            _ => None,
        }
    }
}

impl<'src> Parser<'src> {
    fn new(src: &'src str) -> Result<Parser<'src>> {
        let mut lexer = Lexer::new(src);
        let current = Self::checked(lexer.next_token())?;
        Ok(Parser {
            lexer,
            current,
            lookahead: None,
            prev_span: Span::new_of_length(0, 0),
            depth: 0,
        })
    }

    fn src(&self) -> &'src str {
        self.lexer.src()
    }

    /// Lexical errors are fatal as soon as the parser sees them.
    fn checked(token: Token) -> Result<Token> {
        match token.kind {
            TokenKind::Error(error) => Err(token.wrap(Error::Lexer(error))),
            _ => Ok(token),
        }
    }

    /// Returns the current token.
    fn peek(&self) -> Token {
        self.current
    }

    /// Returns the token after the current one, without advancing.
    fn lookahead(&mut self) -> Result<Token> {
        if let Some(token) = self.lookahead {
            return Ok(token);
        }
        let token = Self::checked(self.lexer.next_token())?;
        self.lookahead = Some(token);
        Ok(token)
    }

    /// Returns the current token and advances.
    fn advance(&mut self) -> Result<Token> {
        let next = match self.lookahead.take() {
            Some(token) => token,
            None => Self::checked(self.lexer.next_token())?,
        };
        self.prev_span = self.current.span();
        Ok(std::mem::replace(&mut self.current, next))
    }

    /// Checks whether the current token matches the given one.
    fn is(&self, expect: TokenKind) -> bool {
        self.current.kind == expect
    }

    /// Advances if the current token matches the provided one, returning true.
    /// If not, returns false and doesn't advance.
    fn take(&mut self, expect: TokenKind) -> Result<bool> {
        if self.is(expect) {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Advances if the current token matches the provided one, returning it.
    /// If not, fails with an error pointing at the current token.
    fn consume(&mut self, expect: TokenKind) -> Result<Token> {
        let c = self.peek();
        if self.is(expect) {
            self.advance()
        } else {
            Err(c.wrap(Error::Unexpected {
                actual: c.kind,
                expected: expect,
            }))
        }
    }

    /// Runs `f` one nesting level deeper, failing at the current token once
    /// [`MAX_NESTING_DEPTH`] is reached.
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(self.peek().wrap(Error::TooDeep));
        }
        self.depth += 1;
        let res = f(self);
        self.depth -= 1;
        res
    }

    /// Advances if the current token matches any of the provided tokens.
    fn consume_any(&mut self, expect: &'static [TokenKind]) -> Result<Token> {
        if expect.iter().any(|t| self.is(*t)) {
            return self.advance();
        }
        let c = self.peek();
        Err(c.wrap(Error::UnexpectedAny {
            actual: c.kind,
            expected: Box::from(expect),
        }))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    UnexpectedTokenInExpr {
        token: TokenKind,
    },
    Unexpected {
        actual: TokenKind,
        expected: TokenKind,
    },
    UnexpectedAny {
        actual: TokenKind,
        expected: Box<[TokenKind]>,
    },
    ExpectedType {
        actual: TokenKind,
    },
    ExpectedFunctionBody {
        actual: TokenKind,
    },
    ParseInt,
    TooDeep,
    Lexer(lexer::Error),
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::{parser, util::test_utils::tree_tests};

    tree_tests!(
        use parser;

        fn test_precedence_add_mul_pow() {
            let expr = "1 + 2 * 3 ^ 2";
            let tree_ok = "
                binary Add (0..13)
                  int 1 (0..1)
                  binary Mul (4..13)
                    int 2 (4..5)
                    binary Pow (8..13)
                      int 3 (8..9)
                      int 2 (12..13)
            ";
        }

        fn test_power_is_right_associative() {
            let expr = "2 ^ 3 ^ 2";
            let tree_ok = "
                binary Pow (0..9)
                  int 2 (0..1)
                  binary Pow (4..9)
                    int 3 (4..5)
                    int 2 (8..9)
            ";
        }

        fn test_subtraction_is_left_associative() {
            let expr = "a - b - c";
            let tree_ok = "
                binary Sub (0..9)
                  binary Sub (0..5)
                    ident a (0..1)
                    ident b (4..5)
                  ident c (8..9)
            ";
        }

        fn test_multiplicative_is_left_associative() {
            let expr = "a % b / c * d";
            let tree_ok = "
                binary Mul (0..13)
                  binary Div (0..9)
                    binary Mod (0..5)
                      ident a (0..1)
                      ident b (4..5)
                    ident c (8..9)
                  ident d (12..13)
            ";
        }

        fn test_assignment_is_right_associative() {
            let expr = "a = b = c + 1";
            let tree_ok = "
                assignment (0..13)
                  ident a (0..1)
                  assignment (4..13)
                    ident b (4..5)
                    binary Add (8..13)
                      ident c (8..9)
                      int 1 (12..13)
            ";
        }

        fn test_logical_and_comparison_levels() {
            let expr = "a || b && c == d < e";
            let tree_ok = "
                binary Or (0..20)
                  ident a (0..1)
                  binary And (5..20)
                    ident b (5..6)
                    binary Eq (10..20)
                      ident c (10..11)
                      binary Lt (15..20)
                        ident d (15..16)
                        ident e (19..20)
            ";
        }

        fn test_unary_binds_tighter_than_power() {
            let expr = "-2 ^ 2";
            let tree_ok = "
                binary Pow (0..6)
                  unary Neg (0..2)
                    int 2 (1..2)
                  int 2 (5..6)
            ";
        }

        fn test_postfix_chain_under_not() {
            let expr = "!f(x, 1)[i]";
            let tree_ok = "
                unary Not (0..11)
                  subscript (1..11)
                    call (1..8)
                      ident f (1..2)
                      arguments
                        ident x (3..4)
                        int 1 (6..7)
                    ident i (9..10)
            ";
        }

        fn test_parenthesized_expr() {
            let expr = "(1 + 2) * 3";
            let tree_ok = "
                binary Mul (0..11)
                  binary Add (0..7)
                    int 1 (1..2)
                    int 2 (5..6)
                  int 3 (10..11)
            ";
        }

        fn test_array_literal() {
            let expr = "{1, x, \"s\", 'c', true}";
            let tree_ok = "
                array (0..22)
                  int 1 (1..2)
                  ident x (4..5)
                  string \"s\" (7..10)
                  char 'c' (12..15)
                  bool true (17..21)
            ";
        }

        fn test_empty_array_literal() {
            let expr = "{}";
            let tree_ok = "array (0..2)";
        }

        fn test_variable_with_initializer() {
            let program = "x: integer = 5;";
            let tree_ok = "
                variable x: integer (initialized)
                  int 5 (13..14)
            ";
        }

        fn test_variable_without_initializer() {
            let program = "name: string;";
            let tree_ok = "variable name: string";
        }

        fn test_array_variable() {
            let program = "arr: array [3] integer = {1, 2, 3};";
            let tree_ok = "
                variable arr: array [3] integer (initialized)
                  array (25..34)
                    int 1 (26..27)
                    int 2 (29..30)
                    int 3 (32..33)
            ";
        }

        fn test_function_binding() {
            let program = "main: function integer () = {\n    return 0;\n}";
            let tree_ok = "
                function main: function integer ()
                  block (28..45)
                    return (34..43)
                      int 0 (41..42)
            ";
        }

        fn test_function_keyword_form() {
            let program = "function add(integer a, integer b): integer return a + b;";
            let tree_ok = "
                function add: function integer (a: integer, b: integer)
                  return (45..58)
                    binary Add (52..57)
                      ident a (52..53)
                      ident b (56..57)
            ";
        }

        fn test_function_prototype() {
            let program = "f: function void (s: string);";
            let tree_ok = "function f: function void (s: string) (prototype)";
        }

        fn test_statement_start_disambiguation() {
            let program = "main: function void () = {\n  x: integer = 5;\n  x = 5;\n}";
            let tree_ok = "
                function main: function void ()
                  block (25..55)
                    variable x: integer (initialized)
                      int 5 (42..43)
                    expr (47..53)
                      assignment (47..52)
                        ident x (47..48)
                        int 5 (51..52)
            ";
        }

        fn test_control_flow_statements() {
            let program = "f: function void () = {\n  // c\n  if (a) print a; else { return; }\n  for (;;) x;\n}";
            let tree_ok = r#"
                function f: function void ()
                  block (22..81)
                    comment "// c" (26..30)
                    if (33..65)
                      ident a (37..38)
                      then
                        print (40..48)
                          ident a (46..47)
                      else
                        block (54..65)
                          return (56..63)
                    for (68..79)
                      body
                        expr (77..79)
                          ident x (77..78)
            "#;
        }

        fn test_top_level_comments() {
            let program = "// one\n/* two\n three */";
            let tree_ok = r#"
                comment "// one" (0..6)
                comment "/* two\n three */" (7..23)
            "#;
        }

        fn test_error_missing_semicolon() {
            let program = "x: integer = 5";
            let expected_errors = &["1:15: expected token Semicolon, but got Eof"];
        }

        fn test_error_unmatched_paren_open() {
            let expr = "(1 + 2";
            let expected_errors = &["1:7: expected token RParen, but got Eof"];
        }

        fn test_error_unmatched_paren_close() {
            let program = "main: function void () = {\n  f(1, 2));\n}";
            let expected_errors = &["2:10: expected token Semicolon, but got RParen"];
        }

        fn test_error_unexpected_token_in_expr() {
            let expr = "1 + ;";
            let expected_errors = &["1:5: unexpected token Semicolon in expression"];
        }

        fn test_error_lexer_unexpected_char() {
            let expr = "$";
            let expected_errors = &["1:1: unexpected character"];
        }

        fn test_error_lexer_unclosed_string() {
            let program = "s: string = \"abc;";
            let expected_errors = &["1:13: unclosed string"];
        }

        fn test_error_lexer_unclosed_comment() {
            let program = "/* open";
            let expected_errors = &["1:1: unclosed comment"];
        }

        fn test_error_unknown_type() {
            let program = "x: foo;";
            let expected_errors = &["1:4: expected type, but got Identifier"];
        }

        fn test_error_function_binding_without_block() {
            let program = "f: function void () = return;";
            let expected_errors = &["1:23: expected function body block, but got Return"];
        }

        fn test_error_parse_int_too_large() {
            let expr = "99999999999999999999";
            let expected_errors = &["1:1: parse int error, out of bounds"];
        }

        fn test_error_statement_at_top_level() {
            let program = "print x;";
            let expected_errors = &["1:1: expected one of [Identifier, Function], but got Print"];
        }

        fn test_error_lexer_nul_byte() {
            let program = "x: integer = 1;\0 y: integer;";
            let expected_errors = &["1:16: unexpected character"];
        }

        fn test_error_empty_print() {
            let program = "f: function void () = { print; }";
            let expected_errors = &["1:30: unexpected token Semicolon in expression"];
        }
    );

    #[test]
    fn test_deep_nesting_is_an_error() {
        let parens = format!("{}1{}", "(".repeat(100_000), ")".repeat(100_000));
        let error = parser::parse_expr(&parens).unwrap_err();
        assert_eq!(error.inner, parser::Error::TooDeep);
        assert_eq!(format!("{error:#}"), "1:129: nesting too deep (limit is 128)");

        let blocks = format!(
            "main: function void () = {}{}",
            "{".repeat(100_000),
            "}".repeat(100_000)
        );
        let error = parser::parse_program(&blocks).unwrap_err();
        assert_eq!(error.inner, parser::Error::TooDeep);

        let arrays = format!("x: {}integer;", "array [1] ".repeat(100_000));
        let error = parser::parse_program(&arrays).unwrap_err();
        assert_eq!(error.inner, parser::Error::TooDeep);
    }

    #[test]
    fn test_nesting_below_limit_parses() {
        let depth = parser::MAX_NESTING_DEPTH - 2;
        let parens = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
        assert!(parser::parse_expr(&parens).is_ok());
    }
}
