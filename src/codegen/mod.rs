use std::{
    fmt::{self, Write},
    format_args as f,
};

use crate::ast::*;

mod symbols;
pub use symbols::SymbolTable;


/// Emitted before any declaration.
pub const HEADER: &str = "\
    #include <stdio.h>\n\
    #include <stdlib.h>\n\
    #include <string.h>\n\
    #include <math.h>\n\
    \n";

const DEFAULT_CODE_CAPACITY: usize = 4 * 1024; // 4 KiB

const DEFAULT_SYMBOLS_CAPACITY: usize = 64;

/// Translates a B-Minor program into C source text.
///
/// Each generator owns its own [`SymbolTable`], so separate runs never see
/// each other's declarations.
pub struct CodeGen {
    code: String,
    symbols: SymbolTable,
    indent: usize,
}

impl CodeGen {
    pub fn with_capacity(capacity: usize) -> CodeGen {
        CodeGen {
            code: String::with_capacity(capacity),
            symbols: SymbolTable::with_capacity(DEFAULT_SYMBOLS_CAPACITY),
            indent: 0,
        }
    }

    pub fn gen(mut self, program: &Program) -> String {
        self.code.push_str(HEADER);
        for decl in &program.decls {
            tracing::trace!(offset = self.code.len(), "emitting declaration");
            self.gen_decl(decl);
            // Top-level declarations are separated by a blank line.
            self.emit(f!("\n"));
        }
        tracing::debug!(
            bytes = self.code.len(),
            symbols = self.symbols.len(),
            "generated C code"
        );
        self.code
    }

    fn gen_decl(&mut self, decl: &Decl) {
        match decl {
            Decl::Variable(variable) => self.gen_variable(variable),
            Decl::Function(function) => self.gen_function(function),
            Decl::Comment(comment) => self.gen_comment(comment),
        }
    }

    fn gen_variable(
        &mut self,
        Variable {
            name,
            ty,
            initializer,
        }: &Variable,
    ) {
        self.start_line();
        self.gen_type(ty);
        self.emit(f!(" {name}"));
        self.gen_array_sizes(ty);
        if let Some(initializer) = initializer {
            self.emit(f!(" = "));
            self.gen_expr(initializer);
        }
        self.emit(f!(";\n"));
        self.symbols.insert_or_update(&name.name, ty.element_kind());
    }

    fn gen_function(&mut self, Function { name, ty, body }: &Function) {
        self.symbols.insert_or_update(&name.name, TypeKind::Function);

        self.start_line();
        self.gen_type(&ty.return_ty);
        self.emit(f!(" {name}("));
        for (idx, param) in ty.params.iter().enumerate() {
            if idx > 0 {
                self.emit(f!(", "));
            }
            self.gen_type(&param.ty);
            self.emit(f!(" {}", param.name));
            self.gen_array_sizes(&param.ty);
            self.symbols
                .insert_or_update(&param.name.name, param.ty.element_kind());
        }

        let Some(body) = body else {
            self.emit(f!(");\n"));
            return;
        };
        self.emit(f!(") {{\n"));
        self.gen_braced_body(body);
        self.start_line();
        self.emit(f!("}}\n"));
    }

    fn gen_comment(&mut self, comment: &Comment) {
        match comment.kind {
            CommentKind::Inline => {
                self.start_line();
                self.emit(f!("{}\n", comment.text.trim_end_matches('\r')));
            }
            CommentKind::Multiline => {
                let inner = comment.text.get(2..).unwrap_or_default();
                let inner = inner.strip_suffix("*/").unwrap_or(inner);

                self.start_line();
                self.emit(f!("/*\n"));
                for line in inner.lines().filter(|line| !line.is_empty()) {
                    self.start_line();
                    self.emit(f!(" * {line}\n"));
                }
                self.start_line();
                self.emit(f!(" */\n"));
            }
        }
    }

    fn gen_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Decl(decl) => self.gen_decl(decl),
            StmtKind::Expr(expr) => {
                self.start_line();
                self.gen_expr(expr);
                self.emit(f!(";\n"));
            }
            StmtKind::If {
                predicate,
                then_arm,
                else_arm,
            } => {
                self.start_line();
                self.emit(f!("if ("));
                self.gen_expr(predicate);
                self.emit(f!(") {{\n"));
                self.gen_braced_body(then_arm);
                self.start_line();
                self.emit(f!("}}\n"));

                if let Some(else_arm) = else_arm {
                    self.start_line();
                    self.emit(f!("else {{\n"));
                    self.gen_braced_body(else_arm);
                    self.start_line();
                    self.emit(f!("}}\n"));
                }
            }
            StmtKind::For {
                init,
                predicate,
                step,
                body,
            } => {
                self.start_line();
                self.emit(f!("for ("));
                if let Some(init) = init {
                    self.gen_expr(init);
                }
                self.emit(f!("; "));
                if let Some(predicate) = predicate {
                    self.gen_expr(predicate);
                }
                self.emit(f!("; "));
                if let Some(step) = step {
                    self.gen_expr(step);
                }
                self.emit(f!(") {{\n"));
                self.gen_braced_body(body);
                self.start_line();
                self.emit(f!("}}\n"));
            }
            StmtKind::Print(args) => self.gen_print(args),
            StmtKind::Return(value) => {
                self.start_line();
                self.emit(f!("return"));
                if let Some(value) = value {
                    self.emit(f!(" "));
                    self.gen_expr(value);
                }
                self.emit(f!(";\n"));
            }
            StmtKind::Block(body) => {
                self.start_line();
                self.emit(f!("{{\n"));
                self.indented(|this| {
                    for stmt in body {
                        this.gen_stmt(stmt);
                    }
                });
                self.start_line();
                self.emit(f!("}}\n"));
            }
            StmtKind::Comment(comment) => self.gen_comment(comment),
        }
    }

    /// Emits a body that goes between braces the caller already emits. A
    /// block body contributes its statements only.
    fn gen_braced_body(&mut self, body: &Stmt) {
        self.indented(|this| match &body.kind {
            StmtKind::Block(stmts) => {
                for stmt in stmts {
                    this.gen_stmt(stmt);
                }
            }
            _ => this.gen_stmt(body),
        });
    }

    /// String literals become part of the format string; every other argument
    /// gets a conversion picked from its type and is passed after it.
    fn gen_print(&mut self, args: &[Expr]) {
        let mut format = String::with_capacity(32);
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            if let ExprKind::String(raw) = &arg.kind {
                escape_c_string(&mut format, raw, true);
            } else {
                format.push_str(self.format_specifier(arg));
                values.push(arg);
            }
        }

        self.start_line();
        self.emit(f!("printf(\"{format}\""));
        for value in values {
            self.emit(f!(", "));
            self.gen_expr(value);
        }
        self.emit(f!(");\n"));
    }

    fn format_specifier(&self, expr: &Expr) -> &'static str {
        let is_string = |ident: &Ident| self.symbols.lookup(&ident.name) == TypeKind::String;
        match &expr.kind {
            ExprKind::Id(ident) if is_string(ident) => "%s",
            ExprKind::Subscript { target, .. } if target.as_id().is_some_and(is_string) => "%c",
            _ => "%d",
        }
    }

    fn gen_expr(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Assignment { target, value } => {
                self.gen_expr(target);
                self.emit(f!(" = "));
                self.gen_expr(value);
            }
            ExprKind::Call { callee, args } => {
                self.gen_expr(callee);
                self.emit(f!("("));
                self.gen_list(args);
                self.emit(f!(")"));
            }
            ExprKind::Subscript { target, index } => {
                self.gen_expr(target);
                self.emit(f!("["));
                self.gen_expr(index);
                self.emit(f!("]"));
            }
            ExprKind::Unary {
                op: UnaryOperator::Neg,
                expr,
            } => {
                self.emit(f!("(-"));
                self.gen_expr(expr);
                self.emit(f!(")"));
            }
            ExprKind::Unary {
                op: UnaryOperator::Not,
                expr,
            } => {
                self.emit(f!("!"));
                self.gen_expr(expr);
            }
            ExprKind::Binary {
                op: BinaryOperator::Pow,
                lhs,
                rhs,
            } => {
                self.emit(f!("pow("));
                self.gen_expr(lhs);
                self.emit(f!(", "));
                self.gen_expr(rhs);
                self.emit(f!(")"));
            }
            ExprKind::Binary { op, lhs, rhs } => {
                self.emit(f!("("));
                self.gen_expr(lhs);
                self.emit(f!(" {} ", op.symbol()));
                self.gen_expr(rhs);
                self.emit(f!(")"));
            }
            ExprKind::Array(elements) if elements.is_empty() => self.emit(f!("{{0, 0, 0}}")),
            ExprKind::Array(elements) => {
                self.emit(f!("{{"));
                self.gen_list(elements);
                self.emit(f!("}}"));
            }
            ExprKind::Id(ident) => self.emit(f!("{ident}")),
            ExprKind::Int(int) => self.emit(f!("{int}")),
            ExprKind::String(raw) => {
                let mut escaped = String::with_capacity(raw.len() + 2);
                escape_c_string(&mut escaped, raw, false);
                self.emit(f!("\"{escaped}\""));
            }
            ExprKind::Char(c) => match c {
                '\0' => self.emit(f!(r"'\0'")),
                '\n' => self.emit(f!(r"'\n'")),
                '\t' => self.emit(f!(r"'\t'")),
                '\\' => self.emit(f!(r"'\\'")),
                '\'' => self.emit(f!(r"'\''")),
                c => self.emit(f!("'{c}'")),
            },
            ExprKind::Bool(b) => self.emit(f!("{}", u8::from(*b))),
        }
    }

    fn gen_list(&mut self, exprs: &[Expr]) {
        for (idx, expr) in exprs.iter().enumerate() {
            if idx > 0 {
                self.emit(f!(", "));
            }
            self.gen_expr(expr);
        }
    }

    /// Arrays emit their element type; the sizes follow the declared name.
    fn gen_type(&mut self, ty: &Type) {
        let name = match ty {
            Type::Void => "void",
            Type::Boolean | Type::Integer => "int",
            Type::Char => "char",
            Type::String => "char*",
            Type::Array { element, .. } => return self.gen_type(element),
            Type::Function(function) => return self.gen_type(&function.return_ty),
        };
        self.emit(f!("{name}"));
    }

    fn gen_array_sizes(&mut self, mut ty: &Type) {
        while let Type::Array { element, size } = ty {
            self.emit(f!("["));
            self.gen_expr(size);
            self.emit(f!("]"));
            ty = element;
        }
    }
}

impl Default for CodeGen {
    fn default() -> CodeGen {
        CodeGen::with_capacity(DEFAULT_CODE_CAPACITY)
    }
}

/// Escapes a raw B-Minor string body for a C string literal. Escape sequences
/// written in the source pass through untouched.
fn escape_c_string(out: &mut String, raw: &str, is_format: bool) {
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        match c {
            '\n' => out.push_str(r"\n"),
            '"' => out.push_str(r#"\""#),
            '\\' => {
                out.push('\\');
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            }
            '%' if is_format => out.push_str("%%"),
            c => out.push(c),
        }
    }
}

// Utility functions.
impl CodeGen {
    fn emit(&mut self, f: fmt::Arguments<'_>) {
        self.code
            .write_fmt(f)
            .expect("code emit should be infallible");
    }

    /// Indents the current line, one tab per nesting level.
    fn start_line(&mut self) {
        for _ in 0..self.indent {
            self.code.push('\t');
        }
    }

    fn indented<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        self.indent += 1;
        let res = f(self);
        self.indent -= 1;
        res
    }
}
