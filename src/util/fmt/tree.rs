use std::io::{self, Write};

use crate::{
    ast::*,
    util::fmt::source::{function_type_string, type_string},
};

const INDENT_WIDTH: usize = 2;

pub fn print_program_string(program: &Program) -> String {
    let mut buf = Vec::with_capacity(1024);
    print_program(&mut buf, program).expect("writing to a Vec should not fail");
    String::from_utf8(buf).expect("tree output should be utf-8")
}

pub fn print_expr_string(expr: &Expr) -> String {
    let mut buf = Vec::with_capacity(512);
    print_expr(&mut buf, 0, expr).expect("writing to a Vec should not fail");
    String::from_utf8(buf).expect("tree output should be utf-8")
}

pub fn print_program(w: &mut impl Write, program: &Program) -> io::Result<()> {
    for decl in &program.decls {
        print_decl(w, 0, decl)?;
    }
    Ok(())
}

fn print_decl(w: &mut impl Write, i: usize, decl: &Decl) -> io::Result<()> {
    sp(w, i)?;
    match decl {
        Decl::Variable(Variable {
            name,
            ty,
            initializer,
        }) => {
            write!(w, "variable {name}: {}", type_string(ty))?;
            if let Some(initializer) = initializer {
                writeln!(w, " (initialized)")?;
                print_expr(w, i + 1, initializer)?;
            } else {
                writeln!(w)?;
            }
        }
        Decl::Function(Function { name, ty, body }) => {
            let ty = function_type_string(ty);
            write!(w, "function {name}: {ty}")?;
            match body {
                Some(body) => {
                    writeln!(w)?;
                    print_stmt(w, i + 1, body)?;
                }
                None => writeln!(w, " (prototype)")?,
            }
        }
        Decl::Comment(Comment { text, span, .. }) => {
            writeln!(w, "comment {text:?} ({span})")?;
        }
    }
    Ok(())
}

fn print_stmt(w: &mut impl Write, i: usize, stmt: &Stmt) -> io::Result<()> {
    let span = stmt.span;
    match &stmt.kind {
        StmtKind::Decl(decl) => print_decl(w, i, decl)?,
        StmtKind::Expr(expr) => {
            sp(w, i)?;
            writeln!(w, "expr ({span})")?;
            print_expr(w, i + 1, expr)?;
        }
        StmtKind::If {
            predicate,
            then_arm,
            else_arm,
        } => {
            sp(w, i)?;
            writeln!(w, "if ({span})")?;
            print_expr(w, i + 1, predicate)?;
            sp(w, i + 1)?;
            writeln!(w, "then")?;
            print_stmt(w, i + 2, then_arm)?;
            if let Some(else_arm) = else_arm {
                sp(w, i + 1)?;
                writeln!(w, "else")?;
                print_stmt(w, i + 2, else_arm)?;
            }
        }
        StmtKind::For {
            init,
            predicate,
            step,
            body,
        } => {
            sp(w, i)?;
            writeln!(w, "for ({span})")?;
            let clauses = [("init", init), ("predicate", predicate), ("step", step)];
            for (label, clause) in clauses {
                if let Some(clause) = clause {
                    sp(w, i + 1)?;
                    writeln!(w, "{label}")?;
                    print_expr(w, i + 2, clause)?;
                }
            }
            sp(w, i + 1)?;
            writeln!(w, "body")?;
            print_stmt(w, i + 2, body)?;
        }
        StmtKind::Print(args) => {
            sp(w, i)?;
            writeln!(w, "print ({span})")?;
            for arg in args {
                print_expr(w, i + 1, arg)?;
            }
        }
        StmtKind::Return(value) => {
            sp(w, i)?;
            writeln!(w, "return ({span})")?;
            if let Some(value) = value {
                print_expr(w, i + 1, value)?;
            }
        }
        StmtKind::Block(body) => {
            sp(w, i)?;
            writeln!(w, "block ({span})")?;
            for stmt in body {
                print_stmt(w, i + 1, stmt)?;
            }
        }
        StmtKind::Comment(Comment { text, .. }) => {
            sp(w, i)?;
            writeln!(w, "comment {text:?} ({span})")?;
        }
    }
    Ok(())
}

pub fn print_expr(w: &mut impl Write, i: usize, expr: &Expr) -> io::Result<()> {
    sp(w, i)?;
    let span = expr.span;
    match &expr.kind {
        ExprKind::Assignment { target, value } => {
            writeln!(w, "assignment ({span})")?;
            print_expr(w, i + 1, target)?;
            print_expr(w, i + 1, value)?;
        }
        ExprKind::Call { callee, args } => {
            writeln!(w, "call ({span})")?;
            print_expr(w, i + 1, callee)?;
            if !args.is_empty() {
                sp(w, i + 1)?;
                writeln!(w, "arguments")?;
                for arg in args {
                    print_expr(w, i + 2, arg)?;
                }
            }
        }
        ExprKind::Subscript { target, index } => {
            writeln!(w, "subscript ({span})")?;
            print_expr(w, i + 1, target)?;
            print_expr(w, i + 1, index)?;
        }
        ExprKind::Unary {
            op,
            expr: inner_expr,
        } => {
            writeln!(w, "unary {op:?} ({span})")?;
            print_expr(w, i + 1, inner_expr)?;
        }
        ExprKind::Binary { op, lhs, rhs } => {
            writeln!(w, "binary {op:?} ({span})")?;
            print_expr(w, i + 1, lhs)?;
            print_expr(w, i + 1, rhs)?;
        }
        ExprKind::Array(elements) => {
            writeln!(w, "array ({span})")?;
            for element in elements {
                print_expr(w, i + 1, element)?;
            }
        }
        ExprKind::Id(ident) => writeln!(w, "ident {ident} ({span})")?,
        ExprKind::Int(int) => writeln!(w, "int {int} ({span})")?,
        ExprKind::String(raw) => writeln!(w, "string \"{raw}\" ({span})")?,
        ExprKind::Char(c) => writeln!(w, "char {c:?} ({span})")?,
        ExprKind::Bool(b) => writeln!(w, "bool {b} ({span})")?,
    }
    Ok(())
}

fn sp(w: &mut impl Write, i: usize) -> io::Result<()> {
    write!(w, "{:width$}", "", width = i * INDENT_WIDTH)
}
