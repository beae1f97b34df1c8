use std::io::{self, Write};

use crate::ast::*;

const INDENT_WIDTH: usize = 4;

fn sp(w: &mut impl Write, i: usize) -> io::Result<()> {
    write!(w, "{:width$}", "", width = i * INDENT_WIDTH)
}

pub fn print_program_string(program: &Program) -> String {
    let mut buf = Vec::with_capacity(1024);
    print_program(&mut buf, program).expect("writing to a Vec should not fail");
    String::from_utf8(buf).expect("source output should be utf-8")
}

pub fn print_expr_string(expr: &Expr) -> String {
    let mut buf = Vec::with_capacity(64);
    print_expr(&mut buf, expr).expect("writing to a Vec should not fail");
    String::from_utf8(buf).expect("source output should be utf-8")
}

pub fn type_string(ty: &Type) -> String {
    let mut buf = Vec::with_capacity(32);
    print_type(&mut buf, ty).expect("writing to a Vec should not fail");
    String::from_utf8(buf).expect("source output should be utf-8")
}

pub fn function_type_string(ty: &FunctionType) -> String {
    let mut buf = Vec::with_capacity(32);
    print_function_type(&mut buf, ty).expect("writing to a Vec should not fail");
    String::from_utf8(buf).expect("source output should be utf-8")
}

/// Prints the program back as B-Minor source. Every compound expression is
/// parenthesized, so parsing the output yields the same tree.
pub fn print_program(w: &mut impl Write, program: &Program) -> io::Result<()> {
    for decl in &program.decls {
        print_decl(w, 0, decl)?;
    }
    Ok(())
}

/// Expects the cursor to be already indented.
fn print_decl(w: &mut impl Write, i: usize, decl: &Decl) -> io::Result<()> {
    match decl {
        Decl::Variable(Variable {
            name,
            ty,
            initializer,
        }) => {
            write!(w, "{name}: ")?;
            print_type(w, ty)?;
            if let Some(initializer) = initializer {
                write!(w, " = ")?;
                print_expr(w, initializer)?;
            }
            writeln!(w, ";")
        }
        Decl::Function(Function {
            name,
            ty,
            body: Some(body),
        }) => {
            write!(w, "function {name}(")?;
            for (idx, param) in ty.params.iter().enumerate() {
                if idx > 0 {
                    write!(w, ", ")?;
                }
                print_type(w, &param.ty)?;
                write!(w, " {}", param.name)?;
            }
            write!(w, ") : ")?;
            print_type(w, &ty.return_ty)?;
            writeln!(w)?;
            print_stmt(w, i, body)
        }
        Decl::Function(Function {
            name,
            ty,
            body: None,
        }) => {
            write!(w, "{name}: ")?;
            print_function_type(w, ty)?;
            writeln!(w, ";")
        }
        Decl::Comment(comment) => writeln!(w, "{}", comment.text),
    }
}

fn print_stmt(w: &mut impl Write, i: usize, stmt: &Stmt) -> io::Result<()> {
    sp(w, i)?;
    match &stmt.kind {
        StmtKind::Decl(decl) => print_decl(w, i, decl)?,
        StmtKind::Expr(expr) => {
            print_expr(w, expr)?;
            writeln!(w, ";")?;
        }
        StmtKind::If {
            predicate,
            then_arm,
            else_arm,
        } => {
            write!(w, "if (")?;
            print_expr(w, predicate)?;
            writeln!(w, ")")?;
            print_stmt(w, i + 1, then_arm)?;
            if let Some(else_arm) = else_arm {
                sp(w, i)?;
                writeln!(w, "else")?;
                print_stmt(w, i + 1, else_arm)?;
            }
        }
        StmtKind::For {
            init,
            predicate,
            step,
            body,
        } => {
            write!(w, "for (")?;
            print_optional_expr(w, init.as_ref())?;
            write!(w, "; ")?;
            print_optional_expr(w, predicate.as_ref())?;
            write!(w, "; ")?;
            print_optional_expr(w, step.as_ref())?;
            writeln!(w, ")")?;
            print_stmt(w, i + 1, body)?;
        }
        StmtKind::Print(args) => {
            write!(w, "print ")?;
            print_list(w, args)?;
            writeln!(w, ";")?;
        }
        StmtKind::Return(value) => {
            write!(w, "return")?;
            if let Some(value) = value {
                write!(w, " ")?;
                print_expr(w, value)?;
            }
            writeln!(w, ";")?;
        }
        StmtKind::Block(body) => {
            writeln!(w, "{{")?;
            for stmt in body {
                print_stmt(w, i + 1, stmt)?;
            }
            sp(w, i)?;
            writeln!(w, "}}")?;
        }
        StmtKind::Comment(comment) => writeln!(w, "{}", comment.text)?,
    }
    Ok(())
}

fn print_optional_expr(w: &mut impl Write, expr: Option<&Expr>) -> io::Result<()> {
    match expr {
        Some(expr) => print_expr(w, expr),
        None => Ok(()),
    }
}

fn print_list(w: &mut impl Write, exprs: &[Expr]) -> io::Result<()> {
    for (idx, expr) in exprs.iter().enumerate() {
        if idx > 0 {
            write!(w, ", ")?;
        }
        print_expr(w, expr)?;
    }
    Ok(())
}

pub fn print_expr(w: &mut impl Write, expr: &Expr) -> io::Result<()> {
    match &expr.kind {
        ExprKind::Assignment { target, value } => {
            write!(w, "(")?;
            print_expr(w, target)?;
            write!(w, " = ")?;
            print_expr(w, value)?;
            write!(w, ")")
        }
        ExprKind::Call { callee, args } => {
            print_expr(w, callee)?;
            write!(w, "(")?;
            print_list(w, args)?;
            write!(w, ")")
        }
        ExprKind::Subscript { target, index } => {
            print_expr(w, target)?;
            write!(w, "[")?;
            print_expr(w, index)?;
            write!(w, "]")
        }
        ExprKind::Unary { op, expr } => {
            let op = match op {
                UnaryOperator::Neg => "-",
                UnaryOperator::Not => "!",
            };
            write!(w, "({op}")?;
            print_expr(w, expr)?;
            write!(w, ")")
        }
        ExprKind::Binary { op, lhs, rhs } => {
            write!(w, "(")?;
            print_expr(w, lhs)?;
            write!(w, " {} ", op.symbol())?;
            print_expr(w, rhs)?;
            write!(w, ")")
        }
        ExprKind::Array(elements) => {
            write!(w, "{{")?;
            print_list(w, elements)?;
            write!(w, "}}")
        }
        ExprKind::Id(ident) => write!(w, "{ident}"),
        ExprKind::Int(int) => write!(w, "{int}"),
        ExprKind::String(raw) => write!(w, "\"{raw}\""),
        ExprKind::Char(c) => match c {
            '\0' => write!(w, "''"),
            '\n' => write!(w, r"'\n'"),
            '\t' => write!(w, r"'\t'"),
            '\\' => write!(w, r"'\\'"),
            '\'' => write!(w, r"'\''"),
            c => write!(w, "'{c}'"),
        },
        ExprKind::Bool(b) => write!(w, "{b}"),
    }
}

pub fn print_type(w: &mut impl Write, ty: &Type) -> io::Result<()> {
    match ty {
        Type::Void => write!(w, "void"),
        Type::Boolean => write!(w, "boolean"),
        Type::Char => write!(w, "char"),
        Type::Integer => write!(w, "integer"),
        Type::String => write!(w, "string"),
        Type::Array { element, size } => {
            write!(w, "array [")?;
            print_expr(w, size)?;
            write!(w, "] ")?;
            print_type(w, element)
        }
        Type::Function(ty) => print_function_type(w, ty),
    }
}

fn print_function_type(w: &mut impl Write, ty: &FunctionType) -> io::Result<()> {
    write!(w, "function ")?;
    print_type(w, &ty.return_ty)?;
    write!(w, " (")?;
    for (idx, param) in ty.params.iter().enumerate() {
        if idx > 0 {
            write!(w, ", ")?;
        }
        write!(w, "{}: ", param.name)?;
        print_type(w, &param.ty)?;
    }
    write!(w, ")")
}
