/// The lexer takes the source input, mapping it into a sequence of tokens.
pub mod lexer;

/// The parser takes a sequence of tokens, mapping it into an AST.
pub mod parser;

/// The code generator takes an AST and emits the equivalent C program.
pub mod codegen;

/// The driver reads a source file, compiles it and writes the C file next to
/// it.
pub mod driver;

pub mod ast;
pub mod token;
pub mod util;

use crate::{codegen::CodeGen, token::Spanned};

/// Compiles B-Minor source text into C source text.
pub fn compile(src: &str) -> Result<String, Spanned<parser::Error>> {
    let program = parser::parse_program(src)?;
    let code = CodeGen::default().gen(&program);
    tracing::debug!(src_len = src.len(), code_len = code.len(), "compiled");
    Ok(code)
}
