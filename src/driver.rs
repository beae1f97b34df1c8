use std::{
    fs, io,
    path::{Path, PathBuf},
};

use crate::{parser, token::Spanned};

/// Input compiled when no path is given.
pub const DEFAULT_INPUT: &str = "example.b";

/// Appended to the input path to form the output path.
pub const OUTPUT_EXTENSION: &str = ".c";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("could not read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{}:{diagnostic:#}", path.display())]
    Compile {
        path: PathBuf,
        #[source]
        diagnostic: Spanned<parser::Error>,
    },

    #[error("could not write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// `example.b` becomes `example.b.c`.
pub fn output_path_for(input: &Path) -> PathBuf {
    let mut path = input.as_os_str().to_owned();
    path.push(OUTPUT_EXTENSION);
    PathBuf::from(path)
}

/// Compiles the file at `input`, writing the C code to `output` (or next to
/// the input when `None`). Returns the path written to.
///
/// Nothing is written unless compilation succeeds.
pub fn compile_file(input: &Path, output: Option<&Path>) -> Result<PathBuf, Error> {
    let src = fs::read_to_string(input).map_err(|source| Error::Read {
        path: input.to_owned(),
        source,
    })?;
    tracing::info!(input = %input.display(), bytes = src.len(), "compiling");

    let code = crate::compile(&src).map_err(|diagnostic| Error::Compile {
        path: input.to_owned(),
        diagnostic,
    })?;

    let output = output.map_or_else(|| output_path_for(input), Path::to_owned);
    fs::write(&output, code).map_err(|source| Error::Write {
        path: output.clone(),
        source,
    })?;
    tracing::info!(output = %output.display(), "wrote C output");

    Ok(output)
}

#[cfg(test)]
mod tests {
    use std::{env, fs, path::PathBuf};

    use pretty_assertions::assert_eq;

    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = env::temp_dir().join(format!("bminor-driver-{name}-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_output_path_appends_extension() {
        assert_eq!(
            output_path_for(Path::new("dir/example.b")),
            PathBuf::from("dir/example.b.c")
        );
        assert_eq!(output_path_for(Path::new("noext")), PathBuf::from("noext.c"));
    }

    #[test]
    fn test_compile_file_writes_next_to_input() {
        let dir = scratch_dir("ok");
        let input = dir.join("example.b");
        fs::write(&input, include_str!("../demos/example.b")).unwrap();

        let output = compile_file(&input, None).unwrap();
        assert_eq!(output, dir.join("example.b.c"));
        assert_eq!(
            fs::read_to_string(&output).unwrap(),
            include_str!("../demos/example.b.c")
        );

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_compile_file_explicit_output() {
        let dir = scratch_dir("explicit");
        let input = dir.join("in.b");
        let output = dir.join("out.c");
        fs::write(&input, "x: integer = 1;").unwrap();

        assert_eq!(compile_file(&input, Some(&output)).unwrap(), output);
        assert!(fs::read_to_string(&output).unwrap().ends_with("int x = 1;\n\n"));

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_compile_error_writes_nothing() {
        let dir = scratch_dir("bad");
        let input = dir.join("bad.b");
        fs::write(&input, "x: integer = 1\ny: integer;").unwrap();

        let error = compile_file(&input, None).unwrap_err();
        assert!(matches!(error, Error::Compile { .. }));
        assert_eq!(
            error.to_string(),
            format!(
                "{}:2:1: expected token Semicolon, but got Identifier",
                input.display()
            )
        );
        assert!(!output_path_for(&input).exists());

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_missing_input_is_read_error() {
        let dir = scratch_dir("missing");
        let error = compile_file(&dir.join("nope.b"), None).unwrap_err();
        assert!(matches!(error, Error::Read { .. }));

        fs::remove_dir_all(dir).unwrap();
    }
}
