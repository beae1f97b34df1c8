use std::{
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
};

use bminor::{
    driver, lexer, parser,
    util::fmt::{source, tree},
};
use clap::{error::ErrorKind, CommandFactory, Parser};
use tracing_subscriber::{fmt, EnvFilter};

/// Compiles B-Minor source into C.
#[derive(clap::Parser)]
#[command(version)]
struct Args {
    /// Source file to compile.
    #[arg(default_value = driver::DEFAULT_INPUT)]
    input: PathBuf,

    /// Where to write the C output. Defaults to the input path plus `.c`.
    /// Only valid with `--emit c`.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// What to produce. Anything other than `c` is printed to stdout.
    #[arg(long, value_enum, default_value_t = Emit::C)]
    emit: Emit,

    /// Increases log verbosity (`-v` info, `-vv` debug, `-vvv` trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Copy, Clone, PartialEq, Eq, clap::ValueEnum)]
#[clap(rename_all = "snake_case")]
enum Emit {
    C,
    Tokens,
    Ast,
    Source,
}

impl Args {
    /// Rejects flag combinations clap can't express on its own.
    fn check(&self) -> Result<(), clap::Error> {
        if self.output.is_some() && self.emit != Emit::C {
            return Err(Args::command().error(
                ErrorKind::ArgumentConflict,
                "`--output` only applies to `--emit c`; other forms are printed to stdout",
            ));
        }
        Ok(())
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    if let Err(error) = args.check() {
        error.exit();
    }
    init_tracing(args.verbose);

    let result = match args.emit {
        Emit::C => driver::compile_file(&args.input, args.output.as_deref()).map(|_| ()),
        emit => inspect(&args.input, emit),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{error}");
            ExitCode::FAILURE
        }
    }
}

/// Prints an intermediate form of the input instead of compiling it.
fn inspect(input: &Path, emit: Emit) -> Result<(), driver::Error> {
    let src = fs::read_to_string(input).map_err(|source| driver::Error::Read {
        path: input.to_owned(),
        source,
    })?;
    if emit == Emit::Tokens {
        for token in lexer::lex_in_new(&src) {
            println!("{token:?}");
        }
        return Ok(());
    }

    let program = parser::parse_program(&src).map_err(|diagnostic| driver::Error::Compile {
        path: input.to_owned(),
        diagnostic,
    })?;
    match emit {
        Emit::Ast => print!("{}", tree::print_program_string(&program)),
        _ => print!("{}", source::print_program_string(&program)),
    }
    Ok(())
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
