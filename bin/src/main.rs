use std::{
    io::{stderr, stdin, stdout, BufRead, Write},
    path::PathBuf,
    process::ExitCode,
};

use anyhow::Context;
use clap::Parser as _;
use itertools::Itertools;

use errors::{ErrorReporter, Reporter};
use interpreter::Interpreter;
use parser::Parser;
use scanner::Scanner;

// sysexits.h
const EX_DATAERR: u8 = 65;
const EX_SOFTWARE: u8 = 70;

/// Evaluates Slang expressions, from a file or line by line from a prompt.
#[derive(clap::Parser)]
#[command(version)]
struct Args {
    /// Source file. Starts an interactive prompt when omitted.
    file: Option<PathBuf>,

    /// Print the scanned tokens before evaluating.
    #[arg(long)]
    tokens: bool,

    /// Print the parsed expression tree before evaluating.
    #[arg(long)]
    ast: bool,
}

/// Runs sources through the pipeline, writing values to `out` and errors to
/// `err`.
struct Driver<O, E> {
    interpreter: Interpreter,
    reporter: ErrorReporter,
    print_tokens: bool,
    print_ast: bool,
    out: O,
    err: E,
}

impl<O: Write, E: Write> Driver<O, E> {
    fn new(print_tokens: bool, print_ast: bool, out: O, err: E) -> Self {
        Self {
            interpreter: Interpreter::new(),
            reporter: ErrorReporter::new(),
            print_tokens,
            print_ast,
            out,
            err,
        }
    }

    fn run_file(&mut self, path: PathBuf) -> anyhow::Result<u8> {
        let source = std::fs::read_to_string(&path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        self.run(&source)?;
        Ok(self.exit_status())
    }

    /// 65 after a lexical or syntax error, 70 after a runtime error, 0 otherwise.
    fn exit_status(&self) -> u8 {
        if self.reporter.had_error() {
            EX_DATAERR
        } else if self.reporter.had_runtime_error() {
            EX_SOFTWARE
        } else {
            0
        }
    }

    fn run_prompt(&mut self, mut input: impl BufRead) -> anyhow::Result<u8> {
        loop {
            write!(self.out, "> ")?;
            self.out.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                writeln!(self.out)?;
                return Ok(0);
            }
            self.run_line(&line)?;
        }
    }

    /// Runs one prompt line on its own: errors of earlier lines are forgotten.
    fn run_line(&mut self, line: &str) -> anyhow::Result<()> {
        let line = line.trim_end_matches(&['\n', '\r'][..]);
        if !line.trim().is_empty() {
            self.run(line)?;
        }
        self.reporter.reset();
        Ok(())
    }

    fn run(&mut self, source: &str) -> anyhow::Result<()> {
        let tokens = Scanner::new(source).scan_tokens(&mut self.reporter);
        if self.print_tokens {
            writeln!(self.out, "{}", tokens.iter().join("\n"))?;
        }

        let expr = Parser::new(tokens).parse(&mut self.reporter);
        match expr {
            Some(expr) if !self.reporter.had_error() => {
                if self.print_ast {
                    writeln!(self.out, "{expr}")?;
                }
                self.interpreter.interpret(&expr, &mut self.out, &mut self.reporter)?;
            }
            _ => log::debug!("skipping evaluation"),
        }

        for error in self.reporter.drain().iter() {
            writeln!(self.err, "{error}")?;
        }
        Ok(())
    }
}

fn main() -> anyhow::Result<ExitCode> {
    env_logger::init();
    let args = Args::parse();

    let mut driver = Driver::new(args.tokens, args.ast, stdout().lock(), stderr().lock());

    let status = match args.file {
        Some(file) => driver.run_file(file)?,
        None => driver.run_prompt(stdin().lock())?,
    };
    Ok(ExitCode::from(status))
}
