use std::{
    fmt::{self, Display, Formatter},
    ops::Deref,
};

use itertools::Itertools;

/// 1-based source line.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, derive_more::Display, derive_more::From,
)]
pub struct Line(pub usize);

/// Where a syntax error was found: the end of input, or a concrete lexeme.
#[derive(Debug, Clone, PartialEq)]
pub enum Location {
    AtEnd,
    At(String),
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Location::AtEnd => write!(f, " at end"),
            Location::At(lexeme) => write!(f, " at '{lexeme}'"),
        }
    }
}

#[derive(thiserror::Error, Clone, Debug, PartialEq)]
pub enum SlangError {
    #[error("[line {line}] Error: {message}")]
    Lexical { line: Line, message: String },
    #[error("[line {line}] Error{location}: {message}")]
    Syntax { line: Line, location: Location, message: String },
    #[error("{message}\n[line {line}]")]
    Runtime { line: Line, message: String },
}

impl SlangError {
    pub fn line(&self) -> Line {
        match self {
            SlangError::Lexical { line, .. }
            | SlangError::Syntax { line, .. }
            | SlangError::Runtime { line, .. } => *line,
        }
    }

    pub fn is_runtime(&self) -> bool {
        matches!(self, SlangError::Runtime { .. })
    }
}

#[derive(thiserror::Error, Debug, Default, PartialEq)]
pub struct SlangErrors(pub Vec<SlangError>);

impl From<SlangError> for SlangErrors {
    fn from(e: SlangError) -> Self {
        Self(vec![e])
    }
}

impl Deref for SlangErrors {
    type Target = Vec<SlangError>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for SlangErrors {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.0.iter().join("\n"))
    }
}

/// Receives every lexical, syntax and runtime error the core runs into.
pub trait Reporter {
    fn report(&mut self, error: SlangError);

    /// A lexical or syntax error was reported since the last reset.
    fn had_error(&self) -> bool;
}

/// Collects reported errors and remembers which kinds occurred, so a driver
/// can decide on an exit code or reset between prompt inputs.
#[derive(Debug, Default)]
pub struct ErrorReporter {
    errors: SlangErrors,
    had_error: bool,
    had_runtime_error: bool,
}

impl ErrorReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn had_runtime_error(&self) -> bool {
        self.had_runtime_error
    }

    pub fn errors(&self) -> &SlangErrors {
        &self.errors
    }

    /// Hands out the errors reported so far, keeping the flags untouched.
    pub fn drain(&mut self) -> SlangErrors {
        std::mem::take(&mut self.errors)
    }

    pub fn reset(&mut self) {
        self.errors.0.clear();
        self.had_error = false;
        self.had_runtime_error = false;
    }
}

impl Reporter for ErrorReporter {
    fn report(&mut self, error: SlangError) {
        log::debug!("reported: {error:?}");
        if error.is_runtime() {
            self.had_runtime_error = true;
        } else {
            self.had_error = true;
        }
        self.errors.0.push(error);
    }

    fn had_error(&self) -> bool {
        self.had_error
    }
}

impl<R: Reporter + ?Sized> Reporter for &mut R {
    fn report(&mut self, error: SlangError) {
        (**self).report(error)
    }

    fn had_error(&self) -> bool {
        (**self).had_error()
    }
}
