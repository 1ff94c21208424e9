//! Source code representation and error management.

use snafu::Snafu;
use std::fmt;

/// Represents source code.
pub struct Source<'a> {
    /// The program text.
    pub content: &'a str,
}

impl<'a> Source<'a> {
    /// Create a new `Source` with the specified `content`.
    pub fn new(content: &'a str) -> Self {
        Self { content }
    }

    /// Returns the text of the 1-based `line`, without its line terminator.
    /// Returns `None` if `line` is out of range.
    pub fn line_text(&self, line: usize) -> Option<&'a str> {
        if line == 0 {
            return None;
        }
        self.content
            .lines()
            .nth(line - 1)
            .map(|text| text.trim_end_matches('\r'))
    }
}

impl<'a> From<&'a str> for Source<'a> {
    fn from(content: &'a str) -> Self {
        Source::new(content)
    }
}

/// The pipeline stage that produced a [`CompileError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Lexer,
    Parser,
    Semantic,
    Codegen,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Lexer => "lexer",
            Stage::Parser => "parser",
            Stage::Semantic => "semantic",
            Stage::Codegen => "codegen",
        };
        f.write_str(name)
    }
}

pub type CompileResult<T> = Result<T, CompileError>;

/// A fatal compile time error. Every stage stops at the first one.
#[derive(Debug, Clone, PartialEq, Snafu)]
pub enum CompileError {
    /// Unrecognized character or malformed literal.
    #[snafu(display("line {line}: {reason} (found {found})"))]
    Lex {
        line: usize,
        found: String,
        reason: String,
    },
    /// Token mismatch at a grammar position.
    #[snafu(display("line {line}: expected {expected}, found {found}"))]
    Parse {
        line: usize,
        expected: String,
        found: String,
    },
    #[snafu(display("line {line}: {message}"))]
    Semantic { line: usize, message: String },
    /// A construct the selected backend cannot lower.
    #[snafu(display("line {line}: {message}"))]
    Codegen { line: usize, message: String },
}

impl CompileError {
    pub fn lex(line: usize, found: impl ToString, reason: impl ToString) -> Self {
        Self::Lex {
            line,
            found: found.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn parse(line: usize, expected: impl ToString, found: impl ToString) -> Self {
        Self::Parse {
            line,
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    pub fn semantic(line: usize, message: impl ToString) -> Self {
        Self::Semantic {
            line,
            message: message.to_string(),
        }
    }

    pub fn codegen(line: usize, message: impl ToString) -> Self {
        Self::Codegen {
            line,
            message: message.to_string(),
        }
    }

    /// The stage that raised this error.
    pub fn stage(&self) -> Stage {
        match self {
            CompileError::Lex { .. } => Stage::Lexer,
            CompileError::Parse { .. } => Stage::Parser,
            CompileError::Semantic { .. } => Stage::Semantic,
            CompileError::Codegen { .. } => Stage::Codegen,
        }
    }

    /// The 1-based source line of the error.
    pub fn line(&self) -> usize {
        match self {
            CompileError::Lex { line, .. }
            | CompileError::Parse { line, .. }
            | CompileError::Semantic { line, .. }
            | CompileError::Codegen { line, .. } => *line,
        }
    }
}
