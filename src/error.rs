//! Centralised error hierarchy for the **Lox interpreter**.
//!
//! Every phase reports through one of the variants defined here. The scanner,
//! parser and resolver *collect* their errors into a `Vec<LoxError>` so a
//! single run can report many of them; only runtime faults travel through
//! `Result` and unwind to the top of `Interpreter::interpret`.
//!
//! The `Display` output of each variant is the exact diagnostic text shown to
//! users, so golden-output tests can compare against `to_string()` directly.
//!
//! The module **does not** print diagnostics itself.

use thiserror::Error;

use log::info;

use crate::token::{Token, TokenType};

/// Canonical error type used throughout the interpreter.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoxError {
    /// Lexical (scanner) error with source line information.
    #[error("[line {line}] Error: {message}")]
    Lex {
        /// Human‑readable description.
        message: String,

        /// 1‑based line where the error occurred.
        line: usize,
    },

    /// Syntactic (parser) error.
    ///
    /// `location` is empty, `" at end"` or `" at '<lexeme>'"`.
    #[error("[line {line}] Error{location}: {message}")]
    Parse {
        message: String,
        line: usize,
        location: String,
    },

    /// Static‑analysis failure found by the resolver.
    #[error("[line {line}] Error at {name}: {message}")]
    Resolve {
        message: String,
        line: usize,
        name: String,
    },

    /// Runtime evaluation error. Only the first one of a run is ever reported.
    #[error("{message}\n[line {line}]")]
    Runtime { message: String, line: usize },
}

impl LoxError {
    /// Helper constructor for the **scanner**.
    pub fn lex<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Lex error: line={}, msg={}", line, message);

        LoxError::Lex { message, line }
    }

    /// Helper constructor for the **parser**: the location suffix is derived
    /// from the offending token.
    pub fn parse_at<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        let location: String = match token.token_type {
            TokenType::EOF => " at end".to_string(),
            _ => format!(" at '{}'", token.lexeme),
        };

        info!(
            "Creating Parse error: line={}, location={}, msg={}",
            token.line, location, message
        );

        LoxError::Parse {
            message,
            line: token.line,
            location,
        }
    }

    /// Helper constructor for the **resolver**.
    pub fn resolve<N: Into<String>, S: Into<String>>(line: usize, name: N, msg: S) -> Self {
        let name: String = name.into();
        let message: String = msg.into();

        info!(
            "Creating Resolve error: line={}, name={}, msg={}",
            line, name, message
        );

        LoxError::Resolve {
            message,
            line,
            name,
        }
    }

    /// Helper constructor for **runtime** faults.
    pub fn runtime<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Runtime error: line={}, msg={}", line, message);

        LoxError::Runtime { message, line }
    }

    /// Source line the diagnostic refers to.
    pub fn line(&self) -> usize {
        match self {
            LoxError::Lex { line, .. }
            | LoxError::Parse { line, .. }
            | LoxError::Resolve { line, .. }
            | LoxError::Runtime { line, .. } => *line,
        }
    }
}

/// Crate‑wide `Result` alias.
pub type Result<T> = std::result::Result<T, LoxError>;
