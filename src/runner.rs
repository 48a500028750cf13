//! Session driver: source text in, [`RunOutcome`] out.
//!
//! One [`Lox`] keeps a single interpreter alive for its whole lifetime, so
//! globals defined by one `run` are visible to the next (REPL semantics).

use log::{debug, info};

use crate::error::LoxError;
use crate::interpreter::Interpreter;
use crate::io::Io;
use crate::parser::Parser;
use crate::resolver::Resolver;
use crate::scanner;

/// Result of running one chunk of source.
#[derive(Debug)]
pub enum RunOutcome {
    /// Executed to completion. Holds the display of the last statement's
    /// result, if it had one.
    Success(Option<String>),

    /// Scan and parse errors (reported together), or resolver errors.
    /// Nothing was executed.
    StaticErrors(Vec<LoxError>),

    /// Execution stopped at the first runtime fault.
    RuntimeError(LoxError),
}

impl RunOutcome {
    /// Text shown to the user for this outcome.
    pub fn render(&self) -> String {
        match self {
            RunOutcome::Success(value) => value.clone().unwrap_or_default(),

            RunOutcome::StaticErrors(errors) => errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<String>>()
                .join("\n"),

            RunOutcome::RuntimeError(error) => error.to_string(),
        }
    }

    /// Process exit code used by the command line runner.
    pub fn exit_code(&self) -> i32 {
        match self {
            RunOutcome::Success(_) => 0,
            RunOutcome::StaticErrors(_) => 65,
            RunOutcome::RuntimeError(_) => 70,
        }
    }
}

pub struct Lox {
    interpreter: Interpreter,
    /// First expression id the next parse may hand out.
    next_expr_id: usize,
}

impl Lox {
    pub fn new(io: Box<dyn Io>) -> Self {
        info!("Starting Lox session");

        Lox {
            interpreter: Interpreter::new(io),
            next_expr_id: 0,
        }
    }

    /// Scan → parse → resolve → interpret, stopping at the first phase that
    /// reports errors.
    pub fn run(&mut self, source: &str) -> RunOutcome {
        debug!("Running source:\n{}", source);

        let scanned = scanner::scan(source);

        let mut parser = Parser::with_first_id(&scanned.tokens, self.next_expr_id);
        let parsed = parser.parse();
        self.next_expr_id = parser.next_expr_id();

        if !scanned.errors.is_empty() || !parsed.errors.is_empty() {
            let mut errors: Vec<LoxError> = scanned.errors;
            errors.extend(parsed.errors);

            info!("Static errors during scan/parse: {}", errors.len());
            return RunOutcome::StaticErrors(errors);
        }

        let errors: Vec<LoxError> = Resolver::new(&mut self.interpreter).resolve(&parsed.statements);

        if !errors.is_empty() {
            info!("Static errors during resolution: {}", errors.len());
            return RunOutcome::StaticErrors(errors);
        }

        match self.interpreter.interpret(&parsed.statements) {
            Ok(value) => RunOutcome::Success(value),
            Err(error) => {
                info!("Runtime error on line {}", error.line());
                RunOutcome::RuntimeError(error)
            }
        }
    }
}
