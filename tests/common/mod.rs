//! Shared harness for the integration tests: a session whose `print` output is
//! recorded and whose clock is frozen.
#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use pretty_assertions::assert_eq;
use rlox::io::Io;
use rlox::runner::{Lox, RunOutcome};

/// Seconds since the epoch reported by `clock()` in tests.
pub const FROZEN_TIME: f64 = 1662466230.0;

struct RecordingIo {
    printed: Rc<RefCell<Vec<String>>>,
}

impl Io for RecordingIo {
    fn print(&mut self, text: &str) {
        self.printed.borrow_mut().push(text.to_string());
    }

    fn current_time(&self) -> f64 {
        FROZEN_TIME
    }
}

pub struct Session {
    lox: Lox,
    printed: Rc<RefCell<Vec<String>>>,
}

impl Session {
    pub fn new() -> Self {
        let printed: Rc<RefCell<Vec<String>>> = Rc::default();
        let io = RecordingIo {
            printed: Rc::clone(&printed),
        };

        Session {
            lox: Lox::new(Box::new(io)),
            printed,
        }
    }

    pub fn run(&mut self, source: &str) -> RunOutcome {
        self.lox.run(source)
    }

    pub fn must_evaluate_to(&mut self, source: &str, expected: &str) {
        let outcome = self.run(source);
        assert!(
            matches!(outcome, RunOutcome::Success(_)),
            "expected success for:\n{}\ngot:\n{}",
            source,
            outcome.render()
        );
        assert_eq!(outcome.render(), expected, "source:\n{}", source);
    }

    /// Scan and parse errors are reported together, before resolution.
    pub fn must_fail_parsing(&mut self, source: &str, expected: &str) {
        self.must_fail_statically(source, expected);
    }

    pub fn must_fail_resolving(&mut self, source: &str, expected: &str) {
        self.must_fail_statically(source, expected);
    }

    fn must_fail_statically(&mut self, source: &str, expected: &str) {
        let outcome = self.run(source);
        assert!(
            matches!(outcome, RunOutcome::StaticErrors(_)),
            "expected static errors for:\n{}\ngot:\n{:?}",
            source,
            outcome
        );
        assert_eq!(outcome.render(), expected, "source:\n{}", source);
        assert_eq!(outcome.exit_code(), 65);
    }

    pub fn must_fail_execution(&mut self, source: &str, expected: &str) {
        let outcome = self.run(source);
        assert!(
            matches!(outcome, RunOutcome::RuntimeError(_)),
            "expected a runtime error for:\n{}\ngot:\n{:?}",
            source,
            outcome
        );
        assert_eq!(outcome.render(), expected, "source:\n{}", source);
        assert_eq!(outcome.exit_code(), 70);
    }

    /// Everything printed so far, in order.
    pub fn must_have_printed(&self, expected: &[&str]) {
        let printed: Vec<String> = self.printed.borrow().clone();
        let expected: Vec<String> = expected.iter().map(|s| s.to_string()).collect();
        assert_eq!(printed, expected);
    }
}

pub fn session() -> Session {
    Session::new()
}
