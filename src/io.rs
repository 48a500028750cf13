//! Host interfaces the interpreter consumes: an output sink for `print` and a
//! clock source backing the `clock()` builtin.

use chrono::Utc;

pub trait Io {
    /// Called once per `print` statement with the fully stringified operand.
    fn print(&mut self, text: &str);

    /// Unix epoch seconds, fractional.
    fn current_time(&self) -> f64;
}

/// Writes to stdout and reads the system clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdIo;

impl Io for StdIo {
    fn print(&mut self, text: &str) {
        println!("{}", text);
    }

    fn current_time(&self) -> f64 {
        Utc::now().timestamp_millis() as f64 / 1000.0
    }
}
