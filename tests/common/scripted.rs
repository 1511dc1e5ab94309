//! Scripted [`CommandRunner`] shared by adapter unit tests and integration tests.

use super::{classify_failure, CommandRunner, Result};
use std::cell::RefCell;

/// Answers provider commands from a script and records every call.
#[derive(Default)]
pub struct ScriptedRunner {
    rules: Vec<(String, std::result::Result<String, String>)>,
    calls: RefCell<Vec<String>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer the first command containing `pattern` with `stdout`.
    pub fn reply(mut self, pattern: &str, stdout: &str) -> Self {
        self.rules.push((pattern.to_string(), Ok(stdout.to_string())));
        self
    }

    /// Fail the first command containing `pattern` with `stderr`.
    pub fn fail(mut self, pattern: &str, stderr: &str) -> Self {
        self.rules.push((pattern.to_string(), Err(stderr.to_string())));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn calls_matching(&self, pattern: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.contains(pattern))
            .collect()
    }

    /// Position of the first call containing `pattern`.
    pub fn position(&self, pattern: &str) -> Option<usize> {
        self.calls().iter().position(|c| c.contains(pattern))
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, cmd: &str) -> Result<String> {
        self.calls.borrow_mut().push(cmd.to_string());
        match self.rules.iter().find(|(p, _)| cmd.contains(p.as_str())) {
            Some((_, Ok(stdout))) => Ok(stdout.clone()),
            Some((_, Err(stderr))) => Err(classify_failure(stderr)),
            None => Ok(String::new()),
        }
    }
}
