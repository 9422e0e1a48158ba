//! Compiler diagnostics

// SPDX-FileCopyrightText: © 2025 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

use std::sync::Mutex;

/// Receives the non-fatal messages emitted while compiling patterns.
///
/// Patterns may be compiled on several threads sharing one log.
pub trait CompilerLog: Sync {
    fn write_log(&self, text: &str);
}

pub struct StderrLog;

impl CompilerLog for StderrLog {
    fn write_log(&self, text: &str) {
        eprintln!("{}", text);
    }
}

/// Stores log lines in memory
#[derive(Default)]
pub struct VecLog {
    lines: Mutex<Vec<String>>,
}

impl VecLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        match self.lines.lock() {
            Ok(l) => l.clone(),
            Err(e) => e.into_inner().clone(),
        }
    }
}

impl CompilerLog for VecLog {
    fn write_log(&self, text: &str) {
        match self.lines.lock() {
            Ok(mut l) => l.push(text.to_owned()),
            Err(e) => e.into_inner().push(text.to_owned()),
        }
    }
}
