// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Payload command-line construction.
//!
//! The job catalog hands over a script and a flat parameter string written
//! for a grid site. A few tokens need adjusting before the string is fed to
//! the shell on a compute node.

use std::path::{Path, PathBuf};

/// Parameter whose value names an input that must be read from the
/// working directory.
pub const DEFAULT_INPUT_FLAG: &str = "--inputEVNTFile";

/// Tokens dropped from the command line. The database release selector
/// would otherwise trigger a remote conditions lookup.
pub const DEFAULT_STRIPPED_TOKENS: &[&str] = &[r#"--DBRelease="all:current""#];

/// Builder for the shell command that runs a job's payload.
#[derive(Debug, Clone)]
pub struct PayloadCommand {
    script: String,
    parameters: String,
    setup: Vec<String>,
    workdir: PathBuf,
    input_flag: String,
    stripped: Vec<String>,
}

impl PayloadCommand {
    pub fn new(script: impl Into<String>, parameters: impl Into<String>) -> Self {
        Self {
            script: script.into(),
            parameters: parameters.into(),
            setup: Vec::new(),
            workdir: PathBuf::new(),
            input_flag: DEFAULT_INPUT_FLAG.to_string(),
            stripped: DEFAULT_STRIPPED_TOKENS
                .iter()
                .map(|t| t.to_string())
                .collect(),
        }
    }

    /// Environment-setup statements run before the payload.
    pub fn setup(mut self, statements: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.setup = statements.into_iter().map(Into::into).collect();
        self
    }

    /// Directory the input flag's value is resolved against.
    pub fn workdir(mut self, dir: impl AsRef<Path>) -> Self {
        self.workdir = dir.as_ref().to_path_buf();
        self
    }

    pub fn input_flag(mut self, flag: impl Into<String>) -> Self {
        self.input_flag = flag.into();
        self
    }

    pub fn stripped_tokens(mut self, tokens: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.stripped = tokens.into_iter().map(Into::into).collect();
        self
    }

    /// The payload part only: script and fixed-up parameters.
    pub fn payload_line(&self) -> String {
        let joined = format!("{} {}", self.script, self.parameters);
        let mut tokens = joined.split_whitespace();
        let mut out: Vec<String> = tokens.next().map(str::to_string).into_iter().collect();
        for token in tokens {
            if self.stripped.iter().any(|s| s == token) {
                continue;
            }
            out.push(self.fix_token(token));
        }
        out.join(" ")
    }

    /// Full command: setup statements, then the payload line.
    pub fn render(&self) -> String {
        let payload = self.payload_line();
        let setup: Vec<&str> = self
            .setup
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect();
        if setup.is_empty() {
            payload
        } else {
            format!("{}; {}", setup.join("; "), payload)
        }
    }

    fn fix_token(&self, token: &str) -> String {
        if token.contains('(') && !token.starts_with('"') {
            return format!("\"{token}\"");
        }
        if token.starts_with(self.input_flag.as_str()) {
            if let Some((flag, file)) = token.split_once('=') {
                return format!("{}={}", flag, self.workdir.join(file).display());
            }
        }
        token.to_string()
    }
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
