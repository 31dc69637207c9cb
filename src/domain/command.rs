//! Command invocations delivered by the host.

use crate::domain::foundation::UserId;

/// A single user command invocation as seen at the host's dispatch boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    pub sender: UserId,
    pub label: String,
    pub args: Vec<String>,
}

impl CommandInvocation {
    pub fn new(sender: UserId, label: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            sender,
            label: label.into(),
            args,
        }
    }

    /// Parses a typed command line such as `/interactive-login methodB`.
    ///
    /// Returns `None` for a line without a command label.
    pub fn parse(sender: UserId, line: &str) -> Option<Self> {
        let mut parts = line.trim().trim_start_matches('/').split_whitespace();
        let label = parts.next()?;
        Some(Self::new(sender, label, parts.map(str::to_string).collect()))
    }

    /// Joins the arguments with single spaces.
    pub fn joined_args(&self) -> String {
        self.args.join(" ")
    }
}
