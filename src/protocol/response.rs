//! Response definitions
//!
//! Represents the result of dispatching one command.

use std::fmt;

use crate::error::CommandError;
use crate::model::Record;

/// Status recorded in the operation log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Failure,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Success => "success",
            Status::Failure => "failure",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-command outcome
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// A mutation succeeded
    Ok,

    /// A search found this record
    Found(Record),

    /// The command failed; nothing was changed
    Failed(CommandError),
}

impl Response {
    pub fn status(&self) -> Status {
        match self {
            Response::Ok | Response::Found(_) => Status::Success,
            Response::Failed(_) => Status::Failure,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status() == Status::Success
    }

    /// The failure, if any
    pub fn error(&self) -> Option<&CommandError> {
        match self {
            Response::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// The found record, if any
    pub fn record(&self) -> Option<&Record> {
        match self {
            Response::Found(record) => Some(record),
            _ => None,
        }
    }
}

impl From<CommandError> for Response {
    fn from(err: CommandError) -> Self {
        Response::Failed(err)
    }
}
