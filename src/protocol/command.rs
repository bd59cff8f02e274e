//! Command definitions
//!
//! Represents parsed command-file lines.

use std::fmt;

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    CreateType,
    CreateRecord,
    SearchRecord,
    DeleteRecord,
}

impl CommandType {
    /// Leading two keywords of the command
    pub fn keywords(&self) -> &'static str {
        match self {
            CommandType::CreateType => "create type",
            CommandType::CreateRecord => "create record",
            CommandType::SearchRecord => "search record",
            CommandType::DeleteRecord => "delete record",
        }
    }
}

/// One field spec of `create type`, kind still as written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    pub kind: String,
}

/// A parsed command
///
/// Tokens stay textual here; kinds and values are resolved against the
/// catalog at dispatch time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `create type <name> <fieldCount> <primaryKeyOrder> (<field> <kind>)*`
    CreateType {
        name: String,
        /// 1-based position of the primary-key field
        primary_key_order: usize,
        fields: Vec<FieldSpec>,
    },

    /// `create record <type> <value>*`
    CreateRecord { type_name: String, values: Vec<String> },

    /// `search record <type> <key>`
    SearchRecord { type_name: String, key: String },

    /// `delete record <type> <key>`
    DeleteRecord { type_name: String, key: String },
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::CreateType { .. } => CommandType::CreateType,
            Command::CreateRecord { .. } => CommandType::CreateRecord,
            Command::SearchRecord { .. } => CommandType::SearchRecord,
            Command::DeleteRecord { .. } => CommandType::DeleteRecord,
        }
    }

    /// Name of the type the command targets
    pub fn type_name(&self) -> &str {
        match self {
            Command::CreateType { name, .. } => name,
            Command::CreateRecord { type_name, .. }
            | Command::SearchRecord { type_name, .. }
            | Command::DeleteRecord { type_name, .. } => type_name,
        }
    }
}

/// Canonical single-space rendering; parses back to the same command
impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.command_type().keywords(), self.type_name())?;
        match self {
            Command::CreateType {
                primary_key_order,
                fields,
                ..
            } => {
                write!(f, " {} {}", fields.len(), primary_key_order)?;
                for field in fields {
                    write!(f, " {} {}", field.name, field.kind)?;
                }
            }
            Command::CreateRecord { values, .. } => {
                for value in values {
                    write!(f, " {}", value)?;
                }
            }
            Command::SearchRecord { key, .. } | Command::DeleteRecord { key, .. } => {
                write!(f, " {}", key)?;
            }
        }
        Ok(())
    }
}
