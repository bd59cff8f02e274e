//! Protocol Module
//!
//! Defines the command-file language.
//!
//! ## Commands
//! - `create type <name> <fieldCount> <primaryKeyOrder> <field> <kind> ...`
//! - `create record <name> <value> ...`
//! - `search record <name> <key>`
//! - `delete record <name> <key>`
//!
//! `<primaryKeyOrder>` is 1-based. Kind keywords: `int`, `str`/`string`,
//! `float`.
//!
//! ## Responses
//! - Ok: mutation applied
//! - Found: search hit, carries the record
//! - Failed: carries the per-command error

mod command;
mod response;
mod codec;

pub use command::{Command, CommandType, FieldSpec};
pub use response::{Response, Status};
pub use codec::{decode_command, encode_command};
