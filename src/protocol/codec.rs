//! Command line codec
//!
//! Decoding of command-file lines into [`Command`]s.
//!
//! ## Line Grammar
//! ```text
//! create type   <name> <fieldCount> <primaryKeyOrder> (<field> <kind>){fieldCount}
//! create record <name> <value>*
//! search record <name> <key>
//! delete record <name> <key>
//! ```
//! Tokens are separated by any run of whitespace.

use crate::error::ParseError;
use super::{Command, FieldSpec};

/// Tokens before the field specs of `create type`
const CREATE_TYPE_FIXED_ARGS: usize = 5;

/// Decode one command line
pub fn decode_command(line: &str) -> Result<Command, ParseError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();

    match tokens.as_slice() {
        [] => Err(ParseError::Empty),
        ["create", "type", ..] => decode_create_type(&tokens),
        ["create", "record", rest @ ..] => {
            let (type_name, values) = rest.split_first().ok_or(ParseError::ArgumentCount {
                command: "create record",
                expected: "at least 3".to_string(),
                actual: tokens.len(),
            })?;
            Ok(Command::CreateRecord {
                type_name: type_name.to_string(),
                values: values.iter().map(|v| v.to_string()).collect(),
            })
        }
        ["search", "record", rest @ ..] => {
            let (type_name, key) = decode_key_args("search record", rest, tokens.len())?;
            Ok(Command::SearchRecord { type_name, key })
        }
        ["delete", "record", rest @ ..] => {
            let (type_name, key) = decode_key_args("delete record", rest, tokens.len())?;
            Ok(Command::DeleteRecord { type_name, key })
        }
        [first, second, ..] => Err(ParseError::UnknownCommand(format!("{} {}", first, second))),
        [only] => Err(ParseError::UnknownCommand(only.to_string())),
    }
}

/// Encode a command back to its canonical line
pub fn encode_command(command: &Command) -> String {
    command.to_string()
}

fn decode_create_type(tokens: &[&str]) -> Result<Command, ParseError> {
    if tokens.len() < CREATE_TYPE_FIXED_ARGS {
        return Err(ParseError::ArgumentCount {
            command: "create type",
            expected: format!("at least {}", CREATE_TYPE_FIXED_ARGS),
            actual: tokens.len(),
        });
    }

    let field_count = parse_count("field count", tokens[3])?;
    let primary_key_order = parse_count("primary key order", tokens[4])?;

    let specs = &tokens[CREATE_TYPE_FIXED_ARGS..];
    if Some(specs.len()) != field_count.checked_mul(2) {
        return Err(ParseError::ArgumentCount {
            command: "create type",
            expected: format!("{} + 2 x {}", CREATE_TYPE_FIXED_ARGS, field_count),
            actual: tokens.len(),
        });
    }

    let fields = specs
        .chunks_exact(2)
        .map(|pair| FieldSpec {
            name: pair[0].to_string(),
            kind: pair[1].to_string(),
        })
        .collect();

    Ok(Command::CreateType {
        name: tokens[2].to_string(),
        primary_key_order,
        fields,
    })
}

/// `<name> <key>`: exactly two arguments after the keywords
fn decode_key_args(
    command: &'static str,
    args: &[&str],
    total: usize,
) -> Result<(String, String), ParseError> {
    match args {
        [type_name, key] => Ok((type_name.to_string(), key.to_string())),
        _ => Err(ParseError::ArgumentCount {
            command,
            expected: "exactly 4".to_string(),
            actual: total,
        }),
    }
}

fn parse_count(what: &'static str, token: &str) -> Result<usize, ParseError> {
    token.parse().map_err(|_| ParseError::InvalidNumber {
        what,
        token: token.to_string(),
    })
}
