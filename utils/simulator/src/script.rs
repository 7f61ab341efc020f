//! Transaction scripts for the CLI: one command per line, `#` comments,
//! numbers decimal or 0x-prefixed hex.

use std::num::ParseIntError;

use thiserror::Error;

/// One line of a transaction script
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Write { address: u8, data: u8 },
    Read { address: u8 },
    Idle { ticks: u64 },
    Reset,
}

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("line {line}: unknown command `{name}`")]
    UnknownCommand { line: usize, name: String },
    #[error("line {line}: `{name}` expects {expected} argument(s), got {got}")]
    WrongArgumentCount {
        line: usize,
        name: &'static str,
        expected: usize,
        got: usize,
    },
    #[error("line {line}: invalid number `{token}`: {source}")]
    InvalidNumber {
        line: usize,
        token: String,
        source: ParseIntError,
    },
    #[error("line {line}: address 0x{address:02x} exceeds 7 bits")]
    AddressRange { line: usize, address: u64 },
    #[error("line {line}: value 0x{value:02x} exceeds 8 bits")]
    ValueRange { line: usize, value: u64 },
}

/// Parse a whole script into commands, rejecting the first malformed line.
pub fn parse_script(text: &str) -> Result<Vec<Command>, ScriptError> {
    let mut commands = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let body = raw.split('#').next().unwrap_or("").trim();
        if body.is_empty() {
            continue;
        }
        let mut tokens = body.split_whitespace();
        let name = tokens.next().unwrap();
        let args: Vec<&str> = tokens.collect();
        let command = match name {
            "write" => {
                expect_args(line, "write", &args, 2)?;
                Command::Write {
                    address: parse_address(line, args[0])?,
                    data: parse_value(line, args[1])?,
                }
            }
            "read" => {
                expect_args(line, "read", &args, 1)?;
                Command::Read {
                    address: parse_address(line, args[0])?,
                }
            }
            "idle" => {
                expect_args(line, "idle", &args, 1)?;
                Command::Idle {
                    ticks: parse_number(line, args[0])?,
                }
            }
            "reset" => {
                expect_args(line, "reset", &args, 0)?;
                Command::Reset
            }
            _ => {
                return Err(ScriptError::UnknownCommand {
                    line,
                    name: name.to_string(),
                });
            }
        };
        commands.push(command);
    }
    Ok(commands)
}

fn expect_args(
    line: usize,
    name: &'static str,
    args: &[&str],
    expected: usize,
) -> Result<(), ScriptError> {
    if args.len() != expected {
        return Err(ScriptError::WrongArgumentCount {
            line,
            name,
            expected,
            got: args.len(),
        });
    }
    Ok(())
}

fn parse_number(line: usize, token: &str) -> Result<u64, ScriptError> {
    let parsed = if let Some(hex) = token.strip_prefix("0x") {
        u64::from_str_radix(hex, 16)
    } else {
        token.parse()
    };
    parsed.map_err(|source| ScriptError::InvalidNumber {
        line,
        token: token.to_string(),
        source,
    })
}

fn parse_address(line: usize, token: &str) -> Result<u8, ScriptError> {
    let address = parse_number(line, token)?;
    if address > 0x7F {
        return Err(ScriptError::AddressRange { line, address });
    }
    Ok(address as u8)
}

fn parse_value(line: usize, token: &str) -> Result<u8, ScriptError> {
    let value = parse_number(line, token)?;
    if value > 0xFF {
        return Err(ScriptError::ValueRange { line, value });
    }
    Ok(value as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands_and_comments() {
        let script = "# bring-up\nwrite 0x00 0xF0\nread 0x04 # duty\nidle 1000\nreset\n";
        let commands = parse_script(script).unwrap();
        assert_eq!(
            commands,
            vec![
                Command::Write {
                    address: 0x00,
                    data: 0xF0
                },
                Command::Read { address: 0x04 },
                Command::Idle { ticks: 1000 },
                Command::Reset,
            ]
        );
    }

    #[test]
    fn rejects_out_of_range_address() {
        let err = parse_script("write 0x80 0").unwrap_err();
        assert!(matches!(err, ScriptError::AddressRange { line: 1, .. }));
    }

    #[test]
    fn rejects_unknown_command_with_line_number() {
        let err = parse_script("write 0x00 1\nfrobnicate\n").unwrap_err();
        assert!(matches!(err, ScriptError::UnknownCommand { line: 2, .. }));
    }

    #[test]
    fn rejects_missing_argument() {
        let err = parse_script("write 0x00").unwrap_err();
        assert!(matches!(
            err,
            ScriptError::WrongArgumentCount {
                line: 1,
                expected: 2,
                got: 1,
                ..
            }
        ));
    }

    #[test]
    fn rejects_trailing_tokens() {
        let err = parse_script("write 0x00 0x01 junk").unwrap_err();
        assert!(matches!(
            err,
            ScriptError::WrongArgumentCount {
                line: 1,
                expected: 2,
                got: 3,
                ..
            }
        ));

        let err = parse_script("reset now").unwrap_err();
        assert!(matches!(
            err,
            ScriptError::WrongArgumentCount {
                line: 1,
                expected: 0,
                got: 1,
                ..
            }
        ));
    }
}
