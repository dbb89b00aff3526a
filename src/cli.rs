//! CLI utilities for Stratus.
//!
//! The utilities present in this module can be used to create an interactive
//! client for a remote store.
use std::io::{BufRead, Write};

use crate::command::{Command, CommandError};

/// Prompt the user for a command and parse it.
///
/// End of input reads as `exit`, so a closed stdin ends the session.
///
/// # Panics
/// If the prompt cannot be written or the input cannot be read.
pub fn prompt<R, W>(mut reader: R, mut writer: W) -> Result<Command, CommandError>
where
    R: BufRead,
    W: Write,
{
    let mut s = String::default();
    write!(&mut writer, "> ").expect("failed to write to writer.");
    writer.flush().expect("failed to flush writer.");

    let read = reader
        .read_line(&mut s)
        .expect("failed to read from reader.");
    if read == 0 {
        return Ok(Command::Exit);
    }

    s.as_str().try_into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_prints_correctly() {
        let input = b"ping\n";
        let mut output = Vec::new();

        prompt(&input[..], &mut output).unwrap();

        let output = String::from_utf8(output).expect("not valid UTF-8");
        assert_eq!("> ", output);
    }

    #[test]
    fn prompt_parses_commands() {
        let input = b"search-name var\n";
        let mut output = Vec::new();

        let res = prompt(&input[..], &mut output).unwrap();
        assert_eq!(Command::SearchAreasByName("var".to_string()), res);
    }

    #[test]
    fn prompt_treats_eof_as_exit() {
        let input = b"";
        let mut output = Vec::new();

        let res = prompt(&input[..], &mut output).unwrap();
        assert_eq!(Command::Exit, res);
    }

    #[test]
    fn prompt_reports_unrecognized_commands() {
        let input = b"frobnicate\n";
        let mut output = Vec::new();

        let res = prompt(&input[..], &mut output);
        assert!(matches!(res, Err(CommandError::UnrecognizedCommand(_))));
    }
}
