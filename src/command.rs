//! User commands for the interactive client.
//!
//! This module defines the [`Command`] enum, one variant per action the
//! prompt loop can drive against a remote store, and the parser that turns
//! a line of user input into one. Arguments are typed here, so the binary
//! only ever executes well-formed commands.
//!
//! # Overview
//!
//! Supported commands:
//!
//! - `ping`, `begin`, `end`, `centers`, `categories`, `help`, `exit`
//! - `search-name <text>`, `search-country <text>`, `search-centers <text>`
//! - `search-coords <latitude> <longitude>`
//! - `area <geoname-id>`, `center <center-id>`
//! - `average <geoname-id> <category> <center-id>`
//! - `monitors <geoname-id> <center-id>`
//! - `employs <user-id> <center-id>`
//!
//! Center ids may contain spaces, so where one is accepted it is always the
//! final argument and soaks up the rest of the line.
//!
//! # Example
//! ```rust
//! use stratus::Command;
//!
//! let cmd: Command = "search-name var".try_into().unwrap();
//! assert_eq!(cmd, Command::SearchAreasByName("var".to_string()));
//! ```
//!
//! # See Also
//! - [`Client`](crate::protocol::Client): the proxy these commands drive.
use thiserror::Error;

/// List of possible errors the command parser can throw.
#[derive(Debug, Error, Clone)]
pub enum CommandError {
    #[error("unrecognized command '{0}'")]
    UnrecognizedCommand(String),

    #[error("invalid '{command}' command, {reason}")]
    InvalidArguments { command: String, reason: String },

    #[error("no command provided")]
    Empty,
}

/// One action of the interactive client.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Measure the round-trip time to the dispatcher.
    Ping,
    /// Open the transaction bracket.
    Begin,
    /// Close the transaction bracket.
    End,
    SearchAreasByName(String),
    SearchAreasByCountry(String),
    SearchAreasByCoords { latitude: f64, longitude: f64 },
    SearchCentersByName(String),
    Area(i32),
    Center(String),
    Centers,
    Categories,
    Average {
        geoname_id: i32,
        category: String,
        center_id: String,
    },
    Monitors {
        geoname_id: i32,
        center_id: String,
    },
    Employs {
        user_id: String,
        center_id: String,
    },
    /// Print the command list.
    Help,
    /// Close the connection and leave.
    Exit,
}

impl TryInto<Command> for &str {
    type Error = CommandError;

    fn try_into(self) -> Result<Command, Self::Error> {
        let mut words = self.split_whitespace();
        let Some(head) = words.next() else {
            return Err(CommandError::Empty);
        };
        let rest: Vec<&str> = words.collect();

        match head {
            "ping" => Ok(Command::Ping),
            "begin" => Ok(Command::Begin),
            "end" => Ok(Command::End),
            "centers" => Ok(Command::Centers),
            "categories" => Ok(Command::Categories),
            "help" => Ok(Command::Help),
            "exit" => Ok(Command::Exit),
            "search-name" => Ok(Command::SearchAreasByName(text_argument(
                head, &rest, "search-name var",
            )?)),
            "search-country" => Ok(Command::SearchAreasByCountry(text_argument(
                head, &rest, "search-country italy",
            )?)),
            "search-centers" => Ok(Command::SearchCentersByName(text_argument(
                head, &rest, "search-centers varese",
            )?)),
            "search-coords" => {
                if rest.len() != 2 {
                    return Err(invalid(
                        head,
                        "requires latitude and longitude. Example: search-coords 45.8 8.8",
                    ));
                }
                Ok(Command::SearchAreasByCoords {
                    latitude: float_argument(head, rest[0])?,
                    longitude: float_argument(head, rest[1])?,
                })
            }
            "area" => {
                if rest.len() != 1 {
                    return Err(invalid(head, "requires a geoname id. Example: area 3164699"));
                }
                Ok(Command::Area(int_argument(head, rest[0])?))
            }
            "center" => Ok(Command::Center(text_argument(
                head,
                &rest,
                "center Centro di Varese",
            )?)),
            "average" => {
                if rest.len() < 3 {
                    return Err(invalid(
                        head,
                        "requires geoname id, category and center id. \
                         Example: average 3164699 temperature Centro di Varese",
                    ));
                }
                Ok(Command::Average {
                    geoname_id: int_argument(head, rest[0])?,
                    category: rest[1].to_string(),
                    center_id: rest[2..].join(" "),
                })
            }
            "monitors" => {
                if rest.len() < 2 {
                    return Err(invalid(
                        head,
                        "requires geoname id and center id. \
                         Example: monitors 3164699 Centro di Varese",
                    ));
                }
                Ok(Command::Monitors {
                    geoname_id: int_argument(head, rest[0])?,
                    center_id: rest[1..].join(" "),
                })
            }
            "employs" => {
                if rest.len() < 2 {
                    return Err(invalid(
                        head,
                        "requires user id and center id. \
                         Example: employs mrossi Centro di Varese",
                    ));
                }
                Ok(Command::Employs {
                    user_id: rest[0].to_string(),
                    center_id: rest[1..].join(" "),
                })
            }
            other => Err(CommandError::UnrecognizedCommand(other.to_string())),
        }
    }
}

fn invalid(command: &str, reason: &str) -> CommandError {
    CommandError::InvalidArguments {
        command: command.to_string(),
        reason: reason.to_string(),
    }
}

fn text_argument(command: &str, rest: &[&str], example: &str) -> Result<String, CommandError> {
    if rest.is_empty() {
        return Err(invalid(
            command,
            &format!("requires a text argument. Example: {example}"),
        ));
    }
    Ok(rest.join(" "))
}

fn int_argument(command: &str, value: &str) -> Result<i32, CommandError> {
    value
        .parse()
        .map_err(|_| invalid(command, &format!("'{value}' is not a valid geoname id")))
}

fn float_argument(command: &str, value: &str) -> Result<f64, CommandError> {
    value
        .parse()
        .map_err(|_| invalid(command, &format!("'{value}' is not a valid coordinate")))
}
