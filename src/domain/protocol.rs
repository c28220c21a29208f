//! Line protocol spoken with the game server.
//!
//! Every message is one line of whitespace-separated tokens; the first token
//! selects the command. This module only converts between lines and typed
//! messages; it never touches game state.

use std::fmt;
use std::str::FromStr;

use shakmaty::Square;

use crate::domain::{CastleSide, PieceColor};
use crate::error::ParseError;

/// Which seat a chat line came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Player {
    One,
    Two,
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::One => f.write_str("Player1"),
            Player::Two => f.write_str("Player2"),
        }
    }
}

/// Error kinds reported by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerError {
    /// No free seat on the server
    Full,
    /// Our last move was rejected
    Move,
    /// Our last line was not understood
    Command,
}

/// Optional trailing token on a board command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalFlag {
    Check,
    Checkmate,
    Stalemate,
}

impl TerminalFlag {
    /// Unrecognized tokens mean "no flag", same as an absent token.
    fn parse(token: Option<&str>) -> Option<Self> {
        match token? {
            "check" => Some(TerminalFlag::Check),
            "checkmate" => Some(TerminalFlag::Checkmate),
            "stalemate" => Some(TerminalFlag::Stalemate),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardAction {
    Move { from: Square, to: Square },
    Hit { from: Square, to: Square },
    Promote { from: Square, to: Square },
    PromoteHit { from: Square, to: Square },
    Castle(CastleSide),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardCommand {
    pub action: BoardAction,
    pub flag: Option<TerminalFlag>,
}

/// Messages received from the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    Chat { sender: Player, text: String },
    /// The color this client plays
    Color(PieceColor),
    Start,
    Error(ServerError),
    /// Someone resigned; the game is over
    Resign,
    Board(BoardCommand),
}

impl ServerMessage {
    /// Parse one raw line from the server
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let line = line.trim();
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some(&command) = tokens.first() else {
            return Err(ParseError::Empty);
        };

        match command {
            "say1" => Ok(ServerMessage::Chat { sender: Player::One, text: rest_of_line(line, command) }),
            "say2" => Ok(ServerMessage::Chat { sender: Player::Two, text: rest_of_line(line, command) }),
            "color" => {
                let value = tokens.get(1).ok_or(ParseError::MissingArgument {
                    command: "color",
                    expected: "`white` or `black`",
                })?;
                value
                    .parse()
                    .map(ServerMessage::Color)
                    .map_err(|_| ParseError::InvalidValue { command: "color", value: value.to_string() })
            }
            "start" => Ok(ServerMessage::Start),
            "resign" => Ok(ServerMessage::Resign),
            "error" => {
                let value = tokens.get(1).ok_or(ParseError::MissingArgument {
                    command: "error",
                    expected: "`full`, `move` or `command`",
                })?;
                let kind = match *value {
                    "full" => ServerError::Full,
                    "move" => ServerError::Move,
                    "command" => ServerError::Command,
                    other => {
                        return Err(ParseError::InvalidValue { command: "error", value: other.to_string() });
                    }
                };
                Ok(ServerMessage::Error(kind))
            }
            "move" => parse_squares(&tokens, "move").map(|(from, to, flag)| {
                board(BoardAction::Move { from, to }, flag)
            }),
            "hit" => parse_squares(&tokens, "hit").map(|(from, to, flag)| {
                board(BoardAction::Hit { from, to }, flag)
            }),
            // the reference server spells these `promotion` / `promotion-hit`
            "promote" | "promotion" => parse_squares(&tokens, "promote").map(|(from, to, flag)| {
                board(BoardAction::Promote { from, to }, flag)
            }),
            "promote-hit" | "promotion-hit" => parse_squares(&tokens, "promote-hit").map(|(from, to, flag)| {
                board(BoardAction::PromoteHit { from, to }, flag)
            }),
            "castle" => {
                let side = match tokens.get(1) {
                    Some(&"kingside") => CastleSide::Kingside,
                    Some(&"queenside") => CastleSide::Queenside,
                    Some(other) => {
                        return Err(ParseError::InvalidValue { command: "castle", value: other.to_string() });
                    }
                    None => {
                        return Err(ParseError::MissingArgument {
                            command: "castle",
                            expected: "`kingside` or `queenside`",
                        });
                    }
                };
                Ok(board(BoardAction::Castle(side), TerminalFlag::parse(tokens.get(2).copied())))
            }
            other => Err(ParseError::UnknownCommand(other.to_string())),
        }
    }
}

fn board(action: BoardAction, flag: Option<TerminalFlag>) -> ServerMessage {
    ServerMessage::Board(BoardCommand { action, flag })
}

/// `<cmd> <from> <to> [flag]`
fn parse_squares(
    tokens: &[&str],
    command: &'static str,
) -> Result<(Square, Square, Option<TerminalFlag>), ParseError> {
    if tokens.len() < 3 {
        return Err(ParseError::MissingArgument { command, expected: "two squares" });
    }
    let from = parse_square(tokens[1])?;
    let to = parse_square(tokens[2])?;
    Ok((from, to, TerminalFlag::parse(tokens.get(3).copied())))
}

pub fn parse_square(token: &str) -> Result<Square, ParseError> {
    token
        .parse()
        .map_err(|_| ParseError::InvalidSquare(token.to_string()))
}

/// Text after the command token, without the separating whitespace
fn rest_of_line(line: &str, command: &str) -> String {
    line[command.len()..].trim_start().to_string()
}

/// Messages sent to the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
    Move { from: Square, to: Square },
    Resign,
    Say(String),
    /// Ready to start the next game
    Ready,
}

impl ClientMessage {
    /// Convert message to its protocol line (without the newline)
    pub fn to_line(&self) -> String {
        match self {
            ClientMessage::Move { from, to } => format!("move {} {}", from, to),
            ClientMessage::Resign => "resign".to_string(),
            ClientMessage::Say(text) => format!("say {}", text),
            ClientMessage::Ready => "ready".to_string(),
        }
    }
}

impl FromStr for ClientMessage {
    type Err = ParseError;

    /// Parse user-typed text such as `move e2 e4` or `say hello`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let tokens: Vec<&str> = s.split_whitespace().collect();
        let Some(&command) = tokens.first() else {
            return Err(ParseError::Empty);
        };

        match command {
            "move" => {
                if tokens.len() < 3 {
                    return Err(ParseError::MissingArgument { command: "move", expected: "two squares" });
                }
                Ok(ClientMessage::Move {
                    from: parse_square(tokens[1])?,
                    to: parse_square(tokens[2])?,
                })
            }
            "resign" => Ok(ClientMessage::Resign),
            "ready" => Ok(ClientMessage::Ready),
            "say" => Ok(ClientMessage::Say(rest_of_line(s, command))),
            other => Err(ParseError::UnknownCommand(other.to_string())),
        }
    }
}
