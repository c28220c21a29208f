//! Terminal presentation of a game.
//!
//! Consumes connection events and prints the board, move log, chat and
//! notifications. User input lines are turned into outbound messages.

use std::io::{self, Write};

use crate::domain::{ClientMessage, PieceColor, Position};
use crate::models::connection::ConnectionEvent;
use crate::models::session::SessionEvent;
use crate::ui::board_text;

const HELP: &str = "\
commands:
  move <from> <to>   e.g. `move e2 e4`
  say <text>         chat with your opponent
  ready              start the next game
  resign             give up the current game
  board              print the board again
  quit               leave";

/// What the caller should do after an event or input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiAction {
    Nothing,
    Send(ClientMessage),
    Quit,
    /// The connection is gone; `error` is set when it failed
    Disconnected { error: Option<String> },
}

pub struct TerminalUi<W: Write> {
    /// Where all output goes
    out: W,
    /// Answer every waiting phase with `ready`
    auto_ready: bool,
    /// Last board snapshot received
    board: Position,
    /// Color shown in the turn label
    to_move: PieceColor,
    /// No game running; moves and resignations are held back
    waiting: bool,
}

impl<W: Write> TerminalUi<W> {
    pub fn new(out: W, auto_ready: bool) -> Self {
        Self {
            out,
            auto_ready,
            board: Position::new(),
            to_move: PieceColor::White,
            waiting: true,
        }
    }

    pub fn is_waiting(&self) -> bool {
        self.waiting
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn handle_event(&mut self, event: &ConnectionEvent) -> io::Result<UiAction> {
        match event {
            ConnectionEvent::Session(event) => self.handle_session_event(event),
            ConnectionEvent::Closed => {
                writeln!(self.out, "Server closed the connection.")?;
                Ok(UiAction::Disconnected { error: None })
            }
            ConnectionEvent::Failed(e) => {
                writeln!(self.out, "[error] connection lost: {}", e)?;
                Ok(UiAction::Disconnected { error: Some(e.clone()) })
            }
            ConnectionEvent::SendFailed(e) => {
                writeln!(self.out, "[error] could not send to server: {}", e)?;
                Ok(UiAction::Nothing)
            }
        }
    }

    fn handle_session_event(&mut self, event: &SessionEvent) -> io::Result<UiAction> {
        match event {
            SessionEvent::BoardChanged(position) => {
                self.board = position.clone();
                if !self.waiting {
                    self.print_board()?;
                }
            }
            SessionEvent::LogLine(line) => writeln!(self.out, "  {}", line)?,
            SessionEvent::LogCleared => writeln!(self.out, "----")?,
            SessionEvent::Chat { sender, text } => writeln!(self.out, "{}: {}", sender, text)?,
            SessionEvent::TurnChanged(color) => {
                self.to_move = *color;
                writeln!(self.out, "Current player: {}", color.as_str())?;
            }
            SessionEvent::Notify { text, is_error } => {
                if *is_error {
                    writeln!(self.out, "[error] {}", text)?;
                } else {
                    writeln!(self.out, "** {} **", text)?;
                }
            }
            SessionEvent::EnterWaiting => {
                self.waiting = true;
                if self.auto_ready {
                    writeln!(self.out, "Waiting for the other player...")?;
                    return Ok(UiAction::Send(ClientMessage::Ready));
                }
                writeln!(
                    self.out,
                    "Type `ready` when you are ready. The game begins when both players are ready."
                )?;
            }
            SessionEvent::EnterPlaying => {
                self.waiting = false;
                writeln!(self.out, "Game started.")?;
            }
        }
        Ok(UiAction::Nothing)
    }

    pub fn handle_input(&mut self, line: &str) -> io::Result<UiAction> {
        match line.trim() {
            "" => Ok(UiAction::Nothing),
            "quit" | "exit" => Ok(UiAction::Quit),
            "help" => {
                writeln!(self.out, "{}", HELP)?;
                Ok(UiAction::Nothing)
            }
            "board" => {
                self.print_board()?;
                Ok(UiAction::Nothing)
            }
            input => match input.parse::<ClientMessage>() {
                Ok(ClientMessage::Ready) => {
                    writeln!(self.out, "Waiting for the other player...")?;
                    Ok(UiAction::Send(ClientMessage::Ready))
                }
                Ok(ClientMessage::Move { .. } | ClientMessage::Resign) if self.is_waiting() => {
                    writeln!(self.out, "[error] No game in progress. Type `ready` to start one.")?;
                    Ok(UiAction::Nothing)
                }
                Ok(msg) => Ok(UiAction::Send(msg)),
                Err(e) => {
                    writeln!(self.out, "[error] {} (type `help` for commands)", e)?;
                    Ok(UiAction::Nothing)
                }
            },
        }
    }

    pub fn show_error(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "[error] {}", text)
    }

    fn print_board(&mut self) -> io::Result<()> {
        write!(self.out, "{}", board_text::render(&self.board))?;
        writeln!(self.out, "Current player: {}", self.to_move.as_str())?;
        self.out.flush()
    }
}
