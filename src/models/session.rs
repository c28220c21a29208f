//! Game session state machine.
//!
//! The session owns the position, the color to move and the game phase. It
//! takes decoded server messages, applies them, and returns the events the
//! presentation layer should react to. The server is authoritative: board
//! commands are applied without any legality checks.

use tracing::{debug, info, warn};

use crate::domain::{
    BoardAction, BoardCommand, PieceColor, Player, Position, ServerError, ServerMessage,
    TerminalFlag,
};

/// Why a game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    Checkmate,
    Stalemate,
    Resignation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Waiting for both players to be ready
    AwaitingStart,
    InProgress,
    Ended(EndReason),
}

/// Events emitted by the session for the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The position changed; carries a snapshot to render
    BoardChanged(Position),
    LogLine(String),
    LogCleared,
    Chat { sender: Player, text: String },
    TurnChanged(PieceColor),
    Notify { text: String, is_error: bool },
    EnterWaiting,
    EnterPlaying,
}

impl SessionEvent {
    fn notify(text: impl Into<String>) -> Self {
        SessionEvent::Notify { text: text.into(), is_error: false }
    }

    fn error(text: impl Into<String>) -> Self {
        SessionEvent::Notify { text: text.into(), is_error: true }
    }
}

pub struct GameSession {
    /// Local replica of the server's board
    position: Position,
    /// Color whose move is expected next
    to_move: PieceColor,
    /// Lifecycle of the current game
    phase: GamePhase,
    /// Color assigned by the server, once known
    my_color: Option<PieceColor>,
    /// How the most recent game ended, kept after the phase moves on
    last_result: Option<EndReason>,
}

impl GameSession {
    pub fn new() -> Self {
        Self {
            position: Position::new(),
            to_move: PieceColor::White,
            phase: GamePhase::AwaitingStart,
            my_color: None,
            last_result: None,
        }
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn to_move(&self) -> PieceColor {
        self.to_move
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn my_color(&self) -> Option<PieceColor> {
        self.my_color
    }

    pub fn last_result(&self) -> Option<EndReason> {
        self.last_result
    }

    /// Decode and apply one raw line. Malformed lines are reported and
    /// otherwise ignored.
    pub fn handle_line(&mut self, line: &str) -> Vec<SessionEvent> {
        match ServerMessage::parse(line) {
            Ok(msg) => {
                debug!(?msg, "server message");
                self.apply(msg)
            }
            Err(e) => {
                warn!(line, error = %e, "discarding malformed server line");
                vec![SessionEvent::error(format!("Malformed server message `{}`: {}", line.trim(), e))]
            }
        }
    }

    /// Apply one decoded server message
    pub fn apply(&mut self, msg: ServerMessage) -> Vec<SessionEvent> {
        let mut events = Vec::new();

        match msg {
            ServerMessage::Chat { sender, text } => events.push(SessionEvent::Chat { sender, text }),
            ServerMessage::Color(color) => {
                self.my_color = Some(color);
                events.push(SessionEvent::notify(format!("You are playing with color {}.", color)));
            }
            ServerMessage::Start => self.start_game(&mut events),
            ServerMessage::Error(kind) => events.push(match kind {
                ServerError::Full => SessionEvent::notify("Sorry, the server is full."),
                ServerError::Move => SessionEvent::error("Invalid move."),
                ServerError::Command => SessionEvent::error("Internal error: the client sent a wrong command."),
            }),
            ServerMessage::Resign => {
                events.push(SessionEvent::notify("Game ended by resignation."));
                self.end_game(EndReason::Resignation, &mut events);
            }
            ServerMessage::Board(cmd) => {
                if self.phase == GamePhase::InProgress {
                    self.apply_board(cmd, &mut events);
                } else {
                    warn!(?cmd, phase = ?self.phase, "board command outside a running game");
                    events.push(SessionEvent::error("Ignoring a move received while no game is running."));
                }
            }
        }

        events
    }

    fn start_game(&mut self, events: &mut Vec<SessionEvent>) {
        if self.phase == GamePhase::InProgress {
            warn!("start received during a running game, restarting");
        }
        info!("game started");

        self.position.reset();
        self.to_move = PieceColor::White;
        self.phase = GamePhase::InProgress;

        events.push(SessionEvent::TurnChanged(self.to_move));
        events.push(SessionEvent::EnterPlaying);
        events.push(SessionEvent::BoardChanged(self.position.clone()));
    }

    fn apply_board(&mut self, cmd: BoardCommand, events: &mut Vec<SessionEvent>) {
        let mover = self.to_move.label();

        let (result, entry) = match cmd.action {
            BoardAction::Move { from, to } => {
                (self.position.move_piece(from, to), format!("{mover} {from}-{to}"))
            }
            BoardAction::Hit { from, to } => (self.position.hit(from, to), format!("{mover} {from}x{to}")),
            BoardAction::Promote { from, to } => {
                (self.position.promote(from, to), format!("{mover} {from}-{to} (Q)"))
            }
            BoardAction::PromoteHit { from, to } => {
                (self.position.promote_hit(from, to), format!("{mover} {from}x{to} (Q)"))
            }
            BoardAction::Castle(side) => (
                self.position.castle(side, self.to_move),
                format!("{mover} {}", side.notation()),
            ),
        };

        match result {
            Ok(()) => {
                events.push(SessionEvent::LogLine(entry));
                events.push(SessionEvent::BoardChanged(self.position.clone()));
            }
            // The server's game still advanced, so keep following its turns.
            Err(violation) => {
                warn!(?cmd, %violation, "server update does not fit the local position");
                events.push(SessionEvent::error(format!("Could not apply `{entry}`: {violation}")));
            }
        }

        let ended = match cmd.flag {
            Some(TerminalFlag::Check) => {
                events.push(SessionEvent::notify("Check"));
                None
            }
            Some(TerminalFlag::Checkmate) => {
                events.push(SessionEvent::notify("Checkmate"));
                Some(EndReason::Checkmate)
            }
            Some(TerminalFlag::Stalemate) => {
                events.push(SessionEvent::notify("Stalemate"));
                Some(EndReason::Stalemate)
            }
            None => None,
        };

        match ended {
            Some(reason) => self.end_game(reason, events),
            None => {
                self.to_move = self.to_move.other();
                events.push(SessionEvent::TurnChanged(self.to_move));
            }
        }
    }

    /// Record the result and go straight back to waiting for a new game
    fn end_game(&mut self, reason: EndReason, events: &mut Vec<SessionEvent>) {
        info!(?reason, "game ended");
        self.phase = GamePhase::Ended(reason);
        self.last_result = Some(reason);
        self.new_game(events);
    }

    fn new_game(&mut self, events: &mut Vec<SessionEvent>) {
        self.position.reset();
        self.to_move = PieceColor::White;
        self.phase = GamePhase::AwaitingStart;

        events.push(SessionEvent::LogCleared);
        events.push(SessionEvent::BoardChanged(self.position.clone()));
        events.push(SessionEvent::EnterWaiting);
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}
