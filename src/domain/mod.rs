//! Domain layer: chess types, piece placement and the wire protocol.
//! Nothing here does I/O.

pub mod chess;
pub mod position;
pub mod protocol;

pub use chess::{CastleSide, Piece, PieceColor, PieceKind};
pub use position::Position;
pub use protocol::{
    BoardAction, BoardCommand, ClientMessage, Player, ServerError, ServerMessage, TerminalFlag,
};
