//! Application layer: game session state and the server connection.

pub mod connection;
pub mod session;

pub use connection::{ConnectionEvent, LineSender, ServerConnection};
pub use session::{EndReason, GamePhase, GameSession, SessionEvent};
