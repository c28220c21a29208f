pub mod board_text;
pub mod terminal;

pub use terminal::{TerminalUi, UiAction};
