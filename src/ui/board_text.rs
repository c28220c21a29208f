//! Plain-text board rendering.

use shakmaty::{File, Rank, Square};

use crate::domain::Position;

const BORDER: &str = "  +-----------------+";
const FILES: &str = "    a b c d e f g h";

/// Render `position` with rank 8 at the top. White pieces are uppercase,
/// black pieces lowercase, empty squares `.`.
pub fn render(position: &Position) -> String {
    let mut out = String::new();
    out.push_str(BORDER);
    out.push('\n');

    for rank in (0..8u32).rev() {
        out.push_str(&format!("{} |", rank + 1));
        for file in 0..8u32 {
            let square = Square::from_coords(File::new(file), Rank::new(rank));
            let c = position.piece_at(square).map_or('.', |piece| piece.char());
            out.push(' ');
            out.push(c);
        }
        out.push_str(" |\n");
    }

    out.push_str(BORDER);
    out.push('\n');
    out.push_str(FILES);
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_starting_position() {
        let text = render(&Position::starting());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 11);
        assert_eq!(lines[1], "8 | r n b q k b n r |");
        assert_eq!(lines[2], "7 | p p p p p p p p |");
        assert_eq!(lines[4], "5 | . . . . . . . . |");
        assert_eq!(lines[8], "1 | R N B Q K B N R |");
        assert_eq!(lines[10], FILES);
    }

    #[test]
    fn test_render_after_move() {
        let mut position = Position::starting();
        position.move_piece(Square::E2, Square::E4).unwrap();
        let text = render(&position);
        assert!(text.contains("4 | . . . . P . . . |"));
        assert!(text.contains("2 | P P P P . P P P |"));
    }
}
