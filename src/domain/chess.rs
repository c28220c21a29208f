//! Pure chess domain types.
//! Squares come from shakmaty; pieces carry only kind and color.

use std::fmt;
use std::str::FromStr;

use shakmaty::Role;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum PieceKind {
    Rook,
    Knight,
    Bishop,
    Queen,
    King,
    Pawn,
}

impl PieceKind {
    /// Back rank layout from the a-file to the h-file
    pub const BACK_RANK: [PieceKind; 8] = [
        PieceKind::Rook,
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Queen,
        PieceKind::King,
        PieceKind::Bishop,
        PieceKind::Knight,
        PieceKind::Rook,
    ];

    pub fn role(self) -> Role {
        match self {
            PieceKind::Pawn => Role::Pawn,
            PieceKind::Knight => Role::Knight,
            PieceKind::Bishop => Role::Bishop,
            PieceKind::Rook => Role::Rook,
            PieceKind::Queen => Role::Queen,
            PieceKind::King => Role::King,
        }
    }

    /// Lowercase letter for this kind (`p`, `n`, `b`, `r`, `q`, `k`)
    pub fn char(self) -> char {
        self.role().char()
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum PieceColor {
    White,
    Black,
}

impl PieceColor {
    pub fn other(self) -> Self {
        match self {
            PieceColor::White => PieceColor::Black,
            PieceColor::Black => PieceColor::White,
        }
    }

    /// Capitalized name used in the move log and turn label
    pub fn label(self) -> &'static str {
        match self {
            PieceColor::White => "White",
            PieceColor::Black => "Black",
        }
    }

    /// Protocol word (`white` / `black`)
    pub fn as_str(self) -> &'static str {
        match self {
            PieceColor::White => "white",
            PieceColor::Black => "black",
        }
    }
}

impl fmt::Display for PieceColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PieceColor {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "white" => Ok(PieceColor::White),
            "black" => Ok(PieceColor::Black),
            _ => Err(()),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Piece {
    pub kind: PieceKind,
    pub color: PieceColor,
}

impl Piece {
    /// Board letter: uppercase for white, lowercase for black
    pub fn char(&self) -> char {
        match self.color {
            PieceColor::White => self.kind.char().to_ascii_uppercase(),
            PieceColor::Black => self.kind.char(),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CastleSide {
    Kingside,
    Queenside,
}

impl CastleSide {
    /// Notation used in the move log
    pub fn notation(self) -> &'static str {
        match self {
            CastleSide::Kingside => "O-O",
            CastleSide::Queenside => "O-O-O",
        }
    }
}
