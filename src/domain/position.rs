//! Piece placement for both colors.
//!
//! Each color owns a map from square to piece kind. A square is occupied by at
//! most one color; every mutation keeps the two maps disjoint. Mutations are
//! applied exactly as the server reports them, with no legality checks. When a
//! mutation cannot be applied it returns a [`TrustViolation`] and leaves the
//! position untouched.

use std::collections::HashMap;

use shakmaty::{File, Rank, Square};
use tracing::warn;

use crate::domain::{CastleSide, Piece, PieceColor, PieceKind};
use crate::error::TrustViolation;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Position {
    white: HashMap<Square, PieceKind>,
    black: HashMap<Square, PieceKind>,
}

impl Position {
    /// An empty board
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard opening layout
    pub fn starting() -> Self {
        let mut position = Self::new();
        position.reset();
        position
    }

    /// Clear the board and set up the standard opening layout
    pub fn reset(&mut self) {
        self.white.clear();
        self.black.clear();

        for (i, kind) in PieceKind::BACK_RANK.into_iter().enumerate() {
            let file = File::new(i as u32);
            self.white.insert(Square::from_coords(file, Rank::First), kind);
            self.white.insert(Square::from_coords(file, Rank::Second), PieceKind::Pawn);
            self.black.insert(Square::from_coords(file, Rank::Seventh), PieceKind::Pawn);
            self.black.insert(Square::from_coords(file, Rank::Eighth), kind);
        }
    }

    pub fn pieces_of(&self, color: PieceColor) -> &HashMap<Square, PieceKind> {
        match color {
            PieceColor::White => &self.white,
            PieceColor::Black => &self.black,
        }
    }

    fn pieces_mut(&mut self, color: PieceColor) -> &mut HashMap<Square, PieceKind> {
        match color {
            PieceColor::White => &mut self.white,
            PieceColor::Black => &mut self.black,
        }
    }

    /// Which color occupies `square`, if any
    pub fn color_at(&self, square: Square) -> Option<PieceColor> {
        if self.white.contains_key(&square) {
            Some(PieceColor::White)
        } else if self.black.contains_key(&square) {
            Some(PieceColor::Black)
        } else {
            None
        }
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        let color = self.color_at(square)?;
        self.pieces_of(color)
            .get(&square)
            .map(|&kind| Piece { kind, color })
    }

    pub fn piece_count(&self) -> usize {
        self.white.len() + self.black.len()
    }

    pub fn is_empty(&self) -> bool {
        self.piece_count() == 0
    }

    /// Relocate the piece on `from` to `to`.
    pub fn move_piece(&mut self, from: Square, to: Square) -> Result<(), TrustViolation> {
        self.relocate(from, to, None)
    }

    /// Remove the occupant of `to`, then relocate the piece on `from` there.
    pub fn hit(&mut self, from: Square, to: Square) -> Result<(), TrustViolation> {
        self.capture_then_relocate(from, to, None)
    }

    /// Move the piece on `from` to `to` and turn it into a queen.
    pub fn promote(&mut self, from: Square, to: Square) -> Result<(), TrustViolation> {
        self.relocate(from, to, Some(PieceKind::Queen))
    }

    pub fn promote_hit(&mut self, from: Square, to: Square) -> Result<(), TrustViolation> {
        self.capture_then_relocate(from, to, Some(PieceKind::Queen))
    }

    /// Move king and rook of `color` for the given side. Both pieces must be on
    /// their home squares; otherwise nothing changes.
    pub fn castle(&mut self, side: CastleSide, color: PieceColor) -> Result<(), TrustViolation> {
        let [(king_from, king_to), (rook_from, rook_to)] = castling_squares(side, color);

        for square in [king_from, rook_from] {
            if !self.pieces_of(color).contains_key(&square) {
                return Err(TrustViolation::CastlingPieceMissing { color, square });
            }
        }

        self.relocate(king_from, king_to, None)?;
        self.relocate(rook_from, rook_to, None)
    }

    fn capture_then_relocate(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<PieceKind>,
    ) -> Result<(), TrustViolation> {
        if self.color_at(from).is_none() {
            return Err(TrustViolation::EmptySquare(from));
        }
        match self.color_at(to) {
            Some(victim) => {
                self.pieces_mut(victim).remove(&to);
            }
            None => warn!(%from, %to, "capture onto an empty square"),
        }
        self.relocate(from, to, promotion)
    }

    fn relocate(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<PieceKind>,
    ) -> Result<(), TrustViolation> {
        let color = self.color_at(from).ok_or(TrustViolation::EmptySquare(from))?;

        let opponent = color.other();
        if self.pieces_mut(opponent).remove(&to).is_some() {
            warn!(%from, %to, "plain move onto an occupied square, removing {opponent} piece");
        }

        let pieces = self.pieces_mut(color);
        if let Some(kind) = pieces.remove(&from) {
            pieces.insert(to, promotion.unwrap_or(kind));
        }
        Ok(())
    }
}

/// King and rook (from, to) pairs for castling
fn castling_squares(side: CastleSide, color: PieceColor) -> [(Square, Square); 2] {
    match (color, side) {
        (PieceColor::White, CastleSide::Kingside) => [(Square::E1, Square::G1), (Square::H1, Square::F1)],
        (PieceColor::White, CastleSide::Queenside) => [(Square::E1, Square::C1), (Square::A1, Square::D1)],
        (PieceColor::Black, CastleSide::Kingside) => [(Square::E8, Square::G8), (Square::H8, Square::F8)],
        (PieceColor::Black, CastleSide::Queenside) => [(Square::E8, Square::C8), (Square::A8, Square::D8)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind_at(position: &Position, color: PieceColor, square: Square) -> Option<PieceKind> {
        position.pieces_of(color).get(&square).copied()
    }

    fn assert_disjoint(position: &Position) {
        for square in position.pieces_of(PieceColor::White).keys() {
            assert!(
                !position.pieces_of(PieceColor::Black).contains_key(square),
                "{square} held by both colors"
            );
        }
    }

    #[test]
    fn test_new_is_empty() {
        assert!(Position::new().is_empty());
    }

    #[test]
    fn test_starting_layout() {
        let position = Position::starting();
        assert_eq!(position.piece_count(), 32);
        assert_eq!(position.pieces_of(PieceColor::White).len(), 16);
        assert_eq!(kind_at(&position, PieceColor::White, Square::E1), Some(PieceKind::King));
        assert_eq!(kind_at(&position, PieceColor::White, Square::D1), Some(PieceKind::Queen));
        assert_eq!(kind_at(&position, PieceColor::Black, Square::E8), Some(PieceKind::King));
        assert_eq!(kind_at(&position, PieceColor::Black, Square::B8), Some(PieceKind::Knight));
        assert_eq!(kind_at(&position, PieceColor::Black, Square::H7), Some(PieceKind::Pawn));
        assert_eq!(kind_at(&position, PieceColor::White, Square::C2), Some(PieceKind::Pawn));
        assert_eq!(position.color_at(Square::E4), None);
        assert_disjoint(&position);
    }

    #[test]
    fn test_reset_restores_layout() {
        let mut position = Position::starting();
        position.hit(Square::D1, Square::D8).unwrap();
        position.reset();
        assert_eq!(position, Position::starting());
    }

    #[test]
    fn test_move_pawn() {
        let mut position = Position::starting();
        position.move_piece(Square::A2, Square::A4).unwrap();
        assert_eq!(kind_at(&position, PieceColor::White, Square::A4), Some(PieceKind::Pawn));
        assert_eq!(position.color_at(Square::A2), None);
        assert_eq!(position.piece_count(), 32);
    }

    #[test]
    fn test_move_black_piece_found_by_lookup() {
        let mut position = Position::starting();
        position.move_piece(Square::G8, Square::F6).unwrap();
        assert_eq!(
            position.piece_at(Square::F6),
            Some(Piece { kind: PieceKind::Knight, color: PieceColor::Black })
        );
    }

    #[test]
    fn test_move_from_empty_square_is_violation() {
        let mut position = Position::starting();
        let err = position.move_piece(Square::E4, Square::E5).unwrap_err();
        assert_eq!(err, TrustViolation::EmptySquare(Square::E4));
        assert_eq!(position, Position::starting());
    }

    #[test]
    fn test_hit_removes_one_occupant() {
        let mut position = Position::starting();
        position.move_piece(Square::E2, Square::E4).unwrap();
        position.move_piece(Square::D7, Square::D5).unwrap();
        position.hit(Square::E4, Square::D5).unwrap();

        assert_eq!(position.piece_count(), 31);
        assert_eq!(position.color_at(Square::D5), Some(PieceColor::White));
        assert_eq!(position.color_at(Square::E4), None);
        assert_disjoint(&position);
    }

    #[test]
    fn test_hit_from_empty_square_leaves_victim() {
        let mut position = Position::starting();
        assert!(position.hit(Square::E4, Square::E7).is_err());
        assert_eq!(position.color_at(Square::E7), Some(PieceColor::Black));
        assert_eq!(position.piece_count(), 32);
    }

    #[test]
    fn test_hit_onto_empty_square_still_moves() {
        let mut position = Position::starting();
        position.move_piece(Square::E2, Square::E5).unwrap();
        position.hit(Square::E5, Square::D6).unwrap();

        assert_eq!(position.color_at(Square::D6), Some(PieceColor::White));
        assert_eq!(position.color_at(Square::E5), None);
        assert_eq!(position.piece_count(), 32);
        assert_disjoint(&position);
    }

    #[test]
    fn test_promote_hit_onto_empty_square_still_promotes() {
        let mut position = Position::new();
        position.pieces_mut(PieceColor::White).insert(Square::B7, PieceKind::Pawn);

        position.promote_hit(Square::B7, Square::A8).unwrap();

        assert_eq!(kind_at(&position, PieceColor::White, Square::A8), Some(PieceKind::Queen));
        assert_eq!(position.piece_count(), 1);
    }

    #[test]
    fn test_plain_move_onto_opponent_keeps_maps_disjoint() {
        let mut position = Position::starting();
        position.move_piece(Square::D1, Square::D7).unwrap();
        assert_eq!(position.color_at(Square::D7), Some(PieceColor::White));
        assert_eq!(position.piece_count(), 31);
        assert_disjoint(&position);
    }

    #[test]
    fn test_promote_forces_queen() {
        let mut position = Position::new();
        position.pieces_mut(PieceColor::White).insert(Square::B7, PieceKind::Pawn);
        position.pieces_mut(PieceColor::Black).insert(Square::H2, PieceKind::Rook);

        position.promote(Square::B7, Square::B8).unwrap();
        position.promote(Square::H2, Square::H1).unwrap();

        assert_eq!(kind_at(&position, PieceColor::White, Square::B8), Some(PieceKind::Queen));
        assert_eq!(kind_at(&position, PieceColor::Black, Square::H1), Some(PieceKind::Queen));
        assert_eq!(position.piece_count(), 2);
    }

    #[test]
    fn test_promote_hit_forces_queen_and_captures() {
        let mut position = Position::starting();
        let before = position.piece_count();
        position.promote_hit(Square::G2, Square::H8).unwrap();
        assert_eq!(kind_at(&position, PieceColor::White, Square::H8), Some(PieceKind::Queen));
        assert_eq!(position.color_at(Square::G2), None);
        assert_eq!(position.piece_count(), before - 1);
    }

    #[test]
    fn test_castle_white_kingside() {
        let mut position = Position::starting();
        position.pieces_mut(PieceColor::White).remove(&Square::F1);
        position.pieces_mut(PieceColor::White).remove(&Square::G1);

        position.castle(CastleSide::Kingside, PieceColor::White).unwrap();

        assert_eq!(kind_at(&position, PieceColor::White, Square::G1), Some(PieceKind::King));
        assert_eq!(kind_at(&position, PieceColor::White, Square::F1), Some(PieceKind::Rook));
        assert_eq!(position.color_at(Square::E1), None);
        assert_eq!(position.color_at(Square::H1), None);
    }

    #[test]
    fn test_castle_from_initial_layout() {
        let mut position = Position::starting();
        position.castle(CastleSide::Kingside, PieceColor::White).unwrap();
        assert_eq!(kind_at(&position, PieceColor::White, Square::G1), Some(PieceKind::King));
        assert_eq!(kind_at(&position, PieceColor::White, Square::F1), Some(PieceKind::Rook));
        assert_eq!(position.color_at(Square::E1), None);
        assert_eq!(position.color_at(Square::H1), None);
    }

    #[test]
    fn test_castle_black_queenside() {
        let mut position = Position::starting();
        position.castle(CastleSide::Queenside, PieceColor::Black).unwrap();
        assert_eq!(kind_at(&position, PieceColor::Black, Square::C8), Some(PieceKind::King));
        assert_eq!(kind_at(&position, PieceColor::Black, Square::D8), Some(PieceKind::Rook));
        assert_eq!(position.color_at(Square::A8), None);
        assert_eq!(position.color_at(Square::E8), None);
    }

    #[test]
    fn test_castle_without_rook_changes_nothing() {
        let mut position = Position::starting();
        position.pieces_mut(PieceColor::White).remove(&Square::H1);
        let before = position.clone();

        let err = position.castle(CastleSide::Kingside, PieceColor::White).unwrap_err();

        assert_eq!(
            err,
            TrustViolation::CastlingPieceMissing { color: PieceColor::White, square: Square::H1 }
        );
        assert_eq!(position, before);
    }
}
