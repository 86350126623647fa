//! Immutable board position.
//!
//! A [`Position`] is never mutated in place: applying a move produces a new
//! value, so the session's position timeline is a strictly linear chain of
//! fresh positions.

use crate::fen::{format_fen, parse_fen, FenError};
use crate::square::format_coordinate_move;
use crate::types::{PieceColor, PieceKind};
use cozy_chess::{Board, File, Move, Rank, Square};

/// A complete board state: piece placement, side to move, castling and
/// en-passant rights, move clocks.
#[derive(Debug, Clone)]
pub struct Position {
    board: Board,
}

/// The move that was actually played, after legality resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedMove {
    pub from: Square,
    pub to: Square,
    /// Present only when the move was a promotion.
    pub promotion: Option<PieceKind>,
}

impl AppliedMove {
    /// Coordinate notation, e.g. "e2e4" or "e7e8q".
    pub fn to_coordinate(&self) -> String {
        format_coordinate_move(self.from, self.to, self.promotion)
    }
}

impl Position {
    /// The standard starting position.
    pub fn startpos() -> Self {
        Self {
            board: Board::default(),
        }
    }

    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        Ok(Self {
            board: parse_fen(fen)?,
        })
    }

    pub fn to_fen(&self) -> String {
        format_fen(&self.board)
    }

    pub fn side_to_move(&self) -> PieceColor {
        self.board.side_to_move().into()
    }

    /// All legal moves in this position.
    pub fn legal_moves(&self) -> Vec<Move> {
        let mut moves = Vec::new();
        self.board.generate_moves(|mvs| {
            moves.extend(mvs);
            false
        });
        moves
    }

    /// Apply a user move, producing a new position and leaving `self`
    /// untouched.
    ///
    /// Legality is decided entirely by the move generator: the request is
    /// matched against the legal-move list. `promotion` is consulted only
    /// when the matched move is a promotion. A two-square king slide is
    /// normalized to cozy-chess's king-takes-rook castling encoding before
    /// matching.
    pub fn apply_move(
        &self,
        from: Square,
        to: Square,
        promotion: PieceKind,
    ) -> Result<(Position, AppliedMove), PositionError> {
        let legal = self.legal_moves();

        let mv = legal
            .iter()
            .copied()
            .find(|mv| {
                mv.from == from
                    && mv.to == to
                    && (mv.promotion.is_none() || mv.promotion == Some(promotion.into()))
            })
            .or_else(|| normalize_castling(from, to, &legal))
            .ok_or(PositionError::IllegalMove { from, to })?;

        let mut board = self.board.clone();
        // Safe: `mv` came from the legal-move list for this board.
        board.play_unchecked(mv);

        let applied = AppliedMove {
            from: mv.from,
            to: mv.to,
            promotion: mv.promotion.map(PieceKind::from),
        };
        Ok((Position { board }, applied))
    }
}

/// Convert a two-square king slide (e1g1, e1c1, e8g8, e8c8) into the
/// king-takes-rook move cozy-chess expects, if that castling move is legal.
fn normalize_castling(from: Square, to: Square, legal_moves: &[Move]) -> Option<Move> {
    let on_back_rank = matches!(from.rank(), Rank::First | Rank::Eighth);
    if !on_back_rank || from.file() != File::E {
        return None;
    }
    let rook_file = match to.file() {
        File::G => File::H,
        File::C => File::A,
        _ => return None,
    };

    let candidate = Move {
        from,
        to: Square::new(rook_file, from.rank()),
        promotion: None,
    };
    legal_moves.contains(&candidate).then_some(candidate)
}

#[derive(Debug, thiserror::Error)]
pub enum PositionError {
    #[error("illegal move: {from}{to}")]
    IllegalMove { from: Square, to: Square },
    #[error(transparent)]
    Fen(#[from] FenError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::square::parse_square;

    fn sq(s: &str) -> Square {
        parse_square(s).unwrap()
    }

    #[test]
    fn test_apply_legal_move() {
        let start = Position::startpos();
        let (next, applied) = start
            .apply_move(sq("e2"), sq("e4"), PieceKind::Queen)
            .unwrap();

        assert_eq!(applied.to_coordinate(), "e2e4");
        assert_eq!(next.side_to_move(), PieceColor::Black);
        // The original position is untouched.
        assert_eq!(start.to_fen(), Position::startpos().to_fen());
    }

    #[test]
    fn test_apply_illegal_move() {
        let start = Position::startpos();
        let result = start.apply_move(sq("e2"), sq("e5"), PieceKind::Queen);
        assert!(matches!(
            result,
            Err(PositionError::IllegalMove { .. })
        ));
    }

    #[test]
    fn test_promotion_uses_requested_piece() {
        let position = Position::from_fen("8/4P2k/8/8/8/8/8/4K3 w - - 0 1").unwrap();

        let (_, applied) = position
            .apply_move(sq("e7"), sq("e8"), PieceKind::Knight)
            .unwrap();
        assert_eq!(applied.promotion, Some(PieceKind::Knight));
        assert_eq!(applied.to_coordinate(), "e7e8n");
    }

    #[test]
    fn test_promotion_ignored_for_plain_move() {
        let start = Position::startpos();
        let (_, applied) = start
            .apply_move(sq("g1"), sq("f3"), PieceKind::Queen)
            .unwrap();
        assert_eq!(applied.promotion, None);
    }

    #[test]
    fn test_castling_king_slide_normalized() {
        // White ready to castle kingside.
        let position =
            Position::from_fen("r1bqkbnr/pppp1ppp/2n5/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4")
                .unwrap();

        let (next, applied) = position
            .apply_move(sq("e1"), sq("g1"), PieceKind::Queen)
            .unwrap();
        // cozy-chess encodes castling as king takes own rook.
        assert_eq!(applied.to_coordinate(), "e1h1");
        assert_eq!(next.side_to_move(), PieceColor::Black);
    }

    proptest::proptest! {
        // Random legal playouts: the FEN of every reached position must
        // reparse to a position with the identical FEN.
        #[test]
        fn test_fen_round_trip_random_playout(picks in proptest::collection::vec(0usize..218, 0..40)) {
            let mut position = Position::startpos();
            for pick in picks {
                let legal = position.legal_moves();
                if legal.is_empty() {
                    break;
                }
                let mv = legal[pick % legal.len()];
                let promotion = mv.promotion.map(PieceKind::from).unwrap_or(PieceKind::Queen);
                let (next, _) = position.apply_move(mv.from, mv.to, promotion).unwrap();
                let reparsed = Position::from_fen(&next.to_fen()).unwrap();
                proptest::prop_assert_eq!(reparsed.to_fen(), next.to_fen());
                position = next;
            }
        }
    }

    #[test]
    fn test_fen_round_trip_after_moves() {
        let mut position = Position::startpos();
        for (from, to) in [("e2", "e4"), ("e7", "e5"), ("g1", "f3"), ("b8", "c6")] {
            let (next, _) = position
                .apply_move(sq(from), sq(to), PieceKind::Queen)
                .unwrap();
            let reparsed = Position::from_fen(&next.to_fen()).unwrap();
            assert_eq!(reparsed.to_fen(), next.to_fen());
            position = next;
        }
    }
}
