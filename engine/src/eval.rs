//! Evaluation normalization.
//!
//! The engine reports scores from the perspective of the side to move. The
//! board UI shows a single White-relative number, so scores for positions
//! where Black is to move are negated before display.

use crate::Score;
use chess::PieceColor;

impl Score {
    /// Flip perspective.
    pub fn negate(self) -> Self {
        match self {
            Self::Centipawns(cp) => Self::Centipawns(cp.saturating_neg()),
            Self::Mate(m) => Self::Mate(m.saturating_neg()),
        }
    }

    /// Human-oriented evaluation string, White-relative.
    ///
    /// Centipawns are shown in pawns with two decimals (57 becomes "0.57");
    /// mate distances are shown as "Mate in N" with the sign discarded.
    pub fn normalize(self, side_to_move: PieceColor) -> String {
        match self {
            Self::Centipawns(cp) => {
                let white_cp = match side_to_move {
                    PieceColor::White => cp,
                    PieceColor::Black => cp.saturating_neg(),
                };
                format!("{:.2}", f64::from(white_cp) / 100.0)
            }
            Self::Mate(m) => format!("Mate in {}", m.unsigned_abs()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centipawns_white_to_move() {
        assert_eq!(Score::Centipawns(57).normalize(PieceColor::White), "0.57");
    }

    #[test]
    fn test_centipawns_black_to_move_negated() {
        assert_eq!(Score::Centipawns(57).normalize(PieceColor::Black), "-0.57");
    }

    #[test]
    fn test_centipawns_negative_value() {
        assert_eq!(
            Score::Centipawns(-213).normalize(PieceColor::White),
            "-2.13"
        );
        assert_eq!(Score::Centipawns(-213).normalize(PieceColor::Black), "2.13");
    }

    #[test]
    fn test_centipawns_zero() {
        assert_eq!(Score::Centipawns(0).normalize(PieceColor::White), "0.00");
        assert_eq!(Score::Centipawns(0).normalize(PieceColor::Black), "0.00");
    }

    #[test]
    fn test_mate_sign_discarded() {
        assert_eq!(Score::Mate(-3).normalize(PieceColor::White), "Mate in 3");
        assert_eq!(Score::Mate(5).normalize(PieceColor::Black), "Mate in 5");
    }

    #[test]
    fn test_negate() {
        assert_eq!(Score::Centipawns(40).negate(), Score::Centipawns(-40));
        assert_eq!(Score::Mate(-2).negate(), Score::Mate(2));
    }
}
