//! Coordinate-notation square helpers ("e2", "e2e4", "e7e8q").

use crate::types::PieceKind;
use cozy_chess::{File, Rank, Square};

/// Parse a square in coordinate notation.
pub fn parse_square(s: &str) -> Option<Square> {
    let mut chars = s.chars();
    let file = match chars.next()? {
        'a' => File::A,
        'b' => File::B,
        'c' => File::C,
        'd' => File::D,
        'e' => File::E,
        'f' => File::F,
        'g' => File::G,
        'h' => File::H,
        _ => return None,
    };
    let rank = match chars.next()? {
        '1' => Rank::First,
        '2' => Rank::Second,
        '3' => Rank::Third,
        '4' => Rank::Fourth,
        '5' => Rank::Fifth,
        '6' => Rank::Sixth,
        '7' => Rank::Seventh,
        '8' => Rank::Eighth,
        _ => return None,
    };
    if chars.next().is_some() {
        return None;
    }
    Some(Square::new(file, rank))
}

/// Format a square in coordinate notation.
pub fn format_square(sq: Square) -> String {
    let file = match sq.file() {
        File::A => 'a',
        File::B => 'b',
        File::C => 'c',
        File::D => 'd',
        File::E => 'e',
        File::F => 'f',
        File::G => 'g',
        File::H => 'h',
    };
    let rank = match sq.rank() {
        Rank::First => '1',
        Rank::Second => '2',
        Rank::Third => '3',
        Rank::Fourth => '4',
        Rank::Fifth => '5',
        Rank::Sixth => '6',
        Rank::Seventh => '7',
        Rank::Eighth => '8',
    };
    format!("{}{}", file, rank)
}

/// Format a from/to pair (plus optional promotion) in coordinate move
/// notation, e.g. "e2e4" or "e7e8q".
pub fn format_coordinate_move(from: Square, to: Square, promotion: Option<PieceKind>) -> String {
    let mut s = format!("{}{}", format_square(from), format_square(to));
    if let Some(kind) = promotion {
        s.push(kind.to_char_lower());
    }
    s
}
