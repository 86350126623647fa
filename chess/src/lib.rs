//! Rules-collaborator adapter.
//!
//! Wraps cozy-chess behind an immutable [`Position`] value plus the
//! project-owned piece/color types. Everything above this crate consumes
//! positions as FEN strings and squares in coordinate notation; cozy-chess
//! never leaks past this boundary except for the [`Square`] re-export.

pub mod fen;
pub mod position;
pub mod square;
pub mod types;

pub use fen::{format_fen, parse_fen, FenError};
pub use position::{AppliedMove, Position, PositionError};
pub use square::{format_coordinate_move, format_square, parse_square};
pub use types::{PieceColor, PieceKind};

// Squares are plain enough to pass through unchanged.
pub use cozy_chess::Square;
