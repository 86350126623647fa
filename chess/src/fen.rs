//! FEN parsing and formatting, thin over cozy-chess.

use cozy_chess::Board;

/// Parse a FEN string into a Board.
pub fn parse_fen(fen: &str) -> Result<Board, FenError> {
    if fen.split_whitespace().next().is_none() {
        return Err(FenError::Empty);
    }
    fen.parse()
        .map_err(|_| FenError::Invalid(fen.to_string()))
}

/// Format a Board as a FEN string.
pub fn format_fen(board: &Board) -> String {
    board.to_string()
}

#[derive(Debug, thiserror::Error)]
pub enum FenError {
    #[error("empty FEN string")]
    Empty,
    #[error("invalid FEN: {0}")]
    Invalid(String),
}
