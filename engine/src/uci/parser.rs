//! Total parser for engine output lines.
//!
//! Unlike a strict protocol codec this parser never fails: the engine emits
//! many informational lines per request and only two shapes matter here, so
//! everything malformed or irrelevant maps to [`EngineEvent::Unrecognized`].

use crate::{EngineEvent, Score};
use chess::parse_square;

/// Parse one line of engine output.
///
/// Recognized shapes:
/// - `bestmove <move> ...` where `<move>` is a well-formed coordinate move
/// - `info ... score (cp|mate) <int> ...`
pub fn parse_line(line: &str) -> EngineEvent {
    let tokens: Vec<&str> = line.split_whitespace().collect();

    if tokens.first() == Some(&"bestmove") {
        return match tokens.get(1) {
            Some(mv) if is_coordinate_move(mv) => EngineEvent::BestMove((*mv).to_string()),
            _ => EngineEvent::Unrecognized,
        };
    }

    if tokens.contains(&"info") {
        if let Some(idx) = tokens.iter().position(|t| *t == "score") {
            return match (tokens.get(idx + 1), tokens.get(idx + 2)) {
                (Some(&"cp"), Some(value)) => match value.parse() {
                    Ok(cp) => EngineEvent::Score(Score::Centipawns(cp)),
                    Err(_) => EngineEvent::Unrecognized,
                },
                (Some(&"mate"), Some(value)) => match value.parse() {
                    Ok(m) => EngineEvent::Score(Score::Mate(m)),
                    Err(_) => EngineEvent::Unrecognized,
                },
                _ => EngineEvent::Unrecognized,
            };
        }
    }

    EngineEvent::Unrecognized
}

/// True when `s` looks like a coordinate move: two squares plus an optional
/// promotion letter ("e2e4", "e7e8q").
fn is_coordinate_move(s: &str) -> bool {
    if !s.is_ascii() {
        return false;
    }
    match s.len() {
        4 => parse_square(&s[0..2]).is_some() && parse_square(&s[2..4]).is_some(),
        5 => {
            parse_square(&s[0..2]).is_some()
                && parse_square(&s[2..4]).is_some()
                && matches!(s.as_bytes()[4], b'q' | b'r' | b'b' | b'n')
        }
        _ => false,
    }
}
