//! Pure projection of session state into what the board widget draws.

use crate::coordinator::{EvaluationView, HighlightState};
use chess::{format_square, Position};
use serde::Serialize;
use std::collections::BTreeMap;

/// Placeholder shown while an evaluation-view field is still empty.
pub const CALCULATING: &str = "Calculating…";

/// Visual style for a highlighted square. The source and target of the last
/// move get distinct styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SquareStyle {
    MoveSource,
    MoveTarget,
}

/// One frame for the board widget: position notation, square highlights,
/// and the engine texts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderModel {
    pub fen: String,
    /// Square in coordinate notation mapped to its style.
    pub square_styles: BTreeMap<String, SquareStyle>,
    pub best_move: String,
    pub evaluation: String,
}

/// Package current state for display. Pure and total; no side effects.
pub fn project(
    position: &Position,
    view: &EvaluationView,
    highlight: &HighlightState,
) -> RenderModel {
    let mut square_styles = BTreeMap::new();
    if let Some(from) = highlight.from {
        square_styles.insert(format_square(from), SquareStyle::MoveSource);
    }
    if let Some(to) = highlight.to {
        square_styles.insert(format_square(to), SquareStyle::MoveTarget);
    }

    RenderModel {
        fen: position.to_fen(),
        square_styles,
        best_move: view
            .best_move
            .clone()
            .unwrap_or_else(|| CALCULATING.to_string()),
        evaluation: view
            .evaluation
            .clone()
            .unwrap_or_else(|| CALCULATING.to_string()),
    }
}
