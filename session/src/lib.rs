//! Session coordinator: the move pipeline between the board widget and the
//! engine worker.
//!
//! The coordinator owns the current [`chess::Position`], validates and
//! applies user moves, drives the engine's analysis request cycle, and
//! reconciles asynchronous engine output with the move timeline. A monotonic
//! request token acts as an epoch counter: every successful move retires the
//! previous analysis request, and engine events stamped with a stale token
//! are discarded at delivery.

pub mod coordinator;
pub mod render;

pub use coordinator::{
    EvaluationView, HighlightState, MoveRequest, MoveResult, Session, SessionConfig,
};
pub use render::{project, RenderModel, SquareStyle, CALCULATING};
