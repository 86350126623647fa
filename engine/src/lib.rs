//! Search-engine side of the session: UCI line parsing, evaluation
//! normalization, and the background worker process.
//!
//! The engine is an opaque external process. This crate speaks its
//! line-oriented protocol, turns the output stream into structured events,
//! and stamps every event with the analysis-request token that was active
//! when the request was issued so the session can discard stale results.

pub mod eval;
pub mod uci;
pub mod worker;

pub use uci::parse_line;
pub use worker::{EngineConfig, EngineWorker, DEFAULT_SEARCH_DEPTH};

/// Commands sent to the engine worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCommand {
    SetPosition { fen: String },
    Go { depth: u8 },
    Quit,
}

impl EngineCommand {
    /// Protocol line for this command, without the trailing newline.
    pub fn to_protocol_line(&self) -> String {
        match self {
            Self::SetPosition { fen } => format!("position fen {fen}"),
            Self::Go { depth } => format!("go depth {depth}"),
            Self::Quit => "quit".to_string(),
        }
    }
}

/// One parsed line of engine output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Final move recommendation, in coordinate notation ("e2e4").
    BestMove(String),
    /// Interim score report for the position under analysis.
    Score(Score),
    /// Anything else. The protocol is verbose; these are dropped silently.
    Unrecognized,
}

/// Raw engine score, from the perspective of the side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Score {
    Centipawns(i32),
    /// Distance to mate in moves; negative when the side to move gets mated.
    Mate(i32),
}

/// An engine event stamped with the analysis-request token it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedEvent {
    pub token: u64,
    pub event: EngineEvent,
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("engine binary not found")]
    NotFound,
    #[error("failed to spawn engine process: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("engine process has no stdin")]
    NoStdin,
    #[error("engine process has no stdout")]
    NoStdout,
    #[error("engine I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("engine closed before completing the handshake")]
    HandshakeClosed,
    #[error("timed out waiting for the engine handshake")]
    HandshakeTimeout,
    #[error("engine command channel closed")]
    ChannelClosed,
}
