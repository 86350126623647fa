use crate::render::{project, RenderModel};
use chess::{parse_square, AppliedMove, FenError, PieceKind, Position, PositionError, Square};
use engine::{EngineConfig, EngineEvent, EngineWorker, TaggedEvent};
use serde::Serialize;

/// A move request as produced by one drop gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveRequest {
    pub from: Square,
    pub to: Square,
    /// Consulted only when the move turns out to be a promotion.
    pub promotion: PieceKind,
}

impl MoveRequest {
    /// Request with the default Queen promotion.
    pub fn new(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            promotion: PieceKind::Queen,
        }
    }
}

/// Outcome of one drop gesture.
#[derive(Debug)]
pub enum MoveResult {
    Applied { position: Position, mv: AppliedMove },
    Rejected(PositionError),
}

impl MoveResult {
    /// The widget contract: accepted or not.
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

/// User-facing engine output for the position currently displayed.
/// Fields are replaced wholesale as events for the current token arrive,
/// never merged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EvaluationView {
    /// Best move in coordinate notation, once the engine has reported one.
    pub best_move: Option<String>,
    /// Normalized White-relative evaluation text.
    pub evaluation: Option<String>,
}

/// Squares to highlight for the last accepted move. Updated exactly once per
/// accepted move, independent of engine timing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HighlightState {
    pub from: Option<Square>,
    pub to: Option<Square>,
}

/// Session construction parameters.
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    pub engine: EngineConfig,
    /// Starting position; standard when unset.
    pub start_fen: Option<String>,
}

/// One game session: the position timeline, the analysis token, and the
/// engine worker. A session must be the sole owner of its worker's channels.
pub struct Session {
    position: Position,
    /// Epoch counter for analysis requests. Incremented only on successful
    /// move application; engine events stamped with any other value are
    /// stale and dropped.
    token: u64,
    view: EvaluationView,
    highlight: HighlightState,
    engine: Option<EngineWorker>,
}

impl Session {
    /// Start a session, spawning the engine worker.
    ///
    /// A worker that fails to spawn degrades the session rather than failing
    /// it: moves are still validated and applied, no evaluation is ever
    /// produced.
    pub async fn start(config: SessionConfig) -> Result<Self, FenError> {
        let position = match &config.start_fen {
            Some(fen) => Position::from_fen(fen)?,
            None => Position::startpos(),
        };

        let engine = match EngineWorker::spawn(config.engine).await {
            Ok(worker) => Some(worker),
            Err(e) => {
                tracing::warn!("engine unavailable, continuing without analysis: {}", e);
                None
            }
        };

        Ok(Self::with_engine(position, engine))
    }

    /// Session with no engine attached.
    pub fn degraded(position: Position) -> Self {
        Self::with_engine(position, None)
    }

    pub fn with_engine(position: Position, engine: Option<EngineWorker>) -> Self {
        Self {
            position,
            token: 0,
            view: EvaluationView::default(),
            highlight: HighlightState::default(),
            engine,
        }
    }

    /// Validate and apply one user move.
    ///
    /// On success the stored position is replaced (the timeline is a strict
    /// linear chain), the highlight is set to the move's squares, the token
    /// is advanced to a fresh value, the evaluation view resets to empty,
    /// and a position-set plus depth-bounded go command pair is issued to
    /// the engine under the new token. A rejected move changes nothing.
    pub async fn apply_user_move(&mut self, req: MoveRequest) -> MoveResult {
        let (next, applied) = match self.position.apply_move(req.from, req.to, req.promotion) {
            Ok(result) => result,
            Err(e) => {
                tracing::debug!("move rejected: {}", e);
                return MoveResult::Rejected(e);
            }
        };

        self.position = next;
        self.highlight = HighlightState {
            from: Some(req.from),
            to: Some(req.to),
        };
        self.token += 1;
        self.view = EvaluationView::default();
        tracing::info!(token = self.token, mv = %applied.to_coordinate(), "move applied");

        if let Some(worker) = &self.engine {
            if let Err(e) = worker
                .request_analysis(self.token, &self.position.to_fen())
                .await
            {
                tracing::warn!("engine request failed, degrading session: {}", e);
                self.engine = None;
            }
        }

        MoveResult::Applied {
            position: self.position.clone(),
            mv: applied,
        }
    }

    /// Drop-gesture boundary for the board widget: `(from, to) -> accepted`.
    /// Promotion defaults to Queen.
    pub async fn handle_drop(&mut self, from: &str, to: &str) -> bool {
        let (Some(from), Some(to)) = (parse_square(from), parse_square(to)) else {
            return false;
        };
        self.apply_user_move(MoveRequest::new(from, to)).await.is_applied()
    }

    /// Deliver one engine event.
    ///
    /// Events stamped with a token other than the current one belong to a
    /// retired request; they are dropped here. This is a defined discard,
    /// not a failure.
    pub fn observe(&mut self, tagged: TaggedEvent) {
        if tagged.token != self.token {
            tracing::debug!(
                stale = tagged.token,
                current = self.token,
                "discarding stale engine event"
            );
            return;
        }

        match tagged.event {
            EngineEvent::BestMove(mv) => {
                tracing::debug!(token = tagged.token, best_move = %mv, "best move updated");
                self.view.best_move = Some(mv);
            }
            EngineEvent::Score(score) => {
                self.view.evaluation = Some(score.normalize(self.position.side_to_move()));
            }
            EngineEvent::Unrecognized => {}
        }
    }

    /// Drain all pending engine events without blocking.
    pub fn process_engine_events(&mut self) {
        let mut pending = Vec::new();
        if let Some(worker) = &mut self.engine {
            while let Some(tagged) = worker.try_recv() {
                pending.push(tagged);
            }
        }
        for tagged in pending {
            self.observe(tagged);
        }
    }

    /// Wait for the next engine event. Returns `None` immediately on a
    /// degraded session, or once the worker's reader has exited.
    pub async fn next_event(&mut self) -> Option<TaggedEvent> {
        match &mut self.engine {
            Some(worker) => worker.recv().await,
            None => None,
        }
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn token(&self) -> u64 {
        self.token
    }

    pub fn view(&self) -> &EvaluationView {
        &self.view
    }

    pub fn highlight(&self) -> HighlightState {
        self.highlight
    }

    pub fn has_engine(&self) -> bool {
        self.engine.is_some()
    }

    /// Project current state for the board widget.
    pub fn render(&self) -> RenderModel {
        project(&self.position, &self.view, &self.highlight)
    }

    /// Release the engine worker. The session runs until the surrounding
    /// process tears it down; there is no terminal game state here.
    pub async fn shutdown(mut self) {
        if let Some(worker) = self.engine.take() {
            worker.shutdown().await;
        }
        tracing::info!("session shut down");
    }
}
