//! Background engine worker.
//!
//! Owns the engine child process and bridges it onto channels: a writer task
//! turns [`EngineCommand`]s into protocol lines on stdin, a reader task
//! parses stdout lines and forwards recognized events stamped with the
//! current request token. The worker is acquired once per session and
//! released on shutdown, independent of any request.

use crate::uci::parse_line;
use crate::{EngineCommand, EngineError, EngineEvent, TaggedEvent};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::Child;
use tokio::sync::mpsc;

/// Fixed search depth for every analysis request. Depth-limited rather than
/// time-limited, so results are reproducible across machines at the cost of
/// variable latency.
pub const DEFAULT_SEARCH_DEPTH: u8 = 12;

const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);
const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

/// Worker configuration.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Engine binary. When unset, well-known install locations and `PATH`
    /// are searched for a `stockfish` executable.
    pub binary: Option<PathBuf>,
    /// Search depth for the analysis command.
    pub depth: Option<u8>,
}

/// A running engine process plus the channels to talk to it.
pub struct EngineWorker {
    process: Option<Child>,
    command_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<TaggedEvent>,
    /// Token the reader stamps onto recognized events. Written at
    /// request-issue time, which retires the previous request's stamp.
    stamp: Arc<AtomicU64>,
    depth: u8,
}

impl EngineWorker {
    /// Spawn the engine process and complete the `uci`/`uciok` handshake.
    #[tracing::instrument(level = "info", skip(config))]
    pub async fn spawn(config: EngineConfig) -> Result<Self, EngineError> {
        let binary = match config.binary {
            Some(path) => path,
            None => find_engine_binary().ok_or(EngineError::NotFound)?,
        };
        tracing::info!("spawning engine process: {}", binary.display());

        let mut process = tokio::process::Command::new(&binary)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(EngineError::Spawn)?;

        let mut stdin = process.stdin.take().ok_or(EngineError::NoStdin)?;
        let stdout = process.stdout.take().ok_or(EngineError::NoStdout)?;
        let mut reader = BufReader::new(stdout);

        stdin.write_all(b"uci\n").await?;
        stdin.flush().await?;

        // Drain identification lines until the engine confirms the protocol.
        let handshake = tokio::time::timeout(HANDSHAKE_TIMEOUT, async {
            let mut line = String::new();
            loop {
                line.clear();
                match reader.read_line(&mut line).await {
                    Ok(0) => return Err(EngineError::HandshakeClosed),
                    Ok(_) => {
                        tracing::trace!("UCI << {}", line.trim());
                        if line.trim() == "uciok" {
                            return Ok(());
                        }
                    }
                    Err(e) => return Err(EngineError::Io(e)),
                }
            }
        })
        .await;
        match handshake {
            Ok(result) => result?,
            Err(_) => return Err(EngineError::HandshakeTimeout),
        }
        tracing::debug!("engine handshake complete");

        let (command_tx, mut command_rx) = mpsc::channel::<EngineCommand>(32);
        let (event_tx, event_rx) = mpsc::channel::<TaggedEvent>(64);
        let stamp = Arc::new(AtomicU64::new(0));

        // Reader task: parse stdout lines, stamp recognized events with the
        // token of the request currently listening, forward them.
        let reader_stamp = Arc::clone(&stamp);
        tokio::spawn(async move {
            let mut line = String::new();
            loop {
                line.clear();
                match reader.read_line(&mut line).await {
                    Ok(0) => {
                        tracing::warn!("engine stdout closed");
                        break;
                    }
                    Ok(_) => {
                        let trimmed = line.trim();
                        tracing::trace!("UCI << {}", trimmed);
                        let event = parse_line(trimmed);
                        if event == EngineEvent::Unrecognized {
                            continue;
                        }
                        let tagged = TaggedEvent {
                            token: reader_stamp.load(Ordering::SeqCst),
                            event,
                        };
                        if event_tx.send(tagged).await.is_err() {
                            tracing::debug!("event receiver dropped, reader exiting");
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::error!("error reading engine stdout: {}", e);
                        break;
                    }
                }
            }
        });

        // Writer task: format commands to protocol lines on stdin.
        tokio::spawn(async move {
            while let Some(cmd) = command_rx.recv().await {
                let line = cmd.to_protocol_line();
                tracing::trace!("UCI >> {}", line);
                if let Err(e) = stdin.write_all(line.as_bytes()).await {
                    tracing::error!("error writing to engine stdin: {}", e);
                    break;
                }
                if let Err(e) = stdin.write_all(b"\n").await {
                    tracing::error!("error writing to engine stdin: {}", e);
                    break;
                }
                if let Err(e) = stdin.flush().await {
                    tracing::error!("error flushing engine stdin: {}", e);
                    break;
                }
                if cmd == EngineCommand::Quit {
                    break;
                }
            }
            tracing::debug!("engine writer task exiting");
        });

        Ok(Self {
            process: Some(process),
            command_tx,
            event_rx,
            stamp,
            depth: config.depth.unwrap_or(DEFAULT_SEARCH_DEPTH),
        })
    }

    /// Issue an analysis request for `fen` under `token`.
    ///
    /// Stores the token into the reader's stamp first, so every event read
    /// from this point on is attributed to the new request, then queues the
    /// position-set and depth-bounded go commands in order.
    pub async fn request_analysis(&self, token: u64, fen: &str) -> Result<(), EngineError> {
        self.stamp.store(token, Ordering::SeqCst);
        tracing::debug!(token, depth = self.depth, "issuing analysis request");
        self.command_tx
            .send(EngineCommand::SetPosition {
                fen: fen.to_string(),
            })
            .await
            .map_err(|_| EngineError::ChannelClosed)?;
        self.command_tx
            .send(EngineCommand::Go { depth: self.depth })
            .await
            .map_err(|_| EngineError::ChannelClosed)?;
        Ok(())
    }

    /// Non-blocking event poll.
    pub fn try_recv(&mut self) -> Option<TaggedEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Wait for the next event. `None` once the reader task has exited.
    pub async fn recv(&mut self) -> Option<TaggedEvent> {
        self.event_rx.recv().await
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    /// Release the worker: ask the engine to quit, wait briefly, then kill.
    pub async fn shutdown(mut self) {
        let _ = self.command_tx.send(EngineCommand::Quit).await;
        if let Some(mut process) = self.process.take() {
            let _ = tokio::time::timeout(SHUTDOWN_GRACE, process.wait()).await;
            let _ = process.kill().await;
        }
        tracing::info!("engine worker shut down");
    }
}

/// Far ends of a detached worker's channels: what the engine process would
/// otherwise hold. Lets tests drive a session without an engine binary.
#[cfg(any(test, feature = "mock"))]
pub struct DetachedIo {
    pub commands: mpsc::Receiver<EngineCommand>,
    pub events: mpsc::Sender<TaggedEvent>,
    pub stamp: Arc<AtomicU64>,
}

#[cfg(any(test, feature = "mock"))]
impl EngineWorker {
    /// Build a process-less worker plus the far ends of its channels.
    pub fn detached() -> (Self, DetachedIo) {
        let (command_tx, command_rx) = mpsc::channel(32);
        let (event_tx, event_rx) = mpsc::channel(64);
        let stamp = Arc::new(AtomicU64::new(0));
        let worker = Self {
            process: None,
            command_tx,
            event_rx,
            stamp: Arc::clone(&stamp),
            depth: DEFAULT_SEARCH_DEPTH,
        };
        let io = DetachedIo {
            commands: command_rx,
            events: event_tx,
            stamp,
        };
        (worker, io)
    }
}

/// Search well-known install locations and `PATH` for a stockfish binary.
fn find_engine_binary() -> Option<PathBuf> {
    const CANDIDATES: &[&str] = &[
        "/usr/local/bin/stockfish",
        "/usr/bin/stockfish",
        "/opt/homebrew/bin/stockfish",
        "/usr/games/stockfish",
    ];

    for candidate in CANDIDATES {
        let path = Path::new(candidate);
        if path.exists() {
            return Some(path.to_path_buf());
        }
    }

    std::env::var_os("PATH").and_then(|paths| {
        std::env::split_paths(&paths)
            .map(|dir| dir.join("stockfish"))
            .find(|path| path.exists())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_request_analysis_stamps_token_and_queues_commands() {
        let (worker, mut io) = EngineWorker::detached();
        let fen = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1";

        worker.request_analysis(7, fen).await.unwrap();

        assert_eq!(io.stamp.load(Ordering::SeqCst), 7);
        assert_eq!(
            io.commands.recv().await.unwrap(),
            EngineCommand::SetPosition {
                fen: fen.to_string()
            }
        );
        assert_eq!(
            io.commands.recv().await.unwrap(),
            EngineCommand::Go {
                depth: DEFAULT_SEARCH_DEPTH
            }
        );
    }

    #[tokio::test]
    async fn test_detached_worker_delivers_injected_events() {
        let (mut worker, io) = EngineWorker::detached();
        io.events
            .send(TaggedEvent {
                token: 1,
                event: EngineEvent::BestMove("e2e4".to_string()),
            })
            .await
            .unwrap();

        let tagged = worker.recv().await.unwrap();
        assert_eq!(tagged.token, 1);
        assert_eq!(tagged.event, EngineEvent::BestMove("e2e4".to_string()));
    }

    #[tokio::test]
    async fn test_request_analysis_fails_when_channel_closed() {
        let (worker, io) = EngineWorker::detached();
        drop(io.commands);

        let result = worker.request_analysis(1, "8/8/8/8/8/8/8/8 w - - 0 1").await;
        assert!(matches!(result, Err(EngineError::ChannelClosed)));
    }
}
