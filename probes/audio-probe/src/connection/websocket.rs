//! WebSocket Probe Client
//!
//! Drives one probe session against the audio endpoint: connect, send the
//! start command, tally inbound messages for a fixed listen window, send the
//! stop command, and hand back a [`ProbeReport`].

use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use thiserror::Error;
use tokio::time::{timeout, Instant};
use tokio_tungstenite::tungstenite::Error as WsError;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

use crate::connection::protocol::{ControlMessage, InboundMessage, ServerMessage};
use crate::probe::report::ProbeReport;
use crate::probe::state::ProbeStateManager;

/// Connection settings for one probe run.
///
/// The defaults match the backend's local development setup: the endpoint it
/// serves on, a 5 second listen window, and a 100 ms per-receive timeout so
/// the loop re-checks the window deadline even when nothing arrives.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// WebSocket endpoint to probe
    pub url: String,
    /// How long to collect inbound messages after sending start
    pub listen_window: Duration,
    /// Upper bound on a single receive attempt
    pub recv_timeout: Duration,
    /// Upper bound on the connection handshake
    pub connect_timeout: Duration,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            url: "ws://localhost:4000/ws".to_string(),
            listen_window: Duration::from_secs(5),
            recv_timeout: Duration::from_millis(100),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// Errors that end a probe run.
///
/// Only connection-level failures escape [`AudioProbe::run`]; per-message
/// failures (malformed frames, single receive timeouts) are logged inside
/// the receive loop and the loop continues.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("failed to connect to {url}")]
    Connect {
        url: String,
        #[source]
        source: WsError,
    },

    #[error("timed out connecting to {url}")]
    ConnectTimeout { url: String },

    #[error("failed to send audio-control {action} command")]
    Send {
        action: &'static str,
        #[source]
        source: WsError,
    },

    #[error("failed to encode control message")]
    Encode(#[from] serde_json::Error),
}

/// One-shot probe of the audio streaming endpoint
pub struct AudioProbe {
    config: ProbeConfig,
    state: ProbeStateManager,
}

impl AudioProbe {
    pub fn new(config: ProbeConfig) -> Self {
        Self {
            config,
            state: ProbeStateManager::new(),
        }
    }

    /// Lifecycle state of this probe, observable while `run` is in flight.
    pub fn state(&self) -> &ProbeStateManager {
        &self.state
    }

    /// Run the whole session: start command, receive loop, stop command.
    ///
    /// Always leaves the state machine in `Closed`, whether the session
    /// finished normally or died on a connection error.
    pub async fn run(&self) -> Result<ProbeReport, ProbeError> {
        let result = self.session().await;
        match &result {
            Ok(_) => self.state.set_closed(None),
            Err(e) => self.state.set_closed(Some(e.to_string())),
        }
        result
    }

    async fn session(&self) -> Result<ProbeReport, ProbeError> {
        self.state.set_connecting();
        info!(url = %self.config.url, "Connecting to audio endpoint");

        let ws_stream = match timeout(
            self.config.connect_timeout,
            connect_async(self.config.url.as_str()),
        )
        .await
        {
            Ok(Ok((stream, _response))) => stream,
            Ok(Err(e)) => {
                return Err(ProbeError::Connect {
                    url: self.config.url.clone(),
                    source: e,
                })
            }
            Err(_) => {
                return Err(ProbeError::ConnectTimeout {
                    url: self.config.url.clone(),
                })
            }
        };

        info!("WebSocket connection established");
        self.state.set_connected();

        let (mut write, mut read) = ws_stream.split();

        let start_json = ControlMessage::start().to_json()?;
        write
            .send(Message::Text(start_json))
            .await
            .map_err(|e| ProbeError::Send {
                action: "start",
                source: e,
            })?;
        info!("Sent audio-control start command");
        self.state.set_streaming();

        let mut report = ProbeReport::new();
        let deadline = Instant::now() + self.config.listen_window;

        while Instant::now() < deadline {
            match timeout(self.config.recv_timeout, read.next()).await {
                // No frame within the receive timeout; go re-check the deadline
                Err(_) => continue,
                Ok(Some(Ok(Message::Text(text)))) => self.handle_text(&text, &mut report),
                Ok(Some(Ok(Message::Ping(payload)))) => {
                    debug!("Received ping, sending pong");
                    if let Err(e) = write.send(Message::Pong(payload)).await {
                        warn!(error = %e, "Failed to answer ping");
                    }
                }
                Ok(Some(Ok(Message::Pong(_)))) => {
                    debug!("Received pong frame");
                }
                Ok(Some(Ok(Message::Binary(payload)))) => {
                    debug!(len = payload.len(), "Received binary message (ignored)");
                }
                Ok(Some(Ok(Message::Close(frame)))) => {
                    info!(?frame, "Received close frame");
                    break;
                }
                Ok(Some(Ok(Message::Frame(_)))) => {
                    // Raw frame, typically not used
                }
                Ok(Some(Err(e))) => {
                    warn!(error = %e, "WebSocket error while receiving");
                }
                Ok(None) => {
                    warn!("WebSocket stream ended before the listen window elapsed");
                    break;
                }
            }
        }

        self.state.set_stopping();
        let stop_json = ControlMessage::stop().to_json()?;
        write
            .send(Message::Text(stop_json))
            .await
            .map_err(|e| ProbeError::Send {
                action: "stop",
                source: e,
            })?;
        info!(total_chunks = report.chunks(), "Sent audio-control stop command");

        // Best effort; the session is over either way
        let _ = write.send(Message::Close(None)).await;

        Ok(report)
    }

    /// Tally one inbound text frame. Never fails: parse problems are logged
    /// and recorded, and the caller keeps looping.
    fn handle_text(&self, text: &str, report: &mut ProbeReport) {
        match InboundMessage::from_json(text) {
            Ok(InboundMessage::Known(ServerMessage::AudioStream { data })) => {
                let index = report.record_chunk(data.len());
                info!("Received audio chunk #{}, size: {}", index, data.len());
            }
            Ok(InboundMessage::Known(ServerMessage::AudioStatus { streaming, error })) => {
                report.record_other("audio-status");
                match error {
                    Some(err) => warn!(streaming, error = %err, "Audio status reported an error"),
                    None => info!(streaming, "Received audio status"),
                }
            }
            Ok(InboundMessage::Known(ServerMessage::Pong)) => {
                report.record_other("pong");
                debug!("Received pong message");
            }
            Ok(InboundMessage::Unknown(kind)) => {
                report.record_other(&kind);
                info!("Received: {}", kind);
            }
            Err(e) => {
                report.record_invalid();
                warn!(error = %e, "Failed to parse inbound message");
            }
        }
    }
}
