//! WebSocket Audio Probe Library
//!
//! This crate provides a one-shot client for exercising the backend's audio
//! streaming endpoint: connect, ask the server to start streaming, tally the
//! audio chunks that arrive within a fixed listen window, then ask it to stop.

pub mod connection;
pub mod probe;

// Re-exports for convenience
pub use connection::protocol::{AudioAction, ControlMessage, InboundMessage, ServerMessage};
pub use connection::websocket::{AudioProbe, ProbeConfig, ProbeError};
pub use probe::report::ProbeReport;
pub use probe::state::{ProbeState, ProbeStateManager};
