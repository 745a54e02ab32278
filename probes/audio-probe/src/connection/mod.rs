//! Connection module
//!
//! This module handles all communication with the audio backend,
//! including the WebSocket session and message protocol handling.

pub mod protocol;
pub mod websocket;
