//! Probe State Management
//!
//! Tracks where a probe run is in its lifecycle. The machine is linear:
//! `Disconnected → Connecting → Connected → Streaming → Stopping → Closed`,
//! with a shortcut to `Closed` from any state when the connection fails.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::Arc;

/// Lifecycle states of a probe run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeState {
    /// No connection yet
    Disconnected,
    /// Connection attempt in flight
    Connecting,
    /// Connected, start command not yet sent
    Connected,
    /// Start sent, receive loop running
    Streaming,
    /// Listen window elapsed, stop command being sent
    Stopping,
    /// Session over, either normally or after a connection error
    Closed,
}

impl std::fmt::Display for ProbeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProbeState::Disconnected => write!(f, "Disconnected"),
            ProbeState::Connecting => write!(f, "Connecting"),
            ProbeState::Connected => write!(f, "Connected"),
            ProbeState::Streaming => write!(f, "Streaming"),
            ProbeState::Stopping => write!(f, "Stopping"),
            ProbeState::Closed => write!(f, "Closed"),
        }
    }
}

/// State transition information
#[derive(Debug, Clone)]
pub struct StateTransition {
    pub from: ProbeState,
    pub to: ProbeState,
    pub timestamp: DateTime<Utc>,
    pub reason: Option<String>,
}

struct ProbeStateInner {
    current: ProbeState,
    transitions: Vec<StateTransition>,
}

/// Thread-safe probe state manager
#[derive(Clone)]
pub struct ProbeStateManager {
    inner: Arc<RwLock<ProbeStateInner>>,
}

impl ProbeStateManager {
    /// Create a new state manager starting in Disconnected state
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(ProbeStateInner {
                current: ProbeState::Disconnected,
                transitions: Vec::new(),
            })),
        }
    }

    /// Get the current state
    pub fn current_state(&self) -> ProbeState {
        self.inner.read().current
    }

    /// Transition to a new state
    pub fn transition_to(&self, new_state: ProbeState, reason: Option<String>) -> bool {
        let mut inner = self.inner.write();

        if !Self::is_valid_transition(inner.current, new_state) {
            return false;
        }

        let old_state = inner.current;
        inner.current = new_state;
        inner.transitions.push(StateTransition {
            from: old_state,
            to: new_state,
            timestamp: Utc::now(),
            reason,
        });

        tracing::debug!(from = %old_state, to = %new_state, "Probe state transition");

        true
    }

    /// Check if a state transition is valid
    fn is_valid_transition(from: ProbeState, to: ProbeState) -> bool {
        // Self-transition is always allowed
        if from == to {
            return true;
        }

        // A fatal connection error closes the session from anywhere
        if to == ProbeState::Closed {
            return true;
        }

        matches!(
            (from, to),
            (ProbeState::Disconnected, ProbeState::Connecting)
                | (ProbeState::Connecting, ProbeState::Connected)
                | (ProbeState::Connected, ProbeState::Streaming)
                | (ProbeState::Streaming, ProbeState::Stopping)
        )
    }

    /// Set state to connecting
    pub fn set_connecting(&self) {
        self.transition_to(ProbeState::Connecting, Some("Initiating connection".to_string()));
    }

    /// Set state to connected
    pub fn set_connected(&self) {
        self.transition_to(ProbeState::Connected, Some("Connection established".to_string()));
    }

    /// Set state to streaming
    pub fn set_streaming(&self) {
        self.transition_to(ProbeState::Streaming, Some("Start command sent".to_string()));
    }

    /// Set state to stopping
    pub fn set_stopping(&self) {
        self.transition_to(ProbeState::Stopping, Some("Listen window elapsed".to_string()));
    }

    /// Set state to closed
    pub fn set_closed(&self, reason: Option<String>) {
        self.transition_to(ProbeState::Closed, reason);
    }

    /// Get recent state transitions
    pub fn recent_transitions(&self, count: usize) -> Vec<StateTransition> {
        let inner = self.inner.read();
        inner.transitions.iter().rev().take(count).cloned().collect()
    }

    /// Check if the session is over
    pub fn is_closed(&self) -> bool {
        self.current_state() == ProbeState::Closed
    }
}

impl Default for ProbeStateManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let manager = ProbeStateManager::new();
        assert_eq!(manager.current_state(), ProbeState::Disconnected);
    }

    #[test]
    fn test_linear_walk() {
        let manager = ProbeStateManager::new();

        assert!(manager.transition_to(ProbeState::Connecting, None));
        assert!(manager.transition_to(ProbeState::Connected, None));
        assert!(manager.transition_to(ProbeState::Streaming, None));
        assert!(manager.transition_to(ProbeState::Stopping, None));
        assert!(manager.transition_to(ProbeState::Closed, None));
        assert!(manager.is_closed());
    }

    #[test]
    fn test_no_skipping_forward() {
        let manager = ProbeStateManager::new();
        manager.set_connecting();
        manager.set_connected();

        // Streaming cannot be skipped on the way to Stopping
        assert!(!manager.transition_to(ProbeState::Stopping, None));
        assert_eq!(manager.current_state(), ProbeState::Connected);
    }

    #[test]
    fn test_any_state_can_close() {
        let manager = ProbeStateManager::new();
        manager.set_connecting();
        assert!(manager.transition_to(ProbeState::Closed, Some("connect refused".to_string())));
        assert!(manager.is_closed());
    }

    #[test]
    fn test_transitions_are_recorded() {
        let manager = ProbeStateManager::new();
        manager.set_connecting();
        manager.set_closed(Some("connect refused".to_string()));

        let recent = manager.recent_transitions(10);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].to, ProbeState::Closed);
        assert_eq!(recent[0].reason.as_deref(), Some("connect refused"));
    }
}
