//! Probe module
//!
//! This module contains the probe bookkeeping: the run report and the
//! session lifecycle state machine.

pub mod report;
pub mod state;
