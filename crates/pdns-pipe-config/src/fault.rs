//! Escalation policy for hook faults.
//!
//! A fault is a failure raised by backend logic while a turn is in progress.
//! The engine always reports it to the resolver as a `FAIL` frame first; the
//! policy only decides what the session loop does afterwards.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Session behaviour after a fault has been reported on the wire.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum FaultPolicy {
    /// Stop serving and surface the fault to the process.
    #[default]
    Escalate,
    /// Log the fault and keep reading lines.
    Continue,
}

impl FaultPolicy {
    /// Returns `true` when a fault should end the session.
    #[must_use]
    pub const fn escalates(self) -> bool {
        matches!(self, Self::Escalate)
    }
}

/// Error returned when a [`FaultPolicy`] cannot be parsed from text.
pub type FaultPolicyParseError = strum::ParseError;
