//! Shared configuration for the pipe backend process.
//!
//! Values are layered by `ortho_config`: built-in defaults first, then a
//! configuration file, then `PDNS_PIPE_*` environment variables, and finally
//! command-line flags. The protocol engine itself reads only
//! [`Config::max_line_bytes`] and [`Config::fault_policy`]; the remaining
//! fields steer process telemetry.

mod defaults;
mod fault;
mod logging;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_LOG_FILTER, DEFAULT_MAX_LINE_BYTES, default_fault_policy, default_log_filter,
    default_log_filter_string, default_log_format, default_max_line_bytes,
};
pub use fault::{FaultPolicy, FaultPolicyParseError};
pub use logging::{LogFormat, LogFormatParseError};

/// Resolved configuration for `pdns-piped`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "PDNS_PIPE")]
pub struct Config {
    /// `tracing` filter expression applied to stderr telemetry.
    #[serde(default = "default_log_filter_string")]
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Telemetry output format.
    #[serde(default = "default_log_format")]
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
    /// Longest inbound line accepted before the turn is failed.
    #[serde(default = "default_max_line_bytes")]
    #[ortho_config(default = default_max_line_bytes())]
    pub max_line_bytes: usize,
    /// What the session does after a hook fault.
    #[serde(default = "default_fault_policy")]
    #[ortho_config(default = default_fault_policy())]
    pub fault_policy: FaultPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            max_line_bytes: default_max_line_bytes(),
            fault_policy: default_fault_policy(),
        }
    }
}

impl Config {
    /// Telemetry filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Telemetry output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Inbound line limit in bytes.
    #[must_use]
    pub const fn max_line_bytes(&self) -> usize {
        self.max_line_bytes
    }

    /// Fault escalation policy.
    #[must_use]
    pub const fn fault_policy(&self) -> FaultPolicy {
        self.fault_policy
    }
}
