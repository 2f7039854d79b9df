use crate::fault::FaultPolicy;
use crate::logging::LogFormat;

/// Default telemetry filter expression.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default upper bound for one inbound protocol line, terminator excluded.
///
/// Pipe backend requests are a handful of short fields; anything near this
/// size is a framing error on the resolver side.
pub const DEFAULT_MAX_LINE_BYTES: usize = 64 * 1024;

/// Default telemetry filter expression.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned form of [`default_log_filter`] for serde defaults.
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default telemetry format.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Json
}

/// Default inbound line limit.
#[must_use]
pub const fn default_max_line_bytes() -> usize {
    DEFAULT_MAX_LINE_BYTES
}

/// Default fault escalation policy.
#[must_use]
pub const fn default_fault_policy() -> FaultPolicy {
    FaultPolicy::Escalate
}
