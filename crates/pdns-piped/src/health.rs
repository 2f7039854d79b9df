//! Structured health reporting for process lifecycle events.

use std::sync::Arc;

use pdns_pipe_config::Config;
use pdns_pipe_protocol::{SessionError, SessionSummary};

use crate::bootstrap::BootstrapError;

const HEALTH_TARGET: &str = "pdns-piped::health";

/// Observer trait used to surface lifecycle events to telemetry sinks.
pub trait HealthReporter: Send + Sync {
    /// Invoked before configuration loading begins.
    fn bootstrap_starting(&self);

    /// Invoked after bootstrap completes successfully.
    fn bootstrap_succeeded(&self, config: &Config);

    /// Invoked when bootstrap fails.
    fn bootstrap_failed(&self, error: &BootstrapError);

    /// Invoked when the resolver closes its end of the pipe.
    fn session_finished(&self, summary: &SessionSummary);

    /// Invoked when a session stops on an escalated fault or a broken sink.
    fn session_failed(&self, error: &SessionError);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter,
{
    fn bootstrap_starting(&self) {
        (**self).bootstrap_starting();
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        (**self).bootstrap_succeeded(config);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        (**self).bootstrap_failed(error);
    }

    fn session_finished(&self, summary: &SessionSummary) {
        (**self).session_finished(summary);
    }

    fn session_failed(&self, error: &SessionError) {
        (**self).session_failed(error);
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    /// Builds a new reporter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn bootstrap_starting(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_starting",
            "starting pipe backend bootstrap"
        );
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_succeeded",
            log_filter = %config.log_filter(),
            log_format = %config.log_format(),
            max_line_bytes = config.max_line_bytes(),
            fault_policy = %config.fault_policy(),
            "pipe backend bootstrap completed"
        );
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "bootstrap_failed",
            error = %error,
            "pipe backend bootstrap failed"
        );
    }

    fn session_finished(&self, summary: &SessionSummary) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "session_finished",
            turns = summary.turns,
            rejected = summary.rejected,
            faults = summary.faults,
            "resolver closed the pipe"
        );
    }

    fn session_failed(&self, error: &SessionError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "session_failed",
            line = %error.protocol_error().line(),
            error = %error,
            "session stopped"
        );
    }
}
