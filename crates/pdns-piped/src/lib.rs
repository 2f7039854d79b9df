//! Process shell for the PowerDNS pipe backend.
//!
//! The resolver spawns `pdns-piped` and talks to it over standard input and
//! output. This crate owns everything around the protocol engine: loading
//! configuration through [`pdns_pipe_config`], installing structured telemetry
//! on standard error, and reporting lifecycle events through a
//! [`HealthReporter`]. The request loop itself lives in
//! [`pdns_pipe_protocol`]; [`Server::serve`] runs it over a pair of streams.

mod bootstrap;
mod health;
mod telemetry;

pub use bootstrap::{
    BootstrapError, ConfigLoader, Server, StaticConfigLoader, SystemConfigLoader, bootstrap_with,
};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use telemetry::TelemetryError;

#[cfg(test)]
mod tests;
