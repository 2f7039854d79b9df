//! Binary entrypoint for the pipe backend.

use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use pdns_pipe_protocol::DefaultBackend;
use pdns_piped::{StructuredHealthReporter, SystemConfigLoader, bootstrap_with};

fn main() -> ExitCode {
    let reporter = Arc::new(StructuredHealthReporter::new());
    let server = match bootstrap_with(&SystemConfigLoader, reporter) {
        Ok(server) => server,
        Err(error) => {
            writeln!(io::stderr().lock(), "{error}").ok();
            return ExitCode::FAILURE;
        }
    };

    let stdin = io::stdin();
    let stdout = io::stdout();
    match server.serve(DefaultBackend, stdin.lock(), stdout.lock()) {
        Ok(_) => ExitCode::SUCCESS,
        Err(error) => {
            writeln!(io::stderr().lock(), "{error}").ok();
            ExitCode::FAILURE
        }
    }
}
