//! Behavioural coverage for layered configuration loading.

use std::cell::RefCell;
use std::ffi::OsString;
use std::fs;
use std::sync::{Mutex, MutexGuard};

use once_cell::sync::Lazy;
use ortho_config::OrthoConfig;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tempfile::TempDir;

use pdns_pipe_config::{
    Config, DEFAULT_MAX_LINE_BYTES, FaultPolicy, default_log_filter, default_log_format,
};

/// Serialises scenarios that mutate the process environment.
static ENV_MUTEX: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

struct Harness {
    temp_dir: TempDir,
    cli_args: RefCell<Vec<OsString>>,
    env_overrides: RefCell<Vec<(String, Option<OsString>)>>,
    loaded: RefCell<Option<Config>>,
    error: RefCell<Option<String>>,
    _env_guard: MutexGuard<'static, ()>,
}

impl Harness {
    fn new() -> Self {
        let env_guard = ENV_MUTEX
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let temp_dir = match TempDir::new() {
            Ok(dir) => dir,
            Err(error) => panic!("failed to create temporary directory: {error}"),
        };
        Self {
            temp_dir,
            cli_args: RefCell::new(vec![OsString::from("pdns-piped")]),
            env_overrides: RefCell::new(Vec::new()),
            loaded: RefCell::new(None),
            error: RefCell::new(None),
            _env_guard: env_guard,
        }
    }

    fn write_config(&self, contents: &str) {
        let path = self.temp_dir.path().join("pdns-piped.toml");
        if let Err(error) = fs::write(&path, contents) {
            panic!("failed to write configuration: {error}");
        }

        let mut args = self.cli_args.borrow_mut();
        args.push(OsString::from("--config-path"));
        args.push(path.into_os_string());
    }

    fn set_env(&self, key: &str, value: &str) {
        let previous = std::env::var_os(key);
        // Environment mutation is `unsafe` under edition 2024. The harness holds
        // `ENV_MUTEX` and restores every override in `Drop`.
        unsafe { std::env::set_var(key, value) };
        self.env_overrides
            .borrow_mut()
            .push((key.to_owned(), previous));
    }

    fn push_flag(&self, flag: &str, value: &str) {
        let mut args = self.cli_args.borrow_mut();
        args.push(OsString::from(flag));
        args.push(OsString::from(value));
    }

    fn load(&self) {
        if self.loaded.borrow().is_some() || self.error.borrow().is_some() {
            return;
        }

        let args = self.cli_args.borrow().clone();
        match Config::load_from_iter(args) {
            Ok(config) => *self.loaded.borrow_mut() = Some(config),
            Err(error) => *self.error.borrow_mut() = Some(error.to_string()),
        }
    }

    fn config(&self) -> Config {
        self.load();
        if let Some(error) = self.error.borrow().as_ref() {
            panic!("configuration failed to load: {error}");
        }
        match self.loaded.borrow().as_ref() {
            Some(config) => config.clone(),
            None => panic!("configuration was not loaded"),
        }
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        let mut overrides = self.env_overrides.borrow_mut();
        while let Some((key, value)) = overrides.pop() {
            match value {
                Some(os_value) => unsafe { std::env::set_var(&key, os_value) },
                None => unsafe { std::env::remove_var(&key) },
            }
        }
    }
}

#[fixture]
fn harness() -> Harness {
    Harness::new()
}

#[given("a configuration file setting the maximum line length to \"{bytes}\"")]
fn given_configuration_file(harness: &Harness, bytes: usize) {
    harness.write_config(&format!("max_line_bytes = {bytes}\n"));
}

#[given("the environment sets the maximum line length to \"{bytes}\"")]
fn given_environment_override(harness: &Harness, bytes: String) {
    harness.set_env("PDNS_PIPE_MAX_LINE_BYTES", &bytes);
}

#[when("the configuration loads without overrides")]
fn when_load_without_overrides(harness: &Harness) {
    harness.load();
}

#[when("the CLI sets the log filter to \"{filter}\"")]
fn when_cli_log_filter(harness: &Harness, filter: String) {
    harness.push_flag("--log-filter", &filter);
}

#[when("the CLI sets the fault policy to \"{policy}\"")]
fn when_cli_fault_policy(harness: &Harness, policy: String) {
    harness.push_flag("--fault-policy", &policy);
}

#[when("the CLI sets the maximum line length to \"{bytes}\"")]
fn when_cli_max_line_bytes(harness: &Harness, bytes: String) {
    harness.push_flag("--max-line-bytes", &bytes);
}

#[then("loading the configuration applies the built-in defaults")]
fn then_defaults_applied(harness: &Harness) {
    let config = harness.config();
    assert_eq!(config.log_filter(), default_log_filter());
    assert_eq!(config.log_format(), default_log_format());
    assert_eq!(config.max_line_bytes(), DEFAULT_MAX_LINE_BYTES);
    assert_eq!(config.fault_policy(), FaultPolicy::Escalate);
}

#[then("loading the configuration resolves the log filter to \"{filter}\"")]
fn then_log_filter(harness: &Harness, filter: String) {
    assert_eq!(harness.config().log_filter(), filter);
}

#[then("loading the configuration resolves the fault policy to \"{policy}\"")]
fn then_fault_policy(harness: &Harness, policy: String) {
    let expected = match policy.parse::<FaultPolicy>() {
        Ok(policy) => policy,
        Err(error) => panic!("invalid expected policy '{policy}': {error}"),
    };
    assert_eq!(harness.config().fault_policy(), expected);
}

#[then("loading the configuration resolves the maximum line length to \"{bytes}\"")]
fn then_max_line_bytes(harness: &Harness, bytes: usize) {
    assert_eq!(harness.config().max_line_bytes(), bytes);
}

#[then("loading the configuration fails")]
fn then_load_fails(harness: &Harness) {
    harness.load();
    assert!(
        harness.error.borrow().is_some(),
        "expected configuration loading to fail"
    );
}

#[scenario(path = "tests/features/configuration_precedence.feature")]
fn configuration_precedence(#[from(harness)] harness: Harness) {
    let _ = harness;
}
