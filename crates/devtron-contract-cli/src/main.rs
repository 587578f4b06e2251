// crates/devtron-contract-cli/src/main.rs
// ============================================================================
// Module: Devtron Contract CLI Entry Point
// Description: Command dispatcher for contract runs and catalog inspection.
// Purpose: Load configuration once, run the selected scenarios, and report.
// Dependencies: clap, devtron-contract-core, devtron-contract-suites, dotenvy,
//               tokio, tracing-subscriber
// ============================================================================

//! ## Overview
//! `devtron-contract run` executes the scenario catalog against a Devtron
//! deployment and exits `0` only when every selected scenario passed.
//! `list` prints the catalog and `config check` prints the resolved
//! configuration with secrets reduced to set/unset.
//!
//! This binary is the only place that reads the process environment: a
//! `.env` file is loaded first, then the harness variables are captured into
//! an [`EnvSnapshot`] and resolved into a [`HarnessConfig`].

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::io::Write;
use std::num::NonZeroUsize;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use devtron_contract_core::FixtureMode;
use devtron_contract_core::HarnessConfig;
use devtron_contract_core::RunArtifacts;
use devtron_contract_core::RunReport;
use devtron_contract_core::Runner;
use devtron_contract_core::Scenario;
use devtron_contract_core::ScenarioFilter;
use devtron_contract_core::ScenarioKind;
use devtron_contract_core::ScenarioStatus;
use devtron_contract_core::WebDriverFactory;
use devtron_contract_core::config::EnvSnapshot;
use devtron_contract_suites::SUITE_IDS;
use devtron_contract_suites::all_suites;
use devtron_contract_suites::is_known_suite;
use tracing::info;
use tracing_subscriber::EnvFilter;

// ============================================================================
// SECTION: CLI Definitions
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "devtron-contract", version, disable_help_subcommand = true)]
struct Cli {
    /// Environment file loaded before configuration (default: `.env` if present).
    #[arg(long, value_name = "PATH", global = true)]
    env_file: Option<PathBuf>,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the selected scenarios against the target.
    Run(RunCommand),
    /// List the scenarios a run would select.
    List(ListCommand),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Resolve configuration and print it without secrets.
    Check(ConfigSource),
}

/// Configuration file selection shared by every command.
#[derive(Args, Debug, Clone, Default)]
struct ConfigSource {
    /// Optional TOML configuration file.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Scenario selection flags.
#[derive(Args, Debug, Clone, Default)]
struct SelectionArgs {
    /// Restrict to a suite id; repeatable.
    #[arg(long = "suite", value_name = "SUITE", value_parser = parse_suite_id)]
    suites: Vec<String>,
    /// Keep scenarios whose `suite.scenario` id contains this text.
    #[arg(long, value_name = "TEXT")]
    filter: Option<String>,
    /// Skip UI scenarios (no WebDriver endpoint needed).
    #[arg(long)]
    api_only: bool,
}

impl SelectionArgs {
    /// Converts the flags into a scenario filter.
    fn to_filter(&self) -> ScenarioFilter {
        ScenarioFilter {
            suites: self.suites.clone(),
            pattern: self.filter.clone(),
            api_only: self.api_only,
        }
    }
}

/// Arguments for `run`.
#[derive(Args, Debug, Clone, Default)]
struct RunCommand {
    /// Configuration source.
    #[command(flatten)]
    source: ConfigSource,
    /// Scenario selection.
    #[command(flatten)]
    selection: SelectionArgs,
    /// Fixture mode override.
    #[arg(long, value_enum, value_name = "MODE")]
    fixture_mode: Option<FixtureModeArg>,
    /// Maximum scenarios in flight.
    #[arg(long, value_name = "N")]
    jobs: Option<NonZeroUsize>,
    /// Directory receiving run artifacts.
    #[arg(long, value_name = "PATH")]
    run_root: Option<PathBuf>,
    /// Skip writing run artifacts.
    #[arg(long)]
    no_artifacts: bool,
}

/// Arguments for `list`.
#[derive(Args, Debug, Clone, Default)]
struct ListCommand {
    /// Configuration source.
    #[command(flatten)]
    source: ConfigSource,
    /// Scenario selection.
    #[command(flatten)]
    selection: SelectionArgs,
    /// Fixture mode used to build setup chains.
    #[arg(long, value_enum, value_name = "MODE")]
    fixture_mode: Option<FixtureModeArg>,
}

/// CLI spelling of [`FixtureMode`].
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum FixtureModeArg {
    /// Use pre-existing ids from configuration.
    Seeded,
    /// Create the resources each scenario acts on.
    Chained,
}

impl From<FixtureModeArg> for FixtureMode {
    fn from(value: FixtureModeArg) -> Self {
        match value {
            FixtureModeArg::Seeded => Self::Seeded,
            FixtureModeArg::Chained => Self::Chained,
        }
    }
}

/// Validates a `--suite` value against the catalog.
fn parse_suite_id(raw: &str) -> Result<String, String> {
    if is_known_suite(raw) {
        Ok(raw.to_string())
    } else {
        Err(format!("unknown suite {raw:?}; expected one of: {}", SUITE_IDS.join(", ")))
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper carrying a rendered message.
#[derive(Debug)]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Loads the environment, initializes logging, and dispatches the command.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    load_env_file(cli.env_file.as_deref())?;
    init_tracing();
    match cli.command {
        Commands::Run(command) => command_run(command).await,
        Commands::List(command) => command_list(&command),
        Commands::Config {
            command,
        } => match command {
            ConfigCommand::Check(source) => command_config_check(&source),
        },
    }
}

/// Loads `path`, or `.env` when present.
fn load_env_file(path: Option<&Path>) -> CliResult<()> {
    match path {
        Some(path) => dotenvy::from_path(path)
            .map_err(|err| CliError::new(format!("env file {} failed to load: {err}", path.display()))),
        None => match dotenvy::dotenv() {
            Ok(_) => Ok(()),
            Err(err) if err.not_found() => Ok(()),
            Err(err) => Err(CliError::new(format!(".env failed to load: {err}"))),
        },
    }
}

/// Installs the stderr `fmt` subscriber filtered by `RUST_LOG` (default `info`).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
}

/// Resolves configuration from the process environment and an optional file.
fn load_config(source: &ConfigSource) -> CliResult<HarnessConfig> {
    let env = EnvSnapshot::from_process().map_err(|err| CliError::new(err.to_string()))?;
    HarnessConfig::load(source.config.as_deref(), &env).map_err(|err| CliError::new(err.to_string()))
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Executes `run`.
async fn command_run(command: RunCommand) -> CliResult<ExitCode> {
    let mut config = load_config(&command.source)?;
    apply_run_overrides(&mut config, &command);
    let scenarios = command.selection.to_filter().select(all_suites(&config));
    info!(
        selected = scenarios.len(),
        api_only = command.selection.api_only,
        artifacts = !command.no_artifacts,
        "selection resolved"
    );

    let mut runner = Runner::new(config.clone()).map_err(|err| CliError::new(err.to_string()))?;
    if scenarios.iter().any(|scenario| scenario.kind() == ScenarioKind::Ui) {
        let factory =
            WebDriverFactory::new(&config.ui).map_err(|err| CliError::new(err.to_string()))?;
        runner = runner.with_driver_factory(Arc::new(factory));
    }
    let report = runner.run(scenarios).await.map_err(|err| CliError::new(err.to_string()))?;

    let run_root = (!command.no_artifacts).then_some(config.run.run_root.as_path());
    publish_report(&report, run_root, write_stdout_line)?;
    Ok(if report.is_success() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// Prints the tally, then writes artifacts under `run_root` when one is given.
fn publish_report(
    report: &RunReport,
    run_root: Option<&Path>,
    mut emit: impl FnMut(&str) -> std::io::Result<()>,
) -> CliResult<()> {
    for line in render_report(report) {
        emit(&line).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    }
    let Some(run_root) = run_root else {
        return Ok(());
    };
    let artifacts = RunArtifacts::create(run_root, report.started_at_ms)
        .map_err(|err| CliError::new(err.to_string()))?;
    artifacts.write_report(report).map_err(|err| CliError::new(err.to_string()))?;
    emit(&format!("artifacts: {}", artifacts.root().display()))
        .map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Applies `run` flag overrides on top of the resolved configuration.
fn apply_run_overrides(config: &mut HarnessConfig, command: &RunCommand) {
    if let Some(mode) = command.fixture_mode {
        config.fixtures.mode = mode.into();
    }
    if let Some(jobs) = command.jobs {
        config.run.jobs = jobs;
    }
    if let Some(run_root) = &command.run_root {
        config.run.run_root.clone_from(run_root);
    }
}

/// Executes `list`.
fn command_list(command: &ListCommand) -> CliResult<ExitCode> {
    let mut config = load_config(&command.source)?;
    if let Some(mode) = command.fixture_mode {
        config.fixtures.mode = mode.into();
    }
    let scenarios = command.selection.to_filter().select(all_suites(&config));
    for line in render_catalog(&scenarios) {
        write_stdout_line(&line).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Executes `config check`.
fn command_config_check(source: &ConfigSource) -> CliResult<ExitCode> {
    let config = load_config(source)?;
    for line in render_config(&config) {
        write_stdout_line(&line).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    }
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Rendering
// ============================================================================

/// Renders the per-scenario tally followed by the totals line.
fn render_report(report: &RunReport) -> Vec<String> {
    let width = report.outcomes.iter().map(|outcome| outcome.qualified_id().len()).max().unwrap_or(0);
    let mut lines = vec![
        format!("fixture mode: {}", report.fixture_mode),
        format!("target: {}", report.base_url),
    ];
    for outcome in &report.outcomes {
        let label = match outcome.status {
            ScenarioStatus::Pass => "PASS",
            ScenarioStatus::Fail => "FAIL",
        };
        let mut line =
            format!("{label}  {:<width$}  {:>6} ms", outcome.qualified_id(), outcome.duration_ms);
        if let Some(failure) = &outcome.failure {
            line.push_str(&format!("  {}: {}", failure.kind.as_str(), failure.message));
        }
        lines.push(line);
    }
    lines.push(format!(
        "{} scenarios: {} passed, {} failed in {} ms",
        report.outcomes.len(),
        report.passed(),
        report.failed(),
        report.duration_ms()
    ));
    lines
}

/// Renders one line per selected scenario.
fn render_catalog(scenarios: &[Scenario]) -> Vec<String> {
    let width = scenarios.iter().map(|scenario| scenario.qualified_id().len()).max().unwrap_or(0);
    scenarios
        .iter()
        .map(|scenario| {
            let kind = match scenario.kind() {
                ScenarioKind::Api => "api",
                ScenarioKind::Ui => "ui",
            };
            let setup = if scenario.setup.is_empty() {
                String::new()
            } else {
                format!(" (+{} setup)", scenario.setup.len())
            };
            format!("{:<width$}  {kind:<3}  {}{setup}", scenario.qualified_id(), scenario.title)
        })
        .collect()
}

/// Renders the resolved configuration; credentials show only whether they are set.
fn render_config(config: &HarnessConfig) -> Vec<String> {
    let presence = |value: Option<&str>| if value.is_some() { "set" } else { "unset" };
    let timeout = config
        .target
        .request_timeout
        .map_or_else(|| "client default".to_string(), |timeout| format!("{}s", timeout.as_secs()));
    vec![
        format!("target.base_url = {}", config.target.base_url),
        format!("target.request_timeout = {timeout}"),
        format!("ui.webdriver_url = {}", config.ui.webdriver_url),
        format!("ui.browser = {}", config.ui.browser.capability_name()),
        format!("ui.headless = {}", config.ui.headless),
        format!("ui.wait_timeout = {} ms", config.ui.wait_timeout.as_millis()),
        format!("fixtures.mode = {}", config.fixtures.mode),
        format!("run.jobs = {}", config.run.jobs),
        format!("run.run_root = {}", config.run.run_root.display()),
        format!("API_TOKEN = {}", presence(config.credentials.api_token())),
    ]
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output stream failure.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Emits an error message and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
