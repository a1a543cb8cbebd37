// crates/idgen-cli/src/main.rs
// ============================================================================
// Module: idgen CLI Entry Point
// Description: Command dispatcher for username allocation workflows.
// Purpose: Provide a safe, localized CLI for single and batch allocation.
// Dependencies: clap, idgen-config, idgen-core, serde_json
// ============================================================================

//! ## Overview
//! The idgen CLI allocates login identifiers for one person or a roster,
//! previews the candidate search order, and validates configuration. All
//! user-facing strings are routed through the i18n catalog. A batch with
//! per-person failures exits with code 2; any other failure exits with 1.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use idgen_cli::i18n::Locale;
use idgen_cli::i18n::set_locale;
use idgen_cli::t;
use idgen_cli::wiring::RosterError;
use idgen_cli::wiring::WiringError;
use idgen_cli::wiring::build_allocator;
use idgen_cli::wiring::build_batch;
use idgen_cli::wiring::read_roster;
use idgen_config::IdgenConfig;
use idgen_config::config_toml_example;
use idgen_core::CandidateSequence;
use idgen_core::PersonName;
use idgen_core::UsernameAllocator;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Environment variable selecting the output language.
const LANG_ENV: &str = "IDGEN_LANG";
/// Exit code for a batch that completed with per-person failures.
const EXIT_PARTIAL_FAILURE: u8 = 2;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "idgen", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Preferred output language (overrides `IDGEN_LANG`).
    #[arg(long, value_enum, value_name = "LANG", global = true)]
    lang: Option<LangArg>,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Allocate an identifier for one person.
    Allocate(AllocateCommand),
    /// Allocate identifiers for a JSON roster.
    Batch(BatchCommand),
    /// Preview the candidate search order for a name.
    Candidates(CandidatesCommand),
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
    /// Validate a configuration file.
    Validate(ConfigValidateCommand),
    /// Print a canonical example configuration.
    Example,
}

/// Supported CLI language selections.
#[derive(ValueEnum, Copy, Clone, Debug)]
enum LangArg {
    /// English.
    En,
    /// Catalan.
    Ca,
}

/// Person name arguments shared by allocation and preview.
#[derive(Args, Debug)]
struct NameArgs {
    /// Given (first) name.
    #[arg(long, value_name = "NAME")]
    given_name: String,
    /// Family (last) name.
    #[arg(long, value_name = "NAME")]
    family_name: String,
}

impl NameArgs {
    /// Returns the arguments as a person name.
    fn person_name(&self) -> PersonName {
        PersonName::new(self.given_name.as_str(), self.family_name.as_str())
    }
}

/// Arguments for single allocation.
#[derive(Args, Debug)]
struct AllocateCommand {
    /// Person name.
    #[command(flatten)]
    name: NameArgs,
    /// Caller reference recorded in audit events.
    #[arg(long, value_name = "REF")]
    reference: Option<String>,
    /// Optional config file path (defaults to idgen.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Print the allocation as JSON instead of the bare identifier.
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,
}

/// Arguments for batch allocation.
#[derive(Args, Debug)]
struct BatchCommand {
    /// JSON roster: an array of `{reference?, given_name, family_name}`.
    #[arg(long, value_name = "PATH")]
    roster: PathBuf,
    /// Output path for the JSON report (defaults to stdout).
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,
    /// Optional config file path (defaults to idgen.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Arguments for candidate preview.
#[derive(Args, Debug)]
struct CandidatesCommand {
    /// Person name.
    #[command(flatten)]
    name: NameArgs,
    /// Maximum number of candidates to print (defaults to all).
    #[arg(long, value_name = "N")]
    limit: Option<usize>,
}

/// Arguments for config validation.
#[derive(Args, Debug)]
struct ConfigValidateCommand {
    /// Optional config file path (defaults to idgen.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Converts CLI language selections into locales.
impl From<LangArg> for Locale {
    fn from(value: LangArg) -> Self {
        match value {
            LangArg::En => Self::En,
            LangArg::Ca => Self::Ca,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for localized error messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a localized message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    let env_lang = std::env::var(LANG_ENV).ok();
    let locale = resolve_locale(cli.lang, env_lang.as_deref())?;
    set_locale(locale);
    if locale != Locale::En {
        write_stderr_line(&t!("i18n.disclaimer.machine_translated"))
            .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    }

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&t!("main.version", version = version))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    match command {
        Commands::Allocate(command) => command_allocate(&command),
        Commands::Batch(command) => command_batch(&command),
        Commands::Candidates(command) => command_candidates(&command),
        Commands::Config {
            command,
        } => command_config(command),
    }
}

/// Prints top-level help.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    command.print_help().map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line("").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(())
}

/// Resolves the CLI locale from flags or environment.
fn resolve_locale(lang: Option<LangArg>, env_lang: Option<&str>) -> CliResult<Locale> {
    if let Some(lang) = lang {
        return Ok(lang.into());
    }
    if let Some(value) = env_lang {
        return Locale::parse(value).ok_or_else(|| {
            CliError::new(t!("i18n.lang.invalid_env", env = LANG_ENV, value = value))
        });
    }
    Ok(Locale::En)
}

// ============================================================================
// SECTION: Allocation Commands
// ============================================================================

/// Executes the single-person `allocate` command.
fn command_allocate(command: &AllocateCommand) -> CliResult<ExitCode> {
    let config = load_config(command.config.as_deref())?;
    let allocator = allocator_from_config(&config)?;
    let scope = config
        .batch
        .reserved_scope()
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;
    let allocation = allocator
        .allocate_for(command.reference.as_deref(), &command.name.person_name(), &scope)
        .map_err(|err| CliError::new(t!("allocate.failed", error = err)))?;
    if command.json {
        write_json_line(&allocation)?;
    } else {
        write_stdout_line(allocation.user_id.as_str())
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Executes the roster `batch` command.
fn command_batch(command: &BatchCommand) -> CliResult<ExitCode> {
    let config = load_config(command.config.as_deref())?;
    let allocator = allocator_from_config(&config)?;
    let driver = build_batch(&config.batch)
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;
    let requests = read_roster(&command.roster, &config.batch).map_err(roster_error)?;

    let report = driver.run(&allocator, requests);
    let mut bytes = serde_json::to_vec_pretty(&report)
        .map_err(|err| CliError::new(t!("output.serialize_failed", error = err)))?;
    bytes.push(b'\n');
    if let Some(path) = &command.output {
        fs::write(path, &bytes).map_err(|err| {
            CliError::new(t!("batch.output.write_failed", path = path.display(), error = err))
        })?;
        write_stderr_line(&t!("batch.output.ok", path = path.display()))
            .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    } else {
        write_stdout_bytes(&bytes).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    }

    write_stderr_line(&t!(
        "batch.summary",
        allocated = report.allocated_count(),
        failed = report.failed_count(),
        not_attempted = report.not_attempted
    ))
    .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    if let Some(reason) = &report.aborted {
        write_stderr_line(&t!("batch.aborted", reason = reason))
            .map_err(|err| CliError::new(output_error("stderr", &err)))?;
        return Ok(ExitCode::FAILURE);
    }
    if report.failed_count() > 0 {
        return Ok(ExitCode::from(EXIT_PARTIAL_FAILURE));
    }
    Ok(ExitCode::SUCCESS)
}

/// Executes the `candidates` preview command.
fn command_candidates(command: &CandidatesCommand) -> CliResult<ExitCode> {
    let normalized = command
        .name
        .person_name()
        .normalize()
        .map_err(|err| CliError::new(t!("candidates.invalid_name", error = err)))?;
    let limit = command.limit.unwrap_or(usize::MAX);
    let mut output = String::new();
    for (index, candidate) in CandidateSequence::new(normalized).take(limit).enumerate() {
        output.push_str(&t!(
            "candidates.entry",
            index = index + 1,
            user_id = candidate.user_id.as_str(),
            tier = candidate.tier.number()
        ));
        output.push('\n');
    }
    write_stdout_bytes(output.as_bytes())
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Dispatches config subcommands.
fn command_config(command: ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Validate(command) => command_config_validate(&command),
        ConfigCommand::Example => {
            write_stdout_bytes(config_toml_example().as_bytes())
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Executes the config validation command.
fn command_config_validate(command: &ConfigValidateCommand) -> CliResult<ExitCode> {
    let config = load_config(command.config.as_deref())?;
    let names: Vec<&str> = config.oracles.iter().map(|oracle| oracle.name.as_str()).collect();
    write_stdout_line(&t!("config.validate.ok", count = names.len(), oracles = names.join(", ")))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Wiring Helpers
// ============================================================================

/// Loads and validates configuration.
fn load_config(path: Option<&Path>) -> CliResult<IdgenConfig> {
    IdgenConfig::load(path).map_err(|err| CliError::new(t!("config.load_failed", error = err)))
}

/// Builds the allocator, mapping wiring errors to localized messages.
fn allocator_from_config(config: &IdgenConfig) -> CliResult<UsernameAllocator> {
    build_allocator(config).map_err(|err| {
        let message = match &err {
            WiringError::Config(error) => t!("config.load_failed", error = error),
            WiringError::Oracle(error) => t!("wiring.oracle_failed", error = error),
            WiringError::Audit {
                path,
                error,
            } => t!("wiring.audit_failed", path = path.display(), error = error),
        };
        CliError::new(message)
    })
}

/// Maps roster read failures to localized messages.
fn roster_error(err: RosterError) -> CliError {
    let kind = t!("input.kind.roster");
    let message = match err {
        RosterError::Io {
            path,
            error,
        } => t!("input.read_failed", kind = kind, path = path.display(), error = error),
        RosterError::TooLarge {
            path,
            size,
            limit,
        } => t!("input.read_too_large", kind = kind, path = path.display(), size = size, limit = limit),
        RosterError::Parse {
            path,
            error,
        } => t!("batch.roster.parse_failed", path = path.display(), error = error),
        RosterError::TooManyEntries {
            path,
            count,
            limit,
        } => t!("batch.roster.too_many", path = path.display(), count = count, limit = limit),
    };
    CliError::new(message)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes raw bytes to stdout without adding a newline.
fn write_stdout_bytes(bytes: &[u8]) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(bytes)
}

/// Writes a value as a single JSON line to stdout.
fn write_json_line<T: Serialize>(value: &T) -> CliResult<()> {
    let mut bytes = serde_json::to_vec(value)
        .map_err(|err| CliError::new(t!("output.serialize_failed", error = err)))?;
    bytes.push(b'\n');
    write_stdout_bytes(&bytes).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats a localized output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    let stream_label = match stream {
        "stdout" => t!("output.stream.stdout"),
        "stderr" => t!("output.stream.stderr"),
        _ => t!("output.stream.unknown"),
    };
    t!("output.write_failed", stream = stream_label, error = error)
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
