// fuzzer/src/main.rs

// Declare modules
mod args;
mod cli;
mod config;
mod errors;
mod logger;
mod resolver;
mod resources;

// Use imports
use crate::config::{Configuration, Settings};
use crate::errors::FuzzerError;
use crate::logger::{LogLevel, Logger};
use std::ffi::OsString;
use std::process::ExitCode;

// Import macros directly from logger module
use crate::logger::*;

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    MissingTarget,
    Invalid,
    Help,
    Ran,
}

impl Outcome {
    fn status(self) -> u8 {
        match self {
            Outcome::Help | Outcome::Ran => 0,
            Outcome::MissingTarget | Outcome::Invalid => 1,
        }
    }
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        ExitCode::from(outcome.status())
    }
}

fn main() -> ExitCode {
    // --- Load Settings (from Env) ---
    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("[E] {}", e);
            return ExitCode::FAILURE;
        }
    };

    // --- Setup Logging ---
    if let Err(e) = logger::setup_tracing(settings.debug) {
        eprintln!("[W] {}", e);
    }
    let logger = match &settings.log_file {
        Some(path) => Logger::open(path, settings.verbosity),
        None => Logger::console(settings.verbosity),
    };

    let args: Vec<OsString> = std::env::args_os().collect();
    run(&args, &settings, &logger).into()
}

fn run(args: &[OsString], settings: &Settings, logger: &Logger) -> Outcome {
    if args.len() < 2 {
        log_error!(logger, "{}", FuzzerError::MissingTarget);
        cli::print_error();
        return Outcome::MissingTarget;
    }

    // --- Resolve Command Line ---
    let mut config = resolver::resolve(args, settings, logger);
    if let Some(sink) = config.log_sink.take() {
        logger.attach(sink);
    }

    log_info!(logger, "Code is being executed on the target '{}'", config.target.to_string_lossy());
    if !config.ignored.is_empty() {
        log_debug!(logger, "Ignored on the command line: {}", config.ignored.join(" "));
    }

    if config.has_error() {
        log_error!(logger, "{} problem(s) found in the parameters", config.failures.len());
        cli::print_error();
        return Outcome::Invalid;
    }
    if config.want_help {
        cli::print_help();
        return Outcome::Help;
    }

    run_fuzzer(config, logger);
    Outcome::Ran
}

/// Hand-over point to the fuzzing engine, which is not part of this build.
fn run_fuzzer(config: Configuration, logger: &Logger) {
    if !config.want_directories && !config.want_subdomains {
        log_warn!(logger, "No fuzzing mode selected, use -d and/or -s");
        return;
    }

    let target = config.target.to_string_lossy();
    for wordlist in [config.directory_wordlist, config.subdomain_wordlist].into_iter().flatten() {
        log_info!(
            logger,
            "Queued {} fuzzing of '{}' with {}",
            wordlist.kind(),
            target,
            wordlist.path().display()
        );
        if logger.enabled(LogLevel::Advanced) {
            let count = wordlist.entries().filter(Result::is_ok).count();
            log_advanced!(logger, "Wordlist holds {} candidate(s)", count);
        }
    }

    log_warn!(logger, "The fuzzing engine is not available in this build, nothing was sent");
}
