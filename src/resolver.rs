// fuzzer/src/resolver.rs
use crate::args::{self, Directive, Flag};
use crate::config::{Configuration, Settings};
use crate::errors::{FuzzerError, Result};
use crate::logger::{log_debug, log_error, log_info, log_warn, LogLevel, Logger};
use crate::resources::{self, WordlistKind};
use std::ffi::OsString;
use std::path::Path;

/// Resolves the full argument vector (program name first, target last) into a
/// [`Configuration`]. Never fails: every problem ends up in
/// `Configuration::failures` and the pass always runs to the end, so `--help`
/// is still seen next to broken options.
pub fn resolve(args: &[OsString], settings: &Settings, logger: &Logger) -> Configuration {
    let tokens = args::tokenize(args);

    let mut config = Configuration {
        verbosity: settings.verbosity,
        ..Configuration::default()
    };
    if tokens.directives.iter().any(|d| d.flag == Flag::Verbose) {
        config.verbosity = config.verbosity.max(LogLevel::Debug);
    }
    logger.set_threshold(config.verbosity);

    log_debug!(logger, "Resolved {} option(s) from the command line", tokens.directives.len());

    for token in &tokens.ignored {
        log_warn!(logger, "Ignoring unrecognized option '{}'", token);
    }
    config.ignored = tokens.ignored;

    for directive in &tokens.directives {
        if let Err(e) = apply(&mut config, directive, settings, logger) {
            log_error!(logger, "{}", e);
            config.record_failure(e);
        }
    }

    config.target = tokens.target.unwrap_or_default();
    config
}

fn apply(config: &mut Configuration, directive: &Directive, settings: &Settings, logger: &Logger) -> Result<()> {
    match directive.flag {
        Flag::Directories => {
            config.want_directories = true;
            config.directory_wordlist = None;
            let wordlist = bind(WordlistKind::Directories, directive, settings, logger)?;
            config.directory_wordlist = Some(wordlist);
        }
        Flag::Subdomains => {
            config.want_subdomains = true;
            config.subdomain_wordlist = None;
            let wordlist = bind(WordlistKind::Subdomains, directive, settings, logger)?;
            config.subdomain_wordlist = Some(wordlist);
        }
        Flag::Help => config.want_help = true,
        Flag::Verbose => log_debug!(logger, "Verbosity set to {}", config.verbosity),
        Flag::Output => {
            config.log_sink = None;
            let path = directive.argument.as_deref().ok_or_else(|| FuzzerError::MissingArgument {
                flag: directive.flag.short_form(),
            })?;
            let sink = resources::open_log_file(Path::new(path))?;
            log_info!(logger, "Writing the output file {}", sink.path().display());
            config.log_sink = Some(sink);
        }
    }
    Ok(())
}

fn bind(
    kind: WordlistKind,
    directive: &Directive,
    settings: &Settings,
    logger: &Logger,
) -> Result<resources::Wordlist> {
    let requested = directive.argument.as_deref().map(Path::new);
    if requested.is_none() {
        log_info!(
            logger,
            "No wordlist given for {} fuzzing, opening {}",
            kind,
            settings.default_wordlist(kind).display()
        );
    }
    let wordlist = resources::bind_wordlist(kind, requested, settings)?;
    log_info!(logger, "Reading the {} wordlist {}", kind, wordlist.path().display());
    Ok(wordlist)
}
