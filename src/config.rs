// fuzzer/src/config.rs
use crate::errors::{FuzzerError, Result};
use crate::logger::LogLevel;
use crate::resources::{LogSink, Wordlist, WordlistKind, DEFAULT_DIRECTORY_WORDLIST, DEFAULT_SUBDOMAIN_WORDLIST};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

const ENV_DIRECTORY_WORDLIST: &str = "FUZZER_DIRECTORY_WORDLIST";
const ENV_SUBDOMAIN_WORDLIST: &str = "FUZZER_SUBDOMAIN_WORDLIST";
const ENV_VERBOSITY: &str = "FUZZER_VERBOSITY";
const ENV_DEBUG: &str = "FUZZER_DEBUG";
const ENV_LOG_FILE: &str = "FUZZER_LOG_FILE";

/// Process-level defaults, read from the environment before the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub directory_wordlist: PathBuf,
    pub subdomain_wordlist: PathBuf,
    pub verbosity: LogLevel,
    pub debug: bool,
    /// Report log file opened at startup, before `-o` is seen.
    pub log_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            directory_wordlist: PathBuf::from(DEFAULT_DIRECTORY_WORDLIST),
            subdomain_wordlist: PathBuf::from(DEFAULT_SUBDOMAIN_WORDLIST),
            verbosity: LogLevel::default(),
            debug: false,
            log_file: None,
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        Settings::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds settings from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Settings::default();

        let verbosity = match get(ENV_VERBOSITY) {
            Some(raw) => raw
                .parse::<LogLevel>()
                .map_err(|e| FuzzerError::Config(format!("Invalid value for {}: {}", ENV_VERBOSITY, e)))?,
            None => defaults.verbosity,
        };

        Ok(Settings {
            directory_wordlist: get(ENV_DIRECTORY_WORDLIST)
                .map(PathBuf::from)
                .unwrap_or(defaults.directory_wordlist),
            subdomain_wordlist: get(ENV_SUBDOMAIN_WORDLIST)
                .map(PathBuf::from)
                .unwrap_or(defaults.subdomain_wordlist),
            verbosity,
            debug: get(ENV_DEBUG).is_some_and(|v| v == "1" || v.to_lowercase() == "true"),
            log_file: get(ENV_LOG_FILE).map(PathBuf::from),
        })
    }

    pub fn default_wordlist(&self, kind: WordlistKind) -> &Path {
        match kind {
            WordlistKind::Directories => &self.directory_wordlist,
            WordlistKind::Subdomains => &self.subdomain_wordlist,
        }
    }
}

/// Outcome of one resolution pass over the command line.
///
/// Failures are only ever appended, so once [`Configuration::has_error`] is
/// true it stays true for the rest of the run.
#[derive(Debug, Default)]
pub struct Configuration {
    pub want_directories: bool,
    pub want_subdomains: bool,
    pub want_help: bool,
    pub verbosity: LogLevel,
    /// Last argument, verbatim. Only converted lossily for display.
    pub target: OsString,
    pub directory_wordlist: Option<Wordlist>,
    pub subdomain_wordlist: Option<Wordlist>,
    pub log_sink: Option<LogSink>,
    pub failures: Vec<FuzzerError>,
    /// Tokens and cluster letters that matched no known option.
    pub ignored: Vec<String>,
}

impl Configuration {
    pub fn has_error(&self) -> bool {
        !self.failures.is_empty()
    }

    pub(crate) fn record_failure(&mut self, error: FuzzerError) {
        self.failures.push(error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let settings = Settings::from_lookup(|_| None).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.default_wordlist(WordlistKind::Directories), Path::new(DEFAULT_DIRECTORY_WORDLIST));
        assert_eq!(settings.default_wordlist(WordlistKind::Subdomains), Path::new(DEFAULT_SUBDOMAIN_WORDLIST));
    }

    #[test]
    fn environment_overrides_defaults() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("FUZZER_DIRECTORY_WORDLIST", "/tmp/dirs.txt"),
            ("FUZZER_SUBDOMAIN_WORDLIST", "/tmp/subs.txt"),
            ("FUZZER_VERBOSITY", "warning"),
            ("FUZZER_DEBUG", "TRUE"),
            ("FUZZER_LOG_FILE", "/tmp/run.log"),
        ]))
        .unwrap();
        assert_eq!(settings.directory_wordlist, PathBuf::from("/tmp/dirs.txt"));
        assert_eq!(settings.subdomain_wordlist, PathBuf::from("/tmp/subs.txt"));
        assert_eq!(settings.verbosity, LogLevel::Warning);
        assert!(settings.debug);
        assert_eq!(settings.log_file, Some(PathBuf::from("/tmp/run.log")));
    }

    #[test]
    fn empty_values_fall_back() {
        let settings = Settings::from_lookup(lookup_from(&[("FUZZER_DIRECTORY_WORDLIST", "  "), ("FUZZER_DEBUG", "0")])).unwrap();
        assert_eq!(settings.directory_wordlist, PathBuf::from(DEFAULT_DIRECTORY_WORDLIST));
        assert!(!settings.debug);
    }

    #[test]
    fn bad_verbosity_is_a_config_error() {
        let err = Settings::from_lookup(lookup_from(&[("FUZZER_VERBOSITY", "shouty")])).unwrap_err();
        assert!(matches!(err, FuzzerError::Config(_)));
    }

    #[test]
    fn error_state_is_sticky() {
        let mut config = Configuration::default();
        assert!(!config.has_error());
        config.record_failure(FuzzerError::MissingArgument { flag: "-o".into() });
        assert!(config.has_error());
        config.want_help = true;
        assert!(config.has_error());
    }
}
