// fuzzer/src/errors.rs
use crate::resources::WordlistKind;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FuzzerError {
    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("I/O Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Couldn't open the wordlist '{path}' for {kind} fuzzing: {source}")]
    WordlistOpen {
        kind: WordlistKind,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Couldn't open the output file '{path}': {source}")]
    LogFileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Option '{flag}' needs a file argument, none was given")]
    MissingArgument { flag: String },

    #[error("No target was given, at least a link to test is required")]
    MissingTarget,

    #[error("Logging setup failed: {0}")]
    LoggingSetup(String),
}

pub type Result<T> = std::result::Result<T, FuzzerError>;
