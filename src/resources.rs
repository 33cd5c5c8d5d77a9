// fuzzer/src/resources.rs
use crate::config::Settings;
use crate::errors::{FuzzerError, Result};
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

pub const DEFAULT_DIRECTORY_WORDLIST: &str = "/usr/share/wordlists/dirb/big.txt";
pub const DEFAULT_SUBDOMAIN_WORDLIST: &str = "/usr/share/wordlists/subs/medium.txt";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordlistKind {
    Directories,
    Subdomains,
}

impl fmt::Display for WordlistKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WordlistKind::Directories => f.write_str("directory"),
            WordlistKind::Subdomains => f.write_str("sub-domain"),
        }
    }
}

/// An open wordlist. Nothing is read until [`Wordlist::entries`] is consumed.
#[derive(Debug)]
pub struct Wordlist {
    kind: WordlistKind,
    path: PathBuf,
    reader: BufReader<File>,
}

impl Wordlist {
    pub fn kind(&self) -> WordlistKind {
        self.kind
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Candidate words, skipping blank lines and `#` comments.
    pub fn entries(self) -> impl Iterator<Item = Result<String>> {
        self.reader.lines().filter_map(|line_res| match line_res {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() || trimmed.starts_with('#') {
                    None
                } else {
                    Some(Ok(trimmed.to_string()))
                }
            }
            Err(e) => Some(Err(FuzzerError::Io(e))),
        })
    }
}

/// Append-only handle on the report log file.
#[derive(Debug)]
pub struct LogSink {
    path: PathBuf,
    file: File,
}

impl LogSink {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes `bytes` and flushes before returning.
    pub fn append(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        self.file.write_all(bytes)?;
        self.file.flush()
    }
}

/// Opens the wordlist at `requested`, or the configured default for `kind`
/// when no path was given. A single attempt, no retries.
pub fn bind_wordlist(kind: WordlistKind, requested: Option<&Path>, settings: &Settings) -> Result<Wordlist> {
    let path = requested
        .map(Path::to_path_buf)
        .unwrap_or_else(|| settings.default_wordlist(kind).to_path_buf());

    let file = File::open(&path).map_err(|e| FuzzerError::WordlistOpen {
        kind,
        path: path.clone(),
        source: e,
    })?;
    tracing::debug!(%kind, path = %path.display(), "opened wordlist");

    Ok(Wordlist {
        kind,
        path,
        reader: BufReader::new(file),
    })
}

/// Opens `path` for appending, creating it if needed.
pub fn open_log_file(path: &Path) -> Result<LogSink> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| FuzzerError::LogFileOpen {
            path: path.to_path_buf(),
            source: e,
        })?;
    tracing::debug!(path = %path.display(), "opened output file");

    Ok(LogSink {
        path: path.to_path_buf(),
        file,
    })
}
