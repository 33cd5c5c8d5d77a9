// fuzzer/src/args.rs
//! Splits the raw argument vector into flag directives before anything is
//! opened or mutated.
//!
//! The last argument is always the target. Every other token is either a
//! flag (long or short), a cluster of short flag letters such as `-sdo`, a
//! filename claimed by the flag before it, or ignored.
use lazy_static::lazy_static;
use std::collections::HashMap;
use std::ffi::OsString;

lazy_static! {
    static ref LONG_FLAGS: HashMap<&'static str, Flag> = {
        Flag::ALL.iter().map(|flag| (flag.long_name(), *flag)).collect()
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flag {
    Directories,
    Subdomains,
    Help,
    Verbose,
    Output,
}

impl Flag {
    pub const ALL: [Flag; 5] = [Flag::Directories, Flag::Subdomains, Flag::Help, Flag::Verbose, Flag::Output];

    pub fn letter(self) -> char {
        match self {
            Flag::Directories => 'd',
            Flag::Subdomains => 's',
            Flag::Help => 'h',
            Flag::Verbose => 'v',
            Flag::Output => 'o',
        }
    }

    pub fn long_name(self) -> &'static str {
        match self {
            Flag::Directories => "directories",
            Flag::Subdomains => "subdomains",
            Flag::Help => "help",
            Flag::Verbose => "verbose",
            Flag::Output => "output",
        }
    }

    pub fn from_letter(letter: char) -> Option<Flag> {
        Flag::ALL.iter().copied().find(|flag| flag.letter() == letter)
    }

    /// Exact match against `-x` or `--name`.
    pub fn from_token(token: &str) -> Option<Flag> {
        if let Some(name) = token.strip_prefix("--") {
            return LONG_FLAGS.get(name).copied();
        }
        let mut chars = token.strip_prefix('-')?.chars();
        match (chars.next(), chars.next()) {
            (Some(letter), None) => Flag::from_letter(letter),
            _ => None,
        }
    }

    /// Whether the flag looks for a filename in the following token.
    pub fn takes_file(self) -> bool {
        matches!(self, Flag::Directories | Flag::Subdomains | Flag::Output)
    }

    pub fn short_form(self) -> String {
        format!("-{}", self.letter())
    }
}

/// One flag occurrence together with the filename it claimed, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub flag: Flag,
    pub argument: Option<OsString>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Tokens {
    pub directives: Vec<Directive>,
    pub ignored: Vec<String>,
    pub target: Option<OsString>,
}

/// A flag at `cursor` owns the next token only if that token sits strictly
/// before the target and does not start with a dash.
pub fn claims_next(args: &[OsString], cursor: usize) -> bool {
    let next = cursor + 1;
    next + 1 < args.len() && !args[next].as_encoded_bytes().starts_with(b"-")
}

fn is_cluster(token: &str) -> bool {
    token.len() > 2 && token.starts_with('-') && !token.starts_with("--")
}

/// Tokenizes `args`, where `args[0]` is the program name and the last entry
/// is the target. Arguments need not be valid UTF-8; such tokens are never
/// flags but are kept intact as filenames or the target.
///
/// Unknown letters inside a cluster are skipped and the letters after them
/// still apply, so `-vxh` yields `-v` and `-h`.
pub fn tokenize(args: &[OsString]) -> Tokens {
    let mut tokens = Tokens {
        target: args.get(1..).and_then(<[OsString]>::last).cloned(),
        ..Tokens::default()
    };
    let last = args.len().saturating_sub(1);

    let mut cursor = 1;
    while cursor < last {
        let text = args[cursor].to_str();

        if let Some(flag) = text.and_then(Flag::from_token) {
            let argument = claim(args, &mut cursor, flag);
            tokens.directives.push(Directive { flag, argument });
        } else if let Some(cluster) = text.filter(|t| is_cluster(t)) {
            tracing::debug!(token = cluster, "expanding flag cluster");
            // Each letter claims from the same cursor, so files are taken in
            // the order the letters appear.
            for letter in cluster.chars().skip(1) {
                match Flag::from_letter(letter) {
                    Some(flag) => {
                        let argument = claim(args, &mut cursor, flag);
                        tokens.directives.push(Directive { flag, argument });
                    }
                    None => tokens.ignored.push(format!("-{}", letter)),
                }
            }
        } else {
            tokens.ignored.push(args[cursor].to_string_lossy().into_owned());
        }

        cursor += 1;
    }

    tokens
}

fn claim(args: &[OsString], cursor: &mut usize, flag: Flag) -> Option<OsString> {
    if flag.takes_file() && claims_next(args, *cursor) {
        *cursor += 1;
        Some(args[*cursor].clone())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(line: &str) -> Vec<OsString> {
        line.split_whitespace().map(OsString::from).collect()
    }

    fn os(s: &str) -> Option<OsString> {
        Some(OsString::from(s))
    }

    fn directive(flag: Flag, argument: Option<&str>) -> Directive {
        Directive {
            flag,
            argument: argument.map(OsString::from),
        }
    }

    #[test]
    fn recognizes_long_and_short_forms() {
        for flag in Flag::ALL {
            assert_eq!(Flag::from_token(&flag.short_form()), Some(flag));
            assert_eq!(Flag::from_token(&format!("--{}", flag.long_name())), Some(flag));
        }
        assert_eq!(Flag::from_token("-x"), None);
        assert_eq!(Flag::from_token("--dir"), None);
        assert_eq!(Flag::from_token("d"), None);
        assert_eq!(Flag::from_token("-"), None);
    }

    #[test]
    fn next_token_ownership() {
        let args = argv("fuzzer -d words.txt -v http://t");
        assert!(claims_next(&args, 1));
        assert!(!claims_next(&args, 2), "dash-prefixed tokens are never claimed");
        assert!(!claims_next(&args, 3), "the target is never claimed");
        assert!(!claims_next(&args, 4));
    }

    #[test]
    fn flag_claims_following_file() {
        let tokens = tokenize(&argv("fuzzer -d wordlist.txt -v http://example.com"));
        assert_eq!(
            tokens.directives,
            [directive(Flag::Directories, Some("wordlist.txt")), directive(Flag::Verbose, None)]
        );
        assert_eq!(tokens.target, os("http://example.com"));
        assert!(tokens.ignored.is_empty());
    }

    #[test]
    fn flag_before_target_claims_nothing() {
        let tokens = tokenize(&argv("fuzzer --subdomains http://t"));
        assert_eq!(tokens.directives, [directive(Flag::Subdomains, None)]);
        assert_eq!(tokens.target, os("http://t"));
    }

    #[test]
    fn cluster_claims_files_left_to_right() {
        let tokens = tokenize(&argv("fuzzer -sdo subs.txt dirs.txt out.log http://t"));
        assert_eq!(
            tokens.directives,
            [
                directive(Flag::Subdomains, Some("subs.txt")),
                directive(Flag::Directories, Some("dirs.txt")),
                directive(Flag::Output, Some("out.log")),
            ]
        );
        assert_eq!(tokens.target, os("http://t"));
    }

    #[test]
    fn cluster_order_follows_text_not_letter() {
        let tokens = tokenize(&argv("fuzzer -dso a b c http://t"));
        assert_eq!(
            tokens.directives,
            [
                directive(Flag::Directories, Some("a")),
                directive(Flag::Subdomains, Some("b")),
                directive(Flag::Output, Some("c")),
            ]
        );
    }

    #[test]
    fn cluster_runs_out_of_files() {
        let tokens = tokenize(&argv("fuzzer -vdo dirs.txt http://t"));
        assert_eq!(
            tokens.directives,
            [
                directive(Flag::Verbose, None),
                directive(Flag::Directories, Some("dirs.txt")),
                directive(Flag::Output, None),
            ]
        );
    }

    #[test]
    fn cluster_skips_unknown_letters() {
        let tokens = tokenize(&argv("fuzzer -vxh http://t"));
        assert_eq!(tokens.directives, [directive(Flag::Verbose, None), directive(Flag::Help, None)]);
        assert_eq!(tokens.ignored, ["-x"]);
    }

    #[test]
    fn unknown_tokens_are_ignored() {
        let tokens = tokenize(&argv("fuzzer --fast stray -h http://t"));
        assert_eq!(tokens.directives, [directive(Flag::Help, None)]);
        assert_eq!(tokens.ignored, ["--fast", "stray"]);
    }

    #[test]
    fn output_refuses_dash_prefixed_file() {
        let tokens = tokenize(&argv("fuzzer -o -v http://t"));
        assert_eq!(tokens.directives, [directive(Flag::Output, None), directive(Flag::Verbose, None)]);
    }

    #[test]
    fn lone_target_yields_no_directives() {
        let tokens = tokenize(&argv("fuzzer -h"));
        assert!(tokens.directives.is_empty());
        assert_eq!(tokens.target, os("-h"));
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_tokens_are_kept_byte_for_byte() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let file = OsStr::from_bytes(b"w\xff.txt").to_os_string();
        let junk = OsStr::from_bytes(b"-\xfe").to_os_string();
        let args = vec![
            OsString::from("fuzzer"),
            OsString::from("-d"),
            file.clone(),
            junk,
            OsString::from("http://t"),
        ];

        assert!(claims_next(&args, 1));
        assert!(!claims_next(&args, 2));
        let tokens = tokenize(&args);
        assert_eq!(
            tokens.directives,
            [Directive {
                flag: Flag::Directories,
                argument: Some(file),
            }]
        );
        assert_eq!(tokens.ignored, ["-\u{fffd}"]);
        assert_eq!(tokens.target, os("http://t"));
    }

    #[test]
    fn empty_command_line_has_no_target() {
        assert_eq!(tokenize(&argv("fuzzer")), Tokens::default());
        assert_eq!(tokenize(&[]), Tokens::default());
    }
}
