// fuzzer/src/cli.rs
//! Usage text. The option surface is described with clap so the help stays
//! consistent, but parsing is done by `args::tokenize` because clap cannot
//! let clustered flags claim trailing files in order.
use crate::resources::{DEFAULT_DIRECTORY_WORDLIST, DEFAULT_SUBDOMAIN_WORDLIST};
use clap::{Arg, ArgAction, Command};

const CLUSTER_NOTE: &str = "If options are all in one flag (i.e. -sdo), the names of the input and output \
files are taken in order (i.e. -sdo <subs file> <dirs file> <output file>).";

const ERROR_BANNER: &str =
    "Error while executing, check the parameters used. You need to at least include a link to test";

pub fn command() -> Command {
    Command::new("fuzzer")
        .about("Brute-forces directory paths and subdomains of a target URL")
        .override_usage("fuzzer [options] <uri>")
        .disable_help_flag(true)
        .disable_version_flag(true)
        .arg(
            Arg::new("directories")
                .short('d')
                .long("directories")
                .value_name("wordlist")
                .num_args(0..=1)
                .help(format!(
                    "Searches for directories on the specified url (default wordlist: {})",
                    DEFAULT_DIRECTORY_WORDLIST
                )),
        )
        .arg(
            Arg::new("subdomains")
                .short('s')
                .long("subdomains")
                .value_name("wordlist")
                .num_args(0..=1)
                .help(format!(
                    "Searches for subdomains of the specified url, best used without a folder in the url \
                     (default wordlist: {})",
                    DEFAULT_SUBDOMAIN_WORDLIST
                )),
        )
        .arg(
            Arg::new("help")
                .short('h')
                .long("help")
                .action(ArgAction::SetTrue)
                .help("Displays this text"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Sets the verbosity level to DEBUG"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("file")
                .num_args(1)
                .help("Appends the run log to <file>"),
        )
        .arg(Arg::new("uri").required(true).help("Target to fuzz, always the last argument"))
        .after_help(CLUSTER_NOTE)
}

pub fn usage() -> String {
    command().render_help().to_string()
}

pub fn print_help() {
    println!();
    println!("{}", usage());
}

pub fn print_error() {
    println!("{}", ERROR_BANNER);
    print_help();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_description_is_consistent() {
        command().debug_assert();
    }

    #[test]
    fn usage_lists_every_option() {
        let text = usage();
        for needle in ["--directories", "--subdomains", "--help", "--verbose", "--output", "-sdo"] {
            assert!(text.contains(needle), "usage is missing {needle}:\n{text}");
        }
        assert!(text.contains("fuzzer [options] <uri>"));
        assert!(text.contains(DEFAULT_DIRECTORY_WORDLIST));
        assert!(text.contains(DEFAULT_SUBDOMAIN_WORDLIST));
    }
}
