use clap::{Arg, ArgAction, Command};
use std::ffi::OsString;

/// Parsed command line for one invocation.
#[derive(Debug, Clone)]
pub struct MainArgs {
    pub debug: bool,
    pub command: CliCommand,
}

/// The action selected on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    /// No subcommand: interactive select-and-connect.
    Launch,
    List,
    Add,
    Delete { name: Option<String>, all: bool },
}

/// Parses command-line arguments using clap.
pub fn main_args() -> MainArgs {
    parse_main_args_from(&build_cli_command(), std::env::args())
}

pub(crate) fn build_cli_command() -> Command {
    Command::new("sshp")
        .version("v0.2.0")
        .about("A Rust-based SSH profile picker and launcher.")
        .propagate_version(true)
        .arg(
            Arg::new("debug")
                .short('d')
                .long("debug")
                .help("Enable debug logging")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(Command::new("list").about("List saved host profiles"))
        .subcommand(Command::new("add").about("Add a host profile"))
        .subcommand(
            Command::new("del")
                .about("Delete a host profile")
                .arg(Arg::new("name").help("Name of the profile to delete"))
                .arg(
                    Arg::new("all")
                        .long("all")
                        .help("Delete every saved profile")
                        .action(ArgAction::SetTrue)
                        .conflicts_with("name"),
                ),
        )
}

pub(crate) fn parse_main_args_from<I, T>(cmd: &Command, argv: I) -> MainArgs
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = cmd.clone().get_matches_from(argv);

    let command = match matches.subcommand() {
        Some(("list", _)) => CliCommand::List,
        Some(("add", _)) => CliCommand::Add,
        Some(("del", sub_matches)) => CliCommand::Delete {
            name: sub_matches.get_one::<String>("name").cloned(),
            all: sub_matches.get_flag("all"),
        },
        _ => CliCommand::Launch,
    };

    MainArgs {
        debug: matches.get_flag("debug"),
        command,
    }
}

#[cfg(test)]
#[path = "test/args.rs"]
mod tests;
