use sshp::args::{self, CliCommand};
use sshp::session::{self, SessionError, ShellError};
use sshp::store::{Profile, ProfileStore};
use sshp::{Result, log, log_error, log_info, selector, ui};

use std::process::ExitCode;

fn main() -> ExitCode {
    let args = args::main_args();

    if args.debug {
        log::enable_debug_mode();
        log_info!("Debug logging enabled");
    }

    match dispatch(args.command) {
        Ok(code) => code,
        Err(err) => {
            log_error!("{}", err);
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn dispatch(command: CliCommand) -> Result<ExitCode> {
    let store = ProfileStore::open()?;

    match command {
        CliCommand::Launch => launch(&store),
        CliCommand::List => {
            list_profiles(&store)?;
            Ok(ExitCode::SUCCESS)
        }
        CliCommand::Add => {
            add_profile(&store)?;
            Ok(ExitCode::SUCCESS)
        }
        CliCommand::Delete { name, all } => {
            delete_profiles(&store, name, all)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn launch(store: &ProfileStore) -> Result<ExitCode> {
    let profiles = store.load()?;

    let Some(profile) = selector::select(&profiles)? else {
        println!("No profile selected.");
        return Ok(ExitCode::SUCCESS);
    };

    println!(
        "Connecting to {} | {}@{}:{} ...",
        profile.name, profile.username, profile.host, profile.port
    );

    match session::run(&profile) {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(SessionError::Shell(ShellError::Exit(status))) => {
            // Propagate the remote shell's status like a plain ssh run would.
            Ok(map_exit_code(status))
        }
        Err(err) => Err(err.into()),
    }
}

/// Clamp a remote exit status to the valid process exit range.
fn map_exit_code(status: i32) -> ExitCode {
    match u8::try_from(status) {
        Ok(code) => ExitCode::from(code),
        Err(_) => ExitCode::from(255),
    }
}

fn list_profiles(store: &ProfileStore) -> Result<()> {
    let profiles = store.load()?;
    if profiles.is_empty() {
        println!("No profiles saved. Add one with `sshp add`.");
        return Ok(());
    }
    for profile in &profiles {
        println!("{}", profile.summary());
    }
    Ok(())
}

fn add_profile(store: &ProfileStore) -> Result<()> {
    let name = ui::prompt_line("Profile name")?;
    let host = ui::prompt_line("Host address")?;
    let port = ui::prompt_port("Port")?;
    let username = ui::prompt_line("Username")?;
    let password = ui::prompt_password("Password")?;

    store.add(Profile {
        name: name.clone(),
        host,
        port,
        username,
        password,
    })?;
    log_info!("Added profile '{}'", name);
    println!("Added profile '{}'.", name);
    Ok(())
}

fn delete_profiles(store: &ProfileStore, name: Option<String>, all: bool) -> Result<()> {
    if all {
        if !ui::confirm("Delete every saved profile?")? {
            println!("Nothing deleted.");
            return Ok(());
        }
        store.clear()?;
        log_info!("Cleared the profile store");
        println!("All profiles deleted.");
        return Ok(());
    }

    let name = match name {
        Some(name) => name,
        None => {
            list_profiles(store)?;
            ui::prompt_line("Profile to delete")?
        }
    };

    if store.remove(&name)? {
        log_info!("Removed profile '{}'", name);
        println!("Deleted profile '{}'.", name);
    } else {
        println!("No profile named '{}'.", name);
    }
    Ok(())
}

#[cfg(test)]
#[path = "test/main.rs"]
mod tests;
