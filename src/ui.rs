//! Interactive line prompts for the add and delete flows.

use std::io::{self, Write};

const DEFAULT_PORT: u16 = 22;

#[derive(Debug)]
pub enum UIError {
    IoError(io::Error),
}

impl std::fmt::Display for UIError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UIError::IoError(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl std::error::Error for UIError {}

impl From<io::Error> for UIError {
    fn from(err: io::Error) -> Self {
        UIError::IoError(err)
    }
}

/// Prompt until the user enters a non-empty line.
pub fn prompt_line(label: &str) -> Result<String, UIError> {
    loop {
        let input = read_prompted_line(&format!("{}: ", label))?;
        let input = input.trim();
        if input.is_empty() {
            println!("Input cannot be empty. Please try again.");
            continue;
        }
        return Ok(input.to_string());
    }
}

/// Prompt for a port; empty input selects the SSH default.
pub fn prompt_port(label: &str) -> Result<u16, UIError> {
    loop {
        let input = read_prompted_line(&format!("{} [{}]: ", label, DEFAULT_PORT))?;
        match parse_port(&input) {
            Some(port) => return Ok(port),
            None => println!("Invalid port. Please enter a number between 1 and 65535."),
        }
    }
}

/// Prompt for a password without echo, requiring a matching confirmation.
pub fn prompt_password(label: &str) -> Result<String, UIError> {
    loop {
        let password = rpassword::prompt_password(format!("{}: ", label))?;
        if password.is_empty() {
            println!("Password cannot be empty. Please try again.");
            continue;
        }
        let confirmation = rpassword::prompt_password("Confirm password: ")?;
        if password != confirmation {
            println!("Passwords do not match. Please try again.");
            continue;
        }
        return Ok(password);
    }
}

/// Ask a yes/no question; only `y`/`yes` count as assent.
pub fn confirm(question: &str) -> Result<bool, UIError> {
    print!("{} [y/N]: ", question);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(parse_confirmation(&input))
}

fn read_prompted_line(prompt: &str) -> Result<String, UIError> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    let bytes = io::stdin().read_line(&mut input)?;
    if bytes == 0 {
        // Closed stdin would otherwise re-prompt forever.
        return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
    }
    Ok(input)
}

/// Parse a port entry; empty selects the default, zero is rejected.
fn parse_port(input: &str) -> Option<u16> {
    let input = input.trim();
    if input.is_empty() {
        return Some(DEFAULT_PORT);
    }
    match input.parse::<u16>() {
        Ok(0) | Err(_) => None,
        Ok(port) => Some(port),
    }
}

fn parse_confirmation(input: &str) -> bool {
    matches!(input.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
#[path = "test/ui.rs"]
mod tests;
