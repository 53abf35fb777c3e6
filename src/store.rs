//! Saved host profiles and their on-disk store.
//!
//! Profiles live in `~/.ssh-pick/profiles.json` as a pretty-printed JSON
//! list. The file holds passwords in the clear (credential encryption is
//! out of scope for this tool, by design), so the store directory and file
//! are created with owner-only permissions on Unix.

use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

#[cfg(unix)]
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

#[cfg(unix)]
const PRIVATE_STORE_DIR_MODE: u32 = 0o700;
#[cfg(unix)]
const PRIVATE_STORE_FILE_MODE: u32 = 0o600;

const STORE_DIR: &str = ".ssh-pick";
const STORE_FILE: &str = "profiles.json";

fn default_port() -> u16 {
    22
}

/// A saved remote-host connection target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// Display name shown by the selector and matched by `del`.
    pub name: String,
    /// Host address (name or IP).
    pub host: String,
    /// SSH port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Login user.
    pub username: String,
    /// Login password, stored in the clear.
    pub password: String,
}

impl Profile {
    /// One-line listing entry, without the credential.
    pub fn summary(&self) -> String {
        format!("{:<12} {}@{}:{}", self.name, self.username, self.host, self.port)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ProfileFile {
    #[serde(default)]
    profiles: Vec<Profile>,
}

#[derive(Debug)]
pub enum StoreError {
    /// The home directory could not be resolved.
    MissingHomeDirectory,
    IoError(io::Error),
    /// The store file exists but does not parse.
    ParseError(serde_json::Error),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::MissingHomeDirectory => write!(f, "could not determine home directory"),
            StoreError::IoError(err) => write!(f, "I/O error: {}", err),
            StoreError::ParseError(err) => write!(f, "profile store is not valid JSON: {}", err),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<io::Error> for StoreError {
    fn from(err: io::Error) -> Self {
        StoreError::IoError(err)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::ParseError(err)
    }
}

/// Profile persistence rooted at one JSON file.
pub struct ProfileStore {
    path: PathBuf,
}

impl ProfileStore {
    /// Open the store at its default location under the home directory.
    pub fn open() -> Result<Self, StoreError> {
        let home = dirs::home_dir().ok_or(StoreError::MissingHomeDirectory)?;
        Ok(Self {
            path: home.join(STORE_DIR).join(STORE_FILE),
        })
    }

    /// Open a store backed by an explicit file path.
    pub fn at_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load every saved profile. A store that does not exist yet is empty.
    pub fn load(&self) -> Result<Vec<Profile>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&self.path)?;
        let file: ProfileFile = serde_json::from_str(&raw)?;
        Ok(file.profiles)
    }

    /// Replace the stored profile list.
    pub fn save(&self, profiles: &[Profile]) -> Result<(), StoreError> {
        let file = ProfileFile {
            profiles: profiles.to_vec(),
        };
        let rendered = serde_json::to_string_pretty(&file)?;

        if let Some(parent) = self.path.parent() {
            create_private_directory(parent)?;
        }
        let mut out = open_private_write_file(&self.path)?;
        out.write_all(rendered.as_bytes())?;
        out.write_all(b"\n")?;
        Ok(())
    }

    /// Append one profile. Name uniqueness is not enforced.
    pub fn add(&self, profile: Profile) -> Result<(), StoreError> {
        let mut profiles = self.load()?;
        profiles.push(profile);
        self.save(&profiles)
    }

    /// Remove every profile with the given name. Returns whether any matched.
    pub fn remove(&self, name: &str) -> Result<bool, StoreError> {
        let mut profiles = self.load()?;
        let before = profiles.len();
        profiles.retain(|profile| profile.name != name);
        if profiles.len() == before {
            return Ok(false);
        }
        self.save(&profiles)?;
        Ok(true)
    }

    /// Remove every saved profile.
    pub fn clear(&self) -> Result<(), StoreError> {
        self.save(&[])
    }
}

fn create_private_directory(path: &Path) -> Result<(), StoreError> {
    fs::create_dir_all(path)?;
    set_private_directory_permissions(path)
}

fn open_private_write_file(path: &Path) -> Result<fs::File, StoreError> {
    let mut options = fs::OpenOptions::new();
    options.create(true).write(true).truncate(true);
    #[cfg(unix)]
    {
        options.mode(PRIVATE_STORE_FILE_MODE);
    }
    Ok(options.open(path)?)
}

#[cfg(unix)]
fn set_private_directory_permissions(path: &Path) -> Result<(), StoreError> {
    fs::set_permissions(path, fs::Permissions::from_mode(PRIVATE_STORE_DIR_MODE))?;
    Ok(())
}

#[cfg(not(unix))]
fn set_private_directory_permissions(_path: &Path) -> Result<(), StoreError> {
    Ok(())
}

#[cfg(test)]
#[path = "test/store.rs"]
mod tests;
