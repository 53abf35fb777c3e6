// Imports sshp specific modules
pub mod args;
pub mod log;
pub mod selector;
pub mod session;
pub mod store;
pub mod term;
pub mod ui;

use std::io;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    Io(io::Error),
    Log(log::LogError),
    Selector(selector::SelectorError),
    Session(session::SessionError),
    Store(store::StoreError),
    UI(ui::UIError),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(err) => write!(f, "IO error: {}", err),
            Error::Log(err) => write!(f, "Logging error: {}", err),
            Error::Selector(err) => write!(f, "Selection error: {}", err),
            Error::Session(err) => write!(f, "Session error: {}", err),
            Error::Store(err) => write!(f, "Profile store error: {}", err),
            Error::UI(err) => write!(f, "UI error: {}", err),
        }
    }
}

impl std::error::Error for Error {}

// Implement From for each error type
impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<log::LogError> for Error {
    fn from(err: log::LogError) -> Self {
        Error::Log(err)
    }
}

impl From<selector::SelectorError> for Error {
    fn from(err: selector::SelectorError) -> Self {
        Error::Selector(err)
    }
}

impl From<session::SessionError> for Error {
    fn from(err: session::SessionError) -> Self {
        Error::Session(err)
    }
}

impl From<store::StoreError> for Error {
    fn from(err: store::StoreError) -> Self {
        Error::Store(err)
    }
}

impl From<ui::UIError> for Error {
    fn from(err: ui::UIError) -> Self {
        Error::UI(err)
    }
}
