use derive_more::From;

use crate::fetch::FetchError;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, From)]
pub enum Error {
    #[from]
    Io(std::io::Error),

    #[from]
    Http(reqwest::Error),

    #[from]
    Fetch(FetchError),

    /// Custom error message
    Custom(String),
}

impl core::fmt::Display for Error {
    fn fmt(&self, fmt: &mut core::fmt::Formatter) -> core::result::Result<(), core::fmt::Error> {
        match self {
            Self::Io(e) => write!(fmt, "io error: {e}"),
            Self::Http(e) => write!(fmt, "http client error: {e}"),
            Self::Fetch(e) => write!(fmt, "{e}"),
            Self::Custom(msg) => write!(fmt, "{msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Http(e) => Some(e),
            Self::Fetch(e) => Some(e),
            Self::Custom(_) => None,
        }
    }
}
