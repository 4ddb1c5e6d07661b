use std::{fmt::Display, time::Duration};

use miette::miette;

#[derive(Debug)]
pub enum Error {
    /// The video platform refused the upload because the daily limit is reached
    QuotaExceeded,

    /// No attempt succeeded before the time budget elapsed
    Timeout(Duration),

    Miette(miette::Report),
}

impl From<miette::Report> for Error {
    fn from(err: miette::Report) -> Self {
        Error::Miette(err)
    }
}

impl From<Error> for miette::Report {
    fn from(err: Error) -> Self {
        match err {
            Error::QuotaExceeded => miette!("Daily upload limit reached"),
            Error::Timeout(budget) => miette!("Timed out after {}s", budget.as_secs()),
            Error::Miette(err) => err,
        }
    }
}

impl Error {
    pub fn wrap_err_with<D, F>(self, f: F) -> Error
    where
        D: Display + Send + Sync + 'static,
        F: FnOnce() -> D,
    {
        match self {
            Error::Miette(report) => Error::Miette(report.wrap_err(f())),
            err => err,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
