// Failure taxonomy. Nothing here is recovered from: every variant bubbles up
// to `main`, which prints it and exits non-zero.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    // Device or file could not be opened or configured.
    #[error("could not acquire {what}")]
    ResourceAcquisition {
        what: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // Buffer or sequence node allocation failed.
    #[error("allocation of {bytes} bytes for {what} failed")]
    Allocation { what: &'static str, bytes: usize },

    // A write, seek or close came back short or with an error.
    #[error("{op} failed")]
    Io {
        op: &'static str,
        #[source]
        source: std::io::Error,
    },

    // The audio backend went away underneath us.
    #[error("audio device: {0}")]
    Device(String),
}

impl Error {
    pub fn acquire(what: impl Into<String>) -> Self {
        Self::ResourceAcquisition { what: what.into(), source: None }
    }

    pub fn acquire_with<E>(what: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ResourceAcquisition { what: what.into(), source: Some(Box::new(source)) }
    }

    pub fn io(op: &'static str, source: std::io::Error) -> Self {
        Self::Io { op, source }
    }
}
