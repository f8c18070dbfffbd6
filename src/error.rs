//! Terminal error kinds for a single check run
//!
//! Only two things can abort a run: the federation request could not be
//! completed, or its response could not be read as XML. Everything after
//! parsing is infallible, and DNS lookup failures are folded into a negative
//! result by [`crate::dns::DnsResolver::sensor_exists`].

use std::error::Error as StdError;

use thiserror::Error;

/// Error returned by [`crate::core::MdiChecker::check_domain`]
#[derive(Debug, Error)]
pub enum CheckError {
    /// The federation request failed for any reason (connect, TLS, status, body)
    #[error("Unable to execute request. Wrong domain?")]
    Request(#[source] Box<dyn StdError + Send + Sync + 'static>),

    /// The federation response was not well-formed XML
    #[error("Unable to parse federation response: {0}")]
    MalformedResponse(String),
}

impl CheckError {
    /// Wraps any transport-side failure into the single request error kind
    pub fn request(cause: impl Into<Box<dyn StdError + Send + Sync + 'static>>) -> Self {
        Self::Request(cause.into())
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedResponse(reason.into())
    }
}
