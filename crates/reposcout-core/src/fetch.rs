//! Fetch capability contract and its error types.
//!
//! The resolver never performs transport itself. Callers inject an
//! [`ArtifactFetcher`]; see [`crate::adapters`] for the bundled ones.

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::RequestError;

/// A retrieved artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    /// Where the artifact was found (full URL or file path).
    pub location: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl Artifact {
    pub fn new(location: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            location: location.into(),
            bytes,
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Classification of a single failed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchErrorKind {
    NotFound,
    Timeout,
    Transport,
    Rejected,
    InvalidCoordinate,
}

/// Structured error reported by a fetcher for one endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchError {
    kind: FetchErrorKind,
    message: String,
    retryable: bool,
}

impl FetchError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::NotFound,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::Timeout,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::Transport,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::Rejected,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn invalid_coordinate(error: &RequestError) -> Self {
        Self {
            kind: FetchErrorKind::InvalidCoordinate,
            message: error.to_string(),
            retryable: false,
        }
    }

    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }

    pub const fn kind(&self) -> FetchErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            FetchErrorKind::NotFound => "fetch.not_found",
            FetchErrorKind::Timeout => "fetch.timeout",
            FetchErrorKind::Transport => "fetch.transport",
            FetchErrorKind::Rejected => "fetch.rejected",
            FetchErrorKind::InvalidCoordinate => "fetch.invalid_coordinate",
        }
    }
}

impl Display for FetchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for FetchError {}

/// One endpoint's failed attempt, as recorded by the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptFailed {
    pub endpoint_identifier: String,
    pub error: FetchError,
}

impl AttemptFailed {
    pub fn new(endpoint_identifier: impl Into<String>, error: FetchError) -> Self {
        Self {
            endpoint_identifier: endpoint_identifier.into(),
            error,
        }
    }
}

impl Display for AttemptFailed {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.endpoint_identifier, self.error)
    }
}

pub type FetchFuture<'a> = Pin<Box<dyn Future<Output = Result<Artifact, FetchError>> + Send + 'a>>;

/// Transport capability injected into the resolver.
///
/// Implementations own everything about the wire: URL building, TLS,
/// authentication. They must be `Send + Sync` since one fetcher may serve
/// concurrent resolutions.
pub trait ArtifactFetcher: Send + Sync {
    /// Fetches `coordinate` from the repository rooted at `base_url`.
    fn fetch<'a>(&'a self, base_url: &'a str, coordinate: &'a str) -> FetchFuture<'a>;
}

impl<T: ArtifactFetcher + ?Sized> ArtifactFetcher for std::sync::Arc<T> {
    fn fetch<'a>(&'a self, base_url: &'a str, coordinate: &'a str) -> FetchFuture<'a> {
        (**self).fetch(base_url, coordinate)
    }
}

/// Joins a repository root and a relative artifact path.
pub fn join_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
