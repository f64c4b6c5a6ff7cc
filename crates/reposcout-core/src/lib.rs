//! # Reposcout Core
//!
//! Ordered, fallback-based artifact resolution across repository mirrors.
//!
//! ## Overview
//!
//! A [`RepositoryResolver`] holds an immutable, priority-ordered list of
//! [`Endpoint`]s. Given an [`ArtifactRequest`] it asks an injected
//! [`ArtifactFetcher`] for the artifact at each endpoint in turn and returns the
//! first success. When every endpoint fails, the caller gets a
//! [`ResolutionFailure`] listing every endpoint tried and the last error seen.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | HTTP, file, in-memory and scheme-dispatching fetchers |
//! | [`endpoint`] | Endpoint descriptors and well-known repository presets |
//! | [`error`] | Configuration, request and settings errors |
//! | [`fetch`] | Fetch capability trait, artifacts and attempt failures |
//! | [`http_client`] | HTTP transport seam and the reqwest client |
//! | [`request`] | Artifact requests and Maven coordinate helpers |
//! | [`resolver`] | The fallback resolver itself |
//! | [`retry`] | Same-endpoint retry and backoff |
//! | [`settings`] | JSON/env settings for the plugin and dependency scopes |
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  CLI / caller   │
//! └────────┬────────┘
//!          │ Settings::resolver(scope)
//!          ▼
//! ┌────────────────────┐     ┌──────────────────┐
//! │ RepositoryResolver │────▶│ RetryConfig      │
//! │ (ordered fallback) │     │ attempt timeout  │
//! └────────┬───────────┘     └──────────────────┘
//!          │ fetch(base_url, coordinate)
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ ArtifactFetcher │────▶│ HttpClient       │
//! │ (adapters)      │     │ (reqwest)        │
//! └─────────────────┘     └──────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! ```rust
//! use reposcout_core::{ConfigError, Endpoint, RepositoryResolver};
//!
//! let duplicate = RepositoryResolver::new(vec![
//!     Endpoint::new("x", "https://one.example/", 0),
//!     Endpoint::new("x", "https://two.example/", 1),
//! ]);
//! assert_eq!(
//!     duplicate.err(),
//!     Some(ConfigError::DuplicateIdentifier { identifier: String::from("x") })
//! );
//! ```

pub mod adapters;
pub mod endpoint;
pub mod error;
pub mod fetch;
pub mod http_client;
pub mod request;
pub mod resolver;
pub mod retry;
pub mod settings;

pub use adapters::{FileFetcher, HttpFetcher, MemoryFetcher, SchemeFetcher};

pub use endpoint::{Endpoint, RepositoryPreset};

pub use error::{ConfigError, RequestError, SettingsError};

pub use fetch::{Artifact, ArtifactFetcher, AttemptFailed, FetchError, FetchErrorKind, FetchFuture};

pub use http_client::{
    HttpClient, HttpError, HttpFuture, HttpRequest, HttpResponse, ReqwestHttpClient,
};

pub use request::{artifact_file_name, artifact_path, ArtifactRequest, MavenCoordinate};

pub use resolver::{
    RepositoryResolver, ResolutionFailure, ResolutionResult, Resolved, ResolverConfig,
};

pub use retry::{Backoff, RetryConfig};

pub use settings::{RepositoryEntry, RepositoryScope, RetrySettings, Settings};
