use thiserror::Error;

/// Invalid resolver construction. Never retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("resolver requires at least one endpoint")]
    NoEndpoints,
    #[error("endpoint identifier cannot be empty")]
    EmptyIdentifier,
    #[error("duplicate endpoint identifier '{identifier}'")]
    DuplicateIdentifier { identifier: String },
    #[error("endpoint '{identifier}' has an empty base url")]
    EmptyBaseUrl { identifier: String },
    #[error("attempt timeout must be greater than zero")]
    ZeroAttemptTimeout,
}

/// Artifact request validation errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error("artifact coordinate cannot be empty")]
    EmptyCoordinate,
    #[error("maven coordinate '{value}' must look like group:artifact:version[:classifier][@extension]")]
    MalformedCoordinate { value: String },
    #[error("maven coordinate '{value}' has an empty {part}")]
    EmptyCoordinatePart { value: String, part: &'static str },
}

/// Errors raised while loading repository settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unknown repository preset '{value}', expected one of mavenCentral, google, gradlePluginPortal")]
    UnknownPreset { value: String },

    #[error("repository entry #{index} needs either a 'preset' or both 'id' and 'url'")]
    IncompleteEntry { index: usize },

    #[error("invalid value for {name}: '{value}'")]
    InvalidEnv { name: &'static str, value: String },

    #[error(transparent)]
    Config(#[from] ConfigError),
}
