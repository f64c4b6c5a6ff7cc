use std::collections::{HashMap, HashSet};

use crate::fetch::{join_url, Artifact, ArtifactFetcher, FetchError, FetchFuture};

/// Deterministic in-memory repositories for offline use and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryFetcher {
    artifacts: HashMap<(String, String), Vec<u8>>,
    unreachable: HashSet<String>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_artifact(
        mut self,
        base_url: &str,
        coordinate: &str,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        self.artifacts
            .insert((normalize(base_url), coordinate.to_owned()), bytes.into());
        self
    }

    /// Every fetch against `base_url` fails with a transport error.
    pub fn with_unreachable(mut self, base_url: &str) -> Self {
        self.unreachable.insert(normalize(base_url));
        self
    }
}

impl ArtifactFetcher for MemoryFetcher {
    fn fetch<'a>(&'a self, base_url: &'a str, coordinate: &'a str) -> FetchFuture<'a> {
        Box::pin(async move {
            let repository = normalize(base_url);
            if self.unreachable.contains(&repository) {
                return Err(FetchError::transport(format!("{base_url} is unreachable")));
            }
            match self.artifacts.get(&(repository, coordinate.to_owned())) {
                Some(bytes) => Ok(Artifact::new(
                    join_url(base_url, coordinate),
                    bytes.clone(),
                )),
                None => Err(FetchError::not_found(format!(
                    "'{coordinate}' is not in {base_url}"
                ))),
            }
        })
    }
}

fn normalize(base_url: &str) -> String {
    base_url.trim().trim_end_matches('/').to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FetchErrorKind;

    #[tokio::test]
    async fn trailing_slash_does_not_matter() {
        let fetcher = MemoryFetcher::new().with_artifact("mem://repo/", "a:b:1", b"x".to_vec());

        let artifact = fetcher.fetch("mem://repo", "a:b:1").await.expect("stored");
        assert_eq!(artifact.bytes, b"x");
    }

    #[tokio::test]
    async fn unreachable_beats_stored_artifacts() {
        let fetcher = MemoryFetcher::new()
            .with_artifact("mem://repo", "a:b:1", b"x".to_vec())
            .with_unreachable("mem://repo/");

        let error = fetcher.fetch("mem://repo", "a:b:1").await.expect_err("down");
        assert_eq!(error.kind(), FetchErrorKind::Transport);
    }
}
