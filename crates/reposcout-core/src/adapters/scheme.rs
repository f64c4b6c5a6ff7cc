use crate::adapters::{FileFetcher, HttpFetcher};
use crate::fetch::{ArtifactFetcher, FetchError, FetchFuture};

/// Picks a transport from the endpoint's URL scheme.
#[derive(Clone, Default)]
pub struct SchemeFetcher {
    http: HttpFetcher,
    file: FileFetcher,
}

impl SchemeFetcher {
    pub fn new(http: HttpFetcher) -> Self {
        Self {
            http,
            file: FileFetcher,
        }
    }
}

impl ArtifactFetcher for SchemeFetcher {
    fn fetch<'a>(&'a self, base_url: &'a str, coordinate: &'a str) -> FetchFuture<'a> {
        let scheme = base_url
            .split_once("://")
            .map(|(scheme, _)| scheme.to_ascii_lowercase());

        match scheme.as_deref() {
            Some("http" | "https") => self.http.fetch(base_url, coordinate),
            Some("file") => self.file.fetch(base_url, coordinate),
            _ => Box::pin(async move {
                Err(FetchError::rejected(format!(
                    "unsupported repository url '{base_url}'"
                )))
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::{HttpClient, HttpFuture, HttpRequest};
    use crate::FetchErrorKind;
    use std::sync::Arc;

    struct PanickingHttpClient;

    impl HttpClient for PanickingHttpClient {
        fn execute<'a>(&'a self, request: HttpRequest) -> HttpFuture<'a> {
            panic!("unexpected http request to {}", request.url)
        }
    }

    #[tokio::test]
    async fn file_urls_stay_off_the_network() {
        let dir = tempfile::tempdir().expect("temp dir");
        std::fs::write(dir.path().join("notes.txt"), b"hello").expect("write file");
        let fetcher = SchemeFetcher::new(HttpFetcher::with_http_client(Arc::new(
            PanickingHttpClient,
        )));

        let artifact = fetcher
            .fetch(&format!("FILE://{}", dir.path().display()), "notes.txt")
            .await
            .expect("file exists");
        assert_eq!(artifact.bytes, b"hello");
    }

    #[tokio::test]
    async fn unknown_schemes_are_rejected() {
        let fetcher = SchemeFetcher::default();

        let error = fetcher
            .fetch("ftp://mirror.example/", "a:b:1")
            .await
            .expect_err("ftp unsupported");

        assert_eq!(error.kind(), FetchErrorKind::Rejected);
    }
}
