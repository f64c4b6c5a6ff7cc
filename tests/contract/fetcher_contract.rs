//! Contract every bundled fetcher honors: a stored artifact comes back with
//! its bytes, a missing one is `NotFound`, and a malformed coordinate is
//! refused without touching the repository.

use reposcout_tests::{
    Arc, ArtifactFetcher, FetchErrorKind, FileFetcher, HttpClient, HttpFetcher, HttpFuture,
    HttpRequest, HttpResponse, MemoryFetcher,
};
use tempfile::TempDir;

const PRESENT: &str = "com.example:present:1.0";
const ABSENT: &str = "com.example:absent:1.0";
const MALFORMED: &str = "com.example:present";

/// Serves `com/example/present/1.0/present-1.0.jar` and 404 for everything else.
struct FakeRepositoryServer;

impl HttpClient for FakeRepositoryServer {
    fn execute<'a>(&'a self, request: HttpRequest) -> HttpFuture<'a> {
        Box::pin(async move {
            if request
                .url
                .ends_with("/com/example/present/1.0/present-1.0.jar")
            {
                Ok(HttpResponse::new(200, b"payload".to_vec()))
            } else {
                Ok(HttpResponse::new(404, Vec::new()))
            }
        })
    }
}

struct Subject {
    name: &'static str,
    fetcher: Box<dyn ArtifactFetcher>,
    base_url: String,
    _dir: Option<TempDir>,
}

fn subjects() -> Vec<Subject> {
    let dir = tempfile::tempdir().expect("temp dir");
    let jar_dir = dir.path().join("com/example/present/1.0");
    std::fs::create_dir_all(&jar_dir).expect("layout");
    std::fs::write(jar_dir.join("present-1.0.jar"), b"payload").expect("jar");
    let file_url = format!("file://{}", dir.path().display());

    vec![
        Subject {
            name: "memory",
            fetcher: Box::new(MemoryFetcher::new().with_artifact(
                "mem://repo",
                PRESENT,
                b"payload".to_vec(),
            )),
            base_url: String::from("mem://repo"),
            _dir: None,
        },
        Subject {
            name: "http",
            fetcher: Box::new(HttpFetcher::with_http_client(Arc::new(FakeRepositoryServer))),
            base_url: String::from("https://repo.example/maven2/"),
            _dir: None,
        },
        Subject {
            name: "file",
            fetcher: Box::new(FileFetcher),
            base_url: file_url,
            _dir: Some(dir),
        },
    ]
}

#[tokio::test]
async fn present_artifacts_are_returned_with_their_bytes() {
    for subject in subjects() {
        let artifact = subject
            .fetcher
            .fetch(&subject.base_url, PRESENT)
            .await
            .unwrap_or_else(|error| panic!("{}: {error}", subject.name));

        assert_eq!(artifact.bytes, b"payload", "{}", subject.name);
        assert!(!artifact.location.is_empty(), "{}", subject.name);
    }
}

#[tokio::test]
async fn absent_artifacts_are_not_found() {
    for subject in subjects() {
        let error = subject
            .fetcher
            .fetch(&subject.base_url, ABSENT)
            .await
            .expect_err(subject.name);

        assert_eq!(error.kind(), FetchErrorKind::NotFound, "{}", subject.name);
        assert!(!error.retryable(), "{}", subject.name);
    }
}

#[tokio::test]
async fn path_based_fetchers_refuse_malformed_coordinates() {
    for subject in subjects().into_iter().filter(|s| s.name != "memory") {
        let error = subject
            .fetcher
            .fetch(&subject.base_url, MALFORMED)
            .await
            .expect_err(subject.name);

        assert_eq!(
            error.kind(),
            FetchErrorKind::InvalidCoordinate,
            "{}",
            subject.name
        );
    }
}
