use std::path::{Component, Path, PathBuf};

use axum::extract::{Path as UrlPath, State};
use axum::routing::get;
use axum::Router;

use cork_state::StateStore;
use cork_types::CorkError;

use crate::context::{MockContext, MockService};
use crate::convert::ApiError;

/// Resolve `relative` under `root`, refusing anything that could climb out.
pub fn resolve_fixture(root: &Path, relative: &str) -> Result<PathBuf, CorkError> {
    let rel = Path::new(relative);
    if rel.components().any(|c| !matches!(c, Component::Normal(_) | Component::CurDir)) {
        return Err(CorkError::FileNotFound(rel.to_path_buf()));
    }
    Ok(root.join(rel))
}

/// Read a fixture file as a string. A missing file is
/// [`CorkError::FileNotFound`], which the HTTP layer turns into a 404.
pub async fn read_fixture(root: &Path, relative: &str) -> Result<String, CorkError> {
    let path = resolve_fixture(root, relative)?;
    tracing::debug!(path = %path.display(), "reading fixture");
    match tokio::fs::read_to_string(&path).await {
        Ok(contents) => {
            tracing::trace!(contents = %contents, "fixture contents");
            Ok(contents)
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "fixture not readable");
            Err(CorkError::io(path, e))
        }
    }
}

/// Serves files under the fixture root at `/~fixtures/{*path}`.
pub struct FixtureService;

impl<S: StateStore> MockService<S> for FixtureService {
    fn name(&self) -> &str {
        "fixtures"
    }

    fn register(&self, router: Router<MockContext<S>>) -> Router<MockContext<S>> {
        router.route("/~fixtures/{*path}", get(fixture::<S>))
    }
}

async fn fixture<S: StateStore>(
    State(ctx): State<MockContext<S>>,
    UrlPath(path): UrlPath<String>,
) -> Result<String, ApiError> {
    Ok(read_fixture(&ctx.fixtures, &path).await?)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use cork_random::GeneratorFactory;
    use cork_state::MemStateStore;
    use tower::ServiceExt;

    use super::*;

    #[test]
    fn resolve_rejects_escapes() {
        let root = Path::new("/srv/fixtures");
        assert_eq!(
            resolve_fixture(root, "data/response.xml").unwrap(),
            root.join("data/response.xml")
        );
        assert!(resolve_fixture(root, "../etc/passwd").is_err());
        assert!(resolve_fixture(root, "/etc/passwd").is_err());
    }

    #[tokio::test]
    async fn read_existing_and_missing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("data")).unwrap();
        std::fs::write(dir.path().join("data/response.xml"), "<ok/>").unwrap();

        assert_eq!(read_fixture(dir.path(), "data/response.xml").await.unwrap(), "<ok/>");
        assert!(matches!(
            read_fixture(dir.path(), "data/missing.xml").await,
            Err(CorkError::FileNotFound(_))
        ));
    }

    #[tokio::test]
    async fn served_over_http() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("hello.txt"), "hi there").unwrap();

        let ctx = MockContext::new(
            Arc::new(MemStateStore::new()),
            GeneratorFactory::entropy(),
            dir.path(),
        );
        let router = MockService::<MemStateStore>::register(&FixtureService, Router::new())
            .with_state(ctx);

        let response = router
            .clone()
            .oneshot(Request::builder().uri("/~fixtures/hello.txt").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"hi there");

        let response = router
            .oneshot(Request::builder().uri("/~fixtures/nope.txt").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
