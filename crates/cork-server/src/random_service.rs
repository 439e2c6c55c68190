use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;

use cork_random::{SeedValue, SeededGenerator};
use cork_state::StateStore;
use cork_types::CorkError;

use crate::context::{MockContext, MockService};
use crate::convert::ApiError;
use crate::fixture_service::resolve_fixture;

#[derive(Debug, Deserialize)]
struct SeedParams {
    seed: Option<String>,
}

impl SeedParams {
    /// Numeric seeds hash as integers, anything else as a string.
    fn inputs(&self) -> Vec<SeedValue> {
        match self.seed.as_deref() {
            None => Vec::new(),
            Some(raw) => match raw.parse::<i64>() {
                Ok(n) => vec![SeedValue::Int(n)],
                Err(_) => vec![SeedValue::from(raw)],
            },
        }
    }
}

/// Generator endpoints for driving reproducible payloads from outside:
/// `/~random/string/{pattern}` and `/~random/line/{*path}`, both taking an
/// optional `?seed=` that is mixed into the configured base seed.
pub struct RandomService;

impl<S: StateStore> MockService<S> for RandomService {
    fn name(&self) -> &str {
        "random"
    }

    fn register(&self, router: Router<MockContext<S>>) -> Router<MockContext<S>> {
        router
            .route("/~random/string/{pattern}", get(random_string::<S>))
            .route("/~random/line/{*path}", get(random_line::<S>))
    }
}

fn generator<S>(ctx: &MockContext<S>, params: &SeedParams) -> Result<SeededGenerator, CorkError> {
    ctx.generators.generator(&params.inputs())
}

async fn random_string<S: StateStore>(
    State(ctx): State<MockContext<S>>,
    Path(pattern): Path<String>,
    Query(params): Query<SeedParams>,
) -> Result<String, ApiError> {
    let mut generator = generator(&ctx, &params)?;
    Ok(generator.random_string(&pattern))
}

async fn random_line<S: StateStore>(
    State(ctx): State<MockContext<S>>,
    Path(path): Path<String>,
    Query(params): Query<SeedParams>,
) -> Result<String, ApiError> {
    let mut generator = generator(&ctx, &params)?;
    let file = resolve_fixture(&ctx.fixtures, &path)?;
    let line = tokio::task::spawn_blocking(move || generator.random_line(file))
        .await
        .map_err(|e| CorkError::Io { path: path.into(), source: std::io::Error::other(e) })??;
    Ok(line)
}
