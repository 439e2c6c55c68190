use axum::extract::{Path, State};
use axum::routing::get;
use axum::Router;

use cork_state::{render_entry, StateStore};
use cork_types::{StateOp, StateOutcome};

use crate::context::MockContext;
use crate::convert::ApiError;

/// `GET`/`POST` on `/state` and `/state/{*key}`. An empty key (`/state/`)
/// behaves like `/state`.
pub fn state_router<S: StateStore>() -> Router<MockContext<S>> {
    Router::new()
        .route("/state", get(get_all::<S>).post(post_default::<S>))
        .route("/state/", get(get_all::<S>).post(post_default::<S>))
        .route("/state/{*key}", get(get_key::<S>).post(post_key::<S>))
}

async fn get_all<S: StateStore>(State(ctx): State<MockContext<S>>) -> Result<String, ApiError> {
    let body = ctx.store.get("").await?;
    tracing::debug!(body = %body, "queried state");
    Ok(body)
}

async fn get_key<S: StateStore>(
    State(ctx): State<MockContext<S>>,
    Path(key): Path<String>,
) -> Result<String, ApiError> {
    let value = ctx.store.get(&key).await?;
    Ok(render_entry(&key, &value))
}

async fn post_default<S: StateStore>(
    State(ctx): State<MockContext<S>>,
    body: String,
) -> Result<String, ApiError> {
    write(ctx, "", body).await
}

async fn post_key<S: StateStore>(
    State(ctx): State<MockContext<S>>,
    Path(key): Path<String>,
    body: String,
) -> Result<String, ApiError> {
    write(ctx, &key, body).await
}

async fn write<S: StateStore>(
    ctx: MockContext<S>,
    key: &str,
    body: String,
) -> Result<String, ApiError> {
    match ctx.store.apply(StateOp::from_write(key, body)).await? {
        StateOutcome::Stored(entry) => Ok(render_entry(&entry.key, &entry.value)),
        StateOutcome::Reset => Ok("state reset".to_string()),
        StateOutcome::Stopped => Ok("stopping".to_string()),
    }
}
