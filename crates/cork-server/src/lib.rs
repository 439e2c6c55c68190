mod context;
mod convert;
mod fixture_service;
mod random_service;
mod state_service;

use std::net::SocketAddr;

use axum::Router;
use tokio::sync::watch;

use cork_state::StateStore;

pub use context::{MockContext, MockService};
pub use convert::{cork_to_status, ApiError};
pub use fixture_service::{read_fixture, resolve_fixture, FixtureService};
pub use random_service::RandomService;
pub use state_service::state_router;

/// The state routes plus every registered service, bound to `ctx`.
pub fn app<S: StateStore>(ctx: MockContext<S>, services: &[Box<dyn MockService<S>>]) -> Router {
    let mut router = state_router::<S>();
    for service in services {
        tracing::info!(service = service.name(), "registering service");
        router = service.register(router);
    }
    router.with_state(ctx)
}

/// Serve until the store is stopped (`shutdown` turns `true`) or the process
/// receives Ctrl-C.
pub async fn serve<S: StateStore>(
    addr: SocketAddr,
    ctx: MockContext<S>,
    services: Vec<Box<dyn MockService<S>>>,
    mut shutdown: watch::Receiver<bool>,
) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "state HTTP server starting");
    axum::serve(listener, app(ctx, &services))
        .with_graceful_shutdown(async move {
            let stopped = async {
                // With the sender gone only Ctrl-C can end the server.
                if shutdown.wait_for(|stopped| *stopped).await.is_err() {
                    std::future::pending::<()>().await;
                }
            };
            tokio::select! {
                _ = stopped => {
                    tracing::info!("stop requested, shutting down");
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("caught interrupt, shutting down");
                }
            }
        })
        .await
        .map_err(Into::into)
}
