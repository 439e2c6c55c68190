use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;

use cork_random::GeneratorFactory;
use cork_state::StateStore;

/// Everything a mock handler may touch, handed over through axum `State`.
pub struct MockContext<S> {
    pub store: Arc<S>,
    pub generators: GeneratorFactory,
    /// Root that relative fixture paths resolve against.
    pub fixtures: PathBuf,
}

impl<S: StateStore> MockContext<S> {
    pub fn new(store: Arc<S>, generators: GeneratorFactory, fixtures: impl Into<PathBuf>) -> Self {
        MockContext { store, generators, fixtures: fixtures.into() }
    }
}

impl<S> Clone for MockContext<S> {
    fn clone(&self) -> Self {
        MockContext {
            store: self.store.clone(),
            generators: self.generators.clone(),
            fixtures: self.fixtures.clone(),
        }
    }
}

/// A set of mock routes registered against the shared router at startup.
pub trait MockService<S: StateStore>: Send + Sync {
    fn name(&self) -> &str;

    fn register(&self, router: Router<MockContext<S>>) -> Router<MockContext<S>>;
}
