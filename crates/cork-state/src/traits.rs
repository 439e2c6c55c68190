use std::future::Future;

use cork_types::{ControlOp, CorkError, DataOp, StateEntry, StateOp, StateOutcome};

/// Shared key/value state that mock handlers read and test drivers write.
///
/// Methods use RPITIT (`-> impl Future + Send`) so callers can hold the
/// store behind an `Arc` and `.await` from any task without `async-trait`.
///
/// Lookups are soft: a key that was never written reads as the empty string.
/// The only error a lookup can produce is [`CorkError::Stopped`], after the
/// store has been told to stop.
pub trait StateStore: Send + Sync + 'static {
    /// Return the value stored under `key`, or `""` if absent.
    ///
    /// An empty `key` returns every entry rendered as `key=value` lines joined
    /// by `\n` with no trailing newline, taken from a single consistent
    /// snapshot.
    fn get(&self, key: &str) -> impl Future<Output = Result<String, CorkError>> + Send;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// An empty `key` is stored under [`cork_types::DEFAULT_KEY`]. Returns the
    /// pair that was actually stored.
    fn set(&self, key: &str, value: String)
        -> impl Future<Output = Result<StateEntry, CorkError>> + Send;

    /// Atomically drop every entry.
    fn reset(&self) -> impl Future<Output = Result<(), CorkError>> + Send;

    /// Terminate the store. Every later call fails with [`CorkError::Stopped`].
    fn stop(&self) -> impl Future<Output = Result<(), CorkError>> + Send;

    /// Consistent copy of all entries in key order.
    fn snapshot(&self) -> impl Future<Output = Result<Vec<StateEntry>, CorkError>> + Send;

    /// Number of stored entries.
    fn len(&self) -> impl Future<Output = Result<usize, CorkError>> + Send;

    /// Apply a classified write.
    fn apply(&self, op: StateOp) -> impl Future<Output = Result<StateOutcome, CorkError>> + Send {
        async move {
            match op {
                StateOp::Control(ControlOp::Reset) => {
                    self.reset().await?;
                    Ok(StateOutcome::Reset)
                }
                StateOp::Control(ControlOp::Stop) => {
                    self.stop().await?;
                    Ok(StateOutcome::Stopped)
                }
                StateOp::Data(DataOp::Write { key, value }) => {
                    self.set(&key, value).await.map(StateOutcome::Stored)
                }
            }
        }
    }
}
