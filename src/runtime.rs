//! Runtime abstraction layer for background work
//!
//! The only recurring task in this crate is the bearing animation. It is
//! spawned through an [`AsyncSpawner`] handed to the controller, and it waits
//! between ticks on the spawner's own timer, so hosts can plug in their own
//! executor instead of Tokio.

use futures::future::BoxFuture;
use std::sync::Arc;
use std::time::Duration;

use crate::Result;

/// A trait for spawning async tasks (object-safe version)
pub trait AsyncSpawner: Send + Sync + 'static {
    /// Spawn a future and return a handle to it. Fails with
    /// `MapError::Initialization` when the executor is unavailable.
    fn spawn_boxed(&self, future: BoxFuture<'static, ()>) -> Result<Box<dyn AsyncHandle>>;

    /// A future completing after `duration`, driven by this executor's timer.
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()>;
}

/// Handle to a spawned async task
pub trait AsyncHandle: Send + Sync {
    /// Check if the task is finished
    fn is_finished(&self) -> bool;

    /// Cancel the task. It will not be polled again.
    fn cancel(&self);
}

/// Convenience wrapper that boxes the future.
pub fn spawn_on<F>(spawner: &dyn AsyncSpawner, future: F) -> Result<Box<dyn AsyncHandle>>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    spawner.spawn_boxed(Box::pin(future))
}

/// Spawner used when the host does not supply one. Binds to the Tokio
/// runtime current at the call, if any.
pub fn default_spawner() -> Arc<dyn AsyncSpawner> {
    Arc::new(spawners::tokio_impl::TokioSpawner::new())
}

/// Default spawner implementations
pub mod spawners {
    use super::*;

    pub mod tokio_impl {
        use super::*;
        use crate::MapError;
        use ::tokio::runtime::Handle;
        use ::tokio::task::JoinHandle;

        /// Tokio-based async spawner.
        ///
        /// Spawns onto the runtime it was created in, or onto the one
        /// current at spawn time when it was created outside any.
        #[derive(Debug, Clone, Default)]
        pub struct TokioSpawner {
            handle: Option<Handle>,
        }

        impl TokioSpawner {
            pub fn new() -> Self {
                Self {
                    handle: Handle::try_current().ok(),
                }
            }

            /// Spawn onto `handle` from any thread.
            pub fn with_handle(handle: Handle) -> Self {
                Self {
                    handle: Some(handle),
                }
            }

            fn runtime(&self) -> Result<Handle> {
                match &self.handle {
                    Some(handle) => Ok(handle.clone()),
                    None => Handle::try_current().map_err(|_| {
                        MapError::Initialization(
                            "no Tokio runtime available for background tasks".into(),
                        )
                    }),
                }
            }
        }

        impl AsyncSpawner for TokioSpawner {
            fn spawn_boxed(&self, future: BoxFuture<'static, ()>) -> Result<Box<dyn AsyncHandle>> {
                let handle = self.runtime()?.spawn(future);
                Ok(Box::new(TokioHandle(handle)))
            }

            fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> {
                // The timer is registered on first poll, inside the runtime.
                Box::pin(async move { ::tokio::time::sleep(duration).await })
            }
        }

        struct TokioHandle(JoinHandle<()>);

        impl AsyncHandle for TokioHandle {
            fn is_finished(&self) -> bool {
                self.0.is_finished()
            }

            fn cancel(&self) {
                self.0.abort();
            }
        }
    }
}
