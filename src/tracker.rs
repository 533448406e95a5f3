//! Latest-location-wins fetch sequencing.
//!
//! Every location change bumps a generation counter and aborts the fetch
//! still in flight. A finished fetch only publishes while its generation is
//! current, so a slow response for an old position can never overwrite the
//! state of a newer one.

use parking_lot::Mutex;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::WindError;
use crate::models::{Coordinates, Observation};
use crate::upstream::OpenWeatherClient;

pub const DISPLAY_FETCH_FAILED_MESSAGE: &str = "Failed to fetch wind data. Please try again later.";

/// Anything that can turn a position into a wind observation
pub trait ObservationSource: Send + Sync + 'static {
    fn observe(
        &self,
        at: Coordinates,
    ) -> impl Future<Output = Result<Observation, WindError>> + Send;
}

impl ObservationSource for OpenWeatherClient {
    fn observe(
        &self,
        at: Coordinates,
    ) -> impl Future<Output = Result<Observation, WindError>> + Send {
        self.fetch_observation(at)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WindState {
    Locating,
    Loading(Coordinates),
    Ready {
        at: Coordinates,
        observation: Observation,
    },
    Failed {
        at: Coordinates,
        message: String,
    },
}

pub struct LocationTracker<S> {
    source: Arc<S>,
    generation: Arc<AtomicU64>,
    inflight: Mutex<Option<JoinHandle<()>>>,
    state: Arc<watch::Sender<WindState>>,
}

impl<S: ObservationSource> LocationTracker<S> {
    pub fn new(source: S) -> Self {
        let (state, _) = watch::channel(WindState::Locating);
        Self {
            source: Arc::new(source),
            generation: Arc::new(AtomicU64::new(0)),
            inflight: Mutex::new(None),
            state: Arc::new(state),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<WindState> {
        self.state.subscribe()
    }

    pub fn current(&self) -> WindState {
        self.state.borrow().clone()
    }

    /// Starts a fetch for `at`, superseding any earlier one.
    /// Must be called from within a tokio runtime.
    pub fn update_location(&self, at: Coordinates) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        if let Some(previous) = self.inflight.lock().take() {
            previous.abort();
        }
        self.state.send_replace(WindState::Loading(at));

        let source = Arc::clone(&self.source);
        let state = Arc::clone(&self.state);
        let current = Arc::clone(&self.generation);

        let handle = tokio::spawn(async move {
            let next = match source.observe(at).await {
                Ok(observation) => WindState::Ready { at, observation },
                Err(e) => {
                    tracing::warn!("Error fetching wind data: {}", e);
                    WindState::Failed {
                        at,
                        message: DISPLAY_FETCH_FAILED_MESSAGE.to_string(),
                    }
                }
            };

            // Checked under the channel lock so a concurrent location change
            // either sees our write or makes us drop it
            let published = state.send_if_modified(|displayed| {
                if current.load(Ordering::SeqCst) == generation {
                    *displayed = next;
                    true
                } else {
                    false
                }
            });
            if !published {
                tracing::debug!("Dropping stale wind data for generation {}", generation);
            }
        });

        *self.inflight.lock() = Some(handle);
        generation
    }
}

impl<S> Drop for LocationTracker<S> {
    fn drop(&mut self) {
        if let Some(handle) = self.inflight.lock().take() {
            handle.abort();
        }
    }
}
