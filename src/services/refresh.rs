//! Recommendation refresh controller
//!
//! Every trigger starts a refresh cycle tagged with a generation number. A
//! cycle walks `Attempting(k) -> Ready | Backoff(k+1) -> Attempting(k+1) | Failed`
//! and every state write it makes is a compare-and-apply against the current
//! generation, so a superseded cycle can finish its in-flight call but never
//! touches shared state again. Last trigger wins, not last response.

use std::{sync::Arc, time::Duration};

use serde::Serialize;
use tokio::sync::watch;
use tracing::Instrument;

use crate::{
    config::Config,
    models::{RatingsSnapshot, RecommendationSet},
    services::providers::RecommendationApi,
};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(5000);

/// Bounded exponential backoff for a refresh cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.refresh_max_attempts,
            Duration::from_millis(config.refresh_base_delay_ms),
        )
    }

    /// Wait before `attempt` (1-based): nothing for the first attempt, then
    /// `base * 2^(attempt - 2)`.
    pub fn delay_before(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            return Duration::ZERO;
        }
        let factor = 1u32.checked_shl(attempt - 2).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }
}

/// Where the current refresh cycle stands
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RefreshPhase {
    Idle,
    Attempting { attempt: u32 },
    Backoff { next_attempt: u32, delay_ms: u64 },
    Ready,
    Failed,
}

impl RefreshPhase {
    /// True once no cycle is attempting or waiting
    pub fn is_settled(&self) -> bool {
        matches!(
            self,
            RefreshPhase::Idle | RefreshPhase::Ready | RefreshPhase::Failed
        )
    }
}

/// Observable controller state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefreshState {
    /// Generation of the most recent trigger
    pub generation: u64,
    pub phase: RefreshPhase,
    pub recommendations: RecommendationSet,
    /// User-facing message set when a cycle exhausts its attempts; cleared
    /// when the next cycle starts
    pub error: Option<String>,
}

impl Default for RefreshState {
    fn default() -> Self {
        Self {
            generation: 0,
            phase: RefreshPhase::Idle,
            recommendations: Vec::new(),
            error: None,
        }
    }
}

/// Coordinates recommendation refreshes after rating events
#[derive(Clone)]
pub struct RefreshController {
    api: Arc<dyn RecommendationApi>,
    policy: RetryPolicy,
    state: Arc<watch::Sender<RefreshState>>,
}

impl RefreshController {
    pub fn new(api: Arc<dyn RecommendationApi>, policy: RetryPolicy) -> Self {
        let (state, _) = watch::channel(RefreshState::default());
        Self {
            api,
            policy,
            state: Arc::new(state),
        }
    }

    /// Current state
    pub fn state(&self) -> RefreshState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every applied state transition
    pub fn subscribe(&self) -> watch::Receiver<RefreshState> {
        self.state.subscribe()
    }

    /// Starts a refresh cycle for `snapshot`, superseding any cycle still in
    /// flight. Returns the new cycle's generation.
    ///
    /// An empty snapshot resolves immediately to an empty set without calling
    /// the API. Otherwise the cycle runs on a spawned task, so this must be
    /// called from within a tokio runtime.
    pub fn trigger(&self, snapshot: RatingsSnapshot) -> u64 {
        let empty = snapshot.is_empty();
        let mut generation = 0;

        self.state.send_modify(|state| {
            state.generation += 1;
            generation = state.generation;
            if empty {
                state.phase = RefreshPhase::Ready;
                state.recommendations.clear();
                state.error = None;
            } else {
                state.phase = RefreshPhase::Attempting { attempt: 1 };
                state.error = None;
            }
        });

        if empty {
            tracing::info!(generation, "Empty ratings snapshot, skipping recommendation fetch");
            return generation;
        }

        let span = tracing::info_span!("refresh_cycle", generation, rated = snapshot.len());
        let cycle = RefreshCycle {
            generation,
            snapshot,
            api: Arc::clone(&self.api),
            policy: self.policy,
            state: Arc::clone(&self.state),
        };
        tokio::spawn(cycle.run().instrument(span));

        generation
    }
}

/// One logical refresh: a snapshot plus its retries
struct RefreshCycle {
    generation: u64,
    snapshot: RatingsSnapshot,
    api: Arc<dyn RecommendationApi>,
    policy: RetryPolicy,
    state: Arc<watch::Sender<RefreshState>>,
}

impl RefreshCycle {
    async fn run(self) {
        let mut attempt = 1;

        loop {
            if !self.is_current() {
                tracing::debug!(attempt, "Cycle superseded before attempt");
                return;
            }

            match self.api.get_recommendations(&self.snapshot).await {
                Ok(books) => {
                    let count = books.len();
                    let applied = self.apply(|state| {
                        state.phase = RefreshPhase::Ready;
                        state.recommendations = books;
                        state.error = None;
                    });
                    if applied {
                        tracing::info!(attempt, count, "Recommendations refreshed");
                    } else {
                        tracing::debug!(attempt, "Discarding result of superseded cycle");
                    }
                    return;
                }
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "Recommendation attempt failed");

                    if attempt >= self.policy.max_attempts {
                        let message = format!(
                            "Could not load recommendations after {} attempts: {}",
                            attempt, e
                        );
                        if self.apply(|state| {
                            state.phase = RefreshPhase::Failed;
                            state.recommendations.clear();
                            state.error = Some(message);
                        }) {
                            tracing::error!(attempts = attempt, "Recommendation refresh failed");
                        }
                        return;
                    }

                    let next_attempt = attempt + 1;
                    let delay = self.policy.delay_before(next_attempt);
                    let waiting = self.apply(|state| {
                        state.phase = RefreshPhase::Backoff {
                            next_attempt,
                            delay_ms: u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        };
                    });
                    if !waiting {
                        tracing::debug!(attempt, "Cycle superseded, abandoning retries");
                        return;
                    }

                    tokio::time::sleep(delay).await;

                    attempt = next_attempt;
                    if !self.apply(|state| state.phase = RefreshPhase::Attempting { attempt }) {
                        tracing::debug!(attempt, "Cycle superseded during backoff");
                        return;
                    }
                }
            }
        }
    }

    fn is_current(&self) -> bool {
        self.state.borrow().generation == self.generation
    }

    /// Applies `update` only if this cycle is still the latest one
    fn apply(&self, update: impl FnOnce(&mut RefreshState)) -> bool {
        let generation = self.generation;
        self.state.send_if_modified(|state| {
            if state.generation != generation {
                return false;
            }
            update(state);
            true
        })
    }
}
