//! Rolling request budget
//!
//! One [`RequestBudget`] is shared (behind an `Arc`) by every path that talks
//! to Canvas. Admission goes through two `governor` limiters: the ceiling
//! (a bucket of `limit` requests refilling over the window) and optional
//! pacing (one request per `min_interval`). A ledger of issued instants backs
//! the observable counters.

use crate::config::{ExhaustionMode, RateLimitConfig};
use crate::domain::CanvasError;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use std::collections::VecDeque;
use std::fmt;
use std::num::NonZeroU32;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;

type DirectLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Behaviour once the window is full
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExhaustionPolicy {
    /// Wait for the bucket to refill, but never longer than `max_wait`
    Wait { max_wait: Duration },
    /// Refuse immediately
    Fail,
}

struct Limiters {
    ceiling: DirectLimiter,
    pacing: Option<DirectLimiter>,
}

impl Limiters {
    fn new(limit: usize, window: Duration, min_interval: Duration) -> Self {
        Self {
            ceiling: DirectLimiter::direct(ceiling_quota(limit, window)),
            pacing: Quota::with_period(min_interval).map(DirectLimiter::direct),
        }
    }
}

/// `limit` back-to-back requests, refilled evenly across `window`
fn ceiling_quota(limit: usize, window: Duration) -> Quota {
    let burst = u32::try_from(limit)
        .ok()
        .and_then(NonZeroU32::new)
        .unwrap_or(NonZeroU32::MIN);
    Quota::with_period(window / burst.get())
        .map(|quota| quota.allow_burst(burst))
        .unwrap_or_else(|| Quota::per_hour(burst))
}

#[derive(Debug, Default)]
struct Ledger {
    issued: VecDeque<Instant>,
    total_issued: u64,
    low_budget_warned: bool,
}

impl Ledger {
    fn prune(&mut self, now: Instant, window: Duration) {
        while let Some(front) = self.issued.front() {
            if now.saturating_duration_since(*front) >= window {
                self.issued.pop_front();
            } else {
                break;
            }
        }
    }
}

/// Request ceiling with pacing and a rolling-window counter
pub struct RequestBudget {
    limit: usize,
    window: Duration,
    min_interval: Duration,
    policy: ExhaustionPolicy,
    limiters: Mutex<Arc<Limiters>>,
    ledger: Mutex<Ledger>,
}

impl fmt::Debug for RequestBudget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestBudget")
            .field("limit", &self.limit)
            .field("window", &self.window)
            .field("min_interval", &self.min_interval)
            .field("policy", &self.policy)
            .field("in_window", &self.in_window())
            .finish_non_exhaustive()
    }
}

impl RequestBudget {
    /// Budget of `limit` requests per `window`, no pacing, waiting up to five minutes
    pub fn new(limit: usize, window: Duration) -> Self {
        let limit = limit.max(1);
        Self {
            limit,
            window,
            min_interval: Duration::ZERO,
            policy: ExhaustionPolicy::Wait {
                max_wait: Duration::from_secs(300),
            },
            limiters: Mutex::new(Arc::new(Limiters::new(limit, window, Duration::ZERO))),
            ledger: Mutex::new(Ledger::default()),
        }
    }

    pub fn per_hour(limit: usize) -> Self {
        Self::new(limit, Duration::from_secs(3600))
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        let policy = match config.on_exhausted {
            ExhaustionMode::Wait => ExhaustionPolicy::Wait {
                max_wait: config.max_wait(),
            },
            ExhaustionMode::Fail => ExhaustionPolicy::Fail,
        };

        Self::new(config.requests_per_hour, config.window())
            .with_min_interval(config.min_interval())
            .with_policy(policy)
    }

    pub fn with_min_interval(mut self, min_interval: Duration) -> Self {
        self.min_interval = min_interval;
        self.limiters = Mutex::new(Arc::new(Limiters::new(self.limit, self.window, min_interval)));
        self
    }

    pub fn with_policy(mut self, policy: ExhaustionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn policy(&self) -> ExhaustionPolicy {
        self.policy
    }

    fn ledger(&self) -> MutexGuard<'_, Ledger> {
        self.ledger
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn limiters(&self) -> Arc<Limiters> {
        let guard = self
            .limiters
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&guard)
    }

    fn exhausted(&self) -> CanvasError {
        CanvasError::BudgetExhausted {
            used: self.in_window(),
            limit: self.limit,
        }
    }

    /// Reserves one request, waiting for pacing or a refill as needed
    ///
    /// # Errors
    ///
    /// [`CanvasError::BudgetExhausted`] when the ceiling is reached and the
    /// policy is `Fail`, or when the refill takes longer than `max_wait`.
    pub async fn acquire(&self) -> Result<(), CanvasError> {
        let limiters = self.limiters();

        if limiters.ceiling.check().is_err() {
            match self.policy {
                ExhaustionPolicy::Fail => return Err(self.exhausted()),
                ExhaustionPolicy::Wait { max_wait } => {
                    tracing::warn!(
                        limit = self.limit,
                        max_wait_ms = max_wait.as_millis() as u64,
                        "Request budget exhausted, waiting for it to refill"
                    );
                    tokio::time::timeout(max_wait, limiters.ceiling.until_ready())
                        .await
                        .map_err(|_| self.exhausted())?;
                }
            }
        }

        if let Some(pacing) = &limiters.pacing {
            pacing.until_ready().await;
        }

        self.record();
        Ok(())
    }

    fn record(&self) {
        let now = Instant::now();
        let mut ledger = self.ledger();
        ledger.prune(now, self.window);
        ledger.issued.push_back(now);
        ledger.total_issued += 1;

        let remaining = self.limit.saturating_sub(ledger.issued.len());
        if remaining * 10 < self.limit {
            if !ledger.low_budget_warned {
                ledger.low_budget_warned = true;
                tracing::warn!(
                    remaining,
                    limit = self.limit,
                    "Less than 10% of the request budget remains"
                );
            }
        } else {
            ledger.low_budget_warned = false;
        }
    }

    /// Requests inside the current window
    pub fn in_window(&self) -> usize {
        let mut ledger = self.ledger();
        ledger.prune(Instant::now(), self.window);
        ledger.issued.len()
    }

    pub fn remaining(&self) -> usize {
        self.limit.saturating_sub(self.in_window())
    }

    /// Requests issued since creation or the last reset
    pub fn total_issued(&self) -> u64 {
        self.ledger().total_issued
    }

    /// Forgets every issued request and refills the limiters
    pub fn reset(&self) {
        let fresh = Arc::new(Limiters::new(self.limit, self.window, self.min_interval));
        *self
            .limiters
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = fresh;
        *self.ledger() = Ledger::default();
    }
}
