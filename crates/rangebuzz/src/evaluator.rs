//! Request-scoped concurrent evaluation of a validated [`Range`].
//!
//! Each integer in the range is classified by its own Tokio task. Tasks are
//! gated by a shared [`Semaphore`] so the number of simultaneously computing
//! elements never exceeds the configured cap, and each task checks the shared
//! [`Deadline`] right before computing. A task that finds the deadline expired
//! contributes nothing and its slot stays empty.
//!
//! Output order is fixed up front: the result vector is allocated to the exact
//! range length and every task owns exactly one index, so completion order
//! never affects the assembled body.

use crate::{Deadline, DEFAULT_TIMEOUT, Range, Result, classify};
use core::time::Duration;
use std::sync::Arc;
use tokio::{sync::Semaphore, task::JoinSet};
use tokio_util::sync::CancellationToken;

/// Default capacity of the concurrency permit pool.
pub const DEFAULT_MAX_CONCURRENCY: usize = 1000;

/// Tuning for a [`RangeEvaluator`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EvaluatorConfig {
    /// Capacity of the permit pool shared by all evaluations.
    pub max_concurrency: usize,
    /// Time budget of a single evaluation, measured from its start.
    pub timeout: Duration,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// The outcome of evaluating a validated range.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Evaluation {
    slots: Vec<String>,
    skipped: usize,
}

impl Evaluation {
    /// One entry per integer, in ascending order. Skipped elements are empty.
    pub fn slots(&self) -> &[String] {
        &self.slots
    }

    /// Number of elements left empty because the deadline had expired.
    pub const fn skipped(&self) -> usize {
        self.skipped
    }

    /// Returns `true` if every element was computed.
    pub const fn is_complete(&self) -> bool {
        self.skipped == 0
    }

    /// The slots joined by a single space, empty slots included.
    pub fn body(&self) -> String {
        self.slots.join(" ")
    }

    /// Consumes the evaluation and returns its body.
    pub fn into_body(self) -> String {
        self.body()
    }
}

/// Classifies validated ranges concurrently under a permit cap and deadline.
///
/// Cloning is cheap and clones share the same permit pool, so one evaluator
/// can be handed to every request a service handles.
#[derive(Clone, Debug)]
pub struct RangeEvaluator {
    permits: Arc<Semaphore>,
    timeout: Duration,
}

impl Default for RangeEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl RangeEvaluator {
    /// Creates an evaluator with [`EvaluatorConfig::default`].
    pub fn new() -> Self {
        Self::with_config(EvaluatorConfig::default())
    }

    /// Creates an evaluator with the given permit capacity and timeout.
    ///
    /// A `max_concurrency` of zero is raised to one so evaluations always make
    /// progress.
    pub fn with_config(config: EvaluatorConfig) -> Self {
        let capacity = config.max_concurrency.clamp(1, Semaphore::MAX_PERMITS);
        Self {
            permits: Arc::new(Semaphore::new(capacity)),
            timeout: config.timeout,
        }
    }

    /// Time budget applied to each evaluation.
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Permits currently free in the shared pool.
    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }

    /// Closes the permit pool.
    ///
    /// Tasks still waiting for a permit, and every task scheduled afterwards,
    /// skip their element. Used when the owning service is torn down.
    pub fn close(&self) {
        self.permits.close();
    }

    /// Returns `true` once [`RangeEvaluator::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.permits.is_closed()
    }

    /// Validates raw bounds and evaluates the range they describe.
    ///
    /// The deadline is derived from the evaluator's timeout and scoped as a
    /// child of `parent`, so cancelling `parent` also stops new elements from
    /// being computed.
    ///
    /// # Errors
    ///
    /// Returns a validation [`crate::Error`] before any task is scheduled if
    /// the bounds are not integers, are reversed, or span more than
    /// [`crate::MAX_RANGE_SIZE`] elements. Deadline expiry is not an error.
    pub async fn evaluate(
        &self,
        from_raw: &str,
        to_raw: &str,
        parent: &CancellationToken,
    ) -> Result<String> {
        let range = Range::parse(from_raw, to_raw)?;
        Ok(self.evaluate_range(range, parent).await.into_body())
    }

    /// Evaluates an already-validated range.
    ///
    /// Schedules one task per integer and waits for every task to finish,
    /// whether it computed its element or skipped it.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "debug", skip(self, parent), fields(len = range.len())))]
    pub async fn evaluate_range(&self, range: Range, parent: &CancellationToken) -> Evaluation {
        self.evaluate_with(range, parent, |n| async move { classify(n) }).await
    }

    async fn evaluate_with<F, Fut>(
        &self,
        range: Range,
        parent: &CancellationToken,
        compute: F,
    ) -> Evaluation
    where
        F: Fn(i64) -> Fut,
        Fut: Future<Output = String> + Send + 'static,
    {
        let deadline = Deadline::after(self.timeout, parent);
        // Tie the scope to this call: once every task has been joined, or if
        // the caller drops this future early, the scope is cancelled and any
        // task still queued behind the permit pool skips its element.
        let _scope_guard = deadline.scope().clone().drop_guard();

        let mut slots = vec![String::new(); range.len()];
        let mut tasks = JoinSet::new();

        for (index, n) in range.iter().enumerate() {
            let permits = Arc::clone(&self.permits);
            let deadline = deadline.clone();
            let element = compute(n);
            tasks.spawn(async move {
                let text = compute_element(&permits, &deadline, element).await;
                (index, text)
            });
        }

        let mut skipped = 0;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, Some(text))) => slots[index] = text,
                Ok((_, None)) => skipped += 1,
                Err(_e) => {
                    // The task panicked or was aborted; its slot stays empty.
                    #[cfg(feature = "tracing")]
                    tracing::warn!("Element task failed: {_e}");
                    skipped += 1;
                }
            }
        }

        #[cfg(feature = "tracing")]
        {
            if skipped > 0 {
                tracing::debug!(
                    "Deadline expired for {skipped} of {} elements in {}..={}",
                    range.len(),
                    range.from(),
                    range.to()
                );
            }
        }

        Evaluation { slots, skipped }
    }
}

/// Computes one element under the permit pool and deadline.
///
/// Returns `None` if the pool was closed or the deadline had expired by the
/// time a permit was obtained. `element` is not polled in that case, and once
/// started it runs to completion even if the deadline passes meanwhile. The
/// permit is released when this function returns, on every path.
async fn compute_element<Fut>(
    permits: &Semaphore,
    deadline: &Deadline,
    element: Fut,
) -> Option<String>
where
    Fut: Future<Output = String>,
{
    let _permit = permits.acquire().await.ok()?;
    if deadline.is_expired() {
        return None;
    }
    Some(element.await)
}
