use core::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Default time budget of a single evaluation.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// A per-request expiration point shared read-only by every element task.
///
/// A deadline expires either when its instant passes or when its scope token
/// is cancelled. The scope is a child of the caller's token, so cancelling the
/// caller (e.g. a client disconnect or a forced shutdown) also expires the
/// deadline, while cancelling the scope never reaches back to the caller.
///
/// Uses [`tokio::time::Instant`] so paused-clock tests can drive expiry.
#[derive(Clone, Debug)]
pub struct Deadline {
    at: Instant,
    scope: CancellationToken,
}

impl Deadline {
    /// Creates a deadline `timeout` from now, scoped under `parent`.
    pub fn after(timeout: Duration, parent: &CancellationToken) -> Self {
        Self {
            at: Instant::now() + timeout,
            scope: parent.child_token(),
        }
    }

    /// The instant at which this deadline expires.
    pub const fn instant(&self) -> Instant {
        self.at
    }

    /// The scope token. Cancelled when the caller cancels or when the owning
    /// evaluation finishes.
    pub const fn scope(&self) -> &CancellationToken {
        &self.scope
    }

    /// Returns `true` once the instant has passed or the scope was cancelled.
    pub fn is_expired(&self) -> bool {
        self.scope.is_cancelled() || Instant::now() >= self.at
    }

    /// Time left before expiry, or zero if already expired.
    pub fn remaining(&self) -> Duration {
        if self.scope.is_cancelled() {
            return Duration::ZERO;
        }
        self.at.saturating_duration_since(Instant::now())
    }
}
