//! HTTP service implementation for range FizzBuzz evaluation.
//!
//! This module defines [`RangeService`], the explicit service object that owns
//! the shared [`RangeEvaluator`] and the shutdown state of the process. It is
//! constructed once at startup, cloned into every request through axum state,
//! and torn down through [`RangeService::shutdown`] and, if the grace period
//! runs out, [`RangeService::abort`].
//!
//! ## Routes
//!
//! - `GET /range-fizzbuzz?from=<int>&to=<int>` - classifies the inclusive
//!   range and answers with the space-joined result, or `400` with the
//!   validation message.
//! - `GET /health` - `SERVING` until shutdown starts, then `503 NOT_SERVING`.
//!
//! ## Cancellation
//!
//! Every evaluation runs under a deadline scoped as a child of the service's
//! abort token, so a forced shutdown stops new element computations in every
//! in-flight request. A client disconnect drops the handler future, which
//! cancels that request's scope and aborts its remaining tasks.

use crate::server::{
    config::ServerConfig,
    error::ApiError,
    telemetry::{
        decrement_requests_inflight, increment_rejected_requests, increment_requests,
        increment_requests_inflight, increment_skipped_elements, record_elements_per_request,
        record_request_duration,
    },
};
use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    routing::get,
};
use portable_atomic::{AtomicUsize, Ordering};
use rangebuzz::{Range, RangeEvaluator};
use std::{sync::Arc, time::Instant};
use tokio_util::sync::CancellationToken;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};

/// Raw query parameters of a range request.
///
/// Both bounds are kept as text so that validation, not extraction, decides
/// how malformed or missing values are reported. A missing bound is treated
/// as an empty string and rejected as not being an integer. When a bound is
/// repeated the first occurrence wins and unknown keys are ignored.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RangeParams {
    pub from: Option<String>,
    pub to: Option<String>,
}

impl FromIterator<(String, String)> for RangeParams {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(pairs: I) -> Self {
        let mut params = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "from" => &mut params.from,
                "to" => &mut params.to,
                _ => continue,
            };
            slot.get_or_insert(value);
        }
        params
    }
}

/// The process-wide service object.
///
/// Cloning is cheap; all clones share the evaluator, the in-flight counter and
/// the shutdown tokens.
#[derive(Clone)]
pub struct RangeService {
    inner: Arc<Inner>,
}

struct Inner {
    config: ServerConfig,
    evaluator: RangeEvaluator,
    /// Cancelled when shutdown begins; stops the listener from accepting.
    shutdown_token: CancellationToken,
    /// Cancelled when the grace period expires; parent of every request scope.
    abort_token: CancellationToken,
    inflight: AtomicUsize,
}

impl RangeService {
    pub fn new(config: ServerConfig) -> Self {
        let evaluator = RangeEvaluator::with_config(config.evaluator());
        Self {
            inner: Arc::new(Inner {
                config,
                evaluator,
                shutdown_token: CancellationToken::new(),
                abort_token: CancellationToken::new(),
                inflight: AtomicUsize::new(0),
            }),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Builds the axum router serving this service.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/range-fizzbuzz", get(range_fizzbuzz))
            .route("/health", get(health))
            .layer(
                ServiceBuilder::new().layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
            )
            .with_state(self.clone())
    }

    /// Token cancelled once shutdown begins. Hand it to the listener's
    /// graceful shutdown so it stops accepting new connections.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.inner.shutdown_token.clone()
    }

    pub fn is_shutting_down(&self) -> bool {
        self.inner.shutdown_token.is_cancelled()
    }

    /// Number of range evaluations currently running.
    pub fn inflight(&self) -> usize {
        self.inner.inflight.load(Ordering::Acquire)
    }

    /// Begins a graceful shutdown.
    ///
    /// Health turns `NOT_SERVING`, new range requests are refused with `503`
    /// and the listener stops accepting connections. Requests already being
    /// evaluated keep running.
    pub fn shutdown(&self) {
        tracing::info!("Refusing new requests ({} in flight)", self.inflight());
        self.inner.shutdown_token.cancel();
    }

    /// Cancels all remaining work.
    ///
    /// Called when the grace period expires: in-flight evaluations stop
    /// computing new elements and the permit pool is closed.
    pub fn abort(&self) {
        tracing::warn!(
            "Cancelling remaining work ({} requests still in flight)",
            self.inflight()
        );
        self.inner.shutdown_token.cancel();
        self.inner.abort_token.cancel();
        self.inner.evaluator.close();
    }

    /// Validates and evaluates one range request, logging the raw inputs, the
    /// outcome and the latency.
    ///
    /// # Errors
    ///
    /// - [`ApiError::ServiceShutdown`] if shutdown has begun.
    /// - [`ApiError::InvalidRange`] if validation fails.
    #[tracing::instrument(name = "range_fizzbuzz", skip_all)]
    pub async fn range_fizzbuzz(&self, from_raw: &str, to_raw: &str) -> Result<String, ApiError> {
        let start = Instant::now();
        let outcome = self.evaluate(from_raw, to_raw).await;
        let latency = start.elapsed();

        match &outcome {
            Ok(body) => tracing::info!(
                from = from_raw,
                to = to_raw,
                response = %body,
                ?latency,
                "Request served"
            ),
            Err(err) => tracing::info!(
                from = from_raw,
                to = to_raw,
                response = %err,
                ?latency,
                "Request rejected"
            ),
        }
        record_request_duration(latency.as_secs_f64() * 1000.0);

        outcome
    }

    async fn evaluate(&self, from_raw: &str, to_raw: &str) -> Result<String, ApiError> {
        if self.is_shutting_down() {
            return Err(ApiError::ServiceShutdown);
        }
        increment_requests();

        let range =
            Range::parse(from_raw, to_raw).inspect_err(|_| increment_rejected_requests())?;
        record_elements_per_request(range.len() as f64);

        let _inflight = InflightGuard::new(&self.inner.inflight);
        let evaluation = self
            .inner
            .evaluator
            .evaluate_range(range, &self.inner.abort_token)
            .await;

        if !evaluation.is_complete() {
            increment_skipped_elements(evaluation.skipped() as u64);
            tracing::warn!(
                "Deadline of {:?} expired with {} of {} elements skipped",
                self.inner.evaluator.timeout(),
                evaluation.skipped(),
                range.len()
            );
        }

        Ok(evaluation.into_body())
    }
}

/// Tracks one running evaluation in the service's in-flight counter.
struct InflightGuard<'a> {
    counter: &'a AtomicUsize,
}

impl<'a> InflightGuard<'a> {
    fn new(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::AcqRel);
        increment_requests_inflight();
        Self { counter }
    }
}

impl Drop for InflightGuard<'_> {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::AcqRel);
        decrement_requests_inflight();
    }
}

async fn range_fizzbuzz(
    State(service): State<RangeService>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<String, ApiError> {
    let params: RangeParams = pairs.into_iter().collect();
    let from = params.from.unwrap_or_default();
    let to = params.to.unwrap_or_default();
    service.range_fizzbuzz(&from, &to).await
}

async fn health(State(service): State<RangeService>) -> (StatusCode, &'static str) {
    if service.is_shutting_down() {
        (StatusCode::SERVICE_UNAVAILABLE, "NOT_SERVING")
    } else {
        (StatusCode::OK, "SERVING")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{Body, to_bytes},
        http::{Request, header},
    };
    use core::time::Duration;
    use tower::ServiceExt;

    async fn get(service: &RangeService, uri: &str) -> (StatusCode, String) {
        let response = service
            .router()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    fn service() -> RangeService {
        RangeService::new(ServerConfig::default())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn serves_one_to_fifteen() {
        let (status, body) = get(&service(), "/range-fizzbuzz?from=1&to=15").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            "1 2 Fizz 4 Buzz Fizz 7 8 Fizz Buzz 11 Fizz 13 14 FizzBuzz"
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn serves_plain_text() {
        let response = service()
            .router()
            .oneshot(
                Request::builder()
                    .uri("/range-fizzbuzz?from=5&to=5")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let content_type = response.headers().get(header::CONTENT_TYPE).unwrap();
        assert!(content_type.to_str().unwrap().starts_with("text/plain"));
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"Buzz");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn negative_ranges() {
        let (status, body) = get(&service(), "/range-fizzbuzz?from=-5&to=-1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "Buzz -4 Fizz -2 -1");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn rejects_invalid_ranges_with_distinct_messages() {
        let service = service();
        let cases = [
            ("/range-fizzbuzz?from=10&to=3", rangebuzz::Error::FromGreaterThanTo),
            ("/range-fizzbuzz?from=1&to=102", rangebuzz::Error::RangeTooLarge),
            ("/range-fizzbuzz?from=1&to=101", rangebuzz::Error::RangeTooLarge),
            ("/range-fizzbuzz?from=x&to=5", rangebuzz::Error::NotAnInteger),
            ("/range-fizzbuzz?to=5", rangebuzz::Error::NotAnInteger),
            ("/range-fizzbuzz", rangebuzz::Error::NotAnInteger),
        ];

        for (uri, expected) in cases {
            let (status, body) = get(&service, uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(body, expected.to_string(), "{uri}");
        }
        assert_eq!(service.inflight(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn repeated_params_keep_first_value() {
        let service = service();
        for uri in [
            "/range-fizzbuzz?from=1&from=2&to=3",
            "/range-fizzbuzz?from=1&to=3&to=99",
            "/range-fizzbuzz?to=3&from=1&from=x",
            "/range-fizzbuzz?from=1&to=3&extra=z",
        ] {
            let (status, body) = get(&service, uri).await;
            assert_eq!(status, StatusCode::OK, "{uri}");
            assert_eq!(body, "1 2 Fizz", "{uri}");
        }

        // An invalid first value is not rescued by a later valid one.
        let (status, body) = get(&service, "/range-fizzbuzz?from=x&from=1&to=3").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, rangebuzz::Error::NotAnInteger.to_string());
    }

    #[test]
    fn params_from_pairs() {
        let pair = |k: &str, v: &str| (k.to_owned(), v.to_owned());
        let params: RangeParams = [pair("to", "7"), pair("x", ""), pair("to", "8")]
            .into_iter()
            .collect();
        assert_eq!(
            params,
            RangeParams {
                from: None,
                to: Some("7".into()),
            }
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn accepts_exactly_one_hundred() {
        let (status, body) = get(&service(), "/range-fizzbuzz?from=1&to=100").await;
        assert_eq!(status, StatusCode::OK);
        let tokens: Vec<&str> = body.split(' ').collect();
        assert_eq!(tokens.len(), 100);
        assert_eq!(tokens[99], "Buzz");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn health_flips_on_shutdown() {
        let service = service();
        assert_eq!(get(&service, "/health").await, (StatusCode::OK, "SERVING".into()));

        service.shutdown();
        assert!(service.shutdown_token().is_cancelled());
        assert_eq!(
            get(&service, "/health").await,
            (StatusCode::SERVICE_UNAVAILABLE, "NOT_SERVING".into())
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn refuses_range_requests_after_shutdown() {
        let service = service();
        service.shutdown();
        let (status, body) = get(&service, "/range-fizzbuzz?from=1&to=3").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body, ApiError::ServiceShutdown.to_string());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn aborted_service_refuses_requests() {
        let service = service();
        service.abort();
        // Shutdown has begun, so requests are refused before evaluation.
        assert_eq!(
            service.range_fizzbuzz("1", "3").await,
            Err(ApiError::ServiceShutdown)
        );
        assert_eq!(service.inflight(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn expired_deadline_degrades_to_empty_slots() {
        let config = ServerConfig {
            request_timeout: Duration::ZERO,
            ..ServerConfig::default()
        };
        let (status, body) = get(&RangeService::new(config), "/range-fizzbuzz?from=1&to=4").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "   ");
    }
}
