//! HTTP front end for the address pool.
//!
//! [`LeaseService`] owns the shared [`LockLeasePool`] and the clock. Every
//! request handler gets a clone of it; clones share one pool, and the pool's
//! own lock makes each acquisition atomic.
//!
//! ## Routes
//!
//! - `GET /get_slaves?amount=N&duration=S` leases `N` addresses for `S`
//!   seconds. The body is `{"slaves": [...]}` on success, or
//!   `{"slaves": [], "come_back": T}` when the client should retry in `T`
//!   seconds.
//! - Any other path answers `404` with a plain-text error.

use crate::server::{
    config::ServerConfig,
    error::{Error, Result},
    service::params::LeaseParams,
    telemetry::{increment_requests, record_deferred, record_granted, record_invalid},
};
use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    http::Uri,
    routing::get,
};
use leasepool::{Decision, LeaseAllocator, LockLeasePool, SystemClock, TimeSource};
use serde::Serialize;
use std::{net::Ipv4Addr, sync::Arc};
use tower_http::trace::TraceLayer;

/// Response body of `GET /get_slaves`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlavesResponse {
    pub slaves: Vec<Ipv4Addr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub come_back: Option<u64>,
}

#[derive(Clone)]
pub struct LeaseService {
    pool: LockLeasePool<Ipv4Addr>,
    clock: Arc<dyn TimeSource + Send + Sync>,
    max_lease_secs: Option<u64>,
}

impl LeaseService {
    /// Creates a service over `config.pool`, reading time from the system
    /// clock.
    pub fn new(config: &ServerConfig) -> anyhow::Result<Self> {
        Self::with_clock(config, SystemClock)
    }

    /// Creates a service reading time from `clock`.
    pub fn with_clock(
        config: &ServerConfig,
        clock: impl TimeSource + Send + Sync + 'static,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            pool: LockLeasePool::new(config.pool.iter().copied())?,
            clock: Arc::new(clock),
            max_lease_secs: config.max_lease_secs,
        })
    }

    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }

    /// Validates `params` and asks the pool for a lease.
    pub fn lease(&self, params: &LeaseParams) -> Result<SlavesResponse> {
        let request = params.validate(self.pool.capacity(), self.max_lease_secs)?;
        let now = self.clock.current_millis();

        match self.pool.acquire(request.amount, request.duration, now) {
            Decision::Granted { identifiers } => {
                record_granted(identifiers.len());
                tracing::debug!(
                    amount = request.amount,
                    duration = request.duration.as_secs(),
                    "leased {identifiers:?}"
                );
                Ok(SlavesResponse {
                    slaves: identifiers,
                    come_back: None,
                })
            }
            Decision::Deferred { come_back_in } => {
                record_deferred();
                tracing::debug!(amount = request.amount, come_back_in, "deferred");
                Ok(SlavesResponse {
                    slaves: Vec::new(),
                    come_back: Some(come_back_in),
                })
            }
            Decision::InvalidRequest { reason } => Err(Error::InvalidRequest { reason }),
        }
    }
}

/// Builds the application router.
pub fn router(service: LeaseService) -> Router {
    Router::new()
        .route("/get_slaves", get(get_slaves))
        .fallback(malformed_url)
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

async fn get_slaves(
    State(service): State<LeaseService>,
    query: core::result::Result<Query<LeaseParams>, QueryRejection>,
) -> Result<Json<SlavesResponse>> {
    increment_requests();

    let result = query
        .map_err(|rejection| Error::invalid(rejection.body_text()))
        .and_then(|Query(params)| service.lease(&params));

    if result.is_err() {
        record_invalid();
    }
    result.map(Json)
}

async fn malformed_url(uri: Uri) -> Error {
    Error::MalformedUrl {
        path: uri.path().to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::error::{INVALID_REQUEST_BODY, MALFORMED_URL_BODY};
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode},
    };
    use leasepool::ipv4_range;
    use std::sync::atomic::{AtomicU64, Ordering};
    use tower::ServiceExt;

    const T0: u64 = 1_735_689_600_000;

    #[derive(Clone)]
    struct ManualClock(Arc<AtomicU64>);

    impl ManualClock {
        fn new(millis: u64) -> Self {
            Self(Arc::new(AtomicU64::new(millis)))
        }

        fn advance_secs(&self, secs: u64) {
            self.0.fetch_add(secs * 1_000, Ordering::Relaxed);
        }
    }

    impl TimeSource for ManualClock {
        fn current_millis(&self) -> u64 {
            self.0.load(Ordering::Relaxed)
        }
    }

    fn config(size: usize) -> ServerConfig {
        ServerConfig {
            server_addr: String::from("127.0.0.1:0"),
            pool: ipv4_range(Ipv4Addr::new(192, 168, 0, 101), size).unwrap(),
            max_lease_secs: None,
        }
    }

    fn app(size: usize, clock: &ManualClock) -> Router {
        router(LeaseService::with_clock(&config(size), clock.clone()).unwrap())
    }

    async fn fetch(app: &Router, uri: &str) -> (StatusCode, String) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    async fn get_json(app: &Router, uri: &str) -> serde_json::Value {
        let (status, body) = fetch(app, uri).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        serde_json::from_str(&body).unwrap()
    }

    async fn lease_one(app: Router) -> serde_json::Value {
        get_json(&app, "/get_slaves?amount=1&duration=30").await
    }

    #[tokio::test]
    async fn grants_then_asks_to_come_back() {
        let clock = ManualClock::new(T0);
        let app = app(10, &clock);

        let body = get_json(&app, "/get_slaves?amount=3&duration=60").await;
        assert_eq!(
            body,
            serde_json::json!({ "slaves": ["192.168.0.101", "192.168.0.102", "192.168.0.103"] })
        );

        let body = get_json(&app, "/get_slaves?amount=10&duration=60").await;
        assert_eq!(body, serde_json::json!({ "slaves": [], "come_back": 60 }));

        clock.advance_secs(15);
        let body = get_json(&app, "/get_slaves?amount=10&duration=60").await;
        assert_eq!(body, serde_json::json!({ "slaves": [], "come_back": 45 }));

        clock.advance_secs(45);
        let body = get_json(&app, "/get_slaves?amount=10&duration=60").await;
        assert_eq!(body["slaves"].as_array().unwrap().len(), 10);
    }

    #[tokio::test]
    async fn come_back_is_nth_soonest_expiry() {
        let clock = ManualClock::new(T0);
        let app = app(2, &clock);

        get_json(&app, "/get_slaves?amount=1&duration=10").await;
        get_json(&app, "/get_slaves?amount=1&duration=30").await;

        let body = get_json(&app, "/get_slaves?amount=1&duration=5").await;
        assert_eq!(body, serde_json::json!({ "slaves": [], "come_back": 10 }));

        clock.advance_secs(10);
        let body = get_json(&app, "/get_slaves?amount=1&duration=5").await;
        assert_eq!(body, serde_json::json!({ "slaves": ["192.168.0.101"] }));
    }

    #[tokio::test]
    async fn rejects_bad_parameters() {
        let clock = ManualClock::new(T0);
        let app = app(10, &clock);

        for uri in [
            "/get_slaves",
            "/get_slaves?amount=3",
            "/get_slaves?amount=abc&duration=10",
            "/get_slaves?amount=3&duration=-1",
            "/get_slaves?amount=0&duration=10",
            "/get_slaves?amount=11&duration=10",
        ] {
            let (status, body) = fetch(&app, uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(body, INVALID_REQUEST_BODY, "{uri}");
        }

        // Nothing was leased by the rejected requests.
        let body = get_json(&app, "/get_slaves?amount=10&duration=1").await;
        assert_eq!(body["slaves"].as_array().unwrap().len(), 10);
    }

    #[tokio::test]
    async fn enforces_lease_limit() {
        let clock = ManualClock::new(T0);
        let mut config = config(4);
        config.max_lease_secs = Some(60);
        let app = router(LeaseService::with_clock(&config, clock).unwrap());

        let (status, _) = fetch(&app, "/get_slaves?amount=1&duration=61").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = fetch(&app, "/get_slaves?amount=1&duration=60").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_path_is_malformed() {
        let clock = ManualClock::new(T0);
        let app = app(10, &clock);

        let (status, body) = fetch(&app, "/get_masters?amount=1&duration=1").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, MALFORMED_URL_BODY);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_requests_share_the_pool() {
        let clock = ManualClock::new(T0);
        let app = app(10, &clock);

        let mut tasks = Vec::new();
        for _ in 0..20 {
            tasks.push(tokio::spawn(lease_one(app.clone())));
        }

        let mut granted = Vec::new();
        let mut deferred = 0;
        for task in tasks {
            let body = task.await.unwrap();
            match body["slaves"].as_array().unwrap().as_slice() {
                [] => {
                    assert_eq!(body["come_back"], 30);
                    deferred += 1;
                }
                [address] => granted.push(address.as_str().unwrap().to_owned()),
                other => panic!("unexpected grant {other:?}"),
            }
        }

        granted.sort();
        granted.dedup();
        assert_eq!(granted.len(), 10);
        assert_eq!(deferred, 10);
    }
}
