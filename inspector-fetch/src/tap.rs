//! Network tap.
//!
//! [`NetworkTap`] decorates a [`Transport`] and records every request bound
//! for the platform, broadcasting lifecycle events to subscribers. Requests
//! and responses pass through unmodified.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use inspector_core::{classify, ApiCallRecord, CallStatus, PageChange, PageMetadata, TapEvent};
use reqwest::{Request, Response};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, trace};

use crate::error::HttpError;
use crate::host::http::{ResponseExt, Transport};

/// Default event channel capacity.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Default number of call records kept; older ones are dropped first.
pub const DEFAULT_MAX_RECORDS: usize = 1000;

/// Path fragment that marks a data API call on any host.
const API_PATH_MARKER: &str = "/api/";

// ============================================================================
// Filter
// ============================================================================

/// Decides which requests the tap records.
#[derive(Debug, Clone, Default)]
pub struct TapFilter {
    /// Substring identifying the platform domain, e.g. `congacloud.eu`.
    pub domain_marker: String,
}

impl TapFilter {
    /// Creates a filter for the given domain marker.
    pub fn new(domain_marker: impl Into<String>) -> Self {
        Self {
            domain_marker: domain_marker.into(),
        }
    }

    /// Returns true if the URL is a platform call.
    ///
    /// An empty domain marker matches only on the API path fragment.
    pub fn matches(&self, url: &str) -> bool {
        (!self.domain_marker.is_empty() && url.contains(&self.domain_marker))
            || url.contains(API_PATH_MARKER)
    }
}

// ============================================================================
// Network Tap
// ============================================================================

#[derive(Debug, Default)]
struct TapState {
    next_id: u64,
    calls: VecDeque<ApiCallRecord>,
    last_url: Option<String>,
}

/// Recording [`Transport`] decorator.
///
/// At most `max_records` calls are retained. Events are sent for every call
/// regardless of what the record list still holds.
pub struct NetworkTap {
    inner: Arc<dyn Transport>,
    filter: TapFilter,
    max_records: usize,
    state: Mutex<TapState>,
    events: broadcast::Sender<TapEvent>,
}

impl NetworkTap {
    /// Wraps `inner` and announces readiness on `events`.
    ///
    /// Receivers subscribed before the call observe the `ready` event.
    pub fn install(
        inner: Arc<dyn Transport>,
        filter: TapFilter,
        events: broadcast::Sender<TapEvent>,
    ) -> Self {
        let tap = Self {
            inner,
            filter,
            max_records: DEFAULT_MAX_RECORDS,
            state: Mutex::new(TapState::default()),
            events,
        };
        tap.emit(TapEvent::Ready {
            timestamp: Utc::now(),
        });
        debug!(domain = %tap.filter.domain_marker, "Network tap installed");
        tap
    }

    /// Wraps `inner` with a fresh event channel.
    pub fn new(inner: Arc<dyn Transport>, filter: TapFilter) -> Self {
        let (events, _) = broadcast::channel(DEFAULT_CHANNEL_CAPACITY);
        Self::install(inner, filter, events)
    }

    /// Limits how many call records are retained.
    pub fn with_max_records(mut self, max_records: usize) -> Self {
        self.max_records = max_records.max(1);
        self
    }

    /// Subscribes to tap events.
    pub fn subscribe(&self) -> broadcast::Receiver<TapEvent> {
        self.events.subscribe()
    }

    /// The active filter.
    pub fn filter(&self) -> &TapFilter {
        &self.filter
    }

    /// Snapshot of retained calls, oldest first.
    pub async fn calls(&self) -> Vec<ApiCallRecord> {
        self.state.lock().await.calls.iter().cloned().collect()
    }

    /// Number of retained calls.
    pub async fn call_count(&self) -> usize {
        self.state.lock().await.calls.len()
    }

    /// Drops recorded calls. Ids keep increasing.
    pub async fn clear(&self) {
        self.state.lock().await.calls.clear();
    }

    /// Reports a page navigation.
    ///
    /// Returns the change, or `None` if the URL equals the last one seen.
    pub async fn navigate(&self, url: &str) -> Option<PageChange> {
        {
            let mut state = self.state.lock().await;
            if state.last_url.as_deref() == Some(url) {
                return None;
            }
            state.last_url = Some(url.to_string());
        }

        let classification = classify(url);
        let change = PageChange {
            url: url.to_string(),
            object_type: classification.object_type,
            record_id: classification.record_id,
            timestamp: Utc::now(),
        };
        debug!(url = %url, object_type = ?change.object_type, "Page changed");
        self.emit(TapEvent::PageChanged(change.clone()));
        Some(change)
    }

    /// Classification of `url` plus the number of calls recorded so far.
    pub async fn page_metadata(&self, url: &str) -> PageMetadata {
        let classification = classify(url);
        PageMetadata {
            url: url.to_string(),
            object_type: classification.object_type,
            record_id: classification.record_id,
            timestamp: Utc::now(),
            api_calls: self.call_count().await,
        }
    }

    fn emit(&self, event: TapEvent) {
        // No receivers is fine.
        if self.events.send(event).is_err() {
            trace!("No tap subscribers");
        }
    }

    async fn start(&self, method: &str, url: &str) -> ApiCallRecord {
        let record = {
            let mut state = self.state.lock().await;
            state.next_id += 1;
            let record = ApiCallRecord::pending(state.next_id, method, url);
            if state.calls.len() >= self.max_records {
                state.calls.pop_front();
            }
            state.calls.push_back(record.clone());
            record
        };
        self.emit(TapEvent::CallStarted(record.clone()));
        record
    }

    /// Applies the outcome to `record` and to its retained copy, if any.
    async fn settle(
        &self,
        mut record: ApiCallRecord,
        update: impl FnOnce(&mut ApiCallRecord),
    ) -> ApiCallRecord {
        update(&mut record);
        let mut state = self.state.lock().await;
        if let Some(retained) = state.calls.iter_mut().find(|r| r.id == record.id) {
            *retained = record.clone();
        }
        record
    }
}

#[async_trait]
impl Transport for NetworkTap {
    async fn execute(&self, request: Request) -> Result<Response, HttpError> {
        let url = request.url().to_string();
        if !self.filter.matches(&url) {
            return self.inner.execute(request).await;
        }

        let pending = self.start(request.method().as_str(), &url).await;

        match self.inner.execute(request).await {
            Ok(response) => {
                let status = response.status().as_u16();
                let status_text = response.status_text();
                let record = self
                    .settle(pending, |r| {
                        r.status = CallStatus::Http(status);
                        r.status_text = Some(status_text);
                    })
                    .await;
                self.emit(TapEvent::CallSucceeded(record));
                Ok(response)
            }
            Err(err) => {
                let message = err.to_string();
                let record = self
                    .settle(pending, |r| {
                        r.status = CallStatus::Error;
                        r.error = Some(message);
                    })
                    .await;
                self.emit(TapEvent::CallFailed(record));
                Err(err)
            }
        }
    }
}

impl std::fmt::Debug for NetworkTap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkTap")
            .field("filter", &self.filter)
            .field("max_records", &self.max_records)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::http::HttpClient;
    use reqwest::Method;
    use tokio::sync::Notify;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct FailingTransport;

    /// Holds each request until the gate is opened.
    struct GatedTransport {
        gate: Arc<Notify>,
        inner: HttpClient,
    }

    #[async_trait]
    impl Transport for GatedTransport {
        async fn execute(&self, request: Request) -> Result<Response, HttpError> {
            self.gate.notified().await;
            self.inner.execute(request).await
        }
    }

    #[async_trait]
    impl Transport for FailingTransport {
        async fn execute(&self, _request: Request) -> Result<Response, HttpError> {
            Err(HttpError::Timeout)
        }
    }

    fn get(url: &str) -> Request {
        Request::new(Method::GET, url.parse().unwrap())
    }

    #[test]
    fn test_filter() {
        let filter = TapFilter::new("congacloud.eu");
        assert!(filter.matches("https://rls-preview.congacloud.eu/ui/home"));
        assert!(filter.matches("http://localhost:8080/api/data/objects"));
        assert!(!filter.matches("https://cdn.example.com/app.js"));

        let empty = TapFilter::default();
        assert!(empty.matches("http://localhost/api/x"));
        assert!(!empty.matches("http://localhost/static/x"));
    }

    #[tokio::test]
    async fn test_records_matching_calls() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let tap = NetworkTap::new(Arc::new(HttpClient::new().unwrap()), TapFilter::default());
        let mut rx = tap.subscribe();

        let api = format!("{}/api/data/objects", server.uri());
        let response = tap.execute(get(&api)).await.unwrap();
        assert_eq!(response.status().as_u16(), 404);

        let started = rx.recv().await.unwrap();
        assert!(matches!(&started, TapEvent::CallStarted(r) if r.status == CallStatus::Pending));
        match rx.recv().await.unwrap() {
            TapEvent::CallSucceeded(r) => {
                assert_eq!(r.id, 1);
                assert_eq!(r.status, CallStatus::Http(404));
                assert_eq!(r.status_text.as_deref(), Some("Not Found"));
            }
            other => panic!("unexpected event: {other:?}"),
        }

        // Not a platform call: passes through unrecorded.
        tap.execute(get(&format!("{}/static/app.js", server.uri())))
            .await
            .unwrap();
        assert_eq!(tap.call_count().await, 1);
    }

    #[tokio::test]
    async fn test_ids_survive_clear() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let tap = NetworkTap::new(Arc::new(HttpClient::new().unwrap()), TapFilter::default());
        let url = format!("{}/api/a", server.uri());

        tap.execute(get(&url)).await.unwrap();
        tap.execute(get(&url)).await.unwrap();
        let ids: Vec<u64> = tap.calls().await.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2]);

        tap.clear().await;
        assert_eq!(tap.call_count().await, 0);

        tap.execute(get(&url)).await.unwrap();
        assert_eq!(tap.calls().await[0].id, 3);
    }

    #[tokio::test]
    async fn test_clear_during_call_still_reports_completion() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let gate = Arc::new(Notify::new());
        let transport = GatedTransport {
            gate: gate.clone(),
            inner: HttpClient::new().unwrap(),
        };
        let tap = Arc::new(NetworkTap::new(Arc::new(transport), TapFilter::default()));
        let mut rx = tap.subscribe();

        let url = format!("{}/api/slow", server.uri());
        let call = tokio::spawn({
            let tap = tap.clone();
            async move { tap.execute(get(&url)).await }
        });

        assert!(matches!(rx.recv().await.unwrap(), TapEvent::CallStarted(r) if r.id == 1));
        tap.clear().await;
        gate.notify_one();

        let response = call.await.unwrap().unwrap();
        assert_eq!(response.status().as_u16(), 200);
        match rx.recv().await.unwrap() {
            TapEvent::CallSucceeded(r) => {
                assert_eq!(r.id, 1);
                assert_eq!(r.status, CallStatus::Http(200));
            }
            other => panic!("unexpected event: {other:?}"),
        }
        assert_eq!(tap.call_count().await, 0);
    }

    #[tokio::test]
    async fn test_oldest_records_dropped_at_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let tap = NetworkTap::new(Arc::new(HttpClient::new().unwrap()), TapFilter::default())
            .with_max_records(2);
        let url = format!("{}/api/a", server.uri());
        for _ in 0..3 {
            tap.execute(get(&url)).await.unwrap();
        }

        let ids: Vec<u64> = tap.calls().await.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[tokio::test]
    async fn test_transport_failure() {
        let tap = NetworkTap::new(Arc::new(FailingTransport), TapFilter::new("congacloud.eu"));
        let mut rx = tap.subscribe();

        let err = tap
            .execute(get("https://rls-preview.congacloud.eu/api/data/objects"))
            .await
            .unwrap_err();
        assert!(matches!(err, HttpError::Timeout));

        assert!(matches!(rx.recv().await.unwrap(), TapEvent::CallStarted(_)));
        match rx.recv().await.unwrap() {
            TapEvent::CallFailed(r) => {
                assert_eq!(r.status, CallStatus::Error);
                assert_eq!(r.error.as_deref(), Some("Request timed out"));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_install_announces_ready() {
        let (tx, mut rx) = broadcast::channel(8);
        let _tap = NetworkTap::install(Arc::new(FailingTransport), TapFilter::default(), tx);
        assert!(matches!(rx.recv().await.unwrap(), TapEvent::Ready { .. }));
    }

    #[tokio::test]
    async fn test_navigate_dedupes() {
        let tap = NetworkTap::new(Arc::new(FailingTransport), TapFilter::default());
        let mut rx = tap.subscribe();

        let url = "https://rls-preview.congacloud.eu/clm/agreements/a1";
        let change = tap.navigate(url).await.unwrap();
        assert_eq!(change.object_type.as_deref(), Some("Agreement"));
        assert_eq!(change.record_id.as_deref(), Some("a1"));
        assert!(tap.navigate(url).await.is_none());

        assert!(matches!(rx.recv().await.unwrap(), TapEvent::PageChanged(_)));
        assert!(rx.try_recv().is_err());

        let meta = tap.page_metadata(url).await;
        assert_eq!(meta.api_calls, 0);
        assert_eq!(meta.object_type.as_deref(), Some("Agreement"));
    }
}
