use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use super::adapter::{
    RestBytes, RestError, RestErrorKind, RestFuture, RestRequest, RestResponse, RestResult,
    RestTransport,
};

/// Failure injected in place of the next answer.
#[derive(Clone, Debug)]
pub enum MockFailure {
    Connect(String),
    Timeout(String),
}

#[derive(Clone, Debug)]
pub struct MockResponse {
    pub status: u16,
    pub body: RestBytes,
}

impl MockResponse {
    pub fn new(status: u16, body: impl Into<RestBytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self::new(status, body.into())
    }
}

#[derive(Debug, Default)]
struct Recorded {
    failures: VecDeque<MockFailure>,
    by_url: HashMap<String, VecDeque<MockResponse>>,
    fallback: VecDeque<MockResponse>,
    requests: Vec<RestRequest>,
}

/// In-memory transport. Every request is recorded, then answered by the next
/// queued failure, the next response queued for its URL, the next unrouted
/// response, or an empty 200, in that order.
#[derive(Clone, Debug, Default)]
pub struct MockRestAdapter {
    inner: Arc<Mutex<Recorded>>,
}

impl MockRestAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(failure: MockFailure) -> Self {
        let adapter = Self::new();
        adapter.queue_failure(failure);
        adapter
    }

    fn lock(&self) -> MutexGuard<'_, Recorded> {
        self.inner.lock().expect("mock transport mutex poisoned")
    }

    pub fn queue_failure(&self, failure: MockFailure) {
        self.lock().failures.push_back(failure);
    }

    pub fn queue_response(&self, response: MockResponse) {
        self.lock().fallback.push_back(response);
    }

    pub fn queue_response_for(&self, url: impl Into<String>, response: MockResponse) {
        self.lock().by_url.entry(url.into()).or_default().push_back(response);
    }

    pub fn request_count(&self) -> usize {
        self.lock().requests.len()
    }

    pub fn requests(&self) -> Vec<RestRequest> {
        self.lock().requests.clone()
    }

    pub fn last_request(&self) -> Option<RestRequest> {
        self.lock().requests.last().cloned()
    }

    fn answer(&self, request: RestRequest) -> RestResult<RestResponse> {
        let mut recorded = self.lock();
        let failure = recorded.failures.pop_front();
        let url = request.url.clone();
        recorded.requests.push(request);

        match failure {
            Some(MockFailure::Connect(reason)) => {
                return Err(RestError::new(RestErrorKind::Connect, reason));
            }
            Some(MockFailure::Timeout(reason)) => {
                return Err(RestError::new(RestErrorKind::Timeout, reason));
            }
            None => {}
        }

        let answer = recorded
            .by_url
            .get_mut(&url)
            .and_then(VecDeque::pop_front)
            .or_else(|| recorded.fallback.pop_front())
            .unwrap_or_else(|| MockResponse::new(200, RestBytes::new()));
        Ok(RestResponse {
            status: answer.status,
            headers: Vec::new(),
            body: answer.body,
            elapsed: Duration::ZERO,
        })
    }
}

impl RestTransport for MockRestAdapter {
    fn execute(&self, request: RestRequest) -> RestFuture<RestResult<RestResponse>> {
        let result = self.answer(request);
        Box::pin(async move { result })
    }
}
