//! Call expectations for mock API clients
//!
//! Mock clients hold one [`MockCalls`] per remote operation. Tests register
//! expected requests with canned responses; each call consumes the first
//! matching expectation that still has calls left, so a sequence such as
//! "404 once, then the object three times" models an object appearing after
//! its create call.

use crate::error::ApiError;
use std::fmt::Debug;
use std::sync::Mutex;

struct Expected<Req, Resp> {
    request: Option<Req>,
    response: Result<Resp, ApiError>,
    times: Option<usize>,
    calls: usize,
}

impl<Req: PartialEq, Resp> Expected<Req, Resp> {
    fn accepts(&self, request: &Req) -> bool {
        let matches = self.request.as_ref().is_none_or(|r| r == request);
        let has_calls_left = self.times.is_none_or(|t| self.calls < t);
        matches && has_calls_left
    }

    fn is_satisfied(&self) -> bool {
        match self.times {
            Some(t) => self.calls == t,
            None => self.calls > 0,
        }
    }
}

/// Expectations and received calls of one mocked operation
pub struct MockCalls<Req, Resp> {
    method: &'static str,
    expected: Mutex<Vec<Expected<Req, Resp>>>,
    received: Mutex<Vec<Req>>,
    unexpected: Mutex<Vec<String>>,
}

impl<Req, Resp> MockCalls<Req, Resp>
where
    Req: PartialEq + Debug + Clone,
    Resp: Clone,
{
    pub fn new(method: &'static str) -> Self {
        Self {
            method,
            expected: Mutex::new(Vec::new()),
            received: Mutex::new(Vec::new()),
            unexpected: Mutex::new(Vec::new()),
        }
    }

    /// Expect `request` (or any request when `None`) and answer with `response`.
    /// Unlimited until narrowed with [`Expectation::once`] or [`Expectation::times`].
    pub fn expect(
        &self,
        request: Option<Req>,
        response: Result<Resp, ApiError>,
    ) -> Expectation<'_, Req, Resp> {
        let mut expected = self.lock_expected();
        expected.push(Expected {
            request,
            response,
            times: None,
            calls: 0,
        });
        Expectation {
            calls: self,
            index: expected.len() - 1,
        }
    }

    fn lock_expected(&self) -> std::sync::MutexGuard<'_, Vec<Expected<Req, Resp>>> {
        self.expected.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Record a call and return the canned response
    pub fn call(&self, request: Req) -> Result<Resp, ApiError> {
        self.received
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());

        let mut expected = self.lock_expected();
        match expected.iter_mut().find(|e| e.accepts(&request)) {
            Some(e) => {
                e.calls += 1;
                e.response.clone()
            }
            None => {
                let message = format!("unexpected call to {}: {:?}", self.method, request);
                self.unexpected
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .push(message.clone());
                Err(ApiError::new(0, message).with_type("mock"))
            }
        }
    }

    /// Requests received so far
    pub fn received(&self) -> Vec<Req> {
        self.received
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Unmet expectations and unexpected calls, described
    pub fn problems(&self) -> Vec<String> {
        let mut problems: Vec<String> = self
            .lock_expected()
            .iter()
            .filter(|e| !e.is_satisfied())
            .map(|e| {
                format!(
                    "{}({:?}) expected {} call(s), got {}",
                    self.method,
                    e.request,
                    e.times
                        .map(|t| t.to_string())
                        .unwrap_or_else(|| "at least 1".to_string()),
                    e.calls
                )
            })
            .collect();
        problems.extend(
            self.unexpected
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .iter()
                .cloned(),
        );
        problems
    }
}

/// Handle for narrowing a registered expectation
pub struct Expectation<'a, Req, Resp> {
    calls: &'a MockCalls<Req, Resp>,
    index: usize,
}

impl<Req, Resp> Expectation<'_, Req, Resp>
where
    Req: PartialEq + Debug + Clone,
    Resp: Clone,
{
    pub fn times(self, n: usize) -> Self {
        if let Some(e) = self.calls.lock_expected().get_mut(self.index) {
            e.times = Some(n);
        }
        self
    }

    pub fn once(self) -> Self {
        self.times(1)
    }

    pub fn twice(self) -> Self {
        self.times(2)
    }
}

/// Panic with every problem reported by `problems`
pub fn assert_no_problems(problems: Vec<String>) {
    assert!(
        problems.is_empty(),
        "mock expectations not met:\n{}",
        problems.join("\n")
    );
}
