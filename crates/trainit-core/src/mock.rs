//! In-memory transport for tests.
//!
//! Replies are scripted per (method, path). When several replies are queued
//! for one route they are served in order and the last one repeats.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use async_trait::async_trait;

use crate::error::{ApiError, ApiResult};
use crate::transport::{ApiRequest, ApiResponse, Method, Transport};

#[derive(Default)]
struct MockState {
    routes: HashMap<(Method, String), VecDeque<ApiResponse>>,
    calls: Vec<ApiRequest>,
}

#[derive(Clone, Default)]
pub struct MockTransport {
    state: Rc<RefCell<MockState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, method: Method, path: &str, status: u16, body: &str) -> Self {
        self.state
            .borrow_mut()
            .routes
            .entry((method, path.to_string()))
            .or_default()
            .push_back(ApiResponse {
                status,
                body: body.to_string(),
            });
        self
    }

    pub fn calls(&self) -> Vec<ApiRequest> {
        self.state.borrow().calls.clone()
    }

    pub fn count(&self, method: Method, path: &str) -> usize {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|c| c.method == method && c.path == path)
            .count()
    }
}

#[async_trait(?Send)]
impl Transport for MockTransport {
    async fn send(&self, request: ApiRequest) -> ApiResult<ApiResponse> {
        let mut state = self.state.borrow_mut();
        state.calls.push(request.clone());
        let queue = state
            .routes
            .get_mut(&(request.method, request.path.clone()))
            .ok_or_else(|| ApiError::Network(format!("no route for {}", request.path)))?;
        let response = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };
        response.ok_or_else(|| ApiError::Network("empty reply queue".to_string()))
    }
}
