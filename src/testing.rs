//! Test doubles for code built on the API client.
//!
//! `ScriptedTransport` stands in for the network: responses are queued per
//! method and path, and every request that reaches it is recorded (with the
//! bearer credential the client attached).

use crate::api::{ApiRequest, ApiResponse, ApiClient, Method, Transport};
use crate::error::{ApiError, ApiResult};
use crate::models::Listing;
use crate::session::{MemoryStorage, Session, SessionContext, User};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::sync::{Arc, Mutex};

type Route = (Method, String);

#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<HashMap<Route, VecDeque<ApiResult<ApiResponse>>>>,
    sent: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response. The last queued response for a route keeps answering
    /// once the ones before it are used up.
    pub fn respond(&self, method: Method, path: &str, status: u16, body: Value) -> &Self {
        self.push(method, path, Ok(ApiResponse::new(status, body)))
    }

    /// Queue a transport-level failure (no HTTP response at all)
    pub fn fail(&self, method: Method, path: &str, error: ApiError) -> &Self {
        self.push(method, path, Err(error))
    }

    fn push(&self, method: Method, path: &str, outcome: ApiResult<ApiResponse>) -> &Self {
        self.routes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry((method, path.to_string()))
            .or_default()
            .push_back(outcome);
        self
    }

    /// Every request received, in order
    pub fn sent(&self) -> Vec<ApiRequest> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn sent_to(&self, path: &str) -> Vec<ApiRequest> {
        self.sent()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }

    pub fn count(&self, path: &str) -> usize {
        self.sent_to(path).len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &ApiRequest) -> ApiResult<ApiResponse> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).push(request.clone());

        let mut routes = self.routes.lock().unwrap_or_else(|e| e.into_inner());
        let Some(queue) = routes.get_mut(&(request.method, request.path.clone())) else {
            return Ok(ApiResponse::new(
                404,
                json!({ "message": format!("No route for {} {}", request.method, request.path) }),
            ));
        };

        if queue.len() > 1 {
            if let Some(outcome) = queue.pop_front() {
                return outcome;
            }
        }
        queue
            .front()
            .cloned()
            .unwrap_or_else(|| Err(ApiError::Transport("empty script".to_string())))
    }
}

pub fn user(id: &str, roles: &[&str]) -> User {
    User {
        id: id.to_string(),
        name: format!("User {}", id),
        email: format!("{}@example.com", id),
        roles: roles.iter().map(|r| r.to_string()).collect::<BTreeSet<_>>(),
        avatar_url: None,
        cover_gradient: None,
        bio: None,
    }
}

pub fn user_json(id: &str, roles: &[&str]) -> Value {
    json!({
        "id": id,
        "name": format!("User {}", id),
        "email": format!("{}@example.com", id),
        "role": roles,
    })
}

/// A stored listing as the backend would send it
pub fn listing_json(id: &str, title: &str, url: &str) -> Value {
    json!({
        "_id": id,
        "title": title,
        "url": url,
        "description": format!("{} description", title),
        "category": "Design",
        "tags": ["tools"],
        "upvotes": [],
        "views": 0,
        "approved": true,
    })
}

pub fn listing(id: &str, title: &str, url: &str) -> Listing {
    serde_json::from_value(listing_json(id, title, url)).expect("valid listing fixture")
}

/// A client over a fresh scripted transport and in-memory session.
/// Pass `Some(token)` to start signed in.
pub fn client_with_session(
    token: Option<&str>,
    roles: &[&str],
) -> (ApiClient, Arc<ScriptedTransport>, Arc<MemoryStorage>) {
    let transport = Arc::new(ScriptedTransport::new());
    let storage = Arc::new(MemoryStorage::new());
    let session = SessionContext::init(storage.clone()).expect("memory storage never fails");
    if let Some(token) = token {
        session.start(Session::new(user("u1", roles), token));
    }

    let client = ApiClient::new(transport.clone(), session);
    (client, transport, storage)
}
