//! HTTP client for the job-platform backend.
//!
//! Every call goes through [`ApiClient::execute`], which runs the registered
//! request hooks, hands the request to a [`Transport`], runs the registered
//! response hooks, and classifies the outcome. Bearer authentication and
//! session expiry are hooks, registered once, so no call site deals with them.

use super::error::ApiError;
use crate::journal::SharedJournal;
use crate::session::SharedSession;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::io::Read;
use std::time::Duration;
use tracing::{debug, warn};

/// Largest response body the client will buffer (invoices included)
const MAX_BODY_BYTES: u64 = 32 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Empty,
    Json(Value),
    Raw { content_type: String, bytes: Vec<u8> },
}

#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the base URL, already percent-encoded
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Body,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Vec::new(),
            body: Body::Empty,
        }
    }

    pub fn json(mut self, value: Value) -> Self {
        self.body = Body::Json(value);
        self
    }

    pub fn raw(mut self, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.body = Body::Raw {
            content_type: content_type.into(),
            bytes,
        };
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((name.to_string(), value.into()));
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Decode JSON, treating an empty or `null` body as `T::default()`
    pub fn json_or_default<T: DeserializeOwned + Default>(&self) -> Result<T, ApiError> {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(T::default());
        }
        let value: Option<T> = serde_json::from_slice(&self.body)?;
        Ok(value.unwrap_or_default())
    }

    /// The `message` field of a JSON error body, or the body itself when it is short plain text
    pub fn error_message(&self) -> Option<String> {
        if let Ok(value) = serde_json::from_slice::<Value>(&self.body) {
            return value
                .get("message")
                .or_else(|| value.get("error"))
                .and_then(|v| v.as_str())
                .map(str::to_string);
        }
        let text = self.text();
        let text = text.trim();
        if text.is_empty() || text.len() > 200 || text.starts_with('<') {
            None
        } else {
            Some(text.to_string())
        }
    }
}

/// Moves a request over the wire. Any HTTP status is an `Ok` response;
/// only failures to get a response at all are errors.
pub trait Transport {
    fn send(&self, base_url: &str, request: &ApiRequest) -> Result<ApiResponse, ApiError>;
}

/// Transport backed by a blocking `ureq` agent
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
        }
    }

    fn read_response(resp: ureq::Response) -> Result<ApiResponse, ApiError> {
        let status = resp.status();
        let content_type = resp.header("Content-Type").map(str::to_string);
        let body = read_body(resp.into_reader(), MAX_BODY_BYTES)?;
        Ok(ApiResponse {
            status,
            content_type,
            body,
        })
    }
}

/// Buffer a response body, refusing one larger than `limit` bytes
fn read_body(reader: impl Read, limit: u64) -> Result<Vec<u8>, ApiError> {
    let mut body = Vec::new();
    reader
        .take(limit.saturating_add(1))
        .read_to_end(&mut body)
        .map_err(|e| ApiError::Network(format!("failed reading response body: {}", e)))?;
    if body.len() as u64 > limit {
        return Err(ApiError::Decode(format!(
            "response body exceeds {} bytes",
            limit
        )));
    }
    Ok(body)
}

impl Transport for UreqTransport {
    fn send(&self, base_url: &str, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let url = format!("{}{}", base_url, request.path);
        let mut req = self.agent.request(request.method.as_str(), &url);
        for (name, value) in &request.headers {
            req = req.set(name, value);
        }

        let result = match &request.body {
            Body::Empty => req.call(),
            Body::Json(value) => req
                .set("Content-Type", "application/json")
                .send_json(value.clone()),
            Body::Raw {
                content_type,
                bytes,
            } => req.set("Content-Type", content_type).send_bytes(bytes),
        };

        match result {
            Ok(resp) => Self::read_response(resp),
            Err(ureq::Error::Status(_, resp)) => Self::read_response(resp),
            Err(e) => Err(ApiError::Network(e.to_string())),
        }
    }
}

/// Runs before a request is sent and may amend it
pub trait RequestHook {
    fn before(&self, request: &mut ApiRequest);
}

/// Observes every response, success or not
pub trait ResponseHook {
    fn after(&self, request: &ApiRequest, response: &ApiResponse);
}

/// Attaches `Authorization: Bearer <token>` while a session is present
pub struct BearerAuth {
    session: SharedSession,
}

impl BearerAuth {
    pub fn new(session: SharedSession) -> Self {
        Self { session }
    }
}

impl RequestHook for BearerAuth {
    fn before(&self, request: &mut ApiRequest) {
        if let Some(token) = self.session.borrow().session().token() {
            request.set_header("Authorization", format!("Bearer {}", token));
        }
    }
}

/// Clears the session when the backend rejects the credential
pub struct SessionExpiry {
    session: SharedSession,
    journal: Option<SharedJournal>,
}

impl SessionExpiry {
    pub fn new(session: SharedSession, journal: Option<SharedJournal>) -> Self {
        Self { session, journal }
    }
}

impl ResponseHook for SessionExpiry {
    fn after(&self, request: &ApiRequest, response: &ApiResponse) {
        if response.status != 401 {
            return;
        }
        let dropped = self.session.borrow_mut().expire();
        if dropped {
            if let Some(journal) = &self.journal {
                journal
                    .borrow_mut()
                    .session_expired(request.method.as_str(), &request.path);
            }
        }
    }
}

/// Records failed calls other than credential rejections
pub struct FailureJournal {
    journal: SharedJournal,
}

impl FailureJournal {
    pub fn new(journal: SharedJournal) -> Self {
        Self { journal }
    }
}

impl ResponseHook for FailureJournal {
    fn after(&self, request: &ApiRequest, response: &ApiResponse) {
        if !response.is_success() && response.status != 401 {
            self.journal.borrow_mut().request_failed(
                request.method.as_str(),
                &request.path,
                Some(response.status),
            );
        }
    }
}

pub struct ApiClient {
    base_url: String,
    transport: Box<dyn Transport>,
    request_hooks: Vec<Box<dyn RequestHook>>,
    response_hooks: Vec<Box<dyn ResponseHook>>,
    journal: Option<SharedJournal>,
}

impl ApiClient {
    pub fn new(base_url: &str, transport: Box<dyn Transport>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
            request_hooks: Vec::new(),
            response_hooks: Vec::new(),
            journal: None,
        }
    }

    /// Client wired to a session: bearer auth, expiry on 401, and failure journaling
    pub fn for_session(
        base_url: &str,
        transport: Box<dyn Transport>,
        session: SharedSession,
        journal: Option<SharedJournal>,
    ) -> Self {
        let mut client = Self::new(base_url, transport)
            .with_request_hook(BearerAuth::new(session.clone()))
            .with_response_hook(SessionExpiry::new(session, journal.clone()));
        if let Some(journal) = journal {
            client = client.with_response_hook(FailureJournal::new(journal.clone()));
            client.journal = Some(journal);
        }
        client
    }

    pub fn with_request_hook(mut self, hook: impl RequestHook + 'static) -> Self {
        self.request_hooks.push(Box::new(hook));
        self
    }

    pub fn with_response_hook(mut self, hook: impl ResponseHook + 'static) -> Self {
        self.response_hooks.push(Box::new(hook));
        self
    }

    /// Send a request and classify the outcome
    pub fn execute(&self, mut request: ApiRequest) -> Result<ApiResponse, ApiError> {
        for hook in &self.request_hooks {
            hook.before(&mut request);
        }
        debug!(method = request.method.as_str(), path = %request.path, "request");

        let response = match self.transport.send(&self.base_url, &request) {
            Ok(r) => r,
            Err(e) => {
                warn!(method = request.method.as_str(), path = %request.path, error = %e, "request failed");
                if let Some(journal) = &self.journal {
                    journal
                        .borrow_mut()
                        .request_failed(request.method.as_str(), &request.path, None);
                }
                return Err(e);
            }
        };
        debug!(status = response.status, path = %request.path, "response");

        for hook in &self.response_hooks {
            hook.after(&request, &response);
        }

        if response.is_success() {
            Ok(response)
        } else if response.status == 401 {
            Err(ApiError::Unauthorized)
        } else {
            Err(ApiError::Rejected {
                status: response.status,
                message: response.error_message(),
            })
        }
    }

    pub fn get(&self, path: impl Into<String>) -> Result<ApiResponse, ApiError> {
        self.execute(ApiRequest::new(Method::Get, path))
    }

    pub fn post<B: Serialize>(&self, path: impl Into<String>, body: &B) -> Result<ApiResponse, ApiError> {
        self.execute(ApiRequest::new(Method::Post, path).json(serde_json::to_value(body)?))
    }

    pub fn put<B: Serialize>(&self, path: impl Into<String>, body: &B) -> Result<ApiResponse, ApiError> {
        self.execute(ApiRequest::new(Method::Put, path).json(serde_json::to_value(body)?))
    }

    /// PUT with no body
    pub fn put_empty(&self, path: impl Into<String>) -> Result<ApiResponse, ApiError> {
        self.execute(ApiRequest::new(Method::Put, path))
    }

    /// GET a collection; an empty body is an empty collection
    pub fn get_list<T: DeserializeOwned>(&self, path: impl Into<String>) -> Result<Vec<T>, ApiError> {
        self.get(path)?.json_or_default()
    }
}

/// Percent-encode one path segment
pub fn segment(raw: &str) -> String {
    urlencoding::encode(raw).into_owned()
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted transport for exercising the client without a network.

    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    pub struct FakeTransport {
        pub sent: Rc<RefCell<Vec<ApiRequest>>>,
        replies: Rc<RefCell<VecDeque<Result<ApiResponse, ApiError>>>>,
    }

    impl FakeTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn reply(&self, status: u16, body: &str) -> &Self {
            self.replies.borrow_mut().push_back(Ok(ApiResponse {
                status,
                content_type: Some("application/json".to_string()),
                body: body.as_bytes().to_vec(),
            }));
            self
        }

        pub fn reply_json(&self, status: u16, body: Value) -> &Self {
            self.reply(status, &body.to_string())
        }

        pub fn fail(&self, message: &str) -> &Self {
            self.replies
                .borrow_mut()
                .push_back(Err(ApiError::Network(message.to_string())));
            self
        }

        pub fn last(&self) -> ApiRequest {
            self.sent.borrow().last().cloned().expect("no request sent")
        }

        pub fn paths(&self) -> Vec<String> {
            self.sent.borrow().iter().map(|r| r.path.clone()).collect()
        }
    }

    impl Transport for FakeTransport {
        fn send(&self, _base_url: &str, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
            self.sent.borrow_mut().push(request.clone());
            self.replies
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(ApiError::Network("no scripted reply".to_string())))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::FakeTransport;
    use super::*;
    use crate::guard::{self, Decision, Route};
    use crate::journal::Journal;
    use crate::session::{MemoryStorage, Role, SessionStore, User};
    use serde_json::json;

    fn logged_in_store() -> SharedSession {
        let mut store = SessionStore::new(Box::new(MemoryStorage::new()));
        store
            .login(
                User {
                    id: 3,
                    name: "Rita".to_string(),
                    email: "rita@example.com".to_string(),
                    role: Role::Recruiter,
                },
                "secret-token",
            )
            .unwrap();
        store.shared()
    }

    #[test]
    fn test_bearer_header_attached_when_logged_in() {
        let transport = FakeTransport::new();
        transport.reply(200, "[]");
        let client = ApiClient::for_session("http://x/api", Box::new(transport.clone()), logged_in_store(), None);

        client.get("/jobposts").unwrap();
        assert_eq!(transport.last().header("authorization"), Some("Bearer secret-token"));
    }

    #[test]
    fn test_no_bearer_header_when_logged_out() {
        let transport = FakeTransport::new();
        transport.reply(200, "{}");
        let session = SessionStore::new(Box::new(MemoryStorage::new())).shared();
        let client = ApiClient::for_session("http://x/api", Box::new(transport.clone()), session, None);

        client.post("/auth/login", &json!({"email": "a@b.c"})).unwrap();
        assert!(transport.last().header("Authorization").is_none());
    }

    #[test]
    fn test_401_clears_session_and_guard_redirects() {
        let transport = FakeTransport::new();
        transport.reply(401, "");
        let session = logged_in_store();
        let dir = tempfile::tempdir().unwrap();
        let journal = Journal::open(dir.path(), "run").unwrap().shared();
        let client = ApiClient::for_session(
            "http://x/api",
            Box::new(transport.clone()),
            session.clone(),
            Some(journal.clone()),
        );

        let err = client.get("/applications/job/rita%40example.com").unwrap_err();
        assert!(err.is_unauthorized());
        assert!(!session.borrow().session().is_authenticated());

        let store = session.borrow();
        assert_eq!(guard::check(store.session(), Route::RecruiterDashboard), Decision::RedirectToLogin);
        assert_eq!(guard::check(store.session(), Route::Profile), Decision::RedirectToLogin);

        let path = journal.borrow().path.clone().unwrap();
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("session_expired"));
        assert!(!content.contains("secret-token"));
    }

    #[test]
    fn test_other_errors_leave_session_alone() {
        let transport = FakeTransport::new();
        transport
            .reply_json(409, json!({"message": "Already applied"}))
            .fail("connection refused");
        let session = logged_in_store();
        let client = ApiClient::for_session("http://x/api", Box::new(transport), session.clone(), None);

        match client.post("/applications/apply", &json!({})) {
            Err(ApiError::Rejected { status, message }) => {
                assert_eq!(status, 409);
                assert_eq!(message.as_deref(), Some("Already applied"));
            }
            other => panic!("unexpected: {:?}", other),
        }
        assert!(matches!(client.get("/jobposts"), Err(ApiError::Network(_))));
        assert!(session.borrow().session().is_authenticated());
    }

    #[test]
    fn test_get_list_tolerates_empty_body() {
        let transport = FakeTransport::new();
        transport.reply(200, "").reply(200, "null").reply(200, "[1,2]");
        let client = ApiClient::new("http://x/api/", Box::new(transport));
        assert_eq!(client.base_url, "http://x/api");

        let a: Vec<i64> = client.get_list("/a").unwrap();
        let b: Vec<i64> = client.get_list("/b").unwrap();
        let c: Vec<i64> = client.get_list("/c").unwrap();
        assert!(a.is_empty());
        assert!(b.is_empty());
        assert_eq!(c, vec![1, 2]);
    }

    #[test]
    fn test_error_message_extraction() {
        let resp = |body: &str| ApiResponse {
            status: 400,
            content_type: None,
            body: body.as_bytes().to_vec(),
        };
        assert_eq!(resp(r#"{"message":"bad email"}"#).error_message().as_deref(), Some("bad email"));
        assert_eq!(resp(r#"{"error":"Bad Request"}"#).error_message().as_deref(), Some("Bad Request"));
        assert_eq!(resp("plain failure").error_message().as_deref(), Some("plain failure"));
        assert_eq!(resp("<html>oops</html>").error_message(), None);
        assert_eq!(resp("").error_message(), None);
    }

    #[test]
    fn test_set_header_replaces_case_insensitively() {
        let mut req = ApiRequest::new(Method::Get, "/x");
        req.set_header("authorization", "Bearer a");
        req.set_header("Authorization", "Bearer b");
        assert_eq!(req.headers.len(), 1);
        assert_eq!(req.header("AUTHORIZATION"), Some("Bearer b"));
    }

    #[test]
    fn test_oversized_body_is_refused() {
        let fits = read_body(std::io::Cursor::new(vec![7u8; 16]), 16).unwrap();
        assert_eq!(fits.len(), 16);
        let err = read_body(std::io::Cursor::new(vec![7u8; 17]), 16).unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[test]
    fn test_segment_encodes() {
        assert_eq!(segment("a b@c.com"), "a%20b%40c.com");
        assert_eq!(segment("../x"), "..%2Fx");
    }
}
