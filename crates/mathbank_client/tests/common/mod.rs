use mathbank_api::{Api, Method as ApiMethod, Params, Request};
use mathbank_client::{ApiRequest, Method, Transport, TransportError};
use std::cell::RefCell;
use std::rc::Rc;
use tempfile::TempDir;

/// Shared record of every request a transport delivered, for assertions on
/// call ordering and batching.
pub type RequestLog = Rc<RefCell<Vec<ApiRequest>>>;

/// In-process transport: hands each request straight to the endpoint
/// dispatcher backed by a throwaway database file.
pub struct LocalTransport {
    api: Api,
    log: RequestLog,
    _dir: TempDir,
}

impl LocalTransport {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let api = Api::new(dir.path().join("client.sqlite3"));
        Self {
            api,
            log: Rc::new(RefCell::new(Vec::new())),
            _dir: dir,
        }
    }

    /// Handle onto the request log; clone before moving the transport into
    /// a proxy or session.
    pub fn log_handle(&self) -> RequestLog {
        Rc::clone(&self.log)
    }
}

impl Transport for LocalTransport {
    fn send(&mut self, request: &ApiRequest) -> Result<String, TransportError> {
        self.log.borrow_mut().push(request.clone());

        let method = match request.method {
            Method::Get => ApiMethod::Get,
            Method::Post => ApiMethod::Post,
        };
        let params: Params = request
            .params
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();

        Ok(self.api.handle(&Request::new(method, request.endpoint, params)))
    }
}

/// Returns `(endpoint, params)` pairs recorded since the log was last
/// cleared, for compact assertions.
pub fn logged_endpoints(log: &RequestLog) -> Vec<String> {
    log.borrow()
        .iter()
        .map(|request| request.endpoint.to_string())
        .collect()
}

/// Finds one parameter value on a logged request.
pub fn request_param<'req>(request: &'req ApiRequest, name: &str) -> Option<&'req str> {
    request
        .params
        .iter()
        .find(|(param, _)| param == name)
        .map(|(_, value)| value.as_str())
}
