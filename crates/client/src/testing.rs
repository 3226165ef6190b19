//! Network-free resource source for tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use hotfix_core::Error;

use crate::fetch::ResourceSource;

/// Serves canned responses by path and counts requests.
#[derive(Default)]
pub struct StubSource {
    responses: Mutex<HashMap<String, Result<Option<String>, String>>>,
    calls: AtomicUsize,
}

impl StubSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, path: &str, body: &str) -> Self {
        self.set(path, Ok(Some(body.to_string())));
        self
    }

    pub fn failing(self, path: &str) -> Self {
        self.set(path, Err("connection reset".to_string()));
        self
    }

    pub fn set(&self, path: &str, response: Result<Option<String>, String>) {
        self.responses.lock().unwrap().insert(path.to_string(), response);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ResourceSource for StubSource {
    async fn fetch_text(&self, path: &str) -> Result<Option<String>, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let response = self.responses.lock().unwrap().get(path).cloned();
        match response {
            Some(Ok(body)) => Ok(body),
            Some(Err(msg)) => Err(Error::HttpError(msg)),
            None => Ok(None),
        }
    }
}
