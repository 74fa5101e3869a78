use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{Lookup, LookupError, LookupRequest};

/// A scripted lookup for tests. Replies in order and records every request.
pub struct ScriptedLookup {
    replies: Mutex<VecDeque<Result<String, String>>>,
    requests: Mutex<Vec<LookupRequest>>,
}

impl ScriptedLookup {
    /// `Ok` replies become observations; `Err` replies become transport failures.
    pub fn new(replies: Vec<Result<String, String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Reply with the same observation to every request.
    pub fn answering(count: usize, message: &str) -> Self {
        Self::new((0..count).map(|_| Ok(message.to_string())).collect())
    }

    pub fn requests(&self) -> Vec<LookupRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Lookup for ScriptedLookup {
    async fn lookup(&self, request: &LookupRequest) -> Result<String, LookupError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        let reply = self
            .replies
            .lock()
            .ok()
            .and_then(|mut r| r.pop_front())
            .unwrap_or_else(|| Err("ScriptedLookup: no more replies".to_string()));
        reply.map_err(|e| LookupError::Transport(e.into()))
    }
}
