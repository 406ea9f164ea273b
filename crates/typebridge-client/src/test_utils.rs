//! An in-memory [`GraphqlClient`] answering from a script.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use crate::{GraphqlClient, QueryError};

#[derive(Default)]
struct Script {
    rules: Vec<(String, serde_json::Value)>,
    queue: VecDeque<Result<serde_json::Value, QueryError>>,
    queries: Vec<String>,
}

/// Records every query and answers with scripted `data` values.
///
/// Rules registered with [`ScriptedClient::respond_to`] win over the queue filled by
/// [`ScriptedClient::respond`].
#[derive(Clone, Default)]
pub struct ScriptedClient {
    script: Arc<Mutex<Script>>,
}

impl ScriptedClient {
    pub fn respond(&self, data: serde_json::Value) {
        self.lock().queue.push_back(Ok(data));
    }

    pub fn fail(&self, error: QueryError) {
        self.lock().queue.push_back(Err(error));
    }

    /// Answers every query containing `fragment` with `data`.
    pub fn respond_to(&self, fragment: impl Into<String>, data: serde_json::Value) {
        self.lock().rules.push((fragment.into(), data));
    }

    pub fn queries(&self) -> Vec<String> {
        self.lock().queries.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for ScriptedClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedClient").finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl GraphqlClient for ScriptedClient {
    async fn query(&self, query: &str) -> Result<serde_json::Value, QueryError> {
        let mut script = self.lock();
        script.queries.push(query.to_string());

        if let Some((_, data)) = script.rules.iter().find(|(fragment, _)| query.contains(fragment.as_str())) {
            return Ok(data.clone());
        }

        script.queue.pop_front().unwrap_or(Err(QueryError::EmptyResponse))
    }
}
