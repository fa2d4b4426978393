#![allow(dead_code)]

use std::sync::Mutex;

use harvester_core::HarvestConfig;
use harvester_engine::{AutocompleteClient, HttpReply, QueryError};
use tokio::time::Instant;
use url::Url;

type Responder = Box<dyn Fn(&str, &str) -> HttpReply + Send + Sync>;

/// In-process client answering from a closure of `(api_version, prefix)`.
pub struct ScriptedClient {
    responder: Responder,
    calls: Mutex<Vec<Call>>,
}

#[derive(Debug, Clone)]
pub struct Call {
    pub api_version: String,
    pub prefix: String,
    pub at: Instant,
}

impl ScriptedClient {
    pub fn new(responder: impl Fn(&str, &str) -> HttpReply + Send + Sync + 'static) -> Self {
        Self {
            responder: Box::new(responder),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.timeline()
            .into_iter()
            .map(|call| (call.api_version, call.prefix))
            .collect()
    }

    /// Every call in arrival order, stamped with tokio's (possibly paused) clock.
    pub fn timeline(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn prefixes_for(&self, api_version: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|(version, _)| version == api_version)
            .map(|(_, prefix)| prefix)
            .collect()
    }

    pub fn count(&self, api_version: &str, prefix: &str) -> usize {
        self.prefixes_for(api_version)
            .iter()
            .filter(|p| p.as_str() == prefix)
            .count()
    }
}

#[async_trait::async_trait]
impl AutocompleteClient for ScriptedClient {
    async fn get(&self, url: &Url) -> Result<HttpReply, QueryError> {
        let segments: Vec<&str> = url.path_segments().unwrap().collect();
        let version = segments[segments.len() - 2].to_string();
        let prefix = url
            .query_pairs()
            .find(|(key, _)| key == "query")
            .map(|(_, value)| value.into_owned())
            .unwrap();
        let reply = (self.responder)(&version, &prefix);
        self.calls.lock().unwrap().push(Call {
            api_version: version,
            prefix,
            at: Instant::now(),
        });
        Ok(reply)
    }
}

pub fn results(entries: &[&str]) -> HttpReply {
    HttpReply::new(200, serde_json::json!({ "results": entries }).to_string())
}

pub fn no_results() -> HttpReply {
    results(&[])
}

pub fn test_config(api_versions: &[&str], depth_limit: u32) -> HarvestConfig {
    HarvestConfig {
        endpoint: "http://harvest.test/".to_string(),
        api_versions: api_versions.iter().map(|v| v.to_string()).collect(),
        base_pause_secs: 0.0,
        max_attempts: 3,
        depth_limit,
        ..HarvestConfig::default()
    }
}

pub fn init_logging() {
    engine_logging::initialize_for_tests();
}
