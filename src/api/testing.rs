use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tokio::sync::oneshot;

use super::ScanService;
use crate::domain::{types::Explanation, ScanRequest, ScanResult, ScanVerdict};

pub type Reply = std::result::Result<ScanResult, String>;

/// Answers each URL only once the test opens its gate.
#[derive(Default)]
pub struct GatedService {
    gates: Mutex<HashMap<String, oneshot::Receiver<Reply>>>,
}

impl GatedService {
    pub fn gate(&self, url: &str) -> oneshot::Sender<Reply> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(url.to_string(), rx);
        tx
    }
}

#[async_trait]
impl ScanService for Arc<GatedService> {
    async fn scan(&self, request: &ScanRequest) -> Result<ScanResult> {
        let gate = self
            .gates
            .lock()
            .unwrap()
            .remove(&request.url)
            .ok_or_else(|| anyhow!("no gate for {}", request.url))?;
        match gate.await {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(message)) => Err(anyhow!(message)),
            Err(_) => Err(anyhow!("gate closed")),
        }
    }
}

pub fn verdict(url: &str) -> ScanResult {
    ScanResult::Success(ScanVerdict {
        id: None,
        url: url.to_string(),
        timestamp: None,
        rule_score: 0.2,
        rule_label: false,
        ml_proba: None,
        ml_label: None,
        explain: Explanation::default(),
    })
}
