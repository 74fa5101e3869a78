pub mod sqlite;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::step::Step;

/// One completed annotation: the action steps in order, then the final step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceRecord {
    /// Absent when the deployment stores traces without their question.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    pub data: Vec<Step>,
}

/// Where finished traces go. Each insert is a single atomic write.
#[async_trait]
pub trait TraceStore: Send + Sync {
    async fn insert(&self, record: &TraceRecord) -> Result<()>;
    async fn records(&self) -> Result<Vec<TraceRecord>>;
    async fn count(&self) -> Result<u64>;
}
