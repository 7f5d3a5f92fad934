//! Persistence gateway for job metadata.
//!
//! The engine calls [`JobStore::insert`] once when a job is created and
//! [`JobStore::update`] once when it reaches a terminal state. Intermediate
//! progress never goes through the store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::CoreError;
use crate::job::JobSnapshot;
use crate::types::JobId;

#[async_trait]
pub trait JobStore: Send + Sync {
    /// Record a newly created job.
    async fn insert(&self, job: &JobSnapshot) -> Result<(), CoreError>;

    /// Record the terminal status, progress, duration and throughput.
    async fn update(&self, job: &JobSnapshot) -> Result<(), CoreError>;
}

/// A store that keeps every write in memory, in call order.
///
/// Useful wherever durable history is not needed, and for asserting on the
/// exact sequence of gateway calls.
#[derive(Debug, Default)]
pub struct InMemoryJobStore {
    inner: Mutex<InMemoryState>,
}

#[derive(Debug, Default)]
struct InMemoryState {
    rows: HashMap<JobId, JobSnapshot>,
    calls: Vec<StoreCall>,
}

/// One recorded gateway call.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    Insert(JobSnapshot),
    Update(JobSnapshot),
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest stored row for `id`.
    pub async fn get(&self, id: &str) -> Option<JobSnapshot> {
        self.inner.lock().await.rows.get(id).cloned()
    }

    /// Every call made so far, oldest first.
    pub async fn calls(&self) -> Vec<StoreCall> {
        self.inner.lock().await.calls.clone()
    }

    /// Calls made for a single job, oldest first.
    pub async fn calls_for(&self, id: &str) -> Vec<StoreCall> {
        self.inner
            .lock()
            .await
            .calls
            .iter()
            .filter(|call| match call {
                StoreCall::Insert(job) | StoreCall::Update(job) => job.id == id,
            })
            .cloned()
            .collect()
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn insert(&self, job: &JobSnapshot) -> Result<(), CoreError> {
        let mut inner = self.inner.lock().await;
        if inner.rows.contains_key(&job.id) {
            return Err(CoreError::Conflict(format!("Job {} already stored", job.id)));
        }
        inner.rows.insert(job.id.clone(), job.clone());
        inner.calls.push(StoreCall::Insert(job.clone()));
        Ok(())
    }

    async fn update(&self, job: &JobSnapshot) -> Result<(), CoreError> {
        let mut inner = self.inner.lock().await;
        match inner.rows.get_mut(&job.id) {
            Some(row) => *row = job.clone(),
            None => {
                return Err(CoreError::NotFound {
                    entity: "Job",
                    id: job.id.clone(),
                })
            }
        }
        inner.calls.push(StoreCall::Update(job.clone()));
        Ok(())
    }
}
