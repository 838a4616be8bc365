#![allow(dead_code)]

use articlecraft_core::{ArticleStatus, Draft, DraftPersistence, SaveResponse, TransportError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::Instant;

pub const INTERVAL: Duration = Duration::from_millis(30_000);

#[derive(Debug, Clone)]
pub struct SaveCall {
    pub at: Instant,
    pub draft: Draft,
    pub status: ArticleStatus,
}

#[derive(Debug, Clone)]
pub enum Outcome {
    Saved(Option<Draft>),
    Rejected(String),
    Failed(TransportError),
}

/// Records every save call and answers with scripted outcomes.
///
/// Unscripted calls succeed without an echo. A gated recorder holds each call
/// until [`release`](Self::release) is called.
pub struct RecordingPersistence {
    calls: Mutex<Vec<SaveCall>>,
    outcomes: Mutex<VecDeque<Outcome>>,
    gate: Semaphore,
}

impl RecordingPersistence {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            outcomes: Mutex::new(VecDeque::new()),
            gate: Semaphore::new(Semaphore::MAX_PERMITS),
        }
    }

    pub fn gated() -> Self {
        Self {
            gate: Semaphore::new(0),
            ..Self::new()
        }
    }

    pub fn script(&self, outcome: Outcome) {
        self.outcomes.lock().unwrap().push_back(outcome);
    }

    pub fn release(&self) {
        self.gate.add_permits(1);
    }

    pub fn calls(&self) -> Vec<SaveCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl DraftPersistence for RecordingPersistence {
    async fn save(
        &self,
        draft: &Draft,
        status: ArticleStatus,
    ) -> Result<SaveResponse, TransportError> {
        self.calls.lock().unwrap().push(SaveCall {
            at: Instant::now(),
            draft: draft.clone(),
            status,
        });
        self.gate.acquire().await.unwrap().forget();

        let outcome = self.outcomes.lock().unwrap().pop_front();
        match outcome {
            None => Ok(SaveResponse::saved(None)),
            Some(Outcome::Saved(echo)) => Ok(SaveResponse::saved(echo)),
            Some(Outcome::Rejected(message)) => Ok(SaveResponse::rejected(message)),
            Some(Outcome::Failed(err)) => Err(err),
        }
    }
}

/// Lets spawned watcher and timer tasks run to their next suspension point.
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

/// Advances paused time and lets woken tasks run.
pub async fn advance(duration: Duration) {
    tokio::time::advance(duration).await;
    settle().await;
}
