//! Scripted in-memory chart service for service tests

use super::types::*;
use super::ChartApi;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use tokio::sync::{oneshot, Notify};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Sync(GenChartParams, String),
    AsyncDirect(GenChartParams, String),
    AsyncQueued(GenChartParams, String),
    List(SearchParams),
}

struct Scripted<T> {
    result: Result<T>,
    gate: Option<oneshot::Receiver<()>>,
}

/// Responses are consumed in call order; gated ones wait for their sender
#[derive(Default)]
pub struct MockChartApi {
    sync: Mutex<VecDeque<Scripted<ChartResult>>>,
    ack: Mutex<VecDeque<Scripted<Acknowledgement>>>,
    list: Mutex<VecDeque<Scripted<ChartPage>>>,
    calls: Mutex<Vec<Call>>,
    calls_changed: Notify,
}

impl MockChartApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_sync(&self, result: Result<ChartResult>) {
        self.sync.lock().push_back(Scripted { result, gate: None });
    }

    pub fn push_sync_gated(&self, result: Result<ChartResult>) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.sync.lock().push_back(Scripted {
            result,
            gate: Some(rx),
        });
        tx
    }

    pub fn push_ack(&self, result: Result<Acknowledgement>) {
        self.ack.lock().push_back(Scripted { result, gate: None });
    }

    pub fn push_list(&self, result: Result<ChartPage>) {
        self.list.lock().push_back(Scripted { result, gate: None });
    }

    pub fn push_list_gated(&self, result: Result<ChartPage>) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.list.lock().push_back(Scripted {
            result,
            gate: Some(rx),
        });
        tx
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Wait until at least `n` calls have been made
    pub async fn wait_for_calls(&self, n: usize) {
        loop {
            let notified = self.calls_changed.notified();
            if self.call_count() >= n {
                return;
            }
            notified.await;
        }
    }

    fn record(&self, call: Call) {
        self.calls.lock().push(call);
        self.calls_changed.notify_waiters();
    }

    async fn answer<T>(queue: &Mutex<VecDeque<Scripted<T>>>) -> Result<T> {
        let scripted = queue.lock().pop_front();
        let Some(scripted) = scripted else {
            return Err(AppError::Internal("no scripted response".to_string()));
        };
        if let Some(gate) = scripted.gate {
            let _ = gate.await;
        }
        scripted.result
    }
}

#[async_trait]
impl ChartApi for MockChartApi {
    async fn generate_sync(
        &self,
        params: &GenChartParams,
        file: &DatasetFile,
    ) -> Result<ChartResult> {
        self.record(Call::Sync(params.clone(), file.file_name.clone()));
        Self::answer(&self.sync).await
    }

    async fn generate_async_direct(
        &self,
        params: &GenChartParams,
        file: &DatasetFile,
    ) -> Result<Acknowledgement> {
        self.record(Call::AsyncDirect(params.clone(), file.file_name.clone()));
        Self::answer(&self.ack).await
    }

    async fn generate_async_queued(
        &self,
        params: &GenChartParams,
        file: &DatasetFile,
    ) -> Result<Acknowledgement> {
        self.record(Call::AsyncQueued(params.clone(), file.file_name.clone()));
        Self::answer(&self.ack).await
    }

    async fn list_mine(&self, params: &SearchParams) -> Result<ChartPage> {
        self.record(Call::List(params.clone()));
        Self::answer(&self.list).await
    }
}
