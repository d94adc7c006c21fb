//! Bounded prefetch: sampling overlaps with tokenization and with the consumer's compute.
//!
//! One blocking task owns the [`BatchSampler`], so label draws happen in a single fixed order no
//! matter how the workers finish. Tokenization fans out over up to `workers` blocking tasks and
//! is re-serialized in draw order before it reaches the bounded output channel.

pub mod error;

#[cfg(test)]
mod tests;

pub use error::PipelineError;

use std::pin::pin;
use std::sync::Arc;

use futures_util::stream::{self, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::constants::{DEFAULT_MAXLEN, DEFAULT_PREFETCH};
use crate::sampler::{Batch, BatchSampler};
use crate::tokenize::{FeatureBatch, Tokenize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub maxlen: usize,
    /// Concurrent tokenization tasks. Default: available cores.
    pub workers: usize,
    /// Ready batches buffered ahead of the consumer.
    pub prefetch: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            maxlen: DEFAULT_MAXLEN,
            workers: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            prefetch: DEFAULT_PREFETCH,
        }
    }
}

/// A sampled batch with its encoder features.
#[derive(Debug, Clone)]
pub struct PreparedBatch {
    /// Zero-based draw index.
    pub step: u64,
    pub batch: Batch,
    pub features: FeatureBatch,
}

type Prepared = Result<PreparedBatch, PipelineError>;

/// Handle on a running prefetch pipeline. Dropping it stops the producer.
pub struct Prefetcher {
    rx: mpsc::Receiver<Prepared>,
    task: JoinHandle<()>,
    config: PipelineConfig,
}

impl std::fmt::Debug for Prefetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Prefetcher")
            .field("config", &self.config)
            .field("finished", &self.task.is_finished())
            .finish()
    }
}

impl Prefetcher {
    /// Must be called from within a tokio runtime.
    pub fn spawn(sampler: BatchSampler, tokenizer: Arc<dyn Tokenize>, config: PipelineConfig) -> Self {
        let workers = config.workers.max(1);
        let prefetch = config.prefetch.max(1);
        let maxlen = config.maxlen;

        info!(workers, prefetch, maxlen, "Starting prefetch pipeline");

        let (raw_tx, raw_rx) = mpsc::channel::<(u64, Batch)>(workers);
        tokio::task::spawn_blocking(move || {
            for (step, batch) in (0u64..).zip(sampler) {
                if raw_tx.blocking_send((step, batch)).is_err() {
                    debug!(step, "Prefetch consumer gone, sampler stopping");
                    break;
                }
            }
        });

        let (tx, rx) = mpsc::channel::<Prepared>(prefetch);
        let task = tokio::spawn(async move {
            let drawn = stream::unfold(raw_rx, |mut rx| async move {
                rx.recv().await.map(|item| (item, rx))
            });

            let mut ready = pin!(
                drawn
                    .map(|(step, batch)| tokenize(step, batch, Arc::clone(&tokenizer), maxlen))
                    .buffered(workers)
            );

            while let Some(prepared) = ready.next().await {
                if tx.send(prepared).await.is_err() {
                    break;
                }
            }
        });

        Self { rx, task, config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Next batch in draw order; `None` only once the pipeline has shut down.
    pub async fn next(&mut self) -> Option<Prepared> {
        self.rx.recv().await
    }

    /// Collects the next `n` batches, stopping at the first error.
    pub async fn take(&mut self, n: usize) -> Result<Vec<PreparedBatch>, PipelineError> {
        let mut out = Vec::with_capacity(n);
        while out.len() < n {
            match self.next().await {
                Some(prepared) => out.push(prepared?),
                None => return Err(PipelineError::Closed { received: out.len() }),
            }
        }
        Ok(out)
    }
}

impl Drop for Prefetcher {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn tokenize(step: u64, batch: Batch, tokenizer: Arc<dyn Tokenize>, maxlen: usize) -> Prepared {
    tokio::task::spawn_blocking(move || -> Prepared {
        let features = FeatureBatch::from_batch(&batch, tokenizer.as_ref(), maxlen)?;
        Ok(PreparedBatch {
            step,
            batch,
            features,
        })
    })
    .await
    .map_err(|e| PipelineError::Worker {
        reason: e.to_string(),
    })?
}
