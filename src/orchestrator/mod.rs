//! Batch orchestration: run `count` harvest workers under a bounded pool.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, FixedOffset, Utc};
use tokio::sync::Semaphore;
use tracing::{error, info};

use crate::app::ErrorKind;
use crate::worker::{HarvestWorker, WorkerOutcome};

/// Output file name stamped with `now` in the `offset` time zone,
/// e.g. `output_20240503142501.csv`.
pub fn destination_name(
    now: DateTime<Utc>,
    offset: FixedOffset,
    prefix: &str,
    extension: &str,
) -> String {
    let stamp = now.with_timezone(&offset).format("%Y%m%d%H%M%S");
    format!("{}{}.{}", prefix, stamp, extension)
}

/// Outcome of one batch.
#[derive(Debug, Clone)]
pub struct BatchReport {
    /// File the batch appended to
    pub destination: PathBuf,
    pub elapsed: Duration,
    pub outcomes: Vec<WorkerOutcome>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}

/// Spawns workers and waits for all of them.
///
/// At most `concurrency` workers hold a browser session at any moment,
/// regardless of how many are spawned.
pub struct Harvester {
    worker: Arc<HarvestWorker>,
    semaphore: Arc<Semaphore>,
    destination: PathBuf,
}

impl Harvester {
    /// `destination` is where the worker's sink writes; it is carried into the report.
    pub fn new(worker: HarvestWorker, concurrency: usize, destination: PathBuf) -> Self {
        Self {
            worker: Arc::new(worker),
            semaphore: Arc::new(Semaphore::new(concurrency.max(1))),
            destination,
        }
    }

    pub async fn harvest(&self, count: usize) -> BatchReport {
        let start = Instant::now();
        let mut handles = Vec::with_capacity(count);

        for id in 0..count {
            let worker = self.worker.clone();
            let semaphore = self.semaphore.clone();

            let handle = tokio::spawn(async move {
                let Ok(_permit) = semaphore.acquire().await else {
                    return WorkerOutcome::Failed(ErrorKind::Other);
                };
                worker.run(id).await
            });

            handles.push(handle);
        }

        let mut outcomes = Vec::with_capacity(count);
        for handle in handles {
            match handle.await {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    error!("Task join error: {}", e);
                    let kind = if e.is_panic() {
                        ErrorKind::Panicked
                    } else {
                        ErrorKind::Other
                    };
                    outcomes.push(WorkerOutcome::Failed(kind));
                }
            }
        }

        let report = BatchReport {
            destination: self.destination.clone(),
            elapsed: start.elapsed(),
            outcomes,
        };

        info!(
            "Batch into {} finished: {} succeeded, {} failed in {:.2}s",
            report.destination.display(),
            report.succeeded(),
            report.failed(),
            report.elapsed.as_secs_f64()
        );

        report
    }
}
