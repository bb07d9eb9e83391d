//! A fixed-size fork-join pool that runs one task per [`Partition`].
//!
//! Workers are scoped threads draining a shared task queue, so tasks can
//! borrow the column being processed. The coordinator joins every worker
//! before looking at any output: callers either get the output of every
//! partition, in partition order, or a single error.

use std::{
    any::Any,
    fmt::Display,
    num::NonZeroUsize,
    panic::{AssertUnwindSafe, catch_unwind},
    thread,
    time::Instant,
};

use crossbeam_channel::unbounded;
use tracing::{debug, warn};

use crate::{Error, Partition, Result};

/// The pipeline stage a worker pool is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    DistinctExtraction,
    Encoding,
}

impl Phase {
    fn thread_prefix(&self) -> &'static str {
        match self {
            Self::DistinctExtraction => "dictcodec-distinct",
            Self::Encoding => "dictcodec-encode",
        }
    }
}

impl Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DistinctExtraction => write!(f, "distinct extraction"),
            Self::Encoding => write!(f, "encoding"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct WorkerPool {
    phase: Phase,
    worker_count: NonZeroUsize,
}

type TaskOutput<T> = thread::Result<Result<T>>;

impl WorkerPool {
    pub(crate) fn new(phase: Phase, worker_count: usize) -> Result<Self> {
        let worker_count = NonZeroUsize::new(worker_count)
            .ok_or_else(|| Error::configuration("worker count must be at least 1, got 0"))?;
        Ok(Self {
            phase,
            worker_count,
        })
    }

    /// Run `task` once per partition and return the outputs in the order of
    /// `partitions`, regardless of which worker finished first.
    ///
    /// A panicking task, or a worker that could not be started, fails the
    /// whole run with [`Error::Build`]. Otherwise the error of the first
    /// failing partition is returned.
    pub(crate) fn run<T, F>(&self, partitions: &[Partition], task: F) -> Result<Vec<T>>
    where
        T: Send,
        F: Fn(Partition) -> Result<T> + Sync,
    {
        let total = partitions.len();
        if total == 0 {
            return Ok(vec![]);
        }

        let start = Instant::now();
        let mut outputs: Vec<Option<TaskOutput<T>>> = (0..total).map(|_| None).collect();

        // Empty partitions are resolved on the calling thread, so only
        // partitions holding rows ever need a worker.
        let (task_tx, task_rx) = unbounded::<(usize, Partition)>();
        let mut queued = 0;
        for (index, &partition) in partitions.iter().enumerate() {
            if partition.is_empty() {
                outputs[index] = Some(catch_unwind(AssertUnwindSafe(|| task(partition))));
                continue;
            }
            task_tx.send((index, partition)).map_err(|_| Error::Build {
                phase: self.phase,
                failed: total,
                total,
                reason: "task queue closed before scheduling".to_string(),
            })?;
            queued += 1;
        }
        drop(task_tx);

        let num_threads = self.worker_count.get().min(queued);

        let (result_tx, result_rx) = unbounded::<(usize, TaskOutput<T>)>();
        let mut worker_failures = vec![];
        let task = &task;

        thread::scope(|scope| {
            let mut handles = Vec::with_capacity(num_threads);
            for worker in 0..num_threads {
                let task_rx = task_rx.clone();
                let result_tx = result_tx.clone();
                let spawned = thread::Builder::new()
                    .name(format!("{}-{worker}", self.phase.thread_prefix()))
                    .spawn_scoped(scope, move || {
                        for (index, partition) in task_rx {
                            let output = catch_unwind(AssertUnwindSafe(|| task(partition)));
                            if result_tx.send((index, output)).is_err() {
                                break;
                            }
                        }
                    });

                match spawned {
                    Ok(handle) => handles.push(handle),
                    Err(e) => worker_failures.push(format!("worker {worker} did not start: {e}")),
                }
            }

            for handle in handles {
                if let Err(payload) = handle.join() {
                    worker_failures.push(panic_message(payload.as_ref()));
                }
            }
        });
        drop(result_tx);

        for (index, output) in result_rx {
            outputs[index] = Some(output);
        }

        let mut reasons = worker_failures;
        let mut failed = 0;
        for (index, output) in outputs.iter().enumerate() {
            match output {
                Some(Ok(_)) => {}
                Some(Err(payload)) => {
                    failed += 1;
                    reasons.push(format!(
                        "partition at row {} panicked: {}",
                        partitions[index].start,
                        panic_message(payload.as_ref())
                    ));
                }
                None => failed += 1,
            }
        }

        if failed > 0 || !reasons.is_empty() {
            warn!(
                phase = %self.phase,
                failed,
                total,
                "worker pool aborted"
            );
            return Err(Error::Build {
                phase: self.phase,
                failed,
                total,
                reason: if reasons.is_empty() {
                    "partitions were left unprocessed".to_string()
                } else {
                    reasons.join("; ")
                },
            });
        }

        debug!(
            phase = %self.phase,
            partitions = total,
            workers = num_threads,
            elapsed = ?start.elapsed(),
            "worker pool finished"
        );

        outputs
            .into_iter()
            .flatten()
            .map(|output| output.unwrap_or_else(|payload| std::panic::resume_unwind(payload)))
            .collect()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
