//! Worker pool.
//!
//! A producer feeds document texts into a bounded queue; `workers` threads
//! pull from it, each validating with its own configuration stream and its
//! own local counters, which are merged into the shared [`Aggregator`] when
//! the worker exits. An optional sort-order task runs alongside.
//!
//! # Shutdown
//!
//! The producer drops its sender when the source is exhausted; workers
//! drain the queue and exit on the disconnect. Under
//! [`FailurePolicy::StopOnFirst`] the first failing worker raises the abort
//! flag and drops the shared receiver, which unblocks the producer and
//! stops every worker after its current document.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver};

use parking_lot::Mutex;
use tracing::{debug, error, info};

use crate::codec::CodecFactory;
use crate::config::{self, ConfigOverrides};
use crate::conformance::{
    validate_strategies, Aggregator, DocumentHarness, DocumentOutcome, DocumentReport, FailurePolicy,
    ReproBundle, SortOrderError, SortReport, Statistics,
};
use crate::error::{HarnessError, HarnessResult};
use crate::generate::collate_batch;

/// Progress is logged every this many documents.
pub const PROGRESS_INTERVAL: u64 = 10_000;

/// Run parameters.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Run seed. Worker `n` draws configurations from `seed + n`.
    pub seed: u64,
    /// Number of worker threads.
    pub workers: usize,
    /// Bounded queue capacity between producer and workers.
    pub queue: usize,
    /// What to do after the first failure.
    pub policy: FailurePolicy,
    /// Pinned configuration dimensions.
    pub overrides: ConfigOverrides,
    /// Size of the concurrent sort-order batch; 0 disables it.
    pub sort_batch: usize,
    /// Write every produced text to this file.
    pub genout: Option<PathBuf>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            seed: 1,
            workers: 1,
            queue: 1024,
            policy: FailurePolicy::Continue,
            overrides: ConfigOverrides::default(),
            sort_batch: 0,
            genout: None,
        }
    }
}

impl RunOptions {
    /// Reject parameters the pool cannot run with.
    pub fn validate(&self) -> HarnessResult<()> {
        if self.workers == 0 {
            return Err(HarnessError::InvalidParameter("worker count must be at least 1".to_string()));
        }
        if self.queue == 0 {
            return Err(HarnessError::InvalidParameter("queue size must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Everything a run produced.
#[derive(Debug)]
pub struct RunSummary {
    /// Run seed.
    pub seed: u64,
    /// Merged counters.
    pub statistics: Statistics,
    /// Every failure, grouped by worker.
    pub failures: Vec<ReproBundle>,
    /// Sort-order results, one per key strategy, if the task ran.
    pub sort_reports: Vec<Result<SortReport, SortOrderError>>,
    /// True if the run stopped early on a failure.
    pub aborted: bool,
}

impl RunSummary {
    /// True if nothing failed: no document and no sort order.
    pub fn exit_ok(&self) -> bool {
        self.statistics.all_passed()
            && self
                .sort_reports
                .iter()
                .all(|r| matches!(r, Ok(report) if report.is_consistent()))
    }
}

struct Shared {
    receiver: Mutex<Option<Receiver<String>>>,
    abort: AtomicBool,
    completed: AtomicU64,
    aggregator: Aggregator,
    failures: Mutex<Vec<ReproBundle>>,
}

impl Shared {
    fn next(&self) -> Option<String> {
        if self.abort.load(Ordering::SeqCst) {
            return None;
        }
        let guard = self.receiver.lock();
        guard.as_ref()?.recv().ok()
    }

    fn stop(&self) {
        self.abort.store(true, Ordering::SeqCst);
        self.receiver.lock().take();
    }
}

/// Validate every text from `source` on a pool of workers.
pub fn run_validation<F, I>(factory: &F, options: &RunOptions, source: I) -> HarnessResult<RunSummary>
where
    F: CodecFactory + Clone,
    I: IntoIterator<Item = String>,
{
    options.validate()?;
    let mut genout = match &options.genout {
        Some(path) => Some(BufWriter::new(File::create(path)?)),
        None => None,
    };

    let (sender, receiver) = mpsc::sync_channel::<String>(options.queue);
    let shared = Shared {
        receiver: Mutex::new(Some(receiver)),
        abort: AtomicBool::new(false),
        completed: AtomicU64::new(0),
        aggregator: Aggregator::new(),
        failures: Mutex::new(Vec::new()),
    };

    info!(
        seed = options.seed,
        workers = options.workers,
        queue = options.queue,
        "starting validation"
    );

    let sort_reports = std::thread::scope(|scope| -> HarnessResult<_> {
        let sort_task = (options.sort_batch > 0).then(|| {
            scope.spawn(|| {
                let batch = collate_batch(options.seed, options.sort_batch);
                validate_strategies(factory, options.seed, &options.overrides, &batch)
            })
        });

        for id in 0..options.workers {
            let shared = &shared;
            scope.spawn(move || worker(id, factory.clone(), options, shared));
        }

        for text in source {
            if shared.abort.load(Ordering::SeqCst) {
                break;
            }
            if let Some(out) = genout.as_mut() {
                writeln!(out, "{text}")?;
            }
            if sender.send(text).is_err() {
                break;
            }
        }
        drop(sender);
        if let Some(out) = genout.as_mut() {
            out.flush()?;
        }

        Ok(match sort_task {
            Some(handle) => handle.join().unwrap_or_else(|_| {
                error!("sort-order task panicked");
                vec![Err(SortOrderError::TaskPanicked)]
            }),
            None => Vec::new(),
        })
    })?;

    let aborted = shared.abort.load(Ordering::SeqCst);
    let statistics = shared.aggregator.into_inner();
    info!(
        docs = statistics.docs,
        pass = statistics.pass,
        fail = statistics.fail,
        skipped = statistics.skipped,
        aborted,
        "validation finished"
    );

    Ok(RunSummary {
        seed: options.seed,
        statistics,
        failures: shared.failures.into_inner(),
        sort_reports,
        aborted,
    })
}

fn worker<F: CodecFactory>(id: usize, factory: F, options: &RunOptions, shared: &Shared) {
    let harness = DocumentHarness::new(factory, options.seed).with_policy(options.policy);
    let mut rng = config::seeded_rng(options.seed.wrapping_add(id as u64));
    let mut local = Statistics::new();
    let mut failures = Vec::new();

    while let Some(text) = shared.next() {
        let config = options.overrides.apply(config::sample(&mut rng));
        debug!(worker = id, config = %config, input = text.as_str(), "validating");

        let report = panic::catch_unwind(AssertUnwindSafe(|| harness.check(&config, &text)))
            .unwrap_or_else(|_| {
                error!(worker = id, input = text.as_str(), "document check panicked");
                DocumentReport {
                    config,
                    bytes: text.len(),
                    root_kind: None,
                    outcome: DocumentOutcome::Fail(vec![ReproBundle::new(
                        options.seed,
                        config,
                        "harness",
                        text.as_str(),
                        "no panic",
                        "panic",
                    )]),
                }
            });

        local.record(&report);
        let failed = report.outcome.is_fail();
        if let DocumentOutcome::Fail(bundles) = report.outcome {
            failures.extend(bundles);
        }

        let done = shared.completed.fetch_add(1, Ordering::Relaxed) + 1;
        if done % PROGRESS_INTERVAL == 0 {
            info!("completed {done}");
        }

        if failed && options.policy == FailurePolicy::StopOnFirst {
            error!(worker = id, "stopping on first failure");
            shared.stop();
            break;
        }
    }

    shared.aggregator.merge(&local);
    shared.failures.lock().extend(failures);
    debug!(worker = id, docs = local.docs, "worker exited");
}
