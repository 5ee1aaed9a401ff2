// ── Background compile task ───────────────────────────────────────────────────
//
// One compile = one named worker thread.  The worker owns its `CompileJob`
// (and therefore its buffer snapshot), never touches UI handles, and sends
// exactly one `CompileReport` before calling the `notify` hook, which the
// window uses to post itself a wake-up message.

use std::{
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use crossbeam_channel::{bounded, Receiver, Sender};

use crate::{
    compile::{
        job::{CompileJob, JobPaths},
        supervisor::{self, Outcome},
    },
    error::Result,
};

/// Result of one compile, delivered to the UI thread.
#[derive(Debug)]
pub(crate) struct CompileReport {
    pub(crate) job_id: u64,
    pub(crate) paths: JobPaths,
    /// `Err` means the compiler never ran (input not written, or spawn failed).
    pub(crate) result: Result<Outcome>,
    pub(crate) elapsed: Duration,
}

/// Handle to an in-flight compile.
///
/// Dropping the handle does not stop the compile; the child is still bounded
/// by the job's timeout.  Call `cancel` to stop it early.
pub(crate) struct CompileTask {
    id: u64,
    cancel: Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl CompileTask {
    /// Start `job` on a worker thread.
    ///
    /// The report goes to `reports`; `notify` runs right after the send, on
    /// the worker thread.
    pub(crate) fn spawn<F>(job: CompileJob, reports: Sender<CompileReport>, notify: F) -> Result<Self>
    where
        F: FnOnce() + Send + 'static,
    {
        let id = job.id;
        let (cancel_tx, cancel_rx) = bounded::<()>(1);

        let handle = thread::Builder::new()
            .name(format!("texpad-compile-{id}"))
            .spawn(move || {
                let started = Instant::now();
                let (paths, result) = execute(&job, &cancel_rx);
                let report = CompileReport {
                    job_id: job.id,
                    paths,
                    result,
                    elapsed: started.elapsed(),
                };
                log::info!(
                    "compile job {} finished in {:.2}s: {:?}",
                    report.job_id,
                    report.elapsed.as_secs_f64(),
                    report.result.as_ref().map_err(ToString::to_string)
                );
                // The receiver only disappears while the window is being torn
                // down, at which point nobody is waiting for the report.
                if reports.send(report).is_ok() {
                    notify();
                }
            })?;

        Ok(Self { id, cancel: cancel_tx, handle: Some(handle) })
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    /// Ask the worker to kill the compiler.  Idempotent; a no-op once the
    /// compile has finished.
    pub(crate) fn cancel(&self) {
        let _ = self.cancel.try_send(());
    }

    /// Wait for the worker thread to exit.
    pub(crate) fn join(mut self) {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("compile worker {} panicked", self.id);
            }
        }
    }
}

/// Write the input file, then run the compiler under supervision.
fn execute(job: &CompileJob, cancel: &Receiver<()>) -> (JobPaths, Result<Outcome>) {
    let paths = match job.write_input() {
        Ok(paths) => paths,
        Err(e) => return (job.paths(), Err(e)),
    };
    log::info!("compile job {}: {} {}", job.id, job.compiler, paths.input.display());
    let result = supervisor::run(&job.command(&paths), cancel);
    (paths, result)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
