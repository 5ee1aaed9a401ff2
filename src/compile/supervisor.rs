// ── Process supervision ───────────────────────────────────────────────────────
//
// Runs one external command with a hard wall-clock bound.  The child is
// polled rather than waited on so the same loop can notice both the
// deadline and a cancellation request; either one kills and reaps it.

use std::{
    fs::File,
    path::PathBuf,
    process::{Child, Command, ExitStatus, Stdio},
    time::{Duration, Instant},
};

use crossbeam_channel::{Receiver, RecvTimeoutError};

use crate::error::{Result, TexpadError};

/// How often the child's exit status is checked.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// `CREATE_NO_WINDOW`: keep console compilers from flashing a window.
#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// A fully resolved command line plus its supervision parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CommandSpec {
    pub(crate) program: String,
    pub(crate) args: Vec<String>,
    pub(crate) cwd: PathBuf,
    /// Receives the child's stdout and stderr.
    pub(crate) log: PathBuf,
    pub(crate) timeout: Duration,
}

/// How a supervised run ended, when the child could be started at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    /// Exit status zero before the deadline.
    Succeeded,
    /// Nonzero exit.  `code` is `None` when the child died from a signal.
    Failed { code: Option<i32> },
    /// The deadline passed; the child was killed.
    TimedOut { after: Duration },
    /// A cancellation request arrived; the child was killed.
    Cancelled,
}

impl Outcome {
    fn from_status(status: ExitStatus) -> Self {
        if status.success() {
            Self::Succeeded
        } else {
            Self::Failed { code: status.code() }
        }
    }
}

/// Start `spec` and wait for it, at most `spec.timeout`.
///
/// A message on `cancel` (or an already-queued one) stops the child early.
/// If every sender of `cancel` is dropped, the run continues unsupervised
/// by the caller until exit or timeout.
///
/// Errors are reserved for failing to start or poll the child (or to open the log
/// file); everything after that is an `Outcome`.
pub(crate) fn run(spec: &CommandSpec, cancel: &Receiver<()>) -> Result<Outcome> {
    let mut child = spawn(spec)?;
    let started = Instant::now();
    // A timeout too large to represent is no deadline at all.
    let deadline = started.checked_add(spec.timeout);
    let mut cancel = cancel.clone();

    log::debug!("spawned {} (pid {})", spec.program, child.id());

    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(Outcome::from_status(status)),
            Ok(None) => {}
            Err(e) => {
                terminate(&mut child);
                return Err(e.into());
            }
        }

        let now = Instant::now();
        if deadline.is_some_and(|d| now >= d) {
            terminate(&mut child);
            let after = started.elapsed();
            log::warn!("{} exceeded {:?}; killed", spec.program, spec.timeout);
            return Ok(Outcome::TimedOut { after });
        }

        let wait = deadline.map_or(POLL_INTERVAL, |d| POLL_INTERVAL.min(d - now));
        match cancel.recv_timeout(wait) {
            Ok(()) => {
                terminate(&mut child);
                log::info!("{} cancelled", spec.program);
                return Ok(Outcome::Cancelled);
            }
            Err(RecvTimeoutError::Timeout) => {}
            // Nobody can cancel any more; keep polling on a channel that
            // never fires so `recv_timeout` still paces the loop.
            Err(RecvTimeoutError::Disconnected) => cancel = crossbeam_channel::never(),
        }
    }
}

fn spawn(spec: &CommandSpec) -> Result<Child> {
    let stdout = File::create(&spec.log)?;
    let stderr = stdout.try_clone()?;

    let mut cmd = Command::new(&spec.program);
    cmd.args(&spec.args)
        .current_dir(&spec.cwd)
        .stdin(Stdio::null())
        .stdout(stdout)
        .stderr(stderr);

    #[cfg(windows)]
    {
        use std::os::windows::process::CommandExt;
        cmd.creation_flags(CREATE_NO_WINDOW);
    }

    cmd.spawn().map_err(|source| TexpadError::Spawn {
        program: spec.program.clone(),
        source,
    })
}

/// Kill `child` and reap it so no zombie or open handle is left behind.
fn terminate(child: &mut Child) {
    // Fails only if the child already exited, which is what we want anyway.
    let _ = child.kill();
    if let Err(e) = child.wait() {
        log::warn!("failed to reap child {}: {e}", child.id());
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;

    fn spec(dir: &std::path::Path, program: &str, args: &[&str], timeout: Duration) -> CommandSpec {
        CommandSpec {
            program: program.to_owned(),
            args: args.iter().map(|a| (*a).to_owned()).collect(),
            cwd: dir.to_path_buf(),
            log: dir.join("output.log"),
            timeout,
        }
    }

    #[cfg(unix)]
    fn exits_with(dir: &std::path::Path, code: i32) -> CommandSpec {
        let script = format!("echo compiling; exit {code}");
        spec(dir, "sh", &["-c", &script], Duration::from_secs(10))
    }

    #[cfg(windows)]
    fn exits_with(dir: &std::path::Path, code: i32) -> CommandSpec {
        let script = format!("echo compiling & exit {code}");
        spec(dir, "cmd", &["/C", &script], Duration::from_secs(10))
    }

    #[cfg(unix)]
    fn never_exits(dir: &std::path::Path, timeout: Duration) -> CommandSpec {
        spec(dir, "sleep", &["30"], timeout)
    }

    #[cfg(windows)]
    fn never_exits(dir: &std::path::Path, timeout: Duration) -> CommandSpec {
        spec(dir, "ping", &["-n", "30", "127.0.0.1"], timeout)
    }

    #[test]
    fn zero_exit_succeeds_and_captures_output() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (_tx, rx) = bounded::<()>(1);
        let s = exits_with(dir.path(), 0);
        assert_eq!(run(&s, &rx).expect("run"), Outcome::Succeeded);
        let log = std::fs::read_to_string(&s.log).expect("log");
        assert!(log.contains("compiling"));
    }

    #[test]
    fn nonzero_exit_fails_with_code() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (_tx, rx) = bounded::<()>(1);
        let outcome = run(&exits_with(dir.path(), 3), &rx).expect("run");
        assert_eq!(outcome, Outcome::Failed { code: Some(3) });
    }

    #[test]
    fn missing_program_is_spawn_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (_tx, rx) = bounded::<()>(1);
        let s = spec(dir.path(), "texpad-no-such-compiler", &[], Duration::from_secs(1));
        match run(&s, &rx) {
            Err(TexpadError::Spawn { program, .. }) => {
                assert_eq!(program, "texpad-no-such-compiler")
            }
            other => panic!("expected spawn error, got {other:?}"),
        }
    }

    #[test]
    fn hung_child_is_killed_at_deadline() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (_tx, rx) = bounded::<()>(1);
        let timeout = Duration::from_millis(400);
        let t0 = Instant::now();
        let outcome = run(&never_exits(dir.path(), timeout), &rx).expect("run");
        let elapsed = t0.elapsed();

        match outcome {
            Outcome::TimedOut { after } => assert!(after >= timeout),
            other => panic!("expected timeout, got {other:?}"),
        }
        assert!(elapsed >= timeout);
        assert!(elapsed < timeout + Duration::from_secs(3), "took {elapsed:?}");
    }

    #[test]
    fn dropped_canceller_still_times_out() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (tx, rx) = bounded::<()>(1);
        drop(tx);
        let outcome = run(&never_exits(dir.path(), Duration::from_millis(300)), &rx)
            .expect("run");
        assert!(matches!(outcome, Outcome::TimedOut { .. }));
    }

    #[test]
    fn cancel_kills_child_promptly() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (tx, rx) = bounded::<()>(1);
        tx.send(()).expect("queue cancel");
        let t0 = Instant::now();
        let outcome = run(&never_exits(dir.path(), Duration::from_secs(30)), &rx)
            .expect("run");
        assert_eq!(outcome, Outcome::Cancelled);
        assert!(t0.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn unrepresentable_timeout_runs_without_deadline() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (_tx, rx) = bounded::<()>(1);
        let mut s = exits_with(dir.path(), 0);
        s.timeout = Duration::MAX;
        assert_eq!(run(&s, &rx).expect("run"), Outcome::Succeeded);
    }

    #[test]
    fn unrepresentable_timeout_still_honours_cancel() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (tx, rx) = bounded::<()>(1);
        tx.send(()).expect("queue cancel");
        let outcome = run(&never_exits(dir.path(), Duration::MAX), &rx).expect("run");
        assert_eq!(outcome, Outcome::Cancelled);
    }
}
