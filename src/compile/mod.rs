// ── LaTeX compilation ─────────────────────────────────────────────────────────
//
// Snapshot → `job` (write input, build command line) → `supervisor` (run with
// deadline and cancellation) → `task` (worker thread, report channel).
// No Win32 imports; the UI only sees `CompileTask` and `CompileReport`.

pub(crate) mod job;
pub(crate) mod supervisor;
pub(crate) mod task;
pub(crate) mod template;

pub(crate) use job::CompileJob;
pub(crate) use supervisor::Outcome;
pub(crate) use task::{CompileReport, CompileTask};
