// ── Status line & compile notices ─────────────────────────────────────────────
//
// Pure Rust text for the status label and the message boxes shown when a
// compile finishes.  No Win32 calls here; `platform::win32::window` renders
// whatever these functions return.

use crate::{
    compile::{CompileReport, Outcome},
    error::TexpadError,
};

pub(crate) const READY: &str = "Status: Ready";
pub(crate) const PROCESSING: &str = "Processing LaTeX...";
pub(crate) const BUSY: &str = "A compile is already running. Stop it first (Esc).";
pub(crate) const STOPPING: &str = "Stopping compile...";
pub(crate) const NOTHING_TO_STOP: &str = "No compile is running.";

/// Icon / severity of a finished-compile dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Severity {
    Info,
    Error,
}

/// A modal message to show after a compile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Notice {
    pub(crate) severity: Severity,
    pub(crate) title: &'static str,
    pub(crate) body: String,
}

impl Notice {
    fn error(body: String) -> Self {
        Self { severity: Severity::Error, title: "Error", body }
    }
}

/// What the UI should display for a finished compile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ReportView {
    pub(crate) status: String,
    /// `None` when the user already knows (they cancelled it).
    pub(crate) notice: Option<Notice>,
}

/// Turn a compile report into status text plus an optional dialog.
pub(crate) fn describe(report: &CompileReport) -> ReportView {
    let paths = &report.paths;
    match &report.result {
        Ok(Outcome::Succeeded) => ReportView {
            status: "LaTeX conversion successful.".to_owned(),
            notice: Some(Notice {
                severity: Severity::Info,
                title: "Success",
                body: format!(
                    "LaTeX compilation successful.\n\nPDF: {}",
                    paths.pdf.display()
                ),
            }),
        },
        Ok(Outcome::Failed { code }) => {
            let code = code.map_or_else(|| "terminated".to_owned(), |c| format!("exit code {c}"));
            ReportView {
                status: "Error during LaTeX processing.".to_owned(),
                notice: Some(Notice::error(format!(
                    "Error compiling LaTeX ({code}). Check {}.",
                    paths.output_log.display()
                ))),
            }
        }
        Ok(Outcome::TimedOut { after }) => ReportView {
            status: "LaTeX processing timed out.".to_owned(),
            notice: Some(Notice::error(format!(
                "LaTeX processing timed out after {:.0} s; the compiler was stopped.",
                after.as_secs_f64()
            ))),
        },
        Ok(Outcome::Cancelled) => ReportView {
            status: "Compilation cancelled.".to_owned(),
            notice: None,
        },
        Err(e @ TexpadError::Spawn { program, .. }) => ReportView {
            status: "Error during LaTeX processing.".to_owned(),
            notice: Some(Notice::error(format!("Failed to execute {program}.\n\n{e}"))),
        },
        Err(e) => ReportView {
            status: "Error during LaTeX processing.".to_owned(),
            notice: Some(Notice::error(format!("Error creating LaTeX file.\n\n{e}"))),
        },
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::job::JobPaths;
    use std::{path::PathBuf, time::Duration};

    fn report(result: crate::error::Result<Outcome>) -> CompileReport {
        CompileReport {
            job_id: 1,
            paths: JobPaths {
                input: PathBuf::from("out/texpad-1-1.tex"),
                pdf: PathBuf::from("out/texpad-1-1.pdf"),
                output_log: PathBuf::from("out/texpad-1-1-output.log"),
            },
            result,
            elapsed: Duration::from_millis(900),
        }
    }

    #[test]
    fn success_shows_info_with_pdf_path() {
        let view = describe(&report(Ok(Outcome::Succeeded)));
        assert_eq!(view.status, "LaTeX conversion successful.");
        let notice = view.notice.expect("dialog");
        assert_eq!(notice.severity, Severity::Info);
        assert!(notice.body.contains("texpad-1-1.pdf"));
    }

    #[test]
    fn failure_points_at_log_and_has_no_success_dialog() {
        let view = describe(&report(Ok(Outcome::Failed { code: Some(1) })));
        let notice = view.notice.expect("dialog");
        assert_eq!(notice.severity, Severity::Error);
        assert!(notice.body.contains("exit code 1"));
        assert!(notice.body.contains("texpad-1-1-output.log"));
    }

    #[test]
    fn signal_death_is_described() {
        let view = describe(&report(Ok(Outcome::Failed { code: None })));
        assert!(view.notice.expect("dialog").body.contains("terminated"));
    }

    #[test]
    fn timeout_is_distinct() {
        let view = describe(&report(Ok(Outcome::TimedOut { after: Duration::from_secs(10) })));
        assert_eq!(view.status, "LaTeX processing timed out.");
        assert!(view.notice.expect("dialog").body.contains("10 s"));
    }

    #[test]
    fn cancel_is_silent() {
        let view = describe(&report(Ok(Outcome::Cancelled)));
        assert_eq!(view.notice, None);
    }

    #[test]
    fn spawn_failure_names_program() {
        let err = TexpadError::Spawn {
            program: "pdflatex".to_owned(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        let notice = describe(&report(Err(err))).notice.expect("dialog");
        assert!(notice.body.starts_with("Failed to execute pdflatex."));
    }

    #[test]
    fn write_failure_is_file_error() {
        let err = TexpadError::WriteInput {
            path: PathBuf::from("out/texpad-1-1.tex"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let notice = describe(&report(Err(err))).notice.expect("dialog");
        assert!(notice.body.starts_with("Error creating LaTeX file."));
    }
}
