// ── Application lifecycle & top-level state ────────────────────────────────────
//
// A single `App` is created on startup and owned by `WindowState` for the
// lifetime of the main window.  All mutations happen on the UI thread; the
// compile worker only ever receives an owned snapshot and answers through
// the report channel.  There is no global mutable state.

use std::path::{Path, PathBuf};

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::{
    compile::{CompileJob, CompileReport, CompileTask},
    document::{self, normalize_eols, Encoding, EolMode, Snapshot},
    error::Result,
    settings::Settings,
};

// ── DocumentState ─────────────────────────────────────────────────────────────

/// Metadata for the document held in the edit control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DocumentState {
    /// Absolute path to the file on disk, or `None` for an untitled buffer.
    pub(crate) path: Option<PathBuf>,
    /// The encoding used to read (and that will be used to write) the file.
    pub(crate) encoding: Encoding,
    /// The EOL convention detected in the file.
    pub(crate) eol: EolMode,
    /// `true` when the buffer contains changes not yet saved to disk.
    pub(crate) dirty: bool,
}

impl DocumentState {
    /// A fresh, untitled document with sensible defaults.
    fn new_untitled() -> Self {
        Self {
            path: None,
            encoding: Encoding::Utf8,
            eol: EolMode::Crlf,
            dirty: false,
        }
    }

    /// The bare filename component, or `"Untitled"` if no path is set.
    pub(crate) fn display_name(&self) -> String {
        self.path
            .as_deref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Untitled".to_owned())
    }
}

// ── Compile requests ──────────────────────────────────────────────────────────

/// What happened when the user asked for a compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CompileRequest {
    /// A worker was started for the given job id.
    Started(u64),
    /// Another compile is still running; nothing was started.
    Busy,
}

// ── App ───────────────────────────────────────────────────────────────────────

/// Top-level application state.
///
/// Passed by mutable reference through WndProc handlers so that all
/// application logic sees a single, explicit state root rather than a
/// collection of disconnected globals.
pub(crate) struct App {
    /// State of the currently open document.
    pub(crate) doc: DocumentState,
    pub(crate) settings: Settings,
    compile: Option<CompileTask>,
    next_job: u64,
    reports_tx: Sender<CompileReport>,
    reports_rx: Receiver<CompileReport>,
}

impl App {
    /// Create an `App` with an untitled, empty document.
    pub(crate) fn new(settings: Settings) -> Self {
        let (reports_tx, reports_rx) = unbounded();
        Self {
            doc: DocumentState::new_untitled(),
            settings,
            compile: None,
            next_job: 1,
            reports_tx,
            reports_rx,
        }
    }

    /// Compute the title string for the main window.
    ///
    /// | State | Title |
    /// |---|---|
    /// | No path, clean | `"TexPad"` |
    /// | Path set, clean | `"filename — TexPad"` |
    /// | Path set, dirty | `"*filename — TexPad"` |
    /// | No path, dirty | `"*Untitled — TexPad"` |
    pub(crate) fn window_title(&self) -> String {
        if self.doc.path.is_none() && !self.doc.dirty {
            return "TexPad".to_owned();
        }
        let dirty = if self.doc.dirty { "*" } else { "" };
        format!("{dirty}{} \u{2014} TexPad", self.doc.display_name())
    }

    /// Record an edit.  Returns `true` if the title needs refreshing.
    pub(crate) fn mark_dirty(&mut self) -> bool {
        !std::mem::replace(&mut self.doc.dirty, true)
    }

    // ── File open ─────────────────────────────────────────────────────────────

    /// Load `path` and return the text to put in the edit control (CRLF).
    ///
    /// Document state is only touched once the file has been read and
    /// decoded, so a failed open leaves the current buffer and its metadata
    /// exactly as they were.
    pub(crate) fn open_file(&mut self, path: PathBuf) -> Result<String> {
        let loaded = document::read_file(&path)?;
        let display = normalize_eols(&loaded.text, EolMode::Crlf);

        self.remember_dir(&path);
        self.doc = DocumentState {
            path: Some(path),
            encoding: loaded.encoding,
            eol: loaded.eol,
            dirty: false,
        };
        Ok(display)
    }

    // ── File save ─────────────────────────────────────────────────────────────

    /// Write the edit-control text to `path` with the document's encoding
    /// and line endings.
    ///
    /// On success, updates `doc.path` (for Save As) and clears `doc.dirty`.
    pub(crate) fn save(&mut self, path: PathBuf, display_text: &str) -> Result<()> {
        let text = normalize_eols(display_text, self.doc.eol);
        document::write_file(&path, &text, self.doc.encoding)?;
        self.remember_dir(&path);
        self.doc.path = Some(path);
        self.doc.dirty = false;
        Ok(())
    }

    fn remember_dir(&mut self, path: &Path) {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            self.settings.last_dir = Some(dir.to_path_buf());
        }
    }

    // ── Compile ───────────────────────────────────────────────────────────────

    /// `true` while a compile worker has not yet reported back.
    pub(crate) fn compile_in_flight(&self) -> bool {
        self.compile.is_some()
    }

    /// Snapshot `display_text` and start a background compile.
    ///
    /// `notify` runs on the worker thread once the report has been queued;
    /// the window uses it to post itself a message so `take_reports` runs on
    /// the UI thread.
    pub(crate) fn start_compile<F>(&mut self, display_text: &str, notify: F) -> Result<CompileRequest>
    where
        F: FnOnce() + Send + 'static,
    {
        if self.compile_in_flight() {
            return Ok(CompileRequest::Busy);
        }

        let snapshot = Snapshot::capture(&normalize_eols(display_text, self.doc.eol))?;
        let id = self.next_job;
        let job = CompileJob::new(id, snapshot, &self.settings);
        let task = CompileTask::spawn(job, self.reports_tx.clone(), notify)?;
        self.next_job += 1;
        self.compile = Some(task);
        Ok(CompileRequest::Started(id))
    }

    /// Ask the running compile to stop.  Returns `false` if none is running.
    pub(crate) fn stop_compile(&self) -> bool {
        match &self.compile {
            Some(task) => {
                task.cancel();
                true
            }
            None => false,
        }
    }

    /// Drain finished compiles.  Joins the worker of the current task once
    /// its report has arrived.
    pub(crate) fn take_reports(&mut self) -> Vec<CompileReport> {
        let reports: Vec<CompileReport> = self.reports_rx.try_iter().collect();
        let finished = self
            .compile
            .as_ref()
            .is_some_and(|task| reports.iter().any(|r| r.job_id == task.id()));
        if finished {
            if let Some(task) = self.compile.take() {
                task.join();
            }
        }
        reports
    }

    /// Cancel and join any running compile.  Called on window teardown.
    pub(crate) fn shutdown(&mut self) {
        if let Some(task) = self.compile.take() {
            task.cancel();
            task.join();
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{compile::Outcome, document::MAX_DOCUMENT_BYTES, error::TexpadError};
    use std::{fs, time::Duration};

    fn app_in(dir: &Path) -> App {
        App::new(Settings {
            output_dir: Some(dir.to_path_buf()),
            ..Settings::default()
        })
    }

    #[test]
    fn title_clean_untitled() {
        assert_eq!(App::new(Settings::default()).window_title(), "TexPad");
    }

    #[test]
    fn title_clean_with_path() {
        let mut app = App::new(Settings::default());
        app.doc.path = Some(PathBuf::from(r"C:\notes\paper.tex"));
        // Backslashes are only separators on Windows.
        let name = app.doc.display_name();
        assert_eq!(app.window_title(), format!("{name} \u{2014} TexPad"));
    }

    #[test]
    fn title_dirty_untitled() {
        let mut app = App::new(Settings::default());
        assert!(app.mark_dirty());
        assert!(!app.mark_dirty(), "second edit does not change the title");
        assert_eq!(app.window_title(), "*Untitled \u{2014} TexPad");
    }

    #[test]
    fn save_then_open_is_byte_identical() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("notes.tex");
        let original = "\\section{Intro}\n$\\sum_{k=1}^n k$\n";
        fs::write(&path, original).expect("seed");

        let mut app = app_in(dir.path());
        let shown = app.open_file(path.clone()).expect("open");
        assert_eq!(shown, "\\section{Intro}\r\n$\\sum_{k=1}^n k$\r\n");
        assert_eq!(app.doc.eol, EolMode::Lf);

        app.mark_dirty();
        app.save(path.clone(), &shown).expect("save");
        assert!(!app.doc.dirty);
        assert_eq!(fs::read(&path).expect("raw"), original.as_bytes());
        assert_eq!(app.settings.last_dir.as_deref(), Some(dir.path()));
    }

    #[test]
    fn open_missing_file_leaves_state_unchanged() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut app = app_in(dir.path());
        app.doc.path = Some(dir.path().join("current.tex"));
        app.doc.dirty = true;
        let before = app.doc.clone();

        let err = app.open_file(dir.path().join("missing.tex")).unwrap_err();
        assert!(matches!(err, TexpadError::Io(_)));
        assert_eq!(app.doc, before);
        assert_eq!(app.settings.last_dir, None);
    }

    #[test]
    fn open_oversized_file_leaves_state_unchanged() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("huge.tex");
        fs::write(&path, vec![b'a'; MAX_DOCUMENT_BYTES + 1]).expect("seed");
        let mut app = app_in(dir.path());
        assert!(app.open_file(path).is_err());
        assert_eq!(app.doc, DocumentState::new_untitled());
    }

    #[test]
    fn oversized_buffer_is_not_compiled() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut app = app_in(dir.path());
        let text = "b".repeat(MAX_DOCUMENT_BYTES + 1);
        assert!(app.start_compile(&text, || {}).is_err());
        assert!(!app.compile_in_flight());
    }

    #[test]
    fn compile_roundtrip_through_report_channel() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut app = app_in(dir.path());
        app.settings.compiler = "texpad-no-such-compiler".to_owned();

        let (done_tx, done_rx) = crossbeam_channel::bounded(1);
        let req = app
            .start_compile("x^2", move || {
                let _ = done_tx.send(());
            })
            .expect("start");
        assert_eq!(req, CompileRequest::Started(1));
        assert!(app.compile_in_flight());
        assert_eq!(app.start_compile("y", || {}).expect("busy"), CompileRequest::Busy);

        done_rx.recv_timeout(Duration::from_secs(10)).expect("notified");
        let reports = app.take_reports();
        assert_eq!(reports.len(), 1);
        assert!(matches!(reports[0].result, Err(TexpadError::Spawn { .. })));
        assert!(!app.compile_in_flight());
        assert!(!app.stop_compile());
    }

    #[cfg(unix)]
    #[test]
    fn shutdown_cancels_running_compile() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut app = app_in(dir.path());
        app.settings.compiler = "sh".to_owned();
        app.settings.compiler_args = vec!["-c".into(), "sleep 30".into(), "sh".into()];

        app.start_compile("x", || {}).expect("start");
        assert!(app.stop_compile());
        app.shutdown();
        assert!(!app.compile_in_flight());

        let reports = app.take_reports();
        assert!(matches!(reports[0].result, Ok(Outcome::Cancelled)));
    }
}
