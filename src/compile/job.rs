// ── Compile jobs ──────────────────────────────────────────────────────────────
//
// A job is one compiler invocation: a unique file stem inside the output
// directory, the rendered `.tex` input, and the command line that turns it
// into a PDF.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{
    compile::{supervisor::CommandSpec, template::Template},
    document::Snapshot,
    error::{Result, TexpadError},
    settings::Settings,
};

/// Everything the worker needs to run one compile.  Owns all its data so it
/// can move to another thread.
#[derive(Debug, Clone)]
pub(crate) struct CompileJob {
    pub(crate) id: u64,
    pub(crate) snapshot: Snapshot,
    pub(crate) template: Template,
    pub(crate) compiler: String,
    pub(crate) compiler_args: Vec<String>,
    pub(crate) timeout: Duration,
    pub(crate) output_dir: PathBuf,
}

/// Paths produced by a job.  Only `input` is written by TexPad itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct JobPaths {
    pub(crate) input: PathBuf,
    pub(crate) pdf: PathBuf,
    /// Captured compiler stdout and stderr.
    pub(crate) output_log: PathBuf,
}

impl CompileJob {
    /// Build job `id` for `snapshot` from the active settings.
    pub(crate) fn new(id: u64, snapshot: Snapshot, settings: &Settings) -> Self {
        Self {
            id,
            snapshot,
            template: settings.template,
            compiler: settings.compiler.clone(),
            compiler_args: settings.compiler_args.clone(),
            timeout: settings.timeout(),
            output_dir: settings.output_dir(),
        }
    }

    /// File stem shared by every artefact of this job.
    ///
    /// The process id keeps two TexPad instances sharing an output directory
    /// from overwriting each other; the job id does the same within one.
    pub(crate) fn stem(&self) -> String {
        format!("texpad-{}-{}", std::process::id(), self.id)
    }

    pub(crate) fn paths(&self) -> JobPaths {
        let stem = self.stem();
        JobPaths {
            input: self.output_dir.join(format!("{stem}.tex")),
            pdf: self.output_dir.join(format!("{stem}.pdf")),
            output_log: self.output_dir.join(format!("{stem}-output.log")),
        }
    }

    /// Render the snapshot through the template and write the input file.
    ///
    /// Any failure here aborts the job before the compiler is started.
    pub(crate) fn write_input(&self) -> Result<JobPaths> {
        let paths = self.paths();
        let write_err = |source| TexpadError::WriteInput {
            path: paths.input.clone(),
            source,
        };
        fs::create_dir_all(&self.output_dir).map_err(write_err)?;
        let body = self.template.render(self.snapshot.as_str());
        fs::write(&paths.input, body).map_err(write_err)?;
        Ok(paths)
    }

    /// The compiler invocation for `paths`.
    pub(crate) fn command(&self, paths: &JobPaths) -> CommandSpec {
        let mut args = self.compiler_args.clone();
        args.push(format!("-output-directory={}", self.output_dir.display()));
        args.push(file_name(&paths.input));
        CommandSpec {
            program: self.compiler.clone(),
            args,
            cwd: self.output_dir.clone(),
            log: paths.output_log.clone(),
            timeout: self.timeout,
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
