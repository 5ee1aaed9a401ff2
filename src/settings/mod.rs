// ── Settings persistence ──────────────────────────────────────────────────────
//
// Reads and writes `%APPDATA%\TexPad\settings.json`.
// No `unsafe`: pure safe Rust + serde_json.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};

use crate::{compile::template::Template, error::Result};

// ── On-disk types ─────────────────────────────────────────────────────────────

/// Root of the JSON settings file.
///
/// Every field has a default, so a file written by an older build (or
/// trimmed by hand) still parses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    pub(crate) version: u32,
    /// Compiler executable, resolved through `PATH` when not absolute.
    pub(crate) compiler: String,
    /// Flags passed before `-output-directory=…` and the input file.
    pub(crate) compiler_args: Vec<String>,
    /// Wall-clock budget for one compile before the child is killed.
    pub(crate) timeout_secs: u64,
    pub(crate) template: Template,
    /// Where job files and PDFs go; `None` means `<temp>/texpad`.
    pub(crate) output_dir: Option<PathBuf>,
    /// Directory of the last opened or saved file, for the file dialogs.
    pub(crate) last_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            compiler: DEFAULT_COMPILER.to_owned(),
            compiler_args: vec!["-interaction=nonstopmode".to_owned()],
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            template: Template::Auto,
            output_dir: None,
            last_dir: None,
        }
    }
}

impl Settings {
    /// Compile timeout, clamped to `1..=MAX_TIMEOUT_SECS` seconds.
    pub(crate) fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.clamp(1, MAX_TIMEOUT_SECS))
    }

    /// Directory that receives compile job files.
    pub(crate) fn output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("texpad"))
    }
}

// ── Defaults ──────────────────────────────────────────────────────────────────

const SETTINGS_VERSION: u32 = 1;
const DEFAULT_COMPILER: &str = "pdflatex";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const MAX_TIMEOUT_SECS: u64 = 3600;

// ── Path ──────────────────────────────────────────────────────────────────────

/// Return the path to the settings file: `%APPDATA%\TexPad\settings.json`.
///
/// Returns `None` if the `APPDATA` environment variable is not set.
pub(crate) fn settings_path() -> Option<PathBuf> {
    let appdata = std::env::var_os("APPDATA")?;
    let mut p = PathBuf::from(appdata);
    p.push("TexPad");
    p.push("settings.json");
    Some(p)
}

// ── Load ──────────────────────────────────────────────────────────────────────

/// Read the settings file, falling back to defaults on any problem.
pub(crate) fn load() -> Settings {
    match settings_path() {
        Some(path) => load_from(&path),
        None => Settings::default(),
    }
}

/// Read and parse `path`.
///
/// A missing file, a JSON parse failure, or an unrecognised version number
/// all yield `Settings::default()`; the latter two are logged.
pub(crate) fn load_from(path: &Path) -> Settings {
    let data = match fs::read(path) {
        Ok(data) => data,
        Err(_) => return Settings::default(),
    };
    match serde_json::from_slice::<Settings>(&data) {
        Ok(s) if s.version == SETTINGS_VERSION => s,
        Ok(s) => {
            log::warn!(
                "ignoring {} with unsupported version {}",
                path.display(),
                s.version
            );
            Settings::default()
        }
        Err(e) => {
            log::warn!("ignoring unreadable {}: {e}", path.display());
            Settings::default()
        }
    }
}

// ── Save ──────────────────────────────────────────────────────────────────────

/// Write the settings to `%APPDATA%\TexPad\settings.json`.
///
/// The caller (`window.rs`) logs and otherwise discards any returned error.
pub(crate) fn save(settings: &Settings) -> Result<()> {
    let path = settings_path().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::NotFound, "APPDATA not set")
    })?;
    save_to(&path, settings)
}

/// Write `settings` to `path`, creating the parent directory if needed.
pub(crate) fn save_to(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let file = fs::File::create(path)?;
    serde_json::to_writer_pretty(file, settings)?;
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_pdflatex_invocation() {
        let s = Settings::default();
        assert_eq!(s.compiler, "pdflatex");
        assert_eq!(s.compiler_args, ["-interaction=nonstopmode"]);
        assert_eq!(s.timeout(), Duration::from_secs(10));
        assert_eq!(s.template, Template::Auto);
    }

    #[test]
    fn roundtrip_through_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("settings.json");
        let s = Settings {
            compiler: "xelatex".to_owned(),
            timeout_secs: 30,
            template: Template::Verbatim,
            output_dir: Some(dir.path().join("out")),
            last_dir: Some(PathBuf::from(r"C:\papers")),
            ..Settings::default()
        };
        save_to(&path, &s).expect("save");
        assert_eq!(load_from(&path), s);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let json = r#"{"version":1,"timeout_secs":3}"#;
        let s: Settings = serde_json::from_str(json).expect("deserialize partial");
        assert_eq!(s.timeout_secs, 3);
        assert_eq!(s.compiler, "pdflatex");
        assert_eq!(s.output_dir, None);
    }

    #[test]
    fn template_is_lowercase_in_json() {
        let json = serde_json::to_string(&Settings::default()).expect("serialize");
        assert!(json.contains(r#""template":"auto""#), "{json}");
    }

    #[test]
    fn wrong_version_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"version":99,"compiler":"lualatex"}"#).expect("seed");
        assert_eq!(load_from(&path), Settings::default());
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").expect("seed");
        assert_eq!(load_from(&path), Settings::default());
    }

    #[test]
    fn zero_timeout_is_clamped() {
        let s = Settings { timeout_secs: 0, ..Settings::default() };
        assert_eq!(s.timeout(), Duration::from_secs(1));
    }

    #[test]
    fn huge_timeout_is_capped_at_an_hour() {
        let s: Settings =
            serde_json::from_str(r#"{ "timeout_secs": 18446744073709551615 }"#).expect("parse");
        assert_eq!(s.timeout_secs, u64::MAX);
        assert_eq!(s.timeout(), Duration::from_secs(MAX_TIMEOUT_SECS));
    }

    #[test]
    fn output_dir_defaults_under_temp() {
        let s = Settings::default();
        assert_eq!(s.output_dir(), std::env::temp_dir().join("texpad"));
    }
}
