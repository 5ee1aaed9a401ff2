// ── Central error type ────────────────────────────────────────────────────────
//
// All fallible operations in TexPad return `error::Result<T>`.  No panics
// in production paths; errors surface as user-facing dialogs (see
// `platform::win32::window::show_error_dialog`) or as a failed
// `CompileReport` delivered back to the UI thread.

use std::path::PathBuf;

/// Every error that TexPad can produce.
#[derive(Debug, thiserror::Error)]
pub enum TexpadError {
    /// A Win32 API call returned a failure code.
    #[error("{function} failed (error {code:#010x})")]
    Win32 {
        /// The name of the failing function, for display purposes.
        function: &'static str,
        /// The raw Win32 error code (`GetLastError()` value) or HRESULT.
        code: u32,
    },

    /// A standard I/O error (file open, read, write, …).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The document does not fit in the editor buffer.
    #[error("document is {len} bytes; the editor holds at most {limit} bytes")]
    DocumentTooLarge { len: usize, limit: usize },

    /// The file holds a NUL byte, which the edit control cannot display.
    #[error("file contains a NUL byte at offset {offset}; it is not a text document")]
    EmbeddedNul { offset: usize },

    /// The external compiler could not be started at all.
    #[error("failed to execute {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The compile input file could not be created or written.
    #[error("could not write {}: {source}", path.display())]
    WriteInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The settings file could not be serialised.
    #[error("settings error: {0}")]
    Settings(#[from] serde_json::Error),
}

// Convert a windows-crate error (HRESULT) directly into a TexpadError so that
// `?` can be used on `windows::core::Result<T>` throughout the platform module.
#[cfg(windows)]
impl From<windows::core::Error> for TexpadError {
    fn from(e: windows::core::Error) -> Self {
        // HRESULT.0 is i32; reinterpret bits as u32 for display purposes.
        // Win32 errors appear as 0x8007xxxx HRESULTs.
        Self::Win32 {
            function: "windows",
            code: e.code().0 as u32,
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TexpadError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn win32_display_is_hex_padded() {
        let e = TexpadError::Win32 { function: "CreateWindowExW", code: 0x57 };
        assert_eq!(e.to_string(), "CreateWindowExW failed (error 0x00000057)");
    }

    #[test]
    fn too_large_names_both_sizes() {
        let e = TexpadError::DocumentTooLarge { len: 70_000, limit: 65_536 };
        let s = e.to_string();
        assert!(s.contains("70000"));
        assert!(s.contains("65536"));
    }

    #[test]
    fn spawn_exposes_io_source() {
        use std::error::Error as _;
        let e = TexpadError::Spawn {
            program: "pdflatex".to_owned(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert!(e.to_string().starts_with("failed to execute pdflatex"));
        assert!(e.source().is_some());
    }
}
