// ── Document buffer model ─────────────────────────────────────────────────────
//
// Pure-Rust helpers for the single in-memory document: on-disk encoding and
// EOL detection, whole-file read/write, and the immutable `Snapshot` handed
// to the compile worker.  No Win32 imports; usable and testable on any host.

use std::{fs, path::Path, sync::Arc};

use crate::error::{Result, TexpadError};

/// Largest document, in bytes, the editor will hold.
///
/// Opening a bigger file is refused, and a buffer that grows past this
/// (e.g. via paste) cannot be saved or compiled.
pub(crate) const MAX_DOCUMENT_BYTES: usize = 65_536;

// ── Encoding ──────────────────────────────────────────────────────────────────

const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// The character encoding of the document on disk.
///
/// The in-memory text is always a Rust `String`; this records how to write
/// it back so an untouched file saves byte-for-byte identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Encoding {
    /// UTF-8 without BOM (the default for new documents).
    Utf8,
    /// UTF-8 with a leading `EF BB BF`.
    Utf8Bom,
    /// Anything that is not valid UTF-8.  Each byte maps to the code point
    /// of the same value, which is lossless in both directions.
    Latin1,
}

impl Encoding {
    /// Short display string shown in the status line.
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Utf8 => "UTF-8",
            Self::Utf8Bom => "UTF-8 BOM",
            Self::Latin1 => "Latin-1",
        }
    }
}

// ── EOL mode ──────────────────────────────────────────────────────────────────

/// The end-of-line convention used by the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EolMode {
    /// Windows-style `\r\n`.
    Crlf,
    /// Unix-style `\n`.
    Lf,
    /// Old Mac-style `\r`.
    Cr,
}

impl EolMode {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Crlf => "CRLF",
            Self::Lf => "LF",
            Self::Cr => "CR",
        }
    }

    fn sequence(self) -> &'static str {
        match self {
            Self::Crlf => "\r\n",
            Self::Lf => "\n",
            Self::Cr => "\r",
        }
    }

    /// Detect the dominant EOL style in `text`.
    ///
    /// Counts `\r\n`, lone `\r` and lone `\n`; ties favour CRLF, then LF.
    /// Text without any line break is treated as CRLF.
    pub(crate) fn detect(text: &str) -> Self {
        let (mut crlf, mut lf, mut cr) = (0usize, 0usize, 0usize);
        let bytes = text.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\r' if bytes.get(i + 1) == Some(&b'\n') => {
                    crlf += 1;
                    i += 2;
                }
                b'\r' => {
                    cr += 1;
                    i += 1;
                }
                b'\n' => {
                    lf += 1;
                    i += 1;
                }
                _ => i += 1,
            }
        }
        if crlf >= lf && crlf >= cr {
            Self::Crlf
        } else if lf >= cr {
            Self::Lf
        } else {
            Self::Cr
        }
    }
}

/// Rewrite every line break in `text` (`\r\n`, `\r` or `\n`) as `eol`.
///
/// The EDIT control only renders CRLF, so documents are shown with
/// `normalize_eols(text, EolMode::Crlf)` and written back with the
/// document's own `EolMode`.  For text with uniform line endings the pair
/// is an exact inverse.
pub(crate) fn normalize_eols(text: &str, eol: EolMode) -> String {
    let seq = eol.sequence();
    let mut out = String::with_capacity(text.len() + text.len() / 32);
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push_str(seq);
            }
            '\n' => out.push_str(seq),
            other => out.push(other),
        }
    }
    out
}

// ── Decode / encode ───────────────────────────────────────────────────────────

/// A document as read from disk, before display conversion.
#[derive(Debug)]
pub(crate) struct LoadedDocument {
    pub(crate) encoding: Encoding,
    pub(crate) eol: EolMode,
    /// Decoded text with the file's original line endings.
    pub(crate) text: String,
}

/// Detect the encoding of `bytes` and decode them.
///
/// Detection order: UTF-8 BOM with a valid UTF-8 body, valid UTF-8, then
/// Latin-1 over every byte (BOM included) as the fallback.
pub(crate) fn decode(bytes: &[u8]) -> LoadedDocument {
    let bom_body = bytes
        .strip_prefix(&UTF8_BOM)
        .and_then(|rest| std::str::from_utf8(rest).ok());
    let (encoding, text) = if let Some(body) = bom_body {
        (Encoding::Utf8Bom, body.to_owned())
    } else if let Ok(s) = std::str::from_utf8(bytes) {
        (Encoding::Utf8, s.to_owned())
    } else {
        (Encoding::Latin1, bytes.iter().map(|&b| char::from(b)).collect())
    };
    let eol = EolMode::detect(&text);
    LoadedDocument { encoding, eol, text }
}

/// Re-encode `text` for disk.  Latin-1 maps code points above U+00FF to `?`.
pub(crate) fn encode(text: &str, encoding: Encoding) -> Vec<u8> {
    match encoding {
        Encoding::Utf8 => text.as_bytes().to_vec(),
        Encoding::Utf8Bom => {
            let mut out = Vec::with_capacity(text.len() + 3);
            out.extend_from_slice(&UTF8_BOM);
            out.extend_from_slice(text.as_bytes());
            out
        }
        Encoding::Latin1 => text
            .chars()
            .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
            .collect(),
    }
}

fn check_size(len: usize) -> Result<()> {
    if len > MAX_DOCUMENT_BYTES {
        return Err(TexpadError::DocumentTooLarge { len, limit: MAX_DOCUMENT_BYTES });
    }
    Ok(())
}

/// Read and decode a whole file, refusing anything above the buffer cap.
///
/// Files containing a NUL byte are refused too: the edit control ends its
/// text at the first NUL, so the tail would be lost on the next save.
pub(crate) fn read_file(path: &Path) -> Result<LoadedDocument> {
    let len = fs::metadata(path)?.len();
    check_size(usize::try_from(len).unwrap_or(usize::MAX))?;
    let bytes = fs::read(path)?;
    // The file may have grown between the metadata call and the read.
    check_size(bytes.len())?;
    if let Some(offset) = bytes.iter().position(|&b| b == 0) {
        return Err(TexpadError::EmbeddedNul { offset });
    }
    Ok(decode(&bytes))
}

/// Encode `text` and write it over `path` in one call.
pub(crate) fn write_file(path: &Path, text: &str, encoding: Encoding) -> Result<()> {
    let bytes = encode(text, encoding);
    check_size(bytes.len())?;
    fs::write(path, bytes)?;
    Ok(())
}

// ── Snapshot ──────────────────────────────────────────────────────────────────

/// An immutable copy of the buffer taken on the UI thread.
///
/// Compiles only ever see a `Snapshot`, so the user can keep typing while
/// the worker serialises the text.  Cloning is a reference-count bump.
#[derive(Debug, Clone)]
pub(crate) struct Snapshot(Arc<str>);

impl Snapshot {
    /// Capture `text`, refusing buffers above `MAX_DOCUMENT_BYTES`.
    pub(crate) fn capture(text: &str) -> Result<Self> {
        check_size(text.len())?;
        Ok(Self(Arc::from(text)))
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_utf8_plain() {
        let doc = decode(b"\\alpha + \\beta");
        assert_eq!(doc.encoding, Encoding::Utf8);
        assert_eq!(doc.text, "\\alpha + \\beta");
    }

    #[test]
    fn detect_utf8_bom_strips_marker() {
        let doc = decode(b"\xEF\xBB\xBFx^2");
        assert_eq!(doc.encoding, Encoding::Utf8Bom);
        assert_eq!(doc.text, "x^2");
        assert_eq!(encode(&doc.text, doc.encoding), b"\xEF\xBB\xBFx^2");
    }

    #[test]
    fn latin1_fallback_is_lossless() {
        let bytes = b"caf\xE9 \x80\xFF";
        let doc = decode(bytes);
        assert_eq!(doc.encoding, Encoding::Latin1);
        assert_eq!(encode(&doc.text, doc.encoding), bytes);
    }

    #[test]
    fn bom_with_invalid_body_falls_back_to_latin1() {
        let bytes = b"\xEF\xBB\xBFcaf\xE9";
        let doc = decode(bytes);
        assert_eq!(doc.encoding, Encoding::Latin1);
        assert_eq!(encode(&doc.text, doc.encoding), bytes);
    }

    #[test]
    fn latin1_replaces_wide_chars() {
        assert_eq!(encode("a\u{2211}b", Encoding::Latin1), b"a?b");
    }

    #[test]
    fn detect_eol_variants() {
        assert_eq!(EolMode::detect("a\r\nb\r\nc\n"), EolMode::Crlf);
        assert_eq!(EolMode::detect("a\nb\nc\n"), EolMode::Lf);
        assert_eq!(EolMode::detect("a\rb\rc"), EolMode::Cr);
        assert_eq!(EolMode::detect("no newlines here"), EolMode::Crlf);
    }

    #[test]
    fn normalize_handles_mixed_input() {
        assert_eq!(normalize_eols("a\nb\r\nc\rd", EolMode::Crlf), "a\r\nb\r\nc\r\nd");
        assert_eq!(normalize_eols("a\r\nb\r\n", EolMode::Lf), "a\nb\n");
        assert_eq!(normalize_eols("a\r\n\r\nb", EolMode::Cr), "a\r\rb");
    }

    #[test]
    fn display_conversion_is_inverse_for_uniform_eols() {
        for (text, eol) in [
            ("\\begin{align}\n x &= 1\n\\end{align}\n", EolMode::Lf),
            ("line\r\nline\r\n", EolMode::Crlf),
            ("a\rb\r", EolMode::Cr),
        ] {
            let shown = normalize_eols(text, EolMode::Crlf);
            assert_eq!(normalize_eols(&shown, eol), text);
        }
    }

    #[test]
    fn write_then_read_is_byte_identical() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("eq.tex");
        let text = "\\[\n  \\int_0^1 x\\,dx = \\tfrac12\n\\]\n% ünïcödé\n";
        write_file(&path, text, Encoding::Utf8).expect("write");
        let loaded = read_file(&path).expect("read");
        assert_eq!(loaded.text, text);
        assert_eq!(loaded.eol, EolMode::Lf);
        assert_eq!(fs::read(&path).expect("raw"), text.as_bytes());
    }

    #[test]
    fn full_capacity_roundtrips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("big.tex");
        let text = "x".repeat(MAX_DOCUMENT_BYTES);
        write_file(&path, &text, Encoding::Utf8).expect("write at cap");
        assert_eq!(read_file(&path).expect("read").text, text);
    }

    #[test]
    fn oversized_file_is_refused() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("huge.tex");
        fs::write(&path, vec![b'%'; MAX_DOCUMENT_BYTES + 1]).expect("seed");
        assert!(matches!(
            read_file(&path),
            Err(TexpadError::DocumentTooLarge { limit: MAX_DOCUMENT_BYTES, .. })
        ));
    }

    #[test]
    fn oversized_write_leaves_no_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("huge.tex");
        let text = "y".repeat(MAX_DOCUMENT_BYTES + 1);
        assert!(write_file(&path, &text, Encoding::Utf8).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn file_with_nul_byte_is_refused() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("binary.tex");
        fs::write(&path, b"x^2\0tail").expect("seed");
        match read_file(&path) {
            Err(TexpadError::EmbeddedNul { offset }) => assert_eq!(offset, 3),
            other => panic!("expected NUL refusal, got {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = read_file(&dir.path().join("absent.tex")).unwrap_err();
        assert!(matches!(err, TexpadError::Io(_)));
    }

    #[test]
    fn snapshot_is_detached_from_source() {
        let mut buffer = String::from("E = mc^2");
        let snap = Snapshot::capture(&buffer).expect("capture");
        buffer.push_str(" + edits");
        assert_eq!(snap.as_str(), "E = mc^2");
        assert_eq!(snap.clone().as_str(), snap.as_str());
    }

    #[test]
    fn snapshot_refuses_oversized_buffer() {
        let text = "z".repeat(MAX_DOCUMENT_BYTES + 1);
        assert!(Snapshot::capture(&text).is_err());
    }
}
