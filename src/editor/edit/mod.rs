// ── EDIT child-window hosting ─────────────────────────────────────────────────
//
// This is one of exactly two modules where `unsafe` is permitted.
// Every `unsafe` block MUST carry a `// SAFETY:` comment.
//
// The document lives inside a standard multi-line EDIT control.  The control
// owns the text; `EditView` is a copyable handle that reads it out as a
// `String` (for save and compile snapshots) and replaces it wholesale (on
// open).  The control speaks UTF-16 and only renders CRLF line breaks;
// callers pass CRLF text in and get CRLF text out.

#![allow(unsafe_code)]

pub mod messages;

use messages::{
    EM_SETLIMITTEXT, EM_SETMODIFY, EM_SETSEL, ES_AUTOHSCROLL, ES_AUTOVSCROLL, ES_MULTILINE,
    ES_NOHIDESEL, ES_WANTRETURN,
};

use windows::{
    core::{w, PCWSTR},
    Win32::{
        Foundation::{HINSTANCE, HWND, LPARAM, WPARAM},
        Graphics::Gdi::{CreateFontW, DeleteObject, HFONT, HGDIOBJ},
        UI::{
            Input::KeyboardAndMouse::SetFocus,
            WindowsAndMessaging::{
                CreateWindowExW, GetWindowTextLengthW, GetWindowTextW, SendMessageW,
                SetWindowTextW, HMENU, WINDOW_STYLE, WM_SETFONT, WS_CHILD, WS_EX_CLIENTEDGE,
                WS_HSCROLL, WS_VISIBLE, WS_VSCROLL,
            },
        },
    },
};

use crate::{
    error::{Result, TexpadError},
    platform::win32::dpi,
};

// ── Font ──────────────────────────────────────────────────────────────────────

/// Face used for the document; falls back to the system fixed font if absent.
const FONT_FACE: PCWSTR = w!("Consolas");

/// Point size at 96 DPI, expressed as a negative character height in pixels.
const FONT_HEIGHT_96DPI: i32 = -15;

/// RAII handle to the monospace font used by the edit control.
///
/// Must outlive every control it is selected into; `WindowState` keeps it
/// until the window is destroyed.
pub(crate) struct EditorFont(HFONT);

impl EditorFont {
    /// Create the document font scaled for `dpi`.
    pub(crate) fn create(dpi: u32) -> Result<Self> {
        // SAFETY: FONT_FACE is a static null-terminated UTF-16 literal; all
        // other arguments are plain integers.  CreateFontW returns a null
        // handle on failure, which is checked below.
        let font = unsafe {
            CreateFontW(
                dpi::scale(FONT_HEIGHT_96DPI, dpi),
                0,
                0,
                0,
                400, // FW_NORMAL
                0,
                0,
                0,
                1, // DEFAULT_CHARSET
                0, // OUT_DEFAULT_PRECIS
                0, // CLIP_DEFAULT_PRECIS
                5, // CLEARTYPE_QUALITY
                1 | 0x30, // FIXED_PITCH | FF_MODERN
                FONT_FACE,
            )
        };
        if font.is_invalid() {
            return Err(TexpadError::Win32 { function: "CreateFontW", code: 0 });
        }
        Ok(Self(font))
    }

    pub(crate) fn handle(&self) -> HFONT {
        self.0
    }
}

impl Drop for EditorFont {
    fn drop(&mut self) {
        // SAFETY: self.0 came from CreateFontW and is deleted exactly once.
        // Controls using it are destroyed before WindowState (and so this
        // font) is dropped in WM_NCDESTROY.
        unsafe {
            let _ = DeleteObject(HGDIOBJ(self.0 .0));
        }
    }
}

// ── EditView ──────────────────────────────────────────────────────────────────

/// A hosted multi-line EDIT child window.
///
/// Holds only the child `HWND`, which Windows destroys along with the parent;
/// no explicit cleanup is needed.  `Copy` so handlers can take it out of
/// `WindowState` before calling into anything that pumps messages.
#[derive(Clone, Copy)]
pub(crate) struct EditView {
    hwnd: HWND,
}

impl EditView {
    /// Create the edit control inside `hwnd_parent` with control id `id`.
    ///
    /// The control starts visible with zero size; the parent lays it out on
    /// `WM_SIZE`.
    pub(crate) fn create(hwnd_parent: HWND, hinstance: HINSTANCE, id: usize) -> Result<Self> {
        let style = WS_CHILD
            | WS_VISIBLE
            | WS_VSCROLL
            | WS_HSCROLL
            | WINDOW_STYLE(
                ES_MULTILINE | ES_AUTOVSCROLL | ES_AUTOHSCROLL | ES_NOHIDESEL | ES_WANTRETURN,
            );

        // SAFETY: "EDIT" is a system class registered in every process.
        // hwnd_parent and hinstance are valid handles owned by the caller.
        // For a child window the HMENU slot carries the control id.
        let hwnd = unsafe {
            CreateWindowExW(
                WS_EX_CLIENTEDGE,
                w!("EDIT"),
                PCWSTR::null(),
                style,
                0, 0, 0, 0,
                hwnd_parent,
                HMENU(id as *mut core::ffi::c_void),
                hinstance,
                None,
            )
        }
        .map_err(|e| TexpadError::Win32 {
            function: "CreateWindowExW (EDIT)",
            code: e.code().0 as u32,
        })?;

        Ok(Self { hwnd })
    }

    /// The edit child window handle.  Valid until the parent is destroyed.
    pub(crate) fn hwnd(&self) -> HWND {
        self.hwnd
    }

    /// Give keyboard focus to the editor.
    pub(crate) fn focus(&self) {
        // SAFETY: hwnd is a valid child window on this (the UI) thread.
        unsafe {
            let _ = SetFocus(self.hwnd);
        }
    }

    /// Select `font` into the control and redraw.
    pub(crate) fn set_font(&self, font: &EditorFont) {
        // SAFETY: hwnd valid; the HFONT outlives the control (see EditorFont).
        // LPARAM = 1 requests an immediate redraw.
        unsafe {
            let _ = SendMessageW(
                self.hwnd,
                WM_SETFONT,
                WPARAM(font.handle().0 as usize),
                LPARAM(1),
            );
        }
    }

    /// Cap the number of characters the user can type or paste.
    pub(crate) fn set_limit(&self, chars: usize) {
        // SAFETY: hwnd valid; EM_SETLIMITTEXT takes the limit in WPARAM.
        unsafe {
            let _ = SendMessageW(self.hwnd, EM_SETLIMITTEXT, WPARAM(chars), LPARAM(0));
        }
    }

    // ── Document operations ───────────────────────────────────────────────────

    /// Replace all text, move the caret to the start, and clear the
    /// control's modification flag.
    pub(crate) fn set_text(&self, text: &str) {
        let wide: Vec<u16> = text.encode_utf16().chain(std::iter::once(0)).collect();
        // SAFETY: hwnd valid; wide is null-terminated UTF-16 that outlives
        // the calls.  EM_SETSEL(0, 0) and EM_SETMODIFY(FALSE) are documented
        // no-fail messages.
        unsafe {
            let _ = SetWindowTextW(self.hwnd, PCWSTR(wide.as_ptr()));
            let _ = SendMessageW(self.hwnd, EM_SETSEL, WPARAM(0), LPARAM(0));
            let _ = SendMessageW(self.hwnd, EM_SETMODIFY, WPARAM(0), LPARAM(0));
        }
    }

    /// Read the full document text.
    ///
    /// Unpaired surrogates (which the control tolerates) become U+FFFD.
    pub(crate) fn get_text(&self) -> String {
        // SAFETY: hwnd valid; GetWindowTextLengthW is a read-only query.
        let len = unsafe { GetWindowTextLengthW(self.hwnd) }.max(0) as usize;
        let mut buf = vec![0u16; len + 1];
        // SAFETY: buf holds len + 1 UTF-16 units; GetWindowTextW writes at most
        // buf.len() units including the terminator and returns the count copied.
        let copied = unsafe { GetWindowTextW(self.hwnd, &mut buf) }.max(0) as usize;
        String::from_utf16_lossy(&buf[..copied.min(len)])
    }
}
