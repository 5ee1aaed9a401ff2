// ── EDIT control constants ────────────────────────────────────────────────────
//
// Source of truth: WinUser.h (EDIT control styles, messages, notifications).
// Only the subset TexPad sends or receives is listed here.

// ── Styles ────────────────────────────────────────────────────────────────────

/// Multi-line control; required for the document view.
pub(super) const ES_MULTILINE: u32 = 0x0004;
/// Scroll vertically when the caret moves past the last visible line.
pub(super) const ES_AUTOVSCROLL: u32 = 0x0040;
/// Scroll horizontally instead of wrapping long lines.
pub(super) const ES_AUTOHSCROLL: u32 = 0x0080;
/// Keep the selection visible when the control loses focus.
pub(super) const ES_NOHIDESEL: u32 = 0x0100;
/// Enter inserts a line break instead of activating a default button.
pub(super) const ES_WANTRETURN: u32 = 0x1000;

// ── Messages ──────────────────────────────────────────────────────────────────

/// Set the text limit in characters.  WPARAM = limit; LPARAM unused.
pub(super) const EM_SETLIMITTEXT: u32 = 0x00C5;
/// Select a character range.  WPARAM = start, LPARAM = end (-1 = to end).
pub(super) const EM_SETSEL: u32 = 0x00B1;
/// Set or clear the modification flag.  WPARAM = BOOL.
pub(super) const EM_SETMODIFY: u32 = 0x00B9;

// ── Notifications (pub(crate) for WM_COMMAND dispatch in window.rs) ──────────

/// The user changed the text (sent after the screen is updated).
pub(crate) const EN_CHANGE: u32 = 0x0300;
/// The text reached the limit set with `EM_SETLIMITTEXT`.
pub(crate) const EN_MAXTEXT: u32 = 0x0501;
