// ── Editor component abstraction ──────────────────────────────────────────────
//
// Exposes a safe Rust API over the native EDIT control that holds the
// document.  Callers interact with `EditView` through its methods; they never
// send EDIT messages themselves.

pub mod edit;

use crate::document::MAX_DOCUMENT_BYTES;

/// Character limit handed to the EDIT control.
///
/// The byte cap is enforced when saving or compiling; this only stops the
/// control from growing without bound.  Non-ASCII text can still exceed the
/// byte cap below this many characters, which save/compile then report.
pub(crate) const EDIT_CHAR_LIMIT: usize = MAX_DOCUMENT_BYTES;
