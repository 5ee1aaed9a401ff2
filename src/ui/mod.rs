// ── Presentation helpers ──────────────────────────────────────────────────────
//
// Platform-neutral text the window shows: status line strings and the
// message boxes that follow a compile.

pub(crate) mod status;
