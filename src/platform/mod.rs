// ── OS integration ────────────────────────────────────────────────────────────
//
// Only compiled on Windows (see `main.rs`).  Everything that needs a window
// handle lives under `win32`; the document, settings and compile modules stay
// free of FFI so they build and test on any host.

pub mod win32;
