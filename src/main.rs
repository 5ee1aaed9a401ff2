// ── Safety policy ────────────────────────────────────────────────────────────
// Unsafe code is forbidden everywhere except:
//   • `platform::win32` – Win32 / WinAPI FFI
//   • `editor::edit`    – EDIT control hosting
// Each unsafe block in those modules MUST carry a `// SAFETY:` comment.
#![deny(unsafe_code)]
// Release builds run as a GUI application (no console window).
// Debug builds keep the console so that log output is visible.
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]
// Off Windows only the portable modules and their tests are meaningful.
#![cfg_attr(not(windows), allow(dead_code))]

mod app;
mod compile;
mod document;
#[cfg(windows)]
mod editor;
mod error;
#[cfg(windows)]
mod platform;
mod settings;
mod ui;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::debug!("texpad {} starting", env!("CARGO_PKG_VERSION"));

    #[cfg(windows)]
    if let Err(e) = platform::win32::window::run() {
        log::error!("{e}");
        // Startup failed before or during the message loop.
        // A modal dialog is the only visible output path in a GUI app.
        platform::win32::window::show_error_dialog(&e.to_string());
        std::process::exit(1);
    }

    #[cfg(not(windows))]
    {
        log::error!("texpad needs the Win32 user interface and only runs on Windows");
        std::process::exit(1);
    }
}
