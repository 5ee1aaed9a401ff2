// ── DPI scaling ───────────────────────────────────────────────────────────────
//
// Window sizes, the status line and the editor font are written for 96 DPI.
// `scale` converts them for the monitor the window sits on; before the main
// window exists the system DPI stands in.

#![allow(unsafe_code)]

use windows::Win32::{
    Foundation::HWND,
    UI::HiDpi::{
        GetDpiForSystem, GetDpiForWindow, SetProcessDpiAwarenessContext,
        DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2,
    },
};

pub(crate) const BASE_DPI: u32 = 96;

/// Convert a length authored at 96 DPI to `dpi`, rounding half away from zero.
pub(crate) fn scale(px: i32, dpi: u32) -> i32 {
    let scaled = i64::from(px) * i64::from(dpi);
    let half = i64::from(BASE_DPI / 2) * scaled.signum();
    ((scaled + half) / i64::from(BASE_DPI)) as i32
}

/// Opt the process into Per-Monitor v2 awareness.  Call once, before the
/// first window is created.
pub(crate) fn enable_per_monitor_awareness() {
    // SAFETY: no pointers involved; called on the UI thread before any window.
    let applied =
        unsafe { SetProcessDpiAwarenessContext(DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2) };
    if let Err(e) = applied {
        // Already set (for example by a manifest); windows scale as the system decides.
        log::debug!("per-monitor DPI awareness not applied: {e}");
    }
}

/// DPI of the primary monitor, used to size a window that does not exist yet.
pub(crate) fn for_system() -> u32 {
    // SAFETY: GetDpiForSystem takes no arguments and cannot fail.
    nonzero_or_base(unsafe { GetDpiForSystem() })
}

/// DPI of the monitor `hwnd` is on.  A null handle, or a window Windows
/// cannot place yet, reports the system DPI.
pub(crate) fn for_window(hwnd: HWND) -> u32 {
    if hwnd.0.is_null() {
        return for_system();
    }
    // SAFETY: hwnd is non-null and owned by this thread; an invalid handle
    // makes GetDpiForWindow return 0 rather than fault.
    match unsafe { GetDpiForWindow(hwnd) } {
        0 => for_system(),
        dpi => dpi,
    }
}

fn nonzero_or_base(dpi: u32) -> u32 {
    if dpi == 0 {
        BASE_DPI
    } else {
        dpi
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_is_identity_at_base() {
        assert_eq!(scale(22, BASE_DPI), 22);
        assert_eq!(scale(-15, BASE_DPI), -15);
    }

    #[test]
    fn scale_doubles_at_192() {
        assert_eq!(scale(-15, 192), -30);
        assert_eq!(scale(22, 144), 33);
    }

    #[test]
    fn scale_rounds_to_nearest_pixel() {
        // 125 %: 15 * 1.25 = 18.75
        assert_eq!(scale(15, 120), 19);
        assert_eq!(scale(-15, 120), -19);
        // 150 %: 6 * 1.5 = 9 exactly, 5 * 1.5 = 7.5
        assert_eq!(scale(6, 144), 9);
        assert_eq!(scale(5, 144), 8);
    }

    #[test]
    fn zero_dpi_reads_as_base() {
        assert_eq!(nonzero_or_base(0), BASE_DPI);
        assert_eq!(nonzero_or_base(144), 144);
    }

    #[test]
    fn null_window_uses_system_dpi() {
        assert_eq!(for_window(HWND::default()), for_system());
    }
}
